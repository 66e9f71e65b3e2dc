use {ahash::AHashMap, ash::vk, once_cell::sync::Lazy};

#[cfg(test)]
mod tests;

#[derive(Copy, Clone, Debug)]
pub struct Format {
    pub name: &'static str,
    pub drm: u32,
    pub vk_format: vk::Format,
    pub vk_srgb_format: Option<vk::Format>,
}

impl PartialEq for Format {
    fn eq(&self, other: &Self) -> bool {
        self.drm == other.drm
    }
}

impl Eq for Format {}

static FORMATS_MAP: Lazy<AHashMap<u32, &'static Format>> = Lazy::new(|| {
    let mut map = AHashMap::new();
    for format in FORMATS {
        assert!(map.insert(format.drm, format).is_none());
    }
    map
});

pub fn formats() -> &'static AHashMap<u32, &'static Format> {
    &FORMATS_MAP
}

pub const fn fourcc_code(a: char, b: char, c: char, d: char) -> u32 {
    (a as u32) | ((b as u32) << 8) | ((c as u32) << 16) | ((d as u32) << 24)
}

const XRGB8888_LEGACY: u32 = 0;
const XRGB8888_DRM: u32 = fourcc_code('X', 'R', '2', '4');

const ARGB8888_LEGACY: u32 = 1;
const ARGB8888_DRM: u32 = fourcc_code('A', 'R', '2', '4');

/// Maps the legacy `gbm_bo_format` enum values to their fourcc equivalents.
pub fn canonicalize_format(format: u32) -> u32 {
    match format {
        XRGB8888_LEGACY => XRGB8888_DRM,
        ARGB8888_LEGACY => ARGB8888_DRM,
        _ => format,
    }
}

// Vulkan non-packed 8-bits-per-channel formats have an inverted channel order
// compared to the DRM formats, because DRM format channel order is
// little-endian while Vulkan format channel order is in memory byte order.
static R8: &Format = &Format {
    name: "r8",
    drm: fourcc_code('R', '8', ' ', ' '),
    vk_format: vk::Format::R8_UNORM,
    vk_srgb_format: Some(vk::Format::R8_SRGB),
};

static GR88: &Format = &Format {
    name: "gr88",
    drm: fourcc_code('G', 'R', '8', '8'),
    vk_format: vk::Format::R8G8_UNORM,
    vk_srgb_format: Some(vk::Format::R8G8_SRGB),
};

static RGB888: &Format = &Format {
    name: "rgb888",
    drm: fourcc_code('R', 'G', '2', '4'),
    vk_format: vk::Format::B8G8R8_UNORM,
    vk_srgb_format: Some(vk::Format::B8G8R8_SRGB),
};

static BGR888: &Format = &Format {
    name: "bgr888",
    drm: fourcc_code('B', 'G', '2', '4'),
    vk_format: vk::Format::R8G8B8_UNORM,
    vk_srgb_format: Some(vk::Format::R8G8B8_SRGB),
};

pub static XRGB8888: &Format = &Format {
    name: "xrgb8888",
    drm: XRGB8888_DRM,
    vk_format: vk::Format::B8G8R8A8_UNORM,
    vk_srgb_format: Some(vk::Format::B8G8R8A8_SRGB),
};

static XBGR8888: &Format = &Format {
    name: "xbgr8888",
    drm: fourcc_code('X', 'B', '2', '4'),
    vk_format: vk::Format::R8G8B8A8_UNORM,
    vk_srgb_format: Some(vk::Format::R8G8B8A8_SRGB),
};

// The Vulkan _SRGB formats correspond to unpremultiplied alpha but scanout
// consumers expect premultiplied alpha on electrical values, so the formats
// with an alpha channel have no sRGB alternate.
pub static ARGB8888: &Format = &Format {
    name: "argb8888",
    drm: ARGB8888_DRM,
    vk_format: vk::Format::B8G8R8A8_UNORM,
    vk_srgb_format: None,
};

static ABGR8888: &Format = &Format {
    name: "abgr8888",
    drm: fourcc_code('A', 'B', '2', '4'),
    vk_format: vk::Format::R8G8B8A8_UNORM,
    vk_srgb_format: None,
};

// Vulkan packed formats have the same channel order as DRM formats on little
// endian systems.
#[cfg(target_endian = "little")]
static RGBA4444: &Format = &Format {
    name: "rgba4444",
    drm: fourcc_code('R', 'A', '1', '2'),
    vk_format: vk::Format::R4G4B4A4_UNORM_PACK16,
    vk_srgb_format: None,
};

#[cfg(target_endian = "little")]
static RGBX4444: &Format = &Format {
    name: "rgbx4444",
    drm: fourcc_code('R', 'X', '1', '2'),
    vk_format: vk::Format::R4G4B4A4_UNORM_PACK16,
    vk_srgb_format: None,
};

#[cfg(target_endian = "little")]
static BGRA4444: &Format = &Format {
    name: "bgra4444",
    drm: fourcc_code('B', 'A', '1', '2'),
    vk_format: vk::Format::B4G4R4A4_UNORM_PACK16,
    vk_srgb_format: None,
};

#[cfg(target_endian = "little")]
static BGRX4444: &Format = &Format {
    name: "bgrx4444",
    drm: fourcc_code('B', 'X', '1', '2'),
    vk_format: vk::Format::B4G4R4A4_UNORM_PACK16,
    vk_srgb_format: None,
};

#[cfg(target_endian = "little")]
static RGB565: &Format = &Format {
    name: "rgb565",
    drm: fourcc_code('R', 'G', '1', '6'),
    vk_format: vk::Format::R5G6B5_UNORM_PACK16,
    vk_srgb_format: None,
};

#[cfg(target_endian = "little")]
static BGR565: &Format = &Format {
    name: "bgr565",
    drm: fourcc_code('B', 'G', '1', '6'),
    vk_format: vk::Format::B5G6R5_UNORM_PACK16,
    vk_srgb_format: None,
};

#[cfg(target_endian = "little")]
static RGBA5551: &Format = &Format {
    name: "rgba5551",
    drm: fourcc_code('R', 'A', '1', '5'),
    vk_format: vk::Format::R5G5B5A1_UNORM_PACK16,
    vk_srgb_format: None,
};

#[cfg(target_endian = "little")]
static RGBX5551: &Format = &Format {
    name: "rgbx5551",
    drm: fourcc_code('R', 'X', '1', '5'),
    vk_format: vk::Format::R5G5B5A1_UNORM_PACK16,
    vk_srgb_format: None,
};

#[cfg(target_endian = "little")]
static BGRA5551: &Format = &Format {
    name: "bgra5551",
    drm: fourcc_code('B', 'A', '1', '5'),
    vk_format: vk::Format::B5G5R5A1_UNORM_PACK16,
    vk_srgb_format: None,
};

#[cfg(target_endian = "little")]
static BGRX5551: &Format = &Format {
    name: "bgrx5551",
    drm: fourcc_code('B', 'X', '1', '5'),
    vk_format: vk::Format::B5G5R5A1_UNORM_PACK16,
    vk_srgb_format: None,
};

#[cfg(target_endian = "little")]
static ARGB1555: &Format = &Format {
    name: "argb1555",
    drm: fourcc_code('A', 'R', '1', '5'),
    vk_format: vk::Format::A1R5G5B5_UNORM_PACK16,
    vk_srgb_format: None,
};

#[cfg(target_endian = "little")]
static XRGB1555: &Format = &Format {
    name: "xrgb1555",
    drm: fourcc_code('X', 'R', '1', '5'),
    vk_format: vk::Format::A1R5G5B5_UNORM_PACK16,
    vk_srgb_format: None,
};

#[cfg(target_endian = "little")]
static ARGB2101010: &Format = &Format {
    name: "argb2101010",
    drm: fourcc_code('A', 'R', '3', '0'),
    vk_format: vk::Format::A2R10G10B10_UNORM_PACK32,
    vk_srgb_format: None,
};

#[cfg(target_endian = "little")]
static XRGB2101010: &Format = &Format {
    name: "xrgb2101010",
    drm: fourcc_code('X', 'R', '3', '0'),
    vk_format: vk::Format::A2R10G10B10_UNORM_PACK32,
    vk_srgb_format: None,
};

#[cfg(target_endian = "little")]
static ABGR2101010: &Format = &Format {
    name: "abgr2101010",
    drm: fourcc_code('A', 'B', '3', '0'),
    vk_format: vk::Format::A2B10G10R10_UNORM_PACK32,
    vk_srgb_format: None,
};

#[cfg(target_endian = "little")]
static XBGR2101010: &Format = &Format {
    name: "xbgr2101010",
    drm: fourcc_code('X', 'B', '3', '0'),
    vk_format: vk::Format::A2B10G10R10_UNORM_PACK32,
    vk_srgb_format: None,
};

// Vulkan 16-bits-per-channel formats have an inverted channel order compared
// to DRM formats, just like the 8-bits-per-channel ones. On little endian
// systems the memory representation of each channel matches the DRM formats'.
#[cfg(target_endian = "little")]
static ABGR16161616: &Format = &Format {
    name: "abgr16161616",
    drm: fourcc_code('A', 'B', '4', '8'),
    vk_format: vk::Format::R16G16B16A16_UNORM,
    vk_srgb_format: None,
};

#[cfg(target_endian = "little")]
static XBGR16161616: &Format = &Format {
    name: "xbgr16161616",
    drm: fourcc_code('X', 'B', '4', '8'),
    vk_format: vk::Format::R16G16B16A16_UNORM,
    vk_srgb_format: None,
};

#[cfg(target_endian = "little")]
static ABGR16161616F: &Format = &Format {
    name: "abgr16161616f",
    drm: fourcc_code('A', 'B', '4', 'H'),
    vk_format: vk::Format::R16G16B16A16_SFLOAT,
    vk_srgb_format: None,
};

#[cfg(target_endian = "little")]
static XBGR16161616F: &Format = &Format {
    name: "xbgr16161616f",
    drm: fourcc_code('X', 'B', '4', 'H'),
    vk_format: vk::Format::R16G16B16A16_SFLOAT,
    vk_srgb_format: None,
};

pub static FORMATS: &[Format] = &[
    *R8,
    *GR88,
    *RGB888,
    *BGR888,
    *XRGB8888,
    *XBGR8888,
    *ARGB8888,
    *ABGR8888,
    #[cfg(target_endian = "little")]
    *RGBA4444,
    #[cfg(target_endian = "little")]
    *RGBX4444,
    #[cfg(target_endian = "little")]
    *BGRA4444,
    #[cfg(target_endian = "little")]
    *BGRX4444,
    #[cfg(target_endian = "little")]
    *RGB565,
    #[cfg(target_endian = "little")]
    *BGR565,
    #[cfg(target_endian = "little")]
    *RGBA5551,
    #[cfg(target_endian = "little")]
    *RGBX5551,
    #[cfg(target_endian = "little")]
    *BGRA5551,
    #[cfg(target_endian = "little")]
    *BGRX5551,
    #[cfg(target_endian = "little")]
    *ARGB1555,
    #[cfg(target_endian = "little")]
    *XRGB1555,
    #[cfg(target_endian = "little")]
    *ARGB2101010,
    #[cfg(target_endian = "little")]
    *XRGB2101010,
    #[cfg(target_endian = "little")]
    *ABGR2101010,
    #[cfg(target_endian = "little")]
    *XBGR2101010,
    #[cfg(target_endian = "little")]
    *ABGR16161616,
    #[cfg(target_endian = "little")]
    *XBGR16161616,
    #[cfg(target_endian = "little")]
    *ABGR16161616F,
    #[cfg(target_endian = "little")]
    *XBGR16161616F,
];
