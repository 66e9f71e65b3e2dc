use {
    crate::format::{
        ABGR8888, ARGB8888, BGR888, FORMATS, RGB888, XBGR8888, XRGB8888, canonicalize_format,
        formats, fourcc_code,
    },
    ash::vk,
};

#[test]
fn formats_dont_panic() {
    formats();
}

#[test]
fn formats_map_is_total() {
    for format in FORMATS {
        let entry = formats().get(&format.drm).copied().unwrap();
        assert_eq!(entry.drm, format.drm);
        assert_eq!(entry.name, format.name);
    }
}

#[test]
fn fourcc_packing() {
    assert_eq!(fourcc_code('X', 'R', '2', '4'), 0x3432_5258);
    assert_eq!(fourcc_code('A', 'R', '2', '4'), 0x3432_5241);
    assert_eq!(fourcc_code('R', '8', ' ', ' '), 0x2020_3852);
}

#[test]
fn canonicalize_legacy_codes() {
    assert_eq!(canonicalize_format(0), XRGB8888.drm);
    assert_eq!(canonicalize_format(1), ARGB8888.drm);
    assert_eq!(canonicalize_format(XRGB8888.drm), XRGB8888.drm);
    let nv12 = fourcc_code('N', 'V', '1', '2');
    assert_eq!(canonicalize_format(nv12), nv12);
}

#[test]
fn byte_order_mappings() {
    assert_eq!(XRGB8888.vk_format, vk::Format::B8G8R8A8_UNORM);
    assert_eq!(XRGB8888.vk_srgb_format, Some(vk::Format::B8G8R8A8_SRGB));
    assert_eq!(XBGR8888.vk_format, vk::Format::R8G8B8A8_UNORM);
    assert_eq!(RGB888.vk_format, vk::Format::B8G8R8_UNORM);
    assert_eq!(BGR888.vk_format, vk::Format::R8G8B8_UNORM);
}

#[test]
fn alpha_formats_have_no_srgb_alternate() {
    assert_eq!(ARGB8888.vk_format, XRGB8888.vk_format);
    assert_eq!(ABGR8888.vk_format, XBGR8888.vk_format);
    assert!(ARGB8888.vk_srgb_format.is_none());
    assert!(ABGR8888.vk_srgb_format.is_none());
}
