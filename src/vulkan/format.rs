use {
    crate::{
        format::{FORMATS, Format},
        utils::errorfmt::ErrorFmt,
        video::Modifier,
        vulkan::{VulkanError, instance::VulkanInstance},
    },
    ahash::AHashMap,
    ash::{
        vk,
        vk::{
            DrmFormatModifierPropertiesEXT, DrmFormatModifierPropertiesListEXT,
            ExternalImageFormatProperties, ExternalMemoryFeatureFlags,
            ExternalMemoryHandleTypeFlags, FormatFeatureFlags, FormatProperties2,
            ImageCreateFlags, ImageFormatListCreateInfo, ImageFormatProperties2, ImageTiling,
            ImageType, ImageUsageFlags, PhysicalDevice, PhysicalDeviceExternalImageFormatInfo,
            PhysicalDeviceImageDrmFormatModifierInfoEXT, PhysicalDeviceImageFormatInfo2,
            SharingMode,
        },
    },
};

#[cfg(test)]
mod tests;

#[derive(Debug)]
pub struct VulkanFormat {
    pub format: &'static Format,
    pub render_modifiers: Vec<VulkanModifier>,
    pub texture_modifiers: Vec<VulkanModifier>,
}

#[derive(Copy, Clone, Debug)]
pub struct VulkanModifier {
    pub modifier: Modifier,
    pub planes: usize,
    pub features: FormatFeatureFlags,
    pub max_extent: VulkanMaxExtent,
}

#[derive(Copy, Clone, Debug)]
pub struct VulkanMaxExtent {
    pub width: u32,
    pub height: u32,
}

impl VulkanFormat {
    /// Returns the modifier properties for the render or texture usage class.
    pub fn find_modifier(&self, modifier: Modifier, render: bool) -> Option<&VulkanModifier> {
        let list = match render {
            true => &self.render_modifiers,
            false => &self.texture_modifiers,
        };
        list.iter().find(|m| m.modifier == modifier)
    }
}

const RENDER_FEATURES: FormatFeatureFlags = FormatFeatureFlags::from_raw(
    0 | FormatFeatureFlags::COLOR_ATTACHMENT.as_raw()
        | FormatFeatureFlags::COLOR_ATTACHMENT_BLEND.as_raw()
        | FormatFeatureFlags::SAMPLED_IMAGE.as_raw(),
);
const TEX_FEATURES: FormatFeatureFlags = FormatFeatureFlags::SAMPLED_IMAGE;

const RENDER_USAGE: ImageUsageFlags = ImageUsageFlags::from_raw(
    0 | ImageUsageFlags::COLOR_ATTACHMENT.as_raw()
        | ImageUsageFlags::SAMPLED.as_raw()
        | ImageUsageFlags::TRANSFER_SRC.as_raw(),
);
const TEX_USAGE: ImageUsageFlags = ImageUsageFlags::from_raw(
    0 | ImageUsageFlags::SAMPLED.as_raw() | ImageUsageFlags::TRANSFER_SRC.as_raw(),
);

impl VulkanInstance {
    pub(super) fn load_formats(&self, phy_dev: PhysicalDevice) -> AHashMap<u32, VulkanFormat> {
        let mut res = AHashMap::new();
        log::debug!("Supported Vulkan formats:");
        for format in FORMATS {
            self.load_format(phy_dev, format, &mut res);
        }
        res
    }

    fn load_format(
        &self,
        phy_dev: PhysicalDevice,
        format: &'static Format,
        dst: &mut AHashMap<u32, VulkanFormat>,
    ) {
        log::debug!("  {} (0x{:08X})", format.name, format.drm);
        let mut modifier_props = DrmFormatModifierPropertiesListEXT::default();
        let mut format_properties = FormatProperties2::default().push_next(&mut modifier_props);
        unsafe {
            self.instance.get_physical_device_format_properties2(
                phy_dev,
                format.vk_format,
                &mut format_properties,
            );
        }
        if modifier_props.drm_format_modifier_count == 0 {
            return;
        }
        let (render_modifiers, texture_modifiers) = self.load_modifiers(
            phy_dev,
            format,
            modifier_props.drm_format_modifier_count as usize,
        );
        if render_modifiers.is_empty() && texture_modifiers.is_empty() {
            return;
        }
        dst.insert(
            format.drm,
            VulkanFormat {
                format,
                render_modifiers,
                texture_modifiers,
            },
        );
    }

    fn load_modifiers(
        &self,
        phy_dev: PhysicalDevice,
        format: &'static Format,
        n_modifiers: usize,
    ) -> (Vec<VulkanModifier>, Vec<VulkanModifier>) {
        let mut drm_mods = vec![DrmFormatModifierPropertiesEXT::default(); n_modifiers];
        let mut modifier_props = DrmFormatModifierPropertiesListEXT::default()
            .drm_format_modifier_properties(&mut drm_mods);
        let mut format_properties = FormatProperties2::default().push_next(&mut modifier_props);
        unsafe {
            self.instance.get_physical_device_format_properties2(
                phy_dev,
                format.vk_format,
                &mut format_properties,
            );
        }
        let mut render_modifiers = vec![];
        let mut texture_modifiers = vec![];
        for props in &drm_mods {
            let to_modifier = |max_extent| VulkanModifier {
                modifier: props.drm_format_modifier,
                planes: props.drm_format_modifier_plane_count as _,
                features: props.drm_format_modifier_tiling_features,
                max_extent,
            };
            let render =
                self.probe_modifier(phy_dev, format, RENDER_FEATURES, RENDER_USAGE, props);
            if let Some(max_extent) = render {
                render_modifiers.push(to_modifier(max_extent));
            }
            let texture = self.probe_modifier(phy_dev, format, TEX_FEATURES, TEX_USAGE, props);
            if let Some(max_extent) = texture {
                texture_modifiers.push(to_modifier(max_extent));
            }
            log::debug!(
                "    DMA-BUF modifier 0x{:016X} ({} planes)",
                props.drm_format_modifier,
                props.drm_format_modifier_plane_count,
            );
        }
        (render_modifiers, texture_modifiers)
    }

    /// Checks whether dma-buf images with this format/modifier pair support a
    /// usage class. Probe failures count as missing support.
    fn probe_modifier(
        &self,
        phy_dev: PhysicalDevice,
        format: &'static Format,
        features: FormatFeatureFlags,
        usage: ImageUsageFlags,
        props: &DrmFormatModifierPropertiesEXT,
    ) -> Option<VulkanMaxExtent> {
        if !props.drm_format_modifier_tiling_features.contains(features) {
            return None;
        }
        let absorb = |e| {
            log::debug!("Could not query image properties: {}", ErrorFmt(e));
            None
        };
        let mut max_extent = self
            .get_max_extent(phy_dev, format, format.vk_srgb_format, usage, props)
            .unwrap_or_else(absorb);
        if max_extent.is_none() && format.vk_srgb_format.is_some() {
            max_extent = self
                .get_max_extent(phy_dev, format, None, usage, props)
                .unwrap_or_else(absorb);
        }
        max_extent
    }

    fn get_max_extent(
        &self,
        phy_dev: PhysicalDevice,
        format: &Format,
        srgb_format: Option<vk::Format>,
        usage: ImageUsageFlags,
        props: &DrmFormatModifierPropertiesEXT,
    ) -> Result<Option<VulkanMaxExtent>, VulkanError> {
        let view_formats = [format.vk_format, srgb_format.unwrap_or(vk::Format::UNDEFINED)];
        let n_view_formats = 1 + srgb_format.is_some() as usize;
        let flags = match srgb_format.is_some() {
            true => ImageCreateFlags::MUTABLE_FORMAT,
            false => ImageCreateFlags::empty(),
        };
        let mut format_list =
            ImageFormatListCreateInfo::default().view_formats(&view_formats[..n_view_formats]);
        let mut modifier_info = PhysicalDeviceImageDrmFormatModifierInfoEXT::default()
            .drm_format_modifier(props.drm_format_modifier)
            .sharing_mode(SharingMode::EXCLUSIVE);
        let mut external_image_format_info = PhysicalDeviceExternalImageFormatInfo::default()
            .handle_type(ExternalMemoryHandleTypeFlags::DMA_BUF_EXT);
        let image_format_info = PhysicalDeviceImageFormatInfo2::default()
            .ty(ImageType::TYPE_2D)
            .format(format.vk_format)
            .usage(usage)
            .flags(flags)
            .tiling(ImageTiling::DRM_FORMAT_MODIFIER_EXT)
            .push_next(&mut format_list)
            .push_next(&mut external_image_format_info)
            .push_next(&mut modifier_info);
        let mut external_image_format_props = ExternalImageFormatProperties::default();
        let mut image_format_props =
            ImageFormatProperties2::default().push_next(&mut external_image_format_props);
        let res = unsafe {
            self.instance.get_physical_device_image_format_properties2(
                phy_dev,
                &image_format_info,
                &mut image_format_props,
            )
        };
        if let Err(e) = res {
            return match e {
                vk::Result::ERROR_FORMAT_NOT_SUPPORTED => Ok(None),
                _ => Err(VulkanError::LoadImageProperties(e)),
            };
        }
        let max_extent = VulkanMaxExtent {
            width: image_format_props.image_format_properties.max_extent.width,
            height: image_format_props.image_format_properties.max_extent.height,
        };
        let importable = external_image_format_props
            .external_memory_properties
            .external_memory_features
            .contains(ExternalMemoryFeatureFlags::IMPORTABLE);
        if !importable {
            return Ok(None);
        }
        Ok(Some(max_extent))
    }
}
