use {
    crate::{
        backend::{
            BO_USE_PROTECTED, BO_USE_RENDERING, BO_USE_WRITE, BackendError, BufferUsage, GbmBo,
            MappedBuffer, UnsupportedOp,
        },
        format::Format,
        video::{Modifier, PlaneVec},
        vulkan::{VulkanError, device::VulkanDevice, format::VulkanFormat, util::OnDrop},
    },
    ash::vk::{
        DeviceMemory, ExportMemoryAllocateInfo, Extent3D, ExternalMemoryHandleTypeFlags,
        ExternalMemoryImageCreateInfo, Handle, Image, ImageAspectFlags, ImageCreateInfo,
        ImageDrmFormatModifierListCreateInfoEXT, ImageDrmFormatModifierPropertiesEXT, ImageLayout,
        ImageMemoryRequirementsInfo2, ImageSubresource, ImageTiling, ImageType, ImageUsageFlags,
        MemoryAllocateInfo, MemoryDedicatedAllocateInfo, MemoryGetFdInfoKHR, MemoryPropertyFlags,
        MemoryRequirements2, SampleCountFlags, SharingMode,
    },
    std::rc::Rc,
    uapi::OwnedFd,
};

#[cfg(test)]
mod tests;

impl From<VulkanError> for BackendError {
    fn from(value: VulkanError) -> Self {
        Self::Backend(Box::new(value))
    }
}

pub struct VulkanBo {
    device: Rc<VulkanDevice>,
    image: Image,
    memory: DeviceMemory,
    width: u32,
    height: u32,
    format: &'static Format,
    modifier: Modifier,
    planes: PlaneVec<BoPlane>,
}

#[derive(Copy, Clone, Debug)]
pub struct BoPlane {
    pub offset: u32,
    pub stride: u32,
}

impl Drop for VulkanBo {
    fn drop(&mut self) {
        unsafe {
            self.device.device.free_memory(self.memory, None);
            self.device.device.destroy_image(self.image, None);
        }
    }
}

impl VulkanDevice {
    pub(super) fn create_bo(
        self: &Rc<Self>,
        width: u32,
        height: u32,
        format: u32,
        usage: BufferUsage,
        modifiers: &[Modifier],
    ) -> Result<Rc<VulkanBo>, VulkanError> {
        validate_usage(usage)?;
        let Some(format) = self.formats.get(&format) else {
            return Err(VulkanError::FormatNotSupported(format));
        };
        let render = usage.contains(BO_USE_RENDERING);
        let mods = filter_modifiers(format, width, height, render, modifiers);
        if mods.is_empty() {
            return Err(VulkanError::NoSupportedModifiers);
        }
        let image = {
            let mut mod_list =
                ImageDrmFormatModifierListCreateInfoEXT::default().drm_format_modifiers(&mods);
            let mut memory_image_create_info = ExternalMemoryImageCreateInfo::default()
                .handle_types(ExternalMemoryHandleTypeFlags::DMA_BUF_EXT);
            let create_info = ImageCreateInfo::default()
                .image_type(ImageType::TYPE_2D)
                .format(format.format.vk_format)
                .mip_levels(1)
                .array_layers(1)
                .tiling(ImageTiling::DRM_FORMAT_MODIFIER_EXT)
                .samples(SampleCountFlags::TYPE_1)
                .sharing_mode(SharingMode::EXCLUSIVE)
                .initial_layout(ImageLayout::UNDEFINED)
                .extent(Extent3D {
                    width,
                    height,
                    depth: 1,
                })
                .usage(ImageUsageFlags::SAMPLED)
                .push_next(&mut memory_image_create_info)
                .push_next(&mut mod_list);
            let res = unsafe { self.device.create_image(&create_info, None) };
            res.map_err(VulkanError::CreateImage)?
        };
        let destroy_image = OnDrop(|| unsafe { self.device.destroy_image(image, None) });
        let memory = {
            let image_memory_requirements_info =
                ImageMemoryRequirementsInfo2::default().image(image);
            let mut memory_requirements = MemoryRequirements2::default();
            unsafe {
                self.device.get_image_memory_requirements2(
                    &image_memory_requirements_info,
                    &mut memory_requirements,
                );
            }
            let memory_type_index = self
                .find_memory_type(
                    MemoryPropertyFlags::DEVICE_LOCAL,
                    memory_requirements.memory_requirements.memory_type_bits,
                )
                .ok_or(VulkanError::MemoryType)?;
            let mut memory_dedicated_allocate_info =
                MemoryDedicatedAllocateInfo::default().image(image);
            let mut export_info = ExportMemoryAllocateInfo::default()
                .handle_types(ExternalMemoryHandleTypeFlags::DMA_BUF_EXT);
            let memory_allocate_info = MemoryAllocateInfo::default()
                .allocation_size(memory_requirements.memory_requirements.size)
                .memory_type_index(memory_type_index)
                .push_next(&mut memory_dedicated_allocate_info)
                .push_next(&mut export_info);
            let memory = unsafe { self.device.allocate_memory(&memory_allocate_info, None) };
            memory.map_err(VulkanError::AllocateMemory)?
        };
        let destroy_memory = OnDrop(|| unsafe { self.device.free_memory(memory, None) });
        unsafe {
            self.device
                .bind_image_memory(image, memory, 0)
                .map_err(VulkanError::BindImageMemory)?;
        }
        let modifier = {
            let mut props = ImageDrmFormatModifierPropertiesEXT::default();
            unsafe {
                self.image_drm_format_modifier
                    .get_image_drm_format_modifier_properties(image, &mut props)
                    .map_err(VulkanError::GetModifier)?;
            }
            props.drm_format_modifier
        };
        let Some(modifier_props) = format.find_modifier(modifier, render) else {
            return Err(VulkanError::InvalidModifier(modifier));
        };
        let mut planes = PlaneVec::new();
        for plane in 0..modifier_props.planes {
            let aspect = plane_aspect(plane).ok_or(VulkanError::InvalidModifier(modifier))?;
            let layout = unsafe {
                self.device.get_image_subresource_layout(
                    image,
                    ImageSubresource::default().aspect_mask(aspect),
                )
            };
            planes.push(BoPlane {
                offset: layout.offset as _,
                stride: layout.row_pitch as _,
            });
        }
        destroy_image.forget();
        destroy_memory.forget();
        Ok(Rc::new(VulkanBo {
            device: self.clone(),
            image,
            memory,
            width,
            height,
            format: format.format,
            modifier,
            planes,
        }))
    }
}

impl VulkanBo {
    /// Exports the memory object as a dma-buf. Every call creates a new file
    /// descriptor.
    fn export_dmabuf_fd(&self) -> Result<OwnedFd, VulkanError> {
        let get_info = MemoryGetFdInfoKHR::default()
            .handle_type(ExternalMemoryHandleTypeFlags::DMA_BUF_EXT)
            .memory(self.memory);
        let fd = unsafe { self.device.external_memory_fd.get_memory_fd(&get_info) };
        fd.map_err(VulkanError::ExportDmaBuf).map(OwnedFd::new)
    }
}

impl GbmBo for VulkanBo {
    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn format(&self) -> u32 {
        self.format.drm
    }

    fn modifier(&self) -> Modifier {
        self.modifier
    }

    fn plane_count(&self) -> usize {
        self.planes.len()
    }

    fn export_fd(&self) -> Result<OwnedFd, BackendError> {
        Ok(self.export_dmabuf_fd()?)
    }

    fn plane_fd(&self, plane: usize) -> Result<OwnedFd, BackendError> {
        if plane >= self.planes.len() {
            return Err(BackendError::PlaneOutOfBounds {
                plane,
                planes: self.planes.len(),
            });
        }
        Ok(self.export_dmabuf_fd()?)
    }

    fn offset(&self, plane: usize) -> u32 {
        self.planes.get(plane).map(|p| p.offset).unwrap_or(0)
    }

    fn stride(&self, plane: usize) -> u32 {
        self.planes.get(plane).map(|p| p.stride).unwrap_or(0)
    }

    fn plane_handle(&self, plane: usize) -> u64 {
        if plane >= self.planes.len() {
            return 0;
        }
        self.image.as_raw()
    }

    fn write(&self, _data: &[u8]) -> Result<(), BackendError> {
        Err(BackendError::Unsupported(UnsupportedOp::BoWrite))
    }

    fn map_read(self: Rc<Self>) -> Result<Box<dyn MappedBuffer>, BackendError> {
        Err(BackendError::Unsupported(UnsupportedOp::BoMap))
    }

    fn map_write(self: Rc<Self>) -> Result<Box<dyn MappedBuffer>, BackendError> {
        Err(BackendError::Unsupported(UnsupportedOp::BoMap))
    }
}

fn validate_usage(usage: BufferUsage) -> Result<(), VulkanError> {
    if usage.intersects(BO_USE_WRITE | BO_USE_PROTECTED) {
        return Err(VulkanError::UnsupportedBufferUsage);
    }
    Ok(())
}

/// Restricts the caller-supplied modifiers to those that the device supports
/// for this format, usage class, and image size. The order of the list is
/// preserved so that the driver sees the caller's preferences.
fn filter_modifiers(
    format: &VulkanFormat,
    width: u32,
    height: u32,
    render: bool,
    modifiers: &[Modifier],
) -> Vec<Modifier> {
    let mut mods = vec![];
    for &modifier in modifiers {
        let Some(props) = format.find_modifier(modifier, render) else {
            continue;
        };
        if props.max_extent.width < width || props.max_extent.height < height {
            continue;
        }
        mods.push(modifier);
    }
    mods
}

fn plane_aspect(plane: usize) -> Option<ImageAspectFlags> {
    let aspect = match plane {
        0 => ImageAspectFlags::MEMORY_PLANE_0_EXT,
        1 => ImageAspectFlags::MEMORY_PLANE_1_EXT,
        2 => ImageAspectFlags::MEMORY_PLANE_2_EXT,
        3 => ImageAspectFlags::MEMORY_PLANE_3_EXT,
        _ => return None,
    };
    Some(aspect)
}
