use {
    crate::{
        utils::errorfmt::ErrorFmt,
        video::Drm,
        vulkan::{
            VulkanError,
            format::VulkanFormat,
            instance::{
                API_VERSION, ApiVersionDisplay, Extensions, VulkanInstance,
                map_extension_properties,
            },
        },
    },
    ahash::AHashMap,
    arrayvec::ArrayVec,
    ash::{
        Device,
        ext::{external_memory_dma_buf, image_drm_format_modifier, physical_device_drm},
        khr::{driver_properties, external_memory_fd},
        vk::{
            DeviceCreateInfo, DeviceQueueCreateInfo, MAX_MEMORY_TYPES, MemoryPropertyFlags,
            MemoryType, PhysicalDevice, PhysicalDeviceDriverProperties,
            PhysicalDeviceDrmPropertiesEXT, PhysicalDeviceProperties, PhysicalDeviceProperties2,
            PhysicalDeviceType, QueueFlags,
        },
    },
    isnt::std_1::collections::IsntHashMapExt,
    std::{ffi::CStr, rc::Rc, slice},
    uapi::Ustr,
};

pub struct VulkanDevice {
    pub(super) _instance: Rc<VulkanInstance>,
    pub(super) device: Device,
    pub(super) external_memory_fd: external_memory_fd::Device,
    pub(super) image_drm_format_modifier: image_drm_format_modifier::Device,
    pub(super) formats: AHashMap<u32, VulkanFormat>,
    pub(super) memory_types: ArrayVec<MemoryType, MAX_MEMORY_TYPES>,
}

impl Drop for VulkanDevice {
    fn drop(&mut self) {
        unsafe {
            self.device.destroy_device(None);
        }
    }
}

impl VulkanDevice {
    pub(super) fn find_memory_type(
        &self,
        flags: MemoryPropertyFlags,
        memory_type_bits: u32,
    ) -> Option<u32> {
        for (idx, ty) in self.memory_types.iter().enumerate() {
            if memory_type_bits & (1 << idx as u32) != 0 {
                if ty.property_flags.contains(flags) {
                    return Some(idx as _);
                }
            }
        }
        None
    }
}

impl VulkanInstance {
    fn get_device_extensions(&self, phy_dev: PhysicalDevice) -> Result<Extensions, VulkanError> {
        unsafe {
            self.instance
                .enumerate_device_extension_properties(phy_dev)
                .map(map_extension_properties)
                .map_err(VulkanError::DeviceExtensions)
        }
    }

    fn find_dev(&self, drm: &Drm) -> Result<PhysicalDevice, VulkanError> {
        let dev = drm.dev();
        log::info!(
            "Searching for vulkan device with devnum {}:{}",
            uapi::major(dev),
            uapi::minor(dev)
        );
        let phy_devs = match unsafe { self.instance.enumerate_physical_devices() } {
            Ok(d) => d,
            Err(e) => return Err(VulkanError::EnumeratePhysicalDevices(e)),
        };
        if phy_devs.is_empty() {
            log::warn!("There are no physical vulkan devices");
        }
        let mut chosen = None;
        for phy_dev in phy_devs {
            let props = unsafe { self.instance.get_physical_device_properties(phy_dev) };
            let extensions = match self.get_device_extensions(phy_dev) {
                Ok(e) => e,
                Err(e) => {
                    log::error!(
                        "Could not enumerate extensions of device with id {}: {}",
                        props.device_id,
                        ErrorFmt(e),
                    );
                    continue;
                }
            };
            if extensions.not_contains_key(physical_device_drm::NAME) {
                log::warn!(
                    "Device with id {} does not support the VK_EXT_physical_device_drm extension",
                    props.device_id,
                );
                continue;
            }
            let has_driver_props = extensions.contains_key(driver_properties::NAME);
            let mut drm_props = PhysicalDeviceDrmPropertiesEXT::default();
            let mut driver_props = PhysicalDeviceDriverProperties::default();
            let mut props2 = PhysicalDeviceProperties2::default().push_next(&mut drm_props);
            if has_driver_props {
                props2 = props2.push_next(&mut driver_props);
            }
            unsafe {
                self.instance
                    .get_physical_device_properties2(phy_dev, &mut props2);
            }
            log::info!("-----");
            log_device(&props, has_driver_props.then_some(&driver_props));
            if chosen.is_some() {
                continue;
            }
            let primary_dev =
                uapi::makedev(drm_props.primary_major as _, drm_props.primary_minor as _);
            let render_dev =
                uapi::makedev(drm_props.render_major as _, drm_props.render_minor as _);
            if primary_dev == dev || render_dev == dev {
                log::info!("Device with id {} matches", props.device_id);
                chosen = Some(phy_dev);
            }
        }
        chosen.ok_or(VulkanError::NoDeviceFound(dev))
    }

    fn find_graphics_queue(&self, phy_dev: PhysicalDevice) -> Result<u32, VulkanError> {
        let props = unsafe {
            self.instance
                .get_physical_device_queue_family_properties(phy_dev)
        };
        props
            .iter()
            .position(|p| p.queue_flags.contains(QueueFlags::GRAPHICS))
            .map(|v| v as _)
            .ok_or(VulkanError::NoGraphicsQueue)
    }

    pub fn create_device(self: &Rc<Self>, drm: &Drm) -> Result<Rc<VulkanDevice>, VulkanError> {
        let phy_dev = self.find_dev(drm)?;
        let extensions = self.get_device_extensions(phy_dev)?;
        for &ext in REQUIRED_DEVICE_EXTENSIONS {
            if extensions.not_contains_key(ext) {
                return Err(VulkanError::MissingDeviceExtension(ext));
            }
        }
        let graphics_queue_idx = self.find_graphics_queue(phy_dev)?;
        let enabled_extensions: Vec<_> = REQUIRED_DEVICE_EXTENSIONS
            .iter()
            .map(|n| n.as_ptr())
            .collect();
        let queue_priorities = [1.0];
        let queue_create_info = DeviceQueueCreateInfo::default()
            .queue_family_index(graphics_queue_idx)
            .queue_priorities(&queue_priorities);
        let device_create_info = DeviceCreateInfo::default()
            .queue_create_infos(slice::from_ref(&queue_create_info))
            .enabled_extension_names(&enabled_extensions);
        let device = unsafe {
            self.instance
                .create_device(phy_dev, &device_create_info, None)
        };
        let device = match device {
            Ok(d) => d,
            Err(e) => return Err(VulkanError::CreateDevice(e)),
        };
        let formats = self.load_formats(phy_dev);
        let external_memory_fd = external_memory_fd::Device::new(&self.instance, &device);
        let image_drm_format_modifier =
            image_drm_format_modifier::Device::new(&self.instance, &device);
        let memory_properties =
            unsafe { self.instance.get_physical_device_memory_properties(phy_dev) };
        let memory_types = memory_properties.memory_types
            [..memory_properties.memory_type_count as _]
            .iter()
            .copied()
            .collect();
        Ok(Rc::new(VulkanDevice {
            _instance: self.clone(),
            device,
            external_memory_fd,
            image_drm_format_modifier,
            formats,
            memory_types,
        }))
    }
}

const REQUIRED_DEVICE_EXTENSIONS: &[&CStr] = &[
    external_memory_fd::NAME,
    external_memory_dma_buf::NAME,
    image_drm_format_modifier::NAME,
];

fn device_type_str(ty: PhysicalDeviceType) -> &'static str {
    match ty {
        PhysicalDeviceType::INTEGRATED_GPU => "integrated",
        PhysicalDeviceType::DISCRETE_GPU => "discrete",
        PhysicalDeviceType::VIRTUAL_GPU => "vgpu",
        PhysicalDeviceType::CPU => "cpu",
        _ => "unknown",
    }
}

fn log_device(
    props: &PhysicalDeviceProperties,
    driver_props: Option<&PhysicalDeviceDriverProperties>,
) {
    log::info!("  api version: {}", ApiVersionDisplay(props.api_version));
    log::info!(
        "  driver version: {}",
        ApiVersionDisplay(props.driver_version)
    );
    log::info!("  vendor id: {}", props.vendor_id);
    log::info!("  device id: {}", props.device_id);
    log::info!("  device type: {}", device_type_str(props.device_type));
    unsafe {
        log::info!(
            "  device name: {}",
            Ustr::from_ptr(props.device_name.as_ptr()).display()
        );
    }
    if props.api_version < API_VERSION {
        log::warn!("  device does not support vulkan 1.1");
    }
    if let Some(driver_props) = driver_props {
        unsafe {
            log::info!(
                "  driver: {} ({})",
                Ustr::from_ptr(driver_props.driver_name.as_ptr()).display(),
                Ustr::from_ptr(driver_props.driver_info.as_ptr()).display()
            );
        }
    }
}
