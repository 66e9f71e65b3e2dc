pub mod bo;
pub mod device;
pub mod format;
pub mod instance;
pub mod util;

use {
    crate::{
        backend::{
            BACKEND_ABI_VERSION, BO_USE_PROTECTED, BO_USE_WRITE, BackendError, BufferUsage,
            GbmBackend, GbmBo, GbmDevice, GbmSurface, UnsupportedOp,
        },
        format::canonicalize_format,
        utils::oserror::OsError,
        video::{Drm, Modifier},
        vulkan::{device::VulkanDevice, instance::VulkanInstance},
    },
    ash::{LoadingError, vk},
    once_cell::sync::Lazy,
    std::{ffi::CStr, rc::Rc, sync::Arc},
    thiserror::Error,
    uapi::{OwnedFd, c::dev_t},
};

#[derive(Debug, Error)]
pub enum VulkanError {
    #[error("Could not load libvulkan.so")]
    Load(#[source] Arc<LoadingError>),
    #[error("Could not list instance layers")]
    InstanceLayers(#[source] vk::Result),
    #[error("Could not create an instance")]
    CreateInstance(#[source] vk::Result),
    #[error("Could not fstat the DRM FD")]
    Fstat(#[source] OsError),
    #[error("Could not enumerate the physical devices")]
    EnumeratePhysicalDevices(#[source] vk::Result),
    #[error("Could not list device extensions")]
    DeviceExtensions(#[source] vk::Result),
    #[error("Could not find a vulkan device that matches dev_t {0}")]
    NoDeviceFound(dev_t),
    #[error("Missing required device extension {0:?}")]
    MissingDeviceExtension(&'static CStr),
    #[error("Device does not have a graphics queue")]
    NoGraphicsQueue,
    #[error("Could not create the device")]
    CreateDevice(#[source] vk::Result),
    #[error("Could not load image properties")]
    LoadImageProperties(#[source] vk::Result),
    #[error("The format {0:#010x} is not supported")]
    FormatNotSupported(u32),
    #[error("BO_USE_WRITE and BO_USE_PROTECTED buffers are not supported")]
    UnsupportedBufferUsage,
    #[error("None of the supplied modifiers are supported")]
    NoSupportedModifiers,
    #[error("Could not create the image")]
    CreateImage(#[source] vk::Result),
    #[error("There is no matching memory type")]
    MemoryType,
    #[error("Could not allocate memory")]
    AllocateMemory(#[source] vk::Result),
    #[error("Could not bind memory to the image")]
    BindImageMemory(#[source] vk::Result),
    #[error("Could not retrieve the image modifier")]
    GetModifier(#[source] vk::Result),
    #[error("Vulkan allocated the image with an invalid modifier {0:#018x}")]
    InvalidModifier(Modifier),
    #[error("Could not export the dma-buf")]
    ExportDmaBuf(#[source] vk::Result),
}

pub static VULKAN_GBM_VALIDATION: Lazy<bool> =
    Lazy::new(|| std::env::var("VULKAN_GBM_VALIDATION").ok().as_deref() == Some("1"));

/// Returns the entry point of this backend.
pub fn backend() -> &'static dyn GbmBackend {
    &VulkanBackend
}

pub struct VulkanBackend;

impl GbmBackend for VulkanBackend {
    fn version(&self) -> u32 {
        BACKEND_ABI_VERSION
    }

    fn name(&self) -> &'static str {
        "vulkan"
    }

    fn create_device(
        &self,
        fd: Rc<OwnedFd>,
        backend_version: u32,
    ) -> Result<Rc<dyn GbmDevice>, BackendError> {
        let drm = Drm::open_existing(fd).map_err(VulkanError::Fstat)?;
        let instance = VulkanInstance::new(*VULKAN_GBM_VALIDATION)?;
        let device = instance.create_device(&drm)?;
        Ok(Rc::new(VulkanGbmDevice {
            device,
            drm,
            backend_version,
        }))
    }
}

pub struct VulkanGbmDevice {
    device: Rc<VulkanDevice>,
    drm: Drm,
    backend_version: u32,
}

impl GbmDevice for VulkanGbmDevice {
    fn fd(&self) -> &Rc<OwnedFd> {
        self.drm.fd()
    }

    fn backend_name(&self) -> &'static str {
        "vulkan"
    }

    fn backend_version(&self) -> u32 {
        self.backend_version
    }

    fn is_format_supported(&self, format: u32, usage: BufferUsage) -> bool {
        if usage.intersects(BO_USE_WRITE | BO_USE_PROTECTED) {
            return false;
        }
        let format = canonicalize_format(format);
        self.device.formats.contains_key(&format)
    }

    fn format_modifier_plane_count(&self, format: u32, modifier: Modifier) -> usize {
        let format = canonicalize_format(format);
        self.device
            .formats
            .get(&format)
            .and_then(|f| f.find_modifier(modifier, false))
            .map(|m| m.planes)
            .unwrap_or(0)
    }

    fn create_bo(
        &self,
        width: u32,
        height: u32,
        format: u32,
        usage: BufferUsage,
        modifiers: &[Modifier],
    ) -> Result<Rc<dyn GbmBo>, BackendError> {
        let format = canonicalize_format(format);
        let bo = self
            .device
            .create_bo(width, height, format, usage, modifiers)?;
        Ok(bo)
    }

    fn import_bo(
        &self,
        _fd: &Rc<OwnedFd>,
        _usage: BufferUsage,
    ) -> Result<Rc<dyn GbmBo>, BackendError> {
        Err(BackendError::Unsupported(UnsupportedOp::BoImport))
    }

    fn create_surface(
        &self,
        _width: u32,
        _height: u32,
        _format: u32,
        _usage: BufferUsage,
        _modifiers: &[Modifier],
    ) -> Result<Rc<dyn GbmSurface>, BackendError> {
        Err(BackendError::Unsupported(UnsupportedOp::SurfaceCreate))
    }
}
