use {
    crate::video::Modifier,
    std::{
        error::Error,
        fmt::{Display, Formatter},
        rc::Rc,
    },
    thiserror::Error,
    uapi::OwnedFd,
};

/// The version of the host-facing interface implemented by this crate.
///
/// Hosts are expected to reject backends whose version does not match the one
/// they were compiled against.
pub const BACKEND_ABI_VERSION: u32 = 1;

bitflags! {
    BufferUsage: u32;
        BO_USE_SCANOUT = 1 << 0,
        BO_USE_CURSOR = 1 << 1,
        BO_USE_RENDERING = 1 << 2,
        BO_USE_WRITE = 1 << 3,
        BO_USE_LINEAR = 1 << 4,
        BO_USE_PROTECTED = 1 << 5,
}

/// Operations that a backend can legitimately not implement.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum UnsupportedOp {
    BoImport,
    BoMap,
    BoWrite,
    SurfaceCreate,
}

impl Display for UnsupportedOp {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            UnsupportedOp::BoImport => "bo_import",
            UnsupportedOp::BoMap => "bo_map",
            UnsupportedOp::BoWrite => "bo_write",
            UnsupportedOp::SurfaceCreate => "surface_create",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Error)]
pub enum BackendError {
    #[error("The {0} operation is not implemented by this backend")]
    Unsupported(UnsupportedOp),
    #[error("Plane {plane} is out of bounds for a buffer with {planes} planes")]
    PlaneOutOfBounds { plane: usize, planes: usize },
    #[error(transparent)]
    Backend(Box<dyn Error + Send>),
}

/// The entry point of a buffer allocation backend.
pub trait GbmBackend {
    fn version(&self) -> u32;

    fn name(&self) -> &'static str;

    /// Creates a device on top of an open DRM device node.
    ///
    /// `backend_version` is the interface version the host was compiled
    /// against. It is stored on the device so that the host can query it back
    /// but does not otherwise affect the behavior of this crate.
    fn create_device(
        &self,
        fd: Rc<OwnedFd>,
        backend_version: u32,
    ) -> Result<Rc<dyn GbmDevice>, BackendError>;
}

pub trait GbmDevice {
    fn fd(&self) -> &Rc<OwnedFd>;

    fn backend_name(&self) -> &'static str;

    fn backend_version(&self) -> u32;

    /// Returns whether buffers with this format/usage combination can be
    /// allocated on this device.
    fn is_format_supported(&self, format: u32, usage: BufferUsage) -> bool;

    /// Returns the number of memory planes of buffers created with this
    /// format/modifier pair, or 0 if the pair is not supported.
    fn format_modifier_plane_count(&self, format: u32, modifier: Modifier) -> usize;

    fn create_bo(
        &self,
        width: u32,
        height: u32,
        format: u32,
        usage: BufferUsage,
        modifiers: &[Modifier],
    ) -> Result<Rc<dyn GbmBo>, BackendError>;

    fn import_bo(
        &self,
        fd: &Rc<OwnedFd>,
        usage: BufferUsage,
    ) -> Result<Rc<dyn GbmBo>, BackendError>;

    fn create_surface(
        &self,
        width: u32,
        height: u32,
        format: u32,
        usage: BufferUsage,
        modifiers: &[Modifier],
    ) -> Result<Rc<dyn GbmSurface>, BackendError>;
}

pub trait GbmBo {
    fn width(&self) -> u32;

    fn height(&self) -> u32;

    fn format(&self) -> u32;

    fn modifier(&self) -> Modifier;

    fn plane_count(&self) -> usize;

    /// Exports the memory backing this buffer as a dma-buf.
    ///
    /// Each call creates a new file descriptor owned by the caller.
    fn export_fd(&self) -> Result<OwnedFd, BackendError>;

    /// Exports the memory backing a single plane as a dma-buf.
    ///
    /// All planes of a buffer share one memory object, therefore the returned
    /// file descriptor refers to the same memory for every plane.
    fn plane_fd(&self, plane: usize) -> Result<OwnedFd, BackendError>;

    /// Returns the offset of a plane or 0 if the plane is out of bounds.
    fn offset(&self, plane: usize) -> u32;

    /// Returns the stride of a plane or 0 if the plane is out of bounds.
    fn stride(&self, plane: usize) -> u32;

    /// Returns an opaque, non-zero per-buffer value or 0 if the plane is out
    /// of bounds. The value is not a KMS handle.
    fn plane_handle(&self, plane: usize) -> u64;

    fn write(&self, data: &[u8]) -> Result<(), BackendError>;

    fn map_read(self: Rc<Self>) -> Result<Box<dyn MappedBuffer>, BackendError>;

    fn map_write(self: Rc<Self>) -> Result<Box<dyn MappedBuffer>, BackendError>;
}

/// A CPU mapping of a buffer object.
pub trait MappedBuffer {
    fn data(&self) -> &[u8];

    fn stride(&self) -> u32;
}

pub trait GbmSurface {
    fn lock_front_buffer(&self) -> Result<Rc<dyn GbmBo>, BackendError>;

    fn release_buffer(&self, bo: Rc<dyn GbmBo>);

    fn has_free_buffers(&self) -> bool;
}

#[test]
fn buffer_usage_ops() {
    let usage = BO_USE_SCANOUT | BO_USE_RENDERING;
    assert!(usage.contains(BO_USE_SCANOUT));
    assert!(!usage.contains(BO_USE_SCANOUT | BO_USE_CURSOR));
    assert!(usage.intersects(BO_USE_CURSOR | BO_USE_RENDERING));
    assert!(!usage.intersects(BO_USE_WRITE | BO_USE_PROTECTED));
    assert_eq!(usage & !BO_USE_RENDERING, BO_USE_SCANOUT);
}

#[test]
fn unsupported_ops_name_the_entry_point() {
    assert_eq!(UnsupportedOp::BoImport.to_string(), "bo_import");
    assert_eq!(UnsupportedOp::BoMap.to_string(), "bo_map");
    assert_eq!(UnsupportedOp::BoWrite.to_string(), "bo_write");
    assert_eq!(UnsupportedOp::SurfaceCreate.to_string(), "surface_create");
    assert_eq!(
        BackendError::Unsupported(UnsupportedOp::BoMap).to_string(),
        "The bo_map operation is not implemented by this backend",
    );
}
