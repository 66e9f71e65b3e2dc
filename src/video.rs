use {
    crate::utils::oserror::OsError,
    arrayvec::ArrayVec,
    std::rc::Rc,
    uapi::{OwnedFd, c},
};

pub type Modifier = u64;

pub const LINEAR_MODIFIER: Modifier = 0;
pub const INVALID_MODIFIER: Modifier = 0x00ff_ffff_ffff_ffff;

pub const MAX_PLANES: usize = 4;

pub type PlaneVec<T> = ArrayVec<T, MAX_PLANES>;

/// A DRM device node together with its `dev_t` identity.
pub struct Drm {
    fd: Rc<OwnedFd>,
    dev: c::dev_t,
}

impl Drm {
    pub fn open_existing(fd: Rc<OwnedFd>) -> Result<Self, OsError> {
        let stat = uapi::fstat(fd.raw()).map_err(OsError::from)?;
        Ok(Self {
            fd,
            dev: stat.st_rdev,
        })
    }

    pub fn dev(&self) -> c::dev_t {
        self.dev
    }

    pub fn fd(&self) -> &Rc<OwnedFd> {
        &self.fd
    }

    pub fn raw(&self) -> c::c_int {
        self.fd.raw()
    }
}
