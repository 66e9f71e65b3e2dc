pub mod errorfmt;
pub mod oserror;
