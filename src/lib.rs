#[macro_use]
mod macros;

pub mod backend;
pub mod format;
pub mod utils;
pub mod video;
pub mod vulkan;
