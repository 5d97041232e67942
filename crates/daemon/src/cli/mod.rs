pub mod args;
pub mod op;
pub mod ops;

pub use ops::{Caps, Daemon, Get, Health, Init, Mkdir, Mv, Put, Rm, Version};
