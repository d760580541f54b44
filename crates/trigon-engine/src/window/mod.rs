//! Window + message pump.
//!
//! Owns the `winit` EventLoop and Window, and wires them to the GPU layer.

mod runtime;

pub use runtime::{RuntimeConfig, WinitHost};
