//! Trigon engine crate.
//!
//! A minimal GPU frontend: pipeline construction, buffer upload, per-frame
//! command recording, and the platform + GPU runtime that presents it.

pub mod device;
pub mod frame;
pub mod logging;
pub mod pipeline;
pub mod resource;
pub mod window;
