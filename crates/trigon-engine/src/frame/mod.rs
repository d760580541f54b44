//! Per-frame command recording, submission and the host message loop.

pub mod command;
pub mod engine;
pub mod message_loop;
pub mod replay;
pub mod submitter;

pub use command::{CommandList, DrawIndexedArgs, RenderCommand};
pub use engine::{FrameError, GraphicsEngine};
pub use message_loop::{Host, LoopSummary, Message, run_message_loop};
pub use replay::{ReplayError, replay, validate_order};
pub use submitter::{DrawBindings, FrameState, FrameSubmitter};
