use thiserror::Error;

use crate::resource::ResourceRegistry;

use super::command::CommandList;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FrameError {
    #[error("graphics device lost: {0}")]
    DeviceLost(String),
}

/// The device/swapchain owner the frame loop renders through.
///
/// It hands out a command list each frame and takes it back for submission
/// and presentation.
pub trait GraphicsEngine {
    /// Acquires a command list for this frame.
    ///
    /// `Ok(None)` means the frame cannot be rendered this tick and should be
    /// skipped.
    fn begin_render(&mut self) -> Result<Option<CommandList>, FrameError>;

    /// Submits and presents the recorded list.
    fn end_render(&mut self, list: CommandList, resources: &ResourceRegistry);
}
