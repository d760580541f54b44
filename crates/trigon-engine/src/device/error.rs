use crate::frame::FrameError;

/// High-level response after a surface error.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum SurfaceErrorAction {
    /// Surface was reconfigured; rendering may resume next frame.
    Reconfigured,
    /// Transient error; skip the current frame.
    SkipFrame,
    /// Fatal error (commonly OOM); the frame loop must stop.
    Fatal,
}

impl SurfaceErrorAction {
    /// Folds the action into the `begin_render` result: skip or fail.
    pub(crate) fn into_frame_result<T>(
        self,
        err: wgpu::SurfaceError,
    ) -> Result<Option<T>, FrameError> {
        match self {
            Self::Reconfigured | Self::SkipFrame => {
                log::debug!("skipping frame after surface error: {err}");
                Ok(None)
            }
            Self::Fatal => Err(FrameError::DeviceLost(err.to_string())),
        }
    }
}
