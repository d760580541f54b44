use std::fmt;

use thiserror::Error;

use super::shader::ShaderStage;

/// Startup step a [`PipelineSetupError`] originated from.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum SetupStage {
    ShaderCompile,
    RootSignature,
    PipelineState,
    ResourceAllocation,
    DrawValidation,
}

impl fmt::Display for SetupStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SetupStage::ShaderCompile => "shader compilation",
            SetupStage::RootSignature => "root signature creation",
            SetupStage::PipelineState => "pipeline state creation",
            SetupStage::ResourceAllocation => "buffer allocation",
            SetupStage::DrawValidation => "draw validation",
        };
        f.write_str(name)
    }
}

/// Errors raised while building the pipeline and its resources.
///
/// Every input to startup is static, so none of these are retryable.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PipelineSetupError {
    #[error("{stage} shader failed to compile: {message}")]
    ShaderCompileFailed { stage: ShaderStage, message: String },

    #[error("root signature rejected: {0}")]
    RootSignatureFailed(String),

    #[error("pipeline state rejected: {0}")]
    PipelineStateFailed(String),

    #[error("failed to allocate {what}: {message}")]
    ResourceAllocationFailed { what: &'static str, message: String },

    #[error("index {index} at position {position} is out of bounds for {vertex_count} vertices")]
    IndexOutOfBounds {
        index: u32,
        position: usize,
        vertex_count: u32,
    },

    #[error("invalid draw: {0}")]
    InvalidDraw(String),
}

impl PipelineSetupError {
    /// Returns the startup step that failed.
    pub fn stage(&self) -> SetupStage {
        match self {
            PipelineSetupError::ShaderCompileFailed { .. } => SetupStage::ShaderCompile,
            PipelineSetupError::RootSignatureFailed(_) => SetupStage::RootSignature,
            PipelineSetupError::PipelineStateFailed(_) => SetupStage::PipelineState,
            PipelineSetupError::ResourceAllocationFailed { .. } => SetupStage::ResourceAllocation,
            PipelineSetupError::IndexOutOfBounds { .. } | PipelineSetupError::InvalidDraw(_) => {
                SetupStage::DrawValidation
            }
        }
    }
}

/// Runs `create` inside a validation + out-of-memory error scope and returns
/// the first device error it raised, if any.
pub(crate) fn capture_device_error<T>(
    device: &wgpu::Device,
    create: impl FnOnce() -> T,
) -> (T, Option<wgpu::Error>) {
    let oom = device.push_error_scope(wgpu::ErrorFilter::OutOfMemory);
    let validation = device.push_error_scope(wgpu::ErrorFilter::Validation);
    let value = create();
    let validation_err = pollster::block_on(validation.pop());
    let oom_err = pollster::block_on(oom.pop());
    (value, validation_err.or(oom_err))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stage_names_the_failed_step() {
        let err = PipelineSetupError::ShaderCompileFailed {
            stage: ShaderStage::Pixel,
            message: "boom".into(),
        };
        assert_eq!(err.stage(), SetupStage::ShaderCompile);
        assert_eq!(err.to_string(), "pixel shader failed to compile: boom");

        let err = PipelineSetupError::IndexOutOfBounds {
            index: 3,
            position: 2,
            vertex_count: 3,
        };
        assert_eq!(err.stage(), SetupStage::DrawValidation);
        assert_eq!(err.stage().to_string(), "draw validation");
    }
}
