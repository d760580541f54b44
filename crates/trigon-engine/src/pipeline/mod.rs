//! Pipeline construction: shaders, root signature, and pipeline state.
//!
//! Everything here runs once at startup. Failures are fatal and surface as
//! [`PipelineSetupError`].

mod error;
mod factory;
pub mod root_signature;
pub mod shader;
pub mod state;

pub(crate) use error::capture_device_error;
pub use error::{PipelineSetupError, SetupStage};
pub use factory::{PipelineState, PipelineStateFactory};
pub use root_signature::{
    RootSignature, RootSignatureBuilder, RootSignatureFlags, RootSignatureVersion,
    SerializedRootSignature,
};
pub use shader::{CompileOptions, ShaderBlob, ShaderCompiler, ShaderProfile, ShaderStage};
pub use state::{
    BlendState, CullMode, DepthStencilState, FillMode, InputClassification, InputElement,
    PipelineStateDescriptor, PrimitiveTopologyType, RasterizerState, RenderTargetBlend,
    SampleDesc,
};
