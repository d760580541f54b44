use std::borrow::Cow;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use naga::back::spv;
use thiserror::Error;

use super::error::PipelineSetupError;

/// Programmable stage a shader blob is compiled for.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum ShaderStage {
    Vertex,
    Pixel,
}

impl ShaderStage {
    fn to_naga(self) -> naga::ShaderStage {
        match self {
            ShaderStage::Vertex => naga::ShaderStage::Vertex,
            ShaderStage::Pixel => naga::ShaderStage::Fragment,
        }
    }
}

impl fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShaderStage::Vertex => f.write_str("vertex"),
            ShaderStage::Pixel => f.write_str("pixel"),
        }
    }
}

/// Compile target: stage plus shader model, written `vs_5_0` / `ps_5_0`.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct ShaderProfile {
    pub stage: ShaderStage,
    pub major: u8,
    pub minor: u8,
}

impl ShaderProfile {
    pub const VS_5_0: ShaderProfile = ShaderProfile::new(ShaderStage::Vertex, 5, 0);
    pub const PS_5_0: ShaderProfile = ShaderProfile::new(ShaderStage::Pixel, 5, 0);

    pub const fn new(stage: ShaderStage, major: u8, minor: u8) -> Self {
        Self { stage, major, minor }
    }
}

impl fmt::Display for ShaderProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let prefix = match self.stage {
            ShaderStage::Vertex => "vs",
            ShaderStage::Pixel => "ps",
        };
        write!(f, "{prefix}_{}_{}", self.major, self.minor)
    }
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("invalid shader profile `{0}` (expected vs_<major>_<minor> or ps_<major>_<minor>)")]
pub struct ProfileParseError(pub String);

impl FromStr for ShaderProfile {
    type Err = ProfileParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ProfileParseError(s.to_string());

        let mut parts = s.split('_');
        let stage = match parts.next() {
            Some("vs") => ShaderStage::Vertex,
            Some("ps") => ShaderStage::Pixel,
            _ => return Err(err()),
        };
        let major = parts.next().and_then(|p| p.parse().ok()).ok_or_else(err)?;
        let minor = parts.next().and_then(|p| p.parse().ok()).ok_or_else(err)?;
        if parts.next().is_some() {
            return Err(err());
        }

        Ok(ShaderProfile::new(stage, major, minor))
    }
}

/// Compiler switches.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct CompileOptions {
    /// Emit debug names into the compiled blob. Does not change behavior.
    pub debug_info: bool,
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self {
            debug_info: cfg!(debug_assertions),
        }
    }
}

/// Compiled byte code for a single entry point.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShaderBlob {
    stage: ShaderStage,
    entry_point: String,
    code: Vec<u32>,
}

impl ShaderBlob {
    pub fn stage(&self) -> ShaderStage {
        self.stage
    }

    pub fn entry_point(&self) -> &str {
        &self.entry_point
    }

    /// Byte code as SPIR-V words.
    pub fn words(&self) -> &[u32] {
        &self.code
    }

    pub fn bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.code)
    }

    /// Byte code size in bytes.
    pub fn size(&self) -> usize {
        self.bytes().len()
    }

    /// Loads the blob into a device shader module.
    pub(crate) fn create_module(&self, device: &wgpu::Device) -> wgpu::ShaderModule {
        let label = format!("trigon {} shader ({})", self.stage, self.entry_point);
        device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some(&label),
            source: wgpu::ShaderSource::SpirV(Cow::Borrowed(&self.code)),
        })
    }
}

/// Compiles WGSL source into stage-specific [`ShaderBlob`]s.
///
/// Compilation is parse, validate, then lowering of the requested entry point.
#[derive(Debug, Clone, Default)]
pub struct ShaderCompiler {
    options: CompileOptions,
}

impl ShaderCompiler {
    pub fn new(options: CompileOptions) -> Self {
        Self { options }
    }

    /// Reads `path` and compiles `entry_point` for `profile`.
    pub fn compile_from_source(
        &self,
        path: impl AsRef<Path>,
        entry_point: &str,
        profile: ShaderProfile,
    ) -> Result<ShaderBlob, PipelineSetupError> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|e| {
            PipelineSetupError::ShaderCompileFailed {
                stage: profile.stage,
                message: format!("cannot read {}: {e}", path.display()),
            }
        })?;

        log::debug!("compiling {entry_point} ({profile}) from {}", path.display());
        self.compile_str(&source, entry_point, profile)
    }

    /// Compiles in-memory source text.
    pub fn compile_str(
        &self,
        source: &str,
        entry_point: &str,
        profile: ShaderProfile,
    ) -> Result<ShaderBlob, PipelineSetupError> {
        let fail = |message: String| PipelineSetupError::ShaderCompileFailed {
            stage: profile.stage,
            message,
        };

        let module =
            naga::front::wgsl::parse_str(source).map_err(|e| fail(e.emit_to_string(source)))?;

        let wanted = profile.stage.to_naga();
        let Some(ep) = module.entry_points.iter().find(|ep| ep.name == entry_point) else {
            return Err(fail(format!("entry point `{entry_point}` not found")));
        };
        if ep.stage != wanted {
            return Err(fail(format!(
                "entry point `{entry_point}` is not a {} entry point (profile {profile})",
                profile.stage
            )));
        }

        let info = naga::valid::Validator::new(
            naga::valid::ValidationFlags::all(),
            naga::valid::Capabilities::all(),
        )
        .validate(&module)
        .map_err(|e| fail(e.to_string()))?;

        let mut flags = spv::WriterFlags::empty();
        if self.options.debug_info {
            flags |= spv::WriterFlags::DEBUG;
        }
        let options = spv::Options {
            flags,
            ..spv::Options::default()
        };
        let pipeline_options = spv::PipelineOptions {
            shader_stage: wanted,
            entry_point: entry_point.to_string(),
        };

        let code = spv::write_vec(&module, &info, &options, Some(&pipeline_options))
            .map_err(|e| fail(e.to_string()))?;

        Ok(ShaderBlob {
            stage: profile.stage,
            entry_point: entry_point.to_string(),
            code,
        })
    }
}
