use std::path::PathBuf;

use trigon_engine::device::GpuInit;
use trigon_engine::logging::LoggingConfig;
use trigon_engine::window::RuntimeConfig;

/// Shader used when no path is given on the command line.
pub const DEFAULT_SHADER_PATH: &str =
    concat!(env!("CARGO_MANIFEST_DIR"), "/assets/shader/sample.wgsl");

pub const VS_ENTRY: &str = "VSMain";
pub const PS_ENTRY: &str = "PSMain";

/// Everything the sample needs before it opens a window.
#[derive(Debug, Clone)]
pub struct SampleConfig {
    pub shader_path: PathBuf,
    pub runtime: RuntimeConfig,
    pub gpu: GpuInit,
    pub logging: LoggingConfig,
}

impl Default for SampleConfig {
    fn default() -> Self {
        Self {
            shader_path: PathBuf::from(DEFAULT_SHADER_PATH),
            runtime: RuntimeConfig {
                title: "trigon sample".to_string(),
                ..RuntimeConfig::default()
            },
            gpu: GpuInit::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl SampleConfig {
    /// Builds the config from process arguments (program name excluded).
    ///
    /// The first argument, if any, replaces the shader path.
    pub fn from_args(mut args: impl Iterator<Item = String>) -> Self {
        let mut config = Self::default();
        if let Some(path) = args.next() {
            config.shader_path = PathBuf::from(path);
        }
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_points_at_the_bundled_shader() {
        let config = SampleConfig::from_args(std::iter::empty());
        assert!(config.shader_path.ends_with("assets/shader/sample.wgsl"));
        assert!(config.shader_path.is_file());
    }

    #[test]
    fn first_argument_overrides_the_shader() {
        let args = ["custom.wgsl".to_string(), "ignored".to_string()];
        let config = SampleConfig::from_args(args.into_iter());
        assert_eq!(config.shader_path, PathBuf::from("custom.wgsl"));
    }
}
