//! Draws one triangle until the window is closed.

mod config;
mod triangle;

use anyhow::{Context, Result};

use trigon_engine::frame::{run_message_loop, FrameSubmitter};
use trigon_engine::pipeline::PipelineSetupError;
use trigon_engine::logging::init_logging;
use trigon_engine::resource::ResourceRegistry;
use trigon_engine::window::WinitHost;

use crate::config::SampleConfig;
use crate::triangle::Targets;

fn main() -> Result<()> {
    let config = SampleConfig::from_args(std::env::args().skip(1));
    init_logging(config.logging.clone());

    let mut host = WinitHost::initialize(config.runtime.clone(), config.gpu.clone())
        .context("failed to initialize the graphics engine")?;

    let mut resources = ResourceRegistry::new();
    let setup = host
        .with_gpu(|gpu| {
            let targets = Targets {
                color: gpu.surface_format(),
                depth: gpu.depth_format(),
            };
            triangle::setup(gpu.device(), targets, &config.shader_path, &mut resources)
        })
        .context("window closed during startup")?;

    let bindings = match setup {
        Ok(bindings) => bindings,
        Err(err) => {
            resources.release();
            return Err(startup_failure(err));
        }
    };
    log::info!("startup complete, entering message loop");

    let mut submitter = FrameSubmitter::new(bindings);
    let summary = run_message_loop(&mut host, &mut submitter, &resources);

    resources.release();
    let summary = summary.context("frame loop aborted")?;
    log::info!("{} frames presented", summary.frames_rendered);

    Ok(())
}

/// Logs a failed startup step and turns it into `main`'s error.
fn startup_failure(err: PipelineSetupError) -> anyhow::Error {
    let stage = err.stage();
    log::error!("startup failed during {stage}: {err}");
    anyhow::Error::new(err).context(format!("startup failed during {stage}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn startup_failure_keeps_the_stage_and_the_typed_error() {
        let err = startup_failure(PipelineSetupError::RootSignatureFailed("bad magic".into()));

        assert_eq!(err.to_string(), "startup failed during root signature creation");
        assert_eq!(
            err.downcast_ref::<PipelineSetupError>(),
            Some(&PipelineSetupError::RootSignatureFailed("bad magic".into()))
        );
    }
}
