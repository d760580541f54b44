use super::error::{capture_device_error, PipelineSetupError};
use super::root_signature::SerializedRootSignature;
use super::state::{resolve_input_layout, PipelineStateDescriptor};

/// Compiled, immutable pipeline state.
#[derive(Debug)]
pub struct PipelineState {
    pipeline: wgpu::RenderPipeline,
    root_signature: SerializedRootSignature,
    vertex_strides: Vec<u64>,
}

impl PipelineState {
    /// Blob of the root signature this pipeline was created against.
    pub fn root_signature(&self) -> &SerializedRootSignature {
        &self.root_signature
    }

    /// Vertex stride expected for each input slot.
    pub fn vertex_strides(&self) -> &[u64] {
        &self.vertex_strides
    }

    pub(crate) fn raw(&self) -> &wgpu::RenderPipeline {
        &self.pipeline
    }
}

/// Creates [`PipelineState`]s from descriptors.
pub struct PipelineStateFactory<'d> {
    device: &'d wgpu::Device,
}

impl<'d> PipelineStateFactory<'d> {
    pub fn new(device: &'d wgpu::Device) -> Self {
        Self { device }
    }

    pub fn create(
        &self,
        desc: &PipelineStateDescriptor<'_>,
    ) -> Result<PipelineState, PipelineSetupError> {
        desc.validate()?;
        let slots = resolve_input_layout(desc.input_layout)?;

        let buffers: Vec<wgpu::VertexBufferLayout<'_>> =
            slots.iter().map(|s| s.as_wgpu()).collect();

        let rt = desc.blend.render_target;
        let blend = rt.blend_enable.then_some(wgpu::BlendState {
            color: rt.color,
            alpha: rt.alpha,
        });
        let targets: Vec<Option<wgpu::ColorTargetState>> = desc
            .rtv_formats
            .iter()
            .map(|&format| {
                Some(wgpu::ColorTargetState {
                    format,
                    blend,
                    write_mask: rt.write_mask,
                })
            })
            .collect();

        let device = self.device;
        let (pipeline, err) = capture_device_error(device, || {
            let vs_module = desc.vs.create_module(device);
            let ps_module = desc.ps.create_module(device);

            device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some("trigon pipeline state"),
                layout: Some(desc.root_signature.layout()),

                vertex: wgpu::VertexState {
                    module: &vs_module,
                    entry_point: Some(desc.vs.entry_point()),
                    compilation_options: Default::default(),
                    buffers: &buffers,
                },

                fragment: Some(wgpu::FragmentState {
                    module: &ps_module,
                    entry_point: Some(desc.ps.entry_point()),
                    compilation_options: Default::default(),
                    targets: &targets,
                }),

                primitive: desc.rasterizer.to_primitive(desc.primitive_topology),
                depth_stencil: Some(desc.depth_stencil.to_wgpu(desc.dsv_format)),
                multisample: wgpu::MultisampleState {
                    count: desc.sample_desc.count,
                    mask: u64::from(desc.sample_mask),
                    alpha_to_coverage_enabled: desc.blend.alpha_to_coverage_enable,
                },

                multiview_mask: None,
                cache: None,
            })
        });
        if let Some(err) = err {
            return Err(PipelineSetupError::PipelineStateFailed(err.to_string()));
        }

        log::info!(
            "pipeline state created ({} vertex slot(s), {} render target(s), depth {:?})",
            slots.len(),
            desc.rtv_formats.len(),
            desc.dsv_format
        );

        Ok(PipelineState {
            pipeline,
            root_signature: desc.root_signature.blob().clone(),
            vertex_strides: slots.iter().map(|s| s.stride).collect(),
        })
    }
}
