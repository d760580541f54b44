//! The sample's one triangle: geometry, pipeline and upload.

use std::path::Path;

use bytemuck::{Pod, Zeroable};

use trigon_engine::frame::{DrawBindings, DrawIndexedArgs};
use trigon_engine::pipeline::{
    BlendState, CompileOptions, CullMode, DepthStencilState, InputElement, PipelineSetupError,
    PipelineStateDescriptor, PipelineStateFactory, PrimitiveTopologyType, RasterizerState,
    RootSignatureBuilder, RootSignatureFlags, RootSignatureVersion, SampleDesc, ShaderCompiler,
    ShaderProfile,
};
use trigon_engine::resource::{GpuBufferUploader, ResourceRegistry};

use crate::config::{PS_ENTRY, VS_ENTRY};

#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub pos: [f32; 3],
}

pub const VERTICES: [Vertex; 3] = [
    Vertex { pos: [-1.0, -1.0, 0.0] },
    Vertex { pos: [0.0, 1.0, 0.0] },
    Vertex { pos: [1.0, -1.0, 0.0] },
];

pub const INDICES: [u32; 3] = [0, 1, 2];

pub const INPUT_LAYOUT: [InputElement; 1] = [InputElement {
    aligned_byte_offset: 0,
    ..InputElement::per_vertex("POSITION", wgpu::VertexFormat::Float32x3)
}];

pub fn root_signature_flags() -> RootSignatureFlags {
    RootSignatureFlags::ALLOW_INPUT_ASSEMBLER_INPUT_LAYOUT
        | RootSignatureFlags::DENY_HULL_SHADER_ROOT_ACCESS
        | RootSignatureFlags::DENY_DOMAIN_SHADER_ROOT_ACCESS
        | RootSignatureFlags::DENY_GEOMETRY_SHADER_ROOT_ACCESS
}

pub fn rasterizer() -> RasterizerState {
    RasterizerState {
        cull_mode: CullMode::None,
        ..RasterizerState::default()
    }
}

/// Render target formats the pipeline is built for.
pub struct Targets {
    pub color: wgpu::TextureFormat,
    pub depth: wgpu::TextureFormat,
}

/// Runs every startup step in order and returns the per-frame bindings.
///
/// Stops at the first failure; the error names its stage.
pub fn setup(
    device: &wgpu::Device,
    targets: Targets,
    shader_path: &Path,
    resources: &mut ResourceRegistry,
) -> Result<DrawBindings, PipelineSetupError> {
    let root_signature = RootSignatureBuilder::new(root_signature_flags())
        .serialize_as(RootSignatureVersion::V1_0)
        .build(device)?;
    let vs = ShaderCompiler::new(CompileOptions {
        debug_info: cfg!(debug_assertions),
    })
    .compile_from_source(shader_path, VS_ENTRY, ShaderProfile::VS_5_0)?;
    let ps = ShaderCompiler::new(CompileOptions { debug_info: false }).compile_from_source(
        shader_path,
        PS_ENTRY,
        ShaderProfile::PS_5_0,
    )?;
    log::info!(
        "shaders compiled from {} (vs {} bytes, ps {} bytes)",
        shader_path.display(),
        vs.size(),
        ps.size()
    );

    let rtv_formats = [targets.color];
    let pipeline = PipelineStateFactory::new(device).create(&PipelineStateDescriptor {
        input_layout: &INPUT_LAYOUT,
        root_signature: &root_signature,
        vs: &vs,
        ps: &ps,
        rasterizer: rasterizer(),
        blend: BlendState::default(),
        depth_stencil: DepthStencilState::default(),
        sample_mask: u32::MAX,
        primitive_topology: PrimitiveTopologyType::Triangle,
        rtv_formats: &rtv_formats,
        dsv_format: targets.depth,
        sample_desc: SampleDesc::default(),
    })?;
    let root_signature = resources.add_root_signature(root_signature);
    let pipeline = resources.add_pipeline(pipeline);

    let (vertex_view, index_view) =
        GpuBufferUploader::new(device).upload_indexed(resources, &VERTICES, &INDICES)?;

    DrawBindings::new(
        root_signature,
        pipeline,
        vertex_view,
        index_view,
        DrawIndexedArgs::single(INDICES.len() as u32),
    )
}
