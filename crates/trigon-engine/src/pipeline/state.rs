//! Pipeline state description.
//!
//! Fixed-function state is plain configuration: each struct documents its
//! defaults, and callers override individual fields.

use super::error::PipelineSetupError;
use super::root_signature::{RootSignature, RootSignatureFlags};
use super::shader::ShaderBlob;

// ── input layout ──────────────────────────────────────────────────────────

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum InputClassification {
    PerVertex,
    PerInstance,
}

/// One vertex attribute consumed by the vertex shader.
///
/// Element `i` of a layout feeds shader location `i`.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct InputElement {
    pub semantic_name: &'static str,
    pub semantic_index: u32,
    pub format: wgpu::VertexFormat,
    pub input_slot: u32,
    /// Byte offset inside the vertex record, or [`InputElement::APPEND_ALIGNED`].
    pub aligned_byte_offset: u64,
    pub classification: InputClassification,
}

impl InputElement {
    /// Places the element directly after the previous one in its slot.
    pub const APPEND_ALIGNED: u64 = u64::MAX;

    pub const fn per_vertex(semantic_name: &'static str, format: wgpu::VertexFormat) -> Self {
        Self {
            semantic_name,
            semantic_index: 0,
            format,
            input_slot: 0,
            aligned_byte_offset: Self::APPEND_ALIGNED,
            classification: InputClassification::PerVertex,
        }
    }
}

/// Vertex attributes and stride for one input slot.
#[derive(Debug, Clone, PartialEq)]
pub struct SlotLayout {
    pub slot: u32,
    pub stride: u64,
    pub step_mode: wgpu::VertexStepMode,
    pub attributes: Vec<wgpu::VertexAttribute>,
}

impl SlotLayout {
    pub(crate) fn as_wgpu(&self) -> wgpu::VertexBufferLayout<'_> {
        wgpu::VertexBufferLayout {
            array_stride: self.stride,
            step_mode: self.step_mode,
            attributes: &self.attributes,
        }
    }
}

/// Groups elements by input slot, resolving append-aligned offsets.
///
/// Slots are dense from 0 to the highest slot used; unused slots get an
/// empty layout.
pub fn resolve_input_layout(
    elements: &[InputElement],
) -> Result<Vec<SlotLayout>, PipelineSetupError> {
    let slot_count = elements.iter().map(|e| e.input_slot + 1).max().unwrap_or(0);
    let mut slots: Vec<SlotLayout> = (0..slot_count)
        .map(|slot| SlotLayout {
            slot,
            stride: 0,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: Vec::new(),
        })
        .collect();
    let mut cursors = vec![0u64; slot_count as usize];

    for (location, element) in elements.iter().enumerate() {
        let idx = element.input_slot as usize;
        let offset = if element.aligned_byte_offset == InputElement::APPEND_ALIGNED {
            cursors[idx]
        } else {
            element.aligned_byte_offset
        };
        let end = offset + element.format.size();
        cursors[idx] = cursors[idx].max(end);

        let step_mode = match element.classification {
            InputClassification::PerVertex => wgpu::VertexStepMode::Vertex,
            InputClassification::PerInstance => wgpu::VertexStepMode::Instance,
        };
        let slot = &mut slots[idx];
        if !slot.attributes.is_empty() && slot.step_mode != step_mode {
            return Err(PipelineSetupError::PipelineStateFailed(format!(
                "input slot {} mixes per-vertex and per-instance elements",
                element.input_slot
            )));
        }
        slot.step_mode = step_mode;
        slot.stride = slot.stride.max(end);
        slot.attributes.push(wgpu::VertexAttribute {
            format: element.format,
            offset,
            shader_location: location as u32,
        });
    }

    Ok(slots)
}

// ── rasterizer ────────────────────────────────────────────────────────────

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum FillMode {
    Solid,
    Wireframe,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum CullMode {
    None,
    Front,
    Back,
}

/// Rasterizer configuration.
///
/// Defaults: solid fill, back-face culling, clockwise front faces,
/// depth clipping enabled.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct RasterizerState {
    pub fill_mode: FillMode,
    pub cull_mode: CullMode,
    pub front_counter_clockwise: bool,
    pub depth_clip_enable: bool,
}

impl Default for RasterizerState {
    fn default() -> Self {
        Self {
            fill_mode: FillMode::Solid,
            cull_mode: CullMode::Back,
            front_counter_clockwise: false,
            depth_clip_enable: true,
        }
    }
}

impl RasterizerState {
    pub(crate) fn to_primitive(self, topology: PrimitiveTopologyType) -> wgpu::PrimitiveState {
        wgpu::PrimitiveState {
            topology: topology.to_wgpu(),
            strip_index_format: None,
            front_face: if self.front_counter_clockwise {
                wgpu::FrontFace::Ccw
            } else {
                wgpu::FrontFace::Cw
            },
            cull_mode: match self.cull_mode {
                CullMode::None => None,
                CullMode::Front => Some(wgpu::Face::Front),
                CullMode::Back => Some(wgpu::Face::Back),
            },
            polygon_mode: match self.fill_mode {
                FillMode::Solid => wgpu::PolygonMode::Fill,
                FillMode::Wireframe => wgpu::PolygonMode::Line,
            },
            unclipped_depth: !self.depth_clip_enable,
            conservative: false,
        }
    }
}

// ── blend ─────────────────────────────────────────────────────────────────

/// Blend configuration for one render target.
///
/// Defaults: blending off (`src * One + dst * Zero`), all channels written.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct RenderTargetBlend {
    pub blend_enable: bool,
    pub color: wgpu::BlendComponent,
    pub alpha: wgpu::BlendComponent,
    pub write_mask: wgpu::ColorWrites,
}

impl Default for RenderTargetBlend {
    fn default() -> Self {
        Self {
            blend_enable: false,
            color: wgpu::BlendComponent::REPLACE,
            alpha: wgpu::BlendComponent::REPLACE,
            write_mask: wgpu::ColorWrites::ALL,
        }
    }
}

/// Output-merger blend configuration.
///
/// Defaults: alpha-to-coverage off, every target uses [`RenderTargetBlend::default`].
#[derive(Debug, Copy, Clone, Eq, PartialEq, Default)]
pub struct BlendState {
    pub alpha_to_coverage_enable: bool,
    pub render_target: RenderTargetBlend,
}

// ── depth / stencil ───────────────────────────────────────────────────────

/// Depth-stencil configuration.
///
/// Defaults: depth test on with `Less`, depth writes on, stencil off.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct DepthStencilState {
    pub depth_enable: bool,
    pub depth_write: bool,
    pub depth_func: wgpu::CompareFunction,
    pub stencil_enable: bool,
}

impl Default for DepthStencilState {
    fn default() -> Self {
        Self {
            depth_enable: true,
            depth_write: true,
            depth_func: wgpu::CompareFunction::Less,
            stencil_enable: false,
        }
    }
}

impl DepthStencilState {
    pub(crate) fn to_wgpu(self, format: wgpu::TextureFormat) -> wgpu::DepthStencilState {
        let (depth_write_enabled, depth_compare) = if self.depth_enable {
            (self.depth_write, self.depth_func)
        } else {
            (false, wgpu::CompareFunction::Always)
        };
        let stencil = if self.stencil_enable {
            wgpu::StencilState {
                front: wgpu::StencilFaceState::IGNORE,
                back: wgpu::StencilFaceState::IGNORE,
                read_mask: 0xff,
                write_mask: 0xff,
            }
        } else {
            wgpu::StencilState::default()
        };

        wgpu::DepthStencilState {
            format,
            depth_write_enabled,
            depth_compare,
            stencil,
            bias: wgpu::DepthBiasState::default(),
        }
    }
}

// ── misc ──────────────────────────────────────────────────────────────────

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum PrimitiveTopologyType {
    Point,
    Line,
    Triangle,
}

impl PrimitiveTopologyType {
    fn to_wgpu(self) -> wgpu::PrimitiveTopology {
        match self {
            PrimitiveTopologyType::Point => wgpu::PrimitiveTopology::PointList,
            PrimitiveTopologyType::Line => wgpu::PrimitiveTopology::LineList,
            PrimitiveTopologyType::Triangle => wgpu::PrimitiveTopology::TriangleList,
        }
    }
}

/// Multisampling. Defaults to one sample.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct SampleDesc {
    pub count: u32,
    pub quality: u32,
}

impl Default for SampleDesc {
    fn default() -> Self {
        Self { count: 1, quality: 0 }
    }
}

pub const MAX_RENDER_TARGETS: usize = 8;

// ── descriptor ────────────────────────────────────────────────────────────

/// Everything needed to create a [`super::PipelineState`].
///
/// All fields are required.
#[derive(Debug, Clone)]
pub struct PipelineStateDescriptor<'a> {
    pub input_layout: &'a [InputElement],
    pub root_signature: &'a RootSignature,
    pub vs: &'a ShaderBlob,
    pub ps: &'a ShaderBlob,
    pub rasterizer: RasterizerState,
    pub blend: BlendState,
    pub depth_stencil: DepthStencilState,
    pub sample_mask: u32,
    pub primitive_topology: PrimitiveTopologyType,
    pub rtv_formats: &'a [wgpu::TextureFormat],
    pub dsv_format: wgpu::TextureFormat,
    pub sample_desc: SampleDesc,
}

/// Checks descriptor values that do not need a device.
///
/// Deterministic: the same inputs always give the same result.
pub fn validate_fixed_state(
    root_flags: RootSignatureFlags,
    input_layout: &[InputElement],
    rtv_formats: &[wgpu::TextureFormat],
    dsv_format: wgpu::TextureFormat,
    sample_desc: SampleDesc,
) -> Result<(), PipelineSetupError> {
    let reject = |msg: String| Err(PipelineSetupError::PipelineStateFailed(msg));

    if !input_layout.is_empty() && !root_flags.allows_input_layout() {
        return reject(
            "root signature does not allow an input assembler input layout".to_string(),
        );
    }
    if rtv_formats.is_empty() || rtv_formats.len() > MAX_RENDER_TARGETS {
        return reject(format!(
            "{} render targets requested (1..={MAX_RENDER_TARGETS} supported)",
            rtv_formats.len()
        ));
    }
    if let Some(bad) = rtv_formats.iter().find(|f| f.is_depth_stencil_format()) {
        return reject(format!("{bad:?} is not a color format"));
    }
    if !dsv_format.is_depth_stencil_format() {
        return reject(format!("{dsv_format:?} is not a depth-stencil format"));
    }
    if !matches!(sample_desc.count, 1 | 2 | 4 | 8) {
        return reject(format!("unsupported sample count {}", sample_desc.count));
    }

    Ok(())
}

impl PipelineStateDescriptor<'_> {
    pub fn validate(&self) -> Result<(), PipelineSetupError> {
        validate_fixed_state(
            self.root_signature.flags(),
            self.input_layout,
            self.rtv_formats,
            self.dsv_format,
            self.sample_desc,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn position_layout() -> [InputElement; 1] {
        [InputElement::per_vertex("POSITION", wgpu::VertexFormat::Float32x3)]
    }

    // ── input layout ──────────────────────────────────────────────────────

    #[test]
    fn position_only_layout_is_twelve_bytes() {
        let slots = resolve_input_layout(&position_layout()).unwrap();
        assert_eq!(slots.len(), 1);
        assert_eq!(slots[0].stride, 12);
        assert_eq!(slots[0].attributes[0].shader_location, 0);
        assert_eq!(slots[0].attributes[0].offset, 0);
    }

    #[test]
    fn append_aligned_elements_pack_in_order() {
        let layout = [
            InputElement::per_vertex("POSITION", wgpu::VertexFormat::Float32x3),
            InputElement::per_vertex("TEXCOORD", wgpu::VertexFormat::Float32x2),
        ];
        let slots = resolve_input_layout(&layout).unwrap();
        assert_eq!(slots[0].attributes[1].offset, 12);
        assert_eq!(slots[0].attributes[1].shader_location, 1);
        assert_eq!(slots[0].stride, 20);
    }

    #[test]
    fn mixed_step_modes_in_one_slot_fail() {
        let mut instanced = InputElement::per_vertex("COLOR", wgpu::VertexFormat::Float32x4);
        instanced.classification = InputClassification::PerInstance;
        let layout = [position_layout()[0], instanced];
        assert!(resolve_input_layout(&layout).is_err());
    }

    #[test]
    fn empty_layout_has_no_slots() {
        assert!(resolve_input_layout(&[]).unwrap().is_empty());
    }

    // ── fixed function ────────────────────────────────────────────────────

    #[test]
    fn rasterizer_defaults_cull_back_faces() {
        let prim = RasterizerState::default().to_primitive(PrimitiveTopologyType::Triangle);
        assert_eq!(prim.cull_mode, Some(wgpu::Face::Back));
        assert_eq!(prim.front_face, wgpu::FrontFace::Cw);
        assert_eq!(prim.topology, wgpu::PrimitiveTopology::TriangleList);
        assert!(!prim.unclipped_depth);
    }

    #[test]
    fn cull_none_disables_culling() {
        let raster = RasterizerState {
            cull_mode: CullMode::None,
            ..RasterizerState::default()
        };
        assert_eq!(raster.to_primitive(PrimitiveTopologyType::Triangle).cull_mode, None);
    }

    #[test]
    fn depth_defaults_test_less_and_write() {
        let ds = DepthStencilState::default().to_wgpu(wgpu::TextureFormat::Depth32Float);
        assert!(ds.depth_write_enabled);
        assert_eq!(ds.depth_compare, wgpu::CompareFunction::Less);
    }

    #[test]
    fn disabled_depth_always_passes() {
        let state = DepthStencilState {
            depth_enable: false,
            ..DepthStencilState::default()
        };
        let ds = state.to_wgpu(wgpu::TextureFormat::Depth32Float);
        assert!(!ds.depth_write_enabled);
        assert_eq!(ds.depth_compare, wgpu::CompareFunction::Always);
    }

    #[test]
    fn blend_defaults_are_opaque() {
        let blend = BlendState::default();
        assert!(!blend.render_target.blend_enable);
        assert_eq!(blend.render_target.write_mask, wgpu::ColorWrites::ALL);
    }

    // ── validation ────────────────────────────────────────────────────────

    fn validate_sample(
        flags: RootSignatureFlags,
        rtv: &[wgpu::TextureFormat],
        dsv: wgpu::TextureFormat,
        count: u32,
    ) -> Result<(), PipelineSetupError> {
        validate_fixed_state(
            flags,
            &position_layout(),
            rtv,
            dsv,
            SampleDesc { count, quality: 0 },
        )
    }

    #[test]
    fn sample_configuration_is_valid() {
        let ok = validate_sample(
            RootSignatureFlags::ALLOW_INPUT_ASSEMBLER_INPUT_LAYOUT,
            &[wgpu::TextureFormat::Rgba8Unorm],
            wgpu::TextureFormat::Depth32Float,
            1,
        );
        assert_eq!(ok, Ok(()));
    }

    #[test]
    fn input_layout_requires_root_permission() {
        let err = validate_sample(
            RootSignatureFlags::empty(),
            &[wgpu::TextureFormat::Rgba8Unorm],
            wgpu::TextureFormat::Depth32Float,
            1,
        );
        assert!(matches!(err, Err(PipelineSetupError::PipelineStateFailed(_))));
    }

    #[test]
    fn bad_formats_and_sample_counts_fail() {
        let allow = RootSignatureFlags::ALLOW_INPUT_ASSEMBLER_INPUT_LAYOUT;
        let rgba = [wgpu::TextureFormat::Rgba8Unorm];
        let depth = wgpu::TextureFormat::Depth32Float;

        assert!(validate_sample(allow, &[], depth, 1).is_err());
        assert!(validate_sample(allow, &[depth], depth, 1).is_err());
        assert!(validate_sample(allow, &rgba, wgpu::TextureFormat::Rgba8Unorm, 1).is_err());
        assert!(validate_sample(allow, &rgba, depth, 3).is_err());
    }

    #[test]
    fn validation_is_deterministic() {
        let allow = RootSignatureFlags::ALLOW_INPUT_ASSEMBLER_INPUT_LAYOUT;
        let rgba = [wgpu::TextureFormat::Rgba8Unorm];
        let depth = wgpu::TextureFormat::Depth32Float;

        assert_eq!(
            validate_sample(allow, &rgba, depth, 3),
            validate_sample(allow, &rgba, depth, 3)
        );
        assert_eq!(
            validate_sample(allow, &rgba, depth, 1),
            validate_sample(allow, &rgba, depth, 1)
        );
    }
}
