use crate::pipeline::PipelineSetupError;
use crate::resource::{
    IndexBufferView, PipelineId, ResourceRegistry, RootSignatureId, VertexBufferView,
};

use super::command::{CommandList, DrawIndexedArgs};
use super::engine::{FrameError, GraphicsEngine};

/// Everything a frame binds, fixed at startup.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct DrawBindings {
    root_signature: RootSignatureId,
    pipeline: PipelineId,
    vertex_buffer: VertexBufferView,
    index_buffer: IndexBufferView,
    draw: DrawIndexedArgs,
}

impl DrawBindings {
    /// Validates `draw` against the views it will read.
    pub fn new(
        root_signature: RootSignatureId,
        pipeline: PipelineId,
        vertex_buffer: VertexBufferView,
        index_buffer: IndexBufferView,
        draw: DrawIndexedArgs,
    ) -> Result<Self, PipelineSetupError> {
        let invalid = |msg: String| Err(PipelineSetupError::InvalidDraw(msg));

        if draw.index_count_per_instance == 0 {
            return invalid("index count is zero".to_string());
        }
        if draw.instance_count == 0 {
            return invalid("instance count is zero".to_string());
        }
        let end = u64::from(draw.start_index_location) + u64::from(draw.index_count_per_instance);
        if end > index_buffer.element_count() {
            return invalid(format!(
                "indices {}..{end} exceed the {} in the index buffer",
                draw.start_index_location,
                index_buffer.element_count()
            ));
        }
        let vertices = vertex_buffer.element_count();
        let Ok(base_vertex) = u64::try_from(draw.base_vertex_location) else {
            return invalid(format!("base vertex {} is negative", draw.base_vertex_location));
        };
        let highest = u64::from(index_buffer.max_index) + base_vertex;
        if highest >= vertices {
            return invalid(format!(
                "index {} with base vertex {base_vertex} reads vertex {highest} of {vertices}",
                index_buffer.max_index
            ));
        }

        Ok(Self {
            root_signature,
            pipeline,
            vertex_buffer,
            index_buffer,
            draw,
        })
    }
}

/// Where the submitter is within the current frame.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum FrameState {
    Idle,
    Recording,
    Submitted,
}

/// Records and submits the one draw, once per frame.
#[derive(Debug)]
pub struct FrameSubmitter {
    bindings: DrawBindings,
    state: FrameState,
    frames_submitted: u64,
}

impl FrameSubmitter {
    pub fn new(bindings: DrawBindings) -> Self {
        Self {
            bindings,
            state: FrameState::Idle,
            frames_submitted: 0,
        }
    }

    pub fn state(&self) -> FrameState {
        self.state
    }

    pub fn frames_submitted(&self) -> u64 {
        self.frames_submitted
    }

    /// Records the frame's bindings and draw into `list`.
    pub fn record(&self, list: &mut CommandList) {
        let b = &self.bindings;
        list.set_graphics_root_signature(b.root_signature);
        list.set_pipeline_state(b.pipeline);
        list.ia_set_vertex_buffers(0, &[b.vertex_buffer]);
        list.ia_set_index_buffer(b.index_buffer);
        list.draw_indexed_instanced(b.draw);
    }

    /// Runs one `Idle → Recording → Submitted → Idle` cycle.
    ///
    /// Returns `Ok(false)` when the engine skipped the frame.
    pub fn submit_frame(
        &mut self,
        engine: &mut dyn GraphicsEngine,
        resources: &ResourceRegistry,
    ) -> Result<bool, FrameError> {
        debug_assert_eq!(self.state, FrameState::Idle);

        let Some(mut list) = engine.begin_render()? else {
            log::debug!("frame {} skipped by the engine", self.frames_submitted);
            return Ok(false);
        };

        self.state = FrameState::Recording;
        self.record(&mut list);

        engine.end_render(list, resources);
        self.state = FrameState::Submitted;

        log::trace!("frame {} submitted", self.frames_submitted);
        self.frames_submitted += 1;
        self.state = FrameState::Idle;

        Ok(true)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::resource::BufferId;

    /// Engine double that keeps every submitted list.
    #[derive(Default)]
    pub(crate) struct RecordingEngine {
        pub submitted: Vec<CommandList>,
        pub skip_next: usize,
        pub lose_device: bool,
    }

    impl GraphicsEngine for RecordingEngine {
        fn begin_render(&mut self) -> Result<Option<CommandList>, FrameError> {
            if self.lose_device {
                return Err(FrameError::DeviceLost("test".into()));
            }
            if self.skip_next > 0 {
                self.skip_next -= 1;
                return Ok(None);
            }
            Ok(Some(CommandList::new()))
        }

        fn end_render(&mut self, list: CommandList, _resources: &ResourceRegistry) {
            self.submitted.push(list);
        }
    }

    pub(crate) fn triangle_bindings() -> DrawBindings {
        DrawBindings::new(
            RootSignatureId(0),
            PipelineId(0),
            VertexBufferView::for_records::<[f32; 3]>(BufferId(0), 3),
            IndexBufferView::for_u32_indices(BufferId(1), &[0, 1, 2]),
            DrawIndexedArgs::single(3),
        )
        .unwrap()
    }

    // ── bindings ──────────────────────────────────────────────────────────

    fn bindings_with(draw: DrawIndexedArgs) -> Result<DrawBindings, PipelineSetupError> {
        DrawBindings::new(
            RootSignatureId(0),
            PipelineId(0),
            VertexBufferView::for_records::<[f32; 3]>(BufferId(0), 3),
            IndexBufferView::for_u32_indices(BufferId(1), &[0, 1, 2]),
            draw,
        )
    }

    #[test]
    fn draw_past_the_index_buffer_is_rejected() {
        assert!(bindings_with(DrawIndexedArgs::single(4)).is_err());

        let shifted = DrawIndexedArgs {
            start_index_location: 1,
            ..DrawIndexedArgs::single(3)
        };
        assert!(matches!(
            bindings_with(shifted),
            Err(PipelineSetupError::InvalidDraw(_))
        ));
    }

    #[test]
    fn degenerate_draws_are_rejected() {
        assert!(bindings_with(DrawIndexedArgs::single(0)).is_err());

        let no_instances = DrawIndexedArgs {
            instance_count: 0,
            ..DrawIndexedArgs::single(3)
        };
        assert!(bindings_with(no_instances).is_err());

        let bad_base = DrawIndexedArgs {
            base_vertex_location: 3,
            ..DrawIndexedArgs::single(3)
        };
        assert!(bindings_with(bad_base).is_err());

        let negative_base = DrawIndexedArgs {
            base_vertex_location: -1,
            ..DrawIndexedArgs::single(3)
        };
        assert!(bindings_with(negative_base).is_err());
    }

    #[test]
    fn base_vertex_shifting_the_largest_index_past_the_vertices_is_rejected() {
        // Indices {0, 1, 2} with base vertex 1 read vertex 3 of 3.
        let shifted = DrawIndexedArgs {
            base_vertex_location: 1,
            ..DrawIndexedArgs::single(3)
        };
        assert!(matches!(
            bindings_with(shifted),
            Err(PipelineSetupError::InvalidDraw(_))
        ));

        let fits = DrawBindings::new(
            RootSignatureId(0),
            PipelineId(0),
            VertexBufferView::for_records::<[f32; 3]>(BufferId(0), 4),
            IndexBufferView::for_u32_indices(BufferId(1), &[0, 1, 2]),
            shifted,
        );
        assert!(fits.is_ok());
    }

    // ── submission ────────────────────────────────────────────────────────

    #[test]
    fn records_bindings_then_one_draw() {
        let submitter = FrameSubmitter::new(triangle_bindings());
        let mut list = CommandList::new();
        submitter.record(&mut list);

        assert_eq!(list.commands().len(), 5);
        assert_eq!(list.draw_count(), 1);
        assert_eq!(
            list.commands().last(),
            Some(&super::super::command::RenderCommand::DrawIndexedInstanced(
                DrawIndexedArgs::single(3)
            ))
        );
        assert_eq!(super::super::replay::validate_order(&list), Ok(()));
    }

    #[test]
    fn every_frame_records_identical_commands() {
        let mut engine = RecordingEngine::default();
        let mut submitter = FrameSubmitter::new(triangle_bindings());
        let resources = ResourceRegistry::new();

        for _ in 0..4 {
            assert_eq!(submitter.submit_frame(&mut engine, &resources), Ok(true));
            assert_eq!(submitter.state(), FrameState::Idle);
        }

        assert_eq!(submitter.frames_submitted(), 4);
        assert_eq!(engine.submitted.len(), 4);
        assert!(engine.submitted.windows(2).all(|w| w[0] == w[1]));
    }

    #[test]
    fn skipped_frames_are_not_counted() {
        let mut engine = RecordingEngine {
            skip_next: 1,
            ..RecordingEngine::default()
        };
        let mut submitter = FrameSubmitter::new(triangle_bindings());
        let resources = ResourceRegistry::new();

        assert_eq!(submitter.submit_frame(&mut engine, &resources), Ok(false));
        assert_eq!(submitter.frames_submitted(), 0);
        assert!(engine.submitted.is_empty());
        assert_eq!(submitter.state(), FrameState::Idle);
    }

    #[test]
    fn device_loss_propagates() {
        let mut engine = RecordingEngine {
            lose_device: true,
            ..RecordingEngine::default()
        };
        let mut submitter = FrameSubmitter::new(triangle_bindings());
        let resources = ResourceRegistry::new();

        assert!(submitter.submit_frame(&mut engine, &resources).is_err());
        assert_eq!(submitter.state(), FrameState::Idle);
    }
}
