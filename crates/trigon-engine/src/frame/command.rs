use crate::resource::{IndexBufferView, PipelineId, RootSignatureId, VertexBufferView};

/// Arguments of an indexed, instanced draw.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct DrawIndexedArgs {
    pub index_count_per_instance: u32,
    pub instance_count: u32,
    pub start_index_location: u32,
    pub base_vertex_location: i32,
    pub start_instance_location: u32,
}

impl DrawIndexedArgs {
    /// `index_count` indices, one instance, no offsets.
    pub const fn single(index_count: u32) -> Self {
        Self {
            index_count_per_instance: index_count,
            instance_count: 1,
            start_index_location: 0,
            base_vertex_location: 0,
            start_instance_location: 0,
        }
    }
}

/// One recorded command.
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub enum RenderCommand {
    SetGraphicsRootSignature(RootSignatureId),
    SetPipelineState(PipelineId),
    SetVertexBuffers {
        start_slot: u32,
        views: Vec<VertexBufferView>,
    },
    SetIndexBuffer(IndexBufferView),
    DrawIndexedInstanced(DrawIndexedArgs),
}

/// A recorded sequence of commands, replayed by the engine as one unit.
///
/// Lists compare by content, so two frames recorded identically are equal.
#[derive(Debug, Clone, Default, Eq, PartialEq, Hash)]
pub struct CommandList {
    commands: Vec<RenderCommand>,
}

impl CommandList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clears recorded commands, keeping the allocation.
    pub fn reset(&mut self) {
        self.commands.clear();
    }

    pub fn commands(&self) -> &[RenderCommand] {
        &self.commands
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    pub fn set_graphics_root_signature(&mut self, root_signature: RootSignatureId) {
        self.commands
            .push(RenderCommand::SetGraphicsRootSignature(root_signature));
    }

    pub fn set_pipeline_state(&mut self, pipeline: PipelineId) {
        self.commands.push(RenderCommand::SetPipelineState(pipeline));
    }

    pub fn ia_set_vertex_buffers(&mut self, start_slot: u32, views: &[VertexBufferView]) {
        self.commands.push(RenderCommand::SetVertexBuffers {
            start_slot,
            views: views.to_vec(),
        });
    }

    pub fn ia_set_index_buffer(&mut self, view: IndexBufferView) {
        self.commands.push(RenderCommand::SetIndexBuffer(view));
    }

    pub fn draw_indexed_instanced(&mut self, args: DrawIndexedArgs) {
        self.commands.push(RenderCommand::DrawIndexedInstanced(args));
    }

    /// Number of draw commands recorded.
    pub fn draw_count(&self) -> usize {
        self.commands
            .iter()
            .filter(|c| matches!(c, RenderCommand::DrawIndexedInstanced(_)))
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reset_clears_commands() {
        let mut list = CommandList::new();
        list.draw_indexed_instanced(DrawIndexedArgs::single(3));
        assert_eq!(list.draw_count(), 1);

        list.reset();
        assert!(list.is_empty());
        assert_eq!(list, CommandList::default());
    }

    #[test]
    fn single_draw_has_no_offsets() {
        let args = DrawIndexedArgs::single(3);
        assert_eq!(args.instance_count, 1);
        assert_eq!(args.start_index_location, 0);
        assert_eq!(args.base_vertex_location, 0);
        assert_eq!(args.start_instance_location, 0);
    }
}
