use crate::pipeline::{PipelineState, RootSignature};

use super::view::{BufferId, PipelineId, RootSignatureId};

/// A GPU buffer and its allocated size.
#[derive(Debug)]
pub struct GpuBuffer {
    pub(crate) buffer: wgpu::Buffer,
    pub(crate) size: u64,
}

impl GpuBuffer {
    pub fn size(&self) -> u64 {
        self.size
    }

    pub(crate) fn raw(&self) -> &wgpu::Buffer {
        &self.buffer
    }
}

/// Owns every startup-built GPU object.
///
/// Callers keep copyable ids; objects live until [`ResourceRegistry::release`].
#[derive(Debug, Default)]
pub struct ResourceRegistry {
    root_signatures: Vec<RootSignature>,
    pipelines: Vec<PipelineState>,
    buffers: Vec<GpuBuffer>,
}

impl ResourceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_root_signature(&mut self, root_signature: RootSignature) -> RootSignatureId {
        self.root_signatures.push(root_signature);
        RootSignatureId(self.root_signatures.len() as u32 - 1)
    }

    pub fn add_pipeline(&mut self, pipeline: PipelineState) -> PipelineId {
        self.pipelines.push(pipeline);
        PipelineId(self.pipelines.len() as u32 - 1)
    }

    pub(crate) fn add_buffer(&mut self, buffer: GpuBuffer) -> BufferId {
        self.buffers.push(buffer);
        BufferId(self.buffers.len() as u32 - 1)
    }

    pub fn root_signature(&self, id: RootSignatureId) -> Option<&RootSignature> {
        self.root_signatures.get(id.0 as usize)
    }

    pub fn pipeline(&self, id: PipelineId) -> Option<&PipelineState> {
        self.pipelines.get(id.0 as usize)
    }

    pub fn buffer(&self, id: BufferId) -> Option<&GpuBuffer> {
        self.buffers.get(id.0 as usize)
    }

    pub fn buffer_count(&self) -> usize {
        self.buffers.len()
    }

    /// Destroys the buffers and drops every object.
    pub fn release(self) {
        log::info!(
            "releasing {} buffer(s), {} pipeline(s), {} root signature(s)",
            self.buffers.len(),
            self.pipelines.len(),
            self.root_signatures.len()
        );
        for buffer in &self.buffers {
            buffer.buffer.destroy();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_registry_resolves_nothing() {
        let registry = ResourceRegistry::new();
        assert!(registry.buffer(BufferId(0)).is_none());
        assert!(registry.pipeline(PipelineId(0)).is_none());
        assert!(registry.root_signature(RootSignatureId(0)).is_none());
        assert_eq!(registry.buffer_count(), 0);
        registry.release();
    }
}
