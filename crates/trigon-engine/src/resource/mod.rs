//! GPU buffers, their views, and the table that owns them.

mod registry;
mod upload;
mod view;

pub use registry::{GpuBuffer, ResourceRegistry};
pub use upload::{write_mapped, GpuBufferUploader, MappableBuffer, MappedWrite};
pub use view::{
    check_index_bounds, BufferId, IndexBufferView, IndexFormat, PipelineId, RootSignatureId,
    VertexBufferView,
};
