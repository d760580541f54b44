use bytemuck::Pod;

use crate::pipeline::{capture_device_error, PipelineSetupError};

use super::registry::{GpuBuffer, ResourceRegistry};
use super::view::{check_index_bounds, IndexBufferView, VertexBufferView};

/// A buffer whose memory can be written by the CPU while mapped.
pub trait MappableBuffer {
    /// Size of the mapped range in bytes.
    fn mapped_size(&self) -> u64;

    /// Copies `bytes` to the start of the mapped range.
    fn copy_to_mapped(&self, bytes: &[u8]);

    fn unmap(&self);
}

impl MappableBuffer for wgpu::Buffer {
    fn mapped_size(&self) -> u64 {
        self.size()
    }

    fn copy_to_mapped(&self, bytes: &[u8]) {
        let mut view = self.slice(..).get_mapped_range_mut();
        view.copy_from_slice(bytes);
    }

    fn unmap(&self) {
        wgpu::Buffer::unmap(self);
    }
}

/// Scoped CPU write access to a mapped buffer. Unmaps on drop.
pub struct MappedWrite<'a, B: MappableBuffer + ?Sized> {
    buffer: &'a B,
}

impl<'a, B: MappableBuffer + ?Sized> MappedWrite<'a, B> {
    /// Takes ownership of an already-mapped buffer's mapping.
    pub fn new(buffer: &'a B) -> Self {
        Self { buffer }
    }

    /// Copies the full mapped range from `bytes`.
    pub fn copy_from(&mut self, bytes: &[u8]) -> Result<(), PipelineSetupError> {
        let size = self.buffer.mapped_size();
        if bytes.len() as u64 != size {
            return Err(PipelineSetupError::ResourceAllocationFailed {
                what: "upload",
                message: format!("{} source bytes for a {size}-byte buffer", bytes.len()),
            });
        }
        self.buffer.copy_to_mapped(bytes);
        Ok(())
    }
}

impl<B: MappableBuffer + ?Sized> Drop for MappedWrite<'_, B> {
    fn drop(&mut self) {
        self.buffer.unmap();
    }
}

/// Writes `bytes` through a [`MappedWrite`]; the buffer is unmapped on every path.
pub fn write_mapped<B: MappableBuffer + ?Sized>(
    buffer: &B,
    bytes: &[u8],
) -> Result<(), PipelineSetupError> {
    MappedWrite::new(buffer).copy_from(bytes)
}

/// Allocates CPU-writable, GPU-readable buffers and fills them once.
pub struct GpuBufferUploader<'d> {
    device: &'d wgpu::Device,
}

impl<'d> GpuBufferUploader<'d> {
    pub fn new(device: &'d wgpu::Device) -> Self {
        Self { device }
    }

    /// Uploads vertex records; the view's stride is the record size.
    pub fn upload_vertex_data<V: Pod>(
        &self,
        registry: &mut ResourceRegistry,
        vertices: &[V],
    ) -> Result<VertexBufferView, PipelineSetupError> {
        let bytes: &[u8] = bytemuck::cast_slice(vertices);
        let buffer = self.upload("vertex buffer", wgpu::BufferUsages::VERTEX, bytes)?;
        let view = VertexBufferView::for_records::<V>(registry.add_buffer(buffer), vertices.len());

        log::info!(
            "vertex buffer uploaded ({} records, {} bytes)",
            vertices.len(),
            view.size_in_bytes
        );
        Ok(view)
    }

    /// Uploads 32-bit indices.
    pub fn upload_index_data(
        &self,
        registry: &mut ResourceRegistry,
        indices: &[u32],
    ) -> Result<IndexBufferView, PipelineSetupError> {
        let bytes: &[u8] = bytemuck::cast_slice(indices);
        let buffer = self.upload("index buffer", wgpu::BufferUsages::INDEX, bytes)?;
        let view = IndexBufferView::for_u32_indices(registry.add_buffer(buffer), indices);

        log::info!(
            "index buffer uploaded ({} indices, {} bytes)",
            indices.len(),
            view.size_in_bytes
        );
        Ok(view)
    }

    /// Checks every index against the vertex count, then uploads both arrays.
    pub fn upload_indexed<V: Pod>(
        &self,
        registry: &mut ResourceRegistry,
        vertices: &[V],
        indices: &[u32],
    ) -> Result<(VertexBufferView, IndexBufferView), PipelineSetupError> {
        check_index_bounds(indices, addressable_vertex_count(vertices.len())?)?;
        let vertex_view = self.upload_vertex_data(registry, vertices)?;
        let index_view = self.upload_index_data(registry, indices)?;
        Ok((vertex_view, index_view))
    }

    fn upload(
        &self,
        what: &'static str,
        usage: wgpu::BufferUsages,
        bytes: &[u8],
    ) -> Result<GpuBuffer, PipelineSetupError> {
        let size = bytes.len() as u64;
        check_upload_size(what, size)?;

        let (buffer, err) = capture_device_error(self.device, || {
            self.device.create_buffer(&wgpu::BufferDescriptor {
                label: Some(what),
                size,
                usage,
                mapped_at_creation: true,
            })
        });
        if let Some(err) = err {
            return Err(PipelineSetupError::ResourceAllocationFailed {
                what,
                message: err.to_string(),
            });
        }

        write_mapped(&buffer, bytes)?;
        Ok(GpuBuffer { buffer, size })
    }
}

/// Vertex count as seen by 32-bit indices.
fn addressable_vertex_count(len: usize) -> Result<u32, PipelineSetupError> {
    u32::try_from(len).map_err(|_| PipelineSetupError::ResourceAllocationFailed {
        what: "vertex buffer",
        message: format!("{len} vertices exceed the 32-bit index range"),
    })
}

fn check_upload_size(what: &'static str, size: u64) -> Result<(), PipelineSetupError> {
    if size == 0 {
        return Err(PipelineSetupError::ResourceAllocationFailed {
            what,
            message: "nothing to upload".to_string(),
        });
    }
    if size % wgpu::COPY_BUFFER_ALIGNMENT != 0 {
        return Err(PipelineSetupError::ResourceAllocationFailed {
            what,
            message: format!(
                "{size} bytes is not a multiple of {}",
                wgpu::COPY_BUFFER_ALIGNMENT
            ),
        });
    }
    Ok(())
}
