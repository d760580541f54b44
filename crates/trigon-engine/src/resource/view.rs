use crate::pipeline::PipelineSetupError;

/// Handle to a buffer owned by a [`super::ResourceRegistry`].
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct BufferId(pub(crate) u32);

/// Handle to a root signature owned by a [`super::ResourceRegistry`].
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct RootSignatureId(pub(crate) u32);

/// Handle to a pipeline state owned by a [`super::ResourceRegistry`].
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct PipelineId(pub(crate) u32);

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum IndexFormat {
    Uint16,
    Uint32,
}

impl IndexFormat {
    pub fn size(self) -> u64 {
        match self {
            IndexFormat::Uint16 => 2,
            IndexFormat::Uint32 => 4,
        }
    }

    pub(crate) fn to_wgpu(self) -> wgpu::IndexFormat {
        match self {
            IndexFormat::Uint16 => wgpu::IndexFormat::Uint16,
            IndexFormat::Uint32 => wgpu::IndexFormat::Uint32,
        }
    }
}

/// How a draw reads a vertex buffer.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct VertexBufferView {
    pub buffer: BufferId,
    pub size_in_bytes: u64,
    pub stride_in_bytes: u32,
}

impl VertexBufferView {
    /// View over `count` records of type `V`.
    pub fn for_records<V>(buffer: BufferId, count: usize) -> Self {
        let stride = std::mem::size_of::<V>();
        Self {
            buffer,
            size_in_bytes: (count * stride) as u64,
            stride_in_bytes: stride as u32,
        }
    }

    pub fn element_count(&self) -> u64 {
        if self.stride_in_bytes == 0 {
            0
        } else {
            self.size_in_bytes / u64::from(self.stride_in_bytes)
        }
    }
}

/// How a draw reads an index buffer.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct IndexBufferView {
    pub buffer: BufferId,
    pub size_in_bytes: u64,
    pub format: IndexFormat,
    /// Largest index stored in the buffer.
    pub max_index: u32,
}

impl IndexBufferView {
    pub fn for_indices(
        buffer: BufferId,
        count: usize,
        format: IndexFormat,
        max_index: u32,
    ) -> Self {
        Self {
            buffer,
            size_in_bytes: count as u64 * format.size(),
            format,
            max_index,
        }
    }

    /// View over 32-bit `indices`, recording their maximum.
    pub fn for_u32_indices(buffer: BufferId, indices: &[u32]) -> Self {
        let max_index = indices.iter().copied().max().unwrap_or(0);
        Self::for_indices(buffer, indices.len(), IndexFormat::Uint32, max_index)
    }

    pub fn element_count(&self) -> u64 {
        self.size_in_bytes / self.format.size()
    }
}

/// Fails on the first index that does not address one of `vertex_count` vertices.
pub fn check_index_bounds(indices: &[u32], vertex_count: u32) -> Result<(), PipelineSetupError> {
    match indices.iter().position(|&i| i >= vertex_count) {
        Some(position) => Err(PipelineSetupError::IndexOutOfBounds {
            index: indices[position],
            position,
            vertex_count,
        }),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vertex_view_size_is_count_times_stride() {
        let view = VertexBufferView::for_records::<[f32; 3]>(BufferId(0), 3);
        assert_eq!(view.size_in_bytes, 36);
        assert_eq!(view.stride_in_bytes, 12);
        assert_eq!(view.element_count(), 3);
    }

    #[test]
    fn index_view_size_follows_format() {
        let view = IndexBufferView::for_indices(BufferId(1), 3, IndexFormat::Uint32, 2);
        assert_eq!(view.size_in_bytes, 12);
        assert_eq!(view.element_count(), 3);

        let short = IndexBufferView::for_indices(BufferId(1), 3, IndexFormat::Uint16, 2);
        assert_eq!(short.size_in_bytes, 6);
    }

    #[test]
    fn u32_view_records_the_largest_index() {
        let view = IndexBufferView::for_u32_indices(BufferId(1), &[2, 0, 5, 1]);
        assert_eq!(view.max_index, 5);
        assert_eq!(view.element_count(), 4);
        assert_eq!(view.format, IndexFormat::Uint32);

        assert_eq!(IndexBufferView::for_u32_indices(BufferId(1), &[]).max_index, 0);
    }

    #[test]
    fn indices_within_vertex_count_pass() {
        assert_eq!(check_index_bounds(&[0, 1, 2], 3), Ok(()));
        assert_eq!(check_index_bounds(&[], 0), Ok(()));
    }

    #[test]
    fn index_equal_to_vertex_count_is_out_of_bounds() {
        assert_eq!(
            check_index_bounds(&[0, 3, 1], 3),
            Err(PipelineSetupError::IndexOutOfBounds {
                index: 3,
                position: 1,
                vertex_count: 3,
            })
        );
    }
}
