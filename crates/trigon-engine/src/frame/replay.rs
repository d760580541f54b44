//! Replays a recorded [`CommandList`] onto a wgpu render pass.

use thiserror::Error;

use crate::resource::{BufferId, PipelineId, ResourceRegistry, RootSignatureId};

use super::command::{CommandList, RenderCommand};

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ReplayError {
    #[error("command {0}: pipeline state bound before a root signature")]
    PipelineWithoutRootSignature(usize),
    #[error("command {0}: draw issued without a pipeline state")]
    DrawWithoutPipeline(usize),
    #[error("command {0}: indexed draw issued without an index buffer")]
    DrawWithoutIndexBuffer(usize),
    #[error("command {index}: unknown root signature {id:?}")]
    UnknownRootSignature { index: usize, id: RootSignatureId },
    #[error("command {index}: unknown pipeline state {id:?}")]
    UnknownPipeline { index: usize, id: PipelineId },
    #[error("command {index}: unknown buffer {id:?}")]
    UnknownBuffer { index: usize, id: BufferId },
    #[error("command {0}: pipeline state was created against a different root signature")]
    IncompatibleRootSignature(usize),
    #[error(
        "command {index}: vertex slot {slot} stride {bound} does not match pipeline stride {expected}"
    )]
    StrideMismatch {
        index: usize,
        slot: u32,
        bound: u64,
        expected: u64,
    },
    #[error("command {index}: view of {view} bytes exceeds its {buffer}-byte buffer")]
    ViewOutOfRange { index: usize, view: u64, buffer: u64 },
}

/// Checks binding order without touching any resource.
///
/// Root signature before pipeline, pipeline before draw, index buffer before
/// an indexed draw.
pub fn validate_order(list: &CommandList) -> Result<(), ReplayError> {
    let mut root_bound = false;
    let mut pipeline_bound = false;
    let mut index_bound = false;

    for (index, cmd) in list.commands().iter().enumerate() {
        match cmd {
            RenderCommand::SetGraphicsRootSignature(_) => root_bound = true,
            RenderCommand::SetPipelineState(_) => {
                if !root_bound {
                    return Err(ReplayError::PipelineWithoutRootSignature(index));
                }
                pipeline_bound = true;
            }
            RenderCommand::SetVertexBuffers { .. } => {}
            RenderCommand::SetIndexBuffer(_) => index_bound = true,
            RenderCommand::DrawIndexedInstanced(_) => {
                if !pipeline_bound {
                    return Err(ReplayError::DrawWithoutPipeline(index));
                }
                if !index_bound {
                    return Err(ReplayError::DrawWithoutIndexBuffer(index));
                }
            }
        }
    }

    Ok(())
}

/// Encodes `list` into `pass`, resolving ids through `resources`.
///
/// Nothing is encoded when validation fails part-way: every command is
/// resolved first, then the pass is recorded.
pub fn replay(
    list: &CommandList,
    resources: &ResourceRegistry,
    pass: &mut wgpu::RenderPass<'_>,
) -> Result<(), ReplayError> {
    validate_order(list)?;
    let resolved = resolve(list, resources)?;

    for op in resolved {
        match op {
            Op::Pipeline(pipeline) => pass.set_pipeline(pipeline),
            Op::VertexBuffer { slot, buffer, size } => {
                pass.set_vertex_buffer(slot, buffer.slice(0..size))
            }
            Op::IndexBuffer {
                buffer,
                size,
                format,
            } => pass.set_index_buffer(buffer.slice(0..size), format),
            Op::Draw(args) => {
                let first = args.start_index_location;
                let instances = args.start_instance_location;
                pass.draw_indexed(
                    first..first + args.index_count_per_instance,
                    args.base_vertex_location,
                    instances..instances + args.instance_count,
                );
            }
        }
    }

    Ok(())
}

enum Op<'r> {
    Pipeline(&'r wgpu::RenderPipeline),
    VertexBuffer {
        slot: u32,
        buffer: &'r wgpu::Buffer,
        size: u64,
    },
    IndexBuffer {
        buffer: &'r wgpu::Buffer,
        size: u64,
        format: wgpu::IndexFormat,
    },
    Draw(super::command::DrawIndexedArgs),
}

fn resolve<'r>(
    list: &CommandList,
    resources: &'r ResourceRegistry,
) -> Result<Vec<Op<'r>>, ReplayError> {
    let mut ops = Vec::with_capacity(list.commands().len());
    let mut root = None;
    let mut pipeline = None;
    let mut vertex_strides: Vec<Option<u64>> = Vec::new();

    for (index, cmd) in list.commands().iter().enumerate() {
        match cmd {
            RenderCommand::SetGraphicsRootSignature(id) => {
                let rs = resources
                    .root_signature(*id)
                    .ok_or(ReplayError::UnknownRootSignature { index, id: *id })?;
                root = Some(rs.blob());
            }
            RenderCommand::SetPipelineState(id) => {
                let ps = resources
                    .pipeline(*id)
                    .ok_or(ReplayError::UnknownPipeline { index, id: *id })?;
                if root != Some(ps.root_signature()) {
                    return Err(ReplayError::IncompatibleRootSignature(index));
                }
                pipeline = Some(ps);
                ops.push(Op::Pipeline(ps.raw()));
            }
            RenderCommand::SetVertexBuffers { start_slot, views } => {
                for (offset, view) in views.iter().enumerate() {
                    let slot = start_slot + offset as u32;
                    let buffer = resources
                        .buffer(view.buffer)
                        .ok_or(ReplayError::UnknownBuffer { index, id: view.buffer })?;
                    if view.size_in_bytes > buffer.size() {
                        return Err(ReplayError::ViewOutOfRange {
                            index,
                            view: view.size_in_bytes,
                            buffer: buffer.size(),
                        });
                    }
                    if vertex_strides.len() <= slot as usize {
                        vertex_strides.resize(slot as usize + 1, None);
                    }
                    vertex_strides[slot as usize] = Some(u64::from(view.stride_in_bytes));
                    ops.push(Op::VertexBuffer {
                        slot,
                        buffer: buffer.raw(),
                        size: view.size_in_bytes,
                    });
                }
            }
            RenderCommand::SetIndexBuffer(view) => {
                let buffer = resources
                    .buffer(view.buffer)
                    .ok_or(ReplayError::UnknownBuffer { index, id: view.buffer })?;
                if view.size_in_bytes > buffer.size() {
                    return Err(ReplayError::ViewOutOfRange {
                        index,
                        view: view.size_in_bytes,
                        buffer: buffer.size(),
                    });
                }
                ops.push(Op::IndexBuffer {
                    buffer: buffer.raw(),
                    size: view.size_in_bytes,
                    format: view.format.to_wgpu(),
                });
            }
            RenderCommand::DrawIndexedInstanced(args) => {
                let Some(ps) = pipeline else {
                    return Err(ReplayError::DrawWithoutPipeline(index));
                };
                for (slot, &expected) in ps.vertex_strides().iter().enumerate() {
                    if expected == 0 {
                        continue;
                    }
                    let bound = vertex_strides.get(slot).copied().flatten().unwrap_or(0);
                    if bound != expected {
                        return Err(ReplayError::StrideMismatch {
                            index,
                            slot: slot as u32,
                            bound,
                            expected,
                        });
                    }
                }
                ops.push(Op::Draw(*args));
            }
        }
    }

    Ok(ops)
}
