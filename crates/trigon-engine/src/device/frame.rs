/// Represents a single acquired frame.
///
/// Held between `begin_render` and `end_render`. Holding the surface texture
/// prevents acquisition of subsequent frames.
pub struct GpuFrame {
    pub surface_texture: wgpu::SurfaceTexture,
    pub view: wgpu::TextureView,
    pub encoder: wgpu::CommandEncoder,
}
