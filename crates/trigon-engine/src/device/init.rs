/// Initialization parameters for the GPU layer.
#[derive(Debug, Clone)]
pub struct GpuInit {
    /// Surface formats in order of preference.
    ///
    /// The first one the surface supports is used; the sample pipeline is
    /// built for 8-bit UNORM four-channel targets.
    pub color_formats: Vec<wgpu::TextureFormat>,

    /// Depth target format. Must be a depth format.
    pub depth_format: wgpu::TextureFormat,

    /// Present mode (swap behavior).
    pub present_mode: wgpu::PresentMode,

    /// Optional alpha mode preference for the surface.
    ///
    /// If provided but unsupported on the current surface, a supported mode is selected.
    pub alpha_mode: Option<wgpu::CompositeAlphaMode>,

    /// Color the render target is cleared to at the start of every frame.
    pub clear_color: wgpu::Color,

    /// Required wgpu features.
    pub required_features: wgpu::Features,

    /// Limits requested from the adapter/device.
    pub required_limits: wgpu::Limits,

    /// Desired maximum frame latency for the surface.
    ///
    /// This value is a hint; support depends on platform/backend.
    pub desired_maximum_frame_latency: u32,
}

impl Default for GpuInit {
    fn default() -> Self {
        Self {
            color_formats: vec![
                wgpu::TextureFormat::Rgba8Unorm,
                wgpu::TextureFormat::Bgra8Unorm,
            ],
            depth_format: wgpu::TextureFormat::Depth32Float,
            present_mode: wgpu::PresentMode::Fifo,
            alpha_mode: None,
            clear_color: wgpu::Color {
                r: 0.0,
                g: 0.2,
                b: 0.4,
                a: 1.0,
            },
            required_features: wgpu::Features::empty(),
            required_limits: wgpu::Limits::default(),
            desired_maximum_frame_latency: 2,
        }
    }
}
