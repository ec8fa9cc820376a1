/// A single acquired swapchain frame.
///
/// Holding the surface texture blocks acquisition of the next one, so the
/// frame must be submitted before the callback that acquired it returns.
pub struct GpuFrame {
    pub surface_texture: wgpu::SurfaceTexture,
    pub view: wgpu::TextureView,
    pub encoder: wgpu::CommandEncoder,
}
