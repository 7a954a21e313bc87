/// An acquired swapchain image plus the encoder recording into it.
///
/// Hand it back to `Gpu::submit` before acquiring the next one.
pub struct GpuFrame {
    pub(crate) texture: wgpu::SurfaceTexture,
    pub color_view: wgpu::TextureView,
    pub encoder: wgpu::CommandEncoder,
}
