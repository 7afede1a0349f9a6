use super::helpers;
use wgpu;

pub(crate) const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth24Plus;

/// Depth buffer plus, when multisampling, the MSAA color target that resolves
/// into the swapchain. Both track the surface size.
pub(crate) struct RenderTargets {
    pub(crate) depth_view: wgpu::TextureView,
    pub(crate) msaa_view: Option<wgpu::TextureView>,
    sample_count: u32,
    color_format: wgpu::TextureFormat,
    _depth_tex: wgpu::Texture,
    _msaa_tex: Option<wgpu::Texture>,
}

impl RenderTargets {
    pub(crate) fn new(
        device: &wgpu::Device,
        width: u32,
        height: u32,
        color_format: wgpu::TextureFormat,
        sample_count: u32,
    ) -> Self {
        let (depth_tex, depth_view) =
            helpers::create_render_texture(device, "fx_depth", width, height, DEPTH_FORMAT, sample_count);
        let (msaa_tex, msaa_view) = if sample_count > 1 {
            let (t, v) = helpers::create_render_texture(
                device,
                "fx_msaa",
                width,
                height,
                color_format,
                sample_count,
            );
            (Some(t), Some(v))
        } else {
            (None, None)
        };
        Self {
            depth_view,
            msaa_view,
            sample_count,
            color_format,
            _depth_tex: depth_tex,
            _msaa_tex: msaa_tex,
        }
    }

    pub(crate) fn recreate(&mut self, device: &wgpu::Device, width: u32, height: u32) {
        *self = Self::new(device, width, height, self.color_format, self.sample_count);
    }
}
