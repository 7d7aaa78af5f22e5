use super::helpers;
use wgpu;

/// Offscreen targets for the render pipeline.
///
/// - `hdr_*` hold the scene color in Rgba16Float for post-processing.
/// - `bloom_*` are half-res ping-pong buffers for bright-pass and blur.
/// - `depth_*` backs the letter mesh's depth test in the scene pass.
pub(crate) struct RenderTargets {
    pub(crate) hdr_tex: wgpu::Texture,
    pub(crate) hdr_view: wgpu::TextureView,
    pub(crate) bloom_a: wgpu::Texture,
    pub(crate) bloom_a_view: wgpu::TextureView,
    pub(crate) bloom_b: wgpu::Texture,
    pub(crate) bloom_b_view: wgpu::TextureView,
    pub(crate) depth_tex: wgpu::Texture,
    pub(crate) depth_view: wgpu::TextureView,
}

impl RenderTargets {
    pub(crate) fn new(device: &wgpu::Device, width: u32, height: u32) -> Self {
        let hdr_format = wgpu::TextureFormat::Rgba16Float;
        let (hdr_tex, hdr_view) = helpers::create_color_texture(
            device,
            "hdr_tex",
            width,
            height,
            hdr_format,
            wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
        );
        let bw = (width.max(1) / 2).max(1);
        let bh = (height.max(1) / 2).max(1);
        let (bloom_a, bloom_a_view) = helpers::create_color_texture(
            device,
            "bloom_a",
            bw,
            bh,
            hdr_format,
            wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
        );
        let (bloom_b, bloom_b_view) = helpers::create_color_texture(
            device,
            "bloom_b",
            bw,
            bh,
            hdr_format,
            wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
        );
        let (depth_tex, depth_view) = helpers::create_depth_texture(device, "depth", width, height);
        Self {
            hdr_tex,
            hdr_view,
            bloom_a,
            bloom_a_view,
            bloom_b,
            bloom_b_view,
            depth_tex,
            depth_view,
        }
    }

    pub(crate) fn recreate(&mut self, device: &wgpu::Device, width: u32, height: u32) {
        *self = Self::new(device, width, height);
    }
}
