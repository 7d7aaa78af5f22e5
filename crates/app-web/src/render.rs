use app_core::{Camera, FrameUniforms, GlyphMesh, MeshVertex, BLOOM_THRESHOLD};
use web_sys as web;
use wgpu::util::DeviceExt;

mod helpers;
mod post;
mod targets;

use targets::RenderTargets;

// ===================== uniform layouts =====================

#[repr(C)]
#[derive(Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub(crate) struct PostUniforms {
    resolution: [f32; 2],
    blur_dir: [f32; 2],
    bloom_strength: f32,
    threshold: f32,
    _pad: [f32; 2],
}

#[repr(C)]
#[derive(Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
struct LetterUniforms {
    view_proj: [[f32; 4]; 4],
    model: [[f32; 4]; 4],
    color: [f32; 3],
    sweep_time: f32,
    camera_pos: [f32; 3],
    pulse: f32,
    bbox_min_y: f32,
    bbox_max_y: f32,
    _pad: [f32; 2],
}

#[repr(C)]
#[derive(Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
struct GlowUniforms {
    color: [f32; 3],
    intensity: f32,
    center: [f32; 2],
    _pad: [f32; 2],
}

// ===================== WebGPU state =====================

pub struct GpuState<'a> {
    surface: wgpu::Surface<'a>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,

    targets: RenderTargets,
    linear_sampler: wgpu::Sampler,
    post: post::PostResources,
    bg_hdr: wgpu::BindGroup,
    bg_from_bloom_a: wgpu::BindGroup,
    bg_from_bloom_b: wgpu::BindGroup,
    bg_bloom_a_only: wgpu::BindGroup,
    bg_bloom_b_only: wgpu::BindGroup,

    letter_pipeline: wgpu::RenderPipeline,
    letter_uniforms: wgpu::Buffer,
    letter_bind_group: wgpu::BindGroup,
    letter_vb: Option<(wgpu::Buffer, u32)>,

    glow_pipeline: wgpu::RenderPipeline,
    glow_uniforms: wgpu::Buffer,
    glow_bind_group: wgpu::BindGroup,

    width: u32,
    height: u32,
}

impl<'a> GpuState<'a> {
    pub async fn new(canvas: &'a web::HtmlCanvasElement) -> anyhow::Result<Self> {
        let width = canvas.width();
        let height = canvas.height();

        let instance = wgpu::Instance::default();
        let surface = instance.create_surface(wgpu::SurfaceTarget::Canvas(canvas.clone()))?;
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .ok_or_else(|| anyhow::anyhow!("No WebGPU adapter"))?;
        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    required_features: wgpu::Features::empty(),
                    // Use default limits on web to avoid passing unknown fields to older WebGPU impls
                    required_limits: wgpu::Limits::default(),
                    memory_hints: wgpu::MemoryHints::Performance,
                    label: None,
                },
                None,
            )
            .await
            .map_err(|e| anyhow::anyhow!(format!("request_device error: {:?}", e)))?;
        let caps = surface.get_capabilities(&adapter);
        let format = caps
            .formats
            .iter()
            .copied()
            .find(|f| {
                matches!(
                    f,
                    wgpu::TextureFormat::Bgra8UnormSrgb | wgpu::TextureFormat::Rgba8UnormSrgb
                )
            })
            .unwrap_or(caps.formats[0]);
        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width,
            height,
            present_mode: wgpu::PresentMode::Fifo,
            alpha_mode: caps.alpha_modes[0],
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let hdr_format = wgpu::TextureFormat::Rgba16Float;
        let targets = RenderTargets::new(&device, width, height);

        // Letter mesh pipeline
        let letter_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("letter_shader"),
            source: wgpu::ShaderSource::Wgsl(app_core::LETTER_WGSL.into()),
        });
        let letter_uniforms = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("letter_uniforms"),
            size: std::mem::size_of::<LetterUniforms>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let letter_bgl = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("letter_bgl"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        });
        let letter_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("letter_bg"),
            layout: &letter_bgl,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: letter_uniforms.as_entire_binding(),
            }],
        });
        let letter_pl = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("letter_pl"),
            bind_group_layouts: &[&letter_bgl],
            push_constant_ranges: &[],
        });
        let letter_vertex_layout = wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<MeshVertex>() as u64,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &[
                wgpu::VertexAttribute {
                    format: wgpu::VertexFormat::Float32x3,
                    offset: 0,
                    shader_location: 0,
                },
                wgpu::VertexAttribute {
                    format: wgpu::VertexFormat::Float32x3,
                    offset: 12,
                    shader_location: 1,
                },
            ],
        };
        let letter_pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("letter_pipeline"),
            layout: Some(&letter_pl),
            vertex: wgpu::VertexState {
                module: &letter_shader,
                entry_point: Some("vs_main"),
                buffers: &[letter_vertex_layout],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            },
            primitive: wgpu::PrimitiveState::default(),
            depth_stencil: Some(wgpu::DepthStencilState {
                format: helpers::DEPTH_FORMAT,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::Less,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState::default(),
            fragment: Some(wgpu::FragmentState {
                module: &letter_shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: hdr_format,
                    blend: None,
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            }),
            cache: None,
            multiview: None,
        });

        // Background glow pipeline (fullscreen, drawn under the letter)
        let glow_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("glow_shader"),
            source: wgpu::ShaderSource::Wgsl(app_core::GLOW_WGSL.into()),
        });
        let glow_uniforms = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("glow_uniforms"),
            size: std::mem::size_of::<GlowUniforms>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let glow_bgl = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("glow_bgl"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        });
        let glow_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("glow_bg"),
            layout: &glow_bgl,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: glow_uniforms.as_entire_binding(),
            }],
        });
        let glow_pl = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("glow_pl"),
            bind_group_layouts: &[&glow_bgl],
            push_constant_ranges: &[],
        });
        let glow_pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("glow_pipeline"),
            layout: Some(&glow_pl),
            vertex: wgpu::VertexState {
                module: &glow_shader,
                entry_point: Some("vs_main"),
                buffers: &[],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            },
            primitive: wgpu::PrimitiveState::default(),
            depth_stencil: Some(wgpu::DepthStencilState {
                format: helpers::DEPTH_FORMAT,
                depth_write_enabled: false,
                depth_compare: wgpu::CompareFunction::Always,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState::default(),
            fragment: Some(wgpu::FragmentState {
                module: &glow_shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: hdr_format,
                    blend: None,
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            }),
            cache: None,
            multiview: None,
        });

        // Post shader + pipelines
        let post_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("post_shader"),
            source: wgpu::ShaderSource::Wgsl(app_core::POST_WGSL.into()),
        });
        let linear_sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("linear_sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });
        let post = post::create_post_resources(&device, &post_shader, hdr_format, format);
        let (bg_hdr, bg_from_bloom_a, bg_from_bloom_b, bg_bloom_a_only, bg_bloom_b_only) =
            post::rebuild_bind_groups(
                &device,
                &post,
                &linear_sampler,
                &targets.hdr_view,
                &targets.bloom_a_view,
                &targets.bloom_b_view,
            );

        Ok(Self {
            surface,
            device,
            queue,
            config,
            targets,
            linear_sampler,
            post,
            bg_hdr,
            bg_from_bloom_a,
            bg_from_bloom_b,
            bg_bloom_a_only,
            bg_bloom_b_only,
            letter_pipeline,
            letter_uniforms,
            letter_bind_group,
            letter_vb: None,
            glow_pipeline,
            glow_uniforms,
            glow_bind_group,
            width,
            height,
        })
    }

    /// Upload a freshly spawned letter's vertex data.
    pub fn upload_letter_mesh(&mut self, mesh: &GlyphMesh) {
        let vb = self
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("letter_vb"),
                contents: bytemuck::cast_slice(&mesh.vertices),
                usage: wgpu::BufferUsages::VERTEX,
            });
        self.letter_vb = Some((vb, mesh.vertices.len() as u32));
    }

    /// Drop the letter's GPU data when the blank phase starts.
    pub fn clear_letter(&mut self) {
        self.letter_vb = None;
    }

    pub fn resize_if_needed(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        if width != self.width || height != self.height {
            self.width = width;
            self.height = height;
            self.config.width = width;
            self.config.height = height;
            self.surface.configure(&self.device, &self.config);

            self.targets.recreate(&self.device, width, height);
            let (bg_hdr, bg_from_a, bg_from_b, bg_a_only, bg_b_only) = post::rebuild_bind_groups(
                &self.device,
                &self.post,
                &self.linear_sampler,
                &self.targets.hdr_view,
                &self.targets.bloom_a_view,
                &self.targets.bloom_b_view,
            );
            self.bg_hdr = bg_hdr;
            self.bg_from_bloom_a = bg_from_a;
            self.bg_from_bloom_b = bg_from_b;
            self.bg_bloom_a_only = bg_a_only;
            self.bg_bloom_b_only = bg_b_only;
        }
    }

    pub fn render(&mut self, frame: &FrameUniforms) -> Result<(), wgpu::SurfaceError> {
        let surface_frame = self.surface.get_current_texture()?;
        let surface_view = surface_frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let camera = Camera::facing_letter(self.width as f32 / self.height.max(1) as f32);
        let view_proj = (camera.projection_matrix() * camera.view_matrix()).to_cols_array_2d();

        self.queue.write_buffer(
            &self.glow_uniforms,
            0,
            bytemuck::bytes_of(&GlowUniforms {
                color: frame.glow.color,
                intensity: frame.glow.intensity,
                center: frame.glow.center_uv,
                _pad: [0.0; 2],
            }),
        );
        if let Some(letter) = &frame.letter {
            self.queue.write_buffer(
                &self.letter_uniforms,
                0,
                bytemuck::bytes_of(&LetterUniforms {
                    view_proj,
                    model: letter.model_matrix().to_cols_array_2d(),
                    color: letter.color,
                    sweep_time: letter.progress,
                    camera_pos: camera.eye.to_array(),
                    pulse: letter.pulse,
                    bbox_min_y: letter.bounds.min.y,
                    bbox_max_y: letter.bounds.max.y,
                    _pad: [0.0; 2],
                }),
            );
        }

        // Pass 1: scene into HDR (glow backdrop, then the letter mesh)
        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("scene_encoder"),
            });
        {
            let mut rpass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("scene_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &self.targets.hdr_view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.targets.depth_view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            });
            rpass.set_pipeline(&self.glow_pipeline);
            rpass.set_bind_group(0, &self.glow_bind_group, &[]);
            rpass.draw(0..3, 0..1);

            if let (Some((vb, count)), Some(_)) = (&self.letter_vb, &frame.letter) {
                rpass.set_pipeline(&self.letter_pipeline);
                rpass.set_bind_group(0, &self.letter_bind_group, &[]);
                rpass.set_vertex_buffer(0, vb.slice(..));
                rpass.draw(0..*count, 0..1);
            }
        }
        self.queue.submit(Some(encoder.finish()));

        // The post uniform buffer is reused across passes, so each stage is
        // written and submitted separately; a single submission would make
        // every pass read the last write.
        let res = [self.width as f32 / 2.0, self.height as f32 / 2.0];
        let strength = frame.bloom_strength;

        // Pass 2: bright pass -> bloom_a
        post::write_post_uniforms(
            &self.queue,
            &self.post.uniform_buffer,
            res,
            [0.0, 0.0],
            strength,
            BLOOM_THRESHOLD,
        );
        self.run_blit("bright_pass", |s, enc| {
            post::blit(
                enc,
                "bright_pass",
                &s.targets.bloom_a_view,
                wgpu::Color::BLACK,
                &s.post.bright_pipeline,
                &s.bg_hdr,
                None,
            );
        });

        // Pass 3: horizontal blur bloom_a -> bloom_b
        post::write_post_uniforms(
            &self.queue,
            &self.post.uniform_buffer,
            res,
            [1.0, 0.0],
            strength,
            BLOOM_THRESHOLD,
        );
        self.run_blit("blur_h", |s, enc| {
            post::blit(
                enc,
                "blur_h",
                &s.targets.bloom_b_view,
                wgpu::Color::BLACK,
                &s.post.blur_pipeline,
                &s.bg_from_bloom_a,
                None,
            );
        });

        // Pass 4: vertical blur bloom_b -> bloom_a
        post::write_post_uniforms(
            &self.queue,
            &self.post.uniform_buffer,
            res,
            [0.0, 1.0],
            strength,
            BLOOM_THRESHOLD,
        );
        self.run_blit("blur_v", |s, enc| {
            post::blit(
                enc,
                "blur_v",
                &s.targets.bloom_a_view,
                wgpu::Color::BLACK,
                &s.post.blur_pipeline,
                &s.bg_from_bloom_b,
                None,
            );
        });

        // Pass 5: composite to the swapchain
        post::write_post_uniforms(
            &self.queue,
            &self.post.uniform_buffer,
            res,
            [0.0, 0.0],
            strength,
            BLOOM_THRESHOLD,
        );
        self.run_blit("composite", |s, enc| {
            post::blit(
                enc,
                "composite",
                &surface_view,
                wgpu::Color::BLACK,
                &s.post.composite_pipeline,
                &s.bg_hdr,
                Some(&s.bg_bloom_a_only),
            );
        });

        surface_frame.present();
        Ok(())
    }

    fn run_blit(&mut self, label: &str, f: impl FnOnce(&Self, &mut wgpu::CommandEncoder)) {
        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor { label: Some(label) });
        f(self, &mut encoder);
        self.queue.submit(Some(encoder.finish()));
    }
}
