//! Development front-end: the same animation core under winit + wgpu,
//! rendered in a single pass (glow backdrop + letter mesh, no bloom chain).

use std::time::{Instant, SystemTime, UNIX_EPOCH};
use wgpu::util::DeviceExt;
use winit::{event::*, event_loop::EventLoop, window::WindowBuilder};

use app_core::{
    Camera, FontGlyphSource, FrameUniforms, GlyphMesh, GlyphStyle, MeshVertex, PointerInput,
    SceneEvent, SweepAnimation, SweepParams,
};

const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

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

struct GpuState<'w> {
    window: &'w winit::window::Window,
    surface: wgpu::Surface<'w>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,

    letter_pipeline: wgpu::RenderPipeline,
    letter_uniforms: wgpu::Buffer,
    letter_bind_group: wgpu::BindGroup,
    letter_vb: Option<(wgpu::Buffer, u32)>,

    glow_pipeline: wgpu::RenderPipeline,
    glow_uniforms: wgpu::Buffer,
    glow_bind_group: wgpu::BindGroup,

    depth_view: wgpu::TextureView,
    width: u32,
    height: u32,
}

impl<'w> GpuState<'w> {
    async fn new(window: &'w winit::window::Window) -> anyhow::Result<Self> {
        let size = window.inner_size();
        let instance = wgpu::Instance::default();
        let surface = instance.create_surface(window)?;
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .ok_or_else(|| anyhow::anyhow!("No GPU adapter"))?;
        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    required_features: wgpu::Features::empty(),
                    required_limits: wgpu::Limits::default(),
                    memory_hints: wgpu::MemoryHints::Performance,
                    label: None,
                },
                None,
            )
            .await?;

        let surface_caps = surface.get_capabilities(&adapter);
        let format = surface_caps.formats[0];
        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::Fifo,
            alpha_mode: surface_caps.alpha_modes[0],
            desired_maximum_frame_latency: 2,
            view_formats: vec![],
        };
        surface.configure(&device, &config);

        let uniform_bgl_entry = |visibility| wgpu::BindGroupLayoutEntry {
            binding: 0,
            visibility,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: None,
            },
            count: None,
        };

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
            entries: &[uniform_bgl_entry(wgpu::ShaderStages::VERTEX_FRAGMENT)],
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
        let letter_pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("letter_pipeline"),
            layout: Some(&letter_pl),
            vertex: wgpu::VertexState {
                module: &letter_shader,
                entry_point: Some("vs_main"),
                buffers: &[wgpu::VertexBufferLayout {
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
                }],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            },
            primitive: wgpu::PrimitiveState::default(),
            depth_stencil: Some(wgpu::DepthStencilState {
                format: DEPTH_FORMAT,
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
                    format,
                    blend: None,
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            }),
            cache: None,
            multiview: None,
        });

        // Background glow pipeline
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
            entries: &[uniform_bgl_entry(wgpu::ShaderStages::FRAGMENT)],
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
                format: DEPTH_FORMAT,
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
                    format,
                    blend: None,
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            }),
            cache: None,
            multiview: None,
        });

        let depth_view = create_depth_view(&device, config.width, config.height);

        Ok(Self {
            window,
            surface,
            device,
            queue,
            config,
            letter_pipeline,
            letter_uniforms,
            letter_bind_group,
            letter_vb: None,
            glow_pipeline,
            glow_uniforms,
            glow_bind_group,
            depth_view,
            width: size.width.max(1),
            height: size.height.max(1),
        })
    }

    fn resize(&mut self, new_size: winit::dpi::PhysicalSize<u32>) {
        if new_size.width == 0 || new_size.height == 0 {
            return;
        }
        self.width = new_size.width;
        self.height = new_size.height;
        self.config.width = new_size.width;
        self.config.height = new_size.height;
        self.surface.configure(&self.device, &self.config);
        self.depth_view = create_depth_view(&self.device, self.width, self.height);
    }

    fn upload_letter_mesh(&mut self, mesh: &GlyphMesh) {
        let vb = self
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("letter_vb"),
                contents: bytemuck::cast_slice(&mesh.vertices),
                usage: wgpu::BufferUsages::VERTEX,
            });
        self.letter_vb = Some((vb, mesh.vertices.len() as u32));
    }

    fn clear_letter(&mut self) {
        self.letter_vb = None;
    }

    fn render(&mut self, frame: &FrameUniforms) -> Result<(), wgpu::SurfaceError> {
        let surface_frame = self.surface.get_current_texture()?;
        let view = surface_frame
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

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("encoder"),
            });
        {
            let mut rpass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("scene_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_view,
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
        surface_frame.present();
        Ok(())
    }
}

fn create_depth_view(device: &wgpu::Device, width: u32, height: u32) -> wgpu::TextureView {
    let tex = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("depth"),
        size: wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: DEPTH_FORMAT,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
        view_formats: &[],
    });
    tex.create_view(&wgpu::TextureViewDescriptor::default())
}

fn load_font_bytes() -> anyhow::Result<Vec<u8>> {
    if let Ok(path) = std::env::var("GLYPHSWEEP_FONT") {
        return std::fs::read(&path)
            .map_err(|e| anyhow::anyhow!("cannot read font at {path}: {e}"));
    }
    let candidates = [
        "/usr/share/fonts/truetype/dejavu/DejaVuSans-Bold.ttf",
        "/usr/share/fonts/TTF/DejaVuSans-Bold.ttf",
        "/System/Library/Fonts/Supplemental/Arial Bold.ttf",
        "C:\\Windows\\Fonts\\arialbd.ttf",
    ];
    for path in candidates {
        if let Ok(bytes) = std::fs::read(path) {
            log::info!("[font] using {path}");
            return Ok(bytes);
        }
    }
    Err(anyhow::anyhow!(
        "no usable font found; set GLYPHSWEEP_FONT to a TTF path"
    ))
}

fn main() -> anyhow::Result<()> {
    env_logger::builder()
        .filter_level(log::LevelFilter::Info)
        .init();

    let glyphs = FontGlyphSource::from_vec(load_font_bytes()?, GlyphStyle::default())
        .map_err(|e| anyhow::anyhow!("font parse failed: {e}"))?;

    let seed = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(42);
    let mut anim = SweepAnimation::new(SweepParams::default(), seed)
        .map_err(|e| anyhow::anyhow!("bad configuration: {e}"))?;

    let event_loop = EventLoop::new().expect("event loop");
    let window = WindowBuilder::new()
        .with_title("glyphsweep (native)")
        .build(&event_loop)
        .expect("window");

    let mut state = pollster::block_on(GpuState::new(&window)).expect("gpu");
    let started_at = Instant::now();

    let mut inputs: Vec<PointerInput> = Vec::new();
    let mut events: Vec<SceneEvent> = Vec::new();
    let mut cursor = (0.0_f32, 0.0_f32);

    event_loop
        .run(move |event, elwt| match event {
            Event::WindowEvent {
                event: WindowEvent::Resized(size),
                ..
            } => state.resize(size),
            Event::WindowEvent {
                event: WindowEvent::CloseRequested,
                ..
            } => elwt.exit(),
            Event::WindowEvent {
                event: WindowEvent::CursorMoved { position, .. },
                ..
            } => {
                cursor = (position.x as f32, position.y as f32);
                inputs.push(PointerInput::Move {
                    x: cursor.0,
                    y: cursor.1,
                });
            }
            Event::WindowEvent {
                event:
                    WindowEvent::MouseInput {
                        state: button_state,
                        button: MouseButton::Left,
                        ..
                    },
                ..
            } => {
                inputs.push(match button_state {
                    ElementState::Pressed => PointerInput::Down {
                        x: cursor.0,
                        y: cursor.1,
                    },
                    ElementState::Released => PointerInput::Up,
                });
            }
            Event::AboutToWait => {
                let now_ms = started_at.elapsed().as_secs_f64() * 1000.0;
                events.clear();
                let frame = anim.step(now_ms, &inputs, &glyphs, &mut events);
                inputs.clear();
                for ev in &events {
                    match *ev {
                        SceneEvent::LetterSpawned { ch } => match glyphs.mesh(ch) {
                            Ok(mesh) => state.upload_letter_mesh(&mesh),
                            Err(e) => log::error!("[frame] mesh build failed: {e}"),
                        },
                        SceneEvent::LetterCleared => state.clear_letter(),
                    }
                }
                match state.render(&frame) {
                    Ok(_) => state.window.request_redraw(),
                    Err(wgpu::SurfaceError::Lost) => state.resize(state.window.inner_size()),
                    Err(wgpu::SurfaceError::OutOfMemory) => elwt.exit(),
                    Err(_) => {}
                }
            }
            _ => {}
        })
        .unwrap();

    Ok(())
}
