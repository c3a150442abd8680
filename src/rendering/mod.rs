//! Rendering system with wgpu pipeline and shader management.

use bytemuck::{Pod, Zeroable};
use std::sync::Arc;
use wgpu::util::DeviceExt;
use winit::window::Window;

use crate::camera::CameraSystem;
use crate::controller::{FramePresenter, FrameView};
use crate::mesh::Vertex;
use crate::params::RenderConfig;

/// Quad corners drawn per point instance
const VERTICES_PER_POINT: u32 = 6;

/// Errors creating the rendering system
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("failed to create surface: {0}")]
    Surface(#[from] wgpu::CreateSurfaceError),
    #[error("no suitable GPU adapter found")]
    NoAdapter,
    #[error("failed to request device: {0}")]
    Device(#[from] wgpu::RequestDeviceError),
}

/// Uniform buffer for the point shader (matrices + shader parameters)
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct Uniforms {
    pub view_proj: [[f32; 4]; 4],
    pub model: [[f32; 4]; 4],
    pub start_color: [f32; 4],
    pub end_color: [f32; 4],
    pub viewport: [f32; 2],
    pub time: f32,
    pub size: f32,
    pub frequency: f32,
    pub amplitude: f32,
    pub offset_gain: f32,
    pub max_distance: f32,
}

impl Uniforms {
    /// Pack a frame's uniforms and camera into GPU layout
    pub fn from_frame(frame: &FrameView<'_>, render_config: &RenderConfig) -> Self {
        let (view_proj, _) =
            CameraSystem::create_view_proj_matrix(frame.camera_distance, render_config);
        let model = CameraSystem::model_matrix(frame.rotation);
        let u = frame.uniforms;
        let [sr, sg, sb] = u.start_color;
        let [er, eg, eb] = u.end_color;

        Self {
            view_proj: view_proj.to_cols_array_2d(),
            model: model.to_cols_array_2d(),
            start_color: [sr, sg, sb, 1.0],
            end_color: [er, eg, eb, 1.0],
            viewport: [
                render_config.window_width.max(1) as f32,
                render_config.window_height.max(1) as f32,
            ],
            time: u.time,
            size: u.size,
            frequency: u.frequency,
            amplitude: u.amplitude,
            offset_gain: u.offset_gain,
            max_distance: u.max_distance,
        }
    }
}

/// Rendering system managing wgpu device, pipeline, and buffers
pub struct RenderSystem {
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    surface_config: wgpu::SurfaceConfiguration,
    render_config: RenderConfig,
    render_pipeline: wgpu::RenderPipeline,
    uniform_buffer: wgpu::Buffer,
    uniform_bind_group: wgpu::BindGroup,
    /// Instance buffer holding the current mesh's points
    point_buffer: Option<wgpu::Buffer>,
    point_count: u32,
    /// Mesh generation currently uploaded
    uploaded_generation: Option<u64>,
}

impl RenderSystem {
    /// Create new rendering system
    pub async fn new(
        window: Arc<Window>,
        render_config: RenderConfig,
    ) -> Result<Self, RenderError> {
        let size = window.inner_size();
        let mut render_config = render_config;
        render_config.window_width = size.width.max(1);
        render_config.window_height = size.height.max(1);

        // Create wgpu instance
        let instance = wgpu::Instance::new(wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        // Create surface (window must have 'static lifetime via Arc)
        let surface = instance.create_surface(window)?;

        // Request adapter
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .ok_or(RenderError::NoAdapter)?;

        let info = adapter.get_info();
        log::info!("Using GPU: {} ({:?})", info.name, info.backend);

        // Request device
        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: Some("Main Device"),
                    required_features: wgpu::Features::empty(),
                    required_limits: wgpu::Limits::default(),
                    memory_hints: Default::default(),
                },
                None,
            )
            .await?;

        // Configure surface
        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .copied()
            .unwrap_or(surface_caps.formats[0]);

        // Prefer a compositor mode that honours the transparent clear colour
        let alpha_mode = [
            wgpu::CompositeAlphaMode::PreMultiplied,
            wgpu::CompositeAlphaMode::PostMultiplied,
        ]
        .into_iter()
        .find(|mode| surface_caps.alpha_modes.contains(mode))
        .unwrap_or(surface_caps.alpha_modes[0]);

        let surface_config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: render_config.window_width,
            height: render_config.window_height,
            present_mode: wgpu::PresentMode::Fifo,
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &surface_config);

        // Load shader
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Point Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("points.wgsl").into()),
        });

        let uniform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Uniform Buffer"),
            contents: bytemuck::cast_slice(&[Uniforms::zeroed()]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let uniform_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("Uniform Bind Group Layout"),
                entries: &[wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                }],
            });

        let uniform_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Uniform Bind Group"),
            layout: &uniform_bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });

        let render_pipeline_layout =
            device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some("Render Pipeline Layout"),
                bind_group_layouts: &[&uniform_bind_group_layout],
                push_constant_ranges: &[],
            });

        let render_pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Point Render Pipeline"),
            layout: Some(&render_pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                // One instance per point, expanded to a quad in the shader
                buffers: &[wgpu::VertexBufferLayout {
                    array_stride: std::mem::size_of::<Vertex>() as wgpu::BufferAddress,
                    step_mode: wgpu::VertexStepMode::Instance,
                    attributes: &[
                        wgpu::VertexAttribute {
                            offset: 0,
                            shader_location: 0,
                            format: wgpu::VertexFormat::Float32x3,
                        },
                        wgpu::VertexAttribute {
                            offset: std::mem::size_of::<[f32; 3]>() as wgpu::BufferAddress,
                            shader_location: 1,
                            format: wgpu::VertexFormat::Float32x2,
                        },
                    ],
                }],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: surface_config.format,
                    blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: None,
                polygon_mode: wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        });

        Ok(Self {
            surface,
            device,
            queue,
            surface_config,
            render_config,
            render_pipeline,
            uniform_buffer,
            uniform_bind_group,
            point_buffer: None,
            point_count: 0,
            uploaded_generation: None,
        })
    }

    /// Reconfigure the surface for a new window size
    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return; // Minimised
        }
        self.render_config.window_width = width;
        self.render_config.window_height = height;
        self.surface_config.width = width;
        self.surface_config.height = height;
        self.surface.configure(&self.device, &self.surface_config);
        log::debug!("Surface resized to {}x{}", width, height);
    }

    /// Upload the frame's mesh if it was replaced since the last upload
    fn sync_points(&mut self, frame: &FrameView<'_>) {
        if self.uploaded_generation == Some(frame.mesh_generation) {
            return;
        }
        let buffer = self
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Point Buffer"),
                contents: bytemuck::cast_slice(&frame.mesh.vertices),
                usage: wgpu::BufferUsages::VERTEX,
            });
        self.point_buffer = Some(buffer);
        self.point_count = frame.mesh.point_count() as u32;
        self.uploaded_generation = Some(frame.mesh_generation);
    }

    /// Update point shader uniforms
    fn update_uniforms(&self, uniforms: &Uniforms) {
        self.queue
            .write_buffer(&self.uniform_buffer, 0, bytemuck::cast_slice(&[*uniforms]));
    }

    /// Render a frame
    fn render(&self) -> Result<(), wgpu::SurfaceError> {
        let output = self.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });

        {
            let [r, g, b, a] = self.render_config.clear_color;
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color { r, g, b, a }),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            if let Some(ref point_buffer) = self.point_buffer {
                render_pass.set_pipeline(&self.render_pipeline);
                render_pass.set_bind_group(0, &self.uniform_bind_group, &[]);
                render_pass.set_vertex_buffer(0, point_buffer.slice(..));
                render_pass.draw(0..VERTICES_PER_POINT, 0..self.point_count);
            }
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        output.present();

        Ok(())
    }
}

impl FramePresenter for RenderSystem {
    fn present(&mut self, frame: &FrameView<'_>) {
        self.sync_points(frame);
        self.update_uniforms(&Uniforms::from_frame(frame, &self.render_config));

        match self.render() {
            Ok(()) => {}
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                log::warn!("Surface lost or outdated; reconfiguring");
                self.surface.configure(&self.device, &self.surface_config);
            }
            Err(wgpu::SurfaceError::Timeout) => log::warn!("Surface frame timed out"),
            Err(e) => log::error!("Render error: {:?}", e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::VisualizationController;
    use crate::presets::PresetTable;
    use glam::Vec2;

    #[test]
    fn test_uniforms_layout_matches_shader() {
        // 2 mat4 + 2 vec4 + vec2 + 6 scalars
        assert_eq!(std::mem::size_of::<Uniforms>(), 192);
        assert_eq!(std::mem::size_of::<Uniforms>() % 16, 0);
    }

    #[test]
    fn test_vertex_stride() {
        assert_eq!(std::mem::size_of::<Vertex>(), 20);
    }

    #[test]
    fn test_uniforms_from_frame() {
        let controller = VisualizationController::new(PresetTable::builtin());
        let render_config = RenderConfig::default();
        let frame = controller.frame_view();

        let uniforms = Uniforms::from_frame(&frame, &render_config);

        assert_eq!(uniforms.size, frame.uniforms.size);
        assert_eq!(uniforms.frequency, frame.uniforms.frequency);
        assert_eq!(uniforms.max_distance, frame.uniforms.max_distance);
        assert_eq!(uniforms.start_color[3], 1.0);
        assert_eq!(uniforms.viewport, [1280.0, 720.0]);
        // No rotation yet
        assert_eq!(uniforms.model, glam::Mat4::IDENTITY.to_cols_array_2d());
    }

    #[test]
    fn test_uniforms_carry_rotation() {
        let controller = VisualizationController::new(PresetTable::builtin());
        let mut frame = controller.frame_view();
        frame.rotation = Vec2::new(0.5, 0.25);

        let uniforms = Uniforms::from_frame(&frame, &RenderConfig::default());
        assert_ne!(uniforms.model, glam::Mat4::IDENTITY.to_cols_array_2d());
    }
}
