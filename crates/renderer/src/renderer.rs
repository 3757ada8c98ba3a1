//! Main renderer managing wgpu state and rendering.

use crate::{
    camera::{CameraUniform, Projection},
    lighting::LightUniform,
    mesh::{Mesh, SceneMeshes},
    pipeline::{
        create_lit_pipeline, create_overlay_pipeline, create_particle_pipeline,
        create_scene_bind_group_layout, create_texture_bind_group_layout,
    },
    texture::Texture,
    vertex::{InstanceData, OverlayVertex},
};
use anyhow::Result;
use procgen::TextureData;
use sim::{FrameOutput, SceneContext, ViewportView, MAX_VIEWPORTS};
use std::sync::Arc;
use thiserror::Error;
use wgpu::util::DeviceExt;
use winit::window::Window;

/// Instances the shared buffer can hold per frame: both viewports' worth of
/// static objects, vehicle and a full particle pool.
pub const MAX_INSTANCES: u32 = 4096;

const CLEAR_COLOR: wgpu::Color = wgpu::Color {
    r: 0.42,
    g: 0.6,
    b: 0.85,
    a: 1.0,
};

/// Outcome of a frame that could not be presented.
#[derive(Debug, Error)]
pub enum RenderError {
    /// Surface was lost or outdated and has been reconfigured; the frame is skipped.
    #[error("surface lost or outdated, reconfigured")]
    SurfaceLost,
    #[error("timed out acquiring the next surface texture")]
    Timeout,
    #[error("GPU out of memory")]
    OutOfMemory,
    #[error("surface error: {0}")]
    Other(String),
}

impl RenderError {
    /// The application should stop rendering.
    pub fn is_fatal(&self) -> bool {
        matches!(self, RenderError::OutOfMemory)
    }
}

impl From<wgpu::SurfaceError> for RenderError {
    #[allow(unreachable_patterns)]
    fn from(err: wgpu::SurfaceError) -> Self {
        match err {
            wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated => RenderError::SurfaceLost,
            wgpu::SurfaceError::Timeout => RenderError::Timeout,
            wgpu::SurfaceError::OutOfMemory => RenderError::OutOfMemory,
            other => RenderError::Other(other.to_string()),
        }
    }
}

/// Pixel rectangle a viewport occupies on the surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewportRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl ViewportRect {
    pub fn contains(&self, px: f32, py: f32) -> bool {
        px >= self.x as f32
            && py >= self.y as f32
            && px < (self.x + self.width) as f32
            && py < (self.y + self.height) as f32
    }
}

/// Split the surface side by side into `count` columns. The last column takes
/// any remainder so the whole width is covered.
pub fn viewport_rects(width: u32, height: u32, count: usize) -> Vec<ViewportRect> {
    let count = count.max(1) as u32;
    let column = width / count;
    (0..count)
        .map(|i| ViewportRect {
            x: i * column,
            y: 0,
            width: if i + 1 == count { width - i * column } else { column },
            height,
        })
        .collect()
}

/// One viewport's draws, resolved before the render pass opens.
struct ViewportDraw {
    rect: ViewportRect,
    objects: Vec<(usize, u32, u32)>,
    particles: (u32, u32),
}

pub struct Renderer {
    pub surface: wgpu::Surface<'static>,
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
    pub config: wgpu::SurfaceConfiguration,
    pub size: winit::dpi::PhysicalSize<u32>,
    pub window: Arc<Window>,

    lit_pipeline: wgpu::RenderPipeline,
    particle_pipeline: wgpu::RenderPipeline,
    overlay_pipeline: wgpu::RenderPipeline,

    // One camera buffer per viewport: queue writes land before the pass runs,
    // so viewports cannot share a buffer within a frame.
    camera_buffers: Vec<wgpu::Buffer>,
    scene_bind_groups: Vec<wgpu::BindGroup>,
    light_buffer: wgpu::Buffer,
    projection: Projection,

    glow_bind_group: wgpu::BindGroup,
    depth_texture: Texture,

    instance_buffer: wgpu::Buffer,
    max_instances: u32,
    /// Write offset into instance_buffer for the current frame. Each draw gets
    /// its own region.
    frame_instance_offset: u32,
}

impl Renderer {
    pub async fn new(window: Arc<Window>, vsync: bool, glow: &TextureData) -> Result<Self> {
        let size = window.inner_size();

        let instance = wgpu::Instance::new(wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let surface = instance.create_surface(window.clone())?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .ok_or_else(|| anyhow::anyhow!("Failed to find suitable GPU adapter"))?;

        log::info!("Using GPU: {:?}", adapter.get_info().name);

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

        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .copied()
            .or_else(|| surface_caps.formats.first().copied())
            .ok_or_else(|| anyhow::anyhow!("Surface reports no supported formats"))?;

        let present_mode = if vsync {
            wgpu::PresentMode::AutoVsync
        } else {
            wgpu::PresentMode::AutoNoVsync
        };

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode,
            alpha_mode: surface_caps
                .alpha_modes
                .first()
                .copied()
                .unwrap_or(wgpu::CompositeAlphaMode::Auto),
            view_formats: vec![],
            desired_maximum_frame_latency: 1,
        };
        surface.configure(&device, &config);
        log::info!(
            "Surface configured: {}x{} {:?}, {:?}",
            config.width,
            config.height,
            config.format,
            present_mode
        );

        let scene_layout = create_scene_bind_group_layout(&device);
        let texture_layout = create_texture_bind_group_layout(&device);

        let light_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Light Buffer"),
            contents: bytemuck::cast_slice(&[LightUniform::default()]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let mut camera_buffers = Vec::with_capacity(MAX_VIEWPORTS);
        let mut scene_bind_groups = Vec::with_capacity(MAX_VIEWPORTS);
        for i in 0..MAX_VIEWPORTS {
            let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(&format!("Camera Buffer {}", i)),
                contents: bytemuck::cast_slice(&[CameraUniform::new()]),
                usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            });
            scene_bind_groups.push(device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some(&format!("Scene Bind Group {}", i)),
                layout: &scene_layout,
                entries: &[
                    wgpu::BindGroupEntry {
                        binding: 0,
                        resource: buffer.as_entire_binding(),
                    },
                    wgpu::BindGroupEntry {
                        binding: 1,
                        resource: light_buffer.as_entire_binding(),
                    },
                ],
            }));
            camera_buffers.push(buffer);
        }

        let glow_texture = Texture::from_rgba(&device, &queue, glow.width, glow.height, &glow.pixels, "Glow Texture");
        let glow_bind_group = glow_texture.bind_group(&device, &texture_layout, "Glow Bind Group");

        let lit_pipeline = create_lit_pipeline(&device, config.format, &scene_layout);
        let particle_pipeline = create_particle_pipeline(&device, config.format, &scene_layout, &texture_layout);
        let overlay_pipeline = create_overlay_pipeline(&device, config.format);

        let depth_texture = Texture::create_depth_texture(&device, config.width, config.height, "Depth Texture");

        let max_instances = MAX_INSTANCES;
        let instance_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Instance Buffer"),
            size: (max_instances as usize * std::mem::size_of::<InstanceData>()) as u64,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        Ok(Self {
            surface,
            device,
            queue,
            config,
            size,
            window,
            lit_pipeline,
            particle_pipeline,
            overlay_pipeline,
            camera_buffers,
            scene_bind_groups,
            light_buffer,
            projection: Projection::default(),
            glow_bind_group,
            depth_texture,
            instance_buffer,
            max_instances,
            frame_instance_offset: 0,
        })
    }

    /// Handle window resize. Zero-area sizes are ignored.
    pub fn resize(&mut self, new_size: winit::dpi::PhysicalSize<u32>) {
        if new_size.width > 0 && new_size.height > 0 {
            self.size = new_size;
            self.config.width = new_size.width;
            self.config.height = new_size.height;
            self.surface.configure(&self.device, &self.config);
            self.depth_texture = Texture::create_depth_texture(
                &self.device,
                self.config.width,
                self.config.height,
                "Depth Texture",
            );
        }
    }

    /// Get surface dimensions.
    pub fn dimensions(&self) -> (u32, u32) {
        (self.config.width, self.config.height)
    }

    pub fn device(&self) -> &wgpu::Device {
        &self.device
    }

    /// Copy instances into this frame's region of the instance buffer.
    /// Returns the (first, count) range to draw; excess instances are dropped.
    fn push_instances(&mut self, instances: &[InstanceData]) -> (u32, u32) {
        let offset = self.frame_instance_offset;
        let remaining = self.max_instances.saturating_sub(offset) as usize;
        let count = instances.len().min(remaining);
        if count < instances.len() {
            log::warn!("Instance buffer full, dropping {} instances", instances.len() - count);
        }
        if count == 0 {
            return (offset, 0);
        }
        let byte_offset = (offset as usize * std::mem::size_of::<InstanceData>()) as u64;
        self.queue
            .write_buffer(&self.instance_buffer, byte_offset, bytemuck::cast_slice(&instances[..count]));
        self.frame_instance_offset = offset + count as u32;
        (offset, count as u32)
    }

    fn write_camera(&mut self, index: usize, view: &ViewportView, rect: ViewportRect) {
        self.projection.set_aspect(rect.width, rect.height);
        let mut uniform = CameraUniform::new();
        uniform.update(view.view_matrix(), view.eye, &self.projection);
        self.queue
            .write_buffer(&self.camera_buffers[index], 0, bytemuck::cast_slice(&[uniform]));
    }

    /// Upload uniforms and instances for one viewport.
    fn prepare_viewport(
        &mut self,
        index: usize,
        rect: ViewportRect,
        scene: &SceneContext,
        frame: &FrameOutput,
        view: &ViewportView,
    ) -> ViewportDraw {
        self.write_camera(index, view, rect);

        let mut objects = Vec::with_capacity(scene.objects.len() + 1);
        for (i, object) in scene.objects.iter().enumerate() {
            let (first, count) = self.push_instances(&[InstanceData::from_matrix(
                object.transform.to_matrix(),
                object.color,
            )]);
            objects.push((i, first, count));
        }
        // The vehicle is drawn after the static objects, tagged with their count.
        let (first, count) = self.push_instances(&[InstanceData::from_matrix(frame.vehicle_matrix, [1.0; 4])]);
        objects.push((scene.objects.len(), first, count));

        let particles: Vec<InstanceData> = view
            .particles
            .iter()
            .map(|p| InstanceData::from_matrix(p.transform, [p.intensity; 4]))
            .collect();
        let particles = self.push_instances(&particles);

        ViewportDraw {
            rect,
            objects,
            particles,
        }
    }

    /// Render one frame: every viewport, then the overlay, then present.
    pub fn render(
        &mut self,
        scene: &SceneContext,
        frame: &FrameOutput,
        meshes: &SceneMeshes,
        overlay: &[OverlayVertex],
    ) -> Result<(), RenderError> {
        let output = match self.surface.get_current_texture() {
            Ok(output) => output,
            Err(err @ (wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated)) => {
                log::warn!("Surface {:?}, reconfiguring", err);
                self.surface.configure(&self.device, &self.config);
                return Err(RenderError::SurfaceLost);
            }
            Err(err) => return Err(err.into()),
        };
        let view = output.texture.create_view(&wgpu::TextureViewDescriptor::default());

        self.frame_instance_offset = 0;
        self.queue
            .write_buffer(&self.light_buffer, 0, bytemuck::cast_slice(&[LightUniform::from_scene(scene)]));

        let views = &frame.views[..frame.views.len().min(MAX_VIEWPORTS)];
        let rects = viewport_rects(self.config.width, self.config.height, views.len());
        let draws: Vec<ViewportDraw> = views
            .iter()
            .zip(rects)
            .enumerate()
            .map(|(i, (v, rect))| self.prepare_viewport(i, rect, scene, frame, v))
            .collect();

        let mut encoder = self.device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("Render Encoder"),
        });

        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Scene Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(CLEAR_COLOR),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_texture.view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            pass.set_vertex_buffer(1, self.instance_buffer.slice(..));
            for (i, draw) in draws.iter().enumerate() {
                let r = draw.rect;
                pass.set_viewport(r.x as f32, r.y as f32, r.width as f32, r.height as f32, 0.0, 1.0);
                pass.set_scissor_rect(r.x, r.y, r.width, r.height);

                pass.set_pipeline(&self.lit_pipeline);
                pass.set_bind_group(0, &self.scene_bind_groups[i], &[]);
                for &(object, first, count) in &draw.objects {
                    let mesh = match scene.objects.get(object) {
                        Some(o) => meshes.mesh_for(o.kind),
                        None => &meshes.vehicle,
                    };
                    draw_mesh(&mut pass, mesh, first, count);
                }

                let (first, count) = draw.particles;
                if count > 0 {
                    pass.set_pipeline(&self.particle_pipeline);
                    pass.set_bind_group(0, &self.scene_bind_groups[i], &[]);
                    pass.set_bind_group(1, &self.glow_bind_group, &[]);
                    draw_mesh(&mut pass, &meshes.particle_quad, first, count);
                }
            }
        }

        self.render_overlay(&mut encoder, &view, overlay);

        self.queue.submit(std::iter::once(encoder.finish()));
        output.present();
        log::trace!("Presented frame with {} instances", self.frame_instance_offset);
        Ok(())
    }

    /// Screen-space overlay drawn over every viewport.
    fn render_overlay(&self, encoder: &mut wgpu::CommandEncoder, view: &wgpu::TextureView, vertices: &[OverlayVertex]) {
        if vertices.is_empty() {
            return;
        }

        let vertex_buffer = self.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Overlay Vertex Buffer"),
            contents: bytemuck::cast_slice(vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });

        let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Overlay Pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Load,
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
        });

        render_pass.set_pipeline(&self.overlay_pipeline);
        render_pass.set_vertex_buffer(0, vertex_buffer.slice(..));
        render_pass.draw(0..vertices.len() as u32, 0..1);
    }
}

fn draw_mesh(pass: &mut wgpu::RenderPass<'_>, mesh: &Mesh, first: u32, count: u32) {
    if count == 0 {
        return;
    }
    pass.set_vertex_buffer(0, mesh.vertex_buffer.slice(..));
    pass.set_index_buffer(mesh.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
    pass.draw_indexed(0..mesh.num_indices, 0, first..(first + count));
}
