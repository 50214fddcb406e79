// GPU side of the point field: the sprite pipeline lives in egui-wgpu's callback
// resources, and each frame is recorded into a paint callback that uploads the
// trail uniforms and draws one instanced quad per grid point.
pub mod uniform;

use std::sync::Arc;

use anyhow::{Context, Result};
use egui_wgpu::wgpu::{self, util::DeviceExt};
use trail::{
    Clock, DriverState, FrameDriver, GridPoint, PointField, RenderStage, Tick, UniformPayload,
    Viewport,
};
use uniform::Uniform;

pub use uniform::TRAIL_SLOTS;

/// Vertices per sprite quad, drawn as a triangle strip.
const QUAD_VERTICES: u32 = 4;

/// Handle to the sprite pipeline registered with egui's wgpu renderer.
pub struct SpriteRenderer {
    target_format: wgpu::TextureFormat,
    last_frame: Option<SpriteCallback>,
}

impl SpriteRenderer {
    pub fn new<'a>(cc: &'a eframe::CreationContext<'a>) -> Result<Self> {
        let wgpu_render_state = cc
            .wgpu_render_state
            .as_ref()
            .context("no wgpu render state, eframe must run with the wgpu renderer")?;
        Ok(Self::from_render_state(wgpu_render_state))
    }

    pub fn from_render_state(wgpu_render_state: &egui_wgpu::RenderState) -> Self {
        let device = &wgpu_render_state.device;

        let sprite_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("sprite_shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("./sprite_shader.wgsl").into()),
        });

        let background_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("sprite_background_shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("./background_shader.wgsl").into()),
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("sprite_bind_group_layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: wgpu::BufferSize::new(std::mem::size_of::<Uniform>() as u64),
                },
                count: None,
            }],
        });

        let blended_target = wgpu::ColorTargetState {
            format: wgpu_render_state.target_format,
            blend: Some(wgpu::BlendState::PREMULTIPLIED_ALPHA_BLENDING),
            write_mask: wgpu::ColorWrites::ALL,
        };

        let background_pipeline_layout =
            device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some("sprite_background_pipeline_layout"),
                bind_group_layouts: &[],
                push_constant_ranges: &[],
            });

        let background_pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("sprite_pipeline_background"),
            layout: Some(&background_pipeline_layout),
            vertex: wgpu::VertexState {
                module: &background_shader,
                entry_point: Some("vs_main"),
                buffers: &[],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &background_shader,
                entry_point: Some("fs_main"),
                targets: &[Some(blended_target.clone())],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            }),
            primitive: wgpu::PrimitiveState::default(),
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        });

        let sprite_pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("sprite_pipeline_layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let sprite_pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("sprite_pipeline"),
            layout: Some(&sprite_pipeline_layout),
            vertex: wgpu::VertexState {
                module: &sprite_shader,
                entry_point: Some("vs_main"),
                buffers: &[wgpu::VertexBufferLayout {
                    array_stride: std::mem::size_of::<GridPoint>() as wgpu::BufferAddress,
                    step_mode: wgpu::VertexStepMode::Instance,
                    attributes: &wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x4, 2 => Float32],
                }],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &sprite_shader,
                entry_point: Some("fs_main"),
                targets: &[Some(blended_target)],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleStrip,
                ..Default::default()
            },
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        });

        let uniform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("sprite_uniforms"),
            contents: bytemuck::cast_slice(&[Uniform::default()]),
            usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::UNIFORM,
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("sprite_bind_group"),
            layout: &bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });

        log::info!(
            "sprite pipeline ready (target {:?}, {} trail slots)",
            wgpu_render_state.target_format,
            TRAIL_SLOTS
        );

        // pipelines must outlive egui's render pass, so they live in its callback resources
        wgpu_render_state
            .renderer
            .write()
            .callback_resources
            .insert(SpriteRenderResources {
                background_pipeline,
                sprite_pipeline,
                bind_group,
                uniform_buffer,
                instance_buffer: None,
                instance_generation: None,
                instance_count: 0,
            });

        Self {
            target_format: wgpu_render_state.target_format,
            last_frame: None,
        }
    }

    pub fn target_format(&self) -> wgpu::TextureFormat {
        self.target_format
    }

    /// Starts recording a frame that will be painted into `rect`.
    pub fn stage<'p>(&'p mut self, painter: &'p egui::Painter, rect: egui::Rect) -> SpriteStage<'p> {
        SpriteStage {
            painter,
            rect,
            bound: false,
            points: None,
            uniform: Uniform::default(),
            last_frame: &mut self.last_frame,
        }
    }

    /// Ticks `driver` into `rect`. Once the driver has stopped, the last frame it
    /// drew keeps being painted so the field stays frozen on screen.
    pub fn paint_frame<C: Clock>(
        &mut self,
        driver: &mut FrameDriver<C>,
        painter: &egui::Painter,
        rect: egui::Rect,
    ) -> Tick {
        let tick = driver.tick(&mut self.stage(painter, rect));
        if driver.state() == DriverState::Stopped {
            self.paint_last(painter, rect);
        }
        tick
    }

    /// Re-adds the most recent frame, stretched to `rect`. Returns false if nothing
    /// was drawn yet or `rect` is empty.
    pub fn paint_last(&self, painter: &egui::Painter, rect: egui::Rect) -> bool {
        let Some(frame) = &self.last_frame else {
            return false;
        };
        if Viewport::new(rect.width(), rect.height()).is_empty() {
            return false;
        }
        let mut frame = frame.clone();
        frame.uniform.viewport_size = [rect.width(), rect.height()];
        painter.add(egui_wgpu::Callback::new_paint_callback(rect, frame));
        true
    }

    pub fn has_frame(&self) -> bool {
        self.last_frame.is_some()
    }
}

/// [`RenderStage`] backed by an egui paint callback. `draw` hands the recorded
/// frame to the painter; nothing reaches the GPU until egui renders.
pub struct SpriteStage<'p> {
    painter: &'p egui::Painter,
    rect: egui::Rect,
    bound: bool,
    points: Option<(u64, Arc<[GridPoint]>)>,
    uniform: Uniform,
    last_frame: &'p mut Option<SpriteCallback>,
}

impl RenderStage for SpriteStage<'_> {
    fn bind(&mut self) {
        self.bound = true;
    }

    fn set_attributes(&mut self, field: &PointField) {
        self.points = Some((field.generation(), Arc::clone(field.points())));
    }

    fn set_uniforms(&mut self, payload: &UniformPayload<'_>) {
        let viewport = Viewport::new(self.rect.width(), self.rect.height());
        self.uniform = Uniform::new(viewport, payload);
    }

    fn draw(&mut self, point_count: u32) {
        if !self.bound {
            log::warn!("sprite draw without bind, skipping frame");
            return;
        }
        let Some((generation, points)) = self.points.take() else {
            log::warn!("sprite draw without attributes, skipping frame");
            return;
        };
        let frame = SpriteCallback {
            uniform: self.uniform,
            generation,
            points,
            point_count,
        };
        *self.last_frame = Some(frame.clone());
        self.painter
            .add(egui_wgpu::Callback::new_paint_callback(self.rect, frame));
    }
}

/// One recorded frame. `prepare` uploads it, `paint` draws it.
#[derive(Clone)]
struct SpriteCallback {
    uniform: Uniform,
    generation: u64,
    points: Arc<[GridPoint]>,
    point_count: u32,
}

impl egui_wgpu::CallbackTrait for SpriteCallback {
    fn prepare(
        &self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        _screen_descriptor: &egui_wgpu::ScreenDescriptor,
        _egui_encoder: &mut wgpu::CommandEncoder,
        resources: &mut egui_wgpu::CallbackResources,
    ) -> Vec<wgpu::CommandBuffer> {
        let resources: &mut SpriteRenderResources = resources
            .get_mut()
            .expect("sprite resources are registered by SpriteRenderer::new");
        resources.prepare(device, queue, self);
        Vec::new()
    }

    fn paint(
        &self,
        _info: egui::PaintCallbackInfo,
        render_pass: &mut wgpu::RenderPass<'static>,
        resources: &egui_wgpu::CallbackResources,
    ) {
        let resources: &SpriteRenderResources = resources
            .get()
            .expect("sprite resources are registered by SpriteRenderer::new");
        resources.paint(render_pass, self.point_count);
    }
}

struct SpriteRenderResources {
    background_pipeline: wgpu::RenderPipeline,
    sprite_pipeline: wgpu::RenderPipeline,
    bind_group: wgpu::BindGroup,
    uniform_buffer: wgpu::Buffer,
    instance_buffer: Option<wgpu::Buffer>,
    instance_generation: Option<u64>,
    instance_count: u32,
}

impl SpriteRenderResources {
    fn prepare(&mut self, device: &wgpu::Device, queue: &wgpu::Queue, data: &SpriteCallback) {
        queue.write_buffer(
            &self.uniform_buffer,
            0,
            bytemuck::cast_slice(&[data.uniform]),
        );

        if self.instance_generation == Some(data.generation) {
            return;
        }

        let bytes: &[u8] = bytemuck::cast_slice(&data.points);
        let needed = bytes.len() as wgpu::BufferAddress;
        let fits = self
            .instance_buffer
            .as_ref()
            .is_some_and(|buffer| buffer.size() >= needed);
        if !fits && needed > 0 {
            log::debug!("allocating sprite instance buffer of {needed} bytes");
            self.instance_buffer = Some(device.create_buffer_init(
                &wgpu::util::BufferInitDescriptor {
                    label: Some("sprite_instance_buffer"),
                    contents: bytes,
                    usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::VERTEX,
                },
            ));
        } else if let Some(buffer) = self.instance_buffer.as_ref().filter(|_| needed > 0) {
            queue.write_buffer(buffer, 0, bytes);
        }

        self.instance_count = data.points.len() as u32;
        self.instance_generation = Some(data.generation);
    }

    fn paint(&self, render_pass: &mut wgpu::RenderPass<'_>, point_count: u32) {
        render_pass.set_pipeline(&self.background_pipeline);
        render_pass.draw(0..3, 0..1);

        let instances = point_count.min(self.instance_count);
        let Some(instance_buffer) = self.instance_buffer.as_ref().filter(|_| instances > 0) else {
            return;
        };
        render_pass.set_pipeline(&self.sprite_pipeline);
        render_pass.set_bind_group(0, &self.bind_group, &[]);
        render_pass.set_vertex_buffer(0, instance_buffer.slice(..));
        render_pass.draw(0..QUAD_VERTICES, 0..instances);
    }
}
