//! wgpu renderer: every visible rect node as one instanced quad.
//!
//! Owns the surface, device, pipeline and buffers. Construction is async
//! because adapter and device requests are; any failure there is fatal and
//! reported as `RenderError`. At runtime the renderer never errors: a lost
//! surface is reconfigured and the frame skipped.

use crate::instances::{RectInstance, grown_capacity, pack_instances};
use crate::surface::{DisplaySize, SurfaceSizer};
use crate::{RenderTarget, SceneRenderer};
use bytemuck::{Pod, Zeroable};
use pg_core::{Document, NodeId, Viewport};
use wgpu::util::DeviceExt;

/// Unit quad as two triangles, (0,0)–(1,1).
const QUAD: [[f32; 2]; 6] = [
    [0.0, 0.0],
    [1.0, 0.0],
    [0.0, 1.0],
    [0.0, 1.0],
    [1.0, 0.0],
    [1.0, 1.0],
];

#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("could not create surface: {0}")]
    CreateSurface(#[from] wgpu::CreateSurfaceError),
    #[error("no compatible GPU adapter found")]
    NoAdapter,
    #[error("device request failed: {0}")]
    Device(#[from] wgpu::RequestDeviceError),
    #[error("surface has no supported format on this adapter")]
    UnsupportedSurface,
    #[error("shader or pipeline validation failed: {0}")]
    Pipeline(String),
}

#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
struct Globals {
    resolution: [f32; 2],
    pad: [f32; 2],
}

/// Everything released on `destroy()`.
struct GpuResources {
    pipeline: wgpu::RenderPipeline,
    bind_group: wgpu::BindGroup,
    globals: wgpu::Buffer,
    quad: wgpu::Buffer,
    instances: wgpu::Buffer,
    capacity: usize,
}

impl GpuResources {
    fn new(device: &wgpu::Device, format: wgpu::TextureFormat) -> Self {
        let shader = device.create_shader_module(wgpu::include_wgsl!("shaders/rect.wgsl"));

        let globals = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("pagegl globals"),
            size: std::mem::size_of::<Globals>() as wgpu::BufferAddress,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("pagegl globals layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("pagegl globals"),
            layout: &bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: globals.as_entire_binding(),
            }],
        });

        let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("pagegl rect layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("pagegl rect pipeline"),
            layout: Some(&layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                compilation_options: wgpu::PipelineCompilationOptions::default(),
                buffers: &[
                    wgpu::VertexBufferLayout {
                        array_stride: std::mem::size_of::<[f32; 2]>() as wgpu::BufferAddress,
                        step_mode: wgpu::VertexStepMode::Vertex,
                        attributes: &wgpu::vertex_attr_array![0 => Float32x2],
                    },
                    wgpu::VertexBufferLayout {
                        array_stride: std::mem::size_of::<RectInstance>() as wgpu::BufferAddress,
                        step_mode: wgpu::VertexStepMode::Instance,
                        attributes: &wgpu::vertex_attr_array![1 => Float32x4, 2 => Float32x4],
                    },
                ],
            },
            primitive: wgpu::PrimitiveState::default(),
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                compilation_options: wgpu::PipelineCompilationOptions::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format,
                    blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            multiview: None,
            cache: None,
        });

        let quad = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("pagegl quad"),
            contents: bytemuck::cast_slice(&QUAD),
            usage: wgpu::BufferUsages::VERTEX,
        });

        let capacity = grown_capacity(0, 1);
        let instances = instance_buffer(device, capacity);

        Self {
            pipeline,
            bind_group,
            globals,
            quad,
            instances,
            capacity,
        }
    }

    fn release(self) {
        self.quad.destroy();
        self.instances.destroy();
        self.globals.destroy();
    }
}

fn instance_buffer(device: &wgpu::Device, capacity: usize) -> wgpu::Buffer {
    device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("pagegl instances"),
        size: (capacity * std::mem::size_of::<RectInstance>()) as wgpu::BufferAddress,
        usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    })
}

/// Pick a surface format whose values pass straight through, so colors
/// match the document's RGBA numbers. Falls back to the preferred format.
fn pick_format(caps: &wgpu::SurfaceCapabilities) -> Option<wgpu::TextureFormat> {
    caps.formats
        .iter()
        .copied()
        .find(|f| !f.is_srgb())
        .or_else(|| caps.formats.first().copied())
}

/// Instanced rectangle renderer on top of wgpu.
pub struct RectRenderer {
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    target: Box<dyn RenderTarget>,
    sizer: SurfaceSizer,
    highlight: f32,
    scratch: Vec<RectInstance>,
    gpu: Option<GpuResources>,
}

impl RectRenderer {
    /// Request an adapter and device for `surface` and build the pipeline.
    ///
    /// `highlight` is the channel scale applied to selected nodes.
    pub async fn new(
        instance: &wgpu::Instance,
        surface: wgpu::Surface<'static>,
        target: Box<dyn RenderTarget>,
        highlight: f32,
    ) -> Result<Self, RenderError> {
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                force_fallback_adapter: false,
                compatible_surface: Some(&surface),
            })
            .await
            .ok_or(RenderError::NoAdapter)?;
        log::debug!("adapter: {:?}", adapter.get_info());

        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: Some("pagegl device"),
                    required_features: wgpu::Features::empty(),
                    required_limits: wgpu::Limits::downlevel_webgl2_defaults()
                        .using_resolution(adapter.limits()),
                    memory_hints: wgpu::MemoryHints::default(),
                },
                None,
            )
            .await?;

        let caps = surface.get_capabilities(&adapter);
        let format = pick_format(&caps).ok_or(RenderError::UnsupportedSurface)?;
        let alpha_mode = caps
            .alpha_modes
            .first()
            .copied()
            .unwrap_or(wgpu::CompositeAlphaMode::Auto);

        device.push_error_scope(wgpu::ErrorFilter::Validation);
        let gpu = GpuResources::new(&device, format);
        if let Some(err) = device.pop_error_scope().await {
            gpu.release();
            return Err(RenderError::Pipeline(err.to_string()));
        }
        log::debug!("rect pipeline ready ({format:?})");

        // Sized on the first frame, once the target has a layout.
        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: 1,
            height: 1,
            present_mode: wgpu::PresentMode::Fifo,
            desired_maximum_frame_latency: 2,
            alpha_mode,
            view_formats: vec![],
        };

        Ok(Self {
            surface,
            device,
            queue,
            config,
            target,
            sizer: SurfaceSizer::default(),
            highlight,
            scratch: Vec::new(),
            gpu: Some(gpu),
        })
    }

    /// Track the target's displayed size. Returns the CSS size when there
    /// is something to draw into.
    fn sync_size(&mut self) -> Option<DisplaySize> {
        let display = self.target.display_size();
        if let Some((width, height)) = self.sizer.update(display) {
            self.target.set_backing_size(width, height);
            if width > 0 && height > 0 {
                self.config.width = width;
                self.config.height = height;
                self.surface.configure(&self.device, &self.config);
                log::debug!("surface configured to {width}×{height}");
            }
        }
        match self.sizer.current() {
            Some((w, h)) if w > 0 && h > 0 => Some(display),
            _ => None,
        }
    }
}

impl SceneRenderer for RectRenderer {
    fn render(&mut self, doc: &Document, viewport: &Viewport, selection: &[NodeId]) {
        if self.gpu.is_none() {
            return;
        }
        let Some(display) = self.sync_size() else {
            log::trace!("render target has no area, skipping frame");
            return;
        };

        pack_instances(doc, viewport, selection, self.highlight, &mut self.scratch);
        let count = self.scratch.len();

        let Some(gpu) = self.gpu.as_mut() else {
            return;
        };
        if count > gpu.capacity {
            let capacity = grown_capacity(gpu.capacity, count);
            gpu.instances.destroy();
            gpu.instances = instance_buffer(&self.device, capacity);
            gpu.capacity = capacity;
            log::debug!("instance buffer grown to {capacity}");
        }
        if count > 0 {
            self.queue
                .write_buffer(&gpu.instances, 0, bytemuck::cast_slice(&self.scratch));
        }
        // Instance rects are in CSS pixels, so project against the CSS size
        // rather than the device-pixel backing size.
        let globals = Globals {
            resolution: [display.css_width, display.css_height],
            pad: [0.0; 2],
        };
        self.queue
            .write_buffer(&gpu.globals, 0, bytemuck::bytes_of(&globals));

        let frame = match self.surface.get_current_texture() {
            Ok(frame) => frame,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                log::warn!("surface lost or outdated, reconfiguring");
                self.surface.configure(&self.device, &self.config);
                return;
            }
            Err(err) => {
                log::warn!("could not acquire frame: {err}");
                return;
            }
        };
        let view = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let bg = doc.page.background;
        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("pagegl frame"),
            });
        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("pagegl rects"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color {
                            r: f64::from(bg.r),
                            g: f64::from(bg.g),
                            b: f64::from(bg.b),
                            a: f64::from(bg.a),
                        }),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });
            if count > 0 {
                pass.set_pipeline(&gpu.pipeline);
                pass.set_bind_group(0, &gpu.bind_group, &[]);
                pass.set_vertex_buffer(0, gpu.quad.slice(..));
                pass.set_vertex_buffer(1, gpu.instances.slice(..));
                pass.draw(0..QUAD.len() as u32, 0..count as u32);
            }
        }
        self.queue.submit(Some(encoder.finish()));
        frame.present();
        log::trace!("drew {count} rects");
    }

    fn destroy(&mut self) {
        if let Some(gpu) = self.gpu.take() {
            gpu.release();
            log::debug!("renderer resources released");
        }
    }
}

impl Drop for RectRenderer {
    fn drop(&mut self) {
        self.destroy();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn globals_match_uniform_layout() {
        assert_eq!(std::mem::size_of::<Globals>(), 16);
    }

    #[test]
    fn quad_covers_unit_square() {
        let min = QUAD.iter().fold([1.0f32; 2], |m, v| [m[0].min(v[0]), m[1].min(v[1])]);
        let max = QUAD.iter().fold([0.0f32; 2], |m, v| [m[0].max(v[0]), m[1].max(v[1])]);
        assert_eq!(min, [0.0, 0.0]);
        assert_eq!(max, [1.0, 1.0]);
    }
}
