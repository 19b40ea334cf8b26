//! Presents a [`Canvas`] by uploading its rasterized frame to a texture and
//! stretching it over the window with nearest filtering.

use asset::TextureData;
use corelib::canvas::Canvas;
use wgpu::{LoadOp, Operations, RenderPipeline, ShaderStages, StoreOp, SurfaceError};

use crate::{
    GpuContext, RenderError, RenderResult,
    shader::{BindingKind, UniformLocation},
    texture::{GpuTexture, sampled_texture_layout},
};

const CANVAS_GROUP: u32 = 0;

const TEXTURE_SLOT: UniformLocation = UniformLocation {
    group: CANVAS_GROUP,
    binding: 0,
    kind: BindingKind::Texture,
    stages: ShaderStages::FRAGMENT,
};

const SAMPLER_SLOT: UniformLocation = UniformLocation {
    group: CANVAS_GROUP,
    binding: 1,
    kind: BindingKind::Sampler,
    stages: ShaderStages::FRAGMENT,
};

pub struct CanvasRenderer {
    pipeline: RenderPipeline,
    texture: GpuTexture,
}

impl CanvasRenderer {
    pub fn new(gpu: &GpuContext, canvas: &Canvas) -> RenderResult<Self> {
        let device = &gpu.device;
        let (width, height) = canvas.size();
        let max = device.limits().max_texture_dimension_2d;
        if width > max || height > max {
            return Err(RenderError::Asset {
                slot: "canvas".into(),
                message: format!("{width}x{height} exceeds the device texture limit of {max}"),
            });
        }
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Canvas WGSL"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/canvas.wgsl").into()),
        });

        let layout = sampled_texture_layout(device, "Canvas BGL", TEXTURE_SLOT, SAMPLER_SLOT);
        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Canvas PipelineLayout"),
            bind_group_layouts: &[&layout],
            push_constant_ranges: &[],
        });
        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Canvas Pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                buffers: &[],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: gpu.format(),
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState::default(),
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        });

        // nearest keeps every logical pixel a crisp scale x scale block
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("Canvas sampler"),
            mag_filter: wgpu::FilterMode::Nearest,
            min_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });
        let texture = GpuTexture::upload_with_sampler(
            device,
            &gpu.queue,
            &layout,
            (TEXTURE_SLOT, SAMPLER_SLOT),
            &frame_data(canvas)?,
            sampler,
            "Canvas",
        );

        Ok(Self { pipeline, texture })
    }

    /// Clear, draw every point, present.
    pub fn update(&mut self, gpu: &GpuContext, canvas: &Canvas) -> Result<(), SurfaceError> {
        match frame_data(canvas) {
            Ok(data) if (data.width, data.height) == self.texture.size() => {
                self.texture.write(&gpu.queue, &data)
            }
            Ok(data) => log::warn!(
                "Canvas resized to {}x{} after creation; keeping {:?}",
                data.width,
                data.height,
                self.texture.size()
            ),
            Err(err) => log::error!("Canvas frame rejected: {err:#}"),
        }

        let mut frame = gpu.begin_frame("CanvasEncoder")?;
        {
            let mut rpass = frame.encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("CanvasPass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &frame.view,
                    depth_slice: None,
                    resolve_target: None,
                    ops: Operations {
                        load: LoadOp::Clear(wgpu::Color::BLACK),
                        store: StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                occlusion_query_set: None,
                timestamp_writes: None,
            });
            rpass.set_pipeline(&self.pipeline);
            self.texture.bind(&mut rpass, CANVAS_GROUP);
            rpass.draw(0..3, 0..1);
        }
        gpu.present(frame);
        Ok(())
    }
}

fn frame_data(canvas: &Canvas) -> RenderResult<TextureData> {
    let (width, height) = canvas.size();
    TextureData::from_rgba8(width, height, canvas.rasterize()).map_err(|err| {
        RenderError::Asset {
            slot: "canvas".into(),
            message: format!("{err:#}"),
        }
    })
}
