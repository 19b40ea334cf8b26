//! Scene renderer: owns the GPU meshes/textures for every model slot and
//! draws them with per-frame view/perspective and per-object model matrices.

use asset::{TextureData, obj};
use corelib::{Mat4, placement::Placement, raster::RasterMode, scene::SceneDesc};
use wgpu::{
    BindGroup, BindGroupLayout, Buffer, BufferUsages, Device, LoadOp, Operations, PolygonMode,
    RenderPipeline, StoreOp, SurfaceError, util::DeviceExt,
};

use crate::{
    GpuContext, RenderError, RenderResult,
    mesh::{GpuMesh, Vertex},
    shader::{BindingKind, ShaderProgram, UniformLocation},
    texture::{GpuTexture, sampled_texture_layout},
};

const MAT4_SIZE: u64 = std::mem::size_of::<[[f32; 4]; 4]>() as u64;

/// Where the scene shaders expect their inputs.
#[derive(Clone, Copy, Debug)]
struct SceneBindings {
    view: UniformLocation,
    perspective: UniformLocation,
    model: UniformLocation,
    texture: UniformLocation,
    sampler: UniformLocation,
}

impl SceneBindings {
    fn resolve(program: &ShaderProgram) -> RenderResult<Self> {
        let bindings = Self {
            view: program.expect_location("u_View", BindingKind::Uniform)?,
            perspective: program.expect_location("u_Perspective", BindingKind::Uniform)?,
            model: program.expect_location("u_ModelMatrix", BindingKind::Uniform)?,
            texture: program.expect_location("myTexture1", BindingKind::Texture)?,
            sampler: program.expect_location("mySampler", BindingKind::Sampler)?,
        };
        bindings.validate()?;
        Ok(bindings)
    }

    /// View and perspective share the per-frame group, texture and sampler
    /// share the texture unit group, and the three groups cover 0..3.
    fn validate(&self) -> RenderResult<()> {
        if self.view.group != self.perspective.group {
            return Err(RenderError::UniformLayout(
                "u_View and u_Perspective must be in the same bind group".into(),
            ));
        }
        if self.texture.group != self.sampler.group {
            return Err(RenderError::UniformLayout(
                "myTexture1 and mySampler must be in the same bind group".into(),
            ));
        }
        let mut groups = [self.view.group, self.model.group, self.texture.group];
        groups.sort_unstable();
        if groups != [0, 1, 2] {
            return Err(RenderError::UniformLayout(format!(
                "expected frame, model and texture groups to be 0, 1, 2 in some order; got {groups:?}"
            )));
        }
        Ok(())
    }
}

struct GpuModel {
    name: String,
    mesh: GpuMesh,
    texture: GpuTexture,
    placement: Placement,
    model_buf: Buffer,
    model_bg: BindGroup,
}

pub struct SceneRenderer {
    bindings: SceneBindings,
    fill: RenderPipeline,
    wireframe: Option<RenderPipeline>,
    mode: RasterMode,
    view_buf: Buffer,
    perspective_buf: Buffer,
    frame_bg: BindGroup,
    models: Vec<GpuModel>,
}

impl SceneRenderer {
    /// Resolve the program's uniforms, load every slot's mesh and texture
    /// from disk and upload them.
    pub fn new(gpu: &GpuContext, program: &ShaderProgram, scene: &SceneDesc) -> RenderResult<Self> {
        let device = &gpu.device;
        let bindings = SceneBindings::resolve(program)?;

        let frame_bgl = uniform_layout(device, "Frame BGL", &[bindings.view, bindings.perspective]);
        let model_bgl = uniform_layout(device, "Model BGL", &[bindings.model]);
        let texture_bgl =
            sampled_texture_layout(device, "Texture BGL", bindings.texture, bindings.sampler);

        let mut by_group = [
            (bindings.view.group, &frame_bgl),
            (bindings.model.group, &model_bgl),
            (bindings.texture.group, &texture_bgl),
        ];
        by_group.sort_by_key(|(group, _)| *group);
        let layouts: Vec<&BindGroupLayout> = by_group.iter().map(|(_, l)| *l).collect();
        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Scene PipelineLayout"),
            bind_group_layouts: &layouts,
            push_constant_ranges: &[],
        });

        let fill = program.create_pipeline(
            device,
            &pipeline_layout,
            gpu.format(),
            PolygonMode::Fill,
            &[Vertex::LAYOUT],
        );
        let wireframe = gpu.supports_wireframe().then(|| {
            program.create_pipeline(
                device,
                &pipeline_layout,
                gpu.format(),
                PolygonMode::Line,
                &[Vertex::LAYOUT],
            )
        });

        let view_buf = uniform_buffer(device, "u_View", Mat4::IDENTITY);
        let perspective_buf = uniform_buffer(device, "u_Perspective", Mat4::IDENTITY);
        let frame_bg = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Frame BG"),
            layout: &frame_bgl,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: bindings.view.binding,
                    resource: view_buf.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: bindings.perspective.binding,
                    resource: perspective_buf.as_entire_binding(),
                },
            ],
        });

        // one GpuModel per slot: mesh, texture and placement stay paired
        let mut models = Vec::with_capacity(scene.len());
        for slot in scene.slots() {
            let mesh = obj::load_obj_from_path(&slot.mesh_path).map_err(|err| RenderError::Asset {
                slot: slot.name.clone(),
                message: format!("{err:#}"),
            })?;
            let data = TextureData::load_or_checker(&slot.texture_path, slot.flip_texture);

            let model_buf = uniform_buffer(device, &slot.name, slot.placement.matrix());
            let model_bg = device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some(&slot.name),
                layout: &model_bgl,
                entries: &[wgpu::BindGroupEntry {
                    binding: bindings.model.binding,
                    resource: model_buf.as_entire_binding(),
                }],
            });
            models.push(GpuModel {
                name: slot.name.clone(),
                mesh: GpuMesh::upload(device, &mesh, &slot.name),
                texture: GpuTexture::upload(
                    device,
                    &gpu.queue,
                    &texture_bgl,
                    (bindings.texture, bindings.sampler),
                    &data,
                    &slot.name,
                ),
                placement: slot.placement,
                model_buf,
                model_bg,
            });
        }

        log::info!(
            "Scene ready: {}",
            models
                .iter()
                .map(|m| format!("{} ({} idx)", m.name, m.mesh.index_count()))
                .collect::<Vec<_>>()
                .join(", ")
        );

        Ok(Self {
            bindings,
            fill,
            wireframe,
            mode: RasterMode::Fill,
            view_buf,
            perspective_buf,
            frame_bg,
            models,
        })
    }

    /// Flip between filled and wireframe drawing for all later frames.
    /// Stays filled when the device has no line polygon mode.
    pub fn toggle_wireframe(&mut self) -> RasterMode {
        let next = self.mode.toggled_if(self.wireframe.is_some());
        if next == self.mode {
            log::warn!("Wireframe requested but not supported by this device");
        } else {
            self.mode = next;
            log::info!("Raster mode: {:?}", self.mode);
        }
        self.mode
    }

    /// Upload per-frame matrices and draw every model once.
    pub fn render(&mut self, gpu: &GpuContext, view: Mat4, perspective: Mat4) -> Result<(), SurfaceError> {
        let queue = &gpu.queue;
        queue.write_buffer(&self.view_buf, 0, bytemuck::cast_slice(&view.to_cols_array_2d()));
        queue.write_buffer(
            &self.perspective_buf,
            0,
            bytemuck::cast_slice(&perspective.to_cols_array_2d()),
        );
        for model in &self.models {
            queue.write_buffer(
                &model.model_buf,
                0,
                bytemuck::cast_slice(&model.placement.matrix().to_cols_array_2d()),
            );
        }

        let mut frame = gpu.begin_frame("SceneEncoder")?;
        {
            let mut rpass = frame.encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("ScenePass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &frame.view,
                    depth_slice: None,
                    resolve_target: None,
                    ops: Operations {
                        load: LoadOp::Clear(wgpu::Color::BLACK),
                        store: StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: gpu.depth_view(),
                    depth_ops: Some(Operations {
                        load: LoadOp::Clear(1.0),
                        store: StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                occlusion_query_set: None,
                timestamp_writes: None,
            });

            let pipeline = match (&self.mode, &self.wireframe) {
                (RasterMode::Wireframe, Some(line)) => line,
                _ => &self.fill,
            };
            rpass.set_pipeline(pipeline);
            rpass.set_bind_group(self.bindings.view.group, &self.frame_bg, &[]);

            let unit = self.bindings.texture.group;
            for model in &self.models {
                rpass.set_bind_group(self.bindings.model.group, &model.model_bg, &[]);
                model.texture.bind(&mut rpass, unit);
                model.mesh.draw(&mut rpass);
                model.texture.unbind(&mut rpass, unit);
            }
        }
        gpu.present(frame);
        Ok(())
    }
}

fn uniform_layout(device: &Device, label: &str, slots: &[UniformLocation]) -> BindGroupLayout {
    let entries: Vec<wgpu::BindGroupLayoutEntry> = slots
        .iter()
        .map(|slot| wgpu::BindGroupLayoutEntry {
            binding: slot.binding,
            visibility: slot.stages,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: wgpu::BufferSize::new(MAT4_SIZE),
            },
            count: None,
        })
        .collect();
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some(label),
        entries: &entries,
    })
}

fn uniform_buffer(device: &Device, label: &str, value: Mat4) -> Buffer {
    device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some(label),
        contents: bytemuck::cast_slice(&value.to_cols_array_2d()),
        usage: BufferUsages::UNIFORM | BufferUsages::COPY_DST,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use wgpu::ShaderStages;

    fn loc(group: u32, binding: u32, kind: BindingKind) -> UniformLocation {
        UniformLocation {
            group,
            binding,
            kind,
            stages: ShaderStages::VERTEX,
        }
    }

    fn bindings() -> SceneBindings {
        SceneBindings {
            view: loc(0, 0, BindingKind::Uniform),
            perspective: loc(0, 1, BindingKind::Uniform),
            model: loc(1, 0, BindingKind::Uniform),
            texture: loc(2, 0, BindingKind::Texture),
            sampler: loc(2, 1, BindingKind::Sampler),
        }
    }

    #[test]
    fn default_layout_is_valid() {
        assert!(bindings().validate().is_ok());
    }

    #[test]
    fn groups_may_be_permuted() {
        let mut b = bindings();
        b.model.group = 2;
        b.texture.group = 1;
        b.sampler.group = 1;
        assert!(b.validate().is_ok());
    }

    #[test]
    fn split_or_overlapping_groups_are_rejected() {
        let mut split = bindings();
        split.perspective.group = 3;
        assert!(matches!(split.validate(), Err(RenderError::UniformLayout(_))));

        let mut shared = bindings();
        shared.model.group = 0;
        assert!(matches!(shared.validate(), Err(RenderError::UniformLayout(_))));

        let mut sampler_apart = bindings();
        sampler_apart.sampler.group = 1;
        assert!(matches!(sampler_apart.validate(), Err(RenderError::UniformLayout(_))));
    }
}
