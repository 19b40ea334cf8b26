//! Shader programs: a vertex and a fragment WGSL module plus the table of
//! resource bindings they declare, queried by name like GL uniforms.

use std::{fs, path::Path};

use wgpu::{
    Device, PipelineLayout, PolygonMode, RenderPipeline, ShaderModule, ShaderModuleDescriptor,
    ShaderSource, ShaderStages, TextureFormat, VertexBufferLayout,
    naga::{self, AddressSpace, TypeInner},
};

use crate::{RenderError, RenderResult, texture::DepthTexture};

/// What a named binding refers to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BindingKind {
    Uniform,
    Storage,
    Texture,
    Sampler,
}

/// Where a named binding lives: bind group slot, binding number, and the
/// stages that declare it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct UniformLocation {
    pub group: u32,
    pub binding: u32,
    pub kind: BindingKind,
    pub stages: ShaderStages,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ShaderBinding {
    pub name: String,
    pub location: UniformLocation,
}

pub struct ShaderProgram {
    label: String,
    vertex: ShaderModule,
    fragment: ShaderModule,
    bindings: Vec<ShaderBinding>,
}

impl ShaderProgram {
    /// Read, compile and reflect a vertex/fragment pair from disk.
    pub fn load(
        device: &Device,
        vert_path: impl AsRef<Path>,
        frag_path: impl AsRef<Path>,
    ) -> RenderResult<Self> {
        let (vert_path, frag_path) = (vert_path.as_ref(), frag_path.as_ref());
        let vert_src = read_source(vert_path)?;
        let frag_src = read_source(frag_path)?;
        let label = format!("{} + {}", vert_path.display(), frag_path.display());
        Self::from_sources(device, &label, &vert_src, &frag_src)
    }

    pub fn from_sources(
        device: &Device,
        label: &str,
        vert_src: &str,
        frag_src: &str,
    ) -> RenderResult<Self> {
        let (vert_label, frag_label) = (format!("{label} (vertex)"), format!("{label} (fragment)"));
        let bindings = merge_bindings(
            reflect_bindings(&vert_label, vert_src, ShaderStages::VERTEX)?,
            reflect_bindings(&frag_label, frag_src, ShaderStages::FRAGMENT)?,
        )?;

        let vertex = compile(device, &vert_label, vert_src)?;
        let fragment = compile(device, &frag_label, frag_src)?;
        log::info!(
            "Shader program '{}' ready with {} bindings",
            label,
            bindings.len()
        );

        Ok(Self {
            label: label.to_owned(),
            vertex,
            fragment,
            bindings,
        })
    }

    pub fn uniform_location(&self, name: &str) -> RenderResult<UniformLocation> {
        find_binding(&self.bindings, name)
    }

    /// Like [`ShaderProgram::uniform_location`], also checking the binding kind.
    pub fn expect_location(&self, name: &str, expected: BindingKind) -> RenderResult<UniformLocation> {
        let location = self.uniform_location(name)?;
        if location.kind != expected {
            return Err(RenderError::UniformKind {
                name: name.to_owned(),
                expected,
                found: location.kind,
            });
        }
        Ok(location)
    }

    /// Build the pipeline that activates this program for a draw.
    /// Entry points are `vs_main` / `fs_main`; depth test is on, culling off.
    pub fn create_pipeline(
        &self,
        device: &Device,
        layout: &PipelineLayout,
        color_format: TextureFormat,
        polygon_mode: PolygonMode,
        vertex_layouts: &[VertexBufferLayout],
    ) -> RenderPipeline {
        let label = format!("{} {:?}", self.label, polygon_mode);
        device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some(&label),
            layout: Some(layout),
            vertex: wgpu::VertexState {
                module: &self.vertex,
                entry_point: Some("vs_main"),
                buffers: vertex_layouts,
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &self.fragment,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: color_format,
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: None,
                polygon_mode,
                ..Default::default()
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: DepthTexture::FORMAT,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::Less,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        })
    }
}

fn read_source(path: &Path) -> RenderResult<String> {
    fs::read_to_string(path).map_err(|source| RenderError::ShaderIo {
        path: path.to_path_buf(),
        source,
    })
}

fn compile(device: &Device, label: &str, source: &str) -> RenderResult<ShaderModule> {
    device.push_error_scope(wgpu::ErrorFilter::Validation);
    let module = device.create_shader_module(ShaderModuleDescriptor {
        label: Some(label),
        source: ShaderSource::Wgsl(source.into()),
    });
    match pollster::block_on(device.pop_error_scope()) {
        Some(err) => Err(RenderError::ShaderCompile {
            label: label.to_owned(),
            message: err.to_string(),
        }),
        None => Ok(module),
    }
}

fn find_binding(bindings: &[ShaderBinding], name: &str) -> RenderResult<UniformLocation> {
    bindings
        .iter()
        .find(|b| b.name == name)
        .map(|b| b.location)
        .ok_or_else(|| RenderError::UniformNotFound(name.to_owned()))
}

/// Union of two stages' declarations. A name declared by both must agree on
/// group, binding and kind.
fn merge_bindings(
    mut into: Vec<ShaderBinding>,
    other: Vec<ShaderBinding>,
) -> RenderResult<Vec<ShaderBinding>> {
    for binding in other {
        match into.iter_mut().find(|b| b.name == binding.name) {
            Some(existing) => {
                let (a, b) = (existing.location, binding.location);
                if (a.group, a.binding, a.kind) != (b.group, b.binding, b.kind) {
                    return Err(RenderError::UniformLayout(format!(
                        "'{}' declared as @group({}) @binding({}) and @group({}) @binding({})",
                        binding.name, a.group, a.binding, b.group, b.binding
                    )));
                }
                existing.location.stages |= b.stages;
            }
            None => into.push(binding),
        }
    }
    Ok(into)
}

/// Parse `source` and collect every global declared with `@group/@binding`.
pub fn reflect_bindings(
    label: &str,
    source: &str,
    stage: ShaderStages,
) -> RenderResult<Vec<ShaderBinding>> {
    let module = naga::front::wgsl::parse_str(source).map_err(|err| RenderError::ShaderCompile {
        label: label.to_owned(),
        message: err.emit_to_string(source),
    })?;

    let bindings = module
        .global_variables
        .iter()
        .filter_map(|(_, global)| {
            let slot = global.binding.as_ref()?;
            let kind = match (global.space, &module.types[global.ty].inner) {
                (AddressSpace::Uniform, _) => BindingKind::Uniform,
                (AddressSpace::Storage { .. }, _) => BindingKind::Storage,
                (AddressSpace::Handle, TypeInner::Sampler { .. }) => BindingKind::Sampler,
                (AddressSpace::Handle, TypeInner::Image { .. }) => BindingKind::Texture,
                _ => return None,
            };
            Some(ShaderBinding {
                name: global.name.clone()?,
                location: UniformLocation {
                    group: slot.group,
                    binding: slot.binding,
                    kind,
                    stages: stage,
                },
            })
        })
        .collect();
    Ok(bindings)
}

#[cfg(test)]
mod tests {
    use super::*;

    const VERT: &str = include_str!("../../../shaders/vert.wgsl");
    const FRAG: &str = include_str!("../../../shaders/frag.wgsl");

    fn reflect(src: &str, stage: ShaderStages) -> Vec<ShaderBinding> {
        reflect_bindings("test", src, stage).unwrap()
    }

    fn names(bindings: &[ShaderBinding]) -> Vec<&str> {
        bindings.iter().map(|b| b.name.as_str()).collect()
    }

    fn program_bindings() -> Vec<ShaderBinding> {
        merge_bindings(
            reflect(VERT, ShaderStages::VERTEX),
            reflect(FRAG, ShaderStages::FRAGMENT),
        )
        .unwrap()
    }

    #[test]
    fn scene_shaders_expose_expected_uniforms() {
        let bindings = program_bindings();
        let view = find_binding(&bindings, "u_View").unwrap();
        let persp = find_binding(&bindings, "u_Perspective").unwrap();
        let model = find_binding(&bindings, "u_ModelMatrix").unwrap();
        let tex = find_binding(&bindings, "myTexture1").unwrap();
        let sampler = find_binding(&bindings, "mySampler").unwrap();

        assert_eq!((view.group, view.binding), (0, 0));
        assert_eq!((persp.group, persp.binding), (0, 1));
        assert_eq!((model.group, model.binding), (1, 0));
        assert_eq!(view.kind, BindingKind::Uniform);
        assert_eq!(view.stages, ShaderStages::VERTEX);
        assert_eq!((tex.group, tex.binding, tex.kind), (2, 0, BindingKind::Texture));
        assert_eq!(sampler.kind, BindingKind::Sampler);
        assert_eq!(sampler.stages, ShaderStages::FRAGMENT);
        assert_eq!(bindings.len(), 5);
    }

    #[test]
    fn unknown_uniform_is_an_error() {
        let err = find_binding(&program_bindings(), "u_Missing").unwrap_err();
        assert!(matches!(err, RenderError::UniformNotFound(name) if name == "u_Missing"));
    }

    #[test]
    fn comments_and_layout_variations() {
        let src = "
            // @group(9) @binding(9) var<uniform> commented: f32;
            /* @group(8) @binding(8) var<uniform> blocked: f32; */
            struct Params { scale: f32 }
            @binding(3) @group(1)
            var<storage, read> data : array<f32>;
            @group(0) @binding( 2 ) var<uniform>params: Params;
            fn main() { var local: f32 = 1.0; }
        ";
        let bindings = reflect(src, ShaderStages::COMPUTE);
        assert_eq!(bindings.len(), 2);
        assert_eq!(bindings[0].name, "data");
        assert_eq!(bindings[0].location.kind, BindingKind::Storage);
        assert_eq!((bindings[0].location.group, bindings[0].location.binding), (1, 3));
        assert_eq!(bindings[1].name, "params");
        assert_eq!(bindings[1].location.binding, 2);
    }

    #[test]
    fn shared_names_merge_stages_or_conflict() {
        let a = "@group(0) @binding(0) var<uniform> u_Shared: mat4x4<f32>;";
        let b = "@group(0) @binding(0) var<uniform> u_Shared: mat4x4<f32>;";
        let merged = merge_bindings(
            reflect(a, ShaderStages::VERTEX),
            reflect(b, ShaderStages::FRAGMENT),
        )
        .unwrap();
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].location.stages, ShaderStages::VERTEX_FRAGMENT);

        let clash = "@group(1) @binding(0) var<uniform> u_Shared: mat4x4<f32>;";
        let err = merge_bindings(
            reflect(a, ShaderStages::VERTEX),
            reflect(clash, ShaderStages::FRAGMENT),
        )
        .unwrap_err();
        assert!(matches!(err, RenderError::UniformLayout(_)));
    }

    #[test]
    fn nested_block_comments_hide_bindings() {
        let src = "
            /* outer /* inner */ @group(0) @binding(0) var<uniform> ghost: f32; */
            @group(0) @binding(1) var<uniform> real: f32;
        ";
        let bindings = reflect(src, ShaderStages::VERTEX);
        assert_eq!(names(&bindings), ["real"]);
        assert!(matches!(
            find_binding(&bindings, "ghost"),
            Err(RenderError::UniformNotFound(_))
        ));
    }

    #[test]
    fn syntax_errors_are_reported_before_compilation() {
        let src = "@group(0) @binding(0) var<uniform> u: ;";
        let err = reflect_bindings("broken", src, ShaderStages::VERTEX).unwrap_err();
        assert!(matches!(err, RenderError::ShaderCompile { label, .. } if label == "broken"));
    }

    #[test]
    fn program_lists_merged_bindings() {
        let bindings = program_bindings();
        assert_eq!(
            names(&bindings),
            ["u_View", "u_Perspective", "u_ModelMatrix", "myTexture1", "mySampler"]
        );
    }
}
