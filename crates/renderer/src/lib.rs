//! Renderer: wgpu device/surface ownership, shader programs with binding
//! reflection, mesh/texture upload and the two frame renderers (textured
//! scene and point canvas).
//! wgpu = 26.x, winit = 0.30.x

use std::path::PathBuf;

use thiserror::Error;

pub mod canvas;
pub mod gpu;
pub mod mesh;
pub mod scene;
pub mod shader;
pub mod texture;

pub use canvas::CanvasRenderer;
pub use gpu::{GpuContext, GpuOptions};
pub use scene::SceneRenderer;
pub use shader::{BindingKind, ShaderProgram, UniformLocation};

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("failed to read shader source {path:?}: {source}")]
    ShaderIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("shader '{label}' failed to compile: {message}")]
    ShaderCompile { label: String, message: String },
    #[error("uniform '{0}' not found in shader program")]
    UniformNotFound(String),
    #[error("uniform '{name}' is a {found:?} binding, expected {expected:?}")]
    UniformKind {
        name: String,
        expected: BindingKind,
        found: BindingKind,
    },
    #[error("invalid uniform layout: {0}")]
    UniformLayout(String),
    #[error("failed to load assets for model '{slot}': {message}")]
    Asset { slot: String, message: String },
    #[error("failed to create surface: {0}")]
    Surface(#[from] wgpu::CreateSurfaceError),
    #[error("no suitable GPU adapter: {0}")]
    Adapter(#[from] wgpu::RequestAdapterError),
    #[error("failed to request device: {0}")]
    Device(#[from] wgpu::RequestDeviceError),
}

pub type RenderResult<T> = Result<T, RenderError>;
