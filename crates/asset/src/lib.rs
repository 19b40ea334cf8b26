//! Asset loading: OBJ meshes and textures into CPU-side data.
//! GPU upload happens in the renderer crate.

pub mod mesh;
pub mod obj;
pub mod texture;

pub use mesh::{MeshData, MeshVertex};
pub use texture::TextureData;
