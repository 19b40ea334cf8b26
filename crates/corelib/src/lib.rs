//! Core types: math re-exports, camera, scene description, frame counters
//! and the point canvas. Nothing in here touches the GPU.

pub use glam::{Mat4, Vec2, Vec3, vec3};

pub mod camera;
pub mod canvas;
pub mod fps;
pub mod placement;
pub mod raster;
pub mod scene;

use thiserror::Error;

/// Errors raised by core scene bookkeeping.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("scene has no model slots")]
    EmptyScene,
    #[error("duplicate model slot name '{0}'")]
    DuplicateSlot(String),
    #[error("model slot '{0}' has a non-finite placement")]
    InvalidPlacement(String),
}

pub type CoreResult<T> = Result<T, CoreError>;
