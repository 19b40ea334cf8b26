//! Platform layer: windows, event loops and input for the two sample programs.
//!
//! Each program owns a winit [`ApplicationHandler`](winit::application::ApplicationHandler)
//! that creates its window on `resumed`, drives the GPU from `RedrawRequested`
//! and asks for the next frame from `about_to_wait`.

pub mod input;
mod objview;
mod screen;

pub use objview::{ObjviewConfig, run_objview};
pub use screen::{ScreenConfig, run_screen};
