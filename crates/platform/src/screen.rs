//! Passive point canvas: shows whatever was plotted into a [`Canvas`].

use std::sync::Arc;

use anyhow::{Context, Result};
use corelib::canvas::Canvas;
use renderer::{CanvasRenderer, GpuContext, GpuOptions};
use winit::{
    application::ApplicationHandler,
    event::WindowEvent,
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    window::{Window, WindowId},
};

#[derive(Clone, Debug)]
pub struct ScreenConfig {
    /// Logical canvas size in points.
    pub width: u32,
    pub height: u32,
    /// Window pixels per logical point.
    pub scale: u32,
    pub backends: wgpu::Backends,
}

impl Default for ScreenConfig {
    fn default() -> Self {
        Self {
            width: 640,
            height: 480,
            scale: 2,
            backends: wgpu::Backends::all(),
        }
    }
}

impl ScreenConfig {
    pub fn canvas(&self) -> Canvas {
        Canvas::new(self.width, self.height, self.scale)
    }
}

/// Present `canvas` until the window is closed. Keys are ignored.
pub fn run_screen(config: ScreenConfig, canvas: Canvas) -> Result<()> {
    let event_loop = EventLoop::new().context("Failed to create event loop")?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = ScreenApp {
        backends: config.backends,
        canvas,
        state: None,
        error: None,
    };
    event_loop
        .run_app(&mut app)
        .map_err(|e| anyhow::anyhow!("Event loop error: {e:?}"))?;

    match app.error {
        Some(err) => Err(err),
        None => Ok(()),
    }
}

struct ScreenApp {
    backends: wgpu::Backends,
    canvas: Canvas,
    state: Option<ScreenState>,
    error: Option<anyhow::Error>,
}

struct ScreenState {
    window: Arc<Window>,
    gpu: GpuContext,
    renderer: CanvasRenderer,
}

impl ScreenApp {
    fn init(&self, event_loop: &ActiveEventLoop) -> Result<ScreenState> {
        let (width, height) = self.canvas.window_size();
        let attrs = Window::default_attributes()
            .with_title("screen")
            .with_resizable(false)
            .with_inner_size(winit::dpi::PhysicalSize::new(width, height));
        let window = Arc::new(
            event_loop
                .create_window(attrs)
                .context("Window was not created")?,
        );
        log::info!(
            "Canvas {:?} at scale {} in a {}x{} window",
            self.canvas.size(),
            self.canvas.scale(),
            width,
            height
        );

        let gpu = pollster::block_on(GpuContext::new(
            window.clone(),
            GpuOptions {
                backends: self.backends,
                vsync: false,
                wireframe: false,
            },
        ))
        .context("GPU context not available")?;
        let renderer = CanvasRenderer::new(&gpu, &self.canvas)?;

        Ok(ScreenState {
            window,
            gpu,
            renderer,
        })
    }
}

impl ApplicationHandler for ScreenApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.state.is_some() {
            return;
        }
        match self.init(event_loop) {
            Ok(state) => self.state = Some(state),
            Err(err) => {
                log::error!("{err:#}");
                self.error = Some(err);
                event_loop.exit();
            }
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _window_id: WindowId, event: WindowEvent) {
        let Some(state) = &mut self.state else {
            return;
        };

        match event {
            WindowEvent::CloseRequested => {
                log::info!("Close requested. Exiting event loop.");
                event_loop.exit();
            }
            WindowEvent::Resized(new_size) => {
                state.gpu.resize(new_size.width, new_size.height);
            }
            WindowEvent::RedrawRequested => match state.renderer.update(&state.gpu, &self.canvas) {
                Ok(()) => {}
                Err(e) if GpuContext::is_surface_lost(&e) => state.gpu.recreate_surface(),
                Err(e) => log::error!("Unable to render: {e}"),
            },
            _ => {}
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(state) = &self.state {
            state.window.request_redraw();
        }
    }
}
