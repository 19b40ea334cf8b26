//! Textured OBJ viewer: window, fly camera and the per-frame draw loop.

use std::{
    path::PathBuf,
    sync::Arc,
    time::{Duration, Instant},
};

use anyhow::{Context, Result};
use corelib::{
    camera::{Camera, Projection},
    fps::FpsCounter,
    scene::SceneDesc,
};
use renderer::{GpuContext, GpuOptions, SceneRenderer, ShaderProgram};
use winit::{
    application::ApplicationHandler,
    dpi::{PhysicalPosition, PhysicalSize},
    event::{DeviceEvent, DeviceId, ElementState, KeyEvent, WindowEvent},
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    keyboard::PhysicalKey,
    window::{CursorGrabMode, Window, WindowId},
};

use crate::input::{InputState, KeyAction, MouseTracker};

/// Start-up settings for the viewer.
#[derive(Clone, Debug)]
pub struct ObjviewConfig {
    /// Directory holding `assets/` and `shaders/`.
    pub root: PathBuf,
    pub scene: SceneDesc,
    pub width: u32,
    pub height: u32,
    pub backends: wgpu::Backends,
    /// World units per second.
    pub move_speed: f32,
    /// Degrees of rotation per pixel of mouse motion.
    pub mouse_sensitivity: f32,
}

impl Default for ObjviewConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            scene: SceneDesc::default_scene(),
            width: 1024,
            height: 768,
            backends: wgpu::Backends::all(),
            move_speed: 2.5,
            mouse_sensitivity: 0.1,
        }
    }
}

/// Open the window and run until Escape or close.
pub fn run_objview(config: ObjviewConfig) -> Result<()> {
    let event_loop = EventLoop::new().context("Failed to create event loop")?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = ObjviewApp {
        config,
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

struct ObjviewApp {
    config: ObjviewConfig,
    state: Option<ObjviewState>,
    error: Option<anyhow::Error>,
}

struct ObjviewState {
    window: Arc<Window>,
    gpu: GpuContext,
    renderer: SceneRenderer,
    camera: Camera,
    projection: Projection,
    input: InputState,
    mouse: MouseTracker,
    fps: FpsCounter,
    move_speed: f32,
    start: Instant,
    last_frame: Duration,
}

impl ObjviewApp {
    fn init(&self, event_loop: &ActiveEventLoop) -> Result<ObjviewState> {
        let config = &self.config;
        let attrs = Window::default_attributes()
            .with_title("objview")
            .with_inner_size(PhysicalSize::new(config.width, config.height));
        let window = Arc::new(
            event_loop
                .create_window(attrs)
                .context("Window was not created")?,
        );
        let size = window.inner_size();
        log::info!("Window created: {}x{}", size.width, size.height);

        let gpu = pollster::block_on(GpuContext::new(
            window.clone(),
            GpuOptions {
                backends: config.backends,
                vsync: false,
                wireframe: true,
            },
        ))
        .context("GPU context not available")?;

        let shaders = config.root.join("shaders");
        let program =
            ShaderProgram::load(&gpu.device, shaders.join("vert.wgsl"), shaders.join("frag.wgsl"))?;
        let scene = config.scene.clone().rooted_at(&config.root);
        let renderer = SceneRenderer::new(&gpu, &program, &scene)?;

        let (width, height) = gpu.size();
        let mut camera = Camera::default().with_sensitivity(config.mouse_sensitivity.to_radians());
        let mouse = MouseTracker::centered(width, height);
        let (cx, cy) = mouse.position();
        camera.mouse_look(cx, cy);
        capture_cursor(&window, width, height);

        Ok(ObjviewState {
            window,
            gpu,
            renderer,
            camera,
            projection: Projection::new(width, height, 45f32.to_radians(), 0.1, 100.0),
            input: InputState::new(),
            mouse,
            fps: FpsCounter::new(),
            move_speed: config.move_speed,
            start: Instant::now(),
            last_frame: Duration::ZERO,
        })
    }
}

/// Relative mouse mode: centre, grab and hide the cursor.
fn capture_cursor(window: &Window, width: u32, height: u32) {
    if let Err(err) = window.set_cursor_position(PhysicalPosition::new(width / 2, height / 2)) {
        log::debug!("Cursor warp unsupported: {err}");
    }
    let grabbed = window
        .set_cursor_grab(CursorGrabMode::Locked)
        .or_else(|_| window.set_cursor_grab(CursorGrabMode::Confined));
    if let Err(err) = grabbed {
        log::warn!("Unable to grab cursor: {err}");
    }
    window.set_cursor_visible(false);
}

impl ObjviewState {
    /// One loop iteration: title update, camera movement, draw, present.
    fn frame(&mut self) {
        let now = self.start.elapsed();
        if let Some(stats) = self.fps.tick(now) {
            self.window.set_title(&stats.title());
        }

        let dt = now.saturating_sub(self.last_frame);
        self.last_frame = now;
        self.input
            .apply_movement(&mut self.camera, self.move_speed * dt.as_secs_f32());

        let view = self.camera.view_matrix();
        let perspective = self.projection.matrix();
        match self.renderer.render(&self.gpu, view, perspective) {
            Ok(()) => {}
            Err(e) if GpuContext::is_surface_lost(&e) => self.gpu.recreate_surface(),
            Err(e) => log::error!("Unable to render: {e}"),
        }
    }
}

impl ApplicationHandler for ObjviewApp {
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

    fn device_event(&mut self, _event_loop: &ActiveEventLoop, _device_id: DeviceId, event: DeviceEvent) {
        let Some(state) = &mut self.state else {
            return;
        };
        if let DeviceEvent::MouseMotion { delta: (dx, dy) } = event {
            let (x, y) = state.mouse.accumulate(dx, dy);
            state.camera.mouse_look(x, y);
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
                log::info!("Resized: {}x{}", new_size.width, new_size.height);
                state.gpu.resize(new_size.width, new_size.height);
                state.projection.resize(new_size.width, new_size.height);
            }
            WindowEvent::Focused(false) => state.input.clear(),
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(key),
                        state: key_state,
                        repeat,
                        ..
                    },
                ..
            } => match state
                .input
                .handle_key(key, key_state == ElementState::Pressed, repeat)
            {
                Some(KeyAction::Quit) => {
                    log::info!("Escape pressed. Exiting event loop.");
                    event_loop.exit();
                }
                Some(KeyAction::ToggleWireframe) => {
                    state.renderer.toggle_wireframe();
                }
                None => {}
            },
            WindowEvent::RedrawRequested => state.frame(),
            _ => {}
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(state) = &self.state {
            state.window.request_redraw();
        }
    }
}
