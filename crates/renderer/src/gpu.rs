//! Device, queue and surface ownership shared by both renderers.

use std::sync::Arc;

use wgpu::{
    CommandEncoder, CommandEncoderDescriptor, Device, DeviceDescriptor, Features, Instance,
    InstanceDescriptor, Limits, PowerPreference, PresentMode, Queue, Surface, SurfaceConfiguration,
    SurfaceError, SurfaceTexture, TextureFormat, TextureUsages, TextureView,
};
use winit::{dpi::PhysicalSize, window::Window};

use crate::{RenderResult, texture::DepthTexture};

/// How the GPU context should be set up.
#[derive(Clone, Copy, Debug)]
pub struct GpuOptions {
    pub backends: wgpu::Backends,
    /// `false` asks for an unthrottled present mode.
    pub vsync: bool,
    /// Request line polygon mode when the adapter has it.
    pub wireframe: bool,
}

impl Default for GpuOptions {
    fn default() -> Self {
        Self {
            backends: wgpu::Backends::all(),
            vsync: false,
            wireframe: false,
        }
    }
}

/// A surface texture being recorded into.
pub struct Frame {
    surface_texture: SurfaceTexture,
    pub view: TextureView,
    pub encoder: CommandEncoder,
}

pub struct GpuContext {
    surface: Surface<'static>,
    config: SurfaceConfiguration,
    pub device: Device,
    pub queue: Queue,
    depth: DepthTexture,
}

impl GpuContext {
    /// Create GPU state bound to an Arc<Window>.
    pub async fn new(window: Arc<Window>, options: GpuOptions) -> RenderResult<Self> {
        let PhysicalSize { width, height } = window.inner_size();

        let instance = Instance::new(&InstanceDescriptor {
            backends: options.backends,
            ..Default::default()
        });
        let surface: Surface<'static> = instance.create_surface(window.clone())?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await?;
        let info = adapter.get_info();
        log::info!("Using adapter '{}' ({:?})", info.name, info.backend);

        let mut required_features = Features::empty();
        if options.wireframe {
            if adapter.features().contains(Features::POLYGON_MODE_LINE) {
                required_features |= Features::POLYGON_MODE_LINE;
            } else {
                log::warn!("Adapter has no line polygon mode; wireframe toggle disabled");
            }
        }

        let (device, queue) = adapter
            .request_device(&DeviceDescriptor {
                label: Some("objview device"),
                required_features,
                required_limits: Limits::downlevel_webgl2_defaults()
                    .using_resolution(adapter.limits()),
                memory_hints: Default::default(),
                trace: wgpu::Trace::Off,
                ..Default::default()
            })
            .await?;

        // Surface format (prefer sRGB)
        let caps = surface.get_capabilities(&adapter);
        let format = caps
            .formats
            .iter()
            .copied()
            .find(|f| f.is_srgb())
            .unwrap_or(caps.formats[0]);

        let present_mode = if options.vsync {
            PresentMode::AutoVsync
        } else {
            let unthrottled = caps
                .present_modes
                .iter()
                .any(|m| matches!(m, PresentMode::Immediate | PresentMode::Mailbox));
            if !unthrottled {
                log::warn!(
                    "Unable to disable VSync, surface only offers {:?}",
                    caps.present_modes
                );
            }
            PresentMode::AutoNoVsync
        };

        let config = SurfaceConfiguration {
            usage: TextureUsages::RENDER_ATTACHMENT,
            format,
            width: width.max(1),
            height: height.max(1),
            present_mode,
            alpha_mode: caps.alpha_modes[0],
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);
        let depth = DepthTexture::new(&device, config.width, config.height);

        log::info!(
            "Surface configured: {}x{} {:?} {:?}",
            config.width,
            config.height,
            config.format,
            config.present_mode
        );

        Ok(Self {
            surface,
            config,
            device,
            queue,
            depth,
        })
    }

    #[inline]
    pub fn format(&self) -> TextureFormat {
        self.config.format
    }

    #[inline]
    pub fn size(&self) -> (u32, u32) {
        (self.config.width, self.config.height)
    }

    #[inline]
    pub fn depth_view(&self) -> &TextureView {
        &self.depth.view
    }

    #[inline]
    pub fn supports_wireframe(&self) -> bool {
        self.device.features().contains(Features::POLYGON_MODE_LINE)
    }

    /// Resize: reconfigure surface & recreate depth view.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.config.width = width.max(1);
        self.config.height = height.max(1);
        self.surface.configure(&self.device, &self.config);
        self.depth = DepthTexture::new(&self.device, self.config.width, self.config.height);
    }

    pub fn recreate_surface(&mut self) {
        self.resize(self.config.width, self.config.height);
    }

    pub fn is_surface_lost(err: &SurfaceError) -> bool {
        matches!(err, SurfaceError::Lost | SurfaceError::Outdated)
    }

    pub fn begin_frame(&self, label: &str) -> Result<Frame, SurfaceError> {
        let surface_texture = self.surface.get_current_texture()?;
        let view = surface_texture.texture.create_view(&Default::default());
        let encoder = self
            .device
            .create_command_encoder(&CommandEncoderDescriptor { label: Some(label) });
        Ok(Frame {
            surface_texture,
            view,
            encoder,
        })
    }

    pub fn present(&self, frame: Frame) {
        self.queue.submit(Some(frame.encoder.finish()));
        frame.surface_texture.present();
    }
}
