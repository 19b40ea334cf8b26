//! Textured OBJ viewer with a first-person camera.
//!
//! WASD/Space/Ctrl move, the mouse looks around, `1` toggles wireframe and
//! Escape quits.

use std::path::PathBuf;

use anyhow::Result;
use app::{GpuBackend, init_logging, parse_size};
use clap::Parser;
use platform::ObjviewConfig;

#[derive(Parser, Debug)]
#[command(name = "objview", about = "Textured OBJ scene with a fly camera")]
struct Cli {
    /// Directory containing `assets/` and `shaders/`
    #[arg(long, default_value = ".")]
    assets: PathBuf,

    /// Window size as WIDTHxHEIGHT
    #[arg(long, default_value = "1024x768", value_parser = parse_size)]
    size: (u32, u32),

    #[arg(long, value_enum, default_value_t = GpuBackend::Auto)]
    gpu_backend: GpuBackend,

    /// Camera speed in units per second
    #[arg(long, default_value_t = 2.5)]
    move_speed: f32,

    /// Degrees of rotation per pixel of mouse motion
    #[arg(long, default_value_t = 0.1)]
    mouse_sensitivity: f32,
}

fn main() -> Result<()> {
    init_logging();
    let cli = Cli::parse();

    let (width, height) = cli.size;
    log::info!(
        "Starting objview. Backend: {:?}, window_size={}x{}, assets={}",
        cli.gpu_backend,
        width,
        height,
        cli.assets.display()
    );

    platform::run_objview(ObjviewConfig {
        root: cli.assets,
        width,
        height,
        backends: cli.gpu_backend.into(),
        move_speed: cli.move_speed,
        mouse_sensitivity: cli.mouse_sensitivity,
        ..ObjviewConfig::default()
    })?;

    log::info!("Graceful shutdown. Bye!");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn defaults() {
        let cli = Cli::parse_from(["objview"]);
        assert_eq!(cli.size, (1024, 768));
        assert_eq!(cli.gpu_backend, GpuBackend::Auto);
        assert_eq!(cli.assets, PathBuf::from("."));
        assert!((cli.move_speed - 2.5).abs() < f32::EPSILON);
    }

    #[test]
    fn overrides() {
        let cli = Cli::parse_from([
            "objview",
            "--size",
            "800x600",
            "--gpu-backend",
            "vulkan",
            "--assets",
            "/tmp/scene",
        ]);
        assert_eq!(cli.size, (800, 600));
        assert_eq!(cli.gpu_backend, GpuBackend::Vulkan);
        assert_eq!(cli.assets, PathBuf::from("/tmp/scene"));
    }
}
