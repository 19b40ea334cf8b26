//! Point canvas: plots a fixed seed pattern once and keeps presenting it.

use anyhow::Result;
use app::{GpuBackend, init_logging, parse_size};
use clap::Parser;
use platform::{ScreenConfig, run_screen};

#[derive(Parser, Debug)]
#[command(name = "screen", about = "Scaled point canvas")]
struct Cli {
    /// Logical canvas size as WIDTHxHEIGHT
    #[arg(long, default_value = "640x480", value_parser = parse_size)]
    size: (u32, u32),

    /// Window pixels per canvas point
    #[arg(long, default_value_t = 2, value_parser = clap::value_parser!(u32).range(1..=16))]
    scale: u32,

    #[arg(long, value_enum, default_value_t = GpuBackend::Auto)]
    gpu_backend: GpuBackend,
}

/// Glider and R-pentomino cells, relative to their anchors.
const GLIDER: [(i32, i32); 5] = [(1, 0), (2, 1), (0, 2), (1, 2), (2, 2)];
const R_PENTOMINO: [(i32, i32); 5] = [(1, 0), (2, 0), (0, 1), (1, 1), (1, 2)];

fn seed_cells(width: u32, height: u32) -> Vec<(f32, f32)> {
    let (w, h) = (width as i32, height as i32);
    let anchors = [(GLIDER, (4, 4)), (R_PENTOMINO, (w / 2, h / 2))];
    let mut cells: Vec<(f32, f32)> = anchors
        .iter()
        .flat_map(|(shape, (ax, ay))| shape.iter().map(move |(dx, dy)| (ax + dx, ay + dy)))
        .map(|(x, y)| (x as f32, y as f32))
        .collect();
    // blinker in the lower right
    cells.extend((0..3).map(|i| ((w - 8 + i) as f32, (h - 8) as f32)));
    cells
}

fn main() -> Result<()> {
    init_logging();
    let cli = Cli::parse();

    let (width, height) = cli.size;
    let config = ScreenConfig {
        width,
        height,
        scale: cli.scale,
        backends: cli.gpu_backend.into(),
    };
    let mut canvas = config.canvas();
    for (x, y) in seed_cells(width, height) {
        canvas.set_pixel(x, y);
    }
    log::info!("Plotted {} points on a {}x{} canvas", canvas.points().len(), width, height);

    run_screen(config, canvas)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seed_fits_default_canvas() {
        let cells = seed_cells(640, 480);
        assert_eq!(cells.len(), 13);
        assert!(
            cells
                .iter()
                .all(|&(x, y)| (0.0..640.0).contains(&x) && (0.0..480.0).contains(&y))
        );
    }

    #[test]
    fn scale_is_bounded() {
        assert!(Cli::try_parse_from(["screen", "--scale", "0"]).is_err());
        assert_eq!(Cli::parse_from(["screen"]).scale, 2);
    }
}
