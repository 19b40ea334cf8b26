//! Command-line pieces shared by the `objview` and `screen` binaries.

use clap::ValueEnum;

/// GPU backend choice; `auto` lets wgpu pick among everything available.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum GpuBackend {
    #[default]
    Auto,
    #[value(alias = "vk")]
    Vulkan,
    #[value(alias = "d3d12")]
    Dx12,
    #[value(alias = "mtl")]
    Metal,
    #[value(alias = "opengl", alias = "gles")]
    Gl,
}

impl From<GpuBackend> for wgpu::Backends {
    fn from(backend: GpuBackend) -> Self {
        match backend {
            GpuBackend::Auto => wgpu::Backends::all(),
            GpuBackend::Vulkan => wgpu::Backends::VULKAN,
            GpuBackend::Dx12 => wgpu::Backends::DX12,
            GpuBackend::Metal => wgpu::Backends::METAL,
            GpuBackend::Gl => wgpu::Backends::GL,
        }
    }
}

/// Parse `WIDTHxHEIGHT` (either `x` or `X`); both sides must be non-zero.
pub fn parse_size(value: &str) -> Result<(u32, u32), String> {
    let (w, h) = value
        .split_once(['x', 'X'])
        .ok_or_else(|| format!("expected WIDTHxHEIGHT, got '{value}'"))?;
    let w: u32 = w.trim().parse().map_err(|e| format!("bad width '{w}': {e}"))?;
    let h: u32 = h.trim().parse().map_err(|e| format!("bad height '{h}': {e}"))?;
    if w == 0 || h == 0 {
        return Err(format!("size must be non-zero, got {w}x{h}"));
    }
    Ok((w, h))
}

/// `env_logger` with `info` unless `RUST_LOG` says otherwise.
pub fn init_logging() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn size_accepts_both_separators() {
        assert_eq!(parse_size("1024x768"), Ok((1024, 768)));
        assert_eq!(parse_size("640X480"), Ok((640, 480)));
    }

    #[test]
    fn size_rejects_garbage() {
        for bad in ["", "1024", "x768", "0x10", "10x0", "axb", "-1x5"] {
            assert!(parse_size(bad).is_err(), "{bad:?} should be rejected");
        }
    }

    #[test]
    fn backend_maps_to_wgpu() {
        assert_eq!(wgpu::Backends::from(GpuBackend::Auto), wgpu::Backends::all());
        assert_eq!(wgpu::Backends::from(GpuBackend::Gl), wgpu::Backends::GL);
        assert_eq!(
            GpuBackend::from_str("vk", true),
            Ok(GpuBackend::Vulkan),
        );
    }
}
