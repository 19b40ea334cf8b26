//! Texture decoding into RGBA8 pixel data ready for GPU upload.

use std::path::Path;

use anyhow::{Context, Result, ensure};
use image::DynamicImage;

/// Texture data in CPU-friendly format before GPU upload.
#[derive(Clone, Debug, PartialEq)]
pub struct TextureData {
    pub data: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

impl TextureData {
    pub const BYTES_PER_PIXEL: u32 = 4;

    /// Wrap raw RGBA8 pixels, row-major, top row first.
    pub fn from_rgba8(width: u32, height: u32, data: Vec<u8>) -> Result<Self> {
        ensure!(width > 0 && height > 0, "Texture must not be empty");
        let expected = Self::byte_len(width, height)
            .with_context(|| format!("{width}x{height} RGBA8 texture is too large"))?;
        ensure!(
            data.len() == expected,
            "Data size {} doesn't match {}x{} RGBA8",
            data.len(),
            width,
            height
        );
        Ok(Self {
            data,
            width,
            height,
        })
    }

    /// Decode an image file (PNG or JPEG). With `flip_vertically` the bottom
    /// row becomes the first row, so OBJ texture coordinates (origin at the
    /// bottom-left) sample the image the right way up.
    pub fn load(path: impl AsRef<Path>, flip_vertically: bool) -> Result<Self> {
        let path = path.as_ref();
        let img = image::open(path)
            .with_context(|| format!("Failed to open image {}", path.display()))?;
        let texture = Self::from_image(img, flip_vertically);
        log::info!(
            "Loaded texture {:?}: {}x{}{}",
            path,
            texture.width,
            texture.height,
            if flip_vertically { " (flipped)" } else { "" }
        );
        Ok(texture)
    }

    /// Like [`TextureData::load`], but a texture that fails to load is
    /// replaced by the checkerboard so the mesh still draws.
    pub fn load_or_checker(path: impl AsRef<Path>, flip_vertically: bool) -> Self {
        Self::load(&path, flip_vertically).unwrap_or_else(|err| {
            log::warn!("{err:#}; using checkerboard instead");
            Self::checkerboard(64)
        })
    }

    pub fn from_image(img: DynamicImage, flip_vertically: bool) -> Self {
        let img = if flip_vertically { img.flipv() } else { img };
        let rgba = img.into_rgba8();
        let (width, height) = rgba.dimensions();
        Self {
            data: rgba.into_raw(),
            width,
            height,
        }
    }

    /// White/gray checkerboard with 8 pixel cells.
    pub fn checkerboard(size: u32) -> Self {
        let size = size.max(1);
        let mut data = Vec::with_capacity(Self::byte_len(size, size).unwrap_or(0));
        for y in 0..size {
            for x in 0..size {
                if ((x / 8) + (y / 8)) % 2 == 0 {
                    data.extend_from_slice(&[255, 255, 255, 255]);
                } else {
                    data.extend_from_slice(&[128, 128, 128, 255]);
                }
            }
        }
        Self {
            data,
            width: size,
            height: size,
        }
    }

    /// Row pitch for the GPU copy. Saturates for widths no texture can have.
    #[inline]
    pub fn bytes_per_row(&self) -> u32 {
        self.width.saturating_mul(Self::BYTES_PER_PIXEL)
    }

    pub fn is_valid(&self) -> bool {
        self.width > 0
            && self.height > 0
            && Self::byte_len(self.width, self.height) == Some(self.data.len())
    }

    /// Total RGBA8 byte count, or `None` when the row pitch does not fit a
    /// `u32` or the total does not fit a `usize`.
    fn byte_len(width: u32, height: u32) -> Option<usize> {
        let row = width.checked_mul(Self::BYTES_PER_PIXEL)?;
        usize::try_from(u64::from(row) * u64::from(height)).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};

    fn two_row_image() -> DynamicImage {
        // top row red, bottom row blue
        let mut img = RgbaImage::new(2, 2);
        for x in 0..2 {
            img.put_pixel(x, 0, Rgba([255, 0, 0, 255]));
            img.put_pixel(x, 1, Rgba([0, 0, 255, 255]));
        }
        DynamicImage::ImageRgba8(img)
    }

    #[test]
    fn flip_moves_bottom_row_first() {
        let plain = TextureData::from_image(two_row_image(), false);
        assert_eq!(&plain.data[..4], &[255, 0, 0, 255]);

        let flipped = TextureData::from_image(two_row_image(), true);
        assert_eq!(&flipped.data[..4], &[0, 0, 255, 255]);
        assert_eq!(&flipped.data[8..12], &[255, 0, 0, 255]);
        assert!(flipped.is_valid());
    }

    #[test]
    fn checkerboard_is_valid() {
        let tex = TextureData::checkerboard(16);
        assert!(tex.is_valid());
        assert_eq!(&tex.data[..4], &[255, 255, 255, 255]);
        // pixel (8, 0) starts the next cell
        assert_eq!(&tex.data[8 * 4..8 * 4 + 4], &[128, 128, 128, 255]);
    }

    #[test]
    fn raw_size_is_checked() {
        assert!(TextureData::from_rgba8(2, 2, vec![0; 16]).is_ok());
        assert!(TextureData::from_rgba8(2, 2, vec![0; 15]).is_err());
        assert!(TextureData::from_rgba8(0, 2, vec![]).is_err());
    }

    #[test]
    fn missing_file_falls_back_to_checker() {
        assert!(TextureData::load("no/such/texture.png", true).is_err());
        let tex = TextureData::load_or_checker("no/such/texture.png", true);
        assert_eq!(tex, TextureData::checkerboard(64));
    }

    #[test]
    fn bundled_textures_decode() {
        let dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../assets/textures");
        for name in ["crate.png", "woodcrate_diffuse.png", "robot_diffuse.png", "tile_floor.png"] {
            let tex = TextureData::load(dir.join(name), true).unwrap();
            assert_eq!((tex.width, tex.height), (128, 128), "{name}");
            assert!(tex.is_valid());
        }
    }

    #[test]
    fn huge_sizes_are_errors_not_panics() {
        assert!(TextureData::from_rgba8(70_000, 70_000, vec![]).is_err());
        assert!(TextureData::from_rgba8(65_536, 16_384, vec![]).is_err());

        let err = TextureData::from_rgba8(u32::MAX, 2, vec![]).unwrap_err();
        assert!(format!("{err:#}").contains("too large"));

        let bogus = TextureData {
            data: vec![],
            width: u32::MAX,
            height: u32::MAX,
        };
        assert!(!bogus.is_valid());
        assert_eq!(bogus.bytes_per_row(), u32::MAX);
    }
}
