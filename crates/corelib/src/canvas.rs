//! Passive point canvas: a list of pixels redrawn on every update.

/// A point in logical canvas coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

const BACKGROUND: [u8; 4] = [0, 0, 0, 255];
const FOREGROUND: [u8; 4] = [255, 255, 255, 255];

/// Logical-size canvas with an integer render scale.
///
/// The canvas only stores points; it has no simulation of its own.
#[derive(Clone, Debug)]
pub struct Canvas {
    width: u32,
    height: u32,
    scale: u32,
    points: Vec<Point>,
}

impl Canvas {
    pub fn new(width: u32, height: u32, scale: u32) -> Self {
        Self {
            width: width.max(1),
            height: height.max(1),
            scale: scale.max(1),
            points: Vec::new(),
        }
    }

    #[inline]
    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    #[inline]
    pub fn scale(&self) -> u32 {
        self.scale
    }

    /// Window size in physical pixels, saturating at `u32::MAX`.
    #[inline]
    pub fn window_size(&self) -> (u32, u32) {
        (
            self.width.saturating_mul(self.scale),
            self.height.saturating_mul(self.scale),
        )
    }

    pub fn set_pixel(&mut self, x: f32, y: f32) {
        self.points.push(Point { x, y });
    }

    pub fn clear_pixels(&mut self) {
        self.points.clear();
    }

    #[inline]
    pub fn points(&self) -> &[Point] {
        &self.points
    }

    /// RGBA8 frame of the logical size: black background with one white
    /// pixel per in-bounds point.
    pub fn rasterize(&self) -> Vec<u8> {
        let mut frame: Vec<u8> = BACKGROUND
            .iter()
            .copied()
            .cycle()
            .take(self.width as usize * self.height as usize * 4)
            .collect();

        for p in &self.points {
            let (x, y) = (p.x.floor(), p.y.floor());
            if !(x >= 0.0 && y >= 0.0 && x < self.width as f32 && y < self.height as f32) {
                continue;
            }
            let offset = (y as usize * self.width as usize + x as usize) * 4;
            frame[offset..offset + 4].copy_from_slice(&FOREGROUND);
        }
        frame
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pixel(frame: &[u8], width: u32, x: usize, y: usize) -> &[u8] {
        let offset = (y * width as usize + x) * 4;
        &frame[offset..offset + 4]
    }

    #[test]
    fn empty_canvas_is_black() {
        let canvas = Canvas::new(4, 3, 2);
        let frame = canvas.rasterize();
        assert_eq!(frame.len(), 4 * 3 * 4);
        assert!(frame.chunks(4).all(|px| px == BACKGROUND));
        assert_eq!(canvas.window_size(), (8, 6));
    }

    #[test]
    fn points_are_plotted_and_cleared() {
        let mut canvas = Canvas::new(4, 3, 1);
        canvas.set_pixel(1.7, 2.2);
        canvas.set_pixel(0.0, 0.0);
        canvas.set_pixel(-1.0, 1.0);
        canvas.set_pixel(4.0, 0.0);
        canvas.set_pixel(f32::NAN, 0.0);
        assert_eq!(canvas.points().len(), 5);

        let frame = canvas.rasterize();
        assert_eq!(pixel(&frame, 4, 1, 2), FOREGROUND);
        assert_eq!(pixel(&frame, 4, 0, 0), FOREGROUND);
        let lit = frame.chunks(4).filter(|px| *px == FOREGROUND).count();
        assert_eq!(lit, 2);

        canvas.clear_pixels();
        assert!(canvas.points().is_empty());
        assert!(canvas.rasterize().chunks(4).all(|px| px == BACKGROUND));
    }

    #[test]
    fn window_size_saturates() {
        let canvas = Canvas::new(u32::MAX, 10, 4);
        assert_eq!(canvas.window_size(), (u32::MAX, 40));
    }
}
