use crate::geometry::{Color, Point};
use image::{Rgb, RgbImage};

/// Background color of a freshly initialized canvas.
pub const BACKGROUND: Color = Color::new(255, 255, 255);

/// The shared square RGB pixel grid.
///
/// There is exactly one live canvas per process; it is owned by the engine
/// and replaced wholesale on restore. `get`/`set` are contract-checked:
/// callers validate coordinates first, and an out-of-range access panics
/// instead of being silently ignored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Canvas {
    pixels: RgbImage,
}

impl Canvas {
    /// Creates a `size` × `size` canvas filled with the background color.
    pub fn new(size: u32) -> Self {
        let Color { r, g, b } = BACKGROUND;
        Self {
            pixels: RgbImage::from_pixel(size, size, Rgb([r, g, b])),
        }
    }

    /// Wraps a decoded image as the new canvas, replacing nothing else.
    pub(crate) fn from_image(pixels: RgbImage) -> Self {
        Self { pixels }
    }

    pub fn size(&self) -> u32 {
        self.pixels.width()
    }

    /// Whether a buffer-space coordinate pair lies inside the grid.
    pub fn contains(&self, point: Point) -> bool {
        let side = self.size() as i32;
        (0..side).contains(&point.x) && (0..side).contains(&point.y)
    }

    /// Reads a pixel. Panics if `point` is out of range; callers validate
    /// coordinates before indexing.
    pub fn get(&self, point: Point) -> Color {
        assert!(
            self.contains(point),
            "canvas read out of range: ({}, {}) on a {} canvas",
            point.x,
            point.y,
            self.size()
        );
        let Rgb([r, g, b]) = *self.pixels.get_pixel(point.x as u32, point.y as u32);
        Color::new(r, g, b)
    }

    /// Writes a pixel. Panics if `point` is out of range; callers validate
    /// coordinates before indexing.
    pub fn set(&mut self, point: Point, color: Color) {
        assert!(
            self.contains(point),
            "canvas write out of range: ({}, {}) on a {} canvas",
            point.x,
            point.y,
            self.size()
        );
        self.pixels
            .put_pixel(point.x as u32, point.y as u32, Rgb([color.r, color.g, color.b]));
    }

    pub(crate) fn image(&self) -> &RgbImage {
        &self.pixels
    }
}
