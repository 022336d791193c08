//! Geometric primitives rasterized onto the canvas.
//!
//! Every operation here takes buffer-space coordinates that the command
//! validator has already bounds-checked; the canvas enforces that contract
//! by panicking on out-of-range writes. Only [`crop_and_magnify`] allocates
//! a new buffer; the drawing operations mutate in place.

use crate::canvas::Canvas;
use crate::geometry::{Color, Point};
use image::imageops::{self, FilterType};

pub fn draw_point(canvas: &mut Canvas, point: Point, color: Color) {
    canvas.set(point, color);
}

/// Bresenham integer line, 1 pixel wide, inclusive of both endpoints.
///
/// The pixel set is fully determined by the endpoints: no anti-aliasing,
/// no floating point.
pub fn draw_line(canvas: &mut Canvas, from: Point, to: Point, color: Color) {
    let dx = (to.x - from.x).abs();
    let dy = -(to.y - from.y).abs();
    let sx = if from.x < to.x { 1 } else { -1 };
    let sy = if from.y < to.y { 1 } else { -1 };
    let mut err = dx + dy;
    let mut x = from.x;
    let mut y = from.y;

    loop {
        canvas.set(Point::new(x, y), color);
        if x == to.x && y == to.y {
            break;
        }
        let doubled = 2 * err;
        if doubled >= dy {
            err += dy;
            x += sx;
        }
        if doubled <= dx {
            err += dx;
            y += sy;
        }
    }
}

/// Midpoint circle outline. A radius of zero draws the center pixel.
///
/// The caller guarantees the bounding box `[cx-r, cx+r] × [cy-r, cy+r]`
/// lies inside the canvas, so the outline never clips.
pub fn draw_circle_outline(canvas: &mut Canvas, center: Point, radius: i32, color: Color) {
    debug_assert!(radius >= 0, "negative radius is rejected at validation");
    if radius == 0 {
        canvas.set(center, color);
        return;
    }

    let mut x = radius;
    let mut y = 0;
    let mut err = 1 - radius;

    while x >= y {
        plot_octants(canvas, center, x, y, color);
        y += 1;
        if err < 0 {
            err += 2 * y + 1;
        } else {
            x -= 1;
            err += 2 * (y - x) + 1;
        }
    }
}

fn plot_octants(canvas: &mut Canvas, center: Point, x: i32, y: i32, color: Color) {
    let offsets = [
        (x, y),
        (y, x),
        (-y, x),
        (-x, y),
        (-x, -y),
        (-y, -x),
        (y, -x),
        (x, -y),
    ];
    for (dx, dy) in offsets {
        canvas.set(Point::new(center.x + dx, center.y + dy), color);
    }
}

/// Fills the rectangle spanned by two opposite corners, inclusive of all
/// four. Corners may arrive in any order; each axis is normalized to
/// min/max before filling.
pub fn fill_rect(canvas: &mut Canvas, a: Point, b: Point, color: Color) {
    let (left, right) = (a.x.min(b.x), a.x.max(b.x));
    let (top, bottom) = (a.y.min(b.y), a.y.max(b.y));

    for y in top..=bottom {
        for x in left..=right {
            canvas.set(Point::new(x, y), color);
        }
    }
}

/// Extracts the square of side `2 * half_extent` centered at `center`,
/// clamped so the box stays inside the canvas (the center shifts, the box
/// never shrinks), then nearest-neighbor upscales it to
/// `target_size × target_size`. Returns a new, independent buffer.
pub fn crop_and_magnify(
    canvas: &Canvas,
    center: Point,
    half_extent: u32,
    target_size: u32,
) -> Canvas {
    let size = canvas.size();
    let side = half_extent.saturating_mul(2).clamp(1, size);
    let max_corner = (size - side) as i64;
    let left = (center.x as i64 - half_extent as i64).clamp(0, max_corner) as u32;
    let top = (center.y as i64 - half_extent as i64).clamp(0, max_corner) as u32;

    let region = imageops::crop_imm(canvas.image(), left, top, side, side).to_image();
    let scaled = imageops::resize(&region, target_size, target_size, FilterType::Nearest);
    Canvas::from_image(scaled)
}
