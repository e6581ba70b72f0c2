//! Rectangle-scoped operations
//!
//! Every operation first intersects the requested rectangle with the
//! buffer(s) it touches, so the iteration bounds always come from the
//! buffer dimensions.

use super::buffer::RasterBuffer;
use super::pixel::{get_pixel_grayscale, get_pixel_lightness, set_pixel, Pixel, WHITE};
use super::types::{Extent, Point, Rectangle};

/// Clip `rect` to the buffer, `None` when nothing of it is inside
fn clip(buffer: &RasterBuffer, rect: Rectangle) -> Option<Rectangle> {
    buffer.bounds().and_then(|bounds| bounds.intersect(&rect))
}

/// Count pixels whose grayscale lies in `[min_color, max_brightness]`.
///
/// The rectangle is visited row by row, top to bottom. With `clear` set,
/// each matching pixel is set to white as it is counted.
pub fn count_pixels_within_brightness(
    buffer: &mut RasterBuffer,
    rect: Rectangle,
    min_color: u8,
    max_brightness: u8,
    clear: bool,
    abs_black_threshold: u8,
) -> u64 {
    let Some(area) = clip(buffer, rect) else {
        return 0;
    };

    let mut count = 0;
    for p in area.points() {
        let pixel = get_pixel_grayscale(buffer, p);
        if pixel >= min_color && pixel <= max_brightness {
            if clear {
                set_pixel(buffer, p, Pixel::WHITE, abs_black_threshold);
            }
            count += 1;
        }
    }
    count
}

/// Inverted mean lightness of the rectangle: 0 for pure white, 255 for
/// pure black.
pub fn inverse_lightness_rect(buffer: &RasterBuffer, rect: Rectangle) -> u8 {
    let Some(area) = clip(buffer, rect) else {
        return 0;
    };

    let total: u64 = area
        .points()
        .map(|p| get_pixel_lightness(buffer, p) as u64)
        .sum();
    WHITE - (total / area.area()) as u8
}

/// Fill the rectangle with `fill`, returning how many pixels changed
pub fn wipe_rectangle(
    buffer: &mut RasterBuffer,
    rect: Rectangle,
    fill: Pixel,
    abs_black_threshold: u8,
) -> u64 {
    let Some(area) = clip(buffer, rect) else {
        return 0;
    };

    area.points()
        .filter(|&p| set_pixel(buffer, p, fill, abs_black_threshold))
        .count() as u64
}

/// Copy `rect` of `source` into `target` with its top-left corner landing
/// on `dest`.
///
/// Only the part of `rect` that exists in `source` and maps inside `target`
/// is copied.
pub fn copy_rectangle(
    source: &RasterBuffer,
    target: &mut RasterBuffer,
    rect: Rectangle,
    dest: Point,
    abs_black_threshold: u8,
) {
    let dx = dest.x - rect.top_left().x;
    let dy = dest.y - rect.top_left().y;

    let Some(target_bounds) = target.bounds() else {
        return;
    };
    // Target bounds expressed in source coordinates
    let reachable = target_bounds.shift(-dx, -dy);
    let Some(area) = clip(source, rect).and_then(|area| area.intersect(&reachable)) else {
        return;
    };

    for p in area.points() {
        if let Some(pixel) = source.read(p) {
            set_pixel(target, p.shift(dx, dy), pixel, abs_black_threshold);
        }
    }
}

/// Center the whole of `source` inside the `area`-sized region of `target`
/// starting at `origin`.
///
/// A smaller source is surrounded by an equal `background` border, a bigger
/// one is cropped equally on both sides.
pub fn center_image(
    source: &RasterBuffer,
    target: &mut RasterBuffer,
    origin: Point,
    area: Extent,
    background: Pixel,
    abs_black_threshold: u8,
) {
    if area.is_empty() || source.bounds().is_none() {
        return;
    }

    let (w, h) = (source.width() as i32, source.height() as i32);
    let (ww, hh) = (area.horizontal as i32, area.vertical as i32);

    // A border will remain, so clear the whole area first
    if w < ww || h < hh {
        wipe_rectangle(
            target,
            Rectangle::from_size(origin, area),
            background,
            abs_black_threshold,
        );
    }

    let (mut x, mut y) = (0, 0);
    let (mut copy_w, mut copy_h) = (w, h);
    let mut to = origin;
    if w < ww {
        to.x += (ww - w) / 2;
    }
    if h < hh {
        to.y += (hh - h) / 2;
    }
    if w > ww {
        x += (w - ww) / 2;
        copy_w = ww;
    }
    if h > hh {
        y += (h - hh) / 2;
        copy_h = hh;
    }

    copy_rectangle(
        source,
        target,
        Rectangle::new(Point::new(x, y), Point::new(x + copy_w - 1, y + copy_h - 1)),
        to,
        abs_black_threshold,
    );
}
