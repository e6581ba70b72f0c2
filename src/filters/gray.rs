//! Gray filter
//!
//! Wipes uniformly gray areas ("smudges") such as lid shadows or toner haze
//! that contain no real black content.
//!
//! # Algorithm
//!
//! A window of `scan_size` slides over the page from the top-left corner:
//!
//! 1. A window holding any pixel at or below the black threshold has real
//!    content and is left alone.
//! 2. Otherwise, if its inverse lightness is below the gray threshold, it is
//!    wiped to white.
//! 3. The window moves right by the horizontal step; when the next position
//!    would pass the right edge it wraps to the start of the next band, one
//!    vertical step down. The scan ends when the window passes the bottom.

use tracing::{debug, trace};

use super::types::GrayfilterParameters;
use crate::raster::{
    count_pixels_within_brightness, inverse_lightness_rect, wipe_rectangle, Pixel, Point,
    RasterBuffer, Rectangle,
};

/// Run the gray filter, returning the number of pixels wiped
pub fn grayfilter(
    buffer: &mut RasterBuffer,
    params: &GrayfilterParameters,
    abs_black_threshold: u8,
) -> u64 {
    let size = params.scan_size();
    let step = params.scan_step();
    let (width, height) = (buffer.width() as i64, buffer.height() as i64);

    if size.horizontal as i64 > width || size.vertical as i64 > height {
        debug!(
            width,
            height,
            window_h = size.horizontal,
            window_v = size.vertical,
            "Gray filter window larger than page, skipping"
        );
        return 0;
    }

    let (size_h, size_v) = (size.horizontal as i64, size.vertical as i64);
    let (step_h, step_v) = (step.horizontal as i64, step.vertical as i64);
    // Window origin; always inside the page when a window is evaluated
    let (mut x, mut y) = (0i64, 0i64);
    let mut wiped = 0;

    loop {
        let area = Rectangle::from_size(Point::new(x as i32, y as i32), size);
        let black = count_pixels_within_brightness(
            buffer,
            area,
            0,
            abs_black_threshold,
            false,
            abs_black_threshold,
        );

        if black == 0 {
            let lightness = inverse_lightness_rect(buffer, area);
            // lower threshold, less deletion
            if lightness < params.abs_threshold() {
                let count = wipe_rectangle(buffer, area, Pixel::WHITE, abs_black_threshold);
                trace!(x, y, count, "Wiped gray window");
                wiped += count;
            }
        }

        if x + size_h - 1 + step_h < width {
            x += step_h;
        } else {
            x = 0;
            y += step_v;
            if y + size_v - 1 >= height {
                break;
            }
        }
    }

    debug!(wiped, threshold = params.abs_threshold(), "Gray filter finished");
    wiped
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::raster::{get_pixel, set_pixel, Extent, PixelFormat};

    fn params(size: u32, step: u32, threshold: f32) -> GrayfilterParameters {
        GrayfilterParameters::new(Extent::square(size), Extent::square(step), threshold).unwrap()
    }

    fn paint(buffer: &mut RasterBuffer, area: Rectangle, color: Pixel) {
        for p in area.points() {
            set_pixel(buffer, p, color, 0);
        }
    }

    fn block(x: i32, y: i32, size: i32) -> Rectangle {
        Rectangle::new(Point::new(x, y), Point::new(x + size - 1, y + size - 1))
    }

    #[test]
    fn test_light_gray_window_wiped() {
        let mut buffer = RasterBuffer::new_white(20, 20, PixelFormat::Gray8);
        paint(&mut buffer, block(0, 0, 5), Pixel::gray(200));

        assert_eq!(grayfilter(&mut buffer, &params(5, 5, 0.5), 85), 25);
        assert_eq!(get_pixel(&buffer, Point::new(2, 2)), Some(Pixel::WHITE));
    }

    #[test]
    fn test_dark_gray_window_kept() {
        let mut buffer = RasterBuffer::new_white(20, 20, PixelFormat::Gray8);
        paint(&mut buffer, block(0, 0, 5), Pixel::gray(100));

        // inverse lightness 155 is not below 127
        assert_eq!(grayfilter(&mut buffer, &params(5, 5, 0.5), 85), 0);
        assert_eq!(get_pixel(&buffer, Point::new(2, 2)), Some(Pixel::gray(100)));
    }

    #[test]
    fn test_black_pixel_protects_window() {
        let mut buffer = RasterBuffer::new_white(10, 10, PixelFormat::Gray8);
        paint(&mut buffer, block(0, 0, 5), Pixel::gray(220));
        set_pixel(&mut buffer, Point::new(4, 4), Pixel::gray(80), 0);

        assert_eq!(grayfilter(&mut buffer, &params(5, 5, 0.5), 85), 0);
        assert_eq!(get_pixel(&buffer, Point::new(0, 0)), Some(Pixel::gray(220)));
    }

    #[test]
    fn test_every_window_visited() {
        let mut buffer = RasterBuffer::new_white(20, 20, PixelFormat::Gray8);
        let whole = buffer.bounds().unwrap();
        paint(&mut buffer, whole, Pixel::gray(230));

        assert_eq!(grayfilter(&mut buffer, &params(5, 5, 0.5), 85), 400);
    }

    #[test]
    fn test_partial_window_at_edge_is_skipped() {
        let mut buffer = RasterBuffer::new_white(7, 7, PixelFormat::Gray8);
        let whole = buffer.bounds().unwrap();
        paint(&mut buffer, whole, Pixel::gray(230));

        // Only the 5x5 window at the origin fits
        assert_eq!(grayfilter(&mut buffer, &params(5, 5, 0.5), 85), 25);
        assert_eq!(get_pixel(&buffer, Point::new(6, 6)), Some(Pixel::gray(230)));
    }

    #[test]
    fn test_overlapping_windows() {
        let mut buffer = RasterBuffer::new_white(10, 10, PixelFormat::Gray8);
        let whole = buffer.bounds().unwrap();
        paint(&mut buffer, whole, Pixel::gray(240));

        assert_eq!(grayfilter(&mut buffer, &params(4, 2, 0.5), 85), 100);
    }

    #[test]
    fn test_non_square_window_and_step() {
        // Windows at x = 0, 4, 8 and y = 0, 2, 4, 6; row 9 is never covered
        let mut buffer = RasterBuffer::new_white(12, 10, PixelFormat::Gray8);
        let whole = buffer.bounds().unwrap();
        paint(&mut buffer, whole, Pixel::gray(230));

        let params =
            GrayfilterParameters::new(Extent::new(4, 3), Extent::new(4, 2), 0.5).unwrap();
        assert_eq!(grayfilter(&mut buffer, &params, 85), 108);
        assert_eq!(get_pixel(&buffer, Point::new(11, 8)), Some(Pixel::WHITE));
        assert_eq!(get_pixel(&buffer, Point::new(0, 9)), Some(Pixel::gray(230)));
        assert_eq!(get_pixel(&buffer, Point::new(11, 9)), Some(Pixel::gray(230)));
    }

    #[test]
    fn test_huge_steps_end_row_or_scan() {
        let mut buffer = RasterBuffer::new_white(20, 20, PixelFormat::Gray8);
        let whole = buffer.bounds().unwrap();
        paint(&mut buffer, whole, Pixel::gray(230));

        // Only the top band of windows fits
        let params =
            GrayfilterParameters::new(Extent::square(5), Extent::new(5, u32::MAX), 0.5).unwrap();
        assert_eq!(grayfilter(&mut buffer, &params, 85), 100);
        assert_eq!(get_pixel(&buffer, Point::new(19, 4)), Some(Pixel::WHITE));
        assert_eq!(get_pixel(&buffer, Point::new(0, 5)), Some(Pixel::gray(230)));

        // Only the left column of windows fits
        let mut buffer = RasterBuffer::new_white(20, 20, PixelFormat::Gray8);
        paint(&mut buffer, whole, Pixel::gray(230));
        let params =
            GrayfilterParameters::new(Extent::square(5), Extent::new(u32::MAX, 5), 0.5).unwrap();
        assert_eq!(grayfilter(&mut buffer, &params, 85), 100);
        assert_eq!(get_pixel(&buffer, Point::new(4, 19)), Some(Pixel::WHITE));
        assert_eq!(get_pixel(&buffer, Point::new(5, 0)), Some(Pixel::gray(230)));

        let mut buffer = RasterBuffer::new_white(20, 20, PixelFormat::Gray8);
        paint(&mut buffer, whole, Pixel::gray(230));
        let params = GrayfilterParameters::new(
            Extent::square(5),
            Extent::new(3_000_000_000, 3_000_000_000),
            0.5,
        )
        .unwrap();
        assert_eq!(grayfilter(&mut buffer, &params, 85), 25);
    }

    #[test]
    fn test_window_larger_than_page() {
        let mut buffer = RasterBuffer::new_white(4, 4, PixelFormat::Gray8);
        assert_eq!(grayfilter(&mut buffer, &params(5, 1, 0.5), 85), 0);
    }
}
