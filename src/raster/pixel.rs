//! Single pixel access and classification
//!
//! Every scalar derived here lies in `[0, 255]`:
//!
//! - **grayscale**: luma-weighted mix of the channels
//! - **lightness**: the brightest channel
//! - **darkness inverse**: `255 - darkness`, i.e. the darkest channel

use super::buffer::RasterBuffer;
use super::types::Point;

/// Channel value of pure white
pub const WHITE: u8 = 0xFF;

/// Channel value of pure black
pub const BLACK: u8 = 0x00;

/// A colour value, independent of the buffer's storage layout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Pixel {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Pixel {
    pub const WHITE: Pixel = Pixel::gray(WHITE);
    pub const BLACK: Pixel = Pixel::gray(BLACK);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Neutral gray with all channels equal
    pub const fn gray(value: u8) -> Self {
        Self::new(value, value, value)
    }

    /// Luma (ITU-R BT.601 weights), rounded to nearest
    pub fn grayscale(&self) -> u8 {
        let weighted = 299 * self.r as u32 + 587 * self.g as u32 + 114 * self.b as u32;
        ((weighted + 500) / 1000) as u8
    }

    pub fn lightness(&self) -> u8 {
        self.r.max(self.g).max(self.b)
    }

    pub fn darkness_inverse(&self) -> u8 {
        self.r.min(self.g).min(self.b)
    }
}

impl Default for Pixel {
    fn default() -> Self {
        Pixel::WHITE
    }
}

/// Read the pixel at `p`, `None` when `p` lies outside the buffer
pub fn get_pixel(buffer: &RasterBuffer, p: Point) -> Option<Pixel> {
    buffer.read(p)
}

/// Grayscale value of the pixel at `p`; outside points read as white
pub fn get_pixel_grayscale(buffer: &RasterBuffer, p: Point) -> u8 {
    buffer.read(p).map_or(WHITE, |pixel| pixel.grayscale())
}

/// Brightest channel of the pixel at `p`; outside points read as white
pub fn get_pixel_lightness(buffer: &RasterBuffer, p: Point) -> u8 {
    buffer.read(p).map_or(WHITE, |pixel| pixel.lightness())
}

/// `255 - darkness` of the pixel at `p`; outside points read as white
pub fn get_pixel_darkness_inverse(buffer: &RasterBuffer, p: Point) -> u8 {
    buffer.read(p).map_or(WHITE, |pixel| pixel.darkness_inverse())
}

/// Write `color` at `p`.
///
/// Returns `true` if the stored value changed, `false` if the pixel already
/// held that colour.
pub fn set_pixel(
    buffer: &mut RasterBuffer,
    p: Point,
    color: Pixel,
    abs_black_threshold: u8,
) -> bool {
    debug_assert!(buffer.contains(p), "set_pixel outside the buffer: {:?}", p);
    buffer.write(p, color, abs_black_threshold)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::raster::PixelFormat;

    #[test]
    fn test_grayscale_of_neutral_is_identity() {
        for value in 0..=255u8 {
            assert_eq!(Pixel::gray(value).grayscale(), value);
        }
    }

    #[test]
    fn test_outside_points_read_as_white() {
        let mut buffer = RasterBuffer::new_white(2, 2, PixelFormat::Gray8);
        set_pixel(&mut buffer, Point::new(1, 1), Pixel::BLACK, 0);

        for p in [Point::new(-1, 0), Point::new(2, 1), Point::new(0, 5)] {
            assert_eq!(get_pixel(&buffer, p), None);
            assert_eq!(get_pixel_grayscale(&buffer, p), WHITE);
            assert_eq!(get_pixel_lightness(&buffer, p), WHITE);
            assert_eq!(get_pixel_darkness_inverse(&buffer, p), WHITE);
        }
        assert_eq!(get_pixel_grayscale(&buffer, Point::new(1, 1)), BLACK);
    }

    #[test]
    fn test_grayscale_weights() {
        assert_eq!(Pixel::new(255, 0, 0).grayscale(), 76);
        assert_eq!(Pixel::new(0, 255, 0).grayscale(), 150);
        assert_eq!(Pixel::new(0, 0, 255).grayscale(), 29);
    }

    #[test]
    fn test_lightness_and_darkness_inverse() {
        let pixel = Pixel::new(30, 200, 90);
        assert_eq!(pixel.lightness(), 200);
        assert_eq!(pixel.darkness_inverse(), 30);
    }

    #[test]
    fn test_buffer_classification() {
        let mut buffer = RasterBuffer::new_white(3, 3, PixelFormat::Rgb24);
        let p = Point::new(1, 1);
        assert!(set_pixel(&mut buffer, p, Pixel::new(10, 60, 250), 0));

        assert_eq!(get_pixel(&buffer, p), Some(Pixel::new(10, 60, 250)));
        assert_eq!(get_pixel_lightness(&buffer, p), 250);
        assert_eq!(get_pixel_darkness_inverse(&buffer, p), 10);
        assert_eq!(get_pixel_grayscale(&buffer, p), 67);
    }

    #[test]
    fn test_set_pixel_same_color_is_not_a_change() {
        let mut buffer = RasterBuffer::new_white(2, 2, PixelFormat::Gray8);
        assert!(!set_pixel(&mut buffer, Point::new(0, 1), Pixel::WHITE, 0));
    }

    #[test]
    fn test_gray_buffer_stores_grayscale() {
        let mut buffer = RasterBuffer::new_white(2, 2, PixelFormat::Gray8);
        set_pixel(&mut buffer, Point::new(0, 0), Pixel::new(255, 0, 0), 0);
        assert_eq!(get_pixel(&buffer, Point::new(0, 0)), Some(Pixel::gray(76)));
    }
}
