//! In-memory raster storage
//!
//! [`RasterBuffer`] wraps an `image` buffer together with the pixel format
//! the filters should honour. Grayscale and bi-level pages keep one byte per
//! pixel, colour pages three.

use image::{DynamicImage, GrayImage, Luma, Rgb, RgbImage};
use serde::{Deserialize, Serialize};

use super::pixel::Pixel;
use super::types::{Point, Rectangle};

/// Stored value for a black bi-level pixel
const MONO_BLACK: u8 = 0x00;

/// Stored value for a white bi-level pixel
const MONO_WHITE: u8 = 0xFF;

/// Pixel layout of a [`RasterBuffer`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PixelFormat {
    /// 8-bit grayscale
    Gray8,
    /// 8-bit per channel RGB
    Rgb24,
    /// Bi-level black/white, one byte per pixel holding 0 or 255
    Mono,
}

impl PixelFormat {
    pub fn name(&self) -> &'static str {
        match self {
            PixelFormat::Gray8 => "gray8",
            PixelFormat::Rgb24 => "rgb24",
            PixelFormat::Mono => "mono",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Storage {
    Gray(GrayImage),
    Rgb(RgbImage),
}

/// A 2D pixel grid owned by the caller and mutated in place by the filters
#[derive(Debug, Clone, PartialEq)]
pub struct RasterBuffer {
    format: PixelFormat,
    storage: Storage,
}

impl RasterBuffer {
    /// Allocate a buffer with every pixel set to `background`
    pub fn new_filled(
        width: u32,
        height: u32,
        format: PixelFormat,
        background: Pixel,
        abs_black_threshold: u8,
    ) -> Self {
        let storage = match format {
            PixelFormat::Gray8 => {
                Storage::Gray(GrayImage::from_pixel(width, height, Luma([background.grayscale()])))
            }
            PixelFormat::Mono => Storage::Gray(GrayImage::from_pixel(
                width,
                height,
                Luma([mono_value(background, abs_black_threshold)]),
            )),
            PixelFormat::Rgb24 => Storage::Rgb(RgbImage::from_pixel(
                width,
                height,
                Rgb([background.r, background.g, background.b]),
            )),
        };
        Self { format, storage }
    }

    /// Allocate a white buffer
    pub fn new_white(width: u32, height: u32, format: PixelFormat) -> Self {
        Self::new_filled(width, height, format, Pixel::WHITE, 0)
    }

    /// Wrap a decoded image.
    ///
    /// 8-bit grayscale images are kept as [`PixelFormat::Gray8`], other
    /// grayscale layouts are narrowed to it, everything else becomes
    /// [`PixelFormat::Rgb24`].
    pub fn from_dynamic(image: DynamicImage) -> Self {
        match image {
            DynamicImage::ImageLuma8(gray) => Self::from_gray(gray),
            DynamicImage::ImageRgb8(rgb) => Self::from_rgb(rgb),
            other if !other.color().has_color() => Self::from_gray(other.to_luma8()),
            other => Self::from_rgb(other.to_rgb8()),
        }
    }

    pub fn from_gray(image: GrayImage) -> Self {
        Self {
            format: PixelFormat::Gray8,
            storage: Storage::Gray(image),
        }
    }

    pub fn from_rgb(image: RgbImage) -> Self {
        Self {
            format: PixelFormat::Rgb24,
            storage: Storage::Rgb(image),
        }
    }

    /// Hand the pixels back as an `image` value for encoding.
    ///
    /// Bi-level buffers are returned as 8-bit grayscale.
    pub fn into_dynamic(self) -> DynamicImage {
        match self.storage {
            Storage::Gray(gray) => DynamicImage::ImageLuma8(gray),
            Storage::Rgb(rgb) => DynamicImage::ImageRgb8(rgb),
        }
    }

    /// Copy into another pixel format.
    ///
    /// Converting to [`PixelFormat::Mono`] classifies each pixel with
    /// `abs_black_threshold`.
    pub fn to_format(&self, format: PixelFormat, abs_black_threshold: u8) -> RasterBuffer {
        if format == self.format {
            return self.clone();
        }
        let mut target =
            RasterBuffer::new_filled(self.width(), self.height(), format, Pixel::WHITE, 0);
        if let Some(bounds) = self.bounds() {
            for p in bounds.points() {
                if let Some(pixel) = self.read(p) {
                    target.write(p, pixel, abs_black_threshold);
                }
            }
        }
        target
    }

    pub fn format(&self) -> PixelFormat {
        self.format
    }

    pub fn width(&self) -> u32 {
        match &self.storage {
            Storage::Gray(gray) => gray.width(),
            Storage::Rgb(rgb) => rgb.width(),
        }
    }

    pub fn height(&self) -> u32 {
        match &self.storage {
            Storage::Gray(gray) => gray.height(),
            Storage::Rgb(rgb) => rgb.height(),
        }
    }

    /// The rectangle covering the whole buffer, `None` for an empty buffer
    pub fn bounds(&self) -> Option<Rectangle> {
        if self.width() == 0 || self.height() == 0 {
            return None;
        }
        Some(Rectangle::new(
            Point::new(0, 0),
            Point::new(self.width() as i32 - 1, self.height() as i32 - 1),
        ))
    }

    pub fn contains(&self, p: Point) -> bool {
        p.x >= 0 && p.y >= 0 && (p.x as u32) < self.width() && (p.y as u32) < self.height()
    }

    /// Read the pixel at `p`, `None` outside the buffer
    pub fn read(&self, p: Point) -> Option<Pixel> {
        if !self.contains(p) {
            return None;
        }
        let (x, y) = (p.x as u32, p.y as u32);
        Some(match &self.storage {
            Storage::Gray(gray) => Pixel::gray(gray.get_pixel(x, y).0[0]),
            Storage::Rgb(rgb) => {
                let [r, g, b] = rgb.get_pixel(x, y).0;
                Pixel::new(r, g, b)
            }
        })
    }

    /// Store `color` at `p`, returning whether the stored value changed.
    ///
    /// Grayscale buffers store the colour's grayscale value; bi-level
    /// buffers store black when that value is at or below
    /// `abs_black_threshold`. Points outside the buffer are ignored.
    pub fn write(&mut self, p: Point, color: Pixel, abs_black_threshold: u8) -> bool {
        if !self.contains(p) {
            return false;
        }
        let (x, y) = (p.x as u32, p.y as u32);
        let format = self.format;
        match &mut self.storage {
            Storage::Gray(gray) => {
                let value = match format {
                    PixelFormat::Mono => mono_value(color, abs_black_threshold),
                    _ => color.grayscale(),
                };
                let slot = gray.get_pixel_mut(x, y);
                let changed = slot.0[0] != value;
                slot.0[0] = value;
                changed
            }
            Storage::Rgb(rgb) => {
                let value = [color.r, color.g, color.b];
                let slot = rgb.get_pixel_mut(x, y);
                let changed = slot.0 != value;
                slot.0 = value;
                changed
            }
        }
    }
}

fn mono_value(color: Pixel, abs_black_threshold: u8) -> u8 {
    if color.grayscale() <= abs_black_threshold {
        MONO_BLACK
    } else {
        MONO_WHITE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_white_dimensions() {
        let buffer = RasterBuffer::new_white(12, 7, PixelFormat::Rgb24);
        assert_eq!(buffer.width(), 12);
        assert_eq!(buffer.height(), 7);
        assert_eq!(buffer.format(), PixelFormat::Rgb24);
        assert_eq!(buffer.read(Point::new(11, 6)), Some(Pixel::WHITE));
    }

    #[test]
    fn test_read_outside_is_none() {
        let buffer = RasterBuffer::new_white(4, 4, PixelFormat::Gray8);
        assert_eq!(buffer.read(Point::new(-1, 0)), None);
        assert_eq!(buffer.read(Point::new(0, 4)), None);
        assert_eq!(buffer.read(Point::new(4, 0)), None);
    }

    #[test]
    fn test_write_reports_change() {
        let mut buffer = RasterBuffer::new_white(4, 4, PixelFormat::Rgb24);
        let p = Point::new(1, 2);
        assert!(buffer.write(p, Pixel::new(10, 20, 30), 0));
        assert!(!buffer.write(p, Pixel::new(10, 20, 30), 0));
        assert_eq!(buffer.read(p), Some(Pixel::new(10, 20, 30)));
    }

    #[test]
    fn test_mono_write_is_thresholded() {
        let mut buffer = RasterBuffer::new_white(2, 2, PixelFormat::Mono);
        let p = Point::new(0, 0);

        // Lighter than the threshold stays white, so nothing changes
        assert!(!buffer.write(p, Pixel::gray(200), 170));
        assert!(buffer.write(p, Pixel::gray(170), 170));
        assert_eq!(buffer.read(p), Some(Pixel::BLACK));
    }

    #[test]
    fn test_from_dynamic_keeps_gray() {
        let gray = GrayImage::from_pixel(3, 3, Luma([90]));
        let buffer = RasterBuffer::from_dynamic(DynamicImage::ImageLuma8(gray));
        assert_eq!(buffer.format(), PixelFormat::Gray8);
        assert_eq!(buffer.read(Point::new(2, 2)), Some(Pixel::gray(90)));
    }

    #[test]
    fn test_from_dynamic_converts_rgba() {
        let rgba = image::RgbaImage::from_pixel(2, 2, image::Rgba([1, 2, 3, 255]));
        let buffer = RasterBuffer::from_dynamic(DynamicImage::ImageRgba8(rgba));
        assert_eq!(buffer.format(), PixelFormat::Rgb24);
        assert_eq!(buffer.read(Point::new(0, 0)), Some(Pixel::new(1, 2, 3)));
    }

    #[test]
    fn test_to_mono_conversion() {
        let mut buffer = RasterBuffer::new_white(3, 1, PixelFormat::Gray8);
        buffer.write(Point::new(0, 0), Pixel::gray(40), 0);
        buffer.write(Point::new(1, 0), Pixel::gray(150), 0);

        let mono = buffer.to_format(PixelFormat::Mono, 100);
        assert_eq!(mono.format(), PixelFormat::Mono);
        assert_eq!(mono.read(Point::new(0, 0)), Some(Pixel::BLACK));
        assert_eq!(mono.read(Point::new(1, 0)), Some(Pixel::WHITE));
        assert_eq!(mono.read(Point::new(2, 0)), Some(Pixel::WHITE));
    }

    #[test]
    fn test_bounds_of_empty_buffer() {
        let buffer = RasterBuffer::new_white(0, 5, PixelFormat::Gray8);
        assert!(buffer.bounds().is_none());
    }
}
