//! Geometry types shared by the raster primitives and the filters

use serde::{Deserialize, Serialize};

// ============================================================
// Point
// ============================================================

/// Integer pixel coordinate.
///
/// A point has no inherent bounds; ring expansion may produce coordinates
/// outside the image, which must be checked before any pixel access.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

/// The top-left corner of every image
pub const POINT_ORIGIN: Point = Point { x: 0, y: 0 };

impl Point {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Translate by a signed offset
    pub const fn shift(self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }
}

// ============================================================
// Extent
// ============================================================

/// Horizontal/vertical pair of sizes, used for window sizes and scan steps
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Extent {
    pub horizontal: u32,
    pub vertical: u32,
}

impl Extent {
    pub const fn new(horizontal: u32, vertical: u32) -> Self {
        Self {
            horizontal,
            vertical,
        }
    }

    /// Same size on both axes
    pub const fn square(size: u32) -> Self {
        Self::new(size, size)
    }

    /// True if either axis is zero
    pub const fn is_empty(&self) -> bool {
        self.horizontal == 0 || self.vertical == 0
    }
}

// ============================================================
// Rectangle
// ============================================================

/// Axis-aligned rectangle with inclusive corners.
///
/// `vertex[0]` is the top-left corner and `vertex[1]` the bottom-right one.
/// Both corners belong to the rectangle, so a rectangle whose corners are
/// equal covers exactly one pixel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rectangle {
    pub vertex: [Point; 2],
}

impl Rectangle {
    /// Build from two corners, normalizing their order
    pub fn new(a: Point, b: Point) -> Self {
        Self {
            vertex: [
                Point::new(a.x.min(b.x), a.y.min(b.y)),
                Point::new(a.x.max(b.x), a.y.max(b.y)),
            ],
        }
    }

    /// Rectangle of the given size anchored at `origin`.
    ///
    /// `size` must not be empty.
    pub fn from_size(origin: Point, size: Extent) -> Self {
        debug_assert!(!size.is_empty(), "rectangle size must be non-zero");
        Self {
            vertex: [
                origin,
                origin.shift(size.horizontal as i32 - 1, size.vertical as i32 - 1),
            ],
        }
    }

    pub fn top_left(&self) -> Point {
        self.vertex[0]
    }

    pub fn bottom_right(&self) -> Point {
        self.vertex[1]
    }

    pub fn width(&self) -> u32 {
        (self.vertex[1].x - self.vertex[0].x + 1) as u32
    }

    pub fn height(&self) -> u32 {
        (self.vertex[1].y - self.vertex[0].y + 1) as u32
    }

    /// Number of pixels covered
    pub fn area(&self) -> u64 {
        self.width() as u64 * self.height() as u64
    }

    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.vertex[0].x
            && p.x <= self.vertex[1].x
            && p.y >= self.vertex[0].y
            && p.y <= self.vertex[1].y
    }

    /// Move both corners by a signed offset
    pub fn shift(&self, dx: i32, dy: i32) -> Self {
        Self {
            vertex: [self.vertex[0].shift(dx, dy), self.vertex[1].shift(dx, dy)],
        }
    }

    /// Overlap of two rectangles, `None` when they are disjoint
    pub fn intersect(&self, other: &Rectangle) -> Option<Rectangle> {
        let left = self.vertex[0].x.max(other.vertex[0].x);
        let top = self.vertex[0].y.max(other.vertex[0].y);
        let right = self.vertex[1].x.min(other.vertex[1].x);
        let bottom = self.vertex[1].y.min(other.vertex[1].y);

        if left > right || top > bottom {
            return None;
        }
        Some(Rectangle {
            vertex: [Point::new(left, top), Point::new(right, bottom)],
        })
    }

    /// Row-major iterator over every point, top-to-bottom then left-to-right
    pub fn points(&self) -> impl Iterator<Item = Point> {
        let [tl, br] = self.vertex;
        (tl.y..=br.y).flat_map(move |y| (tl.x..=br.x).map(move |x| Point::new(x, y)))
    }
}
