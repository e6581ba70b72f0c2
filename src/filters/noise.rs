//! Noise filter
//!
//! Removes small isolated clusters of dark pixels ("specks") left by dust
//! or scanner sensor noise.
//!
//! # Algorithm
//!
//! For every dark pixel, in row-major order:
//!
//! 1. Expand square rings of increasing level around it, counting the
//!    non-light pixels on each ring. Stop once a ring adds nothing or the
//!    level passes the intensity.
//! 2. If the count (the pixel itself included) is at most the intensity, the
//!    cluster is noise: walk the same rings again, clearing to white, until a
//!    ring clears nothing.
//!
//! Pixels outside the image behave as white.

use tracing::debug;

use crate::raster::{
    get_pixel_darkness_inverse, get_pixel_lightness, set_pixel, Pixel, Point, RasterBuffer,
};

/// Square ring of pixels at Chebyshev distance `level` from a center.
///
/// Yields the upper and lower rows pairwise from left to right, then the
/// first and last columns pairwise from top to bottom, skipping the corners
/// already covered by the rows.
#[derive(Debug, Clone)]
pub struct Ring {
    center: Point,
    level: i32,
    step: RingStep,
}

#[derive(Debug, Clone, Copy)]
enum RingStep {
    Rows { xx: i32, lower: bool },
    Columns { yy: i32, last: bool },
    Done,
}

/// Points of the ring of radius `level` around `center`; `level` must be at
/// least 1.
pub fn ring_points(center: Point, level: u32) -> Ring {
    debug_assert!(level >= 1, "ring level starts at 1");
    let level = level as i32;
    Ring {
        center,
        level,
        step: RingStep::Rows {
            xx: center.x - level,
            lower: false,
        },
    }
}

impl Iterator for Ring {
    type Item = Point;

    fn next(&mut self) -> Option<Point> {
        let Point { x, y } = self.center;
        let level = self.level;
        match self.step {
            RingStep::Rows { xx, lower } => {
                let p = if lower {
                    Point::new(xx, y + level)
                } else {
                    Point::new(xx, y - level)
                };
                self.step = if !lower {
                    RingStep::Rows { xx, lower: true }
                } else if xx < x + level {
                    RingStep::Rows {
                        xx: xx + 1,
                        lower: false,
                    }
                } else {
                    RingStep::Columns {
                        yy: y - (level - 1),
                        last: false,
                    }
                };
                Some(p)
            }
            RingStep::Columns { yy, last } => {
                let p = if last {
                    Point::new(x + level, yy)
                } else {
                    Point::new(x - level, yy)
                };
                self.step = if !last {
                    RingStep::Columns { yy, last: true }
                } else if yy < y + (level - 1) {
                    RingStep::Columns {
                        yy: yy + 1,
                        last: false,
                    }
                } else {
                    RingStep::Done
                };
                Some(p)
            }
            RingStep::Done => None,
        }
    }
}

/// Noise filter state for one run over a buffer
struct NoiseScan<'a> {
    buffer: &'a mut RasterBuffer,
    min_white_level: u8,
    abs_black_threshold: u8,
}

impl NoiseScan<'_> {
    /// Non-light test for one point; outside the buffer is never a match
    fn compare_and_clear(&mut self, p: Point, clear: bool) -> bool {
        if !self.buffer.contains(p) {
            return false;
        }
        if get_pixel_lightness(self.buffer, p) >= self.min_white_level {
            return false;
        }
        if clear {
            set_pixel(self.buffer, p, Pixel::WHITE, self.abs_black_threshold);
        }
        true
    }

    fn count_level(&mut self, center: Point, level: u32, clear: bool) -> u64 {
        ring_points(center, level)
            .filter(|&p| self.compare_and_clear(p, clear))
            .count() as u64
    }

    /// Size of the cluster reachable from `center`, capped by the ring walk
    fn count_neighbors(&mut self, center: Point, intensity: u64) -> u64 {
        // The center itself is already known to be dark
        let mut count = 1;
        let mut level: u32 = 1;
        loop {
            let level_count = self.count_level(center, level, false);
            count += level_count;
            level += 1;
            if level_count == 0 || level as u64 > intensity {
                break;
            }
        }
        count
    }

    /// Clear the cluster around `center`.
    ///
    /// Only called after `count_neighbors` proved the cluster bounded, so
    /// some ring will come back empty.
    fn clear_neighbors(&mut self, center: Point) {
        set_pixel(self.buffer, center, Pixel::WHITE, self.abs_black_threshold);

        let mut level: u32 = 1;
        while self.count_level(center, level, true) != 0 {
            level += 1;
        }
    }
}

/// Erase every dark cluster of at most `intensity` pixels.
///
/// A pixel starts a cluster when its darkness inverse is below
/// `min_white_level`; ring pixels belong to it when their lightness is below
/// `min_white_level`. Returns the number of clusters removed.
pub fn noisefilter(
    buffer: &mut RasterBuffer,
    intensity: u64,
    min_white_level: u8,
    abs_black_threshold: u8,
) -> u64 {
    let Some(bounds) = buffer.bounds() else {
        return 0;
    };

    let mut scan = NoiseScan {
        buffer,
        min_white_level,
        abs_black_threshold,
    };
    let mut removed = 0;

    for p in bounds.points() {
        if get_pixel_darkness_inverse(scan.buffer, p) >= min_white_level {
            continue;
        }
        let neighbors = scan.count_neighbors(p, intensity);
        if neighbors <= intensity {
            scan.clear_neighbors(p);
            removed += 1;
        }
    }

    debug!(removed, intensity, min_white_level, "Noise filter finished");
    removed
}
