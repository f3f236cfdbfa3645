//! Rectangular area math for dirty-region tracking
//!
//! Areas use inclusive pixel coordinates: an area covering a single pixel
//! has `x1 == x2` and `y1 == y2`. All merge decisions in the refresh path
//! are made in terms of covered pixel counts, so `size` is the central
//! primitive here.

use serde::{Deserialize, Serialize};

/// Rectangular screen region with inclusive corner coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Area {
    /// Left edge (inclusive)
    pub x1: i32,
    /// Top edge (inclusive)
    pub y1: i32,
    /// Right edge (inclusive)
    pub x2: i32,
    /// Bottom edge (inclusive)
    pub y2: i32,
}

impl Area {
    /// Create an area from inclusive corner coordinates
    pub fn new(x1: i32, y1: i32, x2: i32, y2: i32) -> Self {
        Area { x1, y1, x2, y2 }
    }

    /// Create an area from a top-left position and a pixel size
    pub fn from_size(x: i32, y: i32, width: u16, height: u16) -> Self {
        Area {
            x1: x,
            y1: y,
            x2: x + width as i32 - 1,
            y2: y + height as i32 - 1,
        }
    }

    /// Width in pixels
    pub fn width(&self) -> u32 {
        (self.x2 - self.x1 + 1).max(0) as u32
    }

    /// Height in pixels
    pub fn height(&self) -> u32 {
        (self.y2 - self.y1 + 1).max(0) as u32
    }

    /// Covered pixel count (width * height)
    pub fn size(&self) -> u32 {
        self.width() * self.height()
    }

    /// Intersection of two areas, or `None` when they do not overlap
    pub fn intersect(&self, other: &Area) -> Option<Area> {
        let x1 = self.x1.max(other.x1);
        let y1 = self.y1.max(other.y1);
        let x2 = self.x2.min(other.x2);
        let y2 = self.y2.min(other.y2);

        if x1 <= x2 && y1 <= y2 {
            Some(Area { x1, y1, x2, y2 })
        } else {
            None
        }
    }

    /// Bounding box of two areas
    pub fn join(&self, other: &Area) -> Area {
        Area {
            x1: self.x1.min(other.x1),
            y1: self.y1.min(other.y1),
            x2: self.x2.max(other.x2),
            y2: self.y2.max(other.y2),
        }
    }

    /// True when `inner` lies completely within this area
    pub fn contains(&self, inner: &Area) -> bool {
        inner.x1 >= self.x1 && inner.y1 >= self.y1 && inner.x2 <= self.x2 && inner.y2 <= self.y2
    }

    /// True when the two areas share at least one pixel
    pub fn overlaps(&self, other: &Area) -> bool {
        !(self.x1 > other.x2 || other.x1 > self.x2 || self.y1 > other.y2 || other.y1 > self.y2)
    }
}
