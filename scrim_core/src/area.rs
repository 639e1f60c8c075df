// Copyright 2026 the Scrim Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Integer pixel areas.
//!
//! An [`Area`] names a rectangle of display pixels by its two *inclusive*
//! corners: `(x1, y1)` is the top-left pixel and `(x2, y2)` is the
//! bottom-right pixel that still belongs to the area. A one-pixel area
//! therefore has `x1 == x2` and `y1 == y2`, and an area is empty when either
//! `x2 < x1` or `y2 < y1`.
//!
//! # Overlap convention
//!
//! Two areas [overlap](Area::overlaps) when they share at least one pixel.
//! Because coordinates are inclusive, areas whose edges lie on the same pixel
//! row or column overlap, while edge-adjacent areas (`a.x2 + 1 == b.x1`) do
//! not. Coalescing and occlusion both use this convention.

use core::fmt;

/// An axis-aligned rectangle of pixels with inclusive corners.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Area {
    /// Left column (inclusive).
    pub x1: i32,
    /// Top row (inclusive).
    pub y1: i32,
    /// Right column (inclusive).
    pub x2: i32,
    /// Bottom row (inclusive).
    pub y2: i32,
}

impl Area {
    /// Creates an area from its inclusive corners.
    #[inline]
    #[must_use]
    pub const fn new(x1: i32, y1: i32, x2: i32, y2: i32) -> Self {
        Self { x1, y1, x2, y2 }
    }

    /// Creates an area from a top-left pixel and a size in pixels.
    ///
    /// A zero width or height produces an empty area.
    #[inline]
    #[must_use]
    pub const fn from_origin_size(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x1: x,
            y1: y,
            x2: x + width - 1,
            y2: y + height - 1,
        }
    }

    /// Returns the width in pixels (zero or negative when empty).
    #[inline]
    #[must_use]
    pub const fn width(&self) -> i32 {
        self.x2 - self.x1 + 1
    }

    /// Returns the height in pixels (zero or negative when empty).
    #[inline]
    #[must_use]
    pub const fn height(&self) -> i32 {
        self.y2 - self.y1 + 1
    }

    /// Returns `true` if the area contains no pixels.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.x2 < self.x1 || self.y2 < self.y1
    }

    /// Returns the number of pixels in the area, saturating at `u32::MAX`.
    #[must_use]
    pub fn size(&self) -> u32 {
        if self.is_empty() {
            return 0;
        }
        (self.width() as u32).saturating_mul(self.height() as u32)
    }

    /// Returns the common part of two areas, or `None` if they share no pixel.
    #[must_use]
    pub fn intersect(&self, other: &Self) -> Option<Self> {
        let area = Self {
            x1: self.x1.max(other.x1),
            y1: self.y1.max(other.y1),
            x2: self.x2.min(other.x2),
            y2: self.y2.min(other.y2),
        };
        (!area.is_empty()).then_some(area)
    }

    /// Returns the smallest area containing both areas.
    #[must_use]
    pub fn union(&self, other: &Self) -> Self {
        Self {
            x1: self.x1.min(other.x1),
            y1: self.y1.min(other.y1),
            x2: self.x2.max(other.x2),
            y2: self.y2.max(other.y2),
        }
    }

    /// Returns `true` if the areas share at least one pixel.
    #[must_use]
    pub fn overlaps(&self, other: &Self) -> bool {
        self.x1 <= other.x2 && self.x2 >= other.x1 && self.y1 <= other.y2 && self.y2 >= other.y1
    }

    /// Returns `true` if every pixel of `other` lies inside `self`.
    #[must_use]
    pub fn contains(&self, other: &Self) -> bool {
        other.x1 >= self.x1 && other.y1 >= self.y1 && other.x2 <= self.x2 && other.y2 <= self.y2
    }

    /// Returns `true` if the pixel `(x, y)` lies inside the area.
    #[inline]
    #[must_use]
    pub fn contains_point(&self, x: i32, y: i32) -> bool {
        x >= self.x1 && x <= self.x2 && y >= self.y1 && y <= self.y2
    }

    /// Returns the area grown by `amount` pixels on every side.
    #[inline]
    #[must_use]
    pub const fn grow(&self, amount: i32) -> Self {
        Self {
            x1: self.x1 - amount,
            y1: self.y1 - amount,
            x2: self.x2 + amount,
            y2: self.y2 + amount,
        }
    }

    /// Returns the area moved by `(dx, dy)`.
    #[inline]
    #[must_use]
    pub const fn translate(&self, dx: i32, dy: i32) -> Self {
        Self {
            x1: self.x1 + dx,
            y1: self.y1 + dy,
            x2: self.x2 + dx,
            y2: self.y2 + dy,
        }
    }

    /// Converts the area to a [`kurbo::Rect`] covering the same pixels.
    ///
    /// The rectangle's far edges sit one unit past the inclusive corners.
    #[must_use]
    pub fn to_rect(&self) -> kurbo::Rect {
        kurbo::Rect::new(
            f64::from(self.x1),
            f64::from(self.y1),
            f64::from(self.x2) + 1.0,
            f64::from(self.y2) + 1.0,
        )
    }

    /// Converts a [`kurbo::Rect`] to the smallest area covering it.
    ///
    /// Fractional edges are rounded outward. Returns `None` for rectangles
    /// with no area.
    #[must_use]
    #[expect(
        clippy::cast_possible_truncation,
        reason = "pixel coordinates are rounded to whole numbers before the cast"
    )]
    pub fn from_rect(rect: kurbo::Rect) -> Option<Self> {
        let rect = rect.abs().expand();
        if rect.width() <= 0.0 || rect.height() <= 0.0 {
            return None;
        }
        Some(Self {
            x1: rect.x0 as i32,
            y1: rect.y0 as i32,
            x2: rect.x1 as i32 - 1,
            y2: rect.y1 as i32 - 1,
        })
    }
}

impl fmt::Debug for Area {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Area(({}, {})..=({}, {}))",
            self.x1, self.y1, self.x2, self.y2
        )
    }
}

impl From<Area> for kurbo::Rect {
    fn from(area: Area) -> Self {
        area.to_rect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inclusive_size() {
        let a = Area::new(10, 10, 50, 50);
        assert_eq!(a.width(), 41);
        assert_eq!(a.height(), 41);
        assert_eq!(a.size(), 1681);
        assert_eq!(Area::new(3, 3, 3, 3).size(), 1);
        assert_eq!(Area::new(5, 0, 4, 10).size(), 0);
    }

    #[test]
    fn from_origin_size_matches_corners() {
        assert_eq!(Area::from_origin_size(0, 0, 320, 240), Area::new(0, 0, 319, 239));
        assert!(Area::from_origin_size(4, 4, 0, 10).is_empty());
    }

    #[test]
    fn intersect_and_union() {
        let a = Area::new(10, 10, 50, 50);
        let b = Area::new(15, 15, 55, 55);
        assert_eq!(a.intersect(&b), Some(Area::new(15, 15, 50, 50)));
        assert_eq!(a.union(&b), Area::new(10, 10, 55, 55));
        assert_eq!(a.intersect(&Area::new(60, 60, 70, 70)), None);
    }

    #[test]
    fn shared_edge_overlaps_adjacent_does_not() {
        let a = Area::new(0, 0, 9, 9);
        // Shares the pixel column x = 9.
        let touching = Area::new(9, 0, 19, 9);
        // Starts on the next column.
        let adjacent = Area::new(10, 0, 19, 9);
        assert!(a.overlaps(&touching));
        assert_eq!(a.intersect(&touching), Some(Area::new(9, 0, 9, 9)));
        assert!(!a.overlaps(&adjacent));
        assert_eq!(a.intersect(&adjacent), None);
    }

    #[test]
    fn contains_is_inclusive() {
        let outer = Area::new(0, 0, 99, 99);
        assert!(outer.contains(&outer));
        assert!(outer.contains(&Area::new(10, 10, 60, 60)));
        assert!(!outer.contains(&Area::new(10, 10, 100, 60)));
        assert!(outer.contains_point(99, 0));
        assert!(!outer.contains_point(100, 0));
    }

    #[test]
    fn grow_and_translate() {
        let a = Area::new(10, 10, 20, 20);
        assert_eq!(a.grow(3), Area::new(7, 7, 23, 23));
        assert_eq!(a.translate(-10, 5), Area::new(0, 15, 10, 25));
    }

    #[test]
    fn kurbo_conversion_rounds_outward() {
        let a = Area::new(10, 20, 29, 39);
        let rect = a.to_rect();
        assert_eq!(rect, kurbo::Rect::new(10.0, 20.0, 30.0, 40.0));
        assert_eq!(Area::from_rect(rect), Some(a));
        assert_eq!(
            Area::from_rect(kurbo::Rect::new(0.5, 0.5, 9.2, 1.0)),
            Some(Area::new(0, 0, 9, 0))
        );
        assert_eq!(Area::from_rect(kurbo::Rect::new(4.0, 4.0, 4.0, 8.0)), None);
    }
}
