// Copyright 2026 the Scrim Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The draw buffer that widgets paint into before it is flushed.
//!
//! A [`DrawBuffer`] owns a fixed pixel allocation made once at start-up. Each
//! chunk of the refresh loop points the buffer at a new sub-rectangle of the
//! display (its [`area`](DrawBuffer::area)); pixels are stored row-major with
//! a stride equal to that area's width.

use alloc::vec;
use alloc::vec::Vec;
use core::fmt;

use crate::area::Area;

/// Fully transparent opacity.
pub const OPA_TRANSP: u8 = 0;

/// Fully opaque opacity.
pub const OPA_COVER: u8 = 255;

/// A packed `0xAARRGGBB` pixel value.
///
/// Pixel formats and blending are owned by the display driver; the compositor
/// only moves these values around.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Color(pub u32);

impl Color {
    /// Fully transparent black.
    pub const TRANSPARENT: Self = Self(0x0000_0000);
    /// Opaque black.
    pub const BLACK: Self = Self(0xFF00_0000);
    /// Opaque white.
    pub const WHITE: Self = Self(0xFFFF_FFFF);

    /// Creates an opaque colour from 8-bit channels.
    #[inline]
    #[must_use]
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self(0xFF00_0000 | (r as u32) << 16 | (g as u32) << 8 | b as u32)
    }

    /// Returns `true` if the alpha channel is fully opaque.
    #[inline]
    #[must_use]
    pub const fn is_opaque(self) -> bool {
        self.0 >> 24 == 0xFF
    }
}

impl fmt::Debug for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Color({:#010x})", self.0)
    }
}

/// Pixel storage for the chunk currently being rendered.
pub struct DrawBuffer {
    area: Area,
    pixels: Vec<Color>,
}

impl fmt::Debug for DrawBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DrawBuffer")
            .field("area", &self.area)
            .field("capacity", &self.pixels.len())
            .finish_non_exhaustive()
    }
}

impl DrawBuffer {
    /// Allocates a buffer able to hold `capacity` pixels.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            area: Area::new(0, 0, -1, -1),
            pixels: vec![Color::TRANSPARENT; capacity],
        }
    }

    /// Returns the number of pixels the buffer can hold.
    #[inline]
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.pixels.len()
    }

    /// Returns the display area currently resident in the buffer.
    #[inline]
    #[must_use]
    pub fn area(&self) -> Area {
        self.area
    }

    /// Points the buffer at a new display area and clears it to transparent.
    ///
    /// # Panics
    ///
    /// Panics if `area` holds more pixels than the buffer capacity.
    pub fn set_area(&mut self, area: Area) {
        let len = area.size() as usize;
        assert!(
            len <= self.pixels.len(),
            "chunk {area:?} ({len} px) exceeds buffer capacity {}",
            self.pixels.len()
        );
        self.area = area;
        self.pixels[..len].fill(Color::TRANSPARENT);
    }

    /// Returns the pixels of the resident area, row-major.
    #[inline]
    #[must_use]
    pub fn pixels(&self) -> &[Color] {
        &self.pixels[..self.area.size() as usize]
    }

    /// Returns the pixel at display coordinate `(x, y)`, if resident.
    #[must_use]
    pub fn pixel(&self, x: i32, y: i32) -> Option<Color> {
        self.offset(x, y).map(|i| self.pixels[i])
    }

    /// Fills the part of `area` that is resident in the buffer with `color`.
    ///
    /// This is the one raster primitive the compositor itself provides; real
    /// widgets bring their own rasterizers.
    pub fn fill(&mut self, area: Area, color: Color) {
        let Some(clipped) = area.intersect(&self.area) else {
            return;
        };
        let stride = self.area.width() as usize;
        let width = clipped.width() as usize;
        for y in clipped.y1..=clipped.y2 {
            let start = (y - self.area.y1) as usize * stride + (clipped.x1 - self.area.x1) as usize;
            self.pixels[start..start + width].fill(color);
        }
    }

    fn offset(&self, x: i32, y: i32) -> Option<usize> {
        if !self.area.contains_point(x, y) {
            return None;
        }
        let stride = self.area.width() as usize;
        Some((y - self.area.y1) as usize * stride + (x - self.area.x1) as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fill_is_clipped_to_resident_area() {
        let mut buf = DrawBuffer::new(100);
        buf.set_area(Area::new(10, 10, 19, 19));
        buf.fill(Area::new(0, 0, 12, 11), Color::WHITE);

        assert_eq!(buf.pixel(10, 10), Some(Color::WHITE));
        assert_eq!(buf.pixel(12, 11), Some(Color::WHITE));
        assert_eq!(buf.pixel(13, 11), Some(Color::TRANSPARENT));
        assert_eq!(buf.pixel(10, 12), Some(Color::TRANSPARENT));
        assert_eq!(buf.pixel(9, 10), None);
        assert_eq!(buf.pixels().len(), 100);
    }

    #[test]
    fn set_area_clears_previous_content() {
        let mut buf = DrawBuffer::new(16);
        buf.set_area(Area::new(0, 0, 3, 3));
        buf.fill(Area::new(0, 0, 3, 3), Color::BLACK);
        buf.set_area(Area::new(0, 4, 3, 5));
        assert_eq!(buf.pixels().len(), 8);
        assert!(buf.pixels().iter().all(|&c| c == Color::TRANSPARENT));
    }

    #[test]
    #[should_panic(expected = "exceeds buffer capacity")]
    fn oversized_chunk_panics() {
        let mut buf = DrawBuffer::new(10);
        buf.set_area(Area::new(0, 0, 4, 4));
    }

    #[test]
    fn rgb_packs_channels() {
        assert_eq!(Color::rgb(0x12, 0x34, 0x56), Color(0xFF12_3456));
    }
}
