// Copyright 2026 the Scrim Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Load-time configuration for a display and its refresh loop.
//!
//! Everything here is fixed when the [`Scene`](crate::scene::Scene) and
//! [`Renderer`](crate::refresh::Renderer) are built; none of it changes while
//! cycles run. [`RefreshConfig::validate`] is the only fallible step in the
//! crate, so allocation and sanity checks stay at initialization.

use core::fmt;

use crate::area::Area;

/// Default number of damage rectangles the invalidation queue can hold.
pub const DEFAULT_INV_CAPACITY: usize = 32;

/// Default period, in milliseconds, at which a scheduler should run cycles.
pub const DEFAULT_REFRESH_PERIOD_MS: u32 = 30;

/// How large the draw buffer is relative to the display.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BufferMode {
    /// The buffer holds the whole display; every damaged area renders in one
    /// pass.
    FullFrame,
    /// The buffer holds `pixels` pixels; larger areas are rendered in bands
    /// of whole rows.
    Bounded {
        /// Buffer capacity in pixels. Must hold at least one display row.
        pixels: usize,
    },
}

/// Display geometry and compositor limits.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct RefreshConfig {
    /// Horizontal resolution in pixels.
    pub hor_res: u32,
    /// Vertical resolution in pixels.
    pub ver_res: u32,
    /// Capacity of the invalidation queue.
    pub inv_capacity: usize,
    /// Draw buffer sizing.
    pub buffer: BufferMode,
    /// Suggested scheduler period. The renderer itself never reads a clock to
    /// pace itself; this is carried for the task that drives it.
    pub refresh_period_ms: u32,
}

impl Default for RefreshConfig {
    fn default() -> Self {
        Self {
            hor_res: 320,
            ver_res: 240,
            inv_capacity: DEFAULT_INV_CAPACITY,
            buffer: BufferMode::Bounded {
                pixels: 320 * 240 / 10,
            },
            refresh_period_ms: DEFAULT_REFRESH_PERIOD_MS,
        }
    }
}

impl RefreshConfig {
    /// Creates a configuration for the given resolution with default limits.
    ///
    /// The bounded buffer is sized to a tenth of the display, rounded up to at
    /// least one row.
    #[must_use]
    pub fn with_resolution(hor_res: u32, ver_res: u32) -> Self {
        let pixels = (hor_res as usize * ver_res as usize / 10).max(hor_res as usize);
        Self {
            hor_res,
            ver_res,
            buffer: BufferMode::Bounded { pixels },
            ..Self::default()
        }
    }

    /// Returns the full display bounds.
    #[must_use]
    pub fn bounds(&self) -> Area {
        let w = i32::try_from(self.hor_res).unwrap_or(i32::MAX);
        let h = i32::try_from(self.ver_res).unwrap_or(i32::MAX);
        Area::from_origin_size(0, 0, w, h)
    }

    /// Returns the draw buffer capacity in pixels.
    #[must_use]
    pub fn buffer_pixels(&self) -> usize {
        match self.buffer {
            BufferMode::FullFrame => self.hor_res as usize * self.ver_res as usize,
            BufferMode::Bounded { pixels } => pixels,
        }
    }

    /// Checks the configuration for values the compositor cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.hor_res == 0 || self.ver_res == 0 {
            return Err(ConfigError::ZeroResolution);
        }
        if self.inv_capacity == 0 {
            return Err(ConfigError::ZeroQueueCapacity);
        }
        if let BufferMode::Bounded { pixels } = self.buffer {
            if pixels < self.hor_res as usize {
                return Err(ConfigError::BufferTooSmall {
                    pixels,
                    row: self.hor_res,
                });
            }
        }
        Ok(())
    }
}

/// A configuration the compositor refuses to start with.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConfigError {
    /// Horizontal or vertical resolution is zero.
    ZeroResolution,
    /// The invalidation queue would hold no entries.
    ZeroQueueCapacity,
    /// A bounded draw buffer cannot hold one full display row.
    BufferTooSmall {
        /// Configured capacity in pixels.
        pixels: usize,
        /// Pixels in one display row.
        row: u32,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ZeroResolution => f.write_str("display resolution must be non-zero"),
            Self::ZeroQueueCapacity => f.write_str("invalidation queue capacity must be non-zero"),
            Self::BufferTooSmall { pixels, row } => write!(
                f,
                "draw buffer of {pixels} px cannot hold one {row} px display row"
            ),
        }
    }
}

impl core::error::Error for ConfigError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_valid() {
        let config = RefreshConfig::default();
        assert_eq!(config.validate(), Ok(()));
        assert_eq!(config.bounds(), Area::new(0, 0, 319, 239));
        assert_eq!(config.buffer_pixels(), 7680);
    }

    #[test]
    fn with_resolution_keeps_one_row() {
        let config = RefreshConfig::with_resolution(100, 5);
        assert_eq!(config.buffer, BufferMode::Bounded { pixels: 100 });
        assert_eq!(config.validate(), Ok(()));
    }

    #[test]
    fn full_frame_buffer_matches_display() {
        let config = RefreshConfig {
            buffer: BufferMode::FullFrame,
            ..RefreshConfig::with_resolution(64, 32)
        };
        assert_eq!(config.buffer_pixels(), 64 * 32);
    }

    #[test]
    fn rejects_unusable_values() {
        let zero = RefreshConfig {
            hor_res: 0,
            ..RefreshConfig::default()
        };
        assert_eq!(zero.validate(), Err(ConfigError::ZeroResolution));

        let no_queue = RefreshConfig {
            inv_capacity: 0,
            ..RefreshConfig::default()
        };
        assert_eq!(no_queue.validate(), Err(ConfigError::ZeroQueueCapacity));

        let tiny = RefreshConfig {
            buffer: BufferMode::Bounded { pixels: 100 },
            ..RefreshConfig::default()
        };
        assert_eq!(
            tiny.validate(),
            Err(ConfigError::BufferTooSmall {
                pixels: 100,
                row: 320
            })
        );
    }
}
