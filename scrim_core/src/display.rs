// Copyright 2026 the Scrim Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Output contract for display drivers.
//!
//! The compositor renders into a [`DrawBuffer`](crate::buffer::DrawBuffer) and
//! hands each finished band to a [`DisplayDriver`]. The driver owns the
//! decision of when that buffer may be reused:
//!
//! - **Synchronous** drivers copy or transmit the pixels inside
//!   [`flush`](DisplayDriver::flush) and return once done.
//! - **Asynchronous** drivers start a transfer in `flush` and block in
//!   [`wait_for_flush`](DisplayDriver::wait_for_flush) until it completes.
//!   The renderer calls it before refilling the buffer.
//!
//! The final band of a cycle is flushed with `last` set, so a double-buffered
//! panel knows when the frame is complete and its buffers may be swapped.
//!
//! # Cycle pseudocode
//!
//! ```rust,ignore
//! fn on_timer() {
//!     // Mutators queue damage as the application runs.
//!     scene.set_pos(cursor, x, y);
//!
//!     // Periodic task: redraw what changed.
//!     let stats = renderer.run_cycle(&mut scene);
//! }
//! ```

use crate::area::Area;
use crate::buffer::Color;

/// Receives rendered pixels for one area of the display.
///
/// Implemented by panel drivers, simulators, and test doubles.
pub trait DisplayDriver {
    /// Writes `pixels` (row-major, `area.width()` per row) to `area` of the
    /// display.
    ///
    /// `last` is `true` for the final band of the final area drawn in a
    /// cycle, and `false` for every other band.
    fn flush(&mut self, area: Area, pixels: &[Color], last: bool);

    /// Blocks until the last flushed buffer may be overwritten.
    fn wait_for_flush(&mut self) {}
}

/// Observes completed refresh cycles.
///
/// Called once at the end of every cycle that redrew something, after the
/// invalidation queue has been cleared.
pub trait RefreshMonitor {
    /// `elapsed_ms` is the cycle's duration by the renderer's clock;
    /// `pixels` is the total size of the refreshed areas.
    fn on_cycle_complete(&mut self, elapsed_ms: u32, pixels: u32);
}

impl<F: FnMut(u32, u32)> RefreshMonitor for F {
    fn on_cycle_complete(&mut self, elapsed_ms: u32, pixels: u32) {
        self(elapsed_ms, pixels);
    }
}

/// A driver that discards every flush.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullDriver;

impl DisplayDriver for NullDriver {
    fn flush(&mut self, area: Area, pixels: &[Color], last: bool) {
        _ = (area, pixels, last);
    }
}
