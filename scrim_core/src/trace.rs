// Copyright 2026 the Scrim Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tracing and diagnostics for the refresh cycle.
//!
//! This module provides a [`TraceSink`] trait with per-event methods that the
//! [`Renderer`](crate::refresh::Renderer) calls at each stage of a cycle. All
//! method bodies default to no-ops, so implementing only the events you care
//! about is fine.
//!
//! [`Tracer`] wraps an optional `&mut dyn TraceSink`. When the `trace` feature
//! is **off**, every `Tracer` method compiles to nothing (zero overhead). When
//! **on**, each method performs a single `Option` branch before dispatching.
//!
//! # Crate features
//!
//! - `trace` enables the `Tracer` method bodies (one branch per call).
//! - `trace-rich` (implies `trace`) additionally gates the per-cycle list of
//!   damage rectangles after coalescing.

use crate::area::Area;
use crate::scene::NodeId;

// ---------------------------------------------------------------------------
// Event structs
// ---------------------------------------------------------------------------

/// Emitted when a cycle takes its snapshot of the invalidation queue.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CycleBeginEvent {
    /// Monotonic cycle counter.
    pub cycle_index: u64,
    /// Renderer clock at the start of the cycle, in milliseconds.
    pub timestamp_ms: u32,
    /// Entries taken from the queue.
    pub pending: u32,
    /// How often the queue collapsed to a full redraw since the last cycle.
    pub overflows: u32,
}

/// Emitted after the coalescing pass.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CoalesceEvent {
    /// Cycle counter.
    pub cycle_index: u64,
    /// Entries before merging.
    pub before: u32,
    /// Entries left unjoined after merging.
    pub after: u32,
}

/// Emitted when the renderer starts on one damaged area.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AreaEvent {
    /// Cycle counter.
    pub cycle_index: u64,
    /// The damaged area.
    pub area: Area,
    /// Rows per band chosen for the area.
    pub band_rows: i32,
}

/// Emitted after each band is painted and flushed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ChunkEvent {
    /// Cycle counter.
    pub cycle_index: u64,
    /// The band that was flushed.
    pub band: Area,
    /// Pixels in the band.
    pub pixels: u32,
    /// Where painting of the active screen started, if an opaque node covered
    /// the band.
    pub occluder: Option<NodeId>,
}

/// Emitted when no band of an area fits the draw buffer, either because the
/// rounding hook grows every band height too far or because a single row is
/// wider than the buffer. The area is skipped.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RoundFailureEvent {
    /// Cycle counter.
    pub cycle_index: u64,
    /// The area that was skipped.
    pub area: Area,
}

/// Per-cycle totals, emitted last.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CycleSummary {
    /// Cycle counter.
    pub cycle_index: u64,
    /// Cycle duration by the renderer's clock, in milliseconds.
    pub elapsed_ms: u32,
    /// Unjoined areas drawn.
    pub areas: u32,
    /// Bands flushed.
    pub chunks: u32,
    /// Total size of the drawn areas.
    pub pixels: u32,
    /// Damage requested by widgets while drawing, queued for the next cycle.
    pub deferred: u32,
}

// ---------------------------------------------------------------------------
// TraceSink trait
// ---------------------------------------------------------------------------

/// Receives trace events from the refresh cycle.
///
/// All methods have default no-op implementations, so you only need to
/// override the events you care about.
pub trait TraceSink {
    /// Called when a cycle begins.
    fn on_cycle_begin(&mut self, e: &CycleBeginEvent) {
        _ = e;
    }

    /// Called after coalescing.
    fn on_coalesce(&mut self, e: &CoalesceEvent) {
        _ = e;
    }

    /// Called before the bands of one area are drawn.
    fn on_area(&mut self, e: &AreaEvent) {
        _ = e;
    }

    /// Called after each band is flushed.
    fn on_chunk_flush(&mut self, e: &ChunkEvent) {
        _ = e;
    }

    /// Called when an area is skipped because it cannot be rounded to fit.
    fn on_round_failure(&mut self, e: &RoundFailureEvent) {
        _ = e;
    }

    /// Called with the per-cycle summary.
    fn on_cycle_summary(&mut self, s: &CycleSummary) {
        _ = s;
    }

    /// Called with the unjoined damage rectangles of a cycle (requires
    /// `trace-rich` feature).
    #[cfg(feature = "trace-rich")]
    fn on_damage_rects(&mut self, cycle_index: u64, rects: &[Area]) {
        _ = (cycle_index, rects);
    }
}

// ---------------------------------------------------------------------------
// NoopSink
// ---------------------------------------------------------------------------

/// A [`TraceSink`] that discards all events.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopSink;

impl TraceSink for NoopSink {}

// ---------------------------------------------------------------------------
// Tracer wrapper
// ---------------------------------------------------------------------------

/// Thin wrapper around an optional [`TraceSink`].
///
/// When the `trace` feature is **off**, every method compiles to nothing. When
/// **on**, each method checks the inner `Option` (one branch) before
/// dispatching to the sink.
pub struct Tracer<'a> {
    #[cfg(feature = "trace")]
    sink: Option<&'a mut dyn TraceSink>,
    #[cfg(not(feature = "trace"))]
    _marker: core::marker::PhantomData<&'a mut dyn TraceSink>,
}

impl core::fmt::Debug for Tracer<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Tracer").finish_non_exhaustive()
    }
}

impl<'a> Tracer<'a> {
    /// Creates a tracer that dispatches to the given sink.
    #[inline]
    #[must_use]
    pub fn new(sink: &'a mut dyn TraceSink) -> Self {
        #[cfg(feature = "trace")]
        {
            Self { sink: Some(sink) }
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = sink;
            Self {
                _marker: core::marker::PhantomData,
            }
        }
    }

    /// Creates a tracer that discards all events.
    #[inline]
    #[must_use]
    pub fn none() -> Self {
        #[cfg(feature = "trace")]
        {
            Self { sink: None }
        }
        #[cfg(not(feature = "trace"))]
        {
            Self {
                _marker: core::marker::PhantomData,
            }
        }
    }

    /// Returns whether events reach a sink.
    ///
    /// Lets callers skip building event payloads that are costly to gather.
    #[inline]
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        #[cfg(feature = "trace")]
        {
            self.sink.is_some()
        }
        #[cfg(not(feature = "trace"))]
        {
            false
        }
    }

    /// Emits a [`CycleBeginEvent`].
    #[inline]
    pub fn cycle_begin(&mut self, e: &CycleBeginEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_cycle_begin(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`CoalesceEvent`].
    #[inline]
    pub fn coalesce(&mut self, e: &CoalesceEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_coalesce(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits an [`AreaEvent`].
    #[inline]
    pub fn area(&mut self, e: &AreaEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_area(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`ChunkEvent`].
    #[inline]
    pub fn chunk_flush(&mut self, e: &ChunkEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_chunk_flush(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`RoundFailureEvent`].
    #[inline]
    pub fn round_failure(&mut self, e: &RoundFailureEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_round_failure(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`CycleSummary`].
    #[inline]
    pub fn cycle_summary(&mut self, s: &CycleSummary) {
        #[cfg(feature = "trace")]
        if let Some(sink) = &mut self.sink {
            sink.on_cycle_summary(s);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = s;
        }
    }

    /// Emits the cycle's damage rectangles (requires `trace-rich` feature).
    #[cfg(feature = "trace-rich")]
    #[inline]
    pub fn damage_rects(&mut self, cycle_index: u64, rects: &[Area]) {
        if let Some(s) = &mut self.sink {
            s.on_damage_rects(cycle_index, rects);
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_begin() -> CycleBeginEvent {
        CycleBeginEvent {
            cycle_index: 42,
            timestamp_ms: 1_000,
            pending: 3,
            overflows: 0,
        }
    }

    #[test]
    fn noop_sink_compiles() {
        let mut sink = NoopSink;
        sink.on_cycle_begin(&sample_begin());
        sink.on_round_failure(&RoundFailureEvent {
            cycle_index: 0,
            area: Area::new(0, 0, 9, 9),
        });
        sink.on_cycle_summary(&CycleSummary::default());
    }

    #[test]
    fn tracer_none_does_nothing() {
        let mut tracer = Tracer::none();
        assert!(!tracer.is_enabled());
        tracer.cycle_begin(&sample_begin());
        tracer.cycle_summary(&CycleSummary::default());
    }

    #[cfg(feature = "trace")]
    #[test]
    fn tracer_dispatches_to_sink() {
        use alloc::vec::Vec;

        struct RecordingSink {
            cycles: Vec<u64>,
        }
        impl TraceSink for RecordingSink {
            fn on_cycle_begin(&mut self, e: &CycleBeginEvent) {
                self.cycles.push(e.cycle_index);
            }
        }

        let mut sink = RecordingSink { cycles: Vec::new() };
        let mut tracer = Tracer::new(&mut sink);
        assert!(tracer.is_enabled());
        tracer.cycle_begin(&sample_begin());
        // Access sink after tracer is dropped.
        drop(tracer);
        assert_eq!(sink.cycles, &[42]);
    }
}
