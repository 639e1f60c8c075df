// Copyright 2026 the Scrim Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Human-readable trace output.
//!
//! [`PrettyPrintSink`] implements [`TraceSink`] and writes one line per event
//! to a [`Write`](std::io::Write) destination (default: stderr).

use std::io::Write;

use scrim_core::area::Area;
use scrim_core::trace::{
    AreaEvent, ChunkEvent, CoalesceEvent, CycleBeginEvent, CycleSummary, RoundFailureEvent,
    TraceSink,
};

/// Writes human-readable trace lines to a [`Write`](std::io::Write) destination.
pub struct PrettyPrintSink<W: Write = Box<dyn Write>> {
    writer: W,
    chunks: bool,
}

impl<W: Write> std::fmt::Debug for PrettyPrintSink<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrettyPrintSink")
            .field("chunks", &self.chunks)
            .finish_non_exhaustive()
    }
}

impl PrettyPrintSink {
    /// Creates a sink that writes to stderr.
    #[must_use]
    pub fn stderr() -> Self {
        Self {
            writer: Box::new(std::io::stderr()),
            chunks: true,
        }
    }

    /// Creates a sink that writes to a boxed writer.
    #[must_use]
    pub fn new(writer: Box<dyn Write>) -> Self {
        Self {
            writer,
            chunks: true,
        }
    }
}

impl<W: Write> PrettyPrintSink<W> {
    /// Creates a sink that writes to the given destination.
    #[must_use]
    pub fn with_writer(writer: W) -> Self {
        Self {
            writer,
            chunks: true,
        }
    }

    /// Turns per-band lines on or off. Full-screen redraws produce one line
    /// per band, which can drown out everything else.
    #[must_use]
    pub fn with_chunks(mut self, chunks: bool) -> Self {
        self.chunks = chunks;
        self
    }
}

fn fmt_area(a: Area) -> String {
    format!("({},{})..({},{}) {}x{}", a.x1, a.y1, a.x2, a.y2, a.width(), a.height())
}

impl<W: Write> TraceSink for PrettyPrintSink<W> {
    fn on_cycle_begin(&mut self, e: &CycleBeginEvent) {
        let overflow = if e.overflows > 0 { " OVERFLOW" } else { "" };
        let _ = writeln!(
            self.writer,
            "[cycle] #{} at {}ms pending={}{overflow}",
            e.cycle_index, e.timestamp_ms, e.pending,
        );
    }

    fn on_coalesce(&mut self, e: &CoalesceEvent) {
        let _ = writeln!(
            self.writer,
            "[coalesce] #{} {} -> {}",
            e.cycle_index, e.before, e.after,
        );
    }

    fn on_area(&mut self, e: &AreaEvent) {
        let _ = writeln!(
            self.writer,
            "[area] #{} {} rows/band={}",
            e.cycle_index,
            fmt_area(e.area),
            e.band_rows,
        );
    }

    fn on_chunk_flush(&mut self, e: &ChunkEvent) {
        if !self.chunks {
            return;
        }
        let from = match e.occluder {
            Some(n) => format!("{n:?}"),
            None => "screen".to_owned(),
        };
        let _ = writeln!(
            self.writer,
            "[flush] #{} {} px={} from={from}",
            e.cycle_index,
            fmt_area(e.band),
            e.pixels,
        );
    }

    fn on_round_failure(&mut self, e: &RoundFailureEvent) {
        let _ = writeln!(
            self.writer,
            "[WARN] #{} rounding hook cannot fit {} in the draw buffer; skipped",
            e.cycle_index,
            fmt_area(e.area),
        );
    }

    fn on_cycle_summary(&mut self, s: &CycleSummary) {
        let _ = writeln!(
            self.writer,
            "[summary] #{} {}ms areas={} chunks={} px={} deferred={}",
            s.cycle_index, s.elapsed_ms, s.areas, s.chunks, s.pixels, s.deferred,
        );
    }

    fn on_damage_rects(&mut self, cycle_index: u64, rects: &[Area]) {
        let _ = writeln!(
            self.writer,
            "[damage] #{cycle_index} rects={}",
            rects.len(),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pretty_print_cycle_begin() {
        let mut sink = PrettyPrintSink::with_writer(Vec::<u8>::new());
        sink.on_cycle_begin(&CycleBeginEvent {
            cycle_index: 1,
            timestamp_ms: 30,
            pending: 2,
            overflows: 1,
        });
        let output = String::from_utf8(sink.writer).unwrap();
        assert!(output.contains("[cycle] #1"), "got: {output}");
        assert!(output.contains("OVERFLOW"), "got: {output}");
    }

    #[test]
    fn chunk_lines_can_be_muted() {
        let mut sink = PrettyPrintSink::with_writer(Vec::<u8>::new()).with_chunks(false);
        sink.on_chunk_flush(&ChunkEvent {
            cycle_index: 0,
            band: Area::new(0, 0, 319, 23),
            pixels: 320 * 24,
            occluder: None,
        });
        sink.on_round_failure(&RoundFailureEvent {
            cycle_index: 0,
            area: Area::new(0, 0, 9, 9),
        });
        let output = String::from_utf8(sink.writer).unwrap();
        assert!(!output.contains("[flush]"), "got: {output}");
        assert!(output.contains("[WARN]"), "got: {output}");
        assert!(output.contains("10x10"), "got: {output}");
    }
}
