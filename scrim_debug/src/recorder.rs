// Copyright 2026 the Scrim Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Compact binary event recording and decoding.
//!
//! [`RecorderSink`] implements [`TraceSink`] and encodes events into a
//! `Vec<u8>` as fixed-size little-endian records. [`decode`] reads them back
//! as an iterator of [`RecordedEvent`].
//!
//! Node handles are recorded by slot index only, so a decoded chunk event
//! names its occluder as a raw index.

use scrim_core::area::Area;
use scrim_core::trace::{
    AreaEvent, ChunkEvent, CoalesceEvent, CycleBeginEvent, CycleSummary, RoundFailureEvent,
    TraceSink,
};

// ---------------------------------------------------------------------------
// Event type discriminants
// ---------------------------------------------------------------------------

const TAG_CYCLE_BEGIN: u8 = 1;
const TAG_COALESCE: u8 = 2;
const TAG_AREA: u8 = 3;
const TAG_CHUNK_FLUSH: u8 = 4;
const TAG_ROUND_FAILURE: u8 = 5;
const TAG_CYCLE_SUMMARY: u8 = 6;
const TAG_DAMAGE_RECTS: u8 = 7;

// ---------------------------------------------------------------------------
// RecorderSink
// ---------------------------------------------------------------------------

/// A [`TraceSink`] that encodes events into a compact binary buffer.
#[derive(Debug, Default)]
pub struct RecorderSink {
    buf: Vec<u8>,
}

impl RecorderSink {
    /// Creates an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a view of the recorded bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    /// Consumes the recorder and returns the recorded bytes.
    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }

    // -- encoding helpers --------------------------------------------------

    fn write_u8(&mut self, v: u8) {
        self.buf.push(v);
    }

    fn write_u32(&mut self, v: u32) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    fn write_i32(&mut self, v: i32) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    fn write_u64(&mut self, v: u64) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    fn write_area(&mut self, a: Area) {
        self.write_i32(a.x1);
        self.write_i32(a.y1);
        self.write_i32(a.x2);
        self.write_i32(a.y2);
    }

    fn write_option_u32(&mut self, v: Option<u32>) {
        match v {
            Some(val) => {
                self.write_u8(1);
                self.write_u32(val);
            }
            None => {
                self.write_u8(0);
                self.write_u32(0);
            }
        }
    }
}

impl TraceSink for RecorderSink {
    fn on_cycle_begin(&mut self, e: &CycleBeginEvent) {
        self.write_u8(TAG_CYCLE_BEGIN);
        self.write_u64(e.cycle_index);
        self.write_u32(e.timestamp_ms);
        self.write_u32(e.pending);
        self.write_u32(e.overflows);
    }

    fn on_coalesce(&mut self, e: &CoalesceEvent) {
        self.write_u8(TAG_COALESCE);
        self.write_u64(e.cycle_index);
        self.write_u32(e.before);
        self.write_u32(e.after);
    }

    fn on_area(&mut self, e: &AreaEvent) {
        self.write_u8(TAG_AREA);
        self.write_u64(e.cycle_index);
        self.write_area(e.area);
        self.write_i32(e.band_rows);
    }

    fn on_chunk_flush(&mut self, e: &ChunkEvent) {
        self.write_u8(TAG_CHUNK_FLUSH);
        self.write_u64(e.cycle_index);
        self.write_area(e.band);
        self.write_u32(e.pixels);
        self.write_option_u32(e.occluder.map(|n| n.index()));
    }

    fn on_round_failure(&mut self, e: &RoundFailureEvent) {
        self.write_u8(TAG_ROUND_FAILURE);
        self.write_u64(e.cycle_index);
        self.write_area(e.area);
    }

    fn on_cycle_summary(&mut self, s: &CycleSummary) {
        self.write_u8(TAG_CYCLE_SUMMARY);
        self.write_u64(s.cycle_index);
        self.write_u32(s.elapsed_ms);
        self.write_u32(s.areas);
        self.write_u32(s.chunks);
        self.write_u32(s.pixels);
        self.write_u32(s.deferred);
    }

    fn on_damage_rects(&mut self, cycle_index: u64, rects: &[Area]) {
        self.write_u8(TAG_DAMAGE_RECTS);
        self.write_u64(cycle_index);
        let count = u32::try_from(rects.len()).unwrap_or(u32::MAX);
        self.write_u32(count);
        for rect in rects.iter().take(count as usize) {
            self.write_area(*rect);
        }
    }
}

// ---------------------------------------------------------------------------
// Decoder
// ---------------------------------------------------------------------------

/// A decoded event from a binary recording.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RecordedEvent {
    /// A [`CycleBeginEvent`].
    CycleBegin(CycleBeginEvent),
    /// A [`CoalesceEvent`].
    Coalesce(CoalesceEvent),
    /// An [`AreaEvent`].
    Area(AreaEvent),
    /// A [`ChunkEvent`], with the occluder as a slot index.
    ChunkFlush {
        /// Cycle counter.
        cycle_index: u64,
        /// The band that was flushed.
        band: Area,
        /// Pixels in the band.
        pixels: u32,
        /// Slot index of the occluding node, if any.
        occluder: Option<u32>,
    },
    /// A [`RoundFailureEvent`].
    RoundFailure(RoundFailureEvent),
    /// A [`CycleSummary`].
    CycleSummary(CycleSummary),
    /// The unjoined damage rectangles of a cycle.
    DamageRects {
        /// Cycle counter.
        cycle_index: u64,
        /// The rectangles, in queue order.
        rects: Vec<Area>,
    },
}

/// Decodes a byte slice produced by [`RecorderSink`] into an iterator of
/// [`RecordedEvent`].
pub fn decode(bytes: &[u8]) -> DecodeIter<'_> {
    DecodeIter {
        data: bytes,
        pos: 0,
    }
}

/// Iterator over decoded events.
#[derive(Debug)]
pub struct DecodeIter<'a> {
    data: &'a [u8],
    pos: usize,
}

impl DecodeIter<'_> {
    fn take<const N: usize>(&mut self) -> Option<[u8; N]> {
        let bytes = self.data.get(self.pos..self.pos + N)?.try_into().ok()?;
        self.pos += N;
        Some(bytes)
    }

    fn read_u8(&mut self) -> Option<u8> {
        self.take::<1>().map(|[b]| b)
    }

    fn read_u32(&mut self) -> Option<u32> {
        self.take().map(u32::from_le_bytes)
    }

    fn read_i32(&mut self) -> Option<i32> {
        self.take().map(i32::from_le_bytes)
    }

    fn read_u64(&mut self) -> Option<u64> {
        self.take().map(u64::from_le_bytes)
    }

    fn read_area(&mut self) -> Option<Area> {
        Some(Area::new(
            self.read_i32()?,
            self.read_i32()?,
            self.read_i32()?,
            self.read_i32()?,
        ))
    }

    fn read_option_u32(&mut self) -> Option<Option<u32>> {
        let present = self.read_u8()?;
        let val = self.read_u32()?;
        Some((present != 0).then_some(val))
    }

    fn decode_cycle_begin(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::CycleBegin(CycleBeginEvent {
            cycle_index: self.read_u64()?,
            timestamp_ms: self.read_u32()?,
            pending: self.read_u32()?,
            overflows: self.read_u32()?,
        }))
    }

    fn decode_coalesce(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::Coalesce(CoalesceEvent {
            cycle_index: self.read_u64()?,
            before: self.read_u32()?,
            after: self.read_u32()?,
        }))
    }

    fn decode_area(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::Area(AreaEvent {
            cycle_index: self.read_u64()?,
            area: self.read_area()?,
            band_rows: self.read_i32()?,
        }))
    }

    fn decode_chunk_flush(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::ChunkFlush {
            cycle_index: self.read_u64()?,
            band: self.read_area()?,
            pixels: self.read_u32()?,
            occluder: self.read_option_u32()?,
        })
    }

    fn decode_round_failure(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::RoundFailure(RoundFailureEvent {
            cycle_index: self.read_u64()?,
            area: self.read_area()?,
        }))
    }

    fn decode_cycle_summary(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::CycleSummary(CycleSummary {
            cycle_index: self.read_u64()?,
            elapsed_ms: self.read_u32()?,
            areas: self.read_u32()?,
            chunks: self.read_u32()?,
            pixels: self.read_u32()?,
            deferred: self.read_u32()?,
        }))
    }

    fn decode_damage_rects(&mut self) -> Option<RecordedEvent> {
        let cycle_index = self.read_u64()?;
        let count = self.read_u32()?;
        let rects = (0..count)
            .map(|_| self.read_area())
            .collect::<Option<Vec<_>>>()?;
        Some(RecordedEvent::DamageRects { cycle_index, rects })
    }
}

impl Iterator for DecodeIter<'_> {
    type Item = RecordedEvent;

    fn next(&mut self) -> Option<Self::Item> {
        let tag = self.read_u8()?;
        match tag {
            TAG_CYCLE_BEGIN => self.decode_cycle_begin(),
            TAG_COALESCE => self.decode_coalesce(),
            TAG_AREA => self.decode_area(),
            TAG_CHUNK_FLUSH => self.decode_chunk_flush(),
            TAG_ROUND_FAILURE => self.decode_round_failure(),
            TAG_CYCLE_SUMMARY => self.decode_cycle_summary(),
            TAG_DAMAGE_RECTS => self.decode_damage_rects(),
            _ => None, // unknown tag → stop iteration
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
