// Copyright 2026 the Scrim Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Chrome Trace Event Format exporter.
//!
//! [`export`] reads recorded bytes from a [`RecorderSink`](super::recorder::RecorderSink)
//! and writes [Chrome Trace Event Format][format] JSON to the given writer.
//!
//! Each cycle becomes a duration slice from its begin timestamp to begin plus
//! elapsed time. Events inside a cycle carry no clock of their own and are
//! placed at the cycle's start.
//!
//! [format]: https://docs.google.com/document/d/1CvAClvFfyA5R-PhYUmn5OOQtYMH4h6I0nSsKchNAySU

use std::io::{self, Write};

use serde_json::{Value, json};

use scrim_core::area::Area;

use crate::recorder::{RecordedEvent, decode};

/// Exports recorded events as Chrome Trace Event Format JSON.
///
/// The output is a complete JSON array of trace event objects, suitable for
/// loading into `chrome://tracing` or [Perfetto](https://ui.perfetto.dev/).
pub fn export(bytes: &[u8], writer: &mut dyn Write) -> io::Result<()> {
    let mut events: Vec<Value> = Vec::new();
    let mut cycle_start_us: u64 = 0;

    for recorded in decode(bytes) {
        match recorded {
            RecordedEvent::CycleBegin(e) => {
                cycle_start_us = ms_to_us(e.timestamp_ms);
                events.push(json!({
                    "ph": "B",
                    "name": "Cycle",
                    "cat": "Refresh",
                    "ts": cycle_start_us,
                    "pid": 0,
                    "tid": 0,
                    "args": {
                        "cycle_index": e.cycle_index,
                        "pending": e.pending,
                        "overflows": e.overflows,
                    }
                }));
            }
            RecordedEvent::Coalesce(e) => {
                events.push(instant("Coalesce", "Refresh", cycle_start_us, json!({
                    "cycle_index": e.cycle_index,
                    "before": e.before,
                    "after": e.after,
                })));
            }
            RecordedEvent::Area(e) => {
                events.push(instant("Area", "Refresh", cycle_start_us, json!({
                    "cycle_index": e.cycle_index,
                    "area": area_json(e.area),
                    "band_rows": e.band_rows,
                })));
            }
            RecordedEvent::ChunkFlush {
                cycle_index,
                band,
                pixels,
                occluder,
            } => {
                events.push(instant("Flush", "Output", cycle_start_us, json!({
                    "cycle_index": cycle_index,
                    "band": area_json(band),
                    "pixels": pixels,
                    "occluder": occluder,
                })));
            }
            RecordedEvent::RoundFailure(e) => {
                events.push(instant("RoundFailure", "Warning", cycle_start_us, json!({
                    "cycle_index": e.cycle_index,
                    "area": area_json(e.area),
                })));
            }
            RecordedEvent::CycleSummary(s) => {
                events.push(json!({
                    "ph": "E",
                    "name": "Cycle",
                    "cat": "Refresh",
                    "ts": cycle_start_us + ms_to_us(s.elapsed_ms),
                    "pid": 0,
                    "tid": 0,
                    "args": {
                        "cycle_index": s.cycle_index,
                        "areas": s.areas,
                        "chunks": s.chunks,
                        "pixels": s.pixels,
                        "deferred": s.deferred,
                    }
                }));
            }
            RecordedEvent::DamageRects { cycle_index, rects } => {
                let rects: Vec<Value> = rects.into_iter().map(area_json).collect();
                events.push(instant("DamageRects", "Rich", cycle_start_us, json!({
                    "cycle_index": cycle_index,
                    "rects": rects,
                })));
            }
        }
    }

    serde_json::to_writer_pretty(writer, &events)?;
    Ok(())
}

fn instant(name: &str, cat: &str, ts: u64, args: Value) -> Value {
    json!({
        "ph": "i",
        "name": name,
        "cat": cat,
        "ts": ts,
        "pid": 0,
        "tid": 0,
        "s": "t",
        "args": args,
    })
}

fn area_json(a: Area) -> Value {
    json!([a.x1, a.y1, a.x2, a.y2])
}

fn ms_to_us(ms: u32) -> u64 {
    u64::from(ms) * 1000
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recorder::RecorderSink;
    use scrim_core::trace::{CoalesceEvent, CycleBeginEvent, CycleSummary, TraceSink};

    #[test]
    fn export_produces_valid_json() {
        let mut rec = RecorderSink::new();
        rec.on_cycle_begin(&CycleBeginEvent {
            cycle_index: 0,
            timestamp_ms: 30,
            pending: 2,
            overflows: 0,
        });
        rec.on_coalesce(&CoalesceEvent {
            cycle_index: 0,
            before: 2,
            after: 1,
        });
        rec.on_cycle_summary(&CycleSummary {
            cycle_index: 0,
            elapsed_ms: 4,
            areas: 1,
            chunks: 3,
            pixels: 1681,
            deferred: 0,
        });

        let mut out = Vec::new();
        export(rec.as_bytes(), &mut out).unwrap();
        let json_str = String::from_utf8(out).unwrap();

        // Should parse as a JSON array.
        let parsed: Vec<Value> = serde_json::from_str(&json_str).unwrap();
        assert_eq!(parsed.len(), 3);

        assert_eq!(parsed[0]["ph"], "B");
        assert_eq!(parsed[0]["ts"], 30_000);

        assert_eq!(parsed[1]["ph"], "i");
        assert_eq!(parsed[1]["name"], "Coalesce");
        assert_eq!(parsed[1]["args"]["after"], 1);

        // The slice closes at begin + elapsed.
        assert_eq!(parsed[2]["ph"], "E");
        assert_eq!(parsed[2]["ts"], 34_000);
    }

    #[test]
    fn export_empty_recording() {
        let mut out = Vec::new();
        export(&[], &mut out).unwrap();
        let json_str = String::from_utf8(out).unwrap();
        let parsed: Vec<Value> = serde_json::from_str(&json_str).unwrap();
        assert!(parsed.is_empty());
    }
}
