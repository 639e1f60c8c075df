// Copyright 2026 the Scrim Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Simulated 320x240 display that exercises the whole refresh pipeline.
//!
//! Builds a small scene, then runs 60 cycles while moving, hiding, and
//! restacking nodes. Events go to both a
//! [`PrettyPrintSink`](scrim_debug::pretty::PrettyPrintSink) and a
//! [`RecorderSink`](scrim_debug::recorder::RecorderSink); the recording is
//! exported as a Chrome trace JSON file at the end.

use std::error::Error;
use std::fs::File;
use std::io::BufWriter;
use std::sync::OnceLock;
use std::time::Instant;

use scrim_core::area::Area;
use scrim_core::buffer::Color;
use scrim_core::config::RefreshConfig;
use scrim_core::display::DisplayDriver;
use scrim_core::refresh::Renderer;
use scrim_core::scene::{Fill, Frame, Scene};
use scrim_core::trace::{
    AreaEvent, ChunkEvent, CoalesceEvent, CycleBeginEvent, CycleSummary, RoundFailureEvent,
    TraceSink, Tracer,
};

use scrim_debug::pretty::PrettyPrintSink;
use scrim_debug::recorder::RecorderSink;

const CYCLE_COUNT: u32 = 60;

/// A framebuffer in host memory standing in for a panel.
#[derive(Debug)]
struct SimDisplay {
    width: i32,
    frame: Vec<Color>,
    flushed_pixels: u64,
    frames: u32,
}

impl SimDisplay {
    fn new(width: i32, height: i32) -> Self {
        let len = usize::try_from(width * height).unwrap_or(0);
        Self {
            width,
            frame: vec![Color::BLACK; len],
            flushed_pixels: 0,
            frames: 0,
        }
    }

    /// Counts distinct colours on screen, as a cheap sanity check.
    fn palette_size(&self) -> usize {
        let mut colors: Vec<u32> = self.frame.iter().map(|c| c.0).collect();
        colors.sort_unstable();
        colors.dedup();
        colors.len()
    }
}

impl DisplayDriver for SimDisplay {
    fn flush(&mut self, area: Area, pixels: &[Color], last: bool) {
        let w = usize::try_from(area.width()).unwrap_or(0);
        for (row, src) in pixels.chunks_exact(w).enumerate() {
            let y = area.y1 + i32::try_from(row).unwrap_or(i32::MAX);
            let start = usize::try_from(y * self.width + area.x1).unwrap_or(0);
            self.frame[start..start + w].copy_from_slice(src);
        }
        self.flushed_pixels += pixels.len() as u64;
        if last {
            self.frames += 1;
        }
    }
}

/// Forwards every event to two sinks.
struct Tee<'a> {
    a: &'a mut dyn TraceSink,
    b: &'a mut dyn TraceSink,
}

impl TraceSink for Tee<'_> {
    fn on_cycle_begin(&mut self, e: &CycleBeginEvent) {
        self.a.on_cycle_begin(e);
        self.b.on_cycle_begin(e);
    }

    fn on_coalesce(&mut self, e: &CoalesceEvent) {
        self.a.on_coalesce(e);
        self.b.on_coalesce(e);
    }

    fn on_area(&mut self, e: &AreaEvent) {
        self.a.on_area(e);
        self.b.on_area(e);
    }

    fn on_chunk_flush(&mut self, e: &ChunkEvent) {
        self.a.on_chunk_flush(e);
        self.b.on_chunk_flush(e);
    }

    fn on_round_failure(&mut self, e: &RoundFailureEvent) {
        self.a.on_round_failure(e);
        self.b.on_round_failure(e);
    }

    fn on_cycle_summary(&mut self, s: &CycleSummary) {
        self.a.on_cycle_summary(s);
        self.b.on_cycle_summary(s);
    }

    fn on_damage_rects(&mut self, cycle_index: u64, rects: &[Area]) {
        self.a.on_damage_rects(cycle_index, rects);
        self.b.on_damage_rects(cycle_index, rects);
    }
}

/// Milliseconds since the first call.
fn clock() -> u32 {
    static START: OnceLock<Instant> = OnceLock::new();
    let elapsed = START.get_or_init(Instant::now).elapsed().as_millis();
    u32::try_from(elapsed).unwrap_or(u32::MAX)
}

/// Widens areas to even columns, as some controllers require.
fn align_columns(area: &mut Area) {
    area.x1 &= !1;
    area.x2 |= 1;
}

fn main() -> Result<(), Box<dyn Error>> {
    let config = RefreshConfig::default();
    let mut scene = Scene::new(&config)?;
    scene.queue_mut().set_round_hook(Some(align_columns));

    let display = SimDisplay::new(320, 240);
    let mut renderer = Renderer::new(config, display)?;
    renderer.set_clock(clock);
    renderer.set_monitor(|elapsed_ms: u32, pixels: u32| {
        if pixels > 50_000 {
            println!("[monitor] large redraw: {pixels} px in {elapsed_ms} ms");
        }
    });

    // -- scene -------------------------------------------------------------
    let screen = scene.active_screen();
    let panel = scene.create_node(
        screen,
        Area::new(20, 20, 179, 139),
        Box::new(Frame {
            fill: Color::rgb(0x30, 0x30, 0x40),
            border: Color::rgb(0x80, 0x80, 0xff),
            border_width: 2,
        }),
    );
    let cursor = scene.create_node(
        panel,
        Area::from_origin_size(30, 30, 16, 16),
        Box::new(Fill::new(Color::rgb(0xff, 0x40, 0x40))),
    );
    scene.set_ext_size(cursor, 2);
    let card = scene.create_node(
        screen,
        Area::new(150, 100, 279, 199),
        Box::new(Fill::new(Color::rgb(0x40, 0xa0, 0x40))),
    );
    let top = scene.top_layer();
    let status = scene.create_node(
        top,
        Area::new(0, 0, 319, 11),
        Box::new(Fill::new(Color::rgb(0x10, 0x10, 0x10))),
    );
    let other = scene.create_screen(Box::new(Fill::new(Color::rgb(0x20, 0x20, 0x80))));

    // -- sinks -------------------------------------------------------------
    let mut pretty = PrettyPrintSink::new(Box::new(std::io::stdout())).with_chunks(false);
    let mut recorder = RecorderSink::new();

    // -- simulated loop ----------------------------------------------------
    for cycle in 0..CYCLE_COUNT {
        let step = i32::try_from(cycle).unwrap_or(0);
        let at = scene.coords(cursor);
        scene.set_pos(cursor, 30 + (step * 3) % 120, at.y1);

        match cycle {
            10 => scene.move_foreground(panel),
            20 => scene.set_hidden(card, true),
            25 => {
                // A drag that ends where it started: cancel its damage.
                scene.invalidate(card);
                scene.retract_damage(1);
            }
            30 => scene.set_hidden(card, false),
            40 => scene.load_screen(other),
            50 => scene.load_screen(screen),
            _ => {}
        }
        if cycle % 15 == 0 {
            scene.invalidate(status);
        }

        let mut tee = Tee {
            a: &mut pretty,
            b: &mut recorder,
        };
        let mut tracer = Tracer::new(&mut tee);
        renderer.run_cycle_traced(&mut scene, &mut tracer);
    }

    let display = renderer.driver();
    println!(
        "{CYCLE_COUNT} cycles, {} frames, {} px flushed, {} colours on screen",
        display.frames,
        display.flushed_pixels,
        display.palette_size(),
    );

    // -- export Chrome trace -----------------------------------------------
    let path = "trace.json";
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    scrim_debug::chrome::export(recorder.as_bytes(), &mut writer)?;

    println!("Wrote {path}");
    Ok(())
}
