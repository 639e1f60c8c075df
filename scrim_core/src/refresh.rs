// Copyright 2026 the Scrim Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The refresh cycle.
//!
//! [`Renderer::run_cycle`] is the compositor's entry point. A scheduler calls
//! it periodically; long blocking work may also call it directly to push an
//! update out. Each call runs to completion:
//!
//! ```text
//!   Scene queue ──take──► working set ──coalesce──► unjoined areas
//!                                                        │
//!        ┌───────────────────────────────────────────────┘
//!        ▼
//!   for each area: split into bands that fit the draw buffer
//!        for each band:
//!            find_top_opaque ──► paint_from ──► paint overlays ──► flush
//!        │
//!        ▼
//!   damage requested while drawing ──► Scene queue (next cycle)
//!        │
//!        ▼
//!   RefreshMonitor::on_cycle_complete
//! ```
//!
//! The queue is emptied when the cycle takes its snapshot, so damage that
//! widgets request while drawing is never lost to the end-of-cycle reset.

use alloc::boxed::Box;
use alloc::vec::Vec;

use crate::area::Area;
use crate::buffer::DrawBuffer;
use crate::config::{BufferMode, ConfigError, RefreshConfig};
use crate::display::{DisplayDriver, RefreshMonitor};
use crate::occlusion::find_top_opaque;
use crate::paint::Painter;
use crate::queue::{DamageRect, RoundHook, coalesce};
use crate::scene::{NodeId, Scene};
use crate::trace::{
    AreaEvent, ChunkEvent, CoalesceEvent, CycleBeginEvent, CycleSummary, RoundFailureEvent,
    Tracer,
};

/// What one refresh cycle did.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CycleStats {
    /// Monotonic cycle counter.
    pub cycle_index: u64,
    /// Duration by the renderer's clock, in milliseconds.
    pub elapsed_ms: u32,
    /// Total size of the refreshed areas. Overdraw is not counted.
    pub pixels: u32,
    /// Unjoined areas processed.
    pub areas: u32,
    /// Bands flushed to the driver.
    pub chunks: u32,
}

/// Owns the draw buffer and runs refresh cycles for one display.
pub struct Renderer<D> {
    config: RefreshConfig,
    driver: D,
    buffer: DrawBuffer,
    working: Vec<DamageRect>,
    requests: Vec<Area>,
    refreshing: Option<NodeId>,
    cycle_index: u64,
    clock: Option<fn() -> u32>,
    monitor: Option<Box<dyn RefreshMonitor>>,
}

impl<D: core::fmt::Debug> core::fmt::Debug for Renderer<D> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Renderer")
            .field("config", &self.config)
            .field("driver", &self.driver)
            .field("buffer", &self.buffer)
            .field("cycle_index", &self.cycle_index)
            .finish_non_exhaustive()
    }
}

impl<D: DisplayDriver> Renderer<D> {
    /// Creates a renderer, allocating the draw buffer and working storage.
    pub fn new(config: RefreshConfig, driver: D) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            config,
            driver,
            buffer: DrawBuffer::new(config.buffer_pixels()),
            working: Vec::with_capacity(config.inv_capacity),
            requests: Vec::new(),
            refreshing: None,
            cycle_index: 0,
            clock: None,
            monitor: None,
        })
    }

    /// Returns the configuration the renderer was built with.
    #[inline]
    #[must_use]
    pub fn config(&self) -> &RefreshConfig {
        &self.config
    }

    /// Returns the display driver.
    #[inline]
    #[must_use]
    pub fn driver(&self) -> &D {
        &self.driver
    }

    /// Returns the display driver mutably.
    #[inline]
    pub fn driver_mut(&mut self) -> &mut D {
        &mut self.driver
    }

    /// Consumes the renderer, returning its driver.
    #[must_use]
    pub fn into_driver(self) -> D {
        self.driver
    }

    /// Returns the index the next cycle will get.
    #[inline]
    #[must_use]
    pub fn cycle_index(&self) -> u64 {
        self.cycle_index
    }

    /// Returns the screen being refreshed, or `None` outside a cycle.
    #[inline]
    #[must_use]
    pub fn refreshing_screen(&self) -> Option<NodeId> {
        self.refreshing
    }

    /// Installs a millisecond clock used to time cycles.
    ///
    /// Without one, every cycle reports zero elapsed time.
    pub fn set_clock(&mut self, clock: fn() -> u32) {
        self.clock = Some(clock);
    }

    /// Installs a monitor notified after every cycle that redrew something.
    pub fn set_monitor(&mut self, monitor: impl RefreshMonitor + 'static) {
        self.monitor = Some(Box::new(monitor));
    }

    /// Removes the monitor.
    pub fn clear_monitor(&mut self) {
        self.monitor = None;
    }

    /// Redraws everything queued on `scene`.
    pub fn run_cycle(&mut self, scene: &mut Scene) -> CycleStats {
        self.run_cycle_traced(scene, &mut Tracer::none())
    }

    /// Redraws everything queued on `scene`, reporting each stage to
    /// `tracer`.
    pub fn run_cycle_traced(&mut self, scene: &mut Scene, tracer: &mut Tracer<'_>) -> CycleStats {
        let start = self.now();
        let cycle_index = self.cycle_index;
        self.cycle_index += 1;

        let overflows = scene.queue().overflows();
        scene.queue_mut().take_into(&mut self.working);
        tracer.cycle_begin(&CycleBeginEvent {
            cycle_index,
            timestamp_ms: start,
            pending: count_u32(self.working.len()),
            overflows,
        });

        coalesce(&mut self.working);
        tracer.coalesce(&CoalesceEvent {
            cycle_index,
            before: count_u32(self.working.len()),
            after: count_u32(self.working.iter().filter(|e| !e.joined).count()),
        });
        #[cfg(feature = "trace-rich")]
        if tracer.is_enabled() {
            let rects: Vec<Area> = self
                .working
                .iter()
                .filter(|e| !e.joined)
                .map(|e| e.area)
                .collect();
            tracer.damage_rects(cycle_index, &rects);
        }

        debug_assert_eq!(
            scene.bounds(),
            self.config.bounds(),
            "scene and renderer were built for different displays"
        );
        let screen = scene.active_screen();
        let round = scene.queue().round_hook();
        self.refreshing = Some(screen);
        // The driver's last-band flag goes on the final area that draws.
        let last_area = (0..self.working.len()).rev().find(|&i| {
            let entry = self.working[i];
            !entry.joined && self.plan(entry.area, round).is_some()
        });

        let mut stats = CycleStats {
            cycle_index,
            ..CycleStats::default()
        };
        for i in 0..self.working.len() {
            let entry = self.working[i];
            if entry.joined {
                continue;
            }
            stats.areas += 1;
            stats.pixels = stats.pixels.saturating_add(entry.area.size());
            let last = last_area == Some(i);
            self.refresh_area(scene, screen, entry.area, round, last, &mut stats, tracer);
        }

        self.refreshing = None;
        let processed = !self.working.is_empty();
        self.working.clear();

        let deferred = count_u32(self.requests.len());
        for area in self.requests.drain(..) {
            scene.invalidate_area(Some(area));
        }

        stats.elapsed_ms = self.now().wrapping_sub(start);
        if processed {
            if let Some(monitor) = &mut self.monitor {
                monitor.on_cycle_complete(stats.elapsed_ms, stats.pixels);
            }
        }
        tracer.cycle_summary(&CycleSummary {
            cycle_index,
            elapsed_ms: stats.elapsed_ms,
            areas: stats.areas,
            chunks: stats.chunks,
            pixels: stats.pixels,
            deferred,
        });
        stats
    }

    /// Clips `area` to the display and picks its band height, or returns
    /// `None` if no band of it fits the draw buffer.
    fn plan(&self, area: Area, round: Option<RoundHook>) -> Option<(Area, i32)> {
        let area = area.intersect(&self.config.bounds())?;
        let band_rows = match self.config.buffer {
            BufferMode::FullFrame => area.height(),
            BufferMode::Bounded { .. } => {
                let max_rows = row_budget(self.buffer.capacity(), area)?;
                match round {
                    Some(round) => rounded_rows(max_rows, round)?,
                    None => max_rows,
                }
            }
        };
        Some((area, band_rows))
    }

    /// Draws one damaged area, band by band. `last_area` marks the final
    /// area of the cycle, whose final band is flushed as the last one.
    fn refresh_area(
        &mut self,
        scene: &Scene,
        screen: NodeId,
        area: Area,
        round: Option<RoundHook>,
        last_area: bool,
        stats: &mut CycleStats,
        tracer: &mut Tracer<'_>,
    ) {
        let Some((area, band_rows)) = self.plan(area, round) else {
            tracer.round_failure(&RoundFailureEvent {
                cycle_index: stats.cycle_index,
                area,
            });
            return;
        };
        tracer.area(&AreaEvent {
            cycle_index: stats.cycle_index,
            area,
            band_rows,
        });

        let mut row = area.y1;
        while row <= area.y2 {
            let band = Area::new(area.x1, row, area.x2, (row + band_rows - 1).min(area.y2));
            let last = last_area && band.y2 == area.y2;
            let occluder = self.refresh_band(scene, screen, band, last);
            stats.chunks += 1;
            tracer.chunk_flush(&ChunkEvent {
                cycle_index: stats.cycle_index,
                band,
                pixels: band.size(),
                occluder,
            });
            row += band_rows;
        }
    }

    /// Paints and flushes one band. Returns the node painting started from,
    /// if an opaque node covered the band.
    fn refresh_band(
        &mut self,
        scene: &Scene,
        screen: NodeId,
        band: Area,
        last: bool,
    ) -> Option<NodeId> {
        self.driver.wait_for_flush();
        self.buffer.set_area(band);

        let occluder = find_top_opaque(scene, band, screen);
        {
            let mut painter = Painter::new(scene, screen, &mut self.buffer, &mut self.requests);
            painter.paint_from(occluder.unwrap_or(screen), band);
            painter.paint_node(scene.top_layer(), band);
            painter.paint_node(scene.sys_layer(), band);
        }

        self.driver.flush(band, self.buffer.pixels(), last);
        occluder
    }

    fn now(&self) -> u32 {
        self.clock.map_or(0, |clock| clock())
    }
}

/// Rows of `area` that fit in a buffer of `capacity` pixels, capped at the
/// area's height. `None` if not even one row fits.
fn row_budget(capacity: usize, area: Area) -> Option<i32> {
    let width = usize::try_from(area.width()).ok().filter(|&w| w > 0)?;
    let rows = capacity / width;
    (rows > 0).then(|| i32::try_from(rows).unwrap_or(i32::MAX).min(area.height()))
}

/// Finds the tallest band height that the rounding hook keeps within
/// `max_rows`, or `None` if even a single row grows too tall.
fn rounded_rows(max_rows: i32, round: RoundHook) -> Option<i32> {
    (1..=max_rows).rev().find_map(|rows| {
        let mut probe = Area::new(0, 0, 0, rows - 1);
        round(&mut probe);
        (probe.height() <= max_rows).then_some((probe.y2 + 1).clamp(1, max_rows))
    })
}

#[expect(
    clippy::cast_possible_truncation,
    reason = "queue capacities are far below u32::MAX"
)]
fn count_u32(n: usize) -> u32 {
    n as u32
}
