// Copyright 2026 the Scrim Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Dirty-rectangle compositor for small embedded displays.
//!
//! `scrim_core` decides what must be redrawn, in what order, and how much of a
//! frame buffer that takes, for a retained tree of visual nodes and a draw
//! buffer that may be far smaller than one frame. It is `no_std` compatible
//! (with `alloc`) and stores nodes in struct-of-arrays layout with generational
//! index handles.
//!
//! # Architecture
//!
//! ```text
//!   Scene mutators ──► Scene::invalidate() ──► InvalidationQueue
//!                                                    │
//!                 ┌──────────────────────────────────┘
//!                 ▼
//!   Renderer::run_cycle() ──► coalesce ──► bands ──► find_top_opaque
//!                                                    │
//!                 ┌──────────────────────────────────┘
//!                 ▼
//!   Painter::paint_from() ──► overlays ──► DisplayDriver::flush()
//! ```
//!
//! **[`scene`]**: Struct-of-arrays node tree with generational handles,
//! screens and overlay layers, the [`Widget`](scene::Widget) draw contract,
//! and the damage producer that mutators call.
//!
//! **[`queue`]**: Fixed-capacity invalidation queue and the coalescing pass.
//!
//! **[`occlusion`]**: Search for the deepest node that opaquely covers an area.
//!
//! **[`paint`]**: Back-to-front painter with ascend-and-redraw.
//!
//! **[`refresh`]**: The [`Renderer`](refresh::Renderer) and its cycle, including
//! band splitting for bounded draw buffers.
//!
//! **[`display`]**: The [`DisplayDriver`](display::DisplayDriver) and
//! [`RefreshMonitor`](display::RefreshMonitor) traits.
//!
//! **[`area`]**, **[`buffer`]**, **[`config`]**: Pixel geometry, the draw
//! buffer, and load-time configuration.
//!
//! **[`trace`]**: [`TraceSink`](trace::TraceSink) trait and event types for
//! cycle instrumentation, with zero-overhead [`Tracer`](trace::Tracer)
//! wrapper.
//!
//! # Crate features
//!
//! - `std` (disabled by default): Enables `std` support in dependencies.
//! - `trace` (disabled by default): Enables `Tracer` method bodies (one branch
//!   per call site).
//! - `trace-rich` (disabled by default, implies `trace`): Gates the per-cycle
//!   damage-rect event.

#![no_std]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]

extern crate alloc;

pub mod area;
pub mod buffer;
pub mod config;
pub mod display;
pub mod occlusion;
pub mod paint;
pub mod queue;
pub mod refresh;
pub mod scene;
pub mod trace;
