// Copyright 2026 the Scrim Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The per-node drawing contract.
//!
//! Each node carries one [`Widget`]. The compositor never looks inside it; it
//! only asks three questions:
//!
//! - [`cover_check`](Widget::cover_check): will you paint every pixel of this
//!   area opaquely? Used to skip painting whatever lies beneath.
//! - [`draw_main`](Widget::draw_main): paint your body, clipped to `mask`.
//!   Called before the node's children.
//! - [`draw_post`](Widget::draw_post): paint anything that belongs above your
//!   children (borders, focus rings, scrollbars). Called after them.
//!
//! Callbacks receive a [`DrawContext`] giving access to the draw buffer and a
//! way to request further damage. Such requests are collected during the
//! cycle and queued for the next one.

use alloc::vec::Vec;
use core::fmt;

use crate::area::Area;
use crate::buffer::{Color, DrawBuffer};

use super::id::NodeId;
use super::store::Scene;

/// Polymorphic draw behaviour of a scene node.
pub trait Widget: fmt::Debug {
    /// Returns `true` if the widget paints every pixel of `area` fully
    /// opaquely. `coords` is the node's box, which already contains `area`.
    fn cover_check(&self, coords: Area, area: Area) -> bool {
        _ = (coords, area);
        false
    }

    /// Paints the widget body. `mask` is the node's extended box clipped to
    /// the region being redrawn.
    fn draw_main(&self, ctx: &mut DrawContext<'_>, mask: Area) {
        _ = (ctx, mask);
    }

    /// Paints above the node's children, with the same `mask` as
    /// [`draw_main`](Self::draw_main).
    fn draw_post(&self, ctx: &mut DrawContext<'_>, mask: Area) {
        _ = (ctx, mask);
    }
}

/// What a widget sees while it is being drawn.
pub struct DrawContext<'a> {
    pub(crate) scene: &'a Scene,
    pub(crate) node: NodeId,
    pub(crate) screen: NodeId,
    pub(crate) buffer: &'a mut DrawBuffer,
    pub(crate) requests: &'a mut Vec<Area>,
}

impl fmt::Debug for DrawContext<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DrawContext")
            .field("node", &self.node)
            .field("screen", &self.screen)
            .field("buffer", &self.buffer)
            .finish_non_exhaustive()
    }
}

impl<'a> DrawContext<'a> {
    pub(crate) fn new(
        scene: &'a Scene,
        node: NodeId,
        screen: NodeId,
        buffer: &'a mut DrawBuffer,
        requests: &'a mut Vec<Area>,
    ) -> Self {
        Self {
            scene,
            node,
            screen,
            buffer,
            requests,
        }
    }

    /// Returns the node being drawn.
    #[inline]
    #[must_use]
    pub fn node(&self) -> NodeId {
        self.node
    }

    /// Returns the screen whose refresh is in progress.
    ///
    /// Overlay nodes are drawn while some screen is refreshing; this is that
    /// screen, not the overlay root.
    #[inline]
    #[must_use]
    pub fn refreshing_screen(&self) -> NodeId {
        self.screen
    }

    /// Returns the box of the node being drawn.
    #[must_use]
    pub fn coords(&self) -> Area {
        self.scene.coords(self.node)
    }

    /// Returns the scene, for widgets that need to inspect other nodes.
    #[inline]
    #[must_use]
    pub fn scene(&self) -> &Scene {
        self.scene
    }

    /// Returns the draw buffer for direct pixel access.
    #[inline]
    pub fn buffer(&mut self) -> &mut DrawBuffer {
        self.buffer
    }

    /// Fills `area ∩ mask` with a solid colour.
    pub fn fill(&mut self, area: Area, mask: Area, color: Color) {
        if let Some(clipped) = area.intersect(&mask) {
            self.buffer.fill(clipped, color);
        }
    }

    /// Requests a redraw of `node` in the next cycle.
    ///
    /// The request goes through the same gating as
    /// [`Scene::invalidate`]: hidden nodes and nodes off the active screen
    /// produce nothing.
    pub fn invalidate(&mut self, node: NodeId) {
        if let Some(area) = self.scene.damage_area(node) {
            self.requests.push(area);
        }
    }

    /// Requests a redraw of `area` in the next cycle.
    pub fn invalidate_area(&mut self, area: Area) {
        self.requests.push(area);
    }
}

/// A grouping node that paints nothing of its own.
#[derive(Clone, Copy, Debug, Default)]
pub struct Container;

impl Widget for Container {}

/// A solid-colour rectangle. It covers what lies beneath only when the
/// colour is fully opaque.
#[derive(Clone, Copy, Debug)]
pub struct Fill {
    /// Body colour.
    pub color: Color,
}

impl Fill {
    /// Creates a fill widget.
    #[must_use]
    pub const fn new(color: Color) -> Self {
        Self { color }
    }
}

impl Widget for Fill {
    fn cover_check(&self, coords: Area, area: Area) -> bool {
        self.color.is_opaque() && coords.contains(&area)
    }

    fn draw_main(&self, ctx: &mut DrawContext<'_>, mask: Area) {
        let coords = ctx.coords();
        ctx.fill(coords, mask, self.color);
    }
}

/// A filled rectangle with a border painted above its children.
#[derive(Clone, Copy, Debug)]
pub struct Frame {
    /// Body colour, painted before children.
    pub fill: Color,
    /// Border colour, painted after children.
    pub border: Color,
    /// Border width in pixels.
    pub border_width: i32,
}

impl Widget for Frame {
    fn cover_check(&self, coords: Area, area: Area) -> bool {
        self.fill.is_opaque() && coords.contains(&area)
    }

    fn draw_main(&self, ctx: &mut DrawContext<'_>, mask: Area) {
        let coords = ctx.coords();
        ctx.fill(coords, mask, self.fill);
    }

    fn draw_post(&self, ctx: &mut DrawContext<'_>, mask: Area) {
        let c = ctx.coords();
        let w = self.border_width;
        if w <= 0 {
            return;
        }
        let edges = [
            Area::new(c.x1, c.y1, c.x2, c.y1 + w - 1),
            Area::new(c.x1, c.y2 - w + 1, c.x2, c.y2),
            Area::new(c.x1, c.y1, c.x1 + w - 1, c.y2),
            Area::new(c.x2 - w + 1, c.y1, c.x2, c.y2),
        ];
        for edge in edges {
            ctx.fill(edge, mask, self.border);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn translucent_fills_do_not_cover() {
        let coords = Area::new(0, 0, 49, 49);
        let inner = Area::new(10, 10, 20, 20);
        let half = Color(0x80FF_0000);

        assert!(Fill::new(Color::BLACK).cover_check(coords, inner));
        assert!(!Fill::new(half).cover_check(coords, inner));
        assert!(!Fill::new(Color::BLACK).cover_check(coords, Area::new(40, 40, 60, 60)));

        let frame = Frame {
            fill: half,
            border: Color::BLACK,
            border_width: 2,
        };
        assert!(!frame.cover_check(coords, inner));
        assert!(
            Frame {
                fill: Color::WHITE,
                ..frame
            }
            .cover_check(coords, inner)
        );
    }
}
