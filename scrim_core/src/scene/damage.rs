// Copyright 2026 the Scrim Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Damage production: turning node changes into queued redraw areas.
//!
//! Every mutator on [`Scene`] calls [`Scene::invalidate`] on the affected node
//! before and/or after the change. A node only produces damage when it can
//! actually be seen:
//!
//! - neither it nor any ancestor is hidden,
//! - its root is the active screen or one of the overlay layers,
//! - its extended box survives clipping against every ancestor's box.

use crate::area::Area;
use crate::queue::InvalidationQueue;

use super::id::{INVALID, NodeId};
use super::store::Scene;

impl Scene {
    /// Computes the area `id` would queue for redraw, without queueing it.
    ///
    /// Returns `None` when the node is not visible on the display.
    #[must_use]
    pub fn damage_area(&self, id: NodeId) -> Option<Area> {
        self.validate(id);
        let idx = id.idx;
        if self.flags[idx as usize].hidden {
            return None;
        }

        let root = self.root_at(idx);
        if root != self.active && !self.is_overlay(root) {
            return None;
        }

        let mut area = self.extended_at(idx);
        let mut p = self.parent[idx as usize];
        while p != INVALID {
            if self.flags[p as usize].hidden {
                return None;
            }
            area = area.intersect(&self.coords[p as usize])?;
            p = self.parent[p as usize];
        }
        Some(area)
    }

    /// Queues the visible area of `id` for redraw.
    pub fn invalidate(&mut self, id: NodeId) {
        if let Some(area) = self.damage_area(id) {
            self.queue.submit(area);
        }
    }

    /// Queues an arbitrary display area for redraw.
    ///
    /// `None` clears every pending entry instead.
    pub fn invalidate_area(&mut self, area: Option<Area>) {
        match area {
            Some(area) => self.queue.submit(area),
            None => self.queue.clear(),
        }
    }

    /// Returns the number of queued damage rectangles.
    #[must_use]
    pub fn pending_damage(&self) -> usize {
        self.queue.count()
    }

    /// Cancels the `count` most recently queued damage rectangles.
    pub fn retract_damage(&mut self, count: usize) {
        self.queue.retract(count);
    }

    /// Returns the invalidation queue.
    #[inline]
    #[must_use]
    pub fn queue(&self) -> &InvalidationQueue {
        &self.queue
    }

    /// Returns the invalidation queue mutably, e.g. to install a rounding hook.
    #[inline]
    pub fn queue_mut(&mut self) -> &mut InvalidationQueue {
        &mut self.queue
    }
}

#[cfg(test)]
mod tests {
    use alloc::boxed::Box;

    use crate::buffer::Color;
    use crate::config::RefreshConfig;
    use crate::scene::{Container, Fill, Scene};

    use super::*;

    fn drained() -> Scene {
        let mut scene = Scene::new(&RefreshConfig::default()).unwrap();
        scene.invalidate_area(None);
        scene
    }

    #[test]
    fn extended_box_clipped_by_ancestors() {
        let mut scene = drained();
        let screen = scene.active_screen();
        let panel = scene.create_node(screen, Area::new(0, 0, 49, 49), Box::new(Container));
        let shadowed = scene.create_node(panel, Area::new(40, 40, 59, 59), Box::new(Container));
        scene.set_ext_size(shadowed, 5);
        assert_eq!(scene.damage_area(shadowed), Some(Area::new(35, 35, 49, 49)));
    }

    #[test]
    fn hidden_ancestor_blocks_damage() {
        let mut scene = drained();
        let screen = scene.active_screen();
        let panel = scene.create_node(screen, Area::new(0, 0, 99, 99), Box::new(Container));
        let leaf = scene.create_node(panel, Area::new(10, 10, 20, 20), Box::new(Container));
        scene.set_hidden(panel, true);
        scene.invalidate_area(None);

        scene.invalidate(leaf);
        assert_eq!(scene.pending_damage(), 0);

        scene.set_hidden(leaf, true);
        scene.set_hidden(panel, false);
        scene.invalidate_area(None);
        scene.invalidate(leaf);
        assert_eq!(scene.pending_damage(), 0);
    }

    #[test]
    fn inactive_screen_produces_no_damage() {
        let mut scene = drained();
        let other = scene.create_screen(Box::new(Container));
        let leaf = scene.create_node(other, Area::new(0, 0, 9, 9), Box::new(Container));
        scene.set_pos(leaf, 20, 20);
        scene.invalidate(leaf);
        assert_eq!(scene.pending_damage(), 0);

        // Overlays are always visible.
        let top = scene.top_layer();
        let badge = scene.create_node(top, Area::new(0, 0, 9, 9), Box::new(Container));
        scene.invalidate_area(None);
        scene.invalidate(badge);
        assert_eq!(scene.pending_damage(), 1);
    }

    #[test]
    fn disjoint_ancestor_box_aborts() {
        let mut scene = drained();
        let screen = scene.active_screen();
        let panel = scene.create_node(screen, Area::new(0, 0, 9, 9), Box::new(Container));
        let outside = scene.create_node(panel, Area::new(20, 20, 29, 29), Box::new(Container));
        assert_eq!(scene.damage_area(outside), None);
    }

    #[test]
    fn mutators_queue_old_and_new_areas() {
        let mut scene = drained();
        let screen = scene.active_screen();
        let node = scene.create_node(screen, Area::new(0, 0, 9, 9), Box::new(Fill::new(Color::BLACK)));
        scene.invalidate_area(None);

        scene.set_pos(node, 100, 100);
        let areas: alloc::vec::Vec<_> = scene.queue().entries().iter().map(|e| e.area).collect();
        assert_eq!(
            areas,
            alloc::vec![Area::new(0, 0, 9, 9), Area::new(100, 100, 109, 109)]
        );
    }

    #[test]
    fn retract_cancels_speculative_move() {
        let mut scene = drained();
        let screen = scene.active_screen();
        let node = scene.create_node(screen, Area::new(0, 0, 9, 9), Box::new(Container));
        scene.invalidate_area(None);

        // A drag that ended up not moving anything.
        scene.invalidate(node);
        scene.invalidate_area(Some(Area::new(50, 50, 59, 59)));
        scene.retract_damage(2);
        assert_eq!(scene.pending_damage(), 0);
    }
}
