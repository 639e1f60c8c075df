// Copyright 2026 the Scrim Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Struct-of-arrays node storage with allocation, topology, and property
//! management.

use alloc::boxed::Box;
use alloc::vec::Vec;

use crate::area::Area;
use crate::buffer::{Color, OPA_COVER};
use crate::config::{ConfigError, RefreshConfig};
use crate::queue::InvalidationQueue;

use super::id::{INVALID, NodeId};
use super::traverse::{Ancestors, Children, ChildrenBackToFront};
use super::widget::{Container, Fill, Widget};

/// Per-node boolean flags.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct NodeFlags {
    /// Whether the node (and its subtree) is hidden.
    pub hidden: bool,
}

/// The retained node tree of one display, plus its invalidation queue.
///
/// Nodes are addressed by [`NodeId`] handles and occupy a slot in parallel
/// arrays. Deleted nodes are recycled through a free list, and generation
/// counters make stale handles fail loudly.
///
/// Siblings form a doubly linked list through slot indices. The head of a
/// parent's list is its frontmost child; painting walks the list from the
/// tail.
///
/// Three roots exist from the start: the initial screen (active), and the
/// *top* and *system* overlay layers, which cover the whole display and are
/// composited above whichever screen is active.
pub struct Scene {
    // -- Topology --
    pub(crate) parent: Vec<u32>,
    pub(crate) first_child: Vec<u32>,
    pub(crate) last_child: Vec<u32>,
    pub(crate) next_sibling: Vec<u32>,
    pub(crate) prev_sibling: Vec<u32>,

    // -- Properties --
    pub(crate) coords: Vec<Area>,
    pub(crate) ext_size: Vec<u16>,
    pub(crate) opa: Vec<u8>,
    pub(crate) flags: Vec<NodeFlags>,
    pub(crate) widget: Vec<Box<dyn Widget>>,

    // -- Allocation --
    pub(crate) generation: Vec<u32>,
    pub(crate) free_list: Vec<u32>,
    pub(crate) len: u32,

    // -- Screens --
    pub(crate) bounds: Area,
    pub(crate) active: u32,
    pub(crate) top_layer: u32,
    pub(crate) sys_layer: u32,

    // -- Damage --
    pub(crate) queue: InvalidationQueue,
}

impl core::fmt::Debug for Scene {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Scene")
            .field("bounds", &self.bounds)
            .field("nodes", &(self.len as usize - self.free_list.len()))
            .field("active", &self.active)
            .field("queue", &self.queue)
            .finish_non_exhaustive()
    }
}

impl Scene {
    /// Creates a scene for the configured display.
    ///
    /// The initial screen is an opaque white [`Fill`]; both overlay layers are
    /// empty [`Container`]s. The initial screen is queued for a full redraw.
    pub fn new(config: &RefreshConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let bounds = config.bounds();
        let mut scene = Self {
            parent: Vec::new(),
            first_child: Vec::new(),
            last_child: Vec::new(),
            next_sibling: Vec::new(),
            prev_sibling: Vec::new(),
            coords: Vec::new(),
            ext_size: Vec::new(),
            opa: Vec::new(),
            flags: Vec::new(),
            widget: Vec::new(),
            generation: Vec::new(),
            free_list: Vec::new(),
            len: 0,
            bounds,
            active: INVALID,
            top_layer: INVALID,
            sys_layer: INVALID,
            queue: InvalidationQueue::new(bounds, config.inv_capacity),
        };

        scene.active = scene.alloc(bounds, Box::new(Fill::new(Color::WHITE)));
        scene.top_layer = scene.alloc(bounds, Box::new(Container));
        scene.sys_layer = scene.alloc(bounds, Box::new(Container));
        let screen = scene.id_at(scene.active);
        scene.invalidate(screen);
        Ok(scene)
    }

    // -- Screens --

    /// Returns the full display bounds.
    #[inline]
    #[must_use]
    pub fn bounds(&self) -> Area {
        self.bounds
    }

    /// Returns the active screen.
    #[must_use]
    pub fn active_screen(&self) -> NodeId {
        self.id_at(self.active)
    }

    /// Returns the top overlay layer.
    #[must_use]
    pub fn top_layer(&self) -> NodeId {
        self.id_at(self.top_layer)
    }

    /// Returns the system overlay layer, composited above the top layer.
    #[must_use]
    pub fn sys_layer(&self) -> NodeId {
        self.id_at(self.sys_layer)
    }

    /// Creates a new, inactive screen covering the whole display.
    pub fn create_screen(&mut self, widget: Box<dyn Widget>) -> NodeId {
        let idx = self.alloc(self.bounds, widget);
        self.id_at(idx)
    }

    /// Makes `screen` the active screen and queues it for a full redraw.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale, if `screen` has a parent, or if it is an
    /// overlay layer.
    pub fn load_screen(&mut self, screen: NodeId) {
        self.validate(screen);
        let idx = screen.idx;
        assert!(
            self.parent[idx as usize] == INVALID,
            "only a root node can be loaded as a screen"
        );
        assert!(
            !self.is_overlay(idx),
            "an overlay layer cannot be loaded as a screen"
        );
        self.active = idx;
        self.invalidate(screen);
    }

    /// Returns the root ancestor of `id` (the screen or layer it belongs to).
    #[must_use]
    pub fn screen_of(&self, id: NodeId) -> NodeId {
        self.validate(id);
        self.id_at(self.root_at(id.idx))
    }

    // -- Allocation API --

    /// Creates a node as the frontmost child of `parent` and queues its area
    /// for redraw.
    ///
    /// The node starts fully opaque, visible, and with no extra size.
    ///
    /// # Panics
    ///
    /// Panics if `parent` is stale.
    pub fn create_node(&mut self, parent: NodeId, coords: Area, widget: Box<dyn Widget>) -> NodeId {
        self.validate(parent);
        let idx = self.alloc(coords, widget);
        self.link_front(parent.idx, idx);
        let id = self.id_at(idx);
        self.invalidate(id);
        id
    }

    /// Deletes a node and its whole subtree, queueing the area it covered.
    ///
    /// Handles to any node of the subtree become stale.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale, or if `id` is the active screen or an
    /// overlay layer.
    pub fn delete(&mut self, id: NodeId) {
        self.validate(id);
        let idx = id.idx;
        assert!(
            idx != self.active && !self.is_overlay(idx),
            "cannot delete the active screen or an overlay layer"
        );

        self.invalidate(id);
        if self.parent[idx as usize] != INVALID {
            self.unlink(idx);
        }

        let mut stack = Vec::from([idx]);
        while let Some(n) = stack.pop() {
            let mut child = self.first_child[n as usize];
            while child != INVALID {
                stack.push(child);
                child = self.next_sibling[child as usize];
            }
            self.free(n);
        }
    }

    /// Returns whether the given handle refers to a live node.
    #[must_use]
    pub fn is_alive(&self, id: NodeId) -> bool {
        (id.idx < self.len)
            && self.generation[id.idx as usize] == id.generation
            && !self.free_list.contains(&id.idx)
    }

    // -- Topology API --

    /// Returns the parent of a node, if any.
    #[must_use]
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.validate(id);
        let p = self.parent[id.idx as usize];
        (p != INVALID).then(|| self.id_at(p))
    }

    /// Returns an iterator over the direct children of a node, frontmost
    /// first.
    #[must_use]
    pub fn children(&self, id: NodeId) -> Children<'_> {
        self.validate(id);
        Children::new(self, self.first_child[id.idx as usize])
    }

    /// Returns an iterator over the direct children of a node in painting
    /// order, backmost first.
    #[must_use]
    pub fn children_back_to_front(&self, id: NodeId) -> ChildrenBackToFront<'_> {
        self.validate(id);
        ChildrenBackToFront::new(self, self.last_child[id.idx as usize])
    }

    /// Returns an iterator over the ancestors of a node, nearest first.
    #[must_use]
    pub fn ancestors(&self, id: NodeId) -> Ancestors<'_> {
        self.validate(id);
        Ancestors::new(self, self.parent[id.idx as usize])
    }

    /// Moves `id` to become the frontmost child of `new_parent`, keeping its
    /// absolute position. Both the old and new areas are queued.
    ///
    /// # Panics
    ///
    /// Panics if either handle is stale, if `id` is a root, or if
    /// `new_parent` lies inside the subtree of `id`.
    pub fn set_parent(&mut self, id: NodeId, new_parent: NodeId) {
        self.validate(id);
        self.validate(new_parent);
        let c = id.idx;
        assert!(
            self.parent[c as usize] != INVALID,
            "a root node cannot be reparented"
        );
        assert!(
            new_parent.idx != c && !self.ancestors(new_parent).any(|a| a.idx == c),
            "cannot move a node below itself"
        );

        self.invalidate(id);
        self.unlink(c);
        self.link_front(new_parent.idx, c);
        self.invalidate(id);
    }

    /// Moves a node to the head of its parent's child list (frontmost).
    pub fn move_foreground(&mut self, id: NodeId) {
        self.validate(id);
        let c = id.idx;
        let p = self.parent[c as usize];
        if p == INVALID || self.first_child[p as usize] == c {
            return;
        }
        self.unlink(c);
        self.link_front(p, c);
        self.invalidate(id);
    }

    /// Moves a node to the tail of its parent's child list (backmost).
    pub fn move_background(&mut self, id: NodeId) {
        self.validate(id);
        let c = id.idx;
        let p = self.parent[c as usize];
        if p == INVALID || self.last_child[p as usize] == c {
            return;
        }
        self.unlink(c);
        self.link_back(p, c);
        self.invalidate(id);
    }

    // -- Property getters --

    /// Returns the absolute box of a node.
    #[must_use]
    pub fn coords(&self, id: NodeId) -> Area {
        self.validate(id);
        self.coords[id.idx as usize]
    }

    /// Returns how far a node may paint outside its box.
    #[must_use]
    pub fn ext_size(&self, id: NodeId) -> u16 {
        self.validate(id);
        self.ext_size[id.idx as usize]
    }

    /// Returns the box grown by the node's extra size.
    #[must_use]
    pub fn extended_coords(&self, id: NodeId) -> Area {
        self.validate(id);
        self.extended_at(id.idx)
    }

    /// Returns the opacity of a node.
    #[must_use]
    pub fn opa(&self, id: NodeId) -> u8 {
        self.validate(id);
        self.opa[id.idx as usize]
    }

    /// Returns the flags of a node.
    #[must_use]
    pub fn flags(&self, id: NodeId) -> NodeFlags {
        self.validate(id);
        self.flags[id.idx as usize]
    }

    /// Returns whether the node's own hidden flag is set.
    #[must_use]
    pub fn is_hidden(&self, id: NodeId) -> bool {
        self.flags(id).hidden
    }

    /// Returns the widget of a node.
    #[must_use]
    pub fn widget(&self, id: NodeId) -> &dyn Widget {
        self.validate(id);
        &*self.widget[id.idx as usize]
    }

    // -- Mutation API (queues damage) --

    /// Moves the top-left corner of a node to `(x, y)`, carrying its subtree
    /// along. The areas before and after the move are both queued.
    pub fn set_pos(&mut self, id: NodeId, x: i32, y: i32) {
        self.validate(id);
        let old = self.coords[id.idx as usize];
        let (dx, dy) = (x - old.x1, y - old.y1);
        if dx == 0 && dy == 0 {
            return;
        }

        self.invalidate(id);
        let mut stack = Vec::from([id.idx]);
        while let Some(n) = stack.pop() {
            self.coords[n as usize] = self.coords[n as usize].translate(dx, dy);
            let mut child = self.first_child[n as usize];
            while child != INVALID {
                stack.push(child);
                child = self.next_sibling[child as usize];
            }
        }
        self.invalidate(id);
    }

    /// Resizes a node, keeping its top-left corner. Children keep their
    /// positions.
    pub fn set_size(&mut self, id: NodeId, width: i32, height: i32) {
        self.validate(id);
        let old = self.coords[id.idx as usize];
        self.set_coords(id, Area::from_origin_size(old.x1, old.y1, width, height));
    }

    /// Replaces the box of a single node. Children are not moved.
    pub fn set_coords(&mut self, id: NodeId, coords: Area) {
        self.validate(id);
        if self.coords[id.idx as usize] == coords {
            return;
        }
        self.invalidate(id);
        self.coords[id.idx as usize] = coords;
        self.invalidate(id);
    }

    /// Sets how many pixels a node may paint outside its box on every side.
    pub fn set_ext_size(&mut self, id: NodeId, ext_size: u16) {
        self.validate(id);
        if self.ext_size[id.idx as usize] == ext_size {
            return;
        }
        self.invalidate(id);
        self.ext_size[id.idx as usize] = ext_size;
        self.invalidate(id);
    }

    /// Hides or shows a node and its subtree.
    pub fn set_hidden(&mut self, id: NodeId, hidden: bool) {
        self.validate(id);
        if self.flags[id.idx as usize].hidden == hidden {
            return;
        }
        // A hidden node produces no damage, so invalidate while visible.
        if hidden {
            self.invalidate(id);
            self.flags[id.idx as usize].hidden = true;
        } else {
            self.flags[id.idx as usize].hidden = false;
            self.invalidate(id);
        }
    }

    /// Sets the opacity of a node.
    ///
    /// Only fully opaque nodes can hide what lies beneath them; fully
    /// transparent nodes skip their own drawing but still paint children.
    pub fn set_opa(&mut self, id: NodeId, opa: u8) {
        self.validate(id);
        if self.opa[id.idx as usize] == opa {
            return;
        }
        self.opa[id.idx as usize] = opa;
        self.invalidate(id);
    }

    /// Replaces the widget of a node.
    pub fn set_widget(&mut self, id: NodeId, widget: Box<dyn Widget>) {
        self.validate(id);
        self.widget[id.idx as usize] = widget;
        self.invalidate(id);
    }

    // -- Internal helpers --

    /// Builds a handle for a live slot.
    pub(crate) fn id_at(&self, idx: u32) -> NodeId {
        NodeId {
            idx,
            generation: self.generation[idx as usize],
        }
    }

    /// Panics if the handle is stale.
    pub(crate) fn validate(&self, id: NodeId) {
        assert!(
            id.idx < self.len && self.generation[id.idx as usize] == id.generation,
            "stale NodeId: {id:?} (current gen: {})",
            if id.idx < self.len {
                self.generation[id.idx as usize]
            } else {
                u32::MAX
            }
        );
    }

    pub(crate) fn extended_at(&self, idx: u32) -> Area {
        self.coords[idx as usize].grow(i32::from(self.ext_size[idx as usize]))
    }

    pub(crate) fn root_at(&self, mut idx: u32) -> u32 {
        while self.parent[idx as usize] != INVALID {
            idx = self.parent[idx as usize];
        }
        idx
    }

    pub(crate) fn is_overlay(&self, idx: u32) -> bool {
        idx == self.top_layer || idx == self.sys_layer
    }

    fn alloc(&mut self, coords: Area, widget: Box<dyn Widget>) -> u32 {
        if let Some(idx) = self.free_list.pop() {
            // Reuse a freed slot; its generation was bumped when freed.
            let i = idx as usize;
            self.parent[i] = INVALID;
            self.first_child[i] = INVALID;
            self.last_child[i] = INVALID;
            self.next_sibling[i] = INVALID;
            self.prev_sibling[i] = INVALID;
            self.coords[i] = coords;
            self.ext_size[i] = 0;
            self.opa[i] = OPA_COVER;
            self.flags[i] = NodeFlags::default();
            self.widget[i] = widget;
            idx
        } else {
            let idx = self.len;
            self.len += 1;
            self.parent.push(INVALID);
            self.first_child.push(INVALID);
            self.last_child.push(INVALID);
            self.next_sibling.push(INVALID);
            self.prev_sibling.push(INVALID);
            self.coords.push(coords);
            self.ext_size.push(0);
            self.opa.push(OPA_COVER);
            self.flags.push(NodeFlags::default());
            self.widget.push(widget);
            self.generation.push(0);
            idx
        }
    }

    fn free(&mut self, idx: u32) {
        let i = idx as usize;
        // Bump generation so old handles immediately fail validation.
        self.generation[i] += 1;
        self.parent[i] = INVALID;
        self.first_child[i] = INVALID;
        self.last_child[i] = INVALID;
        self.next_sibling[i] = INVALID;
        self.prev_sibling[i] = INVALID;
        self.widget[i] = Box::new(Container);
        self.free_list.push(idx);
    }

    /// Inserts `c` at the head of `p`'s child list.
    fn link_front(&mut self, p: u32, c: u32) {
        let head = self.first_child[p as usize];
        self.parent[c as usize] = p;
        self.prev_sibling[c as usize] = INVALID;
        self.next_sibling[c as usize] = head;
        if head == INVALID {
            self.last_child[p as usize] = c;
        } else {
            self.prev_sibling[head as usize] = c;
        }
        self.first_child[p as usize] = c;
    }

    /// Inserts `c` at the tail of `p`'s child list.
    fn link_back(&mut self, p: u32, c: u32) {
        let tail = self.last_child[p as usize];
        self.parent[c as usize] = p;
        self.next_sibling[c as usize] = INVALID;
        self.prev_sibling[c as usize] = tail;
        if tail == INVALID {
            self.first_child[p as usize] = c;
        } else {
            self.next_sibling[tail as usize] = c;
        }
        self.last_child[p as usize] = c;
    }

    /// Removes `idx` from its parent's child list.
    fn unlink(&mut self, idx: u32) {
        let p = self.parent[idx as usize];
        let prev = self.prev_sibling[idx as usize];
        let next = self.next_sibling[idx as usize];

        if prev == INVALID {
            self.first_child[p as usize] = next;
        } else {
            self.next_sibling[prev as usize] = next;
        }
        if next == INVALID {
            self.last_child[p as usize] = prev;
        } else {
            self.prev_sibling[next as usize] = prev;
        }

        self.parent[idx as usize] = INVALID;
        self.prev_sibling[idx as usize] = INVALID;
        self.next_sibling[idx as usize] = INVALID;
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec;

    use super::*;

    fn scene() -> Scene {
        Scene::new(&RefreshConfig::default()).unwrap()
    }

    fn fill() -> Box<dyn Widget> {
        Box::new(Fill::new(Color::BLACK))
    }

    #[test]
    fn new_scene_has_three_roots_and_full_damage() {
        let scene = scene();
        let screen = scene.active_screen();
        assert_eq!(scene.coords(screen), Area::new(0, 0, 319, 239));
        assert_eq!(scene.coords(scene.top_layer()), scene.bounds());
        assert_ne!(scene.top_layer(), scene.sys_layer());
        assert_eq!(scene.pending_damage(), 1);
        assert_eq!(scene.queue().entries()[0].area, scene.bounds());
    }

    #[test]
    fn new_nodes_are_frontmost() {
        let mut scene = scene();
        let screen = scene.active_screen();
        let a = scene.create_node(screen, Area::new(0, 0, 9, 9), fill());
        let b = scene.create_node(screen, Area::new(0, 0, 9, 9), fill());
        let c = scene.create_node(screen, Area::new(0, 0, 9, 9), fill());

        let front_to_back: Vec<_> = scene.children(screen).collect();
        assert_eq!(front_to_back, vec![c, b, a]);
        let back_to_front: Vec<_> = scene.children_back_to_front(screen).collect();
        assert_eq!(back_to_front, vec![a, b, c]);
        assert_eq!(scene.parent(a), Some(screen));
    }

    #[test]
    fn foreground_and_background_splice() {
        let mut scene = scene();
        let screen = scene.active_screen();
        let a = scene.create_node(screen, Area::new(0, 0, 9, 9), fill());
        let b = scene.create_node(screen, Area::new(0, 0, 9, 9), fill());
        let c = scene.create_node(screen, Area::new(0, 0, 9, 9), fill());

        scene.move_foreground(a);
        assert_eq!(scene.children(screen).collect::<Vec<_>>(), vec![a, c, b]);
        scene.move_background(c);
        assert_eq!(scene.children(screen).collect::<Vec<_>>(), vec![a, b, c]);
        assert_eq!(
            scene.children_back_to_front(screen).collect::<Vec<_>>(),
            vec![c, b, a]
        );
    }

    #[test]
    fn delete_frees_whole_subtree() {
        let mut scene = scene();
        let screen = scene.active_screen();
        let panel = scene.create_node(screen, Area::new(0, 0, 99, 99), fill());
        let child = scene.create_node(panel, Area::new(10, 10, 20, 20), fill());
        let grandchild = scene.create_node(child, Area::new(12, 12, 14, 14), fill());
        let sibling = scene.create_node(screen, Area::new(0, 0, 5, 5), fill());

        scene.delete(panel);
        assert!(!scene.is_alive(panel));
        assert!(!scene.is_alive(child));
        assert!(!scene.is_alive(grandchild));
        assert!(scene.is_alive(sibling));
        assert_eq!(scene.children(screen).collect::<Vec<_>>(), vec![sibling]);

        // Freed slots are reused with a new generation.
        let reused = scene.create_node(screen, Area::new(0, 0, 1, 1), fill());
        assert!(reused.index() <= grandchild.index().max(panel.index()));
        assert!(scene.is_alive(reused));
    }

    #[test]
    fn set_pos_moves_subtree() {
        let mut scene = scene();
        let screen = scene.active_screen();
        let panel = scene.create_node(screen, Area::new(10, 10, 59, 59), fill());
        let child = scene.create_node(panel, Area::new(20, 20, 29, 29), fill());

        scene.set_pos(panel, 100, 50);
        assert_eq!(scene.coords(panel), Area::new(100, 50, 149, 99));
        assert_eq!(scene.coords(child), Area::new(110, 60, 119, 69));
    }

    #[test]
    fn set_parent_keeps_absolute_position() {
        let mut scene = scene();
        let screen = scene.active_screen();
        let a = scene.create_node(screen, Area::new(0, 0, 49, 49), fill());
        let b = scene.create_node(screen, Area::new(60, 0, 99, 49), fill());
        let leaf = scene.create_node(a, Area::new(5, 5, 9, 9), fill());

        scene.set_parent(leaf, b);
        assert_eq!(scene.parent(leaf), Some(b));
        assert_eq!(scene.coords(leaf), Area::new(5, 5, 9, 9));
        assert!(scene.children(a).next().is_none());
    }

    #[test]
    fn screen_of_and_ancestors() {
        let mut scene = scene();
        let screen = scene.active_screen();
        let a = scene.create_node(screen, Area::new(0, 0, 49, 49), fill());
        let b = scene.create_node(a, Area::new(0, 0, 9, 9), fill());
        assert_eq!(scene.screen_of(b), screen);
        assert_eq!(scene.ancestors(b).collect::<Vec<_>>(), vec![a, screen]);

        let top_child = scene.create_node(scene.top_layer(), Area::new(0, 0, 9, 9), fill());
        assert_eq!(scene.screen_of(top_child), scene.top_layer());
    }

    #[test]
    fn load_screen_switches_active() {
        let mut scene = scene();
        let other = scene.create_screen(fill());
        scene.load_screen(other);
        assert_eq!(scene.active_screen(), other);
    }

    #[test]
    #[should_panic(expected = "cannot move a node below itself")]
    fn reparent_into_own_subtree_panics() {
        let mut scene = scene();
        let screen = scene.active_screen();
        let a = scene.create_node(screen, Area::new(0, 0, 49, 49), fill());
        let b = scene.create_node(a, Area::new(0, 0, 9, 9), fill());
        scene.set_parent(a, b);
    }

    #[test]
    #[should_panic(expected = "cannot delete the active screen or an overlay layer")]
    fn delete_active_screen_panics() {
        let mut scene = scene();
        let screen = scene.active_screen();
        scene.delete(screen);
    }

    #[test]
    #[should_panic(expected = "an overlay layer cannot be loaded as a screen")]
    fn load_overlay_panics() {
        let mut scene = scene();
        let top = scene.top_layer();
        scene.load_screen(top);
    }

    #[test]
    #[should_panic(expected = "stale NodeId")]
    fn deleted_handle_panics_on_coords() {
        let mut scene = scene();
        let screen = scene.active_screen();
        let id = scene.create_node(screen, Area::new(0, 0, 9, 9), fill());
        scene.delete(id);
        let _ = scene.coords(id);
    }
}
