// Copyright 2026 the Scrim Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Back-to-front painting of a subtree into the draw buffer.
//!
//! [`Painter::paint_node`] draws one subtree clipped to a mask:
//!
//! ```text
//!   draw_main(node)              if not fully transparent
//!   for child in back..=front    clipped to the node's own box
//!       paint_node(child)
//!   draw_post(node)              if not fully transparent
//! ```
//!
//! A node may paint up to `ext_size` pixels outside its box, but its children
//! never can. The walk uses an explicit stack, so tree depth does not consume
//! call stack.
//!
//! [`Painter::paint_from`] starts at the node found by
//! [`find_top_opaque`](crate::occlusion::find_top_opaque) and then repaints
//! every sibling in front of it at each ancestor level, so skipping what lies
//! behind never loses what lies in front.

use alloc::vec::Vec;

use crate::area::Area;
use crate::buffer::{DrawBuffer, OPA_TRANSP};
use crate::scene::{DrawContext, INVALID, NodeId, Scene};

/// One level of the paint walk.
#[derive(Clone, Copy, Debug)]
struct Frame {
    node: u32,
    /// Extended box clipped to the incoming mask; handed to the widget.
    ext_mask: Area,
    /// Own box clipped to the incoming mask; handed to children.
    child_mask: Area,
    /// Next child to paint, walking towards the front.
    next: u32,
}

/// Paints scene nodes into a draw buffer.
pub struct Painter<'a> {
    scene: &'a Scene,
    screen: NodeId,
    buffer: &'a mut DrawBuffer,
    requests: &'a mut Vec<Area>,
    stack: Vec<Frame>,
}

impl core::fmt::Debug for Painter<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Painter")
            .field("screen", &self.screen)
            .field("buffer", &self.buffer)
            .finish_non_exhaustive()
    }
}

impl<'a> Painter<'a> {
    /// Creates a painter for a refresh of `screen`.
    ///
    /// Damage requested by widgets while drawing is appended to `requests`.
    pub fn new(
        scene: &'a Scene,
        screen: NodeId,
        buffer: &'a mut DrawBuffer,
        requests: &'a mut Vec<Area>,
    ) -> Self {
        Self {
            scene,
            screen,
            buffer,
            requests,
            stack: Vec::new(),
        }
    }

    /// Paints `node` and its subtree, clipped to `mask`.
    ///
    /// Hidden nodes and nodes whose extended box misses `mask` paint nothing.
    pub fn paint_node(&mut self, node: NodeId, mask: Area) {
        self.scene.validate(node);
        self.stack.clear();
        if let Some(frame) = self.enter(node.idx, mask) {
            self.stack.push(frame);
        }

        while let Some(top) = self.stack.last_mut() {
            let child = top.next;
            if child != INVALID {
                top.next = self.scene.prev_sibling[child as usize];
                let child_mask = top.child_mask;
                if let Some(frame) = self.enter(child, child_mask) {
                    self.stack.push(frame);
                }
                continue;
            }

            let done = *top;
            self.stack.pop();
            if self.scene.opa[done.node as usize] != OPA_TRANSP {
                self.draw_post(done.node, done.ext_mask);
            }
        }
    }

    /// Paints starting at `top`, then everything that may lie in front of it.
    ///
    /// After the subtree of `top`, each ancestor level repaints the siblings
    /// in front of the path to `top`, back to front. Finally every ancestor
    /// gets its [`draw_post`](crate::scene::Widget::draw_post), nearest first.
    pub fn paint_from(&mut self, top: NodeId, mask: Area) {
        self.paint_node(top, mask);

        let mut border = top.idx;
        let mut parent = self.scene.parent[border as usize];
        while parent != INVALID {
            let mut sibling = self.scene.prev_sibling[border as usize];
            while sibling != INVALID {
                self.paint_node(self.scene.id_at(sibling), mask);
                sibling = self.scene.prev_sibling[sibling as usize];
            }
            border = parent;
            parent = self.scene.parent[parent as usize];
        }

        let mut ancestor = self.scene.parent[top.idx as usize];
        while ancestor != INVALID {
            if self.scene.opa[ancestor as usize] != OPA_TRANSP {
                if let Some(ext_mask) = self.scene.extended_at(ancestor).intersect(&mask) {
                    self.draw_post(ancestor, ext_mask);
                }
            }
            ancestor = self.scene.parent[ancestor as usize];
        }
    }

    /// Draws the node body and builds its frame, or returns `None` if the
    /// node contributes nothing inside `mask`.
    fn enter(&mut self, idx: u32, mask: Area) -> Option<Frame> {
        if self.scene.flags[idx as usize].hidden {
            return None;
        }
        let ext_mask = self.scene.extended_at(idx).intersect(&mask)?;
        if self.scene.opa[idx as usize] != OPA_TRANSP {
            self.draw_main(idx, ext_mask);
        }

        let child_mask = self.scene.coords[idx as usize].intersect(&mask);
        Some(Frame {
            node: idx,
            ext_mask,
            child_mask: child_mask.unwrap_or(ext_mask),
            next: match child_mask {
                Some(_) => self.scene.last_child[idx as usize],
                None => INVALID,
            },
        })
    }

    fn draw_main(&mut self, idx: u32, mask: Area) {
        let scene = self.scene;
        let mut ctx = DrawContext::new(
            scene,
            scene.id_at(idx),
            self.screen,
            &mut *self.buffer,
            &mut *self.requests,
        );
        scene.widget[idx as usize].draw_main(&mut ctx, mask);
    }

    fn draw_post(&mut self, idx: u32, mask: Area) {
        let scene = self.scene;
        let mut ctx = DrawContext::new(
            scene,
            scene.id_at(idx),
            self.screen,
            &mut *self.buffer,
            &mut *self.requests,
        );
        scene.widget[idx as usize].draw_post(&mut ctx, mask);
    }
}
