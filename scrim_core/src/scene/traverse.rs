// Copyright 2026 the Scrim Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tree traversal utilities.

use super::id::{INVALID, NodeId};
use super::store::Scene;

/// An iterator over the direct children of a node, frontmost first.
///
/// Created by [`Scene::children`].
#[derive(Debug)]
pub struct Children<'a> {
    scene: &'a Scene,
    current: u32,
}

impl<'a> Children<'a> {
    pub(crate) fn new(scene: &'a Scene, first: u32) -> Self {
        Self {
            scene,
            current: first,
        }
    }
}

impl Iterator for Children<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        if self.current == INVALID {
            return None;
        }
        let idx = self.current;
        self.current = self.scene.next_sibling[idx as usize];
        Some(self.scene.id_at(idx))
    }
}

/// An iterator over the direct children of a node, backmost first.
///
/// This is painting order. Created by [`Scene::children_back_to_front`].
#[derive(Debug)]
pub struct ChildrenBackToFront<'a> {
    scene: &'a Scene,
    current: u32,
}

impl<'a> ChildrenBackToFront<'a> {
    pub(crate) fn new(scene: &'a Scene, last: u32) -> Self {
        Self {
            scene,
            current: last,
        }
    }
}

impl Iterator for ChildrenBackToFront<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        if self.current == INVALID {
            return None;
        }
        let idx = self.current;
        self.current = self.scene.prev_sibling[idx as usize];
        Some(self.scene.id_at(idx))
    }
}

/// An iterator over the ancestors of a node, nearest first.
///
/// Created by [`Scene::ancestors`]. The node itself is not included.
#[derive(Debug)]
pub struct Ancestors<'a> {
    scene: &'a Scene,
    current: u32,
}

impl<'a> Ancestors<'a> {
    pub(crate) fn new(scene: &'a Scene, first: u32) -> Self {
        Self {
            scene,
            current: first,
        }
    }
}

impl Iterator for Ancestors<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        if self.current == INVALID {
            return None;
        }
        let idx = self.current;
        self.current = self.scene.parent[idx as usize];
        Some(self.scene.id_at(idx))
    }
}
