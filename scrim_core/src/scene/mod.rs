// Copyright 2026 the Scrim Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Retained scene tree.
//!
//! A *node* is a rectangle on the display with a [`Widget`] that knows how to
//! paint it. Each node has:
//!
//! - An identity ([`NodeId`]), a generational handle that becomes stale when
//!   the node is deleted.
//! - Topology: parent and sibling links forming an ordered tree. The head of
//!   each child list is the frontmost child.
//! - Properties: absolute [`coords`](Scene::coords), an
//!   [`ext_size`](Scene::ext_size) the node may paint beyond its box,
//!   [`opacity`](Scene::opa), and a [`hidden`](Scene::is_hidden) flag.
//!
//! Roots are either *screens* (one of which is active) or one of the two
//! overlay layers that are composited above every screen.
//!
//! # Damage
//!
//! Mutators queue the visible area they affect, before and after the change,
//! on the scene's [`InvalidationQueue`](crate::queue::InvalidationQueue). See
//! [`Scene::invalidate`] for the visibility rules.

mod damage;
mod id;
mod store;
mod traverse;
mod widget;

pub use id::{INVALID, NodeId};
pub use store::{NodeFlags, Scene};
pub use traverse::{Ancestors, Children, ChildrenBackToFront};
pub use widget::{Container, DrawContext, Fill, Frame, Widget};
