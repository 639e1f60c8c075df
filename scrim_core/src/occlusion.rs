// Copyright 2026 the Scrim Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Occlusion search: finding where painting of a damaged area can start.
//!
//! Everything behind a node that paints every pixel of an area opaquely is
//! invisible inside that area, so the painter may start at that node instead
//! of at the screen root. [`find_top_opaque`] finds the deepest such node.
//! It only ever narrows work; the ascend-and-redraw step in
//! [`paint`](crate::paint) restores anything in front of the result.

use alloc::vec::Vec;

use crate::area::Area;
use crate::buffer::OPA_COVER;
use crate::scene::{INVALID, NodeId, Scene};

/// Finds the deepest, frontmost node under `start` that opaquely covers
/// `area`.
///
/// The search is depth first with children visited before their parent, and
/// siblings visited front to back. A node is only entered if it is not hidden
/// and its box contains `area`. A node matches when it is fully opaque and its
/// widget's [`cover_check`](crate::scene::Widget::cover_check) accepts the
/// area.
#[must_use]
pub fn find_top_opaque(scene: &Scene, area: Area, start: NodeId) -> Option<NodeId> {
    scene.validate(start);
    if !is_candidate(scene, start.idx, area) {
        return None;
    }

    // (node, next child to visit)
    let mut stack: Vec<(u32, u32)> = Vec::from([(start.idx, scene.first_child[start.idx as usize])]);
    while let Some(frame) = stack.last_mut() {
        let child = frame.1;
        if child != INVALID {
            frame.1 = scene.next_sibling[child as usize];
            if is_candidate(scene, child, area) {
                stack.push((child, scene.first_child[child as usize]));
            }
            continue;
        }

        let (node, _) = *frame;
        stack.pop();
        if covers(scene, node, area) {
            return Some(scene.id_at(node));
        }
    }
    None
}

fn is_candidate(scene: &Scene, idx: u32, area: Area) -> bool {
    !scene.flags[idx as usize].hidden && scene.coords[idx as usize].contains(&area)
}

fn covers(scene: &Scene, idx: u32, area: Area) -> bool {
    scene.opa[idx as usize] == OPA_COVER
        && scene.widget[idx as usize].cover_check(scene.coords[idx as usize], area)
}

#[cfg(test)]
mod tests {
    use alloc::boxed::Box;

    use crate::buffer::Color;
    use crate::config::RefreshConfig;
    use crate::scene::{Container, Fill};

    use super::*;

    fn scene() -> Scene {
        Scene::new(&RefreshConfig::default()).unwrap()
    }

    fn opaque() -> Box<Fill> {
        Box::new(Fill::new(Color::BLACK))
    }

    #[test]
    fn deepest_covering_child_wins() {
        let mut scene = scene();
        let screen = scene.active_screen();
        let s = scene.create_node(screen, Area::new(0, 0, 100, 100), opaque());
        let c = scene.create_node(s, Area::new(10, 10, 60, 60), opaque());
        let d = Area::new(10, 10, 60, 60);

        assert_eq!(find_top_opaque(&scene, d, screen), Some(c));
        assert_ne!(find_top_opaque(&scene, d, screen), Some(s));
    }

    #[test]
    fn frontmost_sibling_wins() {
        let mut scene = scene();
        let screen = scene.active_screen();
        let back = scene.create_node(screen, Area::new(0, 0, 99, 99), opaque());
        let front = scene.create_node(screen, Area::new(0, 0, 99, 99), opaque());
        let area = Area::new(5, 5, 20, 20);
        assert_eq!(find_top_opaque(&scene, area, screen), Some(front));

        scene.move_foreground(back);
        assert_eq!(find_top_opaque(&scene, area, screen), Some(back));
    }

    #[test]
    fn non_covering_widget_falls_back_to_parent() {
        let mut scene = scene();
        let screen = scene.active_screen();
        let _group = scene.create_node(screen, Area::new(0, 0, 99, 99), Box::new(Container));
        let area = Area::new(5, 5, 20, 20);
        // The white screen fill covers everything.
        assert_eq!(find_top_opaque(&scene, area, screen), Some(screen));
    }

    #[test]
    fn hidden_and_translucent_nodes_are_skipped() {
        let mut scene = scene();
        let screen = scene.active_screen();
        let hidden = scene.create_node(screen, Area::new(0, 0, 99, 99), opaque());
        let faded = scene.create_node(screen, Area::new(0, 0, 99, 99), opaque());
        scene.set_hidden(hidden, true);
        scene.set_opa(faded, 128);

        let area = Area::new(5, 5, 20, 20);
        assert_eq!(find_top_opaque(&scene, area, screen), Some(screen));
    }

    #[test]
    fn translucent_colour_does_not_occlude() {
        let mut scene = scene();
        let screen = scene.active_screen();
        let back = scene.create_node(screen, Area::new(0, 0, 99, 99), opaque());
        scene.create_node(
            screen,
            Area::new(0, 0, 99, 99),
            Box::new(Fill::new(Color(0x40FF_FFFF))),
        );

        let area = Area::new(5, 5, 20, 20);
        assert_eq!(find_top_opaque(&scene, area, screen), Some(back));
    }

    #[test]
    fn partial_cover_is_not_a_candidate() {
        let mut scene = scene();
        let screen = scene.active_screen();
        let _small = scene.create_node(screen, Area::new(0, 0, 9, 9), opaque());
        let area = Area::new(5, 5, 20, 20);
        assert_eq!(find_top_opaque(&scene, area, screen), Some(screen));
        assert_eq!(
            find_top_opaque(&scene, Area::new(400, 0, 410, 10), screen),
            None
        );
    }

    #[test]
    fn result_is_visible_and_contains_area() {
        let mut scene = scene();
        let screen = scene.active_screen();
        let a = scene.create_node(screen, Area::new(0, 0, 199, 199), opaque());
        let b = scene.create_node(a, Area::new(20, 20, 120, 120), opaque());
        let _c = scene.create_node(b, Area::new(30, 30, 40, 40), opaque());
        scene.set_hidden(b, true);

        for area in [
            Area::new(0, 0, 5, 5),
            Area::new(25, 25, 35, 35),
            Area::new(31, 31, 39, 39),
            Area::new(150, 150, 300, 230),
        ] {
            if let Some(n) = find_top_opaque(&scene, area, screen) {
                assert!(!scene.is_hidden(n));
                assert!(scene.coords(n).contains(&area));
            }
        }
        assert_eq!(find_top_opaque(&scene, Area::new(31, 31, 39, 39), screen), Some(a));
    }
}
