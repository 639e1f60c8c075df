// Copyright 2026 the Scrim Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The invalidation queue and its coalescing pass.
//!
//! [`InvalidationQueue`] collects damage rectangles between refresh cycles. It
//! never grows past the capacity chosen at start-up: when an insertion would
//! overflow it, the queue collapses to a single entry covering the whole
//! display. A redraw request is therefore never dropped, only widened.
//!
//! At the start of a cycle the renderer swaps the queue's entries into its own
//! working set, so damage posted while drawing lands in a fresh queue for the
//! next cycle. [`coalesce`] then merges overlapping entries in that working
//! set when the merged rectangle is cheaper to redraw than the two apart.

use alloc::vec::Vec;

use crate::area::Area;

/// A display-controller hook that widens a damage rectangle in place, e.g. to
/// satisfy aligned-write requirements.
pub type RoundHook = fn(&mut Area);

/// One entry of the invalidation queue.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct DamageRect {
    /// The damaged area, clipped to the display.
    pub area: Area,
    /// Set when the entry was absorbed into another one by [`coalesce`].
    /// Joined entries are skipped when drawing.
    pub joined: bool,
}

impl DamageRect {
    /// Creates a non-joined entry.
    #[inline]
    #[must_use]
    pub const fn new(area: Area) -> Self {
        Self {
            area,
            joined: false,
        }
    }
}

/// Fixed-capacity FIFO of damage rectangles for one display.
#[derive(Debug)]
pub struct InvalidationQueue {
    bounds: Area,
    capacity: usize,
    entries: Vec<DamageRect>,
    round: Option<RoundHook>,
    overflows: u32,
}

impl InvalidationQueue {
    /// Creates an empty queue for a display with the given bounds.
    ///
    /// Storage for `capacity` entries is allocated here and never grows.
    #[must_use]
    pub fn new(bounds: Area, capacity: usize) -> Self {
        Self {
            bounds,
            capacity,
            entries: Vec::with_capacity(capacity),
            round: None,
            overflows: 0,
        }
    }

    /// Returns the display bounds every entry is clipped to.
    #[inline]
    #[must_use]
    pub fn bounds(&self) -> Area {
        self.bounds
    }

    /// Returns the maximum number of entries.
    #[inline]
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Returns the number of entries, joined or not.
    #[inline]
    #[must_use]
    pub fn count(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if no damage is queued.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the queued entries in submission order.
    #[inline]
    #[must_use]
    pub fn entries(&self) -> &[DamageRect] {
        &self.entries
    }

    /// Installs or removes the display-controller rounding hook.
    pub fn set_round_hook(&mut self, hook: Option<RoundHook>) {
        self.round = hook;
    }

    /// Returns the installed rounding hook.
    #[inline]
    #[must_use]
    pub fn round_hook(&self) -> Option<RoundHook> {
        self.round
    }

    /// Returns how many times the queue collapsed to a full-display entry
    /// since the renderer last took its entries.
    #[inline]
    #[must_use]
    pub fn overflows(&self) -> u32 {
        self.overflows
    }

    /// Queues `area` for redraw.
    ///
    /// The area is clipped to the display and passed through the rounding
    /// hook, then clipped again since rounding may push it past an edge. It is
    /// dropped if nothing is left after clipping or if an existing entry
    /// already contains it. If the queue is full, it is reset to a single
    /// entry covering the whole display.
    pub fn submit(&mut self, area: Area) {
        let Some(mut area) = area.intersect(&self.bounds) else {
            return;
        };
        if let Some(round) = self.round {
            round(&mut area);
            let Some(rounded) = area.intersect(&self.bounds) else {
                return;
            };
            area = rounded;
        }

        if self.entries.iter().any(|e| e.area.contains(&area)) {
            return;
        }

        if self.entries.len() >= self.capacity {
            self.entries.clear();
            self.entries.push(DamageRect::new(self.bounds));
            self.overflows = self.overflows.saturating_add(1);
            return;
        }
        self.entries.push(DamageRect::new(area));
    }

    /// Removes every entry.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Removes the `count` most recently submitted entries, or all of them if
    /// fewer remain.
    ///
    /// A producer that speculatively invalidated before a mutation can use
    /// this to cancel the damage when the mutation turns out to be a no-op.
    pub fn retract(&mut self, count: usize) {
        let keep = self.entries.len().saturating_sub(count);
        self.entries.truncate(keep);
    }

    /// Merges overlapping entries in place (see [`coalesce`]).
    pub fn coalesce(&mut self) {
        coalesce(&mut self.entries);
    }

    /// Moves the queued entries into `working`, leaving this queue empty.
    ///
    /// `working` is cleared first. The two allocations are swapped, so neither
    /// side reallocates.
    pub(crate) fn take_into(&mut self, working: &mut Vec<DamageRect>) {
        working.clear();
        core::mem::swap(&mut self.entries, working);
        self.overflows = 0;
    }
}

/// Merges overlapping damage rectangles when doing so shrinks the total
/// redraw area.
///
/// For each non-joined entry `i` (ascending), every other non-joined entry
/// `j` (ascending) that overlaps it is absorbed when the area of their union
/// is strictly smaller than the sum of their areas: `i` grows to the union and
/// `j` is marked [`joined`](DamageRect::joined). Joined entries never take
/// part again in the same pass.
pub fn coalesce(entries: &mut [DamageRect]) {
    for i in 0..entries.len() {
        if entries[i].joined {
            continue;
        }
        for j in 0..entries.len() {
            if j == i || entries[j].joined {
                continue;
            }
            let into = entries[i].area;
            let from = entries[j].area;
            if !into.overlaps(&from) {
                continue;
            }
            let union = into.union(&from);
            if u64::from(union.size()) < u64::from(into.size()) + u64::from(from.size()) {
                entries[i].area = union;
                entries[j].joined = true;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec;

    use super::*;

    fn queue(capacity: usize) -> InvalidationQueue {
        InvalidationQueue::new(Area::new(0, 0, 319, 239), capacity)
    }

    fn live(entries: &[DamageRect]) -> Vec<Area> {
        entries.iter().filter(|e| !e.joined).map(|e| e.area).collect()
    }

    #[test]
    fn submit_clips_to_display() {
        let mut q = queue(8);
        q.submit(Area::new(-10, -10, 20, 20));
        q.submit(Area::new(400, 0, 500, 10));
        assert_eq!(q.count(), 1);
        assert_eq!(q.entries()[0].area, Area::new(0, 0, 20, 20));
    }

    #[test]
    fn contained_area_is_a_no_op() {
        let mut q = queue(8);
        q.submit(Area::new(10, 10, 100, 100));
        q.submit(Area::new(20, 20, 50, 50));
        q.submit(Area::new(10, 10, 100, 100));
        assert_eq!(q.count(), 1);
    }

    #[test]
    fn overflow_collapses_to_full_display() {
        let mut q = queue(4);
        for i in 0..5 {
            q.submit(Area::new(i * 20, 0, i * 20 + 9, 9));
        }
        assert_eq!(q.count(), 1);
        assert_eq!(q.entries()[0], DamageRect::new(Area::new(0, 0, 319, 239)));
        assert_eq!(q.overflows(), 1);

        // Everything is now contained in the single entry.
        q.submit(Area::new(5, 5, 6, 6));
        assert_eq!(q.count(), 1);
    }

    #[test]
    fn retract_removes_newest() {
        let mut q = queue(8);
        q.submit(Area::new(0, 0, 9, 9));
        q.submit(Area::new(20, 0, 29, 9));
        q.submit(Area::new(40, 0, 49, 9));
        q.retract(2);
        assert_eq!(q.count(), 1);
        assert_eq!(q.entries()[0].area, Area::new(0, 0, 9, 9));

        q.retract(5);
        assert!(q.is_empty());
    }

    #[test]
    fn round_hook_applies_before_dedup() {
        fn align_to_8(area: &mut Area) {
            area.x1 &= !7;
            area.x2 |= 7;
        }
        let mut q = queue(8);
        q.set_round_hook(Some(align_to_8));
        q.submit(Area::new(3, 0, 9, 4));
        assert_eq!(q.entries()[0].area, Area::new(0, 0, 15, 4));
        // Rounds to the same area, so it is contained.
        q.submit(Area::new(8, 0, 12, 4));
        assert_eq!(q.count(), 1);
    }

    #[test]
    fn rounded_area_stays_on_the_display() {
        fn align_to_8(area: &mut Area) {
            area.x1 &= !7;
            area.x2 |= 7;
        }
        let mut q = InvalidationQueue::new(Area::new(0, 0, 99, 99), 8);
        q.set_round_hook(Some(align_to_8));
        q.submit(Area::new(90, 10, 99, 20));
        assert_eq!(q.entries()[0].area, Area::new(88, 10, 99, 20));
    }

    #[test]
    fn coalesce_merges_when_cheaper() {
        let mut entries = vec![
            DamageRect::new(Area::new(10, 10, 50, 50)),
            DamageRect::new(Area::new(15, 15, 55, 55)),
        ];
        coalesce(&mut entries);
        assert_eq!(live(&entries), vec![Area::new(10, 10, 55, 55)]);
        assert!(entries[1].joined);
    }

    #[test]
    fn coalesce_keeps_costly_unions_apart() {
        let mut entries = vec![
            DamageRect::new(Area::new(10, 10, 50, 50)),
            DamageRect::new(Area::new(40, 40, 80, 80)),
        ];
        coalesce(&mut entries);
        assert!(!entries[0].joined);
        assert!(!entries[1].joined);
        assert_eq!(entries[0].area, Area::new(10, 10, 50, 50));
    }

    #[test]
    fn coalesce_ignores_adjacent_areas() {
        let mut entries = vec![
            DamageRect::new(Area::new(0, 0, 9, 9)),
            DamageRect::new(Area::new(10, 0, 19, 9)),
        ];
        coalesce(&mut entries);
        assert_eq!(live(&entries).len(), 2);
    }

    #[test]
    fn coalesce_chains_through_grown_entry() {
        // The third rectangle is too costly to merge with the first alone, but
        // joins once the first has absorbed the second.
        let mut entries = vec![
            DamageRect::new(Area::new(0, 0, 20, 20)),
            DamageRect::new(Area::new(2, 2, 24, 24)),
            DamageRect::new(Area::new(0, 20, 24, 30)),
        ];
        coalesce(&mut entries);
        assert_eq!(live(&entries), vec![Area::new(0, 0, 24, 30)]);
        assert!(entries[1].joined && entries[2].joined);
    }

    #[test]
    fn take_into_leaves_queue_empty() {
        let mut q = queue(4);
        q.submit(Area::new(0, 0, 9, 9));
        let mut working = vec![DamageRect::new(Area::new(1, 1, 1, 1))];
        q.take_into(&mut working);
        assert!(q.is_empty());
        assert_eq!(working, vec![DamageRect::new(Area::new(0, 0, 9, 9))]);
    }
}
