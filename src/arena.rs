//! The arena owning every tower of a skiplist, and the splice algorithms
//! which relink the rings.
//!
//! Towers refer to each other by their slot index, so relinking a ring only
//! ever rewrites indices and never moves a payload. Vacated slots are reused,
//! and each slot carries a generation which is bumped whenever its tower
//! leaves, so that a cursor to a departed tower can be told apart from a
//! cursor to whichever tower later reuses the slot.

use crate::tower::{Link, SENTINEL, Tower, TowerId};

#[derive(Debug)]
struct Slot<V> {
    generation: u32,
    tower: Option<Tower<V>>,
}

#[derive(Debug)]
pub(crate) struct Arena<V> {
    slots: Vec<Slot<V>>,
    vacant: Vec<TowerId>,
}

// ///////////////////////////////////////////////
// Allocation
// ///////////////////////////////////////////////

impl<V> Arena<V> {
    /// Create an arena holding only the sentinel, of height `max_level`.
    pub fn new(max_level: usize) -> Self {
        Arena {
            slots: vec![Slot {
                generation: 0,
                tower: Some(Tower::sentinel(max_level)),
            }],
            vacant: Vec::new(),
        }
    }

    /// Move a tower into the arena, self-looped on its new slot.
    ///
    /// The tower is not reachable from any ring until it is spliced.
    pub fn insert(&mut self, mut tower: Tower<V>) -> TowerId {
        let id = if let Some(id) = self.vacant.pop() {
            id
        } else {
            self.slots.push(Slot {
                generation: 0,
                tower: None,
            });
            self.slots.len() - 1
        };
        tower.self_loop(id);
        self.slots[id].tower = Some(tower);
        id
    }

    /// Move a tower out of the arena.
    ///
    /// The tower must already be unlinked from every ring.
    pub fn remove(&mut self, id: TowerId) -> Tower<V> {
        debug_assert_ne!(id, SENTINEL, "the sentinel is never removed");
        let slot = &mut self.slots[id];
        let Some(mut tower) = slot.tower.take() else {
            unreachable!("tower {id} is not live");
        };
        debug_assert!(tower.is_self_looped(id), "tower {id} is still linked");
        tower.self_loop(id);
        slot.generation = slot.generation.wrapping_add(1);
        self.vacant.push(id);
        tower
    }

    /// Drop every tower except the sentinel, whose rings become empty.
    pub fn clear(&mut self) {
        for (id, slot) in self.slots.iter_mut().enumerate().skip(1) {
            if slot.tower.take().is_some() {
                slot.generation = slot.generation.wrapping_add(1);
                self.vacant.push(id);
            }
        }
        self.tower_mut(SENTINEL).self_loop(SENTINEL);
    }

    /// The generation of a live slot, or `None` if the slot is vacant.
    pub fn generation(&self, id: TowerId) -> Option<u32> {
        self.slots
            .get(id)
            .and_then(|slot| slot.tower.as_ref().map(|_| slot.generation))
    }

    #[inline]
    pub fn tower(&self, id: TowerId) -> &Tower<V> {
        match self.slots[id].tower.as_ref() {
            Some(tower) => tower,
            None => unreachable!("tower {id} is not live"),
        }
    }

    #[inline]
    fn tower_mut(&mut self, id: TowerId) -> &mut Tower<V> {
        match self.slots[id].tower.as_mut() {
            Some(tower) => tower,
            None => unreachable!("tower {id} is not live"),
        }
    }

    /// The value held by a tower other than the sentinel.
    #[inline]
    pub fn value(&self, id: TowerId) -> &V {
        match self.tower(id).value() {
            Some(value) => value,
            None => unreachable!("the sentinel holds no value"),
        }
    }
}

// ///////////////////////////////////////////////
// Navigation
// ///////////////////////////////////////////////

impl<V> Arena<V> {
    /// The height of the sentinel, which is the height of the tallest tower
    /// the arena can link.
    #[inline]
    pub fn max_level(&self) -> usize {
        self.height(SENTINEL)
    }

    #[inline]
    pub fn height(&self, id: TowerId) -> usize {
        self.tower(id).height()
    }

    #[inline]
    pub fn next(&self, id: TowerId, level: usize) -> TowerId {
        self.tower(id).link(level).next
    }

    #[inline]
    pub fn prev(&self, id: TowerId, level: usize) -> TowerId {
        self.tower(id).link(level).prev
    }

    /// The neighbour reached through the topmost level of the tower.
    #[inline]
    pub fn top_next(&self, id: TowerId) -> TowerId {
        self.next(id, self.height(id) - 1)
    }

    /// The neighbour reached backwards through the topmost level of the
    /// tower.
    #[inline]
    pub fn top_prev(&self, id: TowerId) -> TowerId {
        self.prev(id, self.height(id) - 1)
    }

    /// Height of the tallest linked tower, or 0 when only the sentinel is
    /// left.
    pub fn tallest(&self) -> usize {
        (0..self.max_level())
            .rev()
            .find(|&level| self.next(SENTINEL, level) != SENTINEL)
            .map_or(0, |level| level + 1)
    }
}

// ///////////////////////////////////////////////
// Splicing
// ///////////////////////////////////////////////

impl<V> Arena<V> {
    /// Make `right` follow `left` on `level`.
    #[inline]
    fn join(&mut self, left: TowerId, level: usize, right: TowerId) {
        self.tower_mut(left).link_mut(level).next = right;
        self.tower_mut(right).link_mut(level).prev = left;
    }

    /// Link the detached tower `id` immediately before `pos` on level 0, and
    /// into the ring of every other level it owns.
    ///
    /// Whenever the height of `pos` is exhausted, `pos` jumps forward through
    /// its topmost level to the next tower tall enough to carry on. The
    /// sentinel is the tallest tower, so the jump always terminates.
    pub fn splice_before(&mut self, mut pos: TowerId, id: TowerId) {
        let height = self.height(id);
        debug_assert!(height <= self.max_level());
        let mut pos_height = self.height(pos);
        for level in 0..height {
            while level >= pos_height {
                pos = self.top_next(pos);
                pos_height = self.height(pos);
            }
            let before = self.prev(pos, level);
            self.join(before, level, id);
            self.join(id, level, pos);
        }
    }

    /// Unlink `id` from every level it owns and self-loop it.
    pub fn unlink(&mut self, id: TowerId) {
        for level in 0..self.height(id) {
            let Link { prev, next } = self.tower(id).link(level);
            self.join(prev, level, next);
        }
        self.tower_mut(id).self_loop(id);
    }

    /// Unlink the contiguous run `first..=last` from every level.
    ///
    /// Two pointers converge from both ends of the run: at each level the
    /// boundary towers just outside the run are joined, then each pointer
    /// walks inward on the level just relinked until it finds a tower tall
    /// enough for the next level. The walk stops when the pointers meet on a
    /// tower which does not reach the next level. Links inside the run are
    /// left untouched, so the run can still be walked forward on level 0
    /// afterwards; the caller self-loops the towers as it takes them.
    pub fn unlink_run(&mut self, first: TowerId, last: TowerId) {
        let (mut lo, mut hi) = (first, last);
        let mut level = 0;
        loop {
            let before = self.prev(lo, level);
            let after = self.next(hi, level);
            self.join(before, level, after);

            level += 1;
            while lo != hi && self.height(lo) <= level {
                lo = self.next(lo, level - 1);
            }
            while lo != hi && self.height(hi) <= level {
                hi = self.prev(hi, level - 1);
            }
            if self.height(lo) <= level {
                break;
            }
        }
    }

    /// Detach the run `ids` (consecutive on level 0, in order) and move its
    /// towers out of the arena.
    pub fn take_run(&mut self, ids: &[TowerId]) -> Vec<Tower<V>> {
        let (Some(&first), Some(&last)) = (ids.first(), ids.last()) else {
            return Vec::new();
        };
        self.unlink_run(first, last);
        ids.iter()
            .map(|&id| {
                self.tower_mut(id).self_loop(id);
                self.remove(id)
            })
            .collect()
    }
}
