//! Cursors identify a position within one particular skiplist.

use std::sync::atomic::{AtomicU64, Ordering};

use crate::tower::{SENTINEL, TowerId};

/// Identity of a skiplist instance, used to reject cursors handed to the
/// wrong list.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub(crate) struct ListId(u64);

impl ListId {
    pub fn fresh() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(0);
        ListId(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

/// A position in a [`SkipList`][crate::SkipList]: either an element, or the
/// end position one past the last element.
///
/// A cursor is a plain copyable token and borrows nothing; every access goes
/// back through the list, which checks that the cursor was issued by that
/// same list and that its element has not been removed since. Two cursors are
/// equal if they refer to the same element, regardless of the element's
/// value.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Cursor {
    pub(crate) list: ListId,
    pub(crate) index: TowerId,
    pub(crate) generation: u32,
}

impl Cursor {
    pub(crate) fn new(list: ListId, index: TowerId, generation: u32) -> Self {
        Cursor {
            list,
            index,
            generation,
        }
    }

    /// Whether this is the end position of its list.
    #[inline]
    #[must_use]
    pub fn is_end(&self) -> bool {
        self.index == SENTINEL
    }
}

#[cfg(test)]
mod tests {
    use super::{Cursor, ListId};

    #[test]
    fn identity() {
        let (a, b) = (ListId::fresh(), ListId::fresh());
        assert_ne!(a, b);
        assert!(Cursor::new(a, 0, 0).is_end());
        assert!(!Cursor::new(a, 3, 0).is_end());
        assert_ne!(Cursor::new(a, 0, 0), Cursor::new(b, 0, 0));
        assert_ne!(Cursor::new(a, 3, 0), Cursor::new(a, 3, 1));
    }
}
