//! Iterators over the values of a skiplist, in key order.

use std::iter::FusedIterator;

use crate::{SkipList, arena::Arena, tower::TowerId};

/// Iterator by reference.
///
/// Walks level 0 between two towers, inclusive at both ends. The number of
/// remaining values is tracked so that the iterator is exact-sized and the
/// two ends never cross.
pub struct Iter<'a, V> {
    pub(crate) arena: &'a Arena<V>,
    pub(crate) first: TowerId,
    pub(crate) last: TowerId,
    pub(crate) size: usize,
}

impl<'a, V> Iterator for Iter<'a, V> {
    type Item = &'a V;

    fn next(&mut self) -> Option<Self::Item> {
        if self.size == 0 {
            return None;
        }
        let current = self.first;
        self.first = self.arena.next(current, 0);
        self.size -= 1;
        Some(self.arena.value(current))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.size, Some(self.size))
    }
}

impl<V> DoubleEndedIterator for Iter<'_, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.size == 0 {
            return None;
        }
        let current = self.last;
        self.last = self.arena.prev(current, 0);
        self.size -= 1;
        Some(self.arena.value(current))
    }
}

impl<V> ExactSizeIterator for Iter<'_, V> {}

impl<V> FusedIterator for Iter<'_, V> {}

impl<V> Clone for Iter<'_, V> {
    fn clone(&self) -> Self {
        Iter { ..*self }
    }
}

/// Consuming iterator.
pub struct IntoIter<K, V> {
    pub(crate) list: SkipList<K, V>,
}

impl<K, V> Iterator for IntoIter<K, V> {
    type Item = V;

    fn next(&mut self) -> Option<V> {
        self.list.pop_front()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.list.len(), Some(self.list.len()))
    }
}

impl<K, V> DoubleEndedIterator for IntoIter<K, V> {
    fn next_back(&mut self) -> Option<V> {
        self.list.pop_back()
    }
}

impl<K, V> ExactSizeIterator for IntoIter<K, V> {}

impl<K, V> FusedIterator for IntoIter<K, V> {}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use crate::SkipList;

    #[test]
    fn both_ends() {
        let list: SkipList<u32, u32> = (0..10).collect();
        let mut iter = list.iter();
        assert_eq!(iter.len(), 10);
        assert_eq!(iter.next(), Some(&0));
        assert_eq!(iter.next_back(), Some(&9));
        assert_eq!(iter.len(), 8);
        let middle: Vec<_> = iter.by_ref().copied().collect();
        assert_eq!(middle, (1..9).collect::<Vec<_>>());
        assert_eq!(iter.next(), None);
        assert_eq!(iter.next_back(), None);
    }

    #[test]
    fn rev() {
        let list: SkipList<i32, i32> = [3, 1, 2, 2].into_iter().collect();
        assert_eq!(list.iter().rev().copied().collect::<Vec<_>>(), [3, 2, 2, 1]);
    }

    #[test]
    fn into_iter() {
        let list: SkipList<i32, i32> = [5, 4, 3, 2, 1].into_iter().collect();
        let mut iter = list.into_iter();
        assert_eq!(iter.len(), 5);
        assert_eq!(iter.next(), Some(1));
        assert_eq!(iter.next_back(), Some(5));
        assert_eq!(iter.collect::<Vec<_>>(), [2, 3, 4]);
    }

    #[test]
    fn into_iter_drops_rest() {
        let list: SkipList<String, String> =
            ["a", "b", "c"].into_iter().map(String::from).collect();
        let mut iter = list.into_iter();
        assert_eq!(iter.next().as_deref(), Some("a"));
        drop(iter);
    }
}
