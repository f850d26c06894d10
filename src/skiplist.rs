//! A skiplist holding values in the order of their keys, where several values
//! may share the same key.

use std::{
    cmp::{self, Ordering},
    fmt,
    hash::{self, Hash},
    iter, mem, ops,
    rc::Rc,
};

use tracing::{debug, trace};

use crate::{
    arena::Arena,
    builder::DEFAULT_MAX_LEVEL,
    cursor::{Cursor, ListId},
    error::{MergeError, SkipListError},
    iter::{IntoIter, Iter},
    level_generator::{Geometric, LevelGenerator},
    node::Node,
    order::{Order, first, identity, natural},
    tower::{SENTINEL, Tower, TowerId},
};

#[cfg(test)]
mod properties;

// ////////////////////////////////////////////////////////////////////////////
// SkipList
// ////////////////////////////////////////////////////////////////////////////

/// A skiplist storing values of type `V`, ordered by a key of type `K`
/// projected out of each value.
///
/// Values with equivalent keys may coexist; [`insert_equal`] always adds the
/// value while [`insert_unique`] refuses a key which is already present.
///
/// Positions are designated by [`Cursor`]s. A cursor stays valid until the
/// element it designates is removed; using it afterwards, or on another list,
/// is reported as an error rather than designating some other element.
///
/// The key projection and the order are chosen at construction:
///
/// - [`SkipList::new`] stores values which are their own key (a multiset),
/// - [`SkipList::new_map`] stores `(key, payload)` pairs (a multimap),
/// - [`SkipList::with_key_and_less`] takes any projection and strict weak
///   order.
///
/// [`insert_equal`]: SkipList::insert_equal
/// [`insert_unique`]: SkipList::insert_unique
pub struct SkipList<K, V = K> {
    arena: Arena<V>,
    len: usize,
    id: ListId,
    level_generator: Geometric,
    order: Order<K, V>,
}

/// A skiplist where each value is its own key.
pub type SkipMultiSet<T> = SkipList<T, T>;

/// A skiplist of `(key, payload)` pairs ordered by key.
pub type SkipMultiMap<K, P> = SkipList<K, (K, P)>;

/// Which bound a search is looking for.
#[derive(Clone, Copy, Debug)]
enum Bound {
    /// The first key not less than the probe.
    Lower,
    /// The first key greater than the probe.
    Upper,
}

// ///////////////////////////////////////////////
// Constructors
// ///////////////////////////////////////////////

impl<T: Ord + 'static> SkipList<T, T> {
    /// Create a new multiset with 32 levels and a promotion probability of
    /// `0.5`.
    ///
    /// # Examples
    ///
    /// ```
    /// use multiskip::SkipList;
    ///
    /// let mut set = SkipList::new();
    /// set.insert_equal(2);
    /// set.insert_equal(1);
    /// set.insert_equal(2);
    /// assert_eq!(set.len(), 3);
    /// assert_eq!(set.count(&2), 2);
    /// ```
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::from_parts(
            Geometric::halving(DEFAULT_MAX_LEVEL),
            Order::new(Rc::new(identity::<T>), Rc::new(natural::<T>)),
        )
    }

    /// Create a new multiset with a number of levels suited to holding about
    /// `capacity` values, namely `floor(log2(capacity))` and at least one.
    ///
    /// # Examples
    ///
    /// ```
    /// use multiskip::SkipList;
    ///
    /// let set: SkipList<u32> = SkipList::with_capacity(1024);
    /// assert_eq!(set.max_level(), 10);
    /// ```
    #[inline]
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        let levels = usize::try_from(capacity.max(2).ilog2()).unwrap_or(1);
        Self::from_parts(
            Geometric::halving(levels),
            Order::new(Rc::new(identity::<T>), Rc::new(natural::<T>)),
        )
    }
}

impl<K: Ord + 'static, P: 'static> SkipList<K, (K, P)> {
    /// Create a new multimap of `(key, payload)` pairs.
    ///
    /// # Examples
    ///
    /// ```
    /// use multiskip::SkipList;
    ///
    /// let mut map = SkipList::new_map();
    /// map.insert_equal((1, "one"));
    /// map.insert_equal((0, "zero"));
    /// map.insert_equal((1, "uno"));
    /// assert_eq!(map.front(), Some(&(0, "zero")));
    /// assert_eq!(map.count(&1), 2);
    /// ```
    #[inline]
    #[must_use]
    pub fn new_map() -> Self {
        Self::from_parts(
            Geometric::halving(DEFAULT_MAX_LEVEL),
            Order::new(Rc::new(first::<K, P>), Rc::new(natural::<K>)),
        )
    }
}

impl<K, V> SkipList<K, V> {
    /// Create a new skiplist using `key_of` to project each value onto its
    /// key, and `less` as the strict weak order of keys.
    ///
    /// The order **must** be well-behaved: irreflexive, transitive, and with
    /// equivalence (neither key less than the other) transitive as well.
    /// A badly behaved order does not cause undefined behaviour, but searches
    /// and insertions may then place values anywhere.
    ///
    /// # Examples
    ///
    /// ```
    /// use multiskip::SkipList;
    ///
    /// // Descending order.
    /// let mut list = SkipList::with_key_and_less(|v: &i32| v, |a: &i32, b: &i32| b < a);
    /// list.extend([1, 3, 2]);
    /// assert_eq!(list.iter().copied().collect::<Vec<_>>(), [3, 2, 1]);
    /// ```
    #[inline]
    pub fn with_key_and_less(
        key_of: impl Fn(&V) -> &K + 'static,
        less: impl Fn(&K, &K) -> bool + 'static,
    ) -> Self {
        Self::from_parts(
            Geometric::halving(DEFAULT_MAX_LEVEL),
            Order::new(Rc::new(key_of), Rc::new(less)),
        )
    }

    pub(crate) fn from_parts(level_generator: Geometric, order: Order<K, V>) -> Self {
        SkipList {
            arena: Arena::new(level_generator.total()),
            len: 0,
            id: ListId::fresh(),
            level_generator,
            order,
        }
    }

    /// An empty list with the same configuration as `self`, under a new
    /// identity.
    fn empty_like(&self) -> Self {
        Self::from_parts(self.level_generator.clone(), self.order.clone())
    }
}

// ///////////////////////////////////////////////
// Cursors and navigation
// ///////////////////////////////////////////////

impl<K, V> SkipList<K, V> {
    /// The number of values in the list.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the list holds no value.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// The number of levels of the list, which bounds the height of its
    /// towers.
    #[inline]
    #[must_use]
    pub fn max_level(&self) -> usize {
        self.arena.max_level()
    }

    fn cursor(&self, id: TowerId) -> Cursor {
        Cursor::new(self.id, id, self.arena.generation(id).unwrap_or_default())
    }

    /// Check that `cursor` designates a live position of this list, the end
    /// included.
    fn resolve(&self, cursor: Cursor) -> Result<TowerId, SkipListError> {
        if cursor.list != self.id {
            return Err(SkipListError::ForeignCursor);
        }
        match self.arena.generation(cursor.index) {
            Some(generation) if generation == cursor.generation => Ok(cursor.index),
            _ => Err(SkipListError::StaleCursor),
        }
    }

    /// Check that `cursor` designates an element of this list.
    fn resolve_element(&self, cursor: Cursor) -> Result<TowerId, SkipListError> {
        match self.resolve(cursor)? {
            SENTINEL => Err(SkipListError::EndCursor),
            id => Ok(id),
        }
    }

    /// Check that `last` can be reached from `first`, returning both ends and
    /// the number of elements in between.
    fn resolve_range(
        &self,
        first: Cursor,
        last: Cursor,
    ) -> Result<(TowerId, TowerId, usize), SkipListError> {
        let (first, last) = (self.resolve(first)?, self.resolve(last)?);
        let mut at = first;
        let mut count = 0;
        while at != last {
            if at == SENTINEL {
                return Err(SkipListError::InvalidRange);
            }
            at = self.arena.next(at, 0);
            count += 1;
        }
        Ok((first, last, count))
    }

    /// A cursor to the first element, or the end if the list is empty.
    #[inline]
    #[must_use]
    pub fn begin(&self) -> Cursor {
        self.cursor(self.arena.next(SENTINEL, 0))
    }

    /// The cursor one past the last element.
    #[inline]
    #[must_use]
    pub fn end(&self) -> Cursor {
        self.cursor(SENTINEL)
    }

    /// The first value, if any.
    #[inline]
    #[must_use]
    pub fn front(&self) -> Option<&V> {
        self.arena.tower(self.arena.next(SENTINEL, 0)).value()
    }

    /// The last value, if any.
    #[inline]
    #[must_use]
    pub fn back(&self) -> Option<&V> {
        self.arena.tower(self.arena.prev(SENTINEL, 0)).value()
    }

    /// The value designated by `cursor`.
    ///
    /// # Errors
    ///
    /// Fails for the end cursor, and for cursors which are foreign or stale.
    #[inline]
    pub fn get(&self, cursor: Cursor) -> Result<&V, SkipListError> {
        Ok(self.arena.value(self.resolve_element(cursor)?))
    }

    /// The next position in key order. Advancing past the last element gives
    /// the end, and advancing past the end wraps around to the first element.
    ///
    /// # Errors
    ///
    /// Fails for cursors which are foreign or stale.
    #[inline]
    pub fn successor(&self, cursor: Cursor) -> Result<Cursor, SkipListError> {
        Ok(self.cursor(self.arena.next(self.resolve(cursor)?, 0)))
    }

    /// The previous position in key order. Stepping back from the first
    /// element gives the end, and stepping back from the end gives the last
    /// element.
    ///
    /// # Errors
    ///
    /// Fails for cursors which are foreign or stale.
    #[inline]
    pub fn predecessor(&self, cursor: Cursor) -> Result<Cursor, SkipListError> {
        Ok(self.cursor(self.arena.prev(self.resolve(cursor)?, 0)))
    }

    /// The number of levels the designated tower participates in. The end
    /// position has the full height of the list.
    ///
    /// # Errors
    ///
    /// Fails for cursors which are foreign or stale.
    #[inline]
    pub fn height(&self, cursor: Cursor) -> Result<usize, SkipListError> {
        Ok(self.arena.height(self.resolve(cursor)?))
    }

    fn level_checked(&self, cursor: Cursor, level: usize) -> Result<TowerId, SkipListError> {
        let id = self.resolve(cursor)?;
        let height = self.arena.height(id);
        if level >= height {
            return Err(SkipListError::LevelOutOfRange { level, height });
        }
        Ok(id)
    }

    /// The next tower participating in `level`.
    ///
    /// # Errors
    ///
    /// Fails if the tower does not reach `level`, and for cursors which are
    /// foreign or stale.
    #[inline]
    pub fn next_at(&self, cursor: Cursor, level: usize) -> Result<Cursor, SkipListError> {
        let id = self.level_checked(cursor, level)?;
        Ok(self.cursor(self.arena.next(id, level)))
    }

    /// The previous tower participating in `level`.
    ///
    /// # Errors
    ///
    /// Fails if the tower does not reach `level`, and for cursors which are
    /// foreign or stale.
    #[inline]
    pub fn prev_at(&self, cursor: Cursor, level: usize) -> Result<Cursor, SkipListError> {
        let id = self.level_checked(cursor, level)?;
        Ok(self.cursor(self.arena.prev(id, level)))
    }

    /// The next tower on the topmost level of the designated tower, which is
    /// the nearest tower at least as tall.
    ///
    /// # Errors
    ///
    /// Fails for cursors which are foreign or stale.
    #[inline]
    pub fn top_next(&self, cursor: Cursor) -> Result<Cursor, SkipListError> {
        Ok(self.cursor(self.arena.top_next(self.resolve(cursor)?)))
    }

    /// The previous tower on the topmost level of the designated tower.
    ///
    /// # Errors
    ///
    /// Fails for cursors which are foreign or stale.
    #[inline]
    pub fn top_prev(&self, cursor: Cursor) -> Result<Cursor, SkipListError> {
        Ok(self.cursor(self.arena.top_prev(self.resolve(cursor)?)))
    }

    /// Iterate over the values in key order.
    #[inline]
    #[must_use]
    pub fn iter(&self) -> Iter<'_, V> {
        Iter {
            arena: &self.arena,
            first: self.arena.next(SENTINEL, 0),
            last: self.arena.prev(SENTINEL, 0),
            size: self.len,
        }
    }

    /// Iterate over the values from `first` up to, but excluding, `last`.
    ///
    /// # Errors
    ///
    /// Fails if `last` does not follow `first`, and for cursors which are
    /// foreign or stale.
    ///
    /// # Examples
    ///
    /// ```
    /// use multiskip::SkipList;
    ///
    /// let list: SkipList<i32> = (0..10).collect();
    /// let (lo, hi) = (list.lower_bound(&3), list.lower_bound(&6));
    /// assert_eq!(list.range(lo, hi)?.copied().collect::<Vec<_>>(), [3, 4, 5]);
    /// # Ok::<(), multiskip::SkipListError>(())
    /// ```
    #[inline]
    pub fn range(&self, first: Cursor, last: Cursor) -> Result<Iter<'_, V>, SkipListError> {
        let (first, last, size) = self.resolve_range(first, last)?;
        Ok(Iter {
            arena: &self.arena,
            first,
            last: self.arena.prev(last, 0),
            size,
        })
    }
}

// ///////////////////////////////////////////////
// Search
// ///////////////////////////////////////////////

impl<K, V> SkipList<K, V> {
    #[inline]
    fn key_at(&self, id: TowerId) -> &K {
        self.order.key(self.arena.value(id))
    }

    /// Whether a search for `bound` moves past `id`. The end never moves.
    #[inline]
    fn advances(&self, bound: Bound, id: TowerId, key: &K) -> bool {
        id != SENTINEL && {
            let at = self.key_at(id);
            match bound {
                Bound::Lower => self.order.less(at, key),
                Bound::Upper => self.order.less_eq(at, key),
            }
        }
    }

    /// Starting from a tower which the search moves past, advance along each
    /// level from `height - 1` down to 0, then step onto the bound.
    fn descend(&self, mut at: TowerId, height: usize, bound: Bound, key: &K) -> TowerId {
        for level in (0..height).rev() {
            loop {
                let next = self.arena.next(at, level);
                if !self.advances(bound, next, key) {
                    break;
                }
                at = next;
            }
        }
        self.arena.next(at, 0)
    }

    fn search(&self, bound: Bound, key: &K) -> TowerId {
        self.descend(SENTINEL, self.arena.max_level(), bound, key)
    }

    fn search_from(&self, hint: TowerId, bound: Bound, key: &K) -> TowerId {
        if !self.advances(bound, hint, key) {
            // The hint is at or beyond the bound; it is the bound only if its
            // predecessor is not.
            let prev = self.arena.prev(hint, 0);
            return if prev == SENTINEL || self.advances(bound, prev, key) {
                hint
            } else {
                self.search(bound, key)
            };
        }
        let mut at = hint;
        loop {
            let next = self.arena.top_next(at);
            if !self.advances(bound, next, key) {
                break;
            }
            at = next;
        }
        self.descend(at, self.arena.height(at), bound, key)
    }

    /// The first element whose key is not less than `key`, or the end.
    ///
    /// # Examples
    ///
    /// ```
    /// use multiskip::SkipList;
    ///
    /// let list: SkipList<i32> = [1, 3, 3, 5].into_iter().collect();
    /// assert_eq!(list.get(list.lower_bound(&3)), Ok(&3));
    /// assert_eq!(list.get(list.lower_bound(&4)), Ok(&5));
    /// assert!(list.lower_bound(&6).is_end());
    /// ```
    #[inline]
    #[must_use]
    pub fn lower_bound(&self, key: &K) -> Cursor {
        self.cursor(self.search(Bound::Lower, key))
    }

    /// The first element whose key is greater than `key`, or the end.
    ///
    /// # Examples
    ///
    /// ```
    /// use multiskip::SkipList;
    ///
    /// let list: SkipList<i32> = [1, 3, 3, 5].into_iter().collect();
    /// assert_eq!(list.get(list.upper_bound(&3)), Ok(&5));
    /// assert_eq!(list.get(list.upper_bound(&0)), Ok(&1));
    /// assert!(list.upper_bound(&5).is_end());
    /// ```
    #[inline]
    #[must_use]
    pub fn upper_bound(&self, key: &K) -> Cursor {
        self.cursor(self.search(Bound::Upper, key))
    }

    /// Same as [`lower_bound`][SkipList::lower_bound], starting the search
    /// from `hint` instead of the top of the list.
    ///
    /// The search first climbs from the hint through the tallest links it
    /// finds, then descends as usual, so a hint close to the bound makes the
    /// search cheap. A hint past the bound is still correct but falls back
    /// to a full search.
    ///
    /// # Errors
    ///
    /// Fails for hints which are foreign or stale.
    #[inline]
    pub fn lower_bound_from(&self, hint: Cursor, key: &K) -> Result<Cursor, SkipListError> {
        let hint = self.resolve(hint)?;
        Ok(self.cursor(self.search_from(hint, Bound::Lower, key)))
    }

    /// Same as [`upper_bound`][SkipList::upper_bound], starting the search
    /// from `hint`. See [`lower_bound_from`][SkipList::lower_bound_from].
    ///
    /// # Errors
    ///
    /// Fails for hints which are foreign or stale.
    #[inline]
    pub fn upper_bound_from(&self, hint: Cursor, key: &K) -> Result<Cursor, SkipListError> {
        let hint = self.resolve(hint)?;
        Ok(self.cursor(self.search_from(hint, Bound::Upper, key)))
    }

    /// An element with a key equivalent to `key`, namely the first one, or
    /// the end if there is none.
    #[inline]
    #[must_use]
    pub fn find(&self, key: &K) -> Cursor {
        let id = self.search(Bound::Lower, key);
        if id != SENTINEL && self.order.equiv(self.key_at(id), key) {
            self.cursor(id)
        } else {
            self.end()
        }
    }

    /// Whether some element has a key equivalent to `key`.
    #[inline]
    #[must_use]
    pub fn contains(&self, key: &K) -> bool {
        !self.find(key).is_end()
    }

    /// The number of elements with a key equivalent to `key`.
    #[inline]
    #[must_use]
    pub fn count(&self, key: &K) -> usize {
        let mut at = self.search(Bound::Lower, key);
        let mut count = 0;
        while at != SENTINEL && self.order.less_eq(self.key_at(at), key) {
            count += 1;
            at = self.arena.next(at, 0);
        }
        count
    }

    /// The lower and upper bounds of `key`, which delimit every element with
    /// an equivalent key.
    #[inline]
    #[must_use]
    pub fn equal_range(&self, key: &K) -> (Cursor, Cursor) {
        let lower = self.search(Bound::Lower, key);
        let upper = self.search_from(lower, Bound::Upper, key);
        (self.cursor(lower), self.cursor(upper))
    }
}

// ///////////////////////////////////////////////
// Insertion
// ///////////////////////////////////////////////

impl<K, V> SkipList<K, V> {
    /// Move `tower` into the arena and link it before `pos`.
    fn attach(&mut self, pos: TowerId, tower: Tower<V>) -> TowerId {
        let id = self.arena.insert(tower);
        self.arena.splice_before(pos, id);
        self.len += 1;
        id
    }

    /// Link a new tower of random height holding `value` before `pos`.
    fn attach_value(&mut self, pos: TowerId, value: V) -> TowerId {
        let height = self.level_generator.height();
        self.attach(pos, Tower::new(value, height))
    }

    /// Insert `value`, after any element with an equivalent key.
    ///
    /// # Examples
    ///
    /// ```
    /// use multiskip::SkipList;
    ///
    /// let mut map = SkipList::new_map();
    /// map.insert_equal((1, 'a'));
    /// let b = map.insert_equal((1, 'b'));
    /// assert_eq!(map[b], (1, 'b'));
    /// assert_eq!(map.back(), Some(&(1, 'b')));
    /// ```
    #[inline]
    pub fn insert_equal(&mut self, value: V) -> Cursor {
        let pos = self.search(Bound::Upper, self.order.key(&value));
        let id = self.attach_value(pos, value);
        self.cursor(id)
    }

    /// Insert `n` clones of `value`, returning the first of them, or the end
    /// if `n` is zero.
    #[inline]
    pub fn insert_equal_n(&mut self, n: usize, value: &V) -> Cursor
    where
        V: Clone,
    {
        let pos = self.search(Bound::Upper, self.order.key(value));
        let mut first = SENTINEL;
        for i in 0..n {
            let id = self.attach_value(pos, value.clone());
            if i == 0 {
                first = id;
            }
        }
        self.cursor(first)
    }

    /// Insert the value built by `make`. The value is built straight away and
    /// moved into its tower.
    #[inline]
    pub fn emplace_equal(&mut self, make: impl FnOnce() -> V) -> Cursor {
        self.insert_equal(make())
    }

    /// Insert `value` unless an element with an equivalent key is present.
    ///
    /// Returns the inserted element and `true`, or the element already
    /// holding the key and `false`, in which case `value` is dropped.
    ///
    /// # Examples
    ///
    /// ```
    /// use multiskip::SkipList;
    ///
    /// let mut set = SkipList::new();
    /// let (a, inserted) = set.insert_unique(7);
    /// assert!(inserted);
    /// assert_eq!(set.insert_unique(7), (a, false));
    /// assert_eq!(set.len(), 1);
    /// ```
    #[inline]
    pub fn insert_unique(&mut self, value: V) -> (Cursor, bool) {
        let pos = self.search(Bound::Lower, self.order.key(&value));
        if pos != SENTINEL && self.order.equiv(self.key_at(pos), self.order.key(&value)) {
            return (self.cursor(pos), false);
        }
        let id = self.attach_value(pos, value);
        (self.cursor(id), true)
    }

    /// Insert a clone of `value` if `n` is non-zero and its key is absent.
    /// With `n` equal to zero nothing is inserted and the end is returned.
    #[inline]
    pub fn insert_unique_n(&mut self, n: usize, value: &V) -> (Cursor, bool)
    where
        V: Clone,
    {
        if n == 0 {
            return (self.end(), false);
        }
        self.insert_unique(value.clone())
    }

    /// Insert the value built by `make` unless its key is present. The value
    /// is always built, and dropped if it is not inserted.
    #[inline]
    pub fn emplace_unique(&mut self, make: impl FnOnce() -> V) -> (Cursor, bool) {
        self.insert_unique(make())
    }

    /// Insert each value whose key is not yet present, returning how many
    /// were inserted.
    ///
    /// # Examples
    ///
    /// ```
    /// use multiskip::SkipList;
    ///
    /// let mut set = SkipList::new();
    /// assert_eq!(set.insert_unique_iter([3, 1, 3, 2, 1]), 3);
    /// assert_eq!(set.to_string(), "[1, 2, 3]");
    /// ```
    #[inline]
    pub fn insert_unique_iter<I: IntoIterator<Item = V>>(&mut self, values: I) -> usize {
        let mut inserted = 0;
        for value in values {
            if self.insert_unique(value).1 {
                inserted += 1;
            }
        }
        inserted
    }
}

// ///////////////////////////////////////////////
// Removal
// ///////////////////////////////////////////////

impl<K, V> SkipList<K, V> {
    /// Unlink `id` and move its tower out of the list.
    fn detach(&mut self, id: TowerId) -> Node<V> {
        self.arena.unlink(id);
        self.len -= 1;
        Node::new(self.arena.remove(id))
    }

    /// Unlink the `count` elements starting at `first` in one splice.
    fn detach_run(&mut self, first: TowerId, count: usize) -> Vec<Node<V>> {
        let ids: Vec<_> = iter::successors(Some(first), |&id| Some(self.arena.next(id, 0)))
            .take(count)
            .collect();
        let nodes: Vec<_> = self
            .arena
            .take_run(&ids)
            .into_iter()
            .map(Node::new)
            .collect();
        self.len -= nodes.len();
        trace!(count = nodes.len(), len = self.len, "detached run");
        nodes
    }

    /// Remove the element designated by `cursor`, returning its successor.
    ///
    /// # Errors
    ///
    /// Fails for the end cursor, and for cursors which are foreign or stale.
    #[inline]
    pub fn erase(&mut self, cursor: Cursor) -> Result<Cursor, SkipListError> {
        let id = self.resolve_element(cursor)?;
        let next = self.arena.next(id, 0);
        drop(self.detach(id));
        Ok(self.cursor(next))
    }

    /// Remove the elements from `first` up to, but excluding, `last`,
    /// returning `last`.
    ///
    /// # Errors
    ///
    /// Fails if `last` does not follow `first`, and for cursors which are
    /// foreign or stale. Nothing is removed on failure.
    #[inline]
    pub fn erase_range(&mut self, first: Cursor, last: Cursor) -> Result<Cursor, SkipListError> {
        let (mut at, last, _) = self.resolve_range(first, last)?;
        while at != last {
            let next = self.arena.next(at, 0);
            drop(self.detach(at));
            at = next;
        }
        Ok(self.cursor(last))
    }

    /// Remove every element with a key equivalent to `key`, returning how
    /// many were removed.
    #[inline]
    pub fn erase_key(&mut self, key: &K) -> usize {
        let mut at = self.search(Bound::Lower, key);
        let mut count = 0;
        while at != SENTINEL && self.order.less_eq(self.key_at(at), key) {
            let next = self.arena.next(at, 0);
            drop(self.detach(at));
            count += 1;
            at = next;
        }
        count
    }

    /// Remove and return the first value.
    #[inline]
    pub fn pop_front(&mut self) -> Option<V> {
        match self.arena.next(SENTINEL, 0) {
            SENTINEL => None,
            id => Some(self.detach(id).into_value()),
        }
    }

    /// Remove and return the last value.
    #[inline]
    pub fn pop_back(&mut self) -> Option<V> {
        match self.arena.prev(SENTINEL, 0) {
            SENTINEL => None,
            id => Some(self.detach(id).into_value()),
        }
    }

    /// Remove every value. Cursors to the removed elements become stale.
    #[inline]
    pub fn clear(&mut self) {
        debug!(len = self.len, "clearing skiplist");
        self.arena.clear();
        self.len = 0;
    }

    /// Keep only the first of each run of elements with equivalent keys,
    /// returning how many were removed.
    ///
    /// # Examples
    ///
    /// ```
    /// use multiskip::SkipList;
    ///
    /// let mut map = SkipList::new_map();
    /// map.extend([(1, 'a'), (2, 'b'), (1, 'c'), (2, 'd'), (3, 'e')]);
    /// assert_eq!(map.unique(), 2);
    /// assert_eq!(map.iter().map(|&(_, c)| c).collect::<String>(), "abe");
    /// ```
    #[inline]
    pub fn unique(&mut self) -> usize {
        let mut removed = 0;
        let mut at = self.arena.next(SENTINEL, 0);
        while at != SENTINEL {
            let next = self.arena.next(at, 0);
            if next != SENTINEL && !self.order.less(self.key_at(at), self.key_at(next)) {
                drop(self.detach(next));
                removed += 1;
            } else {
                at = next;
            }
        }
        debug!(removed, len = self.len, "removed duplicate keys");
        removed
    }
}

// ///////////////////////////////////////////////
// Extraction and merging
// ///////////////////////////////////////////////

impl<K, V> SkipList<K, V> {
    /// Detach the element designated by `cursor`, handing its tower to the
    /// caller.
    ///
    /// # Errors
    ///
    /// Fails for the end cursor, and for cursors which are foreign or stale.
    ///
    /// # Examples
    ///
    /// ```
    /// use multiskip::SkipList;
    ///
    /// let mut a: SkipList<i32> = [1, 2, 3].into_iter().collect();
    /// let mut b: SkipList<i32> = [0, 4].into_iter().collect();
    /// let node = a.extract(a.find(&2))?;
    /// b.merge(node).unwrap();
    /// assert_eq!(a.to_string(), "[1, 3]");
    /// assert_eq!(b.to_string(), "[0, 2, 4]");
    /// # Ok::<(), multiskip::SkipListError>(())
    /// ```
    #[inline]
    pub fn extract(&mut self, cursor: Cursor) -> Result<Node<V>, SkipListError> {
        let id = self.resolve_element(cursor)?;
        Ok(self.detach(id))
    }

    /// Detach the elements from `first` up to, but excluding, `last`, as one
    /// run in key order.
    ///
    /// The run is unlinked from each level at its two boundaries only, so
    /// the cost depends on the tallest tower of the run rather than on its
    /// length.
    ///
    /// # Errors
    ///
    /// Fails if `last` does not follow `first`, and for cursors which are
    /// foreign or stale. Nothing is detached on failure.
    #[inline]
    pub fn extract_range(
        &mut self,
        first: Cursor,
        last: Cursor,
    ) -> Result<Vec<Node<V>>, SkipListError> {
        let (first, _, count) = self.resolve_range(first, last)?;
        Ok(self.detach_run(first, count))
    }

    /// Detach every element with a key equivalent to `key`, in key order.
    #[inline]
    pub fn extract_key(&mut self, key: &K) -> Vec<Node<V>> {
        let first = self.search(Bound::Lower, key);
        let mut count = 0;
        let mut at = first;
        while at != SENTINEL && self.order.less_eq(self.key_at(at), key) {
            count += 1;
            at = self.arena.next(at, 0);
        }
        self.detach_run(first, count)
    }

    /// Whether the keys of `nodes` never decrease.
    fn is_ascending(&self, nodes: &[Node<V>]) -> bool {
        nodes.windows(2).all(|pair| {
            !self
                .order
                .less(self.order.key(pair[1].value()), self.order.key(pair[0].value()))
        })
    }

    fn check_heights(
        &self,
        heights: impl IntoIterator<Item = usize>,
    ) -> Result<(), SkipListError> {
        let max_level = self.max_level();
        match heights.into_iter().find(|&height| height > max_level) {
            Some(height) => Err(SkipListError::TooTall { height, max_level }),
            None => Ok(()),
        }
    }

    /// Link `nodes`, already known to be ascending and short enough, each at
    /// the lower bound of its key. Nodes with equivalent keys keep their
    /// relative order.
    fn merge_sorted(&mut self, nodes: Vec<Node<V>>) {
        let count = nodes.len();
        let mut previous: Option<TowerId> = None;
        for node in nodes {
            let key = self.order.key(node.value());
            let pos = match previous {
                None => self.search(Bound::Lower, key),
                Some(prev) if self.order.equiv(self.key_at(prev), key) => self.arena.next(prev, 0),
                Some(prev) => self.search_from(prev, Bound::Lower, key),
            };
            previous = Some(self.attach(pos, node.into_tower()));
        }
        trace!(count, len = self.len, "merged run");
    }

    /// Link a detached node at the lower bound of its key, keeping the
    /// height it already has.
    ///
    /// # Errors
    ///
    /// Fails if the node is taller than [`max_level`][SkipList::max_level];
    /// the node is then handed back.
    #[inline]
    pub fn merge(&mut self, node: Node<V>) -> Result<Cursor, MergeError<V>> {
        if let Err(reason) = self.check_heights([node.height()]) {
            return Err(MergeError {
                reason,
                nodes: vec![node],
            });
        }
        let pos = self.search(Bound::Lower, self.order.key(node.value()));
        let id = self.attach(pos, node.into_tower());
        Ok(self.cursor(id))
    }

    /// Link a run of detached nodes, which must be in ascending key order
    /// under this list's order. Each node lands at the lower bound of its
    /// key, and each search starts from the node linked before it.
    ///
    /// # Errors
    ///
    /// Fails if the run is not ascending or a node is too tall; every node is
    /// then handed back and the list is left unchanged.
    ///
    /// # Examples
    ///
    /// ```
    /// use multiskip::SkipList;
    ///
    /// let mut a: SkipList<i32> = (0..10).collect();
    /// let mut b: SkipList<i32> = [2, 5].into_iter().collect();
    /// let run = a.extract_range(a.lower_bound(&3), a.lower_bound(&7))?;
    /// b.merge_run(run).unwrap();
    /// assert_eq!(b.to_string(), "[2, 3, 4, 5, 5, 6]");
    /// assert_eq!(a.len(), 6);
    /// # Ok::<(), multiskip::SkipListError>(())
    /// ```
    #[inline]
    pub fn merge_run(&mut self, nodes: Vec<Node<V>>) -> Result<(), MergeError<V>> {
        let reason = if self.is_ascending(&nodes) {
            self.check_heights(nodes.iter().map(Node::height)).err()
        } else {
            Some(SkipListError::UnorderedRun)
        };
        if let Some(reason) = reason {
            return Err(MergeError { reason, nodes });
        }
        self.merge_sorted(nodes);
        Ok(())
    }

    /// Link `nodes` taken from another list: as one run if they are ascending
    /// under this list's order, one by one otherwise.
    fn merge_foreign(&mut self, nodes: Vec<Node<V>>) {
        if self.is_ascending(&nodes) {
            self.merge_sorted(nodes);
        } else {
            debug!(count = nodes.len(), "merging nodes one at a time");
            for node in nodes {
                let pos = self.search(Bound::Lower, self.order.key(node.value()));
                self.attach(pos, node.into_tower());
            }
        }
    }

    /// Move the elements of `other` from `first` up to, but excluding,
    /// `last` into this list, without copying any value.
    ///
    /// # Errors
    ///
    /// Fails if `last` does not follow `first` in `other`, if the cursors are
    /// foreign to `other` or stale, or if one of the towers is taller than
    /// this list allows. Neither list is changed on failure.
    #[inline]
    pub fn merge_range_from(
        &mut self,
        other: &mut Self,
        first: Cursor,
        last: Cursor,
    ) -> Result<(), SkipListError> {
        let (first, _, count) = other.resolve_range(first, last)?;
        self.check_heights(
            iter::successors(Some(first), |&id| Some(other.arena.next(id, 0)))
                .take(count)
                .map(|id| other.arena.height(id)),
        )?;
        let nodes = other.detach_run(first, count);
        self.merge_foreign(nodes);
        Ok(())
    }

    /// Move every element of `other` into this list, without copying any
    /// value. `other` is left empty.
    ///
    /// # Errors
    ///
    /// Fails if `other` holds a tower taller than this list allows, in which
    /// case neither list is changed.
    ///
    /// # Examples
    ///
    /// ```
    /// use multiskip::SkipList;
    ///
    /// let mut a: SkipList<i32> = [1, 3, 5].into_iter().collect();
    /// let mut b: SkipList<i32> = [2, 3, 4].into_iter().collect();
    /// a.merge_from(&mut b)?;
    /// assert_eq!(a.to_string(), "[1, 2, 3, 3, 4, 5]");
    /// assert!(b.is_empty());
    /// # Ok::<(), multiskip::SkipListError>(())
    /// ```
    #[inline]
    pub fn merge_from(&mut self, other: &mut Self) -> Result<(), SkipListError> {
        let tallest = other.arena.tallest();
        if tallest > self.max_level() {
            return Err(SkipListError::TooTall {
                height: tallest,
                max_level: self.max_level(),
            });
        }
        let count = other.len;
        let nodes = other.detach_run(other.arena.next(SENTINEL, 0), count);
        debug!(count, "merging skiplist");
        self.merge_foreign(nodes);
        Ok(())
    }

    /// Move the contents out of the list, leaving it empty with the same
    /// configuration. Cursors follow the contents.
    ///
    /// # Examples
    ///
    /// ```
    /// use multiskip::SkipList;
    ///
    /// let mut a: SkipList<i32> = [1, 2].into_iter().collect();
    /// let first = a.begin();
    /// let b = a.take();
    /// assert!(a.is_empty());
    /// assert_eq!(b[first], 1);
    /// ```
    #[inline]
    #[must_use]
    pub fn take(&mut self) -> Self {
        let empty = self.empty_like();
        mem::replace(self, empty)
    }

    /// Append a clone of every value of `source`, keeping the tower heights.
    fn append_clones(&mut self, source: &Self)
    where
        V: Clone,
    {
        let mut at = source.arena.next(SENTINEL, 0);
        while at != SENTINEL {
            let tower = Tower::new(source.arena.value(at).clone(), source.arena.height(at));
            self.attach(SENTINEL, tower);
            at = source.arena.next(at, 0);
        }
    }
}

impl<K, V: fmt::Debug> SkipList<K, V> {
    /// Render the towers of each non-empty level, from the top level down,
    /// for debugging purposes.
    ///
    /// # Examples
    ///
    /// ```
    /// use multiskip::SkipList;
    ///
    /// let list: SkipList<i32> = [1, 2].into_iter().collect();
    /// assert!(list.debug_structure().ends_with("L0: 1 -> 2"));
    /// ```
    #[must_use]
    pub fn debug_structure(&self) -> String {
        (0..self.arena.tallest().max(1))
            .rev()
            .map(|level| {
                let first = self.arena.next(SENTINEL, level);
                let entries: Vec<_> =
                    iter::successors(Some(first), |&id| Some(self.arena.next(id, level)))
                        .take_while(|&id| id != SENTINEL)
                        .map(|id| format!("{:?}", self.arena.value(id)))
                        .collect();
                if entries.is_empty() {
                    format!("L{level}:")
                } else {
                    format!("L{level}: {}", entries.join(" -> "))
                }
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

// ///////////////////////////////////////////////
// Trait implementation
// ///////////////////////////////////////////////

impl<T: Ord + 'static> Default for SkipList<T, T> {
    #[inline]
    fn default() -> Self {
        SkipList::new()
    }
}

/// Cloning copies each value once, in order, and gives each copy the height
/// of the tower it was copied from. The clone has its own identity: cursors
/// of the source list are foreign to it.
impl<K, V: Clone> Clone for SkipList<K, V> {
    #[inline]
    fn clone(&self) -> Self {
        let mut list = self.empty_like();
        list.append_clones(self);
        list
    }

    #[inline]
    fn clone_from(&mut self, source: &Self) {
        if self.max_level() == source.max_level() {
            self.clear();
            self.level_generator = source.level_generator.clone();
            self.order = source.order.clone();
            self.append_clones(source);
        } else {
            *self = source.clone();
        }
    }
}

/// This implementation of `PartialEq` only checks that the *values* are
/// equal, in order; it does not compare the orders or the tower heights.
impl<K, A, L, B> cmp::PartialEq<SkipList<L, B>> for SkipList<K, A>
where
    A: cmp::PartialEq<B>,
{
    #[inline]
    fn eq(&self, other: &SkipList<L, B>) -> bool {
        self.len() == other.len() && self.iter().eq(other)
    }
}

impl<K, V: cmp::Eq> cmp::Eq for SkipList<K, V> {}

impl<K, A, L, B> cmp::PartialOrd<SkipList<L, B>> for SkipList<K, A>
where
    A: cmp::PartialOrd<B>,
{
    #[inline]
    fn partial_cmp(&self, other: &SkipList<L, B>) -> Option<Ordering> {
        self.iter().partial_cmp(other)
    }
}

impl<K, V: cmp::Ord> cmp::Ord for SkipList<K, V> {
    #[inline]
    fn cmp(&self, other: &Self) -> Ordering {
        self.iter().cmp(other)
    }
}

impl<K, V: Hash> Hash for SkipList<K, V> {
    #[inline]
    fn hash<H: hash::Hasher>(&self, state: &mut H) {
        for value in self {
            value.hash(state);
        }
    }
}

impl<K, V> Extend<V> for SkipList<K, V> {
    #[inline]
    fn extend<I: IntoIterator<Item = V>>(&mut self, iterable: I) {
        for value in iterable {
            self.insert_equal(value);
        }
    }
}

impl<T: Ord + 'static> iter::FromIterator<T> for SkipList<T, T> {
    #[inline]
    fn from_iter<I: IntoIterator<Item = T>>(iterable: I) -> Self {
        let mut list = SkipList::new();
        list.extend(iterable);
        list
    }
}

impl<K, V> IntoIterator for SkipList<K, V> {
    type Item = V;
    type IntoIter = IntoIter<K, V>;

    #[inline]
    fn into_iter(self) -> IntoIter<K, V> {
        IntoIter { list: self }
    }
}

impl<'a, K, V> IntoIterator for &'a SkipList<K, V> {
    type Item = &'a V;
    type IntoIter = Iter<'a, V>;

    #[inline]
    fn into_iter(self) -> Iter<'a, V> {
        self.iter()
    }
}

impl<K, V> ops::Index<Cursor> for SkipList<K, V> {
    type Output = V;

    #[expect(clippy::panic, reason = "Index cannot report an invalid cursor otherwise")]
    fn index(&self, cursor: Cursor) -> &V {
        match self.get(cursor) {
            Ok(value) => value,
            Err(err) => panic!("{err}"),
        }
    }
}

impl<K, V: fmt::Debug> fmt::Debug for SkipList<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl<K, V: fmt::Display> fmt::Display for SkipList<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, value) in self.iter().enumerate() {
            if i != 0 {
                write!(f, ", ")?;
            }
            write!(f, "{value}")?;
        }
        write!(f, "]")
    }
}

// ////////////////////////////////////////////////////////////////////////////
// Tests
// ////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
impl<K, V> SkipList<K, V> {
    /// Verify the rings of every level: back links mirror forward links, only
    /// towers tall enough participate, keys never decrease, each level holds
    /// a subset of the level below, and level 0 holds exactly `len` towers.
    pub(crate) fn check(&self) {
        let mut below = usize::MAX;
        for level in 0..self.max_level() {
            let mut count = 0;
            let mut at = SENTINEL;
            loop {
                let next = self.arena.next(at, level);
                assert_eq!(self.arena.prev(next, level), at, "broken back link");
                if next == SENTINEL {
                    break;
                }
                assert!(self.arena.height(next) > level, "tower too short for level");
                if at != SENTINEL {
                    assert!(
                        !self.order.less(self.key_at(next), self.key_at(at)),
                        "keys out of order on level {level}"
                    );
                }
                count += 1;
                assert!(count <= self.len, "ring of level {level} does not close");
                at = next;
            }
            if level == 0 {
                assert_eq!(count, self.len, "length mismatch");
            }
            assert!(count <= below, "level {level} is not a subset");
            below = count;
        }
    }

    /// Build a list holding `values`, each inserted after its equal run with
    /// the given tower height.
    pub(crate) fn with_heights(mut self, values: impl IntoIterator<Item = (V, usize)>) -> Self {
        for (value, height) in values {
            let pos = self.search(Bound::Upper, self.order.key(&value));
            self.attach(pos, Tower::new(value, height));
        }
        self
    }
}
