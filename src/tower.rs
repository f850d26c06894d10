//! Towers are the unit of storage of the skiplist.
//!
//! A tower of height `h` carries `h` level records, one for each level
//! `0..h` it participates in. The records are allocated once, as a single
//! buffer sized by the height, and the height never changes afterwards.

/// Index of a tower within its arena.
pub(crate) type TowerId = usize;

/// The sentinel always lives in the first slot of the arena.
pub(crate) const SENTINEL: TowerId = 0;

// ////////////////////////////////////////////////////////////////////////////
// Link
// ////////////////////////////////////////////////////////////////////////////

/// The level record of a tower: its neighbours in the ring of one level.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Link {
    pub prev: TowerId,
    pub next: TowerId,
}

impl Link {
    /// A link pointing back at its own tower on both sides.
    #[inline]
    pub fn looped(id: TowerId) -> Self {
        Link { prev: id, next: id }
    }
}

// ////////////////////////////////////////////////////////////////////////////
// Tower
// ////////////////////////////////////////////////////////////////////////////

/// A multi-level node.
///
/// The value is `None` only for the sentinel.
#[derive(Debug)]
pub(crate) struct Tower<V> {
    value: Option<V>,
    links: Box<[Link]>,
}

impl<V> Tower<V> {
    /// Create the payload-less sentinel, self-looped at every level.
    pub fn sentinel(height: usize) -> Self {
        Tower {
            value: None,
            links: vec![Link::looped(SENTINEL); height].into_boxed_slice(),
        }
    }

    /// Create a new tower holding `value`.
    ///
    /// The links only become meaningful once the tower is placed in an arena,
    /// which self-loops them on the slot it is given.
    pub fn new(value: V, height: usize) -> Self {
        debug_assert!(height > 0, "towers have at least one level");
        Tower {
            value: Some(value),
            links: vec![Link::looped(SENTINEL); height].into_boxed_slice(),
        }
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.links.len()
    }

    #[inline]
    pub fn value(&self) -> Option<&V> {
        self.value.as_ref()
    }

    #[inline]
    pub fn value_mut(&mut self) -> Option<&mut V> {
        self.value.as_mut()
    }

    /// Consumes the tower returning the value it contains.
    #[inline]
    pub fn into_value(self) -> Option<V> {
        self.value
    }

    #[inline]
    pub fn link(&self, level: usize) -> Link {
        self.links[level]
    }

    #[inline]
    pub fn link_mut(&mut self, level: usize) -> &mut Link {
        &mut self.links[level]
    }

    /// Point every level of the tower back at `id`.
    pub fn self_loop(&mut self, id: TowerId) {
        self.links.fill(Link::looped(id));
    }

    /// Whether every level of the tower points back at `id`.
    pub fn is_self_looped(&self, id: TowerId) -> bool {
        self.links.iter().all(|&link| link == Link::looped(id))
    }
}
