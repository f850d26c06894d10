//! The ordering capabilities injected into a skiplist: a key projection and a
//! strict weak order over keys.

use std::rc::Rc;

/// Projects a stored value onto its key.
pub(crate) type KeyOf<K, V> = Rc<dyn Fn(&V) -> &K>;

/// A strict weak order over keys.
pub(crate) type Less<K> = Rc<dyn Fn(&K, &K) -> bool>;

/// The key projection of sets, where the value is its own key.
#[inline]
pub(crate) fn identity<T>(value: &T) -> &T {
    value
}

/// The key projection of maps, where the key is the first half of the pair.
#[inline]
pub(crate) fn first<K, P>(pair: &(K, P)) -> &K {
    &pair.0
}

/// The default order of keys.
#[inline]
pub(crate) fn natural<K: Ord>(a: &K, b: &K) -> bool {
    a < b
}

pub(crate) struct Order<K, V> {
    key_of: KeyOf<K, V>,
    less: Less<K>,
}

impl<K, V> Order<K, V> {
    pub fn new(key_of: KeyOf<K, V>, less: Less<K>) -> Self {
        Order { key_of, less }
    }

    #[inline]
    pub fn key<'a>(&self, value: &'a V) -> &'a K {
        (self.key_of)(value)
    }

    #[inline]
    pub fn less(&self, a: &K, b: &K) -> bool {
        (self.less)(a, b)
    }

    /// `a <= b`, i.e. `!(b < a)`.
    #[inline]
    pub fn less_eq(&self, a: &K, b: &K) -> bool {
        !(self.less)(b, a)
    }

    /// Neither key orders before the other.
    #[inline]
    pub fn equiv(&self, a: &K, b: &K) -> bool {
        !(self.less)(a, b) && !(self.less)(b, a)
    }
}

// The capabilities are shared, not duplicated, so `K` and `V` need not be
// `Clone`.
impl<K, V> Clone for Order<K, V> {
    fn clone(&self) -> Self {
        Order {
            key_of: Rc::clone(&self.key_of),
            less: Rc::clone(&self.less),
        }
    }
}
