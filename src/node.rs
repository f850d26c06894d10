//! Detached towers.

use std::fmt;

use crate::tower::Tower;

/// A tower which has been extracted from a skiplist.
///
/// The node owns its value and keeps the height it was given on insertion, so
/// that merging it back does not need to draw a new one. Dropping the node
/// drops the value.
pub struct Node<V> {
    tower: Tower<V>,
}

impl<V> Node<V> {
    /// Wrap an unlinked tower holding a value.
    pub(crate) fn new(tower: Tower<V>) -> Self {
        debug_assert!(tower.value().is_some(), "the sentinel cannot be detached");
        Node { tower }
    }

    pub(crate) fn into_tower(self) -> Tower<V> {
        self.tower
    }

    /// The value held by the node.
    #[inline]
    #[must_use]
    pub fn value(&self) -> &V {
        match self.tower.value() {
            Some(value) => value,
            None => unreachable!("nodes always hold a value"),
        }
    }

    /// A mutable reference to the value held by the node.
    ///
    /// The node is detached, so changing the key is allowed; it only has to
    /// be consistent with the order of the list it is merged into.
    #[inline]
    #[must_use]
    pub fn value_mut(&mut self) -> &mut V {
        match self.tower.value_mut() {
            Some(value) => value,
            None => unreachable!("nodes always hold a value"),
        }
    }

    /// Consumes the node, returning its value.
    #[inline]
    #[must_use]
    pub fn into_value(self) -> V {
        match self.tower.into_value() {
            Some(value) => value,
            None => unreachable!("nodes always hold a value"),
        }
    }

    /// The number of levels the node participates in once merged.
    #[inline]
    #[must_use]
    pub fn height(&self) -> usize {
        self.tower.height()
    }
}

impl<V: fmt::Debug> fmt::Debug for Node<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Node")
            .field("value", self.value())
            .field("height", &self.height())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::Node;
    use crate::tower::Tower;

    #[test]
    fn accessors() {
        let mut node = Node::new(Tower::new(String::from("a"), 3));
        assert_eq!(node.height(), 3);
        node.value_mut().push('b');
        assert_eq!(node.value(), "ab");
        assert_eq!(format!("{node:?}"), r#"Node { value: "ab", height: 3 }"#);
        assert_eq!(node.into_value(), "ab");
    }
}
