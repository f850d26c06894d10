//! Errors reported by the skiplist when a precondition is not met.
//!
//! Misusing a cursor or handing an invalid run of nodes to a merge never
//! corrupts the rings: the operation is rejected before any link is touched.

use std::fmt;

use thiserror::Error;

use crate::{level_generator::GeometricError, node::Node};

/// Errors that can occur when operating on a [`SkipList`][crate::SkipList].
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[expect(
    clippy::module_name_repetitions,
    reason = "Using 'Error' would be too generic and may cause confusion."
)]
#[non_exhaustive]
pub enum SkipListError {
    /// The end cursor does not refer to an element.
    #[error("the end cursor does not refer to an element.")]
    EndCursor,
    /// The cursor was produced by a different skiplist.
    #[error("cursor belongs to a different skiplist.")]
    ForeignCursor,
    /// The element the cursor referred to has since been removed.
    #[error("cursor refers to an element which is no longer in the skiplist.")]
    StaleCursor,
    /// The end of a range is not reachable from its start.
    #[error("the end of the range does not follow its start.")]
    InvalidRange,
    /// A tower only has links for the levels below its height.
    #[error("level {level} is out of range for a tower of height {height}.")]
    LevelOutOfRange {
        /// The level which was requested.
        level: usize,
        /// The height of the tower.
        height: usize,
    },
    /// The nodes of a run are not in ascending key order.
    #[error("the nodes of the run are not in ascending key order.")]
    UnorderedRun,
    /// A detached tower is taller than the receiving skiplist allows.
    #[error("tower of height {height} exceeds the max level {max_level}.")]
    TooTall {
        /// The height of the tower.
        height: usize,
        /// The max level of the receiving skiplist.
        max_level: usize,
    },
    /// The level generator could not be created.
    #[error(transparent)]
    Geometric(#[from] GeometricError),
}

/// A merge which was rejected before touching the skiplist.
///
/// The detached nodes are handed back to the caller unchanged so that they can
/// be merged elsewhere or dropped.
#[derive(Error)]
#[error("merge of {} node(s) rejected: {reason}", .nodes.len())]
pub struct MergeError<V> {
    /// Why the merge was rejected.
    #[source]
    pub reason: SkipListError,
    /// The nodes which were not merged, in the order they were given.
    pub nodes: Vec<Node<V>>,
}

impl<V> fmt::Debug for MergeError<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MergeError")
            .field("reason", &self.reason)
            .field("nodes", &self.nodes.len())
            .finish()
    }
}
