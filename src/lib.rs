//! A skiplist is a way of storing elements in such a way that elements can be
//! efficiently accessed, inserted and removed, all in `O(log(n))` on average.
//!
//! Conceptually, a skiplist resembles something like:
//!
//! ```text
//! <sentinel> ----------> [2] --------------------------------------------------> [9] ----------> <sentinel>
//! <sentinel> ----------> [2] ------------------------------------[7] ----------> [9] ----------> <sentinel>
//! <sentinel> ----------> [2] ----------> [4] ------------------> [7] ----------> [9] --> [10] -> <sentinel>
//! <sentinel> --> [1] --> [2] --> [3] --> [4] --> [5] --> [6] --> [7] --> [8] --> [9] --> [10] -> <sentinel>
//! ```
//!
//! where each tower `[x]` has links to towers further down the list, allowing
//! the algorithm to effectively skip ahead. Every level is a ring: it is
//! doubly linked and closes back onto a payload-less sentinel tower, which
//! also serves as the end position.
//!
//! [`SkipList`] keeps values sorted by a key projected out of each value, and
//! allows several values with equivalent keys. It can be used as a multiset
//! ([`SkipMultiSet`]), as a multimap of `(key, payload)` pairs
//! ([`SkipMultiMap`]), or with any key projection and strict weak order.
//!
//! Positions are [`Cursor`]s, which are checked on every use: a cursor from
//! another list, or to an element which has since been removed, is reported
//! as a [`SkipListError`]. Elements can be detached as [`Node`]s, which keep
//! their value and tower, and merged into another list without copying.
//!
//! ```
//! use multiskip::SkipList;
//!
//! let mut a: SkipList<i32> = [5, 1, 3, 3].into_iter().collect();
//! assert_eq!(a.count(&3), 2);
//!
//! let mut b: SkipList<i32> = [2, 4].into_iter().collect();
//! let threes = a.extract_key(&3);
//! b.merge_run(threes).unwrap();
//! assert_eq!(a.to_string(), "[1, 5]");
//! assert_eq!(b.to_string(), "[2, 3, 3, 4]");
//! ```

mod arena;
mod builder;
mod cursor;
mod error;
mod iter;
pub mod level_generator;
mod node;
mod order;
mod skiplist;
mod tower;

pub use builder::{Builder, DEFAULT_MAX_LEVEL, DEFAULT_P};
pub use cursor::Cursor;
pub use error::{MergeError, SkipListError};
pub use iter::{IntoIter, Iter};
pub use node::Node;
pub use skiplist::{SkipList, SkipMultiMap, SkipMultiSet};
