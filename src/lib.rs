//! `interval_set` is an ordered multiset of values keyed by closed intervals,
//! backed by an augmented red-black tree.
//!
//! The set answers "which values are stored under an interval overlapping
//! `[low, high]`" in `O(log n + m)` time, where `m` is the number of results.
//! Several distinct values may share one interval key; the set rejects
//! duplicate values under the same key.
//!
//! To safely and efficiently handle insertion and deletion in Rust, the tree
//! stores its nodes in a vector and links them by index rather than by owning
//! references. Rotations and rebalancing become index reassignments, and the
//! structure is `Send` and `Unpin` as a consequence.
//!
//! # Example
//!
//! ```rust
//! use interval_set::{Interval, IntervalSet};
//!
//! let mut set = IntervalSet::new();
//! set.insert(Interval::new(0, 10), "a");
//! set.insert(Interval::new(0, 10), "b");
//! set.insert(Interval::new(25, 30), "c");
//!
//! let hits: Vec<_> = set
//!     .overlapping(&Interval::new(5, 20))
//!     .map(|(_, v)| *v)
//!     .collect();
//! assert_eq!(hits, ["a", "b"]);
//! ```

mod index;
mod interval;
mod iter;
mod node;
mod set;

#[cfg(feature = "graphviz")]
mod graphviz;

#[cfg(test)]
mod tests;

pub use index::{DefaultIx, IndexType, NodeIndex};
pub use interval::Interval;
pub use iter::{Iter, RangeIter, StaleView, SubSet};
pub use set::IntervalSet;
