//! The `Interval` key stored in `IntervalSet`, representing the closed range
//! `[low, high]`.
//!
//! Intervals are ordered by `low` first and `high` second, which is the order
//! the underlying search tree uses and the order traversal yields keys in.
//! For intervals of type `Interval<u32>`:
//! - [1,4] < [2,5], because 1 < 2
//! - [1,4] < [1,5], because 4 < 5
//!
//! This ordering is not the overlap relation: [1,4] and [2,5] overlap even
//! though they are unequal. Overlap queries rely on the tree's maximum-high
//! augmentation instead.
//!
//! Both bounds are inclusive, so point intervals with `low == high` are legal
//! keys. A point interval overlaps exactly the intervals containing its
//! position.

/// A closed interval `[low, high]` with `low <= high`.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[non_exhaustive]
pub struct Interval<T> {
    /// Inclusive lower bound
    pub low: T,
    /// Inclusive upper bound
    pub high: T,
}

impl<T: Ord> Interval<T> {
    /// Create a new `Interval`
    ///
    /// # Panics
    ///
    /// This method panics when `low > high`
    #[inline]
    pub fn new(low: T, high: T) -> Self {
        assert!(low <= high, "invalid range");
        Self { low, high }
    }

    /// Create a point interval `[at, at]`
    #[inline]
    pub fn point(at: T) -> Self
    where
        T: Clone,
    {
        Self {
            low: at.clone(),
            high: at,
        }
    }

    /// Checks if self overlaps with another interval.
    ///
    /// Closed bounds make this inclusive on both ends: `[0, 5]` and `[5, 9]`
    /// overlap at the single position 5.
    #[inline]
    pub fn overlaps(&self, other: &Self) -> bool {
        self.low <= other.high && self.high >= other.low
    }

    /// Checks if self contains the given position
    #[inline]
    pub fn contains_point(&self, at: &T) -> bool {
        self.low <= *at && self.high >= *at
    }
}
