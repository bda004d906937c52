//! Iteration over an `IntervalSet`: full in-order traversal, ordered overlap
//! traversal, and the detached [`SubSet`] range view.
//!
//! Both traversals keep a stack of the pending left spine instead of chasing
//! parent links, and both yield every value stored under a node before
//! advancing to the next node.

use thiserror::Error;

use crate::index::{DefaultIx, IndexType, NodeIndex};
use crate::interval::Interval;
use crate::node::Node;
use crate::set::IntervalSet;

/// Error returned when a [`SubSet`] view is attached to a set that has been
/// modified since the view was built.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("interval set modified since the view was built (view saw version {expected}, set is at {actual})")]
pub struct StaleView {
    /// The set version the view captured
    pub expected: u64,
    /// The set version at attach time
    pub actual: u64,
}

/// Pushes a link of nodes on the left to the stack.
fn left_link<T, V, Ix>(set_ref: &IntervalSet<T, V, Ix>, mut x: NodeIndex<Ix>) -> Vec<NodeIndex<Ix>>
where
    T: Ord,
    Ix: IndexType,
{
    let mut nodes = vec![];
    while !set_ref.node_ref(x, Node::is_sentinel) {
        nodes.push(x);
        x = set_ref.node_ref(x, Node::left);
    }
    nodes
}

/// Pushes a link of nodes on the left to the stack, pruning subtrees whose
/// maximum high bound falls short of the query's low bound.
///
/// Nodes are pushed even when they do not themselves overlap, as long as
/// their low bound does not pass the query's high bound; the walk skips them
/// on pop. Their left subtrees may still hold overlapping keys.
fn pruned_left_link<T, V, Ix>(
    set_ref: &IntervalSet<T, V, Ix>,
    mut x: NodeIndex<Ix>,
    query: &Interval<T>,
) -> Vec<NodeIndex<Ix>>
where
    T: Ord,
    Ix: IndexType,
{
    let mut stack: Vec<NodeIndex<Ix>> = vec![];
    if set_ref.max(x).is_some_and(|high| high < &query.low) {
        return stack;
    }
    while set_ref.node_ref(x, Node::non_sentinel).is_some() {
        if set_ref.node_ref(x, Node::interval).low <= query.high {
            stack.push(x);
        }
        if set_ref.max(set_ref.node_ref(x, Node::left)) < Some(&query.low) {
            break;
        }
        x = set_ref.node_ref(x, Node::left);
    }
    stack
}

/// An iterator over every value of an `IntervalSet`, in ascending key order.
#[derive(Debug)]
pub struct Iter<'a, T, V, Ix = DefaultIx>
where
    T: Ord,
{
    /// Reference to the set
    set_ref: &'a IntervalSet<T, V, Ix>,
    /// Stack for iteration
    stack: Vec<NodeIndex<Ix>>,
    /// Node whose value set is being drained, and the next value offset
    current: Option<(NodeIndex<Ix>, usize)>,
}

impl<'a, T, V, Ix> Iter<'a, T, V, Ix>
where
    T: Ord,
    Ix: IndexType,
{
    pub(crate) fn new(set_ref: &'a IntervalSet<T, V, Ix>) -> Self {
        Iter {
            set_ref,
            stack: left_link(set_ref, set_ref.root),
            current: None,
        }
    }
}

impl<'a, T, V, Ix> Iterator for Iter<'a, T, V, Ix>
where
    T: Ord,
    Ix: IndexType,
{
    type Item = (&'a Interval<T>, &'a V);

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        if let Some((node, offset)) = self.current {
            if offset < self.set_ref.node_ref(node, |n| n.values.len()) {
                self.current = Some((node, offset + 1));
                return Some(
                    self.set_ref
                        .node_ref(node, |n| (n.interval(), &n.values[offset])),
                );
            }
            self.current = None;
        }
        let x = self.stack.pop()?;
        self.stack.extend(left_link(
            self.set_ref,
            self.set_ref.node_ref(x, Node::right),
        ));
        self.current = Some((x, 1));
        Some(self.set_ref.node_ref(x, |n| (n.interval(), &n.values[0])))
    }
}

/// A detached, reusable view of the values overlapping a query interval.
///
/// The view owns its query bounds and the eagerly computed entry spine, so it
/// borrows nothing from the set and may be kept across later mutations; it
/// must be re-attached with [`values`](Self::values) to iterate. Attaching a
/// view whose set has been modified in the meantime reports [`StaleView`]
/// rather than walking a tree the spine no longer describes.
#[derive(Debug, Clone)]
pub struct SubSet<T, Ix = DefaultIx>
where
    T: Ord,
{
    /// The query interval
    query: Interval<T>,
    /// Pruned left spine from the root, ending at the first candidate node
    spine: Vec<NodeIndex<Ix>>,
    /// The set version this view was built against
    version: u64,
}

impl<T, Ix> SubSet<T, Ix>
where
    T: Ord,
    Ix: IndexType,
{
    pub(crate) fn new<V>(set_ref: &IntervalSet<T, V, Ix>, query: Interval<T>) -> Self {
        SubSet {
            spine: pruned_left_link(set_ref, set_ref.root, &query),
            version: set_ref.version,
            query,
        }
    }

    /// The interval this view queries.
    #[inline]
    #[must_use]
    pub fn interval(&self) -> &Interval<T> {
        &self.query
    }

    /// Attach the view to the set it was built from and iterate the
    /// overlapping values in ascending key order.
    ///
    /// # Errors
    ///
    /// Returns [`StaleView`] when the set has been modified since the view
    /// was built.
    #[inline]
    pub fn values<'a, V>(
        &'a self,
        set_ref: &'a IntervalSet<T, V, Ix>,
    ) -> Result<RangeIter<'a, T, V, Ix>, StaleView> {
        if set_ref.version != self.version {
            return Err(StaleView {
                expected: self.version,
                actual: set_ref.version,
            });
        }
        Ok(RangeIter {
            set_ref,
            stack: self.spine.clone(),
            query: &self.query,
            current: None,
        })
    }
}

/// An ordered iterator over the values whose intervals overlap a query.
#[derive(Debug)]
pub struct RangeIter<'a, T, V, Ix = DefaultIx>
where
    T: Ord,
{
    /// Reference to the set
    set_ref: &'a IntervalSet<T, V, Ix>,
    /// Stack for iteration
    stack: Vec<NodeIndex<Ix>>,
    /// The query interval
    query: &'a Interval<T>,
    /// Node whose value set is being drained, and the next value offset
    current: Option<(NodeIndex<Ix>, usize)>,
}

impl<'a, T, V, Ix> RangeIter<'a, T, V, Ix>
where
    T: Ord,
    Ix: IndexType,
{
    pub(crate) fn new(set_ref: &'a IntervalSet<T, V, Ix>, query: &'a Interval<T>) -> Self {
        RangeIter {
            set_ref,
            stack: pruned_left_link(set_ref, set_ref.root, query),
            query,
            current: None,
        }
    }

    /// Advances to the next node overlapping the query, extending the stack
    /// with each popped node's pruned right spine.
    fn next_node(&mut self) -> Option<NodeIndex<Ix>> {
        loop {
            let x = self.stack.pop()?;
            self.stack.extend(pruned_left_link(
                self.set_ref,
                self.set_ref.node_ref(x, Node::right),
                self.query,
            ));
            if self.set_ref.node_ref(x, Node::interval).overlaps(self.query) {
                return Some(x);
            }
        }
    }
}

impl<'a, T, V, Ix> Iterator for RangeIter<'a, T, V, Ix>
where
    T: Ord,
    Ix: IndexType,
{
    type Item = (&'a Interval<T>, &'a V);

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        if let Some((node, offset)) = self.current {
            if offset < self.set_ref.node_ref(node, |n| n.values.len()) {
                self.current = Some((node, offset + 1));
                return Some(
                    self.set_ref
                        .node_ref(node, |n| (n.interval(), &n.values[offset])),
                );
            }
            self.current = None;
        }
        let x = self.next_node()?;
        self.current = Some((x, 1));
        Some(self.set_ref.node_ref(x, |n| (n.interval(), &n.values[0])))
    }
}
