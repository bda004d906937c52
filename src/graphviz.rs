//! Graphviz dot rendering of the tree, for debugging the balancing and the
//! maximum-high augmentation. Enabled by the `graphviz` feature.

use std::fmt::Debug;
use std::fs;
use std::io;
use std::path::Path;

use crate::index::IndexType;
use crate::set::IntervalSet;

impl<T, V, Ix> IntervalSet<T, V, Ix>
where
    T: Ord + Debug,
    V: Debug,
    Ix: IndexType,
{
    /// Render the tree in dot format, one record per node showing the key,
    /// the subtree maximum, and the stored values.
    #[must_use]
    pub fn dot(&self) -> String {
        let mut out = String::from("digraph interval_set {\nnode [shape=record];\n");
        for (idx, node) in self.nodes.iter().enumerate() {
            let Some(interval) = node.interval.as_ref() else {
                continue;
            };
            let fill = if node.is_red() { "indianred1" } else { "gray" };
            out.push_str(&format!(
                "n{idx} [style=filled fillcolor={fill} label=\"{{[{:?}, {:?}] | max {:?} | {:?}}}\"];\n",
                interval.low,
                interval.high,
                self.max(crate::index::NodeIndex::new(idx)).unwrap(),
                node.values,
            ));
            for child in [node.left(), node.right()] {
                if !self.nodes[child.index()].is_sentinel() {
                    out.push_str(&format!("n{idx} -> n{};\n", child.index()));
                }
            }
        }
        out.push_str("}\n");
        out
    }

    /// Write the dot rendering to a file.
    ///
    /// # Errors
    ///
    /// Returns any I/O error raised while writing the file.
    #[inline]
    pub fn draw(&self, path: impl AsRef<Path>) -> io::Result<()> {
        fs::write(path, self.dot())
    }
}
