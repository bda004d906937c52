use std::collections::HashSet;

use rand::{rngs::StdRng, Rng, SeedableRng};

use crate::index::NodeIndex;
use crate::node::{Color, Node};
use crate::{Interval, IntervalSet, StaleView};

struct IntervalGenerator {
    rng: StdRng,
    unique: HashSet<Interval<i32>>,
    limit: i32,
}

impl IntervalGenerator {
    fn new(seed: [u8; 32]) -> Self {
        const LIMIT: i32 = 1000;
        Self {
            rng: SeedableRng::from_seed(seed),
            unique: HashSet::new(),
            limit: LIMIT,
        }
    }

    /// Closed intervals; point intervals with `low == high` are produced too.
    fn next(&mut self) -> Interval<i32> {
        let low = self.rng.gen_range(0..self.limit);
        let high = self.rng.gen_range(low..self.limit);
        Interval::new(low, high)
    }

    fn next_unique(&mut self) -> Interval<i32> {
        let mut interval = self.next();
        while self.unique.contains(&interval) {
            interval = self.next();
        }
        self.unique.insert(interval.clone());
        interval
    }

    fn next_with_range(&mut self, range: i32) -> Interval<i32> {
        let low = self.rng.gen_range(0..self.limit);
        let high = self
            .rng
            .gen_range(low..self.limit.min(low + 1 + range));
        Interval::new(low, high)
    }
}

impl<V: Eq> IntervalSet<i32, V> {
    fn check_max(&self) {
        let _ignore = self.check_max_inner(self.root);
    }

    fn check_max_inner(&self, x: NodeIndex<u32>) -> i32 {
        if self.node_ref(x, Node::is_sentinel) {
            return i32::MIN;
        }
        let l_max = self.check_max_inner(self.node_ref(x, Node::left));
        let r_max = self.check_max_inner(self.node_ref(x, Node::right));
        let max = self.node_ref(x, |x| x.interval().high.max(l_max).max(r_max));
        assert_eq!(self.max(x), Some(&max));
        max
    }

    /// 1. Every node is either red or black.
    /// 2. The root is black.
    /// 3. Every leaf (NIL) is black.
    /// 4. If a node is red, then both its children are black.
    /// 5. For each node, all simple paths from the node to descendant leaves
    ///    contain the same number of black nodes.
    fn check_rb_properties(&self) {
        assert!(matches!(
            self.node_ref(self.root, Node::color),
            Color::Black
        ));
        self.check_children_color(self.root);
        self.check_black_height(self.root);
    }

    fn check_children_color(&self, x: NodeIndex<u32>) {
        if self.node_ref(x, Node::is_sentinel) {
            return;
        }
        self.check_children_color(self.node_ref(x, Node::left));
        self.check_children_color(self.node_ref(x, Node::right));
        if self.node_ref(x, Node::is_red) {
            assert!(matches!(self.left_child_color(x), Color::Black));
            assert!(matches!(self.right_child_color(x), Color::Black));
        }
    }

    fn left_child_color(&self, x: NodeIndex<u32>) -> Color {
        let left = self.node_ref(x, Node::left);
        self.node_ref(left, Node::color)
    }

    fn right_child_color(&self, x: NodeIndex<u32>) -> Color {
        let right = self.node_ref(x, Node::right);
        self.node_ref(right, Node::color)
    }

    fn check_black_height(&self, x: NodeIndex<u32>) -> usize {
        if self.node_ref(x, Node::is_sentinel) {
            return 0;
        }
        let lefth = self.check_black_height(self.node_ref(x, Node::left));
        let righth = self.check_black_height(self.node_ref(x, Node::right));
        assert_eq!(lefth, righth);
        if self.node_ref(x, Node::is_black) {
            return lefth + 1;
        }
        lefth
    }

    fn height(&self) -> usize {
        self.height_inner(self.root)
    }

    fn height_inner(&self, x: NodeIndex<u32>) -> usize {
        if self.node_ref(x, Node::is_sentinel) {
            return 0;
        }
        let lefth = self.height_inner(self.node_ref(x, Node::left));
        let righth = self.height_inner(self.node_ref(x, Node::right));
        1 + lefth.max(righth)
    }
}

fn with_set_and_generator<V: Eq>(test_fn: impl Fn(IntervalSet<i32, V>, IntervalGenerator)) {
    let seeds = vec![[0; 32], [1; 32], [2; 32]];
    for seed in seeds {
        let gen = IntervalGenerator::new(seed);
        let set = IntervalSet::new();
        test_fn(set, gen);
    }
}

#[test]
fn red_black_tree_properties_is_satisfied() {
    with_set_and_generator(|mut set, mut gen| {
        let intervals: Vec<_> = std::iter::repeat_with(|| gen.next_unique())
            .take(1000)
            .collect();
        for i in intervals.clone() {
            assert!(set.insert(i, ()));
        }
        set.check_rb_properties();
        for i in intervals.iter().take(500) {
            assert!(set.remove_first(i, |_| true).is_some());
        }
        set.check_rb_properties();
    });
}

#[test]
fn check_max_is_ok() {
    with_set_and_generator(|mut set, mut gen| {
        let intervals: Vec<_> = std::iter::repeat_with(|| gen.next_unique())
            .take(1000)
            .collect();
        for i in intervals.clone() {
            let _ignore = set.insert(i, ());
            set.check_max();
        }
        assert_eq!(set.len(), 1000);
        for i in &intervals {
            let _ignore = set.remove_first(i, |_| true);
            set.check_max();
        }
        assert!(set.is_empty());
    });
}

#[test]
fn set_len_counts_values_not_nodes() {
    let mut set = IntervalSet::new();
    assert!(set.insert(Interval::new(5, 9), "a"));
    assert!(set.insert(Interval::new(5, 9), "b"));
    assert!(set.insert(Interval::new(5, 9), "c"));
    assert!(set.insert(Interval::new(7, 8), "a"));
    assert_eq!(set.len(), 4);

    // duplicate value under an identical key is a signaled no-op
    assert!(!set.insert(Interval::new(5, 9), "b"));
    assert_eq!(set.len(), 4);

    assert_eq!(set.remove_first(&Interval::new(5, 9), |_| true), Some("a"));
    assert_eq!(set.len(), 3);
    assert_eq!(set.get(&Interval::new(5, 9)).map(<[_]>::len), Some(2));
}

#[test]
fn check_overlaps_is_ok() {
    with_set_and_generator(|mut set, mut gen| {
        let intervals: Vec<_> = std::iter::repeat_with(|| gen.next_with_range(10))
            .take(100)
            .collect();
        for i in intervals.clone() {
            let _ignore = set.insert(i, ());
        }
        let to_check: Vec<_> = std::iter::repeat_with(|| gen.next_with_range(10))
            .take(1000)
            .collect();
        let expects: Vec<_> = to_check
            .iter()
            .map(|ci| intervals.iter().any(|i| ci.overlaps(i)))
            .collect();

        for (ci, expect) in to_check.into_iter().zip(expects.into_iter()) {
            assert_eq!(set.overlaps(&ci), expect);
        }
    });
}

#[test]
fn overlapping_matches_linear_scan() {
    with_set_and_generator(|mut set, mut gen| {
        // duplicate interval keys occur; the value makes each pair unique
        let pairs: Vec<_> = std::iter::repeat_with(|| gen.next_with_range(20))
            .take(800)
            .enumerate()
            .map(|(v, i)| (i, v))
            .collect();
        for (i, v) in pairs.clone() {
            assert!(set.insert(i, v));
        }
        assert_eq!(set.len(), 800);

        let queries: Vec<_> = std::iter::repeat_with(|| gen.next_with_range(20))
            .take(500)
            .collect();
        for q in queries {
            let mut expect: Vec<_> = pairs
                .iter()
                .filter(|(i, _)| q.overlaps(i))
                .cloned()
                .collect();
            let mut actual: Vec<_> = set
                .overlapping(&q)
                .map(|(i, v)| (i.clone(), *v))
                .collect();
            expect.sort_unstable();
            actual.sort_unstable();
            assert_eq!(expect, actual);
        }
    });
}

#[test]
fn overlapping_yields_keys_in_order() {
    with_set_and_generator(|mut set, mut gen| {
        for v in 0..500 {
            let _ignore = set.insert(gen.next_with_range(50), v);
        }
        let q = Interval::new(200, 600);
        let keys: Vec<_> = set.overlapping(&q).map(|(i, _)| i.clone()).collect();
        assert!(keys.windows(2).all(|w| w[0] <= w[1]));
    });
}

#[test]
fn iterate_through_set_is_sorted() {
    with_set_and_generator(|mut set, mut gen| {
        let mut pairs: Vec<_> = std::iter::repeat_with(|| gen.next_unique())
            .enumerate()
            .take(1000)
            .map(|(v, i)| (i, v))
            .collect();
        for (i, v) in pairs.clone() {
            let _ignore = set.insert(i, v);
        }
        pairs.sort_unstable_by(|a, b| a.0.cmp(&b.0));

        for ((ei, ev), (i, v)) in set.iter().zip(pairs.iter()) {
            assert_eq!(ei, i);
            assert_eq!(ev, v);
        }
        assert_eq!(set.iter().count(), set.len());
    });
}

#[test]
fn duplicate_values_round_trip() {
    let key = Interval::new(30, 40);
    let mut set = IntervalSet::new();
    for v in 0..5 {
        assert!(set.insert(key.clone(), v));
    }
    assert_eq!(set.len(), 5);

    let yielded: HashSet<_> = set.overlapping(&key).map(|(_, v)| *v).collect();
    assert_eq!(yielded, (0..5).collect());

    // a discriminating predicate removes exactly one value per call
    for v in 0..5 {
        assert_eq!(set.remove_first(&key, |x| *x == v), Some(v));
        assert_eq!(set.len(), 4 - v as usize);
    }
    assert!(set.get(&key).is_none());
    assert_eq!(set.overlapping(&key).count(), 0);
}

#[test]
fn full_iteration_yields_every_value_of_a_duplicate_key() {
    let mut set = IntervalSet::new();
    set.insert(Interval::new(0, 4), "a");
    set.insert(Interval::new(10, 11), "b");
    set.insert(Interval::new(10, 11), "c");
    set.insert(Interval::new(20, 22), "d");

    let entries: Vec<_> = set.iter().map(|(i, v)| (i.clone(), *v)).collect();
    assert_eq!(entries.len(), set.len());

    let keys: Vec<_> = entries.iter().map(|(i, _)| i.clone()).collect();
    assert!(keys.windows(2).all(|w| w[0] <= w[1]));

    // both values of the shared key appear before the walk moves on
    let under_shared: HashSet<_> = entries
        .iter()
        .filter(|(i, _)| *i == Interval::new(10, 11))
        .map(|(_, v)| *v)
        .collect();
    assert_eq!(under_shared, HashSet::from(["b", "c"]));
}

#[test]
fn remove_missing_returns_none() {
    with_set_and_generator(|mut set, mut gen| {
        let intervals: Vec<_> = std::iter::repeat_with(|| gen.next_unique())
            .take(1000)
            .collect();
        for i in intervals {
            let _ignore = set.insert(i, ());
        }
        assert_eq!(set.len(), 1000);
        let missing: Vec<_> = std::iter::repeat_with(|| gen.next_unique())
            .take(1000)
            .collect();
        for i in missing {
            assert_eq!(set.remove_first(&i, |_| true), None);
        }
        assert_eq!(set.len(), 1000);
    });
}

#[test]
fn remove_with_rejecting_criteria_is_a_noop() {
    let mut set = IntervalSet::new();
    set.insert(Interval::new(1, 5), "x");
    assert_eq!(set.remove_first(&Interval::new(1, 5), |_| false), None);
    assert_eq!(set.len(), 1);

    // a rejected removal must not invalidate existing views
    let view = set.sub_set(0, 9);
    assert_eq!(set.remove_first(&Interval::new(1, 5), |_| false), None);
    assert!(view.values(&set).is_ok());
}

#[test]
fn sub_set_view_is_reusable() {
    let mut set = IntervalSet::new();
    set.insert(Interval::new(0, 4), "a");
    set.insert(Interval::new(3, 8), "b");
    set.insert(Interval::new(9, 12), "c");

    let view = set.sub_set(4, 9);
    let first: Vec<_> = view.values(&set).unwrap().map(|(_, v)| *v).collect();
    let second: Vec<_> = view.values(&set).unwrap().map(|(_, v)| *v).collect();
    assert_eq!(first, ["a", "b", "c"]);
    assert_eq!(first, second);
    assert_eq!(view.interval(), &Interval::new(4, 9));
}

#[test]
fn stale_view_fails_fast() {
    let mut set = IntervalSet::new();
    set.insert(Interval::new(0, 4), "a");

    let view = set.sub_set(0, 9);
    set.insert(Interval::new(5, 6), "b");
    assert_eq!(
        view.values(&set).unwrap_err(),
        StaleView {
            expected: 1,
            actual: 2
        }
    );

    let view = set.sub_set(0, 9);
    set.remove_first(&Interval::new(5, 6), |_| true);
    assert!(view.values(&set).is_err());

    let view = set.sub_set(0, 9);
    set.clear();
    assert!(view.values(&set).is_err());

    // a no-op mutation attempt leaves views attachable
    let view = set.sub_set(0, 9);
    assert_eq!(set.remove_first(&Interval::new(0, 4), |_| true), None);
    assert!(view.values(&set).is_ok());
}

#[test]
fn point_queries_and_removal_scenario() {
    let mut set = IntervalSet::new();
    set.insert(Interval::new(0, 0), "a");
    set.insert(Interval::new(10, 11), "b");
    set.insert(Interval::new(10, 11), "c");
    set.insert(Interval::new(20, 22), "d");
    assert_eq!(set.len(), 4);

    // a point query returns the values of every interval containing it
    assert_eq!(set.overlapping(&Interval::point(9)).count(), 0);
    let at_ten: HashSet<_> = set
        .overlapping(&Interval::point(10))
        .map(|(_, v)| *v)
        .collect();
    assert_eq!(at_ten, HashSet::from(["b", "c"]));

    let keys: Vec<_> = set
        .overlapping(&Interval::new(0, 25))
        .map(|(i, _)| i.clone())
        .collect();
    assert_eq!(
        keys,
        [
            Interval::new(0, 0),
            Interval::new(10, 11),
            Interval::new(10, 11),
            Interval::new(20, 22),
        ]
    );

    assert_eq!(
        set.remove_first(&Interval::new(10, 11), |v| *v == "b"),
        Some("b")
    );
    let remaining: Vec<_> = set
        .overlapping(&Interval::new(10, 11))
        .map(|(_, v)| *v)
        .collect();
    assert_eq!(remaining, ["c"]);

    assert_eq!(
        set.remove_first(&Interval::new(10, 11), |v| *v == "c"),
        Some("c")
    );
    assert_eq!(set.overlapping(&Interval::new(10, 11)).count(), 0);
    assert_eq!(set.len(), 2);
}

#[test]
fn balance_bound_is_logarithmic() {
    with_set_and_generator(|mut set, mut gen| {
        let intervals: Vec<_> = std::iter::repeat_with(|| gen.next_unique())
            .take(1000)
            .collect();
        for i in intervals.clone() {
            let _ignore = set.insert(i, ());
        }
        for i in intervals.iter().take(500) {
            let _ignore = set.remove_first(i, |_| true);
        }
        let n = set.len() as f64;
        let bound = 2.0 * (n + 1.0).log2();
        assert!(
            (set.height() as f64) <= bound,
            "height {} exceeds {bound}",
            set.height()
        );
    });
}

#[test]
fn interval_set_clear_is_ok() {
    let mut set = IntervalSet::new();
    set.insert(Interval::new(1, 3), 1);
    set.insert(Interval::new(2, 4), 2);
    set.insert(Interval::new(6, 7), 3);
    assert_eq!(set.len(), 3);
    set.clear();
    assert_eq!(set.len(), 0);
    assert!(set.is_empty());
    assert_eq!(set.nodes.len(), 1);
    assert!(set.nodes[0].is_sentinel());
    assert_eq!(set.iter().count(), 0);
}

#[test]
fn get_returns_exact_key_values_only() {
    let mut set = IntervalSet::new();
    set.insert(Interval::new(2, 6), 15);
    set.insert(Interval::new(3, 7), 20);

    assert_eq!(set.get(&Interval::new(2, 6)), Some(&[15][..]));
    // overlapping but inexact keys do not match
    assert_eq!(set.get(&Interval::new(2, 7)), None);
}

#[cfg(feature = "serde")]
#[test]
fn serde_round_trip_preserves_contents() {
    let mut set = IntervalSet::<i32, i32>::new();
    set.insert(Interval::new(1, 5), 10);
    set.insert(Interval::new(3, 7), 20);
    set.insert(Interval::new(3, 7), 25);
    set.insert(Interval::new(2, 6), 15);

    let serialized = serde_json::to_string(&set).unwrap();
    let deserialized: IntervalSet<i32, i32> = serde_json::from_str(&serialized).unwrap();

    let original: Vec<_> = set.iter().collect();
    let restored: Vec<_> = deserialized.iter().collect();
    assert_eq!(original, restored);
    assert_eq!(set.len(), deserialized.len());
}

#[cfg(feature = "graphviz")]
#[test]
fn interval_set_draw_is_ok() {
    let mut set = IntervalSet::new();
    set.insert(Interval::new(16, 21), 30);
    set.insert(Interval::new(8, 9), 23);
    set.insert(Interval::new(0, 23), 3);
    set.insert(Interval::new(5, 6), 10);
    set.insert(Interval::new(15, 23), 23);

    let dot = set.dot();
    assert!(dot.starts_with("digraph"));
    assert_eq!(dot.matches("style=filled").count(), 5);

    let path = std::env::temp_dir().join("interval_set_test.dot");
    set.draw(&path).unwrap();
    let _ignore = std::fs::remove_file(path);
}
