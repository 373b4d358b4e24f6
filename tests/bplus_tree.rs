use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};

use bplus_index::{BPlusTree, Error, Order};
use pretty_assertions::assert_eq;
use proptest::prelude::*;

/// The number of operations to perform in each proptest case.
const TEST_SIZE: usize = 2_000;

/// Generates values in a narrow range so that duplicates are common.
fn value_strategy() -> impl Strategy<Value = i64> {
    -200i64..200i64
}

fn order_strategy() -> impl Strategy<Value = usize> {
    prop_oneof![2usize..9, Just(32usize), Just(128usize)]
}

/// Multiset model: key -> number of copies.
type Model = BTreeMap<i64, usize>;

fn model_remove(model: &mut Model, key: i64) -> Option<i64> {
    let count = model.get_mut(&key)?;
    *count -= 1;
    if *count == 0 {
        model.remove(&key);
    }
    Some(key)
}

fn model_keys(model: &Model) -> Vec<i64> {
    model.iter().flat_map(|(&k, &n)| std::iter::repeat_n(k, n)).collect()
}

// ─── Operations enum for driving randomized tests ────────────────────────────

#[derive(Debug, Clone)]
enum TreeOp {
    Insert(i64),
    Remove(i64),
    Get(i64),
    First,
    Last,
    Clear,
}

fn tree_op_strategy() -> impl Strategy<Value = TreeOp> {
    prop_oneof![
        50 => value_strategy().prop_map(TreeOp::Insert),
        35 => value_strategy().prop_map(TreeOp::Remove),
        20 => value_strategy().prop_map(TreeOp::Get),
        2 => Just(TreeOp::First),
        2 => Just(TreeOp::Last),
        1 => Just(TreeOp::Clear),
    ]
}

// ─── Core operations ─────────────────────────────────────────────────────────

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    /// Replays a random sequence of operations on both a BPlusTree and a multiset model
    /// and asserts identical results at every step.
    #[test]
    fn ops_match_multiset_model(
        order in order_strategy(),
        ops in proptest::collection::vec(tree_op_strategy(), TEST_SIZE),
    ) {
        let mut tree = BPlusTree::with_order(order).unwrap();
        let mut model = Model::new();

        for op in &ops {
            match *op {
                TreeOp::Insert(v) => {
                    tree.insert(v);
                    *model.entry(v).or_default() += 1;
                }
                TreeOp::Remove(v) => {
                    prop_assert_eq!(tree.remove(&v), model_remove(&mut model, v), "remove({})", v);
                }
                TreeOp::Get(v) => {
                    let expected = model.contains_key(&v).then_some(v);
                    prop_assert_eq!(tree.get(&v).copied(), expected, "get({})", v);
                    prop_assert_eq!(tree.contains(&v), expected.is_some());
                }
                TreeOp::First => {
                    prop_assert_eq!(tree.first(), model.keys().next());
                }
                TreeOp::Last => {
                    prop_assert_eq!(tree.last(), model.keys().next_back());
                }
                TreeOp::Clear => {
                    tree.clear();
                    model.clear();
                    prop_assert_eq!(tree.height(), 1);
                }
            }
            prop_assert_eq!(tree.len(), model.values().sum::<usize>());
        }

        prop_assert_eq!(tree.iter().copied().collect::<Vec<_>>(), model_keys(&model));
    }

    #[test]
    fn iter_matches_sorted_input(
        order in order_strategy(),
        values in proptest::collection::vec(value_strategy(), 0..TEST_SIZE),
    ) {
        let mut tree = BPlusTree::with_order(order).unwrap();
        tree.extend(values.iter().copied());

        let mut sorted = values.clone();
        sorted.sort_unstable();
        prop_assert_eq!(tree.iter().copied().collect::<Vec<_>>(), sorted.clone());

        sorted.reverse();
        prop_assert_eq!(tree.iter().rev().copied().collect::<Vec<_>>(), sorted);
        prop_assert_eq!(tree.iter().len(), values.len());
    }

    #[test]
    fn iter_size_and_double_ended(
        order in order_strategy(),
        values in proptest::collection::vec(value_strategy(), 1..TEST_SIZE),
        take_front in 0usize..64,
    ) {
        let tree: BPlusTree<i64> = {
            let mut tree = BPlusTree::with_order(order).unwrap();
            tree.extend(values.iter().copied());
            tree
        };
        let set: BTreeSet<i64> = values.iter().copied().collect();

        let mut iter = tree.iter();
        for _ in 0..take_front.min(values.len()) {
            iter.next();
        }
        let remaining = iter.len();
        prop_assert_eq!(iter.clone().count(), remaining);

        // Walking backwards must meet the forward cursor exactly.
        let back: Vec<i64> = iter.rev().copied().collect();
        prop_assert_eq!(back.len(), remaining);
        prop_assert!(back.windows(2).all(|w| w[0] >= w[1]));
        prop_assert!(back.iter().all(|v| set.contains(v)));
    }

    #[test]
    fn remove_everything_in_random_order(
        order in order_strategy(),
        values in proptest::collection::vec(value_strategy(), 0..TEST_SIZE),
        removal in proptest::collection::vec(any::<prop::sample::Index>(), 0..TEST_SIZE),
    ) {
        let mut tree = BPlusTree::with_order(order).unwrap();
        tree.extend(values.iter().copied());

        let mut pending = values.clone();
        for index in removal {
            if pending.is_empty() {
                break;
            }
            let key = pending.swap_remove(index.index(pending.len()));
            prop_assert_eq!(tree.remove(&key), Some(key));
        }
        for key in pending.drain(..) {
            prop_assert_eq!(tree.remove(&key), Some(key));
        }

        prop_assert!(tree.is_empty());
        prop_assert_eq!(tree.height(), 1);
        prop_assert_eq!(tree.first(), None);
        prop_assert_eq!(tree.iter().next(), None);
    }
}

// ─── Structural scenarios ────────────────────────────────────────────────────

#[test]
fn ascending_inserts_grow_the_root() {
    let mut tree = BPlusTree::with_order(4).unwrap();
    for key in 0..3 {
        tree.insert(key);
        assert_eq!(tree.height(), 1);
    }
    tree.insert(3);
    assert_eq!(tree.height(), 2);

    for key in 4..16 {
        tree.insert(key);
    }
    assert_eq!(tree.iter().copied().collect::<Vec<_>>(), (0..16).collect::<Vec<_>>());
    assert_eq!(tree.iter().rev().copied().collect::<Vec<_>>(), (0..16).rev().collect::<Vec<_>>());
}

#[test]
fn removal_sequence_leaves_remaining_keys() {
    let mut tree = BPlusTree::with_order(4).unwrap();
    tree.extend(0..16);

    let removals = [2, 1, 0, 5, 10, 15, 14, 4, 11, 3, 6, 12];
    for key in removals {
        assert_eq!(tree.remove(&key), Some(key));
        assert_eq!(tree.get(&key), None);
    }

    for key in [7, 8, 9, 13] {
        assert_eq!(tree.get(&key), Some(&key));
    }
    assert_eq!(tree.len(), 4);
    assert_eq!(format!("{tree:?}"), "[7, 8, 9, 13]");
}

#[test]
fn order_two_drains_to_empty() {
    let mut tree = BPlusTree::with_order(2).unwrap();
    tree.extend([1, 2, 3]);
    assert_eq!(tree.height(), 2);

    for key in [2, 3, 1] {
        assert_eq!(tree.remove(&key), Some(key));
    }
    assert!(tree.is_empty());
    assert_eq!(tree.height(), 1);

    // The emptied tree is fully usable again.
    tree.extend([9, 8, 7]);
    assert_eq!(tree.iter().copied().collect::<Vec<_>>(), [7, 8, 9]);
}

#[test]
fn absent_keys_are_not_errors() {
    let mut tree: BPlusTree<i32> = (0..100).map(|k| k * 2).collect();
    let before = tree.clone();

    assert_eq!(tree.get(&1), None);
    assert_eq!(tree.remove(&1), None);
    assert_eq!(tree.remove(&-1), None);
    assert_eq!(tree.remove(&1_000), None);
    assert_eq!(tree, before);
}

#[test]
fn invalid_orders_are_rejected() {
    assert_eq!(BPlusTree::<u8>::with_order(0).unwrap_err(), Error::OrderTooSmall { order: 0, minimum: 2 });
    assert_eq!(BPlusTree::<u8>::with_order(1).unwrap_err(), Error::OrderTooSmall { order: 1, minimum: 2 });
    assert_eq!(BPlusTree::<u8>::with_order(2).map(|t| t.order()), Order::new(2));
    assert_eq!(BPlusTree::<u8>::default().order(), Order::DEFAULT);
}

// ─── Duplicate keys ──────────────────────────────────────────────────────────

/// A key that orders by `key` alone; `id` tells equal keys apart.
#[derive(Debug, Clone)]
struct Tagged {
    key: i32,
    id: u32,
}

impl PartialEq for Tagged {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
    }
}

impl Eq for Tagged {}

impl PartialOrd for Tagged {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Tagged {
    fn cmp(&self, other: &Self) -> Ordering {
        self.key.cmp(&other.key)
    }
}

fn probe(key: i32) -> Tagged {
    Tagged { key, id: u32::MAX }
}

#[test]
fn two_equal_keys_survive_get_remove_cycles() {
    let mut tree = BPlusTree::with_order(4).unwrap();
    tree.insert(Tagged { key: 1, id: 1 });
    tree.insert(Tagged { key: 1, id: 2 });

    let first = tree.get(&probe(1)).map(|t| t.id);
    let removed = tree.remove(&probe(1)).map(|t| t.id);
    assert!(first.is_some());
    assert_eq!(removed, first);

    let second = tree.get(&probe(1)).map(|t| t.id);
    assert!(second.is_some() && second != first);
    assert_eq!(tree.remove(&probe(1)).map(|t| t.id), second);
    assert_eq!(tree.get(&probe(1)), None);
}

#[test]
fn equal_keys_are_all_kept() {
    for order in [2, 3, 4, 16] {
        let mut tree = BPlusTree::with_order(order).unwrap();
        for id in 0..40 {
            tree.insert(Tagged { key: i32::try_from(id % 4).unwrap(), id });
        }
        assert_eq!(tree.len(), 40);

        let found = tree.get(&probe(2)).unwrap();
        assert_eq!(found.key, 2);

        let mut ids: Vec<u32> = std::iter::from_fn(|| tree.remove(&probe(2))).map(|t| t.id).collect();
        ids.sort_unstable();
        assert_eq!(ids, (0..40).filter(|id| id % 4 == 2).collect::<Vec<_>>());
        assert_eq!(tree.get(&probe(2)), None);
        assert_eq!(tree.len(), 30);

        let keys: Vec<i32> = tree.iter().map(|t| t.key).collect();
        assert!(keys.windows(2).all(|w| w[0] <= w[1]));
        assert!(keys.iter().all(|&k| k != 2));
    }
}

#[test]
fn long_run_of_one_key_spans_many_leaves() {
    let mut tree = BPlusTree::with_order(3).unwrap();
    tree.extend(std::iter::repeat_n(5, 200));
    tree.extend([4, 6]);
    assert!(tree.height() > 3);

    for remaining in (0..200).rev() {
        assert_eq!(tree.remove(&5), Some(5));
        assert_eq!(tree.contains(&5), remaining > 0);
    }
    assert_eq!(tree.iter().copied().collect::<Vec<_>>(), [4, 6]);
}

// ─── Borrowed lookups ────────────────────────────────────────────────────────

#[test]
fn string_keys_accept_str_lookups() {
    let mut tree = BPlusTree::with_order(4).unwrap();
    for word in ["pear", "apple", "kiwi", "fig", "apple", "date"] {
        tree.insert(String::from(word));
    }

    assert!(tree.contains("kiwi"));
    assert_eq!(tree.remove("apple").as_deref(), Some("apple"));
    assert!(tree.contains("apple"));
    assert_eq!(tree.remove("plum"), None);
    assert_eq!(tree.first().map(String::as_str), Some("apple"));
    assert_eq!(tree.last().map(String::as_str), Some("pear"));
}
