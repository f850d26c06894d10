//! Randomised checks of the list against a sorted `Vec` model.

use proptest::{collection::vec, prelude::*, proptest};

use crate::{Builder, SkipList};

fn sorted(mut values: Vec<i16>) -> Vec<i16> {
    values.sort_unstable();
    values
}

fn build(values: &[i16], seed: u64) -> SkipList<i16> {
    let mut list = Builder::new()
        .max_level(6)
        .seed(seed)
        .build_set()
        .unwrap_or_else(|err| panic!("{err}"));
    list.extend(values.iter().copied());
    list
}

/// Number of steps from `first` to `last` on level 0.
fn distance(list: &SkipList<i16>, first: crate::Cursor, last: crate::Cursor) -> usize {
    list.range(first, last).map_or(usize::MAX, |iter| iter.len())
}

#[derive(Clone, Debug)]
enum Op {
    InsertEqual(i16),
    InsertUnique(i16),
    EraseKey(i16),
    EraseFirst(i16),
    ExtractRange(i16, i16),
    PopFront,
    PopBack,
    Unique,
}

fn op() -> impl Strategy<Value = Op> {
    let key = -20_i16..20;
    prop_oneof![
        4 => key.clone().prop_map(Op::InsertEqual),
        2 => key.clone().prop_map(Op::InsertUnique),
        1 => key.clone().prop_map(Op::EraseKey),
        1 => key.clone().prop_map(Op::EraseFirst),
        1 => (key.clone(), key).prop_map(|(a, b)| Op::ExtractRange(a.min(b), a.max(b))),
        1 => Just(Op::PopFront),
        1 => Just(Op::PopBack),
        1 => Just(Op::Unique),
    ]
}

proptest! {
    #[test]
    fn ordered_and_closed(values in vec(any::<i16>(), 0..200), seed in any::<u64>()) {
        let list = build(&values, seed);
        list.check();
        prop_assert_eq!(list.len(), values.len());
        prop_assert_eq!(list.iter().count(), values.len());
        prop_assert_eq!(list.into_iter().collect::<Vec<_>>(), sorted(values));
    }

    #[test]
    fn counts(values in vec(-10_i16..10, 0..100), key in -12_i16..12) {
        let list = build(&values, 0);
        let scanned = values.iter().filter(|&&v| v == key).count();
        prop_assert_eq!(list.count(&key), scanned);
        prop_assert_eq!(distance(&list, list.lower_bound(&key), list.upper_bound(&key)), scanned);
        let (lo, hi) = list.equal_range(&key);
        prop_assert_eq!(distance(&list, lo, hi), scanned);
        prop_assert_eq!(list.find(&key).is_end(), scanned == 0);
    }

    #[test]
    fn bounds_at_the_edges(values in vec(-100_i16..100, 1..100)) {
        let list = build(&values, 1);
        prop_assert_eq!(list.lower_bound(&-101), list.begin());
        prop_assert_eq!(list.upper_bound(&-101), list.begin());
        prop_assert!(list.lower_bound(&100).is_end());
        prop_assert!(list.upper_bound(&100).is_end());
    }

    #[test]
    fn uniqueness(values in vec(-30_i16..30, 0..100), key in -30_i16..30) {
        let mut list = SkipList::new();
        list.insert_unique_iter(values.iter().copied());
        let len = list.len();
        let (cursor, inserted) = list.insert_unique(key);
        prop_assert_eq!(inserted, !values.contains(&key));
        prop_assert_eq!(list.len(), len + usize::from(inserted));
        prop_assert_eq!(list.find(&key), cursor);
        let (again, inserted) = list.insert_unique(key);
        prop_assert!(!inserted);
        prop_assert_eq!(again, cursor);
        list.check();
    }

    #[test]
    fn dedup(values in vec(-20_i16..20, 0..150)) {
        let mut list = build(&values, 2);
        let mut distinct = sorted(values);
        distinct.dedup();
        list.unique();
        list.check();
        prop_assert_eq!(list.len(), distinct.len());
        prop_assert!(list.iter().zip(list.iter().skip(1)).all(|(a, b)| a < b));
        prop_assert_eq!(list.iter().copied().collect::<Vec<_>>(), distinct);
    }

    #[test]
    fn extract_merge_round_trip(
        values in vec(-50_i16..50, 0..150),
        lo in -50_i16..50,
        width in 0_i16..60,
    ) {
        let mut list = build(&values, 3);
        let before = list.iter().copied().collect::<Vec<_>>();
        let (first, last) = (list.lower_bound(&lo), list.lower_bound(&lo.saturating_add(width)));
        let run = list
            .extract_range(first, last)
            .map_err(|err| TestCaseError::fail(err.to_string()))?;
        list.check();
        prop_assert_eq!(list.len() + run.len(), before.len());

        let mut other = build(&[], 4);
        other.merge_run(run).map_err(|err| TestCaseError::fail(err.to_string()))?;
        other.check();
        list.merge_from(&mut other).map_err(|err| TestCaseError::fail(err.to_string()))?;
        list.check();
        prop_assert!(other.is_empty());
        prop_assert_eq!(list.iter().copied().collect::<Vec<_>>(), before);
    }

    #[test]
    fn clones_keep_the_structure(values in vec(any::<i16>(), 0..100)) {
        let list = build(&values, 5);
        let copy = list.clone();
        copy.check();
        prop_assert_eq!(&copy, &list);
        prop_assert_eq!(copy.debug_structure(), list.debug_structure());
    }

    #[test]
    fn matches_model(ops in vec(op(), 0..200), seed in any::<u64>()) {
        let mut list = Builder::new()
            .max_level(5)
            .seed(seed)
            .build_set()
            .map_err(|err| TestCaseError::fail(err.to_string()))?;
        let mut model: Vec<i16> = Vec::new();

        for op in ops {
            match op {
                Op::InsertEqual(key) => {
                    list.insert_equal(key);
                    let at = model.partition_point(|&v| v <= key);
                    model.insert(at, key);
                }
                Op::InsertUnique(key) => {
                    let (_, inserted) = list.insert_unique(key);
                    prop_assert_eq!(inserted, !model.contains(&key));
                    if inserted {
                        let at = model.partition_point(|&v| v < key);
                        model.insert(at, key);
                    }
                }
                Op::EraseKey(key) => {
                    let before = model.len();
                    model.retain(|&v| v != key);
                    prop_assert_eq!(list.erase_key(&key), before - model.len());
                }
                Op::EraseFirst(key) => {
                    let found = list.find(&key);
                    if let Some(at) = model.iter().position(|&v| v == key) {
                        model.remove(at);
                        let next = list
                            .erase(found)
                            .map_err(|err| TestCaseError::fail(err.to_string()))?;
                        prop_assert_eq!(list.get(next).ok(), model.get(at));
                    } else {
                        prop_assert!(found.is_end());
                    }
                }
                Op::ExtractRange(lo, hi) => {
                    let run = list
                        .extract_range(list.lower_bound(&lo), list.lower_bound(&hi))
                        .map_err(|err| TestCaseError::fail(err.to_string()))?;
                    let extracted: Vec<_> = run.into_iter().map(crate::Node::into_value).collect();
                    let expected: Vec<_> =
                        model.iter().copied().filter(|v| (lo..hi).contains(v)).collect();
                    model.retain(|v| !(lo..hi).contains(v));
                    prop_assert_eq!(extracted, expected);
                }
                Op::PopFront => {
                    let expected = if model.is_empty() { None } else { Some(model.remove(0)) };
                    prop_assert_eq!(list.pop_front(), expected);
                }
                Op::PopBack => prop_assert_eq!(list.pop_back(), model.pop()),
                Op::Unique => {
                    let before = model.len();
                    model.dedup();
                    prop_assert_eq!(list.unique(), before - model.len());
                }
            }
            prop_assert_eq!(list.len(), model.len());
        }
        list.check();
        prop_assert_eq!(list.iter().copied().collect::<Vec<_>>(), model);
    }
}
