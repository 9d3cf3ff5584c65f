#![cfg(feature = "collections")]
//! Property-based tests for AnderssonTree.
//!
//! These tests check the balancing rules after every mutation and the
//! agreement between the traversal-based queries, using a `BTreeSet` as the
//! reference model.

use andersson::collections::{AnderssonTree, TraversalOrder};
use proptest::prelude::*;
use std::collections::BTreeSet;

// =============================================================================
// Strategy for generating test data
// =============================================================================

#[derive(Debug, Clone)]
enum Operation {
    Insert(i32),
    Remove(i32),
}

fn arbitrary_operation() -> impl Strategy<Value = Operation> {
    prop_oneof![
        3 => (0..64i32).prop_map(Operation::Insert),
        2 => (0..64i32).prop_map(Operation::Remove),
    ]
}

fn arbitrary_order() -> impl Strategy<Value = TraversalOrder> {
    prop::sample::select(TraversalOrder::ALL.to_vec())
}

fn arbitrary_values() -> impl Strategy<Value = Vec<i32>> {
    prop::collection::vec(any::<i32>(), 0..100)
}

// =============================================================================
// Invariant Preservation
// Description: every node satisfies the AA-tree rules after every operation
// =============================================================================

proptest! {
    #[test]
    fn prop_invariants_hold_after_every_operation(
        operations in prop::collection::vec(arbitrary_operation(), 0..200)
    ) {
        let mut tree = AnderssonTree::new();
        let mut model = BTreeSet::new();

        for operation in operations {
            match operation {
                Operation::Insert(value) => {
                    prop_assert_eq!(tree.insert(value), model.insert(value));
                }
                Operation::Remove(value) => {
                    prop_assert_eq!(tree.remove(&value), model.remove(&value));
                }
            }
            prop_assert_eq!(tree.check_invariants(), Ok(()));
            prop_assert_eq!(tree.len(), model.len());
        }

        let contents: Vec<i32> = tree.iter().copied().collect();
        let expected: Vec<i32> = model.into_iter().collect();
        prop_assert_eq!(contents, expected);
    }
}

// =============================================================================
// Height Bound
// Description: the height never exceeds 2 * log2(N + 1)
// =============================================================================

proptest! {
    #[test]
    fn prop_height_is_logarithmic(values in arbitrary_values()) {
        let tree: AnderssonTree<i32> = values.into_iter().collect();
        let bound = 2 * (usize::BITS - (tree.len() + 1).leading_zeros()) as usize;
        prop_assert!(tree.height() <= bound);
    }
}

// =============================================================================
// Order Agreement
// Description: to_vec, for_each, map and fold visit elements identically
// =============================================================================

proptest! {
    #[test]
    fn prop_queries_agree_on_order(values in arbitrary_values(), order in arbitrary_order()) {
        let tree: AnderssonTree<i32> = values.into_iter().collect();
        let materialized = tree.to_vec(order);

        let mut visited = Vec::new();
        tree.for_each(order, |value| visited.push(*value));
        prop_assert_eq!(&visited, &materialized);

        let mapped = tree.map(order, |value| *value);
        prop_assert_eq!(&mapped, &materialized);

        let folded = tree.fold(order, Vec::new(), |mut accumulator, value| {
            accumulator.push(*value);
            accumulator
        });
        prop_assert_eq!(&folded, &materialized);

        let iterated: Vec<i32> = tree.traverse(order).copied().collect();
        prop_assert_eq!(&iterated, &materialized);
    }
}

// =============================================================================
// Ascending Law
// Description: in-order traversal is strictly ascending
// =============================================================================

proptest! {
    #[test]
    fn prop_in_order_is_strictly_ascending(values in arbitrary_values()) {
        let tree: AnderssonTree<i32> = values.into_iter().collect();
        let sorted = tree.to_vec(TraversalOrder::InOrder);
        prop_assert!(sorted.windows(2).all(|window| window[0] < window[1]));
    }
}

// =============================================================================
// Round-Trip Law
// Description: removing every inserted value, in any order, empties the tree
// =============================================================================

proptest! {
    #[test]
    fn prop_insert_then_remove_all_empties(
        values in prop::collection::hash_set(any::<i32>(), 0..100)
            .prop_map(|set| set.into_iter().collect::<Vec<_>>())
            .prop_shuffle(),
        removal_order in prop::collection::vec(any::<prop::sample::Index>(), 0..100),
    ) {
        let mut tree: AnderssonTree<i32> = values.iter().copied().collect();
        prop_assert_eq!(tree.len(), values.len());

        let mut pending = values.clone();
        for index in removal_order {
            if pending.is_empty() {
                break;
            }
            let value = pending.swap_remove(index.index(pending.len()));
            prop_assert!(tree.remove(&value));
            prop_assert_eq!(tree.check_invariants(), Ok(()));
        }
        for value in pending {
            prop_assert!(tree.remove(&value));
        }

        prop_assert!(tree.is_empty());
        for value in &values {
            prop_assert!(!tree.contains(value));
        }
    }
}

// =============================================================================
// Idempotent Insert Law
// Description: inserting a present value changes nothing
// =============================================================================

proptest! {
    #[test]
    fn prop_insert_is_idempotent(values in arbitrary_values(), new_value: i32) {
        let mut tree: AnderssonTree<i32> = values.into_iter().collect();
        tree.insert(new_value);
        let before = tree.to_vec(TraversalOrder::InOrder);
        let shape_before = tree.to_vec(TraversalOrder::PreOrder);

        prop_assert!(!tree.insert(new_value));
        prop_assert_eq!(tree.to_vec(TraversalOrder::InOrder), before);
        prop_assert_eq!(tree.to_vec(TraversalOrder::PreOrder), shape_before);
    }
}

// =============================================================================
// Short-Circuit Law
// Description: every/some stop at the first deciding element
// =============================================================================

proptest! {
    #[test]
    fn prop_every_stops_at_first_failure(
        values in arbitrary_values(),
        order in arbitrary_order(),
        threshold: i32,
    ) {
        let tree: AnderssonTree<i32> = values.into_iter().collect();
        let sequence = tree.to_vec(order);
        let expected_visits = sequence
            .iter()
            .position(|value| *value >= threshold)
            .map_or(sequence.len(), |position| position + 1);

        let mut visits = 0;
        let result = tree.every(order, |value| {
            visits += 1;
            *value < threshold
        });

        prop_assert_eq!(result, sequence.iter().all(|value| *value < threshold));
        prop_assert_eq!(visits, expected_visits);
    }

    #[test]
    fn prop_some_stops_at_first_success(
        values in arbitrary_values(),
        order in arbitrary_order(),
        threshold: i32,
    ) {
        let tree: AnderssonTree<i32> = values.into_iter().collect();
        let sequence = tree.to_vec(order);
        let expected_visits = sequence
            .iter()
            .position(|value| *value >= threshold)
            .map_or(sequence.len(), |position| position + 1);

        let mut visits = 0;
        let result = tree.some(order, |value| {
            visits += 1;
            *value >= threshold
        });

        prop_assert_eq!(result, sequence.iter().any(|value| *value >= threshold));
        prop_assert_eq!(visits, expected_visits);
    }
}

// =============================================================================
// Reduce Law
// Description: an unseeded reduce equals a fold seeded with the first element
// =============================================================================

proptest! {
    #[test]
    fn prop_reduce_matches_seeded_fold(values in arbitrary_values(), order in arbitrary_order()) {
        let tree: AnderssonTree<i32> = values.into_iter().collect();
        let reduced = tree.reduce(order, |accumulator, value| accumulator.wrapping_mul(31).wrapping_add(*value));

        let sequence = tree.to_vec(order);
        match sequence.split_first() {
            None => prop_assert!(reduced.is_err()),
            Some((first, rest)) => {
                let expected = rest
                    .iter()
                    .fold(*first, |accumulator, value| accumulator.wrapping_mul(31).wrapping_add(*value));
                prop_assert_eq!(reduced, Ok(expected));
            }
        }
    }
}
