//! Property-based tests for the chaining table using proptest.
//!
//! Every property is checked against `std::collections::HashSet` as the reference model.

use std::collections::HashSet;

use chaintable_rs::{ChainTable, GrowthPolicy, TableConfig};
use proptest::prelude::*;

#[derive(Debug, Clone)]
enum Op {
    Insert(u16),
    Contains(u16),
    Remove(u16),
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        3 => any::<u16>().prop_map(|k| Op::Insert(k % 512)),
        1 => any::<u16>().prop_map(|k| Op::Contains(k % 512)),
        2 => any::<u16>().prop_map(|k| Op::Remove(k % 512)),
    ]
}

fn growth_strategy() -> impl Strategy<Value = GrowthPolicy> {
    prop_oneof![Just(GrowthPolicy::Prime), Just(GrowthPolicy::PowerOfTwo)]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn duplicate_insert_counts_once(values in prop::collection::vec(any::<i64>(), 0..200), x in any::<i64>()) {
        let mut t: ChainTable<i64> = values.into_iter().collect();
        let before = t.len();
        let had = t.contains(&x);

        t.insert(x);
        t.insert(x);

        prop_assert_eq!(t.len(), before + usize::from(!had));
        prop_assert!(t.contains(&x));
    }

    #[test]
    fn insert_then_contains(values in prop::collection::hash_set(any::<u32>(), 0..300)) {
        let mut t: ChainTable<u32> = ChainTable::with_capacity(4);
        for &v in &values {
            prop_assert!(!t.contains(&v));
            prop_assert!(t.insert(v));
            prop_assert!(t.contains(&v));
        }
        prop_assert_eq!(t.len(), values.len());
    }

    #[test]
    fn remove_present_and_absent(values in prop::collection::hash_set(any::<u32>(), 1..200), absent in any::<u32>()) {
        let mut t: ChainTable<u32> = values.iter().copied().collect();
        for &v in &values {
            let before = t.len();
            prop_assert!(t.remove(&v));
            prop_assert_eq!(t.len(), before - 1);
            prop_assert!(!t.contains(&v));
        }
        prop_assert!(t.is_empty());

        let before = t.len();
        prop_assert!(!t.remove(&absent));
        prop_assert_eq!(t.len(), before);
    }

    #[test]
    fn insertion_order_does_not_change_contents(
        values in prop::collection::hash_set(any::<u64>(), 0..300),
        seed in any::<u64>(),
    ) {
        use rand::rngs::StdRng;
        use rand::seq::SliceRandom;
        use rand::SeedableRng;

        let mut sorted: Vec<u64> = values.iter().copied().collect();
        sorted.sort();
        let reversed: Vec<u64> = sorted.iter().rev().copied().collect();
        let mut shuffled = sorted.clone();
        shuffled.shuffle(&mut StdRng::seed_from_u64(seed));

        for order in [&sorted, &shuffled, &reversed] {
            let mut t = ChainTable::with_capacity(16);
            for &v in order.iter() {
                t.insert(v);
            }
            prop_assert_eq!(t.len(), values.len());
            let members: HashSet<u64> = t.iter().copied().collect();
            prop_assert_eq!(&members, &values);
        }
    }

    #[test]
    fn resizes_keep_every_element(
        count in 1usize..2000,
        load_factor in 0.1f64..3.0,
        growth in growth_strategy(),
    ) {
        let config = TableConfig::default()
            .with_initial_capacity(2)
            .with_load_factor(load_factor)
            .with_growth(growth);
        let mut t: ChainTable<usize> = ChainTable::with_config(config).unwrap();
        for i in 0..count {
            t.insert(i);
        }
        prop_assert_eq!(t.len(), count);
        prop_assert_eq!(t.iter().count(), count);
        for i in 0..count {
            prop_assert!(t.contains(&i));
        }
    }

    #[test]
    fn matches_hash_set_model(ops in prop::collection::vec(op_strategy(), 0..400)) {
        let mut t: ChainTable<u16> = ChainTable::with_capacity(2);
        let mut model: HashSet<u16> = HashSet::new();

        for op in ops {
            match op {
                Op::Insert(k) => prop_assert_eq!(t.insert(k), model.insert(k)),
                Op::Contains(k) => prop_assert_eq!(t.contains(&k), model.contains(&k)),
                Op::Remove(k) => prop_assert_eq!(t.remove(&k), model.remove(&k)),
            }
            prop_assert_eq!(t.len(), model.len());
        }
    }
}
