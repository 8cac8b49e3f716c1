use chaintable_rs::ChainTable;

#[test]
fn test_clear_basic() {
    let mut t: ChainTable<u64> = ChainTable::with_capacity(16);

    t.insert(1);
    t.insert(2);
    t.insert(3);
    assert_eq!(t.len(), 3);

    t.clear();

    assert_eq!(t.len(), 0);
    assert!(t.is_empty());
    assert!(!t.contains(&1));
    assert!(!t.contains(&2));
    assert!(!t.contains(&3));
}

#[test]
fn test_clear_empty_table() {
    let mut t: ChainTable<u64> = ChainTable::new();
    t.clear();
    assert!(t.is_empty());
    assert_eq!(t.iter().count(), 0);
}

#[test]
fn test_clear_keeps_capacity_and_allows_reinsert() {
    let mut t: ChainTable<u64> = ChainTable::with_capacity(4);
    for i in 0..1000 {
        t.insert(i);
    }
    let grown = t.capacity();

    t.clear();
    assert_eq!(t.capacity(), grown);
    assert_eq!(t.stats().empty_buckets, grown);

    for i in 0..5 {
        assert!(t.insert(i));
    }
    assert_eq!(t.len(), 5);
    assert!(t.contains(&4));
    assert!(!t.contains(&5));
}
