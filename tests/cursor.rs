// Cursor tests: traversal interleaved with mutation.
//
// Only the guaranteed subset is asserted:
// - no panics, and termination, whatever the mutation;
// - deleted entries are never yielded;
// - without mutation every entry is yielded exactly once;
// - entries untouched by mutation before the cursor reaches their bucket
//   are still yielded when no capacity change happens.
use fn_hashmap::{ChainMap, Config, KeyOps};
use std::collections::BTreeSet;

fn identity_map() -> ChainMap<u32, u32, impl KeyOps<u32>> {
    ChainMap::new(|a: &u32, b: &u32| a == b, |k: &u32| *k)
}

// Test: delete the entry just yielded on every step.
// Assumes: initial capacity above the entry count, so nothing shrinks.
// Verifies: every entry is yielded once and the map ends empty.
#[test]
fn delete_current_while_walking() {
    let cfg = Config::default().with_initial_cap(64);
    let mut m = ChainMap::with_config(|a: &u32, b: &u32| a == b, |k: &u32| *k, cfg);
    for i in 0..40 {
        m.set(i, i);
    }
    let buckets = m.bucket_count();

    let mut cur = m.cursor();
    let mut seen = Vec::new();
    loop {
        let k = match cur.next(&m) {
            Some((k, _)) => *k,
            None => break,
        };
        seen.push(k);
        m.delete(&k);
    }
    assert_eq!(m.bucket_count(), buckets);
    assert!(m.is_empty());
    assert_eq!(seen, (0..40).collect::<Vec<_>>());
}

// Test: delete a not-yet-visited entry mid-walk.
// Assumes: identity hash, so key order equals bucket order.
// Verifies: the deleted entry is never yielded; the walk terminates.
#[test]
fn deleted_entries_are_never_yielded() {
    let mut m = identity_map();
    for i in 0..8 {
        m.set(i, i * 100);
    }
    let mut cur = m.cursor();
    let mut seen = BTreeSet::new();
    while let Some((k, v)) = cur.next(&m) {
        assert_eq!(*v, *k * 100);
        let k = *k;
        seen.insert(k);
        if k == 2 {
            m.delete(&5);
            m.delete(&6);
        }
    }
    assert!(!seen.contains(&5));
    assert!(!seen.contains(&6));
    assert_eq!(seen, [0, 1, 2, 3, 4, 7].into_iter().collect());
}

// Test: delete the next entry of the chain being walked.
// Assumes: constant hash, so all entries share one chain.
// Verifies: the deleted entry is not yielded and the walk still ends.
#[test]
fn deleting_next_in_chain_skips_safely() {
    let mut m = ChainMap::new(|a: &u32, b: &u32| a == b, |_: &u32| 0);
    for i in 0..6 {
        m.set(i, i);
    }
    let mut cur = m.cursor();
    let first = cur.next(&m).map(|(k, _)| *k);
    assert_eq!(first, Some(0));
    m.delete(&1);

    let mut rest = Vec::new();
    while let Some((k, _)) = cur.next(&m) {
        rest.push(*k);
    }
    assert!(!rest.contains(&1));
    assert!(rest.len() <= 4);
}

// Test: inserts and capacity changes mid-walk.
// Assumes: nothing about which entries are visited afterwards.
// Verifies: no panic, termination, and only live entries with their current
// values are yielded.
#[test]
fn capacity_changes_never_break_the_walk() {
    let mut m = identity_map();
    for i in 0..10 {
        m.set(i, i);
    }
    let mut cur = m.cursor();
    let mut steps = 0;
    while let Some((k, v)) = cur.next(&m) {
        let (k, v) = (*k, *v);
        assert_eq!(m.lookup(&k), Some(&v));
        steps += 1;
        assert!(steps < 1_000, "walk must terminate");
        match steps {
            2 => {
                for j in 100..140 {
                    m.set(j, j);
                }
            }
            4 => m.set_capacity(1),
            6 => {
                for j in 100..135 {
                    m.delete(&j);
                }
            }
            _ => {}
        }
    }
}

// Test: cursor on a map shrunk to zero buckets.
// Assumes: empty map with explicit zero capacity.
// Verifies: the walk ends immediately.
#[test]
fn zero_buckets_end_the_walk() {
    let mut m = identity_map();
    m.set(1, 1);
    let mut cur = m.cursor();
    m.delete(&1);
    m.set_capacity(0);
    assert_eq!(m.bucket_count(), 0);
    assert!(cur.next(&m).is_none());
}
