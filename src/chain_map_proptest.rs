#![cfg(test)]

// Property tests for ChainMap kept inside the crate so they can check the
// internal bucket layout after every operation.

use crate::chain_map::ChainMap;
use crate::config::Config;
use crate::ops::KeyOps;
use proptest::prelude::*;
use std::collections::{BTreeMap, BTreeSet};

// Pool-indexed operations so failing cases shrink toward small key indices.
#[derive(Clone, Debug)]
enum Op {
    Set(usize, i32),
    Delete(usize),
    Lookup(usize),
    Get(usize),
    SetCapacity(usize),
    Range,
    RangeStop,
    CloneCheck(usize, i32),
}

fn arb_scenario() -> impl Strategy<Value = (Vec<String>, Vec<Op>)> {
    proptest::collection::vec("[a-z]{0,4}", 1..=40).prop_flat_map(|pool| {
        let idxs: Vec<usize> = (0..pool.len()).collect();
        let idx = proptest::sample::select(idxs);
        let op = prop_oneof![
            6 => (idx.clone(), any::<i32>()).prop_map(|(i, v)| Op::Set(i, v)),
            3 => idx.clone().prop_map(Op::Delete),
            2 => idx.clone().prop_map(Op::Lookup),
            1 => idx.clone().prop_map(Op::Get),
            1 => (0usize..64).prop_map(Op::SetCapacity),
            1 => Just(Op::Range),
            1 => Just(Op::RangeStop),
            1 => (idx.clone(), any::<i32>()).prop_map(|(i, v)| Op::CloneCheck(i, v)),
        ];
        proptest::collection::vec(op, 1..120).prop_map(move |ops| (pool.clone(), ops))
    })
}

fn fnv(s: &String) -> u32 {
    s.bytes()
        .fold(0x811c_9dc5u32, |h, b| (h ^ b as u32).wrapping_mul(0x0100_0193))
}

// State-machine equivalence against an ordered std map. Checked after each op:
// - lookups and `get` agree with the model (round-trip, deletion, update);
// - `len` equals the number of distinct live keys;
// - layout invariants: cached hashes, bucket placement, min <= max >= len;
// - `range` visits every entry once, and exactly once when stopped early;
// - a clone evolves independently of its source.
fn run<O: KeyOps<String>>(
    mut sut: ChainMap<String, i32, O>,
    pool: &[String],
    ops: Vec<Op>,
) -> Result<(), TestCaseError> {
    let mut model: BTreeMap<String, i32> = BTreeMap::new();

    for op in ops {
        match op {
            Op::Set(i, v) => {
                sut.set(pool[i].clone(), v);
                model.insert(pool[i].clone(), v);
            }
            Op::Delete(i) => {
                let removed = sut.delete(&pool[i]);
                prop_assert_eq!(removed, model.remove(&pool[i]));
                prop_assert!(sut.lookup(&pool[i]).is_none());
            }
            Op::Lookup(i) => {
                prop_assert_eq!(sut.lookup(&pool[i]), model.get(&pool[i]));
            }
            Op::Get(i) => {
                prop_assert_eq!(sut.get(&pool[i]), model.get(&pool[i]).copied().unwrap_or(0));
            }
            Op::SetCapacity(n) => {
                sut.set_capacity(n);
                prop_assert_eq!(sut.capacity(), n.max(model.len()));
            }
            Op::Range => {
                let mut seen = BTreeMap::new();
                sut.range(|k, v| {
                    seen.insert(k.clone(), *v);
                    true
                });
                prop_assert_eq!(&seen, &model);
            }
            Op::RangeStop => {
                let mut visits = 0;
                sut.range(|_, _| {
                    visits += 1;
                    false
                });
                prop_assert_eq!(visits, model.len().min(1));
            }
            Op::CloneCheck(i, v) => {
                let mut c = sut.clone();
                c.set(pool[i].clone(), v);
                prop_assert_eq!(sut.lookup(&pool[i]), model.get(&pool[i]));
                let other = (i + 1) % pool.len();
                sut.delete(&pool[other]);
                model.remove(&pool[other]);
                if pool[other] != pool[i] {
                    prop_assert_eq!(c.lookup(&pool[i]), Some(&v));
                }
                c.assert_invariants();
            }
        }

        sut.assert_invariants();
        prop_assert_eq!(sut.len(), model.len());
        prop_assert_eq!(sut.is_empty(), model.is_empty());
        let keys: BTreeSet<_> = sut.iter().map(|(k, _)| k.clone()).collect();
        prop_assert_eq!(keys.len(), sut.len());
    }
    Ok(())
}

proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]

    #[test]
    fn prop_state_machine((pool, ops) in arb_scenario()) {
        let sut = ChainMap::new(|a: &String, b: &String| a == b, fnv);
        run(sut, &pool, ops)?;
    }

    // Every key in one chain: correctness rests on `eq` alone.
    #[test]
    fn prop_state_machine_with_collisions((pool, ops) in arb_scenario()) {
        let sut = ChainMap::new(|a: &String, b: &String| a == b, |_: &String| 0);
        run(sut, &pool, ops)?;
    }

    // Small capacity steps make grows and shrinks frequent.
    #[test]
    fn prop_state_machine_tight_policy((pool, ops) in arb_scenario()) {
        let cfg = Config::default()
            .with_initial_cap(1)
            .with_grow_load_limit(1.0)
            .with_shrink_load_limit(0.5)
            .with_change_factor(1.5);
        let sut = ChainMap::with_config(|a: &String, b: &String| a == b, fnv, cfg);
        run(sut, &pool, ops)?;
    }
}
