//! Cursor: a traversal position that borrows the map only per step.
//!
//! `ChainMap::range` and `ChainMap::iter` hold a shared borrow for the whole
//! traversal, so the map cannot change underneath them. A `Cursor` is handed
//! the map on every `next` call instead, which lets the caller `set`,
//! `delete` or `set_capacity` between steps. The guarantees are weak:
//!
//! - Entries inserted during the traversal may or may not be visited.
//! - Deleting entries during the traversal may cause other, not yet visited
//!   entries to be skipped.
//! - After a capacity change (explicit, or triggered by an insert or
//!   delete) further visits are unspecified: entries may be visited again or
//!   skipped.
//! - In every case the cursor never panics, never yields an entry that was
//!   deleted, and terminates once it walks past the last bucket.

use crate::chain_map::ChainMap;
use slotmap::DefaultKey;

#[derive(Clone, Debug, Default)]
pub struct Cursor {
    // Next bucket whose chain has not been entered.
    bucket: usize,
    // Next entry in the chain being walked.
    next: Option<DefaultKey>,
}

impl Cursor {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Advance and return the next live entry of `map`.
    pub fn next<'m, K, V, O>(&mut self, map: &'m ChainMap<K, V, O>) -> Option<(&'m K, &'m V)> {
        loop {
            if let Some(k) = self.next.take() {
                // Stale slot keys never resolve, so a deleted entry ends
                // the walk of its chain.
                if let Some(e) = map.entry(k) {
                    self.next = e.next;
                    return Some((&e.key, &e.value));
                }
                continue;
            }
            self.next = map.bucket_head(self.bucket)?;
            self.bucket += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::chain_map::ChainMap;
    use std::collections::BTreeSet;

    #[test]
    fn walks_all_entries_without_mutation() {
        let mut m: ChainMap<i32, i32, _> =
            ChainMap::new(|a: &i32, b: &i32| a == b, |k: &i32| (*k % 4) as u32);
        for i in 0..25 {
            m.set(i, -i);
        }
        let mut c = m.cursor();
        let mut seen = BTreeSet::new();
        while let Some((k, v)) = c.next(&m) {
            assert_eq!(*v, -*k);
            assert!(seen.insert(*k));
        }
        assert_eq!(seen, (0..25).collect());
        assert!(c.next(&m).is_none(), "exhausted cursor stays exhausted");
    }

    #[test]
    fn empty_map_yields_nothing() {
        let m: ChainMap<i32, i32, _> =
            ChainMap::new(|a: &i32, b: &i32| a == b, |k: &i32| *k as u32);
        assert!(m.cursor().next(&m).is_none());
    }
}
