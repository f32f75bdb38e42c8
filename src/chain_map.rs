//! ChainMap: separate chaining over caller-supplied key functions.
//!
//! Entries live in a generational slot arena and are linked into per-bucket
//! singly linked chains by slot key. Each entry caches the hash computed when
//! it was inserted; rehashing relinks entries using that cached hash and
//! never calls back into the key functions.

use crate::config::{Config, ConfigError};
use crate::cursor::Cursor;
use crate::ops::{FnOps, HasherOps, KeyOps};
use crate::stats::ChainStats;
use core::fmt;
use core::hash::{BuildHasher, Hash};
use slotmap::{DefaultKey, SlotMap};
use std::rc::Rc;

#[derive(Clone, Debug)]
pub(crate) struct Entry<K, V> {
    pub(crate) key: K,
    pub(crate) value: V,
    hash: u32,
    pub(crate) next: Option<DefaultKey>,
}

/// A hash map that compares and buckets keys with functions supplied at
/// construction time.
///
/// Single-threaded: the key functions are shared through an `Rc`, so the map
/// is neither `Send` nor `Sync`.
pub struct ChainMap<K, V, O> {
    ops: Rc<O>,
    cfg: Config,
    // Capacity: entries held before a grow is triggered.
    max_size: usize,
    // Entries held before a shrink is considered.
    min_size: usize,
    buckets: Vec<Option<DefaultKey>>,
    slots: SlotMap<DefaultKey, Entry<K, V>>,
}

impl<K, V, E, H> ChainMap<K, V, FnOps<E, H>> {
    /// Create a map using `eq` for key equality and `hash` for bucketing,
    /// with the default [`Config`].
    pub fn new(eq: E, hash: H) -> Self
    where
        E: Fn(&K, &K) -> bool,
        H: Fn(&K) -> u32,
    {
        Self::with_config(eq, hash, Config::default())
    }

    /// Like [`ChainMap::new`], with unset fields of `cfg` defaulted.
    pub fn with_config(eq: E, hash: H, cfg: Config) -> Self
    where
        E: Fn(&K, &K) -> bool,
        H: Fn(&K) -> u32,
    {
        Self::with_ops_and_config(FnOps::new(eq, hash), cfg)
    }
}

impl<K, V, S> ChainMap<K, V, HasherOps<K, S>>
where
    K: Eq + Hash,
    S: BuildHasher,
{
    /// Use the key's own `Eq`/`Hash` through `hasher`.
    pub fn with_hasher(hasher: S) -> Self {
        Self::with_ops(HasherOps::with_hasher(hasher))
    }
}

impl<K, V, O> ChainMap<K, V, O>
where
    O: KeyOps<K>,
{
    pub fn with_ops(ops: O) -> Self {
        Self::with_ops_and_config(ops, Config::default())
    }

    pub fn with_ops_and_config(ops: O, cfg: Config) -> Self {
        Self {
            ops: Rc::new(ops),
            cfg: cfg.resolve(),
            max_size: 0,
            min_size: 0,
            buckets: Vec::new(),
            slots: SlotMap::with_key(),
        }
    }

    /// Like [`ChainMap::with_ops_and_config`], but rejects a config whose
    /// resolved values are out of range.
    pub fn try_with_ops_and_config(ops: O, cfg: Config) -> Result<Self, ConfigError> {
        cfg.resolve().validate()?;
        Ok(Self::with_ops_and_config(ops, cfg))
    }

    /// The resolved policy this map runs with.
    pub fn config(&self) -> &Config {
        &self.cfg
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Number of entries the map holds before it rehashes to grow.
    pub fn capacity(&self) -> usize {
        self.max_size
    }

    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }

    #[inline]
    fn bucket_idx(&self, hash: u32) -> usize {
        hash as usize % self.buckets.len()
    }

    fn find_slot(&self, key: &K) -> Option<DefaultKey> {
        // Also covers an unallocated bucket array.
        if self.slots.is_empty() {
            return None;
        }
        let hash = O::hash(&self.ops, key);
        let mut cur = self.buckets[self.bucket_idx(hash)];
        while let Some(k) = cur {
            let e = &self.slots[k];
            if e.hash == hash && O::eq(&self.ops, key, &e.key) {
                return Some(k);
            }
            cur = e.next;
        }
        None
    }

    /// The value stored for `key`, if any.
    pub fn lookup(&self, key: &K) -> Option<&V> {
        let k = self.find_slot(key)?;
        self.slots.get(k).map(|e| &e.value)
    }

    pub fn lookup_mut(&mut self, key: &K) -> Option<&mut V> {
        let k = self.find_slot(key)?;
        self.slots.get_mut(k).map(|e| &mut e.value)
    }

    /// The value stored for `key`, or `V::default()` when absent.
    pub fn get(&self, key: &K) -> V
    where
        V: Default + Clone,
    {
        self.lookup(key).cloned().unwrap_or_default()
    }

    pub fn contains_key(&self, key: &K) -> bool {
        self.find_slot(key).is_some()
    }

    /// Insert `key`, or overwrite the value of an equal key already present.
    ///
    /// An overwrite keeps the stored key, its entry and its chain position.
    pub fn set(&mut self, key: K, value: V) {
        if self.buckets.is_empty() {
            log::trace!("allocating buckets at initial capacity {}", self.cfg.initial_cap);
            self.set_capacity(self.cfg.initial_cap);
        }

        let hash = O::hash(&self.ops, &key);
        let idx = self.bucket_idx(hash);

        let mut tail = None;
        let mut cur = self.buckets[idx];
        while let Some(k) = cur {
            let e = &mut self.slots[k];
            if e.hash == hash && O::eq(&self.ops, &key, &e.key) {
                e.value = value;
                return;
            }
            tail = cur;
            cur = e.next;
        }

        let new = self.slots.insert(Entry {
            key,
            value,
            hash,
            next: None,
        });
        match tail {
            None => self.buckets[idx] = Some(new),
            Some(t) => self.slots[t].next = Some(new),
        }

        self.grow_if_needed();
    }

    /// Remove `key`, returning its value. Missing keys are not an error.
    pub fn delete(&mut self, key: &K) -> Option<V> {
        if self.slots.is_empty() {
            return None;
        }

        let hash = O::hash(&self.ops, key);
        let idx = self.bucket_idx(hash);

        let mut prev = None;
        let mut cur = self.buckets[idx];
        while let Some(k) = cur {
            let e = &self.slots[k];
            if e.hash == hash && O::eq(&self.ops, key, &e.key) {
                let next = e.next;
                match prev {
                    None => self.buckets[idx] = next,
                    Some(p) => self.slots[p].next = next,
                }
                let removed = self.slots.remove(k)?;
                self.shrink_if_needed();
                return Some(removed.value);
            }
            prev = cur;
            cur = e.next;
        }
        None
    }

    fn grow_if_needed(&mut self) {
        if self.len() > self.max_size {
            let new_cap = (self.max_size as f64 * self.cfg.change_factor) as usize;
            self.set_capacity(new_cap);
        }
    }

    fn shrink_if_needed(&mut self) {
        // Never shrink below the initial capacity.
        if self.len() < self.min_size && self.max_size > self.cfg.initial_cap {
            let new_cap = (self.max_size as f64 / self.cfg.change_factor) as usize;
            self.set_capacity(new_cap.max(self.cfg.initial_cap));
        }
    }

    /// Set the number of entries the map holds before growing, rehashing if
    /// it changes. Requests below `len()` are raised to `len()`.
    pub fn set_capacity(&mut self, capacity: usize) {
        let capacity = capacity.max(self.len());
        if capacity == self.max_size {
            return;
        }

        self.max_size = capacity;
        let mut num_buckets = (capacity as f64 / self.cfg.grow_load_limit).ceil() as usize;
        if capacity > 0 {
            num_buckets = num_buckets.max(1);
        }
        self.min_size = (num_buckets as f64 * self.cfg.shrink_load_limit).ceil() as usize;

        log::debug!(
            "rehash: {} -> {} buckets (len {}, min {}, max {})",
            self.buckets.len(),
            num_buckets,
            self.len(),
            self.min_size,
            self.max_size
        );
        self.rehash(num_buckets);
    }

    /// Relink every entry into a fresh bucket array, appending at chain
    /// tails in old bucket-then-chain order.
    fn rehash(&mut self, num_buckets: usize) {
        let old = std::mem::replace(&mut self.buckets, vec![None; num_buckets]);
        let mut tails: Vec<Option<DefaultKey>> = vec![None; num_buckets];

        for head in old {
            let mut cur = head;
            while let Some(k) = cur {
                let e = &mut self.slots[k];
                cur = e.next.take();
                let idx = e.hash as usize % num_buckets;
                match tails[idx] {
                    None => self.buckets[idx] = Some(k),
                    Some(t) => self.slots[t].next = Some(k),
                }
                tails[idx] = Some(k);
            }
        }
    }
}

impl<K, V, O> ChainMap<K, V, O> {
    /// Visit entries in bucket then chain order until `f` returns `false`.
    ///
    /// The order is an artifact of the current bucket layout, not a
    /// contract. The map cannot be mutated while `range` runs; use
    /// [`ChainMap::cursor`] to interleave traversal with mutation.
    pub fn range<F>(&self, mut f: F)
    where
        F: FnMut(&K, &V) -> bool,
    {
        for (k, v) in self.iter() {
            if !f(k, v) {
                return;
            }
        }
    }

    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            buckets: self.buckets.iter(),
            slots: &self.slots,
            cur: None,
            remaining: self.slots.len(),
        }
    }

    /// A detached traversal position. See [`Cursor`] for what is guaranteed
    /// when the map changes between steps.
    pub fn cursor(&self) -> Cursor {
        Cursor::new()
    }

    /// Chain-length statistics for the current layout.
    pub fn stats(&self) -> ChainStats {
        ChainStats::from_chains(
            self.slots.len(),
            self.max_size,
            self.buckets.iter().map(|&head| self.chain_len(head)),
        )
    }

    fn chain_len(&self, head: Option<DefaultKey>) -> usize {
        let mut n = 0;
        let mut cur = head;
        while let Some(k) = cur {
            n += 1;
            cur = self.slots.get(k).and_then(|e| e.next);
        }
        n
    }

    /// Head of bucket `idx`; `None` when `idx` is past the bucket array.
    pub(crate) fn bucket_head(&self, idx: usize) -> Option<Option<DefaultKey>> {
        self.buckets.get(idx).copied()
    }

    pub(crate) fn entry(&self, k: DefaultKey) -> Option<&Entry<K, V>> {
        self.slots.get(k)
    }
}

/// Borrowing iterator over `(&K, &V)` in bucket then chain order.
pub struct Iter<'a, K, V> {
    buckets: core::slice::Iter<'a, Option<DefaultKey>>,
    slots: &'a SlotMap<DefaultKey, Entry<K, V>>,
    cur: Option<DefaultKey>,
    remaining: usize,
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(k) = self.cur {
                let e = self.slots.get(k)?;
                self.cur = e.next;
                self.remaining -= 1;
                return Some((&e.key, &e.value));
            }
            self.cur = *self.buckets.next()?;
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V> ExactSizeIterator for Iter<'_, K, V> {}

impl<'a, K, V, O> IntoIterator for &'a ChainMap<K, V, O> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Deep copy of every entry; the key functions are shared.
impl<K, V, O> Clone for ChainMap<K, V, O>
where
    K: Clone,
    V: Clone,
{
    fn clone(&self) -> Self {
        // Slot keys survive the arena clone, so chain links and bucket
        // heads carry over as-is.
        Self {
            ops: Rc::clone(&self.ops),
            cfg: self.cfg,
            max_size: self.max_size,
            min_size: self.min_size,
            buckets: self.buckets.clone(),
            slots: self.slots.clone(),
        }
    }
}

impl<K, V, O> fmt::Debug for ChainMap<K, V, O>
where
    K: fmt::Debug,
    V: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<K, V, O> Extend<(K, V)> for ChainMap<K, V, O>
where
    O: KeyOps<K>,
{
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (k, v) in iter {
            self.set(k, v);
        }
    }
}

#[cfg(test)]
impl<K, V, O> ChainMap<K, V, O>
where
    O: KeyOps<K>,
{
    /// Invariant: every stored entry sits in bucket `hash % bucket_count`
    /// under its cached hash, the chains hold exactly `len()` entries, and
    /// `min <= max >= len`.
    pub(crate) fn assert_invariants(&self) {
        let mut total = 0;
        for (idx, &head) in self.buckets.iter().enumerate() {
            let mut cur = head;
            while let Some(k) = cur {
                let e = &self.slots[k];
                assert_eq!(e.hash as usize % self.buckets.len(), idx);
                assert_eq!(e.hash, O::hash(&self.ops, &e.key), "cached hash");
                total += 1;
                cur = e.next;
            }
        }
        assert_eq!(total, self.len());
        assert!(self.min_size <= self.max_size);
        assert!(self.max_size >= self.len());
    }
}
