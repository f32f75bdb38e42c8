//! Key capabilities: the equality and hash functions a `ChainMap` is built on.
//!
//! The map never uses `K: Eq` or `K: Hash` directly. Whatever implements
//! [`KeyOps`] decides what "same key" means. Implementations must be pure:
//! keys that compare equal must hash equally, and both functions must be
//! deterministic. Violations are not detected; they lead to lookups missing
//! present keys or duplicate entries.

use core::hash::{BuildHasher, Hash};
use core::marker::PhantomData;
use std::collections::hash_map::RandomState;

/// Equality and hashing over `K`.
pub trait KeyOps<K> {
    fn eq(&self, a: &K, b: &K) -> bool;
    fn hash(&self, key: &K) -> u32;
}

/// A pair of plain functions or closures.
pub struct FnOps<E, H> {
    eq: E,
    hash: H,
}

impl<E, H> FnOps<E, H> {
    pub fn new(eq: E, hash: H) -> Self {
        Self { eq, hash }
    }
}

impl<K, E, H> KeyOps<K> for FnOps<E, H>
where
    E: Fn(&K, &K) -> bool,
    H: Fn(&K) -> u32,
{
    #[inline]
    fn eq(&self, a: &K, b: &K) -> bool {
        (self.eq)(a, b)
    }

    #[inline]
    fn hash(&self, key: &K) -> u32 {
        (self.hash)(key)
    }
}

/// Uses `K: Eq + Hash` with a `BuildHasher`. The 64-bit hash is truncated to
/// its low 32 bits.
pub struct HasherOps<K, S = RandomState> {
    hasher: S,
    _key: PhantomData<fn(&K)>,
}

impl<K> HasherOps<K> {
    pub fn new() -> Self {
        Self::with_hasher(RandomState::new())
    }
}

impl<K> Default for HasherOps<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, S> HasherOps<K, S> {
    pub fn with_hasher(hasher: S) -> Self {
        Self {
            hasher,
            _key: PhantomData,
        }
    }
}

impl<K, S> KeyOps<K> for HasherOps<K, S>
where
    K: Eq + Hash,
    S: BuildHasher,
{
    #[inline]
    fn eq(&self, a: &K, b: &K) -> bool {
        a == b
    }

    #[inline]
    fn hash(&self, key: &K) -> u32 {
        self.hasher.hash_one(key) as u32
    }
}
