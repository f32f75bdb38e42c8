//! fn-hashmap: a single-threaded hash map whose key equality and hashing
//! are supplied by the caller instead of `K: Eq + Hash`.
//!
//! Internal Design:
//!
//! Summary
//! - Goal: let keys with expensive or non-structural equality (pointers
//!   with semantic equality, large structs) be stored with a cheap custom
//!   hash, while keeping explicit control over capacity.
//! - Layers:
//!   - `KeyOps<K>`: the capability pair (`eq`, `hash -> u32`), bound once
//!     at construction. `FnOps` wraps two closures, `HasherOps` adapts
//!     `K: Eq + Hash` with a `BuildHasher`.
//!   - `Config`: capacity policy (initial capacity, grow and shrink load
//!     limits, change factor). Unset (zero) fields are defaulted once.
//!   - `ChainMap<K, V, O>`: separate chaining. Entries are stored in a
//!     generational slot arena and linked into per-bucket chains by slot
//!     key; each entry caches its key's hash.
//!
//! Constraints
//! - Single-threaded: the key functions are held in an `Rc`, so the map is
//!   `!Send`/`!Sync`. Clones share the same functions.
//! - The hash is computed once per operation. Chains are scanned comparing
//!   cached hashes first; `eq` only runs on a hash match. Rehashing uses the
//!   cached hashes and never calls back into caller code.
//! - Iteration order (bucket, then chain) is an artifact of the layout.
//!
//! Capacity policy
//! - The bucket array is allocated at `initial_cap` on the first insert.
//! - `set_capacity(c)`: `c` is raised to `len()`; if it differs from the
//!   current capacity, `buckets = ceil(c / grow_load_limit)` and the shrink
//!   threshold becomes `ceil(buckets * shrink_load_limit)`, then every entry
//!   is relinked at the tail of its new chain.
//! - After an insert with `len > capacity`, capacity becomes
//!   `floor(capacity * change_factor)`.
//! - After a delete with `len < shrink threshold` and capacity above
//!   `initial_cap`, capacity becomes `floor(capacity / change_factor)`, but
//!   not below `initial_cap`.
//!
//! Mutation during traversal
//! - `range`/`iter` borrow the map, so it cannot change underneath them.
//! - `Cursor` borrows the map per step only. Between steps the caller may
//!   mutate; inserted entries may or may not be seen, deletions may skip
//!   unvisited entries, and a capacity change makes further visits
//!   unspecified. Deleted entries are never yielded.
//!
//! Contract on caller functions
//! - `eq` must be an equivalence and `hash` must agree with it. Both must be
//!   deterministic. Violations are not detected; panics propagate unchanged.

pub mod chain_map;
mod chain_map_proptest;
pub mod config;
pub mod cursor;
pub mod ops;
pub mod stats;

// Public surface
pub use chain_map::{ChainMap, Iter};
pub use config::{Config, ConfigError};
pub use cursor::Cursor;
pub use ops::{FnOps, HasherOps, KeyOps};
pub use stats::ChainStats;
