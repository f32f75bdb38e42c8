//! Chain statistics, for judging how well a hash function spreads keys.

/// Snapshot of a map's bucket layout.
#[derive(Clone, Debug, PartialEq)]
pub struct ChainStats {
    /// Entries in the map.
    pub len: usize,
    /// Entries held before the next grow.
    pub capacity: usize,
    /// Allocated buckets.
    pub buckets: usize,
    /// Buckets with a non-empty chain.
    pub occupied_buckets: usize,
    /// Length of the longest chain.
    pub longest_chain: usize,
    /// Entries per bucket (`len / buckets`), 0 with no buckets.
    pub load_factor: f64,
}

impl ChainStats {
    pub(crate) fn from_chains<I>(len: usize, capacity: usize, chain_lens: I) -> Self
    where
        I: IntoIterator<Item = usize>,
    {
        let mut buckets = 0;
        let mut occupied_buckets = 0;
        let mut longest_chain = 0;
        for n in chain_lens {
            buckets += 1;
            if n > 0 {
                occupied_buckets += 1;
            }
            longest_chain = longest_chain.max(n);
        }
        Self {
            len,
            capacity,
            buckets,
            occupied_buckets,
            longest_chain,
            load_factor: if buckets == 0 {
                0.0
            } else {
                len as f64 / buckets as f64
            },
        }
    }

    /// Share of occupied buckets, 0 with no buckets.
    pub fn bucket_utilization(&self) -> f64 {
        if self.buckets == 0 {
            0.0
        } else {
            self.occupied_buckets as f64 / self.buckets as f64
        }
    }
}

#[cfg(test)]
mod tests {
    use super::ChainStats;
    use crate::chain_map::ChainMap;

    #[test]
    fn empty_map_stats() {
        let m: ChainMap<u8, u8, _> = ChainMap::new(|a: &u8, b: &u8| a == b, |k: &u8| *k as u32);
        let s = m.stats();
        assert_eq!(
            s,
            ChainStats {
                len: 0,
                capacity: 0,
                buckets: 0,
                occupied_buckets: 0,
                longest_chain: 0,
                load_factor: 0.0,
            }
        );
        assert_eq!(s.bucket_utilization(), 0.0);
    }

    /// Invariant: a constant hash puts every entry in one chain.
    #[test]
    fn constant_hash_makes_one_chain() {
        let mut m: ChainMap<u8, u8, _> = ChainMap::new(|a: &u8, b: &u8| a == b, |_: &u8| 3);
        for i in 0..6 {
            m.set(i, i);
        }
        let s = m.stats();
        assert_eq!(s.len, 6);
        assert_eq!(s.capacity, 8);
        assert_eq!(s.buckets, 10);
        assert_eq!(s.occupied_buckets, 1);
        assert_eq!(s.longest_chain, 6);
        assert!((s.load_factor - 0.6).abs() < 1e-12);
        assert!((s.bucket_utilization() - 0.1).abs() < 1e-12);
    }
}
