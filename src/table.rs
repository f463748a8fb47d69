use ahash::AHashMap;

use crate::aggregate::{Aggregate, Measure};

/// Worker-private key -> aggregate table, handed to the merger by value.
pub type LocalMap<V> = AHashMap<Box<[u8]>, Aggregate<V>>;

/// Folds one value into `map`, inserting a fresh aggregate for an unseen key.
#[inline]
pub fn observe_into<V: Measure>(map: &mut LocalMap<V>, key: &[u8], value: V) {
    match map.get_mut(key) {
        Some(agg) => agg.observe(value),
        None => {
            map.insert(key.into(), Aggregate::new(value));
        }
    }
}

/// The merged result of a run. Only the merger mutates it.
#[derive(Debug)]
pub struct GlobalTable<V> {
    entries: AHashMap<Box<[u8]>, Aggregate<V>>,
    chunks: usize,
}

impl<V: Measure> Default for GlobalTable<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V: Measure> GlobalTable<V> {
    pub fn new() -> Self {
        Self {
            entries: AHashMap::new(),
            chunks: 0,
        }
    }

    /// Merges a worker's local map into the table.
    pub fn absorb(&mut self, local: LocalMap<V>) {
        for (key, agg) in local {
            self.entries
                .entry(key)
                .and_modify(|global| global.merge(&agg))
                .or_insert(agg);
        }
        self.chunks += 1;
    }

    pub fn get(&self, key: &[u8]) -> Option<&Aggregate<V>> {
        self.entries.get(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of local maps absorbed so far.
    pub fn chunks(&self) -> usize {
        self.chunks
    }

    /// Total records folded into the table.
    pub fn records(&self) -> u64 {
        self.entries.values().map(Aggregate::count).sum()
    }

    /// Entries in ascending byte-wise key order.
    pub fn sorted(&self) -> Vec<(&[u8], &Aggregate<V>)> {
        let mut rows: Vec<_> = self
            .entries
            .iter()
            .map(|(key, agg)| (&key[..], agg))
            .collect();
        rows.sort_unstable_by(|a, b| a.0.cmp(b.0));
        rows
    }
}
