// Copyright 2021 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use core::hash::Hash;

use hashbrown::{Equivalent, HashMap};

/// A lookup key is distinct from the key type. This allows the lookup key
/// to not require ownership of the underlying key data, which would require
/// allocations on every cache hit.
pub(crate) trait LookupKey<K>: Hash + Equivalent<K> {
    fn to_key(&self) -> K;
}

/// An entry in the cache.
struct Entry<T> {
    epoch: u64,
    data: T,
}

/// A least-recently-used cache with a hashed index.
///
/// Every access stamps the entry with a fresh epoch; when the cache is full the
/// entry with the lowest epoch is evicted. Eviction scans all entries, which is
/// fine for capacities in the hundreds.
pub(crate) struct LruCache<K, T> {
    entries: HashMap<K, Entry<T>>,
    epoch: u64,
    max_entries: usize,
}

impl<K: Hash + Eq + Clone, T: Copy> LruCache<K, T> {
    pub(crate) fn new(max_entries: usize) -> Self {
        Self {
            entries: HashMap::with_capacity(max_entries.min(64)),
            epoch: 0,
            max_entries: max_entries.max(1),
        }
    }

    /// Returns the value for `key`, creating it with `make_data` if it is not
    /// cached. A `None` from `make_data` is returned as-is and not cached.
    pub(crate) fn entry(
        &mut self,
        key: &impl LookupKey<K>,
        make_data: impl FnOnce() -> Option<T>,
    ) -> Option<T> {
        self.epoch += 1;
        if let Some(entry) = self.entries.get_mut(key) {
            entry.epoch = self.epoch;
            return Some(entry.data);
        }
        let data = make_data()?;
        if self.entries.len() >= self.max_entries {
            self.evict_oldest();
        }
        self.entries.insert(
            key.to_key(),
            Entry {
                epoch: self.epoch,
                data,
            },
        );
        Some(data)
    }

    /// Returns `true` if `key` is cached, without touching its epoch.
    pub(crate) fn contains(&self, key: &impl LookupKey<K>) -> bool {
        self.entries.contains_key(key)
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    pub(crate) fn capacity(&self) -> usize {
        self.max_entries
    }

    pub(crate) fn clear(&mut self) {
        self.entries.clear();
        self.epoch = 0;
    }

    fn evict_oldest(&mut self) {
        let oldest = self
            .entries
            .iter()
            .min_by_key(|(_, entry)| entry.epoch)
            .map(|(key, _)| key.clone());
        if let Some(key) = oldest {
            self.entries.remove(&key);
        }
    }
}
