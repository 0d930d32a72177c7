// Copyright 2025 spillway Project Authors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use hashbrown::HashMap;
use spillway_common::{
    code::{Key, Value},
    strict_assert_eq,
};

use crate::dlist::Dlist;

/// Weight function deciding how many bytes an entry accounts for.
pub type Weighter<K, V> = Box<dyn Fn(&K, &V) -> usize + Send + Sync + 'static>;

#[derive(Debug)]
struct Entry<K, V> {
    key: K,
    value: V,
    // Captured once per insert/overwrite so accounting stays exact even
    // against a non-deterministic weighter.
    weight: usize,
}

/// In-memory associative cache with strict LRU eviction under a byte budget.
///
/// Recency is tracked through an array-backed doubly linked list; a hash map
/// indexes keys to list slots. Evicted entries are returned to the caller
/// from [`BoundedCache::insert`] rather than dropped, so an owning layer can
/// persist them.
///
/// Eviction never displaces the entry that was just inserted or touched:
/// when a single entry's weight alone exceeds the budget it stays as the
/// sole resident. With `capacity == 0` every insertion therefore displaces
/// all other entries immediately.
pub struct BoundedCache<K, V>
where
    K: Key,
    V: Value,
{
    index: HashMap<K, usize>,
    list: Dlist<Entry<K, V>>,
    weight: usize,
    capacity: usize,
    weighter: Weighter<K, V>,
}

impl<K, V> std::fmt::Debug for BoundedCache<K, V>
where
    K: Key,
    V: Value,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BoundedCache")
            .field("len", &self.len())
            .field("weight", &self.weight)
            .field("capacity", &self.capacity)
            .finish()
    }
}

impl<K, V> BoundedCache<K, V>
where
    K: Key,
    V: Value,
{
    /// Create a cache with the given byte budget and the default weighter
    /// (`size_of::<K>() + size_of::<V>()` per entry).
    pub fn new(capacity: usize) -> Self {
        Self::with_weighter(
            capacity,
            Box::new(|_, _| std::mem::size_of::<K>() + std::mem::size_of::<V>()),
        )
    }

    /// Create a cache with the given byte budget and weighter.
    pub fn with_weighter(capacity: usize, weighter: Weighter<K, V>) -> Self {
        Self {
            index: HashMap::new(),
            list: Dlist::new(),
            weight: 0,
            capacity,
            weighter,
        }
    }

    /// Look up a key, promoting it to most recently used on a hit.
    pub fn get(&mut self, key: &K) -> Option<&V> {
        let token = *self.index.get(key)?;
        self.list.move_to_front(token);
        let entry = self.entry(key, token);
        Some(&entry.value)
    }

    /// Look up a key without touching recency.
    pub fn peek(&self, key: &K) -> Option<&V> {
        let token = *self.index.get(key)?;
        Some(&self.entry(key, token).value)
    }

    /// Membership test with no recency side effect.
    pub fn contains(&self, key: &K) -> bool {
        self.index.contains_key(key)
    }

    /// Insert or overwrite an entry, promote it to most recently used, and
    /// return the entries evicted to bring accounting back under the
    /// budget, least recently used first.
    pub fn insert(&mut self, key: K, value: V) -> Vec<(K, V)> {
        let weight = (self.weighter)(&key, &value);

        match self.index.get(&key).copied() {
            Some(token) => {
                self.list.move_to_front(token);
                let entry = self
                    .list
                    .get_mut(token)
                    .unwrap_or_else(|| panic!("key index and recency list out of sync: indexed slot {token} is vacant"));
                strict_assert_eq!(entry.key, key);
                self.weight = self.weight - entry.weight + weight;
                entry.value = value;
                entry.weight = weight;
            }
            None => {
                let token = self.list.push_front(Entry {
                    key: key.clone(),
                    value,
                    weight,
                });
                self.index.insert(key, token);
                self.weight += weight;
            }
        }

        self.evict()
    }

    /// Remove one entry, adjusting accounting.
    pub fn remove(&mut self, key: &K) -> Option<(K, V)> {
        let token = self.index.remove(key)?;
        let entry = self.list.remove(token);
        strict_assert_eq!(entry.key, *key);
        self.weight -= entry.weight;
        Some((entry.key, entry.value))
    }

    /// Evict the least recently used entry, if any.
    pub fn pop_lru(&mut self) -> Option<(K, V)> {
        let entry = self.list.pop_back()?;
        self.index.remove(&entry.key).unwrap_or_else(|| {
            panic!(
                "key index and recency list out of sync: evicted key {:?} missing from index",
                entry.key
            )
        });
        self.weight -= entry.weight;
        Some((entry.key, entry.value))
    }

    /// Drop every entry and reset accounting. Nothing is persisted.
    pub fn clear(&mut self) {
        self.index.clear();
        self.list.clear();
        self.weight = 0;
        assert!(self.list.is_empty());
    }

    /// Iterate entries from most to least recently used, without promotion.
    pub fn iter(&self) -> impl Iterator<Item = (&K, &V)> {
        self.list.iter().map(|entry| (&entry.key, &entry.value))
    }

    /// Number of resident entries.
    pub fn len(&self) -> usize {
        strict_assert_eq!(self.index.len(), self.list.len());
        self.list.len()
    }

    /// Whether the cache holds no entries.
    pub fn is_empty(&self) -> bool {
        self.list.is_empty()
    }

    /// Sum of the weights of all resident entries.
    pub fn weight(&self) -> usize {
        self.weight
    }

    /// Configured byte budget.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    fn evict(&mut self) -> Vec<(K, V)> {
        let mut evicted = Vec::new();
        while self.weight > self.capacity && self.list.len() > 1 {
            match self.pop_lru() {
                Some(kv) => evicted.push(kv),
                None => break,
            }
        }
        evicted
    }

    fn entry(&self, key: &K, token: usize) -> &Entry<K, V> {
        let entry = self
            .list
            .get(token)
            .unwrap_or_else(|| panic!("key index and recency list out of sync: indexed slot {token} is vacant"));
        strict_assert_eq!(entry.key, *key);
        entry
    }
}

#[cfg(test)]
mod tests {
    use itertools::Itertools;

    use super::*;

    fn unit_cache(capacity: usize) -> BoundedCache<String, u64> {
        BoundedCache::with_weighter(capacity, Box::new(|_, _| 1))
    }

    fn keys(cache: &BoundedCache<String, u64>) -> Vec<String> {
        cache.iter().map(|(k, _)| k.clone()).collect_vec()
    }

    #[test]
    fn test_insert_and_get() {
        let mut cache = unit_cache(4);
        assert!(cache.insert("a".to_string(), 1).is_empty());
        assert!(cache.insert("b".to_string(), 2).is_empty());
        assert_eq!(cache.get(&"a".to_string()), Some(&1));
        assert_eq!(cache.get(&"b".to_string()), Some(&2));
        assert_eq!(cache.get(&"c".to_string()), None);
        assert_eq!(cache.len(), 2);
        assert_eq!(cache.weight(), 2);
    }

    #[test]
    fn test_lru_eviction_order() {
        let mut cache = unit_cache(3);
        cache.insert("a".to_string(), 1);
        cache.insert("b".to_string(), 2);
        cache.insert("c".to_string(), 3);

        // Touch "a" so "b" becomes least recently used.
        cache.get(&"a".to_string());

        let evicted = cache.insert("d".to_string(), 4);
        assert_eq!(evicted, vec![("b".to_string(), 2)]);
        assert_eq!(keys(&cache), vec!["d", "a", "c"]);
    }

    #[test]
    fn test_contains_does_not_promote() {
        let mut cache = unit_cache(2);
        cache.insert("a".to_string(), 1);
        cache.insert("b".to_string(), 2);

        assert!(cache.contains(&"a".to_string()));
        assert_eq!(cache.peek(&"a".to_string()), Some(&1));

        // "a" is still least recently used after contains/peek.
        let evicted = cache.insert("c".to_string(), 3);
        assert_eq!(evicted, vec![("a".to_string(), 1)]);
    }

    #[test]
    fn test_overwrite_adjusts_weight_and_promotes() {
        let mut cache: BoundedCache<String, Vec<u8>> =
            BoundedCache::with_weighter(10, Box::new(|_, v: &Vec<u8>| v.len()));
        cache.insert("a".to_string(), vec![0; 4]);
        cache.insert("b".to_string(), vec![0; 4]);
        assert_eq!(cache.weight(), 8);

        // Overwriting "a" with a smaller value shrinks accounting by the
        // delta and promotes it.
        let evicted = cache.insert("a".to_string(), vec![0; 2]);
        assert!(evicted.is_empty());
        assert_eq!(cache.weight(), 6);
        assert_eq!(cache.len(), 2);

        let evicted = cache.insert("c".to_string(), vec![0; 6]);
        assert_eq!(evicted.len(), 1);
        assert_eq!(evicted[0].0, "b");
    }

    #[test]
    fn test_sole_resident_exception() {
        // A single entry heavier than the budget stays resident.
        let mut cache: BoundedCache<String, Vec<u8>> =
            BoundedCache::with_weighter(4, Box::new(|_, v: &Vec<u8>| v.len()));
        let evicted = cache.insert("big".to_string(), vec![0; 16]);
        assert!(evicted.is_empty());
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.weight(), 16);

        // The next insertion displaces it, but never itself.
        let evicted = cache.insert("huge".to_string(), vec![0; 32]);
        assert_eq!(evicted.len(), 1);
        assert_eq!(evicted[0].0, "big");
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_zero_capacity_keeps_newest() {
        let mut cache = unit_cache(0);
        assert!(cache.insert("a".to_string(), 1).is_empty());
        let evicted = cache.insert("b".to_string(), 2);
        assert_eq!(evicted, vec![("a".to_string(), 1)]);
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get(&"b".to_string()), Some(&2));
    }

    #[test]
    fn test_remove_and_pop_lru() {
        let mut cache = unit_cache(4);
        cache.insert("a".to_string(), 1);
        cache.insert("b".to_string(), 2);
        cache.insert("c".to_string(), 3);

        assert_eq!(cache.remove(&"b".to_string()), Some(("b".to_string(), 2)));
        assert_eq!(cache.remove(&"b".to_string()), None);
        assert_eq!(cache.weight(), 2);

        assert_eq!(cache.pop_lru(), Some(("a".to_string(), 1)));
        assert_eq!(cache.pop_lru(), Some(("c".to_string(), 3)));
        assert_eq!(cache.pop_lru(), None);
        assert_eq!(cache.weight(), 0);
    }

    #[test]
    fn test_clear_resets_accounting() {
        let mut cache = unit_cache(4);
        cache.insert("a".to_string(), 1);
        cache.insert("b".to_string(), 2);
        cache.clear();
        assert!(cache.is_empty());
        assert_eq!(cache.weight(), 0);
        assert_eq!(cache.get(&"a".to_string()), None);
    }

    #[test]
    fn test_weight_invariant_under_churn() {
        let mut cache: BoundedCache<u64, Vec<u8>> =
            BoundedCache::with_weighter(64, Box::new(|_, v: &Vec<u8>| v.len()));
        for i in 0..1000u64 {
            cache.insert(i % 37, vec![0; (i % 23) as usize]);
            let resident: usize = cache.iter().map(|(_, v)| v.len()).sum();
            assert_eq!(cache.weight(), resident);
            assert!(cache.weight() <= cache.capacity() || cache.len() == 1);
        }
    }
}
