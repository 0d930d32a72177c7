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

use std::path::Path;

use spillway_common::{
    code::{StorageKey, StorageValue},
    error::Result,
};
use spillway_memory::BoundedCache;

use crate::{builder::SpillCacheBuilder, store::FileStore};

/// Tiered cache: a bounded in-memory LRU in front of a per-key spill file
/// store.
///
/// Entries evicted from memory are serialized to
/// `<dir>/<key>.psave` and transparently reloaded on a miss. A key is
/// either resident in memory, resident on disk, or absent; only
/// [`SpillCache::clear`] loses data outright.
///
/// Dropping the cache flushes the resident entries to disk (best effort;
/// use [`SpillCache::close`] to observe flush errors), so normal teardown
/// is lossless with respect to disk.
///
/// The spill directory is exclusively owned by this instance. No in-process
/// or cross-process locking is performed; concurrent access to the same
/// directory is unguarded.
pub struct SpillCache<K, V>
where
    K: StorageKey,
    V: StorageValue,
{
    memory: BoundedCache<K, V>,
    store: FileStore<K, V>,
}

impl<K, V> std::fmt::Debug for SpillCache<K, V>
where
    K: StorageKey,
    V: StorageValue,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SpillCache")
            .field("memory", &self.memory)
            .field("dir", &self.store.dir())
            .finish()
    }
}

impl<K, V> SpillCache<K, V>
where
    K: StorageKey,
    V: StorageValue,
{
    /// Start building a [`SpillCache`].
    pub fn builder() -> SpillCacheBuilder<K, V> {
        SpillCacheBuilder::new()
    }

    pub(crate) fn new(memory: BoundedCache<K, V>, store: FileStore<K, V>) -> Self {
        Self { memory, store }
    }

    /// Look up a key in memory first, then on disk.
    ///
    /// A disk hit reloads the value, re-admits it to memory (spilling
    /// whatever that displaces), and returns the freshly loaded value. The
    /// spill file is left in place and is overwritten on the next spill.
    pub fn get(&mut self, key: &K) -> Result<Option<&V>> {
        if !self.memory.contains(key) {
            let Some(value) = self.store.load(key)? else {
                return Ok(None);
            };
            for (k, v) in self.memory.insert(key.clone(), value) {
                self.store.store(&k, &v)?;
            }
        }
        Ok(self.memory.get(key))
    }

    /// Insert or overwrite an entry, spilling whatever the insertion
    /// displaces from memory.
    pub fn insert(&mut self, key: K, value: V) -> Result<()> {
        for (k, v) in self.memory.insert(key, value) {
            self.store.store(&k, &v)?;
        }
        Ok(())
    }

    /// Whether a key is resident in memory or on disk. No recency side
    /// effect.
    pub fn contains(&self, key: &K) -> Result<bool> {
        Ok(self.memory.contains(key) || self.store.contains(key)?)
    }

    /// Whether a key is resident in memory. No disk probe, no recency side
    /// effect.
    pub fn contains_in_memory(&self, key: &K) -> bool {
        self.memory.contains(key)
    }

    /// Drop every in-memory entry without spilling it AND delete every file
    /// in the spill directory.
    ///
    /// This is the only operation that loses data outright.
    pub fn clear(&mut self) -> Result<()> {
        self.memory.clear();
        self.store.clear()
    }

    /// Write every resident entry to its spill file without evicting.
    ///
    /// Idempotent: flushing twice with no intervening writes produces the
    /// same files.
    pub fn flush(&self) -> Result<()> {
        for (k, v) in self.memory.iter() {
            self.store.store(k, v)?;
        }
        tracing::debug!(entries = self.memory.len(), "flush resident entries");
        Ok(())
    }

    /// Flush the resident entries to disk and release the cache.
    pub fn close(mut self) -> Result<()> {
        self.flush()?;
        // Leave nothing for the drop flush to redo.
        self.memory.clear();
        Ok(())
    }

    /// Number of entries resident in memory.
    pub fn memory_len(&self) -> usize {
        self.memory.len()
    }

    /// Sum of the weights of the entries resident in memory.
    pub fn memory_weight(&self) -> usize {
        self.memory.weight()
    }

    /// Configured byte budget of the in-memory layer.
    pub fn capacity(&self) -> usize {
        self.memory.capacity()
    }

    /// Directory holding the spill files.
    pub fn dir(&self) -> &Path {
        self.store.dir()
    }
}

impl<K, V> Drop for SpillCache<K, V>
where
    K: StorageKey,
    V: StorageValue,
{
    fn drop(&mut self) {
        if self.memory.is_empty() {
            return;
        }
        if let Err(e) = self.flush() {
            tracing::error!("failed to flush resident entries on drop: {e}");
        }
    }
}
