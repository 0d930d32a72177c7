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

use std::path::PathBuf;

use spillway_common::{
    code::{StorageKey, StorageValue},
    error::{Error, Result},
};
use spillway_memory::{BoundedCache, Weighter};

use crate::{cache::SpillCache, serde::FileFormat, store::FileStore};

/// Builder for [`SpillCache`].
///
/// Defaults: spill directory `"cache"`, byte budget `0` (every insertion
/// displaces all other entries immediately), [`FileFormat::Text`], single
/// file mode off.
pub struct SpillCacheBuilder<K, V>
where
    K: StorageKey,
    V: StorageValue,
{
    dir: PathBuf,
    capacity: usize,
    format: FileFormat,
    single_file: bool,
    weighter: Weighter<K, V>,
}

impl<K, V> Default for SpillCacheBuilder<K, V>
where
    K: StorageKey,
    V: StorageValue,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> SpillCacheBuilder<K, V>
where
    K: StorageKey,
    V: StorageValue,
{
    /// Create a builder with the default configuration.
    pub fn new() -> Self {
        Self {
            dir: PathBuf::from("cache"),
            capacity: 0,
            format: FileFormat::default(),
            single_file: false,
            weighter: Box::new(|_, _| std::mem::size_of::<K>() + std::mem::size_of::<V>()),
        }
    }

    /// Set the directory spill files are stored under.
    ///
    /// The directory must contain only this cache's files:
    /// [`SpillCache::clear`] deletes every file found there.
    pub fn with_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.dir = dir.into();
        self
    }

    /// Set the byte budget of the in-memory layer.
    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    /// Set the serialization format of spill files.
    pub fn with_file_format(mut self, format: FileFormat) -> Self {
        self.format = format;
        self
    }

    /// Request that all evicted entries share one file.
    ///
    /// This mode is not implemented; [`SpillCacheBuilder::build`] fails
    /// with [`Error::Unsupported`] when it is set rather than risking a
    /// silently corrupt spill file.
    pub fn with_single_file(mut self, single_file: bool) -> Self {
        self.single_file = single_file;
        self
    }

    /// Set the weight function deciding how many bytes an entry accounts
    /// for.
    pub fn with_weighter(mut self, weighter: impl Fn(&K, &V) -> usize + Send + Sync + 'static) -> Self {
        self.weighter = Box::new(weighter);
        self
    }

    /// Build the cache, creating the spill directory if needed.
    pub fn build(self) -> Result<SpillCache<K, V>> {
        if self.single_file {
            return Err(Error::Unsupported("single spill file mode is not implemented"));
        }
        let store = FileStore::open(self.dir, self.format)?;
        let memory = BoundedCache::with_weighter(self.capacity, self.weighter);
        Ok(SpillCache::new(memory, store))
    }
}
