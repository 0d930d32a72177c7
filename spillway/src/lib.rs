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

//! spillway - tiered LRU cache with transparent disk spillover.
//!
//! A [`SpillCache`] keeps the most recently used entries in memory under a
//! byte budget and serializes evicted entries to one file per key under a
//! configured directory. A miss on a spilled key transparently reloads it
//! from disk and re-admits it to memory.
//!
//! The cache is a synchronous, single-threaded, embedded data structure:
//! every operation runs to completion on the calling thread, and a spill
//! directory is exclusively owned by one cache instance.
//!
//! ```
//! use spillway::SpillCache;
//!
//! fn main() -> spillway::Result<()> {
//!     let dir = tempfile::tempdir().unwrap();
//!
//!     let mut cache: SpillCache<u64, String> = SpillCache::builder()
//!         .with_dir(dir.path())
//!         .with_capacity(64)
//!         .with_weighter(|_key, value: &String| value.len())
//!         .build()?;
//!
//!     cache.insert(42, "the answer".to_string())?;
//!     assert_eq!(cache.get(&42)?, Some(&"the answer".to_string()));
//!
//!     // Force everything to disk without evicting.
//!     cache.flush()?;
//!     cache.close()?;
//!     Ok(())
//! }
//! ```

mod builder;
mod cache;
mod serde;
mod store;

/// Re-exports of the public API.
pub mod prelude;
pub use prelude::*;
