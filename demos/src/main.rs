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

//! Walks a spillway cache through insert, spill, reload, and flush with
//! debug logging enabled so the spill traffic is visible.

use spillway::{FileFormat, SpillCache};
use tempfile::tempdir;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    let dir = tempdir()?;

    let mut cache: SpillCache<u64, String> = SpillCache::builder()
        .with_dir(dir.path())
        .with_capacity(64)
        .with_file_format(FileFormat::Binary)
        .with_weighter(|_key, value: &String| value.len())
        .build()?;

    for i in 0..16u64 {
        cache.insert(i, format!("payload for entry {i}"))?;
    }
    println!(
        "resident: {} entries, {} bytes (budget {})",
        cache.memory_len(),
        cache.memory_weight(),
        cache.capacity()
    );

    // Entry 0 was spilled long ago; this reload pulls it back from disk.
    let value = cache.get(&0)?.cloned();
    println!("reloaded entry 0: {value:?}");

    // Make every resident entry durable without evicting it.
    cache.flush()?;
    println!(
        "spill files: {}",
        std::fs::read_dir(dir.path())?.count()
    );

    cache.close()?;
    Ok(())
}
