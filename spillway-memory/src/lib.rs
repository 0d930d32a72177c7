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

//! In-memory LRU layer for spillway.
//!
//! [`BoundedCache`] keeps the most recently used entries resident under a
//! byte budget and hands evicted entries back to the caller instead of
//! dropping them, so an owning layer can persist them elsewhere.

mod cache;
mod dlist;

pub use cache::{BoundedCache, Weighter};
pub use dlist::{Dlist, Iter};
