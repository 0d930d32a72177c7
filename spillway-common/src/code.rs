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

use std::fmt::{Debug, Display};

use serde::{de::DeserializeOwned, Serialize};

/// Key trait for the in-memory cache.
pub trait Key: Send + Sync + 'static + std::hash::Hash + Eq + Ord + Clone + Debug {}
impl<T> Key for T where T: Send + Sync + 'static + std::hash::Hash + Eq + Ord + Clone + Debug {}

/// Value trait for the in-memory cache.
pub trait Value: Send + Sync + 'static + Debug {}
impl<T> Value for T where T: Send + Sync + 'static + Debug {}

/// Key trait for the cache with disk spillover.
///
/// `Display` supplies the textual rendering the spill file name is derived
/// from. The rendering should be stable and injective; collisions between
/// distinct keys are detected at reload time, not prevented.
pub trait StorageKey: Key + Display + Serialize + DeserializeOwned {}
impl<T> StorageKey for T where T: Key + Display + Serialize + DeserializeOwned {}

/// Value trait for the cache with disk spillover.
pub trait StorageValue: Value + Serialize + DeserializeOwned {}
impl<T> StorageValue for T where T: Value + Serialize + DeserializeOwned {}
