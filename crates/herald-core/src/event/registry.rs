// Copyright 2025 eraflo
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

//! The type-indexed listener storage behind a [`Dispatcher`](super::Dispatcher).

use super::listener::{ListenerEntry, ListenerHandle};
use std::any::TypeId;
use std::collections::HashMap;

/// Maps each message type to its listeners, sorted by descending priority.
///
/// Listeners of equal priority keep their registration order.
#[derive(Debug, Default)]
pub(crate) struct TypeRegistry {
    buckets: HashMap<TypeId, Vec<ListenerEntry>>,
}

impl TypeRegistry {
    /// Inserts an entry before the first listener with a strictly lower priority.
    pub(crate) fn insert(&mut self, type_id: TypeId, entry: ListenerEntry) {
        let bucket = self.buckets.entry(type_id).or_default();
        let index = bucket
            .iter()
            .position(|existing| existing.priority < entry.priority)
            .unwrap_or(bucket.len());
        bucket.insert(index, entry);
    }

    /// Copies the current listener sequence for a type, if any listener was ever registered.
    pub(crate) fn snapshot(&self, type_id: TypeId) -> Option<Vec<ListenerEntry>> {
        self.buckets.get(&type_id).cloned()
    }

    /// Takes the entry with the given handle out of whichever bucket holds it.
    ///
    /// The removed entries are handed back so the caller can drop them once
    /// it no longer borrows the registry: dropping a listener may run code
    /// that re-enters the dispatcher.
    pub(crate) fn remove(&mut self, handle: ListenerHandle) -> Vec<ListenerEntry> {
        // The owning bucket is not tracked, so every bucket is scanned.
        let mut removed = Vec::new();
        for bucket in self.buckets.values_mut() {
            if bucket.iter().any(|entry| entry.handle == handle) {
                let (taken, kept): (Vec<_>, Vec<_>) = std::mem::take(bucket)
                    .into_iter()
                    .partition(|entry| entry.handle == handle);
                *bucket = kept;
                removed.extend(taken);
            }
        }
        removed
    }

    pub(crate) fn contains(&self, handle: ListenerHandle) -> bool {
        self.buckets
            .values()
            .any(|bucket| bucket.iter().any(|entry| entry.handle == handle))
    }

    /// Returns the number of listeners registered for one type.
    pub(crate) fn count(&self, type_id: TypeId) -> usize {
        self.buckets.get(&type_id).map_or(0, Vec::len)
    }

    /// Returns the number of listeners across all types.
    pub(crate) fn len(&self) -> usize {
        self.buckets.values().map(Vec::len).sum()
    }
}
