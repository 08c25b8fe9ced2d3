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

use super::Dispatcher;
use std::any::{type_name, Any};
use std::fmt;
use std::rc::Rc;

/// The invocation order of a listener. Higher values are invoked first.
pub type Priority = i32;

/// The priority used when a caller has no ordering preference.
pub const DEFAULT_PRIORITY: Priority = 0;

/// An opaque identifier for one subscription on a [`Dispatcher`].
///
/// Handles are assigned monotonically by each dispatcher and are never reused
/// during its lifetime, across all message types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerHandle(u64);

impl ListenerHandle {
    /// Wraps a raw handle value, e.g. one previously obtained from [`raw`](Self::raw).
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    /// Returns the raw numeric value of the handle.
    pub const fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ListenerHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "listener#{}", self.0)
    }
}

/// A type-erased invoker. The typed wrapper restores the concrete message type.
pub(crate) type Invoker = Rc<dyn Fn(&Dispatcher, &dyn Any)>;

/// A priority-tagged listener stored in one bucket of the type registry.
///
/// Cloning an entry only bumps the invoker's reference count, which keeps
/// dispatch snapshots cheap.
#[derive(Clone)]
pub(crate) struct ListenerEntry {
    pub(crate) handle: ListenerHandle,
    pub(crate) priority: Priority,
    invoker: Invoker,
}

impl ListenerEntry {
    /// Wraps a callback for message type `T` behind a type-erased invoker.
    pub(crate) fn typed<T, F>(handle: ListenerHandle, priority: Priority, callback: F) -> Self
    where
        T: 'static,
        F: Fn(&Dispatcher, &T) + 'static,
    {
        let invoker: Invoker = Rc::new(move |dispatcher: &Dispatcher, message: &dyn Any| {
            match message.downcast_ref::<T>() {
                Some(message) => callback(dispatcher, message),
                // Buckets are keyed by `TypeId`, so this only fires on a registry bug.
                None => log::error!(
                    "Listener {handle} expected a `{}` message; invocation skipped.",
                    type_name::<T>()
                ),
            }
        });
        Self {
            handle,
            priority,
            invoker,
        }
    }

    pub(crate) fn invoke(&self, dispatcher: &Dispatcher, message: &dyn Any) {
        (self.invoker)(dispatcher, message);
    }
}

impl fmt::Debug for ListenerEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListenerEntry")
            .field("handle", &self.handle)
            .field("priority", &self.priority)
            .finish_non_exhaustive()
    }
}
