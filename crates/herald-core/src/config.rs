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

//! Runtime settings for a [`Dispatcher`](crate::Dispatcher).

use serde::{Deserialize, Serialize};

/// Settings that tune how a dispatcher drains its deferred queue and logs.
///
/// The defaults reproduce the plain behaviour: `process` drains the queue to a
/// fixed point, including messages queued while it runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DispatcherConfig {
    /// The maximum number of deferred messages delivered by one `process` call.
    ///
    /// `None` drains until the queue is empty, and so does `Some(0)`. When the
    /// limit is hit, the rest of the queue is kept, in order, for the next call.
    pub drain_limit: Option<usize>,
    /// If `true`, each dispatch emits a `trace` log line with the message type
    /// and the number of listeners reached.
    pub trace_dispatch: bool,
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self {
            drain_limit: None,
            trace_dispatch: true,
        }
    }
}

impl DispatcherConfig {
    /// Returns a copy of this configuration with the given drain limit.
    #[must_use]
    pub fn with_drain_limit(mut self, limit: usize) -> Self {
        self.drain_limit = Some(limit);
        self
    }
}
