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

//! Error types reported by the dispatcher.
//!
//! None of the core dispatch operations fail. Only the draining of the
//! deferred queue through [`Dispatcher::try_process`](crate::Dispatcher::try_process)
//! can report a condition worth surfacing to the caller.

use thiserror::Error;

/// A convenient result alias for dispatcher operations.
pub type Result<T> = std::result::Result<T, DispatchError>;

/// A condition encountered while draining the deferred queue.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DispatchError {
    /// `process` was called from a listener while the queue was already being drained.
    ///
    /// The outer drain is unaffected and still delivers everything queued.
    #[error("deferred queue is already being processed")]
    ReentrantProcess,
    /// The configured drain limit was reached before the queue was empty.
    #[error("drain limit of {limit} reached with {remaining} message(s) still queued")]
    DrainLimitExceeded {
        /// The number of messages delivered before draining stopped.
        limit: usize,
        /// The number of messages left in the queue for the next drain.
        remaining: usize,
    },
}
