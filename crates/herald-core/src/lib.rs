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

//! # Herald Core
//!
//! An in-process, synchronous, type-keyed publish/subscribe dispatcher.
//!
//! Components exchange typed messages through a [`Dispatcher`] without holding
//! references to each other. Listeners are ordered by priority, can be
//! registered for a single delivery, and can be owned by a scope-bound
//! [`Token`]. Messages are either delivered immediately with
//! [`Dispatcher::dispatch`] or deferred with [`Dispatcher::queue`] and flushed
//! later by [`Dispatcher::process`].

#![warn(missing_docs)]

pub mod config;
pub mod error;
pub mod event;

pub use config::DispatcherConfig;
pub use error::{DispatchError, Result};
pub use event::{Dispatcher, ListenerHandle, Priority, Token, DEFAULT_PRIORITY};
