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

//! Provides the synchronous, type-keyed message dispatcher.
//!
//! Listeners subscribe to a concrete message type on a [`Dispatcher`] and are
//! invoked in descending priority order whenever a message of that type is
//! dispatched. A [`Token`] ties a subscription to a scope.
//!
//! Everything here runs on the calling thread. The dispatcher is neither
//! `Send` nor `Sync`; listeners may re-enter it (subscribe, remove, queue,
//! dispatch) from inside their callbacks.

mod dispatcher;
mod listener;
mod registry;
mod token;

pub use self::dispatcher::Dispatcher;
pub use self::listener::{ListenerHandle, Priority, DEFAULT_PRIORITY};
pub use self::token::Token;
