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

use super::listener::{ListenerEntry, ListenerHandle, Priority, DEFAULT_PRIORITY};
use super::registry::TypeRegistry;
use super::token::Token;
use crate::config::DispatcherConfig;
use crate::error::{DispatchError, Result};
use std::any::{type_name, TypeId};
use std::cell::{Cell, RefCell};
use std::collections::{HashSet, VecDeque};
use std::fmt;
use std::rc::Rc;

/// A deferred dispatch holding one message by value.
type QueuedDispatch = Box<dyn FnOnce(&Dispatcher)>;

/// Owns the listener registry and delivers typed messages to it.
///
/// All operations take `&self` and run to completion on the calling thread.
/// Listeners may call back into the dispatcher while it is delivering: no
/// internal borrow is held while user code runs.
///
/// # Re-entrancy
///
/// - [`dispatch`](Self::dispatch) iterates a snapshot of the listeners taken
///   when it starts. Listeners added during the pass are not invoked by it, and
///   a listener removed by an earlier listener in the same pass still fires.
/// - A listener registered with [`listen_once`](Self::listen_once) is skipped
///   by nested dispatches while its own callback is running.
/// - [`process`](Self::process) drains the deferred queue to a fixed point:
///   messages queued while it runs are delivered by the same call.
///
/// # Example
///
/// ```rust
/// use herald_core::Dispatcher;
/// use std::cell::RefCell;
/// use std::rc::Rc;
///
/// struct Ping;
///
/// let dispatcher = Dispatcher::new();
/// let log = Rc::new(RefCell::new(Vec::new()));
///
/// let sink = log.clone();
/// dispatcher.listen(move |_: &Ping| sink.borrow_mut().push("B"), 5);
/// let sink = log.clone();
/// dispatcher.listen(move |_: &Ping| sink.borrow_mut().push("A"), 10);
///
/// dispatcher.dispatch(&Ping);
/// assert_eq!(*log.borrow(), vec!["A", "B"]);
/// ```
pub struct Dispatcher {
    registry: RefCell<TypeRegistry>,
    pending_removal: RefCell<HashSet<ListenerHandle>>,
    queued: RefCell<VecDeque<QueuedDispatch>>,
    next_handle: Cell<u64>,
    processing: Cell<bool>,
    config: DispatcherConfig,
}

impl Dispatcher {
    /// Creates a dispatcher with the default configuration.
    pub fn new() -> Self {
        Self::with_config(DispatcherConfig::default())
    }

    /// Creates a dispatcher with the given configuration.
    pub fn with_config(config: DispatcherConfig) -> Self {
        log::debug!("Dispatcher initialized with {config:?}.");
        Self {
            registry: RefCell::new(TypeRegistry::default()),
            pending_removal: RefCell::new(HashSet::new()),
            queued: RefCell::new(VecDeque::new()),
            next_handle: Cell::new(0),
            processing: Cell::new(false),
            config,
        }
    }

    /// Returns the configuration this dispatcher was created with.
    pub fn config(&self) -> &DispatcherConfig {
        &self.config
    }

    // --- Subscription ---

    /// Registers a listener for messages of type `T`.
    ///
    /// Listeners with a higher `priority` are invoked first; equal priorities
    /// are invoked in registration order.
    ///
    /// ## Returns
    /// The handle identifying the new subscription.
    pub fn listen<T, F>(&self, callback: F, priority: Priority) -> ListenerHandle
    where
        T: 'static,
        F: Fn(&T) + 'static,
    {
        self.listen_with(move |_: &Dispatcher, message: &T| callback(message), priority)
    }

    /// Registers a listener for `T` at [`DEFAULT_PRIORITY`].
    pub fn subscribe<T, F>(&self, callback: F) -> ListenerHandle
    where
        T: 'static,
        F: Fn(&T) + 'static,
    {
        self.listen(callback, DEFAULT_PRIORITY)
    }

    /// Registers a listener that also receives the dispatcher delivering the message.
    ///
    /// Use this for listeners that need to re-enter the dispatcher, e.g. to
    /// queue follow-up messages or to remove themselves.
    pub fn listen_with<T, F>(&self, callback: F, priority: Priority) -> ListenerHandle
    where
        T: 'static,
        F: Fn(&Dispatcher, &T) + 'static,
    {
        let handle = self.allocate_handle();
        self.insert::<T>(ListenerEntry::typed::<T, _>(handle, priority, callback));
        handle
    }

    /// Registers a method of a shared instance as a listener for `T`.
    ///
    /// The listener keeps the instance alive for as long as it is subscribed.
    pub fn listen_method<T, C>(
        &self,
        instance: Rc<C>,
        method: fn(&C, &T),
        priority: Priority,
    ) -> ListenerHandle
    where
        T: 'static,
        C: 'static,
    {
        self.listen(move |message: &T| method(&instance, message), priority)
    }

    /// Registers a listener and wraps its handle in a [`Token`] owning the subscription.
    pub fn listen_scoped<T, F>(&self, callback: F, priority: Priority) -> Token<'_>
    where
        T: 'static,
        F: Fn(&T) + 'static,
    {
        Token::new(self, self.listen(callback, priority))
    }

    // --- Once semantics ---

    /// Registers a listener for `T` that is invoked at most once.
    ///
    /// After its first invocation the listener unsubscribes itself, so it never
    /// fires again no matter how many `T` messages follow. While its callback
    /// runs, nested dispatches of `T` skip it and [`has_listener`](Self::has_listener)
    /// reports it as gone.
    pub fn listen_once<T, F>(&self, callback: F, priority: Priority) -> ListenerHandle
    where
        T: 'static,
        F: Fn(&T) + 'static,
    {
        let handle = self.allocate_handle();
        let entry = ListenerEntry::typed::<T, _>(
            handle,
            priority,
            move |dispatcher: &Dispatcher, message: &T| {
                dispatcher.pending_removal.borrow_mut().insert(handle);
                callback(message);
                dispatcher.pending_removal.borrow_mut().remove(&handle);
                dispatcher.remove(handle);
            },
        );
        self.insert::<T>(entry);
        handle
    }

    /// Registers a method of a shared instance as a one-shot listener for `T`.
    pub fn listen_once_method<T, C>(
        &self,
        instance: Rc<C>,
        method: fn(&C, &T),
        priority: Priority,
    ) -> ListenerHandle
    where
        T: 'static,
        C: 'static,
    {
        self.listen_once(move |message: &T| method(&instance, message), priority)
    }

    // --- Immediate dispatch ---

    /// Delivers `message` to every listener of `T`, synchronously and in priority order.
    ///
    /// Dispatching a type nobody listens to is a no-op.
    pub fn dispatch<T: 'static>(&self, message: &T) {
        let snapshot = self.registry.borrow().snapshot(TypeId::of::<T>());
        let Some(snapshot) = snapshot else {
            return;
        };

        if self.config.trace_dispatch {
            log::trace!(
                "Dispatching `{}` to {} listener(s).",
                type_name::<T>(),
                snapshot.len()
            );
        }

        for entry in &snapshot {
            if self.is_pending_removal(entry.handle) {
                continue;
            }
            entry.invoke(self, message);
        }
    }

    // --- Deferred dispatch ---

    /// Queues `message` for delivery on the next [`process`](Self::process) call.
    ///
    /// The message is moved into the queue; nothing is dispatched yet.
    pub fn queue<T: 'static>(&self, message: T) {
        self.queued
            .borrow_mut()
            .push_back(Box::new(move |dispatcher: &Dispatcher| {
                dispatcher.dispatch(&message)
            }));
    }

    /// Delivers every queued message in submission order, then leaves the queue empty.
    ///
    /// Messages queued while this runs (including by listeners it invokes) are
    /// delivered by the same call. Any condition reported by
    /// [`try_process`](Self::try_process) is logged, never raised.
    pub fn process(&self) {
        match self.try_process() {
            Ok(0) => {}
            Ok(delivered) => log::debug!("Processed {delivered} queued message(s)."),
            Err(e @ DispatchError::ReentrantProcess) => log::error!("Ignoring process call: {e}."),
            Err(e) => log::warn!("Deferred queue partially drained: {e}."),
        }
    }

    /// Drains the deferred queue like [`process`](Self::process), reporting what happened.
    ///
    /// ## Returns
    /// The number of messages delivered.
    ///
    /// ## Errors
    /// - [`DispatchError::ReentrantProcess`] if called while a drain is already
    ///   running on this dispatcher. Nothing is delivered by the nested call.
    /// - [`DispatchError::DrainLimitExceeded`] if the configured drain limit was
    ///   reached. The undelivered messages stay queued in order. A limit of `0`
    ///   counts as no limit.
    pub fn try_process(&self) -> Result<usize> {
        if self.processing.replace(true) {
            return Err(DispatchError::ReentrantProcess);
        }
        let _guard = ProcessingGuard(&self.processing);

        let mut delivered = 0;
        loop {
            if let Some(limit) = self.config.drain_limit.filter(|&limit| limit > 0) {
                if delivered >= limit {
                    let remaining = self.queued_len();
                    if remaining > 0 {
                        return Err(DispatchError::DrainLimitExceeded { limit, remaining });
                    }
                    break;
                }
            }

            let next = self.queued.borrow_mut().pop_front();
            let Some(queued_dispatch) = next else {
                break;
            };
            queued_dispatch(self);
            delivered += 1;
        }
        Ok(delivered)
    }

    /// Discards every queued message without delivering it.
    ///
    /// ## Returns
    /// The number of messages discarded.
    pub fn clear_queue(&self) -> usize {
        let discarded = std::mem::take(&mut *self.queued.borrow_mut());
        let count = discarded.len();
        if count > 0 {
            log::debug!("Discarded {count} queued message(s).");
        }
        drop(discarded);
        count
    }

    // --- Removal & queries ---

    /// Unsubscribes the listener identified by `handle`.
    ///
    /// Unknown or already removed handles are ignored, as are one-shot
    /// listeners currently removing themselves. Safe to call from a listener.
    pub fn remove(&self, handle: ListenerHandle) {
        if self.is_pending_removal(handle) {
            return;
        }
        let removed = self.registry.borrow_mut().remove(handle);
        if !removed.is_empty() {
            log::trace!("Removed {handle}.");
        }
        // Dropped after the borrow ends: captured state may unsubscribe others.
        drop(removed);
    }

    /// Returns `true` if `handle` is subscribed and not in the middle of removing itself.
    pub fn has_listener(&self, handle: ListenerHandle) -> bool {
        !self.is_pending_removal(handle) && self.registry.borrow().contains(handle)
    }

    /// Returns the number of listeners currently subscribed to `T`.
    pub fn listener_count<T: 'static>(&self) -> usize {
        self.registry.borrow().count(TypeId::of::<T>())
    }

    /// Returns the number of listeners subscribed across all message types.
    pub fn total_listeners(&self) -> usize {
        self.registry.borrow().len()
    }

    /// Returns the number of messages waiting in the deferred queue.
    pub fn queued_len(&self) -> usize {
        self.queued.borrow().len()
    }

    /// Returns `true` while a [`process`](Self::process) call is draining the queue.
    pub fn is_processing(&self) -> bool {
        self.processing.get()
    }

    fn allocate_handle(&self) -> ListenerHandle {
        let raw = self.next_handle.get();
        self.next_handle.set(raw + 1);
        ListenerHandle::from_raw(raw)
    }

    fn insert<T: 'static>(&self, entry: ListenerEntry) {
        log::trace!(
            "Subscribing {} to `{}` at priority {}.",
            entry.handle,
            type_name::<T>(),
            entry.priority
        );
        self.registry.borrow_mut().insert(TypeId::of::<T>(), entry);
    }

    fn is_pending_removal(&self, handle: ListenerHandle) -> bool {
        self.pending_removal.borrow().contains(&handle)
    }
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dispatcher")
            .field("listeners", &self.total_listeners())
            .field("queued", &self.queued_len())
            .field("next_handle", &self.next_handle.get())
            .field("processing", &self.processing.get())
            .field("config", &self.config)
            .finish()
    }
}

/// Clears the processing flag even if a listener panics mid-drain.
struct ProcessingGuard<'a>(&'a Cell<bool>);

impl Drop for ProcessingGuard<'_> {
    fn drop(&mut self) {
        self.0.set(false);
    }
}
