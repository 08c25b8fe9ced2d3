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

use super::{Dispatcher, ListenerHandle};
use std::fmt;

/// A scope-bound owner of one subscription.
///
/// When an owning token is dropped it removes its listener from the
/// [`Dispatcher`] it was created with. Tokens cannot be cloned; moving one
/// moves the ownership with it, and assigning over an owning token drops (and
/// unsubscribes) the previous subscription.
///
/// The token borrows its dispatcher, so it can never outlive it.
///
/// # Example
///
/// ```rust
/// use herald_core::{Dispatcher, Token};
///
/// struct Tick;
///
/// let dispatcher = Dispatcher::new();
/// let handle = {
///     let token = Token::new(&dispatcher, dispatcher.subscribe(|_: &Tick| {}));
///     assert!(dispatcher.has_listener(token.handle()));
///     token.handle()
/// };
/// assert!(!dispatcher.has_listener(handle));
/// ```
#[must_use = "dropping a Token immediately unsubscribes its listener"]
pub struct Token<'d> {
    dispatcher: &'d Dispatcher,
    handle: ListenerHandle,
    owns: bool,
}

impl<'d> Token<'d> {
    /// Takes ownership of `handle`, which must belong to `dispatcher`.
    pub fn new(dispatcher: &'d Dispatcher, handle: ListenerHandle) -> Self {
        Self {
            dispatcher,
            handle,
            owns: true,
        }
    }

    /// Returns the handle this token was created for, owned or not.
    pub fn handle(&self) -> ListenerHandle {
        self.handle
    }

    /// Returns `true` while the token still owns its subscription.
    pub fn owns(&self) -> bool {
        self.owns
    }

    /// Unsubscribes now instead of at the end of the scope.
    pub fn remove(&mut self) {
        self.dispatcher.remove(self.handle);
        self.owns = false;
    }

    /// Gives up ownership without unsubscribing.
    ///
    /// The listener stays registered until removed through the returned handle.
    pub fn release(mut self) -> ListenerHandle {
        self.owns = false;
        self.handle
    }
}

impl Drop for Token<'_> {
    fn drop(&mut self) {
        if self.owns {
            self.dispatcher.remove(self.handle);
        }
    }
}

impl fmt::Debug for Token<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Token")
            .field("handle", &self.handle)
            .field("owns", &self.owns)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    struct Tick;

    #[test]
    fn test_drop_unsubscribes() {
        let dispatcher = Dispatcher::new();
        let handle = dispatcher.subscribe(|_: &Tick| {});
        {
            let token = Token::new(&dispatcher, handle);
            assert!(token.owns());
            assert!(dispatcher.has_listener(token.handle()));
        }
        assert!(!dispatcher.has_listener(handle));
    }

    #[test]
    fn test_early_remove_then_drop() {
        let dispatcher = Dispatcher::new();
        let mut token = dispatcher.listen_scoped(|_: &Tick| {}, 0);
        let handle = token.handle();

        token.remove();
        assert!(!token.owns());
        assert!(!dispatcher.has_listener(handle));

        token.remove();
        drop(token);
        assert_eq!(dispatcher.total_listeners(), 0);
    }

    #[test]
    fn test_move_transfers_ownership() {
        let dispatcher = Dispatcher::new();
        let token = dispatcher.listen_scoped(|_: &Tick| {}, 0);
        let handle = token.handle();

        let mut holders = Vec::new();
        holders.push(token);
        assert!(dispatcher.has_listener(handle));

        holders.clear();
        assert!(!dispatcher.has_listener(handle));
    }

    #[test]
    fn test_assignment_drops_previous_subscription() {
        let dispatcher = Dispatcher::new();
        let mut token = dispatcher.listen_scoped(|_: &Tick| {}, 0);
        let first = token.handle();

        token = dispatcher.listen_scoped(|_: &Tick| {}, 0);
        assert!(!dispatcher.has_listener(first));
        assert!(dispatcher.has_listener(token.handle()));
    }

    #[test]
    fn test_release_keeps_listener() {
        let dispatcher = Dispatcher::new();
        let calls = Rc::new(Cell::new(0));
        let counter = calls.clone();
        let token = dispatcher.listen_scoped(move |_: &Tick| counter.set(counter.get() + 1), 0);

        let handle = token.release();
        dispatcher.dispatch(&Tick);
        assert_eq!(calls.get(), 1);
        assert!(dispatcher.has_listener(handle));
    }
}
