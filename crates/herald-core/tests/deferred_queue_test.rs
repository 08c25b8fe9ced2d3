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

use herald_core::{DispatchError, Dispatcher, DispatcherConfig};
use std::cell::RefCell;
use std::rc::Rc;

#[derive(Debug, Clone, Copy, PartialEq)]
struct Ping {
    id: u32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Echo {
    id: u32,
}

fn record_pings(dispatcher: &Dispatcher) -> Rc<RefCell<Vec<u32>>> {
    let ids = Rc::new(RefCell::new(Vec::new()));
    let sink = ids.clone();
    dispatcher.subscribe(move |ping: &Ping| sink.borrow_mut().push(ping.id));
    ids
}

#[test]
fn test_queued_messages_are_delivered_in_submission_order() {
    // --- 1. ARRANGE ---
    let dispatcher = Dispatcher::new();
    let ids = record_pings(&dispatcher);

    // --- 2. ACT ---
    dispatcher.queue(Ping { id: 1 });
    dispatcher.queue(Ping { id: 2 });
    let delivered_before_process = ids.borrow().len();
    dispatcher.process();

    // --- 3. ASSERT ---
    assert_eq!(delivered_before_process, 0, "queue() must not dispatch");
    assert_eq!(*ids.borrow(), vec![1, 2]);
}

/// `process()` drains to a fixed point: a message queued by a listener while
/// the queue is being processed is delivered by the same call.
#[test]
fn test_process_fixed_point_delivers_messages_queued_by_listeners() {
    // --- 1. ARRANGE ---
    let dispatcher = Dispatcher::new();
    let echoes = Rc::new(RefCell::new(Vec::new()));

    dispatcher.listen_with(
        |dispatcher: &Dispatcher, ping: &Ping| dispatcher.queue(Echo { id: ping.id * 10 }),
        0,
    );
    let sink = echoes.clone();
    dispatcher.subscribe(move |echo: &Echo| sink.borrow_mut().push(echo.id));

    dispatcher.queue(Ping { id: 1 });
    dispatcher.queue(Ping { id: 2 });

    // --- 2. ACT ---
    let delivered = dispatcher.try_process();

    // --- 3. ASSERT ---
    assert_eq!(delivered, Ok(4));
    assert_eq!(*echoes.borrow(), vec![10, 20]);
    assert_eq!(dispatcher.queued_len(), 0);
}

#[test]
fn test_process_on_empty_queue_is_noop() {
    let dispatcher = Dispatcher::new();
    let ids = record_pings(&dispatcher);

    dispatcher.process();

    assert_eq!(dispatcher.try_process(), Ok(0));
    assert!(ids.borrow().is_empty());
}

#[test]
fn test_drain_limit_spreads_work_across_ticks() {
    // --- 1. ARRANGE ---
    let config = DispatcherConfig {
        drain_limit: Some(3),
        trace_dispatch: false,
    };
    let dispatcher = Dispatcher::with_config(config);
    let ids = record_pings(&dispatcher);
    for id in 0..7 {
        dispatcher.queue(Ping { id });
    }

    // --- 2. ACT ---
    let first_tick = dispatcher.try_process();
    let second_tick = dispatcher.try_process();
    let third_tick = dispatcher.try_process();

    // --- 3. ASSERT ---
    assert_eq!(
        first_tick,
        Err(DispatchError::DrainLimitExceeded {
            limit: 3,
            remaining: 4
        })
    );
    assert_eq!(
        second_tick,
        Err(DispatchError::DrainLimitExceeded {
            limit: 3,
            remaining: 1
        })
    );
    assert_eq!(third_tick, Ok(1));
    assert_eq!(*ids.borrow(), (0..7).collect::<Vec<_>>());
}

#[test]
fn test_dispatch_during_process_is_immediate() {
    let dispatcher = Dispatcher::new();
    let order = Rc::new(RefCell::new(Vec::new()));

    let sink = order.clone();
    dispatcher.listen_with(
        move |dispatcher: &Dispatcher, ping: &Ping| {
            sink.borrow_mut().push(format!("ping {}", ping.id));
            dispatcher.dispatch(&Echo { id: ping.id });
        },
        0,
    );
    let sink = order.clone();
    dispatcher.subscribe(move |echo: &Echo| sink.borrow_mut().push(format!("echo {}", echo.id)));

    dispatcher.queue(Ping { id: 1 });
    dispatcher.queue(Ping { id: 2 });
    dispatcher.process();

    assert_eq!(
        *order.borrow(),
        vec!["ping 1", "echo 1", "ping 2", "echo 2"]
    );
}
