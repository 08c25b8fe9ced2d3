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

// Herald Sandbox
// Drives a dispatcher from a simulated game loop: systems react to messages,
// queue follow-ups, and the loop flushes the queue once per tick.

use std::cell::Cell;
use std::rc::Rc;

use anyhow::Result;
use herald_core::{Dispatcher, DispatcherConfig};

const TICKS: u64 = 5;

#[derive(Debug, Clone, Copy)]
struct TickStarted(u64);

#[derive(Debug, Clone, Copy)]
struct PlayerDamaged {
    amount: u32,
}

#[derive(Debug, Clone, Copy)]
struct PlayerDied {
    tick: u64,
}

/// Tracks the player's health and announces death through the deferred queue.
struct HealthSystem {
    health: Cell<u32>,
    tick: Cell<u64>,
}

impl HealthSystem {
    fn on_tick(&self, tick: &TickStarted) {
        self.tick.set(tick.0);
    }

    /// Applies damage and returns `true` only for the hit that kills the player.
    fn take_damage(&self, amount: u32) -> bool {
        let was_alive = self.health.get() > 0;
        let remaining = self.health.get().saturating_sub(amount);
        self.health.set(remaining);
        was_alive && remaining == 0
    }
}

/// Mirrors player state for display.
struct Hud {
    shown_damage: Cell<u32>,
}

impl Hud {
    fn on_damage(&self, event: &PlayerDamaged) {
        self.shown_damage.set(self.shown_damage.get() + event.amount);
        log::info!("HUD: total damage taken {}", self.shown_damage.get());
    }
}

fn main() -> Result<()> {
    use env_logger::{Builder, Env};

    Builder::from_env(Env::default().default_filter_or("info")).init();

    let dispatcher = Dispatcher::with_config(DispatcherConfig::default().with_drain_limit(64));

    let health = Rc::new(HealthSystem {
        health: Cell::new(100),
        tick: Cell::new(0),
    });
    let hud = Rc::new(Hud {
        shown_damage: Cell::new(0),
    });

    dispatcher.listen_method(health.clone(), HealthSystem::on_tick, 100);
    dispatcher.listen_method(hud.clone(), Hud::on_damage, -10);

    let system = health.clone();
    dispatcher.listen_with(
        move |dispatcher: &Dispatcher, event: &PlayerDamaged| {
            if system.take_damage(event.amount) {
                // Delivered by the same `process` call that delivered the damage.
                dispatcher.queue(PlayerDied {
                    tick: system.tick.get(),
                });
            }
        },
        10,
    );

    dispatcher.listen_once(
        |event: &PlayerDied| log::info!("Achievement unlocked: first death at tick {}", event.tick),
        0,
    );

    {
        // The debug overlay only lives for this scope.
        let _overlay = dispatcher.listen_scoped(
            |tick: &TickStarted| log::debug!("Overlay: tick {}", tick.0),
            0,
        );
        dispatcher.dispatch(&TickStarted(0));
    }

    for tick in 1..=TICKS {
        dispatcher.dispatch(&TickStarted(tick));
        dispatcher.queue(PlayerDamaged { amount: 30 });
        dispatcher.process();
        log::info!(
            "Tick {tick}: health {} ({} listener(s) subscribed)",
            health.health.get(),
            dispatcher.total_listeners()
        );
    }

    log::debug!("{dispatcher:?}");
    Ok(())
}
