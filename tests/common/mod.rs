//! Integration test harness.
//!
//! Keep integration tests headless:
//! - `MinimalPlugins` provides core ECS runtime.
//! - `StatesPlugin` drives `GameState` transitions.
//! - we then call `neon_range::game::configure_headless` to install gameplay plugins.
//!
//! Time advances by a fixed step per `update`, so elapsed game time is predictable.

#![allow(dead_code)]

use std::time::Duration;

use bevy::prelude::*;
use bevy::state::app::StatesPlugin;
use bevy::time::TimeUpdateStrategy;

use neon_range::common::state::GameState;
use neon_range::common::tunables::Tunables;
use neon_range::plugins::core::GameClock;

/// Fixed step per frame.
pub const STEP: Duration = Duration::from_millis(50);

pub fn app_headless() -> App {
    app_with_tunables(Tunables { seed: Some(7), ..default() })
}

/// Tunables must be in place before the gameplay plugins build, or the core plugin
/// reads `config/range.ron` from disk.
pub fn app_with_tunables(tunables: Tunables) -> App {
    let mut app = App::new();
    app.add_plugins((MinimalPlugins, StatesPlugin));
    app.insert_resource(TimeUpdateStrategy::ManualDuration(STEP));
    app.insert_resource(tunables);

    neon_range::game::configure_headless(&mut app);
    app
}

/// Leave the lobby and run the first in-game frame.
pub fn enter_game(app: &mut App) {
    app.world_mut()
        .resource_mut::<NextState<GameState>>()
        .set(GameState::InGame);
    app.update();
    assert_eq!(*app.world().resource::<State<GameState>>().get(), GameState::InGame);
}

pub fn step(app: &mut App, frames: usize) {
    for _ in 0..frames {
        app.update();
    }
}

pub fn now(app: &App) -> f64 {
    app.world().resource::<GameClock>().now
}
