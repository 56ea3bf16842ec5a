//! Test helpers.
//!
//! Bevy provides `World::run_system_once` (via the `RunSystemOnce` trait) for quickly
//! executing a system in tests without building a full schedule.
//!
//! Systems that use `Commands` enqueue structural changes. We call `world.flush()` after
//! running so queued commands are applied before assertions.

use bevy::ecs::system::{IntoSystem, RunSystemOnce};
use bevy::prelude::*;

use crate::common::rng::GameRng;
use crate::common::tunables::Tunables;
use crate::plugins::core::GameClock;

/// Run a system once on the given world, then flush deferred commands.
/// Returns the system output.
pub fn run_system_once<T, Out, Marker>(world: &mut World, system: T) -> Out
where
    T: IntoSystem<(), Out, Marker>,
{
    let out = world.run_system_once(system).expect("system run failed");
    world.flush();
    out
}

/// World with the shared resources every gameplay system reads.
pub fn world_with_core(seed: u64) -> World {
    let mut world = World::new();
    world.insert_resource(Tunables::default());
    world.insert_resource(GameRng::seeded(seed));
    world.insert_resource(GameClock::default());
    world
}

/// Set the frame clock directly, bypassing `Time`.
pub fn set_clock(world: &mut World, now: f64, dt: f32) {
    let mut clock = world.resource_mut::<GameClock>();
    clock.now = now;
    clock.dt = dt;
}
