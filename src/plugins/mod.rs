//! Feature plugins.

use bevy::prelude::*;

pub mod core;
pub mod feedback;
pub mod hitscan;
pub mod player;
pub mod relay;
pub mod session;
pub mod snapshot;
pub mod targets;
pub mod vfx;
pub mod waves;

// Render-only
pub mod presentation;

/// Register gameplay plugins that work in headless tests.
///
/// `core` goes first: it inserts the tunables the others read while building.
pub fn register_gameplay(app: &mut App) {
    core::plugin(app);
    targets::plugin(app);
    waves::plugin(app);
    hitscan::plugin(app);
    feedback::plugin(app);
    vfx::plugin(app);
    session::plugin(app);
    snapshot::plugin(app);
    relay::plugin(app);
    player::plugin(app);
}

/// Register render-only plugins (requires DefaultPlugins / render infra).
pub fn register_render(app: &mut App) {
    presentation::plugin(app);
}

/// Register all plugins (full app).
pub fn register_all(app: &mut App) {
    register_gameplay(app);
    register_render(app);
}
