//! Presentation plugin (render-only).
//!
//! Reads `FrameSnapshot` and `ViewRig`, writes transforms and visibility. It
//! never touches simulation resources, so the gameplay plugins run the same
//! with or without it.
//!
//! ```text
//! Startup:     spawn camera + gun, lights, room, HUD, pre-spawned visual pools
//! OnEnter:     InGame locks the cursor, Lobby releases it
//! PostUpdate:  camera / gun / pools / HUD follow the snapshot
//! ```

mod hud;
mod pools;
mod scene;

use bevy::prelude::*;
use bevy::window::{CursorGrabMode, CursorOptions, PrimaryWindow};

use crate::common::state::GameState;

pub fn plugin(app: &mut App) {
    app.add_systems(Startup, (scene::spawn_scene, pools::spawn_pools, hud::spawn_hud))
        .add_systems(OnEnter(GameState::InGame), lock_cursor)
        .add_systems(OnEnter(GameState::Lobby), release_cursor)
        .add_systems(
            PostUpdate,
            (
                scene::follow_view,
                scene::drive_gun,
                pools::sync_targets,
                pools::sync_particles,
                hud::sync_hud,
                hud::sync_crosshair,
                hud::sync_lobby_prompt,
            )
                .before(TransformSystems::Propagate),
        );
}

fn lock_cursor(cursor: Option<Single<&mut CursorOptions, With<PrimaryWindow>>>) {
    let Some(mut cursor) = cursor else { return; };
    cursor.grab_mode = CursorGrabMode::Locked;
    cursor.visible = false;
}

fn release_cursor(cursor: Option<Single<&mut CursorOptions, With<PrimaryWindow>>>) {
    let Some(mut cursor) = cursor else { return; };
    cursor.grab_mode = CursorGrabMode::None;
    cursor.visible = true;
}
