//! Targets plugin: the spatial model.
//!
//! `TargetField` is plain data with plain methods; the systems here only feed it the
//! frame clock. Hit-scan and the wave scheduler reach it through the same resource,
//! so no other module keeps handles to individual targets.

use bevy::prelude::*;

use crate::common::rng::GameRng;
use crate::common::state::GameState;
use crate::common::tunables::Tunables;
use crate::plugins::core::{FrameSet, GameClock};

mod model;

pub use model::*;

pub fn plugin(app: &mut App) {
    app.init_resource::<TargetField>();
    app.add_systems(OnEnter(GameState::InGame), reset_targets);
    app.add_systems(Update, advance_targets.in_set(FrameSet::Targets));
}

fn reset_targets(mut field: ResMut<TargetField>) {
    *field = TargetField::default();
}

/// Step 3: move alive targets, then collect finished death fades.
pub fn advance_targets(
    clock: Res<GameClock>,
    tunables: Res<Tunables>,
    mut rng: ResMut<GameRng>,
    mut field: ResMut<TargetField>,
) {
    field.advance(clock.dt, clock.now, &mut rng, &tunables);
    let removed = field.collect_expired(clock.now, &tunables);
    if removed > 0 {
        debug!("Collected {removed} faded targets");
    }
}

#[cfg(test)]
mod tests;
