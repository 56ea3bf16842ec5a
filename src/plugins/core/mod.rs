//! Core plugin: shared resources, the frame clock and the per-tick ordering.
//!
//! One frame is one atomic unit of work. The order of the sets below is the
//! contract every gameplay plugin slots into:
//!
//! ```text
//!   Clamp     read Time, clamp delta into GameClock
//!   Intake    resolve queued shots (hit-scan, feedback, vfx, session)
//!   Waves     wave scheduler state check / spawn
//!   Targets   advance target motion, collect finished death fades
//!   Feedback  recoil / shake / crosshair decay
//!   Particles particle integration + expiry
//!   Snapshot  publish read-only view for presentation
//! ```

use bevy::prelude::*;

use crate::common::rng::GameRng;
use crate::common::state::GameState;
use crate::common::tunables::Tunables;

#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FrameSet {
    Clamp,
    Intake,
    Waves,
    Targets,
    Feedback,
    Particles,
    Snapshot,
}

/// Game time for the current frame.
///
/// `now` is the monotonic session clock in seconds; `dt` is the frame delta after
/// clamping, so a hitch never turns into a large jump.
#[derive(Resource, Debug, Clone, Copy, Default)]
pub struct GameClock {
    pub now: f64,
    pub dt: f32,
    pub frame: u64,
}

impl GameClock {
    /// Clamp a raw delta against the configured ceiling. Negative input is treated as zero.
    #[inline]
    pub fn clamp_delta(raw: f32, ceiling: f32) -> f32 {
        raw.clamp(0.0, ceiling)
    }
}

pub fn plugin(app: &mut App) {
    // Tests and embedders may insert their own tunables before the plugin runs.
    let preinserted = app.world().get_resource::<Tunables>().map(Tunables::validate);
    match preinserted {
        None => {
            app.insert_resource(Tunables::load_or_default(&Tunables::config_path()));
        }
        Some(Err(e)) => {
            warn!("{e}; using default tunables");
            app.insert_resource(Tunables::default());
        }
        Some(Ok(())) => {}
    }

    let seed = app.world().resource::<Tunables>().seed;
    if !app.world().contains_resource::<GameRng>() {
        app.insert_resource(GameRng::from_seed_option(seed));
    }

    app.insert_resource(GameClock::default());
    app.insert_resource(ClearColor(Color::srgb(0.035, 0.043, 0.06)));

    app.configure_sets(
        Update,
        (
            FrameSet::Clamp,
            FrameSet::Intake,
            FrameSet::Waves,
            FrameSet::Targets,
            FrameSet::Feedback,
            FrameSet::Particles,
            FrameSet::Snapshot,
        )
            .chain()
            .run_if(in_state(GameState::InGame)),
    );

    app.add_systems(Update, advance_clock.in_set(FrameSet::Clamp));
}

/// Step 1: clamp the frame delta and stamp the session clock.
pub fn advance_clock(time: Res<Time>, tunables: Res<Tunables>, mut clock: ResMut<GameClock>) {
    clock.now = time.elapsed_secs_f64();
    clock.dt = GameClock::clamp_delta(time.delta_secs(), tunables.lifecycle.max_frame_delta);
    clock.frame += 1;
}
