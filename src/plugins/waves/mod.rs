//! Wave scheduler.
//!
//! ```text
//!   Empty ──spawn──> Active ──last kill──> Clearing{since} ──cooldown──> Spawning ──> Active
//! ```
//!
//! `Spawning` only exists for the duration of one `tick`; observers see it as the
//! phase reported alongside a `WaveSpawned` message.

use bevy::ecs::message::MessageWriter;
use bevy::prelude::*;

use crate::common::rng::GameRng;
use crate::common::state::GameState;
use crate::common::tunables::Tunables;
use crate::plugins::core::{FrameSet, GameClock};
use crate::plugins::targets::{TargetField, TargetId};

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum WavePhase {
    /// No targets exist yet.
    #[default]
    Empty,
    Spawning,
    /// At least one target alive.
    Active,
    /// Everything is dead; waiting out the cooldown.
    Clearing { since: f64 },
}

/// Written once per spawned wave.
#[derive(Message, Debug, Clone)]
pub struct WaveSpawned {
    pub wave: u32,
    pub ids: Vec<TargetId>,
}

#[derive(Resource, Debug, Clone, Default)]
pub struct WaveScheduler {
    phase: WavePhase,
    wave: u32,
}

impl WaveScheduler {
    pub fn phase(&self) -> WavePhase {
        self.phase
    }

    /// Number of waves spawned so far.
    pub fn wave(&self) -> u32 {
        self.wave
    }

    /// Advance the state machine. Returns the new wave when one was spawned.
    ///
    /// Relies on validated tunables: `1 <= waves.min <= waves.max`.
    pub fn tick(&mut self, now: f64, field: &mut TargetField, rng: &mut GameRng, cfg: &Tunables) -> Option<WaveSpawned> {
        debug_assert!(cfg.waves.min >= 1 && cfg.waves.min <= cfg.waves.max);

        match self.phase {
            WavePhase::Empty | WavePhase::Spawning => Some(self.spawn(now, field, rng, cfg)),
            WavePhase::Active => {
                if field.alive_count() == 0 {
                    debug!("Wave {} cleared", self.wave);
                    self.phase = WavePhase::Clearing { since: now };
                }
                None
            }
            WavePhase::Clearing { since } => {
                if now - since > f64::from(cfg.waves.cooldown_secs) {
                    self.phase = WavePhase::Spawning;
                    Some(self.spawn(now, field, rng, cfg))
                } else {
                    None
                }
            }
        }
    }

    fn spawn(&mut self, now: f64, field: &mut TargetField, rng: &mut GameRng, cfg: &Tunables) -> WaveSpawned {
        let count = rng.count(cfg.waves.min, cfg.waves.max);
        let ids = field.spawn_wave(count, now, rng, cfg);
        self.wave += 1;
        self.phase = WavePhase::Active;
        info!("Wave {} spawned with {} targets", self.wave, ids.len());
        WaveSpawned { wave: self.wave, ids }
    }
}

pub fn plugin(app: &mut App) {
    app.init_resource::<WaveScheduler>();
    app.add_message::<WaveSpawned>();
    app.add_systems(OnEnter(GameState::InGame), reset_waves);
    app.add_systems(Update, run_wave_scheduler.in_set(FrameSet::Waves));
}

fn reset_waves(mut waves: ResMut<WaveScheduler>) {
    *waves = WaveScheduler::default();
}

/// Step 2: state check / spawn.
pub fn run_wave_scheduler(
    clock: Res<GameClock>,
    tunables: Res<Tunables>,
    mut rng: ResMut<GameRng>,
    mut field: ResMut<TargetField>,
    mut waves: ResMut<WaveScheduler>,
    mut writer: MessageWriter<WaveSpawned>,
) {
    if let Some(spawned) = waves.tick(clock.now, &mut field, &mut rng, &tunables) {
        writer.write(spawned);
    }
}
