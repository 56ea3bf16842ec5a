//! Session counters and the outbound shot event.
//!
//! `SessionStats` is a reducer over shot outcomes and has no other writer.
//! `ShotEvent` is the one thing the core tells the outside world.

use bevy::prelude::*;

use crate::common::state::GameState;
use crate::common::tunables::ScoringPolicy;
use crate::plugins::hitscan::ShotOutcome;

/// Outbound per-shot event: `hit`, where it landed, and whether it was a headshot.
///
/// Misses carry neither a position nor a headshot flag.
#[derive(Message, Debug, Clone, Copy, PartialEq)]
pub struct ShotEvent {
    pub hit: bool,
    pub position: Option<Vec3>,
    pub headshot: Option<bool>,
}

impl From<&ShotOutcome> for ShotEvent {
    fn from(outcome: &ShotOutcome) -> Self {
        match *outcome {
            ShotOutcome::Hit { position, .. } => Self {
                hit: true,
                position: Some(position),
                headshot: outcome.is_headshot(),
            },
            ShotOutcome::Miss { .. } => Self { hit: false, position: None, headshot: None },
        }
    }
}

#[derive(Resource, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionStats {
    pub shots: u32,
    pub hits: u32,
    pub score: u32,
    pub streak: u32,
    pub best_streak: u32,
}

impl SessionStats {
    /// Fold one shot in. Returns the points awarded.
    pub fn record(&mut self, outcome: &ShotOutcome, policy: ScoringPolicy) -> u32 {
        self.shots += 1;
        match outcome.zone() {
            Some(zone) => {
                let points = policy.points(zone);
                self.hits += 1;
                self.score += points;
                self.streak += 1;
                self.best_streak = self.best_streak.max(self.streak);
                points
            }
            None => {
                self.streak = 0;
                0
            }
        }
    }

    /// Hit percentage, 0 before the first shot.
    pub fn accuracy(&self) -> f32 {
        if self.shots == 0 {
            return 0.0;
        }
        self.hits as f32 / self.shots as f32 * 100.0
    }
}

pub fn plugin(app: &mut App) {
    app.init_resource::<SessionStats>();
    app.add_message::<ShotEvent>();
    app.add_systems(OnEnter(GameState::InGame), reset_session);
}

fn reset_session(mut stats: ResMut<SessionStats>) {
    *stats = SessionStats::default();
}
