//! Read-only view of one frame, rebuilt as the last step of the tick.
//!
//! Presentation reads only this. Nothing in the simulation reads it back.

use bevy::prelude::*;

use crate::common::tunables::Tunables;
use crate::plugins::core::{FrameSet, GameClock};
use crate::plugins::feedback::{WeaponFeedback, sway};
use crate::plugins::session::SessionStats;
use crate::plugins::targets::{TargetField, TargetId, TargetTint};
use crate::plugins::vfx::{ParticleField, ParticleKind};
use crate::plugins::waves::WaveScheduler;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TargetView {
    pub id: TargetId,
    pub position: Vec3,
    pub scale: f32,
    pub alive: bool,
    pub tint: TargetTint,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParticleView {
    pub kind: ParticleKind,
    pub position: Vec3,
    pub scale: f32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct WeaponView {
    pub recoil_kick: f32,
    pub recoil_pitch: f32,
    pub shake_offset: Vec3,
    pub crosshair_spread: f32,
    /// 0..1, fading.
    pub hit_marker: f32,
    pub muzzle_flash: bool,
    pub sway: Vec2,
}

#[derive(Resource, Debug, Clone, Default)]
pub struct FrameSnapshot {
    pub frame: u64,
    pub now: f64,
    pub wave: u32,
    /// Visible targets only; faded-out ones are omitted.
    pub targets: Vec<TargetView>,
    pub particles: Vec<ParticleView>,
    pub weapon: WeaponView,
    pub stats: SessionStats,
}

impl FrameSnapshot {
    pub fn capture(
        clock: &GameClock,
        cfg: &Tunables,
        field: &TargetField,
        particles: &ParticleField,
        feedback: &WeaponFeedback,
        stats: &SessionStats,
        wave: u32,
    ) -> Self {
        let now = clock.now;
        let targets: Vec<TargetView> = field
            .iter()
            .filter(|t| t.is_visible(now, cfg))
            .map(|t| TargetView {
                id: t.id,
                position: t.display_position(now, cfg),
                scale: t.display_scale(now, cfg),
                alive: t.is_alive(),
                tint: t.tint,
            })
            .collect();
        let particles: Vec<ParticleView> = particles
            .pools()
            .flat_map(|pool| {
                let kind = pool.kind();
                pool.visible(now).map(move |(p, scale)| ParticleView { kind, position: p.position, scale })
            })
            .collect();

        Self {
            frame: clock.frame,
            now,
            wave,
            stats: *stats,
            weapon: WeaponView {
                recoil_kick: feedback.recoil.kick,
                recoil_pitch: feedback.recoil.pitch,
                shake_offset: feedback.shake.offset,
                crosshair_spread: feedback.crosshair.spread(),
                hit_marker: feedback.hit_marker.strength(),
                muzzle_flash: feedback.muzzle_flash.is_active(),
                sway: sway(now, &cfg.feedback),
            },
            targets,
            particles,
        }
    }
}

pub fn plugin(app: &mut App) {
    app.init_resource::<FrameSnapshot>();
    app.add_systems(Update, publish_snapshot.in_set(FrameSet::Snapshot));
}

/// Step 6.
#[allow(clippy::too_many_arguments)]
pub fn publish_snapshot(
    clock: Res<GameClock>,
    tunables: Res<Tunables>,
    field: Res<TargetField>,
    particles: Res<ParticleField>,
    feedback: Res<WeaponFeedback>,
    stats: Res<SessionStats>,
    waves: Res<WaveScheduler>,
    mut snapshot: ResMut<FrameSnapshot>,
) {
    *snapshot = FrameSnapshot::capture(&clock, &tunables, &field, &particles, &feedback, &stats, waves.wave());
}
