//! Shot intake consumer.
//!
//! Single writer for everything a shot touches this frame. Each queued
//! `FireRequest` runs the full chain before the next one is read, so two shots
//! in one frame see each other's kills.

use bevy::ecs::message::{MessageReader, MessageWriter};
use bevy::prelude::*;

use crate::common::geometry::view_basis;
use crate::common::rng::GameRng;
use crate::common::tunables::Tunables;
use crate::plugins::core::GameClock;
use crate::plugins::feedback::WeaponFeedback;
use crate::plugins::session::{SessionStats, ShotEvent};
use crate::plugins::targets::TargetField;
use crate::plugins::vfx::{ParticleField, ParticleKind};

use super::{ArenaGeometry, FireRequest, ShotOutcome, resolve_shot};

/// World-space muzzle point for a shot along `ray`.
pub fn muzzle_point(ray: Ray3d, offset: Vec3) -> Vec3 {
    let forward = *ray.direction;
    let (right, up) = view_basis(forward);
    ray.origin + right * offset.x + up * offset.y + forward * offset.z
}

#[allow(clippy::too_many_arguments)]
pub fn process_fire_requests(
    mut reader: MessageReader<FireRequest>,
    clock: Res<GameClock>,
    tunables: Res<Tunables>,
    arena: Res<ArenaGeometry>,
    mut rng: ResMut<GameRng>,
    mut field: ResMut<TargetField>,
    mut feedback: ResMut<WeaponFeedback>,
    mut particles: ResMut<ParticleField>,
    mut stats: ResMut<SessionStats>,
    mut writer: MessageWriter<ShotEvent>,
) {
    let now = clock.now;

    for req in reader.read() {
        let outcome = resolve_shot(req.ray, &mut field, &arena, now, &tunables);

        feedback.on_fire(&tunables.feedback);
        if let Some(zone) = outcome.zone() {
            feedback.on_hit(zone, &tunables.feedback);
        }

        match outcome {
            ShotOutcome::Hit { position, .. } => particles.burst(ParticleKind::HitDebris, position, now, &mut rng),
            ShotOutcome::Miss { impact: Some(point) } => particles.burst(ParticleKind::WallSpark, point, now, &mut rng),
            ShotOutcome::Miss { impact: None } => {}
        }

        let muzzle = muzzle_point(req.ray, tunables.view.muzzle_offset);
        let (right, _) = view_basis(*req.ray.direction);
        let eject = right * tunables.particles.casing_eject_speed;
        let casings = tunables.particles.shell_casing.burst;
        particles.spawn_with_drift(ParticleKind::ShellCasing, muzzle, casings, eject, now, &mut rng);
        particles.burst(ParticleKind::MuzzleSmoke, muzzle, now, &mut rng);

        let points = stats.record(&outcome, tunables.scoring);
        debug!("Shot {:?} (+{points}), streak {}", outcome, stats.streak);

        writer.write(ShotEvent::from(&outcome));
    }
}
