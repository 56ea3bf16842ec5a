use bevy::ecs::message::Messages;
use bevy::prelude::*;

use super::intake::{muzzle_point, process_fire_requests};
use super::*;
use crate::common::test_utils::{run_system_once, set_clock, world_with_core};
use crate::plugins::feedback::WeaponFeedback;
use crate::plugins::session::{SessionStats, ShotEvent};
use crate::plugins::targets::{TargetField, TargetSpec};
use crate::plugins::vfx::{ParticleField, ParticleKind};

const SETTLED: f64 = 1.0;
const EPS: f32 = 1e-3;

fn ray(origin: Vec3, dir: Vec3) -> Ray3d {
    FireRequest::new(origin, dir).ray
}

fn field_with(cfg: &Tunables, positions: &[Vec3]) -> TargetField {
    let mut field = TargetField::default();
    for p in positions {
        field.spawn_at(TargetSpec::stationary(*p), 0.0, cfg);
    }
    field
}

#[test]
fn body_shot_reports_body_and_ray_point() {
    let cfg = Tunables::default();
    let mut field = field_with(&cfg, &[Vec3::new(0.0, 3.0, -25.0)]);
    let arena = ArenaGeometry::from_tuning(&cfg.arena);

    let out = resolve_shot(ray(Vec3::new(0.0, 3.0, 0.0), Vec3::NEG_Z), &mut field, &arena, SETTLED, &cfg);

    let ShotOutcome::Hit { target, position, zone } = out else { panic!("expected hit, got {out:?}") };
    assert_eq!(target, TargetId(1));
    assert_eq!(zone, HitZone::Body);
    assert!((position.z + 24.8).abs() < EPS, "{position:?}");
    assert_eq!(out.is_headshot(), Some(false));
}

#[test]
fn head_wins_where_both_volumes_overlap() {
    let cfg = Tunables::default();
    let mut field = field_with(&cfg, &[Vec3::new(0.0, 3.0, -25.0)]);
    let arena = ArenaGeometry::empty();

    let out = resolve_shot(ray(Vec3::new(0.0, 3.4, 0.0), Vec3::NEG_Z), &mut field, &arena, SETTLED, &cfg);
    assert_eq!(out.zone(), Some(HitZone::Head));
    assert_eq!(out.is_headshot(), Some(true));
}

#[test]
fn nearest_target_along_the_ray_wins() {
    let cfg = Tunables::default();
    let mut field = field_with(&cfg, &[Vec3::new(0.0, 3.0, -28.0), Vec3::new(0.0, 3.0, -22.0)]);
    let arena = ArenaGeometry::empty();

    let out = resolve_shot(ray(Vec3::new(0.0, 3.0, 0.0), Vec3::NEG_Z), &mut field, &arena, SETTLED, &cfg);
    assert_eq!(out.target(), Some(TargetId(2)));
    assert!(field.get(TargetId(1)).unwrap().is_alive());
}

#[test]
fn a_dead_target_cannot_be_hit_again() {
    let cfg = Tunables::default();
    let mut field = field_with(&cfg, &[Vec3::new(0.0, 3.0, -25.0)]);
    let arena = ArenaGeometry::from_tuning(&cfg.arena);
    let shot = ray(Vec3::new(0.0, 3.0, 0.0), Vec3::NEG_Z);

    assert!(resolve_shot(shot, &mut field, &arena, SETTLED, &cfg).is_hit());
    let second = resolve_shot(shot, &mut field, &arena, SETTLED + 0.1, &cfg);

    // Passes through the corpse and hits the back wall.
    let ShotOutcome::Miss { impact: Some(p) } = second else { panic!("expected wall impact, got {second:?}") };
    assert!((p.z + 30.0).abs() < EPS);
    assert_eq!(field.get(TargetId(1)).unwrap().hit_at(), Some(SETTLED));
}

#[test]
fn miss_into_the_open_side_has_no_impact() {
    let cfg = Tunables::default();
    let mut field = TargetField::default();
    let arena = ArenaGeometry::from_tuning(&cfg.arena);

    let out = resolve_shot(ray(cfg.view.eye, Vec3::Z), &mut field, &arena, SETTLED, &cfg);
    assert_eq!(out, ShotOutcome::Miss { impact: None });
    assert_eq!(out.position(), None);
    assert_eq!(out.is_headshot(), None);
}

#[test]
fn miss_reports_nearest_surface() {
    let cfg = Tunables::default();
    let mut field = TargetField::default();
    let arena = ArenaGeometry::from_tuning(&cfg.arena);

    // Straight at the lane post in front of the shooter.
    let dir = (Vec3::new(0.0, 0.75, -5.0) - cfg.view.eye).normalize();
    let out = resolve_shot(ray(cfg.view.eye, dir), &mut field, &arena, SETTLED, &cfg);
    let p = out.position().expect("impact");
    assert!(p.z > -5.1 && p.z < -4.9, "{p:?}");

    let hit = arena.raycast(cfg.view.eye, dir, 100.0).unwrap();
    assert_eq!(hit.kind, SurfaceKind::LanePost);
}

#[test]
fn props_never_shield_targets() {
    let cfg = Tunables::default();
    let mut field = field_with(&cfg, &[Vec3::new(0.0, 0.5, -25.0)]);
    let arena = ArenaGeometry::from_tuning(&cfg.arena);
    let origin = Vec3::new(0.0, 0.5, 0.0);

    assert!(arena.raycast(origin, Vec3::NEG_Z, 100.0).is_some_and(|h| h.kind.is_prop()));
    let out = resolve_shot(ray(origin, Vec3::NEG_Z), &mut field, &arena, SETTLED, &cfg);
    assert_eq!(out.target(), Some(TargetId(1)));
}

#[test]
fn rising_targets_are_hit_where_they_are_drawn() {
    let cfg = Tunables::default();
    let arena = ArenaGeometry::empty();

    // At t=0 the target is drawn a full spawn drop below its rest height.
    let mut field = field_with(&cfg, &[Vec3::new(0.0, 3.0, -25.0)]);
    assert!(!resolve_shot(ray(Vec3::new(0.0, 3.0, 0.0), Vec3::NEG_Z), &mut field, &arena, 0.0, &cfg).is_hit());
    assert!(resolve_shot(ray(Vec3::new(0.0, 1.5, 0.0), Vec3::NEG_Z), &mut field, &arena, 0.0, &cfg).is_hit());
}

#[test]
fn targets_beyond_max_range_are_ignored() {
    let mut cfg = Tunables::default();
    cfg.view.max_range = 10.0;
    let mut field = field_with(&cfg, &[Vec3::new(0.0, 3.0, -25.0)]);
    let arena = ArenaGeometry::from_tuning(&cfg.arena);

    let out = resolve_shot(ray(Vec3::new(0.0, 3.0, 0.0), Vec3::NEG_Z), &mut field, &arena, SETTLED, &cfg);
    assert_eq!(out, ShotOutcome::Miss { impact: None });
    assert!(field.get(TargetId(1)).unwrap().is_alive());
}

#[test]
fn hitbox_scales_with_target() {
    let cfg = Tunables::default();
    let arena = ArenaGeometry::empty();
    let shot = ray(Vec3::new(0.3, 3.0, 0.0), Vec3::NEG_Z);

    let mut small = field_with(&cfg, &[Vec3::new(0.0, 3.0, -25.0)]);
    assert!(!resolve_shot(shot, &mut small, &arena, SETTLED, &cfg).is_hit());

    let mut big = TargetField::default();
    big.spawn_at(TargetSpec { scale: 2.0, ..TargetSpec::stationary(Vec3::new(0.0, 3.0, -25.0)) }, 0.0, &cfg);
    assert!(resolve_shot(shot, &mut big, &arena, SETTLED, &cfg).is_hit());
}

#[test]
fn arena_is_open_behind_the_shooter() {
    let arena = ArenaGeometry::from_tuning(&Tunables::default().arena);
    assert!(arena.surfaces().iter().all(|s| s.bounds.max.z <= 0.0));
    assert_eq!(arena.surfaces().iter().filter(|s| s.kind == SurfaceKind::SideWall).count(), 2);

    let bare = ArenaGeometry::from_tuning(&crate::common::tunables::ArenaTuning { props: false, ..default() });
    assert!(bare.surfaces().iter().all(|s| !s.kind.is_prop()));
}

#[test]
fn muzzle_sits_right_low_and_forward_of_the_eye() {
    let shot = ray(Vec3::new(0.0, 1.7, 0.0), Vec3::NEG_Z);
    let m = muzzle_point(shot, Vec3::new(0.3, -0.1, 0.5));
    assert!((m - Vec3::new(0.3, 1.6, -0.5)).length() < 1e-5, "{m:?}");
}

// -----------------------------------------------------------------------------
// Intake system
// -----------------------------------------------------------------------------

fn intake_world() -> World {
    let mut world = world_with_core(21);
    let cfg = world.resource::<Tunables>().clone();
    world.insert_resource(field_with(&cfg, &[Vec3::new(0.0, 3.0, -25.0)]));
    world.insert_resource(ArenaGeometry::from_tuning(&cfg.arena));
    world.insert_resource(ParticleField::from_tuning(&cfg.particles));
    world.init_resource::<WeaponFeedback>();
    world.init_resource::<SessionStats>();
    world.init_resource::<Messages<FireRequest>>();
    world.init_resource::<Messages<ShotEvent>>();
    set_clock(&mut world, SETTLED, 0.016);
    world
}

fn written(world: &World) -> Vec<ShotEvent> {
    let msgs = world.resource::<Messages<ShotEvent>>();
    let mut cursor = msgs.get_cursor();
    cursor.read(msgs).copied().collect()
}

#[test]
fn intake_runs_the_full_hit_chain() {
    let mut world = intake_world();
    world
        .resource_mut::<Messages<FireRequest>>()
        .write(FireRequest::new(Vec3::new(0.0, 3.0, 0.0), Vec3::NEG_Z));

    run_system_once(&mut world, process_fire_requests);

    let stats = *world.resource::<SessionStats>();
    assert_eq!((stats.shots, stats.hits, stats.score, stats.streak), (1, 1, 1, 1));

    let fb = world.resource::<WeaponFeedback>();
    assert!((fb.recoil.kick - 0.06).abs() < 1e-6);
    assert!(fb.shake.intensity > 0.0);
    assert!(fb.hit_marker.is_active());
    assert!(fb.muzzle_flash.is_active());

    let vfx = world.resource::<ParticleField>();
    assert_eq!(vfx.pool(ParticleKind::HitDebris).len(), 10);
    assert_eq!(vfx.pool(ParticleKind::WallSpark).len(), 0);
    assert_eq!(vfx.pool(ParticleKind::ShellCasing).len(), 1);
    assert_eq!(vfx.pool(ParticleKind::MuzzleSmoke).len(), 3);

    let events = written(&world);
    assert_eq!(events.len(), 1);
    assert!(events[0].hit);
    assert_eq!(events[0].headshot, Some(false));
    assert!(events[0].position.is_some());
}

#[test]
fn intake_miss_sparks_and_resets_streak() {
    let mut world = intake_world();
    world.resource_mut::<SessionStats>().streak = 4;
    world
        .resource_mut::<Messages<FireRequest>>()
        .write(FireRequest::new(Vec3::new(5.0, 3.0, 0.0), Vec3::NEG_Z));

    run_system_once(&mut world, process_fire_requests);

    let stats = *world.resource::<SessionStats>();
    assert_eq!((stats.shots, stats.hits, stats.streak), (1, 0, 0));
    assert_eq!(world.resource::<WeaponFeedback>().shake.intensity, 0.0);
    assert_eq!(world.resource::<ParticleField>().pool(ParticleKind::WallSpark).len(), 8);
    assert_eq!(written(&world), vec![ShotEvent { hit: false, position: None, headshot: None }]);
}

#[test]
fn two_shots_in_one_frame_cannot_share_a_kill() {
    let mut world = intake_world();
    {
        let mut q = world.resource_mut::<Messages<FireRequest>>();
        q.write(FireRequest::new(Vec3::new(0.0, 3.0, 0.0), Vec3::NEG_Z));
        q.write(FireRequest::new(Vec3::new(0.0, 3.0, 0.0), Vec3::NEG_Z));
    }

    run_system_once(&mut world, process_fire_requests);

    let stats = *world.resource::<SessionStats>();
    assert_eq!((stats.shots, stats.hits), (2, 1));
    let hits: Vec<bool> = written(&world).iter().map(|e| e.hit).collect();
    assert_eq!(hits, vec![true, false]);
}
