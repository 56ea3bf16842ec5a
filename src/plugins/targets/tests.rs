//! Unit tests for the spatial model.
//!
//! Submodule tests so they can poke private pattern helpers if needed.

use bevy::prelude::*;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use super::*;
use crate::common::test_utils::{run_system_once, set_clock, world_with_core};
use crate::common::tunables::MovementScheme;

/// Time after which every fresh target has finished rising.
const SETTLED: f64 = 1.0;

fn cfg() -> Tunables {
    Tunables::default()
}

// -----------------------------------------------------------------------------
// Spawning
// -----------------------------------------------------------------------------

#[test]
fn spawn_wave_assigns_fresh_increasing_ids() {
    let cfg = cfg();
    let mut rng = GameRng::seeded(1);
    let mut field = TargetField::default();

    let first = field.spawn_wave(5, 0.0, &mut rng, &cfg);
    assert_eq!(first, (1..=5).map(TargetId).collect::<Vec<_>>());

    let second = field.spawn_wave(3, 1.0, &mut rng, &cfg);
    assert_eq!(second, vec![TargetId(6), TargetId(7), TargetId(8)]);

    // Wholesale replacement: only the new wave remains.
    assert_eq!(field.len(), 3);
    assert!(field.get(TargetId(1)).is_none());
}

#[test]
fn spawned_targets_start_inside_the_volume_and_alive() {
    let cfg = cfg();
    let mut rng = GameRng::seeded(2);
    let mut field = TargetField::default();
    field.spawn_wave(64, 0.0, &mut rng, &cfg);

    for t in field.iter() {
        assert!(cfg.spawn_volume.contains(t.position), "{:?}", t.position);
        assert!(t.is_alive());
        assert_eq!(t.hit_at(), None);
    }
}

#[test]
fn patterned_scheme_uses_all_three_patterns() {
    let cfg = cfg();
    let mut rng = GameRng::seeded(3);
    let mut field = TargetField::default();
    field.spawn_wave(200, 0.0, &mut rng, &cfg);

    let mut seen = [false; 3];
    for t in field.iter() {
        match t.pattern {
            MovementPattern::Stationary => seen[0] = true,
            MovementPattern::Lateral => seen[1] = true,
            MovementPattern::Erratic { .. } => seen[2] = true,
            MovementPattern::Bounce => panic!("bounce is not part of the patterned scheme"),
        }
    }
    assert_eq!(seen, [true; 3]);
}

#[test]
fn bounce_scheme_only_bounces() {
    let mut cfg = cfg();
    cfg.motion.scheme = MovementScheme::Bounce;
    let mut rng = GameRng::seeded(4);
    let mut field = TargetField::default();
    field.spawn_wave(20, 0.0, &mut rng, &cfg);
    assert!(field.iter().all(|t| t.pattern == MovementPattern::Bounce));
}

#[test]
fn spawn_at_clamps_into_volume() {
    let cfg = cfg();
    let mut field = TargetField::default();
    let id = field.spawn_at(TargetSpec::stationary(Vec3::new(100.0, -5.0, 0.0)), 0.0, &cfg);
    let t = field.get(id).unwrap();
    assert_eq!(t.position, Vec3::new(8.0, 0.5, -22.0));
}

// -----------------------------------------------------------------------------
// Motion
// -----------------------------------------------------------------------------

#[test]
fn positions_never_leave_the_volume_many_random_cases() {
    let mut case_rng = ChaCha8Rng::seed_from_u64(0xC0FFEE);

    for case in 0..200 {
        let mut cfg = cfg();
        cfg.motion.scheme = if case % 2 == 0 { MovementScheme::Patterned } else { MovementScheme::Bounce };
        cfg.motion.speed_max = case_rng.gen_range(4.0..60.0);

        let mut rng = GameRng::seeded(case);
        let mut field = TargetField::default();
        field.spawn_wave(8, 0.0, &mut rng, &cfg);

        let mut now = 0.0_f64;
        for _ in 0..300 {
            // Mix normal frames with hitches.
            let dt: f32 = if case_rng.gen_bool(0.05) { case_rng.gen_range(0.2..2.0) } else { case_rng.gen_range(0.0..0.04) };
            now += f64::from(dt);
            field.advance(dt, now, &mut rng, &cfg);

            for t in field.iter() {
                assert!(cfg.spawn_volume.contains(t.position), "case {case}: {:?} escaped at {:?}", t.id, t.position);
            }
        }
    }
}

#[test]
fn frame_delta_is_capped() {
    let cfg = cfg();
    let mut rng = GameRng::seeded(5);
    let mut field = TargetField::default();
    let start = Vec3::new(0.0, 3.0, -25.0);
    let id = field.spawn_at(TargetSpec::moving(start, Vec3::new(10.0, 0.0, 0.0), MovementPattern::Bounce), 0.0, &cfg);

    field.advance(1.0, SETTLED, &mut rng, &cfg);

    let moved = field.get(id).unwrap().position.x - start.x;
    assert!((moved - 10.0 * cfg.lifecycle.max_frame_delta).abs() < 1e-5, "moved {moved}");
}

#[test]
fn boundary_contact_reflects_velocity() {
    let cfg = cfg();
    let mut rng = GameRng::seeded(6);
    let mut field = TargetField::default();
    let id = field.spawn_at(
        TargetSpec::moving(Vec3::new(7.99, 3.0, -25.0), Vec3::new(5.0, 0.0, 0.0), MovementPattern::Bounce),
        0.0,
        &cfg,
    );

    field.advance(0.05, SETTLED, &mut rng, &cfg);

    let t = field.get(id).unwrap();
    assert_eq!(t.position.x, 8.0);
    assert!(t.velocity.x < 0.0);
}

#[test]
fn spawning_targets_hold_still_and_rise() {
    let cfg = cfg();
    let mut rng = GameRng::seeded(7);
    let mut field = TargetField::default();
    let start = Vec3::new(0.0, 3.0, -25.0);
    let id = field.spawn_at(TargetSpec::moving(start, Vec3::new(3.0, 0.0, 0.0), MovementPattern::Bounce), 0.0, &cfg);

    field.advance(0.05, 0.1, &mut rng, &cfg);
    let t = field.get(id).unwrap();
    assert_eq!(t.position, start);

    // Drawn below its rest height, and rising.
    let early = t.display_position(0.1, &cfg).y;
    let later = t.display_position(0.3, &cfg).y;
    assert!(early < start.y);
    assert!(later > early);
    assert!((t.display_position(0.4, &cfg).y - start.y).abs() < 1e-5);
}

#[test]
fn lateral_bob_is_deterministic_per_id() {
    let cfg = cfg();
    let mut rng = GameRng::seeded(8);
    let mut a = TargetField::default();
    let mut b = TargetField::default();
    let spec = TargetSpec::moving(Vec3::new(0.0, 3.0, -25.0), Vec3::new(2.0, 0.0, 0.0), MovementPattern::Lateral);
    a.spawn_at(spec, 0.0, &cfg);
    b.spawn_at(spec, 0.0, &cfg);

    a.advance(0.016, 1.234, &mut rng, &cfg);
    b.advance(0.016, 1.234, &mut rng, &cfg);

    let (ta, tb) = (a.get(TargetId(1)).unwrap(), b.get(TargetId(1)).unwrap());
    assert_eq!(ta.position, tb.position);
    assert!((ta.position.y - 3.0).abs() <= cfg.motion.bob_amplitude + 1e-5);
}

#[test]
fn erratic_targets_retarget_when_countdown_expires() {
    let cfg = cfg();
    let mut rng = GameRng::seeded(9);
    let mut field = TargetField::default();
    let id = field.spawn_at(
        TargetSpec::moving(Vec3::new(0.0, 3.0, -25.0), Vec3::new(2.0, 0.0, 0.0), MovementPattern::Erratic { retarget_in: 0.01 }),
        0.0,
        &cfg,
    );

    field.advance(0.02, SETTLED, &mut rng, &cfg);

    let t = field.get(id).unwrap();
    let MovementPattern::Erratic { retarget_in } = t.pattern else {
        panic!("pattern changed");
    };
    assert!(retarget_in >= cfg.motion.erratic_retarget_min_secs);
    assert!((t.velocity.length() - 2.0).abs() < 1e-4);
}

// -----------------------------------------------------------------------------
// Lifecycle
// -----------------------------------------------------------------------------

#[test]
fn resolve_hit_is_one_way_and_idempotent() {
    let cfg = cfg();
    let mut field = TargetField::default();
    let id = field.spawn_at(TargetSpec::stationary(Vec3::new(0.0, 3.0, -25.0)), 0.0, &cfg);

    assert_eq!(field.resolve_hit(id, 2.0), Some(Vec3::new(0.0, 3.0, -25.0)));
    assert_eq!(field.get(id).unwrap().hit_at(), Some(2.0));

    assert_eq!(field.resolve_hit(id, 2.5), None);
    assert_eq!(field.get(id).unwrap().hit_at(), Some(2.0));
    assert_eq!(field.resolve_hit(TargetId(999), 2.5), None);
}

#[test]
fn dead_targets_do_not_move() {
    let cfg = cfg();
    let mut rng = GameRng::seeded(10);
    let mut field = TargetField::default();
    let start = Vec3::new(0.0, 3.0, -25.0);
    let id = field.spawn_at(TargetSpec::moving(start, Vec3::X * 3.0, MovementPattern::Bounce), 0.0, &cfg);
    field.resolve_hit(id, SETTLED);

    field.advance(0.05, SETTLED + 0.05, &mut rng, &cfg);
    assert_eq!(field.get(id).unwrap().position, start);
}

#[test]
fn dying_targets_fade_then_get_collected() {
    let cfg = cfg();
    let mut field = TargetField::default();
    let id = field.spawn_at(TargetSpec::stationary(Vec3::new(0.0, 3.0, -25.0)), 0.0, &cfg);
    field.resolve_hit(id, 1.0);

    let t = field.get(id).unwrap();
    assert!(t.display_scale(1.1, &cfg) < 1.0);
    assert!(t.display_position(1.1, &cfg).y > 3.0);
    assert!(t.is_visible(1.1, &cfg));

    assert_eq!(field.collect_expired(1.0 + 0.3, &cfg), 0);
    assert_eq!(field.collect_expired(1.0 + 0.36, &cfg), 1);
    assert!(field.is_empty());
}

#[test]
fn advance_targets_system_uses_frame_clock() {
    let mut world = world_with_core(11);
    world.init_resource::<TargetField>();
    {
        let cfg = world.resource::<Tunables>().clone();
        let mut field = world.resource_mut::<TargetField>();
        let id = field.spawn_at(TargetSpec::moving(Vec3::new(0.0, 3.0, -25.0), Vec3::X * 2.0, MovementPattern::Bounce), 0.0, &cfg);
        field.resolve_hit(id, 0.0);
        field.spawn_at(TargetSpec::moving(Vec3::new(0.0, 3.0, -25.0), Vec3::X * 2.0, MovementPattern::Bounce), 0.0, &cfg);
    }
    set_clock(&mut world, SETTLED, 0.05);

    run_system_once(&mut world, advance_targets);

    let field = world.resource::<TargetField>();
    assert_eq!(field.len(), 1, "faded target collected");
    let t = field.get(TargetId(2)).unwrap();
    assert!((t.position.x - 0.1).abs() < 1e-5);
}

#[test]
fn ids_lists_only_live_targets() {
    let cfg = cfg();
    let mut rng = GameRng::seeded(12);
    let mut field = TargetField::default();
    field.spawn_wave(3, 0.0, &mut rng, &cfg);
    field.resolve_hit(TargetId(2), 0.5);

    assert_eq!(field.ids(), vec![TargetId(1), TargetId(3)]);
    assert_eq!(field.len(), 3);
}
