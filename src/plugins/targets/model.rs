//! Target records and the owning arena.
//!
//! `TargetField` is the single owner of every live target. Other systems never hold
//! references into it between frames; they address targets by `TargetId`.

use bevy::prelude::*;

use crate::common::geometry::{Bounds3, ease_out_cubic};
use crate::common::rng::GameRng;
use crate::common::tunables::{MotionTuning, MovementScheme, Tunables};

/// Session-unique target id. Ids start at 1 and are never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TargetId(pub u64);

/// Target lifecycle.
///
/// One-way: `Alive -> Dying`. A dying target always carries the time it was hit and
/// is collected once its death fade has played out.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TargetLife {
    Alive,
    Dying { hit_at: f64 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetTint {
    Orange,
    Cyan,
}

/// How a target moves. Each variant has its own update function below.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MovementPattern {
    Stationary,
    /// Side to side along X with a vertical bob.
    Lateral,
    /// Re-picks a random heading whenever the countdown runs out.
    Erratic { retarget_in: f32 },
    /// Free velocity reflected off the spawn volume.
    Bounce,
}

impl MovementPattern {
    const PATTERNED: [Self; 3] = [Self::Stationary, Self::Lateral, Self::Erratic { retarget_in: 0.0 }];

    /// Uniform pick among the scheme's variants.
    pub fn pick(scheme: MovementScheme, rng: &mut GameRng) -> Self {
        match scheme {
            MovementScheme::Patterned => Self::PATTERNED[rng.index(Self::PATTERNED.len())],
            MovementScheme::Bounce => Self::Bounce,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Target {
    pub id: TargetId,
    /// Authoritative position; always inside the spawn volume.
    pub position: Vec3,
    pub velocity: Vec3,
    /// Height the lateral bob oscillates around.
    pub rest_y: f32,
    pub spawned_at: f64,
    pub life: TargetLife,
    pub pattern: MovementPattern,
    pub scale: f32,
    pub tint: TargetTint,
}

impl Target {
    #[inline]
    pub fn is_alive(&self) -> bool {
        matches!(self.life, TargetLife::Alive)
    }

    pub fn hit_at(&self) -> Option<f64> {
        match self.life {
            TargetLife::Alive => None,
            TargetLife::Dying { hit_at } => Some(hit_at),
        }
    }

    /// Spawn-in progress in `[0, 1]`.
    pub fn spawn_progress(&self, now: f64, spawn_in_secs: f32) -> f32 {
        if spawn_in_secs <= 0.0 {
            return 1.0;
        }
        (((now - self.spawned_at) / f64::from(spawn_in_secs)) as f32).clamp(0.0, 1.0)
    }

    /// Death fade progress in `[0, 1]`; zero while alive.
    pub fn death_progress(&self, now: f64, death_secs: f32) -> f32 {
        match self.life {
            TargetLife::Alive => 0.0,
            TargetLife::Dying { hit_at } => {
                (((now - hit_at) / f64::from(death_secs)) as f32).clamp(0.0, 1.0)
            }
        }
    }

    /// Where the target is drawn (and where its hit volumes sit): rises out of the
    /// floor while spawning, drifts up while fading.
    pub fn display_position(&self, now: f64, cfg: &Tunables) -> Vec3 {
        let life = &cfg.lifecycle;
        let rise = 1.0 - ease_out_cubic(self.spawn_progress(now, life.spawn_in_secs));
        let death = self.death_progress(now, life.death_secs);
        self.position + Vec3::Y * (death * life.death_rise - rise * life.spawn_drop)
    }

    pub fn display_scale(&self, now: f64, cfg: &Tunables) -> f32 {
        self.scale * (1.0 - self.death_progress(now, cfg.lifecycle.death_secs))
    }

    /// Drawn at all? Dying targets disappear once the fade completes.
    pub fn is_visible(&self, now: f64, cfg: &Tunables) -> bool {
        self.death_progress(now, cfg.lifecycle.death_secs) < 1.0
    }
}

/// Deterministic spawn description.
#[derive(Debug, Clone, Copy)]
pub struct TargetSpec {
    pub position: Vec3,
    pub velocity: Vec3,
    pub pattern: MovementPattern,
    pub scale: f32,
    pub tint: TargetTint,
}

impl TargetSpec {
    pub fn stationary(position: Vec3) -> Self {
        Self {
            position,
            velocity: Vec3::ZERO,
            pattern: MovementPattern::Stationary,
            scale: 1.0,
            tint: TargetTint::Orange,
        }
    }

    pub fn moving(position: Vec3, velocity: Vec3, pattern: MovementPattern) -> Self {
        Self { velocity, pattern, ..Self::stationary(position) }
    }
}

/// Owns every target of the session.
#[derive(Resource, Debug, Clone)]
pub struct TargetField {
    targets: Vec<Target>,
    next_id: u64,
}

impl Default for TargetField {
    fn default() -> Self {
        Self { targets: Vec::new(), next_id: 1 }
    }
}

impl TargetField {
    #[inline]
    fn take_id(&mut self) -> TargetId {
        let id = TargetId(self.next_id);
        self.next_id += 1;
        id
    }

    /// Replace the whole set with `count` fresh targets.
    ///
    /// Dying targets from the previous wave are dropped, not reused; ids keep counting.
    pub fn spawn_wave(&mut self, count: u32, now: f64, rng: &mut GameRng, cfg: &Tunables) -> Vec<TargetId> {
        self.targets.clear();
        self.spawn_batch(count, now, rng, cfg)
    }

    /// Append `count` random targets without touching the current set.
    pub fn spawn_batch(&mut self, count: u32, now: f64, rng: &mut GameRng, cfg: &Tunables) -> Vec<TargetId> {
        let volume = cfg.spawn_volume;
        let mut ids = Vec::with_capacity(count as usize);

        for _ in 0..count {
            let position = rng.vec3_between(volume.min, volume.max);
            let pattern = MovementPattern::pick(cfg.motion.scheme, rng);
            let spec = TargetSpec {
                position,
                velocity: initial_velocity(pattern, &cfg.motion, rng),
                pattern: seed_pattern(pattern, &cfg.motion, rng),
                scale: rng.range(cfg.motion.scale_min, cfg.motion.scale_max),
                tint: if rng.chance(0.5) { TargetTint::Orange } else { TargetTint::Cyan },
            };
            ids.push(self.spawn_at(spec, now, cfg));
        }

        ids
    }

    /// Append one target at a fixed spot. The position is clamped into the spawn volume.
    pub fn spawn_at(&mut self, spec: TargetSpec, now: f64, cfg: &Tunables) -> TargetId {
        let id = self.take_id();
        let position = cfg.spawn_volume.clamp(spec.position);
        self.targets.push(Target {
            id,
            position,
            velocity: spec.velocity,
            rest_y: position.y,
            spawned_at: now,
            life: TargetLife::Alive,
            pattern: spec.pattern,
            scale: spec.scale,
            tint: spec.tint,
        });
        id
    }

    /// Move every alive target by one (clamped) frame.
    pub fn advance(&mut self, dt: f32, now: f64, rng: &mut GameRng, cfg: &Tunables) {
        let dt = dt.clamp(0.0, cfg.lifecycle.max_frame_delta);
        let volume = cfg.spawn_volume;

        for t in self.targets.iter_mut().filter(|t| t.is_alive()) {
            // Rising out of the floor: hold still until the spawn-in finishes.
            if t.spawn_progress(now, cfg.lifecycle.spawn_in_secs) < 1.0 {
                continue;
            }

            match t.pattern {
                MovementPattern::Stationary => {}
                MovementPattern::Lateral => step_lateral(t, dt, now, &volume, &cfg.motion),
                MovementPattern::Erratic { .. } => step_erratic(t, dt, &volume, &cfg.motion, rng),
                MovementPattern::Bounce => step_bounce(t, dt, &volume),
            }
        }
    }

    /// Drop dying targets whose fade has finished. Returns how many were removed.
    pub fn collect_expired(&mut self, now: f64, cfg: &Tunables) -> usize {
        let before = self.targets.len();
        let window = f64::from(cfg.lifecycle.death_secs);
        self.targets.retain(|t| match t.life {
            TargetLife::Alive => true,
            TargetLife::Dying { hit_at } => now - hit_at <= window,
        });
        before - self.targets.len()
    }

    /// End a target's life. The only path from `Alive` to `Dying`.
    ///
    /// Returns the target's position, or `None` if the id is unknown or already dead.
    pub fn resolve_hit(&mut self, id: TargetId, now: f64) -> Option<Vec3> {
        let t = self.targets.iter_mut().find(|t| t.id == id)?;
        if !t.is_alive() {
            return None;
        }
        t.life = TargetLife::Dying { hit_at: now };
        Some(t.position)
    }

    pub fn get(&self, id: TargetId) -> Option<&Target> {
        self.targets.iter().find(|t| t.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Target> {
        self.targets.iter()
    }

    pub fn alive(&self) -> impl Iterator<Item = &Target> {
        self.targets.iter().filter(|t| t.is_alive())
    }

    /// Ids of every live target, in spawn order.
    pub fn ids(&self) -> Vec<TargetId> {
        self.alive().map(|t| t.id).collect()
    }

    pub fn alive_count(&self) -> usize {
        self.alive().count()
    }

    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }
}

// -----------------------------------------------------------------------------
// Pattern setup
// -----------------------------------------------------------------------------

fn initial_velocity(pattern: MovementPattern, m: &MotionTuning, rng: &mut GameRng) -> Vec3 {
    match pattern {
        MovementPattern::Stationary => Vec3::ZERO,
        MovementPattern::Lateral => {
            let speed = rng.range(m.speed_min, m.speed_max);
            Vec3::X * if rng.chance(0.5) { speed } else { -speed }
        }
        MovementPattern::Erratic { .. } => random_heading(rng) * rng.range(m.speed_min, m.speed_max),
        // Free bounce: flatter on Y, flatter still on Z.
        MovementPattern::Bounce => Vec3::new(
            rng.signed(0.5) * rng.range(m.speed_min, m.speed_max),
            rng.signed(0.5) * rng.range(m.speed_min, m.speed_max) * 0.6,
            rng.signed(0.5) * rng.range(m.speed_min, m.speed_max) * 0.3,
        ),
    }
}

fn seed_pattern(pattern: MovementPattern, m: &MotionTuning, rng: &mut GameRng) -> MovementPattern {
    match pattern {
        MovementPattern::Erratic { .. } => MovementPattern::Erratic {
            retarget_in: rng.range(m.erratic_retarget_min_secs, m.erratic_retarget_max_secs),
        },
        other => other,
    }
}

fn random_heading(rng: &mut GameRng) -> Vec3 {
    let v = rng.vec3_between(Vec3::splat(-1.0), Vec3::splat(1.0));
    let dir = v.normalize_or_zero();
    if dir == Vec3::ZERO { Vec3::X } else { dir }
}

// -----------------------------------------------------------------------------
// Pattern updates
// -----------------------------------------------------------------------------

/// Integrate, then reflect off any face the step crossed.
///
/// The reflected component always points back inside, so a target pinned on a face
/// cannot jitter across it on the next frame.
fn integrate_reflect(position: &mut Vec3, velocity: &mut Vec3, dt: f32, volume: &Bounds3) {
    *position += *velocity * dt;
    for axis in 0..3 {
        if position[axis] < volume.min[axis] {
            velocity[axis] = velocity[axis].abs();
        } else if position[axis] > volume.max[axis] {
            velocity[axis] = -velocity[axis].abs();
        }
    }
    *position = volume.clamp(*position);
}

fn step_lateral(t: &mut Target, dt: f32, now: f64, volume: &Bounds3, m: &MotionTuning) {
    integrate_reflect(&mut t.position, &mut t.velocity, dt, volume);

    // Per-id phase keeps neighbours from bobbing in lockstep.
    let phase = t.id.0 as f32 * 1.7;
    let bob = ((now as f32) * m.bob_frequency + phase).sin() * m.bob_amplitude;
    t.position.y = (t.rest_y + bob).clamp(volume.min.y, volume.max.y);
}

fn step_erratic(t: &mut Target, dt: f32, volume: &Bounds3, m: &MotionTuning, rng: &mut GameRng) {
    if let MovementPattern::Erratic { retarget_in } = &mut t.pattern {
        *retarget_in -= dt;
        if *retarget_in <= 0.0 {
            let speed = t.velocity.length().max(m.speed_min);
            t.velocity = random_heading(rng) * speed;
            *retarget_in = rng.range(m.erratic_retarget_min_secs, m.erratic_retarget_max_secs);
        }
    }
    integrate_reflect(&mut t.position, &mut t.velocity, dt, volume);
}

fn step_bounce(t: &mut Target, dt: f32, volume: &Bounds3) {
    integrate_reflect(&mut t.position, &mut t.velocity, dt, volume);
}
