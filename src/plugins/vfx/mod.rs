//! Particle simulator.
//!
//! Four independent bounded pools. Each pool is a ring buffer: spawning into a
//! full pool evicts the oldest particle first, so capacity is a hard ceiling
//! and never an error.
//!
//! Fade and render scale are derived from remaining life on demand; nothing
//! visual is stored on the particle.

use std::collections::VecDeque;

use bevy::prelude::*;

use crate::common::rng::GameRng;
use crate::common::state::GameState;
use crate::common::tunables::{ParticleTuning, PoolTuning, Tunables};
use crate::plugins::core::{FrameSet, GameClock};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParticleKind {
    HitDebris,
    WallSpark,
    ShellCasing,
    MuzzleSmoke,
}

impl ParticleKind {
    pub const ALL: [Self; 4] = [Self::HitDebris, Self::WallSpark, Self::ShellCasing, Self::MuzzleSmoke];

    #[inline]
    pub const fn slot(self) -> usize {
        self as usize
    }

    pub fn tuning(self, cfg: &ParticleTuning) -> &PoolTuning {
        match self {
            Self::HitDebris => &cfg.hit_debris,
            Self::WallSpark => &cfg.wall_spark,
            Self::ShellCasing => &cfg.shell_casing,
            Self::MuzzleSmoke => &cfg.muzzle_smoke,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Particle {
    pub position: Vec3,
    pub velocity: Vec3,
    pub spawned_at: f64,
    pub lifetime: f32,
}

impl Particle {
    #[inline]
    pub fn age(&self, now: f64) -> f32 {
        (now - self.spawned_at).max(0.0) as f32
    }

    #[inline]
    pub fn is_expired(&self, now: f64) -> bool {
        now - self.spawned_at > f64::from(self.lifetime)
    }

    /// Remaining-life fraction: 1 at spawn, 0 at expiry.
    #[inline]
    pub fn fade(&self, now: f64) -> f32 {
        (1.0 - self.age(now) / self.lifetime).clamp(0.0, 1.0)
    }
}

#[derive(Debug, Clone)]
pub struct ParticlePool {
    kind: ParticleKind,
    tuning: PoolTuning,
    particles: VecDeque<Particle>,
}

impl ParticlePool {
    pub fn new(kind: ParticleKind, tuning: PoolTuning) -> Self {
        Self { kind, particles: VecDeque::with_capacity(tuning.capacity), tuning }
    }

    pub fn kind(&self) -> ParticleKind {
        self.kind
    }

    pub fn capacity(&self) -> usize {
        self.tuning.capacity
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Particle> {
        self.particles.iter()
    }

    pub fn clear(&mut self) {
        self.particles.clear();
    }

    /// Oldest first out when full.
    pub fn push(&mut self, particle: Particle) {
        while self.particles.len() >= self.tuning.capacity {
            self.particles.pop_front();
        }
        self.particles.push_back(particle);
    }

    /// `count` particles at `origin` with velocities drawn from the pool's range,
    /// each offset by `drift`.
    pub fn emit(&mut self, origin: Vec3, count: u32, drift: Vec3, now: f64, rng: &mut GameRng) {
        let t = &self.tuning;
        let (vmin, vmax, jitter, lifetime) = (t.velocity_min, t.velocity_max, t.position_jitter, t.lifetime_secs);
        for _ in 0..count {
            let offset = Vec3::new(rng.signed(jitter), rng.signed(jitter), rng.signed(jitter));
            self.push(Particle {
                position: origin + offset,
                velocity: rng.vec3_between(vmin, vmax) + drift,
                spawned_at: now,
                lifetime,
            });
        }
    }

    pub fn advance(&mut self, dt: f32, now: f64, gravity: f32) {
        let fall = if self.tuning.gravity { gravity * dt } else { 0.0 };
        for p in &mut self.particles {
            p.velocity.y -= fall;
            p.position += p.velocity * dt;
        }
        self.particles.retain(|p| !p.is_expired(now));
    }

    /// Drawn scale; zero once expired.
    pub fn render_scale(&self, particle: &Particle, now: f64) -> f32 {
        self.tuning.base_scale * particle.fade(now)
    }

    /// Particles still within their lifetime at `now`, with their render scale.
    pub fn visible(&self, now: f64) -> impl Iterator<Item = (&Particle, f32)> {
        self.particles
            .iter()
            .filter(move |p| !p.is_expired(now))
            .map(move |p| (p, self.render_scale(p, now)))
    }
}

#[derive(Resource, Debug, Clone)]
pub struct ParticleField {
    pools: [ParticlePool; 4],
    gravity: f32,
}

impl Default for ParticleField {
    fn default() -> Self {
        Self::from_tuning(&ParticleTuning::default())
    }
}

impl ParticleField {
    pub fn from_tuning(cfg: &ParticleTuning) -> Self {
        Self {
            pools: ParticleKind::ALL.map(|k| ParticlePool::new(k, k.tuning(cfg).clone())),
            gravity: cfg.gravity,
        }
    }

    pub fn pool(&self, kind: ParticleKind) -> &ParticlePool {
        &self.pools[kind.slot()]
    }

    pub fn pools(&self) -> impl Iterator<Item = &ParticlePool> {
        self.pools.iter()
    }

    pub fn spawn(&mut self, kind: ParticleKind, origin: Vec3, count: u32, now: f64, rng: &mut GameRng) {
        self.pools[kind.slot()].emit(origin, count, Vec3::ZERO, now, rng);
    }

    /// Like `spawn`, with every velocity offset by `drift` (casings fly out to the side).
    pub fn spawn_with_drift(&mut self, kind: ParticleKind, origin: Vec3, count: u32, drift: Vec3, now: f64, rng: &mut GameRng) {
        self.pools[kind.slot()].emit(origin, count, drift, now, rng);
    }

    /// One burst of the configured size for `kind`.
    pub fn burst(&mut self, kind: ParticleKind, origin: Vec3, now: f64, rng: &mut GameRng) {
        let count = self.pool(kind).tuning.burst;
        self.spawn(kind, origin, count, now, rng);
    }

    pub fn advance(&mut self, dt: f32, now: f64) {
        let gravity = self.gravity;
        for pool in &mut self.pools {
            pool.advance(dt, now, gravity);
        }
    }

    pub fn total(&self) -> usize {
        self.pools.iter().map(ParticlePool::len).sum()
    }

    pub fn clear(&mut self) {
        self.pools.iter_mut().for_each(ParticlePool::clear);
    }
}

pub fn plugin(app: &mut App) {
    let field = ParticleField::from_tuning(&app.world().resource::<Tunables>().particles);
    app.insert_resource(field);
    app.add_systems(OnEnter(GameState::InGame), reset_particles);
    app.add_systems(Update, advance_particles.in_set(FrameSet::Particles));
}

fn reset_particles(mut particles: ResMut<ParticleField>) {
    particles.clear();
}

/// Step 5: integrate and expire.
pub fn advance_particles(clock: Res<GameClock>, mut particles: ResMut<ParticleField>) {
    particles.advance(clock.dt, clock.now);
}
