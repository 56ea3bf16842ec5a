//! Tunable gameplay constants.
//!
//! Everything the simulation reads as a constant lives here, grouped by the system
//! that owns it. The resource is loaded from RON at startup; any missing field
//! falls back to its default, so a config file only needs to list overrides.

use std::path::{Path, PathBuf};

use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::common::geometry::Bounds3;
use crate::plugins::hitscan::HitZone;

/// Env var that overrides the config path.
pub const CONFIG_ENV: &str = "NEON_RANGE_CONFIG";
pub const DEFAULT_CONFIG_PATH: &str = "config/range.ron";
/// Largest wave the range will spawn; presentation pre-spawns this many target slots at most.
pub const MAX_WAVE_SIZE: u32 = 64;

#[derive(Debug, Error)]
pub enum TunablesError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse tunables: {0}")]
    Parse(#[from] ron::error::SpannedError),
    #[error("invalid tunables: {0}")]
    Invalid(String),
}

#[derive(Resource, Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Tunables {
    /// Pin the RNG for reproducible sessions.
    pub seed: Option<u64>,
    /// Region targets spawn in and bounce inside.
    pub spawn_volume: Bounds3,
    pub waves: WaveTuning,
    pub motion: MotionTuning,
    pub lifecycle: LifecycleTuning,
    pub hitbox: HitboxTuning,
    pub scoring: ScoringPolicy,
    pub particles: ParticleTuning,
    pub feedback: FeedbackTuning,
    pub view: ViewTuning,
    pub arena: ArenaTuning,
}

impl Default for Tunables {
    fn default() -> Self {
        Self {
            seed: None,
            spawn_volume: Bounds3::new(Vec3::new(-8.0, 0.5, -28.0), Vec3::new(8.0, 6.0, -22.0)),
            waves: WaveTuning::default(),
            motion: MotionTuning::default(),
            lifecycle: LifecycleTuning::default(),
            hitbox: HitboxTuning::default(),
            scoring: ScoringPolicy::default(),
            particles: ParticleTuning::default(),
            feedback: FeedbackTuning::default(),
            view: ViewTuning::default(),
            arena: ArenaTuning::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WaveTuning {
    pub min: u32,
    pub max: u32,
    /// Delay between the last kill and the next wave.
    pub cooldown_secs: f32,
}

impl Default for WaveTuning {
    fn default() -> Self {
        Self { min: 5, max: 8, cooldown_secs: 0.35 }
    }
}

/// Which family of movement patterns new targets draw from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum MovementScheme {
    /// Stationary / lateral / erratic.
    #[default]
    Patterned,
    /// Free velocity with wall bounce.
    Bounce,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MotionTuning {
    pub scheme: MovementScheme,
    pub speed_min: f32,
    pub speed_max: f32,
    pub bob_amplitude: f32,
    /// Radians per second.
    pub bob_frequency: f32,
    pub erratic_retarget_min_secs: f32,
    pub erratic_retarget_max_secs: f32,
    pub scale_min: f32,
    pub scale_max: f32,
}

impl Default for MotionTuning {
    fn default() -> Self {
        Self {
            scheme: MovementScheme::Patterned,
            speed_min: 1.5,
            speed_max: 4.0,
            bob_amplitude: 0.35,
            bob_frequency: 2.2,
            erratic_retarget_min_secs: 0.4,
            erratic_retarget_max_secs: 1.2,
            scale_min: 1.0,
            scale_max: 1.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LifecycleTuning {
    /// Ceiling for a single frame's delta.
    pub max_frame_delta: f32,
    pub spawn_in_secs: f32,
    /// How far below its resting height a target starts its rise.
    pub spawn_drop: f32,
    pub death_secs: f32,
    /// Upward drift while fading out.
    pub death_rise: f32,
}

impl Default for LifecycleTuning {
    fn default() -> Self {
        Self {
            max_frame_delta: 0.05,
            spawn_in_secs: 0.4,
            spawn_drop: 1.5,
            death_secs: 0.35,
            death_rise: 0.5,
        }
    }
}

/// Target hit volumes, in target-local units before scaling.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HitboxTuning {
    pub head_offset: f32,
    pub head_radius: f32,
    pub body_radius: f32,
    /// Half length of the capsule's inner segment.
    pub body_half_height: f32,
}

impl Default for HitboxTuning {
    fn default() -> Self {
        Self { head_offset: 0.55, head_radius: 0.25, body_radius: 0.2, body_half_height: 0.3 }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScoringPolicy {
    /// Every hit is worth the same.
    Uniform { points: u32 },
    /// Headshots pay more than body hits.
    Weighted { head: u32, body: u32 },
}

impl Default for ScoringPolicy {
    fn default() -> Self {
        Self::Weighted { head: 10, body: 1 }
    }
}

impl ScoringPolicy {
    pub fn points(self, zone: HitZone) -> u32 {
        match (self, zone) {
            (Self::Uniform { points }, _) => points,
            (Self::Weighted { head, .. }, HitZone::Head) => head,
            (Self::Weighted { body, .. }, HitZone::Body) => body,
        }
    }
}

/// One particle category.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PoolTuning {
    pub capacity: usize,
    pub lifetime_secs: f32,
    pub gravity: bool,
    pub base_scale: f32,
    /// Particles emitted per burst.
    pub burst: u32,
    pub velocity_min: Vec3,
    pub velocity_max: Vec3,
    /// Spawn position jitter (half extent per axis).
    pub position_jitter: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ParticleTuning {
    pub gravity: f32,
    pub hit_debris: PoolTuning,
    pub wall_spark: PoolTuning,
    pub shell_casing: PoolTuning,
    pub muzzle_smoke: PoolTuning,
    /// Sideways ejection speed for casings, along the view's right axis.
    pub casing_eject_speed: f32,
}

impl Default for ParticleTuning {
    fn default() -> Self {
        Self {
            gravity: 9.8,
            hit_debris: PoolTuning {
                capacity: 100,
                lifetime_secs: 0.6,
                gravity: true,
                base_scale: 0.08,
                burst: 10,
                velocity_min: Vec3::new(-5.0, 2.0, -5.0),
                velocity_max: Vec3::new(5.0, 10.0, 5.0),
                position_jitter: 0.0,
            },
            wall_spark: PoolTuning {
                capacity: 50,
                lifetime_secs: 0.4,
                gravity: true,
                base_scale: 0.05,
                burst: 8,
                velocity_min: Vec3::new(-3.0, 1.0, -3.0),
                velocity_max: Vec3::new(3.0, 5.0, 3.0),
                position_jitter: 0.0,
            },
            shell_casing: PoolTuning {
                capacity: 30,
                lifetime_secs: 1.5,
                gravity: true,
                base_scale: 0.03,
                burst: 1,
                velocity_min: Vec3::new(-0.5, 2.0, -0.5),
                velocity_max: Vec3::new(0.5, 3.0, 0.5),
                position_jitter: 0.0,
            },
            muzzle_smoke: PoolTuning {
                capacity: 20,
                lifetime_secs: 0.8,
                gravity: false,
                base_scale: 0.12,
                burst: 3,
                velocity_min: Vec3::new(-0.15, 0.3, -0.15),
                velocity_max: Vec3::new(0.15, 0.6, 0.15),
                position_jitter: 0.05,
            },
            casing_eject_speed: 3.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedbackTuning {
    pub recoil_kick: f32,
    pub recoil_pitch: f32,
    pub recoil_return_speed: f32,
    pub shake_head: f32,
    pub shake_body: f32,
    pub shake_decay: f32,
    pub crosshair_spread: f32,
    pub crosshair_secs: f32,
    pub hit_marker_secs: f32,
    pub muzzle_flash_secs: f32,
    pub sway_speed: f32,
    pub sway_amount: f32,
}

impl Default for FeedbackTuning {
    fn default() -> Self {
        Self {
            recoil_kick: 0.06,
            recoil_pitch: 0.08,
            recoil_return_speed: 12.0,
            shake_head: 0.12,
            shake_body: 0.06,
            shake_decay: 10.0,
            crosshair_spread: 12.0,
            crosshair_secs: 0.15,
            hit_marker_secs: 0.2,
            muzzle_flash_secs: 0.1,
            sway_speed: 1.5,
            sway_amount: 0.003,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewTuning {
    pub eye: Vec3,
    /// Radians per pixel of mouse motion.
    pub sensitivity: f32,
    pub max_range: f32,
    /// Muzzle offset from the eye, in view space (right, up, forward).
    pub muzzle_offset: Vec3,
}

impl Default for ViewTuning {
    fn default() -> Self {
        Self {
            eye: Vec3::new(0.0, 1.7, 0.0),
            sensitivity: 0.002,
            max_range: 200.0,
            muzzle_offset: Vec3::new(0.3, -0.1, 0.5),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ArenaTuning {
    pub width: f32,
    pub height: f32,
    pub depth: f32,
    pub wall_thickness: f32,
    /// Include sandbags, barriers and lane posts as spark surfaces.
    pub props: bool,
}

impl Default for ArenaTuning {
    fn default() -> Self {
        Self { width: 20.0, height: 8.0, depth: 30.0, wall_thickness: 1.0, props: true }
    }
}

impl Tunables {
    pub fn from_ron_str(src: &str) -> Result<Self, TunablesError> {
        let mut t: Self = ron::from_str(src)?;
        t.spawn_volume = t.spawn_volume.normalized();
        t.validate()?;
        Ok(t)
    }

    pub fn load(path: &Path) -> Result<Self, TunablesError> {
        let src = std::fs::read_to_string(path)
            .map_err(|source| TunablesError::Io { path: path.to_path_buf(), source })?;
        Self::from_ron_str(&src)
    }

    /// Load from `path`; a missing file is normal, anything else is logged.
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(t) => {
                info!("Loaded tunables from {}", path.display());
                t
            }
            Err(TunablesError::Io { source, .. }) if source.kind() == std::io::ErrorKind::NotFound => {
                debug!("No tunables at {}, using defaults", path.display());
                Self::default()
            }
            Err(e) => {
                warn!("{e}; using default tunables");
                Self::default()
            }
        }
    }

    /// `NEON_RANGE_CONFIG` when set, else `config/range.ron`.
    pub fn config_path() -> PathBuf {
        std::env::var_os(CONFIG_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
    }

    pub fn validate(&self) -> Result<(), TunablesError> {
        let invalid = |msg: &str| Err(TunablesError::Invalid(msg.to_owned()));

        if !self.spawn_volume.has_volume() {
            return invalid("spawn_volume must have positive extent on every axis");
        }
        if self.waves.min == 0 {
            return invalid("waves.min must be at least 1");
        }
        if self.waves.min > self.waves.max {
            return invalid("waves.min must not exceed waves.max");
        }
        if self.waves.max > MAX_WAVE_SIZE {
            return Err(TunablesError::Invalid(format!("waves.max must not exceed {MAX_WAVE_SIZE}")));
        }
        if self.waves.cooldown_secs < 0.0 {
            return invalid("waves.cooldown_secs must not be negative");
        }
        if self.lifecycle.max_frame_delta <= 0.0 {
            return invalid("lifecycle.max_frame_delta must be positive");
        }
        if self.lifecycle.death_secs <= 0.0 {
            return invalid("lifecycle.death_secs must be positive");
        }
        if self.motion.speed_min > self.motion.speed_max {
            return invalid("motion.speed_min must not exceed motion.speed_max");
        }
        if self.motion.scale_min <= 0.0 || self.motion.scale_min > self.motion.scale_max {
            return invalid("motion.scale range must be positive and ordered");
        }
        for (name, pool) in [
            ("hit_debris", &self.particles.hit_debris),
            ("wall_spark", &self.particles.wall_spark),
            ("shell_casing", &self.particles.shell_casing),
            ("muzzle_smoke", &self.particles.muzzle_smoke),
        ] {
            if pool.capacity == 0 || pool.lifetime_secs <= 0.0 {
                return Err(TunablesError::Invalid(format!(
                    "particles.{name} needs a positive capacity and lifetime"
                )));
            }
        }
        Ok(())
    }
}
