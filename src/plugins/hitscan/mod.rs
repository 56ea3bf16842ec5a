//! Hit-scan plugin: resolve a shot ray against live targets, then the room.
//!
//! # Data flow
//! ```text
//!   player (Update)                    FrameSet::Intake
//!   ┌──────────────────────┐          ┌──────────────────────────────────────────┐
//!   │ click → FireRequest  │ ───────> │ resolve_shot                             │
//!   └──────────────────────┘  message │   alive targets: nearest, head over body │
//!                                     │   else arena surfaces: impact point      │
//!                                     │ → feedback triggers                      │
//!                                     │ → vfx bursts                             │
//!                                     │ → session reducer                        │
//!                                     │ → ShotEvent (outbound)                   │
//!                                     └──────────────────────────────────────────┘
//! ```
//!
//! `resolve_shot` is the only caller of `TargetField::resolve_hit`, so a target
//! can be killed at most once no matter how many rays pass through it.

pub mod arena;
pub mod intake;

pub use arena::{ArenaGeometry, Surface, SurfaceHit, SurfaceKind};

use bevy::prelude::*;

use crate::common::geometry::{ray_capsule_y, ray_sphere};
use crate::common::tunables::{HitboxTuning, Tunables};
use crate::plugins::core::FrameSet;
use crate::plugins::targets::{Target, TargetField, TargetId};

/// Which sub-volume of a target a shot landed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HitZone {
    Head,
    Body,
}

/// "Fire now" with the current aim.
#[derive(Message, Debug, Clone, Copy)]
pub struct FireRequest {
    pub ray: Ray3d,
}

impl FireRequest {
    pub fn new(origin: Vec3, dir: Vec3) -> Self {
        let dir = Dir3::new(dir).unwrap_or(Dir3::NEG_Z);
        Self { ray: Ray3d::new(origin, dir) }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ShotOutcome {
    Hit { target: TargetId, position: Vec3, zone: HitZone },
    /// `impact` is where the ray met static geometry, if it met any.
    Miss { impact: Option<Vec3> },
}

impl ShotOutcome {
    pub fn is_hit(&self) -> bool {
        matches!(self, Self::Hit { .. })
    }

    /// Hit point on a target, or impact point on a surface.
    pub fn position(&self) -> Option<Vec3> {
        match *self {
            Self::Hit { position, .. } => Some(position),
            Self::Miss { impact } => impact,
        }
    }

    /// `None` on a miss.
    pub fn is_headshot(&self) -> Option<bool> {
        match self {
            Self::Hit { zone, .. } => Some(*zone == HitZone::Head),
            Self::Miss { .. } => None,
        }
    }

    pub fn target(&self) -> Option<TargetId> {
        match self {
            Self::Hit { target, .. } => Some(*target),
            Self::Miss { .. } => None,
        }
    }

    pub fn zone(&self) -> Option<HitZone> {
        match self {
            Self::Hit { zone, .. } => Some(*zone),
            Self::Miss { .. } => None,
        }
    }
}

/// A target's two hit volumes in world space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hitbox {
    pub head_center: Vec3,
    pub head_radius: f32,
    /// Bottom of the body capsule's inner segment.
    pub body_base: Vec3,
    pub body_height: f32,
    pub body_radius: f32,
}

impl Hitbox {
    /// Volumes follow the drawn position, so a target still rising is hit where it is seen.
    pub fn for_target(target: &Target, now: f64, cfg: &Tunables) -> Self {
        Self::at(target.display_position(now, cfg), target.scale, &cfg.hitbox)
    }

    pub fn at(center: Vec3, scale: f32, hb: &HitboxTuning) -> Self {
        Self {
            head_center: center + Vec3::Y * hb.head_offset * scale,
            head_radius: hb.head_radius * scale,
            body_base: center - Vec3::Y * hb.body_half_height * scale,
            body_height: 2.0 * hb.body_half_height * scale,
            body_radius: hb.body_radius * scale,
        }
    }

    /// Head wins whenever the ray touches it; otherwise the body, if touched.
    pub fn intersect(&self, origin: Vec3, dir: Vec3) -> Option<(f32, HitZone)> {
        if let Some(t) = ray_sphere(origin, dir, self.head_center, self.head_radius) {
            return Some((t, HitZone::Head));
        }
        ray_capsule_y(origin, dir, self.body_base, self.body_height, self.body_radius)
            .map(|t| (t, HitZone::Body))
    }
}

/// Nearest alive target along the ray, without touching it.
pub fn pick_target(ray: Ray3d, field: &TargetField, now: f64, cfg: &Tunables) -> Option<(TargetId, f32, HitZone)> {
    let (origin, dir) = (ray.origin, *ray.direction);
    field
        .alive()
        .filter_map(|t| {
            Hitbox::for_target(t, now, cfg)
                .intersect(origin, dir)
                .map(|(dist, zone)| (t.id, dist, zone))
        })
        .filter(|(_, dist, _)| *dist <= cfg.view.max_range)
        .min_by(|a, b| a.1.total_cmp(&b.1))
}

/// Resolve one shot. On a hit the target is killed at `now`.
pub fn resolve_shot(ray: Ray3d, field: &mut TargetField, arena: &ArenaGeometry, now: f64, cfg: &Tunables) -> ShotOutcome {
    let (origin, dir) = (ray.origin, *ray.direction);

    if let Some((target, dist, zone)) = pick_target(ray, field, now, cfg)
        && field.resolve_hit(target, now).is_some()
    {
        return ShotOutcome::Hit { target, position: origin + dir * dist, zone };
    }

    ShotOutcome::Miss { impact: arena.raycast(origin, dir, cfg.view.max_range).map(|h| h.point) }
}

pub fn plugin(app: &mut App) {
    let arena = ArenaGeometry::from_tuning(&app.world().resource::<Tunables>().arena);
    app.insert_resource(arena);
    app.add_message::<FireRequest>();
    app.add_systems(Update, intake::process_fire_requests.in_set(FrameSet::Intake));
}

#[cfg(test)]
mod tests;
