//! Ray intersection primitives.
//!
//! All functions take a ray as `(origin, dir)` with `dir` normalized and return the
//! distance `t >= 0` to the first surface crossing. A ray starting inside a closed
//! volume reports the exit distance, so a shot fired from inside the room still finds
//! the wall in front of it.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

/// Axis-aligned box. Used for the spawn volume and for static arena geometry.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds3 {
    pub min: Vec3,
    pub max: Vec3,
}

impl Bounds3 {
    pub const fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// Rebuild with min/max sorted per axis, so configs may list corners in any order.
    pub fn normalized(self) -> Self {
        Self { min: self.min.min(self.max), max: self.min.max(self.max) }
    }

    /// Strictly positive extent on every axis.
    pub fn has_volume(&self) -> bool {
        self.max.x > self.min.x && self.max.y > self.min.y && self.max.z > self.min.z
    }

    #[inline]
    pub fn contains(&self, p: Vec3) -> bool {
        p.cmpge(self.min).all() && p.cmple(self.max).all()
    }

    #[inline]
    pub fn clamp(&self, p: Vec3) -> Vec3 {
        p.clamp(self.min, self.max)
    }

    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }
}

/// Ray vs sphere.
pub fn ray_sphere(origin: Vec3, dir: Vec3, center: Vec3, radius: f32) -> Option<f32> {
    // t^2 + 2t(oc·d) + (oc·oc - r^2) = 0 with |d| = 1
    let oc = origin - center;
    let b = oc.dot(dir);
    let c = oc.length_squared() - radius * radius;
    let disc = b * b - c;
    if disc < 0.0 {
        return None;
    }
    let sq = disc.sqrt();
    let near = -b - sq;
    if near >= 0.0 {
        return Some(near);
    }
    let far = -b + sq;
    (far >= 0.0).then_some(far)
}

/// Ray vs vertical capsule: segment from `base` to `base + Y * height`, swept by `radius`.
pub fn ray_capsule_y(origin: Vec3, dir: Vec3, base: Vec3, height: f32, radius: f32) -> Option<f32> {
    let mut best: Option<f32> = None;
    let mut keep = |t: f32| {
        if best.is_none_or(|b| t < b) {
            best = Some(t);
        }
    };

    // Cylinder wall, solved in the XZ plane.
    let ox = origin.x - base.x;
    let oz = origin.z - base.z;
    let a = dir.x * dir.x + dir.z * dir.z;
    if a > 1e-8 {
        let b = ox * dir.x + oz * dir.z;
        let c = ox * ox + oz * oz - radius * radius;
        let disc = b * b - a * c;
        if disc >= 0.0 {
            let sq = disc.sqrt();
            for t in [(-b - sq) / a, (-b + sq) / a] {
                if t < 0.0 {
                    continue;
                }
                let y = origin.y + dir.y * t - base.y;
                if (0.0..=height).contains(&y) {
                    keep(t);
                    break;
                }
            }
        }
    }

    // End caps.
    for cap in [base, base + Vec3::Y * height] {
        if let Some(t) = ray_sphere(origin, dir, cap, radius) {
            keep(t);
        }
    }

    best
}

/// Slab-method ray vs AABB.
pub fn ray_aabb(origin: Vec3, dir: Vec3, bounds: &Bounds3) -> Option<f32> {
    let inv = Vec3::new(
        if dir.x != 0.0 { 1.0 / dir.x } else { f32::INFINITY },
        if dir.y != 0.0 { 1.0 / dir.y } else { f32::INFINITY },
        if dir.z != 0.0 { 1.0 / dir.z } else { f32::INFINITY },
    );

    let mut t_min = f32::NEG_INFINITY;
    let mut t_max = f32::INFINITY;

    for axis in 0..3 {
        let (o, i, lo, hi) = (origin[axis], inv[axis], bounds.min[axis], bounds.max[axis]);
        if i.is_infinite() {
            // Parallel to this slab: either always inside it or never.
            if o < lo || o > hi {
                return None;
            }
            continue;
        }
        let (mut t0, mut t1) = ((lo - o) * i, (hi - o) * i);
        if t0 > t1 {
            std::mem::swap(&mut t0, &mut t1);
        }
        t_min = t_min.max(t0);
        t_max = t_max.min(t1);
        if t_min > t_max {
            return None;
        }
    }

    if t_max < 0.0 {
        return None;
    }
    Some(if t_min >= 0.0 { t_min } else { t_max })
}

/// Right and up axes for a view looking along `forward`, with world Y as up.
///
/// Looking straight up or down has no defined yaw; world X is used as right.
pub fn view_basis(forward: Vec3) -> (Vec3, Vec3) {
    let right = forward.cross(Vec3::Y).normalize_or_zero();
    let right = if right == Vec3::ZERO { Vec3::X } else { right };
    (right, right.cross(forward).normalize_or_zero())
}

/// Ease-out cubic on `[0, 1]`.
#[inline]
pub fn ease_out_cubic(x: f32) -> f32 {
    let inv = 1.0 - x.clamp(0.0, 1.0);
    1.0 - inv * inv * inv
}
