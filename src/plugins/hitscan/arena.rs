//! Static range geometry.
//!
//! The room is open toward the shooter: floor, ceiling, back wall and two side
//! walls, each a slab of `wall_thickness`. Cover props sit between the firing
//! line and the spawn volume. Everything here only produces impact points for
//! misses; nothing in the arena shields a target.

use bevy::prelude::*;

use crate::common::geometry::{Bounds3, ray_aabb};
use crate::common::tunables::ArenaTuning;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurfaceKind {
    Floor,
    Ceiling,
    BackWall,
    SideWall,
    Sandbag,
    Barrier,
    LanePost,
}

impl SurfaceKind {
    pub fn is_prop(self) -> bool {
        matches!(self, Self::Sandbag | Self::Barrier | Self::LanePost)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Surface {
    pub kind: SurfaceKind,
    pub bounds: Bounds3,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceHit {
    pub kind: SurfaceKind,
    pub distance: f32,
    pub point: Vec3,
}

#[derive(Resource, Debug, Clone, Default)]
pub struct ArenaGeometry {
    surfaces: Vec<Surface>,
}

impl ArenaGeometry {
    pub fn from_tuning(cfg: &ArenaTuning) -> Self {
        let mut arena = Self::default();
        let (hw, h, d, t) = (cfg.width * 0.5, cfg.height, cfg.depth, cfg.wall_thickness);

        arena.push(SurfaceKind::Floor, Vec3::new(-hw - t, -t, -d - t), Vec3::new(hw + t, 0.0, 0.0));
        arena.push(SurfaceKind::Ceiling, Vec3::new(-hw - t, h, -d - t), Vec3::new(hw + t, h + t, 0.0));
        arena.push(SurfaceKind::BackWall, Vec3::new(-hw - t, 0.0, -d - t), Vec3::new(hw + t, h, -d));
        arena.push(SurfaceKind::SideWall, Vec3::new(-hw - t, 0.0, -d), Vec3::new(-hw, h, 0.0));
        arena.push(SurfaceKind::SideWall, Vec3::new(hw, 0.0, -d), Vec3::new(hw + t, h, 0.0));

        if cfg.props {
            arena.add_props();
        }
        arena
    }

    /// Room with no geometry at all; every miss flies off into nothing.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn push(&mut self, kind: SurfaceKind, a: Vec3, b: Vec3) {
        self.surfaces.push(Surface { kind, bounds: Bounds3::new(a, b).normalized() });
    }

    fn add_props(&mut self) {
        for (x, z, rows) in [(-8.0, -6.0, 3), (8.0, -6.0, 3), (-7.0, -12.0, 2), (7.0, -12.0, 2)] {
            self.add_sandbag_stack(Vec3::new(x, 0.0, z), rows);
        }

        // Jersey barriers: wide base plus a narrower cap.
        for (x, z) in [(-5.0, -10.0), (5.0, -10.0), (0.0, -8.0)] {
            let at = Vec3::new(x, 0.0, z);
            self.push(SurfaceKind::Barrier, at + Vec3::new(-0.4, 0.0, -1.0), at + Vec3::new(0.4, 0.4, 1.0));
            self.push(SurfaceKind::Barrier, at + Vec3::new(-0.25, 0.4, -1.0), at + Vec3::new(0.25, 0.7, 1.0));
        }

        for x in [-6.0, -3.0, 0.0, 3.0, 6.0] {
            for z in [-5.0, -10.0, -15.0] {
                let at = Vec3::new(x, 0.0, z);
                self.push(SurfaceKind::LanePost, at + Vec3::new(-0.025, 0.0, -0.025), at + Vec3::new(0.025, 1.5, 0.025));
            }
        }
    }

    /// Pyramid of bags, `rows` wide at the bottom.
    fn add_sandbag_stack(&mut self, at: Vec3, rows: u32) {
        let half = Vec3::new(0.225, 0.11, 0.175);
        for row in 0..rows {
            let in_row = rows - row;
            for i in 0..in_row {
                let x = (i as f32 - (in_row - 1) as f32 * 0.5) * 0.5;
                let c = at + Vec3::new(x, row as f32 * 0.25 + 0.125, 0.0);
                self.push(SurfaceKind::Sandbag, c - half, c + half);
            }
        }
    }

    pub fn surfaces(&self) -> &[Surface] {
        &self.surfaces
    }

    /// Nearest surface along the ray within `max_distance`.
    pub fn raycast(&self, origin: Vec3, dir: Vec3, max_distance: f32) -> Option<SurfaceHit> {
        self.surfaces
            .iter()
            .filter_map(|s| ray_aabb(origin, dir, &s.bounds).map(|t| (t, s.kind)))
            .filter(|(t, _)| *t <= max_distance)
            .min_by(|a, b| a.0.total_cmp(&b.0))
            .map(|(distance, kind)| SurfaceHit { kind, distance, point: origin + dir * distance })
    }
}
