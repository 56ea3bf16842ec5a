//! Pre-spawned visual pools for targets and particles.
//!
//! Entities are created once at startup and never despawned; there is one
//! target slot per target of the largest configured wave. Each frame the
//! first N slots take the N snapshot entries and the rest are hidden, so no
//! structural changes happen during play.

use bevy::prelude::*;

use crate::common::tunables::Tunables;
use crate::plugins::snapshot::FrameSnapshot;
use crate::plugins::targets::TargetTint;
use crate::plugins::vfx::ParticleKind;

#[derive(Component)]
pub struct TargetSlot {
    head: Entity,
    body: Entity,
}

#[derive(Component)]
pub struct ParticleSlot;

#[derive(Resource)]
pub struct VisualPools {
    targets: Vec<Entity>,
    particles: [Vec<Entity>; 4],
    orange: Handle<StandardMaterial>,
    cyan: Handle<StandardMaterial>,
    dying: Handle<StandardMaterial>,
}

fn particle_material(kind: ParticleKind) -> StandardMaterial {
    let (base, glow) = match kind {
        ParticleKind::HitDebris => (Color::srgb(1.0, 0.45, 0.1), LinearRgba::rgb(4.0, 1.5, 0.3)),
        ParticleKind::WallSpark => (Color::srgb(1.0, 0.9, 0.5), LinearRgba::rgb(6.0, 5.0, 2.0)),
        ParticleKind::ShellCasing => (Color::srgb(0.8, 0.6, 0.2), LinearRgba::BLACK),
        ParticleKind::MuzzleSmoke => (Color::srgba(0.6, 0.6, 0.6, 0.5), LinearRgba::BLACK),
    };
    StandardMaterial {
        base_color: base,
        emissive: glow,
        alpha_mode: if kind == ParticleKind::MuzzleSmoke { AlphaMode::Blend } else { AlphaMode::Opaque },
        ..default()
    }
}

fn neon(base: Color, glow: LinearRgba) -> StandardMaterial {
    StandardMaterial { base_color: base, emissive: glow, perceptual_roughness: 0.4, ..default() }
}

pub fn spawn_pools(
    mut commands: Commands,
    tunables: Res<Tunables>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    let hb = &tunables.hitbox;
    let head_mesh = meshes.add(Sphere::new(hb.head_radius));
    let body_mesh = meshes.add(Capsule3d::new(hb.body_radius, 2.0 * hb.body_half_height));
    let orange = materials.add(neon(Color::srgb(1.0, 0.42, 0.0), LinearRgba::rgb(2.5, 0.9, 0.0)));
    let cyan = materials.add(neon(Color::srgb(0.0, 0.9, 1.0), LinearRgba::rgb(0.0, 2.0, 2.5)));
    let dying = materials.add(neon(Color::WHITE, LinearRgba::rgb(4.0, 4.0, 4.0)));

    // Waves replace the whole field, so at most one wave is ever drawn.
    let slots = tunables.waves.max as usize;
    let mut targets = Vec::with_capacity(slots);
    for _ in 0..slots {
        let head = commands
            .spawn((
                Mesh3d(head_mesh.clone()),
                MeshMaterial3d(orange.clone()),
                Transform::from_xyz(0.0, hb.head_offset, 0.0),
            ))
            .id();
        let body = commands.spawn((Mesh3d(body_mesh.clone()), MeshMaterial3d(orange.clone()), Transform::default())).id();
        let root = commands
            .spawn((Name::new("Target(Pooled)"), TargetSlot { head, body }, Transform::default(), Visibility::Hidden))
            .add_children(&[head, body])
            .id();
        targets.push(root);
    }

    let unit = meshes.add(Cuboid::from_length(1.0));
    let particles: [Vec<Entity>; 4] = ParticleKind::ALL.map(|kind| {
        let material = materials.add(particle_material(kind));
        let capacity = kind.tuning(&tunables.particles).capacity;
        (0..capacity)
            .map(|_| {
                commands
                    .spawn((
                        Name::new("Particle(Pooled)"),
                        ParticleSlot,
                        Mesh3d(unit.clone()),
                        MeshMaterial3d(material.clone()),
                        Transform::default(),
                        Visibility::Hidden,
                    ))
                    .id()
            })
            .collect()
    });

    commands.insert_resource(VisualPools { targets, particles, orange, cyan, dying });
}

pub fn sync_targets(
    pools: Option<Res<VisualPools>>,
    snapshot: Res<FrameSnapshot>,
    mut q_slots: Query<(&TargetSlot, &mut Transform, &mut Visibility)>,
    mut q_parts: Query<&mut MeshMaterial3d<StandardMaterial>>,
) {
    let Some(pools) = pools else { return; };

    for (i, &e) in pools.targets.iter().enumerate() {
        let Ok((slot, mut tf, mut vis)) = q_slots.get_mut(e) else { continue; };
        let Some(view) = snapshot.targets.get(i) else {
            *vis = Visibility::Hidden;
            continue;
        };

        tf.translation = view.position;
        tf.scale = Vec3::splat(view.scale.max(0.0));
        *vis = Visibility::Visible;

        let material = match (view.alive, view.tint) {
            (false, _) => &pools.dying,
            (true, TargetTint::Orange) => &pools.orange,
            (true, TargetTint::Cyan) => &pools.cyan,
        };
        for part in [slot.head, slot.body] {
            if let Ok(mut m) = q_parts.get_mut(part)
                && m.0 != *material
            {
                m.0 = material.clone();
            }
        }
    }
}

pub fn sync_particles(
    pools: Option<Res<VisualPools>>,
    snapshot: Res<FrameSnapshot>,
    mut q: Query<(&mut Transform, &mut Visibility), With<ParticleSlot>>,
) {
    let Some(pools) = pools else { return; };
    let mut used = [0usize; 4];

    for p in &snapshot.particles {
        let k = p.kind.slot();
        let Some(&e) = pools.particles[k].get(used[k]) else { continue; };
        used[k] += 1;
        if let Ok((mut tf, mut vis)) = q.get_mut(e) {
            tf.translation = p.position;
            tf.scale = Vec3::splat(p.scale);
            *vis = Visibility::Visible;
        }
    }

    for (k, slots) in pools.particles.iter().enumerate() {
        for &e in &slots[used[k]..] {
            if let Ok((_, mut vis)) = q.get_mut(e) {
                *vis = Visibility::Hidden;
            }
        }
    }
}
