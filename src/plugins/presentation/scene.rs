//! Camera, gun, lights and the static room.

use bevy::prelude::*;

use crate::plugins::hitscan::{ArenaGeometry, SurfaceKind};
use crate::plugins::player::ViewRig;
use crate::plugins::snapshot::FrameSnapshot;

#[derive(Component)]
pub struct MainCamera;

#[derive(Component)]
pub struct GunModel;

#[derive(Component)]
pub struct MuzzleFlash;

/// Rest pose of the gun in camera space.
const GUN_REST: Vec3 = Vec3::new(0.25, -0.22, -0.5);

fn surface_color(kind: SurfaceKind) -> Color {
    match kind {
        SurfaceKind::Floor => Color::srgb(0.16, 0.17, 0.19),
        SurfaceKind::Ceiling => Color::srgb(0.09, 0.09, 0.11),
        SurfaceKind::BackWall => Color::srgb(0.22, 0.22, 0.25),
        SurfaceKind::SideWall => Color::srgb(0.19, 0.19, 0.21),
        SurfaceKind::Sandbag => Color::srgb(0.45, 0.4, 0.3),
        SurfaceKind::Barrier => Color::srgb(0.55, 0.55, 0.52),
        SurfaceKind::LanePost => Color::srgb(0.85, 0.65, 0.1),
    }
}

pub fn spawn_scene(
    mut commands: Commands,
    arena: Res<ArenaGeometry>,
    rig: Res<ViewRig>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    for surface in arena.surfaces() {
        let size = surface.bounds.size();
        commands.spawn((
            Name::new(format!("{:?}", surface.kind)),
            Mesh3d(meshes.add(Cuboid::new(size.x, size.y, size.z))),
            MeshMaterial3d(materials.add(StandardMaterial {
                base_color: surface_color(surface.kind),
                perceptual_roughness: 0.9,
                ..default()
            })),
            Transform::from_translation(surface.bounds.center()),
        ));
    }

    commands.spawn((
        Name::new("KeyLight"),
        DirectionalLight { illuminance: 4_000.0, shadows_enabled: true, ..default() },
        Transform::from_xyz(4.0, 10.0, 2.0).looking_at(Vec3::new(0.0, 0.0, -20.0), Vec3::Y),
    ));
    for z in [-5.0, -15.0, -25.0] {
        commands.spawn((
            Name::new("StripLight"),
            PointLight { intensity: 150_000.0, range: 18.0, color: Color::srgb(0.85, 0.9, 1.0), ..default() },
            Transform::from_xyz(0.0, 7.5, z),
        ));
    }

    let gun_mat = materials.add(StandardMaterial {
        base_color: Color::srgb(0.12, 0.12, 0.14),
        metallic: 0.8,
        perceptual_roughness: 0.35,
        ..default()
    });
    let flash_mat = materials.add(StandardMaterial {
        base_color: Color::srgb(1.0, 0.8, 0.4),
        emissive: LinearRgba::rgb(12.0, 8.0, 3.0),
        unlit: true,
        ..default()
    });

    commands
        .spawn((
            Name::new("MainCamera"),
            MainCamera,
            Camera3d::default(),
            Projection::from(PerspectiveProjection { fov: 75f32.to_radians(), ..default() }),
            Transform::from_translation(rig.eye).with_rotation(rig.rotation()),
        ))
        .with_children(|cam| {
            cam.spawn((
                Name::new("Gun"),
                GunModel,
                Mesh3d(meshes.add(Cuboid::new(0.08, 0.12, 0.45))),
                MeshMaterial3d(gun_mat),
                Transform::from_translation(GUN_REST),
            ))
            .with_children(|gun| {
                gun.spawn((
                    Name::new("MuzzleFlash"),
                    MuzzleFlash,
                    Mesh3d(meshes.add(Sphere::new(0.05))),
                    MeshMaterial3d(flash_mat),
                    PointLight { intensity: 40_000.0, range: 6.0, color: Color::srgb(1.0, 0.75, 0.35), ..default() },
                    Transform::from_xyz(0.0, 0.02, -0.26),
                    Visibility::Hidden,
                ));
            });
        });
}

pub fn follow_view(
    rig: Res<ViewRig>,
    snapshot: Res<FrameSnapshot>,
    mut q_camera: Query<&mut Transform, With<MainCamera>>,
) {
    let Ok(mut tf) = q_camera.single_mut() else { return; };
    tf.translation = rig.eye + snapshot.weapon.shake_offset;
    tf.rotation = rig.rotation();
}

pub fn drive_gun(
    snapshot: Res<FrameSnapshot>,
    mut q_gun: Query<&mut Transform, With<GunModel>>,
    mut q_flash: Query<&mut Visibility, With<MuzzleFlash>>,
) {
    let w = snapshot.weapon;
    if let Ok(mut tf) = q_gun.single_mut() {
        tf.translation = GUN_REST + Vec3::new(w.sway.x, w.sway.y, w.recoil_kick);
        tf.rotation = Quat::from_rotation_x(w.recoil_pitch);
    }
    if let Ok(mut vis) = q_flash.single_mut() {
        *vis = if w.muzzle_flash { Visibility::Inherited } else { Visibility::Hidden };
    }
}
