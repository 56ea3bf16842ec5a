//! Player plugin: the view rig and the trigger.
//!
//! Pipeline:
//! - Update (InGame): accumulate mouse motion into yaw/pitch
//! - Update (any state, before `FrameSet::Clamp`): left click
//!   - Lobby: start the round
//!   - InGame: write a `FireRequest` along the current aim
//! - Update (InGame): Escape drops back to the lobby; the round restarts fresh
//!
//! Input resources are optional so the plugin also runs headless, where tests
//! drive `ViewRig` and `FireRequest` directly.

use std::f32::consts::FRAC_PI_2;

use bevy::ecs::message::MessageWriter;
use bevy::input::mouse::AccumulatedMouseMotion;
use bevy::prelude::*;

use crate::common::state::GameState;
use crate::common::tunables::{Tunables, ViewTuning};
use crate::plugins::core::FrameSet;
use crate::plugins::hitscan::FireRequest;

/// First-person view: fixed eye, mouse-driven yaw and pitch.
#[derive(Resource, Debug, Clone, Copy, PartialEq)]
pub struct ViewRig {
    pub eye: Vec3,
    /// Radians, positive turns left.
    pub yaw: f32,
    /// Radians, positive looks up. Clamped to straight up / straight down.
    pub pitch: f32,
    pub sensitivity: f32,
}

impl Default for ViewRig {
    fn default() -> Self {
        Self::from_tuning(&ViewTuning::default())
    }
}

impl ViewRig {
    pub fn from_tuning(cfg: &ViewTuning) -> Self {
        Self { eye: cfg.eye, yaw: 0.0, pitch: 0.0, sensitivity: cfg.sensitivity }
    }

    /// Apply a mouse delta in pixels.
    pub fn look(&mut self, delta: Vec2) {
        self.yaw -= delta.x * self.sensitivity;
        self.pitch = (self.pitch - delta.y * self.sensitivity).clamp(-FRAC_PI_2, FRAC_PI_2);
    }

    pub fn rotation(&self) -> Quat {
        Quat::from_euler(EulerRot::YXZ, self.yaw, self.pitch, 0.0)
    }

    pub fn forward(&self) -> Vec3 {
        self.rotation() * Vec3::NEG_Z
    }

    pub fn aim_ray(&self) -> Ray3d {
        Ray3d::new(self.eye, Dir3::new(self.forward()).unwrap_or(Dir3::NEG_Z))
    }
}

pub fn plugin(app: &mut App) {
    let rig = ViewRig::from_tuning(&app.world().resource::<Tunables>().view);
    app.insert_resource(rig)
        .add_systems(OnEnter(GameState::InGame), reset_view)
        .add_systems(Update, apply_look.run_if(in_state(GameState::InGame)).before(FrameSet::Clamp))
        .add_systems(Update, pull_trigger.after(apply_look).before(FrameSet::Clamp))
        .add_systems(Update, leave_round.run_if(in_state(GameState::InGame)));
}

fn reset_view(tunables: Res<Tunables>, mut rig: ResMut<ViewRig>) {
    *rig = ViewRig::from_tuning(&tunables.view);
}

fn apply_look(motion: Option<Res<AccumulatedMouseMotion>>, mut rig: ResMut<ViewRig>) {
    let Some(motion) = motion else { return; };
    if motion.delta != Vec2::ZERO {
        rig.look(motion.delta);
    }
}

/// Producer: turns a click into either a state change or a `FireRequest`.
fn pull_trigger(
    buttons: Option<Res<ButtonInput<MouseButton>>>,
    state: Res<State<GameState>>,
    rig: Res<ViewRig>,
    mut next: ResMut<NextState<GameState>>,
    mut writer: MessageWriter<FireRequest>,
) {
    let Some(buttons) = buttons else { return; };
    if !buttons.just_pressed(MouseButton::Left) {
        return;
    }

    match state.get() {
        GameState::Lobby => {
            info!("Round started");
            next.set(GameState::InGame);
        }
        GameState::InGame => {
            writer.write(FireRequest { ray: rig.aim_ray() });
        }
    }
}

fn leave_round(keys: Option<Res<ButtonInput<KeyCode>>>, mut next: ResMut<NextState<GameState>>) {
    let Some(keys) = keys else { return; };
    if keys.just_pressed(KeyCode::Escape) {
        info!("Round abandoned");
        next.set(GameState::Lobby);
    }
}
