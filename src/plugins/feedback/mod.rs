//! Weapon feedback: recoil, camera shake, crosshair pulse and the short flashes.
//!
//! Every value here is an impulse that decays back to rest. Triggers *set* the
//! value rather than adding to it, so rapid fire never stacks past the trigger
//! magnitude.

use bevy::prelude::*;

use crate::common::rng::GameRng;
use crate::common::state::GameState;
use crate::common::tunables::{FeedbackTuning, Tunables};
use crate::plugins::core::{FrameSet, GameClock};
use crate::plugins::hitscan::HitZone;

/// Gun kick (backward offset) and muzzle climb (radians).
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Recoil {
    pub kick: f32,
    pub pitch: f32,
}

impl Recoil {
    pub fn trigger(&mut self, cfg: &FeedbackTuning) {
        self.kick = cfg.recoil_kick;
        self.pitch = cfg.recoil_pitch;
    }

    /// `v += (0 - v) * return_speed * dt`. The step factor is capped at 1 so a long
    /// frame settles at zero instead of overshooting.
    pub fn decay(&mut self, dt: f32, return_speed: f32) {
        let k = (return_speed * dt).clamp(0.0, 1.0);
        self.kick += (0.0 - self.kick) * k;
        self.pitch += (0.0 - self.pitch) * k;
    }

    pub fn is_settled(&self) -> bool {
        self.kick.abs() < 1e-4 && self.pitch.abs() < 1e-4
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CameraShake {
    pub intensity: f32,
    /// Positional jitter applied to the camera this frame.
    pub offset: Vec3,
}

impl CameraShake {
    pub fn trigger(&mut self, zone: HitZone, cfg: &FeedbackTuning) {
        self.intensity = match zone {
            HitZone::Head => cfg.shake_head,
            HitZone::Body => cfg.shake_body,
        };
    }

    pub fn update(&mut self, dt: f32, decay_rate: f32, rng: &mut GameRng) {
        if self.intensity <= 0.0 {
            self.intensity = 0.0;
            self.offset = Vec3::ZERO;
            return;
        }
        let i = self.intensity;
        self.offset = Vec3::new(rng.signed(1.0) * i, rng.signed(1.0) * i, rng.signed(1.0) * i * 0.5);
        self.intensity *= (-decay_rate * dt).exp();
    }
}

/// Countdown that restarts on trigger.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Flash {
    remaining: f32,
    duration: f32,
}

impl Flash {
    pub fn trigger(&mut self, secs: f32) {
        self.remaining = secs;
        self.duration = secs;
    }

    pub fn tick(&mut self, dt: f32) {
        self.remaining = (self.remaining - dt).max(0.0);
    }

    pub fn is_active(&self) -> bool {
        self.remaining > 0.0
    }

    /// 1 right after the trigger, falling linearly to 0.
    pub fn strength(&self) -> f32 {
        if self.duration <= 0.0 {
            return 0.0;
        }
        (self.remaining / self.duration).clamp(0.0, 1.0)
    }
}

/// Crosshair spread in pixels; jumps on every shot and eases back over a fixed window.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CrosshairPulse {
    timer: Flash,
    peak: f32,
}

impl CrosshairPulse {
    pub fn trigger(&mut self, cfg: &FeedbackTuning) {
        self.timer.trigger(cfg.crosshair_secs);
        self.peak = cfg.crosshair_spread;
    }

    pub fn tick(&mut self, dt: f32) {
        self.timer.tick(dt);
    }

    pub fn spread(&self) -> f32 {
        self.peak * self.timer.strength()
    }
}

#[derive(Resource, Debug, Clone, Default)]
pub struct WeaponFeedback {
    pub recoil: Recoil,
    pub shake: CameraShake,
    pub crosshair: CrosshairPulse,
    pub hit_marker: Flash,
    pub muzzle_flash: Flash,
}

impl WeaponFeedback {
    /// Every shot, hit or not.
    pub fn on_fire(&mut self, cfg: &FeedbackTuning) {
        self.recoil.trigger(cfg);
        self.crosshair.trigger(cfg);
        self.muzzle_flash.trigger(cfg.muzzle_flash_secs);
    }

    pub fn on_hit(&mut self, zone: HitZone, cfg: &FeedbackTuning) {
        self.shake.trigger(zone, cfg);
        self.hit_marker.trigger(cfg.hit_marker_secs);
    }

    pub fn update(&mut self, dt: f32, rng: &mut GameRng, cfg: &FeedbackTuning) {
        self.recoil.decay(dt, cfg.recoil_return_speed);
        self.shake.update(dt, cfg.shake_decay, rng);
        self.crosshair.tick(dt);
        self.hit_marker.tick(dt);
        self.muzzle_flash.tick(dt);
    }
}

/// Idle weapon sway at session time `t`: (x, y) offset of the gun model.
pub fn sway(t: f64, cfg: &FeedbackTuning) -> Vec2 {
    let t = t as f32 * cfg.sway_speed;
    Vec2::new(t.sin() * cfg.sway_amount, (t * 0.7).sin() * cfg.sway_amount * 0.5)
}

pub fn plugin(app: &mut App) {
    app.init_resource::<WeaponFeedback>();
    app.add_systems(OnEnter(GameState::InGame), reset_feedback);
    app.add_systems(Update, decay_feedback.in_set(FrameSet::Feedback));
}

fn reset_feedback(mut feedback: ResMut<WeaponFeedback>) {
    *feedback = WeaponFeedback::default();
}

/// Step 4: decay toward rest.
pub fn decay_feedback(
    clock: Res<GameClock>,
    tunables: Res<Tunables>,
    mut rng: ResMut<GameRng>,
    mut feedback: ResMut<WeaponFeedback>,
) {
    feedback.update(clock.dt, &mut rng, &tunables.feedback);
}
