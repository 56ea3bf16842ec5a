//! HUD: score line, crosshair, hit marker, lobby prompt.

use bevy::prelude::*;

use crate::common::state::GameState;
use crate::plugins::snapshot::FrameSnapshot;

#[derive(Component)]
pub struct ScoreText;

#[derive(Component)]
pub struct StatsText;

#[derive(Component)]
pub struct LobbyPrompt;

/// One arm of the crosshair; `dir` points away from the center.
#[derive(Component)]
pub struct CrosshairArm {
    dir: Vec2,
}

#[derive(Component)]
pub struct HitMarker;

const ARM_GAP: f32 = 6.0;
const ARM_LEN: f32 = 10.0;
const ARM_WIDTH: f32 = 2.0;

pub fn spawn_hud(mut commands: Commands) {
    let text_font = |size: f32| TextFont { font_size: size, ..default() };

    commands
        .spawn(Node {
            position_type: PositionType::Absolute,
            top: Val::Px(16.0),
            left: Val::Px(20.0),
            flex_direction: FlexDirection::Column,
            row_gap: Val::Px(4.0),
            ..default()
        })
        .with_children(|ui| {
            ui.spawn((ScoreText, Text::new("SCORE 0"), text_font(32.0), TextColor(Color::srgb(1.0, 0.55, 0.1))));
            ui.spawn((StatsText, Text::new(""), text_font(18.0), TextColor(Color::srgb(0.75, 0.8, 0.85))));
        });

    for dir in [Vec2::X, Vec2::NEG_X, Vec2::Y, Vec2::NEG_Y] {
        let (w, h) = if dir.x != 0.0 { (ARM_LEN, ARM_WIDTH) } else { (ARM_WIDTH, ARM_LEN) };
        commands.spawn((
            CrosshairArm { dir },
            Node {
                position_type: PositionType::Absolute,
                left: Val::Percent(50.0),
                top: Val::Percent(50.0),
                width: Val::Px(w),
                height: Val::Px(h),
                ..default()
            },
            BackgroundColor(Color::srgba(1.0, 1.0, 1.0, 0.9)),
        ));
    }

    commands.spawn((
        HitMarker,
        Text::new("X"),
        text_font(28.0),
        TextColor(Color::srgba(1.0, 0.2, 0.2, 0.0)),
        Node {
            position_type: PositionType::Absolute,
            left: Val::Percent(50.0),
            top: Val::Percent(50.0),
            margin: UiRect { left: Val::Px(-9.0), top: Val::Px(-17.0), ..default() },
            ..default()
        },
    ));

    commands.spawn((
        LobbyPrompt,
        Text::new("CLICK TO START"),
        text_font(42.0),
        TextColor(Color::WHITE),
        Node {
            position_type: PositionType::Absolute,
            left: Val::Percent(38.0),
            top: Val::Percent(40.0),
            ..default()
        },
    ));
}

pub fn sync_hud(
    snapshot: Res<FrameSnapshot>,
    mut q: Query<(&mut Text, Option<&ScoreText>, Option<&StatsText>)>,
) {
    if !snapshot.is_changed() {
        return;
    }
    let s = &snapshot.stats;

    for (mut text, score, stats) in &mut q {
        if score.is_some() {
            *text = Text::new(format!("SCORE {}", s.score));
        } else if stats.is_some() {
            *text = Text::new(format!(
                "WAVE {}   SHOTS {}   ACC {:.0}%   STREAK {}   BEST {}",
                snapshot.wave,
                s.shots,
                s.accuracy(),
                s.streak,
                s.best_streak
            ));
        }
    }
}

pub fn sync_crosshair(
    snapshot: Res<FrameSnapshot>,
    mut q_arms: Query<(&CrosshairArm, &mut Node)>,
    mut q_marker: Query<&mut TextColor, With<HitMarker>>,
) {
    let offset = ARM_GAP + snapshot.weapon.crosshair_spread;

    for (arm, mut node) in &mut q_arms {
        let (w, h) = if arm.dir.x != 0.0 { (ARM_LEN, ARM_WIDTH) } else { (ARM_WIDTH, ARM_LEN) };
        // Screen Y grows downward.
        let center = Vec2::new(arm.dir.x, -arm.dir.y) * (offset + ARM_LEN * 0.5);
        node.margin = UiRect {
            left: Val::Px(center.x - w * 0.5),
            top: Val::Px(center.y - h * 0.5),
            ..default()
        };
    }

    if let Ok(mut color) = q_marker.single_mut() {
        color.0 = color.0.with_alpha(snapshot.weapon.hit_marker);
    }
}

pub fn sync_lobby_prompt(state: Res<State<GameState>>, mut q: Query<&mut Visibility, With<LobbyPrompt>>) {
    let Ok(mut vis) = q.single_mut() else { return; };
    *vis = match state.get() {
        GameState::Lobby => Visibility::Visible,
        GameState::InGame => Visibility::Hidden,
    };
}
