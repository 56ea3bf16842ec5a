//! Global state machine.

use bevy::prelude::*;

/// `Lobby` waits for the first click; gameplay systems only run `InGame`.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, States, Default)]
pub enum GameState {
    #[default]
    Lobby,
    InGame,
}
