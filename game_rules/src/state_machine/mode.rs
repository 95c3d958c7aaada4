//! Session modes.

use serde::{Deserialize, Serialize};

/// The coarse operational phase the game is in. Exactly one is current.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SessionMode {
    #[default]
    Initializing,
    CharacterCreation,
    Exploring,
    InCombat,
    InDialogue,
    InInventory,
    /// Terminal: no transition leaves this mode.
    GameOver,
}

impl SessionMode {
    /// All modes, in declaration order.
    pub const ALL: [SessionMode; 7] = [
        SessionMode::Initializing,
        SessionMode::CharacterCreation,
        SessionMode::Exploring,
        SessionMode::InCombat,
        SessionMode::InDialogue,
        SessionMode::InInventory,
        SessionMode::GameOver,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SessionMode::Initializing => "initializing",
            SessionMode::CharacterCreation => "character_creation",
            SessionMode::Exploring => "exploring",
            SessionMode::InCombat => "in_combat",
            SessionMode::InDialogue => "in_dialogue",
            SessionMode::InInventory => "in_inventory",
            SessionMode::GameOver => "game_over",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, SessionMode::GameOver)
    }
}

impl std::fmt::Display for SessionMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
