//! Per-mode structural validators, run after a mode is entered.

use serde::{Deserialize, Serialize};

use super::SessionMode;
use crate::world_state::GameSessionState;

/// A structural check on the snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Validator {
    /// A current location and a list of exits.
    Location,
    /// An enemy to fight.
    Combat,
    /// Someone to talk to.
    Dialogue,
    /// An inventory list.
    Inventory,
    /// Player health and level.
    PlayerVitals,
}

impl Validator {
    /// The validators registered for a mode. Modes with none are trivially valid.
    pub fn for_mode(mode: SessionMode) -> &'static [Validator] {
        match mode {
            SessionMode::Exploring => &[Validator::Location, Validator::PlayerVitals],
            SessionMode::InCombat => &[Validator::Combat, Validator::PlayerVitals],
            SessionMode::InDialogue => &[Validator::Dialogue, Validator::PlayerVitals],
            SessionMode::InInventory => &[Validator::Inventory, Validator::PlayerVitals],
            SessionMode::Initializing | SessionMode::CharacterCreation | SessionMode::GameOver => {
                &[]
            }
        }
    }

    pub fn check(&self, state: &GameSessionState) -> bool {
        match self {
            Validator::Location => {
                state.current_location.is_some() && state.available_exits.is_some()
            }
            Validator::Combat => state.current_enemy.is_some(),
            Validator::Dialogue => state.flags.current_npc.is_some(),
            Validator::Inventory => state.inventory.is_some(),
            Validator::PlayerVitals => state.player.has_vitals(),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Validator::Location => "location",
            Validator::Combat => "combat",
            Validator::Dialogue => "dialogue",
            Validator::Inventory => "inventory",
            Validator::PlayerVitals => "player_vitals",
        }
    }
}

impl std::fmt::Display for Validator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Run every validator registered for `mode` and return the ones that failed.
pub fn failed_validators(mode: SessionMode, state: &GameSessionState) -> Vec<Validator> {
    Validator::for_mode(mode)
        .iter()
        .copied()
        .filter(|v| !v.check(state))
        .collect()
}
