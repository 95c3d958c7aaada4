//! Transition rules and the typed results of attempting one.

use serde::Serialize;
use thiserror::Error;

use super::{Condition, SessionMode, Validator};

/// A named, conditionally-guarded edge between two modes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Transition {
    pub from: SessionMode,
    pub to: SessionMode,
    pub action: &'static str,
    /// All must hold, checked in order.
    pub conditions: &'static [Condition],
}

impl Transition {
    const fn new(
        action: &'static str,
        from: SessionMode,
        to: SessionMode,
        conditions: &'static [Condition],
    ) -> Self {
        Self {
            from,
            to,
            action,
            conditions,
        }
    }
}

/// The fixed transition table. Closed: any other action is illegal everywhere.
///
/// The combat defeat edge is `player_defeated`; older action sets called it
/// `game_over_combat`, which is not accepted here.
pub static TRANSITIONS: [Transition; 9] = [
    Transition::new(
        "start_character_creation",
        SessionMode::Initializing,
        SessionMode::CharacterCreation,
        &[Condition::ConfigLoaded],
    ),
    Transition::new(
        "start_game",
        SessionMode::CharacterCreation,
        SessionMode::Exploring,
        &[Condition::CharacterCreated],
    ),
    Transition::new(
        "enter_combat",
        SessionMode::Exploring,
        SessionMode::InCombat,
        &[Condition::EnemyPresent],
    ),
    Transition::new(
        "start_dialogue",
        SessionMode::Exploring,
        SessionMode::InDialogue,
        &[Condition::NpcPresent],
    ),
    Transition::new(
        "open_inventory",
        SessionMode::Exploring,
        SessionMode::InInventory,
        &[],
    ),
    Transition::new(
        "end_combat",
        SessionMode::InCombat,
        SessionMode::Exploring,
        &[Condition::CombatResolved],
    ),
    Transition::new(
        "player_defeated",
        SessionMode::InCombat,
        SessionMode::GameOver,
        &[Condition::PlayerHealthZero],
    ),
    Transition::new(
        "end_dialogue",
        SessionMode::InDialogue,
        SessionMode::Exploring,
        &[Condition::DialogueCompleted],
    ),
    Transition::new(
        "close_inventory",
        SessionMode::InInventory,
        SessionMode::Exploring,
        &[],
    ),
];

/// Why a transition was refused. Recoverable; the caller re-prompts.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransitionRejection {
    #[error("unknown action '{0}'")]
    UnknownAction(String),

    #[error("action '{action}' requires mode {expected}, current mode is {current}")]
    WrongMode {
        action: String,
        expected: SessionMode,
        current: SessionMode,
    },

    #[error("action '{action}' blocked by unmet conditions: {}", join_names(.unmet))]
    ConditionsUnmet {
        action: String,
        unmet: Vec<Condition>,
    },
}

fn join_names<T: std::fmt::Display>(items: &[T]) -> String {
    items
        .iter()
        .map(|i| i.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Result of [`SessionStateMachine::transition`](super::SessionStateMachine::transition).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransitionOutcome {
    /// Nothing changed.
    Rejected(TransitionRejection),

    /// The mode advanced and the adopted snapshot passed the mode's validators.
    Entered { from: SessionMode, to: SessionMode },

    /// The mode advanced but the adopted snapshot failed validation.
    ///
    /// The machine does not roll back; the caller decides whether to discard
    /// the snapshot or steer back out of the mode.
    EnteredInvalid {
        from: SessionMode,
        to: SessionMode,
        failed: Vec<Validator>,
    },
}

impl TransitionOutcome {
    /// The transition happened and the snapshot is valid for the new mode.
    pub fn is_success(&self) -> bool {
        matches!(self, TransitionOutcome::Entered { .. })
    }

    /// The mode changed, whether or not validation passed.
    pub fn mode_changed(&self) -> bool {
        !matches!(self, TransitionOutcome::Rejected(_))
    }

    pub fn rejection(&self) -> Option<&TransitionRejection> {
        match self {
            TransitionOutcome::Rejected(reason) => Some(reason),
            _ => None,
        }
    }
}
