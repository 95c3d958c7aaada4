//! Named guard predicates referenced by transitions.

use serde::{Deserialize, Serialize};

use crate::world_state::GameSessionState;

/// A named boolean predicate over the session snapshot.
///
/// Every condition is a pure read of the snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Condition {
    /// Always holds; configuration is loaded before a session exists.
    ConfigLoaded,
    /// The player sheet has at least one attribute.
    CharacterCreated,
    EnemyPresent,
    NpcPresent,
    /// No enemy left standing.
    CombatResolved,
    PlayerHealthZero,
    DialogueCompleted,
}

impl Condition {
    /// Evaluate the condition against a snapshot.
    pub fn evaluate(&self, state: &GameSessionState) -> bool {
        match self {
            Condition::ConfigLoaded => true,
            Condition::CharacterCreated => !state.player.is_empty(),
            Condition::EnemyPresent => state.current_enemy.is_some(),
            Condition::NpcPresent => state.flags.current_npc.is_some(),
            Condition::CombatResolved => state
                .current_enemy
                .as_ref()
                .map_or(true, |enemy| enemy.is_defeated()),
            Condition::PlayerHealthZero => !state.player.is_alive(),
            Condition::DialogueCompleted => state.flags.dialogue_completed,
        }
    }

    /// The registry name of this condition.
    pub fn name(&self) -> &'static str {
        match self {
            Condition::ConfigLoaded => "config_loaded",
            Condition::CharacterCreated => "character_created",
            Condition::EnemyPresent => "enemy_present",
            Condition::NpcPresent => "npc_present",
            Condition::CombatResolved => "combat_resolved",
            Condition::PlayerHealthZero => "player_health_zero",
            Condition::DialogueCompleted => "dialogue_completed",
        }
    }
}

impl std::fmt::Display for Condition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{Enemy, PlayerAttributes};

    #[test]
    fn test_config_loaded_always_holds() {
        assert!(Condition::ConfigLoaded.evaluate(&GameSessionState::default()));
    }

    #[test]
    fn test_character_created() {
        let mut state = GameSessionState::default();
        assert!(!Condition::CharacterCreated.evaluate(&state));

        state.player = PlayerAttributes::new(100, 1);
        assert!(Condition::CharacterCreated.evaluate(&state));
    }

    #[test]
    fn test_combat_resolved() {
        let mut state = GameSessionState::default();
        assert!(Condition::CombatResolved.evaluate(&state));

        state.current_enemy = Some(Enemy::new("bandit", 5));
        assert!(!Condition::CombatResolved.evaluate(&state));

        state.current_enemy = Some(Enemy::new("bandit", 0));
        assert!(Condition::CombatResolved.evaluate(&state));
    }

    #[test]
    fn test_player_health_zero() {
        let mut state = GameSessionState::default();
        // Unknown health is not a defeat
        assert!(!Condition::PlayerHealthZero.evaluate(&state));

        state.player.health = Some(0);
        assert!(Condition::PlayerHealthZero.evaluate(&state));
    }

    #[test]
    fn test_npc_and_dialogue_flags() {
        let mut state = GameSessionState::default();
        assert!(!Condition::NpcPresent.evaluate(&state));
        assert!(!Condition::DialogueCompleted.evaluate(&state));

        state.flags.current_npc = Some("elder_sage".to_string());
        state.flags.dialogue_completed = true;
        assert!(Condition::NpcPresent.evaluate(&state));
        assert!(Condition::DialogueCompleted.evaluate(&state));
    }

    #[test]
    fn test_condition_names() {
        assert_eq!(Condition::PlayerHealthZero.to_string(), "player_health_zero");
        assert_eq!(Condition::NpcPresent.name(), "npc_present");
    }
}
