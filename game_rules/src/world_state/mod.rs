//! Session snapshot - the world state the state machine's guards read.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::entities::{Enemy, PlayerAttributes};
use crate::error::Result;

/// Flag value types for ad hoc session flags.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FlagValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
}

/// Typed session flags.
///
/// The flags the transition guards depend on are named fields; `extra` holds
/// whatever else the action layer wants to remember and is never read by the
/// rules.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionFlags {
    /// The NPC the player is currently talking to.
    #[serde(default)]
    pub current_npc: Option<String>,

    /// Set by the action layer once the conversation has run its course.
    #[serde(default)]
    pub dialogue_completed: bool,

    #[serde(default)]
    pub extra: HashMap<String, FlagValue>,
}

/// The complete mutable snapshot of a game session.
///
/// Created once at session start and mutated in place by action resolution.
/// `available_exits` and `inventory` are optional so that a snapshot missing
/// them fails validation instead of silently passing as empty.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GameSessionState {
    #[serde(default)]
    pub current_location: Option<String>,

    #[serde(default)]
    pub available_exits: Option<Vec<String>>,

    #[serde(default)]
    pub inventory: Option<Vec<String>>,

    #[serde(default)]
    pub player: PlayerAttributes,

    #[serde(default)]
    pub current_enemy: Option<Enemy>,

    #[serde(default)]
    pub flags: SessionFlags,
}

impl GameSessionState {
    /// Create a snapshot at a starting location with empty exits and inventory.
    pub fn new(location: impl Into<String>) -> Self {
        Self {
            current_location: Some(location.into()),
            available_exits: Some(Vec::new()),
            inventory: Some(Vec::new()),
            ..Self::default()
        }
    }

    /// Set the player's attributes.
    pub fn with_player(mut self, player: PlayerAttributes) -> Self {
        self.player = player;
        self
    }

    /// Set the exits reachable from the current location.
    pub fn with_exits<I, S>(mut self, exits: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.available_exits = Some(exits.into_iter().map(Into::into).collect());
        self
    }

    /// Put an enemy in front of the player.
    pub fn with_enemy(mut self, enemy: Enemy) -> Self {
        self.current_enemy = Some(enemy);
        self
    }

    /// Start talking to an NPC.
    pub fn with_npc(mut self, npc: impl Into<String>) -> Self {
        self.flags.current_npc = Some(npc.into());
        self
    }

    /// Move to a new location, replacing the known exits.
    pub fn move_to<I, S>(&mut self, location: impl Into<String>, exits: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.current_location = Some(location.into());
        self.available_exits = Some(exits.into_iter().map(Into::into).collect());
    }

    /// Add an item to the inventory, creating the list if it was missing.
    pub fn add_item(&mut self, item: impl Into<String>) {
        self.inventory.get_or_insert_with(Vec::new).push(item.into());
    }

    /// Remove one copy of an item. Returns false if it was not carried.
    pub fn remove_item(&mut self, item: &str) -> bool {
        let Some(inventory) = self.inventory.as_mut() else {
            return false;
        };
        match inventory.iter().position(|i| i == item) {
            Some(index) => {
                inventory.remove(index);
                true
            }
            None => false,
        }
    }

    /// Names of the characters currently in play (enemy and NPC).
    pub fn entities_in_play(&self) -> Vec<String> {
        let mut names = Vec::new();
        if let Some(enemy) = &self.current_enemy {
            names.push(enemy.name.clone());
        }
        if let Some(npc) = &self.flags.current_npc {
            names.push(npc.clone());
        }
        names
    }

    /// Serialize the snapshot to JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Restore a snapshot from JSON. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_state_has_lists() {
        let state = GameSessionState::new("forest_edge");
        assert_eq!(state.current_location.as_deref(), Some("forest_edge"));
        assert_eq!(state.available_exits, Some(vec![]));
        assert_eq!(state.inventory, Some(vec![]));
        assert!(state.current_enemy.is_none());
    }

    #[test]
    fn test_inventory() {
        let mut state = GameSessionState::default();
        assert!(!state.remove_item("torch"));

        state.add_item("torch");
        state.add_item("rope");
        assert!(state.remove_item("torch"));
        assert!(!state.remove_item("torch"));
        assert_eq!(state.inventory, Some(vec!["rope".to_string()]));
    }

    #[test]
    fn test_move_to() {
        let mut state = GameSessionState::new("forest_edge").with_exits(["deep_woods"]);
        state.move_to("deep_woods", ["forest_edge", "ancient_ruins"]);

        assert_eq!(state.current_location.as_deref(), Some("deep_woods"));
        assert_eq!(state.available_exits.as_ref().map(Vec::len), Some(2));
    }

    #[test]
    fn test_entities_in_play() {
        let state = GameSessionState::new("peak")
            .with_enemy(Enemy::new("wyvern", 30))
            .with_npc("elder_sage");
        assert_eq!(state.entities_in_play(), vec!["wyvern", "elder_sage"]);
    }

    #[test]
    fn test_json_round_trip() {
        let mut state = GameSessionState::new("temple_interior")
            .with_player(PlayerAttributes::new(80, 3))
            .with_npc("forest_guardian");
        state
            .flags
            .extra
            .insert("bell_rung".to_string(), FlagValue::Bool(true));

        let json = state.to_json().unwrap();
        let restored = GameSessionState::from_json(&json).unwrap();
        assert_eq!(restored, state);
    }

    #[test]
    fn test_from_partial_json() {
        let restored = GameSessionState::from_json(r#"{"current_location": "peak"}"#).unwrap();
        assert_eq!(restored.current_location.as_deref(), Some("peak"));
        assert!(restored.available_exits.is_none());
        assert!(restored.player.is_empty());
    }

    #[test]
    fn test_from_bad_json() {
        assert!(GameSessionState::from_json("{not json").is_err());
    }
}
