//! Character definitions: the player's attributes and the enemy in play.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// The player's attribute sheet.
///
/// Every field is optional so a snapshot restored from an older save can be
/// checked structurally before it is trusted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlayerAttributes {
    #[serde(default)]
    pub health: Option<i32>,
    #[serde(default)]
    pub max_health: Option<i32>,
    #[serde(default)]
    pub level: Option<u32>,

    // Anything else the action layer wants to track (strength, gold, ...)
    #[serde(default)]
    pub extra: HashMap<String, serde_json::Value>,
}

impl PlayerAttributes {
    /// Create a fresh sheet with full health at the given level.
    pub fn new(health: i32, level: u32) -> Self {
        Self {
            health: Some(health),
            max_health: Some(health),
            level: Some(level),
            extra: HashMap::new(),
        }
    }

    /// Set an extra attribute.
    pub fn with_extra(
        mut self,
        key: impl Into<String>,
        value: impl Into<serde_json::Value>,
    ) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }

    /// True when no attribute has been set at all.
    pub fn is_empty(&self) -> bool {
        self.health.is_none()
            && self.max_health.is_none()
            && self.level.is_none()
            && self.extra.is_empty()
    }

    /// Both health and level are present.
    pub fn has_vitals(&self) -> bool {
        self.health.is_some() && self.level.is_some()
    }

    /// Check if the player is still standing. Unknown health counts as alive.
    pub fn is_alive(&self) -> bool {
        self.health.unwrap_or(1) > 0
    }
}

/// The enemy the player is currently facing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Enemy {
    pub name: String,
    #[serde(default)]
    pub health: Option<i32>,
}

impl Enemy {
    /// Create an enemy with the given health.
    pub fn new(name: impl Into<String>, health: i32) -> Self {
        Self {
            name: name.into(),
            health: Some(health),
        }
    }

    /// An enemy with missing health is treated as already down.
    pub fn is_defeated(&self) -> bool {
        self.health.unwrap_or(0) <= 0
    }
}
