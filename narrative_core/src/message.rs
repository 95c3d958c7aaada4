//! Messages and the metadata attached to them.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use thiserror::Error;
use uuid::Uuid;

/// Stable identifier for a stored message. Metadata is keyed by this, never
/// by position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MessageId(pub Uuid);

impl MessageId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for MessageId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for MessageId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Who a message is attributed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    Player,
    Narrator,
}

/// An immutable unit of conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    id: MessageId,
    role: Role,
    content: String,
}

impl Message {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            id: MessageId::new(),
            role,
            content: content.into(),
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::new(Role::System, content)
    }

    pub fn player(content: impl Into<String>) -> Self {
        Self::new(Role::Player, content)
    }

    pub fn narrator(content: impl Into<String>) -> Self {
        Self::new(Role::Narrator, content)
    }

    pub fn id(&self) -> MessageId {
        self.id
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn content(&self) -> &str {
        &self.content
    }
}

/// What a message is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MessageCategory {
    System,
    Narrative,
    Dialogue,
    Combat,
    Inventory,
    Environment,
    PlayerAction,
}

impl MessageCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageCategory::System => "system",
            MessageCategory::Narrative => "narrative",
            MessageCategory::Dialogue => "dialogue",
            MessageCategory::Combat => "combat",
            MessageCategory::Inventory => "inventory",
            MessageCategory::Environment => "environment",
            MessageCategory::PlayerAction => "player_action",
        }
    }
}

impl std::fmt::Display for MessageCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown message category '{0}'")]
pub struct ParseCategoryError(pub String);

impl std::str::FromStr for MessageCategory {
    type Err = ParseCategoryError;

    /// Case-insensitive; accepts `player_action`, `player-action` and `PLAYER_ACTION`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('-', "_");
        match normalized.as_str() {
            "system" => Ok(MessageCategory::System),
            "narrative" => Ok(MessageCategory::Narrative),
            "dialogue" => Ok(MessageCategory::Dialogue),
            "combat" => Ok(MessageCategory::Combat),
            "inventory" => Ok(MessageCategory::Inventory),
            "environment" => Ok(MessageCategory::Environment),
            "player_action" => Ok(MessageCategory::PlayerAction),
            _ => Err(ParseCategoryError(s.to_string())),
        }
    }
}

/// Lowest and highest importance a message can carry.
pub const MIN_IMPORTANCE: u8 = 1;
pub const MAX_IMPORTANCE: u8 = 5;

/// Metadata attached 1:1 to a stored message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageContext {
    pub category: MessageCategory,
    pub location: Option<String>,
    /// Seconds since the Unix epoch.
    pub timestamp: Option<f64>,
    pub related_entities: BTreeSet<String>,
    /// 1-5, with 5 being most important.
    pub importance: u8,
}

impl MessageContext {
    pub fn new(category: MessageCategory) -> Self {
        Self {
            category,
            location: None,
            timestamp: None,
            related_entities: BTreeSet::new(),
            importance: MIN_IMPORTANCE,
        }
    }
}

/// Optional fields supplied alongside an appended message.
///
/// Anything left unset takes a safe default: no location, no timestamp, no
/// entities, importance 1.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContextFields {
    pub location: Option<String>,
    pub timestamp: Option<f64>,
    pub entities: Vec<String>,
    pub importance: Option<i64>,
}

impl ContextFields {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    pub fn with_timestamp(mut self, timestamp: f64) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    pub fn with_entity(mut self, entity: impl Into<String>) -> Self {
        self.entities.push(entity.into());
        self
    }

    pub fn with_entities<I, S>(mut self, entities: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.entities.extend(entities.into_iter().map(Into::into));
        self
    }

    pub fn with_importance(mut self, importance: i64) -> Self {
        self.importance = Some(importance);
        self
    }

    /// Build the stored context, clamping importance into 1..=5.
    pub fn into_context(self, category: MessageCategory) -> MessageContext {
        let importance = self
            .importance
            .unwrap_or(MIN_IMPORTANCE as i64)
            .clamp(MIN_IMPORTANCE as i64, MAX_IMPORTANCE as i64) as u8;

        MessageContext {
            category,
            location: self.location.filter(|l| !l.is_empty()),
            timestamp: self.timestamp.filter(|t| t.is_finite()),
            related_entities: self
                .entities
                .into_iter()
                .map(|e| e.trim().to_string())
                .filter(|e| !e.is_empty())
                .collect(),
            importance,
        }
    }
}
