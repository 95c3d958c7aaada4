//! Context store configuration: bounds and the game-content scoring tables.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use std::path::Path;
use thiserror::Error;

/// Errors raised while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Game content the scoring functions consult.
///
/// Swapping these out changes which entities and places matter without
/// touching the scoring engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringTables {
    /// Quest items, key characters, key places.
    pub important_entities: BTreeSet<String>,

    /// Entity names that mark a message as part of an active quest line.
    pub quest_terms: BTreeSet<String>,

    /// Words that mark dialogue as a player decision.
    pub decision_keywords: Vec<String>,

    /// Location -> directly reachable locations. Directional.
    pub location_adjacency: HashMap<String, Vec<String>>,
}

impl Default for ScoringTables {
    fn default() -> Self {
        let set = |items: &[&str]| -> BTreeSet<String> {
            items.iter().map(|s| s.to_string()).collect()
        };

        let adjacency: &[(&str, &[&str])] = &[
            ("forest_edge", &["deep_woods", "river_crossing"]),
            ("deep_woods", &["forest_edge", "ancient_ruins"]),
            ("river_crossing", &["forest_edge", "mountain_path"]),
            ("ancient_ruins", &["deep_woods", "temple_interior"]),
            ("mountain_path", &["river_crossing", "peak"]),
            ("temple_interior", &["ancient_ruins"]),
            ("peak", &["mountain_path"]),
        ];

        Self {
            important_entities: set(&[
                "ancient_scroll",
                "magic_gem",
                "sacred_amulet",
                "elder_sage",
                "forest_guardian",
                "dark_sorcerer",
                "ancient_temple",
                "sacred_grove",
                "dragon_lair",
                "portal_key",
                "healing_crystal",
                "dragon_egg",
            ]),
            quest_terms: set(&[
                "ancient_scroll",
                "magic_gem",
                "sacred_amulet",
                "elder_sage",
                "forest_guardian",
                "dark_sorcerer",
                "quest",
                "mission",
                "task",
            ]),
            decision_keywords: ["choose", "decide", "option", "path"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            location_adjacency: adjacency
                .iter()
                .map(|(from, to)| {
                    (
                        from.to_string(),
                        to.iter().map(|s| s.to_string()).collect(),
                    )
                })
                .collect(),
        }
    }
}

impl ScoringTables {
    /// Tables with no content at all; only importance and category count.
    pub fn empty() -> Self {
        Self {
            important_entities: BTreeSet::new(),
            quest_terms: BTreeSet::new(),
            decision_keywords: Vec::new(),
            location_adjacency: HashMap::new(),
        }
    }

    /// True if `to` is listed as directly reachable from `from`.
    pub fn are_adjacent(&self, from: &str, to: &str) -> bool {
        self.location_adjacency
            .get(from)
            .is_some_and(|neighbors| neighbors.iter().any(|n| n == to))
    }

    pub fn is_important(&self, entity: &str) -> bool {
        self.important_entities.contains(entity)
    }

    pub fn is_quest_term(&self, entity: &str) -> bool {
        self.quest_terms.contains(entity)
    }

    /// Case-insensitive search for any decision keyword in `text`.
    pub fn mentions_decision(&self, text: &str) -> bool {
        let lower = text.to_lowercase();
        self.decision_keywords
            .iter()
            .any(|k| lower.contains(&k.to_lowercase()))
    }
}

/// Configuration for a [`ContextStore`](crate::ContextStore).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContextConfig {
    /// Retained messages, pinned system message included, enforced on every
    /// append. Replacing the pin alone does not prune.
    pub max_history: usize,

    /// Maximum non-system messages returned per relevance query.
    pub context_window: usize,

    pub tables: ScoringTables,
}

impl Default for ContextConfig {
    fn default() -> Self {
        Self {
            max_history: 50,
            context_window: 10,
            tables: ScoringTables::default(),
        }
    }
}

impl ContextConfig {
    pub fn with_max_history(mut self, max_history: usize) -> Self {
        self.max_history = max_history;
        self
    }

    pub fn with_context_window(mut self, context_window: usize) -> Self {
        self.context_window = context_window;
        self
    }

    pub fn with_tables(mut self, tables: ScoringTables) -> Self {
        self.tables = tables;
        self
    }

    /// Parse and validate a TOML document. Missing keys take their defaults.
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML file.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let source = std::fs::read_to_string(path)?;
        Self::from_toml_str(&source)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_history == 0 {
            return Err(ConfigError::Invalid(
                "max_history must be at least 1".to_string(),
            ));
        }
        if self.context_window == 0 {
            return Err(ConfigError::Invalid(
                "context_window must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
