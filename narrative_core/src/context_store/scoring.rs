//! Relevance and retention scoring.
//!
//! The two scores answer different questions and are weighted independently:
//! - **Relevance**: is this message useful for the model's next turn?
//! - **Retention**: is this message worth keeping at all?

use chrono::Utc;
use std::collections::BTreeSet;

use crate::config::ScoringTables;
use crate::message::{MessageCategory, MessageContext};

/// Seconds over which relevance decays to its floor.
const DECAY_WINDOW_SECS: f64 = 60.0 * 60.0;

/// Messages never decay below this fraction of their relevance.
const DECAY_FLOOR: f64 = 0.5;

/// Current wall-clock time in seconds since the Unix epoch.
pub fn unix_now() -> f64 {
    Utc::now().timestamp_micros() as f64 / 1_000_000.0
}

/// What the next model turn is about.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RelevanceQuery {
    pub location: Option<String>,
    pub entities: BTreeSet<String>,
    /// Overrides the store's context window when set.
    pub limit: Option<usize>,
}

impl RelevanceQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn at_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
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

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }
}

/// Category multiplier for relevance.
pub fn relevance_weight(category: MessageCategory) -> f64 {
    match category {
        MessageCategory::System => 5.0,
        MessageCategory::Narrative => 2.0,
        MessageCategory::Dialogue => 1.8,
        MessageCategory::Combat => 1.5,
        MessageCategory::PlayerAction => 1.3,
        MessageCategory::Inventory => 1.2,
        MessageCategory::Environment => 1.0,
    }
}

/// Category multiplier for retention.
pub fn retention_weight(category: MessageCategory) -> f64 {
    match category {
        MessageCategory::System => 10.0,
        MessageCategory::Narrative => 3.0,
        MessageCategory::Dialogue => 2.5,
        MessageCategory::PlayerAction => 2.0,
        MessageCategory::Combat => 2.0,
        MessageCategory::Inventory => 1.5,
        MessageCategory::Environment => 1.0,
    }
}

/// Fraction of relevance left after `elapsed` seconds.
///
/// Falls linearly from 1.0 to the floor over one hour. Timestamps in the
/// future count as zero elapsed time.
pub fn temporal_decay(elapsed: f64) -> f64 {
    (1.0 - elapsed.max(0.0) / DECAY_WINDOW_SECS).max(DECAY_FLOOR)
}

/// Score a message for inclusion in the next model call.
///
/// 1. Base: importance x 2
/// 2. Location: +3 exact match, +1.5 adjacent
/// 3. Entities: +1 per shared entity, +0.5 more if it is an important one
/// 4. Multiply by the category's relevance weight
/// 5. Multiply by the temporal decay factor, if timestamped
pub fn relevance_score(
    context: &MessageContext,
    query: &RelevanceQuery,
    tables: &ScoringTables,
    now: f64,
) -> f64 {
    let mut score = context.importance as f64 * 2.0;

    if let (Some(here), Some(there)) = (query.location.as_deref(), context.location.as_deref()) {
        if here == there {
            score += 3.0;
        } else if tables.are_adjacent(there, here) {
            score += 1.5;
        }
    }

    for entity in context.related_entities.intersection(&query.entities) {
        score += 1.0;
        if tables.is_important(entity) {
            score += 0.5;
        }
    }

    score *= relevance_weight(context.category);

    if let Some(timestamp) = context.timestamp {
        score *= temporal_decay(now - timestamp);
    }

    score
}

/// Score a message for survival during pruning.
///
/// `content` is needed to recognize decisions made in dialogue.
pub fn retention_score(context: &MessageContext, content: &str, tables: &ScoringTables) -> f64 {
    let mut score = context.importance as f64 * 2.0;
    score *= retention_weight(context.category);

    let important = context
        .related_entities
        .iter()
        .filter(|e| tables.is_important(e))
        .count();
    score += important as f64 * 2.0;

    if is_quest_related(context, tables) {
        score *= 1.5;
    }
    if is_player_decision(context, content, tables) {
        score *= 1.3;
    }

    score
}

/// Any of the message's entities belongs to an active quest line.
pub fn is_quest_related(context: &MessageContext, tables: &ScoringTables) -> bool {
    context
        .related_entities
        .iter()
        .any(|e| tables.is_quest_term(e))
}

/// Player actions always count; dialogue counts when it talks about choosing.
pub fn is_player_decision(context: &MessageContext, content: &str, tables: &ScoringTables) -> bool {
    match context.category {
        MessageCategory::PlayerAction => true,
        MessageCategory::Dialogue => tables.mentions_decision(content),
        _ => false,
    }
}
