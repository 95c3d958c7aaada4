//! Context Store - keeps the conversation log bounded and answers "what part
//! of the history matters right now".
//!
//! The store works in three steps:
//! 1. **Append**: every message gets a [`MessageContext`] keyed by its id
//! 2. **Prune**: once the log exceeds `max_history`, messages are ranked by
//!    retention score and only the best `max_history - 1` survive
//! 3. **Retrieve**: before each model call, messages are ranked by relevance
//!    to the current location and entities and the top ones are returned
//!
//! The pinned system message is never scored, never pruned, and always
//! comes first.

mod scoring;

pub use scoring::*;

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use tracing::{debug, info, warn};

use crate::config::ContextConfig;
use crate::message::{
    ContextFields, Message, MessageCategory, MessageContext, MessageId, MAX_IMPORTANCE,
    MIN_IMPORTANCE,
};

/// Bounded, relevance-scored conversation log for one game session.
#[derive(Debug, Clone)]
pub struct ContextStore {
    config: ContextConfig,
    system_message: Option<Message>,
    /// Non-system messages in insertion order.
    messages: Vec<Message>,
    contexts: HashMap<MessageId, MessageContext>,
}

impl Default for ContextStore {
    fn default() -> Self {
        Self::new(ContextConfig::default())
    }
}

impl ContextStore {
    /// Create a store. A `max_history` of zero is raised to one.
    pub fn new(mut config: ContextConfig) -> Self {
        if config.max_history == 0 {
            warn!("max_history of 0 raised to 1");
            config.max_history = 1;
        }
        Self {
            config,
            system_message: None,
            messages: Vec::new(),
            contexts: HashMap::new(),
        }
    }

    /// Create a store with default configuration.
    pub fn with_defaults() -> Self {
        Self::default()
    }

    pub fn config(&self) -> &ContextConfig {
        &self.config
    }

    pub fn max_history(&self) -> usize {
        self.config.max_history
    }

    pub fn context_window(&self) -> usize {
        self.config.context_window
    }

    /// Insert or replace the pinned system message.
    ///
    /// Setting the same text again leaves the store untouched. Pinning never
    /// prunes, so a full store can sit one over `max_history` until the next
    /// append.
    pub fn set_system_message(&mut self, content: impl Into<String>) {
        let content = content.into();
        if self
            .system_message
            .as_ref()
            .is_some_and(|m| m.content() == content)
        {
            return;
        }
        self.system_message = Some(Message::system(content));
    }

    pub fn system_message(&self) -> Option<&Message> {
        self.system_message.as_ref()
    }

    /// Append a message and attach its metadata, pruning if over capacity.
    ///
    /// Model output is attributed to the narrator, everything else to the
    /// player. Missing or malformed fields fall back to defaults.
    pub fn append(
        &mut self,
        content: impl Into<String>,
        category: MessageCategory,
        generated_by_model: bool,
        fields: ContextFields,
    ) -> Message {
        let message = if generated_by_model {
            Message::narrator(content)
        } else {
            Message::player(content)
        };

        if let Some(importance) = fields.importance {
            if !(MIN_IMPORTANCE as i64..=MAX_IMPORTANCE as i64).contains(&importance) {
                warn!(importance, "message importance out of range, clamping");
            }
        }
        let context = fields.into_context(category);

        debug!(
            id = %message.id(),
            %category,
            importance = context.importance,
            location = context.location.as_deref().unwrap_or("-"),
            "appending message"
        );

        self.contexts.insert(message.id(), context);
        self.messages.push(message.clone());

        if self.len() > self.config.max_history {
            self.prune();
        }

        message
    }

    /// Relevant history for the next model call, timed against the wall clock.
    pub fn relevant_history(&self, query: &RelevanceQuery) -> Vec<Message> {
        self.relevant_history_at(query, unix_now())
    }

    /// Relevant history with an explicit "now" in seconds since the Unix epoch.
    ///
    /// Returns the pinned system message (if any) followed by up to
    /// `query.limit` (default: the context window) other messages in
    /// descending relevance. Ties keep newest-first order.
    pub fn relevant_history_at(&self, query: &RelevanceQuery, now: f64) -> Vec<Message> {
        let limit = query.limit.unwrap_or(self.config.context_window);

        // Newest first, so the stable sort below favors recent messages on ties
        let mut scored: Vec<(f64, &Message)> = self
            .messages
            .iter()
            .rev()
            .filter_map(|m| {
                self.contexts
                    .get(&m.id())
                    .map(|ctx| (relevance_score(ctx, query, &self.config.tables, now), m))
            })
            .collect();

        scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));

        let mut history: Vec<Message> = self.system_message.iter().cloned().collect();
        history.extend(scored.into_iter().take(limit).map(|(_, m)| m.clone()));

        debug!(
            candidates = self.messages.len(),
            returned = history.len(),
            location = query.location.as_deref().unwrap_or("-"),
            "assembled relevant history"
        );

        history
    }

    /// Drop everything but the best-retained messages.
    ///
    /// Keeps `max_history - 1` non-system messages ranked by retention score.
    /// Ties go to the earlier message. Survivors stay in chronological order.
    fn prune(&mut self) {
        if self.len() <= self.config.max_history {
            return;
        }

        let keep = self.config.max_history.saturating_sub(1);

        let mut scored: Vec<(f64, MessageId)> = self
            .messages
            .iter()
            .filter_map(|m| {
                self.contexts.get(&m.id()).map(|ctx| {
                    (
                        retention_score(ctx, m.content(), &self.config.tables),
                        m.id(),
                    )
                })
            })
            .collect();

        scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));

        let kept: HashSet<MessageId> = scored.into_iter().take(keep).map(|(_, id)| id).collect();

        let before = self.messages.len();
        self.messages.retain(|m| kept.contains(&m.id()));
        self.contexts.retain(|id, _| kept.contains(id));

        info!(
            dropped = before - self.messages.len(),
            retained = self.messages.len(),
            max_history = self.config.max_history,
            "pruned message history"
        );
    }

    /// Reset the log. Metadata is always cleared.
    pub fn clear(&mut self, keep_system_message: bool) {
        self.messages.clear();
        self.contexts.clear();
        if !keep_system_message {
            self.system_message = None;
        }
    }

    /// Number of stored messages, pinned system message included.
    pub fn len(&self) -> usize {
        self.messages.len() + usize::from(self.system_message.is_some())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// All stored messages in order, system message first.
    pub fn messages(&self) -> impl Iterator<Item = &Message> {
        self.system_message.iter().chain(self.messages.iter())
    }

    /// Metadata for a stored message.
    pub fn context(&self, id: MessageId) -> Option<&MessageContext> {
        self.contexts.get(&id)
    }

    /// Number of metadata entries.
    pub fn context_count(&self) -> usize {
        self.contexts.len()
    }

    /// Aggregate view of the stored metadata.
    pub fn summary(&self) -> ContextSummary {
        let mut category_counts = BTreeMap::new();
        let mut locations = BTreeSet::new();
        let mut entities = BTreeSet::new();
        let mut total_importance = 0u64;

        for context in self.contexts.values() {
            *category_counts.entry(context.category).or_insert(0) += 1;
            total_importance += context.importance as u64;
            if let Some(location) = &context.location {
                locations.insert(location.clone());
            }
            entities.extend(context.related_entities.iter().cloned());
        }

        let average_importance = if self.contexts.is_empty() {
            0.0
        } else {
            total_importance as f64 / self.contexts.len() as f64
        };

        ContextSummary {
            message_count: self.len(),
            category_counts,
            average_importance,
            unique_locations: locations.into_iter().collect(),
            unique_entities: entities.into_iter().collect(),
        }
    }
}

/// Summary of the store's current contents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContextSummary {
    pub message_count: usize,
    pub category_counts: BTreeMap<MessageCategory, usize>,
    pub average_importance: f64,
    /// Sorted.
    pub unique_locations: Vec<String>,
    /// Sorted.
    pub unique_entities: Vec<String>,
}
