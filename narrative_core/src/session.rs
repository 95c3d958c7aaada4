//! Game session - ties the context store and the state machine together for
//! a driving loop.
//!
//! The loop classifies player text elsewhere (intent + entities), hands the
//! result to [`GameSession::handle_input`], asks [`GameSession::model_input`]
//! for the model's input window, and feeds the model's reply back through
//! [`GameSession::record_narration`].

use game_rules::{
    GameSessionState, SessionMode, SessionStateMachine, TransitionOutcome, TransitionRejection,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::ContextConfig;
use crate::context_store::{unix_now, ContextStore, RelevanceQuery};
use crate::message::{ContextFields, Message, MessageCategory};

/// Minimum similarity for free text to count as naming an action.
pub const ACTION_MATCH_THRESHOLD: f64 = 0.6;

/// Classifier output for one line of player text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessedInput {
    pub raw_input: String,
    /// One of `move`, `interact`, `combat`, `inventory`, `query`, `quit`.
    pub intent: String,
    #[serde(default)]
    pub entities: Vec<String>,
}

impl ProcessedInput {
    pub fn new(raw_input: impl Into<String>, intent: impl Into<String>) -> Self {
        Self {
            raw_input: raw_input.into(),
            intent: intent.into(),
            entities: Vec::new(),
        }
    }

    pub fn with_entities<I, S>(mut self, entities: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.entities.extend(entities.into_iter().map(Into::into));
        self
    }
}

/// The state machine action an intent implies, if any.
pub fn intent_action(intent: &str) -> Option<&'static str> {
    match intent.trim().to_ascii_lowercase().as_str() {
        "interact" => Some("start_dialogue"),
        "combat" => Some("enter_combat"),
        "inventory" => Some("open_inventory"),
        _ => None,
    }
}

/// Match free text against the currently legal actions.
///
/// Tries a case-insensitive exact match first (spaces count as underscores),
/// then the most similar action at or above [`ACTION_MATCH_THRESHOLD`].
pub fn match_action<'a>(raw_input: &str, actions: &[&'a str]) -> Option<&'a str> {
    let input = raw_input.trim().to_lowercase().replace(' ', "_");
    if input.is_empty() {
        return None;
    }

    if let Some(action) = actions.iter().find(|a| a.to_lowercase() == input) {
        return Some(*action);
    }

    actions
        .iter()
        .map(|a| (bigram_similarity(&input, &a.to_lowercase()), *a))
        .filter(|(score, _)| *score >= ACTION_MATCH_THRESHOLD)
        .max_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal))
        .map(|(_, action)| action)
}

/// Dice coefficient over character bigrams, 0.0-1.0.
fn bigram_similarity(a: &str, b: &str) -> f64 {
    if a == b {
        return 1.0;
    }
    let bigrams = |s: &str| -> Vec<(char, char)> {
        let chars: Vec<char> = s.chars().collect();
        chars.windows(2).map(|w| (w[0], w[1])).collect()
    };

    let left = bigrams(a);
    let mut right = bigrams(b);
    if left.is_empty() || right.is_empty() {
        return 0.0;
    }

    let total = left.len() + right.len();
    let mut shared = 0usize;
    for pair in &left {
        if let Some(index) = right.iter().position(|p| p == pair) {
            right.swap_remove(index);
            shared += 1;
        }
    }

    2.0 * shared as f64 / total as f64
}

/// What happened to a line of player input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputResolution {
    /// The input did not name or imply any mode change.
    NoAction,
    /// A transition was attempted and the mode changed.
    Transitioned {
        action: String,
        outcome: TransitionOutcome,
    },
    /// The implied action is not legal right now.
    Rejected {
        action: String,
        reason: TransitionRejection,
    },
}

/// One running game session: a context store, a state machine, and the live
/// world snapshot.
#[derive(Debug, Clone)]
pub struct GameSession {
    store: ContextStore,
    machine: SessionStateMachine,
    state: GameSessionState,
}

impl GameSession {
    /// Start a session in [`SessionMode::Initializing`].
    pub fn new(config: ContextConfig, state: GameSessionState) -> Self {
        Self {
            store: ContextStore::new(config),
            machine: SessionStateMachine::new(),
            state,
        }
    }

    /// Resume a saved session in a known mode with an empty log.
    pub fn resume(config: ContextConfig, mode: SessionMode, state: GameSessionState) -> Self {
        Self {
            store: ContextStore::new(config),
            machine: SessionStateMachine::resume(mode, state.clone()),
            state,
        }
    }

    pub fn set_system_prompt(&mut self, prompt: impl Into<String>) {
        self.store.set_system_message(prompt);
    }

    pub fn mode(&self) -> SessionMode {
        self.machine.current_mode()
    }

    pub fn state(&self) -> &GameSessionState {
        &self.state
    }

    /// The live snapshot, for action resolution to update.
    pub fn state_mut(&mut self) -> &mut GameSessionState {
        &mut self.state
    }

    pub fn store(&self) -> &ContextStore {
        &self.store
    }

    pub fn machine(&self) -> &SessionStateMachine {
        &self.machine
    }

    /// Actions the player may take right now.
    pub fn valid_actions(&self) -> Vec<&'static str> {
        self.machine.valid_actions(&self.state)
    }

    /// Drive a named action directly, e.g. from a menu.
    pub fn perform(&mut self, action: &str) -> TransitionOutcome {
        self.machine.transition(action, self.state.clone())
    }

    /// Record the player's input and attempt whatever transition it implies.
    ///
    /// Free text naming a legal action wins over the intent's default action.
    pub fn handle_input(&mut self, input: &ProcessedInput) -> InputResolution {
        self.record_player_input(input);

        let valid = self.valid_actions();
        let action = match_action(&input.raw_input, &valid).or_else(|| intent_action(&input.intent));

        let Some(action) = action else {
            debug!(intent = %input.intent, "input implies no transition");
            return InputResolution::NoAction;
        };

        match self.perform(action) {
            TransitionOutcome::Rejected(reason) => InputResolution::Rejected {
                action: action.to_string(),
                reason,
            },
            outcome => InputResolution::Transitioned {
                action: action.to_string(),
                outcome,
            },
        }
    }

    fn record_player_input(&mut self, input: &ProcessedInput) -> Message {
        let mut fields = ContextFields::new()
            .with_timestamp(unix_now())
            .with_entities(input.entities.iter().cloned());
        fields.location = self.state.current_location.clone();

        self.store
            .append(&input.raw_input, MessageCategory::PlayerAction, false, fields)
    }

    /// Store model output, tagged with where the player is and who is around.
    pub fn record_narration(
        &mut self,
        text: impl Into<String>,
        category: MessageCategory,
        importance: i64,
    ) -> Message {
        let mut fields = ContextFields::new()
            .with_timestamp(unix_now())
            .with_importance(importance)
            .with_entities(self.state.entities_in_play());
        fields.location = self.state.current_location.clone();

        self.store.append(text, category, true, fields)
    }

    /// The model's input window for the next turn.
    pub fn model_input(&self, entities: &[String]) -> Vec<Message> {
        let mut query = RelevanceQuery::new()
            .with_entities(entities.iter().cloned())
            .with_entities(self.state.entities_in_play());
        query.location = self.state.current_location.clone();

        self.store.relevant_history(&query)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::Role;
    use game_rules::{Condition, Enemy, PlayerAttributes};

    fn exploring_session() -> GameSession {
        let state = GameSessionState::new("forest_edge")
            .with_exits(["deep_woods", "river_crossing"])
            .with_player(PlayerAttributes::new(100, 1));
        GameSession::resume(ContextConfig::default(), SessionMode::Exploring, state)
    }

    #[test]
    fn test_intent_action() {
        assert_eq!(intent_action("combat"), Some("enter_combat"));
        assert_eq!(intent_action(" Interact "), Some("start_dialogue"));
        assert_eq!(intent_action("inventory"), Some("open_inventory"));
        assert_eq!(intent_action("move"), None);
        assert_eq!(intent_action("quit"), None);
    }

    #[test]
    fn test_match_action_exact_and_fuzzy() {
        let actions = ["enter_combat", "start_dialogue", "open_inventory"];
        assert_eq!(match_action("Open Inventory", &actions), Some("open_inventory"));
        assert_eq!(match_action("open inventroy", &actions), Some("open_inventory"));
        assert_eq!(match_action("dance wildly", &actions), None);
        assert_eq!(match_action("   ", &actions), None);
    }

    #[test]
    fn test_bigram_similarity() {
        assert_eq!(bigram_similarity("abc", "abc"), 1.0);
        assert_eq!(bigram_similarity("ab", "cd"), 0.0);
        assert_eq!(bigram_similarity("a", "b"), 0.0);
        assert!(bigram_similarity("night", "nacht") < 0.6);
    }

    #[test]
    fn test_processed_input_from_classifier_json() {
        let input: ProcessedInput = serde_json::from_str(
            r#"{"raw_input": "talk to the sage", "intent": "interact", "entities": ["elder_sage"]}"#,
        )
        .unwrap();
        assert_eq!(intent_action(&input.intent), Some("start_dialogue"));
        assert_eq!(input.entities, vec!["elder_sage"]);

        let bare: ProcessedInput =
            serde_json::from_str(r#"{"raw_input": "look", "intent": "query"}"#).unwrap();
        assert!(bare.entities.is_empty());
    }

    #[test]
    fn test_handle_input_without_action() {
        let mut session = exploring_session();
        let resolution =
            session.handle_input(&ProcessedInput::new("walk north", "move").with_entities(["road"]));

        assert_eq!(resolution, InputResolution::NoAction);
        assert_eq!(session.mode(), SessionMode::Exploring);

        let recorded = session.store().messages().last().unwrap();
        assert_eq!(recorded.role(), Role::Player);
        let context = session.store().context(recorded.id()).unwrap();
        assert_eq!(context.category, MessageCategory::PlayerAction);
        assert_eq!(context.location.as_deref(), Some("forest_edge"));
        assert!(context.related_entities.contains("road"));
    }

    #[test]
    fn test_handle_input_rejects_combat_without_enemy() {
        let mut session = exploring_session();
        let resolution = session.handle_input(&ProcessedInput::new("attack!", "combat"));

        assert_eq!(
            resolution,
            InputResolution::Rejected {
                action: "enter_combat".to_string(),
                reason: TransitionRejection::ConditionsUnmet {
                    action: "enter_combat".to_string(),
                    unmet: vec![Condition::EnemyPresent],
                },
            }
        );
        assert_eq!(session.mode(), SessionMode::Exploring);
    }

    #[test]
    fn test_handle_input_enters_combat() {
        let mut session = exploring_session();
        session.state_mut().current_enemy = Some(Enemy::new("wolf", 6));

        let resolution = session.handle_input(&ProcessedInput::new("attack the wolf", "combat"));
        assert!(matches!(
            resolution,
            InputResolution::Transitioned { ref action, ref outcome }
                if action == "enter_combat" && outcome.is_success()
        ));
        assert_eq!(session.mode(), SessionMode::InCombat);
    }

    #[test]
    fn test_free_text_beats_intent() {
        let mut session = exploring_session();
        session.state_mut().flags.current_npc = Some("elder_sage".to_string());

        // Classifier guessed "query" but the text names a legal action
        let resolution = session.handle_input(&ProcessedInput::new("start dialogue", "query"));
        assert!(matches!(
            resolution,
            InputResolution::Transitioned { ref action, .. } if action == "start_dialogue"
        ));
        assert_eq!(session.mode(), SessionMode::InDialogue);
    }

    #[test]
    fn test_model_input_prefers_current_scene() {
        let mut session = exploring_session();
        session.set_system_prompt("You narrate a forest adventure.");
        session.record_narration("You hear water to the east.", MessageCategory::Environment, 1);

        session.state_mut().move_to("peak", ["mountain_path"]);
        session.record_narration("Wind screams across the peak.", MessageCategory::Environment, 1);

        let input = session.model_input(&[]);
        assert_eq!(input[0].role(), Role::System);
        assert_eq!(input[1].content(), "Wind screams across the peak.");
    }

    #[test]
    fn test_record_narration_tags_entities_in_play() {
        let mut session = exploring_session();
        session.state_mut().current_enemy = Some(Enemy::new("dark_sorcerer", 40));

        let message = session.record_narration("Shadows gather.", MessageCategory::Combat, 9);
        let context = session.store().context(message.id()).unwrap();
        assert_eq!(context.importance, 5);
        assert!(context.related_entities.contains("dark_sorcerer"));
        assert_eq!(message.role(), Role::Narrator);
    }
}
