//! Public-API walks through the context store and a game session.

use game_rules::{Enemy, GameSessionState, PlayerAttributes, SessionMode};
use narrative_core::{
    ContextConfig, ContextFields, ContextStore, GameSession, InputResolution, MessageCategory,
    ProcessedInput, RelevanceQuery, Role, ScoringTables,
};

#[test]
fn test_bounded_history_with_pinned_system_message() {
    let mut store = ContextStore::new(ContextConfig::default().with_max_history(3));
    store.set_system_message("You are the narrator of a dark forest tale.");

    for i in 0..5 {
        store.append(
            format!("narration {i}"),
            MessageCategory::Narrative,
            true,
            ContextFields::new(),
        );
    }

    let remaining: Vec<String> = store.messages().map(|m| m.content().to_string()).collect();
    assert_eq!(
        remaining,
        vec![
            "You are the narrator of a dark forest tale.",
            "narration 0",
            "narration 1",
        ]
    );
    assert_eq!(store.context_count(), 2);
}

#[test]
fn test_custom_tables_change_scoring() {
    let tables = ScoringTables {
        important_entities: ["moon_key".to_string()].into_iter().collect(),
        ..ScoringTables::empty()
    };
    let mut store = ContextStore::new(
        ContextConfig::default()
            .with_max_history(2)
            .with_tables(tables),
    );

    store.append(
        "A key glints.",
        MessageCategory::Environment,
        true,
        ContextFields::new().with_entity("moon_key"),
    );
    store.append("Birds sing.", MessageCategory::Environment, true, ContextFields::new());
    store.append("Rain falls.", MessageCategory::Environment, true, ContextFields::new());

    let remaining: Vec<&str> = store.messages().map(|m| m.content()).collect();
    assert_eq!(remaining, vec!["A key glints."]);
}

#[test]
fn test_old_messages_fade_but_never_vanish() {
    let mut store = ContextStore::new(ContextConfig::default().with_context_window(1));
    let now = 1_700_000_000.0;

    store.append(
        "Long ago, a bridge collapsed.",
        MessageCategory::Narrative,
        true,
        ContextFields::new().with_timestamp(now - 10_000.0),
    );
    store.append(
        "Just now, a bird landed.",
        MessageCategory::Narrative,
        true,
        ContextFields::new().with_timestamp(now - 60.0),
    );

    let history = store.relevant_history_at(&RelevanceQuery::new(), now);
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].content(), "Just now, a bird landed.");

    let history = store.relevant_history_at(&RelevanceQuery::new().with_limit(5), now);
    assert_eq!(history.len(), 2);
}

#[test]
fn test_session_turn_loop() {
    let config = ContextConfig::from_toml_str("max_history = 10\ncontext_window = 4").unwrap();
    let state = GameSessionState::new("forest_edge")
        .with_exits(["deep_woods", "river_crossing"])
        .with_player(PlayerAttributes::new(40, 1));
    let mut session = GameSession::new(config, state);
    session.set_system_prompt("Narrate tersely.");

    assert!(session.perform("start_character_creation").is_success());
    assert!(session.perform("start_game").is_success());
    assert_eq!(session.mode(), SessionMode::Exploring);

    session.record_narration("A wolf bares its teeth.", MessageCategory::Combat, 3);
    session.state_mut().current_enemy = Some(Enemy::new("wolf", 9));

    let resolution = session.handle_input(
        &ProcessedInput::new("I draw my sword", "combat").with_entities(["wolf"]),
    );
    assert!(matches!(resolution, InputResolution::Transitioned { .. }));
    assert_eq!(session.mode(), SessionMode::InCombat);

    // Still fighting: the free text names no legal action and the intent maps nowhere
    let resolution = session.handle_input(&ProcessedInput::new("end it", "move"));
    assert_eq!(resolution, InputResolution::NoAction);

    session.state_mut().current_enemy = Some(Enemy::new("wolf", 0));
    let resolution = session.handle_input(&ProcessedInput::new("end combat", "query"));
    assert!(matches!(resolution, InputResolution::Transitioned { .. }));
    assert_eq!(session.mode(), SessionMode::Exploring);

    let window = session.model_input(&["wolf".to_string()]);
    assert_eq!(window[0].role(), Role::System);
    assert!(window.len() <= 5);
    assert!(session.store().len() <= 10);
}
