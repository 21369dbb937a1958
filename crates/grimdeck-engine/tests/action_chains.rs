//! Integration tests for the action-chain engine.

use chrono::{Duration, Utc};
use grimdeck_document::{GameDocument, RoomMeta};
use grimdeck_engine::{start_game, ChainRegistry, EngineError, TURN_ACTION_POINTS};
use grimdeck_protocol::{
    ChainStepKind, ChainStepSpec, ChainTrigger, PlayerId,
};
use serde_json::{json, Value};

// =========================================================================
// Helpers
// =========================================================================

fn pid(s: &str) -> PlayerId {
    PlayerId::from(s)
}

fn started_doc() -> GameDocument {
    let mut doc = GameDocument::new(RoomMeta {
        code: "QQQQ55".parse().unwrap(),
        name: "den".into(),
        max_players: 4,
        turn_duration: 60,
        selected_deck: "base".into(),
        created_at: Utc::now(),
    });
    doc.join_player(pid("p1"), "Ana".into(), "red".into()).unwrap();
    doc.join_player(pid("p2"), "Bo".into(), "green".into()).unwrap();
    start_game(&mut doc, &mut rand::rng()).unwrap();
    doc
}

fn step(kind: ChainStepKind, data: Value) -> ChainStepSpec {
    ChainStepSpec {
        kind,
        data,
        requires_input: false,
    }
}

// =========================================================================
// Synchronous completion
// =========================================================================

#[test]
fn test_chain_without_input_completes_synchronously() {
    let mut doc = started_doc();
    let chains = ChainRegistry::new();
    let hand_before = doc.player(&pid("p1")).unwrap().hand.len();

    let outcome = chains
        .start_chain(
            &mut doc,
            &pid("p1"),
            ChainTrigger::HeroPlayed,
            vec![
                step(ChainStepKind::DrawCard, json!({"amount": 2})),
                step(ChainStepKind::DeductPoint, json!({"amount": 1})),
            ],
            Value::Null,
        )
        .unwrap();

    assert!(outcome.completed);
    assert!(!outcome.failed);
    assert!(outcome.requires_input.is_none());
    assert_eq!(doc.player(&pid("p1")).unwrap().hand.len(), hand_before + 2);
    assert_eq!(
        doc.game_state.current_turn.as_ref().unwrap().action_points,
        TURN_ACTION_POINTS - 1
    );

    // Completed chains leave the registry immediately.
    assert_eq!(chains.chain_count(), 0);
}

#[test]
fn test_chain_id_embeds_the_room_code() {
    let mut doc = started_doc();
    let chains = ChainRegistry::new();

    let outcome = chains
        .start_chain(
            &mut doc,
            &pid("p1"),
            ChainTrigger::Manual,
            vec![step(ChainStepKind::DrawCard, Value::Null)],
            Value::Null,
        )
        .unwrap();

    assert_eq!(
        outcome.chain_id.room_code().unwrap(),
        doc.room.code
    );
}

#[test]
fn test_start_chain_for_unknown_player_fails() {
    let mut doc = started_doc();
    let chains = ChainRegistry::new();

    let err = chains
        .start_chain(
            &mut doc,
            &pid("ghost"),
            ChainTrigger::Manual,
            vec![],
            Value::Null,
        )
        .unwrap_err();
    assert!(matches!(err, EngineError::PlayerNotFound(_)));
}

// =========================================================================
// Pause and resume
// =========================================================================

#[test]
fn test_input_step_parks_the_chain_without_advancing() {
    let mut doc = started_doc();
    let chains = ChainRegistry::new();

    let outcome = chains
        .start_chain(
            &mut doc,
            &pid("p1"),
            ChainTrigger::HeroPlayed,
            vec![
                step(ChainStepKind::DrawCard, json!({"amount": 1})),
                step(ChainStepKind::ChooseHero, Value::Null),
            ],
            Value::Null,
        )
        .unwrap();

    assert!(!outcome.completed);
    let request = outcome.requires_input.expect("chain must pause");
    assert_eq!(request.step_index, 1);
    assert_eq!(request.kind, ChainStepKind::ChooseHero);
    assert_eq!(chains.chain_count(), 1);

    let pending = chains.pending_for(&doc.room.code, &pid("p1"));
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].id, outcome.chain_id);
    assert_eq!(pending[0].current_index, 1, "index stays at the blocked step");
    assert!(pending[0].awaiting_input);

    // Other players see nothing pending.
    assert!(chains.pending_for(&doc.room.code, &pid("p2")).is_empty());
}

#[test]
fn test_continue_chain_resumes_and_completes() {
    let mut doc = started_doc();
    let chains = ChainRegistry::new();

    let outcome = chains
        .start_chain(
            &mut doc,
            &pid("p1"),
            ChainTrigger::HeroPlayed,
            vec![step(ChainStepKind::ChooseHero, Value::Null)],
            Value::Null,
        )
        .unwrap();
    let chain_id = outcome.chain_id;
    let hero = doc.player(&pid("p1")).unwrap().hand[0].clone();

    let outcome = chains
        .continue_chain(&mut doc, &chain_id, json!({"cardId": hero}))
        .unwrap();

    assert!(outcome.completed);
    let p = doc.player(&pid("p1")).unwrap();
    assert_eq!(p.party.heroes, vec![hero]);
    assert_eq!(chains.chain_count(), 0);
}

#[test]
fn test_continue_chain_can_park_again_on_the_next_input_step() {
    let mut doc = started_doc();
    let chains = ChainRegistry::new();

    let outcome = chains
        .start_chain(
            &mut doc,
            &pid("p1"),
            ChainTrigger::Manual,
            vec![
                step(ChainStepKind::DiscardCard, Value::Null),
                step(ChainStepKind::DiscardCard, Value::Null),
            ],
            Value::Null,
        )
        .unwrap();
    assert_eq!(outcome.requires_input.unwrap().step_index, 0);

    let first = doc.player(&pid("p1")).unwrap().hand[0].clone();
    let outcome = chains
        .continue_chain(&mut doc, &outcome.chain_id, json!({"cardId": first}))
        .unwrap();

    // The second discard needs its own input.
    assert!(!outcome.completed);
    assert_eq!(outcome.requires_input.unwrap().step_index, 1);
    assert_eq!(doc.game_state.discard_pile.len(), 1);
    assert_eq!(chains.chain_count(), 1);
}

#[test]
fn test_continue_unknown_chain_fails() {
    let mut doc = started_doc();
    let chains = ChainRegistry::new();

    let err = chains
        .continue_chain(&mut doc, &"QQQQ55-nope".into(), Value::Null)
        .unwrap_err();
    assert!(matches!(err, EngineError::ChainNotFound(_)));
}

#[test]
fn test_bad_input_payload_fails_the_chain() {
    let mut doc = started_doc();
    let chains = ChainRegistry::new();

    let outcome = chains
        .start_chain(
            &mut doc,
            &pid("p1"),
            ChainTrigger::Manual,
            vec![step(ChainStepKind::ChooseHero, Value::Null)],
            Value::Null,
        )
        .unwrap();

    let outcome = chains
        .continue_chain(&mut doc, &outcome.chain_id, json!({"wrong": "shape"}))
        .unwrap();

    assert!(outcome.failed);
    assert_eq!(chains.chain_count(), 0, "failed chains are removed");
}

// =========================================================================
// Failure and partial commit
// =========================================================================

#[test]
fn test_failing_step_keeps_earlier_effects_applied() {
    let mut doc = started_doc();
    let chains = ChainRegistry::new();
    let hand_before = doc.player(&pid("p1")).unwrap().hand.len();

    let outcome = chains
        .start_chain(
            &mut doc,
            &pid("p1"),
            ChainTrigger::MonsterDefeated,
            vec![
                step(ChainStepKind::DrawCard, json!({"amount": 1})),
                // More points than a turn ever holds.
                step(ChainStepKind::DeductPoint, json!({"amount": 99})),
                step(ChainStepKind::DrawCard, json!({"amount": 1})),
            ],
            Value::Null,
        )
        .unwrap();

    assert!(outcome.failed);
    assert!(outcome
        .message
        .as_deref()
        .unwrap()
        .contains("insufficient action points"));

    // Step 1 stays applied; step 3 never ran. Partial commit by design.
    assert_eq!(doc.player(&pid("p1")).unwrap().hand.len(), hand_before + 1);
    assert_eq!(chains.chain_count(), 0);
}

// =========================================================================
// Sweeps and room close
// =========================================================================

#[test]
fn test_sweep_expires_only_stale_chains() {
    let mut doc = started_doc();
    let chains = ChainRegistry::new();

    chains
        .start_chain(
            &mut doc,
            &pid("p1"),
            ChainTrigger::Manual,
            vec![step(ChainStepKind::ChooseHero, Value::Null)],
            Value::Null,
        )
        .unwrap();

    // Fresh chains survive a normal sweep.
    assert_eq!(chains.sweep(Duration::minutes(5)), 0);
    assert_eq!(chains.chain_count(), 1);

    // A negative ttl puts the cutoff in the future: everything is stale.
    assert_eq!(chains.sweep(Duration::seconds(-1)), 1);
    assert_eq!(chains.chain_count(), 0);
}

#[test]
fn test_room_close_bulk_removes_its_chains() {
    let mut doc = started_doc();
    let chains = ChainRegistry::new();

    for _ in 0..2 {
        chains
            .start_chain(
                &mut doc,
                &pid("p1"),
                ChainTrigger::Manual,
                vec![step(ChainStepKind::DiscardCard, Value::Null)],
                Value::Null,
            )
            .unwrap();
    }
    assert_eq!(chains.chain_count(), 2);

    assert_eq!(chains.remove_room(&doc.room.code), 2);
    assert_eq!(chains.chain_count(), 0);
    assert!(chains.pending_for(&doc.room.code, &pid("p1")).is_empty());
}
