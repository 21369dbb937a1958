//! Game setup: deck construction, dealing, monster spawns.

use chrono::Utc;
use grimdeck_document::{GameDocument, Monster, Turn};
use grimdeck_protocol::{ActionOutcome, CardId, GamePhase};
use rand::seq::SliceRandom;
use rand::Rng;
use serde_json::json;

use crate::turn::TURN_ACTION_POINTS;
use crate::EngineError;

/// Cards dealt to each player at game start (and on redraw).
pub const STARTING_HAND_SIZE: usize = 5;

/// Size of the freshly shuffled support deck.
pub const SUPPORT_DECK_SIZE: usize = 40;

/// Monsters on the board at game start.
pub const MONSTER_COUNT: usize = 3;

/// Dice total needed to defeat a monster falls in this range.
const MONSTER_STRENGTH_MIN: u32 = 6;
const MONSTER_STRENGTH_MAX: u32 = 10;

const MONSTER_NAMES: [&str; 6] = [
    "Gloomreaver",
    "Bog Titan",
    "Cinder Shade",
    "Rotfang",
    "Hexmaw",
    "The Pale King",
];

/// Deals the opening state and hands the first turn to the earliest
/// joiner.
///
/// Card content lives client-side; the server mints opaque references
/// from the room's selected deck. Only legal from the lobby phase.
pub fn start_game<R: Rng + ?Sized>(
    doc: &mut GameDocument,
    rng: &mut R,
) -> Result<ActionOutcome, EngineError> {
    if doc.game_state.phase != GamePhase::Lobby {
        return Err(EngineError::WrongPhase {
            expected: GamePhase::Lobby,
            actual: doc.game_state.phase,
        });
    }

    let order = doc.join_order();
    if order.is_empty() {
        return Err(EngineError::EmptyRoom(doc.room.code.clone()));
    }

    let deck = if doc.room.selected_deck.is_empty() {
        "base".to_string()
    } else {
        doc.room.selected_deck.clone()
    };

    let mut support: Vec<CardId> = (0..SUPPORT_DECK_SIZE)
        .map(|i| CardId(format!("{deck}-support-{i:03}")))
        .collect();
    support.shuffle(rng);
    doc.game_state.support_stack = support;

    for (seat, id) in order.iter().enumerate() {
        let stack = &mut doc.game_state.support_stack;
        let hand = stack.split_off(stack.len() - STARTING_HAND_SIZE);
        let player = doc
            .player_mut(id)
            .ok_or_else(|| EngineError::PlayerNotFound(id.clone()))?;
        player.hand = hand;
        player.party.leader = Some(CardId(format!("{deck}-leader-{seat}")));
        player.party.heroes.clear();
        player.action_points = 0;
    }

    let mut names = MONSTER_NAMES.to_vec();
    names.shuffle(rng);
    doc.game_state.monsters = names
        .iter()
        .take(MONSTER_COUNT)
        .enumerate()
        .map(|(i, name)| Monster {
            id: format!("monster-{}", i + 1),
            name: (*name).to_string(),
            strength: rng.random_range(MONSTER_STRENGTH_MIN..=MONSTER_STRENGTH_MAX),
        })
        .collect();

    doc.game_state.discard_pile.clear();
    doc.game_state.phase = GamePhase::Playing;

    let first = order[0].clone();
    if let Some(p) = doc.player_mut(&first) {
        p.action_points = TURN_ACTION_POINTS;
    }
    doc.game_state.current_turn = Some(Turn {
        player_id: first.clone(),
        action_points: TURN_ACTION_POINTS,
        started_at: Utc::now(),
    });

    tracing::info!(
        room = %doc.room.code,
        players = order.len(),
        deck = deck.as_str(),
        "game started"
    );

    Ok(ActionOutcome::ok_with(
        "game started",
        Some(json!({
            "players": order.len(),
            "monsters": MONSTER_COUNT,
            "firstTurn": first,
        })),
    ))
}
