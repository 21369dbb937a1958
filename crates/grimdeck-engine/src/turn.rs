//! Turn validation and the action-point economy.

use chrono::Utc;
use grimdeck_document::{GameDocument, Turn};
use grimdeck_protocol::{GamePhase, PlayerId};

use crate::EngineError;

/// Action points replenished whenever the turn advances to a player.
pub const TURN_ACTION_POINTS: u32 = 3;

/// Gate for every single-step action.
///
/// Check order is fixed: player presence, turn ownership, then action
/// points. Only on success may execution proceed.
pub fn validate_turn(
    doc: &GameDocument,
    player: &PlayerId,
    requires_action_points: bool,
) -> Result<(), EngineError> {
    let entry = doc
        .player(player)
        .ok_or_else(|| EngineError::PlayerNotFound(player.clone()))?;

    let holds_turn = doc
        .game_state
        .current_turn
        .as_ref()
        .is_some_and(|t| t.player_id == *player);
    if !holds_turn {
        return Err(EngineError::NotYourTurn(player.clone()));
    }

    if requires_action_points && entry.action_points == 0 {
        return Err(EngineError::InsufficientActionPoints {
            required: 1,
            available: 0,
        });
    }

    Ok(())
}

/// What the turn accounting did after an action.
#[derive(Debug, Clone, PartialEq)]
pub struct ChargeOutcome {
    /// The acting player's remaining points after the charge.
    pub remaining: u32,
    /// Whether the charge exhausted the turn and it moved on.
    pub turn_advanced: bool,
    /// Who holds the turn now, when it advanced.
    pub next_player: Option<PlayerId>,
}

/// Applies the uniform turn-accounting side effect: deduct `cost` from
/// the acting player (clamped at zero) and advance the turn when the
/// result reaches zero.
///
/// Applied for every legally attempted action, whether or not the action
/// succeeded at the rules level. A finished game is left untouched.
pub fn charge_and_advance(
    doc: &mut GameDocument,
    player: &PlayerId,
    cost: u32,
) -> ChargeOutcome {
    let current = doc
        .player(player)
        .map(|p| p.action_points)
        .unwrap_or(0);

    if doc.game_state.phase != GamePhase::Playing || cost == 0 {
        return ChargeOutcome {
            remaining: current,
            turn_advanced: false,
            next_player: None,
        };
    }

    let remaining = current.saturating_sub(cost);
    if let Some(p) = doc.player_mut(player) {
        p.action_points = remaining;
    }
    if let Some(turn) = doc.game_state.current_turn.as_mut() {
        if turn.player_id == *player {
            turn.action_points = remaining;
        }
    }

    if remaining == 0 {
        let next = advance_turn(doc);
        ChargeOutcome {
            remaining,
            turn_advanced: true,
            next_player: next,
        }
    } else {
        ChargeOutcome {
            remaining,
            turn_advanced: false,
            next_player: None,
        }
    }
}

/// Moves the turn to the next player in join order, wrapping after the
/// last. The incoming player's points are replenished to the full
/// allowance. Returns the new holder, or `None` for an empty room.
pub fn advance_turn(doc: &mut GameDocument) -> Option<PlayerId> {
    let order = doc.join_order();
    if order.is_empty() {
        doc.game_state.current_turn = None;
        return None;
    }

    let next_idx = doc
        .game_state
        .current_turn
        .as_ref()
        .and_then(|t| order.iter().position(|p| *p == t.player_id))
        .map(|i| (i + 1) % order.len())
        .unwrap_or(0);

    let next = order[next_idx].clone();
    if let Some(p) = doc.player_mut(&next) {
        p.action_points = TURN_ACTION_POINTS;
    }
    doc.game_state.current_turn = Some(Turn {
        player_id: next.clone(),
        action_points: TURN_ACTION_POINTS,
        started_at: Utc::now(),
    });

    tracing::debug!(
        room = %doc.room.code,
        player = %next,
        "turn advanced"
    );
    Some(next)
}

/// Subtracts `amount` from the current turn's action points without
/// advancing the turn. Used by card effects inside chains, not by the
/// top-level action surface. Zero is a legal no-op.
pub fn deduct_point(
    doc: &mut GameDocument,
    amount: u32,
) -> Result<u32, EngineError> {
    let phase = doc.game_state.phase;
    let turn = doc
        .game_state
        .current_turn
        .as_mut()
        .ok_or(EngineError::WrongPhase {
            expected: GamePhase::Playing,
            actual: phase,
        })?;

    if amount == 0 {
        return Ok(turn.action_points);
    }
    if amount > turn.action_points {
        return Err(EngineError::InsufficientActionPoints {
            required: amount,
            available: turn.action_points,
        });
    }

    turn.action_points -= amount;
    let remaining = turn.action_points;
    let holder = turn.player_id.clone();
    if let Some(p) = doc.player_mut(&holder) {
        p.action_points = remaining;
    }
    Ok(remaining)
}
