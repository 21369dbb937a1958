//! Single-step action dispatch and handlers.

use grimdeck_document::GameDocument;
use grimdeck_protocol::{ActionOutcome, CardId, GamePhase, PlayerId, Zone};
use serde_json::json;

use crate::setup::STARTING_HAND_SIZE;
use crate::turn::{charge_and_advance, validate_turn};
use crate::EngineError;

/// A validated, typed game action. Dispatch is a closed `match` — no
/// stringly-typed handler registry.
#[derive(Debug, Clone, PartialEq)]
pub enum GameAction {
    DrawCard {
        amount: usize,
        from: Zone,
        to: Zone,
    },
    PlayHeroToParty {
        card: CardId,
    },
    AttackMonster {
        monster_id: String,
        dice_result: u32,
    },
    DiscardAllAndRedraw,
}

impl GameAction {
    /// The wire name of this action, for logs and error context.
    pub fn name(&self) -> &'static str {
        match self {
            Self::DrawCard { .. } => "drawCard",
            Self::PlayHeroToParty { .. } => "playHeroToParty",
            Self::AttackMonster { .. } => "attackMonster",
            Self::DiscardAllAndRedraw => "discardAllAndRedraw",
        }
    }

    /// Action-point cost.
    pub fn cost(&self) -> u32 {
        1
    }
}

/// Validates, executes, and applies turn accounting for one action.
///
/// Pre-condition errors (`InsufficientCards`, an unknown card or
/// monster, an off-whitelist zone move) propagate before any mutation
/// and cost nothing. A legally attempted action that fails at the rules
/// level — a missed attack roll — returns `success: false` and still
/// pays its action point, exactly like a successful one.
pub fn execute_action(
    doc: &mut GameDocument,
    player: &PlayerId,
    action: GameAction,
) -> Result<ActionOutcome, EngineError> {
    validate_turn(doc, player, true)?;

    let mut outcome = match &action {
        GameAction::DrawCard { amount, from, to } => {
            draw_card(doc, player, *amount, *from, *to)
        }
        GameAction::PlayHeroToParty { card } => {
            play_hero_to_party(doc, player, card)
        }
        GameAction::AttackMonster {
            monster_id,
            dice_result,
        } => attack_monster(doc, player, monster_id, *dice_result),
        GameAction::DiscardAllAndRedraw => {
            discard_all_and_redraw(doc, player)
        }
    }?;

    let charge = charge_and_advance(doc, player, action.cost());

    tracing::debug!(
        room = %doc.room.code,
        player = %player,
        action = action.name(),
        success = outcome.success,
        remaining = charge.remaining,
        advanced = charge.turn_advanced,
        "action executed"
    );

    let accounting = json!({
        "actionPoints": charge.remaining,
        "turnAdvanced": charge.turn_advanced,
        "nextPlayer": charge.next_player,
    });
    let mut data = match outcome.data.take() {
        Some(serde_json::Value::Object(map)) => map,
        _ => serde_json::Map::new(),
    };
    data.insert("turn".into(), accounting);
    outcome.data = Some(serde_json::Value::Object(data));

    Ok(outcome)
}

/// Moves `amount` cards between zones. Only whitelisted pairs are
/// supported; cards move from the top (end) of the source.
pub(crate) fn transfer(
    doc: &mut GameDocument,
    player: &PlayerId,
    amount: usize,
    from: Zone,
    to: Zone,
) -> Result<Vec<CardId>, EngineError> {
    match (from, to) {
        (Zone::SupportDeck, Zone::OwnHand)
        | (Zone::OwnHand, Zone::DiscardPile)
        | (Zone::SupportDeck, Zone::DiscardPile) => {}
        _ => return Err(EngineError::UnsupportedLocation { from, to }),
    }

    let moved = {
        let source = match from {
            Zone::SupportDeck => &mut doc.game_state.support_stack,
            Zone::OwnHand => {
                &mut doc
                    .player_mut(player)
                    .ok_or_else(|| EngineError::PlayerNotFound(player.clone()))?
                    .hand
            }
            Zone::DiscardPile => &mut doc.game_state.discard_pile,
        };
        if source.len() < amount {
            return Err(EngineError::InsufficientCards {
                zone: from,
                requested: amount,
                available: source.len(),
            });
        }
        source.split_off(source.len() - amount)
    };

    match to {
        Zone::OwnHand => {
            doc.player_mut(player)
                .ok_or_else(|| EngineError::PlayerNotFound(player.clone()))?
                .hand
                .extend(moved.iter().cloned());
        }
        Zone::DiscardPile => {
            doc.game_state.discard_pile.extend(moved.iter().cloned());
        }
        Zone::SupportDeck => {
            doc.game_state.support_stack.extend(moved.iter().cloned());
        }
    }

    Ok(moved)
}

fn draw_card(
    doc: &mut GameDocument,
    player: &PlayerId,
    amount: usize,
    from: Zone,
    to: Zone,
) -> Result<ActionOutcome, EngineError> {
    let moved = transfer(doc, player, amount, from, to)?;
    Ok(ActionOutcome::ok_with(
        format!("moved {} card(s): {from} -> {to}", moved.len()),
        Some(json!({ "cards": moved, "from": from, "to": to })),
    ))
}

/// Takes a hero card out of the player's hand and seats it in the party.
/// Shared with the chain engine's choose-hero step.
pub(crate) fn recruit_hero(
    doc: &mut GameDocument,
    player: &PlayerId,
    card: &CardId,
) -> Result<(), EngineError> {
    let entry = doc
        .player_mut(player)
        .ok_or_else(|| EngineError::PlayerNotFound(player.clone()))?;
    let idx = entry
        .hand
        .iter()
        .position(|c| c == card)
        .ok_or_else(|| EngineError::UnknownCard(card.clone()))?;
    let card = entry.hand.remove(idx);
    entry.party.heroes.push(card);
    Ok(())
}

fn play_hero_to_party(
    doc: &mut GameDocument,
    player: &PlayerId,
    card: &CardId,
) -> Result<ActionOutcome, EngineError> {
    recruit_hero(doc, player, card)?;
    Ok(ActionOutcome::ok_with(
        "hero joined the party",
        Some(json!({ "cardId": card })),
    ))
}

fn attack_monster(
    doc: &mut GameDocument,
    player: &PlayerId,
    monster_id: &str,
    dice_result: u32,
) -> Result<ActionOutcome, EngineError> {
    let monsters = &mut doc.game_state.monsters;
    let idx = monsters
        .iter()
        .position(|m| m.id == monster_id)
        .ok_or_else(|| EngineError::UnknownMonster(monster_id.to_string()))?;

    let strength = monsters[idx].strength;
    if dice_result < strength {
        // A legal attempt that missed: the caller still pays the point.
        return Ok(ActionOutcome::fail(format!(
            "attack failed: rolled {dice_result}, needed {strength}"
        )));
    }

    let monster = monsters.remove(idx);
    let mut data = json!({
        "monsterId": monster.id,
        "defeated": true,
        "strength": strength,
    });

    if doc.game_state.monsters.is_empty() {
        doc.game_state.phase = GamePhase::Finished;
        doc.game_state.current_turn = None;
        data["gameOver"] = json!(true);
        data["winner"] = json!(player);
        tracing::info!(
            room = %doc.room.code,
            winner = %player,
            "last monster defeated, game over"
        );
    }

    Ok(ActionOutcome::ok_with(
        format!("{} defeated", monster.name),
        Some(data),
    ))
}

fn discard_all_and_redraw(
    doc: &mut GameDocument,
    player: &PlayerId,
) -> Result<ActionOutcome, EngineError> {
    let available = doc.game_state.support_stack.len();
    if available < STARTING_HAND_SIZE {
        return Err(EngineError::InsufficientCards {
            zone: Zone::SupportDeck,
            requested: STARTING_HAND_SIZE,
            available,
        });
    }

    let old_hand = {
        let entry = doc
            .player_mut(player)
            .ok_or_else(|| EngineError::PlayerNotFound(player.clone()))?;
        std::mem::take(&mut entry.hand)
    };
    let discarded = old_hand.len();
    doc.game_state.discard_pile.extend(old_hand);

    let drawn = transfer(
        doc,
        player,
        STARTING_HAND_SIZE,
        Zone::SupportDeck,
        Zone::OwnHand,
    )?;

    Ok(ActionOutcome::ok_with(
        format!("discarded {discarded}, drew {}", drawn.len()),
        Some(json!({ "discarded": discarded, "drawn": drawn.len() })),
    ))
}
