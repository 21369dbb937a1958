//! Turn-action handlers: start, the four single-step actions, save.

use axum::extract::State;
use axum::Json;
use grimdeck_document::Section;
use grimdeck_engine::{execute_action, start_game, GameAction};
use grimdeck_protocol::{
    ActionOutcome, AttackMonsterRequest, DiscardRedrawRequest,
    DrawCardRequest, PlayHeroRequest, PlayerId, RoomCode, SaveRequest,
    SaveResponse, StartGameRequest,
};

use crate::reply::ApiResult;
use crate::AppState;

pub async fn start(
    State(state): State<AppState>,
    Json(req): Json<StartGameRequest>,
) -> ApiResult<Json<ActionOutcome>> {
    let slot = state.documents.resolve(&req.room_id).await?;

    let outcome = {
        let mut doc = slot.lock().await;
        if doc.player(&req.player_id).is_none() {
            return Err(
                grimdeck_engine::EngineError::PlayerNotFound(req.player_id)
                    .into(),
            );
        }
        start_game(&mut doc, &mut rand::rng())?
    };
    slot.publish(Section::Players);
    slot.publish(Section::GameState);

    state.persist().touch(&req.room_id, None).await?;
    Ok(Json(outcome))
}

pub async fn draw_card(
    State(state): State<AppState>,
    Json(req): Json<DrawCardRequest>,
) -> ApiResult<Json<ActionOutcome>> {
    run_action(
        &state,
        &req.room_id,
        &req.player_id,
        GameAction::DrawCard {
            amount: req.amount,
            from: req.from,
            to: req.to,
        },
    )
    .await
}

pub async fn play_hero(
    State(state): State<AppState>,
    Json(req): Json<PlayHeroRequest>,
) -> ApiResult<Json<ActionOutcome>> {
    run_action(
        &state,
        &req.room_id,
        &req.player_id,
        GameAction::PlayHeroToParty { card: req.card_id },
    )
    .await
}

pub async fn attack_monster(
    State(state): State<AppState>,
    Json(req): Json<AttackMonsterRequest>,
) -> ApiResult<Json<ActionOutcome>> {
    run_action(
        &state,
        &req.room_id,
        &req.player_id,
        GameAction::AttackMonster {
            monster_id: req.monster_id,
            dice_result: req.dice_result,
        },
    )
    .await
}

pub async fn discard_redraw(
    State(state): State<AppState>,
    Json(req): Json<DiscardRedrawRequest>,
) -> ApiResult<Json<ActionOutcome>> {
    run_action(
        &state,
        &req.room_id,
        &req.player_id,
        GameAction::DiscardAllAndRedraw,
    )
    .await
}

pub async fn save(
    State(state): State<AppState>,
    Json(req): Json<SaveRequest>,
) -> ApiResult<Json<SaveResponse>> {
    let receipt = state.documents.save(&req.room_id).await?;
    Ok(Json(SaveResponse {
        success: true,
        state_size: receipt.state_size,
    }))
}

/// Shared execution path: take the room's writer lock, validate and
/// execute under it, then announce the change and bump activity.
async fn run_action(
    state: &AppState,
    room: &RoomCode,
    player: &PlayerId,
    action: GameAction,
) -> ApiResult<Json<ActionOutcome>> {
    let slot = state.documents.resolve(room).await?;

    let outcome = {
        let mut doc = slot.lock().await;
        execute_action(&mut doc, player, action)?
    };
    slot.publish(Section::Players);
    slot.publish(Section::GameState);

    state.persist().touch(room, None).await?;
    Ok(Json(outcome))
}
