//! Room lifecycle handlers: create, join, leave, fetch, list.

use axum::extract::{Path, State};
use axum::Json;
use grimdeck_document::{GameDocument, ReadOnlyDocument, Section};
use grimdeck_protocol::{
    AckResponse, CreateRoomRequest, CreateRoomResponse, JoinRoomRequest,
    JoinRoomResponse, LeaveRoomRequest, RoomCode, RoomSummary,
};
use grimdeck_store::NewRoom;
use serde_json::{json, Value};

use crate::reply::{ApiError, ApiResult};
use crate::AppState;

/// Maximum rooms returned by the active-rooms listing.
const ACTIVE_ROOMS_CAP: usize = 50;

/// Attempts before giving up on minting an unused room code.
const CODE_MINT_ATTEMPTS: usize = 16;

pub async fn create_room(
    State(state): State<AppState>,
    Json(req): Json<CreateRoomRequest>,
) -> ApiResult<Json<CreateRoomResponse>> {
    let max_players = req.max_players.clamp(1, 4);

    let mut code = None;
    for _ in 0..CODE_MINT_ATTEMPTS {
        let candidate = RoomCode::generate(&mut rand::rng());
        if state.persist().fetch(&candidate).await?.is_none() {
            code = Some(candidate);
            break;
        }
    }
    let code = code.ok_or_else(|| {
        ApiError::internal("create-room", "room code space exhausted")
    })?;

    state
        .persist()
        .create(&NewRoom {
            code: code.clone(),
            name: req.name.clone(),
            max_players,
            turn_duration: req.turn_duration,
            selected_deck: req.selected_deck.clone(),
        })
        .await?;

    tracing::info!(room = %code, name = %req.name, max_players, "room created");

    Ok(Json(CreateRoomResponse {
        room_id: code,
        name: req.name,
        max_players,
        turn_duration: req.turn_duration,
        selected_deck: req.selected_deck,
    }))
}

pub async fn join_room(
    State(state): State<AppState>,
    Json(req): Json<JoinRoomRequest>,
) -> ApiResult<Json<JoinRoomResponse>> {
    let slot = state.documents.resolve(&req.room_id).await?;

    let (room, player_count) = {
        let mut doc = slot.lock().await;
        doc.join_player(
            req.player_id.clone(),
            req.player_name,
            req.player_color,
        )?;
        (room_view(&doc), doc.player_count())
    };
    slot.publish(Section::Players);

    state
        .persist()
        .touch(&req.room_id, Some(player_count))
        .await?;

    tracing::info!(
        room = %req.room_id,
        player = %req.player_id,
        players = player_count,
        "player joined"
    );

    Ok(Json(JoinRoomResponse {
        success: true,
        room,
    }))
}

pub async fn leave_room(
    State(state): State<AppState>,
    Json(req): Json<LeaveRoomRequest>,
) -> ApiResult<Json<AckResponse>> {
    let slot = state.documents.resolve(&req.room_id).await?;

    let player_count = {
        let mut doc = slot.lock().await;
        if !doc.remove_player(&req.player_id) {
            return Err(grimdeck_document::DocumentError::PlayerNotInRoom(
                req.player_id,
                req.room_id,
            )
            .into());
        }
        doc.player_count()
    };
    slot.publish(Section::Players);

    state
        .persist()
        .touch(&req.room_id, Some(player_count))
        .await?;

    tracing::info!(
        room = %req.room_id,
        player = %req.player_id,
        players = player_count,
        "player left"
    );

    // Last player out closes the room: its chains go with it and the
    // document is saved and evicted.
    if player_count == 0 {
        state.chains.remove_room(&req.room_id);
        state.documents.dispose(&req.room_id).await?;
    }

    Ok(Json(AckResponse { success: true }))
}

pub async fn get_room(
    State(state): State<AppState>,
    Path(room_id): Path<String>,
) -> ApiResult<Json<Value>> {
    let code: RoomCode = room_id.parse()?;
    let slot = state.documents.resolve(&code).await?;

    // The fetch path only observes; it goes through the guard.
    let view = ReadOnlyDocument::new(slot);
    let doc = view.snapshot().await;
    Ok(Json(room_view(&doc)))
}

pub async fn active_rooms(
    State(state): State<AppState>,
) -> ApiResult<Json<Vec<RoomSummary>>> {
    let rows = state
        .persist()
        .list_active(state.config.room_ttl, ACTIVE_ROOMS_CAP)
        .await?;

    let summaries = rows
        .into_iter()
        .map(|row| RoomSummary {
            id: row.code,
            name: row.name,
            max_players: row.max_players,
            player_count: row.player_count,
            created_at: row.created_at,
            last_activity: row.last_activity,
        })
        .collect();

    Ok(Json(summaries))
}

/// The client-facing shape of a room document.
fn room_view(doc: &GameDocument) -> Value {
    json!({
        "id": doc.room.code,
        "name": doc.room.name,
        "maxPlayers": doc.room.max_players,
        "turnDuration": doc.room.turn_duration,
        "selectedDeck": doc.room.selected_deck,
        "createdAt": doc.room.created_at,
        "gameState": doc.game_state,
        "players": doc.players,
    })
}
