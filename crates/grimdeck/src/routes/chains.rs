//! Action-chain handlers: start, continue, pending listing.

use axum::extract::{Query, State};
use axum::Json;
use grimdeck_document::Section;
use grimdeck_protocol::{
    ChainOutcome, ContinueChainRequest, PendingChainsResponse, PlayerId,
    RoomCode, StartChainRequest,
};
use serde::Deserialize;

use crate::reply::ApiResult;
use crate::AppState;

pub async fn start_chain(
    State(state): State<AppState>,
    Json(req): Json<StartChainRequest>,
) -> ApiResult<Json<ChainOutcome>> {
    let slot = state.documents.resolve(&req.room_id).await?;

    let outcome = {
        let mut doc = slot.lock().await;
        state.chains.start_chain(
            &mut doc,
            &req.player_id,
            req.trigger_type,
            req.actions,
            req.trigger_data,
        )?
    };
    slot.publish(Section::Players);
    slot.publish(Section::GameState);

    state.persist().touch(&req.room_id, None).await?;
    Ok(Json(outcome))
}

pub async fn continue_chain(
    State(state): State<AppState>,
    Json(req): Json<ContinueChainRequest>,
) -> ApiResult<Json<ChainOutcome>> {
    // The chain id embeds its room; resume under that room's lock.
    let room = req.chain_id.room_code()?;
    let slot = state.documents.resolve(&room).await?;

    let outcome = {
        let mut doc = slot.lock().await;
        state
            .chains
            .continue_chain(&mut doc, &req.chain_id, req.input)?
    };
    slot.publish(Section::Players);
    slot.publish(Section::GameState);

    state.persist().touch(&room, None).await?;
    Ok(Json(outcome))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingQuery {
    pub player_id: PlayerId,
    pub room_id: RoomCode,
}

pub async fn pending_chains(
    State(state): State<AppState>,
    Query(query): Query<PendingQuery>,
) -> ApiResult<Json<PendingChainsResponse>> {
    let chains = state.chains.pending_for(&query.room_id, &query.player_id);
    Ok(Json(PendingChainsResponse { chains }))
}
