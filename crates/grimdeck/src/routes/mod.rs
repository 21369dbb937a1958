//! HTTP route table.

mod chains;
mod game;
mod rooms;

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::AppState;

/// Builds the full route table over the shared application state.
pub fn router(state: AppState) -> Router {
    Router::new()
        // Room lifecycle
        .route("/create-room", post(rooms::create_room))
        .route("/join-room", post(rooms::join_room))
        .route("/leave-room", post(rooms::leave_room))
        .route("/room/{room_id}", get(rooms::get_room))
        .route("/active-rooms", get(rooms::active_rooms))
        // Turn actions
        .route("/game/start", post(game::start))
        .route("/game/draw-card", post(game::draw_card))
        .route("/game/play-hero-to-party", post(game::play_hero))
        .route("/game/attack-monster", post(game::attack_monster))
        .route("/game/discard-hand-redraw", post(game::discard_redraw))
        .route("/game/save", post(game::save))
        // Action chains
        .route("/action-chains/start-chain", post(chains::start_chain))
        .route("/action-chains/continue-chain", post(chains::continue_chain))
        .route("/action-chains/pending-chains", get(chains::pending_chains))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
