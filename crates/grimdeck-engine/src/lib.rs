//! The Grimdeck turn and action engine.
//!
//! Everything that may mutate a room's replicated document lives here:
//! turn validation and action-point accounting, the single-step action
//! handlers, game setup, and the multi-step action-chain engine. All
//! functions take `&mut GameDocument` — the caller holds the room's
//! writer lock, so execution is single-writer by construction.
//!
//! # Key entry points
//!
//! - [`validate_turn`] — the gate every action passes first
//! - [`execute_action`] — dispatch + uniform turn accounting
//! - [`start_game`] — deal hands, seat leaders, spawn monsters
//! - [`ChainRegistry`] — in-flight multi-step chains, pausable on input

mod actions;
mod chain;
mod error;
mod setup;
mod turn;

pub use actions::{execute_action, GameAction};
pub use chain::ChainRegistry;
pub use error::EngineError;
pub use setup::{start_game, MONSTER_COUNT, STARTING_HAND_SIZE, SUPPORT_DECK_SIZE};
pub use turn::{
    advance_turn, charge_and_advance, deduct_point, validate_turn,
    ChargeOutcome, TURN_ACTION_POINTS,
};
