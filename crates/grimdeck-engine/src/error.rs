//! Error types for the turn, action, and chain engines.

use grimdeck_protocol::{CardId, ChainId, GamePhase, PlayerId, RoomCode, Zone};

/// Errors raised while validating or executing game operations.
///
/// These are recovered locally and surfaced as structured responses;
/// none of them corrupts in-progress turn state — handlers fail before
/// mutating, not mid-mutation.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// The player is absent from the room's players map.
    #[error("player {0} not found in room")]
    PlayerNotFound(PlayerId),

    /// The acting player does not hold the current turn.
    #[error("not your turn, {0}")]
    NotYourTurn(PlayerId),

    /// The action needs more action points than remain.
    #[error("insufficient action points: need {required}, have {available}")]
    InsufficientActionPoints { required: u32, available: u32 },

    /// The source zone holds fewer cards than requested.
    #[error("insufficient cards in {zone}: need {requested}, have {available}")]
    InsufficientCards {
        zone: Zone,
        requested: usize,
        available: usize,
    },

    /// The source/destination pair is not on the move whitelist.
    #[error("unsupported card move: {from} -> {to}")]
    UnsupportedLocation { from: Zone, to: Zone },

    /// The referenced card is not where the action requires it.
    #[error("card {0} not found")]
    UnknownCard(CardId),

    /// The referenced monster is not on the board.
    #[error("monster {0:?} not found")]
    UnknownMonster(String),

    /// The operation is not legal in the game's current phase.
    #[error("wrong phase: expected {expected}, game is {actual}")]
    WrongPhase { expected: GamePhase, actual: GamePhase },

    /// A game cannot start with nobody seated.
    #[error("room {0} has no players to start with")]
    EmptyRoom(RoomCode),

    /// No chain with this id is registered.
    #[error("chain {0} not found")]
    ChainNotFound(ChainId),

    /// The chain exists but is not paused on input.
    #[error("chain {0} is not awaiting input")]
    ChainNotAwaitingInput(ChainId),

    /// A step's data or supplied input did not parse.
    #[error("invalid chain input: {0}")]
    InvalidInput(String),
}
