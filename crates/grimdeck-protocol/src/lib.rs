//! Shared identifiers and wire types for Grimdeck.
//!
//! Everything that crosses a crate boundary or the HTTP surface lives
//! here: room codes, player/card/chain identifiers, zone and trigger
//! enums, and the request/response DTOs.
//!
//! # Key types
//!
//! - [`RoomCode`] — 6-character room identifier
//! - [`PlayerId`] / [`CardId`] / [`ChainId`] — newtype identifiers
//! - [`Zone`] — the named card zones actions move cards between
//! - [`ActionOutcome`] — the uniform `{success, message, data}` result

mod error;
mod types;
mod wire;

pub use error::ProtocolError;
pub use types::{
    CardId, ChainId, ChainStepKind, ChainTrigger, GamePhase, PlayerId,
    RoomCode, Zone,
};
pub use wire::{
    ActionOutcome, AckResponse, AttackMonsterRequest, ChainOutcome,
    ChainStepSpec, ChainView, ContinueChainRequest, CreateRoomRequest,
    CreateRoomResponse, DiscardRedrawRequest, DrawCardRequest,
    InputRequest, JoinRoomRequest, JoinRoomResponse, LeaveRoomRequest,
    PendingChainsResponse, PlayHeroRequest, RoomSummary, SaveRequest,
    SaveResponse, StartChainRequest, StartGameRequest,
};
