//! Error types for the document layer.

use grimdeck_protocol::{PlayerId, RoomCode};

/// Errors that can occur during document operations.
#[derive(Debug, thiserror::Error)]
pub enum DocumentError {
    /// No room row exists for this code, so no document can be resolved.
    #[error("room {0} not found")]
    RoomNotFound(RoomCode),

    /// The room is at capacity and the joining id is new.
    #[error("room {0} is full")]
    RoomFull(RoomCode),

    /// The player is not present in the room's players map.
    #[error("player {0} not in room {1}")]
    PlayerNotInRoom(PlayerId, RoomCode),

    /// A write was attempted through the read-only guard. Carries the
    /// attempted operation, its target, and the caller location so the
    /// offending call site can be found from the log line alone.
    #[error("mutation blocked: {operation} on {target} (at {location})")]
    MutationBlocked {
        operation: &'static str,
        target: String,
        location: String,
    },

    /// Snapshot serialization or deserialization failed.
    #[error("snapshot codec failure: {0}")]
    Snapshot(#[from] serde_json::Error),

    /// The persistence layer failed underneath the document store.
    #[error(transparent)]
    Store(#[from] grimdeck_store::StoreError),
}
