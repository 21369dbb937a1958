//! Error types for the persistence layer.

use grimdeck_protocol::RoomCode;

/// Errors that can occur while reading or writing room rows.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A save matched zero rows. An orphaned save means state would be
    /// silently lost on eviction, so this propagates instead of no-oping.
    #[error("room {0} has no row to save into")]
    MissingRow(RoomCode),

    /// The underlying database operation failed.
    #[error(transparent)]
    Database(#[from] sqlx::Error),

    /// A stored row contains an identifier that no longer parses.
    #[error(transparent)]
    Corrupt(#[from] grimdeck_protocol::ProtocolError),
}
