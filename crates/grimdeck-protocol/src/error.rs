//! Error types for the protocol layer.

/// Errors raised while parsing protocol identifiers.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// The room code is not six characters from the code alphabet.
    #[error("invalid room code: {0:?}")]
    InvalidRoomCode(String),

    /// The chain id does not embed a valid room code prefix.
    #[error("invalid chain id: {0:?}")]
    InvalidChainId(String),
}
