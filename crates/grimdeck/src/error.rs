//! Unified error type for the Grimdeck server.

use grimdeck_document::DocumentError;
use grimdeck_engine::EngineError;
use grimdeck_protocol::ProtocolError;
use grimdeck_store::StoreError;

/// Top-level error that wraps all crate-specific errors.
///
/// The `#[from]` attribute on each variant auto-generates `From` impls,
/// so the `?` operator converts sub-crate errors automatically.
#[derive(Debug, thiserror::Error)]
pub enum GrimdeckError {
    /// A protocol-level error (identifier parsing).
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// A document-level error (resolution, capacity, guarded writes).
    #[error(transparent)]
    Document(#[from] DocumentError),

    /// A persistence-level error (rows, snapshots).
    #[error(transparent)]
    Store(#[from] StoreError),

    /// A turn/action/chain engine error.
    #[error(transparent)]
    Engine(#[from] EngineError),

    /// A socket-level error (bind, serve).
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
