//! Replicated room documents for Grimdeck.
//!
//! Each active room owns one in-memory [`GameDocument`] — the single
//! source of truth while the room is live. The [`DocumentStore`] resolves
//! codes to documents (hydrating from persistence on first reference),
//! serializes all mutation through a per-room writer lock, and evicts
//! documents back to storage when the last lease drops.
//!
//! # Key types
//!
//! - [`GameDocument`] — the `room` / `players` / `gameState` tree
//! - [`DocumentStore`] — resolve/lease/dispose lifecycle
//! - [`RoomSlot`] — one live room: writer lock + change broadcast
//! - [`ReadOnlyDocument`] — observer wrapper; every write is refused

mod document;
mod error;
mod guard;
mod store;

pub use document::{
    DocumentChange, GameDocument, GameState, JoinOutcome, Monster, Party,
    Player, RoomMeta, Section, Turn,
};
pub use error::DocumentError;
pub use guard::ReadOnlyDocument;
pub use store::{DocumentLease, DocumentStore, RoomSlot};
