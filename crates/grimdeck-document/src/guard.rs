//! Read-only access guard over a room document.
//!
//! Consumers outside the turn/chain engines (the render read path, room
//! listings) observe state through this wrapper. Reads pass through;
//! every write is refused with [`DocumentError::MutationBlocked`]. The
//! guarantee is structural — the guard never hands out a `&mut`
//! document, so holding the wrapper gives no mutation path at all.

use std::panic::Location;
use std::sync::Arc;

use grimdeck_protocol::{PlayerId, RoomCode};
use serde_json::Value;
use tokio::sync::broadcast;

use crate::{DocumentChange, DocumentError, GameDocument, Player, RoomSlot, Section};

/// An observer handle on a live room document.
#[derive(Clone)]
pub struct ReadOnlyDocument {
    slot: Arc<RoomSlot>,
}

impl ReadOnlyDocument {
    pub fn new(slot: Arc<RoomSlot>) -> Self {
        Self { slot }
    }

    pub fn room_code(&self) -> &RoomCode {
        self.slot.code()
    }

    /// A point-in-time copy of the full document.
    pub async fn snapshot(&self) -> GameDocument {
        self.slot.lock().await.clone()
    }

    /// A copy of one player's entry, if present.
    pub async fn player(&self, id: &PlayerId) -> Option<Player> {
        self.slot.lock().await.player(id).cloned()
    }

    pub async fn player_count(&self) -> usize {
        self.slot.lock().await.player_count()
    }

    pub async fn contains_player(&self, id: &PlayerId) -> bool {
        self.slot.lock().await.player(id).is_some()
    }

    /// Subscribes to change notifications for this room.
    pub fn subscribe(&self) -> broadcast::Receiver<DocumentChange> {
        self.slot.subscribe()
    }

    // -- Write surface: every call below is refused. --

    /// Refused: observers cannot write sections.
    #[track_caller]
    pub fn set(&self, section: Section, _value: Value) -> Result<(), DocumentError> {
        Err(self.blocked("set", format!("{:?}", section)))
    }

    /// Refused: observers cannot remove players.
    #[track_caller]
    pub fn remove(&self, id: &PlayerId) -> Result<(), DocumentError> {
        Err(self.blocked("remove", format!("players/{id}")))
    }

    /// Refused: observers cannot clear the document.
    #[track_caller]
    pub fn clear(&self) -> Result<(), DocumentError> {
        Err(self.blocked("clear", "document".to_string()))
    }

    /// Refused: observers cannot destroy the document.
    #[track_caller]
    pub fn destroy(&self) -> Result<(), DocumentError> {
        Err(self.blocked("destroy", "document".to_string()))
    }

    #[track_caller]
    fn blocked(&self, operation: &'static str, target: String) -> DocumentError {
        let location = Location::caller().to_string();
        tracing::warn!(
            room = %self.slot.code(),
            operation,
            target = %target,
            caller = %location,
            "write attempted through read-only guard"
        );
        DocumentError::MutationBlocked {
            operation,
            target,
            location,
        }
    }
}
