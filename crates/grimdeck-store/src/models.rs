//! Row models for the rooms table.

use chrono::{DateTime, Utc};
use grimdeck_protocol::RoomCode;

/// Parameters for inserting a fresh room row.
#[derive(Debug, Clone)]
pub struct NewRoom {
    pub code: RoomCode,
    pub name: String,
    pub max_players: usize,
    pub turn_duration: u32,
    pub selected_deck: String,
}

/// Lifecycle metadata for one room. The snapshot blob itself is fetched
/// separately via [`RoomStore::load_state`](crate::RoomStore::load_state).
#[derive(Debug, Clone)]
pub struct RoomRow {
    pub code: RoomCode,
    pub name: String,
    pub max_players: usize,
    pub turn_duration: u32,
    pub selected_deck: String,
    pub player_count: usize,
    pub created_at: DateTime<Utc>,
    pub last_activity: DateTime<Utc>,
}

/// Returned by a successful save.
#[derive(Debug, Clone, Copy)]
pub struct SaveReceipt {
    /// Size in bytes of the snapshot that was written.
    pub state_size: usize,
}
