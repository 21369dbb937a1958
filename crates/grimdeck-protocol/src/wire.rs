//! Request/response DTOs for the HTTP surface.
//!
//! Field names follow the client's camelCase convention. Embedded room
//! documents travel as `serde_json::Value` — the document's own shape is
//! owned by the document crate, not restated here.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{
    CardId, ChainId, ChainStepKind, ChainTrigger, PlayerId, RoomCode, Zone,
};

// ---------------------------------------------------------------------------
// Room lifecycle
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateRoomRequest {
    pub name: String,
    #[serde(default = "default_max_players")]
    pub max_players: usize,
    #[serde(default = "default_turn_duration")]
    pub turn_duration: u32,
    #[serde(default)]
    pub selected_deck: String,
}

fn default_max_players() -> usize {
    4
}

fn default_turn_duration() -> u32 {
    60
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateRoomResponse {
    pub room_id: RoomCode,
    pub name: String,
    pub max_players: usize,
    pub turn_duration: u32,
    pub selected_deck: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinRoomRequest {
    pub room_id: RoomCode,
    pub player_id: PlayerId,
    pub player_name: String,
    #[serde(default)]
    pub player_color: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinRoomResponse {
    pub success: bool,
    /// Snapshot view of the room document after the join.
    pub room: Value,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaveRoomRequest {
    pub room_id: RoomCode,
    pub player_id: PlayerId,
}

/// Minimal `{success}` acknowledgement.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AckResponse {
    pub success: bool,
}

/// One row of the active-rooms listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomSummary {
    pub id: RoomCode,
    pub name: String,
    pub max_players: usize,
    pub player_count: usize,
    pub created_at: DateTime<Utc>,
    pub last_activity: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Turn actions
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartGameRequest {
    pub room_id: RoomCode,
    pub player_id: PlayerId,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DrawCardRequest {
    pub room_id: RoomCode,
    pub player_id: PlayerId,
    #[serde(default = "default_draw_amount")]
    pub amount: usize,
    #[serde(default = "default_draw_from")]
    pub from: Zone,
    #[serde(default = "default_draw_to")]
    pub to: Zone,
}

fn default_draw_amount() -> usize {
    1
}

fn default_draw_from() -> Zone {
    Zone::SupportDeck
}

fn default_draw_to() -> Zone {
    Zone::OwnHand
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayHeroRequest {
    pub room_id: RoomCode,
    pub player_id: PlayerId,
    pub card_id: CardId,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttackMonsterRequest {
    pub room_id: RoomCode,
    pub player_id: PlayerId,
    pub monster_id: String,
    /// Face total reported by the dice-physics process.
    pub dice_result: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscardRedrawRequest {
    pub room_id: RoomCode,
    pub player_id: PlayerId,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveRequest {
    pub room_id: RoomCode,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveResponse {
    pub success: bool,
    /// Size in bytes of the persisted snapshot.
    pub state_size: usize,
}

/// The uniform result of a single-step game action.
///
/// `success: false` with a message means the action was legally attempted
/// but failed at the rules level (e.g. a missed attack roll) — the turn
/// accounting still applies in that case.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionOutcome {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl ActionOutcome {
    pub fn ok() -> Self {
        Self { success: true, message: None, data: None }
    }

    pub fn ok_with(message: impl Into<String>, data: Option<Value>) -> Self {
        Self { success: true, message: Some(message.into()), data }
    }

    pub fn fail(message: impl Into<String>) -> Self {
        Self { success: false, message: Some(message.into()), data: None }
    }
}

// ---------------------------------------------------------------------------
// Action chains
// ---------------------------------------------------------------------------

/// One queued sub-action in a start-chain request.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChainStepSpec {
    #[serde(rename = "type")]
    pub kind: ChainStepKind,
    #[serde(default)]
    pub data: Value,
    /// Explicit input flag; input-bearing kinds require input regardless.
    #[serde(default)]
    pub requires_input: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartChainRequest {
    pub room_id: RoomCode,
    pub player_id: PlayerId,
    pub trigger_type: ChainTrigger,
    pub actions: Vec<ChainStepSpec>,
    #[serde(default)]
    pub trigger_data: Value,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContinueChainRequest {
    pub chain_id: ChainId,
    pub input: Value,
}

/// Descriptor of the input a paused chain is waiting for.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InputRequest {
    pub step_index: usize,
    #[serde(rename = "type")]
    pub kind: ChainStepKind,
    pub prompt: String,
}

/// Result of starting or continuing a chain.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChainOutcome {
    pub chain_id: ChainId,
    pub completed: bool,
    pub failed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub requires_input: Option<InputRequest>,
}

/// A parked chain, as listed for reconnect recovery.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChainView {
    pub id: ChainId,
    pub room_id: RoomCode,
    pub player_id: PlayerId,
    pub trigger_type: ChainTrigger,
    #[serde(default)]
    pub trigger_data: Value,
    pub current_index: usize,
    pub awaiting_input: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub input_required: Option<InputRequest>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PendingChainsResponse {
    pub chains: Vec<ChainView>,
}
