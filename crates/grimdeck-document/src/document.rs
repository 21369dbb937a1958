//! The replicated document: one tree per room, mirrored to clients.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use grimdeck_protocol::{CardId, GamePhase, PlayerId, RoomCode};
use serde::{Deserialize, Serialize};

use crate::DocumentError;

/// Static room settings, fixed at creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomMeta {
    pub code: RoomCode,
    pub name: String,
    pub max_players: usize,
    pub turn_duration: u32,
    pub selected_deck: String,
    pub created_at: DateTime<Utc>,
}

/// A player's party: one leader slot plus recruited heroes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Party {
    pub leader: Option<CardId>,
    pub heroes: Vec<CardId>,
}

/// One entry in the document's `players` map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    pub color: String,
    pub last_seen: DateTime<Utc>,
    pub join_time: DateTime<Utc>,
    pub hand: Vec<CardId>,
    pub party: Party,
    pub action_points: u32,
}

/// A monster on the board. `strength` is the dice total needed to
/// defeat it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Monster {
    pub id: String,
    pub name: String,
    pub strength: u32,
}

/// The current turn window. Field names stay snake_case — the client's
/// replicated view reads `currentTurn.player_id` / `action_points`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Turn {
    pub player_id: PlayerId,
    pub action_points: u32,
    pub started_at: DateTime<Utc>,
}

/// The shared game sub-structure.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameState {
    pub phase: GamePhase,
    pub current_turn: Option<Turn>,
    pub monsters: Vec<Monster>,
    pub support_stack: Vec<CardId>,
    pub discard_pile: Vec<CardId>,
}

/// Which section of the document a change touched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Section {
    Room,
    Players,
    GameState,
}

/// A change notification fanned out to replication consumers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentChange {
    pub room: RoomCode,
    pub section: Section,
}

/// How a join resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinOutcome {
    /// A new player entry was created.
    Joined,
    /// The id was already present; presence fields were refreshed.
    Rejoined,
}

/// The per-room replicated document: `room`, `players`, `gameState`.
///
/// The in-memory document is the source of truth while the room is
/// active; the persisted snapshot is a point-in-time serialization of
/// it, never the other way around.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameDocument {
    pub room: RoomMeta,
    pub players: HashMap<PlayerId, Player>,
    pub game_state: GameState,
}

impl GameDocument {
    /// Creates an empty document for a freshly referenced room.
    pub fn new(room: RoomMeta) -> Self {
        Self {
            room,
            players: HashMap::new(),
            game_state: GameState::default(),
        }
    }

    /// Adds a player, or refreshes presence for a returning id.
    ///
    /// Rejoin never resets game progress: `hand`, `party`,
    /// `action_points`, and `join_time` are preserved; only `name`,
    /// `color`, and `last_seen` are updated. Capacity applies to new ids
    /// only — a returning player always gets back in.
    pub fn join_player(
        &mut self,
        id: PlayerId,
        name: String,
        color: String,
    ) -> Result<JoinOutcome, DocumentError> {
        let now = Utc::now();

        if let Some(existing) = self.players.get_mut(&id) {
            existing.name = name;
            existing.color = color;
            existing.last_seen = now;
            return Ok(JoinOutcome::Rejoined);
        }

        if self.players.len() >= self.room.max_players {
            return Err(DocumentError::RoomFull(self.room.code.clone()));
        }

        self.players.insert(
            id.clone(),
            Player {
                id,
                name,
                color,
                last_seen: now,
                join_time: now,
                hand: Vec::new(),
                party: Party::default(),
                action_points: 0,
            },
        );
        Ok(JoinOutcome::Joined)
    }

    /// Removes a player on explicit leave. Returns whether the id was
    /// present.
    pub fn remove_player(&mut self, id: &PlayerId) -> bool {
        self.players.remove(id).is_some()
    }

    pub fn player(&self, id: &PlayerId) -> Option<&Player> {
        self.players.get(id)
    }

    pub fn player_mut(&mut self, id: &PlayerId) -> Option<&mut Player> {
        self.players.get_mut(id)
    }

    pub fn player_count(&self) -> usize {
        self.players.len()
    }

    /// Player ids in join order (ties broken by id for determinism).
    /// Turn order cycles through this list.
    pub fn join_order(&self) -> Vec<PlayerId> {
        let mut players: Vec<&Player> = self.players.values().collect();
        players.sort_by(|a, b| {
            a.join_time
                .cmp(&b.join_time)
                .then_with(|| a.id.cmp(&b.id))
        });
        players.iter().map(|p| p.id.clone()).collect()
    }

    /// Serializes the document into an opaque snapshot blob.
    pub fn snapshot_bytes(&self) -> Result<Vec<u8>, DocumentError> {
        Ok(serde_json::to_vec(self)?)
    }

    /// Merges a decoded snapshot into this freshly created document.
    ///
    /// Players and game state are adopted wholesale; the room metadata
    /// keeps the values from the authoritative room row.
    pub fn merge_snapshot(&mut self, snapshot: GameDocument) {
        self.players = snapshot.players;
        self.game_state = snapshot.game_state;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn meta() -> RoomMeta {
        RoomMeta {
            code: "AAAA22".parse().unwrap(),
            name: "den".into(),
            max_players: 2,
            turn_duration: 60,
            selected_deck: "base".into(),
            created_at: Utc::now(),
        }
    }

    fn pid(s: &str) -> PlayerId {
        PlayerId::from(s)
    }

    #[test]
    fn test_join_then_rejoin_preserves_progress() {
        let mut doc = GameDocument::new(meta());
        doc.join_player(pid("p1"), "Ana".into(), "red".into()).unwrap();

        {
            let p = doc.player_mut(&pid("p1")).unwrap();
            p.hand.push("base-support-001".into());
            p.party.leader = Some("base-leader-0".into());
            p.action_points = 2;
        }
        let join_time = doc.player(&pid("p1")).unwrap().join_time;

        let outcome = doc
            .join_player(pid("p1"), "Ana Prime".into(), "blue".into())
            .unwrap();
        assert_eq!(outcome, JoinOutcome::Rejoined);

        let p = doc.player(&pid("p1")).unwrap();
        assert_eq!(p.name, "Ana Prime");
        assert_eq!(p.color, "blue");
        assert_eq!(p.hand.len(), 1);
        assert_eq!(p.party.leader, Some("base-leader-0".into()));
        assert_eq!(p.action_points, 2);
        assert_eq!(p.join_time, join_time);
    }

    #[test]
    fn test_capacity_blocks_new_ids_not_rejoins() {
        let mut doc = GameDocument::new(meta());
        doc.join_player(pid("p1"), "Ana".into(), "red".into()).unwrap();
        doc.join_player(pid("p2"), "Bo".into(), "green".into()).unwrap();

        let err = doc
            .join_player(pid("p3"), "Cy".into(), "blue".into())
            .unwrap_err();
        assert!(matches!(err, DocumentError::RoomFull(_)));

        // A returning id always gets back in, even at capacity.
        let outcome = doc
            .join_player(pid("p2"), "Bo".into(), "green".into())
            .unwrap();
        assert_eq!(outcome, JoinOutcome::Rejoined);
    }

    #[test]
    fn test_join_order_is_stable_across_rejoin() {
        let mut doc = GameDocument::new(meta());
        doc.join_player(pid("p1"), "Ana".into(), "red".into()).unwrap();
        doc.join_player(pid("p2"), "Bo".into(), "green".into()).unwrap();

        doc.join_player(pid("p1"), "Ana".into(), "red".into()).unwrap();
        assert_eq!(doc.join_order(), vec![pid("p1"), pid("p2")]);
    }

    #[test]
    fn test_snapshot_round_trip_is_deep_equal() {
        let mut doc = GameDocument::new(meta());
        doc.join_player(pid("p1"), "Ana".into(), "red".into()).unwrap();
        doc.player_mut(&pid("p1")).unwrap().hand.push("c1".into());
        doc.game_state.support_stack.push("c2".into());
        doc.game_state.phase = GamePhase::Playing;

        let bytes = doc.snapshot_bytes().unwrap();
        let decoded: GameDocument = serde_json::from_slice(&bytes).unwrap();

        let mut fresh = GameDocument::new(meta());
        fresh.merge_snapshot(decoded);

        assert_eq!(fresh.players, doc.players);
        assert_eq!(fresh.game_state, doc.game_state);
    }
}
