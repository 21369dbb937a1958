//! Core identifier and enum types shared across the Grimdeck crates.

use std::fmt;
use std::str::FromStr;

use rand::Rng;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::ProtocolError;

/// Alphabet for room codes. Lookalike characters (`0`/`O`, `1`/`I`) are
/// excluded so codes survive being read aloud.
const CODE_ALPHABET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";

/// Length of a room code.
pub const CODE_LEN: usize = 6;

/// A six-character room identifier.
///
/// Newtype over `String` so a room code can never be confused with a
/// player or card identifier in a signature. Serializes as the bare
/// string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoomCode(String);

impl RoomCode {
    /// Generates a fresh random code. Uniqueness against existing rooms
    /// is the caller's responsibility (checked against the store).
    pub fn generate<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let code: String = (0..CODE_LEN)
            .map(|_| {
                let idx = rng.random_range(0..CODE_ALPHABET.len());
                CODE_ALPHABET[idx] as char
            })
            .collect();
        Self(code)
    }

    /// Returns the code as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for RoomCode {
    type Err = ProtocolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let ok = s.len() == CODE_LEN
            && s.bytes().all(|b| CODE_ALPHABET.contains(&b));
        if ok {
            Ok(Self(s.to_string()))
        } else {
            Err(ProtocolError::InvalidRoomCode(s.to_string()))
        }
    }
}

impl fmt::Display for RoomCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A player identifier, supplied by the client's identity layer.
///
/// Player identity (cookies, display names) is owned by an external
/// service; the server treats the id as an opaque stable key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(pub String);

impl PlayerId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PlayerId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// An opaque card reference.
///
/// Card content (hero stats, art, rules text) lives in the client's deck
/// data; the server only moves references between zones.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CardId(pub String);

impl CardId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CardId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for CardId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// A globally unique action-chain identifier.
///
/// The room code is embedded as a prefix (`<code>-<uuid>`) so a chain id
/// alone is enough to locate the room it belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChainId(String);

impl ChainId {
    /// Mints a new chain id for the given room.
    pub fn mint(room: &RoomCode) -> Self {
        Self(format!("{}-{}", room, Uuid::new_v4()))
    }

    /// Extracts the embedded room code.
    pub fn room_code(&self) -> Result<RoomCode, ProtocolError> {
        self.0
            .split('-')
            .next()
            .and_then(|prefix| prefix.parse().ok())
            .ok_or_else(|| ProtocolError::InvalidChainId(self.0.clone()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ChainId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ChainId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// The named card zones that single-step actions move cards between.
///
/// Only a fixed whitelist of source/destination pairs is legal; see the
/// engine's zone-move table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Zone {
    SupportDeck,
    OwnHand,
    DiscardPile,
}

impl fmt::Display for Zone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SupportDeck => write!(f, "support-deck"),
            Self::OwnHand => write!(f, "own-hand"),
            Self::DiscardPile => write!(f, "discard-pile"),
        }
    }
}

/// What caused an action chain to be enqueued.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChainTrigger {
    HeroPlayed,
    MonsterDefeated,
    Manual,
}

/// The lifecycle phase of a room's game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum GamePhase {
    /// Players are joining; no turns yet.
    #[default]
    Lobby,
    /// The game is running and turns cycle.
    Playing,
    /// The game has ended.
    Finished,
}

impl fmt::Display for GamePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Lobby => write!(f, "lobby"),
            Self::Playing => write!(f, "playing"),
            Self::Finished => write!(f, "finished"),
        }
    }
}

/// The kinds of sub-action a chain can queue.
///
/// A closed sum type rather than an open string registry: dispatch is a
/// `match`, and unknown kinds are rejected at deserialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ChainStepKind {
    /// Subtract a fixed amount from the current turn's action points.
    DeductPoint,
    /// Draw cards from the support deck into the initiator's hand.
    DrawCard,
    /// Pick a hero card from the initiator's hand and add it to the party.
    ChooseHero,
    /// Pick a card from the initiator's hand and discard it.
    DiscardCard,
}

impl ChainStepKind {
    /// Whether this step kind cannot execute without player input.
    pub fn needs_input(self) -> bool {
        matches!(self, Self::ChooseHero | Self::DiscardCard)
    }
}

impl fmt::Display for ChainStepKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DeductPoint => write!(f, "deductPoint"),
            Self::DrawCard => write!(f, "drawCard"),
            Self::ChooseHero => write!(f, "chooseHero"),
            Self::DiscardCard => write!(f, "discardCard"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_room_code_generate_shape() {
        let mut rng = rand::rng();
        for _ in 0..64 {
            let code = RoomCode::generate(&mut rng);
            assert_eq!(code.as_str().len(), CODE_LEN);
            assert!(code
                .as_str()
                .bytes()
                .all(|b| CODE_ALPHABET.contains(&b)));
        }
    }

    #[test]
    fn test_room_code_parse_rejects_bad_input() {
        assert!("ABC234".parse::<RoomCode>().is_ok());
        assert!("abc234".parse::<RoomCode>().is_err());
        assert!("ABC23".parse::<RoomCode>().is_err());
        assert!("ABC2340".parse::<RoomCode>().is_err());
        assert!("ABC10I".parse::<RoomCode>().is_err());
    }

    #[test]
    fn test_chain_id_embeds_room_code() {
        let room: RoomCode = "QWXJ77".parse().unwrap();
        let chain = ChainId::mint(&room);
        assert!(chain.as_str().starts_with("QWXJ77-"));
        assert_eq!(chain.room_code().unwrap(), room);
    }

    #[test]
    fn test_zone_serde_kebab_case() {
        assert_eq!(
            serde_json::to_string(&Zone::SupportDeck).unwrap(),
            "\"support-deck\""
        );
        let zone: Zone = serde_json::from_str("\"own-hand\"").unwrap();
        assert_eq!(zone, Zone::OwnHand);
    }

    #[test]
    fn test_chain_step_kind_input_defaults() {
        assert!(!ChainStepKind::DeductPoint.needs_input());
        assert!(!ChainStepKind::DrawCard.needs_input());
        assert!(ChainStepKind::ChooseHero.needs_input());
        assert!(ChainStepKind::DiscardCard.needs_input());
    }
}
