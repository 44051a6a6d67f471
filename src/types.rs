use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

/// Amounts are integer base units (lamport-style). No floats in accounting.
pub type Amount = u64;

/// Monotonically increasing game identifier, assigned at creation, never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GameId(pub u64);

impl fmt::Display for GameId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Globally unique randomness request id, strictly increasing, owned by the oracle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RequestId(pub u64);

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Participant identifier (wallet address or session ID)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PlayerId(pub String);

impl PlayerId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for PlayerId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// Supported wager kinds
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum GameKind {
    /// Every member contributes the same fungible stake; the pot goes to the winner.
    StakedPot,
    /// The engine holds a single non-fungible prize deposited by the creator.
    PrizeCustody,
}

impl fmt::Display for GameKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GameKind::StakedPot => write!(f, "staked_pot"),
            GameKind::PrizeCustody => write!(f, "prize_custody"),
        }
    }
}

/// Lifecycle status. Transitions advance forward only:
/// OPEN -> CLOSED -> RESOLVING -> FINISHED.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum GameStatus {
    Open,
    Closed,
    Resolving,
    Finished,
}

impl GameStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, GameStatus::Finished)
    }
}

impl fmt::Display for GameStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GameStatus::Open => write!(f, "open"),
            GameStatus::Closed => write!(f, "closed"),
            GameStatus::Resolving => write!(f, "resolving"),
            GameStatus::Finished => write!(f, "finished"),
        }
    }
}

/// Reference to an external custodial item (collection identity + item id).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PrizeRef {
    pub collection: String,
    pub item_id: u64,
}

impl PrizeRef {
    pub fn new(collection: impl Into<String>, item_id: u64) -> Self {
        Self {
            collection: collection.into(),
            item_id,
        }
    }
}

impl fmt::Display for PrizeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.collection, self.item_id)
    }
}

/// What a successful withdrawal released to the winner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "payout", rename_all = "snake_case")]
pub enum Payout {
    Funds { amount: Amount },
    Prize { prize: PrizeRef },
}

/// Complete game record. Never deleted; remains queryable after FINISHED.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Game {
    pub id: GameId,
    pub kind: GameKind,
    pub status: GameStatus,
    pub owner: PlayerId,
    /// Immutable after creation.
    pub description: String,
    pub max_members: u32,
    /// Exact per-member stake for StakedPot; zero for PrizeCustody.
    pub required_stake: Amount,
    /// Insertion order = enrollment order. Creator is member 0 for StakedPot.
    pub members: Vec<PlayerId>,
    /// Empty until FINISHED, exactly one entry after (list kept for a future
    /// multi-winner extension).
    pub winners: Vec<PlayerId>,
    /// Escrowed value held for this game; zero once withdrawn.
    pub balance: Amount,
    pub prize: Option<PrizeRef>,
    /// Randomness-derived selector index; unset until resolution completes.
    pub solution: Option<u64>,
    /// Correlator-assigned id while a randomness request is outstanding.
    pub random_request: Option<RequestId>,
    pub created_at: u64,
}

impl Game {
    pub fn is_member(&self, player: &PlayerId) -> bool {
        self.members.iter().any(|m| m == player)
    }

    pub fn is_winner(&self, player: &PlayerId) -> bool {
        self.winners.iter().any(|w| w == player)
    }

    pub fn is_full(&self) -> bool {
        self.members.len() as u32 >= self.max_members
    }
}

/// Current unix time in seconds, saturating to zero on clock skew.
pub fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}
