//! Engine events for observers and tests.
//!
//! Events fan out on a bounded `tokio::sync::broadcast` channel; a lagging
//! subscriber misses events rather than backpressuring the engine. The bus
//! also appends every event to an in-memory journal so synchronous callers
//! can inspect history without subscribing.

use crate::types::{Amount, GameId, GameKind, Payout, PlayerId, RequestId};
use serde::{Deserialize, Serialize};
use std::sync::RwLock;
use tokio::sync::broadcast;

/// One event per observable lifecycle step, carrying the game id and the
/// relevant identity/amount.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum EngineEvent {
    GameCreated {
        game: GameId,
        owner: PlayerId,
        kind: GameKind,
    },
    Enrolled {
        game: GameId,
        player: PlayerId,
        stake: Amount,
    },
    Closed {
        game: GameId,
    },
    Started {
        game: GameId,
        request: RequestId,
    },
    Finished {
        game: GameId,
        winner: PlayerId,
        solution: u64,
    },
    Withdrawn {
        game: GameId,
        winner: PlayerId,
        payout: Payout,
    },
}

impl EngineEvent {
    pub fn game_id(&self) -> GameId {
        match self {
            EngineEvent::GameCreated { game, .. }
            | EngineEvent::Enrolled { game, .. }
            | EngineEvent::Closed { game }
            | EngineEvent::Started { game, .. }
            | EngineEvent::Finished { game, .. }
            | EngineEvent::Withdrawn { game, .. } => *game,
        }
    }
}

/// Broadcast fan-out plus journal.
pub struct EventBus {
    sender: broadcast::Sender<EngineEvent>,
    journal: RwLock<Vec<EngineEvent>>,
}

impl EventBus {
    /// `capacity` must be positive; `EngineConfig::validate` rejects zero
    /// before any bus is built.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self {
            sender,
            journal: RwLock::new(Vec::new()),
        }
    }

    /// Record and fan out an event. Send errors (no subscribers) are ignored.
    pub fn publish(&self, event: EngineEvent) {
        self.journal
            .write()
            .expect("event journal lock poisoned")
            .push(event.clone());
        let _ = self.sender.send(event);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<EngineEvent> {
        self.sender.subscribe()
    }

    /// Snapshot of every event published so far, in order.
    pub fn journal(&self) -> Vec<EngineEvent> {
        self.journal
            .read()
            .expect("event journal lock poisoned")
            .clone()
    }
}
