//! Wagerpool - Multi-Instance Wagering Engine
//!
//! Participants create games, others join by staking value (a fungible stake
//! or a non-fungible prize deposit), exactly one winner is selected from an
//! externally supplied random value, and the winner claims the pot or prize.
//!
//! The engine is a single logical actor over a serialized in-process store;
//! the only asynchrony is the randomness oracle boundary, whose fulfillments
//! arrive out-of-band and are correlated back to the requesting game.

pub mod config;
pub mod correlator;
pub mod engine;
pub mod errors;
pub mod events;
pub mod ledger;
pub mod oracle;
pub mod registry;
pub mod resolver;
pub mod settlement;
pub mod types;

pub use config::{ConfigValidationError, EngineConfig};
pub use engine::Engine;
pub use errors::{EngineError, EngineResult};
pub use events::EngineEvent;
pub use oracle::{RandomnessSource, VrfOracle};
pub use types::{
    Amount, Game, GameId, GameKind, GameStatus, Payout, PlayerId, PrizeRef, RequestId,
};
