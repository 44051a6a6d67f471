//! Error taxonomy for engine operations.
//!
//! Every operation is all-or-nothing: a rejection means no effect was applied.
//! The oracle fulfillment path never propagates errors to the oracle; unknown
//! or duplicate request ids are logged and discarded by the caller.

use crate::types::{Amount, GameId, PlayerId, PrizeRef, RequestId};

pub type EngineResult<T> = Result<T, EngineError>;

/// Caller-visible rejections of engine operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EngineError {
    #[error("unknown game: {0}")]
    UnknownGame(GameId),

    #[error("capacity must allow at least two members, got {0}")]
    InvalidCapacity(u32),

    #[error("engine not authorized to take custody of prize {0}")]
    PrizeNotAuthorized(PrizeRef),

    #[error("game {0} is not open for enrollment")]
    GameNotOpen(GameId),

    #[error("player {player} already enrolled in game {game}")]
    AlreadyEnrolled { game: GameId, player: PlayerId },

    #[error("game {0} has reached its member capacity")]
    CapacityReached(GameId),

    #[error("wrong stake for game {game}: required {required}, got {got}")]
    WrongStakeAmount {
        game: GameId,
        required: Amount,
        got: Amount,
    },

    #[error("player {player} is not the owner of game {game}")]
    NotOwner { game: GameId, player: PlayerId },

    #[error("game {0} is not closed")]
    GameNotClosed(GameId),

    #[error("game {0} is not resolving")]
    GameNotResolving(GameId),

    #[error("no correlation for randomness request {0}")]
    UnknownRequest(RequestId),

    #[error("game {0} has no participants to select a winner from")]
    NoParticipants(GameId),

    #[error("game {0} is not finished")]
    GameNotFinished(GameId),

    #[error("player {player} is not a winner of game {game}")]
    NotWinner { game: GameId, player: PlayerId },

    #[error("game {0} has already been settled")]
    AlreadyWithdrawn(GameId),

    #[error("randomness fulfillment from unauthorized caller {0}")]
    OracleNotAuthorized(PlayerId),

    #[error("escrow overflow crediting {amount} to game {game}")]
    EscrowOverflow { game: GameId, amount: Amount },

    #[error("aggregate custody underflow: tried to debit {tried} with {held} held")]
    InsufficientCustody { tried: Amount, held: Amount },
}
