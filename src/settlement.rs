//! Settlement: validates a withdrawal against the resolved winner and
//! releases escrow or prize custody, exactly once.
//!
//! Ordering invariant: the one-shot state mutation (balance zeroing / custody
//! release) commits before any transfer effect becomes externally observable,
//! so a re-entering caller finds nothing left to withdraw.

use crate::errors::{EngineError, EngineResult};
use crate::ledger::Ledger;
use crate::types::{Game, GameKind, GameStatus, Payout, PlayerId};

/// Settle a finished game to `caller`, who must be in the winner set.
pub fn withdraw(game: &mut Game, ledger: &mut Ledger, caller: &PlayerId) -> EngineResult<Payout> {
    if game.status != GameStatus::Finished {
        return Err(EngineError::GameNotFinished(game.id));
    }
    if !game.is_winner(caller) {
        return Err(EngineError::NotWinner {
            game: game.id,
            player: caller.clone(),
        });
    }

    match game.kind {
        GameKind::StakedPot => {
            if game.balance == 0 {
                return Err(EngineError::AlreadyWithdrawn(game.id));
            }
            // Mutate-then-transfer: zero the escrow before the payout exists.
            let amount = game.balance;
            game.balance = 0;
            ledger.debit(game.id, amount)?;
            Ok(Payout::Funds { amount })
        }
        GameKind::PrizeCustody => {
            let prize = game
                .prize
                .clone()
                .ok_or(EngineError::AlreadyWithdrawn(game.id))?;
            if !ledger.holds_prize(&prize, game.id) {
                return Err(EngineError::AlreadyWithdrawn(game.id));
            }
            ledger.release_prize(&prize, game.id, caller)?;
            Ok(Payout::Prize { prize })
        }
    }
}
