//! Escrow accounting: the aggregate custody balance plus prize custody.
//!
//! Every enrollment credit must be matched by at most one debit per game;
//! the settlement path enforces that by zeroing the game balance before the
//! debit becomes externally observable. The ledger itself only guards the
//! arithmetic invariants (no underflow, no overflow).

use crate::errors::{EngineError, EngineResult};
use crate::types::{Amount, GameId, PlayerId, PrizeRef};
use std::collections::HashMap;

/// Aggregate custody balance and the prize vault.
#[derive(Debug, Default)]
pub struct Ledger {
    held: Amount,
    vault: PrizeVault,
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total fungible value currently escrowed across all games.
    pub fn held(&self) -> Amount {
        self.held
    }

    /// Credit escrow for a game (enrollment / staked creation). Rejects a
    /// credit that would overflow the aggregate balance without mutating.
    pub fn credit(&mut self, game: GameId, amount: Amount) -> EngineResult<()> {
        self.held = self
            .held
            .checked_add(amount)
            .ok_or(EngineError::EscrowOverflow { game, amount })?;
        tracing::debug!(game = %game, amount, held = self.held, "credited escrow");
        Ok(())
    }

    /// Debit escrow on settlement. `InsufficientCustody` signals an internal
    /// invariant breach and is unreachable through the public engine API.
    pub fn debit(&mut self, game: GameId, amount: Amount) -> EngineResult<()> {
        self.held = self
            .held
            .checked_sub(amount)
            .ok_or(EngineError::InsufficientCustody {
                tried: amount,
                held: self.held,
            })?;
        tracing::debug!(game = %game, amount, held = self.held, "debited escrow");
        Ok(())
    }

    /// Record that `owner` authorizes the engine to take custody of `prize`.
    /// The pre-authorization analog of an ERC-721 approve.
    pub fn authorize_prize(&mut self, owner: &PlayerId, prize: &PrizeRef) {
        self.vault
            .approvals
            .insert(prize.clone(), owner.clone());
        tracing::debug!(owner = %owner, prize = %prize, "prize custody authorized");
    }

    /// Whether `owner` currently authorizes the engine to take custody of
    /// `prize`.
    pub fn is_authorized(&self, owner: &PlayerId, prize: &PrizeRef) -> bool {
        self.vault.approvals.get(prize) == Some(owner)
    }

    /// Consume the authorization and take custody for `game`, atomically with
    /// record creation from the caller's perspective.
    pub fn take_custody(
        &mut self,
        owner: &PlayerId,
        prize: &PrizeRef,
        game: GameId,
    ) -> EngineResult<()> {
        match self.vault.approvals.get(prize) {
            Some(approved) if approved == owner => {
                self.vault.approvals.remove(prize);
                self.vault.holdings.insert(prize.clone(), game);
                tracing::debug!(game = %game, prize = %prize, "prize custody taken");
                Ok(())
            }
            _ => Err(EngineError::PrizeNotAuthorized(prize.clone())),
        }
    }

    /// Whether the vault still holds `prize` on behalf of `game`.
    pub fn holds_prize(&self, prize: &PrizeRef, game: GameId) -> bool {
        self.vault.holdings.get(prize) == Some(&game)
    }

    /// Release custody to the winner. One-shot: the holding entry is removed
    /// before any transfer effect is visible to the caller.
    pub fn release_prize(
        &mut self,
        prize: &PrizeRef,
        game: GameId,
        to: &PlayerId,
    ) -> EngineResult<()> {
        if self.vault.holdings.get(prize) != Some(&game) {
            return Err(EngineError::AlreadyWithdrawn(game));
        }
        self.vault.holdings.remove(prize);
        tracing::debug!(game = %game, prize = %prize, winner = %to, "prize custody released");
        Ok(())
    }
}

#[derive(Debug, Default)]
struct PrizeVault {
    /// prize -> owner who pre-authorized custody
    approvals: HashMap<PrizeRef, PlayerId>,
    /// prize -> game it is escrowed for
    holdings: HashMap<PrizeRef, GameId>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_credit_debit_round_trip() {
        let mut ledger = Ledger::new();
        ledger.credit(GameId(1), 500).unwrap();
        ledger.credit(GameId(2), 250).unwrap();
        assert_eq!(ledger.held(), 750);

        ledger.debit(GameId(1), 500).unwrap();
        assert_eq!(ledger.held(), 250);
    }

    #[test]
    fn test_credit_overflow_rejected() {
        let mut ledger = Ledger::new();
        ledger.credit(GameId(1), Amount::MAX).unwrap();

        let err = ledger.credit(GameId(2), 1).unwrap_err();
        assert_eq!(
            err,
            EngineError::EscrowOverflow {
                game: GameId(2),
                amount: 1
            }
        );
        // Failed credit leaves the balance untouched.
        assert_eq!(ledger.held(), Amount::MAX);
    }

    #[test]
    fn test_debit_underflow_rejected() {
        let mut ledger = Ledger::new();
        ledger.credit(GameId(1), 100).unwrap();
        let err = ledger.debit(GameId(1), 101).unwrap_err();
        assert_eq!(
            err,
            EngineError::InsufficientCustody {
                tried: 101,
                held: 100
            }
        );
        // Failed debit leaves the balance untouched.
        assert_eq!(ledger.held(), 100);
    }

    #[test]
    fn test_custody_requires_authorization() {
        let mut ledger = Ledger::new();
        let alice = PlayerId::from("alice");
        let prize = PrizeRef::new("apes", 7);

        let err = ledger.take_custody(&alice, &prize, GameId(1)).unwrap_err();
        assert_eq!(err, EngineError::PrizeNotAuthorized(prize.clone()));

        ledger.authorize_prize(&alice, &prize);
        ledger.take_custody(&alice, &prize, GameId(1)).unwrap();
        assert!(ledger.holds_prize(&prize, GameId(1)));
    }

    #[test]
    fn test_authorization_is_owner_bound() {
        let mut ledger = Ledger::new();
        let alice = PlayerId::from("alice");
        let mallory = PlayerId::from("mallory");
        let prize = PrizeRef::new("apes", 7);

        ledger.authorize_prize(&alice, &prize);
        let err = ledger
            .take_custody(&mallory, &prize, GameId(1))
            .unwrap_err();
        assert_eq!(err, EngineError::PrizeNotAuthorized(prize));
    }

    #[test]
    fn test_prize_release_is_one_shot() {
        let mut ledger = Ledger::new();
        let alice = PlayerId::from("alice");
        let bob = PlayerId::from("bob");
        let prize = PrizeRef::new("apes", 7);

        ledger.authorize_prize(&alice, &prize);
        ledger.take_custody(&alice, &prize, GameId(1)).unwrap();

        ledger.release_prize(&prize, GameId(1), &bob).unwrap();
        let err = ledger.release_prize(&prize, GameId(1), &bob).unwrap_err();
        assert_eq!(err, EngineError::AlreadyWithdrawn(GameId(1)));
    }
}
