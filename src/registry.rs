//! Game records and their lifecycle: creation, enrollment, closing, starting.

use crate::correlator::Correlator;
use crate::errors::{EngineError, EngineResult};
use crate::ledger::Ledger;
use crate::types::{unix_now, Amount, Game, GameId, GameKind, GameStatus, PlayerId, PrizeRef, RequestId};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

/// Owns every game record and the participant index. Lives behind the
/// engine's write lock; the id counter is atomic so allocation follows the
/// same discipline as every other counter in the crate.
pub struct Registry {
    games: HashMap<GameId, Game>,
    /// player -> games joined, in enrollment order. Lookup only, not
    /// authoritative state.
    by_player: HashMap<PlayerId, Vec<GameId>>,
    next_id: AtomicU64,
}

impl Registry {
    pub fn new() -> Self {
        Self {
            games: HashMap::new(),
            by_player: HashMap::new(),
            next_id: AtomicU64::new(1),
        }
    }

    fn allocate_id(&self) -> GameId {
        GameId(self.next_id.fetch_add(1, Ordering::SeqCst))
    }

    /// Create a StakedPot game. The creator is auto-enrolled as member 0 with
    /// their stake escrowed.
    pub fn create_staked(
        &mut self,
        owner: &PlayerId,
        max_members: u32,
        description: String,
        stake: Amount,
        ledger: &mut Ledger,
    ) -> EngineResult<GameId> {
        if max_members < 2 {
            return Err(EngineError::InvalidCapacity(max_members));
        }

        let id = self.allocate_id();
        let game = Game {
            id,
            kind: GameKind::StakedPot,
            status: GameStatus::Open,
            owner: owner.clone(),
            description,
            max_members,
            required_stake: stake,
            members: vec![owner.clone()],
            winners: Vec::new(),
            balance: stake,
            prize: None,
            solution: None,
            random_request: None,
            created_at: unix_now(),
        };
        ledger.credit(id, stake)?;
        self.games.insert(id, game);
        self.by_player.entry(owner.clone()).or_default().push(id);
        Ok(id)
    }

    /// Create a PrizeCustody game, taking custody of the prize atomically
    /// with record creation. The creator is NOT auto-enrolled.
    pub fn create_prize(
        &mut self,
        owner: &PlayerId,
        prize: PrizeRef,
        max_members: u32,
        description: String,
        ledger: &mut Ledger,
    ) -> EngineResult<GameId> {
        if max_members < 2 {
            return Err(EngineError::InvalidCapacity(max_members));
        }

        // Authorization is checked before an id is allocated so a rejected
        // creation does not advance the counter.
        if !ledger.is_authorized(owner, &prize) {
            return Err(EngineError::PrizeNotAuthorized(prize));
        }

        let id = self.allocate_id();
        ledger.take_custody(owner, &prize, id)?;

        let game = Game {
            id,
            kind: GameKind::PrizeCustody,
            status: GameStatus::Open,
            owner: owner.clone(),
            description,
            max_members,
            required_stake: 0,
            members: Vec::new(),
            winners: Vec::new(),
            balance: 0,
            prize: Some(prize),
            solution: None,
            random_request: None,
            created_at: unix_now(),
        };
        self.games.insert(id, game);
        Ok(id)
    }

    /// Enroll `caller` into an open game, escrowing the required stake.
    pub fn enroll(
        &mut self,
        caller: &PlayerId,
        id: GameId,
        stake: Amount,
        ledger: &mut Ledger,
    ) -> EngineResult<()> {
        let game = self.game_mut(id)?;
        if game.status != GameStatus::Open {
            return Err(EngineError::GameNotOpen(id));
        }
        if game.is_member(caller) {
            return Err(EngineError::AlreadyEnrolled {
                game: id,
                player: caller.clone(),
            });
        }
        if game.is_full() {
            return Err(EngineError::CapacityReached(id));
        }
        if stake != game.required_stake {
            return Err(EngineError::WrongStakeAmount {
                game: id,
                required: game.required_stake,
                got: stake,
            });
        }

        // Validate the arithmetic before touching any state so a rejected
        // enrollment leaves the record and the escrow untouched.
        let new_balance = game
            .balance
            .checked_add(stake)
            .ok_or(EngineError::EscrowOverflow {
                game: id,
                amount: stake,
            })?;
        ledger.credit(id, stake)?;
        game.members.push(caller.clone());
        game.balance = new_balance;
        self.by_player.entry(caller.clone()).or_default().push(id);
        Ok(())
    }

    /// Close enrollment. Owner-gated; never driven by reaching capacity.
    pub fn close(&mut self, caller: &PlayerId, id: GameId) -> EngineResult<()> {
        let game = self.game_mut(id)?;
        if game.owner != *caller {
            return Err(EngineError::NotOwner {
                game: id,
                player: caller.clone(),
            });
        }
        if game.status != GameStatus::Open {
            return Err(EngineError::GameNotOpen(id));
        }
        game.status = GameStatus::Closed;
        Ok(())
    }

    /// Move a closed game into RESOLVING and issue its randomness request.
    /// A game with nobody enrolled is rejected up front instead of being
    /// allowed to strand in RESOLVING with no selectable winner.
    pub fn start(
        &mut self,
        caller: &PlayerId,
        id: GameId,
        correlator: &Correlator,
    ) -> EngineResult<RequestId> {
        let game = self.game_mut(id)?;
        if game.owner != *caller {
            return Err(EngineError::NotOwner {
                game: id,
                player: caller.clone(),
            });
        }
        if game.status != GameStatus::Closed {
            return Err(EngineError::GameNotClosed(id));
        }
        if game.members.is_empty() {
            return Err(EngineError::NoParticipants(id));
        }

        let request = correlator.request_randomness(id);
        game.status = GameStatus::Resolving;
        game.random_request = Some(request);
        Ok(request)
    }

    pub fn game(&self, id: GameId) -> EngineResult<&Game> {
        self.games.get(&id).ok_or(EngineError::UnknownGame(id))
    }

    pub fn game_mut(&mut self, id: GameId) -> EngineResult<&mut Game> {
        self.games.get_mut(&id).ok_or(EngineError::UnknownGame(id))
    }

    pub fn games_of(&self, player: &PlayerId) -> Vec<GameId> {
        self.by_player.get(player).cloned().unwrap_or_default()
    }

    pub fn game_count(&self) -> usize {
        self.games.len()
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}
