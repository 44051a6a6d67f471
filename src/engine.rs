//! Engine facade: the single entry point owning the serialized state store.
//!
//! Every operation takes one write lock spanning its whole read-modify-write,
//! which gives the one-operation-at-a-time semantics the state machine
//! assumes. The only concurrency past that boundary is the randomness
//! correlator, which the oracle's fulfillment path touches without the lock.

use crate::config::{ConfigValidationError, EngineConfig};
use crate::correlator::Correlator;
use crate::errors::{EngineError, EngineResult};
use crate::events::{EngineEvent, EventBus};
use crate::ledger::Ledger;
use crate::oracle::{RandomnessSource, VrfOracle};
use crate::registry::Registry;
use crate::resolver;
use crate::settlement;
use crate::types::{Amount, Game, GameId, GameStatus, Payout, PlayerId, PrizeRef, RequestId};
use std::sync::{Arc, RwLock};
use tokio::sync::broadcast;

struct CoreState {
    registry: Registry,
    ledger: Ledger,
}

/// The wagering engine.
pub struct Engine {
    config: EngineConfig,
    state: RwLock<CoreState>,
    correlator: Correlator,
    events: EventBus,
}

impl Engine {
    /// Build an engine from a validated config. Rejecting a bad config here
    /// means no later path has to second-guess its values.
    pub fn new(
        config: EngineConfig,
        oracle: Arc<dyn RandomnessSource>,
    ) -> Result<Self, ConfigValidationError> {
        config.validate()?;
        let events = EventBus::new(config.events.buffer_capacity);
        Ok(Self {
            config,
            state: RwLock::new(CoreState {
                registry: Registry::new(),
                ledger: Ledger::new(),
            }),
            correlator: Correlator::new(oracle),
            events,
        })
    }

    /// Convenience constructor wiring a fresh in-process VRF oracle as the
    /// designated fulfillment identity.
    pub fn with_vrf_oracle(
        mut config: EngineConfig,
    ) -> Result<(Arc<Self>, Arc<VrfOracle>), ConfigValidationError> {
        let oracle = Arc::new(VrfOracle::new_random());
        config.oracle_identity = oracle.identity().clone();
        Ok((Arc::new(Self::new(config, oracle.clone())?), oracle))
    }

    fn write_state(&self) -> std::sync::RwLockWriteGuard<'_, CoreState> {
        self.state.write().expect("engine state lock poisoned")
    }

    fn read_state(&self) -> std::sync::RwLockReadGuard<'_, CoreState> {
        self.state.read().expect("engine state lock poisoned")
    }

    fn clamp_description(&self, description: &str) -> String {
        let limit = self.config.limits.max_description_bytes;
        if description.len() <= limit {
            return description.to_string();
        }
        // Trim on a char boundary at or below the byte limit.
        let mut cut = limit;
        while cut > 0 && !description.is_char_boundary(cut) {
            cut -= 1;
        }
        description[..cut].to_string()
    }

    fn check_capacity(&self, max_members: u32) -> EngineResult<()> {
        if max_members < 2 || max_members > self.config.limits.max_members_ceiling {
            return Err(EngineError::InvalidCapacity(max_members));
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Registry operations
    // ------------------------------------------------------------------

    pub fn create_staked_game(
        &self,
        owner: &PlayerId,
        max_members: u32,
        description: &str,
        stake: Amount,
    ) -> EngineResult<GameId> {
        self.check_capacity(max_members)?;
        let description = self.clamp_description(description);

        let id = {
            let mut state = self.write_state();
            let CoreState { registry, ledger } = &mut *state;
            registry.create_staked(owner, max_members, description, stake, ledger)?
        };

        tracing::info!(game = %id, owner = %owner, max_members, stake, "staked game created");
        self.events.publish(EngineEvent::GameCreated {
            game: id,
            owner: owner.clone(),
            kind: crate::types::GameKind::StakedPot,
        });
        Ok(id)
    }

    pub fn create_prize_game(
        &self,
        owner: &PlayerId,
        prize: PrizeRef,
        max_members: u32,
        description: &str,
    ) -> EngineResult<GameId> {
        self.check_capacity(max_members)?;
        let description = self.clamp_description(description);

        let id = {
            let mut state = self.write_state();
            let CoreState { registry, ledger } = &mut *state;
            registry.create_prize(owner, prize, max_members, description, ledger)?
        };

        tracing::info!(game = %id, owner = %owner, max_members, "prize game created");
        self.events.publish(EngineEvent::GameCreated {
            game: id,
            owner: owner.clone(),
            kind: crate::types::GameKind::PrizeCustody,
        });
        Ok(id)
    }

    /// Pre-authorize the engine to take custody of `prize`. Must precede
    /// `create_prize_game` for that prize.
    pub fn authorize_prize(&self, owner: &PlayerId, prize: &PrizeRef) {
        self.write_state().ledger.authorize_prize(owner, prize);
    }

    pub fn enroll(&self, caller: &PlayerId, game: GameId, stake: Amount) -> EngineResult<()> {
        {
            let mut state = self.write_state();
            let CoreState { registry, ledger } = &mut *state;
            registry.enroll(caller, game, stake, ledger)?;
        }

        tracing::info!(game = %game, player = %caller, stake, "player enrolled");
        self.events.publish(EngineEvent::Enrolled {
            game,
            player: caller.clone(),
            stake,
        });
        Ok(())
    }

    pub fn close(&self, caller: &PlayerId, game: GameId) -> EngineResult<()> {
        self.write_state().registry.close(caller, game)?;

        tracing::info!(game = %game, "enrollment closed");
        self.events.publish(EngineEvent::Closed { game });
        Ok(())
    }

    /// Commit the game to RESOLVING and issue its randomness request. There
    /// is no cancellation; the only way out is a fulfillment.
    pub fn start(&self, caller: &PlayerId, game: GameId) -> EngineResult<RequestId> {
        let request = self
            .write_state()
            .registry
            .start(caller, game, &self.correlator)?;

        tracing::info!(game = %game, request = %request, "game started, awaiting randomness");
        self.events.publish(EngineEvent::Started { game, request });
        Ok(request)
    }

    // ------------------------------------------------------------------
    // Oracle boundary (inbound)
    // ------------------------------------------------------------------

    /// Inbound fulfillment callback. Only the configured oracle identity may
    /// deliver; duplicate or unknown request ids are consumed idempotently
    /// (logged, no state change). A `NoParticipants` failure leaves the game
    /// stuck in RESOLVING, an accepted terminal failure mode.
    pub fn on_randomness(
        &self,
        caller: &PlayerId,
        request: RequestId,
        random_value: u64,
    ) -> EngineResult<()> {
        if *caller != self.config.oracle_identity {
            tracing::warn!(caller = %caller, request = %request, "fulfillment from unauthorized caller");
            return Err(EngineError::OracleNotAuthorized(caller.clone()));
        }

        let Some(game_id) = self.correlator.take(request) else {
            tracing::warn!(request = %request, "unknown or already consumed randomness request");
            return Err(EngineError::UnknownRequest(request));
        };

        let (winner, solution) = {
            let mut state = self.write_state();
            let game = state.registry.game_mut(game_id)?;
            let winner = resolver::resolve(game, random_value).map_err(|err| {
                tracing::error!(game = %game_id, request = %request, %err, "resolution failed");
                err
            })?;
            (winner, game.solution.unwrap_or_default())
        };

        tracing::info!(game = %game_id, winner = %winner, solution, "winner resolved");
        self.events.publish(EngineEvent::Finished {
            game: game_id,
            winner,
            solution,
        });
        Ok(())
    }

    // ------------------------------------------------------------------
    // Settlement
    // ------------------------------------------------------------------

    pub fn withdraw(&self, caller: &PlayerId, game: GameId) -> EngineResult<Payout> {
        let payout = {
            let mut state = self.write_state();
            let CoreState { registry, ledger } = &mut *state;
            let game = registry.game_mut(game)?;
            settlement::withdraw(game, ledger, caller)?
        };

        tracing::info!(game = %game, winner = %caller, payout = ?payout, "settled");
        self.events.publish(EngineEvent::Withdrawn {
            game,
            winner: caller.clone(),
            payout: payout.clone(),
        });
        Ok(payout)
    }

    // ------------------------------------------------------------------
    // Read-only queries
    // ------------------------------------------------------------------

    pub fn status(&self, game: GameId) -> EngineResult<GameStatus> {
        Ok(self.read_state().registry.game(game)?.status)
    }

    pub fn members_count(&self, game: GameId) -> EngineResult<usize> {
        Ok(self.read_state().registry.game(game)?.members.len())
    }

    pub fn winners(&self, game: GameId) -> EngineResult<Vec<PlayerId>> {
        Ok(self.read_state().registry.game(game)?.winners.clone())
    }

    pub fn balance(&self, game: GameId) -> EngineResult<Amount> {
        Ok(self.read_state().registry.game(game)?.balance)
    }

    /// Full record snapshot.
    pub fn view_game(&self, game: GameId) -> EngineResult<Game> {
        Ok(self.read_state().registry.game(game)?.clone())
    }

    pub fn games_of(&self, player: &PlayerId) -> Vec<GameId> {
        self.read_state().registry.games_of(player)
    }

    /// Aggregate custody balance across all games.
    pub fn custody_held(&self) -> Amount {
        self.read_state().ledger.held()
    }

    pub fn pending_requests(&self) -> usize {
        self.correlator.pending_count()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<EngineEvent> {
        self.events.subscribe()
    }

    /// Ordered snapshot of every event emitted so far.
    pub fn events(&self) -> Vec<EngineEvent> {
        self.events.journal()
    }
}
