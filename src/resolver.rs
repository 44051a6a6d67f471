//! Winner selection: maps a fulfilled random value onto the enrolled member
//! list and applies the terminal state transition.
//!
//! Selection is a uniform remainder over enrollment order; stake size never
//! biases it. This is the single point where "who wins" is decided.

use crate::errors::{EngineError, EngineResult};
use crate::types::{Game, GameStatus, PlayerId};

/// Selector index for `random_value` over a member list of `len` entries.
/// Callers must guard `len == 0` first.
pub fn select_index(random_value: u64, len: usize) -> u64 {
    random_value % len as u64
}

/// Resolve `game` with the oracle's random value: record the solution, pick
/// exactly one winner, and finish the game.
pub fn resolve(game: &mut Game, random_value: u64) -> EngineResult<PlayerId> {
    // Defensive: the correlator's single-use consumption should make any
    // other status unreachable.
    if game.status != GameStatus::Resolving {
        return Err(EngineError::GameNotResolving(game.id));
    }
    if game.members.is_empty() {
        return Err(EngineError::NoParticipants(game.id));
    }

    let solution = select_index(random_value, game.members.len());
    let winner = game.members[solution as usize].clone();

    game.solution = Some(solution);
    game.winners = vec![winner.clone()];
    game.status = GameStatus::Finished;
    Ok(winner)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{unix_now, Game, GameId, GameKind};
    use rand::Rng;

    fn resolving_game(members: &[&str]) -> Game {
        Game {
            id: GameId(1),
            kind: GameKind::StakedPot,
            status: GameStatus::Resolving,
            owner: PlayerId::from(members.first().copied().unwrap_or("alice")),
            description: "test".to_string(),
            max_members: members.len().max(2) as u32,
            required_stake: 100,
            members: members.iter().map(|m| PlayerId::from(*m)).collect(),
            winners: Vec::new(),
            balance: 100 * members.len() as u64,
            prize: None,
            solution: None,
            random_request: None,
            created_at: unix_now(),
        }
    }

    #[test]
    fn test_resolve_picks_member_at_remainder() {
        let mut game = resolving_game(&["alice", "bob", "carol"]);
        let winner = resolve(&mut game, 7).unwrap();

        // 7 % 3 == 1
        assert_eq!(winner, PlayerId::from("bob"));
        assert_eq!(game.solution, Some(1));
        assert_eq!(game.winners, vec![winner]);
        assert_eq!(game.status, GameStatus::Finished);
    }

    #[test]
    fn test_resolve_requires_resolving_status() {
        let mut game = resolving_game(&["alice", "bob"]);
        game.status = GameStatus::Closed;
        assert_eq!(
            resolve(&mut game, 1).unwrap_err(),
            EngineError::GameNotResolving(game.id)
        );
        assert!(game.winners.is_empty());
    }

    #[test]
    fn test_resolve_guards_empty_member_list() {
        let mut game = resolving_game(&[]);
        game.members.clear();
        assert_eq!(
            resolve(&mut game, 42).unwrap_err(),
            EngineError::NoParticipants(game.id)
        );
        // Aborted resolution advances nothing.
        assert_eq!(game.status, GameStatus::Resolving);
        assert_eq!(game.solution, None);
    }

    #[test]
    fn test_selection_always_lands_in_bounds() {
        let mut rng = rand::thread_rng();
        for _ in 0..1000 {
            let len = rng.gen_range(1..=64usize);
            let value: u64 = rng.gen();
            assert!(select_index(value, len) < len as u64);
        }
    }

    #[test]
    fn test_every_member_is_reachable() {
        let members = ["alice", "bob", "carol", "dave"];
        let mut hit = [false; 4];
        for value in 0..4u64 {
            let mut game = resolving_game(&members);
            let winner = resolve(&mut game, value).unwrap();
            let idx = members
                .iter()
                .position(|m| PlayerId::from(*m) == winner)
                .unwrap();
            hit[idx] = true;
        }
        assert!(hit.iter().all(|&h| h));
    }
}
