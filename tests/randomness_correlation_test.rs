//! The asynchronous half: correlating oracle fulfillments back to games,
//! idempotent consumption under duplicate delivery, and oracle authentication.

use std::sync::Arc;
use wagerpool::{
    Amount, Engine, EngineConfig, EngineError, EngineEvent, GameId, GameStatus, PlayerId,
    RandomnessSource, RequestId, VrfOracle,
};

const STAKE: Amount = 1_000_000_000;

fn two_player_resolving(engine: &Engine) -> (GameId, RequestId) {
    let alice = PlayerId::from("alice");
    let bob = PlayerId::from("bob");
    let game = engine
        .create_staked_game(&alice, 2, "heads-up", STAKE)
        .unwrap();
    engine.enroll(&bob, game, STAKE).unwrap();
    engine.close(&alice, game).unwrap();
    let request = engine.start(&alice, game).unwrap();
    (game, request)
}

#[test]
fn test_duplicate_fulfillment_finishes_once() {
    let (engine, oracle) = Engine::with_vrf_oracle(EngineConfig::default()).unwrap();
    let (game, request) = two_player_resolving(&engine);

    oracle.fulfill(&engine, request).unwrap();
    assert_eq!(engine.status(game).unwrap(), GameStatus::Finished);
    let winners = engine.winners(game).unwrap();

    // Second delivery for the same request id: consumed correlation, no
    // state change, no second finish event.
    let err = oracle.fulfill(&engine, request).unwrap_err();
    assert_eq!(err, EngineError::UnknownRequest(request));
    assert_eq!(engine.winners(game).unwrap(), winners);

    let finishes = engine
        .events()
        .into_iter()
        .filter(|e| matches!(e, EngineEvent::Finished { .. }))
        .count();
    assert_eq!(finishes, 1);
}

#[test]
fn test_spurious_fulfillment_ignored() {
    let (engine, oracle) = Engine::with_vrf_oracle(EngineConfig::default()).unwrap();
    let (game, _request) = two_player_resolving(&engine);

    let bogus = RequestId(9_999);
    let err = oracle.fulfill(&engine, bogus).unwrap_err();
    assert_eq!(err, EngineError::UnknownRequest(bogus));

    // The real request is still outstanding.
    assert_eq!(engine.pending_requests(), 1);
    assert_eq!(engine.status(game).unwrap(), GameStatus::Resolving);
}

#[test]
fn test_fulfillments_interleave_across_games() {
    let (engine, oracle) = Engine::with_vrf_oracle(EngineConfig::default()).unwrap();

    let (first_game, first_req) = two_player_resolving(&engine);
    let carol = PlayerId::from("carol");
    let dave = PlayerId::from("dave");
    let second_game = engine
        .create_staked_game(&carol, 2, "second pot", STAKE)
        .unwrap();
    engine.enroll(&dave, second_game, STAKE).unwrap();
    engine.close(&carol, second_game).unwrap();
    let second_req = engine.start(&carol, second_game).unwrap();

    assert_ne!(first_req, second_req);
    assert_eq!(engine.pending_requests(), 2);

    // Answer in reverse order; each fulfillment lands on its own game.
    oracle.fulfill(&engine, second_req).unwrap();
    assert_eq!(engine.status(second_game).unwrap(), GameStatus::Finished);
    assert_eq!(engine.status(first_game).unwrap(), GameStatus::Resolving);

    oracle.fulfill(&engine, first_req).unwrap();
    assert_eq!(engine.status(first_game).unwrap(), GameStatus::Finished);
    assert_eq!(engine.pending_requests(), 0);
}

#[test]
fn test_fulfillment_from_foreign_oracle_rejected() {
    let (engine, _oracle) = Engine::with_vrf_oracle(EngineConfig::default()).unwrap();
    let (game, request) = two_player_resolving(&engine);

    // A different oracle instance has a different identity.
    let impostor = VrfOracle::new_random();
    let err = impostor.fulfill(&engine, request).unwrap_err();
    assert!(matches!(err, EngineError::OracleNotAuthorized(_)));

    assert_eq!(engine.status(game).unwrap(), GameStatus::Resolving);
    assert_eq!(engine.pending_requests(), 1);
}

#[test]
fn test_winner_is_random_value_remainder() {
    // Drive the fulfillment by hand to pin the selection rule.
    let oracle = Arc::new(VrfOracle::new_random());
    let mut config = EngineConfig::default();
    config.oracle_identity = oracle.identity().clone();
    let engine = Engine::new(config, oracle.clone()).unwrap();

    let members = ["alice", "bob", "carol"];
    for (offset, expected) in members.iter().enumerate() {
        let owner = PlayerId::from("alice");
        let game = engine
            .create_staked_game(&owner, 3, "remainder check", STAKE)
            .unwrap();
        engine.enroll(&PlayerId::from("bob"), game, STAKE).unwrap();
        engine
            .enroll(&PlayerId::from("carol"), game, STAKE)
            .unwrap();
        engine.close(&owner, game).unwrap();
        let request = engine.start(&owner, game).unwrap();

        let random_value = 3 * 1_000 + offset as u64;
        engine
            .on_randomness(oracle.identity(), request, random_value)
            .unwrap();

        let snapshot = engine.view_game(game).unwrap();
        assert_eq!(snapshot.solution, Some(offset as u64));
        assert_eq!(snapshot.winners, vec![PlayerId::from(*expected)]);
    }
}

#[tokio::test]
async fn test_fulfillment_from_spawned_task() {
    // The oracle answers on an independent control path; the engine must
    // correlate it back without any caller waiting synchronously.
    let (engine, oracle) = Engine::with_vrf_oracle(EngineConfig::default()).unwrap();
    let (game, request) = two_player_resolving(&engine);
    let mut events = engine.subscribe();

    let engine_for_oracle = engine.clone();
    let handle = tokio::task::spawn_blocking(move || {
        oracle.fulfill(&engine_for_oracle, request).unwrap();
    });
    handle.await.unwrap();

    loop {
        let event = events.recv().await.unwrap();
        if let EngineEvent::Finished { game: finished, .. } = event {
            assert_eq!(finished, game);
            break;
        }
    }
    assert_eq!(engine.status(game).unwrap(), GameStatus::Finished);
}
