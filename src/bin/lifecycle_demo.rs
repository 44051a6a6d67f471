//! Drives a complete staked-pot lifecycle against an in-process VRF oracle
//! and prints the resulting record.

use clap::Parser;
use tracing_subscriber::EnvFilter;
use wagerpool::{Amount, Engine, EngineConfig, PlayerId};

#[derive(Parser, Debug)]
#[command(name = "lifecycle-demo", about = "Run one wager lifecycle end to end")]
struct Args {
    /// Number of enrolled players (including the creator)
    #[arg(long, default_value_t = 4)]
    players: u32,

    /// Per-player stake in base units
    #[arg(long, default_value_t = 1_000_000_000)]
    stake: Amount,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let args = Args::parse();
    if args.players < 2 {
        return Err("need at least two players".into());
    }

    let (engine, oracle) = Engine::with_vrf_oracle(EngineConfig::default())?;

    let owner = PlayerId::from("player-0");
    let game = engine.create_staked_game(&owner, args.players, "demo pot", args.stake)?;
    for i in 1..args.players {
        engine.enroll(&PlayerId::new(format!("player-{}", i)), game, args.stake)?;
    }

    engine.close(&owner, game)?;
    let request = engine.start(&owner, game)?;

    // The oracle answers out-of-band; here we push the fulfillment directly.
    let random_value = oracle.fulfill(&engine, request)?;
    tracing::info!(random_value, "oracle fulfillment delivered");

    let winner = engine.winners(game)?.remove(0);
    let payout = engine.withdraw(&winner, game)?;
    tracing::info!(%winner, ?payout, "winner settled");

    println!("{}", serde_json::to_string_pretty(&engine.view_game(game)?)?);
    Ok(())
}
