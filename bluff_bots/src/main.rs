//! Hosts a Bluff session and fills every seat with a bot.
//!
//! The session authority runs as its own task; each bot keeps a replica
//! fed by the authority's broadcasts and acts through its seat.

mod config;
mod logging;

use std::time::Instant;

use anyhow::{Context, Error};
use bluff::{bot::BotManager, session::SessionAuthority};
use ctrlc::set_handler;
use pico_args::Arguments;

use config::{HostConfig, Overrides};

const HELP: &str = "\
Host a Bluff game played by bots

USAGE:
  bluff_bots [OPTIONS]

OPTIONS:
  --players      N        Bots to seat, 2 to 6           [default: env BLUFF_PLAYERS or 4]
  --deck         MODE     auto, full or short            [default: env BLUFF_DECK or auto]
  --seed         N        Seed for deals and bot choices [default: random]
  --temperament  KIND     cautious, standard or reckless [default: env BLUFF_TEMPERAMENT or standard]

FLAGS:
  --paced                 Bots pause before acting
  -h, --help              Print help information

ENVIRONMENT:
  BLUFF_SESSION_NAME      Session name used in logs
  BLUFF_INDEX_WAIT_MS     How long a replica waits for its seat index
  BLUFF_CHANNEL_CAPACITY  Broadcast channel capacity per participant
  BLUFF_GAME_TIMEOUT_SECS Stop the bots after this long
  RUST_LOG                Log filter (e.g., bluff=debug)
";

fn parse_args() -> Result<Overrides, Error> {
    let mut pargs = Arguments::from_env();

    // Help has a higher priority and should be handled separately.
    if pargs.contains(["-h", "--help"]) {
        print!("{HELP}");
        std::process::exit(0);
    }

    let overrides = Overrides {
        players: pargs.opt_value_from_str("--players")?,
        deck: pargs.opt_value_from_str("--deck")?,
        seed: pargs.opt_value_from_str("--seed")?,
        temperament: pargs.opt_value_from_str("--temperament")?,
        paced: pargs.contains("--paced"),
    };

    let remaining = pargs.finish();
    if !remaining.is_empty() {
        anyhow::bail!("unexpected arguments: {remaining:?}");
    }
    Ok(overrides)
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    // Load .env file if it exists
    let _ = dotenvy::dotenv();

    let overrides = parse_args()?;

    // Catching signals for exit.
    set_handler(|| std::process::exit(0))?;

    logging::init("info");

    let mut config = HostConfig::from_env(overrides).context("loading configuration")?;
    config.validate()?;

    // Always run seeded so a surprising game can be replayed.
    let seed = *config.session.seed.get_or_insert_with(rand::random);
    tracing::info!(
        session = %config.session.name,
        players = config.bots.count,
        deck = %config.session.deck,
        temperament = %config.bots.temperament,
        seed = seed,
        "Starting session"
    );

    let (authority, handle) = SessionAuthority::new(config.session.clone());
    let authority = tokio::spawn(authority.run());

    let mut bots = BotManager::new(handle.clone(), config.bots.temperament)
        .with_seed(seed)
        .paced(config.bots.paced);
    bots.spawn_bots(config.bots.count)
        .await
        .context("seating bots")?;
    tracing::debug!(bots = bots.bot_count(), "All bots seated");

    let started = Instant::now();
    let outcomes = match tokio::time::timeout(config.game_timeout, bots.wait_all()).await {
        Ok(outcomes) => outcomes,
        Err(_) => {
            tracing::error!(
                timeout_secs = config.game_timeout.as_secs(),
                "Game did not finish in time, stopping bots"
            );
            bots.abort_all();
            Vec::new()
        }
    };
    let elapsed_ms = started.elapsed().as_millis() as u64;

    let mut loser = None;
    for outcome in outcomes {
        match outcome {
            Ok(outcome) => {
                tracing::info!(
                    participant = outcome.participant,
                    lost = outcome.lost,
                    bets = outcome.stats.bets_placed,
                    lies = outcome.stats.lies_told,
                    challenges = outcome.stats.challenges(),
                    rejected = outcome.stats.rejected,
                    "Bot finished"
                );
                if loser.is_none() {
                    loser = outcome.loser;
                }
            }
            Err(error) => tracing::error!("Bot failed: {error}"),
        }
    }
    logging::log_game_summary(&config.session.name, loser.as_deref(), elapsed_ms);

    if let Ok(state) = handle.snapshot().await {
        tracing::debug!(
            cards = state.total_cards(),
            conserved = state.is_conserved(),
            "Final table"
        );
    }

    // The authority may already be gone if every handle dropped.
    let _ = handle.close().await;
    drop(handle);
    drop(bots);
    authority.await.context("session authority panicked")?;

    Ok(())
}
