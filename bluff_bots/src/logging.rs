//! Structured logging for the host binary.
//!
//! The library logs through the `log` facade; the subscriber installed here
//! picks those records up alongside native `tracing` events.

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Install the global subscriber. Levels come from `RUST_LOG`, falling back
/// to `default_filter`.
pub fn init(default_filter: &str) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_thread_ids(false)
        .with_line_number(true);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .init();

    tracing::debug!("Structured logging initialized");
}

/// Log how a finished game went.
pub fn log_game_summary(session: &str, loser: Option<&str>, elapsed_ms: u64) {
    match loser {
        Some(loser) => tracing::info!(
            session = session,
            loser = loser,
            elapsed_ms = elapsed_ms,
            "Game over"
        ),
        None => tracing::warn!(
            session = session,
            elapsed_ms = elapsed_ms,
            "Game ended without a loser"
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_game_summary() {
        // Just ensure it doesn't panic without a subscriber
        log_game_summary("Bluff", Some("alice"), 1200);
        log_game_summary("Bluff", None, 30_000);
    }
}
