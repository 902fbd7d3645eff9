//! Host configuration management.
//!
//! Consolidates all environment variable reads and provides validated configuration.

use std::time::Duration;

use bluff::{
    bot::BotTemperament,
    game::constants::{MAX_PLAYERS, MIN_PLAYERS},
    session::{DeckMode, SessionConfig},
};

/// Complete host configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct HostConfig {
    /// Session settings handed to the authority
    pub session: SessionConfig,
    /// Bots seated at the session
    pub bots: BotsConfig,
    /// Upper bound on a whole game before bots are stopped
    pub game_timeout: Duration,
}

/// Bot configuration
#[derive(Debug, Clone)]
pub struct BotsConfig {
    pub count: usize,
    pub temperament: BotTemperament,
    /// Whether bots pause before acting
    pub paced: bool,
}

/// Values given on the command line. They win over the environment.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub players: Option<usize>,
    pub deck: Option<DeckMode>,
    pub seed: Option<u64>,
    pub temperament: Option<BotTemperament>,
    pub paced: bool,
}

impl HostConfig {
    /// Load configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns error if a variable is set but cannot be parsed
    pub fn from_env(overrides: Overrides) -> Result<Self, ConfigError> {
        let count = overrides
            .players
            .unwrap_or_else(|| parse_env_or("BLUFF_PLAYERS", 4));

        let deck = match overrides.deck {
            Some(deck) => deck,
            None => parse_env_strict("BLUFF_DECK")?.unwrap_or_default(),
        };

        let temperament = match overrides.temperament {
            Some(temperament) => temperament,
            None => parse_env_strict("BLUFF_TEMPERAMENT")?.unwrap_or_default(),
        };

        let seed = overrides
            .seed
            .or_else(|| std::env::var("BLUFF_SEED").ok().and_then(|v| v.parse().ok()));

        let defaults = SessionConfig::default();
        let session = SessionConfig {
            name: std::env::var("BLUFF_SESSION_NAME").unwrap_or(defaults.name),
            min_players: count,
            max_players: MAX_PLAYERS,
            deck,
            index_wait_ms: parse_env_or("BLUFF_INDEX_WAIT_MS", defaults.index_wait_ms),
            channel_capacity: parse_env_or("BLUFF_CHANNEL_CAPACITY", defaults.channel_capacity),
            seed,
        };

        Ok(HostConfig {
            session,
            bots: BotsConfig {
                count,
                temperament,
                paced: overrides.paced || parse_env_or("BLUFF_PACED", false),
            },
            game_timeout: Duration::from_secs(parse_env_or("BLUFF_GAME_TIMEOUT_SECS", 60)),
        })
    }

    /// Validate configuration after loading
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(MIN_PLAYERS..=MAX_PLAYERS).contains(&self.bots.count) {
            return Err(ConfigError::Invalid {
                var: "BLUFF_PLAYERS".to_string(),
                reason: format!("Must be between {MIN_PLAYERS} and {MAX_PLAYERS}"),
            });
        }

        if self.game_timeout.is_zero() {
            return Err(ConfigError::Invalid {
                var: "BLUFF_GAME_TIMEOUT_SECS".to_string(),
                reason: "Must be greater than 0".to_string(),
            });
        }

        self.session
            .validate()
            .map_err(|reason| ConfigError::Invalid {
                var: "session".to_string(),
                reason,
            })
    }
}

/// Configuration error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid configuration for {var}: {reason}")]
    Invalid { var: String, reason: String },
}

/// Helper to parse environment variable with default fallback
fn parse_env_or<T>(key: &str, default: T) -> T
where
    T: std::str::FromStr,
{
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

/// Unset is fine; set but unparseable is an error.
fn parse_env_strict<T>(key: &str) -> Result<Option<T>, ConfigError>
where
    T: std::str::FromStr<Err = String>,
{
    match std::env::var(key) {
        Ok(value) => value
            .parse()
            .map(Some)
            .map_err(|reason| ConfigError::Invalid {
                var: key.to_string(),
                reason,
            }),
        Err(_) => Ok(None),
    }
}
