//! Session configuration models.

use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr, time::Duration};

use crate::game::{
    DeckKind,
    constants::{MAX_PLAYERS, MIN_PLAYERS, SHORT_DECK_MAX_PLAYERS},
};

/// Which deck a session deals from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeckMode {
    /// Short deck for small tables, full deck otherwise.
    #[default]
    Auto,
    Full,
    Short,
}

impl DeckMode {
    pub fn kind_for(self, players: usize) -> DeckKind {
        match self {
            DeckMode::Auto if players <= SHORT_DECK_MAX_PLAYERS => DeckKind::Short,
            DeckMode::Auto | DeckMode::Full => DeckKind::Full,
            DeckMode::Short => DeckKind::Short,
        }
    }
}

impl fmt::Display for DeckMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeckMode::Auto => write!(f, "auto"),
            DeckMode::Full => write!(f, "full"),
            DeckMode::Short => write!(f, "short"),
        }
    }
}

impl FromStr for DeckMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "auto" => Ok(DeckMode::Auto),
            "full" => Ok(DeckMode::Full),
            "short" => Ok(DeckMode::Short),
            other => Err(format!("unknown deck mode '{other}'")),
        }
    }
}

/// Session configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Session name, used in logs
    pub name: String,

    /// Registrations needed before the game starts (default: 2)
    pub min_players: usize,

    /// Registrations accepted at most (default: 6)
    pub max_players: usize,

    /// Deck selection
    pub deck: DeckMode,

    /// How long a replica waits for its registration answer before
    /// falling back to the broadcast directory, in milliseconds
    pub index_wait_ms: u64,

    /// Capacity of the authority inbox and of each participant's
    /// broadcast channel
    pub channel_capacity: usize,

    /// Fixed RNG seed for reproducible deals and starting turns
    pub seed: Option<u64>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            name: "Bluff".to_string(),
            min_players: MIN_PLAYERS,
            max_players: MAX_PLAYERS,
            deck: DeckMode::Auto,
            index_wait_ms: 5_000,
            channel_capacity: 100,
            seed: None,
        }
    }
}

impl SessionConfig {
    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.min_players < MIN_PLAYERS {
            return Err(format!("Min players must be at least {MIN_PLAYERS}"));
        }

        if self.max_players > MAX_PLAYERS {
            return Err(format!("Max players must be at most {MAX_PLAYERS}"));
        }

        if self.min_players > self.max_players {
            return Err("Min players must not exceed max players".to_string());
        }

        if self.channel_capacity == 0 {
            return Err("Channel capacity must be positive".to_string());
        }

        Ok(())
    }

    pub fn index_wait(&self) -> Duration {
        Duration::from_millis(self.index_wait_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = SessionConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.min_players, 2);
        assert_eq!(config.max_players, 6);
        assert_eq!(config.index_wait(), Duration::from_secs(5));
    }

    #[test]
    fn test_validate_player_bounds() {
        let config = SessionConfig {
            min_players: 1,
            ..SessionConfig::default()
        };
        assert!(config.validate().is_err());

        let config = SessionConfig {
            max_players: 7,
            ..SessionConfig::default()
        };
        assert!(config.validate().is_err());

        let config = SessionConfig {
            min_players: 4,
            max_players: 3,
            ..SessionConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_channel_capacity() {
        let config = SessionConfig {
            channel_capacity: 0,
            ..SessionConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_auto_deck_follows_player_count() {
        assert_eq!(DeckMode::Auto.kind_for(2), DeckKind::Short);
        assert_eq!(DeckMode::Auto.kind_for(3), DeckKind::Short);
        assert_eq!(DeckMode::Auto.kind_for(4), DeckKind::Full);
        assert_eq!(DeckMode::Full.kind_for(2), DeckKind::Full);
        assert_eq!(DeckMode::Short.kind_for(6), DeckKind::Short);
    }

    #[test]
    fn test_deck_mode_parse() {
        assert_eq!("SHORT".parse::<DeckMode>(), Ok(DeckMode::Short));
        assert_eq!("auto".parse::<DeckMode>(), Ok(DeckMode::Auto));
        assert!("jokers".parse::<DeckMode>().is_err());
        assert_eq!(DeckMode::Full.to_string(), "full");
    }
}
