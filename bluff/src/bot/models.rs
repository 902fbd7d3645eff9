//! Bot player models and configuration.

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

use crate::game::entities::{ParticipantId, PlayerName};

/// How a bot plays.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BotTemperament {
    /// Rarely challenges, almost never lies
    Cautious,
    #[default]
    Standard,
    /// Challenges often, lies often
    Reckless,
}

impl fmt::Display for BotTemperament {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BotTemperament::Cautious => write!(f, "cautious"),
            BotTemperament::Standard => write!(f, "standard"),
            BotTemperament::Reckless => write!(f, "reckless"),
        }
    }
}

impl FromStr for BotTemperament {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "cautious" => Ok(BotTemperament::Cautious),
            "standard" => Ok(BotTemperament::Standard),
            "reckless" => Ok(BotTemperament::Reckless),
            other => Err(format!("unknown temperament '{other}'")),
        }
    }
}

/// Bot player configuration
#[derive(Debug, Clone)]
pub struct BotConfig {
    pub participant: ParticipantId,

    pub name: PlayerName,

    pub temperament: BotTemperament,

    /// Seed for the bot's decisions; random when `None`
    pub seed: Option<u64>,

    /// Pause before each action like a person would
    pub paced: bool,
}

/// Temperament parameters
#[derive(Debug, Clone, PartialEq)]
pub struct TemperamentParams {
    /// Chance to challenge an opponent's wager instead of betting on top
    pub challenge_rate: f64,

    /// Share of challenges made as bluff accusations rather than belief
    pub doubt_rate: f64,

    /// Chance to declare a rank the wagered cards don't have
    pub lie_rate: f64,

    /// Largest wager the bot places
    pub max_wager: usize,

    /// Average thinking time in milliseconds (base)
    pub base_think_time_ms: u64,

    /// Random variance in thinking time (±milliseconds)
    pub think_time_variance_ms: u64,
}

impl TemperamentParams {
    pub fn cautious() -> Self {
        Self {
            challenge_rate: 0.15,
            doubt_rate: 0.35,
            lie_rate: 0.05,
            max_wager: 2,
            base_think_time_ms: 1500,
            think_time_variance_ms: 1000,
        }
    }

    pub fn standard() -> Self {
        Self {
            challenge_rate: 0.30,
            doubt_rate: 0.50,
            lie_rate: 0.20,
            max_wager: 3,
            base_think_time_ms: 1200,
            think_time_variance_ms: 800,
        }
    }

    pub fn reckless() -> Self {
        Self {
            challenge_rate: 0.50,
            doubt_rate: 0.70,
            lie_rate: 0.45,
            max_wager: 4,
            base_think_time_ms: 800,
            think_time_variance_ms: 600,
        }
    }

    pub fn from_temperament(temperament: BotTemperament) -> Self {
        match temperament {
            BotTemperament::Cautious => Self::cautious(),
            BotTemperament::Standard => Self::standard(),
            BotTemperament::Reckless => Self::reckless(),
        }
    }

    /// Thinking delay in milliseconds, at least 200ms
    pub fn think_delay_ms<R: Rng + ?Sized>(&self, rng: &mut R) -> u64 {
        let variance = rng.random_range(0..=self.think_time_variance_ms) as i64;
        let sign = if rng.random_bool(0.5) { 1 } else { -1 };
        let delay = self.base_think_time_ms as i64 + variance * sign;
        delay.max(200) as u64
    }
}

/// Bot statistics tracker
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BotStats {
    pub bets_placed: u32,

    /// Bets whose declared rank was a lie about at least one card
    pub lies_told: u32,

    pub believes: u32,

    pub bluffs_called: u32,

    /// Bets the authority refused
    pub rejected: u32,
}

impl BotStats {
    pub fn challenges(&self) -> u32 {
        self.believes + self.bluffs_called
    }

    /// Share of bets that were lies
    pub fn lie_rate(&self) -> f32 {
        if self.bets_placed == 0 {
            0.0
        } else {
            self.lies_told as f32 / self.bets_placed as f32
        }
    }
}
