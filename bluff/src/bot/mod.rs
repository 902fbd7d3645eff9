//! Bot module providing automated participants.
//!
//! This module implements:
//! - BotDecisionMaker: picks bets and challenges from a replica's view
//! - BotPlayer: a replica, a seat and a decision maker playing one game
//! - BotManager: seats bots at a session and gathers their outcomes
//!
//! Bots only ever see what a participant sees: their own hand, card
//! counts and the revealed card of each challenge.
//!
//! ## Temperaments
//!
//! | Temperament | Challenge rate | Lie rate | Max wager |
//! |-------------|----------------|----------|-----------|
//! | Cautious    | 15%            | 5%       | 2         |
//! | Standard    | 30%            | 20%      | 3         |
//! | Reckless    | 50%            | 45%      | 4         |
//!
//! Any bot calls a bluff on a claim its own hand proves impossible.
//!
//! ## Example
//!
//! ```no_run
//! use bluff::bot::{BotManager, BotTemperament};
//! use bluff::session::{SessionAuthority, SessionConfig};
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = SessionConfig {
//!         min_players: 3,
//!         ..SessionConfig::default()
//!     };
//!     let (authority, handle) = SessionAuthority::new(config);
//!     tokio::spawn(authority.run());
//!
//!     let mut bots = BotManager::new(handle, BotTemperament::Standard);
//!     bots.spawn_bots(3).await.unwrap();
//!     for outcome in bots.wait_all().await {
//!         println!("{outcome:?}");
//!     }
//! }
//! ```

pub mod decision;
pub mod manager;
pub mod models;
pub mod player;

pub use decision::{BotAction, BotDecisionMaker};
pub use manager::BotManager;
pub use models::{BotConfig, BotStats, BotTemperament, TemperamentParams};
pub use player::{BotError, BotOutcome, BotPlayer};
