//! Bot manager for seating bots at a session and collecting their results.

use rand::{Rng, SeedableRng, rngs::StdRng};
use tokio::task::JoinSet;

use super::{
    models::{BotConfig, BotTemperament},
    player::{BotError, BotOutcome, BotPlayer},
};
use crate::{
    game::entities::{ParticipantId, PlayerName},
    session::{SessionClosed, SessionHandle},
};

/// Bot manager for a single session
pub struct BotManager {
    session: SessionHandle,

    temperament: BotTemperament,

    /// Base seed; each bot derives its own from it
    seed: Option<u64>,

    paced: bool,

    /// Next participant id handed to a bot
    next_participant: ParticipantId,

    tasks: JoinSet<Result<BotOutcome, BotError>>,
}

impl BotManager {
    pub fn new(session: SessionHandle, temperament: BotTemperament) -> Self {
        Self {
            session,
            temperament,
            seed: None,
            paced: false,
            next_participant: 1,
            tasks: JoinSet::new(),
        }
    }

    /// Make bot names and decisions reproducible.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Let bots pause before acting.
    pub fn paced(mut self, paced: bool) -> Self {
        self.paced = paced;
        self
    }

    /// Register `count` bots, one after the other so seats follow spawn
    /// order, and start them playing.
    pub async fn spawn_bots(&mut self, count: usize) -> Result<usize, SessionClosed> {
        for _ in 0..count {
            let participant = self.next_participant;
            self.next_participant += 1;

            let config = BotConfig {
                participant,
                name: self.generate_bot_name(participant),
                temperament: self.temperament,
                seed: self.seed.map(|seed| seed.wrapping_add(participant)),
                paced: self.paced,
            };
            log::info!("Spawning {} bot {} ({participant})", config.temperament, config.name);

            let (bot, events) = BotPlayer::join(&self.session, config).await?;
            self.tasks.spawn(bot.play(events));
        }
        Ok(count)
    }

    pub fn bot_count(&self) -> usize {
        self.tasks.len()
    }

    /// Wait for every bot to finish.
    pub async fn wait_all(&mut self) -> Vec<Result<BotOutcome, BotError>> {
        let mut outcomes = Vec::with_capacity(self.tasks.len());
        while let Some(joined) = self.tasks.join_next().await {
            outcomes.push(joined.unwrap_or_else(|error| Err(BotError::Task(error))));
        }
        outcomes
    }

    /// Stop every bot still running.
    pub fn abort_all(&mut self) {
        self.tasks.abort_all();
    }

    fn generate_bot_name(&self, participant: ParticipantId) -> PlayerName {
        let prefixes = ["Ace", "Card", "Deck", "Pile", "Poker", "Sly", "Bold", "Shady"];
        let suffixes = ["Liar", "Sharp", "Face", "Hand", "Talker", "Fox", "Bluffer"];

        let mut rng = match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed ^ participant),
            None => StdRng::from_rng(&mut rand::rng()),
        };
        let prefix = prefixes[rng.random_range(0..prefixes.len())];
        let suffix = suffixes[rng.random_range(0..suffixes.len())];

        PlayerName::new(&format!("{prefix}{suffix}_{participant}"))
    }
}
