//! Bot decision-making from a replica's view of the table.

use rand::{Rng, SeedableRng, rngs::StdRng, seq::SliceRandom};
use std::{collections::BTreeMap, time::Duration};

use super::models::TemperamentParams;
use crate::{
    game::{
        constants::MAX_BET_CARDS,
        entities::{Rank, Suit},
    },
    replica::{TableView, WagerView},
};

/// Weight of visible evidence on top of the temperament's challenge rate.
const SUSPICION_WEIGHT: f64 = 0.5;

/// What a bot wants to do on its turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BotAction {
    PlaceBet {
        card_positions: Vec<usize>,
        declared_rank: Rank,
    },
    Believe(usize),
    Bluff(usize),
}

/// Bot decision maker
pub struct BotDecisionMaker {
    rng: StdRng,
    params: TemperamentParams,
}

impl BotDecisionMaker {
    pub fn new(params: TemperamentParams) -> Self {
        Self {
            rng: StdRng::from_rng(&mut rand::rng()),
            params,
        }
    }

    pub fn with_seed(params: TemperamentParams, seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            params,
        }
    }

    pub fn params(&self) -> &TemperamentParams {
        &self.params
    }

    /// Randomized pause before acting.
    pub fn think_delay(&mut self) -> Duration {
        Duration::from_millis(self.params.think_delay_ms(&mut self.rng))
    }

    /// Pick an action, or `None` when it is not the bot's turn.
    pub fn decide(&mut self, view: &TableView) -> Option<BotAction> {
        if !view.is_local_turn {
            return None;
        }

        if view.can_challenge
            && let Some(wager) = &view.active_wager
            && (view.hand.is_empty() || self.should_challenge(view, wager))
        {
            return Some(self.challenge(view, wager));
        }

        if view.hand.is_empty() {
            return None;
        }
        Some(self.choose_bet(view))
    }

    /// How likely the wager is a lie, judged from the bot's own hand.
    /// `1.0` means the claim is impossible.
    pub fn suspicion(view: &TableView, wager: &WagerView) -> f64 {
        let suits = Suit::ALL.len();
        let held = view
            .hand
            .iter()
            .filter(|card| card.rank == wager.declared_rank)
            .count();
        let claimed = held + wager.size;
        if claimed > suits {
            1.0
        } else {
            claimed as f64 / (suits + 1) as f64
        }
    }

    fn should_challenge(&mut self, view: &TableView, wager: &WagerView) -> bool {
        let suspicion = Self::suspicion(view, wager);
        if suspicion >= 1.0 {
            return true;
        }
        let rate = (self.params.challenge_rate + suspicion * SUSPICION_WEIGHT).min(1.0);
        self.rng.random_bool(rate)
    }

    fn challenge(&mut self, view: &TableView, wager: &WagerView) -> BotAction {
        let reveal_index = self.rng.random_range(0..wager.size.max(1));
        let doubt = Self::suspicion(view, wager) >= 1.0 || self.rng.random_bool(self.params.doubt_rate);
        if doubt {
            BotAction::Bluff(reveal_index)
        } else {
            BotAction::Believe(reveal_index)
        }
    }

    fn choose_bet(&mut self, view: &TableView) -> BotAction {
        let mut by_rank: BTreeMap<Rank, Vec<usize>> = BTreeMap::new();
        for (position, card) in view.hand.iter().enumerate() {
            by_rank.entry(card.rank).or_default().push(position);
        }
        let max_wager = self.params.max_wager.clamp(1, MAX_BET_CARDS);

        // Largest group, highest rank on ties.
        let Some((&rank, positions)) = by_rank.iter().max_by_key(|(_, positions)| positions.len())
        else {
            return BotAction::PlaceBet {
                card_positions: vec![0],
                declared_rank: Rank::Ace,
            };
        };

        if by_rank.len() > 1 && self.rng.random_bool(self.params.lie_rate) {
            let mut others: Vec<usize> = (0..view.hand.len())
                .filter(|&position| view.hand[position].rank != rank)
                .collect();
            others.shuffle(&mut self.rng);
            let count = self.rng.random_range(1..=others.len().min(max_wager));
            others.truncate(count);
            return BotAction::PlaceBet {
                card_positions: others,
                declared_rank: rank,
            };
        }

        let count = self.rng.random_range(1..=positions.len().min(max_wager));
        BotAction::PlaceBet {
            card_positions: positions[..count].to_vec(),
            declared_rank: rank,
        }
    }

    /// One honest card. Used when a chosen bet was refused.
    pub fn fallback_bet(view: &TableView) -> Option<BotAction> {
        view.hand.first().map(|card| BotAction::PlaceBet {
            card_positions: vec![0],
            declared_rank: card.rank,
        })
    }

    /// Simpler actions to try, in order, after `refused` was rejected:
    /// a single honest card, then believing the open wager.
    pub fn retries(refused: &BotAction, view: &TableView) -> Vec<BotAction> {
        let mut retries = Vec::new();
        if let Some(bet) = Self::fallback_bet(view)
            && bet != *refused
        {
            retries.push(bet);
        }
        if view.can_challenge && !matches!(refused, BotAction::Believe(0)) {
            retries.push(BotAction::Believe(0));
        }
        retries
    }
}
