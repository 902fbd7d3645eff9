use rand::{Rng, seq::SliceRandom};
use serde::{Deserialize, Deserializer, Serialize};
use std::{collections::VecDeque, fmt};

use super::constants;

#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub enum Suit {
    Club,
    Diamond,
    Heart,
    Spade,
}

impl Suit {
    pub const ALL: [Suit; 4] = [Self::Club, Self::Diamond, Self::Heart, Self::Spade];
}

impl fmt::Display for Suit {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let repr = match self {
            Self::Club => "♣",
            Self::Diamond => "♦",
            Self::Heart => "♥",
            Self::Spade => "♠",
        };
        write!(f, "{repr}")
    }
}

/// Card ranks, ordered from lowest to highest.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub enum Rank {
    Two,
    Three,
    Four,
    Five,
    Six,
    Seven,
    Eight,
    Nine,
    Ten,
    Jack,
    Queen,
    King,
    Ace,
}

impl Rank {
    pub const ALL: [Rank; 13] = [
        Self::Two,
        Self::Three,
        Self::Four,
        Self::Five,
        Self::Six,
        Self::Seven,
        Self::Eight,
        Self::Nine,
        Self::Ten,
        Self::Jack,
        Self::Queen,
        Self::King,
        Self::Ace,
    ];

    /// Lowest rank present in a short deck.
    pub const SHORT_DECK_MIN: Rank = Self::Six;

    pub fn in_short_deck(self) -> bool {
        self >= Self::SHORT_DECK_MIN
    }
}

impl fmt::Display for Rank {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let repr = match self {
            Self::Two => "2",
            Self::Three => "3",
            Self::Four => "4",
            Self::Five => "5",
            Self::Six => "6",
            Self::Seven => "7",
            Self::Eight => "8",
            Self::Nine => "9",
            Self::Ten => "10",
            Self::Jack => "J",
            Self::Queen => "Q",
            Self::King => "K",
            Self::Ace => "A",
        };
        write!(f, "{repr}")
    }
}

/// Allocation identity of a card within one deck.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub struct CardId(pub u8);

/// A physical card. Two cards are the same card only if they were
/// allocated as the same card, so equality includes the id and not just
/// the face value.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub struct Card {
    pub id: CardId,
    pub suit: Suit,
    pub rank: Rank,
}

impl Card {
    pub fn new(id: u8, suit: Suit, rank: Rank) -> Self {
        Self {
            id: CardId(id),
            suit,
            rank,
        }
    }

    /// Whether both cards show the same suit and rank, regardless of
    /// which physical card they are.
    pub fn same_face(&self, other: &Card) -> bool {
        self.suit == other.suit && self.rank == other.rank
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let repr = format!("{}/{}", self.rank, self.suit);
        write!(f, "{repr:>4}")
    }
}

#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DeckKind {
    #[default]
    Full,
    /// Ranks Six through Ace only.
    Short,
}

impl DeckKind {
    pub fn size(self) -> usize {
        match self {
            Self::Full => Suit::ALL.len() * Rank::ALL.len(),
            Self::Short => {
                Suit::ALL.len() * Rank::ALL.iter().filter(|rank| rank.in_short_deck()).count()
            }
        }
    }
}

impl fmt::Display for DeckKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Full => write!(f, "full"),
            Self::Short => write!(f, "short"),
        }
    }
}

/// An ordered stack of cards that is dealt from the front.
#[derive(Clone, Debug)]
pub struct Deck {
    cards: VecDeque<Card>,
    kind: DeckKind,
}

impl Deck {
    /// Build an unshuffled deck in suit-major order. Card ids follow that
    /// order, so every card in a deck has a distinct id.
    pub fn new(kind: DeckKind) -> Self {
        let mut cards = VecDeque::with_capacity(kind.size());
        for suit in Suit::ALL {
            for rank in Rank::ALL {
                if kind == DeckKind::Short && !rank.in_short_deck() {
                    continue;
                }
                let id = cards.len() as u8;
                cards.push_back(Card::new(id, suit, rank));
            }
        }
        Self { cards, kind }
    }

    pub fn initialize(short_deck: bool) -> Self {
        Self::new(if short_deck {
            DeckKind::Short
        } else {
            DeckKind::Full
        })
    }

    pub fn kind(&self) -> DeckKind {
        self.kind
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn shuffle(&mut self) {
        self.shuffle_with(&mut rand::rng());
    }

    /// Uniform Fisher-Yates shuffle of the remaining cards.
    pub fn shuffle_with<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.cards.make_contiguous().shuffle(rng);
    }

    /// Remove the front card, or `None` once the deck is exhausted.
    pub fn deal(&mut self) -> Option<Card> {
        self.cards.pop_front()
    }

    /// Deal up to `count` cards, stopping early if the deck runs out.
    pub fn deal_multiple(&mut self, count: usize) -> Vec<Card> {
        let count = count.min(self.cards.len());
        self.cards.drain(..count).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Card> {
        self.cards.iter()
    }
}

impl Default for Deck {
    fn default() -> Self {
        Self::new(DeckKind::Full)
    }
}

/// Stable identity of a participant, assigned by whatever transport
/// hosts the session.
pub type ParticipantId = u64;

/// Seat position of a player in the fixed turn order.
pub type PlayerIndex = usize;

#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub struct PlayerName(String);

impl PlayerName {
    pub fn new(s: &str) -> Self {
        let mut name: String = s
            .trim()
            .chars()
            .map(|c| if c.is_whitespace() { '_' } else { c })
            .take(constants::MAX_NAME_LENGTH)
            .collect();
        if name.is_empty() {
            name.push_str("player");
        }
        Self(name)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PlayerName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl<'de> Deserialize<'de> for PlayerName {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Ok(Self::new(&s))
    }
}

impl From<&str> for PlayerName {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for PlayerName {
    fn from(value: String) -> Self {
        Self::new(&value)
    }
}

/// A participant and the cards they hold. Hand order matters: wagers
/// and reveals reference cards by position.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Player {
    pub id: ParticipantId,
    pub name: PlayerName,
    pub hand: Vec<Card>,
}

impl Player {
    pub fn new(id: ParticipantId, name: impl Into<PlayerName>) -> Self {
        Self {
            id,
            name: name.into(),
            hand: Vec::new(),
        }
    }

    pub fn add_card(&mut self, card: Card) {
        self.hand.push(card);
    }

    pub fn add_cards(&mut self, cards: impl IntoIterator<Item = Card>) {
        self.hand.extend(cards);
    }

    /// Remove the given cards by identity, keeping the relative order of
    /// everything else.
    pub fn remove_cards(&mut self, cards: &[Card]) {
        self.hand.retain(|card| !cards.contains(card));
    }

    pub fn holds(&self, card: &Card) -> bool {
        self.hand.contains(card)
    }

    pub fn has_cards(&self) -> bool {
        !self.hand.is_empty()
    }

    pub fn card_count(&self) -> usize {
        self.hand.len()
    }
}

impl fmt::Display for Player {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({} cards)", self.name, self.hand.len())
    }
}

#[cfg(test)]
mod tests {
    use rand::{SeedableRng, rngs::StdRng};
    use std::collections::HashSet;

    use super::{Card, Deck, DeckKind, Player, PlayerName, Rank, Suit};

    #[test]
    fn full_deck_has_every_face_once() {
        let deck = Deck::new(DeckKind::Full);
        assert_eq!(deck.len(), 52);
        let faces: HashSet<_> = deck.iter().map(|c| (c.suit, c.rank)).collect();
        assert_eq!(faces.len(), 52);
        let ids: HashSet<_> = deck.iter().map(|c| c.id).collect();
        assert_eq!(ids.len(), 52);
    }

    #[test]
    fn short_deck_starts_at_six() {
        let deck = Deck::initialize(true);
        assert_eq!(deck.len(), 36);
        assert_eq!(DeckKind::Short.size(), 36);
        assert!(deck.iter().all(|c| c.rank >= Rank::Six));
    }

    #[test]
    fn unshuffled_order_is_deterministic() {
        let mut deck = Deck::new(DeckKind::Full);
        assert_eq!(deck.deal(), Some(Card::new(0, Suit::Club, Rank::Two)));
        assert_eq!(deck.deal(), Some(Card::new(1, Suit::Club, Rank::Three)));
    }

    #[test]
    fn deal_returns_none_when_exhausted() {
        let mut deck = Deck::new(DeckKind::Short);
        let dealt = deck.deal_multiple(100);
        assert_eq!(dealt.len(), 36);
        assert!(deck.is_empty());
        assert_eq!(deck.deal(), None);
        assert!(deck.deal_multiple(3).is_empty());
    }

    #[test]
    fn deal_multiple_takes_from_front() {
        let mut deck = Deck::new(DeckKind::Full);
        let expected: Vec<Card> = deck.iter().take(5).copied().collect();
        assert_eq!(deck.deal_multiple(5), expected);
        assert_eq!(deck.len(), 47);
    }

    #[test]
    fn shuffle_is_a_permutation() {
        let mut deck = Deck::new(DeckKind::Full);
        let before: HashSet<Card> = deck.iter().copied().collect();
        deck.shuffle_with(&mut StdRng::seed_from_u64(7));
        let after: HashSet<Card> = deck.iter().copied().collect();
        assert_eq!(before, after);
        assert_eq!(deck.len(), 52);
    }

    #[test]
    fn seeded_shuffles_repeat() {
        let mut a = Deck::new(DeckKind::Full);
        let mut b = Deck::new(DeckKind::Full);
        a.shuffle_with(&mut StdRng::seed_from_u64(42));
        b.shuffle_with(&mut StdRng::seed_from_u64(42));
        assert!(a.iter().eq(b.iter()));
    }

    #[test]
    fn equal_faces_are_distinct_cards() {
        let a = Card::new(0, Suit::Heart, Rank::Ace);
        let b = Card::new(1, Suit::Heart, Rank::Ace);
        assert_ne!(a, b);
        assert!(a.same_face(&b));
    }

    #[test]
    fn remove_cards_keeps_order() {
        let mut player = Player::new(1, "alice");
        let cards: Vec<Card> = Deck::new(DeckKind::Full).iter().take(5).copied().collect();
        player.add_cards(cards.clone());
        player.remove_cards(&[cards[1], cards[3]]);
        assert_eq!(player.hand, vec![cards[0], cards[2], cards[4]]);
    }

    #[test]
    fn remove_cards_matches_identity_not_face() {
        let mut player = Player::new(1, "alice");
        let a = Card::new(0, Suit::Heart, Rank::Ace);
        let b = Card::new(1, Suit::Heart, Rank::Ace);
        player.add_cards([a, b]);
        player.remove_cards(&[b]);
        assert_eq!(player.hand, vec![a]);
    }

    #[test]
    fn player_name_is_sanitized() {
        assert_eq!(PlayerName::new("  bob the  builder ").as_str(), "bob_the__builder");
        assert_eq!(PlayerName::new("   ").as_str(), "player");
        assert_eq!(PlayerName::new(&"x".repeat(100)).as_str().len(), 32);
    }

    #[test]
    fn card_display() {
        assert_eq!(Card::new(0, Suit::Spade, Rank::King).to_string(), " K/♠");
        assert_eq!(Card::new(0, Suit::Heart, Rank::Ten).to_string(), "10/♥");
    }
}
