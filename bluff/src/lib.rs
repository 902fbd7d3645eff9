//! # Bluff
//!
//! Rules engine and host-authoritative synchronization protocol for a
//! turn-based bluffing card game in the Cheat / Liar's Deck family.
//!
//! Players take turns wagering one to four cards face down while declaring
//! a rank. The next player either wagers on top of the pile or challenges
//! the last wager, and a single revealed card settles the dispute. Whoever
//! is left holding cards loses.
//!
//! ## Architecture
//!
//! - **Authority**: one [`session::SessionAuthority`] actor owns the
//!   canonical [`GameState`], validates every request and rebroadcasts
//!   the result.
//! - **Replicas**: every participant keeps a [`replica::Replica`], a
//!   partial-information mirror that never learns a card it is not
//!   entitled to see.
//! - **Protocol**: broadcasts travel as sequenced, versioned
//!   [`net::messages::Envelope`]s that replicas apply exactly once, in
//!   order.
//!
//! ## Core Modules
//!
//! - [`game`]: cards, deck, canonical state and the rule engine
//! - [`net`]: requests, broadcast events, envelopes and framing
//! - [`session`]: the authority actor and its handle
//! - [`replica`]: participant mirror, view and presentation trait
//! - [`bot`]: automated participants
//!
//! ## Example
//!
//! ```
//! use bluff::game::{Deck, DeckKind, GameState, Player, deal_round_robin};
//!
//! let mut deck = Deck::new(DeckKind::Full);
//! deck.shuffle();
//! let mut players = vec![Player::new(1, "alice"), Player::new(2, "bob")];
//! deal_round_robin(&mut deck, &mut players);
//!
//! let mut game = GameState::new();
//! game.start_game(players).unwrap();
//! assert!(game.is_conserved());
//! ```

/// Automated participants.
pub mod bot;

/// Core game logic, entities and rules.
pub mod game;

// `replica` must stay ahead of `net`: enum_dispatch expands the `Mirror`
// trait before it can implement it for `BroadcastEvent`.
/// Participant-side mirrors.
pub mod replica;

/// Wire protocol shared by the authority and replicas.
pub mod net;

/// The host-authoritative session actor.
pub mod session;

pub use game::{
    ActionError, Card, ChallengeMode, ChallengeOutcome, GamePhase, GameState, PlayerIndex, Rank,
    Suit,
};
pub use net::messages::{ActionRequest, BroadcastEvent, Envelope};
pub use replica::{Presentation, Replica, Seat, TableView};
pub use session::{SessionAuthority, SessionConfig, SessionHandle, SessionResponse};
