/// Minimum number of participants needed to start a game.
pub const MIN_PLAYERS: usize = 2;

/// Maximum number of participants a session seats.
pub const MAX_PLAYERS: usize = 6;

/// Maximum number of cards a single wager may hold.
pub const MAX_BET_CARDS: usize = 4;

/// Player counts at or below this play with the short deck when the
/// deck mode is left on auto.
pub const SHORT_DECK_MAX_PLAYERS: usize = 3;

/// Maximum display name length, in characters.
pub const MAX_NAME_LENGTH: usize = 32;
