/// Property-based tests for card conservation using proptest
///
/// These tests play random action sequences against the rule engine and
/// verify that no card is ever created, lost or duplicated, and that
/// the game always ends with a single player in contention.
use bluff::game::{
    ChallengeMode, Deck, DeckKind, GamePhase, GameState, Player, Rank, deal_round_robin, rules,
};
use proptest::prelude::*;
use rand::{SeedableRng, rngs::StdRng};

/// One attempted move. Illegal attempts are simply refused by the rules.
#[derive(Clone, Debug)]
enum Move {
    Bet { positions: Vec<usize>, rank: Rank },
    Challenge { mode: ChallengeMode, reveal: usize },
}

fn rank_strategy() -> impl Strategy<Value = Rank> {
    (0usize..Rank::ALL.len()).prop_map(|idx| Rank::ALL[idx])
}

fn move_strategy() -> impl Strategy<Value = Move> {
    prop_oneof![
        (prop::collection::vec(0usize..20, 0..=5), rank_strategy())
            .prop_map(|(positions, rank)| Move::Bet { positions, rank }),
        (any::<bool>(), 0usize..5).prop_map(|(believe, reveal)| Move::Challenge {
            mode: if believe {
                ChallengeMode::Believe
            } else {
                ChallengeMode::Bluff
            },
            reveal,
        }),
    ]
}

fn new_game(players: usize, short: bool, seed: u64) -> GameState {
    let mut rng = StdRng::seed_from_u64(seed);
    let kind = if short { DeckKind::Short } else { DeckKind::Full };
    let mut deck = Deck::new(kind);
    deck.shuffle_with(&mut rng);

    let mut seats: Vec<Player> = (0..players)
        .map(|idx| Player::new(idx as u64, format!("p{idx}")))
        .collect();
    deal_round_robin(&mut deck, &mut seats);

    let mut game = GameState::new();
    game.start_game_with(seats, &mut rng).unwrap();
    game
}

/// Apply a move the way the session authority does. Returns whether it
/// was accepted.
fn apply(game: &mut GameState, attempt: &Move) -> bool {
    let actor = game.current_turn;
    let accepted = match attempt {
        Move::Bet { positions, rank } => {
            let Ok(cards) = rules::cards_at_positions(&game.players[actor].hand, positions) else {
                return false;
            };
            if rules::validate_bet(game, actor, &cards).is_err() {
                return false;
            }
            game.place_bet(actor, &cards, *rank);
            true
        }
        Move::Challenge { mode, reveal } => {
            let Ok(resolution) = rules::resolve_challenge(game, actor, *mode, *reveal) else {
                return false;
            };
            match resolution.pile_recipient {
                Some(recipient) => game.give_pile_to_player(recipient),
                None => game.resolve_to_discard(),
            }
            true
        }
    };
    if accepted && game.check_for_winner().is_none() {
        game.advance_to_next_holder();
    }
    accepted
}

proptest! {
    #[test]
    fn test_cards_are_conserved(
        players in 2usize..=6,
        short in any::<bool>(),
        seed in any::<u64>(),
        moves in prop::collection::vec(move_strategy(), 1..200),
    ) {
        let mut game = new_game(players, short, seed);
        let total = game.total_cards();
        prop_assert!(game.is_conserved());

        for attempt in &moves {
            let before = game.clone();
            let accepted = apply(&mut game, attempt);

            prop_assert!(game.is_conserved(), "conservation broken by {:?}", attempt);
            prop_assert_eq!(game.total_cards(), total);
            if !accepted {
                prop_assert_eq!(&game.players, &before.players);
                prop_assert_eq!(&game.pile, &before.pile);
                prop_assert_eq!(game.current_turn, before.current_turn);
            }
            if game.phase == GamePhase::GameOver {
                break;
            }
        }
    }

    #[test]
    fn test_pile_ends_with_last_wager(
        seed in any::<u64>(),
        moves in prop::collection::vec(move_strategy(), 1..100),
    ) {
        let mut game = new_game(3, false, seed);

        for attempt in &moves {
            apply(&mut game, attempt);
            if let Some(bet) = &game.last_bet {
                prop_assert!(game.pile.ends_with(&bet.cards));
                prop_assert!((1..=4).contains(&bet.cards.len()));
            } else {
                prop_assert!(game.pile.is_empty());
            }
            if game.phase == GamePhase::GameOver {
                break;
            }
        }
    }

    #[test]
    fn test_game_over_leaves_one_contender(
        players in 2usize..=4,
        seed in any::<u64>(),
        moves in prop::collection::vec(move_strategy(), 1..400),
    ) {
        let mut game = new_game(players, true, seed);

        for attempt in &moves {
            apply(&mut game, attempt);
            if game.phase == GamePhase::GameOver {
                let loser = game.loser.unwrap();
                let contenders: Vec<usize> =
                    (0..players).filter(|&idx| game.in_contention(idx)).collect();
                prop_assert_eq!(contenders, vec![loser]);
                prop_assert!(!rules::can_place_bet(&game, game.current_turn, &game.players[game.current_turn].hand));
                break;
            }
            // Whoever is to act holds cards while the game runs.
            prop_assert!(game.current_player().has_cards());
        }
    }

    #[test]
    fn test_deal_is_even(players in 2usize..=6, short in any::<bool>(), seed in any::<u64>()) {
        let game = new_game(players, short, seed);
        let counts: Vec<usize> = game.players.iter().map(Player::card_count).collect();
        let max = counts.iter().max().unwrap();
        let min = counts.iter().min().unwrap();
        prop_assert!(max - min <= 1);
        prop_assert_eq!(counts.iter().sum::<usize>(), if short { 36 } else { 52 });
    }

    #[test]
    fn test_believe_and_bluff_are_complements(
        seed in any::<u64>(),
        positions in prop::collection::vec(0usize..18, 1..=4),
        rank in rank_strategy(),
        reveal in 0usize..4,
    ) {
        let mut game = new_game(2, true, seed);
        let actor = game.current_turn;
        let Ok(cards) = rules::cards_at_positions(&game.players[actor].hand, &positions) else {
            return Ok(());
        };
        game.place_bet(actor, &cards, rank);

        match (rules::resolve_believe(&game, reveal), rules::resolve_bluff(&game, reveal)) {
            (Ok(believe), Ok(bluff)) => prop_assert_eq!(believe, !bluff),
            (Err(a), Err(b)) => prop_assert_eq!(a, b),
            other => prop_assert!(false, "resolutions disagree: {:?}", other),
        }
    }
}
