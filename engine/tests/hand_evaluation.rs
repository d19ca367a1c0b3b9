use poker_engine::eval::best_hand;
use poker_engine::{Card, HandCategory, Rank, Suit, Variant};

fn c(suit: Suit, rank: Rank) -> Card {
    Card { suit, rank }
}

fn v(ranks: &[Rank]) -> Vec<u8> {
    ranks.iter().map(|r| r.value()).collect()
}

#[test]
fn royal_flush() {
    let hole = vec![c(Suit::Hearts, Rank::Ace), c(Suit::Hearts, Rank::King)];
    let board = vec![
        c(Suit::Hearts, Rank::Queen),
        c(Suit::Hearts, Rank::Jack),
        c(Suit::Hearts, Rank::Ten),
        c(Suit::Diamonds, Rank::Two),
        c(Suit::Clubs, Rank::Three),
    ];
    let score = best_hand(&hole, &board, Variant::TexasHoldem);
    assert_eq!(score.category, HandCategory::RoyalFlush);
}

#[test]
fn straight_flush() {
    let hole = vec![c(Suit::Spades, Rank::Nine), c(Suit::Spades, Rank::Eight)];
    let board = vec![
        c(Suit::Spades, Rank::Seven),
        c(Suit::Spades, Rank::Six),
        c(Suit::Spades, Rank::Five),
        c(Suit::Diamonds, Rank::King),
        c(Suit::Clubs, Rank::Queen),
    ];
    let score = best_hand(&hole, &board, Variant::TexasHoldem);
    assert_eq!(score.category, HandCategory::StraightFlush);
    assert_eq!(score.kickers, v(&[Rank::Nine]));
}

#[test]
fn four_of_a_kind() {
    let hole = vec![c(Suit::Hearts, Rank::Ace), c(Suit::Diamonds, Rank::Ace)];
    let board = vec![
        c(Suit::Clubs, Rank::Ace),
        c(Suit::Spades, Rank::Ace),
        c(Suit::Hearts, Rank::King),
        c(Suit::Diamonds, Rank::Two),
        c(Suit::Clubs, Rank::Three),
    ];
    let score = best_hand(&hole, &board, Variant::TexasHoldem);
    assert_eq!(score.category, HandCategory::FourOfAKind);
    assert_eq!(score.kickers, v(&[Rank::Ace, Rank::King]));
}

#[test]
fn full_house() {
    let hole = vec![c(Suit::Hearts, Rank::King), c(Suit::Diamonds, Rank::King)];
    let board = vec![
        c(Suit::Clubs, Rank::King),
        c(Suit::Spades, Rank::Queen),
        c(Suit::Hearts, Rank::Queen),
        c(Suit::Diamonds, Rank::Two),
        c(Suit::Clubs, Rank::Three),
    ];
    let score = best_hand(&hole, &board, Variant::TexasHoldem);
    assert_eq!(score.category, HandCategory::FullHouse);
    assert_eq!(score.kickers, v(&[Rank::King, Rank::Queen]));
}

#[test]
fn flush() {
    let hole = vec![c(Suit::Hearts, Rank::Ace), c(Suit::Hearts, Rank::Ten)];
    let board = vec![
        c(Suit::Hearts, Rank::King),
        c(Suit::Hearts, Rank::Queen),
        c(Suit::Diamonds, Rank::Jack),
        c(Suit::Hearts, Rank::Two),
        c(Suit::Clubs, Rank::Three),
    ];
    let score = best_hand(&hole, &board, Variant::TexasHoldem);
    assert_eq!(score.category, HandCategory::Flush);
    assert_eq!(score.kickers, v(&[Rank::Ace, Rank::King, Rank::Queen, Rank::Ten, Rank::Two]));
}

#[test]
fn straight() {
    let hole = vec![c(Suit::Hearts, Rank::Ten), c(Suit::Diamonds, Rank::Nine)];
    let board = vec![
        c(Suit::Clubs, Rank::Eight),
        c(Suit::Spades, Rank::Seven),
        c(Suit::Hearts, Rank::Six),
        c(Suit::Diamonds, Rank::Two),
        c(Suit::Clubs, Rank::Three),
    ];
    let score = best_hand(&hole, &board, Variant::TexasHoldem);
    assert_eq!(score.category, HandCategory::Straight);
    assert_eq!(score.kickers, v(&[Rank::Ten]));
}

#[test]
fn straight_ace_plays_low_for_the_wheel() {
    let hole = vec![c(Suit::Hearts, Rank::Ace), c(Suit::Diamonds, Rank::Two)];
    let board = vec![
        c(Suit::Clubs, Rank::Three),
        c(Suit::Spades, Rank::Four),
        c(Suit::Hearts, Rank::Five),
        c(Suit::Diamonds, Rank::King),
        c(Suit::Clubs, Rank::Queen),
    ];
    let score = best_hand(&hole, &board, Variant::TexasHoldem);
    assert_eq!(score.category, HandCategory::Straight);
    assert_eq!(score.kickers, v(&[Rank::Five])); // wheel: A-2-3-4-5, high card is the Five
}

#[test]
fn three_of_a_kind() {
    let hole = vec![c(Suit::Hearts, Rank::Jack), c(Suit::Diamonds, Rank::Jack)];
    let board = vec![
        c(Suit::Clubs, Rank::Jack),
        c(Suit::Spades, Rank::Ten),
        c(Suit::Hearts, Rank::Nine),
        c(Suit::Diamonds, Rank::Two),
        c(Suit::Clubs, Rank::Three),
    ];
    let score = best_hand(&hole, &board, Variant::TexasHoldem);
    assert_eq!(score.category, HandCategory::ThreeOfAKind);
    assert_eq!(score.kickers, v(&[Rank::Jack, Rank::Ten, Rank::Nine]));
}

#[test]
fn two_pair() {
    let hole = vec![c(Suit::Hearts, Rank::Queen), c(Suit::Diamonds, Rank::Queen)];
    let board = vec![
        c(Suit::Clubs, Rank::Ten),
        c(Suit::Spades, Rank::Ten),
        c(Suit::Hearts, Rank::Nine),
        c(Suit::Diamonds, Rank::Two),
        c(Suit::Clubs, Rank::Three),
    ];
    let score = best_hand(&hole, &board, Variant::TexasHoldem);
    assert_eq!(score.category, HandCategory::TwoPair);
    assert_eq!(score.kickers, v(&[Rank::Queen, Rank::Ten, Rank::Nine]));
}

#[test]
fn one_pair() {
    let hole = vec![c(Suit::Hearts, Rank::Ace), c(Suit::Diamonds, Rank::Ace)];
    let board = vec![
        c(Suit::Clubs, Rank::King),
        c(Suit::Spades, Rank::Queen),
        c(Suit::Hearts, Rank::Jack),
        c(Suit::Diamonds, Rank::Two),
        c(Suit::Clubs, Rank::Three),
    ];
    let score = best_hand(&hole, &board, Variant::TexasHoldem);
    assert_eq!(score.category, HandCategory::Pair);
    assert_eq!(score.kickers, v(&[Rank::Ace, Rank::King, Rank::Queen, Rank::Jack]));
}

#[test]
fn high_card() {
    let hole = vec![c(Suit::Hearts, Rank::Ace), c(Suit::Diamonds, Rank::King)];
    let board = vec![
        c(Suit::Clubs, Rank::Queen),
        c(Suit::Spades, Rank::Jack),
        c(Suit::Hearts, Rank::Nine),
        c(Suit::Diamonds, Rank::Two),
        c(Suit::Clubs, Rank::Three),
    ];
    let score = best_hand(&hole, &board, Variant::TexasHoldem);
    assert_eq!(score.category, HandCategory::HighCard);
    assert_eq!(score.kickers, v(&[Rank::Ace, Rank::King, Rank::Queen, Rank::Jack, Rank::Nine]));
}

#[test]
fn short_deck_ranks_a_flush_above_a_full_house() {
    let hole = vec![c(Suit::Hearts, Rank::Ace), c(Suit::Hearts, Rank::King)];
    // Short deck only carries Six and up; five hearts on the board plus
    // the two hole hearts give an actual flush to compare against a
    // separately-built full house.
    let board = vec![
        c(Suit::Hearts, Rank::Nine),
        c(Suit::Hearts, Rank::Eight),
        c(Suit::Hearts, Rank::Seven),
        c(Suit::Clubs, Rank::Six),
        c(Suit::Diamonds, Rank::Six),
    ];
    let flush_score = best_hand(&hole, &board, Variant::ShortDeck);
    let full_house = poker_engine::eval::evaluate_five(&[
        c(Suit::Clubs, Rank::Six),
        c(Suit::Diamonds, Rank::Six),
        c(Suit::Spades, Rank::Six),
        c(Suit::Hearts, Rank::Nine),
        c(Suit::Clubs, Rank::Nine),
    ]);
    assert_eq!(
        flush_score.cmp_for(&full_house, Variant::ShortDeck),
        std::cmp::Ordering::Greater
    );
}
