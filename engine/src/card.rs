use rand::rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::EngineError;

/// Suit of a playing card. Identity of a card is `(suit, rank)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Suit {
    Spades,
    Hearts,
    Clubs,
    Diamonds,
}

impl fmt::Display for Suit {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let s = match self {
            Suit::Spades => "♠",
            Suit::Hearts => "♥",
            Suit::Clubs => "♣",
            Suit::Diamonds => "♦",
        };
        write!(f, "{s}")
    }
}

/// Rank of a card. `value()` is ace-high (14); hi-lo evaluation
/// additionally treats an ace as 1, handled in `eval.rs` rather than here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Rank {
    Two = 2,
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
        Rank::Two,
        Rank::Three,
        Rank::Four,
        Rank::Five,
        Rank::Six,
        Rank::Seven,
        Rank::Eight,
        Rank::Nine,
        Rank::Ten,
        Rank::Jack,
        Rank::Queen,
        Rank::King,
        Rank::Ace,
    ];

    pub fn value(&self) -> u8 {
        match self {
            Rank::Two => 2,
            Rank::Three => 3,
            Rank::Four => 4,
            Rank::Five => 5,
            Rank::Six => 6,
            Rank::Seven => 7,
            Rank::Eight => 8,
            Rank::Nine => 9,
            Rank::Ten => 10,
            Rank::Jack => 11,
            Rank::Queen => 12,
            Rank::King => 13,
            Rank::Ace => 14,
        }
    }

    pub fn from_value(value: u8) -> Self {
        match value {
            2 => Rank::Two,
            3 => Rank::Three,
            4 => Rank::Four,
            5 => Rank::Five,
            6 => Rank::Six,
            7 => Rank::Seven,
            8 => Rank::Eight,
            9 => Rank::Nine,
            10 => Rank::Ten,
            11 => Rank::Jack,
            12 => Rank::Queen,
            13 => Rank::King,
            14 | 1 => Rank::Ace,
            _ => panic!("invalid rank value: {value}"),
        }
    }
}

impl fmt::Display for Rank {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let s = match self {
            Rank::Two => "2",
            Rank::Three => "3",
            Rank::Four => "4",
            Rank::Five => "5",
            Rank::Six => "6",
            Rank::Seven => "7",
            Rank::Eight => "8",
            Rank::Nine => "9",
            Rank::Ten => "10",
            Rank::Jack => "J",
            Rank::Queen => "Q",
            Rank::King => "K",
            Rank::Ace => "A",
        };
        write!(f, "{s}")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Card {
    pub suit: Suit,
    pub rank: Rank,
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}{}", self.rank, self.suit)
    }
}

/// The poker variants this engine deals. Each carries the metadata the
/// table engine and evaluator need: rank set, hole-card count, max seats,
/// and the two scoring wrinkles from spec.md §4.2/§4.3.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Variant {
    TexasHoldem,
    ShortDeck,
    Royal,
    Manila,
    Omaha,
    OmahaHiLo,
    Courchevel,
    Pineapple,
    FastFold,
}

impl Variant {
    /// Ranks present in the deck, lowest first.
    pub fn rank_set(&self) -> Vec<Rank> {
        let min = match self {
            Variant::ShortDeck => 6,
            Variant::Royal => 10,
            Variant::Manila => 7,
            _ => 2,
        };
        Rank::ALL
            .iter()
            .copied()
            .filter(|r| r.value() >= min)
            .collect()
    }

    pub fn hole_cards(&self) -> usize {
        match self {
            Variant::TexasHoldem
            | Variant::ShortDeck
            | Variant::Royal
            | Variant::Manila
            | Variant::FastFold => 2,
            Variant::Pineapple => 3,
            Variant::Omaha | Variant::OmahaHiLo => 4,
            Variant::Courchevel => 5,
        }
    }

    pub fn max_seats(&self) -> usize {
        match self {
            Variant::TexasHoldem | Variant::ShortDeck => 9,
            _ => 6,
        }
    }

    /// Omaha-family hands must use exactly two hole cards and three board cards.
    pub fn must_use_two_hole(&self) -> bool {
        matches!(self, Variant::Omaha | Variant::OmahaHiLo | Variant::Courchevel)
    }

    pub fn is_hi_lo(&self) -> bool {
        matches!(self, Variant::OmahaHiLo)
    }

    /// Short deck scoring ranks a flush above a full house.
    pub fn flush_beats_full_house(&self) -> bool {
        matches!(self, Variant::ShortDeck)
    }

    /// Courchevel turns the first community card before preflop betting begins.
    pub fn deals_early_board_card(&self) -> bool {
        matches!(self, Variant::Courchevel)
    }
}

/// Ordered sequence of cards. `draw(n)` removes from the top.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Deck {
    cards: Vec<Card>,
}

impl Deck {
    /// Builds a variant-appropriate deck and shuffles it with Fisher-Yates
    /// over `rand`'s default (OS-backed) source, per spec.md §4.1/§9: the
    /// shuffle must not be reproducible from prior hands.
    pub fn shuffled(variant: Variant) -> Self {
        let mut cards = Vec::new();
        let suits = [Suit::Spades, Suit::Hearts, Suit::Clubs, Suit::Diamonds];
        for &suit in &suits {
            for &rank in &variant.rank_set() {
                cards.push(Card { suit, rank });
            }
        }
        let mut deck = Deck { cards };
        deck.cards.shuffle(&mut rng());
        deck
    }

    pub fn remaining(&self) -> usize {
        self.cards.len()
    }

    pub fn draw(&mut self, n: usize) -> Result<Vec<Card>, EngineError> {
        if n > self.cards.len() {
            return Err(EngineError::DeckExhausted);
        }
        Ok(self.cards.split_off(self.cards.len() - n))
    }

    pub fn draw_one(&mut self) -> Result<Card, EngineError> {
        self.draw(1).map(|mut v| v.pop().unwrap())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_deck_has_52_unique_cards() {
        let deck = Deck::shuffled(Variant::TexasHoldem);
        assert_eq!(deck.remaining(), 52);
    }

    #[test]
    fn short_deck_has_36_cards_six_and_up() {
        let deck = Deck::shuffled(Variant::ShortDeck);
        assert_eq!(deck.remaining(), 36);
    }

    #[test]
    fn royal_deck_has_20_cards() {
        assert_eq!(Deck::shuffled(Variant::Royal).remaining(), 20);
    }

    #[test]
    fn manila_deck_has_32_cards() {
        assert_eq!(Deck::shuffled(Variant::Manila).remaining(), 32);
    }

    #[test]
    fn draw_exhausted_fails() {
        let mut deck = Deck::shuffled(Variant::Royal);
        assert!(deck.draw(21).is_err());
        assert!(deck.draw(20).is_ok());
        assert!(matches!(deck.draw(1), Err(EngineError::DeckExhausted)));
    }
}
