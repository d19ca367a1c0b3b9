use std::cmp::Ordering;
use std::collections::HashMap;

use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::card::{Card, Rank, Variant};

/// Canonical poker hand categories, declared low to high in the standard
/// ordering. Short-deck scoring does not reorder this enum — it swaps
/// `Flush` and `FullHouse` only at comparison time, via
/// `HandCategory::order_value`, so both orderings stay simultaneously
/// testable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HandCategory {
    HighCard,
    Pair,
    TwoPair,
    ThreeOfAKind,
    Straight,
    Flush,
    FullHouse,
    FourOfAKind,
    StraightFlush,
    RoyalFlush,
}

impl HandCategory {
    fn order_value(self, flush_beats_full_house: bool) -> u8 {
        use HandCategory::*;
        if flush_beats_full_house {
            match self {
                HighCard => 0,
                Pair => 1,
                TwoPair => 2,
                ThreeOfAKind => 3,
                Straight => 4,
                FullHouse => 5,
                Flush => 6,
                FourOfAKind => 7,
                StraightFlush => 8,
                RoyalFlush => 9,
            }
        } else {
            match self {
                HighCard => 0,
                Pair => 1,
                TwoPair => 2,
                ThreeOfAKind => 3,
                Straight => 4,
                Flush => 5,
                FullHouse => 6,
                FourOfAKind => 7,
                StraightFlush => 8,
                RoyalFlush => 9,
            }
        }
    }
}

/// A scored 5-card hand. Comparison is monotone in category and, within a
/// category, in the kicker vector, so two scores from the same variant
/// compare by plain integer comparison (see `HandScore::cmp_for`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HandScore {
    pub category: HandCategory,
    pub kickers: Vec<u8>,
    pub best_five: Vec<Card>,
    pub description: String,
}

impl HandScore {
    pub fn cmp_for(&self, other: &Self, variant: Variant) -> Ordering {
        let flip = variant.flush_beats_full_house();
        self.category
            .order_value(flip)
            .cmp(&other.category.order_value(flip))
            .then_with(|| self.kickers.cmp(&other.kickers))
    }
}

/// An ace-to-five low hand: five distinct ranks, ace counts as 1, all <= 8.
/// `ranks` is sorted descending; the lexicographically *smaller* array is
/// the *better* (lower) hand, so comparisons use `better_than`, not `Ord`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LowScore {
    pub ranks: [u8; 5],
}

impl LowScore {
    pub fn better_than(&self, other: &LowScore) -> bool {
        for i in 0..5 {
            if self.ranks[i] != other.ranks[i] {
                return self.ranks[i] < other.ranks[i];
            }
        }
        false
    }
}

fn low_value(rank: Rank) -> u8 {
    if rank == Rank::Ace {
        1
    } else {
        rank.value()
    }
}

/// Evaluates exactly five cards into a category + descending kicker vector.
/// Straights treat the ace as both high and low; the wheel (A-2-3-4-5) has
/// high card Five.
pub fn evaluate_five(cards: &[Card]) -> HandScore {
    assert_eq!(cards.len(), 5, "evaluate_five requires exactly five cards");

    let mut rank_counts: HashMap<u8, u8> = HashMap::new();
    for c in cards {
        *rank_counts.entry(c.rank.value()).or_insert(0) += 1;
    }
    let mut suit_counts: HashMap<_, u8> = HashMap::new();
    for c in cards {
        *suit_counts.entry(c.suit).or_insert(0) += 1;
    }
    let is_flush = suit_counts.values().any(|&n| n == 5);
    let (is_straight, straight_high) = check_straight(cards);

    let mut by_count: Vec<(u8, u8)> = rank_counts.iter().map(|(&r, &n)| (r, n)).collect();
    // sort by count desc, then rank desc, so ties resolve to the higher rank.
    by_count.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| b.0.cmp(&a.0)));

    let descending_ranks: Vec<u8> = {
        let mut v: Vec<u8> = cards.iter().map(|c| c.rank.value()).collect();
        v.sort_unstable_by(|a, b| b.cmp(a));
        v
    };

    if is_flush && is_straight && straight_high == Rank::Ace {
        return HandScore {
            category: HandCategory::RoyalFlush,
            kickers: vec![straight_high.value()],
            best_five: cards.to_vec(),
            description: "Royal Flush".to_string(),
        };
    }
    if is_flush && is_straight {
        return HandScore {
            category: HandCategory::StraightFlush,
            kickers: vec![straight_high.value()],
            best_five: cards.to_vec(),
            description: format!("Straight Flush, {} high", straight_high),
        };
    }
    if by_count[0].1 == 4 {
        let quad = by_count[0].0;
        let kicker = by_count[1].0;
        return HandScore {
            category: HandCategory::FourOfAKind,
            kickers: vec![quad, kicker],
            best_five: cards.to_vec(),
            description: format!("Four of a Kind, {}s", Rank::from_value(quad)),
        };
    }
    if by_count[0].1 == 3 && by_count[1].1 >= 2 {
        let trips = by_count[0].0;
        let pair = by_count[1].0;
        return HandScore {
            category: HandCategory::FullHouse,
            kickers: vec![trips, pair],
            best_five: cards.to_vec(),
            description: format!("Full House, {}s over {}s", Rank::from_value(trips), Rank::from_value(pair)),
        };
    }
    if is_flush {
        return HandScore {
            category: HandCategory::Flush,
            kickers: descending_ranks,
            best_five: cards.to_vec(),
            description: "Flush".to_string(),
        };
    }
    if is_straight {
        return HandScore {
            category: HandCategory::Straight,
            kickers: vec![straight_high.value()],
            best_five: cards.to_vec(),
            description: format!("Straight, {} high", straight_high),
        };
    }
    if by_count[0].1 == 3 {
        let trips = by_count[0].0;
        let mut kickers: Vec<u8> = by_count[1..].iter().map(|(r, _)| *r).collect();
        kickers.sort_unstable_by(|a, b| b.cmp(a));
        kickers.truncate(2);
        return HandScore {
            category: HandCategory::ThreeOfAKind,
            kickers: std::iter::once(trips).chain(kickers).collect(),
            best_five: cards.to_vec(),
            description: format!("Three of a Kind, {}s", Rank::from_value(trips)),
        };
    }
    if by_count[0].1 == 2 && by_count[1].1 == 2 {
        let high_pair = by_count[0].0.max(by_count[1].0);
        let low_pair = by_count[0].0.min(by_count[1].0);
        let kicker = by_count[2].0;
        return HandScore {
            category: HandCategory::TwoPair,
            kickers: vec![high_pair, low_pair, kicker],
            best_five: cards.to_vec(),
            description: format!("Two Pair, {}s and {}s", Rank::from_value(high_pair), Rank::from_value(low_pair)),
        };
    }
    if by_count[0].1 == 2 {
        let pair = by_count[0].0;
        let mut kickers: Vec<u8> = by_count[1..].iter().map(|(r, _)| *r).collect();
        kickers.sort_unstable_by(|a, b| b.cmp(a));
        kickers.truncate(3);
        return HandScore {
            category: HandCategory::Pair,
            kickers: std::iter::once(pair).chain(kickers).collect(),
            best_five: cards.to_vec(),
            description: format!("Pair of {}s", Rank::from_value(pair)),
        };
    }

    HandScore {
        category: HandCategory::HighCard,
        kickers: descending_ranks,
        best_five: cards.to_vec(),
        description: format!("High Card, {}", cards.iter().map(|c| c.rank).max().unwrap()),
    }
}

fn check_straight(cards: &[Card]) -> (bool, Rank) {
    let mut values: Vec<u8> = cards.iter().map(|c| c.rank.value()).collect();
    values.sort_unstable();
    values.dedup();
    if values.contains(&14) {
        values.insert(0, 1); // ace also plays low for the wheel
    }

    let mut best_high = None;
    let mut run_start = 0usize;
    for i in 1..values.len() {
        if values[i] == values[i - 1] + 1 {
            if i - run_start >= 4 {
                best_high = Some(values[i]);
            }
        } else {
            run_start = i;
        }
    }
    match best_high {
        Some(high) => (true, Rank::from_value(if high == 5 && values.contains(&1) { 5 } else { high })),
        None => (false, Rank::Two),
    }
}

/// Finds the best 5-card hand from a larger pool (union-style variants:
/// Texas, short deck, royal, manila, pineapple, fast-fold).
fn best_of_union(cards: &[Card]) -> HandScore {
    if cards.len() <= 5 {
        return evaluate_five(cards);
    }
    cards
        .iter()
        .copied()
        .combinations(5)
        .map(|hand| evaluate_five(&hand))
        .max_by(|a, b| {
            // category order alone (no short-deck flip) is fine here: we
            // only need the best hand *within one variant's own deck*, and
            // the flip is applied again by the caller via `cmp_for`.
            a.category
                .order_value(false)
                .cmp(&b.category.order_value(false))
                .then_with(|| a.kickers.cmp(&b.kickers))
        })
        .expect("non-empty combination set")
}

/// Finds the best 5-card hand for Omaha-family variants: exactly two hole
/// cards and three board cards, enumerated over `C(hole,2) x C(board,3)`.
fn best_of_omaha(hole: &[Card], board: &[Card]) -> HandScore {
    hole.iter()
        .copied()
        .combinations(2)
        .cartesian_product(board.iter().copied().combinations(3))
        .map(|(h, b)| {
            let mut five = h;
            five.extend(b);
            evaluate_five(&five)
        })
        .max_by(|a, b| {
            a.category
                .order_value(false)
                .cmp(&b.category.order_value(false))
                .then_with(|| a.kickers.cmp(&b.kickers))
        })
        .expect("omaha hole/board combination set is non-empty")
}

/// Dispatches to the union or must-use-two enumeration per spec.md §4.2.
pub fn best_hand(hole: &[Card], board: &[Card], variant: Variant) -> HandScore {
    if variant.must_use_two_hole() {
        best_of_omaha(hole, board)
    } else {
        let mut all = hole.to_vec();
        all.extend_from_slice(board);
        best_of_union(&all)
    }
}

fn low_from_five(cards: &[Card]) -> Option<LowScore> {
    let mut values: Vec<u8> = cards.iter().map(|c| low_value(c.rank)).collect();
    values.sort_unstable();
    values.dedup();
    if values.len() < 5 || values.iter().any(|&v| v > 8) {
        return None;
    }
    values.truncate(5);
    values.reverse();
    let mut ranks = [0u8; 5];
    ranks.copy_from_slice(&values[..5]);
    Some(LowScore { ranks })
}

/// Evaluates the best qualifying ace-to-five low, if any, per spec.md §4.2:
/// five distinct ranks, ace counts as 1, every rank <= 8.
pub fn qualifying_low(hole: &[Card], board: &[Card], variant: Variant) -> Option<LowScore> {
    if !variant.is_hi_lo() {
        return None;
    }
    if variant.must_use_two_hole() {
        hole.iter()
            .copied()
            .combinations(2)
            .cartesian_product(board.iter().copied().combinations(3))
            .filter_map(|(h, b)| {
                let mut five = h;
                five.extend(b);
                low_from_five(&five)
            })
            .fold(None, |best: Option<LowScore>, candidate| match best {
                None => Some(candidate),
                Some(b) if candidate.better_than(&b) => Some(candidate),
                Some(b) => Some(b),
            })
    } else {
        let mut all = hole.to_vec();
        all.extend_from_slice(board);
        all.iter()
            .copied()
            .combinations(5)
            .filter_map(|five| low_from_five(&five))
            .fold(None, |best: Option<LowScore>, candidate| match best {
                None => Some(candidate),
                Some(b) if candidate.better_than(&b) => Some(candidate),
                Some(b) => Some(b),
            })
    }
}

/// Returns the indices into `players` of the non-folded seats whose hand
/// score is maximal (more than one on a tie).
pub fn determine_winners<T>(
    players: &[(usize, T)],
    score_of: impl Fn(&T) -> HandScore,
    variant: Variant,
) -> Vec<usize> {
    let mut best: Option<HandScore> = None;
    let mut winners = Vec::new();
    for (idx, p) in players {
        let score = score_of(p);
        match &best {
            None => {
                best = Some(score);
                winners = vec![*idx];
            }
            Some(b) => match score.cmp_for(b, variant) {
                Ordering::Greater => {
                    best = Some(score);
                    winners = vec![*idx];
                }
                Ordering::Equal => winners.push(*idx),
                Ordering::Less => {}
            },
        }
    }
    winners
}

/// Returns the indices into `players` holding the best (lowest) qualifying
/// low, if any seat qualifies at all.
pub fn determine_low_winners<T>(
    players: &[(usize, T)],
    low_of: impl Fn(&T) -> Option<LowScore>,
) -> Vec<usize> {
    let mut best: Option<LowScore> = None;
    let mut winners = Vec::new();
    for (idx, p) in players {
        let Some(score) = low_of(p) else { continue };
        match &best {
            None => {
                best = Some(score);
                winners = vec![*idx];
            }
            Some(b) => {
                if score.better_than(b) {
                    best = Some(score);
                    winners = vec![*idx];
                } else if !b.better_than(&score) {
                    winners.push(*idx);
                }
            }
        }
    }
    winners
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::card::Suit;

    fn c(rank: Rank, suit: Suit) -> Card {
        Card { rank, suit }
    }

    #[test]
    fn royal_flush_outranks_straight_flush() {
        let royal = evaluate_five(&[
            c(Rank::Ace, Suit::Hearts),
            c(Rank::King, Suit::Hearts),
            c(Rank::Queen, Suit::Hearts),
            c(Rank::Jack, Suit::Hearts),
            c(Rank::Ten, Suit::Hearts),
        ]);
        assert_eq!(royal.category, HandCategory::RoyalFlush);
    }

    #[test]
    fn wheel_straight_is_five_high() {
        let wheel = evaluate_five(&[
            c(Rank::Ace, Suit::Hearts),
            c(Rank::Two, Suit::Clubs),
            c(Rank::Three, Suit::Diamonds),
            c(Rank::Four, Suit::Spades),
            c(Rank::Five, Suit::Hearts),
        ]);
        assert_eq!(wheel.category, HandCategory::Straight);
        assert_eq!(wheel.kickers, vec![5]);
    }

    #[test]
    fn short_deck_flush_beats_full_house() {
        let flush = HandScore {
            category: HandCategory::Flush,
            kickers: vec![13, 10, 9, 8, 7],
            best_five: vec![],
            description: String::new(),
        };
        let full_house = HandScore {
            category: HandCategory::FullHouse,
            kickers: vec![13, 9],
            best_five: vec![],
            description: String::new(),
        };
        assert_eq!(
            flush.cmp_for(&full_house, Variant::ShortDeck),
            Ordering::Greater
        );
        assert_eq!(
            flush.cmp_for(&full_house, Variant::TexasHoldem),
            Ordering::Less
        );
    }

    #[test]
    fn omaha_must_use_exactly_two_hole_cards() {
        // Hole AsAh2c2d, board AcKsQsJsTs: may NOT claim a royal flush
        // because only one spade is in hand. Best hand is trip aces.
        let hole = vec![
            c(Rank::Ace, Suit::Spades),
            c(Rank::Ace, Suit::Hearts),
            c(Rank::Two, Suit::Clubs),
            c(Rank::Two, Suit::Diamonds),
        ];
        let board = vec![
            c(Rank::Ace, Suit::Clubs),
            c(Rank::King, Suit::Spades),
            c(Rank::Queen, Suit::Spades),
            c(Rank::Jack, Suit::Spades),
            c(Rank::Ten, Suit::Spades),
        ];
        let best = best_hand(&hole, &board, Variant::Omaha);
        assert_eq!(best.category, HandCategory::ThreeOfAKind);
    }

    #[test]
    fn low_qualifier_requires_five_distinct_ranks_at_most_eight() {
        let hole = vec![
            c(Rank::Ace, Suit::Spades),
            c(Rank::Two, Suit::Hearts),
            c(Rank::Nine, Suit::Clubs),
            c(Rank::Nine, Suit::Diamonds),
        ];
        let board = vec![
            c(Rank::Three, Suit::Clubs),
            c(Rank::Four, Suit::Spades),
            c(Rank::Five, Suit::Spades),
            c(Rank::King, Suit::Spades),
            c(Rank::King, Suit::Hearts),
        ];
        let low = qualifying_low(&hole, &board, Variant::OmahaHiLo);
        assert_eq!(low.unwrap().ranks, [5, 4, 3, 2, 1]);
    }

    #[test]
    fn no_low_when_no_qualifier() {
        let hole = vec![
            c(Rank::King, Suit::Spades),
            c(Rank::King, Suit::Hearts),
            c(Rank::Queen, Suit::Clubs),
            c(Rank::Queen, Suit::Diamonds),
        ];
        let board = vec![
            c(Rank::Jack, Suit::Clubs),
            c(Rank::Ten, Suit::Spades),
            c(Rank::Nine, Suit::Spades),
            c(Rank::Two, Suit::Spades),
            c(Rank::Three, Suit::Hearts),
        ];
        assert!(qualifying_low(&hole, &board, Variant::OmahaHiLo).is_none());
    }
}
