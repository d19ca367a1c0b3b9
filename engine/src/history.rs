use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::action::Action;
use crate::card::Card;

/// One recorded winner of a finished hand.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HandWinner {
    pub player_id: String,
    pub amount: u64,
    pub hand_description: String,
}

/// Append-only per-hand record: starting stacks, hole cards, actions,
/// board, winners. Tables keep a bounded ring of the last 100.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HandHistoryRecord {
    pub hand_number: u64,
    pub starting_stacks: Vec<(String, u64)>,
    pub hole_cards: Vec<(String, Vec<Card>)>,
    pub actions: Vec<HistoryAction>,
    pub community_cards: Vec<Card>,
    pub final_pot: u64,
    pub winners: Vec<HandWinner>,
    pub timestamp_millis: u128,
}

/// A sanitized, serializable echo of an `Action` (the raw `Action` carries
/// a non-serializable `Instant`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryAction {
    pub player_id: String,
    pub kind: String,
    pub amount: Option<u64>,
}

impl From<&Action> for HistoryAction {
    fn from(a: &Action) -> Self {
        HistoryAction {
            player_id: a.player_id.clone(),
            kind: format!("{:?}", a.kind),
            amount: a.amount,
        }
    }
}

const MAX_HISTORY: usize = 100;

/// Bounded ring of recent hands for one table. Guarded implicitly by the
/// table's serial queue (see spec.md §5) — never accessed concurrently.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct HandHistory {
    records: VecDeque<HandHistoryRecord>,
}

impl HandHistory {
    pub fn push(&mut self, record: HandHistoryRecord) {
        self.records.push_back(record);
        while self.records.len() > MAX_HISTORY {
            self.records.pop_front();
        }
    }

    pub fn recent(&self) -> impl Iterator<Item = &HandHistoryRecord> {
        self.records.iter().rev()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// In-progress builder for the hand currently being played; finalized into
/// a `HandHistoryRecord` at `end_hand`.
#[derive(Debug, Clone)]
pub struct HandHistoryBuilder {
    pub hand_number: u64,
    pub starting_stacks: Vec<(String, u64)>,
    pub hole_cards: Vec<(String, Vec<Card>)>,
    pub actions: Vec<HistoryAction>,
}

impl HandHistoryBuilder {
    pub fn new(hand_number: u64) -> Self {
        Self {
            hand_number,
            starting_stacks: Vec::new(),
            hole_cards: Vec::new(),
            actions: Vec::new(),
        }
    }

    pub fn record_action(&mut self, action: &Action) {
        self.actions.push(action.into());
    }

    pub fn finish(
        self,
        community_cards: Vec<Card>,
        final_pot: u64,
        winners: Vec<HandWinner>,
        timestamp_millis: u128,
    ) -> HandHistoryRecord {
        HandHistoryRecord {
            hand_number: self.hand_number,
            starting_stacks: self.starting_stacks,
            hole_cards: self.hole_cards,
            actions: self.actions,
            community_cards,
            final_pot,
            winners,
            timestamp_millis,
        }
    }
}
