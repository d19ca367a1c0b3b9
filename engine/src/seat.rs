use std::time::Instant;

use serde::{Deserialize, Serialize};

use crate::card::Card;

/// Server-side view of one occupied seat. See spec.md §3 for the invariants
/// the table engine maintains over these fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Seat {
    pub player_id: String,
    pub display_name: String,
    pub stack: u64,
    pub hole: Vec<Card>,
    pub folded: bool,
    pub is_all_in: bool,
    pub has_acted: bool,
    pub is_connected: bool,
    pub current_round_bet: u64,
    pub total_bet_this_hand: u64,
    pub seat_index: usize,
    #[serde(skip, default = "Instant::now")]
    pub last_action_at: Instant,
}

impl Seat {
    pub fn new(player_id: String, display_name: String, stack: u64, seat_index: usize) -> Self {
        Self {
            player_id,
            display_name,
            stack,
            hole: Vec::new(),
            folded: false,
            is_all_in: false,
            has_acted: false,
            is_connected: true,
            current_round_bet: 0,
            total_bet_this_hand: 0,
            seat_index,
            last_action_at: Instant::now(),
        }
    }

    /// A seat still owed action: in the hand, not all-in.
    pub fn can_act(&self) -> bool {
        !self.folded && !self.is_all_in && self.stack > 0
    }

    pub fn reset_for_new_hand(&mut self) {
        self.hole.clear();
        self.folded = false;
        self.is_all_in = false;
        self.has_acted = false;
        self.current_round_bet = 0;
        self.total_bet_this_hand = 0;
    }

    pub fn reset_for_new_round(&mut self) {
        self.current_round_bet = 0;
        if !self.folded && !self.is_all_in {
            self.has_acted = false;
        }
    }

    /// Commits `amount` from the stack into the pot for this street.
    /// Caller is responsible for capping `amount` at the stack.
    pub fn commit(&mut self, amount: u64) {
        debug_assert!(amount <= self.stack, "commit must not exceed stack");
        self.stack -= amount;
        self.current_round_bet += amount;
        self.total_bet_this_hand += amount;
        if self.stack == 0 {
            self.is_all_in = true;
        }
    }
}
