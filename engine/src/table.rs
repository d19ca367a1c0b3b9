use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

use crate::action::{Action, ActionKind};
use crate::card::{Card, Deck, Variant};
use crate::error::{ActionIllegalReason, EngineError};
use crate::eval::{self, HandScore};
use crate::history::{HandHistory, HandHistoryBuilder, HandWinner};
use crate::seat::Seat;

pub const MAX_RAISES_PER_ROUND: u8 = 4;
pub const TURN_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum BettingType {
    NoLimit,
    PotLimit,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Blinds {
    pub small: u64,
    pub big: u64,
    pub ante: Option<u64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Stage {
    Waiting,
    Preflop,
    Flop,
    Turn,
    River,
    Showdown,
}

impl Stage {
    fn is_betting_stage(self) -> bool {
        matches!(self, Stage::Preflop | Stage::Flop | Stage::Turn | Stage::River)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LastAction {
    pub player_id: String,
    pub kind: ActionKind,
    pub amount: Option<u64>,
}

/// The per-table state machine. The only component permitted to mutate a
/// table's state, per spec.md §4.3. Not re-entrant — callers (the session
/// coordinator) must serialize access, e.g. via a per-table actor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Table {
    pub id: String,
    pub variant: Variant,
    pub betting_type: BettingType,
    pub blinds: Blinds,
    pub stake_label: String,
    pub system: bool,
    pub stage: Stage,
    pub max_seats: usize,
    pub seats: Vec<Option<Seat>>,
    pub pot: u64,
    pub community: Vec<Card>,
    pub current_high_bet: u64,
    pub active_seat_index: Option<usize>,
    pub dealer_index: usize,
    pub hand_number: u64,
    pub raises_this_round: u8,
    pub last_raise_amount: u64,
    #[serde(skip, default = "Instant::now")]
    pub last_action_timestamp: Instant,
    pub last_action: Option<LastAction>,
    pub winners: Vec<HandWinner>,
    /// True once the current/last hand reached a genuine showdown (more
    /// than one seat stayed in through the river or an all-in runout).
    /// Gates hole-card reveal in `projection.rs` — an uncontested fold
    /// win must never show the remaining seat's hand (spec.md §4.3).
    pub contested: bool,
    /// Per-seat flag: false once a seat has acted and then faced an
    /// all-in raise below the minimum increment (spec.md §4.3's all-in
    /// under-raise exception) — such a seat may only call or fold until
    /// a full raise reopens the round for everyone again.
    can_reraise: Vec<bool>,
    deck: Option<Deck>,
    pub history: HandHistory,
    #[serde(skip)]
    hand_builder: Option<HandHistoryBuilder>,
}

impl Table {
    pub fn create(
        id: String,
        variant: Variant,
        betting_type: BettingType,
        blinds: Blinds,
        stake_label: String,
        system: bool,
    ) -> Self {
        let max_seats = variant.max_seats();
        Table {
            id,
            variant,
            betting_type,
            blinds,
            stake_label,
            system,
            stage: Stage::Waiting,
            max_seats,
            seats: vec![None; max_seats],
            pot: 0,
            community: Vec::new(),
            current_high_bet: 0,
            active_seat_index: None,
            dealer_index: 0,
            hand_number: 0,
            raises_this_round: 0,
            last_raise_amount: 0,
            last_action_timestamp: Instant::now(),
            last_action: None,
            winners: Vec::new(),
            contested: false,
            can_reraise: vec![true; max_seats],
            deck: None,
            history: HandHistory::default(),
            hand_builder: None,
        }
    }

    // ---- queries -----------------------------------------------------

    pub fn seat_at(&self, idx: usize) -> Option<&Seat> {
        self.seats.get(idx).and_then(|s| s.as_ref())
    }

    pub fn seat_for_player(&self, player_id: &str) -> Option<&Seat> {
        self.seats.iter().flatten().find(|s| s.player_id == player_id)
    }

    fn seat_index_for_player(&self, player_id: &str) -> Option<usize> {
        self.seat_for_player(player_id).map(|s| s.seat_index)
    }

    pub fn connected_seat_count(&self) -> usize {
        self.seats.iter().flatten().filter(|s| s.is_connected).count()
    }

    /// Total occupied seats regardless of connection state — what a lobby
    /// browser means by "seated" (spec.md §6's `tableList` rows).
    pub fn seated_count(&self) -> usize {
        self.seats.iter().flatten().count()
    }

    fn occupied_indices(&self) -> Vec<usize> {
        self.seats
            .iter()
            .enumerate()
            .filter_map(|(i, s)| s.as_ref().map(|_| i))
            .collect()
    }

    fn next_occupied_from(&self, from: usize) -> usize {
        let n = self.max_seats;
        let mut idx = from;
        for _ in 0..n {
            idx = (idx + 1) % n;
            if self.seats[idx].is_some() {
                return idx;
            }
        }
        from
    }

    fn next_actor_from(&self, from: usize) -> Option<usize> {
        let n = self.max_seats;
        let mut idx = from;
        for _ in 0..n {
            idx = (idx + 1) % n;
            if let Some(s) = &self.seats[idx] {
                if s.can_act() {
                    return Some(idx);
                }
            }
        }
        None
    }

    /// Seat indices in clockwise order starting just after the dealer —
    /// used to break odd-chip remainder ties deterministically (spec.md §4.3).
    fn clockwise_from_dealer(&self) -> Vec<usize> {
        let n = self.max_seats;
        (1..=n)
            .map(|offset| (self.dealer_index + offset) % n)
            .filter(|&i| self.seats[i].is_some())
            .collect()
    }

    // ---- seating -------------------------------------------------------

    pub fn add_seat(
        &mut self,
        player_id: String,
        display_name: String,
        buy_in: u64,
        requested_seat: Option<usize>,
    ) -> Result<usize, EngineError> {
        if let Some(existing) = self.seats.iter_mut().flatten().find(|s| s.player_id == player_id) {
            if existing.is_connected {
                return Err(EngineError::AlreadySeated);
            }
            existing.is_connected = true;
            return Ok(existing.seat_index);
        }

        let target = match requested_seat {
            Some(i) if i < self.max_seats && self.seats[i].is_none() => i,
            _ => self
                .seats
                .iter()
                .position(|s| s.is_none())
                .ok_or(EngineError::TableFull)?,
        };

        self.seats[target] = Some(Seat::new(player_id, display_name, buy_in, target));

        if self.connected_seat_count() >= 2 && self.stage == Stage::Waiting {
            let _ = self.start_hand();
        }

        Ok(target)
    }

    pub fn remove_seat(&mut self, player_id: &str) -> Result<(), EngineError> {
        let idx = self.seat_index_for_player(player_id).ok_or(EngineError::TableNotFound)?;
        match self.stage {
            Stage::Waiting | Stage::Showdown => {
                self.seats[idx] = None;
            }
            _ => {
                if let Some(seat) = self.seats[idx].as_mut() {
                    seat.folded = true;
                    seat.is_connected = false;
                }
            }
        }
        Ok(())
    }

    /// Moves `player_id` to `new_seat_index`, provided the table is not
    /// mid-hand and the target seat is empty (spec.md §6's `changeSeat`).
    pub fn change_seat(&mut self, player_id: &str, new_seat_index: usize) -> Result<(), EngineError> {
        if new_seat_index >= self.max_seats {
            return Err(EngineError::InvalidSeatIndex);
        }
        let current = self.seat_index_for_player(player_id).ok_or(EngineError::NotInHand)?;
        if current == new_seat_index {
            return Ok(());
        }
        if self.seats[new_seat_index].is_some() {
            return Err(EngineError::SeatTaken);
        }
        if self.stage != Stage::Waiting && self.stage != Stage::Showdown {
            return Err(EngineError::SeatChangeUnavailable);
        }
        self.seats.swap(current, new_seat_index);
        if let Some(seat) = self.seats[new_seat_index].as_mut() {
            seat.seat_index = new_seat_index;
        }
        if self.dealer_index == current {
            self.dealer_index = new_seat_index;
        }
        Ok(())
    }

    fn purge_dead_seats(&mut self) {
        for seat_slot in self.seats.iter_mut() {
            let drop_it = matches!(seat_slot, Some(s) if !s.is_connected || s.stack == 0);
            if drop_it {
                *seat_slot = None;
            }
        }
    }

    // ---- hand lifecycle --------------------------------------------------

    /// Forces the dealer button to a specific seat. Primarily useful for
    /// deterministic tests and tournament-director overrides; normal play
    /// relies on `start_hand`'s automatic rotation.
    pub fn set_dealer_seat(&mut self, idx: usize) {
        self.dealer_index = idx;
    }

    /// Purges dead seats, deals a new hand, and posts blinds. Returns
    /// `Ok(false)` (rather than erroring) when a hand is already in
    /// progress or fewer than two seats remain — spec.md's
    /// `TableState | null` return.
    pub fn start_hand(&mut self) -> Result<bool, EngineError> {
        if self.stage != Stage::Waiting && self.stage != Stage::Showdown {
            return Ok(false);
        }
        self.purge_dead_seats();
        let occupied = self.occupied_indices();
        if occupied.len() < 2 {
            return Ok(false);
        }

        self.stage = Stage::Preflop;
        self.pot = 0;
        self.community.clear();
        self.current_high_bet = 0;
        self.raises_this_round = 0;
        self.last_raise_amount = self.blinds.big;
        self.winners.clear();
        self.contested = false;
        self.can_reraise = vec![true; self.max_seats];
        self.hand_number += 1;

        for idx in &occupied {
            self.seats[*idx].as_mut().unwrap().reset_for_new_hand();
        }

        let mut deck = Deck::shuffled(self.variant);
        let hole_count = self.variant.hole_cards();
        for idx in &occupied {
            let cards = deck.draw(hole_count)?;
            self.seats[*idx].as_mut().unwrap().hole = cards;
        }

        if self.variant.deals_early_board_card() {
            self.community.push(deck.draw_one()?);
        }
        self.deck = Some(deck);

        self.dealer_index = if occupied.contains(&self.dealer_index) {
            self.dealer_index
        } else {
            occupied[0]
        };
        // Rotate to the next occupied seat, except on the very first hand
        // dealt at this table where whatever seat currently holds the
        // button plays as dealer.
        if self.hand_number > 1 {
            self.dealer_index = self.next_occupied_from(self.dealer_index);
        }

        let (sb_idx, bb_idx) = if occupied.len() == 2 {
            // Heads-up exception (spec.md §9): the dealer posts the small
            // blind, the opponent posts the big blind.
            (self.dealer_index, self.next_occupied_from(self.dealer_index))
        } else {
            let sb = self.next_occupied_from(self.dealer_index);
            (sb, self.next_occupied_from(sb))
        };

        let sb_amount = self.blinds.small.min(self.seats[sb_idx].as_ref().unwrap().stack);
        self.seats[sb_idx].as_mut().unwrap().commit(sb_amount);
        self.pot += sb_amount;

        let bb_amount = self.blinds.big.min(self.seats[bb_idx].as_ref().unwrap().stack);
        self.seats[bb_idx].as_mut().unwrap().commit(bb_amount);
        self.pot += bb_amount;

        self.current_high_bet = self.seats[bb_idx].as_ref().unwrap().current_round_bet;
        self.active_seat_index = self.next_actor_from(bb_idx).or(Some(bb_idx));
        self.last_action_timestamp = Instant::now();

        let mut builder = HandHistoryBuilder::new(self.hand_number);
        for idx in &occupied {
            let seat = self.seats[*idx].as_ref().unwrap();
            builder
                .starting_stacks
                .push((seat.player_id.clone(), seat.stack + seat.total_bet_this_hand));
            builder.hole_cards.push((seat.player_id.clone(), seat.hole.clone()));
        }
        self.hand_builder = Some(builder);

        Ok(true)
    }

    // ---- betting -----------------------------------------------------

    pub fn apply_action(&mut self, action: &Action) -> Result<(), EngineError> {
        if !self.stage.is_betting_stage() {
            return Err(EngineError::NotInHand);
        }
        let seat_idx = self.seat_index_for_player(&action.player_id).ok_or(EngineError::NotInHand)?;
        if self.active_seat_index != Some(seat_idx) {
            return Err(EngineError::NotYourTurn);
        }

        self.apply_action_to_seat(seat_idx, action)?;

        if let Some(builder) = self.hand_builder.as_mut() {
            builder.record_action(action);
        }
        self.last_action = Some(LastAction {
            player_id: action.player_id.clone(),
            kind: action.kind,
            amount: action.amount,
        });
        self.last_action_timestamp = action.timestamp;

        self.verify_pot_invariant()?;
        self.after_action(seat_idx);
        Ok(())
    }

    fn apply_action_to_seat(&mut self, seat_idx: usize, action: &Action) -> Result<(), EngineError> {
        let to_call = {
            let seat = self.seats[seat_idx].as_ref().unwrap();
            self.current_high_bet.saturating_sub(seat.current_round_bet)
        };

        match action.kind {
            ActionKind::Fold => {
                let seat = self.seats[seat_idx].as_mut().unwrap();
                seat.folded = true;
                seat.has_acted = true;
            }
            ActionKind::Check => {
                if to_call != 0 {
                    return Err(EngineError::ActionIllegal(ActionIllegalReason::CheckWhenMustCall));
                }
                self.seats[seat_idx].as_mut().unwrap().has_acted = true;
            }
            ActionKind::Call => {
                let seat = self.seats[seat_idx].as_mut().unwrap();
                let pay = to_call.min(seat.stack);
                seat.commit(pay);
                self.pot += pay;
                seat.has_acted = true;
            }
            ActionKind::Raise => {
                let target = action.amount.ok_or(EngineError::ActionIllegal(ActionIllegalReason::BelowMinRaise))?;
                if !self.can_reraise[seat_idx] {
                    return Err(EngineError::ActionIllegal(ActionIllegalReason::BelowMinRaise));
                }
                if self.raises_this_round >= MAX_RAISES_PER_ROUND {
                    return Err(EngineError::ActionIllegal(ActionIllegalReason::MaxRaisesReached));
                }
                if target <= self.current_high_bet {
                    return Err(EngineError::ActionIllegal(ActionIllegalReason::BelowMinRaise));
                }
                let increment = target - self.current_high_bet;
                if increment < self.last_raise_amount {
                    return Err(EngineError::ActionIllegal(ActionIllegalReason::BelowMinRaise));
                }
                if self.betting_type == BettingType::PotLimit {
                    let max_target = self.pot + self.current_high_bet + to_call;
                    if target > max_target {
                        return Err(EngineError::ActionIllegal(ActionIllegalReason::AbovePotLimit));
                    }
                }
                let seat = self.seats[seat_idx].as_ref().unwrap();
                let contribution = target.saturating_sub(seat.current_round_bet);
                if contribution > seat.stack {
                    return Err(EngineError::ActionIllegal(ActionIllegalReason::InsufficientStack));
                }
                self.seats[seat_idx].as_mut().unwrap().commit(contribution);
                self.pot += contribution;
                self.current_high_bet = target;
                self.last_raise_amount = increment;
                self.raises_this_round += 1;
                self.seats[seat_idx].as_mut().unwrap().has_acted = true;
                self.reopen_for_everyone_but(seat_idx);
            }
            ActionKind::AllIn => {
                let seat = self.seats[seat_idx].as_mut().unwrap();
                let contribution = seat.stack;
                if contribution == 0 {
                    return Err(EngineError::ActionIllegal(ActionIllegalReason::InsufficientStack));
                }
                seat.commit(contribution);
                self.pot += contribution;
                seat.has_acted = true;
                let new_round_bet = seat.current_round_bet;

                if new_round_bet > self.current_high_bet {
                    let increment = new_round_bet - self.current_high_bet;
                    let prev_last_raise = self.last_raise_amount;
                    self.current_high_bet = new_round_bet;
                    if increment >= prev_last_raise {
                        self.last_raise_amount = increment;
                        self.raises_this_round = (self.raises_this_round + 1).min(MAX_RAISES_PER_ROUND);
                        self.reopen_for_everyone_but(seat_idx);
                    } else {
                        // All-in under-raise exception (spec.md §4.3/§8 #3):
                        // seats that already acted keep their raise rights
                        // revoked for the rest of this round; seats that
                        // have not acted yet are unaffected.
                        for (idx, slot) in self.seats.iter().enumerate() {
                            if idx == seat_idx {
                                continue;
                            }
                            if let Some(s) = slot {
                                if !s.folded && !s.is_all_in && s.has_acted {
                                    self.can_reraise[idx] = false;
                                }
                            }
                        }
                    }
                }
            }
        }
        Ok(())
    }

    fn reopen_for_everyone_but(&mut self, raiser_idx: usize) {
        for (idx, slot) in self.seats.iter_mut().enumerate() {
            if idx == raiser_idx {
                continue;
            }
            if let Some(s) = slot {
                if !s.folded && !s.is_all_in {
                    s.has_acted = false;
                }
            }
        }
        for flag in self.can_reraise.iter_mut() {
            *flag = true;
        }
    }

    fn verify_pot_invariant(&mut self) -> Result<(), EngineError> {
        let total: u64 = self.seats.iter().flatten().map(|s| s.total_bet_this_hand).sum();
        if total != self.pot {
            self.abort_hand();
            return Err(EngineError::InvariantViolation("pot != sum(total_bet_this_hand)"));
        }
        Ok(())
    }

    /// Fatal-invariant recovery path (spec.md §7): refund every seat's
    /// contribution for this hand, broadcast-worthy error is the caller's
    /// job (they observe the `Err` return), and reset to `waiting`.
    fn abort_hand(&mut self) {
        tracing::error!(table_id = %self.id, "aborting hand: pot invariant violated, refunding contributions");
        for slot in self.seats.iter_mut() {
            if let Some(s) = slot {
                s.stack += s.total_bet_this_hand;
                s.total_bet_this_hand = 0;
                s.current_round_bet = 0;
                s.folded = false;
                s.is_all_in = false;
            }
        }
        self.pot = 0;
        self.community.clear();
        self.stage = Stage::Waiting;
        self.active_seat_index = None;
        self.hand_builder = None;
    }

    fn after_action(&mut self, acted_seat_idx: usize) {
        let non_folded: Vec<usize> = self
            .occupied_indices()
            .into_iter()
            .filter(|&i| !self.seats[i].as_ref().unwrap().folded)
            .collect();

        if non_folded.len() <= 1 {
            self.run_uncontested_showdown(non_folded.first().copied());
            return;
        }

        let to_act: Vec<usize> = non_folded.iter().copied().filter(|&i| self.seats[i].as_ref().unwrap().can_act()).collect();
        let all_matched = to_act.iter().all(|&i| {
            let s = self.seats[i].as_ref().unwrap();
            s.has_acted && s.current_round_bet == self.current_high_bet
        });

        if all_matched {
            self.advance_stage();
        } else {
            self.active_seat_index = self.next_actor_from(acted_seat_idx);
        }
    }

    fn run_uncontested_showdown(&mut self, winner_idx: Option<usize>) {
        self.stage = Stage::Showdown;
        self.contested = false;
        self.active_seat_index = None;
        if let Some(idx) = winner_idx {
            let amount = self.pot;
            let seat = self.seats[idx].as_mut().unwrap();
            seat.stack += amount;
            self.winners = vec![HandWinner {
                player_id: seat.player_id.clone(),
                amount,
                hand_description: "uncontested".to_string(),
            }];
        }
        self.finalize_hand();
        self.purge_dead_seats();
    }

    fn advance_stage(&mut self) {
        loop {
            for slot in self.seats.iter_mut() {
                if let Some(s) = slot {
                    s.reset_for_new_round();
                }
            }
            self.current_high_bet = 0;
            self.raises_this_round = 0;
            // The minimum opening bet of a new street is the big blind,
            // same as the minimum raise increment preflop.
            self.last_raise_amount = self.blinds.big;
            self.can_reraise = vec![true; self.max_seats];

            let deck = self.deck.as_mut().expect("deck is present for the duration of a hand");
            match self.stage {
                Stage::Preflop => {
                    let n = if self.variant.deals_early_board_card() { 2 } else { 3 };
                    if let Ok(cards) = deck.draw(n) {
                        self.community.extend(cards);
                    }
                    self.stage = Stage::Flop;
                }
                Stage::Flop => {
                    if let Ok(c) = deck.draw_one() {
                        self.community.push(c);
                    }
                    self.stage = Stage::Turn;
                }
                Stage::Turn => {
                    if let Ok(c) = deck.draw_one() {
                        self.community.push(c);
                    }
                    self.stage = Stage::River;
                }
                Stage::River => {
                    self.stage = Stage::Showdown;
                }
                Stage::Waiting | Stage::Showdown => break,
            }

            if self.stage == Stage::Showdown {
                self.resolve_showdown();
                self.purge_dead_seats();
                break;
            }

            let first_actor = self.next_actor_from(self.dealer_index);
            let actors_remaining = self
                .occupied_indices()
                .into_iter()
                .filter(|&i| {
                    let s = self.seats[i].as_ref().unwrap();
                    !s.folded && s.can_act()
                })
                .count();
            if actors_remaining <= 1 {
                // everyone else all-in or folded: keep dealing, no more betting
                continue;
            }
            self.active_seat_index = first_actor;
            self.last_action_timestamp = Instant::now();
            break;
        }
    }

    // ---- showdown & side pots -----------------------------------------

    fn resolve_showdown(&mut self) {
        self.contested = true;
        let contenders = self.occupied_indices();
        let non_folded: Vec<usize> = contenders.iter().copied().filter(|&i| !self.seats[i].as_ref().unwrap().folded).collect();

        let mut scores: std::collections::HashMap<usize, HandScore> = std::collections::HashMap::new();
        let mut lows: std::collections::HashMap<usize, Option<eval::LowScore>> = std::collections::HashMap::new();
        for &i in &non_folded {
            let seat = self.seats[i].as_ref().unwrap();
            scores.insert(i, eval::best_hand(&seat.hole, &self.community, self.variant));
            if self.variant.is_hi_lo() {
                lows.insert(i, eval::qualifying_low(&seat.hole, &self.community, self.variant));
            }
        }

        let layers = self.side_pot_layers();
        let order = self.clockwise_from_dealer();
        let mut awards: std::collections::HashMap<usize, u64> = std::collections::HashMap::new();
        let mut descriptions: std::collections::HashMap<usize, String> = std::collections::HashMap::new();

        for (amount, eligible) in layers {
            if amount == 0 || eligible.is_empty() {
                continue;
            }
            let eligible_pairs: Vec<(usize, usize)> = eligible.iter().map(|&i| (i, i)).collect();

            if self.variant.is_hi_lo() {
                let high_winners = eval::determine_winners(&eligible_pairs, |&i| scores[&i].clone(), self.variant);
                let low_winners = eval::determine_low_winners(&eligible_pairs, |&i| lows.get(&i).cloned().flatten());

                if low_winners.is_empty() {
                    Self::distribute(&mut awards, &order, &high_winners, amount);
                    for &w in &high_winners {
                        descriptions.insert(w, scores[&w].description.clone());
                    }
                } else {
                    let half = amount / 2;
                    let remainder = amount - half * 2;
                    Self::distribute(&mut awards, &order, &high_winners, half + remainder);
                    Self::distribute(&mut awards, &order, &low_winners, half);
                    for &w in &high_winners {
                        descriptions.insert(w, scores[&w].description.clone());
                    }
                    for &w in &low_winners {
                        descriptions.entry(w).or_insert_with(|| "qualified low".to_string());
                    }
                }
            } else {
                let winners = eval::determine_winners(&eligible_pairs, |&i| scores[&i].clone(), self.variant);
                Self::distribute(&mut awards, &order, &winners, amount);
                for &w in &winners {
                    descriptions.insert(w, scores[&w].description.clone());
                }
            }
        }

        let mut winners = Vec::new();
        for (idx, amount) in &awards {
            if *amount == 0 {
                continue;
            }
            let seat = self.seats[*idx].as_mut().unwrap();
            seat.stack += *amount;
            winners.push(HandWinner {
                player_id: seat.player_id.clone(),
                amount: *amount,
                hand_description: descriptions.get(idx).cloned().unwrap_or_default(),
            });
        }
        self.winners = winners;
        self.finalize_hand();
    }

    /// Awards `amount` split evenly among `winners`, with the remainder
    /// going to the first winner encountered in `order` (clockwise from
    /// the dealer), per spec.md §4.3.
    fn distribute(awards: &mut std::collections::HashMap<usize, u64>, order: &[usize], winners: &[usize], amount: u64) {
        if winners.is_empty() {
            return;
        }
        let share = amount / winners.len() as u64;
        let remainder = amount - share * winners.len() as u64;
        for &w in winners {
            *awards.entry(w).or_insert(0) += share;
        }
        if remainder > 0 {
            if let Some(&first) = order.iter().find(|i| winners.contains(i)) {
                *awards.entry(first).or_insert(0) += remainder;
            }
        }
    }

    /// Layers the pot by ascending all-in contribution level: each layer's
    /// amount is `min(contribution, level) - previous_level` summed over
    /// every contributing seat, eligible only to seats whose contribution
    /// reaches that level and who have not folded.
    fn side_pot_layers(&self) -> Vec<(u64, Vec<usize>)> {
        let mut remaining: Vec<(usize, u64)> = self
            .occupied_indices()
            .into_iter()
            .filter_map(|i| {
                let s = self.seats[i].as_ref().unwrap();
                (s.total_bet_this_hand > 0).then_some((i, s.total_bet_this_hand))
            })
            .collect();

        let mut pots = Vec::new();
        while !remaining.is_empty() {
            let level = remaining.iter().map(|&(_, b)| b).min().unwrap();
            let amount = level * remaining.len() as u64;
            let eligible: Vec<usize> = remaining
                .iter()
                .map(|&(i, _)| i)
                .filter(|&i| !self.seats[i].as_ref().unwrap().folded)
                .collect();
            pots.push((amount, eligible));
            remaining = remaining
                .into_iter()
                .filter_map(|(i, b)| (b > level).then_some((i, b - level)))
                .collect();
        }
        pots
    }

    fn finalize_hand(&mut self) {
        self.active_seat_index = None;
        if let Some(builder) = self.hand_builder.take() {
            let timestamp_millis = Instant::now().duration_since(self.last_action_timestamp).as_millis();
            let record = builder.finish(self.community.clone(), self.pot, self.winners.clone(), timestamp_millis);
            self.history.push(record);
        }
        self.deck = None;
    }

    // ---- turn timer -----------------------------------------------------

    /// If the active seat has exceeded the 30s turn timer as of `now`,
    /// applies the implicit action (check if legal, else fold) and returns
    /// `true`. Pure with respect to wall-clock time — callers drive `now`
    /// explicitly so tests (and a paused Tokio clock) stay deterministic.
    pub fn apply_turn_timeout(&mut self, now: Instant) -> Result<bool, EngineError> {
        let Some(idx) = self.active_seat_index else {
            return Ok(false);
        };
        if now.duration_since(self.last_action_timestamp) < TURN_TIMEOUT {
            return Ok(false);
        }
        let player_id = self.seats[idx].as_ref().unwrap().player_id.clone();
        let to_call = self.current_high_bet.saturating_sub(self.seats[idx].as_ref().unwrap().current_round_bet);
        let kind = if to_call == 0 { ActionKind::Check } else { ActionKind::Fold };
        let action = Action {
            player_id,
            table_id: self.id.clone(),
            kind,
            amount: None,
            timestamp: now,
        };
        self.apply_action(&action)?;
        Ok(true)
    }
}
