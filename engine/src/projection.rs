use serde::{Deserialize, Serialize};

use crate::card::{Card, Variant};
use crate::history::HandWinner;
use crate::table::{BettingType, Blinds, LastAction, Stage, Table};

/// A seat as a given viewer sees it: `hole` is present only for the
/// viewer's own seat, or for any unfolded seat once the hand reaches
/// showdown (spec.md §4.7).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ViewerSeat {
    pub player_id: String,
    pub display_name: String,
    pub stack: u64,
    pub hole: Option<Vec<Card>>,
    pub folded: bool,
    pub is_all_in: bool,
    pub has_acted: bool,
    pub is_connected: bool,
    pub current_round_bet: u64,
    pub total_bet_this_hand: u64,
    pub seat_index: usize,
}

/// The read-only snapshot broadcast to a client: every table field except
/// other players' hidden hole cards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ViewerState {
    pub table_id: String,
    pub variant: Variant,
    pub betting_type: BettingType,
    pub blinds: Blinds,
    pub stake_label: String,
    pub stage: Stage,
    pub pot: u64,
    pub community: Vec<Card>,
    pub current_high_bet: u64,
    pub active_seat_index: Option<usize>,
    pub dealer_index: usize,
    pub hand_number: u64,
    pub seats: Vec<Option<ViewerSeat>>,
    pub winners: Vec<HandWinner>,
    pub last_action: Option<LastAction>,
}

impl Table {
    /// Projects this table's state for `viewer_id` (`None` for a
    /// spectator): the viewer's own hole cards are always visible, every
    /// other seat's hole cards are hidden until showdown, at which point
    /// unfolded seats are revealed to everyone.
    pub fn project_for(&self, viewer_id: Option<&str>) -> ViewerState {
        let seats = self
            .seats
            .iter()
            .map(|slot| {
                slot.as_ref().map(|seat| {
                    let reveal = Some(seat.player_id.as_str()) == viewer_id
                        || (self.stage == Stage::Showdown && self.contested && !seat.folded);
                    ViewerSeat {
                        player_id: seat.player_id.clone(),
                        display_name: seat.display_name.clone(),
                        stack: seat.stack,
                        hole: reveal.then(|| seat.hole.clone()),
                        folded: seat.folded,
                        is_all_in: seat.is_all_in,
                        has_acted: seat.has_acted,
                        is_connected: seat.is_connected,
                        current_round_bet: seat.current_round_bet,
                        total_bet_this_hand: seat.total_bet_this_hand,
                        seat_index: seat.seat_index,
                    }
                })
            })
            .collect();

        ViewerState {
            table_id: self.id.clone(),
            variant: self.variant,
            betting_type: self.betting_type,
            blinds: self.blinds,
            stake_label: self.stake_label.clone(),
            stage: self.stage,
            pot: self.pot,
            community: self.community.clone(),
            current_high_bet: self.current_high_bet,
            active_seat_index: self.active_seat_index,
            dealer_index: self.dealer_index,
            hand_number: self.hand_number,
            seats,
            winners: self.winners.clone(),
            last_action: self.last_action.clone(),
        }
    }
}
