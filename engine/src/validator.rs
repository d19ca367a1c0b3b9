use std::collections::{HashMap, VecDeque};
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

use crate::action::Action;
use crate::error::EngineError;
use crate::table::Table;

const RATE_WINDOW: Duration = Duration::from_secs(1);
const RATE_LIMIT: usize = 5;
const TIMING_FLOOR: Duration = Duration::from_millis(100);
const TIMING_SUSPICIOUS_CEILING: Duration = Duration::from_millis(200);
const MAX_FLAGGED_EVENTS: usize = 1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Severity {
    Low,
    Medium,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlaggedEvent {
    pub player_id: String,
    pub table_id: String,
    pub reason: String,
    pub severity: Severity,
    #[serde(skip, default = "Instant::now")]
    pub at: Instant,
}

/// Pure-ish predicate layered in front of `Table::apply_action`. The only
/// state it owns is the per-player rate/timing buckets and the bounded
/// flagged-activity log; it never mutates the table. See spec.md §4.4.
#[derive(Debug, Default)]
pub struct Validator {
    recent_actions: HashMap<String, VecDeque<Instant>>,
    last_action_at: HashMap<String, Instant>,
    flagged: VecDeque<FlaggedEvent>,
}

impl Validator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn flagged_events(&self) -> impl Iterator<Item = &FlaggedEvent> {
        self.flagged.iter()
    }

    fn flag(&mut self, player_id: &str, table_id: &str, reason: &str, severity: Severity) {
        self.flagged.push_back(FlaggedEvent {
            player_id: player_id.to_string(),
            table_id: table_id.to_string(),
            reason: reason.to_string(),
            severity,
            at: Instant::now(),
        });
        while self.flagged.len() > MAX_FLAGGED_EVENTS {
            self.flagged.pop_front();
        }
    }

    /// Runs the ordered checks from spec.md §4.4: rate limit, timing, turn,
    /// legality, amounts. The last two are re-validated structurally inside
    /// `Table::apply_action`; this method only gates what it can check
    /// without mutating the table (turn ownership, request cadence).
    pub fn validate(&mut self, table: &Table, action: &Action) -> Result<(), EngineError> {
        let now = action.timestamp;

        // 1. Rate limit: at most 5 actions per rolling 1s window.
        let window = self
            .recent_actions
            .entry(action.player_id.clone())
            .or_default();
        while let Some(&front) = window.front() {
            if now.duration_since(front) > RATE_WINDOW {
                window.pop_front();
            } else {
                break;
            }
        }
        if window.len() >= RATE_LIMIT {
            self.flag(&action.player_id, &action.table_id, "rate limit exceeded", Severity::Medium);
            return Err(EngineError::RateLimited);
        }
        window.push_back(now);

        // 2. Timing: inter-action delta >= 100ms hard floor, 100-200ms flagged.
        if let Some(&last) = self.last_action_at.get(&action.player_id) {
            let delta = now.saturating_duration_since(last);
            if delta < TIMING_FLOOR {
                self.flag(&action.player_id, &action.table_id, "timing floor violated", Severity::Low);
                return Err(EngineError::TimingViolation);
            }
            if delta < TIMING_SUSPICIOUS_CEILING {
                self.flag(&action.player_id, &action.table_id, "fast action cadence", Severity::Low);
            }
        }
        self.last_action_at.insert(action.player_id.clone(), now);

        // 3. Turn: actor must equal activeSeatIndex.
        let Some(active_idx) = table.active_seat_index else {
            return Err(EngineError::NotInHand);
        };
        let Some(seat) = table.seat_for_player(&action.player_id) else {
            return Err(EngineError::NotInHand);
        };
        if seat.seat_index != active_idx {
            return Err(EngineError::NotYourTurn);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::ActionKind;
    use crate::card::Variant;
    use crate::table::{BettingType, Blinds, Table};

    fn sample_table() -> Table {
        let mut t = Table::create(
            "t1".into(),
            Variant::TexasHoldem,
            BettingType::NoLimit,
            Blinds { small: 1, big: 2, ante: None },
            "1/2".into(),
            false,
        );
        t.add_seat("alice".into(), "Alice".into(), 200, None).unwrap();
        t.add_seat("bob".into(), "Bob".into(), 200, None).unwrap();
        t.start_hand().unwrap();
        t
    }

    fn action_for(table: &Table, player: &str, kind: ActionKind, at: Instant) -> Action {
        Action {
            player_id: player.to_string(),
            table_id: table.id.clone(),
            kind,
            amount: None,
            timestamp: at,
        }
    }

    #[test]
    fn rejects_out_of_turn_action() {
        let table = sample_table();
        let mut validator = Validator::new();
        let not_to_act = table
            .seats
            .iter()
            .flatten()
            .find(|s| s.seat_index != table.active_seat_index.unwrap())
            .unwrap();
        let action = action_for(&table, &not_to_act.player_id, ActionKind::Check, Instant::now());
        assert_eq!(validator.validate(&table, &action), Err(EngineError::NotYourTurn));
    }

    #[test]
    fn rejects_sub_100ms_cadence() {
        let table = sample_table();
        let mut validator = Validator::new();
        let to_act = table.seat_at(table.active_seat_index.unwrap()).unwrap();
        let base = Instant::now();
        let a1 = action_for(&table, &to_act.player_id, ActionKind::Check, base);
        assert!(validator.validate(&table, &a1).is_ok());
        let a2 = action_for(&table, &to_act.player_id, ActionKind::Check, base + Duration::from_millis(50));
        assert_eq!(validator.validate(&table, &a2), Err(EngineError::TimingViolation));
    }

    #[test]
    fn rejects_sixth_action_within_one_second() {
        let table = sample_table();
        let mut validator = Validator::new();
        let to_act = table.seat_at(table.active_seat_index.unwrap()).unwrap().clone();
        let base = Instant::now();
        for i in 0..5u32 {
            let at = base + Duration::from_millis(150 * i as u64);
            let a = action_for(&table, &to_act.player_id, ActionKind::Check, at);
            assert!(validator.validate(&table, &a).is_ok());
        }
        let sixth = action_for(&table, &to_act.player_id, ActionKind::Check, base + Duration::from_millis(700));
        assert_eq!(validator.validate(&table, &sixth), Err(EngineError::RateLimited));
    }
}
