//! Wire types for the `{ "event": ..., "data": ... }` envelope (spec.md §6).
//! The teacher's `main.rs` tags its `ClientAction`/`ServerEvent` enums flat
//! with `#[serde(tag = "type")]`; here the wire format nests the payload
//! under `data`, so the same one-enum-per-direction idiom uses `tag`+`content`
//! instead.

use poker_engine::{BettingType, Blinds, Variant, ViewerState};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "camelCase")]
pub enum ClientEvent {
    JoinTable {
        table_id: String,
        buy_in: u64,
        seat_index: Option<usize>,
    },
    LeaveTable {
        table_id: String,
    },
    StartHand {
        table_id: String,
    },
    Action {
        table_id: String,
        kind: String,
        amount: Option<u64>,
    },
    ChangeSeat {
        table_id: String,
        new_seat_index: usize,
    },
    WatchTable {
        table_id: String,
    },
    UnwatchTable {
        table_id: String,
    },
    CreateUserTable {
        variant: Variant,
        stake_label: String,
        blinds: Blinds,
        betting_type: BettingType,
    },
    GetTables,
    SubscribeTables,
    UnsubscribeTables,
    GetState {
        table_id: String,
    },
}

/// One row of a `tableList` reply — enough to populate a lobby browser
/// without leaking any seat's private state.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TableSummary {
    pub table_id: String,
    pub variant: Variant,
    pub stake_label: String,
    pub betting_type: BettingType,
    pub seated: usize,
    pub max_seats: usize,
    pub hand_number: u64,
}

#[derive(Debug, Serialize)]
#[serde(tag = "event", content = "data", rename_all = "camelCase")]
pub enum ServerEvent {
    /// Sent only to the seated player whose hole cards the projection reveals.
    GameState(ViewerState),
    /// Sanitized projection broadcast to every watcher of a table.
    SpectatorState(ViewerState),
    TableList(Vec<TableSummary>),
    AuthError {
        message: String,
    },
    Reply {
        success: bool,
        error: Option<String>,
    },
}

impl ServerEvent {
    pub fn ok() -> Self {
        ServerEvent::Reply { success: true, error: None }
    }

    pub fn err(message: impl Into<String>) -> Self {
        ServerEvent::Reply { success: false, error: Some(message.into()) }
    }
}

pub fn parse_action_kind(kind: &str, amount: Option<u64>) -> Result<poker_engine::ActionKind, String> {
    use poker_engine::ActionKind::*;
    match kind {
        "fold" => Ok(Fold),
        "check" => Ok(Check),
        "call" => Ok(Call),
        "raise" => {
            if amount.is_none() {
                return Err("raise requires an amount".to_string());
            }
            Ok(Raise)
        }
        "allIn" | "all_in" => Ok(AllIn),
        other => Err(format!("unknown action kind: {other}")),
    }
}
