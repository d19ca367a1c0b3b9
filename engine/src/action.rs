use std::time::Instant;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActionKind {
    Fold,
    Check,
    Call,
    Raise,
    AllIn,
}

/// A player's submitted action. `amount` is the *target total*
/// contribution for the round on `Raise` (ignored otherwise).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Action {
    pub player_id: String,
    pub table_id: String,
    pub kind: ActionKind,
    pub amount: Option<u64>,
    #[serde(skip, default = "Instant::now")]
    pub timestamp: Instant,
}
