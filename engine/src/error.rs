use thiserror::Error;

/// Subcause of an `ActionIllegal` rejection, per spec.md §7.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionIllegalReason {
    #[error("cannot check when a call is owed")]
    CheckWhenMustCall,
    #[error("raise is below the minimum raise increment")]
    BelowMinRaise,
    #[error("raise target exceeds the pot limit")]
    AbovePotLimit,
    #[error("contribution exceeds the seat's stack")]
    InsufficientStack,
    #[error("this round has already seen the maximum number of raises")]
    MaxRaisesReached,
}

/// Structured error codes the engine surfaces, per spec.md §7.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EngineError {
    #[error("not authenticated")]
    NotAuthenticated,
    #[error("not authorized to act on behalf of this player")]
    Unauthorized,
    #[error("table not found")]
    TableNotFound,
    #[error("table is full")]
    TableFull,
    #[error("seat index is out of range for this table")]
    InvalidSeatIndex,
    #[error("seat is already taken")]
    SeatTaken,
    #[error("player already occupies a seat at this table")]
    AlreadySeated,
    #[error("cannot change seats while a hand is in progress")]
    SeatChangeUnavailable,
    #[error("it is not this player's turn")]
    NotYourTurn,
    #[error("action is not legal: {0}")]
    ActionIllegal(ActionIllegalReason),
    #[error("no hand is currently in progress")]
    NotInHand,
    #[error("rate limit exceeded")]
    RateLimited,
    #[error("timing violation")]
    TimingViolation,
    #[error("deck exhausted (implementation bug)")]
    DeckExhausted,
    #[error("internal invariant violated: {0}")]
    InvariantViolation(&'static str),
}
