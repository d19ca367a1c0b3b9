//! Transport and service layer: Lobby (C6), Session Coordinator (C7), and
//! the external adapter traits (C8) that sit between the WebSocket edge and
//! `poker_engine::Table`. See spec.md §2/§5/§6 and SPEC_FULL.md §4.6-4.8.

pub mod adapters;
pub mod lobby;
pub mod protocol;
pub mod session;
