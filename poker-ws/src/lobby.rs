//! Table registry (C6, spec.md §4.6 / SPEC_FULL.md §4.6). Generalizes the
//! teacher's `TableMap = Arc<Mutex<HashMap<String, mpsc::UnboundedSender<ActorMsg>>>>`
//! from a flat sender map to a handle struct that also carries enough
//! metadata to answer `getTables` without waking every table actor for its
//! static fields, and enough to find every table in a `(variant, stake)`
//! class when deciding whether to auto-provision another one.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::sync::oneshot;
use tokio::sync::Mutex;

use poker_engine::{BettingType, Blinds, Variant};

use crate::adapters::StubWalletAdapter;
use crate::protocol::TableSummary;
use crate::session::{ActorMsg, ActorSummary, TableActor};

#[derive(Debug, Clone)]
pub struct TableHandle {
    pub tx: mpsc::UnboundedSender<ActorMsg>,
    pub variant: Variant,
    pub betting_type: BettingType,
    pub blinds: Blinds,
    pub stake_label: String,
    pub system: bool,
}

/// One `(variant, stake)` class the lobby provisions at startup, replacing
/// the teacher's single hard-coded `RoomConfig::default()` with a list —
/// spec.md's lobby still boots with zero configuration via `Default`.
#[derive(Debug, Clone, serde::Deserialize, serde::Serialize)]
pub struct StakeDefinition {
    pub variant: Variant,
    pub small_blind: u64,
    pub big_blind: u64,
    pub betting_type: BettingType,
    pub stake_label: String,
}

#[derive(Debug, Clone, serde::Deserialize, serde::Serialize)]
pub struct LobbyConfig {
    pub stakes: Vec<StakeDefinition>,
}

impl Default for LobbyConfig {
    fn default() -> Self {
        LobbyConfig {
            stakes: vec![
                StakeDefinition {
                    variant: Variant::TexasHoldem,
                    small_blind: 1,
                    big_blind: 2,
                    betting_type: BettingType::NoLimit,
                    stake_label: "1/2 NLHE".into(),
                },
                StakeDefinition {
                    variant: Variant::OmahaHiLo,
                    small_blind: 1,
                    big_blind: 2,
                    betting_type: BettingType::PotLimit,
                    stake_label: "1/2 PLO Hi-Lo".into(),
                },
            ],
        }
    }
}

impl LobbyConfig {
    /// Reads `path` as JSON if it exists, falling back to `Default` on any
    /// error (missing file, malformed JSON) so a broken config never
    /// prevents the server from booting.
    pub fn load_or_default(path: &std::path::Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(text) => serde_json::from_str(&text).unwrap_or_else(|e| {
                tracing::warn!(error = %e, "ignoring malformed lobby config");
                Self::default()
            }),
            Err(_) => Self::default(),
        }
    }
}

/// Stable grouping key for a `(variant, stake)` class — every system table
/// belonging to the same class shares one of these, independent of table id.
fn class_key(variant: Variant, stake_label: &str) -> String {
    format!("{variant:?}|{stake_label}")
}

/// Turns a stake label into an id-safe fragment (`"1/2 NLHE"` -> `"1-2-nlhe"`).
fn slug(label: &str) -> String {
    label
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_lowercase() } else { '-' })
        .collect()
}

async fn query_summary(tx: &mpsc::UnboundedSender<ActorMsg>) -> Option<ActorSummary> {
    let (respond, rx) = oneshot::channel();
    tx.send(ActorMsg::QuerySummary { respond }).ok()?;
    rx.await.ok()
}

/// The single coarse lock the teacher's `TableMap` holds, generalized to
/// carry enough metadata for a lobby browser alongside each table's sender,
/// plus the wallet adapter every table actor it spawns is wired to.
#[derive(Clone)]
pub struct Lobby {
    tables: Arc<Mutex<HashMap<String, TableHandle>>>,
    wallet: Arc<StubWalletAdapter>,
}

impl Lobby {
    pub fn new(wallet: Arc<StubWalletAdapter>) -> Self {
        Lobby { tables: Arc::new(Mutex::new(HashMap::new())), wallet }
    }

    /// Spawns the startup set of system tables from `config`, one per stake
    /// class.
    pub async fn provision(&self, config: &LobbyConfig) {
        for stake in &config.stakes {
            self.spawn_class_table(
                stake.variant,
                stake.betting_type,
                Blinds { small: stake.small_blind, big: stake.big_blind, ante: None },
                stake.stake_label.clone(),
            )
            .await;
        }
    }

    /// Spawns another system table in `(variant, stake_label)`'s class, with
    /// a table id that encodes the class and a per-class index so every
    /// table in the class can be found again by `class_key`.
    async fn spawn_class_table(
        &self,
        variant: Variant,
        betting_type: BettingType,
        blinds: Blinds,
        stake_label: String,
    ) -> mpsc::UnboundedSender<ActorMsg> {
        let index = {
            let tables = self.tables.lock().await;
            let key = class_key(variant, &stake_label);
            tables.values().filter(|h| h.system && class_key(h.variant, &h.stake_label) == key).count()
        };
        let table_id = format!("system-{}-{}-{index}", format!("{variant:?}").to_lowercase(), slug(&stake_label));
        self.create_table(table_id, variant, betting_type, blinds, stake_label, true).await
    }

    /// Whenever a player joins a system table, the coordinator calls this
    /// with that table's class. If every system table in the class is at
    /// its seat cap, a new one is provisioned so the class always has a
    /// seatable table (spec.md §4.6's auto-provisioning requirement).
    pub async fn ensure_capacity(
        &self,
        variant: Variant,
        betting_type: BettingType,
        blinds: Blinds,
        stake_label: String,
    ) {
        let handles: Vec<TableHandle> = {
            let tables = self.tables.lock().await;
            let key = class_key(variant, &stake_label);
            tables.values().filter(|h| h.system && class_key(h.variant, &h.stake_label) == key).cloned().collect()
        };
        if handles.is_empty() {
            return;
        }
        for handle in &handles {
            match query_summary(&handle.tx).await {
                Some(summary) if summary.seated < summary.max_seats => return,
                _ => continue,
            }
        }
        self.spawn_class_table(variant, betting_type, blinds, stake_label).await;
    }

    pub async fn create_table(
        &self,
        table_id: String,
        variant: Variant,
        betting_type: BettingType,
        blinds: Blinds,
        stake_label: String,
        system: bool,
    ) -> mpsc::UnboundedSender<ActorMsg> {
        let tx = TableActor::spawn(
            table_id.clone(),
            variant,
            betting_type,
            blinds,
            stake_label.clone(),
            system,
            self.clone(),
            self.wallet.clone(),
        );
        let handle = TableHandle { tx: tx.clone(), variant, betting_type, blinds, stake_label, system };
        self.tables.lock().await.insert(table_id, handle);
        tx
    }

    pub async fn get(&self, table_id: &str) -> Option<mpsc::UnboundedSender<ActorMsg>> {
        self.tables.lock().await.get(table_id).map(|h| h.tx.clone())
    }

    /// Live per-table occupancy and hand number, queried from each table
    /// actor rather than cached in the registry — the registry never holds
    /// mutable table state itself (spec.md §5/§9).
    pub async fn list(&self) -> Vec<TableSummary> {
        let handles: Vec<(String, TableHandle)> =
            self.tables.lock().await.iter().map(|(id, h)| (id.clone(), h.clone())).collect();

        let mut out = Vec::with_capacity(handles.len());
        for (table_id, h) in handles {
            let (seated, hand_number) = match query_summary(&h.tx).await {
                Some(summary) => (summary.seated, summary.hand_number),
                None => (0, 0),
            };
            out.push(TableSummary {
                table_id,
                variant: h.variant,
                stake_label: h.stake_label,
                betting_type: h.betting_type,
                seated,
                max_seats: h.variant.max_seats(),
                hand_number,
            });
        }
        out
    }
}
