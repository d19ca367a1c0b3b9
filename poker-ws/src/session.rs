//! Session Coordinator (C7, spec.md §4.7 / SPEC_FULL.md §4.7): one actor
//! task per table, generalizing the teacher's `TableActor` message loop in
//! `main.rs` to wrap `poker_engine::Table` instead of `poker_ws::game::Table`.
//! Every table mutation happens inside this task — the only concurrency
//! primitive the engine relies on is this serial queue (spec.md §5/§9).

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::{mpsc, oneshot};
use tokio::time::interval;

use poker_engine::{Action, ActionKind, BettingType, Blinds, Stage, Table, Validator, Variant};

use crate::adapters::{StubWalletAdapter, WalletAdapter};
use crate::lobby::Lobby;
use crate::protocol::{parse_action_kind, ClientEvent, ServerEvent};

const TICK: Duration = Duration::from_millis(200);
const DISCONNECT_GRACE: Duration = Duration::from_secs(30);
const NEXT_HAND_DELAY: Duration = Duration::from_secs(5);

pub type ClientTx = mpsc::UnboundedSender<ServerEvent>;

/// `tokio::time::Instant::now()` converted to `std::time::Instant`, so the
/// deadlines this actor tracks advance under a paused/accelerated Tokio
/// clock in tests the same way the 200ms `Tick` ticker (built on
/// `tokio::time::interval`) already does.
fn now() -> Instant {
    tokio::time::Instant::now().into_std()
}

/// Answer to `ActorMsg::QuerySummary` — enough for the lobby to decide
/// whether a table class is full and to populate a `tableList` row, without
/// exposing any seat's private state.
#[derive(Debug, Clone)]
pub struct ActorSummary {
    pub seated: usize,
    pub max_seats: usize,
    pub hand_number: u64,
    pub stage: Stage,
}

pub enum ActorMsg {
    Client { player_id: String, event: ClientEvent },
    Subscribe { player_id: String, tx: ClientTx },
    Unsubscribe { player_id: String },
    QuerySummary { respond: oneshot::Sender<ActorSummary> },
    Tick,
}

struct TableActorState {
    table_id: String,
    rx: mpsc::UnboundedReceiver<ActorMsg>,
    table: Table,
    validator: Validator,
    lobby: Lobby,
    wallet: Arc<StubWalletAdapter>,
    subscribers: HashMap<String, ClientTx>,
    disconnect_deadlines: HashMap<String, Instant>,
    next_hand_deadline: Option<Instant>,
    /// Hand number whose winners have already been settled through the
    /// wallet adapter, so a hand's payout is never applied twice across the
    /// several call sites (`apply_action`, `apply_turn_timeout`) that can
    /// observe it reaching showdown.
    settled_hand: u64,
}

/// Spawn handle only — the live state lives entirely inside the task
/// spawned by `spawn`, matching the teacher's actor-owns-everything shape.
pub struct TableActor;

impl TableActor {
    pub fn spawn(
        table_id: String,
        variant: Variant,
        betting_type: BettingType,
        blinds: Blinds,
        stake_label: String,
        system: bool,
        lobby: Lobby,
        wallet: Arc<StubWalletAdapter>,
    ) -> mpsc::UnboundedSender<ActorMsg> {
        let (tx, rx) = mpsc::unbounded_channel();

        let tick_tx = tx.clone();
        tokio::spawn(async move {
            let mut ticker = interval(TICK);
            loop {
                ticker.tick().await;
                if tick_tx.send(ActorMsg::Tick).is_err() {
                    break;
                }
            }
        });

        let table = Table::create(table_id.clone(), variant, betting_type, blinds, stake_label, system);
        let mut state = TableActorState {
            table_id,
            rx,
            table,
            validator: Validator::new(),
            lobby,
            wallet,
            subscribers: HashMap::new(),
            disconnect_deadlines: HashMap::new(),
            next_hand_deadline: None,
            settled_hand: 0,
        };

        tokio::spawn(async move {
            state.run().await;
        });

        tx
    }
}

impl TableActorState {
    async fn run(&mut self) {
        while let Some(msg) = self.rx.recv().await {
            match msg {
                ActorMsg::Subscribe { player_id, tx } => self.on_subscribe(player_id, tx),
                ActorMsg::Unsubscribe { player_id } => self.on_unsubscribe(player_id),
                ActorMsg::Client { player_id, event } => self.on_client(player_id, event).await,
                ActorMsg::QuerySummary { respond } => {
                    let _ = respond.send(self.summary());
                }
                ActorMsg::Tick => self.on_tick().await,
            }
        }
    }

    fn summary(&self) -> ActorSummary {
        ActorSummary {
            seated: self.table.seated_count(),
            max_seats: self.table.max_seats,
            hand_number: self.table.hand_number,
            stage: self.table.stage,
        }
    }

    fn on_subscribe(&mut self, player_id: String, tx: ClientTx) {
        self.disconnect_deadlines.remove(&player_id);
        if let Some(seat) = self.table.seats.iter_mut().flatten().find(|s| s.player_id == player_id) {
            seat.is_connected = true;
        }
        self.subscribers.insert(player_id.clone(), tx.clone());
        let event = self.state_event_for(&player_id);
        let _ = tx.send(event);
    }

    fn on_unsubscribe(&mut self, player_id: String) {
        self.subscribers.remove(&player_id);
        if let Some(seat) = self.table.seats.iter_mut().flatten().find(|s| s.player_id == player_id) {
            seat.is_connected = false;
            self.disconnect_deadlines.insert(player_id, now() + DISCONNECT_GRACE);
        }
    }

    async fn on_client(&mut self, player_id: String, event: ClientEvent) {
        self.disconnect_deadlines.remove(&player_id);
        let mut check_capacity = false;

        let reply: Result<(), String> = match event {
            ClientEvent::JoinTable { buy_in, seat_index, .. } => {
                match self.wallet.reserve(&player_id, buy_in).await {
                    Ok(()) => {
                        let result = self
                            .table
                            .add_seat(player_id.clone(), player_id.clone(), buy_in, seat_index)
                            .map(|_| ())
                            .map_err(|e| e.to_string());
                        if result.is_ok() {
                            check_capacity = true;
                        } else {
                            let _ = self.wallet.credit(&player_id, buy_in).await;
                        }
                        result
                    }
                    Err(e) => Err(e.to_string()),
                }
            }
            ClientEvent::LeaveTable { .. } => self.table.remove_seat(&player_id).map_err(|e| e.to_string()),
            ClientEvent::StartHand { .. } => self.table.start_hand().map(|_| ()).map_err(|e| e.to_string()),
            ClientEvent::Action { kind, amount, .. } => self.apply_action(&player_id, &kind, amount),
            ClientEvent::ChangeSeat { new_seat_index, .. } => {
                self.table.change_seat(&player_id, new_seat_index).map_err(|e| e.to_string())
            }
            ClientEvent::WatchTable { .. } | ClientEvent::UnwatchTable { .. } => Ok(()),
            ClientEvent::GetState { .. } => Ok(()),
            ClientEvent::CreateUserTable { .. } | ClientEvent::GetTables
            | ClientEvent::SubscribeTables | ClientEvent::UnsubscribeTables => {
                // Handled by the lobby before a message ever reaches a table actor.
                Ok(())
            }
        };

        if self.table.stage == Stage::Showdown {
            self.next_hand_deadline.get_or_insert(now() + NEXT_HAND_DELAY);
        } else {
            self.next_hand_deadline = None;
        }

        if let Some(tx) = self.subscribers.get(&player_id) {
            let ack = match reply {
                Ok(()) => ServerEvent::ok(),
                Err(message) => ServerEvent::err(message),
            };
            let _ = tx.send(ack);
        }

        self.settle_hand_if_concluded().await;

        if check_capacity && self.table.system {
            self.lobby
                .ensure_capacity(self.table.variant, self.table.betting_type, self.table.blinds, self.table.stake_label.clone())
                .await;
        }

        self.broadcast();
    }

    fn apply_action(&mut self, player_id: &str, kind: &str, amount: Option<u64>) -> Result<(), String> {
        let kind: ActionKind = parse_action_kind(kind, amount)?;
        let action = Action {
            player_id: player_id.to_string(),
            table_id: self.table_id.clone(),
            kind,
            amount,
            timestamp: now(),
        };
        self.validator.validate(&self.table, &action).map_err(|e| e.to_string())?;
        self.table.apply_action(&action).map_err(|e| e.to_string())
    }

    /// Pays out and rakes a hand's winners through the wallet adapter the
    /// first time this coordinator observes that hand at showdown with a
    /// non-empty `winners` list — spec.md §6's "at pot award, and at hand
    /// end" wallet contract. `Table` itself stays synchronous and never
    /// touches the adapter directly.
    async fn settle_hand_if_concluded(&mut self) {
        if self.table.winners.is_empty() || self.settled_hand == self.table.hand_number {
            return;
        }
        self.settled_hand = self.table.hand_number;
        let shares: Vec<(String, u64)> = self.table.winners.iter().map(|w| (w.player_id.clone(), w.amount)).collect();
        for (player_id, amount) in &shares {
            if let Err(e) = self.wallet.credit(player_id, *amount).await {
                tracing::error!(table_id = %self.table_id, %player_id, error = %e, "wallet credit failed at pot award");
            }
        }
        if let Err(e) = self.wallet.rake_contribution(self.table.hand_number, &shares).await {
            tracing::error!(table_id = %self.table_id, error = %e, "rake contribution failed at hand end");
        }
    }

    async fn on_tick(&mut self) {
        let now = now();

        if self.table.active_seat_index.is_some() {
            if let Ok(true) = self.table.apply_turn_timeout(now) {
                tracing::debug!(table_id = %self.table_id, "turn timeout applied");
            }
        }

        let expired: Vec<String> = self
            .disconnect_deadlines
            .iter()
            .filter(|(_, deadline)| now >= **deadline)
            .map(|(player_id, _)| player_id.clone())
            .collect();
        for player_id in expired {
            self.disconnect_deadlines.remove(&player_id);
            let _ = self.table.remove_seat(&player_id);
            tracing::info!(table_id = %self.table_id, %player_id, "disconnect grace expired, seat dropped");
        }

        if self.table.stage == Stage::Showdown {
            if let Some(deadline) = self.next_hand_deadline {
                if now >= deadline {
                    self.next_hand_deadline = None;
                    let _ = self.table.start_hand();
                }
            }
        } else {
            self.next_hand_deadline = None;
        }

        self.settle_hand_if_concluded().await;
        self.broadcast();
    }

    fn state_event_for(&self, player_id: &str) -> ServerEvent {
        if self.table.seat_for_player(player_id).is_some() {
            ServerEvent::GameState(self.table.project_for(Some(player_id)))
        } else {
            ServerEvent::SpectatorState(self.table.project_for(None))
        }
    }

    fn broadcast(&mut self) {
        self.subscribers.retain(|player_id, tx| {
            let event = if self.table.seat_for_player(player_id).is_some() {
                ServerEvent::GameState(self.table.project_for(Some(player_id)))
            } else {
                ServerEvent::SpectatorState(self.table.project_for(None))
            };
            tx.send(event).is_ok()
        });
    }
}
