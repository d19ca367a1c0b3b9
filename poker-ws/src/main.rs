use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Query, State};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::Router;
use futures::{SinkExt, StreamExt};
use serde::Deserialize;
use tokio::sync::mpsc;
use tower_http::services::ServeDir;
use tracing::Level;
use tracing_subscriber::EnvFilter;

use poker_ws::adapters::{IdentityResolver, StubIdentityResolver, StubWalletAdapter};
use poker_ws::lobby::{Lobby, LobbyConfig};
use poker_ws::protocol::{ClientEvent, ServerEvent};
use poker_ws::session::ActorMsg;

#[derive(Clone)]
struct AppState {
    lobby: Lobby,
    identity: Arc<StubIdentityResolver>,
}

#[derive(Debug, Deserialize)]
struct ConnectQuery {
    token: Option<String>,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(Level::INFO.into()))
        .init();

    let lobby = Lobby::new(Arc::new(StubWalletAdapter::new()));
    let config = LobbyConfig::load_or_default(std::path::Path::new("config.json"));
    lobby.provision(&config).await;

    let state = AppState {
        lobby,
        identity: Arc::new(StubIdentityResolver),
    };

    let app = Router::new()
        .route("/ws", get(ws_handler))
        .nest_service("/", ServeDir::new("public"))
        .with_state(state);

    let listener = tokio::net::TcpListener::bind("0.0.0.0:8080").await.unwrap();
    tracing::info!("poker-ws listening on 0.0.0.0:8080");
    axum::serve(listener, app).await.unwrap();
}

async fn ws_handler(
    ws: WebSocketUpgrade,
    Query(query): Query<ConnectQuery>,
    State(state): State<AppState>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, query, state))
}

async fn handle_socket(socket: WebSocket, query: ConnectQuery, state: AppState) {
    let token = query.token.unwrap_or_default();
    let identity = match state.identity.resolve(&token).await {
        Ok(identity) => identity,
        Err(_) => {
            let (mut sink, _) = socket.split();
            let event = ServerEvent::AuthError { message: "invalid or missing token".into() };
            if let Ok(text) = serde_json::to_string(&event) {
                let _ = sink.send(Message::Text(text)).await;
            }
            return;
        }
    };
    let player_id = identity.player_id;

    let (mut sink, mut stream) = socket.split();
    let (out_tx, mut out_rx) = mpsc::unbounded_channel::<ServerEvent>();

    let writer = tokio::spawn(async move {
        while let Some(event) = out_rx.recv().await {
            if let Ok(text) = serde_json::to_string(&event) {
                if sink.send(Message::Text(text)).await.is_err() {
                    break;
                }
            }
        }
    });

    let mut watched_tables: Vec<String> = Vec::new();

    while let Some(Ok(msg)) = stream.next().await {
        let Message::Text(text) = msg else { continue };
        match serde_json::from_str::<ClientEvent>(&text) {
            Ok(event) => dispatch(&state, &player_id, event, &out_tx, &mut watched_tables).await,
            Err(e) => {
                let _ = out_tx.send(ServerEvent::err(format!("malformed envelope: {e}")));
            }
        }
    }

    for table_id in watched_tables {
        if let Some(tx) = state.lobby.get(&table_id).await {
            let _ = tx.send(ActorMsg::Unsubscribe { player_id: player_id.clone() });
        }
    }
    writer.abort();
}

async fn ensure_subscribed(
    state: &AppState,
    table_id: &str,
    player_id: &str,
    out_tx: &mpsc::UnboundedSender<ServerEvent>,
    watched: &mut Vec<String>,
) -> Option<mpsc::UnboundedSender<ActorMsg>> {
    let tx = state.lobby.get(table_id).await?;
    if !watched.iter().any(|t| t == table_id) {
        let _ = tx.send(ActorMsg::Subscribe { player_id: player_id.to_string(), tx: out_tx.clone() });
        watched.push(table_id.to_string());
    }
    Some(tx)
}

async fn dispatch(
    state: &AppState,
    player_id: &str,
    event: ClientEvent,
    out_tx: &mpsc::UnboundedSender<ServerEvent>,
    watched: &mut Vec<String>,
) {
    match event {
        ClientEvent::GetTables | ClientEvent::SubscribeTables => {
            let _ = out_tx.send(ServerEvent::TableList(state.lobby.list().await));
        }
        ClientEvent::UnsubscribeTables => {}
        ClientEvent::CreateUserTable { variant, stake_label, blinds, betting_type } => {
            let table_id = format!("user-{player_id}-{}", watched.len());
            let tx = state
                .lobby
                .create_table(table_id.clone(), variant, betting_type, blinds, stake_label, false)
                .await;
            let _ = tx.send(ActorMsg::Subscribe { player_id: player_id.to_string(), tx: out_tx.clone() });
            watched.push(table_id);
            let _ = out_tx.send(ServerEvent::ok());
        }
        ClientEvent::WatchTable { table_id } => {
            if ensure_subscribed(state, &table_id, player_id, out_tx, watched).await.is_none() {
                let _ = out_tx.send(ServerEvent::err("table not found"));
            }
        }
        ClientEvent::UnwatchTable { table_id } => {
            if let Some(tx) = state.lobby.get(&table_id).await {
                let _ = tx.send(ActorMsg::Unsubscribe { player_id: player_id.to_string() });
            }
            watched.retain(|t| t != &table_id);
        }
        ClientEvent::JoinTable { ref table_id, .. }
        | ClientEvent::LeaveTable { ref table_id }
        | ClientEvent::StartHand { ref table_id }
        | ClientEvent::Action { ref table_id, .. }
        | ClientEvent::ChangeSeat { ref table_id, .. }
        | ClientEvent::GetState { ref table_id } => {
            let table_id = table_id.clone();
            match ensure_subscribed(state, &table_id, player_id, out_tx, watched).await {
                Some(tx) => {
                    let _ = tx.send(ActorMsg::Client { player_id: player_id.to_string(), event });
                }
                None => {
                    let _ = out_tx.send(ServerEvent::err("table not found"));
                }
            }
        }
    }
}
