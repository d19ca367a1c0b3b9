use futures::{SinkExt, StreamExt};
use serde_json::Value;
use tokio_tungstenite::connect_async;

#[tokio::main]
async fn main() {
    let url = std::env::args().nth(1).unwrap_or_else(|| "ws://127.0.0.1:8080/ws".to_string());
    // modes: host <player_id> | join <player_id> <table_id> | leave <player_id> <table_id>
    let mode = std::env::args().nth(2).unwrap_or_else(|| "host".to_string());
    let player_id = std::env::args().nth(3).unwrap_or_else(|| format!("p-{}", std::process::id()));
    let table_arg = std::env::args().nth(4);
    let url = format!("{url}?token={player_id}");
    let (mut ws, _resp) = connect_async(url.as_str()).await.expect("connect");

    match mode.as_str() {
        "host" => {
            let create = serde_json::json!({
                "event": "createUserTable",
                "data": {
                    "variant": "texasHoldem",
                    "stakeLabel": "1/2 NLHE",
                    "blinds": {"small": 1, "big": 2, "ante": null},
                    "bettingType": "noLimit",
                },
            });
            ws.send(tokio_tungstenite::tungstenite::Message::Text(create.to_string())).await.unwrap();
        }
        "join" => {
            let table_id = table_arg.expect("table_id required for join");
            let join = serde_json::json!({
                "event": "joinTable",
                "data": {"tableId": table_id, "buyIn": 1000, "seatIndex": null},
            });
            ws.send(tokio_tungstenite::tungstenite::Message::Text(join.to_string())).await.unwrap();
        }
        "leave" => {
            let table_id = table_arg.expect("table_id required for leave");
            let leave = serde_json::json!({"event": "leaveTable", "data": {"tableId": table_id}});
            ws.send(tokio_tungstenite::tungstenite::Message::Text(leave.to_string())).await.unwrap();
        }
        _ => {}
    }

    let mut reads = 0;
    while reads < 100 {
        if let Some(msg) = ws.next().await {
            let txt = msg.unwrap().to_string();
            println!("<- {}", txt);
            let _ = serde_json::from_str::<Value>(&txt);
        }
        reads += 1;
    }
}
