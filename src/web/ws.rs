use std::sync::Arc;

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::Response,
};
use tokio::sync::broadcast::{error::RecvError, Receiver};

use crate::broadcast::PositionBroadcast;
use crate::web::state::AppState;

/// Upgrades to a WebSocket that receives every live cycle published after it connects.
pub async fn positions(ws: WebSocketUpgrade, State(state): State<AppState>) -> Response {
    let rx = state.pipeline.hub().subscribe();
    ws.on_upgrade(move |socket| forward_positions(socket, rx))
}

async fn forward_positions(mut socket: WebSocket, mut rx: Receiver<Arc<PositionBroadcast>>) {
    log::debug!("Position subscriber connected");

    loop {
        tokio::select! {
            received = rx.recv() => match received {
                Ok(message) => {
                    let json = match serde_json::to_string(message.as_ref()) {
                        Ok(json) => json,
                        Err(e) => {
                            log::error!("Failed to encode broadcast {}: {}", message.cycle, e);
                            continue;
                        }
                    };
                    if socket.send(Message::Text(json.into())).await.is_err() {
                        break;
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    log::warn!("Position subscriber lagging, dropped {} broadcasts", skipped);
                }
                Err(RecvError::Closed) => break,
            },
            incoming = socket.recv() => match incoming {
                Some(Ok(Message::Close(_))) | Some(Err(_)) | None => break,
                Some(Ok(_)) => {}
            },
        }
    }

    log::debug!("Position subscriber disconnected");
}
