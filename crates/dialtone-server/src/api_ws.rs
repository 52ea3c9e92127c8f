//! WebSocket handler pushing call status updates to connected clients.

use crate::AppState;
use axum::{
    extract::{
        ws::{Message as AxumMessage, WebSocket},
        ConnectInfo, Extension, WebSocketUpgrade,
    },
    response::IntoResponse,
};
use dialtone_types::CallStatusEvent;
use futures_util::{SinkExt, StreamExt};
use serde::Serialize;
use std::{net::SocketAddr, sync::Arc};
use tokio::sync::broadcast::{self, error::RecvError};

/// Outgoing WebSocket frames.
///
/// Serialized as `{"type": "call_status", "call_id": ..., "status": ...}`.
#[derive(Debug, Serialize)]
#[serde(tag = "type")]
pub enum OutgoingFrame {
    #[serde(rename = "call_status")]
    CallStatus(CallStatusEvent),
}

/// Handler for `GET /ws`.
///
/// The bus subscription is taken before the upgrade completes, so a client
/// that places a call right after the handshake sees every status of it.
pub async fn ws_handler(
    Extension(state): Extension<Arc<AppState>>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    ws: WebSocketUpgrade,
) -> impl IntoResponse {
    let rx = state.events.subscribe();
    tracing::info!(remote_addr = %addr, "websocket client connected");
    ws.on_upgrade(move |socket| handle_socket(socket, rx, addr))
}

async fn handle_socket(
    socket: WebSocket,
    mut rx: broadcast::Receiver<CallStatusEvent>,
    addr: SocketAddr,
) {
    let (mut sender, mut receiver) = socket.split();

    loop {
        tokio::select! {
            event = rx.recv() => match event {
                Ok(event) => {
                    let text = match serde_json::to_string(&OutgoingFrame::CallStatus(event)) {
                        Ok(text) => text,
                        Err(e) => {
                            tracing::error!("failed to serialize call status frame: {}", e);
                            continue;
                        }
                    };
                    if sender.send(AxumMessage::Text(text.into())).await.is_err() {
                        break;
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(
                        remote_addr = %addr,
                        skipped,
                        "websocket client lagged; call status events were dropped"
                    );
                }
                Err(RecvError::Closed) => break,
            },
            incoming = receiver.next() => match incoming {
                Some(Ok(AxumMessage::Close(_))) | Some(Err(_)) | None => break,
                // Clients have nothing to say; pings are answered by the socket itself.
                Some(Ok(_)) => {}
            },
        }
    }

    tracing::info!(remote_addr = %addr, "websocket client disconnected");
}
