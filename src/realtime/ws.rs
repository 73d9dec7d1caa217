use axum::{
    extract::{
        ws::{Message, WebSocket},
        State, WebSocketUpgrade,
    },
    response::Response,
};
use futures::{stream::StreamExt, SinkExt};
use std::sync::Arc;

use crate::api::middleware::session::AppState;
use crate::realtime::{Broadcaster, TicketEvent};

/// Upgrade `GET /ws` and attach the viewer to the broadcaster.
pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, state.broadcaster.clone()))
}

/// Connection lifecycle: register, greet, then pump broadcast events to the
/// viewer until either side closes. Incoming messages carry no protocol
/// meaning and are drained.
async fn handle_socket(socket: WebSocket, broadcaster: Arc<Broadcaster>) {
    let (id, mut events) = broadcaster.register().await;
    tracing::info!(connection_id = id, "Viewer connected");

    let (mut sender, mut receiver) = socket.split();

    // Greeting event, matching the connect handshake clients expect.
    match serde_json::to_string(&TicketEvent::greeting()) {
        Ok(json) => {
            if sender.send(Message::Text(json)).await.is_err() {
                broadcaster.unregister(id).await;
                tracing::info!(connection_id = id, "Viewer disconnected");
                return;
            }
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to serialize greeting");
        }
    }

    let mut send_task = tokio::spawn(async move {
        while let Some(event) = events.recv().await {
            let message = match serde_json::to_string(&event) {
                Ok(json) => Message::Text(json),
                Err(e) => {
                    tracing::error!(error = %e, "Failed to serialize ticket event");
                    continue;
                }
            };

            if sender.send(message).await.is_err() {
                // Viewer disconnected
                break;
            }
        }
    });

    let mut recv_task = tokio::spawn(async move {
        while let Some(Ok(msg)) = receiver.next().await {
            match msg {
                Message::Close(_) => break,
                // No client-to-server events beyond connect/disconnect.
                _ => {}
            }
        }
    });

    tokio::select! {
        _ = (&mut send_task) => recv_task.abort(),
        _ = (&mut recv_task) => send_task.abort(),
    }

    broadcaster.unregister(id).await;
    tracing::info!(connection_id = id, "Viewer disconnected");
}
