//! WebSocket handler
//!
//! Handles hub connections and frame processing. Every connection is a
//! listener on the hub named in the route; remote dispatchers connect the
//! same way and simply never join a group.

use crate::handlers::FrameHandler;
use crate::hub::{HubRegistry, Listener, SubscriptionHub};
use crate::server::HubState;
use axum::{
    extract::{
        ws::{CloseFrame, Message},
        Path, State, WebSocketUpgrade,
    },
    response::IntoResponse,
};
use futures_util::{SinkExt, StreamExt};
use logcast_core::{CloseCode, HelloPayload, HubMessage};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tokio::time::interval;

/// Channel buffer size for outgoing messages
const MESSAGE_BUFFER_SIZE: usize = 256;

/// Time the writer gets to flush a close frame
const CLOSE_GRACE: Duration = Duration::from_secs(1);

/// WebSocket hub handler
pub async fn hub_handler(
    State(state): State<HubState>,
    Path(hub_name): Path<String>,
    ws: WebSocketUpgrade,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(state, hub_name, socket))
}

/// Handle an upgraded WebSocket connection
async fn handle_socket(state: HubState, hub_name: String, socket: axum::extract::ws::WebSocket) {
    let listener_id = uuid::Uuid::new_v4().to_string();
    let registry = state.registry().clone();

    // Create message channel for outgoing messages
    let (tx, mut rx) = mpsc::channel::<HubMessage>(MESSAGE_BUFFER_SIZE);

    // Register listener, creating the hub on first use
    let (hub, listener) = registry.attach(&hub_name, listener_id.clone(), tx);

    tracing::info!(hub = %hub_name, listener_id = %listener_id, "Hub connection established");

    // Split the WebSocket
    let (mut ws_sink, mut ws_stream) = socket.split();

    // Send Hello message immediately
    let interval_ms = state.config().heartbeat_interval_ms;
    let hello = HubMessage::hello(HelloPayload::with_interval(interval_ms));
    if let Ok(json) = hello.to_json() {
        if ws_sink.send(Message::Text(json)).await.is_err() {
            tracing::warn!(listener_id = %listener_id, "Failed to send Hello message");
            cleanup_listener(&registry, &hub_name, &listener_id);
            return;
        }
    }

    // Spawn task to receive frames from WebSocket
    let hub_recv = hub.clone();
    let listener_recv = listener.clone();
    let mut recv_task = tokio::spawn(async move {
        while let Some(msg) = ws_stream.next().await {
            let listener_id = listener_recv.listener_id();
            match msg {
                Ok(Message::Text(text)) => {
                    if let Err(close_code) =
                        handle_text_message(&hub_recv, &listener_recv, &text).await
                    {
                        return Some(close_code);
                    }
                }
                Ok(Message::Binary(_)) => {
                    tracing::debug!(listener_id = %listener_id, "Binary frames not supported");
                    return Some(CloseCode::DecodeError);
                }
                Ok(Message::Ping(_) | Message::Pong(_)) => {
                    // Pong is handled automatically by axum
                    listener_recv.record_heartbeat();
                }
                Ok(Message::Close(_)) => {
                    tracing::info!(listener_id = %listener_id, "Client closed connection");
                    return None;
                }
                Err(e) => {
                    tracing::warn!(listener_id = %listener_id, error = %e, "WebSocket error");
                    return None;
                }
            }
        }
        None
    });

    // Spawn task to send messages to WebSocket
    let (close_tx, mut close_rx) = oneshot::channel::<CloseCode>();
    let listener_id_send = listener_id.clone();
    let mut send_task = tokio::spawn(async move {
        loop {
            tokio::select! {
                msg = rx.recv() => {
                    let Some(msg) = msg else { break };
                    let Ok(json) = msg.to_json() else { continue };
                    if ws_sink.send(Message::Text(json)).await.is_err() {
                        tracing::warn!(
                            listener_id = %listener_id_send,
                            "Failed to send message to WebSocket"
                        );
                        return;
                    }
                }
                code = &mut close_rx => {
                    if let Ok(code) = code {
                        let (code, reason) = HubMessage::close_frame(code);
                        let frame = CloseFrame {
                            code,
                            reason: reason.into(),
                        };
                        let _ = ws_sink.send(Message::Close(Some(frame))).await;
                    }
                    break;
                }
            }
        }

        let _ = ws_sink.close().await;
    });

    // Spawn heartbeat monitoring task
    let listener_hb = listener.clone();
    let timeout = state.heartbeat_timeout();
    let mut heartbeat_task = tokio::spawn(async move {
        let mut check_interval =
            interval((state.heartbeat_interval() / 2).max(Duration::from_millis(1)));

        loop {
            check_interval.tick().await;

            let time_since = listener_hb.time_since_heartbeat();
            if time_since > timeout {
                tracing::warn!(
                    listener_id = %listener_hb.listener_id(),
                    time_since_ms = time_since.as_millis(),
                    "Connection timed out (no heartbeat)"
                );
                break;
            }
        }
    });

    // Wait for any task to complete
    let mut writer_done = false;
    let close_code = tokio::select! {
        result = &mut recv_task => result.ok().flatten(),
        _ = &mut send_task => {
            writer_done = true;
            tracing::debug!(listener_id = %listener_id, "Send task ended");
            None
        }
        _ = &mut heartbeat_task => Some(CloseCode::SessionTimeout),
    };

    recv_task.abort();
    heartbeat_task.abort();
    cleanup_listener(&registry, &hub_name, &listener_id);

    if let Some(code) = close_code {
        tracing::debug!(listener_id = %listener_id, close_code = %code, "Closing connection");
        let _ = close_tx.send(code);
    } else {
        drop(close_tx);
    }

    if !writer_done && tokio::time::timeout(CLOSE_GRACE, &mut send_task).await.is_err() {
        send_task.abort();
    }
}

/// Handle a text frame from the client
async fn handle_text_message(
    hub: &SubscriptionHub,
    listener: &Arc<Listener>,
    text: &str,
) -> Result<(), CloseCode> {
    let message = match HubMessage::from_json(text) {
        Ok(m) => m,
        Err(e) => {
            tracing::debug!(
                listener_id = %listener.listener_id(),
                error = %e,
                "Failed to parse frame"
            );
            return Err(CloseCode::DecodeError);
        }
    };

    tracing::trace!(
        listener_id = %listener.listener_id(),
        op = %message.op,
        "Received frame"
    );

    match FrameHandler::handle(hub, listener, message).await {
        Ok(Some(close_code)) => Err(close_code),
        Ok(None) => Ok(()),
        Err(e) => {
            tracing::warn!(
                listener_id = %listener.listener_id(),
                error = %e,
                "Handler error"
            );
            Err(e.to_close_code().unwrap_or(CloseCode::UnknownError))
        }
    }
}

/// Remove the listener and its memberships on disconnect
///
/// The hub itself goes away with its last listener.
fn cleanup_listener(registry: &HubRegistry, hub_name: &str, listener_id: &str) {
    tracing::info!(hub = %hub_name, listener_id = %listener_id, "Cleaning up hub connection");
    registry.detach(hub_name, listener_id);
}
