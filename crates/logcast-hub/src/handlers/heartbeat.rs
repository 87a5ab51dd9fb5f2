//! Heartbeat handler (op 1)

use super::{HandlerError, HandlerResult};
use crate::hub::Listener;
use logcast_core::{CloseCode, HubMessage};
use std::sync::Arc;

/// Handles heartbeat messages
pub struct HeartbeatHandler;

impl HeartbeatHandler {
    /// Handle a heartbeat from the client
    pub async fn handle(listener: &Arc<Listener>) -> HandlerResult<Option<CloseCode>> {
        listener.record_heartbeat();

        tracing::trace!(listener_id = %listener.listener_id(), "Heartbeat received");

        if let Err(e) = listener.send(HubMessage::heartbeat_ack()).await {
            tracing::warn!(
                listener_id = %listener.listener_id(),
                error = %e,
                "Failed to send heartbeat ACK"
            );
            return Err(HandlerError::Internal("Failed to send heartbeat ACK".to_string()));
        }

        Ok(None)
    }
}
