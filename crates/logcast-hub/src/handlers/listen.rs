//! Listen/Leave handler (op 2, op 3)

use super::{HandlerError, HandlerResult};
use crate::hub::{Listener, SubscriptionHub};
use logcast_core::{CloseCode, GroupName, HubMessage};
use std::sync::Arc;

/// Handles group membership requests
pub struct ListenHandler;

impl ListenHandler {
    /// Join a group and acknowledge it
    pub async fn listen(
        hub: &SubscriptionHub,
        listener: &Arc<Listener>,
        group: &GroupName,
    ) -> HandlerResult<Option<CloseCode>> {
        if !hub.join(listener.listener_id(), group) {
            return Err(HandlerError::UnknownListener(listener.listener_id().to_string()));
        }

        tracing::debug!(
            hub = %hub.name(),
            listener_id = %listener.listener_id(),
            group = %group,
            "Listening"
        );

        listener
            .send(HubMessage::listen_ack(group))
            .await
            .map_err(|e| HandlerError::Internal(format!("Failed to send ListenAck: {e}")))?;

        Ok(None)
    }

    /// Leave a group
    pub async fn leave(
        hub: &SubscriptionHub,
        listener: &Arc<Listener>,
        group: &GroupName,
    ) -> HandlerResult<Option<CloseCode>> {
        if !hub.leave(listener.listener_id(), group) {
            return Err(HandlerError::UnknownListener(listener.listener_id().to_string()));
        }

        tracing::debug!(
            hub = %hub.name(),
            listener_id = %listener.listener_id(),
            group = %group,
            "Left group"
        );

        Ok(None)
    }
}
