//! Op code handlers
//!
//! Handles incoming hub frames based on their operation code.

mod error;
mod heartbeat;
mod invoke;
mod listen;

pub use error::{HandlerError, HandlerResult};
pub use heartbeat::HeartbeatHandler;
pub use invoke::InvokeHandler;
pub use listen::ListenHandler;

use crate::hub::{Listener, SubscriptionHub};
use logcast_core::{CloseCode, HubMessage, OpCode};
use std::sync::Arc;

/// Route incoming client frames to the appropriate handler
pub struct FrameHandler;

impl FrameHandler {
    /// Handle an incoming client frame
    pub async fn handle(
        hub: &SubscriptionHub,
        listener: &Arc<Listener>,
        message: HubMessage,
    ) -> HandlerResult<Option<CloseCode>> {
        // Validate that this is a client-sendable op code
        if !message.op.is_client_op() {
            tracing::warn!(
                listener_id = %listener.listener_id(),
                op = %message.op,
                "Received server-only op code from client"
            );
            return Ok(Some(CloseCode::UnknownOpcode));
        }

        match message.op {
            OpCode::Heartbeat => HeartbeatHandler::handle(listener).await,
            OpCode::Listen => {
                let payload = message.as_listen().ok_or_else(|| {
                    HandlerError::InvalidPayload("Invalid Listen payload".to_string())
                })?;

                ListenHandler::listen(hub, listener, &payload.group()).await
            }
            OpCode::Leave => {
                let payload = message.as_group().ok_or_else(|| {
                    HandlerError::InvalidPayload("Invalid Leave payload".to_string())
                })?;

                ListenHandler::leave(hub, listener, &payload.group).await
            }
            OpCode::Invoke => {
                let invocation = message.as_invocation().ok_or_else(|| {
                    HandlerError::InvalidPayload("Invalid Invoke payload".to_string())
                })?;

                InvokeHandler::handle(hub, listener, invocation).await
            }
            // These ops should never reach here due to is_client_op check
            _ => {
                tracing::error!(op = %message.op, "Unhandled client op code");
                Ok(Some(CloseCode::UnknownOpcode))
            }
        }
    }
}
