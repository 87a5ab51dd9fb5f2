//! Invoke handler (op 4)
//!
//! Exposes the hub methods remote clients may call:
//! `OnMessageLogged(entry[, group])`, `Listen([group])` and `Leave(group)`.

use super::{HandlerError, HandlerResult, ListenHandler};
use crate::hub::{Listener, SubscriptionHub};
use logcast_core::{methods, CloseCode, EventEnvelope, GroupName, Invocation};
use serde_json::Value;
use std::sync::Arc;

/// Handles hub method invocations
pub struct InvokeHandler;

impl InvokeHandler {
    /// Handle an invocation from the client
    pub async fn handle(
        hub: &SubscriptionHub,
        listener: &Arc<Listener>,
        invocation: Invocation,
    ) -> HandlerResult<Option<CloseCode>> {
        match invocation.method.as_str() {
            methods::ON_MESSAGE_LOGGED => {
                let envelope = Self::envelope_arg(&invocation)?;
                let group = Self::group_arg(&invocation, 1)?.unwrap_or_default();

                let sent = hub.on_fanout(&envelope.to_logged_event(), &group);

                tracing::trace!(
                    hub = %hub.name(),
                    listener_id = %listener.listener_id(),
                    id = envelope.id(),
                    group = %group,
                    sent = sent,
                    "OnMessageLogged relayed"
                );

                Ok(None)
            }
            methods::LISTEN => {
                let group = Self::group_arg(&invocation, 0)?.unwrap_or_default();
                ListenHandler::listen(hub, listener, &group).await
            }
            methods::LEAVE => {
                let group = Self::group_arg(&invocation, 0)?.ok_or_else(|| {
                    HandlerError::InvalidArguments {
                        method: invocation.method.clone(),
                        reason: "missing group".to_string(),
                    }
                })?;
                ListenHandler::leave(hub, listener, &group).await
            }
            other => Err(HandlerError::UnknownMethod(other.to_string())),
        }
    }

    fn envelope_arg(invocation: &Invocation) -> HandlerResult<EventEnvelope> {
        let raw = invocation
            .arg(0)
            .ok_or_else(|| HandlerError::InvalidArguments {
                method: invocation.method.clone(),
                reason: "missing log entry".to_string(),
            })?;

        serde_json::from_value(raw.clone()).map_err(|e| HandlerError::InvalidArguments {
            method: invocation.method.clone(),
            reason: e.to_string(),
        })
    }

    fn group_arg(invocation: &Invocation, index: usize) -> HandlerResult<Option<GroupName>> {
        match invocation.arg(index) {
            None | Some(Value::Null) => Ok(None),
            Some(Value::String(name)) => Ok(Some(GroupName::new(name)?)),
            Some(_) => Err(HandlerError::InvalidArguments {
                method: invocation.method.clone(),
                reason: format!("argument {index} must be a group name"),
            }),
        }
    }
}
