//! Group router

use crate::transport::{HubProxy, TransportError};
use logcast_core::{methods, EventEnvelope, GroupName};
use logcast_hub::HubRegistry;
use serde_json::Value;

/// Sends envelopes to one group of one hub
#[derive(Debug, Clone)]
pub struct GroupRouter {
    registry: HubRegistry,
    hub_name: String,
    group: GroupName,
}

impl GroupRouter {
    pub fn new(registry: HubRegistry, hub_name: impl Into<String>, group: GroupName) -> Self {
        Self {
            registry,
            hub_name: hub_name.into(),
            group,
        }
    }

    pub fn group(&self) -> &GroupName {
        &self.group
    }

    pub fn hub_name(&self) -> &str {
        &self.hub_name
    }

    pub fn registry(&self) -> &HubRegistry {
        &self.registry
    }

    /// Push to every member of the group in the in-process hub
    ///
    /// Returns the number of listeners reached; zero members is not an error.
    pub fn send_local(&self, envelope: &EventEnvelope) -> usize {
        let hub = self.registry.hub(&self.hub_name);
        hub.on_message_logged(envelope, Some(&self.group))
    }

    /// Invoke `OnMessageLogged(envelope, group)` on the remote hub
    ///
    /// Fails with [`TransportError::NotConnected`] when the connection is not
    /// usable at the moment of sending.
    pub fn send_remote(
        &self,
        proxy: &HubProxy,
        envelope: &EventEnvelope,
    ) -> Result<(), TransportError> {
        let state = proxy.state();
        if !state.is_connected() {
            return Err(TransportError::NotConnected(state));
        }

        let args = vec![
            envelope.to_value()?,
            Value::String(self.group.as_str().to_string()),
        ];
        proxy.invoke(methods::ON_MESSAGE_LOGGED, args)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connection::ConnectionManager;
    use crate::transport::mock::MockTransport;
    use logcast_core::HubMessage;
    use serde_json::json;
    use std::sync::Arc;
    use tokio::sync::mpsc;

    fn envelope(id: u64) -> EventEnvelope {
        EventEnvelope::new(id, "formatted", json!({"message": "hello"}))
    }

    #[test]
    fn test_send_local_reaches_group_members() {
        let registry = HubRegistry::new();
        let hub = registry.hub("LogHub");
        let group = GroupName::new("ops").unwrap();

        let (tx, mut rx) = mpsc::channel(8);
        hub.register("listener-1".to_string(), tx);
        hub.join("listener-1", &group);

        let router = GroupRouter::new(registry, "LogHub", group);
        assert_eq!(router.send_local(&envelope(7)), 1);

        let message: HubMessage = rx.try_recv().unwrap();
        let event = message.as_logged_event().unwrap();
        assert_eq!(event.id, 7);
        assert_eq!(event.formatted_event, "formatted");
    }

    #[test]
    fn test_send_local_without_members() {
        let router = GroupRouter::new(HubRegistry::new(), "LogHub", GroupName::default());
        assert_eq!(router.send_local(&envelope(1)), 0);
    }

    #[test]
    fn test_send_remote_invokes_on_message_logged() {
        let transport = MockTransport::new();
        let manager = ConnectionManager::new(Arc::new(transport.clone()), "ws://hub", "LogHub");
        manager.ensure_connected().unwrap();
        let proxy = manager.get_proxy().unwrap();

        let router = GroupRouter::new(HubRegistry::new(), "LogHub", GroupName::new("ops").unwrap());
        router.send_remote(&proxy, &envelope(3)).unwrap();

        let invocations = transport.record.invocations();
        assert_eq!(invocations.len(), 1);
        assert_eq!(invocations[0].method, "OnMessageLogged");
        assert_eq!(invocations[0].args[0]["id"], 3);
        assert_eq!(invocations[0].args[1], "ops");
    }

    #[test]
    fn test_send_remote_after_disconnect_is_skipped() {
        let transport = MockTransport::new();
        let manager = ConnectionManager::new(Arc::new(transport.clone()), "ws://hub", "LogHub");
        manager.ensure_connected().unwrap();
        let proxy = manager.get_proxy().unwrap();
        manager.close();

        let router = GroupRouter::new(HubRegistry::new(), "LogHub", GroupName::default());
        let result = router.send_remote(&proxy, &envelope(1));

        assert!(matches!(result, Err(TransportError::NotConnected(_))));
        assert!(transport.record.invocations().is_empty());
    }
}
