use std::sync::Arc;

use {
    async_trait::async_trait,
    serde_json::Value,
    tracing::{debug, warn},
};

use parley_provider::EventSink;

use crate::state::GatewayState;

/// Serialize one `{event, payload}` frame for the WebSocket wire.
pub fn frame(event: &str, payload: &Value) -> Result<String, serde_json::Error> {
    serde_json::to_string(&serde_json::json!({
        "event": event,
        "payload": payload,
    }))
}

/// Fan an event out to every connected subscriber.
///
/// Best-effort: clients whose write loop is gone are skipped; there is no
/// replay for late subscribers.
pub async fn broadcast(state: &GatewayState, event: &str, payload: Value) {
    let json = match frame(event, &payload) {
        Ok(j) => j,
        Err(e) => {
            warn!(event, error = %e, "failed to serialize broadcast event");
            return;
        },
    };

    let clients = state.clients.read().await;
    debug!(event, clients = clients.len(), "broadcasting event");
    for client in clients.values() {
        if !client.send(&json) {
            debug!(conn_id = %client.conn_id, "skipping closed subscriber");
        }
    }
}

/// [`EventSink`] backed by the WebSocket broadcaster — the production
/// sink; tests swap in `parley_provider::MemorySink`.
pub struct WsEventSink {
    state: Arc<GatewayState>,
}

impl WsEventSink {
    pub fn new(state: Arc<GatewayState>) -> Self {
        Self { state }
    }
}

#[async_trait]
impl EventSink for WsEventSink {
    async fn publish(&self, event: &str, payload: Value) {
        broadcast(&self.state, event, payload).await;
    }
}
