use {async_trait::async_trait, serde_json::Value};

/// Where normalized events go — the gateway provides the concrete
/// implementation (WebSocket fan-out); tests use [`MemorySink`].
///
/// No delivery guarantee, no backpressure, no replay.
#[async_trait]
pub trait EventSink: Send + Sync {
    async fn publish(&self, event: &str, payload: Value);
}

/// In-memory sink that records every published event.
#[derive(Debug, Default)]
pub struct MemorySink {
    events: std::sync::Mutex<Vec<(String, Value)>>,
}

impl MemorySink {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// All events published so far, in order.
    pub fn events(&self) -> Vec<(String, Value)> {
        self.events
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}

#[async_trait]
impl EventSink for MemorySink {
    async fn publish(&self, event: &str, payload: Value) {
        self.events
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push((event.to_string(), payload));
    }
}
