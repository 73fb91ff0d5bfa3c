use std::{collections::HashMap, sync::Arc};

use tokio::sync::{RwLock, mpsc};

use {parley_provider::MessagingProvider, parley_store::MessageLog};

/// A WebSocket subscriber currently connected to the gateway.
#[derive(Debug)]
pub struct ConnectedClient {
    pub conn_id: String,
    /// Channel feeding this client's write loop with serialized frames.
    pub sender: mpsc::UnboundedSender<String>,
}

impl ConnectedClient {
    /// Queue a frame. Returns false when the write loop is gone.
    pub fn send(&self, frame: &str) -> bool {
        self.sender.send(frame.to_string()).is_ok()
    }
}

/// Shared gateway state: the provider session, the message log, and the
/// connected real-time subscribers.
pub struct GatewayState {
    pub provider: Arc<dyn MessagingProvider>,
    pub log: Arc<dyn MessageLog>,
    pub clients: RwLock<HashMap<String, ConnectedClient>>,
}

impl GatewayState {
    pub fn new(provider: Arc<dyn MessagingProvider>, log: Arc<dyn MessageLog>) -> Self {
        Self {
            provider,
            log,
            clients: RwLock::new(HashMap::new()),
        }
    }
}
