use serde::{Deserialize, Serialize};

/// One message delivered by the provider session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InboundMessage {
    /// Provider-assigned message id.
    pub id: String,
    /// Sender chat address.
    pub from: String,
    pub body: String,
    /// Provider-assigned message type (e.g. `chat`, `image`).
    pub kind: String,
    /// The message carries media the session can download.
    pub has_media: bool,
}

/// Lifecycle and message events emitted by a provider session.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ProviderEvent {
    /// A pairing code to display to the operator.
    Qr(String),
    /// The session is connected and usable.
    Ready,
    Authenticated,
    AuthFailure(String),
    Message(InboundMessage),
    /// Delivery/read acknowledgment for a previously sent message.
    Ack { message_id: String, status: i64 },
}
