use {
    parley_media::MediaArtifact,
    serde::{Deserialize, Serialize},
};

/// Whether a record was received from or sent to the network.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    In,
    Out,
}

/// One sent or received message. Immutable once appended to the log.
///
/// Outbound records carry `to` and no `from`; inbound records the
/// reverse. `kind` is the provider- or client-supplied message type
/// string (serialized as `type` for wire compatibility).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageRecord {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    #[serde(rename = "type")]
    pub kind: String,
    /// Epoch milliseconds at creation.
    pub timestamp: i64,
    pub direction: Direction,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub media: Option<MediaArtifact>,
}

impl MessageRecord {
    /// Build an outbound record with a fresh collision-resistant id.
    pub fn outbound(
        to: impl Into<String>,
        kind: impl Into<String>,
        body: Option<String>,
        media: Option<MediaArtifact>,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            from: None,
            to: Some(to.into()),
            body,
            kind: kind.into(),
            timestamp: now_millis(),
            direction: Direction::Out,
            media: None,
        }
        .with_media(media)
    }

    /// Build an inbound record keyed by the provider-assigned message id.
    pub fn inbound(
        id: impl Into<String>,
        from: impl Into<String>,
        kind: impl Into<String>,
        body: Option<String>,
    ) -> Self {
        Self {
            id: id.into(),
            from: Some(from.into()),
            to: None,
            body,
            kind: kind.into(),
            timestamp: now_millis(),
            direction: Direction::In,
            media: None,
        }
    }

    #[must_use]
    pub fn with_media(mut self, media: Option<MediaArtifact>) -> Self {
        self.media = media;
        self
    }
}

/// Current wall-clock time as epoch milliseconds.
pub fn now_millis() -> i64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as i64
}
