use {async_trait::async_trait, parley_media::MediaArtifact, serde::Serialize};

use crate::Result;

/// Address-space suffix for individual contacts on the network.
pub const USER_ADDRESS_SUFFIX: &str = "@c.us";

/// Normalize a chat identifier: anything containing `@` is already a
/// network address, a bare number gets the individual-contact suffix.
pub fn normalize_chat_id(to: &str) -> String {
    if to.contains('@') {
        to.to_string()
    } else {
        format!("{to}{USER_ADDRESS_SUFFIX}")
    }
}

/// What to send: one closed set of payload shapes the provider knows how
/// to put on the wire.
#[derive(Debug, Clone, PartialEq)]
pub enum OutgoingContent {
    Text(String),
    Media(MediaArtifact),
    Location { latitude: f64, longitude: f64 },
    Poll {
        body: String,
        question: String,
        options: Vec<String>,
    },
}

/// Rendering hints the provider applies to media sends.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SendOptions {
    /// Render as a sticker (no caption).
    pub as_sticker: bool,
    /// Render video as an animated loop.
    pub as_gif: bool,
}

/// One conversation known to the provider session.
#[derive(Debug, Clone, Serialize)]
pub struct ChatSummary {
    pub id: String,
    pub name: Option<String>,
}

impl ChatSummary {
    /// Display name, falling back to the address when unnamed.
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.id)
    }
}

/// Send/receive surface of the messaging provider.
///
/// The gateway only consumes this trait; session management, pairing,
/// and the network protocol live behind it.
#[async_trait]
pub trait MessagingProvider: Send + Sync {
    /// Send one message to a normalized chat address.
    async fn send_message(
        &self,
        chat_id: &str,
        content: OutgoingContent,
        options: SendOptions,
    ) -> Result<()>;

    /// All conversations of the current session.
    async fn get_chats(&self) -> Result<Vec<ChatSummary>>;

    /// Download the media attached to a received message. The provider
    /// already holds the bytes; no resolver round-trip is involved.
    async fn download_media(&self, message_id: &str) -> Result<MediaArtifact>;
}
