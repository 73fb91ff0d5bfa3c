use std::{
    collections::HashMap,
    sync::{
        Arc, Mutex,
        atomic::{AtomicBool, Ordering},
    },
};

use {
    async_trait::async_trait,
    parley_media::MediaArtifact,
    tokio::sync::mpsc,
    tracing::debug,
};

use crate::{
    Result,
    client::{ChatSummary, MessagingProvider, OutgoingContent, SendOptions},
    error::Error,
    event::ProviderEvent,
};

/// One outbound call recorded by the scripted provider.
#[derive(Debug, Clone, PartialEq)]
pub struct SentMessage {
    pub chat_id: String,
    pub content: OutgoingContent,
    pub options: SendOptions,
}

/// In-process provider with scriptable behavior.
///
/// Records every outbound call, serves preloaded chats and media, and
/// lets the caller inject lifecycle events into the receiver handed out
/// by [`ScriptedProvider::new`]. Used as the test double and as the
/// development stand-in until a live network session implementation is
/// wired in.
pub struct ScriptedProvider {
    sent: Mutex<Vec<SentMessage>>,
    chats: Mutex<Vec<ChatSummary>>,
    media: Mutex<HashMap<String, MediaArtifact>>,
    fail_sends: AtomicBool,
    fail_downloads: AtomicBool,
    events: mpsc::UnboundedSender<ProviderEvent>,
}

impl ScriptedProvider {
    /// Create the provider plus the event receiver the gateway drains.
    pub fn new() -> (Arc<Self>, mpsc::UnboundedReceiver<ProviderEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let provider = Arc::new(Self {
            sent: Mutex::new(Vec::new()),
            chats: Mutex::new(Vec::new()),
            media: Mutex::new(HashMap::new()),
            fail_sends: AtomicBool::new(false),
            fail_downloads: AtomicBool::new(false),
            events: tx,
        });
        (provider, rx)
    }

    /// Inject a provider event, as a live session would.
    pub fn emit(&self, event: ProviderEvent) {
        // Receiver may already be gone during shutdown.
        let _ = self.events.send(event);
    }

    /// Every outbound call so far, in order.
    pub fn sent(&self) -> Vec<SentMessage> {
        self.sent.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub fn set_chats(&self, chats: Vec<ChatSummary>) {
        *self.chats.lock().unwrap_or_else(|e| e.into_inner()) = chats;
    }

    /// Preload downloadable media for a message id.
    pub fn put_media(&self, message_id: impl Into<String>, artifact: MediaArtifact) {
        self.media
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(message_id.into(), artifact);
    }

    /// Make subsequent sends fail, as a rejected recipient would.
    pub fn fail_sends(&self, fail: bool) {
        self.fail_sends.store(fail, Ordering::SeqCst);
    }

    /// Make subsequent media downloads fail.
    pub fn fail_downloads(&self, fail: bool) {
        self.fail_downloads.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl MessagingProvider for ScriptedProvider {
    async fn send_message(
        &self,
        chat_id: &str,
        content: OutgoingContent,
        options: SendOptions,
    ) -> Result<()> {
        if self.fail_sends.load(Ordering::SeqCst) {
            return Err(Error::rejected(format!("scripted failure for {chat_id}")));
        }
        debug!(chat_id, ?options, "scripted provider send");
        self.sent
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(SentMessage {
                chat_id: chat_id.to_string(),
                content,
                options,
            });
        Ok(())
    }

    async fn get_chats(&self) -> Result<Vec<ChatSummary>> {
        Ok(self.chats.lock().unwrap_or_else(|e| e.into_inner()).clone())
    }

    async fn download_media(&self, message_id: &str) -> Result<MediaArtifact> {
        if self.fail_downloads.load(Ordering::SeqCst) {
            return Err(Error::unavailable(format!(
                "scripted download failure for {message_id}"
            )));
        }
        self.media
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(message_id)
            .cloned()
            .ok_or_else(|| Error::unavailable(format!("no media for {message_id}")))
    }
}
