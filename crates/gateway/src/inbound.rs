use std::sync::Arc;

use {
    serde::{Deserialize, Serialize},
    serde_json::json,
    tokio::{sync::mpsc, task::JoinHandle},
    tracing::{debug, warn},
};

use {
    parley_provider::{
        EventSink, InboundMessage, MessagingProvider, OutgoingContent, ProviderEvent, SendOptions,
    },
    parley_store::{MessageLog, MessageRecord},
};

/// Auto-reply policy: answer an exact trigger token with a fixed text.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AutoReply {
    pub trigger: String,
    pub reply: String,
}

impl Default for AutoReply {
    fn default() -> Self {
        Self {
            trigger: "!ping".into(),
            reply: "pong".into(),
        }
    }
}

/// Normalizes provider events into log records and subscriber events.
///
/// Events are handled strictly sequentially in delivery order; there is
/// no reordering and no deduplication, so a provider redelivery would
/// duplicate the record.
pub struct Ingestor {
    provider: Arc<dyn MessagingProvider>,
    log: Arc<dyn MessageLog>,
    sink: Arc<dyn EventSink>,
    auto_reply: AutoReply,
}

impl Ingestor {
    pub fn new(
        provider: Arc<dyn MessagingProvider>,
        log: Arc<dyn MessageLog>,
        sink: Arc<dyn EventSink>,
        auto_reply: AutoReply,
    ) -> Self {
        Self {
            provider,
            log,
            sink,
            auto_reply,
        }
    }

    /// Drain the provider event stream until the provider drops it.
    pub fn spawn(self, mut events: mpsc::UnboundedReceiver<ProviderEvent>) -> JoinHandle<()> {
        tokio::spawn(async move {
            while let Some(event) = events.recv().await {
                self.handle_event(event).await;
            }
            debug!("provider event stream closed");
        })
    }

    /// Handle one provider event. Fire-and-forget: failures are logged,
    /// never propagated.
    pub async fn handle_event(&self, event: ProviderEvent) {
        match event {
            ProviderEvent::Qr(code) => {
                self.sink.publish("qr", json!(code)).await;
            },
            ProviderEvent::Ready => {
                self.sink.publish("ready", serde_json::Value::Null).await;
                self.push_chat_snapshot().await;
            },
            ProviderEvent::Authenticated => {
                self.sink
                    .publish("authenticated", serde_json::Value::Null)
                    .await;
            },
            ProviderEvent::AuthFailure(reason) => {
                warn!(%reason, "provider authentication failed");
                self.sink.publish("auth_failure", json!(reason)).await;
            },
            ProviderEvent::Ack { message_id, status } => {
                self.sink
                    .publish("message_ack", json!({ "id": message_id, "ack": status }))
                    .await;
            },
            ProviderEvent::Message(message) => {
                self.ingest(message).await;
            },
        }
    }

    /// Bring subscribers up to date with the current chat list.
    async fn push_chat_snapshot(&self) {
        match self.provider.get_chats().await {
            Ok(chats) => {
                let names: Vec<String> =
                    chats.iter().map(|c| c.display_name().to_string()).collect();
                self.sink.publish("chats", json!(names)).await;
            },
            Err(e) => warn!(error = %e, "failed to fetch chats for snapshot"),
        }
    }

    /// Normalize one inbound message: auto-reply, download media, persist,
    /// publish.
    async fn ingest(&self, message: InboundMessage) {
        // Best-effort, before persistence: a failed reply never blocks
        // ingestion.
        if message.body == self.auto_reply.trigger {
            if let Err(e) = self
                .provider
                .send_message(
                    &message.from,
                    OutgoingContent::Text(self.auto_reply.reply.clone()),
                    SendOptions::default(),
                )
                .await
            {
                warn!(from = %message.from, error = %e, "auto-reply failed");
            }
        }

        let mut record = MessageRecord::inbound(
            message.id.clone(),
            message.from.clone(),
            message.kind.clone(),
            Some(message.body.clone()),
        );

        if message.has_media {
            // Eager download through the provider's own capability; the
            // record survives a failure without media.
            match self.provider.download_media(&message.id).await {
                Ok(artifact) => record.media = Some(artifact),
                Err(e) => {
                    warn!(message_id = %message.id, error = %e, "failed to download media")
                },
            }
        }

        if let Err(e) = self.log.append(record.clone()).await {
            warn!(record_id = %record.id, error = %e, "failed to persist inbound message");
        }

        let mut payload = json!({ "from": message.from, "body": message.body });
        if let Some(media) = &record.media {
            match serde_json::to_value(media) {
                Ok(v) => {
                    payload["media"] = v;
                },
                Err(e) => warn!(error = %e, "failed to serialize media payload"),
            }
        }
        self.sink.publish("message", payload).await;
        debug!(record_id = %record.id, "ingested inbound message");
    }
}

#[cfg(test)]
mod tests {
    use {
        parley_media::MediaArtifact,
        parley_provider::{ChatSummary, MemorySink, ScriptedProvider},
        parley_store::{Direction, SnapshotLog},
    };

    use super::*;

    struct Harness {
        provider: Arc<ScriptedProvider>,
        log: Arc<SnapshotLog>,
        sink: Arc<MemorySink>,
        ingestor: Ingestor,
        _dir: tempfile::TempDir,
    }

    async fn harness() -> Harness {
        let dir = tempfile::tempdir().unwrap();
        let log = Arc::new(
            SnapshotLog::open(dir.path().join("messages.json"))
                .await
                .unwrap(),
        );
        let (provider, _events) = ScriptedProvider::new();
        let sink = Arc::new(MemorySink::new());
        let ingestor = Ingestor::new(
            Arc::clone(&provider) as Arc<dyn MessagingProvider>,
            Arc::clone(&log) as Arc<dyn MessageLog>,
            Arc::clone(&sink) as Arc<dyn EventSink>,
            AutoReply::default(),
        );
        Harness {
            provider,
            log,
            sink,
            ingestor,
            _dir: dir,
        }
    }

    fn inbound(id: &str, from: &str, body: &str, has_media: bool) -> ProviderEvent {
        ProviderEvent::Message(InboundMessage {
            id: id.into(),
            from: from.into(),
            body: body.into(),
            kind: "chat".into(),
            has_media,
        })
    }

    #[tokio::test]
    async fn trigger_token_gets_exactly_one_reply() {
        let h = harness().await;
        h.ingestor
            .handle_event(inbound("m1", "peer@c.us", "!ping", false))
            .await;

        let sent = h.provider.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].chat_id, "peer@c.us");
        assert_eq!(sent[0].content, OutgoingContent::Text("pong".into()));

        let records = h.log.all().await;
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].direction, Direction::In);
        assert_eq!(records[0].from.as_deref(), Some("peer@c.us"));
    }

    #[tokio::test]
    async fn ordinary_messages_do_not_trigger_a_reply() {
        let h = harness().await;
        h.ingestor
            .handle_event(inbound("m1", "peer@c.us", "hello", false))
            .await;
        assert!(h.provider.sent().is_empty());
        assert_eq!(h.log.all().await.len(), 1);
    }

    #[tokio::test]
    async fn failed_auto_reply_does_not_block_ingestion() {
        let h = harness().await;
        h.provider.fail_sends(true);
        h.ingestor
            .handle_event(inbound("m1", "peer@c.us", "!ping", false))
            .await;
        assert_eq!(h.log.all().await.len(), 1);
    }

    #[tokio::test]
    async fn media_is_downloaded_eagerly() {
        let h = harness().await;
        h.provider.put_media("m1", MediaArtifact {
            mimetype: "image/png".into(),
            payload: "aGk=".into(),
            filename: "hi.png".into(),
        });
        h.ingestor
            .handle_event(inbound("m1", "peer@c.us", "", true))
            .await;

        let record = h.log.find_by_id("m1").await.unwrap();
        assert_eq!(record.media.unwrap().filename, "hi.png");

        let events = h.sink.events();
        let (event, payload) = &events[0];
        assert_eq!(event, "message");
        assert_eq!(payload["media"]["filename"], "hi.png");
    }

    #[tokio::test]
    async fn failed_media_download_still_stores_the_record() {
        let h = harness().await;
        h.provider.fail_downloads(true);
        h.ingestor
            .handle_event(inbound("m1", "peer@c.us", "pic", true))
            .await;

        let record = h.log.find_by_id("m1").await.unwrap();
        assert!(record.media.is_none());
        let events = h.sink.events();
        assert_eq!(events[0].0, "message");
        assert!(events[0].1.get("media").is_none());
    }

    #[tokio::test]
    async fn ready_publishes_a_chat_snapshot() {
        let h = harness().await;
        h.provider.set_chats(vec![
            ChatSummary {
                id: "111@c.us".into(),
                name: Some("Alice".into()),
            },
            ChatSummary {
                id: "222@c.us".into(),
                name: None,
            },
        ]);
        h.ingestor.handle_event(ProviderEvent::Ready).await;

        let events = h.sink.events();
        assert_eq!(events[0].0, "ready");
        assert_eq!(events[1].0, "chats");
        assert_eq!(events[1].1, json!(["Alice", "222@c.us"]));
    }

    #[tokio::test]
    async fn acks_are_forwarded() {
        let h = harness().await;
        h.ingestor
            .handle_event(ProviderEvent::Ack {
                message_id: "m9".into(),
                status: 3,
            })
            .await;
        let events = h.sink.events();
        assert_eq!(events[0].0, "message_ack");
        assert_eq!(events[0].1, json!({ "id": "m9", "ack": 3 }));
    }
}
