use {
    serde::Deserialize,
    tracing::{debug, warn},
};

use {
    parley_media::{MediaArtifact, MediaDescriptor, resolve},
    parley_provider::{MessagingProvider, OutgoingContent, SendOptions, normalize_chat_id},
    parley_store::{MessageLog, MessageRecord},
};

use crate::error::ApiError;

/// Ephemeral send request, discarded once a record is produced.
///
/// All fields are optional at the serde layer so that missing-field
/// failures surface as 400 validation errors with a message, not as
/// generic deserialization rejections.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SendRequest {
    pub to: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub message: Option<String>,
    pub media: Option<MediaDescriptor>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub contacts: Option<Vec<String>>,
    pub poll: Option<PollFields>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PollFields {
    pub question: Option<String>,
    pub options: Vec<String>,
}

/// Closed set of recognized send types. An unrecognized tag is a
/// validation error, not a silent fallback to text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SendKind {
    Text,
    Media,
    Gif,
    Sticker,
    Location,
    LiveLocation,
    Contacts,
    Poll,
}

impl SendKind {
    fn parse(raw: Option<&str>) -> Result<Self, ApiError> {
        match raw.unwrap_or("text") {
            "text" => Ok(Self::Text),
            "media" | "media-url" | "media-file" | "video" => Ok(Self::Media),
            "gif" => Ok(Self::Gif),
            "sticker" => Ok(Self::Sticker),
            "location" => Ok(Self::Location),
            // Alias: behaves exactly like `location`. Continuous
            // location streaming is not supported.
            "live-location" => Ok(Self::LiveLocation),
            "contacts" => Ok(Self::Contacts),
            "poll" => Ok(Self::Poll),
            other => Err(ApiError::Validation(format!(
                "unrecognized message type: {other}"
            ))),
        }
    }
}

/// Validate a send request, invoke the provider, and persist the outcome.
///
/// On validation failure nothing is sent or stored. On a provider
/// failure nothing is stored. A persistence failure after a successful
/// send is logged and swallowed: the user-visible action already
/// happened.
pub async fn dispatch(
    provider: &dyn MessagingProvider,
    log: &dyn MessageLog,
    request: SendRequest,
) -> Result<MessageRecord, ApiError> {
    let to = request
        .to
        .as_deref()
        .filter(|t| !t.is_empty())
        .ok_or_else(|| ApiError::Validation("to is required".into()))?;
    let chat_id = normalize_chat_id(to);

    let kind = SendKind::parse(request.kind.as_deref())?;
    let kind_tag = request.kind.clone().unwrap_or_else(|| "text".into());

    let mut sent_media: Option<MediaArtifact> = None;
    let mut options = SendOptions::default();

    let content = match kind {
        SendKind::Text => {
            let message = request
                .message
                .clone()
                .filter(|m| !m.is_empty())
                .ok_or_else(|| ApiError::Validation("message is required".into()))?;
            OutgoingContent::Text(message)
        },
        SendKind::Media | SendKind::Gif | SendKind::Sticker => {
            let descriptor = request
                .media
                .as_ref()
                .ok_or_else(|| ApiError::Validation("media is required".into()))?;
            let artifact = resolve(descriptor).await?;
            options.as_sticker = kind == SendKind::Sticker;
            options.as_gif = kind == SendKind::Gif;
            sent_media = Some(artifact.clone());
            OutgoingContent::Media(artifact)
        },
        SendKind::Location | SendKind::LiveLocation => {
            let (latitude, longitude) = match (request.latitude, request.longitude) {
                (Some(lat), Some(lng)) => (lat, lng),
                _ => {
                    return Err(ApiError::Validation(
                        "latitude and longitude required".into(),
                    ));
                },
            };
            OutgoingContent::Location {
                latitude,
                longitude,
            }
        },
        SendKind::Contacts => {
            let contacts = request
                .contacts
                .as_ref()
                .filter(|c| !c.is_empty())
                .ok_or_else(|| ApiError::Validation("contacts array required".into()))?;
            // Simplification: identifiers as newline-separated text, not a
            // native contact-card share.
            OutgoingContent::Text(contacts.join("\n"))
        },
        SendKind::Poll => {
            let poll = request
                .poll
                .as_ref()
                .ok_or_else(|| ApiError::Validation("poll with question and options required".into()))?;
            let question = poll
                .question
                .clone()
                .filter(|q| !q.is_empty())
                .ok_or_else(|| ApiError::Validation("poll with question and options required".into()))?;
            if poll.options.is_empty() {
                return Err(ApiError::Validation(
                    "poll with question and options required".into(),
                ));
            }
            OutgoingContent::Poll {
                body: request.message.clone().unwrap_or_default(),
                question,
                options: poll.options.clone(),
            }
        },
    };

    provider.send_message(&chat_id, content, options).await?;

    let record = MessageRecord::outbound(chat_id, kind_tag, request.message.clone(), sent_media);
    if let Err(e) = log.append(record.clone()).await {
        // The message is already on the network; the request still
        // succeeds with a degraded log.
        warn!(record_id = %record.id, error = %e, "message sent but log persistence failed");
    }
    debug!(record_id = %record.id, to = record.to.as_deref(), "dispatched outbound message");

    Ok(record)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use {
        base64::{Engine, engine::general_purpose::STANDARD},
        parley_provider::ScriptedProvider,
        parley_store::{Direction, SnapshotLog},
    };

    use super::*;

    async fn harness() -> (Arc<ScriptedProvider>, SnapshotLog, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let log = SnapshotLog::open(dir.path().join("messages.json"))
            .await
            .unwrap();
        let (provider, _events) = ScriptedProvider::new();
        (provider, log, dir)
    }

    fn text_request(to: &str, message: &str) -> SendRequest {
        SendRequest {
            to: Some(to.into()),
            message: Some(message.into()),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn text_send_normalizes_recipient_and_persists() {
        let (provider, log, _dir) = harness().await;
        let record = dispatch(provider.as_ref(), &log, text_request("123", "hi"))
            .await
            .unwrap();

        assert_eq!(record.to.as_deref(), Some("123@c.us"));
        assert_eq!(record.body.as_deref(), Some("hi"));
        assert_eq!(record.direction, Direction::Out);

        let sent = provider.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].chat_id, "123@c.us");
        assert_eq!(sent[0].content, OutgoingContent::Text("hi".into()));

        assert_eq!(log.all().await.len(), 1);
    }

    #[tokio::test]
    async fn missing_message_fails_before_any_side_effect() {
        let (provider, log, _dir) = harness().await;
        let request = SendRequest {
            to: Some("123".into()),
            ..Default::default()
        };
        let err = dispatch(provider.as_ref(), &log, request).await.unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));
        assert!(provider.sent().is_empty());
        assert!(log.all().await.is_empty());
    }

    #[tokio::test]
    async fn missing_to_is_rejected() {
        let (provider, log, _dir) = harness().await;
        let request = SendRequest {
            message: Some("hi".into()),
            ..Default::default()
        };
        let err = dispatch(provider.as_ref(), &log, request).await.unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));
    }

    #[tokio::test]
    async fn unrecognized_type_is_rejected_not_defaulted() {
        let (provider, log, _dir) = harness().await;
        let mut request = text_request("123", "hi");
        request.kind = Some("carrier-pigeon".into());
        let err = dispatch(provider.as_ref(), &log, request).await.unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));
        assert!(provider.sent().is_empty());
    }

    #[tokio::test]
    async fn inline_media_is_resolved_and_embedded() {
        let (provider, log, _dir) = harness().await;
        let request = SendRequest {
            to: Some("123".into()),
            kind: Some("media".into()),
            media: Some(MediaDescriptor {
                payload: Some(STANDARD.encode(b"img")),
                mimetype: Some("image/png".into()),
                ..Default::default()
            }),
            ..Default::default()
        };
        let record = dispatch(provider.as_ref(), &log, request).await.unwrap();
        let media = record.media.unwrap();
        assert_eq!(media.mimetype, "image/png");
        assert_eq!(media.filename, "file");
        assert!(matches!(
            provider.sent()[0].content,
            OutgoingContent::Media(_)
        ));
    }

    #[tokio::test]
    async fn sticker_and_gif_set_render_flags() {
        let (provider, log, _dir) = harness().await;
        for kind in ["sticker", "gif"] {
            let request = SendRequest {
                to: Some("123".into()),
                kind: Some(kind.into()),
                media: Some(MediaDescriptor {
                    payload: Some(STANDARD.encode(b"x")),
                    mimetype: Some("image/webp".into()),
                    ..Default::default()
                }),
                ..Default::default()
            };
            dispatch(provider.as_ref(), &log, request).await.unwrap();
        }
        let sent = provider.sent();
        assert_eq!(sent[0].options, SendOptions { as_sticker: true, as_gif: false });
        assert_eq!(sent[1].options, SendOptions { as_sticker: false, as_gif: true });
    }

    #[tokio::test]
    async fn media_type_without_descriptor_is_invalid() {
        let (provider, log, _dir) = harness().await;
        let request = SendRequest {
            to: Some("123".into()),
            kind: Some("media".into()),
            ..Default::default()
        };
        let err = dispatch(provider.as_ref(), &log, request).await.unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));
    }

    #[tokio::test]
    async fn location_requires_both_coordinates() {
        let (provider, log, _dir) = harness().await;
        let request = SendRequest {
            to: Some("123".into()),
            kind: Some("location".into()),
            latitude: Some(52.52),
            ..Default::default()
        };
        let err = dispatch(provider.as_ref(), &log, request).await.unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));

        let request = SendRequest {
            to: Some("123".into()),
            kind: Some("live-location".into()),
            latitude: Some(52.52),
            longitude: Some(13.40),
            ..Default::default()
        };
        dispatch(provider.as_ref(), &log, request).await.unwrap();
        assert_eq!(
            provider.sent()[0].content,
            OutgoingContent::Location {
                latitude: 52.52,
                longitude: 13.40,
            }
        );
    }

    #[tokio::test]
    async fn contacts_are_joined_as_text() {
        let (provider, log, _dir) = harness().await;
        let request = SendRequest {
            to: Some("123".into()),
            kind: Some("contacts".into()),
            contacts: Some(vec!["111@c.us".into(), "222@c.us".into()]),
            ..Default::default()
        };
        dispatch(provider.as_ref(), &log, request).await.unwrap();
        assert_eq!(
            provider.sent()[0].content,
            OutgoingContent::Text("111@c.us\n222@c.us".into())
        );

        let request = SendRequest {
            to: Some("123".into()),
            kind: Some("contacts".into()),
            contacts: Some(Vec::new()),
            ..Default::default()
        };
        let err = dispatch(provider.as_ref(), &log, request).await.unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));
    }

    #[tokio::test]
    async fn poll_carries_body_and_metadata() {
        let (provider, log, _dir) = harness().await;
        let request = SendRequest {
            to: Some("123".into()),
            kind: Some("poll".into()),
            message: Some("vote!".into()),
            poll: Some(PollFields {
                question: Some("lunch?".into()),
                options: vec!["pizza".into(), "ramen".into()],
            }),
            ..Default::default()
        };
        dispatch(provider.as_ref(), &log, request).await.unwrap();
        assert_eq!(
            provider.sent()[0].content,
            OutgoingContent::Poll {
                body: "vote!".into(),
                question: "lunch?".into(),
                options: vec!["pizza".into(), "ramen".into()],
            }
        );

        let request = SendRequest {
            to: Some("123".into()),
            kind: Some("poll".into()),
            poll: Some(PollFields::default()),
            ..Default::default()
        };
        let err = dispatch(provider.as_ref(), &log, request).await.unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));
    }

    #[tokio::test]
    async fn persistence_failure_does_not_fail_the_sent_request() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("blocker");
        let log = SnapshotLog::open(blocker.join("messages.json"))
            .await
            .unwrap();
        // A plain file where the snapshot's parent dir should be makes
        // every rewrite fail.
        std::fs::write(&blocker, b"").unwrap();
        let (provider, _events) = ScriptedProvider::new();

        // The message went out, so the request succeeds with a degraded
        // log.
        let record = dispatch(provider.as_ref(), &log, text_request("123", "hi"))
            .await
            .unwrap();
        assert_eq!(provider.sent().len(), 1);
        assert_eq!(log.all().await[0].id, record.id);
    }

    #[tokio::test]
    async fn provider_failure_stores_nothing() {
        let (provider, log, _dir) = harness().await;
        provider.fail_sends(true);
        let err = dispatch(provider.as_ref(), &log, text_request("123", "hi"))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Provider(_)));
        assert!(log.all().await.is_empty());
    }
}
