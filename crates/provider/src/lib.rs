//! Messaging-provider boundary.
//!
//! The provider is an external collaborator that holds a session with
//! the messaging network. This crate defines the surface the gateway
//! consumes — send/receive primitives, lifecycle events, media
//! download — plus the event-sink capability the gateway implements,
//! and a scripted in-process provider for development and tests.

pub mod client;
pub mod error;
pub mod event;
pub mod scripted;
pub mod sink;

pub use {
    client::{
        ChatSummary, MessagingProvider, OutgoingContent, SendOptions, USER_ADDRESS_SUFFIX,
        normalize_chat_id,
    },
    error::{Error, Result},
    event::{InboundMessage, ProviderEvent},
    scripted::{ScriptedProvider, SentMessage},
    sink::{EventSink, MemorySink},
};
