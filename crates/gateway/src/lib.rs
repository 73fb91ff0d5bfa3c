//! Message gateway: bridges a messaging-provider session to HTTP clients
//! and real-time WebSocket subscribers.
//!
//! Outbound: `POST /send` → dispatcher → provider → message log.
//! Inbound: provider event → ingestor → message log → broadcaster.

pub mod broadcast;
pub mod config;
pub mod error;
pub mod inbound;
pub mod outbound;
pub mod server;
pub mod state;
pub mod ws;

pub use {
    config::GatewayConfig,
    error::ApiError,
    state::GatewayState,
};
