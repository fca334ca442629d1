//! Live command session
//!
//! Everything between the console UI and the gateway's command channel:
//! - `client`: the session itself (lifecycle, dispatch, reconnect)
//! - `channel`: connector seam and channel events
//! - `websocket`: tokio-tungstenite connector
//! - `transcript` / `activity`: what the UI renders

pub mod activity;
pub mod channel;
pub mod channel_fake;
pub mod client;
pub mod envelope;
pub mod reconnect;
pub mod role;
pub mod transcript;
pub mod websocket;

// Re-exports
pub use activity::{ActivityEntry, ActivityLog};
pub use channel::{ChannelEvent, ChannelHandle, ChannelId, Connector, OpenRequest, Outbound};
pub use channel_fake::{FakeChannels, FakeConnector};
pub use client::{CommandSession, ConnectionState, SessionSettings, DEFAULT_ENDPOINT};
pub use envelope::{Envelope, MessageTag, SYSTEM_ORIGIN};
pub use reconnect::ScheduledReconnect;
pub use role::{InvalidRole, Role};
pub use transcript::{Category, DisplayLabel, Transcript, TranscriptEntry};
pub use websocket::WebSocketConnector;

/// Channel result type
pub type Result<T> = std::result::Result<T, ChannelError>;

/// Channel errors
#[derive(Debug, thiserror::Error)]
pub enum ChannelError {
    #[error("invalid endpoint '{endpoint}': {reason}")]
    InvalidEndpoint { endpoint: String, reason: String },

    #[error("unsupported endpoint scheme '{0}' (expected ws or wss)")]
    UnsupportedScheme(String),

    #[error("failed to open channel: {0}")]
    Open(String),

    #[error("channel {0} is no longer running")]
    Gone(channel::ChannelId),
}
