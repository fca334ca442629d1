//! ChatOps console: a terminal client for the network management gateway's
//! command channel.
//!
//! The session layer owns the channel lifecycle, the transcript and the
//! activity log. The UI layer is a thin terminal surface over it.

pub mod cli;
pub mod config;
pub mod logging;
pub mod session;
pub mod ui;

// Re-export the session surface
pub use session::{
    ActivityLog, Category, ChannelEvent, ChannelId, CommandSession, ConnectionState, Connector,
    DisplayLabel, Envelope, MessageTag, Role, SessionSettings, Transcript, TranscriptEntry,
};

// Re-export configuration
pub use config::ConsoleConfig;
