//! ChatOps console UI
//!
//! The UI thread owns the session:
//! - Channel events arrive over an mpsc queue and are drained once per loop
//! - The scheduled reconnect is polled on the same tick
//! - Rendering reads session state; it never mutates it
//!
//! Input model:
//! - Lines starting with "/" are console commands
//! - Everything else is sent to the gateway as a raw command
//! - F2..F5 send the quick commands

pub mod handlers;
pub mod input;
pub mod state;
pub mod view;

// Re-exports
pub use handlers::{execute_command, execute_quick};
pub use input::{parse_command, render_help, Command, QuickCommand};
pub use state::{App, AppState, ConsoleSession};
pub use view::render;

/// UI result type
pub type Result<T> = std::result::Result<T, Error>;

/// UI errors
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
