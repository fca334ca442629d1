//! CLI module
//!
//! Provides:
//! - Argument parsing (`args`)
//! - Effective configuration: file + environment + flags

pub mod args;

// Re-exports
pub use args::Args;

use crate::config::ConsoleConfig;

/// CLI errors
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] crate::config::Error),
}

/// Exit codes
pub const EXIT_FAILURE: i32 = 1;
pub const EXIT_CONFIG_ERROR: i32 = 2;

/// Result type for CLI operations
pub type Result<T> = std::result::Result<T, Error>;

/// Load the config named by the arguments and apply flag overrides on top
pub fn resolve_config(args: &Args) -> Result<ConsoleConfig> {
    let mut config = ConsoleConfig::load(args.config.as_deref())?;
    args.apply_to(&mut config);
    config.validate()?;
    Ok(config)
}
