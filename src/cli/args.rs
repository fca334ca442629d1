//! CLI argument parsing
//!
//! ```text
//! chatops-console [--config <file>] [--endpoint <url>] [--role <role>]
//!                 [--connect] [--log-dir <dir>]
//! ```

use clap::Parser;
use std::path::PathBuf;

use crate::config::ConsoleConfig;

/// Parsed CLI arguments
#[derive(Debug, Clone, PartialEq, Eq, Parser)]
#[command(
    name = "chatops-console",
    version,
    about = "Terminal ChatOps console for the network management gateway"
)]
pub struct Args {
    /// Config file (default: $CHATOPS_HOME/config.toml when present)
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Command channel endpoint, e.g. ws://localhost:8000/ws/chatops
    #[arg(long, value_name = "URL")]
    pub endpoint: Option<String>,

    /// Role to connect with (client, manager, ...)
    #[arg(long, value_name = "ROLE")]
    pub role: Option<String>,

    /// Open the channel immediately on startup
    #[arg(long)]
    pub connect: bool,

    /// Directory for the log file
    #[arg(long, value_name = "DIR")]
    pub log_dir: Option<PathBuf>,
}

impl Args {
    /// Apply flag overrides (flags beat file and environment)
    pub fn apply_to(&self, config: &mut ConsoleConfig) {
        if let Some(ref endpoint) = self.endpoint {
            config.endpoint = endpoint.clone();
        }
        if let Some(ref role) = self.role {
            config.default_role = role.clone();
        }
        if let Some(ref dir) = self.log_dir {
            config.log_dir = Some(dir.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Args {
        Args::try_parse_from(std::iter::once("chatops-console").chain(args.iter().copied()))
            .unwrap()
    }

    #[test]
    fn test_parse_empty_args() {
        let args = parse(&[]);
        assert!(args.config.is_none());
        assert!(args.endpoint.is_none());
        assert!(!args.connect);
    }

    #[test]
    fn test_parse_all_flags() {
        let args = parse(&[
            "--config",
            "/etc/chatops.toml",
            "--endpoint",
            "ws://gw:8000/ws/chatops",
            "--role",
            "manager",
            "--connect",
            "--log-dir",
            "/var/log/chatops",
        ]);
        assert_eq!(args.config, Some(PathBuf::from("/etc/chatops.toml")));
        assert_eq!(args.endpoint.as_deref(), Some("ws://gw:8000/ws/chatops"));
        assert_eq!(args.role.as_deref(), Some("manager"));
        assert!(args.connect);
        assert_eq!(args.log_dir, Some(PathBuf::from("/var/log/chatops")));
    }

    #[test]
    fn test_unknown_flag_rejected() {
        assert!(Args::try_parse_from(["chatops-console", "--bogus"]).is_err());
    }

    #[test]
    fn test_flags_override_config() {
        let args = parse(&["--endpoint", "wss://gw/ws", "--role", "manager"]);
        let mut config = ConsoleConfig::default();
        args.apply_to(&mut config);
        assert_eq!(config.endpoint, "wss://gw/ws");
        assert_eq!(config.default_role, "manager");
        assert_eq!(config.reconnect_delay_ms, 1000);
    }
}
