//! Console configuration
//!
//! Resolution order (later wins):
//! 1. Built-in defaults
//! 2. Config file: `--config <path>`, else `$CHATOPS_HOME/config.toml` if present
//! 3. Environment: `CHATOPS_ENDPOINT`, `CHATOPS_ROLE`, `CHATOPS_RECONNECT_DELAY_MS`
//! 4. Command-line flags (applied by the binary)

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};

use crate::session::{self, Role, SessionSettings};

/// Config file name inside `$CHATOPS_HOME`
pub const CONFIG_FILE: &str = "config.toml";

/// Environment variable naming the console home directory
pub const HOME_ENV: &str = "CHATOPS_HOME";

/// Config result type
pub type Result<T> = std::result::Result<T, Error>;

/// Config errors
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid config value for {key}: {reason}")]
    Invalid { key: &'static str, reason: String },
}

/// On-disk and effective configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConsoleConfig {
    /// Command channel endpoint (ws:// or wss://)
    pub endpoint: String,
    /// Role selected at startup
    pub default_role: String,
    /// Delay between close and re-open on a role change
    pub reconnect_delay_ms: u64,
    /// Directory for the log file (defaults to the system temp dir)
    pub log_dir: Option<PathBuf>,
    pub max_transcript_entries: usize,
    pub max_activity_entries: usize,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            endpoint: session::DEFAULT_ENDPOINT.to_string(),
            default_role: Role::Client.to_string(),
            reconnect_delay_ms: 1000,
            log_dir: None,
            max_transcript_entries: session::transcript::DEFAULT_MAX_ENTRIES,
            max_activity_entries: session::activity::DEFAULT_MAX_ENTRIES,
        }
    }
}

impl ConsoleConfig {
    /// Load defaults, the resolved config file (if any) and environment
    /// overrides, then validate
    pub fn load(explicit: Option<&Path>) -> Result<ConsoleConfig> {
        let mut config = match resolve_config_path(explicit) {
            Some(path) => ConsoleConfig::from_file(&path)?,
            None => {
                debug!("no config file, using defaults");
                ConsoleConfig::default()
            }
        };
        config.apply_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<ConsoleConfig> {
        let content = std::fs::read_to_string(path).map_err(|source| Error::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = toml::from_str(&content).map_err(|source| Error::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        info!(path = %path.display(), "loaded config");
        Ok(config)
    }

    /// Apply `CHATOPS_*` overrides read through `lookup`
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(endpoint) = lookup("CHATOPS_ENDPOINT") {
            self.endpoint = endpoint;
        }
        if let Some(role) = lookup("CHATOPS_ROLE") {
            self.default_role = role;
        }
        if let Some(delay) = lookup("CHATOPS_RECONNECT_DELAY_MS") {
            self.reconnect_delay_ms = delay.trim().parse().map_err(|_| Error::Invalid {
                key: "CHATOPS_RECONNECT_DELAY_MS",
                reason: format!("'{}' is not a whole number of milliseconds", delay),
            })?;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        session::OpenRequest::new(session::ChannelId(0), &self.endpoint, Role::Client).map_err(
            |e| Error::Invalid {
                key: "endpoint",
                reason: e.to_string(),
            },
        )?;
        self.role()?;
        if self.max_transcript_entries == 0 {
            return Err(Error::Invalid {
                key: "max_transcript_entries",
                reason: "must be at least 1".to_string(),
            });
        }
        if self.max_activity_entries == 0 {
            return Err(Error::Invalid {
                key: "max_activity_entries",
                reason: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }

    /// Parsed startup role
    pub fn role(&self) -> Result<Role> {
        self.default_role.parse().map_err(|e: session::InvalidRole| Error::Invalid {
            key: "default_role",
            reason: e.to_string(),
        })
    }

    pub fn reconnect_delay(&self) -> Duration {
        Duration::from_millis(self.reconnect_delay_ms)
    }

    pub fn session_settings(&self) -> SessionSettings {
        SessionSettings {
            endpoint: self.endpoint.clone(),
            reconnect_delay: self.reconnect_delay(),
            max_transcript_entries: self.max_transcript_entries,
            max_activity_entries: self.max_activity_entries,
        }
    }

    /// Directory the log file goes to
    pub fn log_dir(&self) -> PathBuf {
        self.log_dir.clone().unwrap_or_else(std::env::temp_dir)
    }
}

/// Resolve the config file path
///
/// 1. Explicit `--config` path (used even if missing, so the read error surfaces)
/// 2. `$CHATOPS_HOME/config.toml` if it exists
/// 3. None
pub fn resolve_config_path(explicit: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(path.to_path_buf());
    }
    let home = std::env::var_os(HOME_ENV)?;
    let candidate = PathBuf::from(home).join(CONFIG_FILE);
    candidate.exists().then_some(candidate)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_are_valid() {
        let config = ConsoleConfig::default();
        config.validate().unwrap();
        assert_eq!(config.endpoint, "ws://localhost:8000/ws/chatops");
        assert_eq!(config.role().unwrap(), Role::Client);
        assert_eq!(config.reconnect_delay(), Duration::from_secs(1));
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"endpoint = "wss://gateway.internal/ws/chatops"
default_role = "manager""#
        )
        .unwrap();

        let config = ConsoleConfig::from_file(file.path()).unwrap();
        assert_eq!(config.endpoint, "wss://gateway.internal/ws/chatops");
        assert_eq!(config.role().unwrap(), Role::Manager);
        assert_eq!(config.reconnect_delay_ms, 1000);
    }

    #[test]
    fn test_parse_error_names_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "endpoint = ").unwrap();
        let err = ConsoleConfig::from_file(file.path()).unwrap_err();
        assert!(matches!(err, Error::Parse { .. }));
    }

    #[test]
    fn test_env_overrides() {
        let mut config = ConsoleConfig::default();
        config
            .apply_overrides(lookup(&[
                ("CHATOPS_ENDPOINT", "ws://10.0.0.5:8000/ws/chatops"),
                ("CHATOPS_ROLE", "manager"),
                ("CHATOPS_RECONNECT_DELAY_MS", "250"),
            ]))
            .unwrap();
        assert_eq!(config.endpoint, "ws://10.0.0.5:8000/ws/chatops");
        assert_eq!(config.role().unwrap(), Role::Manager);
        assert_eq!(config.reconnect_delay(), Duration::from_millis(250));
    }

    #[test]
    fn test_bad_delay_override_rejected() {
        let mut config = ConsoleConfig::default();
        let err = config
            .apply_overrides(lookup(&[("CHATOPS_RECONNECT_DELAY_MS", "soon")]))
            .unwrap_err();
        assert!(matches!(
            err,
            Error::Invalid {
                key: "CHATOPS_RECONNECT_DELAY_MS",
                ..
            }
        ));
    }

    #[test]
    fn test_validate_rejects_http_endpoint() {
        let config = ConsoleConfig {
            endpoint: "http://localhost:8000/ws/chatops".to_string(),
            ..ConsoleConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(Error::Invalid { key: "endpoint", .. })
        ));
    }

    #[test]
    fn test_explicit_path_wins() {
        let path = Path::new("/definitely/missing/config.toml");
        assert_eq!(resolve_config_path(Some(path)), Some(path.to_path_buf()));
    }
}
