use std::collections::HashSet;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use punch_types::{TagBinding, DEFAULT_METHOD};
use serde::{Deserialize, Serialize};

use crate::error::{ServerError, ServerResult};

/// Server configuration, usually read from a TOML file.
///
/// ```toml
/// bind_addr = "0.0.0.0:8787"
/// journal_path = "/var/lib/punch/events.journal"
///
/// [[tags]]
/// tag_uid = "A1B2"
/// employee_id = "e1"
/// name = "John Doe"
/// ```
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
    /// Event journal location. Events are kept in memory when unset.
    pub journal_path: Option<PathBuf>,
    /// `fsync` the journal after every append.
    pub sync_every_write: bool,
    /// Frames queued per kiosk connection before it counts as lagging.
    pub subscriber_capacity: usize,
    /// Idle interval between keep-alive comments on the event stream.
    pub keep_alive_secs: u64,
    /// Provenance tag stamped on recorded events.
    pub default_method: String,
    pub cors_allow_any_origin: bool,
    pub tags: Vec<TagBinding>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 8787)),
            journal_path: None,
            sync_every_write: false,
            subscriber_capacity: 64,
            keep_alive_secs: 15,
            default_method: DEFAULT_METHOD.to_string(),
            cors_allow_any_origin: false,
            tags: Vec::new(),
        }
    }
}

impl ServerConfig {
    /// Read and validate a TOML config file.
    pub fn load(path: &Path) -> ServerResult<Self> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| ServerError::Config(format!("{}: {e}", path.display())))?;
        Self::from_toml_str(&text)
    }

    pub fn from_toml_str(text: &str) -> ServerResult<Self> {
        let config: Self =
            toml::from_str(text).map_err(|e| ServerError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> ServerResult<()> {
        if self.subscriber_capacity == 0 {
            return Err(ServerError::Config(
                "subscriber_capacity must be at least 1".into(),
            ));
        }
        if self.keep_alive_secs == 0 {
            return Err(ServerError::Config(
                "keep_alive_secs must be at least 1".into(),
            ));
        }
        if self.default_method.trim().is_empty() {
            return Err(ServerError::Config("default_method must not be empty".into()));
        }

        let mut seen = HashSet::new();
        for binding in &self.tags {
            binding
                .validate()
                .map_err(|e| ServerError::Config(format!("tag {:?}: {e}", binding.tag_uid)))?;
            if !seen.insert(binding.tag_uid.as_str()) {
                return Err(ServerError::Config(format!(
                    "duplicate tag uid {:?}",
                    binding.tag_uid
                )));
            }
        }
        Ok(())
    }

    pub fn keep_alive(&self) -> Duration {
        Duration::from_secs(self.keep_alive_secs)
    }
}
