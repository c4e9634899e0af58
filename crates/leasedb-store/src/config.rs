//! Store configuration

use crate::errors::{config_error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// How the SQLite engine is opened
///
/// ```toml
/// path = "/var/lib/leasedb/meta.db"
/// busy_timeout_ms = 5000
/// wal = true
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StoreConfig {
    /// Database file; `None` opens a private in-memory database
    pub path: Option<PathBuf>,
    /// How long a writer waits for the write lock before failing
    pub busy_timeout_ms: u64,
    /// Write-ahead logging, which gives readers a stable snapshot while a
    /// writer is active (ignored for in-memory databases)
    pub wal: bool,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: None,
            busy_timeout_ms: 5000,
            wal: true,
        }
    }
}

impl StoreConfig {
    /// Defaults, stored at `path`
    pub fn at(path: impl AsRef<Path>) -> Self {
        Self {
            path: Some(path.as_ref().to_path_buf()),
            ..Self::default()
        }
    }

    /// Parse a TOML document; missing keys keep their defaults
    ///
    /// # Errors
    ///
    /// `InvalidArgument` for malformed TOML or unknown keys.
    pub fn from_toml_str(s: &str) -> Result<Self> {
        toml::from_str(s).map_err(config_error)
    }

    pub fn busy_timeout(&self) -> Duration {
        Duration::from_millis(self.busy_timeout_ms)
    }
}
