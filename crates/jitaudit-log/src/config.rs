//! Audit log configuration

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// File name used when no path is configured
pub const DEFAULT_LOG_PATH: &str = "audit.log";

/// Configuration for a file-backed audit log
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuditLogConfig {
    /// Log file, truncated when the session first opens it
    pub path: PathBuf,
    /// Whether to sync each record to disk after writing it
    pub sync_on_write: bool,
    /// Whether to create missing parent directories on open
    pub create_dirs: bool,
}

impl Default for AuditLogConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from(DEFAULT_LOG_PATH),
            sync_on_write: false,
            create_dirs: true,
        }
    }
}

impl AuditLogConfig {
    /// Create a config writing to `path`
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            ..Default::default()
        }
    }

    /// Set the log path
    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = path.into();
        self
    }

    /// Sync every record to disk
    pub fn with_sync_on_write(mut self, sync: bool) -> Self {
        self.sync_on_write = sync;
        self
    }

    /// Create missing parent directories on open
    pub fn with_create_dirs(mut self, create: bool) -> Self {
        self.create_dirs = create;
        self
    }
}
