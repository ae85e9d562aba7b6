//! Polling configuration.

use crate::error::{BmsError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PollConfig {
    /// How long to wait for a response frame, unless the decoder sets its own
    pub request_timeout_ms: u64,
    /// Largest frame the assembler buffers before giving up on it
    pub max_frame_len: usize,
    /// How long to scan for advertisements
    pub scan_timeout_ms: u64,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self { request_timeout_ms: 10_000, max_frame_len: 4096, scan_timeout_ms: 30_000 }
    }
}

impl PollConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path).map_err(|err| {
            BmsError::InvalidConfig(format!("cannot read {}: {err}", path.display()))
        })?;
        Self::from_json_str(&json)
    }

    pub fn validate(&self) -> Result<()> {
        if self.request_timeout_ms == 0 {
            return Err(BmsError::InvalidConfig("request_timeout_ms must be positive".into()));
        }
        if self.max_frame_len == 0 {
            return Err(BmsError::InvalidConfig("max_frame_len must be positive".into()));
        }
        if self.scan_timeout_ms == 0 {
            return Err(BmsError::InvalidConfig("scan_timeout_ms must be positive".into()));
        }
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub fn scan_timeout(&self) -> Duration {
        Duration::from_millis(self.scan_timeout_ms)
    }
}
