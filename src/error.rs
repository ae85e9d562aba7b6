//! Error types shared by the matcher, the frame engine and the decoders.
//!
//! Every failure a poll cycle can run into surfaces as a [`BmsError`]; none of
//! them are fatal to the process. Use [`BmsError::is_recoverable`] to decide
//! whether a later poll may succeed.

use std::time::Duration;
use thiserror::Error;

/// Result type alias for BMS operations.
pub type Result<T, E = BmsError> = std::result::Result<T, E>;

#[derive(Error, Debug)]
#[non_exhaustive]
pub enum BmsError {
    /// Two or more decoders accepted the same advertisement. This is a defect
    /// in the registry, not something a device can cause.
    #[error("advertisement '{device}' matches several decoders: {}", decoders.join(", "))]
    AmbiguousMatch { device: String, decoders: Vec<&'static str> },

    #[error("decoder '{name}' is already registered")]
    DuplicateDecoder { name: &'static str },

    /// A command was issued while another one still waits for its response.
    #[error("a request is already in flight on this connection")]
    RequestInFlight,

    #[error("no response within {duration:?}")]
    Timeout { duration: Duration },

    #[error("connection dropped while a request was pending")]
    Disconnected,

    #[error("malformed frame: {reason}")]
    MalformedFrame { reason: String },

    #[error("frame exceeded the {limit} byte ceiling")]
    FrameTooLarge { limit: usize },

    #[error("transport error: {context}")]
    Transport {
        context: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl BmsError {
    pub fn malformed(reason: impl Into<String>) -> Self {
        Self::MalformedFrame { reason: reason.into() }
    }

    pub fn transport(context: impl Into<String>) -> Self {
        Self::Transport { context: context.into(), source: None }
    }

    /// Whether a later poll cycle may succeed without changing code or
    /// configuration.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::Timeout { .. }
                | Self::Disconnected
                | Self::MalformedFrame { .. }
                | Self::FrameTooLarge { .. }
                | Self::Transport { .. }
        )
    }
}

impl From<bluest::Error> for BmsError {
    fn from(err: bluest::Error) -> Self {
        Self::Transport { context: "bluetooth".to_string(), source: Some(Box::new(err)) }
    }
}

impl From<serde_json::Error> for BmsError {
    fn from(err: serde_json::Error) -> Self {
        Self::InvalidConfig(err.to_string())
    }
}
