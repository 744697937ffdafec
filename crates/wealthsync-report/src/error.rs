use std::time::Duration;

use thiserror::Error;
use wealthsync_core::ConfigError;

use crate::ReportKind;

#[derive(Debug, Error)]
pub enum ReportError {
    /// The provider answered with a non-2xx status.
    #[error("AI provider unavailable (HTTP {status})")]
    ProviderUnavailable { status: u16, body: String },

    /// The request never got an HTTP answer.
    #[error("Could not reach AI provider: {0}")]
    Transport(String),

    /// Any other provider-side failure (bad backend name, unexpected payload).
    #[error("AI provider error: {0}")]
    Provider(String),

    #[error("AI provider did not answer within {0:?}")]
    Timeout(Duration),

    #[error("Report generation was cancelled")]
    Cancelled,

    #[error("AI provider returned no text")]
    EmptyCompletion,

    /// The completion did not contain usable JSON, or the JSON does not fit the report schema.
    #[error("Malformed report: {reason}")]
    MalformedReport { reason: String, raw: String },

    /// The JSON parsed but required top-level keys are absent.
    #[error("Incomplete {kind} report: missing {}", .missing.join(", "))]
    IncompleteReport {
        kind: ReportKind,
        missing: Vec<&'static str>,
        raw: String,
    },

    #[error("Nothing to summarize")]
    EmptyInput,

    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl ReportError {
    /// Failures worth another attempt: throttling, server errors, network and timeouts.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::ProviderUnavailable { status, .. } => *status == 429 || *status >= 500,
            Self::Transport(_) | Self::Timeout(_) => true,
            _ => false,
        }
    }

    /// The provider text that failed validation, for diagnostics.
    pub fn raw_text(&self) -> Option<&str> {
        match self {
            Self::MalformedReport { raw, .. } | Self::IncompleteReport { raw, .. } => Some(raw),
            _ => None,
        }
    }
}
