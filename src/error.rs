use crate::transport::TransportError;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Structured error context for better error handling and debugging.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ErrorContext {
    /// Option name or field that caused the error (e.g., "timeout", "rate_limit.requests")
    pub field_path: Option<String>,
    /// Additional context about the error (e.g., expected type, actual value)
    pub details: Option<String>,
    /// Source of the error (e.g., "batcher", "engine_options")
    pub source: Option<String>,
}

impl ErrorContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_field_path(mut self, path: impl Into<String>) -> Self {
        self.field_path = Some(path.into());
        self
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }
}

/// Status attached to a [`TranslationFailure`].
///
/// Providers report either a numeric code or a short textual status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FailureStatus {
    Code(u16),
    Text(String),
}

impl fmt::Display for FailureStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureStatus::Code(c) => write!(f, "{}", c),
            FailureStatus::Text(t) => f.write_str(t),
        }
    }
}

impl From<u16> for FailureStatus {
    fn from(code: u16) -> Self {
        FailureStatus::Code(code)
    }
}

impl From<&str> for FailureStatus {
    fn from(text: &str) -> Self {
        FailureStatus::Text(text.to_string())
    }
}

/// A failed translation request, as handed to the host's error callback.
///
/// `status` present means the provider (or the timeout guard) reported the
/// failure and the message is authoritative. `status` absent marks an
/// unexpected failure whose `detail` gets logged before surfacing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranslationFailure {
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<FailureStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

pub const TIMEOUT_MESSAGE: &str = "Request timed out!";

impl TranslationFailure {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            status: None,
            detail: None,
        }
    }

    pub fn with_status(mut self, status: impl Into<FailureStatus>) -> Self {
        self.status = Some(status.into());
        self
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    /// The synthetic failure produced when a request outlives its timeout.
    pub fn timed_out() -> Self {
        Self::new(TIMEOUT_MESSAGE).with_status(200u16)
    }

    /// Expected failures carry a status; their message is passed through as-is.
    ///
    /// A `0` code or an empty text status counts as no status.
    pub fn is_expected(&self) -> bool {
        match &self.status {
            Some(FailureStatus::Code(code)) => *code != 0,
            Some(FailureStatus::Text(text)) => !text.is_empty(),
            None => false,
        }
    }

    pub fn is_timeout(&self) -> bool {
        self.status == Some(FailureStatus::Code(200)) && self.message == TIMEOUT_MESSAGE
    }
}

impl fmt::Display for TranslationFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.status {
            Some(status) => write!(f, "{} (status {})", self.message, status),
            None => f.write_str(&self.message),
        }
    }
}

impl std::error::Error for TranslationFailure {}

/// Unified error type for the engine runtime.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Configuration error: {message}{}", format_context(.context))]
    Configuration {
        message: String,
        context: ErrorContext,
    },

    #[error("Validation error: {message}{}", format_context(.context))]
    Validation {
        message: String,
        context: ErrorContext,
    },

    #[error("Translation failed: {0}")]
    Failure(#[from] TranslationFailure),

    #[error("Network transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

fn format_context(ctx: &ErrorContext) -> String {
    let mut parts = Vec::new();
    if let Some(ref field) = ctx.field_path {
        parts.push(format!("field: {}", field));
    }
    if let Some(ref details) = ctx.details {
        parts.push(format!("details: {}", details));
    }
    if let Some(ref source) = ctx.source {
        parts.push(format!("source: {}", source));
    }
    if parts.is_empty() {
        String::new()
    } else {
        format!(" ({})", parts.join(", "))
    }
}

impl Error {
    pub fn configuration(msg: impl Into<String>) -> Self {
        Error::Configuration {
            message: msg.into(),
            context: ErrorContext::new(),
        }
    }

    pub fn configuration_with_context(msg: impl Into<String>, context: ErrorContext) -> Self {
        Error::Configuration {
            message: msg.into(),
            context,
        }
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Error::Validation {
            message: msg.into(),
            context: ErrorContext::new(),
        }
    }

    pub fn validation_with_context(msg: impl Into<String>, context: ErrorContext) -> Self {
        Error::Validation {
            message: msg.into(),
            context,
        }
    }

    /// Extract error context if available
    pub fn context(&self) -> Option<&ErrorContext> {
        match self {
            Error::Configuration { context, .. } | Error::Validation { context, .. } => {
                Some(context)
            }
            _ => None,
        }
    }

    /// Collapse any error into the value the host's `onError` callback receives.
    ///
    /// Only [`Error::Failure`] keeps its status; everything else is unexpected
    /// and carries its full rendering as `detail`.
    pub fn into_failure(self) -> TranslationFailure {
        match self {
            Error::Failure(failure) => failure,
            other => {
                let detail = format!("{:?}", other);
                TranslationFailure::new(other.to_string()).with_detail(detail)
            }
        }
    }
}
