use serde::Serialize;
use thiserror::Error;

/// Errors that can occur while resolving, parsing, or querying captures.
#[derive(Error, Debug)]
pub enum HarlensError {
    /// IO error (file vanished mid-read, permission denied, etc.).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// No matching capture file, or the live session is not active.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Malformed HAR document that structural repair could not fix.
    #[error("Parse error: {0}")]
    Parse(String),

    /// A capture name that resolves outside the configured root.
    #[error("Security error: {0}")]
    Security(String),

    /// Malformed caller input: invalid regex, bad range, unknown fields.
    #[error("Validation error: {0}")]
    Validation(String),

    /// Config file could not be read or parsed.
    #[error("Config error: {0}")]
    Config(String),
}

impl HarlensError {
    /// Stable taxonomy string surfaced in error payloads.
    pub fn kind(&self) -> &'static str {
        match self {
            HarlensError::Io(_) => "io",
            HarlensError::NotFound(_) => "not_found",
            HarlensError::Parse(_) => "parse_error",
            HarlensError::Security(_) => "security_error",
            HarlensError::Validation(_) => "validation_error",
            HarlensError::Config(_) => "config_error",
        }
    }
}

/// Structured, flagged error shape returned to callers instead of a fault.
///
/// Carries only the taxonomy kind and a human-readable message; internal
/// detail such as a backtrace is never exposed.
#[derive(Debug, Serialize)]
pub struct ErrorPayload {
    pub error: bool,
    pub kind: &'static str,
    pub message: String,
}

impl From<&HarlensError> for ErrorPayload {
    fn from(err: &HarlensError) -> Self {
        ErrorPayload {
            error: true,
            kind: err.kind(),
            message: err.to_string(),
        }
    }
}

/// Convenience result type for harlens operations.
pub type Result<T> = std::result::Result<T, HarlensError>;
