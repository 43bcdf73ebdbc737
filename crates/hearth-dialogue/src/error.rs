//! Error types for the dialogue engine.

use hearth_core::error::HearthError;

/// Errors surfaced to callers of the dialogue engine.
///
/// All validation variants are raised before any session is touched.
#[derive(Debug, thiserror::Error)]
pub enum DialogueError {
    #[error("unknown domain: {0}")]
    UnknownDomain(String),
    #[error("invalid session id: {0}")]
    InvalidSessionId(String),
    #[error("message exceeds maximum length of {0} characters")]
    MessageTooLong(usize),
    #[error("session {session_id} belongs to domain {expected}, not {requested}")]
    DomainMismatch {
        session_id: String,
        expected: String,
        requested: String,
    },
    #[error("invalid schema: {0}")]
    InvalidSchema(String),
    #[error("storage error: {0}")]
    Storage(String),
    #[error("generation task failed: {0}")]
    TaskFailed(String),
}

impl From<HearthError> for DialogueError {
    fn from(err: HearthError) -> Self {
        DialogueError::Storage(err.to_string())
    }
}

/// Errors from a single generation attempt.
///
/// Every variant is retryable; the orchestrator turns the last one into a
/// failure outcome once attempts run out.
#[derive(Debug, Clone, thiserror::Error)]
pub enum GenerationError {
    #[error("transport error: {0}")]
    Transport(String),
    #[error("service returned status {status}: {body}")]
    Status { status: u16, body: String },
    #[error("generation timed out after {0} seconds")]
    Timeout(u64),
    #[error("no structured artifact found in output")]
    Unparseable { raw: String },
    #[error("service not configured: {0}")]
    NotConfigured(String),
}

impl GenerationError {
    /// Raw service output worth keeping as a diagnostic.
    pub fn diagnostic(&self) -> Option<String> {
        match self {
            GenerationError::Unparseable { raw } => Some(raw.clone()),
            GenerationError::Status { body, .. } => Some(body.clone()),
            _ => None,
        }
    }
}
