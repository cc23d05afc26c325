use thiserror::Error;

/// Failure of a single call to the text generation backend.
///
/// Never aborts a running story: the session turns it into a fallback
/// chapter and completes the branch.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GenerationError {
    #[error("Story generator unavailable at {host}")]
    Unavailable { host: String },

    #[error("Model '{model}' not found by the story generator")]
    ModelNotFound { model: String },

    #[error("Inference error: {message}")]
    Inference { message: String },

    #[error("Story generator returned an empty response")]
    EmptyResponse,

    #[error("Story generation timed out after {seconds}s")]
    TimedOut { seconds: u64 },
}

impl GenerationError {
    pub fn is_unavailable(&self) -> bool {
        matches!(self, GenerationError::Unavailable { .. } | GenerationError::TimedOut { .. })
    }
}

/// Top-level application error.
/// All variants carry a human-readable message for display/logging.
#[derive(Debug, Error)]
pub enum AppError {
    // ── Database errors ──────────────────────────────────────────────────────
    #[error("Database query failed: {message}")]
    DatabaseQueryFailed {
        message: String,
        #[source]
        source: sqlx::Error,
    },

    #[error("Story '{id}' not found")]
    StoryNotFound { id: String },

    #[error("Story record is incomplete: {reason}")]
    IncompleteRecord { reason: String },

    // ── Generation errors ────────────────────────────────────────────────────
    #[error(transparent)]
    Generation(#[from] GenerationError),

    // ── Validation errors ────────────────────────────────────────────────────
    #[error("Field '{field_name}' cannot be empty")]
    EmptyField { field_name: String },

    #[error("Field '{field_name}' exceeds max length of {max_length} (actual: {actual_length})")]
    FieldTooLong { field_name: String, max_length: usize, actual_length: usize },

    // ── Session errors ───────────────────────────────────────────────────────
    #[error("Story session '{id}' not found")]
    SessionNotFound { id: String },

    #[error("A chapter is already being written for this story")]
    GenerationPending,

    #[error("The story is already complete")]
    SessionCompleted,

    #[error("Option '{label}' is not available in the current chapter")]
    UnknownOption { label: String },

    #[error("Discarded continuation for decision {decision} that no longer matches the story")]
    StaleContinuation { decision: u8 },

    // ── System errors ────────────────────────────────────────────────────────
    #[error("Missing configuration: {key} must be set")]
    MissingConfig { key: String },

    #[error("Unexpected error: {0}")]
    Unexpected(String),
}

impl AppError {
    pub fn db_query(message: impl Into<String>, source: sqlx::Error) -> Self {
        AppError::DatabaseQueryFailed { message: message.into(), source }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, AppError::StoryNotFound { .. } | AppError::SessionNotFound { .. })
    }

    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            AppError::EmptyField { .. } | AppError::FieldTooLong { .. } | AppError::IncompleteRecord { .. }
        )
    }

    /// Requests that are well formed but clash with the session's current state.
    pub fn is_conflict(&self) -> bool {
        matches!(
            self,
            AppError::GenerationPending
                | AppError::SessionCompleted
                | AppError::UnknownOption { .. }
                | AppError::StaleContinuation { .. }
        )
    }

    pub fn is_agent_unavailable(&self) -> bool {
        matches!(self, AppError::Generation(e) if e.is_unavailable())
    }

    pub fn is_generation(&self) -> bool {
        matches!(self, AppError::Generation(_))
    }
}
