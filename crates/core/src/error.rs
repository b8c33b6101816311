//! Error types for the Contexture domain.
//!
//! Uses `thiserror` for ergonomic error definitions.
//! Structural problems (bad configuration, infeasible budgets, unknown
//! strategies) surface as hard failures; transient collaborator failures
//! are absorbed at the call site and never reach the caller.

use thiserror::Error;

/// The top-level error type for all Contexture operations.
#[derive(Debug, Error)]
pub enum Error {
    /// Invalid configuration — refused at construction time.
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// System messages alone exceed the token budget; no pruning can
    /// satisfy it.
    #[error(
        "Budget infeasible: system messages require {system_tokens} tokens but the budget is {max_tokens}"
    )]
    BudgetInfeasible {
        system_tokens: usize,
        max_tokens: usize,
    },

    /// A caller passed an unusable budget.
    #[error("Invalid budget: {message}")]
    InvalidBudget { message: String },

    /// The requested pruning strategy is not registered.
    #[error("Unknown strategy '{requested}'; available: {available}")]
    UnknownStrategy {
        requested: String,
        available: String,
    },

    // --- Collaborator errors ---
    #[error("Embedding error: {0}")]
    Embedding(#[from] EmbeddingError),

    #[error("Summarization error: {0}")]
    Summarize(#[from] SummarizeError),

    // --- Serialization ---
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl Error {
    /// Shorthand for a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Shorthand for an invalid-budget error.
    pub fn invalid_budget(message: impl Into<String>) -> Self {
        Self::InvalidBudget {
            message: message.into(),
        }
    }
}

/// Result type alias using our Error.
pub type Result<T> = std::result::Result<T, Error>;

// --- Bounded context errors ---

/// Errors from an embedding provider.
#[derive(Debug, Clone, Error)]
pub enum EmbeddingError {
    #[error("Embedding request failed: {0}")]
    RequestFailed(String),

    #[error("Embedding provider not configured: {0}")]
    NotConfigured(String),

    #[error("Embedding model not found: {0}")]
    ModelNotFound(String),
}

/// Errors from a summarizer collaborator.
#[derive(Debug, Clone, Error)]
pub enum SummarizeError {
    #[error("Summarization failed: {0}")]
    Failed(String),

    #[error("Summarizer not configured: {0}")]
    NotConfigured(String),
}
