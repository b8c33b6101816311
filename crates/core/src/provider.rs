//! Collaborator traits — the external services this core consumes.
//!
//! An `EmbeddingProvider` turns text into vectors (network/model call); a
//! `Summarizer` compacts a message range into one synthetic message. Both
//! are injected into the components that need them, so tests can substitute
//! deterministic stubs and the selector degrades gracefully when no
//! provider is configured.

use async_trait::async_trait;

use crate::error::{EmbeddingError, SummarizeError};
use crate::message::ContextMessage;

/// An embedding provider — maps text to a numeric vector.
///
/// Implementations wrap whatever model endpoint the runtime is configured
/// with. The selector caches results, so providers are only called once per
/// unique message/query text.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// A human-readable name for this provider.
    fn name(&self) -> &str;

    /// Embed a single text with the given model.
    async fn embed(
        &self,
        text: &str,
        model: &str,
    ) -> std::result::Result<Vec<f32>, EmbeddingError>;
}

/// A summarizer — compacts a range of messages into one synthetic message.
///
/// Used by the summary-based pruning strategy. The returned message
/// represents the whole range; its token count must reflect the summary
/// text, not the inputs.
#[async_trait]
pub trait Summarizer: Send + Sync {
    async fn summarize(
        &self,
        messages: &[ContextMessage],
    ) -> std::result::Result<ContextMessage, SummarizeError>;
}
