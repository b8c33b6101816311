//! Relevance selection for Contexture.
//!
//! Given a free-text query and a conversation transcript, the
//! `ContextSelector` ranks messages by a weighted combination of semantic,
//! keyword, and temporal signals and returns the best excerpts within a
//! token budget. Expensive embedding lookups are cached per selector
//! instance.
//!
//! Selection is independent of pruning: both consume the same message
//! store and never call each other.

pub mod cache;
pub mod selector;
pub mod similarity;

pub use cache::EmbeddingCache;
pub use selector::{
    ContextSearchResult, ContextSelector, MessageScore, SelectorConfig, SelectorWeights,
};
pub use similarity::{cosine_similarity, jaccard_similarity, keyword_tokens};
