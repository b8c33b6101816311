//! The `ContextSelector` — relevance ranking over a conversation transcript.
//!
//! Distinct from pruning: given a free-text query and the full message
//! list, return up to `max_results` messages whose combined score exceeds
//! `min_score`, ordered by score descending, then token-limited.
//!
//! The combined score is a weighted sum of three components:
//! - **semantic**: cosine similarity of query and message embeddings,
//!   fetched from the injected provider and cached
//! - **keyword**: Jaccard similarity of keyword token sets
//! - **temporal**: exponential decay of message age in hours
//!
//! When embeddings are disabled or no provider is configured, the semantic
//! component is omitted and the remaining weights are renormalized over the
//! components actually computed. A transient provider failure for one
//! message degrades that message's semantic score to zero without failing
//! the call.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::sync::Arc;
use tracing::{debug, warn};

use contexture_core::{ContextMessage, EmbeddingProvider, Error, Result};

use crate::cache::EmbeddingCache;
use crate::similarity::{cosine_similarity, jaccard_similarity, keyword_tokens};

const WEIGHT_TOLERANCE: f32 = 1e-3;

/// Component weights for the combined relevance score.
///
/// Must each lie in [0, 1] and sum to 1.0 (± tolerance).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SelectorWeights {
    pub semantic: f32,
    pub keyword: f32,
    pub temporal: f32,
}

impl Default for SelectorWeights {
    fn default() -> Self {
        Self {
            semantic: 0.5,
            keyword: 0.3,
            temporal: 0.2,
        }
    }
}

impl SelectorWeights {
    /// Check range and sum constraints.
    pub fn validate(&self) -> Result<()> {
        for (name, w) in [
            ("semantic", self.semantic),
            ("keyword", self.keyword),
            ("temporal", self.temporal),
        ] {
            if !(0.0..=1.0).contains(&w) {
                return Err(Error::config(format!(
                    "selector weight '{name}' must be in [0, 1], got {w}"
                )));
            }
        }
        let sum = self.semantic + self.keyword + self.temporal;
        if (sum - 1.0).abs() > WEIGHT_TOLERANCE {
            return Err(Error::config(format!(
                "selector weights must sum to 1.0, got {sum}"
            )));
        }
        Ok(())
    }
}

/// Configuration for a `ContextSelector`. Validated at construction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SelectorConfig {
    /// Component weights.
    #[serde(default)]
    pub weights: SelectorWeights,

    /// Maximum number of results to return.
    #[serde(default = "default_max_results")]
    pub max_results: usize,

    /// Minimum combined score a message must exceed to be selected.
    #[serde(default = "default_min_score")]
    pub min_score: f32,

    /// Recency decay factor in [0, 1]; higher = slower decay.
    #[serde(default = "default_recency_decay")]
    pub recency_decay_factor: f32,

    /// Which embedding model to request from the provider.
    #[serde(default = "default_embedding_model")]
    pub embedding_model: String,

    /// Master switch for the semantic component.
    #[serde(default = "default_true")]
    pub use_embeddings: bool,
}

fn default_max_results() -> usize {
    10
}
fn default_min_score() -> f32 {
    0.1
}
fn default_recency_decay() -> f32 {
    0.95
}
fn default_embedding_model() -> String {
    "text-embedding-3-small".into()
}
fn default_true() -> bool {
    true
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            weights: SelectorWeights::default(),
            max_results: default_max_results(),
            min_score: default_min_score(),
            recency_decay_factor: default_recency_decay(),
            embedding_model: default_embedding_model(),
            use_embeddings: default_true(),
        }
    }
}

impl SelectorConfig {
    /// Check every constraint; called by the selector constructors.
    pub fn validate(&self) -> Result<()> {
        self.weights.validate()?;
        if self.max_results == 0 {
            return Err(Error::config("max_results must be at least 1"));
        }
        if !(0.0..=1.0).contains(&self.min_score) {
            return Err(Error::config(format!(
                "min_score must be in [0, 1], got {}",
                self.min_score
            )));
        }
        if !(0.0..=1.0).contains(&self.recency_decay_factor) {
            return Err(Error::config(format!(
                "recency_decay_factor must be in [0, 1], got {}",
                self.recency_decay_factor
            )));
        }
        if self.use_embeddings && self.embedding_model.is_empty() {
            return Err(Error::config(
                "embedding_model must be set when use_embeddings is enabled",
            ));
        }
        Ok(())
    }
}

/// One selected message with its score and a human-readable reason.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContextSearchResult {
    pub message: ContextMessage,

    /// Combined relevance score in [0, 1].
    pub score: f32,

    /// Why this message scored as it did (debugging/auditability).
    pub reason: String,
}

/// Per-message score breakdown. `semantic` is `None` when the component
/// was not computed (embeddings disabled or no provider).
#[derive(Debug, Clone, Copy)]
pub struct MessageScore {
    /// Index into the scored message slice.
    pub index: usize,
    pub combined: f32,
    pub semantic: Option<f32>,
    pub keyword: f32,
    pub temporal: f32,
}

/// Relevance-ranking selector with an owned embedding cache.
pub struct ContextSelector {
    config: SelectorConfig,
    provider: Option<Arc<dyn EmbeddingProvider>>,
    cache: EmbeddingCache,
}

impl ContextSelector {
    /// Create a selector without an embedding provider; semantic scoring is
    /// omitted and the remaining weights renormalized.
    pub fn new(config: SelectorConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            provider: None,
            cache: EmbeddingCache::new(),
        })
    }

    /// Create a selector backed by an embedding provider.
    pub fn with_provider(
        config: SelectorConfig,
        provider: Arc<dyn EmbeddingProvider>,
    ) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            provider: Some(provider),
            cache: EmbeddingCache::new(),
        })
    }

    pub fn config(&self) -> &SelectorConfig {
        &self.config
    }

    /// Replace the component weights; re-validates before applying.
    pub fn set_weights(&mut self, weights: SelectorWeights) -> Result<()> {
        weights.validate()?;
        self.config.weights = weights;
        Ok(())
    }

    /// Drop every cached embedding.
    pub async fn clear_cache(&self) {
        self.cache.clear().await;
    }

    /// (message, query) cache entry counts, for diagnostics.
    pub async fn cache_counts(&self) -> (usize, usize) {
        (
            self.cache.message_count().await,
            self.cache.query_count().await,
        )
    }

    /// Rank messages against `query` and return the best within budget.
    ///
    /// An empty or whitespace query bypasses scoring entirely and returns
    /// the most recent messages within the token budget.
    pub async fn select_relevant(
        &self,
        messages: &[ContextMessage],
        query: &str,
        max_tokens: usize,
    ) -> Result<Vec<ContextSearchResult>> {
        if max_tokens == 0 {
            return Err(Error::invalid_budget("max_tokens must be greater than zero"));
        }
        if messages.is_empty() {
            return Ok(Vec::new());
        }

        let trimmed = query.trim();
        if trimmed.is_empty() {
            return Ok(self.select_by_recency(messages, max_tokens));
        }

        let scored = self.score_messages(messages, trimmed).await;

        let mut ranked: Vec<&MessageScore> = scored
            .iter()
            .filter(|s| s.combined > self.config.min_score)
            .collect();
        ranked.sort_by(|a, b| b.combined.partial_cmp(&a.combined).unwrap_or(Ordering::Equal));
        ranked.truncate(self.config.max_results);

        // Greedy over the score-sorted list: stop at the first message
        // that would overflow; do not skip ahead to smaller ones.
        let mut results = Vec::new();
        let mut used_tokens = 0usize;
        for s in ranked {
            let message = &messages[s.index];
            if used_tokens + message.tokens > max_tokens {
                break;
            }
            used_tokens += message.tokens;
            results.push(ContextSearchResult {
                message: message.clone(),
                score: s.combined,
                reason: describe(s),
            });
        }

        debug!(
            query = %trimmed,
            candidates = messages.len(),
            selected = results.len(),
            used_tokens,
            "Relevance selection complete"
        );
        Ok(results)
    }

    /// Score every message against `query` without filtering or budget
    /// enforcement. Used by the semantic pruning strategy, which applies
    /// its own top-K cutoff.
    pub async fn score_messages(
        &self,
        messages: &[ContextMessage],
        query: &str,
    ) -> Vec<MessageScore> {
        let weights = self.config.weights;
        let provider = if self.config.use_embeddings {
            self.provider.as_ref()
        } else {
            None
        };

        let query_embedding = match provider {
            Some(p) if weights.semantic > 0.0 => self.query_embedding(query, p.as_ref()).await,
            _ => None,
        };
        let message_embeddings = match (&query_embedding, provider) {
            (Some(_), Some(p)) => Some(self.message_embeddings(messages, p.as_ref()).await),
            _ => None,
        };
        let semantic_active = query_embedding.is_some();

        // Renormalize over the components actually computed, so a
        // selector without embeddings still produces scores in [0, 1].
        let (semantic_w, keyword_w, temporal_w) = if semantic_active {
            (weights.semantic, weights.keyword, weights.temporal)
        } else {
            let active = weights.keyword + weights.temporal;
            if active <= f32::EPSILON {
                (0.0, 0.0, 0.0)
            } else {
                (0.0, weights.keyword / active, weights.temporal / active)
            }
        };

        let query_set = keyword_tokens(query);
        let now = Utc::now();

        messages
            .iter()
            .enumerate()
            .map(|(index, message)| {
                let keyword =
                    jaccard_similarity(&query_set, &keyword_tokens(&message.content.as_text()));
                let temporal =
                    temporal_score(now, message.timestamp, self.config.recency_decay_factor);
                let semantic = if semantic_active {
                    let computed = query_embedding.as_ref().zip(
                        message_embeddings
                            .as_ref()
                            .and_then(|all| all[index].as_ref()),
                    );
                    // A failed per-message embedding contributes zero at
                    // full weight rather than renormalizing.
                    Some(match computed {
                        Some((q, m)) => cosine_similarity(q, m).max(0.0),
                        None => 0.0,
                    })
                } else {
                    None
                };

                let combined = (semantic.unwrap_or(0.0) * semantic_w
                    + keyword * keyword_w
                    + temporal * temporal_w)
                    .clamp(0.0, 1.0);

                MessageScore {
                    index,
                    combined,
                    semantic,
                    keyword,
                    temporal,
                }
            })
            .collect()
    }

    /// No-query fallback: most recent messages within the token budget.
    fn select_by_recency(
        &self,
        messages: &[ContextMessage],
        max_tokens: usize,
    ) -> Vec<ContextSearchResult> {
        let now = Utc::now();
        let mut ordered: Vec<&ContextMessage> = messages.iter().collect();
        ordered.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));

        let mut results = Vec::new();
        let mut used_tokens = 0usize;
        for message in ordered.into_iter().take(self.config.max_results) {
            if used_tokens + message.tokens > max_tokens {
                break;
            }
            used_tokens += message.tokens;
            results.push(ContextSearchResult {
                message: message.clone(),
                score: temporal_score(now, message.timestamp, self.config.recency_decay_factor),
                reason: "Selected by recency".into(),
            });
        }
        results
    }

    async fn query_embedding(
        &self,
        query: &str,
        provider: &dyn EmbeddingProvider,
    ) -> Option<Vec<f32>> {
        if let Some(embedding) = self.cache.query(query).await {
            return Some(embedding);
        }
        match provider.embed(query, &self.config.embedding_model).await {
            Ok(embedding) => {
                self.cache.insert_query(query, embedding.clone()).await;
                Some(embedding)
            }
            Err(e) => {
                warn!(error = %e, "Query embedding failed; semantic component omitted");
                None
            }
        }
    }

    /// Fetch embeddings for a message batch, cache-first, missing entries
    /// fetched concurrently. `None` entries mark transient failures.
    async fn message_embeddings(
        &self,
        messages: &[ContextMessage],
        provider: &dyn EmbeddingProvider,
    ) -> Vec<Option<Vec<f32>>> {
        let mut embeddings: Vec<Option<Vec<f32>>> = Vec::with_capacity(messages.len());
        let mut missing: Vec<usize> = Vec::new();
        for (i, message) in messages.iter().enumerate() {
            match self.cache.message(&message.id).await {
                Some(embedding) => embeddings.push(Some(embedding)),
                None => {
                    embeddings.push(None);
                    missing.push(i);
                }
            }
        }

        let model = &self.config.embedding_model;
        let fetches = missing.iter().map(|&i| {
            let text = messages[i].content.as_text();
            async move { (i, provider.embed(&text, model).await) }
        });
        for (i, outcome) in futures::future::join_all(fetches).await {
            match outcome {
                Ok(embedding) => {
                    self.cache
                        .insert_message(&messages[i].id, embedding.clone())
                        .await;
                    embeddings[i] = Some(embedding);
                }
                Err(e) => {
                    warn!(
                        message_id = %messages[i].id,
                        error = %e,
                        "Message embedding failed; semantic score degraded to zero"
                    );
                }
            }
        }
        embeddings
    }
}

/// Exponential decay of message age in hours:
/// `exp(-age_hours × (1 − recency_decay_factor))`.
fn temporal_score(now: DateTime<Utc>, timestamp: DateTime<Utc>, decay_factor: f32) -> f32 {
    let age_hours = (now - timestamp).num_seconds().max(0) as f64 / 3600.0;
    (-age_hours * (1.0 - decay_factor as f64)).exp() as f32
}

/// Qualitative reason buckets per component, joined with commas.
fn describe(score: &MessageScore) -> String {
    let mut parts: Vec<&str> = Vec::new();
    if let Some(semantic) = score.semantic {
        if semantic > 0.7 {
            parts.push("high semantic relevance");
        } else if semantic > 0.4 {
            parts.push("semantic relevance");
        }
    }
    if score.keyword > 0.5 {
        parts.push("keyword match");
    } else if score.keyword > 0.3 {
        parts.push("partial keyword match");
    }
    if score.temporal > 0.8 {
        parts.push("very recent");
    } else if score.temporal > 0.5 {
        parts.push("recent");
    }

    if parts.is_empty() {
        "Relevant to query".to_string()
    } else {
        parts.join(", ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::Duration;
    use contexture_core::EmbeddingError;
    use std::sync::atomic::{AtomicUsize, Ordering as AtomicOrdering};

    /// Deterministic provider: embeds by byte histogram, counts calls,
    /// optionally fails on a marker substring.
    struct StaticEmbedder {
        calls: AtomicUsize,
        fail_substring: Option<String>,
    }

    impl StaticEmbedder {
        fn new() -> Self {
            Self {
                calls: AtomicUsize::new(0),
                fail_substring: None,
            }
        }

        fn failing_on(marker: &str) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                fail_substring: Some(marker.to_string()),
            }
        }

        fn call_count(&self) -> usize {
            self.calls.load(AtomicOrdering::SeqCst)
        }
    }

    #[async_trait]
    impl EmbeddingProvider for StaticEmbedder {
        fn name(&self) -> &str {
            "static"
        }

        async fn embed(
            &self,
            text: &str,
            _model: &str,
        ) -> std::result::Result<Vec<f32>, EmbeddingError> {
            self.calls.fetch_add(1, AtomicOrdering::SeqCst);
            if let Some(marker) = &self.fail_substring {
                if text.contains(marker) {
                    return Err(EmbeddingError::RequestFailed("stub failure".into()));
                }
            }
            let mut v = vec![0.0f32; 8];
            for (i, b) in text.bytes().enumerate() {
                v[i % 8] += b as f32;
            }
            Ok(v)
        }
    }

    fn msg(content: &str, tokens: usize, age_minutes: i64) -> ContextMessage {
        ContextMessage::user(content, tokens)
            .with_timestamp(Utc::now() - Duration::minutes(age_minutes))
    }

    fn keyword_temporal_config() -> SelectorConfig {
        SelectorConfig {
            weights: SelectorWeights {
                semantic: 0.0,
                keyword: 0.5,
                temporal: 0.5,
            },
            ..SelectorConfig::default()
        }
    }

    #[test]
    fn weights_must_sum_to_one() {
        let config = SelectorConfig {
            weights: SelectorWeights {
                semantic: 0.5,
                keyword: 0.3,
                temporal: 0.3,
            },
            ..SelectorConfig::default()
        };
        assert!(ContextSelector::new(config).is_err());
    }

    #[test]
    fn weights_must_be_in_range() {
        let config = SelectorConfig {
            weights: SelectorWeights {
                semantic: 1.2,
                keyword: -0.2,
                temporal: 0.0,
            },
            ..SelectorConfig::default()
        };
        assert!(ContextSelector::new(config).is_err());
    }

    #[test]
    fn config_rejects_zero_max_results() {
        let config = SelectorConfig {
            max_results: 0,
            ..SelectorConfig::default()
        };
        assert!(ContextSelector::new(config).is_err());
    }

    #[test]
    fn config_rejects_out_of_range_decay() {
        let config = SelectorConfig {
            recency_decay_factor: 1.5,
            ..SelectorConfig::default()
        };
        assert!(ContextSelector::new(config).is_err());
    }

    #[test]
    fn set_weights_revalidates() {
        let mut selector = ContextSelector::new(keyword_temporal_config()).unwrap();
        let bad = SelectorWeights {
            semantic: 0.9,
            keyword: 0.9,
            temporal: 0.9,
        };
        assert!(selector.set_weights(bad).is_err());
        // Config untouched after the rejected update
        assert_eq!(selector.config().weights.keyword, 0.5);
    }

    #[tokio::test]
    async fn keyword_match_ranks_first_without_embeddings() {
        let selector = ContextSelector::new(keyword_temporal_config()).unwrap();
        let messages = vec![
            msg("We will deploy the service tomorrow morning", 10, 5),
            msg("Completely unrelated chatter about lunch plans", 10, 60_000),
        ];

        let results = selector
            .select_relevant(&messages, "deploy service", 1000)
            .await
            .unwrap();

        assert!(!results.is_empty());
        assert!(results[0].message.content.as_text().contains("deploy"));
    }

    #[tokio::test]
    async fn empty_query_returns_recency_without_provider_calls() {
        let embedder = Arc::new(StaticEmbedder::new());
        let selector =
            ContextSelector::with_provider(SelectorConfig::default(), embedder.clone()).unwrap();
        let messages = vec![
            msg("oldest message", 10, 300),
            msg("middle message", 10, 150),
            msg("newest message", 10, 1),
        ];

        let results = selector.select_relevant(&messages, "   ", 1000).await.unwrap();

        assert_eq!(embedder.call_count(), 0);
        assert_eq!(results.len(), 3);
        assert!(results[0].message.content.as_text().contains("newest"));
        assert!(results[2].message.content.as_text().contains("oldest"));
        assert!(results.iter().all(|r| r.reason == "Selected by recency"));
    }

    #[tokio::test]
    async fn embeddings_cached_across_calls() {
        let embedder = Arc::new(StaticEmbedder::new());
        let selector =
            ContextSelector::with_provider(SelectorConfig::default(), embedder.clone()).unwrap();
        let messages = vec![msg("first topic", 10, 5), msg("second topic", 10, 3)];

        selector
            .select_relevant(&messages, "topic query", 1000)
            .await
            .unwrap();
        let after_first = embedder.call_count();
        assert_eq!(after_first, 3); // query + 2 messages

        selector
            .select_relevant(&messages, "topic query", 1000)
            .await
            .unwrap();
        assert_eq!(embedder.call_count(), after_first);

        let (message_entries, query_entries) = selector.cache_counts().await;
        assert_eq!(message_entries, 2);
        assert_eq!(query_entries, 1);
    }

    #[tokio::test]
    async fn clear_cache_forces_refetch() {
        let embedder = Arc::new(StaticEmbedder::new());
        let selector =
            ContextSelector::with_provider(SelectorConfig::default(), embedder.clone()).unwrap();
        let messages = vec![msg("a topic", 10, 5)];

        selector.select_relevant(&messages, "topic", 1000).await.unwrap();
        selector.clear_cache().await;
        selector.select_relevant(&messages, "topic", 1000).await.unwrap();

        assert_eq!(embedder.call_count(), 4); // (query + message) twice
    }

    #[tokio::test]
    async fn transient_failure_degrades_single_message() {
        let embedder = Arc::new(StaticEmbedder::failing_on("poison"));
        let config = SelectorConfig {
            min_score: 0.0,
            ..SelectorConfig::default()
        };
        let selector = ContextSelector::with_provider(config, embedder).unwrap();
        let messages = vec![
            msg("deploy service checklist", 10, 5),
            msg("poison pill entry about deploy service", 10, 5),
        ];

        let results = selector
            .select_relevant(&messages, "deploy service", 1000)
            .await
            .unwrap();

        // Both still present: the poisoned message scores by
        // keyword+temporal with a zero semantic contribution.
        assert_eq!(results.len(), 2);
        assert!(
            results[0]
                .message
                .content
                .as_text()
                .starts_with("deploy service")
        );
    }

    #[tokio::test]
    async fn no_provider_renormalizes_weights() {
        // Heavy semantic weight, but no provider: keyword+temporal carry
        // the full score, so a perfect keyword match lands near 1.0.
        let config = SelectorConfig {
            weights: SelectorWeights {
                semantic: 0.6,
                keyword: 0.2,
                temporal: 0.2,
            },
            ..SelectorConfig::default()
        };
        let selector = ContextSelector::new(config).unwrap();
        let messages = vec![msg("deploy service", 10, 1)];

        let results = selector
            .select_relevant(&messages, "deploy service", 1000)
            .await
            .unwrap();

        assert_eq!(results.len(), 1);
        assert!(results[0].score > 0.9);
    }

    #[tokio::test]
    async fn token_budget_stops_at_first_overflow() {
        let config = SelectorConfig {
            weights: SelectorWeights {
                semantic: 0.0,
                keyword: 1.0,
                temporal: 0.0,
            },
            ..SelectorConfig::default()
        };
        let selector = ContextSelector::new(config).unwrap();
        let messages = vec![
            msg("alpha beta gamma delta", 100, 1), // jaccard 1.0
            msg("alpha beta gamma", 300, 1),       // jaccard 0.75
            msg("alpha beta", 50, 1),              // jaccard 0.5
        ];

        let results = selector
            .select_relevant(&messages, "alpha beta gamma delta", 150)
            .await
            .unwrap();

        // Rank 1 fits (100), rank 2 would overflow (400): stop there,
        // never skipping ahead to the 50-token rank 3.
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].message.tokens, 100);
    }

    #[tokio::test]
    async fn max_results_caps_output() {
        let config = SelectorConfig {
            max_results: 2,
            ..keyword_temporal_config()
        };
        let selector = ContextSelector::new(config).unwrap();
        let messages: Vec<ContextMessage> = (0..5)
            .map(|i| msg(&format!("deploy service run {i}"), 10, i))
            .collect();

        let results = selector
            .select_relevant(&messages, "deploy service", 1000)
            .await
            .unwrap();
        assert_eq!(results.len(), 2);
    }

    #[tokio::test]
    async fn min_score_filters_unrelated() {
        let config = SelectorConfig {
            min_score: 0.4,
            weights: SelectorWeights {
                semantic: 0.0,
                keyword: 1.0,
                temporal: 0.0,
            },
            ..SelectorConfig::default()
        };
        let selector = ContextSelector::new(config).unwrap();
        let messages = vec![
            msg("deploy service now", 10, 1),
            msg("weather forecast sunny", 10, 1),
        ];

        let results = selector
            .select_relevant(&messages, "deploy service", 1000)
            .await
            .unwrap();

        assert_eq!(results.len(), 1);
        assert!(results[0].message.content.as_text().contains("deploy"));
    }

    #[tokio::test]
    async fn reason_mentions_keyword_and_recency() {
        let selector = ContextSelector::new(keyword_temporal_config()).unwrap();
        let messages = vec![msg("deploy service now", 10, 1)];

        let results = selector
            .select_relevant(&messages, "deploy service now", 1000)
            .await
            .unwrap();

        assert_eq!(results.len(), 1);
        assert!(results[0].reason.contains("keyword match"));
        assert!(results[0].reason.contains("very recent"));
    }

    #[tokio::test]
    async fn reason_mentions_high_semantic_relevance() {
        let embedder = Arc::new(StaticEmbedder::new());
        let config = SelectorConfig {
            min_score: 0.0,
            ..SelectorConfig::default()
        };
        let selector = ContextSelector::with_provider(config, embedder).unwrap();
        // Identical text → identical embedding → cosine 1.0
        let messages = vec![msg("release the new build", 10, 1)];

        let results = selector
            .select_relevant(&messages, "release the new build", 1000)
            .await
            .unwrap();

        assert_eq!(results.len(), 1);
        assert!(results[0].reason.contains("high semantic relevance"));
    }

    #[tokio::test]
    async fn empty_input_is_empty_output() {
        let selector = ContextSelector::new(SelectorConfig::default()).unwrap();
        let results = selector.select_relevant(&[], "query", 1000).await.unwrap();
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn zero_budget_is_an_error() {
        let selector = ContextSelector::new(SelectorConfig::default()).unwrap();
        let messages = vec![msg("hello", 10, 1)];
        assert!(selector.select_relevant(&messages, "hello", 0).await.is_err());
    }

    #[tokio::test]
    async fn scores_stay_in_unit_range() {
        let selector = ContextSelector::new(keyword_temporal_config()).unwrap();
        let messages = vec![
            msg("deploy service deploy service", 10, 0),
            msg("nothing related", 10, 90_000),
        ];

        let scored = selector.score_messages(&messages, "deploy service").await;
        for s in scored {
            assert!((0.0..=1.0).contains(&s.combined));
        }
    }
}
