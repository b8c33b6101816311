//! Semantic top-K eviction.
//!
//! Reuses the `ContextSelector`'s relevance function: regular messages are
//! scored against the current conversation tail, and only the `top_k` most
//! relevant at or above `relevance_threshold` survive. System messages are
//! always preserved.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::sync::Arc;
use tracing::debug;

use contexture_core::strategy::{ContextStrategy, PruningResult, StrategyCounters, StrategySnapshot};
use contexture_core::{ContextMessage, Error, Result, total_tokens};
use contexture_select::ContextSelector;

const KIND: &str = "semantic";

/// Configuration for `SemanticStrategy`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SemanticConfig {
    /// How many of the most relevant regular messages to keep.
    #[serde(default = "default_top_k")]
    pub top_k: usize,

    /// Minimum relevance score a message must reach to be kept.
    #[serde(default = "default_relevance_threshold")]
    pub relevance_threshold: f32,

    /// How many trailing regular messages form the relevance query.
    #[serde(default = "default_tail_messages")]
    pub tail_messages: usize,
}

fn default_top_k() -> usize {
    15
}
fn default_relevance_threshold() -> f32 {
    0.3
}
fn default_tail_messages() -> usize {
    3
}

impl Default for SemanticConfig {
    fn default() -> Self {
        Self {
            top_k: default_top_k(),
            relevance_threshold: default_relevance_threshold(),
            tail_messages: default_tail_messages(),
        }
    }
}

impl SemanticConfig {
    pub fn validate(&self) -> Result<()> {
        if self.top_k < 1 {
            return Err(Error::config("top_k must be at least 1"));
        }
        if !(0.0..=1.0).contains(&self.relevance_threshold) {
            return Err(Error::config(format!(
                "relevance_threshold must be in [0, 1], got {}",
                self.relevance_threshold
            )));
        }
        if self.tail_messages < 1 {
            return Err(Error::config("tail_messages must be at least 1"));
        }
        Ok(())
    }
}

/// Relevance-driven strategy delegating to a `ContextSelector`.
pub struct SemanticStrategy {
    config: SemanticConfig,
    selector: Arc<ContextSelector>,
    counters: StrategyCounters,
}

impl SemanticStrategy {
    pub fn new(config: SemanticConfig, selector: Arc<ContextSelector>) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            selector,
            counters: StrategyCounters::new(),
        })
    }

    /// The relevance query: concatenated text of the trailing regular
    /// messages, i.e. what the conversation is currently about.
    fn tail_query(&self, regular: &[&ContextMessage]) -> String {
        let start = regular.len().saturating_sub(self.config.tail_messages);
        regular[start..]
            .iter()
            .map(|m| m.content.as_text())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[async_trait]
impl ContextStrategy for SemanticStrategy {
    fn kind(&self) -> &str {
        KIND
    }

    fn config_json(&self) -> serde_json::Value {
        serde_json::to_value(&self.config).unwrap_or_default()
    }

    fn validate(&self) -> bool {
        self.config.validate().is_ok()
    }

    async fn prune(
        &self,
        messages: &[ContextMessage],
        max_tokens: usize,
        current_tokens: usize,
    ) -> Result<PruningResult> {
        if current_tokens <= max_tokens {
            self.counters.record(0, 0);
            return Ok(PruningResult::unchanged(KIND, messages));
        }

        let (system, regular): (Vec<&ContextMessage>, Vec<&ContextMessage>) =
            messages.iter().partition(|m| m.is_system());

        let query = self.tail_query(&regular);
        let owned: Vec<ContextMessage> = regular.iter().map(|m| (*m).clone()).collect();
        let scores = self.selector.score_messages(&owned, &query).await;

        let mut ranked: Vec<(usize, f32)> = scores
            .iter()
            .filter(|s| s.combined >= self.config.relevance_threshold)
            .map(|s| (s.index, s.combined))
            .collect();
        ranked.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));
        ranked.truncate(self.config.top_k);

        let mut kept: Vec<ContextMessage> = system.iter().map(|m| (*m).clone()).collect();
        kept.extend(ranked.iter().map(|(i, _)| regular[*i].clone()));
        kept.sort_by_key(|m| m.timestamp);

        let removed_count = messages.len() - kept.len();
        let removed_tokens = total_tokens(messages).saturating_sub(total_tokens(&kept));

        let mut metadata = serde_json::Map::new();
        metadata.insert("top_k".into(), serde_json::json!(self.config.top_k));
        metadata.insert(
            "relevance_threshold".into(),
            serde_json::json!(self.config.relevance_threshold),
        );
        metadata.insert("evaluated".into(), serde_json::json!(regular.len()));
        metadata.insert("selected".into(), serde_json::json!(ranked.len()));

        debug!(
            evaluated = regular.len(),
            selected = ranked.len(),
            removed_count,
            "Semantic pruning complete"
        );
        self.counters.record(removed_count, removed_tokens);

        Ok(PruningResult {
            messages: kept,
            removed_count,
            removed_tokens,
            strategy: KIND.into(),
            metadata,
        })
    }

    fn stats(&self) -> StrategySnapshot {
        self.counters.snapshot(KIND)
    }
}
