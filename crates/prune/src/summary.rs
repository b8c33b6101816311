//! Summary-based compaction.
//!
//! The most recent `keep_recent_count` messages stay verbatim. Once the
//! transcript grows past `summary_threshold` messages, the older excess is
//! handed to an external `Summarizer` and replaced by a single synthetic
//! summary message, shrinking both message count and token cost.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

use contexture_core::strategy::{ContextStrategy, PruningResult, StrategyCounters, StrategySnapshot};
use contexture_core::{ContextMessage, Error, Result, Summarizer, total_tokens};

const KIND: &str = "summary";

/// Configuration for `SummaryStrategy`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SummaryConfig {
    /// How many recent messages to keep verbatim.
    #[serde(default = "default_keep_recent")]
    pub keep_recent_count: usize,

    /// Compaction kicks in once the transcript exceeds this many messages.
    #[serde(default = "default_threshold")]
    pub summary_threshold: usize,
}

fn default_keep_recent() -> usize {
    10
}
fn default_threshold() -> usize {
    30
}

impl Default for SummaryConfig {
    fn default() -> Self {
        Self {
            keep_recent_count: default_keep_recent(),
            summary_threshold: default_threshold(),
        }
    }
}

impl SummaryConfig {
    pub fn validate(&self) -> Result<()> {
        if self.keep_recent_count < 1 {
            return Err(Error::config("keep_recent_count must be at least 1"));
        }
        if self.summary_threshold <= self.keep_recent_count {
            return Err(Error::config(format!(
                "summary_threshold ({}) must exceed keep_recent_count ({})",
                self.summary_threshold, self.keep_recent_count
            )));
        }
        Ok(())
    }
}

/// Compacting strategy backed by an external summarizer.
pub struct SummaryStrategy {
    config: SummaryConfig,
    summarizer: Arc<dyn Summarizer>,
    counters: StrategyCounters,
}

impl SummaryStrategy {
    pub fn new(config: SummaryConfig, summarizer: Arc<dyn Summarizer>) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            summarizer,
            counters: StrategyCounters::new(),
        })
    }
}

#[async_trait]
impl ContextStrategy for SummaryStrategy {
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
        if messages.len() <= self.config.summary_threshold {
            self.counters.record(0, 0);
            let mut result = PruningResult::unchanged(KIND, messages);
            result
                .metadata
                .insert("reason".into(), serde_json::json!("under-threshold"));
            return Ok(result);
        }

        let (system, regular): (Vec<&ContextMessage>, Vec<&ContextMessage>) =
            messages.iter().partition(|m| m.is_system());
        if regular.len() <= self.config.keep_recent_count {
            self.counters.record(0, 0);
            return Ok(PruningResult::unchanged(KIND, messages));
        }

        let split = regular.len() - self.config.keep_recent_count;
        let older: Vec<ContextMessage> = regular[..split].iter().map(|m| (*m).clone()).collect();
        let recent = &regular[split..];

        let mut summary = self
            .summarizer
            .summarize(&older)
            .await
            .map_err(Error::Summarize)?;
        // Stamp with the newest summarized timestamp so the chronological
        // output invariant holds without reordering the verbatim tail.
        if let Some(last) = older.last() {
            summary.timestamp = last.timestamp;
        }
        let summary_tokens = summary.tokens;

        let mut kept: Vec<ContextMessage> = system.iter().map(|m| (*m).clone()).collect();
        kept.push(summary);
        kept.extend(recent.iter().map(|m| (*m).clone()));
        kept.sort_by_key(|m| m.timestamp);

        let removed_count = older.len();
        let older_tokens = total_tokens(&older);
        let removed_tokens = older_tokens.saturating_sub(summary_tokens);

        let mut metadata = serde_json::Map::new();
        metadata.insert("summarized_messages".into(), serde_json::json!(removed_count));
        metadata.insert("summarized_tokens".into(), serde_json::json!(older_tokens));
        metadata.insert("summary_tokens".into(), serde_json::json!(summary_tokens));

        debug!(
            summarized = removed_count,
            summary_tokens, removed_tokens, "Summary compaction complete"
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
