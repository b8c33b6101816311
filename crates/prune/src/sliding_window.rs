//! Sliding-window eviction — a pure recency queue.
//!
//! Keeps the most recent `max_messages` messages, dropping the oldest
//! first. No scoring. System messages sit outside the window when
//! `preserve_system_message` is on.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use contexture_core::strategy::{ContextStrategy, PruningResult, StrategyCounters, StrategySnapshot};
use contexture_core::{ContextMessage, Error, Result, total_tokens};

const KIND: &str = "sliding-window";

/// Configuration for `SlidingWindowStrategy`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SlidingWindowConfig {
    /// How many recent messages to retain.
    #[serde(default = "default_max_messages")]
    pub max_messages: usize,

    /// Keep system messages outside the window.
    #[serde(default = "default_true")]
    pub preserve_system_message: bool,
}

fn default_max_messages() -> usize {
    20
}
fn default_true() -> bool {
    true
}

impl Default for SlidingWindowConfig {
    fn default() -> Self {
        Self {
            max_messages: default_max_messages(),
            preserve_system_message: default_true(),
        }
    }
}

impl SlidingWindowConfig {
    pub fn validate(&self) -> Result<()> {
        if self.max_messages < 1 {
            return Err(Error::config("max_messages must be at least 1"));
        }
        Ok(())
    }
}

/// Recency-window strategy.
pub struct SlidingWindowStrategy {
    config: SlidingWindowConfig,
    counters: StrategyCounters,
}

impl SlidingWindowStrategy {
    pub fn new(config: SlidingWindowConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            counters: StrategyCounters::new(),
        })
    }
}

#[async_trait]
impl ContextStrategy for SlidingWindowStrategy {
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

        let mut kept: Vec<ContextMessage> = if self.config.preserve_system_message {
            let (system, regular): (Vec<&ContextMessage>, Vec<&ContextMessage>) =
                messages.iter().partition(|m| m.is_system());
            let window_start = regular.len().saturating_sub(self.config.max_messages);
            system
                .into_iter()
                .chain(regular.into_iter().skip(window_start))
                .cloned()
                .collect()
        } else {
            let window_start = messages.len().saturating_sub(self.config.max_messages);
            messages[window_start..].to_vec()
        };
        kept.sort_by_key(|m| m.timestamp);

        let removed_count = messages.len() - kept.len();
        let removed_tokens = total_tokens(messages).saturating_sub(total_tokens(&kept));

        let mut metadata = serde_json::Map::new();
        metadata.insert(
            "max_messages".into(),
            serde_json::json!(self.config.max_messages),
        );
        metadata.insert(
            "preserved_system".into(),
            serde_json::json!(kept.iter().filter(|m| m.is_system()).count()),
        );

        debug!(removed_count, removed_tokens, "Sliding-window pruning complete");
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
