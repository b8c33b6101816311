//! The `ContextStrategy` trait — the contract every eviction policy
//! implements.
//!
//! A strategy is identified by its `kind()` string, owns an immutable
//! validated configuration, and reduces a message list to fit a token
//! budget. Implementations: priority-based, sliding-window, summary-based,
//! semantic top-K. The `ContextPruner` registry swaps them at runtime.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

use crate::error::Result;
use crate::message::ContextMessage;

/// The outcome of a pruning operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PruningResult {
    /// Retained messages, sorted by timestamp ascending.
    pub messages: Vec<ContextMessage>,

    /// How many messages were removed.
    pub removed_count: usize,

    /// Token cost of the removed messages.
    pub removed_tokens: usize,

    /// Which strategy produced this result.
    pub strategy: String,

    /// Strategy-specific diagnostics (score statistics, window sizes, ...).
    #[serde(default, skip_serializing_if = "serde_json::Map::is_empty")]
    pub metadata: serde_json::Map<String, serde_json::Value>,
}

impl PruningResult {
    /// A result that keeps everything — the within-budget fast path.
    pub fn unchanged(strategy: &str, messages: &[ContextMessage]) -> Self {
        Self {
            messages: messages.to_vec(),
            removed_count: 0,
            removed_tokens: 0,
            strategy: strategy.to_string(),
            metadata: serde_json::Map::new(),
        }
    }

    /// Total token count of the retained messages.
    pub fn kept_tokens(&self) -> usize {
        self.messages.iter().map(|m| m.tokens).sum()
    }
}

/// A point-in-time snapshot of a strategy's running counters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StrategySnapshot {
    /// The strategy kind this snapshot describes.
    pub kind: String,

    /// How many prune calls this strategy has served.
    pub invocations: u64,

    /// Messages removed across all calls.
    pub messages_removed: u64,

    /// Tokens removed across all calls.
    pub tokens_removed: u64,
}

/// Lock-free running counters a strategy updates on every prune call.
///
/// Atomics let `prune(&self)` record through a shared reference.
#[derive(Debug, Default)]
pub struct StrategyCounters {
    invocations: AtomicU64,
    messages_removed: AtomicU64,
    tokens_removed: AtomicU64,
}

impl StrategyCounters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one completed prune call.
    pub fn record(&self, removed_count: usize, removed_tokens: usize) {
        self.invocations.fetch_add(1, Ordering::Relaxed);
        self.messages_removed
            .fetch_add(removed_count as u64, Ordering::Relaxed);
        self.tokens_removed
            .fetch_add(removed_tokens as u64, Ordering::Relaxed);
    }

    pub fn snapshot(&self, kind: &str) -> StrategySnapshot {
        StrategySnapshot {
            kind: kind.to_string(),
            invocations: self.invocations.load(Ordering::Relaxed),
            messages_removed: self.messages_removed.load(Ordering::Relaxed),
            tokens_removed: self.tokens_removed.load(Ordering::Relaxed),
        }
    }
}

/// The core ContextStrategy trait.
///
/// Every eviction policy implements this; the registry stores them keyed by
/// `kind()` and delegates without knowing which policy is in play.
#[async_trait]
pub trait ContextStrategy: Send + Sync {
    /// The strategy kind string (e.g., "priority", "sliding-window").
    fn kind(&self) -> &str;

    /// The strategy's configuration, serialized for diagnostics.
    fn config_json(&self) -> serde_json::Value;

    /// Whether the configuration is internally consistent.
    ///
    /// Constructors already refuse invalid configs; the registry re-checks
    /// so a hand-rolled implementation cannot slip in broken.
    fn validate(&self) -> bool;

    /// Reduce `messages` to fit `max_tokens`.
    ///
    /// `current_tokens` is the caller-computed total of the input; when it
    /// is already within budget the input is returned unchanged. The output
    /// message list is always sorted by timestamp ascending.
    async fn prune(
        &self,
        messages: &[ContextMessage],
        max_tokens: usize,
        current_tokens: usize,
    ) -> Result<PruningResult>;

    /// Running counters for this strategy.
    fn stats(&self) -> StrategySnapshot;
}
