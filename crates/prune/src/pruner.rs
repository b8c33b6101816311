//! The `ContextPruner` — a strategy registry with operation history.
//!
//! Strategies register under their `kind()` string; pruning delegates to
//! whichever strategy the caller names. Every delegated operation is
//! recorded in a bounded history ring buffer and rolled into aggregate
//! removal totals for diagnostics. History writes are serialized behind a
//! single mutex; lost history entries would not be correctness-critical,
//! but the single-writer discipline keeps them from being lost at all.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use tracing::{debug, warn};

use contexture_core::strategy::{ContextStrategy, PruningResult};
use contexture_core::{ContextMessage, Error, Result};

/// Ring buffer cap: only the last 100 operations are retained.
const HISTORY_CAP: usize = 100;

/// One recorded pruning operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PruneHistoryEntry {
    pub timestamp: DateTime<Utc>,
    pub strategy: String,
    pub messages_before: usize,
    pub messages_after: usize,
    pub removed_count: usize,
    pub removed_tokens: usize,
}

/// Aggregate removal totals across all strategies.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct PruneTotals {
    pub operations: u64,
    pub messages_removed: u64,
    pub tokens_removed: u64,
}

#[derive(Default)]
struct Ledger {
    history: VecDeque<PruneHistoryEntry>,
    totals: PruneTotals,
}

/// Strategy registry and pruning front door.
pub struct ContextPruner {
    strategies: HashMap<String, Arc<dyn ContextStrategy>>,
    ledger: Mutex<Ledger>,
}

impl ContextPruner {
    pub fn new() -> Self {
        Self {
            strategies: HashMap::new(),
            ledger: Mutex::new(Ledger::default()),
        }
    }

    /// Register a strategy under its `kind()`. Last registration wins;
    /// a strategy that fails its own validation is rejected.
    pub fn register_strategy(&mut self, strategy: Arc<dyn ContextStrategy>) -> Result<()> {
        if !strategy.validate() {
            return Err(Error::config(format!(
                "strategy '{}' failed validation and cannot be registered",
                strategy.kind()
            )));
        }
        let kind = strategy.kind().to_string();
        if self.strategies.insert(kind.clone(), strategy).is_some() {
            warn!(strategy = %kind, "Strategy re-registered; previous registration replaced");
        } else {
            debug!(strategy = %kind, "Strategy registered");
        }
        Ok(())
    }

    /// Registered strategy kinds, sorted for stable error messages.
    pub fn available_strategies(&self) -> Vec<String> {
        let mut kinds: Vec<String> = self.strategies.keys().cloned().collect();
        kinds.sort();
        kinds
    }

    /// Prune `messages` to fit `max_tokens` using the named strategy.
    ///
    /// An empty input list is a success (reason `"no-messages"`), not an
    /// error; it is not recorded in the history.
    pub async fn prune(
        &self,
        messages: &[ContextMessage],
        strategy_kind: &str,
        max_tokens: usize,
        current_tokens: usize,
    ) -> Result<PruningResult> {
        if max_tokens == 0 {
            return Err(Error::invalid_budget("max_tokens must be greater than zero"));
        }

        let strategy = self.strategies.get(strategy_kind).ok_or_else(|| {
            Error::UnknownStrategy {
                requested: strategy_kind.to_string(),
                available: self.available_strategies().join(", "),
            }
        })?;

        if messages.is_empty() {
            let mut result = PruningResult::unchanged(strategy_kind, &[]);
            result
                .metadata
                .insert("reason".into(), serde_json::json!("no-messages"));
            return Ok(result);
        }

        let messages_before = messages.len();
        let result = strategy
            .prune(messages, max_tokens, current_tokens)
            .await?;

        let entry = PruneHistoryEntry {
            timestamp: Utc::now(),
            strategy: result.strategy.clone(),
            messages_before,
            messages_after: result.messages.len(),
            removed_count: result.removed_count,
            removed_tokens: result.removed_tokens,
        };
        let mut ledger = self.ledger.lock().unwrap_or_else(|e| e.into_inner());
        ledger.history.push_back(entry);
        while ledger.history.len() > HISTORY_CAP {
            ledger.history.pop_front();
        }
        ledger.totals.operations += 1;
        ledger.totals.messages_removed += result.removed_count as u64;
        ledger.totals.tokens_removed += result.removed_tokens as u64;
        drop(ledger);

        debug!(
            strategy = %strategy_kind,
            removed = result.removed_count,
            removed_tokens = result.removed_tokens,
            "Prune operation recorded"
        );
        Ok(result)
    }

    /// The recorded history, oldest first.
    pub fn history(&self) -> Vec<PruneHistoryEntry> {
        let ledger = self.ledger.lock().unwrap_or_else(|e| e.into_inner());
        ledger.history.iter().cloned().collect()
    }

    /// Aggregate removal totals across all strategies.
    pub fn totals(&self) -> PruneTotals {
        let ledger = self.ledger.lock().unwrap_or_else(|e| e.into_inner());
        ledger.totals
    }
}

impl Default for ContextPruner {
    fn default() -> Self {
        Self::new()
    }
}
