//! Priority-based eviction — the canonical scoring strategy.
//!
//! Every regular message gets a weighted score from three normalized
//! 0–100 components (priority, recency, role) plus an unweighted metadata
//! bonus. Messages are admitted greedily in score order until the budget
//! is spent, with a floor of `min_messages` regular messages that are
//! always retained regardless of token cost. System messages are never
//! evicted; their token cost is reserved before any scoring happens.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use tracing::debug;

use contexture_core::strategy::{ContextStrategy, PruningResult, StrategyCounters, StrategySnapshot};
use contexture_core::{ContextMessage, Error, Priority, Result, Role, total_tokens};

const KIND: &str = "priority";
const WEIGHT_TOLERANCE: f64 = 1e-3;

/// Configuration for `PriorityStrategy`. Validated at construction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriorityConfig {
    /// Weight of the priority component.
    #[serde(default = "default_priority_weight")]
    pub priority_weight: f64,

    /// Weight of the recency component.
    #[serde(default = "default_recency_weight")]
    pub recency_weight: f64,

    /// Weight of the role component.
    #[serde(default = "default_role_weight")]
    pub role_weight: f64,

    /// Floor: this many regular messages are always kept, even past the
    /// token budget.
    #[serde(default = "default_min_messages")]
    pub min_messages: usize,

    /// Recency decay factor in [0, 1]; higher = slower decay.
    #[serde(default = "default_recency_decay")]
    pub recency_decay_factor: f64,
}

fn default_priority_weight() -> f64 {
    0.4
}
fn default_recency_weight() -> f64 {
    0.3
}
fn default_role_weight() -> f64 {
    0.3
}
fn default_min_messages() -> usize {
    5
}
fn default_recency_decay() -> f64 {
    0.9
}

impl Default for PriorityConfig {
    fn default() -> Self {
        Self {
            priority_weight: default_priority_weight(),
            recency_weight: default_recency_weight(),
            role_weight: default_role_weight(),
            min_messages: default_min_messages(),
            recency_decay_factor: default_recency_decay(),
        }
    }
}

impl PriorityConfig {
    pub fn validate(&self) -> Result<()> {
        for (name, w) in [
            ("priority_weight", self.priority_weight),
            ("recency_weight", self.recency_weight),
            ("role_weight", self.role_weight),
        ] {
            if !(0.0..=1.0).contains(&w) {
                return Err(Error::config(format!(
                    "{name} must be in [0, 1], got {w}"
                )));
            }
        }
        let sum = self.priority_weight + self.recency_weight + self.role_weight;
        if (sum - 1.0).abs() > WEIGHT_TOLERANCE {
            return Err(Error::config(format!(
                "priority strategy weights must sum to 1.0, got {sum}"
            )));
        }
        if self.min_messages < 1 {
            return Err(Error::config("min_messages must be at least 1"));
        }
        if !(0.0..=1.0).contains(&self.recency_decay_factor) {
            return Err(Error::config(format!(
                "recency_decay_factor must be in [0, 1], got {}",
                self.recency_decay_factor
            )));
        }
        Ok(())
    }
}

/// The priority/recency/role scoring strategy.
pub struct PriorityStrategy {
    config: PriorityConfig,
    counters: StrategyCounters,
}

impl PriorityStrategy {
    pub fn new(config: PriorityConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            counters: StrategyCounters::new(),
        })
    }

    /// Fixed priority lookup: critical=100, high=75, normal=50, low=25.
    fn priority_score(priority: Priority) -> f64 {
        match priority {
            Priority::Critical => 100.0,
            Priority::High => 75.0,
            Priority::Normal => 50.0,
            Priority::Low => 25.0,
        }
    }

    /// Fixed role lookup. System scores 100 but never reaches scoring;
    /// system messages are filtered out beforehand.
    fn role_score(role: Role) -> f64 {
        match role {
            Role::System => 100.0,
            Role::Assistant => 75.0,
            Role::User => 60.0,
            Role::Tool | Role::Function => 50.0,
        }
    }

    /// Score every regular message. Recency normalizes each message's age
    /// into [0, 1] across the batch's own time span (oldest=0, newest=1),
    /// then applies exponential decay.
    fn score_batch(&self, regular: &[&ContextMessage]) -> Vec<f64> {
        let min_ts = regular.iter().map(|m| m.timestamp).min();
        let max_ts = regular.iter().map(|m| m.timestamp).max();
        let span_ms = match (min_ts, max_ts) {
            (Some(lo), Some(hi)) => (hi - lo).num_milliseconds() as f64,
            _ => 0.0,
        };
        // Zero span (single message or identical timestamps) is treated
        // as 1 to avoid division by zero.
        let span_ms = if span_ms <= 0.0 { 1.0 } else { span_ms };

        regular
            .iter()
            .map(|message| {
                let age_ms = min_ts
                    .map(|lo| (message.timestamp - lo).num_milliseconds() as f64)
                    .unwrap_or(0.0);
                let normalized_age = (age_ms / span_ms).clamp(0.0, 1.0);
                let decay = self.config.recency_decay_factor.powf(1.0 - normalized_age);
                let recency = normalized_age * 100.0 * decay;

                Self::priority_score(message.priority) * self.config.priority_weight
                    + recency * self.config.recency_weight
                    + Self::role_score(message.role) * self.config.role_weight
                    + message.priority_bonus()
            })
            .collect()
    }
}

#[async_trait]
impl ContextStrategy for PriorityStrategy {
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
            let mut result = PruningResult::unchanged(KIND, messages);
            result.metadata = score_stats(&[]);
            self.counters.record(0, 0);
            return Ok(result);
        }

        let (system, regular): (Vec<&ContextMessage>, Vec<&ContextMessage>) =
            messages.iter().partition(|m| m.is_system());

        let system_tokens: usize = system.iter().map(|m| m.tokens).sum();
        if system_tokens > max_tokens {
            return Err(Error::BudgetInfeasible {
                system_tokens,
                max_tokens,
            });
        }

        let scores = self.score_batch(&regular);
        let mut ranked: Vec<(usize, f64)> = scores.iter().copied().enumerate().collect();
        // Stable sort: ties keep their relative (chronological) order.
        ranked.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));

        let mut kept_tokens = system_tokens;
        let mut admitted: Vec<(usize, f64)> = Vec::new();
        for (index, score) in ranked {
            let tokens = regular[index].tokens;
            if admitted.len() < self.config.min_messages {
                // Floor: admitted regardless of token cost. This may
                // overshoot the budget and is an accepted guarantee.
                kept_tokens += tokens;
                admitted.push((index, score));
            } else if kept_tokens + tokens <= max_tokens {
                kept_tokens += tokens;
                admitted.push((index, score));
            }
        }

        let retained_scores: Vec<f64> = admitted.iter().map(|(_, s)| *s).collect();

        let mut kept: Vec<ContextMessage> = system.iter().map(|m| (*m).clone()).collect();
        kept.extend(admitted.iter().map(|(i, _)| regular[*i].clone()));
        // Ranking order must never leak into the output order.
        kept.sort_by_key(|m| m.timestamp);

        let removed_count = messages.len() - kept.len();
        let removed_tokens = total_tokens(messages).saturating_sub(total_tokens(&kept));

        let mut metadata = score_stats(&retained_scores);
        metadata.insert("system_tokens".into(), serde_json::json!(system_tokens));
        metadata.insert(
            "scored_messages".into(),
            serde_json::json!(regular.len()),
        );

        debug!(
            removed_count,
            removed_tokens,
            kept = kept.len(),
            kept_tokens,
            "Priority pruning complete"
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

/// Average/min/max over the retained regular messages' scores.
fn score_stats(scores: &[f64]) -> serde_json::Map<String, serde_json::Value> {
    let mut metadata = serde_json::Map::new();
    let (avg, min, max) = if scores.is_empty() {
        (0.0, 0.0, 0.0)
    } else {
        let sum: f64 = scores.iter().sum();
        let min = scores.iter().copied().fold(f64::INFINITY, f64::min);
        let max = scores.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        (sum / scores.len() as f64, min, max)
    };
    metadata.insert("average_score".into(), serde_json::json!(avg));
    metadata.insert("min_score".into(), serde_json::json!(min));
    metadata.insert("max_score".into(), serde_json::json!(max));
    metadata
}
