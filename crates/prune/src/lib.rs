//! Pruning strategies for Contexture.
//!
//! Four eviction policies behind one `ContextStrategy` contract, swapped
//! at runtime through the `ContextPruner` registry:
//!
//! | Strategy | Policy |
//! |----------|--------|
//! | `priority` | Weighted priority/recency/role scoring, greedy admission |
//! | `sliding-window` | Most recent N messages, no scoring |
//! | `summary` | Older excess compacted into one synthetic summary |
//! | `semantic` | Top-K most relevant to the conversation tail |
//!
//! Every strategy preserves system messages, returns chronologically
//! ordered output, and is a no-op for input already within budget.

pub mod priority;
pub mod pruner;
pub mod semantic;
pub mod sliding_window;
pub mod summary;

pub use priority::{PriorityConfig, PriorityStrategy};
pub use pruner::{ContextPruner, PruneHistoryEntry, PruneTotals};
pub use semantic::{SemanticConfig, SemanticStrategy};
pub use sliding_window::{SlidingWindowConfig, SlidingWindowStrategy};
pub use summary::{SummaryConfig, SummaryStrategy};
