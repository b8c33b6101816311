//! # Contexture Core
//!
//! Domain types, traits, and error definitions for the Contexture
//! context-management engine. This crate has **zero framework
//! dependencies** — it defines the domain model the other crates
//! implement against.
//!
//! ## Design Philosophy
//!
//! Every collaborator and policy is defined as a trait here.
//! Implementations live in their respective crates. This enables:
//! - Swapping eviction strategies at runtime via the registry
//! - Easy testing with stub embedding providers and summarizers
//! - Clean dependency graph (all crates depend inward on core)

pub mod error;
pub mod message;
pub mod provider;
pub mod strategy;

// Re-export key types at crate root for ergonomics
pub use error::{EmbeddingError, Error, Result, SummarizeError};
pub use message::{ContextMessage, MessageContent, Priority, Role, total_tokens};
pub use provider::{EmbeddingProvider, Summarizer};
pub use strategy::{ContextStrategy, PruningResult, StrategyCounters, StrategySnapshot};
