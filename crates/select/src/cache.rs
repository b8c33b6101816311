//! Embedding cache — avoids redundant provider calls.
//!
//! Two side tables: message embeddings keyed by message ID, query
//! embeddings keyed by the raw query string. The cache is an owned member
//! of each selector instance (not global state), append-only during normal
//! operation, and invalidated only via an explicit `clear()`. Concurrent
//! writers for the same key are harmless: a key always maps to the same
//! embedding.

use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::debug;

/// Cache of computed embedding vectors.
#[derive(Debug, Default)]
pub struct EmbeddingCache {
    messages: RwLock<HashMap<String, Vec<f32>>>,
    queries: RwLock<HashMap<String, Vec<f32>>>,
}

impl EmbeddingCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a message embedding by message ID.
    pub async fn message(&self, id: &str) -> Option<Vec<f32>> {
        self.messages.read().await.get(id).cloned()
    }

    /// Store a message embedding.
    pub async fn insert_message(&self, id: &str, embedding: Vec<f32>) {
        self.messages.write().await.insert(id.to_string(), embedding);
    }

    /// Look up a query embedding by the raw query string.
    pub async fn query(&self, text: &str) -> Option<Vec<f32>> {
        self.queries.read().await.get(text).cloned()
    }

    /// Store a query embedding.
    pub async fn insert_query(&self, text: &str, embedding: Vec<f32>) {
        self.queries.write().await.insert(text.to_string(), embedding);
    }

    /// Number of cached message embeddings.
    pub async fn message_count(&self) -> usize {
        self.messages.read().await.len()
    }

    /// Number of cached query embeddings.
    pub async fn query_count(&self) -> usize {
        self.queries.read().await.len()
    }

    /// Drop every cached embedding.
    pub async fn clear(&self) {
        let mut messages = self.messages.write().await;
        let mut queries = self.queries.write().await;
        debug!(
            messages = messages.len(),
            queries = queries.len(),
            "Clearing embedding cache"
        );
        messages.clear();
        queries.clear();
    }
}
