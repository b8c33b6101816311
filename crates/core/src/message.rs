//! The `ContextMessage` domain type.
//!
//! A `ContextMessage` is one turn in a conversation transcript. The agent
//! loop creates them, the pruner and selector read them many times, and
//! nothing in this core ever mutates or deletes one — pruning and selection
//! produce new ordered sequences, "removal" means not appearing in an
//! output sequence.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The role of a message sender in a conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// System instructions (identity, rules) — never evicted by pruning
    System,
    /// The end user
    User,
    /// The AI assistant
    Assistant,
    /// Tool execution result
    Tool,
    /// Legacy function-call result
    Function,
}

/// Retention priority of a message. Defaults to `Normal` when absent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Critical,
    High,
    #[default]
    Normal,
    Low,
}

/// Message content — plain text or a structured payload.
///
/// Structured payloads (tool results, function outputs) are serialized to
/// text on demand for scoring.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MessageContent {
    Text(String),
    Structured(serde_json::Value),
}

impl MessageContent {
    /// The content as text, serializing structured payloads.
    pub fn as_text(&self) -> String {
        match self {
            Self::Text(s) => s.clone(),
            Self::Structured(v) => v.to_string(),
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Self::Text(s) => s.is_empty(),
            Self::Structured(v) => v.is_null(),
        }
    }
}

impl From<&str> for MessageContent {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for MessageContent {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

/// A single message in a conversation transcript.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContextMessage {
    /// Unique, stable message ID
    pub id: String,

    /// Who sent this message
    pub role: Role,

    /// The content (text or structured payload)
    pub content: MessageContent,

    /// Creation time; monotonic within a conversation
    pub timestamp: DateTime<Utc>,

    /// Token cost, precomputed by an external tokenizer
    pub tokens: usize,

    /// Retention priority
    #[serde(default)]
    pub priority: Priority,

    /// Open metadata bag (may carry a numeric `priority_bonus`)
    #[serde(default, skip_serializing_if = "serde_json::Map::is_empty")]
    pub metadata: serde_json::Map<String, serde_json::Value>,
}

impl ContextMessage {
    /// Create a message with an explicit role and token count.
    pub fn new(role: Role, content: impl Into<MessageContent>, tokens: usize) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            role,
            content: content.into(),
            timestamp: Utc::now(),
            tokens,
            priority: Priority::default(),
            metadata: serde_json::Map::new(),
        }
    }

    /// Create a new user message.
    pub fn user(content: impl Into<MessageContent>, tokens: usize) -> Self {
        Self::new(Role::User, content, tokens)
    }

    /// Create a new assistant message.
    pub fn assistant(content: impl Into<MessageContent>, tokens: usize) -> Self {
        Self::new(Role::Assistant, content, tokens)
    }

    /// Create a new system message.
    pub fn system(content: impl Into<MessageContent>, tokens: usize) -> Self {
        Self::new(Role::System, content, tokens)
    }

    /// Create a tool result message.
    pub fn tool(content: impl Into<MessageContent>, tokens: usize) -> Self {
        Self::new(Role::Tool, content, tokens)
    }

    /// Set the retention priority (builder-style).
    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    /// Set the timestamp (builder-style).
    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = timestamp;
        self
    }

    /// Attach a metadata entry (builder-style).
    pub fn with_metadata(mut self, key: &str, value: serde_json::Value) -> Self {
        self.metadata.insert(key.to_string(), value);
        self
    }

    /// The `priority_bonus` metadata entry, clamped to [0, 100].
    ///
    /// Returns 0.0 when absent or non-numeric.
    pub fn priority_bonus(&self) -> f64 {
        self.metadata
            .get("priority_bonus")
            .and_then(|v| v.as_f64())
            .map(|b| b.clamp(0.0, 100.0))
            .unwrap_or(0.0)
    }

    /// Whether this is a system-role message.
    pub fn is_system(&self) -> bool {
        self.role == Role::System
    }
}

/// Total token count of a message slice.
pub fn total_tokens(messages: &[ContextMessage]) -> usize {
    messages.iter().map(|m| m.tokens).sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_user_message() {
        let msg = ContextMessage::user("Hello, agent!", 4);
        assert_eq!(msg.role, Role::User);
        assert_eq!(msg.content.as_text(), "Hello, agent!");
        assert_eq!(msg.tokens, 4);
        assert_eq!(msg.priority, Priority::Normal);
    }

    #[test]
    fn structured_content_serializes_for_scoring() {
        let msg = ContextMessage::tool(
            MessageContent::Structured(serde_json::json!({"exit_code": 0, "stdout": "ok"})),
            8,
        );
        let text = msg.content.as_text();
        assert!(text.contains("exit_code"));
        assert!(text.contains("ok"));
    }

    #[test]
    fn priority_bonus_clamped() {
        let msg = ContextMessage::user("hi", 1)
            .with_metadata("priority_bonus", serde_json::json!(250.0));
        assert_eq!(msg.priority_bonus(), 100.0);

        let msg = ContextMessage::user("hi", 1)
            .with_metadata("priority_bonus", serde_json::json!(-10.0));
        assert_eq!(msg.priority_bonus(), 0.0);
    }

    #[test]
    fn priority_bonus_defaults_to_zero() {
        let msg = ContextMessage::user("hi", 1);
        assert_eq!(msg.priority_bonus(), 0.0);

        let msg = ContextMessage::user("hi", 1)
            .with_metadata("priority_bonus", serde_json::json!("not a number"));
        assert_eq!(msg.priority_bonus(), 0.0);
    }

    #[test]
    fn priority_defaults_to_normal_in_json() {
        let json = r#"{
            "id": "m1",
            "role": "user",
            "content": "hello",
            "timestamp": "2026-01-15T10:00:00Z",
            "tokens": 2
        }"#;
        let msg: ContextMessage = serde_json::from_str(json).unwrap();
        assert_eq!(msg.priority, Priority::Normal);
    }

    #[test]
    fn message_serialization_roundtrip() {
        let msg = ContextMessage::assistant("A reply", 3).with_priority(Priority::High);
        let json = serde_json::to_string(&msg).unwrap();
        let deserialized: ContextMessage = serde_json::from_str(&json).unwrap();
        assert_eq!(deserialized.content.as_text(), "A reply");
        assert_eq!(deserialized.priority, Priority::High);
        assert_eq!(deserialized.role, Role::Assistant);
    }

    #[test]
    fn total_tokens_sums() {
        let messages = vec![
            ContextMessage::user("a", 10),
            ContextMessage::assistant("b", 20),
            ContextMessage::system("c", 5),
        ];
        assert_eq!(total_tokens(&messages), 35);
    }
}
