//! Per-call context passed to every provider during generation

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde_json::Value;

/// Immutable input for a single generation call.
///
/// Providers receive the same context for one `generate()` invocation and
/// never mutate it; cloning is cheap enough to hand each spawned provider
/// task its own copy.
#[derive(Debug, Clone)]
pub struct ProviderContext {
    /// Moment the generation call was issued
    pub timestamp: DateTime<Utc>,
    /// Identifier of the requesting user, if known
    pub user_id: Option<String>,
    /// Identifier of the active session, if known
    pub session_id: Option<String>,
    /// Recalled memory entries keyed by topic
    pub memory_context: IndexMap<String, Value>,
    /// Free-form metadata consulted by conditional generators
    pub metadata: IndexMap<String, Value>,
}

impl Default for ProviderContext {
    fn default() -> Self {
        Self {
            timestamp: Utc::now(),
            user_id: None,
            session_id: None,
            memory_context: IndexMap::new(),
            metadata: IndexMap::new(),
        }
    }
}

impl ProviderContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a context for a known session
    pub fn for_session(session_id: impl Into<String>) -> Self {
        Self {
            session_id: Some(session_id.into()),
            ..Self::default()
        }
    }

    pub fn with_user(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }

    pub fn with_session(mut self, session_id: impl Into<String>) -> Self {
        self.session_id = Some(session_id.into());
        self
    }

    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = timestamp;
        self
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    pub fn with_memory(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.memory_context.insert(key.into(), value.into());
        self
    }

    /// Resolve a dotted field path against the context.
    ///
    /// `userId`, `sessionId`, and `timestamp` address the named fields;
    /// `metadata.<key>` and `memoryContext.<key>` address the maps. A bare
    /// key falls back to the metadata map.
    pub fn field(&self, path: &str) -> Option<Value> {
        match path {
            "timestamp" => Some(Value::String(self.timestamp.to_rfc3339())),
            "userId" | "user_id" => self.user_id.clone().map(Value::String),
            "sessionId" | "session_id" => self.session_id.clone().map(Value::String),
            _ => {
                if let Some(key) = path.strip_prefix("metadata.") {
                    self.metadata.get(key).cloned()
                } else if let Some(key) = path.strip_prefix("memoryContext.") {
                    self.memory_context.get(key).cloned()
                } else {
                    self.metadata.get(path).cloned()
                }
            }
        }
    }
}
