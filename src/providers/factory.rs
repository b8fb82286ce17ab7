//! Construction of provider instances from declarative configuration

use serde::Serialize;
use std::cmp::Reverse;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::config::{
    DynamicProviderConfig, FileProviderConfig, ProviderConfig, ProviderKind, StaticProviderConfig,
};
use crate::error::Result;
use crate::providers::{DynamicProvider, FileBasedProvider, PromptProvider, StaticProvider};

/// Record of a provider excluded at construction or initialization time.
///
/// These never propagate to `generate()` callers; they are surfaced through
/// diagnostics on the config manager and the engine.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderFailure {
    pub name: String,
    pub kind: ProviderKind,
    pub error: String,
}

/// Builds concrete provider variants from config entries.
///
/// New variants extend the single `match` here; call sites stay untouched.
pub struct ProviderFactory;

impl ProviderFactory {
    /// Validate the variant payload and construct the matching provider.
    /// Pure: no resources are acquired until `initialize`.
    pub fn build(entry: &ProviderConfig) -> Result<Box<dyn PromptProvider>> {
        let field_path = format!("providers.{}.config", entry.name);
        Ok(match entry.kind {
            ProviderKind::Static => {
                let config = StaticProviderConfig::from_value(&field_path, &entry.config)?;
                Box::new(StaticProvider::new(&entry.name, entry.priority, config))
            }
            ProviderKind::Dynamic => {
                let config = DynamicProviderConfig::from_value(&field_path, &entry.config)?;
                Box::new(DynamicProvider::new(&entry.name, entry.priority, config))
            }
            ProviderKind::FileBased => {
                let config = FileProviderConfig::from_value(&field_path, &entry.config)?;
                Box::new(FileBasedProvider::new(&entry.name, entry.priority, config))
            }
        })
    }

    /// Build and initialize every enabled entry, capturing per-provider
    /// failures instead of propagating them. Returns the active set sorted by
    /// descending priority (stable on ties, preserving config order).
    pub async fn build_active_set(
        entries: &[ProviderConfig],
    ) -> (Vec<Arc<dyn PromptProvider>>, Vec<ProviderFailure>) {
        let mut active: Vec<Arc<dyn PromptProvider>> = Vec::new();
        let mut failures = Vec::new();

        for entry in entries.iter().filter(|entry| entry.enabled) {
            let provider = match Self::build(entry) {
                Ok(provider) => provider,
                Err(err) => {
                    warn!(provider = %entry.name, kind = %entry.kind, error = %err, "provider failed validation");
                    failures.push(ProviderFailure {
                        name: entry.name.clone(),
                        kind: entry.kind,
                        error: err.to_string(),
                    });
                    continue;
                }
            };
            let provider: Arc<dyn PromptProvider> = Arc::from(provider);
            if let Err(err) = provider.initialize().await {
                warn!(provider = %entry.name, kind = %entry.kind, error = %err, "provider failed to initialize");
                failures.push(ProviderFailure {
                    name: entry.name.clone(),
                    kind: entry.kind,
                    error: err.to_string(),
                });
                // Release anything a partial initialize may have acquired.
                if let Err(err) = provider.destroy().await {
                    warn!(provider = %entry.name, error = %err, "cleanup after failed initialize also failed");
                }
                continue;
            }
            active.push(provider);
        }

        // Vec::sort_by_key is stable, so equal priorities keep config order.
        active.sort_by_key(|provider| Reverse(provider.priority()));
        debug!(active = active.len(), failed = failures.len(), "provider set constructed");
        (active, failures)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn static_entry(name: &str, priority: i64, content: &str) -> ProviderConfig {
        serde_json::from_value(json!({
            "name": name,
            "type": "static",
            "priority": priority,
            "config": {"content": content}
        }))
        .unwrap()
    }

    #[tokio::test]
    async fn sorts_by_descending_priority_with_stable_ties() {
        let entries = vec![
            static_entry("low", 10, "c"),
            static_entry("first-tie", 50, "a"),
            static_entry("second-tie", 50, "b"),
            static_entry("high", 100, "d"),
        ];
        let (active, failures) = ProviderFactory::build_active_set(&entries).await;
        assert!(failures.is_empty());
        let names: Vec<_> = active.iter().map(|p| p.name().to_string()).collect();
        assert_eq!(names, ["high", "first-tie", "second-tie", "low"]);
    }

    #[tokio::test]
    async fn invalid_entry_is_excluded_not_fatal() {
        let entries = vec![
            static_entry("ok", 10, "text"),
            serde_json::from_value(json!({
                "name": "broken",
                "type": "dynamic",
                "priority": 5,
                "config": {}
            }))
            .unwrap(),
        ];
        let (active, failures) = ProviderFactory::build_active_set(&entries).await;
        assert_eq!(active.len(), 1);
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].name, "broken");
        assert!(failures[0].error.contains("generator"));
    }

    #[tokio::test]
    async fn disabled_entries_are_skipped_silently() {
        let mut entry = static_entry("off", 10, "text");
        entry.enabled = false;
        let (active, failures) = ProviderFactory::build_active_set(&[entry]).await;
        assert!(active.is_empty());
        assert!(failures.is_empty());
    }
}
