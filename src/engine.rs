//! Concurrent fan-out, deadline enforcement, and priority-ordered merge

use parking_lot::Mutex;
use serde::Serialize;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::time::timeout;
use tracing::{debug, warn};

use crate::config::EngineSettings;
use crate::context::ProviderContext;
use crate::error::PromptError;
use crate::providers::{PromptProvider, ProviderFailure};

/// Outcome of one provider for one generation call.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderResult {
    pub provider_id: String,
    /// Always a string; empty on failure, never absent
    pub content: String,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub generation_time_ms: u64,
}

/// Aggregate outcome of one generation call.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptGenerationResult {
    /// Successful providers' content joined by the configured separator,
    /// in descending priority order
    pub content: String,
    /// One entry per active provider, priority order; disabled providers
    /// never appear here
    pub provider_results: Vec<ProviderResult>,
    /// End-to-end wall time of the fan-out and join
    pub generation_time_ms: u64,
    pub success: bool,
    pub errors: Vec<String>,
}

/// Running statistics reported by [`PromptEngine::get_performance_stats`].
#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceStats {
    pub average_generation_time: f64,
    pub total_generations: u64,
    /// Providers declared in the loaded configuration, including disabled
    /// and failed ones
    pub total_providers: usize,
    /// Providers in the active set
    pub enabled_providers: usize,
}

#[derive(Debug, Default)]
struct StatsAccumulator {
    total_generations: u64,
    total_time_ms: u64,
}

/// Fans `generate_content` out to every active provider concurrently,
/// enforces the per-provider deadline, and merges results deterministically.
pub struct PromptEngine {
    /// Sorted by descending priority at construction; merge order follows
    /// this list, never completion order
    providers: Vec<Arc<dyn PromptProvider>>,
    settings: EngineSettings,
    failures: Vec<ProviderFailure>,
    configured_providers: usize,
    stats: Mutex<StatsAccumulator>,
}

impl PromptEngine {
    pub fn new(providers: Vec<Arc<dyn PromptProvider>>, settings: EngineSettings) -> Self {
        let configured_providers = providers.len();
        Self::with_diagnostics(providers, settings, Vec::new(), configured_providers)
    }

    /// Construct with load-time diagnostics attached.
    /// `configured_providers` counts every declared entry, active or not.
    pub fn with_diagnostics(
        providers: Vec<Arc<dyn PromptProvider>>,
        settings: EngineSettings,
        failures: Vec<ProviderFailure>,
        configured_providers: usize,
    ) -> Self {
        Self {
            providers,
            settings,
            failures,
            configured_providers,
            stats: Mutex::new(StatsAccumulator::default()),
        }
    }

    pub fn providers(&self) -> &[Arc<dyn PromptProvider>] {
        &self.providers
    }

    /// Providers excluded at load time, for diagnostics only.
    pub fn provider_failures(&self) -> &[ProviderFailure] {
        &self.failures
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    /// Generate the composed system prompt for one call.
    ///
    /// Call-time failures never escape: they are captured per provider and,
    /// when `fail_on_provider_error` is set, reflected in the aggregate
    /// `success` flag while partial content is still returned.
    pub async fn generate(&self, context: &ProviderContext) -> PromptGenerationResult {
        let started = Instant::now();
        let deadline = Duration::from_millis(self.settings.max_generation_time);

        let mut tasks = Vec::with_capacity(self.providers.len());
        for provider in &self.providers {
            let provider = Arc::clone(provider);
            let task_context = context.clone();
            tasks.push((
                provider.name().to_string(),
                tokio::spawn(async move {
                    let call_started = Instant::now();
                    let outcome = timeout(deadline, provider.generate_content(&task_context)).await;
                    (outcome, call_started.elapsed())
                }),
            ));
        }

        // Every task is bounded by its own deadline, so joining in provider
        // order cannot hold the call open past the deadline plus merge
        // overhead. Buffering keeps the merge in priority order regardless of
        // completion order.
        let mut provider_results = Vec::with_capacity(tasks.len());
        let mut errors = Vec::new();
        for (name, task) in tasks {
            let result = match task.await {
                Ok((Ok(Ok(content)), elapsed)) => ProviderResult {
                    provider_id: name,
                    content,
                    success: true,
                    error: None,
                    generation_time_ms: elapsed.as_millis() as u64,
                },
                Ok((Ok(Err(err)), elapsed)) => {
                    warn!(provider = %name, error = %err, "prompt provider failed");
                    errors.push(err.to_string());
                    ProviderResult {
                        provider_id: name,
                        content: String::new(),
                        success: false,
                        error: Some(err.to_string()),
                        generation_time_ms: elapsed.as_millis() as u64,
                    }
                }
                Ok((Err(_elapsed), elapsed)) => {
                    let err = PromptError::GenerationTimeout(name.clone());
                    warn!(provider = %name, deadline_ms = self.settings.max_generation_time, "prompt provider timed out");
                    errors.push(err.to_string());
                    ProviderResult {
                        provider_id: name,
                        content: String::new(),
                        success: false,
                        error: Some(err.to_string()),
                        generation_time_ms: elapsed.as_millis() as u64,
                    }
                }
                Err(join_err) => {
                    let reason = format!("provider task failed: {join_err}");
                    warn!(provider = %name, error = %reason, "prompt provider task aborted");
                    errors.push(reason.clone());
                    ProviderResult {
                        provider_id: name,
                        content: String::new(),
                        success: false,
                        error: Some(reason),
                        generation_time_ms: started.elapsed().as_millis() as u64,
                    }
                }
            };
            provider_results.push(result);
        }

        let content = provider_results
            .iter()
            .filter(|result| result.success)
            .map(|result| result.content.as_str())
            .collect::<Vec<_>>()
            .join(&self.settings.content_separator);
        let success = errors.is_empty() || !self.settings.fail_on_provider_error;
        let generation_time_ms = started.elapsed().as_millis() as u64;

        {
            let mut stats = self.stats.lock();
            stats.total_generations += 1;
            stats.total_time_ms += generation_time_ms;
        }
        debug!(
            providers = provider_results.len(),
            elapsed_ms = generation_time_ms,
            success,
            "assembled system prompt"
        );

        PromptGenerationResult {
            content,
            provider_results,
            generation_time_ms,
            success,
            errors,
        }
    }

    pub fn get_performance_stats(&self) -> PerformanceStats {
        let stats = self.stats.lock();
        let average_generation_time = if stats.total_generations == 0 {
            0.0
        } else {
            stats.total_time_ms as f64 / stats.total_generations as f64
        };
        PerformanceStats {
            average_generation_time,
            total_generations: stats.total_generations,
            total_providers: self.configured_providers,
            enabled_providers: self.providers.len(),
        }
    }

    /// Destroy all providers, releasing watches and other resources.
    pub async fn shutdown(&self) {
        for provider in &self.providers {
            if let Err(err) = provider.destroy().await {
                warn!(provider = %provider.name(), error = %err, "failed to destroy provider");
            }
        }
    }
}
