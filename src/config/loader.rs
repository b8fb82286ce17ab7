//! Configuration loading, substitution, validation, and provider set-up

use serde_json::Value;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

use crate::config::types::{
    DynamicProviderConfig, EngineSettings, FileProviderConfig, StaticProviderConfig,
    SystemPromptConfig,
};
use crate::engine::PromptEngine;
use crate::error::{PromptError, Result};
use crate::providers::{PromptProvider, ProviderFactory, ProviderFailure};
use crate::template;

const KNOWN_PROVIDER_TYPES: [&str; 3] = ["static", "dynamic", "file-based"];

/// Options for a load call.
#[derive(Debug, Clone)]
pub struct LoadOptions {
    /// Resolves relative config file paths, and serves as the default
    /// `baseDir` for file-based providers that do not set their own
    pub base_dir: Option<PathBuf>,
    /// Environment variables for `${NAME}` substitution; falls back to the
    /// process environment when unset
    pub env_overrides: Option<HashMap<String, String>>,
    /// Skip structural validation for trusted, pre-validated configs
    pub validate: bool,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            base_dir: None,
            env_overrides: None,
            validate: true,
        }
    }
}

/// Loads a [`SystemPromptConfig`], constructs its providers, and hands the
/// active set to the engine.
///
/// Pipeline: parse → `${NAME}` substitution over every string value →
/// structural validation (all-or-nothing, no partial acceptance) → settings
/// defaults → provider construction with per-provider failure capture.
/// A reload replaces the provider set wholesale, never patches it in place.
pub struct PromptConfigManager {
    config: SystemPromptConfig,
    providers: Vec<Arc<dyn PromptProvider>>,
    failures: Vec<ProviderFailure>,
}

impl std::fmt::Debug for PromptConfigManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PromptConfigManager")
            .field("config", &self.config)
            .field(
                "providers",
                &self.providers.iter().map(|p| p.name()).collect::<Vec<_>>(),
            )
            .field("failures", &self.failures)
            .finish()
    }
}

impl PromptConfigManager {
    /// Load from an in-memory JSON-compatible value.
    pub async fn load_from_object(value: Value, options: LoadOptions) -> Result<Self> {
        let mut value = value;
        let env = options
            .env_overrides
            .clone()
            .unwrap_or_else(|| std::env::vars().collect());
        template::substitute_env(&mut value, &env);
        if let Some(base_dir) = &options.base_dir {
            apply_default_base_dir(&mut value, base_dir);
        }
        if options.validate {
            validate_config_value(&value)?;
        }

        let config: SystemPromptConfig =
            serde_json::from_value(value).map_err(|err| PromptError::ConfigValidation {
                path: "$".to_string(),
                reason: err.to_string(),
            })?;
        let (providers, failures) = ProviderFactory::build_active_set(&config.providers).await;
        debug!(
            providers = providers.len(),
            failed = failures.len(),
            "loaded system prompt configuration"
        );
        Ok(Self {
            config,
            providers,
            failures,
        })
    }

    /// Load from a JSON, TOML, or YAML file, chosen by extension.
    pub async fn load_from_file(path: impl AsRef<Path>, options: LoadOptions) -> Result<Self> {
        let path = path.as_ref();
        let resolved = match (&options.base_dir, path.is_absolute()) {
            (Some(base_dir), false) => base_dir.join(path),
            _ => path.to_path_buf(),
        };
        let raw = std::fs::read_to_string(&resolved).map_err(|err| PromptError::ConfigIo {
            path: resolved.clone(),
            source: err,
        })?;
        let value = parse_config_text(&resolved, &raw)?;

        // File-based providers default their baseDir to the config file's
        // directory when the caller did not pass one.
        let options = if options.base_dir.is_none() {
            LoadOptions {
                base_dir: resolved.parent().map(Path::to_path_buf),
                ..options
            }
        } else {
            options
        };
        Self::load_from_object(value, options).await
    }

    /// Active, enabled providers sorted by descending priority.
    pub fn get_enabled_providers(&self) -> &[Arc<dyn PromptProvider>] {
        &self.providers
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.config.settings
    }

    pub fn config(&self) -> &SystemPromptConfig {
        &self.config
    }

    /// Providers excluded at construction/initialize time.
    pub fn failures(&self) -> &[ProviderFailure] {
        &self.failures
    }

    /// Move the active set into a generation engine.
    pub fn build_engine(self) -> PromptEngine {
        let configured = self.config.providers.len();
        PromptEngine::with_diagnostics(
            self.providers,
            self.config.settings.clone(),
            self.failures,
            configured,
        )
    }

    /// Destroy the current providers and replace everything with a fresh
    /// load of the given file.
    pub async fn reload_from_file(
        &mut self,
        path: impl AsRef<Path>,
        options: LoadOptions,
    ) -> Result<()> {
        let next = Self::load_from_file(path, options).await?;
        self.shutdown().await;
        *self = next;
        Ok(())
    }

    pub async fn shutdown(&self) {
        for provider in &self.providers {
            let _ = provider.destroy().await;
        }
    }
}

fn parse_config_text(path: &Path, raw: &str) -> Result<Value> {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .unwrap_or("json")
        .to_ascii_lowercase();
    let parsed = match extension.as_str() {
        "toml" => toml::from_str::<toml::Value>(raw)
            .map_err(|err| err.to_string())
            .and_then(|value| serde_json::to_value(value).map_err(|err| err.to_string())),
        "yaml" | "yml" => serde_yaml::from_str::<Value>(raw).map_err(|err| err.to_string()),
        _ => serde_json::from_str::<Value>(raw).map_err(|err| err.to_string()),
    };
    parsed.map_err(|reason| PromptError::ConfigParse {
        path: path.to_path_buf(),
        reason,
    })
}

/// Fill in `baseDir` for file-based provider payloads that lack one.
fn apply_default_base_dir(root: &mut Value, base_dir: &Path) {
    let Some(providers) = root.get_mut("providers").and_then(Value::as_array_mut) else {
        return;
    };
    for entry in providers {
        if entry.get("type").and_then(Value::as_str) != Some("file-based") {
            continue;
        }
        let Some(payload) = entry.get_mut("config").and_then(Value::as_object_mut) else {
            continue;
        };
        if !payload.contains_key("baseDir") {
            payload.insert(
                "baseDir".to_string(),
                Value::String(base_dir.to_string_lossy().into_owned()),
            );
        }
    }
}

/// Structural validation with field-path error reporting. All-or-nothing:
/// the first violation fails the whole load.
fn validate_config_value(root: &Value) -> Result<()> {
    let document = root
        .as_object()
        .ok_or_else(|| PromptError::validation("$", "configuration must be an object"))?;

    let providers = document
        .get("providers")
        .ok_or_else(|| PromptError::validation("providers", "required field is missing"))?;
    let providers = providers
        .as_array()
        .ok_or_else(|| PromptError::validation("providers", "must be an array"))?;

    let mut seen_names: HashSet<&str> = HashSet::new();
    for (index, entry) in providers.iter().enumerate() {
        let entry_path = format!("providers[{index}]");
        let entry = entry.as_object().ok_or_else(|| {
            PromptError::validation(&entry_path, "provider entry must be an object")
        })?;

        let name = entry
            .get("name")
            .and_then(Value::as_str)
            .filter(|name| !name.is_empty())
            .ok_or_else(|| {
                PromptError::validation(
                    format!("{entry_path}.name"),
                    "must be a non-empty string",
                )
            })?;
        if !seen_names.insert(name) {
            return Err(PromptError::validation(
                format!("{entry_path}.name"),
                format!("duplicate provider name `{name}`"),
            ));
        }

        let kind = entry
            .get("type")
            .and_then(Value::as_str)
            .ok_or_else(|| PromptError::validation(format!("{entry_path}.type"), "required field is missing"))?;
        if !KNOWN_PROVIDER_TYPES.contains(&kind) {
            return Err(PromptError::validation(
                format!("{entry_path}.type"),
                format!("unknown provider type `{kind}`"),
            ));
        }

        if entry.get("priority").and_then(Value::as_i64).is_none() {
            return Err(PromptError::validation(
                format!("{entry_path}.priority"),
                "must be an integer",
            ));
        }
        if let Some(enabled) = entry.get("enabled") {
            if !enabled.is_boolean() {
                return Err(PromptError::validation(
                    format!("{entry_path}.enabled"),
                    "must be a boolean",
                ));
            }
        }

        let payload = entry.get("config").cloned().unwrap_or(Value::Null);
        let payload_path = format!("{entry_path}.config");
        match kind {
            "static" => {
                StaticProviderConfig::from_value(&payload_path, &payload)?;
            }
            "dynamic" => {
                DynamicProviderConfig::from_value(&payload_path, &payload)?;
            }
            "file-based" => {
                FileProviderConfig::from_value(&payload_path, &payload)?;
            }
            _ => unreachable!("type checked above"),
        }
    }

    if let Some(settings) = document.get("settings") {
        let settings = settings
            .as_object()
            .ok_or_else(|| PromptError::validation("settings", "must be an object"))?;
        if let Some(value) = settings.get("maxGenerationTime") {
            if value.as_u64().is_none() {
                return Err(PromptError::validation(
                    "settings.maxGenerationTime",
                    "must be a non-negative integer (milliseconds)",
                ));
            }
        }
        if let Some(value) = settings.get("failOnProviderError") {
            if !value.is_boolean() {
                return Err(PromptError::validation(
                    "settings.failOnProviderError",
                    "must be a boolean",
                ));
            }
        }
        if let Some(value) = settings.get("contentSeparator") {
            if !value.is_string() {
                return Err(PromptError::validation(
                    "settings.contentSeparator",
                    "must be a string",
                ));
            }
        }
    }

    Ok(())
}
