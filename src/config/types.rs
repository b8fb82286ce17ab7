//! Configuration schema for the prompt composition engine
//!
//! The wire format is camelCase JSON (TOML and YAML documents with the same
//! shape are accepted on the file-loading path). Variant payloads are kept as
//! raw JSON in [`ProviderConfig::config`] and parsed into the typed structs
//! below when a provider is validated and constructed.

use indexmap::IndexMap;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::path::{Path, PathBuf};

use crate::error::{PromptError, Result};

/// Discriminant for the three provider variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProviderKind {
    Static,
    Dynamic,
    FileBased,
}

impl ProviderKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Static => "static",
            Self::Dynamic => "dynamic",
            Self::FileBased => "file-based",
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One declarative provider entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderConfig {
    /// Unique name within a loaded configuration
    pub name: String,
    #[serde(rename = "type")]
    pub kind: ProviderKind,
    /// Higher priority merges earlier; ties keep config order
    pub priority: i64,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// Variant-specific payload, parsed on construction
    #[serde(default)]
    pub config: Value,
}

fn default_enabled() -> bool {
    true
}

/// Engine-level settings with defaults filled in when absent.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EngineSettings {
    /// Per-provider generation deadline in milliseconds
    #[serde(default = "default_max_generation_time")]
    pub max_generation_time: u64,
    /// When true, any provider failure flips the aggregate `success` flag
    #[serde(default)]
    pub fail_on_provider_error: bool,
    /// Inserted between merged provider contents
    #[serde(default = "default_content_separator")]
    pub content_separator: String,
}

fn default_max_generation_time() -> u64 {
    5000
}

fn default_content_separator() -> String {
    "\n\n".to_string()
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            max_generation_time: default_max_generation_time(),
            fail_on_provider_error: false,
            content_separator: default_content_separator(),
        }
    }
}

/// Root configuration document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemPromptConfig {
    #[serde(default)]
    pub providers: Vec<ProviderConfig>,
    #[serde(default)]
    pub settings: EngineSettings,
}

impl Default for SystemPromptConfig {
    fn default() -> Self {
        Self {
            providers: Vec::new(),
            settings: EngineSettings::default(),
        }
    }
}

/// Parse a variant payload, reporting failures against `field_path`.
pub(crate) fn parse_payload<T: DeserializeOwned>(field_path: &str, payload: &Value) -> Result<T> {
    let payload = if payload.is_null() {
        Value::Object(serde_json::Map::new())
    } else {
        payload.clone()
    };
    serde_json::from_value(payload).map_err(|err| PromptError::ConfigValidation {
        path: field_path.to_string(),
        reason: err.to_string(),
    })
}

/// Payload for `type = "static"` providers.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StaticProviderConfig {
    pub content: String,
    #[serde(default)]
    pub variables: IndexMap<String, Value>,
}

impl StaticProviderConfig {
    pub fn from_value(field_path: &str, payload: &Value) -> Result<Self> {
        parse_payload(field_path, payload)
    }
}

/// Payload for `type = "dynamic"` providers.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DynamicProviderConfig {
    /// Name resolved against the generator registry at call time
    pub generator: String,
    #[serde(default)]
    pub generator_config: Value,
    /// Optional wrapper; the generator output replaces `{{content}}`
    #[serde(default)]
    pub template: Option<String>,
}

impl DynamicProviderConfig {
    pub fn from_value(field_path: &str, payload: &Value) -> Result<Self> {
        parse_payload(field_path, payload)
    }
}

/// Payload for `type = "file-based"` providers.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileProviderConfig {
    pub file_path: PathBuf,
    #[serde(default)]
    pub base_dir: Option<PathBuf>,
    #[serde(default)]
    pub watch_for_changes: bool,
    #[serde(default = "default_encoding")]
    pub encoding: String,
    #[serde(default)]
    pub variables: IndexMap<String, Value>,
}

fn default_encoding() -> String {
    "utf-8".to_string()
}

impl FileProviderConfig {
    pub fn from_value(field_path: &str, payload: &Value) -> Result<Self> {
        let config: Self = parse_payload(field_path, payload)?;
        match config.encoding.as_str() {
            "utf-8" | "utf8" | "utf-8-lossy" => Ok(config),
            other => Err(PromptError::ConfigValidation {
                path: format!("{field_path}.encoding"),
                reason: format!("unsupported encoding `{other}`"),
            }),
        }
    }

    /// Absolute paths are used as-is; relative paths resolve against
    /// `base_dir` (or the process working directory when unset).
    pub fn resolved_path(&self) -> PathBuf {
        if self.file_path.is_absolute() {
            return self.file_path.clone();
        }
        match &self.base_dir {
            Some(base) => base.join(&self.file_path),
            None => Path::new(".").join(&self.file_path),
        }
    }
}
