//! Error taxonomy for configuration loading and prompt generation

use std::path::PathBuf;

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, PromptError>;

/// Errors produced while loading configuration or generating prompt content.
///
/// Construction-time failures (`ConfigValidation`, `ProviderInit`) never reach
/// `generate()` callers; call-time failures (`GeneratorNotFound`, `FileRead`,
/// `GenerationTimeout`) are captured per provider in the aggregate result.
#[derive(Debug, thiserror::Error)]
pub enum PromptError {
    /// Structural configuration problem. `path` points at the offending field,
    /// e.g. `providers[2].config.generator`.
    #[error("invalid configuration at `{path}`: {reason}")]
    ConfigValidation { path: String, reason: String },

    #[error("failed to read configuration file {}", path.display())]
    ConfigIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse configuration file {}: {reason}", path.display())]
    ConfigParse { path: PathBuf, reason: String },

    /// A single provider failed validation or initialization. The provider is
    /// excluded from the active set; loading otherwise succeeds.
    #[error("provider `{name}` failed to initialize: {reason}")]
    ProviderInit { name: String, reason: String },

    /// A dynamic provider's named generator was not registered at call time.
    #[error("generator `{0}` is not registered")]
    GeneratorNotFound(String),

    /// A file-based provider's source is unreadable and no cached content
    /// exists to fall back to.
    #[error("failed to read prompt file {}", path.display())]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A provider exceeded the per-call generation deadline.
    #[error("provider `{0}` exceeded the generation deadline")]
    GenerationTimeout(String),

    /// The enhanced generation path was used before being enabled.
    #[error("enhanced prompt generation is not enabled")]
    EnhancedModeDisabled,
}

impl PromptError {
    pub(crate) fn validation(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::ConfigValidation {
            path: path.into(),
            reason: reason.into(),
        }
    }
}
