//! Configuration schema, loading, and validation

mod loader;
mod types;

pub use loader::{LoadOptions, PromptConfigManager};
pub use types::{
    DynamicProviderConfig, EngineSettings, FileProviderConfig, ProviderConfig, ProviderKind,
    StaticProviderConfig, SystemPromptConfig,
};

pub(crate) use types::parse_payload;
