//! # promptweave — composable system prompt assembly
//!
//! `promptweave` assembles the system prompt for an LLM-driven agent from a
//! configurable set of content providers, invoked concurrently and merged in
//! priority order.
//!
//! ## Highlights
//!
//! - **Provider Abstraction**: one capability contract over static text,
//!   registry-backed dynamic generators, and watched prompt-fragment files;
//!   new variants plug into a single factory.
//! - **Deterministic Merge**: all providers fan out concurrently under a
//!   per-provider deadline, results are buffered and joined in descending
//!   priority order, never completion order.
//! - **Failure Isolation**: a misconfigured or failing provider degrades the
//!   output instead of breaking the call; `failOnProviderError` controls
//!   whether failures flip the aggregate success flag.
//! - **Configuration-First**: providers are declared in a JSON-compatible
//!   document (TOML and YAML accepted on the file path), with `${NAME}`
//!   environment substitution and field-path validation errors.
//! - **Legacy Compatibility**: [`SystemPromptManager`] reproduces the
//!   pre-refactor single-string prompt byte-for-byte, with the provider
//!   engine available behind an explicit opt-in.
//!
//! ## Quickstart
//!
//! ```rust,ignore
//! use promptweave::{LoadOptions, PromptConfigManager, ProviderContext};
//!
//! #[tokio::main]
//! async fn main() -> promptweave::Result<()> {
//!     promptweave::register_builtin_generators();
//!     let manager = PromptConfigManager::load_from_file(
//!         "prompts/providers.json",
//!         LoadOptions::default(),
//!     )
//!     .await?;
//!     let engine = manager.build_engine();
//!     let result = engine.generate(&ProviderContext::for_session("s-1")).await;
//!     println!("{}", result.content);
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod context;
pub mod engine;
pub mod error;
pub mod generators;
pub mod legacy;
pub mod providers;
pub mod template;

pub use config::{
    EngineSettings, LoadOptions, PromptConfigManager, ProviderConfig, ProviderKind,
    SystemPromptConfig,
};
pub use context::ProviderContext;
pub use engine::{PerformanceStats, PromptEngine, PromptGenerationResult, ProviderResult};
pub use error::{PromptError, Result};
pub use generators::{
    register_builtin_generators, register_generator, registered_generators, reset_generators,
};
pub use legacy::{BUILT_IN_INSTRUCTIONS, SystemPromptManager};
pub use providers::{PromptProvider, ProviderFactory, ProviderFailure};
