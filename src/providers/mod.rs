//! Provider abstraction and the three built-in variants
//!
//! A provider contributes one text fragment to the assembled system prompt.
//! Variants are constructed from validated configuration by the
//! [`ProviderFactory`] and driven through a fixed lifecycle:
//! construct (pure validation) → `initialize` (resource acquisition) →
//! `generate_content` (many times) → `destroy` (idempotent release).

mod dynamic;
mod factory;
mod file_based;
mod static_provider;

pub use dynamic::DynamicProvider;
pub use factory::{ProviderFactory, ProviderFailure};
pub use file_based::FileBasedProvider;
pub use static_provider::StaticProvider;

use async_trait::async_trait;

use crate::config::ProviderKind;
use crate::context::ProviderContext;
use crate::error::Result;

/// Contract shared by all prompt content providers.
///
/// Providers are shared as `Arc<dyn PromptProvider>` once active, so resource
/// handles live behind interior mutability and every method takes `&self`.
/// `generate_content` must not assume any ordering relative to other
/// providers; the engine invokes all active providers concurrently.
#[async_trait]
pub trait PromptProvider: Send + Sync {
    /// Unique name from the configuration entry
    fn name(&self) -> &str;

    fn kind(&self) -> ProviderKind;

    /// Merge position: higher priorities appear earlier in the output
    fn priority(&self) -> i64;

    /// One-time setup, e.g. installing a file watch. Failure excludes the
    /// provider for this load cycle without aborting the load.
    async fn initialize(&self) -> Result<()> {
        Ok(())
    }

    /// Produce this provider's prompt fragment for one generation call.
    async fn generate_content(&self, context: &ProviderContext) -> Result<String>;

    /// Release held resources. Safe to call more than once.
    async fn destroy(&self) -> Result<()> {
        Ok(())
    }
}
