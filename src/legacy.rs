//! Backward-compatible facade over the provider-based engine
//!
//! [`SystemPromptManager`] keeps the pre-refactor contract alive: a user
//! instruction concatenated with the built-in instruction block, computed
//! synchronously with no providers involved. The provider-based engine only
//! participates when enhanced mode is explicitly enabled, and the two paths
//! stay structurally independent. This is the only type in the crate that
//! picks between two execution strategies based on a mode flag.

use serde_json::Value;

use crate::config::{LoadOptions, PromptConfigManager, SystemPromptConfig};
use crate::context::ProviderContext;
use crate::engine::{PromptEngine, PromptGenerationResult};
use crate::error::{PromptError, Result};
use crate::generators::register_builtin_generators;

/// Separator used by the legacy single-string contract.
const LEGACY_SEPARATOR: &str = "\n\n";

/// Instruction block appended to every legacy prompt. The exact bytes are
/// part of the compatibility contract; see `tests/legacy_manager.rs`.
pub const BUILT_IN_INSTRUCTIONS: &str = r#"## CORE BEHAVIOR
- Follow the user's instructions precisely and ask for clarification when a request is ambiguous.
- Ground every answer in the provided context; never invent files, APIs, or facts.
- Prefer small, verifiable steps over sweeping changes, and explain what you changed and why.
- Respect the boundaries of the active workspace; ask before touching anything outside it.

## OUTPUT
- Return plain text and let the interface handle styling.
- Keep responses focused; lead with the outcome before supporting detail.
- When you are unsure, say so explicitly instead of guessing."#;

/// Legacy system prompt manager.
pub struct SystemPromptManager {
    instruction: String,
    engine: Option<PromptEngine>,
}

impl Default for SystemPromptManager {
    fn default() -> Self {
        Self::new()
    }
}

impl SystemPromptManager {
    pub fn new() -> Self {
        Self {
            instruction: String::new(),
            engine: None,
        }
    }

    /// Load the user instruction string. Pre-refactor signature, kept as-is.
    pub fn load(&mut self, instruction: impl Into<String>) {
        self.instruction = instruction.into();
    }

    /// The legacy two-field contract: `instruction + separator + built-ins`.
    /// Synchronous, no provider fan-out, byte-stable across releases. This
    /// path works the same whether or not enhanced mode is enabled and can
    /// never surface provider errors.
    pub fn get_complete_system_prompt(&self) -> String {
        format!("{}{LEGACY_SEPARATOR}{BUILT_IN_INSTRUCTIONS}", self.instruction)
    }

    /// Whether the enhanced provider-based path is available.
    pub fn is_enhanced(&self) -> bool {
        self.engine.is_some()
    }

    /// Opt in to provider-based generation. Registers the built-in
    /// generators, loads the given configuration, and keeps the legacy
    /// synchronous path working unchanged alongside.
    pub async fn enable_enhanced(&mut self, config: SystemPromptConfig) -> Result<()> {
        register_builtin_generators();
        let value: Value =
            serde_json::to_value(&config).map_err(|err| PromptError::ConfigValidation {
                path: "$".to_string(),
                reason: err.to_string(),
            })?;
        let manager = PromptConfigManager::load_from_object(value, LoadOptions::default()).await?;
        self.engine = Some(manager.build_engine());
        Ok(())
    }

    /// Async enhanced path, delegating to the engine.
    pub async fn generate_enhanced(
        &self,
        context: &ProviderContext,
    ) -> Result<PromptGenerationResult> {
        match &self.engine {
            Some(engine) => Ok(engine.generate(context).await),
            None => Err(PromptError::EnhancedModeDisabled),
        }
    }

    /// Access the underlying engine when enhanced mode is enabled, e.g. for
    /// performance statistics.
    pub fn engine(&self) -> Option<&PromptEngine> {
        self.engine.as_ref()
    }
}
