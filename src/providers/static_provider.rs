//! Fixed-content provider with variable substitution

use async_trait::async_trait;

use crate::config::{ProviderKind, StaticProviderConfig};
use crate::context::ProviderContext;
use crate::error::Result;
use crate::providers::PromptProvider;
use crate::template::substitute_variables;

/// Emits `config.content` with `{{var}}` tokens substituted from
/// `config.variables`. Deterministic, no I/O; unresolved tokens pass through
/// verbatim.
pub struct StaticProvider {
    name: String,
    priority: i64,
    config: StaticProviderConfig,
}

impl StaticProvider {
    pub fn new(name: impl Into<String>, priority: i64, config: StaticProviderConfig) -> Self {
        Self {
            name: name.into(),
            priority,
            config,
        }
    }
}

#[async_trait]
impl PromptProvider for StaticProvider {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> ProviderKind {
        ProviderKind::Static
    }

    fn priority(&self) -> i64 {
        self.priority
    }

    async fn generate_content(&self, _context: &ProviderContext) -> Result<String> {
        Ok(substitute_variables(
            &self.config.content,
            &self.config.variables,
        ))
    }
}
