//! Provider backed by a named generator function

use async_trait::async_trait;
use indexmap::IndexMap;
use serde_json::Value;

use crate::config::{DynamicProviderConfig, ProviderKind};
use crate::context::ProviderContext;
use crate::error::{PromptError, Result};
use crate::generators;
use crate::providers::PromptProvider;
use crate::template::substitute_variables;

/// Invokes a generator from the process-wide registry.
///
/// The lookup happens on every call, never at construction time, so a
/// generator registered after this provider was built still resolves as long
/// as registration completes before the generation call.
pub struct DynamicProvider {
    name: String,
    priority: i64,
    config: DynamicProviderConfig,
}

impl DynamicProvider {
    pub fn new(name: impl Into<String>, priority: i64, config: DynamicProviderConfig) -> Self {
        Self {
            name: name.into(),
            priority,
            config,
        }
    }
}

#[async_trait]
impl PromptProvider for DynamicProvider {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> ProviderKind {
        ProviderKind::Dynamic
    }

    fn priority(&self) -> i64 {
        self.priority
    }

    async fn generate_content(&self, context: &ProviderContext) -> Result<String> {
        let generator = generators::lookup_generator(&self.config.generator)
            .ok_or_else(|| PromptError::GeneratorNotFound(self.config.generator.clone()))?;
        let output = generator(context.clone(), self.config.generator_config.clone()).await?;

        match &self.config.template {
            Some(template) => {
                let mut variables = IndexMap::new();
                variables.insert("content".to_string(), Value::String(output));
                Ok(substitute_variables(template, &variables))
            }
            None => Ok(output),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn missing_generator_fails_at_call_time() {
        let config = DynamicProviderConfig::from_value(
            "config",
            &json!({"generator": "never-registered-gen"}),
        )
        .unwrap();
        let provider = DynamicProvider::new("dyn", 10, config);

        let err = provider
            .generate_content(&ProviderContext::new())
            .await
            .expect_err("lookup must fail");
        assert!(matches!(err, PromptError::GeneratorNotFound(name) if name == "never-registered-gen"));
    }

    #[tokio::test]
    async fn template_wraps_generator_output() {
        generators::register_generator("dynamic-test-echo", |_context, config| async move {
            Ok(config["text"].as_str().unwrap_or_default().to_string())
        });
        let config = DynamicProviderConfig::from_value(
            "config",
            &json!({
                "generator": "dynamic-test-echo",
                "generatorConfig": {"text": "inner"},
                "template": "## Section\n{{content}}"
            }),
        )
        .unwrap();
        let provider = DynamicProvider::new("dyn", 10, config);

        let output = provider
            .generate_content(&ProviderContext::new())
            .await
            .unwrap();
        assert_eq!(output, "## Section\ninner");
    }
}
