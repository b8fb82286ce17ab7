//! Built-in generators shipped with the crate
//!
//! Each generator parses its `generatorConfig` leniently with serde defaults;
//! a malformed config is a call-time failure captured on that provider only.

use indexmap::IndexMap;
use serde::Deserialize;
use serde_json::Value;

use crate::config::parse_payload;
use crate::context::ProviderContext;
use crate::error::Result;
use crate::generators::register_generator;
use crate::template::render_value;

/// Register every built-in generator. Idempotent; later application-level
/// registrations under the same names take precedence.
pub fn register_builtin_generators() {
    register_generator("timestamp", |context, config| async move {
        timestamp(&context, &config)
    });
    register_generator("session-context", |context, config| async move {
        session_context(&context, &config)
    });
    register_generator("memory-context", |context, config| async move {
        memory_context(&context, &config)
    });
    register_generator("environment", |context, config| async move {
        environment(&context, &config)
    });
    register_generator("conditional", |context, config| async move {
        conditional(&context, &config)
    });
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TimestampConfig {
    #[serde(default = "default_timestamp_format")]
    format: String,
    #[serde(default)]
    include_timezone: bool,
}

fn default_timestamp_format() -> String {
    "iso".to_string()
}

fn timestamp(context: &ProviderContext, config: &Value) -> Result<String> {
    let config: TimestampConfig = parse_payload("generatorConfig", config)?;
    let mut rendered = match config.format.as_str() {
        "iso" => return Ok(context.timestamp.to_rfc3339()),
        // C-locale `%c` layout
        "locale" => context.timestamp.format("%a %b %e %H:%M:%S %Y").to_string(),
        custom => context.timestamp.format(custom).to_string(),
    };
    if config.include_timezone {
        rendered.push_str(" UTC");
    }
    Ok(rendered)
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SessionContextConfig {
    #[serde(default = "default_session_fields")]
    include_fields: Vec<String>,
    #[serde(default = "default_session_format")]
    format: String,
}

fn default_session_fields() -> Vec<String> {
    vec!["userId".to_string(), "sessionId".to_string()]
}

fn default_session_format() -> String {
    "list".to_string()
}

fn session_field_label(field: &str) -> &str {
    match field {
        "userId" | "user_id" => "User",
        "sessionId" | "session_id" => "Session",
        "timestamp" => "Time",
        other => other,
    }
}

fn session_context(context: &ProviderContext, config: &Value) -> Result<String> {
    let config: SessionContextConfig = parse_payload("generatorConfig", config)?;
    let pairs: Vec<(String, String)> = config
        .include_fields
        .iter()
        .filter_map(|field| {
            context
                .field(field)
                .map(|value| (session_field_label(field).to_string(), render_value(&value)))
        })
        .collect();

    if pairs.is_empty() {
        return Ok("No session information available.".to_string());
    }
    let rendered = match config.format.as_str() {
        "sentence" => {
            let mut sentence = pairs
                .iter()
                .map(|(label, value)| format!("{label} {value}"))
                .collect::<Vec<_>>()
                .join(", ");
            sentence.push('.');
            sentence
        }
        // "list" and anything unrecognized
        _ => pairs
            .iter()
            .map(|(label, value)| format!("- {label}: {value}"))
            .collect::<Vec<_>>()
            .join("\n"),
    };
    Ok(rendered)
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MemoryContextConfig {
    #[serde(default = "default_memory_max_entries")]
    max_entries: usize,
    #[serde(default = "default_memory_heading")]
    heading: String,
}

fn default_memory_max_entries() -> usize {
    10
}

fn default_memory_heading() -> String {
    "Relevant memory context:".to_string()
}

fn memory_context(context: &ProviderContext, config: &Value) -> Result<String> {
    let config: MemoryContextConfig = parse_payload("generatorConfig", config)?;
    if context.memory_context.is_empty() {
        return Ok("No relevant memory context is available.".to_string());
    }
    let mut lines = vec![config.heading];
    for (key, value) in context.memory_context.iter().take(config.max_entries) {
        lines.push(format!("- {key}: {}", render_value(value)));
    }
    Ok(lines.join("\n"))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EnvironmentConfig {
    #[serde(default = "default_environment_tag")]
    environment: String,
    /// Overrides keyed by environment tag; falls back to built-in texts
    #[serde(default)]
    instructions: IndexMap<String, String>,
}

fn default_environment_tag() -> String {
    "development".to_string()
}

fn environment(_context: &ProviderContext, config: &Value) -> Result<String> {
    let config: EnvironmentConfig = parse_payload("generatorConfig", config)?;
    if let Some(text) = config.instructions.get(&config.environment) {
        return Ok(text.clone());
    }
    Ok(match config.environment.as_str() {
        "development" => {
            "You are running in a development environment. Verbose explanations and \
             experimental suggestions are acceptable."
                .to_string()
        }
        "staging" => {
            "You are running in a staging environment. Behave as in production, but \
             flag anything that looks like test data."
                .to_string()
        }
        "production" => {
            "You are running in a production environment. Be conservative, avoid \
             destructive suggestions, and never expose internal details."
                .to_string()
        }
        other => format!("Operating in the {other} environment."),
    })
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConditionalConfig {
    #[serde(default)]
    conditions: Vec<ConditionalClause>,
    #[serde(default, rename = "else")]
    fallback: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ConditionalClause {
    #[serde(rename = "if")]
    condition: Condition,
    then: String,
}

#[derive(Debug, Deserialize)]
struct Condition {
    field: String,
    operator: ConditionOperator,
    #[serde(default)]
    value: Option<Value>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "camelCase")]
enum ConditionOperator {
    Exists,
    NotExists,
    Equals,
    NotEquals,
    Contains,
}

fn condition_matches(context: &ProviderContext, condition: &Condition) -> bool {
    let resolved = context
        .field(&condition.field)
        .filter(|value| !value.is_null());
    let expected = condition.value.clone().unwrap_or(Value::Null);
    match condition.operator {
        ConditionOperator::Exists => resolved.is_some(),
        ConditionOperator::NotExists => resolved.is_none(),
        ConditionOperator::Equals => resolved.as_ref() == Some(&expected),
        ConditionOperator::NotEquals => resolved.as_ref() != Some(&expected),
        ConditionOperator::Contains => match resolved {
            Some(Value::String(text)) => text.contains(&render_value(&expected)),
            Some(Value::Array(items)) => items.contains(&expected),
            _ => false,
        },
    }
}

fn conditional(context: &ProviderContext, config: &Value) -> Result<String> {
    let config: ConditionalConfig = parse_payload("generatorConfig", config)?;
    // First matching clause wins; order is significant.
    for clause in &config.conditions {
        if condition_matches(context, &clause.condition) {
            return Ok(clause.then.clone());
        }
    }
    Ok(config.fallback.unwrap_or_default())
}
