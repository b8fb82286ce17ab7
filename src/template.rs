//! Token substitution for prompt templates and configuration values
//!
//! Two token syntaxes exist, deliberately with the same pass-through policy:
//! `{{name}}` is resolved from a provider's variables map at generation time,
//! `${NAME}` is resolved from environment variables at config-load time.
//! Unresolved tokens are left verbatim in both cases, never treated as errors.

use indexmap::IndexMap;
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use serde_json::Value;
use std::collections::HashMap;

static TEMPLATE_TOKEN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{\{\s*([A-Za-z0-9_.-]+)\s*\}\}").unwrap());

static ENV_TOKEN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)\}").unwrap());

/// Render a JSON value the way it should appear inside prompt text:
/// strings without quotes, everything else in its JSON form.
pub fn render_value(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

/// Substitute `{{name}}` tokens from the variables map.
pub fn substitute_variables(input: &str, variables: &IndexMap<String, Value>) -> String {
    TEMPLATE_TOKEN
        .replace_all(input, |caps: &Captures<'_>| match variables.get(&caps[1]) {
            Some(value) => render_value(value),
            None => caps[0].to_string(),
        })
        .into_owned()
}

/// Substitute `${NAME}` tokens in one string from the environment map.
pub fn substitute_env_str(input: &str, env: &HashMap<String, String>) -> String {
    ENV_TOKEN
        .replace_all(input, |caps: &Captures<'_>| match env.get(&caps[1]) {
            Some(value) => value.clone(),
            None => caps[0].to_string(),
        })
        .into_owned()
}

/// Recursively substitute `${NAME}` tokens in every string value of a JSON
/// tree. Keys are left untouched; only values are rewritten.
pub fn substitute_env(value: &mut Value, env: &HashMap<String, String>) {
    match value {
        Value::String(text) => *text = substitute_env_str(text, env),
        Value::Array(items) => {
            for item in items {
                substitute_env(item, env);
            }
        }
        Value::Object(entries) => {
            for (_, entry) in entries.iter_mut() {
                substitute_env(entry, env);
            }
        }
        _ => {}
    }
}
