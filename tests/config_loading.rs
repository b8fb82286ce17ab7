//! Integration tests for configuration loading, substitution, and validation

use std::collections::HashMap;
use std::fs;

use serde_json::json;

use promptweave::{LoadOptions, PromptConfigManager, PromptError, PromptProvider, ProviderContext};

fn no_env() -> LoadOptions {
    LoadOptions {
        env_overrides: Some(HashMap::new()),
        ..LoadOptions::default()
    }
}

#[tokio::test]
async fn environment_variables_substitute_into_string_values() {
    let options = LoadOptions {
        env_overrides: Some(HashMap::from([(
            "AGENT_NAME".to_string(),
            "Weave".to_string(),
        )])),
        ..LoadOptions::default()
    };
    let manager = PromptConfigManager::load_from_object(
        json!({
            "providers": [
                {"name": "id", "type": "static", "priority": 10,
                 "config": {"content": "I am ${AGENT_NAME}; ${NOT_SET} stays."}}
            ]
        }),
        options,
    )
    .await
    .unwrap();

    let result = manager.build_engine().generate(&ProviderContext::new()).await;
    assert_eq!(result.content, "I am Weave; ${NOT_SET} stays.");
}

#[tokio::test]
async fn duplicate_provider_names_fail_the_whole_load() {
    let err = PromptConfigManager::load_from_object(
        json!({
            "providers": [
                {"name": "dup", "type": "static", "priority": 1, "config": {"content": "a"}},
                {"name": "dup", "type": "static", "priority": 2, "config": {"content": "b"}}
            ]
        }),
        no_env(),
    )
    .await
    .expect_err("duplicate names are a structural violation");

    assert!(
        matches!(err, PromptError::ConfigValidation { ref path, .. } if path.as_str() == "providers[1].name")
    );
}

#[tokio::test]
async fn missing_variant_field_reports_the_config_path() {
    let err = PromptConfigManager::load_from_object(
        json!({
            "providers": [
                {"name": "dyn", "type": "dynamic", "priority": 1, "config": {}}
            ]
        }),
        no_env(),
    )
    .await
    .expect_err("generator is required for dynamic providers");

    let rendered = err.to_string();
    assert!(rendered.contains("providers[0].config"), "{rendered}");
    assert!(rendered.contains("generator"), "{rendered}");
}

#[tokio::test]
async fn settings_defaults_are_filled_in_when_absent() {
    let manager = PromptConfigManager::load_from_object(
        json!({
            "providers": [
                {"name": "a", "type": "static", "priority": 1, "config": {"content": "x"}}
            ]
        }),
        no_env(),
    )
    .await
    .unwrap();

    let settings = manager.settings();
    assert_eq!(settings.max_generation_time, 5000);
    assert!(!settings.fail_on_provider_error);
    assert_eq!(settings.content_separator, "\n\n");
}

#[tokio::test]
async fn enabled_providers_are_sorted_with_stable_ties() {
    let manager = PromptConfigManager::load_from_object(
        json!({
            "providers": [
                {"name": "tie-one", "type": "static", "priority": 50, "config": {"content": "a"}},
                {"name": "low", "type": "static", "priority": 1, "config": {"content": "b"}},
                {"name": "tie-two", "type": "static", "priority": 50, "config": {"content": "c"}},
                {"name": "high", "type": "static", "priority": 900, "config": {"content": "d"}},
                {"name": "off", "type": "static", "priority": 999, "enabled": false,
                 "config": {"content": "e"}}
            ]
        }),
        no_env(),
    )
    .await
    .unwrap();

    let names: Vec<_> = manager
        .get_enabled_providers()
        .iter()
        .map(|p| p.name().to_string())
        .collect();
    assert_eq!(names, ["high", "tie-one", "tie-two", "low"]);
}

#[tokio::test]
async fn invalid_provider_is_excluded_without_failing_the_load() {
    // A structurally valid entry can still fail construction when validation
    // is skipped; the load captures the failure instead of propagating it.
    let manager = PromptConfigManager::load_from_object(
        json!({
            "providers": [
                {"name": "good", "type": "static", "priority": 10, "config": {"content": "x"}},
                {"name": "bad", "type": "file-based", "priority": 5,
                 "config": {"filePath": "a.md", "encoding": "latin-1"}}
            ]
        }),
        LoadOptions {
            validate: false,
            ..no_env()
        },
    )
    .await
    .unwrap();

    assert_eq!(manager.get_enabled_providers().len(), 1);
    assert_eq!(manager.failures().len(), 1);
    assert_eq!(manager.failures()[0].name, "bad");
}

#[tokio::test]
async fn loads_toml_files_by_extension() {
    let dir = tempfile::tempdir().unwrap();
    let config_path = dir.path().join("prompts.toml");
    fs::write(
        &config_path,
        r#"
[settings]
contentSeparator = " | "

[[providers]]
name = "first"
type = "static"
priority = 100

[providers.config]
content = "alpha"

[[providers]]
name = "second"
type = "static"
priority = 10

[providers.config]
content = "beta"
"#,
    )
    .unwrap();

    let manager = PromptConfigManager::load_from_file(&config_path, no_env())
        .await
        .unwrap();
    let result = manager.build_engine().generate(&ProviderContext::new()).await;
    assert_eq!(result.content, "alpha | beta");
}

#[tokio::test]
async fn file_providers_default_base_dir_to_the_config_directory() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("fragment.md"), "from file").unwrap();
    let config_path = dir.path().join("prompts.json");
    fs::write(
        &config_path,
        serde_json::to_string(&json!({
            "providers": [
                {"name": "frag", "type": "file-based", "priority": 1,
                 "config": {"filePath": "fragment.md"}}
            ]
        }))
        .unwrap(),
    )
    .unwrap();

    let manager = PromptConfigManager::load_from_file(&config_path, no_env())
        .await
        .unwrap();
    let result = manager.build_engine().generate(&ProviderContext::new()).await;
    assert_eq!(result.content, "from file");
}

#[tokio::test]
async fn missing_config_file_is_an_io_error() {
    let err = PromptConfigManager::load_from_file("/definitely/not/here.json", no_env())
        .await
        .expect_err("file does not exist");
    assert!(matches!(err, PromptError::ConfigIo { .. }));
}

#[tokio::test]
async fn reload_replaces_the_provider_set_wholesale() {
    let dir = tempfile::tempdir().unwrap();
    let config_path = dir.path().join("prompts.json");
    let write_config = |content: &str| {
        fs::write(
            &config_path,
            serde_json::to_string(&json!({
                "providers": [
                    {"name": "only", "type": "static", "priority": 1,
                     "config": {"content": content}}
                ]
            }))
            .unwrap(),
        )
        .unwrap();
    };

    write_config("before");
    let mut manager = PromptConfigManager::load_from_file(&config_path, no_env())
        .await
        .unwrap();

    write_config("after");
    manager
        .reload_from_file(&config_path, no_env())
        .await
        .unwrap();

    let result = manager.build_engine().generate(&ProviderContext::new()).await;
    assert_eq!(result.content, "after");
}
