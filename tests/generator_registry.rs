//! Registry lifecycle tests. Kept in their own binary (own process) because
//! `reset_generators` clears shared process state.

use promptweave::{ProviderContext, register_builtin_generators, registered_generators};

#[tokio::test]
async fn reset_clears_everything_and_builtins_can_re_register() {
    promptweave::register_generator("registry-lifecycle-gen", |_context, _config| async {
        Ok("present".to_string())
    });
    register_builtin_generators();
    assert!(registered_generators().contains(&"timestamp".to_string()));
    assert!(registered_generators().contains(&"registry-lifecycle-gen".to_string()));

    promptweave::reset_generators();
    assert!(registered_generators().is_empty());

    // Re-registration after a reset restores the builtins.
    register_builtin_generators();
    let names = registered_generators();
    for builtin in [
        "conditional",
        "environment",
        "memory-context",
        "session-context",
        "timestamp",
    ] {
        assert!(names.contains(&builtin.to_string()), "missing {builtin}");
    }

    // Builtins stay overridable: last registration wins.
    promptweave::register_generator("timestamp", |_context, _config| async {
        Ok("frozen clock".to_string())
    });
    let generator = promptweave::generators::lookup_generator("timestamp").expect("registered");
    let output = generator(ProviderContext::new(), serde_json::Value::Null)
        .await
        .unwrap();
    assert_eq!(output, "frozen clock");
}
