//! Process-wide registry of named generator functions
//!
//! Dynamic providers resolve their generator by name on every call, never at
//! construction time, so registration order relative to provider construction
//! does not matter as long as registration completes before the generation
//! call. `register_generator` overwrites any prior binding for the same name
//! (last writer wins) so applications and tests can override builtins.

mod builtins;

pub use builtins::register_builtin_generators;

use futures::FutureExt;
use futures::future::BoxFuture;
use once_cell::sync::Lazy;
use parking_lot::RwLock;
use serde_json::Value;
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use tracing::debug;

use crate::context::ProviderContext;
use crate::error::Result;

/// A registered generator: takes the per-call context and the provider's
/// `generatorConfig`, produces one prompt fragment.
pub type GeneratorFn =
    Arc<dyn Fn(ProviderContext, Value) -> BoxFuture<'static, Result<String>> + Send + Sync>;

static REGISTRY: Lazy<RwLock<HashMap<String, GeneratorFn>>> =
    Lazy::new(|| RwLock::new(HashMap::new()));

/// Register a generator under `name`, replacing any existing binding.
pub fn register_generator<F, Fut>(name: &str, generator: F)
where
    F: Fn(ProviderContext, Value) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<String>> + Send + 'static,
{
    let generator: GeneratorFn =
        Arc::new(move |context, config| generator(context, config).boxed());
    REGISTRY.write().insert(name.to_string(), generator);
    debug!(generator = name, "registered prompt generator");
}

/// Look up a generator by name. Called lazily per generation call.
pub fn lookup_generator(name: &str) -> Option<GeneratorFn> {
    REGISTRY.read().get(name).cloned()
}

/// Names of all currently registered generators, sorted for stable output.
pub fn registered_generators() -> Vec<String> {
    let mut names: Vec<String> = REGISTRY.read().keys().cloned().collect();
    names.sort();
    names
}

/// Clear the registry. Test-isolation hook; production code has no reason to
/// call this.
pub fn reset_generators() {
    REGISTRY.write().clear();
}
