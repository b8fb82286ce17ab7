//! Provider reading its fragment from a file, with optional hot reload

use async_trait::async_trait;
use notify::{RecommendedWatcher, RecursiveMode, Watcher};
use parking_lot::{Mutex, RwLock};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, warn};

use crate::config::{FileProviderConfig, ProviderKind};
use crate::context::ProviderContext;
use crate::error::{PromptError, Result};
use crate::providers::PromptProvider;
use crate::template::substitute_variables;

/// Reads `file_path` (resolved against `base_dir`) and applies the same
/// `{{var}}` substitution as [`super::StaticProvider`].
///
/// A last-good content cache backs every read: when the file becomes
/// unreadable the provider degrades to the cached content and only reports
/// `FileReadError` if no successful read ever happened. With
/// `watch_for_changes` a filesystem watch re-reads the file on change and
/// swaps the cache in one write, so generation never observes a partial
/// update.
pub struct FileBasedProvider {
    name: String,
    priority: i64,
    config: FileProviderConfig,
    path: PathBuf,
    cache: Arc<RwLock<Option<String>>>,
    watcher: Mutex<Option<RecommendedWatcher>>,
}

impl FileBasedProvider {
    pub fn new(name: impl Into<String>, priority: i64, config: FileProviderConfig) -> Self {
        let path = config.resolved_path();
        Self {
            name: name.into(),
            priority,
            config,
            path,
            cache: Arc::new(RwLock::new(None)),
            watcher: Mutex::new(None),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

fn read_prompt_file(path: &Path, encoding: &str) -> io::Result<String> {
    let bytes = std::fs::read(path)?;
    match encoding {
        "utf-8-lossy" => Ok(String::from_utf8_lossy(&bytes).into_owned()),
        // utf-8 / utf8; anything else was rejected at validation
        _ => String::from_utf8(bytes)
            .map_err(|err| io::Error::new(io::ErrorKind::InvalidData, err)),
    }
}

#[async_trait]
impl PromptProvider for FileBasedProvider {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> ProviderKind {
        ProviderKind::FileBased
    }

    fn priority(&self) -> i64 {
        self.priority
    }

    async fn initialize(&self) -> Result<()> {
        // Prime the cache so a watched provider serves content immediately
        // and an unwatched one survives the source disappearing later.
        if let Ok(content) = read_prompt_file(&self.path, &self.config.encoding) {
            *self.cache.write() = Some(content);
        }

        if !self.config.watch_for_changes {
            return Ok(());
        }

        let cache = Arc::clone(&self.cache);
        let path = self.path.clone();
        let encoding = self.config.encoding.clone();
        let provider_name = self.name.clone();
        let mut watcher = notify::recommended_watcher(
            move |event: notify::Result<notify::Event>| match event {
                Ok(event) if event.kind.is_modify() || event.kind.is_create() => {
                    match read_prompt_file(&path, &encoding) {
                        Ok(content) => {
                            *cache.write() = Some(content);
                            debug!(provider = %provider_name, path = %path.display(), "reloaded watched prompt file");
                        }
                        Err(err) => {
                            warn!(provider = %provider_name, path = %path.display(), error = %err, "failed to re-read watched prompt file");
                        }
                    }
                }
                Ok(_) => {}
                Err(err) => {
                    warn!(provider = %provider_name, error = %err, "prompt file watcher error");
                }
            },
        )
        .map_err(|err| PromptError::ProviderInit {
            name: self.name.clone(),
            reason: format!("failed to create file watcher: {err}"),
        })?;

        watcher
            .watch(&self.path, RecursiveMode::NonRecursive)
            .map_err(|err| PromptError::ProviderInit {
                name: self.name.clone(),
                reason: format!("failed to watch {}: {err}", self.path.display()),
            })?;
        *self.watcher.lock() = Some(watcher);
        Ok(())
    }

    async fn generate_content(&self, _context: &ProviderContext) -> Result<String> {
        // Watched providers serve the cache; the watcher keeps it current.
        if self.config.watch_for_changes {
            if let Some(cached) = self.cache.read().clone() {
                return Ok(substitute_variables(&cached, &self.config.variables));
            }
        }

        let content = match read_prompt_file(&self.path, &self.config.encoding) {
            Ok(content) => {
                *self.cache.write() = Some(content.clone());
                content
            }
            Err(err) => match self.cache.read().clone() {
                Some(cached) => {
                    debug!(provider = %self.name, path = %self.path.display(), "serving cached prompt content after read failure");
                    cached
                }
                None => {
                    return Err(PromptError::FileRead {
                        path: self.path.clone(),
                        source: err,
                    });
                }
            },
        };
        Ok(substitute_variables(&content, &self.config.variables))
    }

    async fn destroy(&self) -> Result<()> {
        // Dropping the watcher releases the underlying OS handles.
        self.watcher.lock().take();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::fs;

    fn file_config(dir: &Path, file_name: &str, extra: serde_json::Value) -> FileProviderConfig {
        let mut payload = json!({
            "filePath": file_name,
            "baseDir": dir.to_string_lossy(),
        });
        if let (Some(base), Some(extra)) = (payload.as_object_mut(), extra.as_object()) {
            for (key, value) in extra {
                base.insert(key.clone(), value.clone());
            }
        }
        FileProviderConfig::from_value("config", &payload).unwrap()
    }

    #[tokio::test]
    async fn reads_and_substitutes_file_content() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("base.md"), "Project: {{project}}").unwrap();
        let config = file_config(dir.path(), "base.md", json!({"variables": {"project": "weave"}}));
        let provider = FileBasedProvider::new("base", 50, config);
        provider.initialize().await.unwrap();

        let output = provider
            .generate_content(&ProviderContext::new())
            .await
            .unwrap();
        assert_eq!(output, "Project: weave");
    }

    #[tokio::test]
    async fn serves_cache_after_source_disappears() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("base.md");
        fs::write(&file, "original").unwrap();
        let provider =
            FileBasedProvider::new("base", 50, file_config(dir.path(), "base.md", json!({})));
        provider.initialize().await.unwrap();

        let context = ProviderContext::new();
        assert_eq!(provider.generate_content(&context).await.unwrap(), "original");

        fs::remove_file(&file).unwrap();
        assert_eq!(provider.generate_content(&context).await.unwrap(), "original");
    }

    #[tokio::test]
    async fn missing_file_without_cache_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let provider =
            FileBasedProvider::new("base", 50, file_config(dir.path(), "absent.md", json!({})));
        provider.initialize().await.unwrap();

        let err = provider
            .generate_content(&ProviderContext::new())
            .await
            .expect_err("no cache to fall back to");
        assert!(matches!(err, PromptError::FileRead { .. }));
    }
}
