//! Lifecycle of the disposable cache directory.

use tokio::fs;
use tracing::{debug, warn};

use crate::config::DeployConfig;
use crate::error::{CacheError, CacheResult, CleanupFailure};

/// Owns the cache directory under `<base_path>/resources/[txAdmin-cache]`:
/// existence check, full wipe, re-creation.
#[derive(Debug, Clone)]
pub struct CacheController {
    config: DeployConfig,
}

impl CacheController {
    pub fn new(config: DeployConfig) -> Self {
        Self { config }
    }

    /// Reset the cache directory so it exists and is empty.
    ///
    /// The directory itself is never deleted, only its immediate contents,
    /// so a live handle held by a concurrent reader of the parent stays
    /// valid. Entry removal is best-effort: a failure on one entry is
    /// logged and does not stop removal of the others, but the call fails
    /// with [`CacheError::PartialCleanup`] listing everything that
    /// survived.
    pub async fn reset(&self) -> CacheResult<()> {
        let resources = self.config.resources_dir();
        if !resources.is_dir() {
            return Err(CacheError::NotFound { path: resources });
        }

        let cache_dir = self.config.cache_dir();
        if !cache_dir.is_dir() {
            fs::create_dir(&cache_dir)
                .await
                .map_err(|e| CacheError::Create {
                    path: cache_dir.clone(),
                    message: e.to_string(),
                })?;
            debug!(path = %cache_dir.display(), "created cache directory");
            return Ok(());
        }

        let mut entries = fs::read_dir(&cache_dir)
            .await
            .map_err(|e| CacheError::Read {
                path: cache_dir.clone(),
                message: e.to_string(),
            })?;

        let mut removed = 0usize;
        let mut failures = Vec::new();
        loop {
            let entry = match entries.next_entry().await {
                Ok(Some(entry)) => entry,
                Ok(None) => break,
                Err(e) => {
                    return Err(CacheError::Read {
                        path: cache_dir.clone(),
                        message: e.to_string(),
                    })
                }
            };

            let path = entry.path();
            let result = match entry.file_type().await {
                Ok(ft) if ft.is_dir() => fs::remove_dir_all(&path).await,
                Ok(_) => fs::remove_file(&path).await,
                Err(e) => Err(e),
            };

            match result {
                Ok(()) => removed += 1,
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "failed to remove stale cache entry");
                    failures.push(CleanupFailure {
                        path,
                        message: e.to_string(),
                    });
                }
            }
        }

        debug!(removed, path = %cache_dir.display(), "wiped cache directory");
        if failures.is_empty() {
            Ok(())
        } else {
            Err(CacheError::PartialCleanup { failures })
        }
    }
}
