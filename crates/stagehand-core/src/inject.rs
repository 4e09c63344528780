//! Concurrent copy of extension payloads into the cache.

use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::fs;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use crate::config::DeployConfig;
use crate::error::{InjectionError, InjectionFailure, InjectionResult};
use crate::scanner::ExtensionSource;

/// Ephemeral unit of work: one extension's payload copy.
#[derive(Debug, Clone)]
pub struct InjectionTask {
    /// Extension name, also the destination namespace under the cache.
    pub name: String,
    /// Source payload subtree.
    pub src: PathBuf,
    /// Destination under the cache directory.
    pub dst: PathBuf,
}

/// Outcome of a successful injection phase.
#[derive(Debug, Clone, Default)]
pub struct InjectionReport {
    /// Extensions fully copied into the cache.
    pub injected: usize,
    /// Total files copied across all extensions.
    pub files_copied: u64,
    /// Extensions skipped because shutdown was requested mid-phase.
    pub skipped: usize,
}

/// Copies each eligible extension's payload subtree into the cache under
/// a name-isolated path, running copies concurrently.
#[derive(Debug, Clone)]
pub struct InjectionEngine {
    config: DeployConfig,
    shutdown: Arc<AtomicBool>,
}

impl InjectionEngine {
    pub fn new(config: DeployConfig, shutdown: Arc<AtomicBool>) -> Self {
        Self { config, shutdown }
    }

    /// Inject every extension's payload into the cache.
    ///
    /// All copies run concurrently; the call returns only after every
    /// launched task has completed. Failures are collected across all
    /// tasks and reported together, so the caller sees the complete set
    /// of extensions that did not deploy. Completed siblings are left in
    /// place.
    ///
    /// When shutdown is requested mid-phase, no new copy task is
    /// launched; tasks already in flight run to completion so no
    /// truncated file lands in the cache.
    pub async fn inject(&self, extensions: &[ExtensionSource]) -> InjectionResult<InjectionReport> {
        let cache_dir = self.config.cache_dir();

        let mut join_set = JoinSet::new();
        let mut launched = 0usize;
        let mut skipped = 0usize;
        for ext in extensions {
            if self.shutdown.load(Ordering::SeqCst) {
                skipped = extensions.len() - launched;
                info!(skipped, "shutdown requested, not launching remaining copy tasks");
                break;
            }
            launched += 1;
            let task = InjectionTask {
                name: ext.name.clone(),
                src: ext.payload_path.clone(),
                dst: cache_dir.join(&ext.name),
            };
            join_set.spawn(async move {
                let copied = run_task(&task).await;
                (task, copied)
            });
        }

        let mut report = InjectionReport {
            skipped,
            ..Default::default()
        };
        let mut failures = Vec::new();
        while let Some(res) = join_set.join_next().await {
            match res {
                Ok((task, Ok(copied))) => {
                    debug!(extension = %task.name, files = copied, "injected");
                    report.injected += 1;
                    report.files_copied += copied;
                }
                Ok((task, Err(e))) => {
                    warn!(extension = %task.name, error = %e, "injection failed");
                    failures.push(InjectionFailure {
                        extension: task.name,
                        message: e.to_string(),
                    });
                }
                Err(e) => {
                    // A panicked copy task still must not abort the join
                    // barrier for its siblings.
                    warn!(error = %e, "injection task join error");
                    failures.push(InjectionFailure {
                        extension: "unknown".into(),
                        message: format!("join error: {e}"),
                    });
                }
            }
        }

        if failures.is_empty() {
            Ok(report)
        } else {
            Err(InjectionError::Failed { failures })
        }
    }
}

async fn run_task(task: &InjectionTask) -> io::Result<u64> {
    fs::create_dir_all(&task.dst).await?;
    copy_tree(&task.src, &task.dst).await
}

/// Recursively copy `src` into `dst`, preserving directory structure and
/// file bytes. Iterative work stack, so no boxed async recursion.
async fn copy_tree(src: &Path, dst: &Path) -> io::Result<u64> {
    let mut pending = vec![(src.to_path_buf(), dst.to_path_buf())];
    let mut copied = 0u64;

    while let Some((src_dir, dst_dir)) = pending.pop() {
        fs::create_dir_all(&dst_dir).await?;
        let mut entries = fs::read_dir(&src_dir).await?;
        while let Some(entry) = entries.next_entry().await? {
            let target = dst_dir.join(entry.file_name());
            if entry.file_type().await?.is_dir() {
                pending.push((entry.path(), target));
            } else {
                fs::copy(entry.path(), &target).await?;
                copied += 1;
            }
        }
    }

    Ok(copied)
}
