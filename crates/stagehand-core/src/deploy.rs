//! Deployment cycle orchestration.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::cache::CacheController;
use crate::config::DeployConfig;
use crate::error::{CacheError, DeployError};
use crate::inject::InjectionEngine;
use crate::scanner::ResourceScanner;

/// Summary of one deployment cycle.
#[derive(Debug, Clone, Default)]
pub struct CycleReport {
    /// Eligible extensions discovered this cycle.
    pub eligible: usize,
    /// Extensions fully injected into the cache.
    pub injected: usize,
    /// Total files copied.
    pub files_copied: u64,
    /// True when the cache wipe left stale entries behind. The cycle
    /// proceeded, but the cache may contain entries from a prior cycle.
    pub flagged_cleanup: bool,
}

/// Runs reset → scan → inject, in that strict order, once per cycle.
///
/// Cycles are serialized: two concurrent `run_cycle` calls on the same
/// deployer never interleave against the cache directory. Concurrency
/// exists only within the injection phase, across independent extensions.
pub struct Deployer {
    cache: CacheController,
    scanner: ResourceScanner,
    engine: InjectionEngine,
    shutdown: Arc<AtomicBool>,
    cycle_lock: Mutex<()>,
}

impl Deployer {
    pub fn new(config: DeployConfig) -> Self {
        let shutdown = Arc::new(AtomicBool::new(false));
        Self {
            cache: CacheController::new(config.clone()),
            scanner: ResourceScanner::new(config.clone()),
            engine: InjectionEngine::new(config, shutdown.clone()),
            shutdown,
            cycle_lock: Mutex::new(()),
        }
    }

    /// Handle for requesting shutdown. Once set, no new copy task is
    /// launched; in-flight copies finish naturally.
    pub fn shutdown_handle(&self) -> Arc<AtomicBool> {
        self.shutdown.clone()
    }

    /// Run one full deployment cycle.
    ///
    /// A phase error aborts the cycle, leaving the cache in whatever
    /// state the last successful phase produced. That state is safe to
    /// retry: the next cycle starts with a full wipe. The one exception
    /// is [`CacheError::PartialCleanup`], which flags the report and lets
    /// the cycle proceed.
    pub async fn run_cycle(&self) -> Result<CycleReport, DeployError> {
        let _cycle = self.cycle_lock.lock().await;

        let mut flagged_cleanup = false;
        match self.cache.reset().await {
            Ok(()) => {}
            Err(e @ CacheError::PartialCleanup { .. }) => {
                warn!(error = %e, "cache wipe incomplete, proceeding with flagged cycle");
                flagged_cleanup = true;
            }
            Err(e) => return Err(e.into()),
        }

        let extensions = self.scanner.list().await?;
        info!(eligible = extensions.len(), "starting injection");

        if self.shutdown.load(Ordering::SeqCst) {
            info!("shutdown requested, skipping injection phase");
            return Ok(CycleReport {
                eligible: extensions.len(),
                flagged_cleanup,
                ..Default::default()
            });
        }

        let injection = self.engine.inject(&extensions).await?;
        let report = CycleReport {
            eligible: extensions.len(),
            injected: injection.injected,
            files_copied: injection.files_copied,
            flagged_cleanup,
        };
        info!(
            eligible = report.eligible,
            injected = report.injected,
            files = report.files_copied,
            "deployment cycle complete"
        );
        Ok(report)
    }
}
