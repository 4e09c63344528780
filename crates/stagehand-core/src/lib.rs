//! Extension cache deployment pipeline.
//!
//! Stages a set of extension packages into a disposable cache directory
//! consumed by a host server process. Every deployment cycle runs three
//! strictly ordered phases:
//!
//! 1. [`CacheController::reset`] — wipe or create the cache directory
//! 2. [`ResourceScanner::list`] — discover eligible extension sources
//! 3. [`InjectionEngine::inject`] — copy each payload into the cache,
//!    concurrently across extensions
//!
//! # Quick Start
//!
//! ```no_run
//! use stagehand_core::{DeployConfig, Deployer};
//!
//! # async fn example() -> Result<(), stagehand_core::DeployError> {
//! let config = DeployConfig::new("/srv/server-data", "./extensions");
//! let deployer = Deployer::new(config);
//!
//! let report = deployer.run_cycle().await?;
//! println!("injected {} of {} extensions", report.injected, report.eligible);
//! # Ok(())
//! # }
//! ```
//!
//! The cache directory is never a source of truth: a failed cycle leaves it
//! in whatever state the last successful phase produced, and the next cycle
//! starts with a full wipe, so no corruption accumulates across retries.

pub mod cache;
pub mod config;
pub mod deploy;
pub mod error;
pub mod inject;
pub mod scanner;
pub mod translator;

// Re-export main types
pub use cache::CacheController;
pub use config::{DeployConfig, TranslatorConfig, CACHE_DIR_NAME, MANIFEST_MARKER, RESOURCES_DIR};
pub use deploy::{CycleReport, Deployer};
pub use error::{
    CacheError, CacheResult, DeployError, InjectionError, InjectionFailure, InjectionResult,
    ScanError, ScanResult, TranslationError,
};
pub use inject::{InjectionEngine, InjectionReport, InjectionTask};
pub use scanner::{ExtensionSource, ResourceScanner};
pub use translator::{Phrases, ReloadHook, Translator};
