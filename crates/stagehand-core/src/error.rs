//! Error types for the deployment pipeline.

use std::path::PathBuf;

/// Cache reset errors.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    /// The resources root under the server base path does not exist.
    /// Fatal precondition: the host environment is not ready.
    #[error("resources folder not found: {path}")]
    NotFound { path: PathBuf },

    /// One or more stale entries could not be removed from the cache
    /// directory. The remaining entries were still deleted.
    #[error("failed to remove {} stale cache entries", .failures.len())]
    PartialCleanup { failures: Vec<CleanupFailure> },

    /// The cache directory could not be created.
    #[error("failed to create cache directory {path}: {message}")]
    Create { path: PathBuf, message: String },

    /// The cache directory exists but could not be read.
    #[error("failed to read cache directory {path}: {message}")]
    Read { path: PathBuf, message: String },
}

/// A single stale entry that survived a cache wipe.
#[derive(Debug, Clone)]
pub struct CleanupFailure {
    /// Path of the entry that could not be removed.
    pub path: PathBuf,
    /// Underlying I/O error message.
    pub message: String,
}

/// Extension discovery errors.
#[derive(Debug, thiserror::Error)]
pub enum ScanError {
    /// The extensions root could not be read at all.
    /// Fatal: no extensions can be discovered.
    #[error("extensions root missing or unreadable: {path} - {message}")]
    RootMissing { path: PathBuf, message: String },

    /// A directory entry could not be inspected mid-enumeration.
    #[error("failed to read entry under {path}: {message}")]
    Entry { path: PathBuf, message: String },
}

/// Injection errors, aggregated across all copy tasks.
#[derive(Debug, thiserror::Error)]
pub enum InjectionError {
    /// One or more extensions failed to copy. Extensions that completed
    /// before the failure are left in place.
    #[error("{} extension(s) failed to inject: {}", .failures.len(), failure_names(.failures))]
    Failed { failures: Vec<InjectionFailure> },
}

/// A single extension whose copy task failed.
#[derive(Debug, Clone)]
pub struct InjectionFailure {
    /// Name of the offending extension.
    pub extension: String,
    /// Underlying cause (disk full, permission denied, source vanished, ...).
    pub message: String,
}

fn failure_names(failures: &[InjectionFailure]) -> String {
    failures
        .iter()
        .map(|f| f.extension.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Translation subsystem errors.
#[derive(Debug, thiserror::Error)]
pub enum TranslationError {
    /// Locale file could not be read.
    #[error("unable to read locale file {path}: {message}")]
    Read { path: PathBuf, message: String },

    /// Locale file is not valid JSON.
    #[error("unable to parse locale file {path}: {message}")]
    Parse { path: PathBuf, message: String },

    /// Locale file parsed but the top level is not an object.
    #[error("locale file {path} is not a JSON object")]
    NotAnObject { path: PathBuf },

    /// A bundled locale file was modified. Users should use the `custom`
    /// language instead of editing bundled files.
    #[error("bundled locale '{language}' was modified; revert it and use the custom language instead")]
    Tampered { language: String },
}

/// Umbrella error for a deployment cycle.
#[derive(Debug, thiserror::Error)]
pub enum DeployError {
    #[error(transparent)]
    Cache(#[from] CacheError),

    #[error(transparent)]
    Scan(#[from] ScanError),

    #[error(transparent)]
    Injection(#[from] InjectionError),
}

/// Result type for cache operations.
pub type CacheResult<T> = Result<T, CacheError>;

/// Result type for scan operations.
pub type ScanResult<T> = Result<T, ScanError>;

/// Result type for injection operations.
pub type InjectionResult<T> = Result<T, InjectionError>;
