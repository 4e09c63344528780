//! Configuration objects for the pipeline and the translator.
//!
//! Every component takes its configuration explicitly at construction;
//! there is no process-global state.

use std::path::{Path, PathBuf};

/// Name of the resources root under the server base path. Must pre-exist.
pub const RESOURCES_DIR: &str = "resources";

/// Name of the disposable cache directory under the resources root.
/// The brackets keep it visually distinct from regular resources and are
/// part of the published path consumed by the host process.
pub const CACHE_DIR_NAME: &str = "[txAdmin-cache]";

/// Marker file, relative to an extension directory, that gates eligibility.
pub const MANIFEST_MARKER: &str = "resource/__resource.lua";

/// Subdirectory of an extension that holds its deployable payload.
pub const PAYLOAD_DIR: &str = "resource";

/// Configuration for a deployment pipeline.
#[derive(Debug, Clone)]
pub struct DeployConfig {
    /// Server base path. The cache lives at
    /// `<base_path>/resources/[txAdmin-cache]/`.
    pub base_path: PathBuf,

    /// Root directory holding candidate extension directories.
    pub extensions_root: PathBuf,
}

impl DeployConfig {
    pub fn new(base_path: impl Into<PathBuf>, extensions_root: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
            extensions_root: extensions_root.into(),
        }
    }

    /// The resources root that must pre-exist under the base path.
    pub fn resources_dir(&self) -> PathBuf {
        self.base_path.join(RESOURCES_DIR)
    }

    /// The disposable cache directory.
    pub fn cache_dir(&self) -> PathBuf {
        self.resources_dir().join(CACHE_DIR_NAME)
    }

    /// The payload subtree of a named extension.
    pub fn payload_dir(&self, name: &str) -> PathBuf {
        self.extensions_root.join(name).join(PAYLOAD_DIR)
    }
}

/// Configuration for the translator.
#[derive(Debug, Clone)]
pub struct TranslatorConfig {
    /// Directory holding `<language>.json` phrase files.
    pub locale_dir: PathBuf,

    /// Language to load, e.g. `en` or `custom`.
    pub language: String,
}

impl TranslatorConfig {
    pub fn new(locale_dir: impl Into<PathBuf>, language: impl Into<String>) -> Self {
        Self {
            locale_dir: locale_dir.into(),
            language: language.into(),
        }
    }

    /// Path of the phrase file for the configured language.
    pub fn locale_file(&self) -> PathBuf {
        self.locale_dir.join(format!("{}.json", self.language))
    }
}

/// True if `path` has a manifest marker, i.e. is an eligible extension.
pub(crate) fn has_manifest(extension_dir: &Path) -> bool {
    extension_dir.join(MANIFEST_MARKER).is_file()
}
