//! Discovery of eligible extension sources.

use std::path::PathBuf;

use tokio::fs;
use tracing::{debug, trace, warn};

use crate::config::{self, DeployConfig, MANIFEST_MARKER};
use crate::error::{ScanError, ScanResult};

/// A discovered extension, identified by its directory basename.
///
/// Immutable once discovered; the scanner rebuilds the full set on every
/// deployment cycle rather than caching across cycles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtensionSource {
    /// Unique name (directory basename under the extensions root).
    pub name: String,

    /// Subdirectory containing the deployable files.
    pub payload_path: PathBuf,

    /// Marker file whose existence gated eligibility.
    pub manifest_path: PathBuf,
}

/// Enumerates candidate extension directories and filters to those
/// exposing a valid manifest marker file.
#[derive(Debug, Clone)]
pub struct ResourceScanner {
    config: DeployConfig,
}

impl ResourceScanner {
    pub fn new(config: DeployConfig) -> Self {
        Self { config }
    }

    /// List eligible extensions under the configured extensions root.
    ///
    /// Non-directory entries are skipped silently, as are directories
    /// without the manifest marker. The returned order is the directory
    /// enumeration order: deterministic within a single run, not stable
    /// across platforms. Callers must not depend on it for correctness.
    pub async fn list(&self) -> ScanResult<Vec<ExtensionSource>> {
        let root = &self.config.extensions_root;

        let mut entries = fs::read_dir(root).await.map_err(|e| ScanError::RootMissing {
            path: root.clone(),
            message: e.to_string(),
        })?;

        let mut extensions = Vec::new();
        loop {
            let entry = entries.next_entry().await.map_err(|e| ScanError::Entry {
                path: root.clone(),
                message: e.to_string(),
            })?;
            let Some(entry) = entry else { break };

            // file_type() does not follow symlinks, so a symlinked
            // directory is skipped like any other non-directory entry.
            let file_type = entry.file_type().await.map_err(|e| ScanError::Entry {
                path: entry.path(),
                message: e.to_string(),
            })?;
            if !file_type.is_dir() {
                trace!(path = %entry.path().display(), "skipping non-directory entry");
                continue;
            }

            let dir = entry.path();
            if !config::has_manifest(&dir) {
                trace!(path = %dir.display(), "no {MANIFEST_MARKER}, skipping");
                continue;
            }

            // A lossy name would point at payload paths that do not
            // exist, surfacing much later as an opaque injection failure.
            let Some(name) = entry.file_name().to_str().map(str::to_owned) else {
                warn!(path = %dir.display(), "extension directory name is not valid UTF-8, skipping");
                continue;
            };
            extensions.push(ExtensionSource {
                payload_path: self.config.payload_dir(&name),
                manifest_path: dir.join(MANIFEST_MARKER),
                name,
            });
        }

        debug!(count = extensions.len(), root = %root.display(), "scanned extensions root");
        Ok(extensions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs as std_fs;
    use tempfile::TempDir;

    fn make_extension(root: &std::path::Path, name: &str, with_marker: bool) {
        let payload = root.join(name).join("resource");
        std_fs::create_dir_all(&payload).unwrap();
        if with_marker {
            std_fs::write(payload.join("__resource.lua"), "-- manifest").unwrap();
        }
    }

    fn scanner_for(root: &std::path::Path) -> ResourceScanner {
        ResourceScanner::new(DeployConfig::new("/unused", root))
    }

    #[tokio::test]
    async fn returns_only_entries_with_marker() {
        let tmp = TempDir::new().unwrap();
        make_extension(tmp.path(), "a", true);
        make_extension(tmp.path(), "b", false);
        make_extension(tmp.path(), "c", true);

        let mut names: Vec<String> = scanner_for(tmp.path())
            .list()
            .await
            .unwrap()
            .into_iter()
            .map(|e| e.name)
            .collect();
        names.sort();
        assert_eq!(names, ["a", "c"]);
    }

    #[tokio::test]
    async fn skips_plain_files_silently() {
        let tmp = TempDir::new().unwrap();
        make_extension(tmp.path(), "a", true);
        std_fs::write(tmp.path().join("README.md"), "not an extension").unwrap();

        let found = scanner_for(tmp.path()).list().await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].name, "a");
    }

    #[tokio::test]
    async fn extension_paths_point_into_source_tree() {
        let tmp = TempDir::new().unwrap();
        make_extension(tmp.path(), "radio", true);

        let found = scanner_for(tmp.path()).list().await.unwrap();
        assert_eq!(found[0].payload_path, tmp.path().join("radio/resource"));
        assert_eq!(
            found[0].manifest_path,
            tmp.path().join("radio/resource/__resource.lua")
        );
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn skips_non_utf8_directory_names() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let tmp = TempDir::new().unwrap();
        make_extension(tmp.path(), "good", true);

        let payload = tmp
            .path()
            .join(OsStr::from_bytes(b"bad-\xff\xfe"))
            .join("resource");
        std_fs::create_dir_all(&payload).unwrap();
        std_fs::write(payload.join("__resource.lua"), "-- manifest").unwrap();

        let found = scanner_for(tmp.path()).list().await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].name, "good");
    }

    #[tokio::test]
    async fn missing_root_is_fatal() {
        let tmp = TempDir::new().unwrap();
        let err = scanner_for(&tmp.path().join("nope")).list().await.unwrap_err();
        assert!(matches!(err, ScanError::RootMissing { .. }));
    }

    #[tokio::test]
    async fn empty_root_yields_empty_list() {
        let tmp = TempDir::new().unwrap();
        let found = scanner_for(tmp.path()).list().await.unwrap();
        assert!(found.is_empty());
    }
}
