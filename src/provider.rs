use std::fmt;
use std::fs;
use std::path::Path;

use serde::Serialize;
use walkdir::{DirEntry, WalkDir};

use crate::error::{CacheError, CacheResult};
use crate::stats::CacheStats;

/// The logical caches managed by the Go toolchain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CacheKind {
    Build,
    Modules,
    Test,
}

impl CacheKind {
    /// Registration order used by the default coordinator.
    pub const ALL: [CacheKind; 3] = [CacheKind::Build, CacheKind::Modules, CacheKind::Test];

    /// Machine-readable name, matching the CLI flags (e.g. "modules").
    pub fn name(self) -> &'static str {
        match self {
            Self::Build => "build",
            Self::Modules => "modules",
            Self::Test => "test",
        }
    }

    /// Human-readable label for display (e.g. "Module Cache").
    pub fn label(self) -> &'static str {
        match self {
            Self::Build => "Build Cache",
            Self::Modules => "Module Cache",
            Self::Test => "Test Cache",
        }
    }

    /// The `go env` variable reporting this cache's root.
    /// The test cache lives inside the build cache.
    pub fn env_var(self) -> &'static str {
        match self {
            Self::Build | Self::Test => "GOCACHE",
            Self::Modules => "GOMODCACHE",
        }
    }
}

impl fmt::Display for CacheKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Build => "build cache",
            Self::Modules => "module cache",
            Self::Test => "test cache",
        };
        f.write_str(s)
    }
}

/// Result of clearing a single cache.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ClearReport {
    /// Files removed.
    pub deleted: usize,
    /// Sum of the removed files' sizes, read before deletion.
    pub freed: u64,
    /// Entries that could not be read or removed.
    pub skipped: usize,
}

/// The contract every cache implementation fulfils.
pub trait CacheProvider: Send + Sync {
    fn kind(&self) -> CacheKind;

    /// Root directory owned by this provider.
    fn location(&self) -> &Path;

    /// Take a point-in-time snapshot of the cache. Never deletes anything.
    fn stats(&self) -> CacheResult<CacheStats>;

    /// Delete the files this provider claims. The root directory and its
    /// subdirectories are left in place.
    fn clear(&self) -> CacheResult<ClearReport>;
}

/// Fail unless `root` can be opened as a directory.
pub(crate) fn open_root(kind: CacheKind, root: &Path) -> CacheResult<()> {
    match fs::read_dir(root) {
        Ok(_) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(CacheError::RootMissing {
            kind,
            path: root.to_path_buf(),
        }),
        Err(source) => Err(CacheError::RootUnreadable {
            kind,
            path: root.to_path_buf(),
            source,
        }),
    }
}

/// Call `visit` for every regular file under `root`.
/// Returns the number of walk entries that could not be read.
pub(crate) fn for_each_file(root: &Path, mut visit: impl FnMut(&DirEntry)) -> usize {
    let mut skipped = 0;
    for entry in WalkDir::new(root).follow_links(false) {
        match entry {
            Ok(entry) if entry.file_type().is_file() => visit(&entry),
            Ok(_) => {}
            Err(err) => {
                tracing::trace!(error = %err, "skipping unreadable entry");
                skipped += 1;
            }
        }
    }
    skipped
}

/// Delete every regular file under `root` for which `select` returns true.
pub(crate) fn clear_files(
    kind: CacheKind,
    root: &Path,
    mut select: impl FnMut(&DirEntry) -> bool,
) -> CacheResult<ClearReport> {
    open_root(kind, root)?;

    let mut report = ClearReport::default();
    let walk_skipped = for_each_file(root, |entry| {
        if !select(entry) {
            return;
        }
        let size = entry.metadata().map(|m| m.len()).unwrap_or(0);
        match fs::remove_file(entry.path()) {
            Ok(()) => {
                report.deleted += 1;
                report.freed += size;
            }
            Err(err) => {
                tracing::trace!(path = %entry.path().display(), error = %err, "delete failed");
                report.skipped += 1;
            }
        }
    });
    report.skipped += walk_skipped;

    tracing::debug!(
        cache = kind.name(),
        root = %root.display(),
        deleted = report.deleted,
        freed = report.freed,
        skipped = report.skipped,
        "cleared cache"
    );
    Ok(report)
}
