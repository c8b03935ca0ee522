use std::path::{Path, PathBuf};

use crate::error::CacheResult;
use crate::provider::{self, CacheKind, CacheProvider, ClearReport};
use crate::stats::{AgeRange, BuildStats, CacheStats, SizeDistribution};

/// The Go build cache (`GOCACHE`): every regular file under the root is an
/// entry, test output included.
pub struct BuildProvider {
    root: PathBuf,
}

impl BuildProvider {
    /// Open the build cache at `root`, which must exist.
    pub fn open(root: impl Into<PathBuf>) -> CacheResult<Self> {
        let root = root.into();
        super::ensure_exists(CacheKind::Build, &root)?;
        Ok(Self { root })
    }
}

impl CacheProvider for BuildProvider {
    fn kind(&self) -> CacheKind {
        CacheKind::Build
    }

    fn location(&self) -> &Path {
        &self.root
    }

    fn stats(&self) -> CacheResult<CacheStats> {
        provider::open_root(CacheKind::Build, &self.root)?;

        let mut size = 0u64;
        let mut entry_count = 0usize;
        let mut ages = AgeRange::default();
        let mut distribution = SizeDistribution::default();
        let mut unreadable = 0usize;

        let walk_skipped = provider::for_each_file(&self.root, |entry| {
            let Ok(metadata) = entry.metadata() else {
                unreadable += 1;
                return;
            };
            let len = metadata.len();
            entry_count += 1;
            size += len;
            distribution.record(len);
            if let Ok(modified) = metadata.modified() {
                ages.observe(modified);
            }
        });
        let skipped = walk_skipped + unreadable;

        tracing::debug!(
            root = %self.root.display(),
            entry_count,
            size,
            skipped,
            "walked build cache"
        );

        Ok(CacheStats::Build(BuildStats {
            location: self.root.clone(),
            size,
            entry_count,
            oldest_entry: ages.oldest,
            newest_entry: ages.newest,
            distribution,
            skipped,
        }))
    }

    fn clear(&self) -> CacheResult<ClearReport> {
        provider::clear_files(CacheKind::Build, &self.root, |_| true)
    }
}
