use std::collections::HashMap;
use std::path::{Component, Path, PathBuf};

use crate::error::CacheResult;
use crate::provider::{self, CacheKind, CacheProvider, ClearReport};
use crate::ranker::{self, TOP_MODULES};
use crate::stats::{CacheStats, ModuleStats};

/// The Go module cache (`GOMODCACHE`), laid out as
/// `<root>/<module path>@<version>/...`.
pub struct ModuleProvider {
    root: PathBuf,
}

impl ModuleProvider {
    /// Open the module cache at `root`, which must exist.
    pub fn open(root: impl Into<PathBuf>) -> CacheResult<Self> {
        let root = root.into();
        super::ensure_exists(CacheKind::Modules, &root)?;
        Ok(Self { root })
    }
}

/// Derive the module a file belongs to from its path relative to the cache
/// root: the leading components up to and including the first one that
/// carries an `@version` marker, joined with `/`.
///
/// Files directly under the root, or with no `@` component, belong to no
/// module.
pub fn module_id(relative: &Path) -> Option<String> {
    let parts: Vec<_> = relative
        .components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy()),
            _ => None,
        })
        .collect();
    if parts.len() < 2 {
        return None;
    }

    let end = parts.iter().position(|part| part.contains('@'))?;
    Some(parts[..=end].join("/"))
}

impl CacheProvider for ModuleProvider {
    fn kind(&self) -> CacheKind {
        CacheKind::Modules
    }

    fn location(&self) -> &Path {
        &self.root
    }

    fn stats(&self) -> CacheResult<CacheStats> {
        provider::open_root(CacheKind::Modules, &self.root)?;

        let mut size = 0u64;
        let mut size_by_module: HashMap<String, u64> = HashMap::new();
        let mut unreadable = 0usize;

        let walk_skipped = provider::for_each_file(&self.root, |entry| {
            let Ok(metadata) = entry.metadata() else {
                unreadable += 1;
                return;
            };
            let len = metadata.len();
            size += len;

            let Ok(relative) = entry.path().strip_prefix(&self.root) else {
                return;
            };
            if let Some(module) = module_id(relative) {
                *size_by_module.entry(module).or_insert(0) += len;
            }
        });
        let skipped = walk_skipped + unreadable;

        tracing::debug!(
            root = %self.root.display(),
            modules = size_by_module.len(),
            size,
            skipped,
            "walked module cache"
        );

        Ok(CacheStats::Modules(ModuleStats {
            location: self.root.clone(),
            size,
            module_count: size_by_module.len(),
            top_modules: ranker::rank(&size_by_module, TOP_MODULES),
            skipped,
        }))
    }

    fn clear(&self) -> CacheResult<ClearReport> {
        provider::clear_files(CacheKind::Modules, &self.root, |_| true)
    }
}
