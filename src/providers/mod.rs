mod build_cache;
mod module_cache;
mod test_cache;

use std::path::Path;

pub use build_cache::BuildProvider;
pub use module_cache::{module_id, ModuleProvider};
pub use test_cache::TestProvider;

use crate::error::{CacheError, CacheResult};
use crate::provider::{CacheKind, CacheProvider};
use crate::toolchain::Toolchain;

fn ensure_exists(kind: CacheKind, root: &Path) -> CacheResult<()> {
    if root.exists() {
        Ok(())
    } else {
        Err(CacheError::RootMissing {
            kind,
            path: root.to_path_buf(),
        })
    }
}

/// Open the provider for `kind` rooted at `root`.
pub fn provider_at(kind: CacheKind, root: &Path) -> CacheResult<Box<dyn CacheProvider>> {
    Ok(match kind {
        CacheKind::Build => Box::new(BuildProvider::open(root)?),
        CacheKind::Modules => Box::new(ModuleProvider::open(root)?),
        CacheKind::Test => Box::new(TestProvider::open(root)?),
    })
}

/// Resolve the root for `kind` through the toolchain and open its provider.
pub fn open_provider(
    kind: CacheKind,
    toolchain: &dyn Toolchain,
) -> CacheResult<Box<dyn CacheProvider>> {
    let root = toolchain.cache_root(kind)?;
    tracing::debug!(cache = kind.name(), root = %root.display(), "resolved cache root");
    provider_at(kind, &root)
}

/// Open providers for `kinds`, in order. Fails on the first cache that cannot
/// be opened.
pub fn open_providers(
    kinds: &[CacheKind],
    toolchain: &dyn Toolchain,
) -> CacheResult<Vec<Box<dyn CacheProvider>>> {
    kinds.iter().map(|&kind| open_provider(kind, toolchain)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::toolchain::StaticToolchain;
    use tempfile::TempDir;

    #[test]
    fn test_open_providers_in_order() {
        let gocache = TempDir::new().unwrap();
        let gomodcache = TempDir::new().unwrap();
        let toolchain = StaticToolchain::new(gocache.path(), gomodcache.path());

        let providers = open_providers(&CacheKind::ALL, &toolchain).unwrap();
        let kinds: Vec<_> = providers.iter().map(|p| p.kind()).collect();
        assert_eq!(kinds, CacheKind::ALL.to_vec());
        assert_eq!(providers[0].location(), gocache.path());
        assert_eq!(providers[1].location(), gomodcache.path());
        assert_eq!(providers[2].location(), gocache.path());
    }

    #[test]
    fn test_open_provider_missing_root() {
        let gocache = TempDir::new().unwrap();
        let toolchain = StaticToolchain::new(gocache.path(), gocache.path().join("pkg/mod"));

        let err = open_provider(CacheKind::Modules, &toolchain).err().unwrap();
        assert!(matches!(
            err,
            CacheError::RootMissing { kind: CacheKind::Modules, .. }
        ));
    }

    #[test]
    fn test_open_provider_unresolvable_root() {
        let toolchain = StaticToolchain::unresolvable();
        let err = open_provider(CacheKind::Build, &toolchain).err().unwrap();
        assert!(matches!(
            err,
            CacheError::RootUnresolvable { kind: CacheKind::Build, .. }
        ));
    }
}
