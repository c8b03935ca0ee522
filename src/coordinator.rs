//! Operations spanning every registered cache.

use rayon::prelude::*;
use serde::Serialize;

use crate::error::{CacheError, CacheResult};
use crate::provider::{CacheKind, CacheProvider, ClearReport};
use crate::providers;
use crate::stats::CacheStats;
use crate::toolchain::Toolchain;

/// Which caches a clear request targets. `all` implies the other three.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ClearSelection {
    pub build: bool,
    pub modules: bool,
    pub test: bool,
    pub all: bool,
}

impl ClearSelection {
    pub fn everything() -> Self {
        Self {
            all: true,
            ..Self::default()
        }
    }

    pub fn only(kind: CacheKind) -> Self {
        let mut selection = Self::default();
        match kind {
            CacheKind::Build => selection.build = true,
            CacheKind::Modules => selection.modules = true,
            CacheKind::Test => selection.test = true,
        }
        selection
    }

    /// True when no cache is named.
    pub fn is_empty(&self) -> bool {
        !(self.all || self.build || self.modules || self.test)
    }

    pub fn includes(&self, kind: CacheKind) -> bool {
        self.all
            || match kind {
                CacheKind::Build => self.build,
                CacheKind::Modules => self.modules,
                CacheKind::Test => self.test,
            }
    }

    /// Selected kinds in registration order.
    pub fn kinds(&self) -> Vec<CacheKind> {
        CacheKind::ALL.into_iter().filter(|&k| self.includes(k)).collect()
    }
}

/// A cache that could not be cleared at all.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProviderFailure {
    pub kind: CacheKind,
    pub message: String,
}

/// Result of a coordinator-wide clear.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ClearOutcome {
    pub build_deleted: usize,
    pub modules_deleted: usize,
    pub test_deleted: usize,
    pub total_freed: u64,
    /// Entries the successful providers could not read or delete.
    pub skipped: usize,
    /// Number of providers that failed entirely.
    pub provider_failures: usize,
    pub failures: Vec<ProviderFailure>,
}

impl ClearOutcome {
    pub fn deleted(&self, kind: CacheKind) -> usize {
        match kind {
            CacheKind::Build => self.build_deleted,
            CacheKind::Modules => self.modules_deleted,
            CacheKind::Test => self.test_deleted,
        }
    }

    pub fn total_deleted(&self) -> usize {
        self.build_deleted + self.modules_deleted + self.test_deleted
    }

    fn record(&mut self, kind: CacheKind, report: ClearReport) {
        match kind {
            CacheKind::Build => self.build_deleted += report.deleted,
            CacheKind::Modules => self.modules_deleted += report.deleted,
            CacheKind::Test => self.test_deleted += report.deleted,
        }
        self.total_freed += report.freed;
        self.skipped += report.skipped;
    }

    /// Count `kind` as a provider that failed entirely.
    pub fn record_failure(&mut self, kind: CacheKind, err: &CacheError) {
        self.provider_failures += 1;
        self.failures.push(ProviderFailure {
            kind,
            message: err.to_string(),
        });
    }
}

/// Statistics for every registered cache plus totals.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregateStats {
    pub caches: Vec<CacheStats>,
    pub total_size: u64,
    /// Entries of the build and test caches plus modules of the module cache.
    pub total_count: usize,
}

impl AggregateStats {
    pub fn from_caches(caches: Vec<CacheStats>) -> Self {
        let total_size = caches.iter().map(CacheStats::size).sum();
        let total_count = caches.iter().map(CacheStats::item_count).sum();
        Self {
            caches,
            total_size,
            total_count,
        }
    }

    pub fn get(&self, kind: CacheKind) -> Option<&CacheStats> {
        self.caches.iter().find(|s| s.kind() == kind)
    }
}

/// An ordered set of cache providers.
pub struct Coordinator {
    providers: Vec<Box<dyn CacheProvider>>,
}

impl Coordinator {
    pub fn new(providers: Vec<Box<dyn CacheProvider>>) -> Self {
        Self { providers }
    }

    /// Open providers for `kinds` through `toolchain`.
    pub fn discover(kinds: &[CacheKind], toolchain: &dyn Toolchain) -> CacheResult<Self> {
        Ok(Self::new(providers::open_providers(kinds, toolchain)?))
    }

    pub fn providers(&self) -> &[Box<dyn CacheProvider>] {
        &self.providers
    }

    /// Collect statistics from every provider. Providers are walked in
    /// parallel; the result keeps registration order. Any failure aborts.
    pub fn all_stats(&self) -> CacheResult<AggregateStats> {
        let caches = self
            .providers
            .par_iter()
            .map(|provider| {
                provider.stats().map_err(|source| CacheError::ProviderUnavailable {
                    kind: provider.kind(),
                    source: Box::new(source),
                })
            })
            .collect::<CacheResult<Vec<_>>>()?;

        Ok(AggregateStats::from_caches(caches))
    }

    /// Statistics of the first provider of the given kind.
    pub fn stats_by_kind(&self, kind: CacheKind) -> CacheResult<CacheStats> {
        let provider = self
            .providers
            .iter()
            .find(|p| p.kind() == kind)
            .ok_or(CacheError::NotFound(kind))?;
        provider.stats()
    }

    /// Clear every selected provider.
    ///
    /// A provider that fails is counted in `provider_failures` and does not
    /// stop the others. Providers run one after another in registration
    /// order, since the build and test caches share a directory.
    pub fn clear(&self, selection: ClearSelection) -> CacheResult<ClearOutcome> {
        if selection.is_empty() {
            return Err(CacheError::InvalidSelection);
        }

        let mut outcome = ClearOutcome::default();
        for provider in self.providers.iter().filter(|p| selection.includes(p.kind())) {
            let kind = provider.kind();
            match provider.clear() {
                Ok(report) => outcome.record(kind, report),
                Err(err) => {
                    tracing::warn!(cache = kind.name(), error = %err, "failed to clear cache");
                    outcome.record_failure(kind, &err);
                }
            }
        }
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::TestStats;
    use std::path::{Path, PathBuf};

    /// Provider returning canned results.
    struct FakeProvider {
        kind: CacheKind,
        location: PathBuf,
        size: u64,
        fail: bool,
    }

    impl FakeProvider {
        fn new(kind: CacheKind, size: u64) -> Self {
            Self {
                kind,
                location: PathBuf::from("/fake"),
                size,
                fail: false,
            }
        }

        fn failing(kind: CacheKind) -> Self {
            Self {
                fail: true,
                ..Self::new(kind, 0)
            }
        }

        fn error(&self) -> CacheError {
            CacheError::RootMissing {
                kind: self.kind,
                path: self.location.clone(),
            }
        }
    }

    impl CacheProvider for FakeProvider {
        fn kind(&self) -> CacheKind {
            self.kind
        }

        fn location(&self) -> &Path {
            &self.location
        }

        fn stats(&self) -> CacheResult<CacheStats> {
            if self.fail {
                return Err(self.error());
            }
            Ok(CacheStats::Test(TestStats {
                location: self.location.clone(),
                size: self.size,
                entry_count: 1,
                oldest_entry: None,
                newest_entry: None,
                skipped: 0,
            }))
        }

        fn clear(&self) -> CacheResult<ClearReport> {
            if self.fail {
                return Err(self.error());
            }
            Ok(ClearReport {
                deleted: 2,
                freed: self.size,
                skipped: 0,
            })
        }
    }

    fn coordinator(providers: Vec<FakeProvider>) -> Coordinator {
        Coordinator::new(
            providers
                .into_iter()
                .map(|p| Box::new(p) as Box<dyn CacheProvider>)
                .collect(),
        )
    }

    #[test]
    fn test_selection() {
        assert!(ClearSelection::default().is_empty());
        assert!(!ClearSelection::only(CacheKind::Test).is_empty());
        assert_eq!(
            ClearSelection::everything().kinds(),
            CacheKind::ALL.to_vec()
        );
        assert_eq!(
            ClearSelection::only(CacheKind::Modules).kinds(),
            vec![CacheKind::Modules]
        );
        assert!(!ClearSelection::only(CacheKind::Build).includes(CacheKind::Test));
    }

    #[test]
    fn test_all_stats_totals() {
        let coord = coordinator(vec![
            FakeProvider::new(CacheKind::Build, 100),
            FakeProvider::new(CacheKind::Modules, 20),
            FakeProvider::new(CacheKind::Test, 3),
        ]);
        let stats = coord.all_stats().unwrap();
        assert_eq!(stats.caches.len(), 3);
        assert_eq!(stats.total_size, 123);
        assert_eq!(stats.total_count, 3);
    }

    #[test]
    fn test_all_stats_fails_fast() {
        let coord = coordinator(vec![
            FakeProvider::new(CacheKind::Build, 100),
            FakeProvider::failing(CacheKind::Modules),
        ]);
        let err = coord.all_stats().unwrap_err();
        assert!(matches!(
            err,
            CacheError::ProviderUnavailable { kind: CacheKind::Modules, .. }
        ));
    }

    #[test]
    fn test_stats_by_kind_not_found() {
        let coord = coordinator(vec![FakeProvider::new(CacheKind::Build, 1)]);
        assert!(coord.stats_by_kind(CacheKind::Build).is_ok());
        assert!(matches!(
            coord.stats_by_kind(CacheKind::Test),
            Err(CacheError::NotFound(CacheKind::Test))
        ));
    }

    #[test]
    fn test_clear_rejects_empty_selection() {
        let coord = coordinator(vec![FakeProvider::new(CacheKind::Build, 1)]);
        assert!(matches!(
            coord.clear(ClearSelection::default()),
            Err(CacheError::InvalidSelection)
        ));
    }

    #[test]
    fn test_clear_isolates_failures() {
        let coord = coordinator(vec![
            FakeProvider::new(CacheKind::Build, 100),
            FakeProvider::failing(CacheKind::Modules),
            FakeProvider::new(CacheKind::Test, 7),
        ]);
        let outcome = coord.clear(ClearSelection::everything()).unwrap();

        assert_eq!(outcome.build_deleted, 2);
        assert_eq!(outcome.modules_deleted, 0);
        assert_eq!(outcome.test_deleted, 2);
        assert_eq!(outcome.total_freed, 107);
        assert_eq!(outcome.provider_failures, 1);
        assert_eq!(outcome.failures[0].kind, CacheKind::Modules);
    }

    #[test]
    fn test_clear_only_selected() {
        let coord = coordinator(vec![
            FakeProvider::new(CacheKind::Build, 100),
            FakeProvider::new(CacheKind::Test, 7),
        ]);
        let outcome = coord.clear(ClearSelection::only(CacheKind::Test)).unwrap();

        assert_eq!(outcome.build_deleted, 0);
        assert_eq!(outcome.test_deleted, 2);
        assert_eq!(outcome.total_freed, 7);
        assert_eq!(outcome.total_deleted(), 2);
    }
}
