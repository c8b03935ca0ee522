use std::path::{Path, PathBuf};
use std::time::SystemTime;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::provider::CacheKind;

const MIB: u64 = 1024 * 1024;

/// Files below this size are "small".
pub const SMALL_LIMIT: u64 = MIB;
/// Files below this size (and not small) are "medium"; the rest are "large".
pub const MEDIUM_LIMIT: u64 = 10 * MIB;

/// Build cache entries bucketed by file size.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SizeDistribution {
    pub small_count: usize,
    pub small_size: u64,
    pub medium_count: usize,
    pub medium_size: u64,
    pub large_count: usize,
    pub large_size: u64,
}

impl SizeDistribution {
    pub fn record(&mut self, size: u64) {
        if size < SMALL_LIMIT {
            self.small_count += 1;
            self.small_size += size;
        } else if size < MEDIUM_LIMIT {
            self.medium_count += 1;
            self.medium_size += size;
        } else {
            self.large_count += 1;
            self.large_size += size;
        }
    }
}

/// Oldest and newest modification times seen during a walk.
/// Both stay `None` until the first timestamp is observed.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct AgeRange {
    pub oldest: Option<DateTime<Utc>>,
    pub newest: Option<DateTime<Utc>>,
}

impl AgeRange {
    pub fn observe(&mut self, modified: SystemTime) {
        let t = DateTime::<Utc>::from(modified);
        if self.oldest.map_or(true, |o| t < o) {
            self.oldest = Some(t);
        }
        if self.newest.map_or(true, |n| t > n) {
            self.newest = Some(t);
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BuildStats {
    pub location: PathBuf,
    pub size: u64,
    pub entry_count: usize,
    pub oldest_entry: Option<DateTime<Utc>>,
    pub newest_entry: Option<DateTime<Utc>>,
    pub distribution: SizeDistribution,
    pub skipped: usize,
}

/// A module in the module cache and the bytes attributed to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModuleInfo {
    pub path: String,
    pub size: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModuleStats {
    pub location: PathBuf,
    pub size: u64,
    pub module_count: usize,
    pub top_modules: Vec<ModuleInfo>,
    pub skipped: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TestStats {
    pub location: PathBuf,
    pub size: u64,
    pub entry_count: usize,
    pub oldest_entry: Option<DateTime<Utc>>,
    pub newest_entry: Option<DateTime<Utc>>,
    pub skipped: usize,
}

/// Snapshot produced by one `CacheProvider::stats` call.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CacheStats {
    Build(BuildStats),
    Modules(ModuleStats),
    Test(TestStats),
}

impl CacheStats {
    pub fn kind(&self) -> CacheKind {
        match self {
            Self::Build(_) => CacheKind::Build,
            Self::Modules(_) => CacheKind::Modules,
            Self::Test(_) => CacheKind::Test,
        }
    }

    pub fn location(&self) -> &Path {
        match self {
            Self::Build(s) => &s.location,
            Self::Modules(s) => &s.location,
            Self::Test(s) => &s.location,
        }
    }

    pub fn size(&self) -> u64 {
        match self {
            Self::Build(s) => s.size,
            Self::Modules(s) => s.size,
            Self::Test(s) => s.size,
        }
    }

    /// Entry count for build and test caches, module count for the module cache.
    pub fn item_count(&self) -> usize {
        match self {
            Self::Build(s) => s.entry_count,
            Self::Modules(s) => s.module_count,
            Self::Test(s) => s.entry_count,
        }
    }

    pub fn skipped(&self) -> usize {
        match self {
            Self::Build(s) => s.skipped,
            Self::Modules(s) => s.skipped,
            Self::Test(s) => s.skipped,
        }
    }
}
