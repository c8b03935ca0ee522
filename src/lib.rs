//! gocachectl - inspect and clear the Go toolchain caches
//!
//! Three caches are managed through one [`CacheProvider`] contract:
//! the build cache (`GOCACHE`), the module cache (`GOMODCACHE`), and the test
//! cache, which shares its directory with the build cache and is told apart by
//! sniffing file content (see [`classifier`]). A [`Coordinator`] aggregates
//! statistics and clears selected caches, isolating failures per cache.

pub mod classifier;
pub mod config;
pub mod coordinator;
pub mod disk_info;
pub mod error;
pub mod provider;
pub mod providers;
pub mod ranker;
pub mod stats;
pub mod toolchain;
pub mod utils;

pub use classifier::{classify, EntryClass};
pub use config::Config;
pub use coordinator::{AggregateStats, ClearOutcome, ClearSelection, Coordinator, ProviderFailure};
pub use disk_info::{disk_info, DiskInfo};
pub use error::{CacheError, CacheResult};
pub use provider::{CacheKind, CacheProvider, ClearReport};
pub use providers::{BuildProvider, ModuleProvider, TestProvider};
pub use stats::{BuildStats, CacheStats, ModuleInfo, ModuleStats, SizeDistribution, TestStats};
pub use toolchain::{GoToolchain, StaticToolchain, Toolchain};
