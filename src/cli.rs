use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use gocachectl::{CacheKind, ClearSelection};

#[derive(Parser)]
#[command(
    name = "gocachectl",
    about = "Inspect and clear the Go build, module and test caches",
    version
)]
pub struct Cli {
    /// Config file (default: ~/.gocachectl.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Minimal output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Show cache statistics
    Stats(CacheFlags),

    /// Clear cache entries (asks for confirmation unless --force)
    Clear {
        #[command(flatten)]
        caches: CacheFlags,

        /// Clear all caches
        #[arg(long)]
        all: bool,

        /// Skip the confirmation prompt
        #[arg(short, long)]
        force: bool,

        /// Show what would be deleted without deleting
        #[arg(long)]
        dry_run: bool,
    },

    /// Show cache locations and Go environment information
    Info,

    /// Print version information
    Version,
}

#[derive(Args, Default)]
pub struct CacheFlags {
    /// Build cache (GOCACHE)
    #[arg(long)]
    pub build: bool,

    /// Module cache (GOMODCACHE)
    #[arg(long)]
    pub modules: bool,

    /// Test cache (test results inside GOCACHE)
    #[arg(long)]
    pub test: bool,
}

impl CacheFlags {
    /// The cache named by the flags. Build wins over modules, modules over test.
    pub fn single(&self) -> Option<CacheKind> {
        if self.build {
            Some(CacheKind::Build)
        } else if self.modules {
            Some(CacheKind::Modules)
        } else if self.test {
            Some(CacheKind::Test)
        } else {
            None
        }
    }

    pub fn selection(&self, all: bool) -> ClearSelection {
        ClearSelection {
            build: self.build,
            modules: self.modules,
            test: self.test,
            all,
        }
    }
}
