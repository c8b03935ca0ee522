//! Discovery of cache locations and version information from the Go
//! toolchain.

use std::path::{Path, PathBuf};
use std::process::Command;

use crate::config::Config;
use crate::error::{CacheError, CacheResult};
use crate::provider::CacheKind;

/// Source of cache roots and toolchain version.
pub trait Toolchain: Send + Sync {
    /// Root directory of the cache of the given kind.
    fn cache_root(&self, kind: CacheKind) -> CacheResult<PathBuf>;

    /// Human-readable toolchain version, for reporting only.
    fn version(&self) -> CacheResult<String>;
}

/// The `go` binary, optionally with cache locations pinned by configuration.
#[derive(Debug, Clone)]
pub struct GoToolchain {
    go_bin: PathBuf,
    build_cache: Option<PathBuf>,
    module_cache: Option<PathBuf>,
}

impl GoToolchain {
    pub fn new(go_bin: impl Into<PathBuf>) -> Self {
        Self {
            go_bin: go_bin.into(),
            build_cache: None,
            module_cache: None,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self {
            go_bin: config.go_bin.clone(),
            build_cache: config.build_cache.clone(),
            module_cache: config.module_cache.clone(),
        }
    }

    /// Run `go env <key>` and return its trimmed, non-empty output.
    fn go_env(&self, key: &str) -> Result<String, String> {
        let output = Command::new(&self.go_bin)
            .args(["env", key])
            .output()
            .map_err(|e| format!("failed to run '{} env {key}': {e}", self.go_bin.display()))?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(format!("'{} env {key}' failed: {}", self.go_bin.display(), stderr.trim()));
        }

        let value = String::from_utf8_lossy(&output.stdout).trim().to_string();
        if value.is_empty() {
            return Err(format!("{key} is empty"));
        }
        Ok(value)
    }
}

impl Default for GoToolchain {
    fn default() -> Self {
        Self::new("go")
    }
}

impl Toolchain for GoToolchain {
    fn cache_root(&self, kind: CacheKind) -> CacheResult<PathBuf> {
        let pinned = match kind {
            CacheKind::Build | CacheKind::Test => &self.build_cache,
            CacheKind::Modules => &self.module_cache,
        };
        if let Some(path) = pinned {
            return Ok(path.clone());
        }

        self.go_env(kind.env_var())
            .map(PathBuf::from)
            .map_err(|reason| CacheError::RootUnresolvable { kind, reason })
    }

    fn version(&self) -> CacheResult<String> {
        let output = Command::new(&self.go_bin)
            .arg("version")
            .output()
            .map_err(|e| {
                CacheError::Toolchain(format!(
                    "failed to run '{} version': {e}",
                    self.go_bin.display()
                ))
            })?;
        if !output.status.success() {
            return Err(CacheError::Toolchain(format!(
                "'{} version' exited with {}",
                self.go_bin.display(),
                output.status
            )));
        }
        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }
}

/// A toolchain with fixed answers, for callers that already know where the
/// caches are.
#[derive(Debug, Clone)]
pub struct StaticToolchain {
    build_cache: Option<PathBuf>,
    module_cache: Option<PathBuf>,
    version: String,
}

impl StaticToolchain {
    pub fn new(build_cache: impl AsRef<Path>, module_cache: impl AsRef<Path>) -> Self {
        Self {
            build_cache: Some(build_cache.as_ref().to_path_buf()),
            module_cache: Some(module_cache.as_ref().to_path_buf()),
            version: "go version static".to_string(),
        }
    }

    /// A toolchain that cannot report any cache location.
    pub fn unresolvable() -> Self {
        Self {
            build_cache: None,
            module_cache: None,
            version: "go version static".to_string(),
        }
    }
}

impl Toolchain for StaticToolchain {
    fn cache_root(&self, kind: CacheKind) -> CacheResult<PathBuf> {
        let root = match kind {
            CacheKind::Build | CacheKind::Test => &self.build_cache,
            CacheKind::Modules => &self.module_cache,
        };
        root.clone().ok_or_else(|| CacheError::RootUnresolvable {
            kind,
            reason: format!("{} is empty", kind.env_var()),
        })
    }

    fn version(&self) -> CacheResult<String> {
        Ok(self.version.clone())
    }
}
