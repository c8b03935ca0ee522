use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{CacheError, CacheResult};

/// File looked up in the home directory when `--config` is not given.
pub const CONFIG_FILE_NAME: &str = ".gocachectl.toml";

/// User configuration, read from `~/.gocachectl.toml`.
///
/// ```toml
/// go_bin = "/usr/local/go/bin/go"
/// build_cache = "/data/gocache"
/// module_cache = "/data/gomodcache"
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// The `go` binary used to discover cache locations.
    pub go_bin: PathBuf,
    /// Build (and test) cache location, bypassing `go env GOCACHE`.
    pub build_cache: Option<PathBuf>,
    /// Module cache location, bypassing `go env GOMODCACHE`.
    pub module_cache: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            go_bin: PathBuf::from("go"),
            build_cache: None,
            module_cache: None,
        }
    }
}

impl Config {
    /// `~/.gocachectl.toml`, if a home directory is known.
    pub fn default_path() -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(CONFIG_FILE_NAME))
    }

    /// Load configuration.
    ///
    /// An explicit path must exist. Without one, the default file is used when
    /// present and built-in defaults otherwise.
    pub fn load(explicit: Option<&Path>) -> CacheResult<Self> {
        let path = match explicit {
            Some(path) => path.to_path_buf(),
            None => match Self::default_path() {
                Some(path) if path.is_file() => path,
                _ => return Ok(Self::default()),
            },
        };

        let text = fs::read_to_string(&path).map_err(|e| CacheError::Config {
            path: path.clone(),
            message: e.to_string(),
        })?;
        let config = Self::parse(&path, &text)?;
        tracing::debug!(path = %path.display(), "loaded config file");
        Ok(config)
    }

    fn parse(path: &Path, text: &str) -> CacheResult<Self> {
        toml::from_str(text).map_err(|e| CacheError::Config {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_parse_partial_config() {
        let config = Config::parse(Path::new("c.toml"), "module_cache = \"/data/mod\"\n").unwrap();
        assert_eq!(config.go_bin, PathBuf::from("go"));
        assert_eq!(config.build_cache, None);
        assert_eq!(config.module_cache, Some(PathBuf::from("/data/mod")));
    }

    #[test]
    fn test_parse_empty_config() {
        assert_eq!(
            Config::parse(Path::new("c.toml"), "").unwrap(),
            Config::default()
        );
    }

    #[test]
    fn test_parse_invalid_config() {
        let err = Config::parse(Path::new("c.toml"), "go_bin = [1, 2]").unwrap_err();
        assert!(matches!(err, CacheError::Config { .. }));
    }

    #[test]
    fn test_load_explicit_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("gocachectl.toml");
        fs::write(&path, "go_bin = \"/opt/go/bin/go\"\nbuild_cache = \"/tmp/build\"\n").unwrap();

        let config = Config::load(Some(&path)).unwrap();
        assert_eq!(config.go_bin, PathBuf::from("/opt/go/bin/go"));
        assert_eq!(config.build_cache, Some(PathBuf::from("/tmp/build")));
    }

    #[test]
    fn test_load_missing_explicit_file() {
        let temp_dir = TempDir::new().unwrap();
        let err = Config::load(Some(&temp_dir.path().join("absent.toml"))).unwrap_err();
        assert!(matches!(err, CacheError::Config { .. }));
    }
}
