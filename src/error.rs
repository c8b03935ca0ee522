use std::path::PathBuf;

use thiserror::Error;

use crate::provider::CacheKind;

pub type CacheResult<T> = Result<T, CacheError>;

/// Errors surfaced by cache providers and the coordinator.
///
/// Per-entry failures during a walk (unreadable metadata, failed deletes) are
/// not represented here: providers recover from them locally and report them
/// through the `skipped` counters on their results.
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("cannot resolve {kind} location: {reason}")]
    RootUnresolvable { kind: CacheKind, reason: String },

    #[error("{kind} directory does not exist: {}", path.display())]
    RootMissing { kind: CacheKind, path: PathBuf },

    #[error("cannot open {kind} directory {}: {source}", path.display())]
    RootUnreadable {
        kind: CacheKind,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{kind} unavailable: {source}")]
    ProviderUnavailable {
        kind: CacheKind,
        #[source]
        source: Box<CacheError>,
    },

    #[error("must specify at least one cache to clear: --all, --build, --modules, or --test")]
    InvalidSelection,

    #[error("no provider registered for {0}")]
    NotFound(CacheKind),

    #[error("go toolchain unavailable: {0}")]
    Toolchain(String),

    #[error("invalid config file {}: {message}", path.display())]
    Config { path: PathBuf, message: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl CacheError {
    /// The cache kind this error is attributed to, if any.
    pub fn kind(&self) -> Option<CacheKind> {
        match self {
            Self::RootUnresolvable { kind, .. }
            | Self::RootMissing { kind, .. }
            | Self::RootUnreadable { kind, .. }
            | Self::ProviderUnavailable { kind, .. } => Some(*kind),
            Self::NotFound(kind) => Some(*kind),
            Self::InvalidSelection | Self::Toolchain(_) | Self::Config { .. } | Self::Io(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages_name_the_cache() {
        let err = CacheError::RootMissing {
            kind: CacheKind::Modules,
            path: PathBuf::from("/nowhere"),
        };
        assert_eq!(
            err.to_string(),
            "module cache directory does not exist: /nowhere"
        );
        assert_eq!(err.kind(), Some(CacheKind::Modules));
    }

    #[test]
    fn test_provider_unavailable_wraps_cause() {
        let err = CacheError::ProviderUnavailable {
            kind: CacheKind::Build,
            source: Box::new(CacheError::RootUnresolvable {
                kind: CacheKind::Build,
                reason: "GOCACHE is empty".to_string(),
            }),
        };
        let msg = err.to_string();
        assert!(msg.starts_with("build cache unavailable"));
        assert!(msg.contains("GOCACHE is empty"));
    }

    #[test]
    fn test_invalid_selection_has_no_kind() {
        assert_eq!(CacheError::InvalidSelection.kind(), None);
    }
}
