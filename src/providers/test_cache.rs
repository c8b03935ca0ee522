use std::fs::File;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use walkdir::DirEntry;

use crate::classifier::{self, EntryClass, HEADER_LEN};
use crate::error::CacheResult;
use crate::provider::{self, CacheKind, CacheProvider, ClearReport};
use crate::stats::{AgeRange, CacheStats, TestStats};

/// Cached `go test` results: the subset of `GOCACHE` entries whose content
/// looks like test output.
pub struct TestProvider {
    root: PathBuf,
}

impl TestProvider {
    /// Open the test cache at `root` (the build cache directory), which must
    /// exist.
    pub fn open(root: impl Into<PathBuf>) -> CacheResult<Self> {
        let root = root.into();
        super::ensure_exists(CacheKind::Test, &root)?;
        Ok(Self { root })
    }
}

/// Read up to [`HEADER_LEN`] bytes from the start of `path`.
fn read_header(path: &Path) -> io::Result<Vec<u8>> {
    let mut header = Vec::with_capacity(HEADER_LEN);
    File::open(path)?
        .take(HEADER_LEN as u64)
        .read_to_end(&mut header)?;
    Ok(header)
}

/// Classify a walked file. Files that are not `-d` data files are rejected
/// before their content is opened.
fn classify_entry(entry: &DirEntry) -> io::Result<EntryClass> {
    let name = entry.file_name().to_string_lossy();
    if !classifier::is_candidate(&name) {
        return Ok(EntryClass::NotTest);
    }
    let header = read_header(entry.path())?;
    Ok(classifier::classify(&name, &header))
}

impl CacheProvider for TestProvider {
    fn kind(&self) -> CacheKind {
        CacheKind::Test
    }

    fn location(&self) -> &Path {
        &self.root
    }

    fn stats(&self) -> CacheResult<CacheStats> {
        provider::open_root(CacheKind::Test, &self.root)?;

        let mut size = 0u64;
        let mut entry_count = 0usize;
        let mut ages = AgeRange::default();
        let mut unreadable = 0usize;

        let walk_skipped = provider::for_each_file(&self.root, |entry| {
            match classify_entry(entry) {
                Ok(EntryClass::Test) => {}
                Ok(EntryClass::NotTest) => return,
                Err(_) => {
                    unreadable += 1;
                    return;
                }
            }
            let Ok(metadata) = entry.metadata() else {
                unreadable += 1;
                return;
            };
            entry_count += 1;
            size += metadata.len();
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
            "walked test cache"
        );

        Ok(CacheStats::Test(TestStats {
            location: self.root.clone(),
            size,
            entry_count,
            oldest_entry: ages.oldest,
            newest_entry: ages.newest,
            skipped,
        }))
    }

    fn clear(&self) -> CacheResult<ClearReport> {
        let mut unreadable = 0usize;
        let mut report = provider::clear_files(CacheKind::Test, &self.root, |entry| {
            match classify_entry(entry) {
                Ok(class) => class.is_test(),
                Err(_) => {
                    unreadable += 1;
                    false
                }
            }
        })?;
        report.skipped += unreadable;
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn test_stats(provider: &TestProvider) -> TestStats {
        match provider.stats().unwrap() {
            CacheStats::Test(stats) => stats,
            other => panic!("expected test stats, got {other:?}"),
        }
    }

    fn write_files(dir: &Path, files: &[(&str, &[u8])]) {
        for (name, content) in files {
            fs::write(dir.join(name), content).unwrap();
        }
    }

    #[test]
    fn test_read_header_is_bounded() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("big-d");
        fs::write(&path, vec![b'a'; 2000]).unwrap();
        assert_eq!(read_header(&path).unwrap().len(), HEADER_LEN);

        fs::write(&path, b"ok").unwrap();
        assert_eq!(read_header(&path).unwrap(), b"ok");
    }

    #[test]
    fn test_stats_counts_only_test_entries() {
        let temp_dir = TempDir::new().unwrap();
        write_files(
            temp_dir.path(),
            &[
                ("t1-d", b"ok \ttest1"),
                ("t2-d", b"FAIL\ttest2"),
                ("b1-d", b"\x7fELFbuild"),
                ("b2-a", b"archive"),
            ],
        );

        let provider = TestProvider::open(temp_dir.path()).unwrap();
        let stats = test_stats(&provider);

        assert_eq!(stats.entry_count, 2);
        assert_eq!(stats.size, 9 + 10);
        assert!(stats.newest_entry.is_some());
    }

    #[test]
    fn test_stats_without_test_entries_has_no_timestamps() {
        let temp_dir = TempDir::new().unwrap();
        write_files(temp_dir.path(), &[("b1-d", b"!<arch>\n")]);

        let provider = TestProvider::open(temp_dir.path()).unwrap();
        let stats = test_stats(&provider);

        assert_eq!(stats.entry_count, 0);
        assert_eq!(stats.oldest_entry, None);
        assert_eq!(stats.newest_entry, None);
    }

    #[test]
    fn test_reclassifies_rewritten_file() {
        let temp_dir = TempDir::new().unwrap();
        write_files(temp_dir.path(), &[("x-d", b"ok \tpkg\t0.1s\n")]);
        let provider = TestProvider::open(temp_dir.path()).unwrap();
        assert_eq!(test_stats(&provider).entry_count, 1);

        write_files(temp_dir.path(), &[("x-d", b"go object linux/amd64")]);
        assert_eq!(test_stats(&provider).entry_count, 0);
    }

    #[test]
    fn test_clear_only_removes_test_entries() {
        let temp_dir = TempDir::new().unwrap();
        write_files(temp_dir.path(), &[("t1-d", b"ok \ttest1"), ("b1-d", b"\x7fELFbuild")]);

        let provider = TestProvider::open(temp_dir.path()).unwrap();
        let report = provider.clear().unwrap();

        assert_eq!(report.deleted, 1);
        assert_eq!(report.freed, 9);
        assert!(!temp_dir.path().join("t1-d").exists());
        assert!(temp_dir.path().join("b1-d").exists());
    }

    #[cfg(unix)]
    #[test]
    fn test_unreadable_data_file_is_skipped() {
        use crate::provider::permissions;

        if permissions::is_root() {
            return;
        }
        let temp_dir = TempDir::new().unwrap();
        write_files(
            temp_dir.path(),
            &[("t1-d", b"ok \ttest1"), ("locked-d", b"ok \tsecret")],
        );
        let locked = temp_dir.path().join("locked-d");
        permissions::set_mode(&locked, 0o000);

        let provider = TestProvider::open(temp_dir.path()).unwrap();
        let stats = test_stats(&provider);
        assert_eq!(stats.entry_count, 1);
        assert_eq!(stats.size, 9);
        assert_eq!(stats.skipped, 1);

        let report = provider.clear().unwrap();
        assert_eq!(report.deleted, 1);
        assert_eq!(report.freed, 9);
        assert_eq!(report.skipped, 1);
        assert!(locked.exists());
    }
}
