//! Content sniffing for build cache entries.
//!
//! The Go test cache has no directory or name of its own: cached test output
//! is stored in `GOCACHE` as `<hash>-d` files, exactly like compiled build
//! output. The only way to tell them apart is to look at the first bytes of
//! the file. Every rule here leans towards [`EntryClass::NotTest`], since a
//! test entry that is kept is harmless while a build artifact removed by a
//! test-only clear is not.

/// Number of leading bytes the classifier needs to see.
pub const HEADER_LEN: usize = 512;

/// Suffix Go uses for cache data files (both build output and test output).
const DATA_SUFFIX: &str = "-d";

/// Headers of toolchain formats that are never test output. Checked first.
const EXCLUDE: &[&[u8]] = &[
    b"!<arch>",   // archive
    b"\x7fELF",   // ELF object
    b"\r\xff",    // gob-encoded binary data
    b"go object", // compiler object file
    b"go index",  // package index
    b"v1 ",       // action graph / metadata
    b"./",        // source file list
];

/// Headers of `go test` output.
const INCLUDE: &[&[u8]] = &[b"ok ", b"ok\t", b"=== RUN", b"FAIL"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryClass {
    Test,
    NotTest,
}

impl EntryClass {
    pub fn is_test(self) -> bool {
        self == Self::Test
    }
}

/// Whether a file name has the shape of a cache data file. Only such files
/// can hold test output.
pub fn is_candidate(file_name: &str) -> bool {
    file_name.ends_with(DATA_SUFFIX)
}

/// Decide whether a build cache file holds cached test output.
///
/// `file_name` is the entry's file name and `header` the first (up to
/// [`HEADER_LEN`]) bytes of its content. Shorter headers are classified on
/// whatever is present.
pub fn classify(file_name: &str, header: &[u8]) -> EntryClass {
    if !is_candidate(file_name) {
        return EntryClass::NotTest;
    }

    let header = &header[..header.len().min(HEADER_LEN)];

    if EXCLUDE.iter().any(|sig| header.starts_with(sig)) {
        return EntryClass::NotTest;
    }
    if INCLUDE.iter().any(|sig| header.starts_with(sig)) {
        return EntryClass::Test;
    }
    EntryClass::NotTest
}
