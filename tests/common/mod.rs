//! Shared test utilities and fixtures.

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use fzindex::{Cancellable, Completion, FuzzyIndex, IndexBuilder};
use tempfile::TempDir;

// Re-export canonical test utilities from fzindex::testing
pub use fzindex::testing::{
    builder_with, documents_of, index_with, is_subsequence, keys_of, query_all, query_top,
    sample_index, COMMANDS,
};

/// Entries of the two-key walkthrough: one exact-priority key and one
/// mixed-case key at a lower rank.
pub const WALKTHROUGH: &[(&str, &str, u8)] = &[("foo_bar", "DocA", 0), ("FooBaz", "DocB", 10)];

// ============================================================================
// ON-DISK HELPERS
// ============================================================================

pub fn temp_dir() -> TempDir {
    tempfile::tempdir().expect("failed to create temp dir")
}

/// Write `builder` to `dir/name` and return the path.
pub fn write_builder(builder: &mut IndexBuilder, dir: &Path, name: &str) -> PathBuf {
    let path = dir.join(name);
    match builder.write(&path, &Cancellable::new()).expect("write failed") {
        Completion::Done(()) => path,
        Completion::Cancelled => panic!("write was cancelled without a cancel"),
    }
}

/// Build, write and load `entries` through a file in `dir`.
pub fn load_through_disk(
    dir: &Path,
    case_sensitive: bool,
    entries: &[(&str, &str, u8)],
) -> Arc<FuzzyIndex> {
    let mut builder = builder_with(case_sensitive, entries);
    let path = write_builder(&mut builder, dir, "index.fzi");
    Arc::new(FuzzyIndex::load(&path).expect("load failed"))
}

/// Flip one bit of the file at `path`, `offset` bytes from its start.
pub fn flip_bit(path: &Path, offset: usize) {
    let mut bytes = fs::read(path).expect("read failed");
    bytes[offset] ^= 0x01;
    fs::write(path, bytes).expect("rewrite failed");
}
