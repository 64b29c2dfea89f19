// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Test utilities shared across unit and integration tests.
//!
//! This module is always compiled but hidden from documentation.
//! It provides canonical fixtures to avoid duplication.

#![doc(hidden)]

use std::sync::Arc;

use crate::build::IndexBuilder;
use crate::index::FuzzyIndex;
use crate::search::{FuzzyMatches, QueryOptions};
use crate::task::Cancellable;
use crate::value::Value;

/// A small command palette: two keys sharing a prefix at different
/// priorities, one key sharing a document with another.
pub const COMMANDS: &[(&str, &str, u8)] = &[
    ("foo_bar", "DocA", 0),
    ("foo_baz", "DocB", 1),
    ("open_file", "open", 3),
    ("file_open", "open", 3),
    ("close_window", "close", 2),
];

/// Builder holding `entries` as `(key, document string, priority)`.
pub fn builder_with(case_sensitive: bool, entries: &[(&str, &str, u8)]) -> IndexBuilder {
    let mut builder = IndexBuilder::new(case_sensitive);
    for &(key, document, priority) in entries {
        if let Err(e) = builder.insert(key, &Value::from(document), priority) {
            panic!("fixture insert of {:?} failed: {}", key, e);
        }
    }
    builder
}

/// In-memory index over `entries`, built without touching disk.
pub fn index_with(case_sensitive: bool, entries: &[(&str, &str, u8)]) -> Arc<FuzzyIndex> {
    let bytes = builder_with(case_sensitive, entries).to_bytes();
    match FuzzyIndex::from_bytes(bytes) {
        Ok(index) => Arc::new(index),
        Err(e) => panic!("fixture index failed to load: {}", e),
    }
}

/// Case-folded index over [`COMMANDS`].
pub fn sample_index() -> Arc<FuzzyIndex> {
    index_with(false, COMMANDS)
}

/// Run `text` on the calling thread with default options.
pub fn query_all(index: &Arc<FuzzyIndex>, text: &str) -> FuzzyMatches {
    query_top(index, text, 0)
}

/// Run `text` on the calling thread keeping at most `max_matches`.
pub fn query_top(index: &Arc<FuzzyIndex>, text: &str, max_matches: usize) -> FuzzyMatches {
    let options = QueryOptions::new().with_max_matches(max_matches);
    match index.query_in_place(text, options, &Cancellable::new()).done() {
        Some(matches) => matches,
        None => panic!("query {:?} was cancelled without a cancel", text),
    }
}

/// Keys of `matches`, in rank order.
pub fn keys_of(matches: &FuzzyMatches) -> Vec<String> {
    (0..matches.len())
        .filter_map(|i| matches.key(i).map(str::to_string))
        .collect()
}

/// Documents of `matches` as strings, in rank order.
pub fn documents_of(matches: &FuzzyMatches) -> Vec<String> {
    matches
        .iter()
        .filter_map(|m| m.document.as_str().map(str::to_string))
        .collect()
}

/// True when `needle` is an in-order (not necessarily contiguous)
/// subsequence of `haystack`.
pub fn is_subsequence(needle: &str, haystack: &str) -> bool {
    let mut rest = haystack.chars();
    needle.chars().all(|c| rest.any(|h| h == c))
}
