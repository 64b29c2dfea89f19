// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Index reader: validate once, then read in place.
//!
//! Loading reads the file into one shared buffer, checks the frame and walks
//! the whole root value once to validate it. After that nothing is copied
//! out except the lookaside table (decoded up front, since every match
//! resolves through it) and the metadata dict (small). Keys and documents
//! are read from the buffer on demand; per-character tables are decoded
//! lazily and cached.
//!
//! A loaded index never changes. Share it as `Arc<FuzzyIndex>` across any
//! number of threads and queries.

mod tables;

use std::collections::BTreeMap;
use std::fmt;
use std::ops::Range;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use crate::binary::{self, Sections, ValueRef, METADATA_CASE_SENSITIVE, MAX_FILE_SIZE};
use crate::error::{Error, Result};
use crate::task::{Completion, Pending, WorkerPool};
use crate::types::{IndexItem, LookasideEntry};
use crate::value::Value;

use tables::TableCache;

/// A loaded, immutable fuzzy index.
pub struct FuzzyIndex {
    data: Arc<[u8]>,
    case_sensitive: bool,
    metadata: BTreeMap<String, Value>,
    /// Byte range of each key's UTF-8 text, index = key id
    keys: Vec<Range<usize>>,
    /// Byte range of each encoded document, index = document id
    documents: Vec<Range<usize>>,
    lookaside: Vec<LookasideEntry>,
    tables: TableCache,
    spans: SectionSizes,
}

/// Encoded size of each section, for `inspect`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SectionSizes {
    pub metadata: usize,
    pub keys: usize,
    pub lookaside: usize,
    pub tables: usize,
    pub documents: usize,
}

/// Counts and sizes describing a loaded index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexStats {
    pub file_size: usize,
    pub case_sensitive: bool,
    pub keys: usize,
    pub documents: usize,
    pub lookaside: usize,
    pub characters: usize,
    pub table_entries: usize,
    pub metadata_entries: usize,
    pub sections: SectionSizes,
}

impl FuzzyIndex {
    /// Read and validate the index file at `path`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let context = || path.display().to_string();

        let size = std::fs::metadata(path)
            .map_err(|e| Error::io(context(), e))?
            .len();
        if size > MAX_FILE_SIZE as u64 {
            return Err(Error::format(format!(
                "file too large: {} bytes (max {})",
                size, MAX_FILE_SIZE
            )));
        }

        let bytes = std::fs::read(path).map_err(|e| Error::io(context(), e))?;
        let index = Self::from_bytes(bytes)?;
        tracing::debug!(path = %path.display(), "loaded index");
        Ok(index)
    }

    /// Load on the worker pool.
    pub fn load_async(path: impl Into<PathBuf>) -> Pending<FuzzyIndex> {
        let path = path.into();
        WorkerPool::get().run(move || Self::load(&path).map(Completion::Done))
    }

    /// Validate an in-memory index.
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self> {
        let started = Instant::now();
        let data: Arc<[u8]> = Arc::from(bytes);

        let root = binary::open_container(&data)?;
        let sections = Sections::locate(root)?;

        let metadata: BTreeMap<String, Value> = sections
            .metadata
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_value()))
            .collect();
        let case_sensitive = metadata
            .get(METADATA_CASE_SENSITIVE)
            .and_then(Value::as_bool)
            .ok_or_else(|| Error::format("metadata lacks a boolean case-sensitive entry"))?;

        let keys = sections
            .keys
            .iter()
            .map(key_text_span)
            .collect::<Result<Vec<_>>>()?;

        let documents: Vec<Range<usize>> = sections.documents.iter().map(|d| d.span()).collect();

        let lookaside: Vec<LookasideEntry> = sections
            .lookaside
            .iter()
            .map(LookasideEntry::from_pair)
            .collect();
        for (id, entry) in lookaside.iter().enumerate() {
            if entry.key.id() as usize >= keys.len() {
                return Err(Error::format(format!(
                    "lookaside entry {} references key {} of {}",
                    id,
                    entry.key.id(),
                    keys.len()
                )));
            }
            if entry.document_id as usize >= documents.len() {
                return Err(Error::format(format!(
                    "lookaside entry {} references document {} of {}",
                    id,
                    entry.document_id,
                    documents.len()
                )));
            }
        }

        let tables = TableCache::locate(sections.tables)?;

        let spans = SectionSizes {
            metadata: sections.metadata_span.len(),
            keys: sections.keys_span.len(),
            lookaside: sections.lookaside.len() * binary::PAIR_SIZE,
            tables: sections.tables_span.len(),
            documents: sections.documents_span.len(),
        };

        tracing::debug!(
            bytes = data.len(),
            keys = keys.len(),
            documents = documents.len(),
            entries = lookaside.len(),
            characters = tables.len(),
            elapsed_us = started.elapsed().as_micros() as u64,
            "validated index"
        );

        Ok(Self {
            data,
            case_sensitive,
            metadata,
            keys,
            documents,
            lookaside,
            tables,
            spans,
        })
    }

    // ------------------------------------------------------------------------
    // Metadata
    // ------------------------------------------------------------------------

    pub fn get_metadata(&self, key: &str) -> Option<&Value> {
        self.metadata.get(key)
    }

    pub fn get_metadata_string(&self, key: &str) -> Option<&str> {
        self.get_metadata(key).and_then(Value::as_str)
    }

    pub fn get_metadata_u32(&self, key: &str) -> Option<u32> {
        self.get_metadata(key).and_then(Value::as_u32)
    }

    pub fn get_metadata_u64(&self, key: &str) -> Option<u64> {
        self.get_metadata(key).and_then(Value::as_u64)
    }

    /// All metadata entries in key order.
    pub fn metadata(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.metadata.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn is_case_sensitive(&self) -> bool {
        self.case_sensitive
    }

    // ------------------------------------------------------------------------
    // Tables
    // ------------------------------------------------------------------------

    pub fn key_count(&self) -> usize {
        self.keys.len()
    }

    pub fn document_count(&self) -> usize {
        self.documents.len()
    }

    pub fn lookaside_len(&self) -> usize {
        self.lookaside.len()
    }

    pub fn key(&self, key_id: u32) -> Option<&str> {
        std::str::from_utf8(self.key_bytes(key_id)?).ok()
    }

    /// Raw key text; bytewise order equals string order.
    pub(crate) fn key_bytes(&self, key_id: u32) -> Option<&[u8]> {
        let span = self.keys.get(key_id as usize)?;
        self.data.get(span.clone())
    }

    /// Decode a stored document.
    pub fn document(&self, document_id: u32) -> Option<Value> {
        let span = self.documents.get(document_id as usize)?;
        Some(ValueRef::trusted(&self.data, span.clone()).to_value())
    }

    pub fn lookaside(&self, lookaside_id: u32) -> Option<LookasideEntry> {
        self.lookaside.get(lookaside_id as usize).copied()
    }

    /// Position table for `ch`, decoded on first use.
    pub fn table(&self, ch: char) -> Option<Arc<[IndexItem]>> {
        self.tables.get(&self.data, ch)
    }

    pub fn has_table(&self, ch: char) -> bool {
        self.tables.contains(ch)
    }

    /// Every indexed character, in code point order.
    pub fn characters(&self) -> Vec<char> {
        self.tables.characters()
    }

    /// Tables decoded so far by queries.
    pub fn decoded_tables(&self) -> usize {
        self.tables.decoded_len()
    }

    pub fn stats(&self) -> IndexStats {
        let table_entries = self
            .tables
            .characters()
            .into_iter()
            .map(|ch| self.tables.entry_count(&self.data, ch))
            .sum();
        IndexStats {
            file_size: self.data.len(),
            case_sensitive: self.case_sensitive,
            keys: self.keys.len(),
            documents: self.documents.len(),
            lookaside: self.lookaside.len(),
            characters: self.tables.len(),
            table_entries,
            metadata_entries: self.metadata.len(),
            sections: self.spans,
        }
    }
}

impl fmt::Debug for FuzzyIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FuzzyIndex")
            .field("bytes", &self.data.len())
            .field("case_sensitive", &self.case_sensitive)
            .field("keys", &self.keys.len())
            .field("documents", &self.documents.len())
            .field("lookaside", &self.lookaside.len())
            .field("characters", &self.tables.len())
            .finish()
    }
}

/// Range of a key's UTF-8 bytes inside the buffer.
fn key_text_span(key: ValueRef<'_>) -> Result<Range<usize>> {
    let text = key
        .as_str()
        .ok_or_else(|| Error::format(format!("key must be str, got {}", key.type_name())))?;
    let end = key.span().end;
    Ok(end - text.len()..end)
}
