// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Index builder: accumulate insertions, then serialize once.
//!
//! Inserting is cheap bookkeeping. Keys go through the interner, documents
//! are deduplicated by their canonical encoding, and each insertion appends
//! one lookaside entry. The expensive part (position tables) waits until
//! `write`, which runs on the worker pool.

pub mod interner;
pub mod tables;

use std::collections::{BTreeMap, HashMap};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use tempfile::NamedTempFile;

use crate::binary::{
    self, encode_pairs, encode_raw_array, encode_raw_dict, encode_str_array, MAX_FILE_SIZE,
    MAX_VALUE_DEPTH, METADATA_CASE_SENSITIVE, SECTION_DOCUMENTS, SECTION_KEYS, SECTION_LOOKASIDE, SECTION_METADATA, SECTION_TABLES,
    SECTION_VERSION,
};
use crate::error::{Error, Result};
use crate::task::{Cancellable, Completion, Pending, WorkerPool};
use crate::types::{LookasideEntry, PrioritizedId, MAX_ID};
use crate::value::Value;

pub use interner::StringInterner;
pub use tables::{fold_case, PositionTables};

/// Most distinct keys one index can hold (24-bit key ids).
pub const MAX_KEYS: usize = MAX_ID as usize;

/// Most insertions one index can hold (24-bit lookaside ids).
pub const MAX_ENTRIES: usize = MAX_ID as usize + 1;

// ============================================================================
// CONFIGURATION
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuilderConfig {
    /// Match keys exactly instead of case-folded.
    pub case_sensitive: bool,
    /// Distinct key limit, at most [`MAX_KEYS`].
    pub max_keys: usize,
}

impl Default for BuilderConfig {
    fn default() -> Self {
        Self {
            case_sensitive: false,
            max_keys: MAX_KEYS,
        }
    }
}

impl BuilderConfig {
    pub fn new(case_sensitive: bool) -> Self {
        Self {
            case_sensitive,
            ..Self::default()
        }
    }

    /// Lower the distinct key limit. Values above [`MAX_KEYS`] are clamped.
    pub fn with_max_keys(mut self, max_keys: usize) -> Self {
        self.max_keys = max_keys.min(MAX_KEYS);
        self
    }
}

// ============================================================================
// BUILDER
// ============================================================================

/// Everything an insertion touches. Shared with an in-flight write so the
/// builder stays usable while the worker serializes a snapshot.
#[derive(Debug, Clone, Default)]
struct BuilderState {
    config: BuilderConfig,
    keys: StringInterner,
    /// Canonical encodings, index = document id
    documents: Vec<Arc<[u8]>>,
    document_ids: HashMap<Arc<[u8]>, u32>,
    lookaside: Vec<LookasideEntry>,
    metadata: BTreeMap<String, Value>,
}

/// Accumulates `(key, document, priority)` insertions for one index.
///
/// ```ignore
/// let mut builder = IndexBuilder::new(false);
/// builder.insert("foo_bar", &Value::from("DocA"), 0)?;
/// builder.write("symbols.fzi", &Cancellable::new())?;
/// ```
///
/// A builder is written at most once. It is not meant to be shared between
/// threads while being filled; `&mut self` on every mutation enforces that.
#[derive(Debug, Default)]
pub struct IndexBuilder {
    state: Arc<BuilderState>,
    written: bool,
}

impl IndexBuilder {
    pub fn new(case_sensitive: bool) -> Self {
        Self::with_config(BuilderConfig::new(case_sensitive))
    }

    pub fn with_config(config: BuilderConfig) -> Self {
        let config = config.with_max_keys(config.max_keys);
        Self {
            state: Arc::new(BuilderState {
                config,
                ..BuilderState::default()
            }),
            written: false,
        }
    }

    pub fn config(&self) -> BuilderConfig {
        self.state.config
    }

    pub fn is_case_sensitive(&self) -> bool {
        self.state.config.case_sensitive
    }

    /// Record one insertion and return the document's id.
    ///
    /// An equal document inserted earlier (under any key) is reused. Fails
    /// with [`Error::Capacity`] before changing anything if a new key would
    /// exceed the key limit, the lookaside table is full, or the document is
    /// nested deeper than a reader accepts.
    pub fn insert(&mut self, key: &str, document: &Value, priority: u8) -> Result<u32> {
        check_depth(document)?;
        let existing_key = self.state.keys.lookup(key);
        let config = self.state.config;

        if existing_key.is_none() && self.state.keys.len() >= config.max_keys {
            return Err(Error::Capacity {
                what: "distinct keys",
                limit: config.max_keys,
            });
        }
        if self.state.lookaside.len() >= MAX_ENTRIES {
            return Err(Error::Capacity {
                what: "insertions",
                limit: MAX_ENTRIES,
            });
        }

        let encoded: Arc<[u8]> = Arc::from(binary::to_bytes(document));
        let state = Arc::make_mut(&mut self.state);

        let document_id = match state.document_ids.get(&encoded) {
            Some(&id) => id,
            None => {
                let id = state.documents.len() as u32;
                state.documents.push(Arc::clone(&encoded));
                state.document_ids.insert(encoded, id);
                id
            }
        };

        let key_id = match existing_key {
            Some(id) => id,
            None => state.keys.intern(key).0,
        };

        // Both limits were checked above, so the id fits in 24 bits.
        let key = PrioritizedId::new(key_id, priority).ok_or(Error::Capacity {
            what: "distinct keys",
            limit: config.max_keys,
        })?;
        state.lookaside.push(LookasideEntry { key, document_id });

        Ok(document_id)
    }

    /// Set a metadata entry. `Value::Null` removes it.
    ///
    /// `case-sensitive` is always written from the builder's own setting and
    /// cannot be overridden here. Values nested deeper than a reader accepts
    /// are refused with [`Error::Capacity`].
    pub fn set_metadata(&mut self, key: &str, value: Value) -> Result<()> {
        check_depth(&value)?;
        self.store_metadata(key, value);
        Ok(())
    }

    fn store_metadata(&mut self, key: &str, value: Value) {
        let state = Arc::make_mut(&mut self.state);
        if value.is_null() {
            state.metadata.remove(key);
        } else {
            state.metadata.insert(key.to_string(), value);
        }
    }

    pub fn set_metadata_string(&mut self, key: &str, value: &str) {
        self.store_metadata(key, Value::from(value));
    }

    pub fn set_metadata_u32(&mut self, key: &str, value: u32) {
        self.store_metadata(key, Value::U32(value));
    }

    pub fn set_metadata_u64(&mut self, key: &str, value: u64) {
        self.store_metadata(key, Value::U64(value));
    }

    /// A previously inserted document, decoded from its stored copy.
    pub fn get_document(&self, document_id: u32) -> Option<Value> {
        let bytes = self.state.documents.get(document_id as usize)?;
        binary::decode_value(bytes).ok()
    }

    pub fn document_count(&self) -> usize {
        self.state.documents.len()
    }

    pub fn key_count(&self) -> usize {
        self.state.keys.len()
    }

    /// Number of insertions (lookaside entries).
    pub fn len(&self) -> usize {
        self.state.lookaside.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.lookaside.is_empty()
    }

    /// Serialize in memory. Does not count as the builder's one write.
    pub fn to_bytes(&self) -> Vec<u8> {
        match serialize(&self.state, &Cancellable::new()) {
            Completion::Done(bytes) => bytes,
            Completion::Cancelled => Vec::new(),
        }
    }

    /// Write the index to `path` on the worker pool and wait for it.
    pub fn write(
        &mut self,
        path: impl AsRef<Path>,
        cancellable: &Cancellable,
    ) -> Result<Completion<()>> {
        self.write_async(path, cancellable.clone()).wait()
    }

    /// Start writing the index to `path` on the worker pool.
    ///
    /// The file appears atomically: it is written to a temporary file in the
    /// same directory and renamed into place only after the last byte is
    /// synced. A cancelled write leaves `path` untouched.
    pub fn write_async(&mut self, path: impl AsRef<Path>, cancellable: Cancellable) -> Pending<()> {
        if self.written {
            return Pending::ready(Err(Error::AlreadyWritten));
        }
        self.written = true;

        let state = Arc::clone(&self.state);
        let path = path.as_ref().to_path_buf();
        WorkerPool::get().run(move || write_file(&state, &path, &cancellable))
    }
}

// ============================================================================
// SERIALIZATION
// ============================================================================

fn write_file(state: &BuilderState, path: &Path, cancellable: &Cancellable) -> Result<Completion<()>> {
    let started = Instant::now();

    let bytes = match serialize(state, cancellable) {
        Completion::Done(bytes) => bytes,
        Completion::Cancelled => return Ok(Completion::Cancelled),
    };
    check_file_size(bytes.len())?;

    let dir = target_dir(path);
    let mut tmp = NamedTempFile::new_in(&dir)
        .map_err(|e| Error::io(dir.display().to_string(), e))?;
    tmp.write_all(&bytes)
        .and_then(|()| tmp.as_file().sync_all())
        .map_err(|e| Error::io(tmp.path().display().to_string(), e))?;

    if cancellable.tripped("persist") {
        // Dropping the temp file removes it.
        return Ok(Completion::Cancelled);
    }

    tmp.persist(path)
        .map_err(|e| Error::io(path.display().to_string(), e.error))?;

    tracing::debug!(
        path = %path.display(),
        bytes = bytes.len(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "wrote index"
    );
    Ok(Completion::Done(()))
}

fn check_depth(value: &Value) -> Result<()> {
    if value.depth() > MAX_VALUE_DEPTH {
        return Err(Error::Capacity {
            what: "levels of nesting in one value",
            limit: MAX_VALUE_DEPTH,
        });
    }
    Ok(())
}

/// Readers refuse anything larger, so nothing larger is persisted.
fn check_file_size(len: usize) -> Result<()> {
    if len > MAX_FILE_SIZE {
        return Err(Error::Capacity {
            what: "bytes in one index file",
            limit: MAX_FILE_SIZE,
        });
    }
    Ok(())
}

/// Directory the temp file goes in: the target's own, so the rename stays on
/// one filesystem.
fn target_dir(path: &Path) -> PathBuf {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

/// Encode the complete container.
fn serialize(state: &BuilderState, cancellable: &Cancellable) -> Completion<Vec<u8>> {
    let config = state.config;
    let tables = PositionTables::build(state.keys.strings(), &state.lookaside, config.case_sensitive);

    tracing::debug!(
        keys = state.keys.len(),
        documents = state.documents.len(),
        entries = state.lookaside.len(),
        characters = tables.len(),
        items = tables.item_count(),
        "built position tables"
    );

    if cancellable.tripped("tables") {
        return Completion::Cancelled;
    }

    let mut documents = Vec::new();
    encode_raw_array(&state.documents, &mut documents);

    let mut keys = Vec::new();
    encode_str_array(state.keys.strings(), &mut keys);

    let mut lookaside = Vec::new();
    encode_pairs(
        state.lookaside.iter().map(|entry| entry.to_pair()),
        state.lookaside.len(),
        &mut lookaside,
    );

    let mut metadata = state.metadata.clone();
    metadata.insert(
        METADATA_CASE_SENSITIVE.to_string(),
        Value::Bool(config.case_sensitive),
    );
    let metadata = binary::to_bytes(&Value::Dict(metadata));

    let table_bytes = encode_tables(&tables);

    let version = binary::to_bytes(&Value::I32(binary::FORMAT_VERSION));

    // Keys in byte order.
    let mut root = Vec::new();
    encode_raw_dict(
        &[
            (SECTION_DOCUMENTS, documents.as_slice()),
            (SECTION_KEYS, keys.as_slice()),
            (SECTION_LOOKASIDE, lookaside.as_slice()),
            (SECTION_METADATA, metadata.as_slice()),
            (SECTION_TABLES, table_bytes.as_slice()),
            (SECTION_VERSION, version.as_slice()),
        ],
        &mut root,
    );

    Completion::Done(binary::write_container(&root))
}

fn encode_tables(tables: &PositionTables) -> Vec<u8> {
    // Single-character keys sort the same as their chars' UTF-8 bytes.
    let encoded: Vec<(String, Vec<u8>)> = tables
        .iter()
        .map(|(ch, items)| {
            let mut buf = Vec::with_capacity(items.len() * binary::PAIR_SIZE + 6);
            encode_pairs(items.iter().map(|item| item.to_pair()), items.len(), &mut buf);
            (ch.to_string(), buf)
        })
        .collect();
    let entries: Vec<(&str, &[u8])> = encoded
        .iter()
        .map(|(k, v)| (k.as_str(), v.as_slice()))
        .collect();

    let mut out = Vec::new();
    encode_raw_dict(&entries, &mut out);
    out
}
