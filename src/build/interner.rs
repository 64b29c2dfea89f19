// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! String interner for key deduplication.
//!
//! Maps repeated key strings to compact ids. The same symbol name inserted
//! for fifty documents? Store it once, reference it by id from every
//! lookaside entry. Ids are dense and assigned in first-seen order, so the
//! interner's string list is the key table as written to disk.

use std::collections::HashMap;
use std::sync::Arc;

/// Deduplicating arena of key strings.
///
/// Each distinct byte sequence is stored once. `intern` hands back the id and
/// a shared handle to the canonical copy; interning an equal string again
/// returns the same id and the same allocation.
#[derive(Debug, Clone, Default)]
pub struct StringInterner {
    /// Canonical copies, index = id
    strings: Vec<Arc<str>>,
    /// Reverse lookup: string → id
    lookup: HashMap<Arc<str>, u32>,
}

impl StringInterner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Intern `s`, returning its id and canonical copy.
    pub fn intern(&mut self, s: &str) -> (u32, Arc<str>) {
        if let Some((canonical, &id)) = self.lookup.get_key_value(s) {
            return (id, Arc::clone(canonical));
        }

        let id = self.strings.len() as u32;
        let canonical: Arc<str> = Arc::from(s);
        self.strings.push(Arc::clone(&canonical));
        self.lookup.insert(Arc::clone(&canonical), id);
        (id, canonical)
    }

    /// Id of an already interned string.
    pub fn lookup(&self, s: &str) -> Option<u32> {
        self.lookup.get(s).copied()
    }

    pub fn get(&self, id: u32) -> Option<&str> {
        self.strings.get(id as usize).map(|s| &**s)
    }

    pub fn len(&self) -> usize {
        self.strings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strings.is_empty()
    }

    /// All strings in id order.
    pub fn strings(&self) -> &[Arc<str>] {
        &self.strings
    }
}
