// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Lazy per-character table cache.
//!
//! Load only records where each character's table sits in the file. The
//! first query that touches a character decodes its table into a shared
//! slice; every later query gets the same slice back. An index over a large
//! corpus may carry thousands of tables, and a query needs a handful.

use std::collections::HashMap;
use std::ops::Range;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::binary::{DictRef, ValueRef};
use crate::error::{Error, Result};
use crate::types::IndexItem;

#[derive(Debug, Default)]
pub(crate) struct TableCache {
    /// Where each character's pairs value sits in the backing buffer
    spans: HashMap<char, Range<usize>>,
    decoded: RwLock<HashMap<char, Arc<[IndexItem]>>>,
}

impl TableCache {
    /// Index the `tables` section. Every key must be exactly one character
    /// and every value a pairs array.
    pub(crate) fn locate(tables: DictRef<'_>) -> Result<Self> {
        let mut spans = HashMap::with_capacity(tables.len());
        for (name, value) in tables.iter() {
            let mut chars = name.chars();
            let ch = match (chars.next(), chars.next()) {
                (Some(ch), None) => ch,
                _ => {
                    return Err(Error::format(format!(
                        "table key {:?} is not a single character",
                        name
                    )))
                }
            };
            if value.as_pairs().is_none() {
                return Err(Error::format(format!(
                    "table for {:?} must be pairs, got {}",
                    ch,
                    value.type_name()
                )));
            }
            spans.insert(ch, value.span());
        }
        Ok(Self {
            spans,
            decoded: RwLock::new(HashMap::new()),
        })
    }

    pub(crate) fn contains(&self, ch: char) -> bool {
        self.spans.contains_key(&ch)
    }

    pub(crate) fn len(&self) -> usize {
        self.spans.len()
    }

    /// Characters in code point order.
    pub(crate) fn characters(&self) -> Vec<char> {
        let mut chars: Vec<char> = self.spans.keys().copied().collect();
        chars.sort_unstable();
        chars
    }

    /// Number of entries in a table, without decoding it.
    pub(crate) fn entry_count(&self, data: &[u8], ch: char) -> usize {
        self.spans
            .get(&ch)
            .and_then(|span| ValueRef::trusted(data, span.clone()).as_pairs())
            .map_or(0, |pairs| pairs.len())
    }

    /// The decoded table for `ch`, decoding and caching it on first use.
    pub(crate) fn get(&self, data: &[u8], ch: char) -> Option<Arc<[IndexItem]>> {
        let span = self.spans.get(&ch)?;

        if let Some(items) = self.decoded.read().get(&ch) {
            return Some(Arc::clone(items));
        }

        // Decode outside the lock; a racing decoder produces the same slice.
        let pairs = ValueRef::trusted(data, span.clone()).as_pairs()?;
        let items: Arc<[IndexItem]> = pairs.iter().map(IndexItem::from_pair).collect();
        tracing::trace!(character = %ch, entries = items.len(), "decoded position table");

        let mut decoded = self.decoded.write();
        Some(Arc::clone(decoded.entry(ch).or_insert(items)))
    }

    /// Number of tables decoded so far.
    pub(crate) fn decoded_len(&self) -> usize {
        self.decoded.read().len()
    }
}
