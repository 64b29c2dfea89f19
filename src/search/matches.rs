// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Query results: a ranked, filterable sequence of matches.

use std::fmt;
use std::sync::Arc;

use crate::index::FuzzyIndex;
use crate::value::Value;

/// One scored result.
///
/// `key` borrows from the index's backing buffer and lives as long as the
/// [`FuzzyMatches`] it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct FuzzyMatch<'a> {
    pub document: Value,
    pub key: &'a str,
    pub score: f32,
    pub priority: u8,
    pub document_id: u32,
}

/// A resolved match before its document is decoded.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct RawMatch {
    pub key_id: u32,
    pub document_id: u32,
    pub priority: u8,
    pub score: f32,
}

/// Change listener: `(position, removed, added)`.
type ItemsChanged = Box<dyn Fn(usize, usize, usize) + Send + Sync>;

/// Ordered results of one query.
///
/// Highest score first, ties broken by key. Holds the index alive so the
/// keys its matches borrow stay valid.
pub struct FuzzyMatches {
    index: Arc<FuzzyIndex>,
    query: String,
    items: Vec<RawMatch>,
    listeners: Vec<(usize, ItemsChanged)>,
    next_listener: usize,
}

impl FuzzyMatches {
    pub(crate) fn new(index: Arc<FuzzyIndex>, query: &str, items: Vec<RawMatch>) -> Self {
        Self {
            index,
            query: query.to_string(),
            items,
            listeners: Vec::new(),
            next_listener: 0,
        }
    }

    /// The query text as given by the caller.
    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn index(&self) -> &Arc<FuzzyIndex> {
        &self.index
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, position: usize) -> Option<FuzzyMatch<'_>> {
        let raw = self.items.get(position)?;
        Some(FuzzyMatch {
            document: self.index.document(raw.document_id)?,
            key: self.index.key(raw.key_id)?,
            score: raw.score,
            priority: raw.priority,
            document_id: raw.document_id,
        })
    }

    /// Key of the match at `position`, without decoding its document.
    pub fn key(&self, position: usize) -> Option<&str> {
        self.index.key(self.items.get(position)?.key_id)
    }

    pub fn score(&self, position: usize) -> Option<f32> {
        self.items.get(position).map(|raw| raw.score)
    }

    pub fn iter(&self) -> impl Iterator<Item = FuzzyMatch<'_>> + '_ {
        (0..self.items.len()).filter_map(move |i| self.get(i))
    }

    /// Keep only matches for which `keep` returns true.
    ///
    /// Listeners are told about each removed run, front to back, with
    /// positions that account for the runs already reported.
    pub fn retain(&mut self, mut keep: impl FnMut(&FuzzyMatch<'_>) -> bool) {
        let verdicts: Vec<bool> = (0..self.items.len())
            .map(|i| self.get(i).is_some_and(|m| keep(&m)))
            .collect();

        // (position in the filtered list, run length)
        let mut runs: Vec<(usize, usize)> = Vec::new();
        let mut kept = Vec::with_capacity(self.items.len());
        let mut in_run = false;
        for (raw, &retained) in self.items.iter().zip(&verdicts) {
            if retained {
                kept.push(*raw);
                in_run = false;
                continue;
            }
            match runs.last_mut() {
                Some((_, removed)) if in_run => *removed += 1,
                _ => runs.push((kept.len(), 1)),
            }
            in_run = true;
        }
        self.items = kept;

        for (position, removed) in runs {
            self.emit(position, removed, 0);
        }
    }

    /// Register a listener for `(position, removed, added)` changes.
    /// Returns an id for [`FuzzyMatches::disconnect`].
    pub fn connect_items_changed(
        &mut self,
        listener: impl Fn(usize, usize, usize) + Send + Sync + 'static,
    ) -> usize {
        let id = self.next_listener;
        self.next_listener += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    pub fn disconnect(&mut self, id: usize) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(listener, _)| *listener != id);
        self.listeners.len() != before
    }

    fn emit(&self, position: usize, removed: usize, added: usize) {
        for (_, listener) in &self.listeners {
            listener(position, removed, added);
        }
    }
}

impl fmt::Debug for FuzzyMatches {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FuzzyMatches")
            .field("query", &self.query)
            .field("len", &self.items.len())
            .field("listeners", &self.listeners.len())
            .finish()
    }
}
