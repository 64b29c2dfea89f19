// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Fuzzy queries against a loaded index.
//!
//! A query is a pipeline with three cancellation points between its phases:
//!
//! ```text
//! fold + fetch tables → align (matcher) → resolve + dedup by document → sort + truncate
//!                     ↑ check          ↑ check                         ↑ check
//! ```
//!
//! A character with no table means no key contains it, so the query stops
//! right there with an empty result instead of scanning anything.

mod matcher;
mod matches;

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use crate::build::fold_case;
use crate::error::Result;
use crate::index::FuzzyIndex;
use crate::scoring;
use crate::task::{Cancellable, Completion, Pending, WorkerPool};
use crate::types::IndexItem;

pub use matches::{FuzzyMatch, FuzzyMatches};

use matcher::Alignment;
use matches::RawMatch;

/// Per-query settings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct QueryOptions {
    /// Keep at most this many results; 0 keeps all.
    pub max_matches: usize,
    /// Override the index's own case sensitivity for the query text.
    pub case_sensitive: Option<bool>,
}

impl QueryOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_matches(mut self, max_matches: usize) -> Self {
        self.max_matches = max_matches;
        self
    }

    pub fn with_case_sensitive(mut self, case_sensitive: bool) -> Self {
        self.case_sensitive = Some(case_sensitive);
        self
    }
}

impl FuzzyIndex {
    /// Run a query on the worker pool and wait for it.
    pub fn query(
        self: &Arc<Self>,
        text: &str,
        options: QueryOptions,
        cancellable: &Cancellable,
    ) -> Result<Completion<FuzzyMatches>> {
        self.query_async(text, options, cancellable.clone()).wait()
    }

    /// Start a query on the worker pool.
    pub fn query_async(
        self: &Arc<Self>,
        text: &str,
        options: QueryOptions,
        cancellable: Cancellable,
    ) -> Pending<FuzzyMatches> {
        let index = Arc::clone(self);
        let text = text.to_string();
        WorkerPool::get().run(move || Ok(run_query(&index, &text, options, &cancellable)))
    }

    /// Run a query on the worker pool and pass the outcome to `callback`,
    /// which is called on the worker thread.
    pub fn query_with<F>(
        self: &Arc<Self>,
        text: &str,
        options: QueryOptions,
        cancellable: Cancellable,
        callback: F,
    ) where
        F: FnOnce(Result<Completion<FuzzyMatches>>) + Send + 'static,
    {
        let index = Arc::clone(self);
        let text = text.to_string();
        WorkerPool::get().run_with(
            move || Ok(run_query(&index, &text, options, &cancellable)),
            callback,
        );
    }

    /// Run a query on the calling thread, for callers already off the
    /// thread that must stay responsive.
    pub fn query_in_place(
        self: &Arc<Self>,
        text: &str,
        options: QueryOptions,
        cancellable: &Cancellable,
    ) -> Completion<FuzzyMatches> {
        run_query(self, text, options, cancellable)
    }
}

fn run_query(
    index: &Arc<FuzzyIndex>,
    text: &str,
    options: QueryOptions,
    cancellable: &Cancellable,
) -> Completion<FuzzyMatches> {
    if cancellable.tripped("start") {
        return Completion::Cancelled;
    }
    let started = Instant::now();
    let empty = || Completion::Done(FuzzyMatches::new(Arc::clone(index), text, Vec::new()));

    let case_sensitive = options
        .case_sensitive
        .unwrap_or_else(|| index.is_case_sensitive());
    let folded = fold_case(text, case_sensitive);

    let mut tables: Vec<Arc<[IndexItem]>> = Vec::new();
    for ch in folded.chars().filter(|c| !c.is_whitespace()) {
        match index.table(ch) {
            Some(table) => tables.push(table),
            None => return empty(),
        }
    }
    if tables.is_empty() {
        return empty();
    }

    let alignments = matcher::align(&tables);
    if cancellable.tripped("align") {
        return Completion::Cancelled;
    }

    let mut items: Vec<RawMatch> = alignments
        .into_iter()
        .filter_map(|alignment| resolve(index, alignment))
        .collect();
    // A one-character query reports every insertion that contains it.
    if tables.len() > 1 {
        items = best_per_document(items);
    }
    if cancellable.tripped("dedup") {
        return Completion::Cancelled;
    }

    items.sort_by(|a, b| {
        scoring::compare(
            a.score,
            index.key_bytes(a.key_id).unwrap_or_default(),
            b.score,
            index.key_bytes(b.key_id).unwrap_or_default(),
        )
    });
    let total = items.len();
    if options.max_matches > 0 {
        items.truncate(options.max_matches);
    }

    tracing::debug!(
        query = text,
        characters = tables.len(),
        matches = total,
        kept = items.len(),
        elapsed_us = started.elapsed().as_micros() as u64,
        "query finished"
    );

    Completion::Done(FuzzyMatches::new(Arc::clone(index), text, items))
}

/// Turn an alignment into a scored match. Entries that point outside the
/// lookaside table are dropped.
fn resolve(index: &FuzzyIndex, alignment: Alignment) -> Option<RawMatch> {
    let entry = index.lookaside(alignment.lookaside.id())?;
    let priority = entry.key.priority();
    Some(RawMatch {
        key_id: entry.key.id(),
        document_id: entry.document_id,
        priority,
        score: scoring::score(priority, alignment.last_position, alignment.cost),
    })
}

/// Keep the best-scoring match of each document. On equal scores the one
/// seen first wins.
fn best_per_document(items: Vec<RawMatch>) -> Vec<RawMatch> {
    let mut slots: HashMap<u32, usize> = HashMap::with_capacity(items.len());
    let mut best: Vec<RawMatch> = Vec::with_capacity(items.len());
    for item in items {
        match slots.entry(item.document_id) {
            Entry::Occupied(slot) => {
                let current = &mut best[*slot.get()];
                if item.score > current.score {
                    *current = item;
                }
            }
            Entry::Vacant(slot) => {
                slot.insert(best.len());
                best.push(item);
            }
        }
    }
    best
}
