// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Per-character position tables.
//!
//! For every character that occurs in any key, one table listing every
//! occurrence: where in the key it sits and which lookaside entry the key
//! belongs to. Tables are sorted by `(lookaside, position)`, which is the
//! order the matcher walks them in. Building them is one pass over all keys
//! plus one sort per character; the sorts are independent so they run in
//! parallel.

use std::borrow::Cow;
use std::collections::HashMap;
use std::sync::Arc;

use rayon::prelude::*;

use crate::types::{IndexItem, LookasideEntry, PrioritizedId};

/// Fold `text` for comparison unless the index is case-sensitive.
///
/// Used on keys when tables are built and on query text when it is matched,
/// so both sides always agree on what a character is.
pub fn fold_case(text: &str, case_sensitive: bool) -> Cow<'_, str> {
    if case_sensitive || text.chars().all(folds_to_itself) {
        Cow::Borrowed(text)
    } else {
        Cow::Owned(text.to_lowercase())
    }
}

fn folds_to_itself(ch: char) -> bool {
    let mut lower = ch.to_lowercase();
    lower.next() == Some(ch) && lower.next().is_none()
}

/// Position tables keyed by character, each sorted by `(lookaside, position)`.
#[derive(Debug, Clone, Default)]
pub struct PositionTables {
    tables: Vec<(char, Vec<IndexItem>)>,
}

impl PositionTables {
    /// Build the tables for `lookaside` over the key table `keys`.
    ///
    /// Entries whose key id is out of range are skipped; the builder never
    /// produces them.
    pub fn build(keys: &[Arc<str>], lookaside: &[LookasideEntry], case_sensitive: bool) -> Self {
        // Fold each distinct key once, not once per insertion.
        let folded: Vec<Cow<'_, str>> = keys
            .par_iter()
            .map(|key| fold_case(key, case_sensitive))
            .collect();

        let mut by_char: HashMap<char, Vec<IndexItem>> = HashMap::new();
        for (lookaside_id, entry) in lookaside.iter().enumerate() {
            let Some(key) = folded.get(entry.key.id() as usize) else {
                continue;
            };
            let Some(owner) = PrioritizedId::new(lookaside_id as u32, entry.key.priority()) else {
                continue;
            };
            for (position, ch) in key.chars().enumerate() {
                by_char.entry(ch).or_default().push(IndexItem {
                    position: position as u32,
                    lookaside: owner,
                });
            }
        }

        let mut tables: Vec<(char, Vec<IndexItem>)> = by_char.into_iter().collect();
        tables.par_iter_mut().for_each(|(_, items)| items.sort_unstable());
        tables.sort_unstable_by_key(|(ch, _)| *ch);

        Self { tables }
    }

    /// Number of distinct characters.
    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    /// Total occurrences across all tables.
    pub fn item_count(&self) -> usize {
        self.tables.iter().map(|(_, items)| items.len()).sum()
    }

    pub fn get(&self, ch: char) -> Option<&[IndexItem]> {
        self.tables
            .binary_search_by_key(&ch, |(c, _)| *c)
            .ok()
            .map(|i| self.tables[i].1.as_slice())
    }

    /// Tables in character order.
    pub fn iter(&self) -> impl Iterator<Item = (char, &[IndexItem])> {
        self.tables.iter().map(|(ch, items)| (*ch, items.as_slice()))
    }
}
