// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Indexed subsequence matching over position tables.
//!
//! One table per query character, in query order. Every entry of the first
//! table is an anchor: a place where some key starts a candidate alignment.
//! From an anchor, the matcher looks in the next table for the first
//! occurrence of the next character in the same key strictly after the
//! anchor, and so on down the tables. Reaching the last table means the key
//! contains the query as a subsequence.
//!
//! All tables are sorted by `(lookaside, position)`, and anchors are visited
//! in that same order. That lets each table keep one forward-only cursor
//! shared by every anchor: anything a cursor has skipped can never extend a
//! later anchor, so the whole search is close to a linear merge.
//!
//! The search is depth-first with an explicit stack rather than recursion,
//! so a long query cannot exhaust the thread's stack.
//!
//! # Algorithm (per frame)
//!
//! ```text
//! skip entries with (lookaside, position) <= (item.lookaside, item.position)
//! entry.lookaside > item.lookaside  → fail (key has no further occurrence)
//! otherwise cost += entry.position - item.position, then
//!   last table  → record (cost, entry.position) for item.lookaside, succeed
//!   else        → descend with entry; if the child fails, step past entry
//! ```

use std::sync::Arc;

use crate::scoring::anchor_cost;
use crate::types::{IndexItem, PrioritizedId};

/// Best alignment found for one lookaside entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Alignment {
    pub lookaside: PrioritizedId,
    /// Anchor cost plus the gaps between matched characters
    pub cost: u32,
    /// Where the last query character landed in the key
    pub last_position: u32,
}

/// Align the query described by `tables` (one per character, in order).
///
/// Results come out in table order, at most one per lookaside entry.
pub(crate) fn align(tables: &[Arc<[IndexItem]>]) -> Vec<Alignment> {
    match tables {
        [] => Vec::new(),
        [only] => single(only),
        [anchors, ..] => {
            let mut matcher = Matcher::new(tables);
            for &anchor in anchors.iter() {
                matcher.extend(anchor);
            }
            matcher.found
        }
    }
}

/// One-character query: every key containing it matches at its first
/// occurrence.
fn single(table: &[IndexItem]) -> Vec<Alignment> {
    let mut out: Vec<Alignment> = Vec::new();
    for item in table {
        if out.last().is_some_and(|last| last.lookaside == item.lookaside) {
            continue;
        }
        out.push(Alignment {
            lookaside: item.lookaside,
            cost: item.position,
            last_position: item.position,
        });
    }
    out
}

#[derive(Debug, Clone, Copy)]
struct Frame {
    item: IndexItem,
    /// Table searched for the next character
    table: usize,
    cost: u32,
}

enum Step {
    Fail,
    Found { cost: u32, last_position: u32 },
    Descend(Frame),
}

struct Matcher<'t> {
    tables: &'t [Arc<[IndexItem]>],
    /// Forward-only cursor per table, shared by all anchors
    cursors: Vec<usize>,
    stack: Vec<Frame>,
    found: Vec<Alignment>,
}

impl<'t> Matcher<'t> {
    fn new(tables: &'t [Arc<[IndexItem]>]) -> Self {
        Self {
            tables,
            cursors: vec![0; tables.len()],
            stack: Vec::with_capacity(tables.len()),
            found: Vec::new(),
        }
    }

    fn extend(&mut self, anchor: IndexItem) {
        self.stack.clear();
        self.stack.push(Frame {
            item: anchor,
            table: 1,
            cost: anchor_cost(anchor.position),
        });

        // Result of the frame just popped, handed to its parent.
        let mut child: Option<bool> = None;

        while let Some(&frame) = self.stack.last() {
            match child.take() {
                Some(true) => {
                    self.stack.pop();
                    child = Some(true);
                    continue;
                }
                Some(false) => self.cursors[frame.table] += 1,
                None => {}
            }

            match self.scan(frame) {
                Step::Fail => {
                    self.stack.pop();
                    child = Some(false);
                }
                Step::Found {
                    cost,
                    last_position,
                } => {
                    self.record(frame.item.lookaside, cost, last_position);
                    self.stack.pop();
                    child = Some(true);
                }
                Step::Descend(next) => self.stack.push(next),
            }
        }
    }

    /// Advance this frame's table cursor to the next usable entry.
    fn scan(&mut self, frame: Frame) -> Step {
        let table = &self.tables[frame.table];
        let cursor = &mut self.cursors[frame.table];
        let item = frame.item;

        while let Some(&next) = table.get(*cursor) {
            if next.lookaside < item.lookaside
                || (next.lookaside == item.lookaside && next.position <= item.position)
            {
                *cursor += 1;
                continue;
            }
            if next.lookaside > item.lookaside {
                return Step::Fail;
            }

            let cost = frame
                .cost
                .saturating_add(next.position - item.position);
            return if frame.table + 1 < self.tables.len() {
                Step::Descend(Frame {
                    item: next,
                    table: frame.table + 1,
                    cost,
                })
            } else {
                Step::Found {
                    cost,
                    last_position: next.position,
                }
            };
        }

        Step::Fail
    }

    /// Keep the cheapest alignment per lookaside entry. Anchors of one entry
    /// are adjacent, so only the last record can share its entry.
    fn record(&mut self, lookaside: PrioritizedId, cost: u32, last_position: u32) {
        match self.found.last_mut() {
            Some(last) if last.lookaside == lookaside => {
                if cost < last.cost {
                    last.cost = cost;
                    last.last_position = last_position;
                }
            }
            _ => self.found.push(Alignment {
                lookaside,
                cost,
                last_position,
            }),
        }
    }
}
