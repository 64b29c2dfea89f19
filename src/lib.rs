// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Build-once, read-many fuzzy search over short strings.
//!
//! Keys (file names, command names, symbols) are inserted with an attached
//! document and a priority. A key matches a query when the query's
//! characters appear in the key in order, not necessarily next to each
//! other: `"fb"` matches `"foo_bar"`. Matches are ranked by priority first
//! and by how tightly and how early the characters landed second.
//!
//! # Architecture
//!
//! ```text
//! ┌───────────────┐  write   ┌──────────────┐  load   ┌──────────────┐
//! │ IndexBuilder  │─────────▶│  .fzi file   │────────▶│  FuzzyIndex  │
//! │ (build/)      │          │  (binary/)   │         │  (index/)    │
//! └───────────────┘          └──────────────┘         └──────┬───────┘
//!                                                            │ query
//!                                                     ┌──────▼───────┐
//!                                                     │ FuzzyMatches │
//!                                                     │ (search/)    │
//!                                                     └──────────────┘
//! ```
//!
//! Writing, loading and querying run on a bounded worker pool ([`task`]),
//! each with a blocking form, a [`Pending`] handle, and (for queries) a
//! callback form. All of them honor a [`Cancellable`].
//!
//! # Usage
//!
//! ```no_run
//! use std::sync::Arc;
//! use fzindex::{Cancellable, FuzzyIndex, IndexBuilder, QueryOptions, Value};
//!
//! let mut builder = IndexBuilder::new(false);
//! builder.insert("foo_bar", &Value::from("DocA"), 0)?;
//! builder.insert("foo_baz", &Value::from("DocB"), 1)?;
//! if builder.write("commands.fzi", &Cancellable::new())?.is_cancelled() {
//!     return Ok(());
//! }
//!
//! let index = Arc::new(FuzzyIndex::load("commands.fzi")?);
//! let Some(matches) = index.query("fb", QueryOptions::new(), &Cancellable::new())?.done() else {
//!     return Ok(());
//! };
//! for m in matches.iter() {
//!     println!("{:.4} {} {:?}", m.score, m.key, m.document);
//! }
//! # Ok::<(), fzindex::Error>(())
//! ```

pub mod binary;
pub mod build;
pub mod error;
pub mod index;
pub mod scoring;
pub mod search;
pub mod task;
pub mod types;
pub mod value;

#[doc(hidden)]
pub mod testing;

// Re-exports for public API
pub use build::{BuilderConfig, IndexBuilder, MAX_ENTRIES, MAX_KEYS};
pub use error::{Error, Result};
pub use index::{FuzzyIndex, IndexStats, SectionSizes};
pub use search::{FuzzyMatch, FuzzyMatches, QueryOptions};
pub use task::{Cancellable, Completion, Pending};
pub use types::{IndexItem, LookasideEntry, PrioritizedId};
pub use value::Value;
