// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Arbitrary query text against a fixed index.

#![no_main]

use std::sync::{Arc, OnceLock};

use arbitrary::Arbitrary;
use fzindex::{Cancellable, FuzzyIndex, IndexBuilder, QueryOptions, Value};
use libfuzzer_sys::fuzz_target;

#[derive(Debug, Arbitrary)]
struct Input {
    query: String,
    max_matches: u8,
    case_sensitive: Option<bool>,
}

fn index() -> &'static Arc<FuzzyIndex> {
    static INDEX: OnceLock<Arc<FuzzyIndex>> = OnceLock::new();
    INDEX.get_or_init(|| {
        let mut builder = IndexBuilder::new(false);
        for (i, key) in ["open_file", "file_open", "Ärger", "ΣΟΦΙΑ", "🚀 launch", "aaaaaaaa"]
            .iter()
            .enumerate()
        {
            builder.insert(key, &Value::U32(i as u32 % 4), (i * 40) as u8).unwrap();
        }
        Arc::new(FuzzyIndex::from_bytes(builder.to_bytes()).unwrap())
    })
}

fuzz_target!(|input: Input| {
    let mut options = QueryOptions::new().with_max_matches(input.max_matches as usize);
    if let Some(case_sensitive) = input.case_sensitive {
        options = options.with_case_sensitive(case_sensitive);
    }
    let outcome = index().query_in_place(&input.query, options, &Cancellable::new());
    if let Some(matches) = outcome.done() {
        assert!(input.max_matches == 0 || matches.len() <= input.max_matches as usize);
        for m in matches.iter() {
            assert!(m.score > 0.0 && m.score <= 1.0);
        }
    }
});
