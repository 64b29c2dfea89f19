// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Value decoding behind a valid frame.
//!
//! Random bytes almost never pass the CRC check, so this target frames the
//! input with a correct header and footer and lets the fuzzer go straight at
//! the tagged value parser and the section checks.

#![no_main]

use std::sync::Arc;

use fzindex::binary::write_container;
use fzindex::{Cancellable, FuzzyIndex, QueryOptions};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let framed = write_container(data);
    if let Ok(index) = FuzzyIndex::from_bytes(framed) {
        let index = Arc::new(index);
        for ch in index.characters().into_iter().take(4) {
            let _ = index.query_in_place(&ch.to_string(), QueryOptions::new(), &Cancellable::new());
        }
        for id in 0..index.key_count().min(16) as u32 {
            let _ = index.key(id);
        }
        for id in 0..index.document_count().min(16) as u32 {
            let _ = index.document(id);
        }
    }
});
