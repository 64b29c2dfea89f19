// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Index loading under adversarial input.
//!
//! A damaged or hostile index file must produce an error, never a panic or
//! a runaway allocation.

#![no_main]

use std::sync::Arc;

use fzindex::{Cancellable, FuzzyIndex, QueryOptions};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(index) = FuzzyIndex::from_bytes(data.to_vec()) else {
        return;
    };
    let index = Arc::new(index);

    // Whatever loaded must answer queries over every indexed character.
    let characters: String = index.characters().into_iter().take(8).collect();
    let _ = index.query_in_place(&characters, QueryOptions::new(), &Cancellable::new());
    let _ = index.stats();
});
