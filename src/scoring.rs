// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! The math behind match ranking.
//!
//! Priority dominates tightness. A priority-0 insertion with the loosest
//! possible alignment still beats a priority-1 insertion with a perfect one,
//! because the tightness term can never reach the width of one priority step.
//!
//! # Key Invariant: Priority Dominance
//!
//! ```text
//! score = TIGHTNESS_SCALE / (1 + last_position + gap_cost)   ∈ (0, 1/256]
//!       + (255 - priority) / 256                              ∈ [0, 255/256]
//! ```
//!
//! For priorities `p < q`: `score(p, worst) > score(q, best)` whenever the
//! tightness term stays strictly under 1/256, which holds for every match
//! except the degenerate single-character hit at position 0 (where the two
//! terms meet exactly and the key decides).
//!
//! The two terms are not on a principled common scale. They are kept as they
//! are so rankings match indexes built by other tools for the same format.

use std::cmp::Ordering;

// =============================================================================
// SCORING CONSTANTS
// =============================================================================

/// Upper bound of the tightness term.
pub const TIGHTNESS_SCALE: f32 = 1.0 / 256.0;

/// Width of one priority step.
pub const PRIORITY_STEP: f32 = 1.0 / 256.0;

/// Cap on the starting cost of an anchor: a match may start late in a key,
/// but beyond 8 characters in it makes no further difference.
pub const MAX_ANCHOR_COST: u32 = 16;

// =============================================================================
// SCORING FUNCTIONS
// =============================================================================

/// Starting cost of an alignment whose first character sits at `position`.
#[inline]
pub fn anchor_cost(position: u32) -> u32 {
    position.saturating_mul(2).min(MAX_ANCHOR_COST)
}

/// Final score of a match.
///
/// `last_position` is where the last query character landed in the key,
/// `gap_cost` the accumulated anchor and gap costs of the alignment.
#[inline]
pub fn score(priority: u8, last_position: u32, gap_cost: u32) -> f32 {
    let tightness = TIGHTNESS_SCALE / (1.0 + last_position as f32 + gap_cost as f32);
    tightness + f32::from(255 - priority) * PRIORITY_STEP
}

/// Result order: higher score first, then keys in byte order.
#[inline]
pub fn compare(score_a: f32, key_a: &[u8], score_b: f32, key_b: &[u8]) -> Ordering {
    score_b.total_cmp(&score_a).then_with(|| key_a.cmp(key_b))
}
