// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! The fixed-size records an index is made of.
//!
//! Three records carry the whole structure. A [`LookasideEntry`] is one
//! insertion: which key, which document. An [`IndexItem`] is one occurrence of
//! a character inside a key, pointing back at the lookaside entry that owns
//! it. A [`PrioritizedId`] is a 24-bit id with the insertion's priority riding
//! in the top byte, which is how both records stay at two 32-bit words on disk.
//!
//! # Invariants
//!
//! - **PrioritizedId**: `id <= MAX_ID`. Packing never loses bits.
//! - **LookasideEntry**: `key.id < keys.len() ∧ document_id < documents.len()`
//! - **IndexItem**: `lookaside.id < lookaside.len()`, and within one
//!   character's table items are sorted by `(lookaside, position)`.

use std::cmp::Ordering;

// =============================================================================
// PRIORITIZED ID
// =============================================================================

/// Largest id that fits in the low 24 bits of a packed word.
pub const MAX_ID: u32 = 0x00FF_FFFF;

/// Bits of a packed word that hold the id.
const ID_MASK: u32 = MAX_ID;

/// Shift that moves the priority into the top byte.
const PRIORITY_SHIFT: u32 = 24;

/// A 24-bit reference plus the 8-bit priority of the insertion it came from.
///
/// On disk this is a single little-endian `u32`: `id | priority << 24`.
/// Ordering follows the packed word, so priority is the most significant part
/// of a comparison. That is the order position tables are written in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PrioritizedId {
    id: u32,
    priority: u8,
}

impl PrioritizedId {
    /// Build from parts. Returns `None` if `id` does not fit in 24 bits.
    #[inline]
    pub fn new(id: u32, priority: u8) -> Option<Self> {
        (id <= MAX_ID).then_some(Self { id, priority })
    }

    /// Split a packed word into its id and priority.
    #[inline]
    pub fn unpack(word: u32) -> Self {
        Self {
            id: word & ID_MASK,
            priority: (word >> PRIORITY_SHIFT) as u8,
        }
    }

    /// Join id and priority into the on-disk word.
    #[inline]
    pub fn pack(self) -> u32 {
        self.id | (u32::from(self.priority) << PRIORITY_SHIFT)
    }

    #[inline]
    pub fn id(self) -> u32 {
        self.id
    }

    #[inline]
    pub fn priority(self) -> u8 {
        self.priority
    }

    /// Same id with another priority attached.
    #[inline]
    pub fn with_priority(self, priority: u8) -> Self {
        Self { id: self.id, priority }
    }
}

impl PartialOrd for PrioritizedId {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for PrioritizedId {
    fn cmp(&self, other: &Self) -> Ordering {
        self.pack().cmp(&other.pack())
    }
}

// =============================================================================
// LOOKASIDE ENTRY
// =============================================================================

/// One `(key, document)` insertion. Its index in the lookaside table is its
/// lookaside id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LookasideEntry {
    /// Key id, with the insertion priority packed alongside.
    pub key: PrioritizedId,
    pub document_id: u32,
}

impl LookasideEntry {
    /// On-disk pair: `(key_id_with_priority, document_id)`.
    #[inline]
    pub fn to_pair(self) -> (u32, u32) {
        (self.key.pack(), self.document_id)
    }

    #[inline]
    pub fn from_pair((key, document_id): (u32, u32)) -> Self {
        Self {
            key: PrioritizedId::unpack(key),
            document_id,
        }
    }
}

// =============================================================================
// INDEX ITEM
// =============================================================================

/// One occurrence of a character inside a key.
///
/// `position` counts Unicode scalar values from the start of the (possibly
/// case-folded) key, not bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct IndexItem {
    pub position: u32,
    /// Lookaside id of the insertion, with its priority packed alongside.
    pub lookaside: PrioritizedId,
}

impl IndexItem {
    /// On-disk pair: `(position, lookaside_id_with_priority)`.
    #[inline]
    pub fn to_pair(self) -> (u32, u32) {
        (self.position, self.lookaside.pack())
    }

    #[inline]
    pub fn from_pair((position, lookaside): (u32, u32)) -> Self {
        Self {
            position,
            lookaside: PrioritizedId::unpack(lookaside),
        }
    }
}

impl PartialOrd for IndexItem {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Table order: lookaside first, then position.
impl Ord for IndexItem {
    fn cmp(&self, other: &Self) -> Ordering {
        self.lookaside
            .cmp(&other.lookaside)
            .then(self.position.cmp(&other.position))
    }
}
