// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Container framing: header magic and checksummed footer.
//!
//! Four bytes of magic up front so a wrong file is rejected before anything
//! is parsed, then the root value, then an
//! 8-byte footer: CRC32 over everything before it plus the magic reversed
//! ("XIZF"). If the footer is wrong, the file was truncated or corrupted and
//! nothing inside it is trusted.

use crc32fast::Hasher as Crc32Hasher;

use crate::error::{Error, Result};

// ============================================================================
// CONSTANTS
// ============================================================================

/// Magic bytes: "FZIX" in ASCII (header)
pub const MAGIC: [u8; 4] = *b"FZIX";

/// Footer magic: "XIZF" (reversed, marks valid file end)
pub const FOOTER_MAGIC: [u8; 4] = *b"XIZF";

/// Value of the root `version` entry this crate reads and writes.
pub const FORMAT_VERSION: i32 = 1;

// ============================================================================
// SECURITY LIMITS (prevent resource exhaustion from malicious input)
// ============================================================================

/// Maximum file size: 1 GiB
pub const MAX_FILE_SIZE: usize = 1024 * 1024 * 1024;

/// Maximum varint bytes (u64 needs at most 10 bytes)
pub const MAX_VARINT_BYTES: usize = 10;

/// Maximum nesting of arrays/dicts inside one value
pub const MAX_DEPTH: usize = 64;

// ============================================================================
// HEADER
// ============================================================================

pub const HEADER_SIZE: usize = MAGIC.len();

pub fn check_header(bytes: &[u8]) -> Result<()> {
    match bytes.get(..HEADER_SIZE) {
        Some(magic) if magic == MAGIC => Ok(()),
        Some(magic) => Err(Error::format(format!(
            "invalid magic: expected FZIX, got {:?}",
            magic
        ))),
        None => Err(Error::format("file too short for header")),
    }
}

// ============================================================================
// FOOTER (8 bytes)
// ============================================================================

/// Footer with CRC32 checksum and magic number
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Footer {
    /// CRC32 of header + root value (everything before the footer)
    pub crc32: u32,
}

impl Footer {
    pub const SIZE: usize = 8; // 4 bytes CRC32 + 4 bytes magic

    /// Footer for the given content.
    pub fn for_content(content: &[u8]) -> Self {
        Self {
            crc32: Self::compute_crc32(content),
        }
    }

    pub fn append(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.crc32.to_le_bytes());
        out.extend_from_slice(&FOOTER_MAGIC);
    }

    pub fn read(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < Self::SIZE {
            return Err(Error::format("file too short for footer"));
        }

        let footer_start = bytes.len() - Self::SIZE;

        let magic = &bytes[footer_start + 4..];
        if magic != FOOTER_MAGIC {
            return Err(Error::format(format!(
                "invalid footer magic: expected XIZF, got {:?}",
                magic
            )));
        }

        let crc32 = u32::from_le_bytes([
            bytes[footer_start],
            bytes[footer_start + 1],
            bytes[footer_start + 2],
            bytes[footer_start + 3],
        ]);

        Ok(Self { crc32 })
    }

    /// Check the stored checksum against `content`.
    pub fn verify(&self, content: &[u8]) -> Result<()> {
        let computed = Self::compute_crc32(content);
        if computed != self.crc32 {
            return Err(Error::format(format!(
                "CRC32 mismatch: expected {:#010x}, got {:#010x} (file corrupted)",
                self.crc32, computed
            )));
        }
        Ok(())
    }

    /// Compute CRC32 over the given bytes
    pub fn compute_crc32(data: &[u8]) -> u32 {
        let mut hasher = Crc32Hasher::new();
        hasher.update(data);
        hasher.finalize()
    }
}
