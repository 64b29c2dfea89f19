// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Binary format for fuzzy indexes.
//!
//! The file is a single self-describing value in a thin checksummed frame.
//! Nothing about the layout is positional: the root is a dict, and every
//! section is found by name. That keeps the writer trivial and means the
//! reader can hop straight to the one character table a query needs without
//! decoding the others.
//!
//! # Security Considerations
//!
//! This format is designed to be safely parsed from untrusted sources:
//! - The whole file is bounded by MAX_FILE_SIZE
//! - CRC32 footer detects corruption/truncation before anything is parsed
//! - Every length is checked against the container holding it
//! - Nesting is bounded by MAX_DEPTH
//!
//! # Format Overview (v1)
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────┐
//! │ HEADER (4 bytes): magic "FZIX"                             │
//! ├────────────────────────────────────────────────────────────┤
//! │ ROOT (dict, keys in byte order)                            │
//! │   documents: array of any      index = document id         │
//! │   keys:      array of str      index = key id              │
//! │   lookaside: pairs (key_id|prio<<24, document_id)          │
//! │   metadata:  dict, always has bool "case-sensitive"        │
//! │   tables:    dict char → pairs (position, lookaside|prio)  │
//! │   version:   i32 = 1                                       │
//! ├────────────────────────────────────────────────────────────┤
//! │ FOOTER (8 bytes): crc32 + magic "XIZF"                     │
//! └────────────────────────────────────────────────────────────┘
//! ```

// Submodules
mod encoding;
mod header;
mod value;

pub use encoding::{decode_varint, encode_varint, ByteReader};
pub use header::{
    check_header, Footer, FORMAT_VERSION, FOOTER_MAGIC, HEADER_SIZE, MAGIC,
    MAX_DEPTH, MAX_FILE_SIZE, MAX_VARINT_BYTES,
};
pub use value::{
    decode_value, encode_pairs, encode_raw_array, encode_raw_dict, encode_str, encode_str_array,
    encode_value, tag, to_bytes, ArrayRef, DictRef, PairsRef, ValueRef, PAIR_SIZE,
};

use crate::error::{Error, Result};

// ============================================================================
// SECTION NAMES
// ============================================================================

pub const SECTION_DOCUMENTS: &str = "documents";
pub const SECTION_KEYS: &str = "keys";
pub const SECTION_LOOKASIDE: &str = "lookaside";
pub const SECTION_METADATA: &str = "metadata";
pub const SECTION_TABLES: &str = "tables";
pub const SECTION_VERSION: &str = "version";

/// Metadata entry every index carries.
pub const METADATA_CASE_SENSITIVE: &str = "case-sensitive";

/// Deepest nesting a document or metadata value may have. Both sit two
/// levels below the root, and the reader counts from the root.
pub const MAX_VALUE_DEPTH: usize = MAX_DEPTH - 2;

// ============================================================================
// CONTAINER
// ============================================================================

/// Frame an encoded root value: magic, root, footer.
pub fn write_container(root: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(HEADER_SIZE + root.len() + Footer::SIZE);
    out.extend_from_slice(&MAGIC);
    out.extend_from_slice(root);
    Footer::for_content(&out).append(&mut out);
    out
}

/// Check the frame and validate the root value.
///
/// The returned view borrows `bytes`; its spans are absolute offsets into it.
pub fn open_container(bytes: &[u8]) -> Result<ValueRef<'_>> {
    if bytes.len() > MAX_FILE_SIZE {
        return Err(Error::format(format!(
            "file too large: {} bytes (max {})",
            bytes.len(),
            MAX_FILE_SIZE
        )));
    }
    if bytes.len() < HEADER_SIZE + Footer::SIZE {
        return Err(Error::format(format!(
            "file too small: {} bytes",
            bytes.len()
        )));
    }

    check_header(bytes)?;

    let content_end = bytes.len() - Footer::SIZE;
    let footer = Footer::read(bytes)?;
    footer.verify(&bytes[..content_end])?;

    let root = ValueRef::parse_exact(bytes, HEADER_SIZE, content_end)?;
    if root.tag() != tag::DICT {
        return Err(Error::format(format!(
            "root must be a dict, got {}",
            root.type_name()
        )));
    }
    Ok(root)
}

/// The root's sections, located and type-checked.
#[derive(Debug, Clone)]
pub struct Sections<'a> {
    pub metadata: DictRef<'a>,
    pub metadata_span: std::ops::Range<usize>,
    pub keys: ArrayRef<'a>,
    pub keys_span: std::ops::Range<usize>,
    pub lookaside: PairsRef<'a>,
    pub tables: DictRef<'a>,
    pub tables_span: std::ops::Range<usize>,
    pub documents: ArrayRef<'a>,
    pub documents_span: std::ops::Range<usize>,
}

impl<'a> Sections<'a> {
    /// Find every section in a validated root, checking the version first.
    pub fn locate(root: ValueRef<'a>) -> Result<Self> {
        let dict = root
            .as_dict()
            .ok_or_else(|| Error::format("root must be a dict"))?;

        let version = dict
            .get(SECTION_VERSION)
            .ok_or_else(|| Error::format("missing version entry"))?;
        let found = version.as_i32().ok_or_else(|| {
            Error::format(format!("version must be i32, got {}", version.type_name()))
        })?;
        if found != FORMAT_VERSION {
            return Err(Error::VersionMismatch {
                found,
                expected: FORMAT_VERSION,
            });
        }

        let section = |name: &'static str| dict.get(name).ok_or(Error::MissingSection(name));
        let typed = |value: ValueRef<'a>, name: &str, want: u8| -> Result<ValueRef<'a>> {
            if value.tag() == want {
                Ok(value)
            } else {
                Err(Error::format(format!(
                    "section {} must be {}, got {}",
                    name,
                    tag::name(want),
                    value.type_name()
                )))
            }
        };

        let keys = typed(section(SECTION_KEYS)?, SECTION_KEYS, tag::ARRAY)?;
        let documents = typed(section(SECTION_DOCUMENTS)?, SECTION_DOCUMENTS, tag::ARRAY)?;
        let tables = typed(section(SECTION_TABLES)?, SECTION_TABLES, tag::DICT)?;
        let metadata = typed(section(SECTION_METADATA)?, SECTION_METADATA, tag::DICT)?;
        let lookaside = typed(section(SECTION_LOOKASIDE)?, SECTION_LOOKASIDE, tag::PAIRS)?;

        // Tags were just checked, so the projections cannot fail.
        let wrong = || Error::format("section changed type while reading");
        Ok(Self {
            metadata: metadata.as_dict().ok_or_else(wrong)?,
            metadata_span: metadata.span(),
            keys: keys.as_array().ok_or_else(wrong)?,
            keys_span: keys.span(),
            lookaside: lookaside.as_pairs().ok_or_else(wrong)?,
            tables: tables.as_dict().ok_or_else(wrong)?,
            tables_span: tables.span(),
            documents: documents.as_array().ok_or_else(wrong)?,
            documents_span: documents.span(),
        })
    }
}
