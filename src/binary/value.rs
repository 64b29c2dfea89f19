// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Tagged value codec and borrowed views.
//!
//! Every value is a tag byte followed by its payload. Containers (arrays and
//! dicts) prefix each child with its encoded byte length, so a reader can hop
//! over a child without understanding it. That one property is what lets the
//! index locate a section, a document or a single character's table without
//! decoding anything else.
//!
//! # Wire Format
//!
//! ```text
//! tag  payload
//!  0   Null   (nothing)
//!  1   Bool   u8 (0 or 1)
//!  2   I32    4B LE       3  U32  4B LE
//!  4   I64    8B LE       5  U64  8B LE      6  F64  8B LE (IEEE bits)
//!  7   Str    varint len + UTF-8
//!  8   Bytes  varint len + bytes
//!  9   Array  varint count, then per item: varint len + item
//! 10   Dict   varint count, then per entry: varint key_len + key + varint len + value
//!             (keys strictly ascending by bytes)
//! 11   Pairs  varint count + count × (u32 LE, u32 LE)
//! ```
//!
//! [`ValueRef::parse`] validates a whole subtree once. After that, every view
//! handed out by the accessors points at bytes known to be well formed, so
//! the accessors do not return errors.

use std::collections::BTreeMap;
use std::ops::Range;

use crate::error::{Error, Result};
use crate::value::Value;

use super::encoding::{encode_varint, ByteReader};
use super::header::MAX_DEPTH;

// ============================================================================
// TAGS
// ============================================================================

pub mod tag {
    pub const NULL: u8 = 0;
    pub const BOOL: u8 = 1;
    pub const I32: u8 = 2;
    pub const U32: u8 = 3;
    pub const I64: u8 = 4;
    pub const U64: u8 = 5;
    pub const F64: u8 = 6;
    pub const STR: u8 = 7;
    pub const BYTES: u8 = 8;
    pub const ARRAY: u8 = 9;
    pub const DICT: u8 = 10;
    pub const PAIRS: u8 = 11;

    pub fn name(tag: u8) -> &'static str {
        match tag {
            NULL => "null",
            BOOL => "bool",
            I32 => "i32",
            U32 => "u32",
            I64 => "i64",
            U64 => "u64",
            F64 => "f64",
            STR => "str",
            BYTES => "bytes",
            ARRAY => "array",
            DICT => "dict",
            PAIRS => "pairs",
            _ => "unknown",
        }
    }
}

/// Size of one record in a `Pairs` payload.
pub const PAIR_SIZE: usize = 8;

// ============================================================================
// ENCODING
// ============================================================================

/// Append the encoding of `value` to `buf`.
pub fn encode_value(value: &Value, buf: &mut Vec<u8>) {
    match value {
        Value::Null => buf.push(tag::NULL),
        Value::Bool(b) => {
            buf.push(tag::BOOL);
            buf.push(u8::from(*b));
        }
        Value::I32(v) => {
            buf.push(tag::I32);
            buf.extend_from_slice(&v.to_le_bytes());
        }
        Value::U32(v) => {
            buf.push(tag::U32);
            buf.extend_from_slice(&v.to_le_bytes());
        }
        Value::I64(v) => {
            buf.push(tag::I64);
            buf.extend_from_slice(&v.to_le_bytes());
        }
        Value::U64(v) => {
            buf.push(tag::U64);
            buf.extend_from_slice(&v.to_le_bytes());
        }
        Value::F64(v) => {
            buf.push(tag::F64);
            buf.extend_from_slice(&v.to_bits().to_le_bytes());
        }
        Value::Str(s) => encode_str(s, buf),
        Value::Bytes(bytes) => {
            buf.push(tag::BYTES);
            encode_varint(bytes.len() as u64, buf);
            buf.extend_from_slice(bytes);
        }
        Value::Array(items) => {
            let encoded: Vec<Vec<u8>> = items.iter().map(to_bytes).collect();
            encode_raw_array(&encoded, buf);
        }
        Value::Dict(map) => {
            let encoded: Vec<(&str, Vec<u8>)> =
                map.iter().map(|(k, v)| (k.as_str(), to_bytes(v))).collect();
            let entries: Vec<(&str, &[u8])> =
                encoded.iter().map(|(k, v)| (*k, v.as_slice())).collect();
            encode_raw_dict(&entries, buf);
        }
        Value::Pairs(pairs) => encode_pairs(pairs.iter().copied(), pairs.len(), buf),
    }
}

/// Encoding of `value` as a fresh buffer.
pub fn to_bytes(value: &Value) -> Vec<u8> {
    let mut buf = Vec::new();
    encode_value(value, &mut buf);
    buf
}

pub fn encode_str(s: &str, buf: &mut Vec<u8>) {
    buf.push(tag::STR);
    encode_varint(s.len() as u64, buf);
    buf.extend_from_slice(s.as_bytes());
}

/// Array whose items are already encoded values.
pub fn encode_raw_array<T: AsRef<[u8]>>(items: &[T], buf: &mut Vec<u8>) {
    buf.push(tag::ARRAY);
    encode_varint(items.len() as u64, buf);
    for item in items {
        let item = item.as_ref();
        encode_varint(item.len() as u64, buf);
        buf.extend_from_slice(item);
    }
}

/// Array of strings, without building `Value`s first.
pub fn encode_str_array<S: AsRef<str>>(items: &[S], buf: &mut Vec<u8>) {
    let mut scratch = Vec::new();
    buf.push(tag::ARRAY);
    encode_varint(items.len() as u64, buf);
    for item in items {
        scratch.clear();
        encode_str(item.as_ref(), &mut scratch);
        encode_varint(scratch.len() as u64, buf);
        buf.extend_from_slice(&scratch);
    }
}

/// Dict whose values are already encoded. Keys must be strictly ascending.
pub fn encode_raw_dict(entries: &[(&str, &[u8])], buf: &mut Vec<u8>) {
    debug_assert!(
        entries.windows(2).all(|w| w[0].0.as_bytes() < w[1].0.as_bytes()),
        "dict keys must be strictly ascending"
    );
    buf.push(tag::DICT);
    encode_varint(entries.len() as u64, buf);
    for (key, value) in entries {
        encode_varint(key.len() as u64, buf);
        buf.extend_from_slice(key.as_bytes());
        encode_varint(value.len() as u64, buf);
        buf.extend_from_slice(value);
    }
}

/// Fixed array of `(u32, u32)` records.
pub fn encode_pairs(pairs: impl IntoIterator<Item = (u32, u32)>, count: usize, buf: &mut Vec<u8>) {
    buf.push(tag::PAIRS);
    encode_varint(count as u64, buf);
    buf.reserve(count * PAIR_SIZE);
    let mut written = 0usize;
    for (a, b) in pairs {
        buf.extend_from_slice(&a.to_le_bytes());
        buf.extend_from_slice(&b.to_le_bytes());
        written += 1;
    }
    debug_assert_eq!(written, count, "pair count mismatch");
}

// ============================================================================
// BORROWED VIEWS
// ============================================================================

/// A validated value inside some buffer.
///
/// Cheap to copy: it is a buffer reference plus offsets. `span()` gives the
/// absolute byte range of the encoded value so owners of the buffer can keep
/// the range and rebuild the view later with [`ValueRef::trusted`].
#[derive(Debug, Clone, Copy)]
pub struct ValueRef<'a> {
    buf: &'a [u8],
    tag: u8,
    start: usize,
    end: usize,
}

impl<'a> ValueRef<'a> {
    /// Validate `buf` as exactly one value.
    pub fn parse(buf: &'a [u8]) -> Result<Self> {
        Self::parse_exact(buf, 0, buf.len())
    }

    /// Validate the value occupying exactly `buf[start..end]`.
    pub fn parse_exact(buf: &'a [u8], start: usize, end: usize) -> Result<Self> {
        let value = Self::parse_at(buf, start, end, 0)?;
        if value.end != end {
            return Err(Error::format(format!(
                "{} trailing bytes after {} value",
                end - value.end,
                tag::name(value.tag)
            )));
        }
        Ok(value)
    }

    /// Rebuild a view from a span previously returned by [`ValueRef::span`]
    /// on the same buffer.
    pub(crate) fn trusted(buf: &'a [u8], span: Range<usize>) -> Self {
        Self {
            buf,
            tag: buf.get(span.start).copied().unwrap_or(tag::NULL),
            start: span.start,
            end: span.end,
        }
    }

    fn parse_at(buf: &'a [u8], start: usize, limit: usize, depth: usize) -> Result<Self> {
        if depth > MAX_DEPTH {
            return Err(Error::format(format!(
                "values nested deeper than {}",
                MAX_DEPTH
            )));
        }

        let mut reader = ByteReader::window(buf, start, limit);
        let tag = reader.read_u8()?;

        match tag {
            tag::NULL => {}
            tag::BOOL => {
                if reader.read_u8()? > 1 {
                    return Err(Error::format("bool byte is neither 0 nor 1"));
                }
            }
            tag::I32 | tag::U32 => {
                reader.read_bytes(4)?;
            }
            tag::I64 | tag::U64 | tag::F64 => {
                reader.read_bytes(8)?;
            }
            tag::STR => {
                let len = reader.read_len()?;
                let bytes = reader.read_bytes(len)?;
                std::str::from_utf8(bytes)
                    .map_err(|e| Error::format(format!("invalid UTF-8 in string: {}", e)))?;
            }
            tag::BYTES => {
                let len = reader.read_len()?;
                reader.read_bytes(len)?;
            }
            tag::ARRAY => {
                let count = reader.read_len()?;
                check_count(count, reader.remaining())?;
                for _ in 0..count {
                    Self::parse_child(buf, &mut reader, depth)?;
                }
            }
            tag::DICT => {
                let count = reader.read_len()?;
                check_count(count, reader.remaining())?;
                let mut previous: Option<&[u8]> = None;
                for _ in 0..count {
                    let key_len = reader.read_len()?;
                    let key = reader.read_bytes(key_len)?;
                    std::str::from_utf8(key)
                        .map_err(|e| Error::format(format!("invalid UTF-8 in dict key: {}", e)))?;
                    if previous.is_some_and(|p| p >= key) {
                        return Err(Error::format("dict keys are not strictly ascending"));
                    }
                    previous = Some(key);
                    Self::parse_child(buf, &mut reader, depth)?;
                }
            }
            tag::PAIRS => {
                let count = reader.read_len()?;
                let len = count
                    .checked_mul(PAIR_SIZE)
                    .ok_or_else(|| Error::format("pair count overflows"))?;
                reader.read_bytes(len)?;
            }
            other => {
                return Err(Error::format(format!("unknown value tag {}", other)));
            }
        }

        Ok(Self {
            buf,
            tag,
            start,
            end: reader.position(),
        })
    }

    /// Length-prefixed child: must fill its length exactly.
    fn parse_child(buf: &'a [u8], reader: &mut ByteReader<'a>, depth: usize) -> Result<Self> {
        let len = reader.read_len()?;
        let child_start = reader.position();
        reader.read_bytes(len)?;
        let child = Self::parse_at(buf, child_start, child_start + len, depth + 1)?;
        if child.end != child_start + len {
            return Err(Error::format("child value does not fill its length prefix"));
        }
        Ok(child)
    }

    // ------------------------------------------------------------------------
    // Inspection
    // ------------------------------------------------------------------------

    #[inline]
    pub fn tag(&self) -> u8 {
        self.tag
    }

    pub fn type_name(&self) -> &'static str {
        tag::name(self.tag)
    }

    /// Absolute byte range of the encoded value, tag included.
    #[inline]
    pub fn span(&self) -> Range<usize> {
        self.start..self.end
    }

    #[inline]
    pub fn encoded_len(&self) -> usize {
        self.end - self.start
    }

    /// Reader positioned right after the tag.
    fn payload(&self) -> ByteReader<'a> {
        ByteReader::window(self.buf, self.start + 1, self.end)
    }

    // ------------------------------------------------------------------------
    // Scalars
    // ------------------------------------------------------------------------

    pub fn as_bool(&self) -> Option<bool> {
        (self.tag == tag::BOOL).then(|| self.payload().read_u8().ok() == Some(1))
    }

    pub fn as_i32(&self) -> Option<i32> {
        if self.tag != tag::I32 {
            return None;
        }
        self.payload().read_array().ok().map(i32::from_le_bytes)
    }

    pub fn as_u32(&self) -> Option<u32> {
        if self.tag != tag::U32 {
            return None;
        }
        self.payload().read_u32_le().ok()
    }

    pub fn as_u64(&self) -> Option<u64> {
        if self.tag != tag::U64 {
            return None;
        }
        self.payload().read_u64_le().ok()
    }

    pub fn as_str(&self) -> Option<&'a str> {
        if self.tag != tag::STR {
            return None;
        }
        let mut reader = self.payload();
        let len = reader.read_len().ok()?;
        let bytes = reader.read_bytes(len).ok()?;
        std::str::from_utf8(bytes).ok()
    }

    // ------------------------------------------------------------------------
    // Containers
    // ------------------------------------------------------------------------

    pub fn as_array(&self) -> Option<ArrayRef<'a>> {
        if self.tag != tag::ARRAY {
            return None;
        }
        let mut reader = self.payload();
        let len = reader.read_len().ok()?;
        Some(ArrayRef {
            buf: self.buf,
            reader,
            len,
        })
    }

    pub fn as_dict(&self) -> Option<DictRef<'a>> {
        if self.tag != tag::DICT {
            return None;
        }
        let mut reader = self.payload();
        let len = reader.read_len().ok()?;
        Some(DictRef {
            buf: self.buf,
            reader,
            len,
        })
    }

    pub fn as_pairs(&self) -> Option<PairsRef<'a>> {
        if self.tag != tag::PAIRS {
            return None;
        }
        let mut reader = self.payload();
        let len = reader.read_len().ok()?;
        let bytes = reader.read_bytes(len * PAIR_SIZE).ok()?;
        Some(PairsRef { bytes })
    }

    /// Materialize the subtree as an owned [`Value`].
    pub fn to_value(&self) -> Value {
        let mut reader = self.payload();
        match self.tag {
            tag::BOOL => Value::Bool(self.as_bool().unwrap_or(false)),
            tag::I32 => Value::I32(self.as_i32().unwrap_or_default()),
            tag::U32 => Value::U32(self.as_u32().unwrap_or_default()),
            tag::I64 => Value::I64(
                reader
                    .read_array()
                    .map(i64::from_le_bytes)
                    .unwrap_or_default(),
            ),
            tag::U64 => Value::U64(self.as_u64().unwrap_or_default()),
            tag::F64 => Value::F64(
                reader
                    .read_u64_le()
                    .map(f64::from_bits)
                    .unwrap_or_default(),
            ),
            tag::STR => Value::Str(self.as_str().unwrap_or_default().to_string()),
            tag::BYTES => {
                let bytes = reader
                    .read_len()
                    .and_then(|len| reader.read_bytes(len))
                    .unwrap_or_default();
                Value::Bytes(bytes.to_vec())
            }
            tag::ARRAY => Value::Array(
                self.as_array()
                    .map(|a| a.iter().map(|v| v.to_value()).collect())
                    .unwrap_or_default(),
            ),
            tag::DICT => Value::Dict(
                self.as_dict()
                    .map(|d| {
                        d.iter()
                            .map(|(k, v)| (k.to_string(), v.to_value()))
                            .collect::<BTreeMap<_, _>>()
                    })
                    .unwrap_or_default(),
            ),
            tag::PAIRS => Value::Pairs(
                self.as_pairs()
                    .map(|p| p.iter().collect())
                    .unwrap_or_default(),
            ),
            _ => Value::Null,
        }
    }
}

/// Reject counts that cannot possibly fit: each child needs at least one byte.
fn check_count(count: usize, remaining: usize) -> Result<()> {
    if count > remaining {
        return Err(Error::format(format!(
            "element count {} exceeds remaining {} bytes",
            count, remaining
        )));
    }
    Ok(())
}

/// Validated array view.
#[derive(Debug, Clone, Copy)]
pub struct ArrayRef<'a> {
    buf: &'a [u8],
    reader: ByteReader<'a>,
    len: usize,
}

impl<'a> ArrayRef<'a> {
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn iter(&self) -> ArrayIter<'a> {
        ArrayIter {
            buf: self.buf,
            reader: self.reader,
            left: self.len,
        }
    }
}

pub struct ArrayIter<'a> {
    buf: &'a [u8],
    reader: ByteReader<'a>,
    left: usize,
}

impl<'a> Iterator for ArrayIter<'a> {
    type Item = ValueRef<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.left == 0 {
            return None;
        }
        self.left -= 1;
        next_child(self.buf, &mut self.reader)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.left, Some(self.left))
    }
}

/// Validated dict view.
#[derive(Debug, Clone, Copy)]
pub struct DictRef<'a> {
    buf: &'a [u8],
    reader: ByteReader<'a>,
    len: usize,
}

impl<'a> DictRef<'a> {
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn iter(&self) -> DictIter<'a> {
        DictIter {
            buf: self.buf,
            reader: self.reader,
            left: self.len,
        }
    }

    /// Find an entry by key. Keys are sorted, so the scan stops early.
    pub fn get(&self, key: &str) -> Option<ValueRef<'a>> {
        for (k, v) in self.iter() {
            match k.as_bytes().cmp(key.as_bytes()) {
                std::cmp::Ordering::Less => continue,
                std::cmp::Ordering::Equal => return Some(v),
                std::cmp::Ordering::Greater => return None,
            }
        }
        None
    }
}

pub struct DictIter<'a> {
    buf: &'a [u8],
    reader: ByteReader<'a>,
    left: usize,
}

impl<'a> Iterator for DictIter<'a> {
    type Item = (&'a str, ValueRef<'a>);

    fn next(&mut self) -> Option<Self::Item> {
        if self.left == 0 {
            return None;
        }
        self.left -= 1;
        let key_len = self.reader.read_len().ok()?;
        let key = std::str::from_utf8(self.reader.read_bytes(key_len).ok()?).ok()?;
        let value = next_child(self.buf, &mut self.reader)?;
        Some((key, value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.left, Some(self.left))
    }
}

/// Step over one length-prefixed child of an already validated container.
fn next_child<'a>(buf: &'a [u8], reader: &mut ByteReader<'a>) -> Option<ValueRef<'a>> {
    let len = reader.read_len().ok()?;
    let start = reader.position();
    reader.read_bytes(len).ok()?;
    Some(ValueRef::trusted(buf, start..start + len))
}

/// Fixed `(u32, u32)` record array, read in place.
#[derive(Debug, Clone, Copy)]
pub struct PairsRef<'a> {
    bytes: &'a [u8],
}

impl<'a> PairsRef<'a> {
    pub fn len(&self) -> usize {
        self.bytes.len() / PAIR_SIZE
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<(u32, u32)> {
        let at = index.checked_mul(PAIR_SIZE)?;
        let record = self.bytes.get(at..at + PAIR_SIZE)?;
        let a = u32::from_le_bytes([record[0], record[1], record[2], record[3]]);
        let b = u32::from_le_bytes([record[4], record[5], record[6], record[7]]);
        Some((a, b))
    }

    pub fn iter(&self) -> impl Iterator<Item = (u32, u32)> + 'a {
        self.bytes.chunks_exact(PAIR_SIZE).map(|record| {
            (
                u32::from_le_bytes([record[0], record[1], record[2], record[3]]),
                u32::from_le_bytes([record[4], record[5], record[6], record[7]]),
            )
        })
    }
}

/// Validate and materialize a standalone encoded value.
pub fn decode_value(bytes: &[u8]) -> Result<Value> {
    Ok(ValueRef::parse(bytes)?.to_value())
}
