// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Binary encoding primitives: varints and a bounds-checked byte reader.
//!
//! Varint (LEB128) for every length and count, since almost all of them are
//! small. Fixed little-endian words for the record arrays, since those are
//! read by index and must stay fixed-size.

use crate::error::{Error, Result};

use super::header::MAX_VARINT_BYTES;

// ============================================================================
// VARINT ENCODING
// ============================================================================

/// Encode a varint to bytes
pub fn encode_varint(mut value: u64, buf: &mut Vec<u8>) {
    loop {
        let byte = (value & 0x7F) as u8;
        value >>= 7;
        if value == 0 {
            buf.push(byte);
            break;
        } else {
            buf.push(byte | 0x80);
        }
    }
}

/// Decode a varint from bytes, returning (value, bytes_consumed)
///
/// Returns an error if:
/// - Buffer is empty
/// - Varint exceeds MAX_VARINT_BYTES (malformed/malicious input)
/// - The tenth byte carries bits past the 64th
pub fn decode_varint(bytes: &[u8]) -> Result<(u64, usize)> {
    if bytes.is_empty() {
        return Err(Error::format("empty buffer for varint"));
    }

    let mut result: u64 = 0;
    let mut shift = 0;
    let mut i = 0;

    while i < bytes.len() && i < MAX_VARINT_BYTES {
        let byte = bytes[i];
        if shift == 63 && byte > 1 {
            return Err(Error::format("varint overflows u64"));
        }
        result |= ((byte & 0x7F) as u64) << shift;
        i += 1;
        if byte & 0x80 == 0 {
            return Ok((result, i));
        }
        shift += 7;
    }

    if i >= MAX_VARINT_BYTES {
        Err(Error::format(
            "varint exceeds maximum length (possible corruption)",
        ))
    } else {
        Err(Error::format("incomplete varint"))
    }
}

// ============================================================================
// BYTE READER
// ============================================================================

/// Forward-only reader over a bounded window `[pos, end)` of a buffer.
///
/// Every read is checked against `end`, so a length field that lies about
/// the data behind it becomes an error instead of a panic.
#[derive(Debug, Clone, Copy)]
pub struct ByteReader<'a> {
    buf: &'a [u8],
    pos: usize,
    end: usize,
}

impl<'a> ByteReader<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self {
            buf,
            pos: 0,
            end: buf.len(),
        }
    }

    /// Reader over `buf[pos..end]`. `end` is clamped to the buffer.
    pub fn window(buf: &'a [u8], pos: usize, end: usize) -> Self {
        let end = end.min(buf.len());
        Self {
            buf,
            pos: pos.min(end),
            end,
        }
    }

    #[inline]
    pub fn position(&self) -> usize {
        self.pos
    }

    #[inline]
    pub fn remaining(&self) -> usize {
        self.end - self.pos
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.pos == self.end
    }

    pub fn read_u8(&mut self) -> Result<u8> {
        let byte = *self.buf[..self.end]
            .get(self.pos)
            .ok_or_else(|| Error::format("unexpected end of data"))?;
        self.pos += 1;
        Ok(byte)
    }

    pub fn read_bytes(&mut self, len: usize) -> Result<&'a [u8]> {
        if len > self.remaining() {
            return Err(Error::format(format!(
                "length {} runs past end of data ({} bytes left)",
                len,
                self.remaining()
            )));
        }
        let slice = &self.buf[self.pos..self.pos + len];
        self.pos += len;
        Ok(slice)
    }

    pub fn read_array<const N: usize>(&mut self) -> Result<[u8; N]> {
        let bytes = self.read_bytes(N)?;
        let mut out = [0u8; N];
        out.copy_from_slice(bytes);
        Ok(out)
    }

    pub fn read_u32_le(&mut self) -> Result<u32> {
        Ok(u32::from_le_bytes(self.read_array()?))
    }

    pub fn read_u64_le(&mut self) -> Result<u64> {
        Ok(u64::from_le_bytes(self.read_array()?))
    }

    pub fn read_varint(&mut self) -> Result<u64> {
        let (value, consumed) = decode_varint(&self.buf[self.pos..self.end])?;
        self.pos += consumed;
        Ok(value)
    }

    /// Read a varint that is used as a byte length or element count.
    pub fn read_len(&mut self) -> Result<usize> {
        let value = self.read_varint()?;
        usize::try_from(value).map_err(|_| Error::format("length does not fit in usize"))
    }
}
