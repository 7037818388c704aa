//! Varint and zig-zag primitives
//!
//! Base-128 little-endian groups of 7 bits, high bit set on every byte that
//! is followed by another one. Signed values are zig-zag mapped first so
//! that small negative numbers stay short.

use std::io::{ErrorKind, Read};

use bytes::BufMut;

use crate::error::{Result, SyneryError};

/// Longest valid encoding of a 32-bit varint
pub const MAX_VARINT32_LEN: usize = 5;

/// Longest valid encoding of a 64-bit varint
pub const MAX_VARINT64_LEN: usize = 10;

// =============================================================================
// Zig-zag
// =============================================================================

pub fn zigzag_encode32(n: i32) -> u32 {
    ((n << 1) ^ (n >> 31)) as u32
}

pub fn zigzag_decode32(n: u32) -> i32 {
    ((n >> 1) as i32) ^ -((n & 1) as i32)
}

pub fn zigzag_encode64(n: i64) -> u64 {
    ((n << 1) ^ (n >> 63)) as u64
}

pub fn zigzag_decode64(n: u64) -> i64 {
    ((n >> 1) as i64) ^ -((n & 1) as i64)
}

// =============================================================================
// Encoding
// =============================================================================

pub fn put_uvarint32<B: BufMut>(buf: &mut B, value: u32) {
    put_uvarint64(buf, value as u64)
}

pub fn put_uvarint64<B: BufMut>(buf: &mut B, mut value: u64) {
    while value >= 0x80 {
        buf.put_u8((value as u8) | 0x80);
        value >>= 7;
    }
    buf.put_u8(value as u8);
}

/// Number of bytes `value` occupies once varint-encoded
pub fn uvarint_len(mut value: u64) -> usize {
    let mut len = 1;
    while value >= 0x80 {
        value >>= 7;
        len += 1;
    }
    len
}

// =============================================================================
// Decoding
// =============================================================================

/// Read a single raw byte, mapping a short read to `UnexpectedEof`
pub fn read_u8<R: Read>(reader: &mut R) -> Result<u8> {
    let mut byte = [0u8; 1];
    match reader.read_exact(&mut byte) {
        Ok(()) => Ok(byte[0]),
        Err(e) if e.kind() == ErrorKind::UnexpectedEof => Err(SyneryError::UnexpectedEof),
        Err(e) => Err(SyneryError::Io(e)),
    }
}

/// Payload bits the last group of a 32-bit varint may carry (bits 28..31)
const LAST_GROUP_MAX32: u8 = 0x0f;

/// Payload bits the last group of a 64-bit varint may carry (bit 63)
const LAST_GROUP_MAX64: u8 = 0x01;

/// Read a 32-bit varint. A last group carrying bits past bit 31 is
/// malformed, not truncated.
pub fn read_uvarint32<R: Read>(reader: &mut R) -> Result<u32> {
    let mut result: u32 = 0;
    for shift in (0..32).step_by(7) {
        let byte = read_u8(reader)?;
        if shift == 28 && (byte & 0x7f) > LAST_GROUP_MAX32 {
            return Err(SyneryError::MalformedVarint { max_bits: 32 });
        }
        result |= ((byte & 0x7f) as u32) << shift;
        if byte & 0x80 == 0 {
            return Ok(result);
        }
    }
    Err(SyneryError::MalformedVarint { max_bits: 32 })
}

pub fn read_uvarint64<R: Read>(reader: &mut R) -> Result<u64> {
    let mut result: u64 = 0;
    for shift in (0..64).step_by(7) {
        let byte = read_u8(reader)?;
        if shift == 63 && (byte & 0x7f) > LAST_GROUP_MAX64 {
            return Err(SyneryError::MalformedVarint { max_bits: 64 });
        }
        result |= ((byte & 0x7f) as u64) << shift;
        if byte & 0x80 == 0 {
            return Ok(result);
        }
    }
    Err(SyneryError::MalformedVarint { max_bits: 64 })
}
