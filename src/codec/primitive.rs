//! Primitive encoder/decoder
//!
//! Encoding goes into a caller-owned `BufMut` (rows are assembled in a
//! reusable buffer before they hit the file); decoding pulls from any
//! `Read`.

use std::io::Read;

use bytes::BufMut;

use super::value::{DateTime, Decimal, FieldType, Value};
use super::varint::{
    put_uvarint32, put_uvarint64, read_u8, read_uvarint32, read_uvarint64, zigzag_decode32,
    zigzag_decode64, zigzag_encode32, zigzag_encode64,
};
use crate::error::{Result, SyneryError};

/// Presence byte written ahead of a nullable value
const ABSENT: u32 = 0;
const PRESENT: u32 = 1;

/// Longest string or byte array a length prefix can frame (`len + 1` must
/// fit in a u32)
pub const MAX_PAYLOAD_LEN: usize = u32::MAX as usize - 1;

// =============================================================================
// Encoding
// =============================================================================

/// Encode a value without a presence byte.
///
/// `Null` is written as a zero length prefix, which is the null framing of
/// strings and byte arrays. Only strings and byte arrays longer than
/// `MAX_PAYLOAD_LEN` fail.
pub fn encode_value<B: BufMut>(buf: &mut B, value: &Value) -> Result<()> {
    match value {
        Value::Null => put_uvarint32(buf, 0),
        Value::Bool(v) => buf.put_u8(*v as u8),
        Value::Byte(v) => buf.put_u8(*v),
        Value::SByte(v) => buf.put_i8(*v),
        Value::Char(v) => put_uvarint32(buf, *v as u32),
        Value::UShort(v) => put_uvarint32(buf, *v as u32),
        Value::Short(v) => put_uvarint32(buf, zigzag_encode32(*v as i32)),
        Value::UInt(v) => put_uvarint32(buf, *v),
        Value::Int(v) => put_uvarint32(buf, zigzag_encode32(*v)),
        Value::ULong(v) => put_uvarint64(buf, *v),
        Value::Long(v) => put_uvarint64(buf, zigzag_encode64(*v)),
        Value::Float(v) => put_uvarint32(buf, v.to_bits()),
        Value::Double(v) => put_uvarint64(buf, v.to_bits()),
        Value::Decimal(v) => encode_decimal(buf, v),
        Value::DateTime(v) => put_uvarint64(buf, zigzag_encode64(v.to_binary())),
        Value::String(v) => encode_string(buf, Some(v))?,
        Value::Bytes(v) => encode_bytes(buf, Some(v))?,
    }
    Ok(())
}

/// Encode a value behind a presence byte (0 = null, 1 = present)
pub fn encode_nullable<B: BufMut>(buf: &mut B, value: &Value) -> Result<()> {
    if value.is_null() {
        put_uvarint32(buf, ABSENT);
        return Ok(());
    }
    put_uvarint32(buf, PRESENT);
    encode_value(buf, value)
}

/// `None` → 0, empty → 1, otherwise `(byte_len + 1)`, UTF-16 unit count, bytes
pub fn encode_string<B: BufMut>(buf: &mut B, value: Option<&str>) -> Result<()> {
    let Some(s) = value else {
        put_uvarint32(buf, 0);
        return Ok(());
    };
    if s.is_empty() {
        put_uvarint32(buf, 1);
        return Ok(());
    }

    // UTF-16 units never outnumber UTF-8 bytes, so the count fits once the
    // length does
    let prefix = length_prefix(s.len())?;
    put_uvarint32(buf, prefix);
    put_uvarint32(buf, utf16_len(s) as u32);
    buf.put_slice(s.as_bytes());
    Ok(())
}

/// `None` → 0, otherwise `(len + 1)` followed by the raw bytes
pub fn encode_bytes<B: BufMut>(buf: &mut B, value: Option<&[u8]>) -> Result<()> {
    match value {
        None => put_uvarint32(buf, 0),
        Some(bytes) => {
            put_uvarint32(buf, length_prefix(bytes.len())?);
            buf.put_slice(bytes);
        }
    }
    Ok(())
}

/// The `len + 1` prefix of a non-null string or byte array
pub fn length_prefix(len: usize) -> Result<u32> {
    if len > MAX_PAYLOAD_LEN {
        return Err(SyneryError::Validation(format!(
            "payload of {} bytes exceeds the {} byte limit",
            len, MAX_PAYLOAD_LEN
        )));
    }
    Ok(len as u32 + 1)
}

fn encode_decimal<B: BufMut>(buf: &mut B, value: &Decimal) {
    for word in value.to_bits() {
        put_uvarint32(buf, zigzag_encode32(word));
    }
}

/// Character count in the unit the string header records
fn utf16_len(s: &str) -> usize {
    s.chars().map(char::len_utf16).sum()
}

// =============================================================================
// Decoding
// =============================================================================

/// Decode a value of `field_type` that was written without a presence byte
pub fn decode_value<R: Read>(reader: &mut R, field_type: FieldType) -> Result<Value> {
    let value = match field_type {
        FieldType::Bool => Value::Bool(read_u8(reader)? != 0),
        FieldType::Byte => Value::Byte(read_u8(reader)?),
        FieldType::SByte => Value::SByte(read_u8(reader)? as i8),
        FieldType::Char => {
            let raw = read_uvarint32(reader)?;
            let c = char::from_u32(raw).ok_or_else(|| {
                SyneryError::MalformedData(format!("invalid char code point 0x{:x}", raw))
            })?;
            Value::Char(c)
        }
        FieldType::UShort => Value::UShort(read_uvarint32(reader)? as u16),
        FieldType::Short => Value::Short(zigzag_decode32(read_uvarint32(reader)?) as i16),
        FieldType::UInt => Value::UInt(read_uvarint32(reader)?),
        FieldType::Int => Value::Int(zigzag_decode32(read_uvarint32(reader)?)),
        FieldType::ULong => Value::ULong(read_uvarint64(reader)?),
        FieldType::Long => Value::Long(zigzag_decode64(read_uvarint64(reader)?)),
        FieldType::Float => Value::Float(f32::from_bits(read_uvarint32(reader)?)),
        FieldType::Double => Value::Double(f64::from_bits(read_uvarint64(reader)?)),
        FieldType::Decimal => Value::Decimal(decode_decimal(reader)?),
        FieldType::DateTime => Value::DateTime(DateTime::from_binary(zigzag_decode64(
            read_uvarint64(reader)?,
        ))),
        FieldType::String => decode_string(reader)?.map_or(Value::Null, Value::String),
        FieldType::Bytes => decode_bytes(reader)?.map_or(Value::Null, Value::Bytes),
    };
    Ok(value)
}

/// Decode a value written by `encode_nullable`; an absent value yields `Null`
pub fn decode_nullable<R: Read>(reader: &mut R, field_type: FieldType) -> Result<Value> {
    if read_u8(reader)? as u32 == ABSENT {
        return Ok(Value::Null);
    }
    decode_value(reader, field_type)
}

/// Like `decode_nullable`, but an absent value yields the type's zero value
pub fn decode_nullable_or_zero<R: Read>(reader: &mut R, field_type: FieldType) -> Result<Value> {
    match decode_nullable(reader, field_type)? {
        Value::Null => Ok(Value::zero(field_type)),
        value => Ok(value),
    }
}

pub fn decode_string<R: Read>(reader: &mut R) -> Result<Option<String>> {
    let len = read_uvarint32(reader)?;
    match len {
        0 => return Ok(None),
        1 => return Ok(Some(String::new())),
        _ => {}
    }

    let byte_len = (len - 1) as usize;
    let char_count = read_uvarint32(reader)? as usize;
    let bytes = read_payload(reader, byte_len)?;

    let s = String::from_utf8(bytes)
        .map_err(|e| SyneryError::MalformedData(format!("invalid UTF-8 in string: {}", e)))?;

    let actual = utf16_len(&s);
    if actual != char_count {
        return Err(SyneryError::MalformedData(format!(
            "string header announced {} chars, payload holds {}",
            char_count, actual
        )));
    }

    Ok(Some(s))
}

pub fn decode_bytes<R: Read>(reader: &mut R) -> Result<Option<Vec<u8>>> {
    let len = read_uvarint32(reader)?;
    match len {
        0 => Ok(None),
        1 => Ok(Some(Vec::new())),
        _ => read_payload(reader, (len - 1) as usize).map(Some),
    }
}

fn decode_decimal<R: Read>(reader: &mut R) -> Result<Decimal> {
    let mut bits = [0i32; 4];
    for word in bits.iter_mut() {
        *word = zigzag_decode32(read_uvarint32(reader)?);
    }
    Decimal::from_bits(bits)
}

/// Read exactly `len` bytes. Grows the buffer as data arrives so a corrupt
/// length prefix cannot force a huge allocation up front.
fn read_payload<R: Read>(reader: &mut R, len: usize) -> Result<Vec<u8>> {
    let mut payload = Vec::new();
    reader.by_ref().take(len as u64).read_to_end(&mut payload)?;
    if payload.len() != len {
        return Err(SyneryError::UnexpectedEof);
    }
    Ok(payload)
}
