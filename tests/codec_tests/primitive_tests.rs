//! Tests for the primitive codec
//!
//! These tests verify:
//! - Round-trips of every field type, nullable and non-nullable
//! - Type extremes and null handling
//! - Exact string and byte-array framing
//! - Payloads too long for a u32 length prefix
//! - Truncated input and invalid payloads

use synerydb::codec::{
    decode_bytes, decode_nullable, decode_nullable_or_zero, decode_string, decode_value,
    encode_bytes, encode_nullable, encode_string, encode_value, length_prefix, DateTime,
    DateTimeKind, Decimal, FieldType, Value, MAX_PAYLOAD_LEN,
};
use synerydb::SyneryError;

// =============================================================================
// Helper Functions
// =============================================================================

fn encode(value: &Value) -> Vec<u8> {
    let mut buf: Vec<u8> = Vec::new();
    encode_value(&mut buf, value).unwrap();
    buf
}

fn encode_opt(value: &Value) -> Vec<u8> {
    let mut buf: Vec<u8> = Vec::new();
    encode_nullable(&mut buf, value).unwrap();
    buf
}

fn roundtrip(value: Value, field_type: FieldType) {
    let bytes = encode(&value);
    let mut reader = bytes.as_slice();
    let decoded = decode_value(&mut reader, field_type).unwrap();
    assert_eq!(decoded, value, "non-nullable {}", field_type);
    assert!(reader.is_empty(), "trailing bytes after {}", field_type);

    let bytes = encode_opt(&value);
    let mut reader = bytes.as_slice();
    let decoded = decode_nullable(&mut reader, field_type).unwrap();
    assert_eq!(decoded, value, "nullable {}", field_type);
    assert!(reader.is_empty(), "trailing bytes after nullable {}", field_type);
}

/// Representative values per type, extremes included
fn samples(field_type: FieldType) -> Vec<Value> {
    match field_type {
        FieldType::Bool => vec![Value::Bool(true), Value::Bool(false)],
        FieldType::Byte => vec![Value::Byte(0), Value::Byte(u8::MAX)],
        FieldType::SByte => vec![Value::SByte(i8::MIN), Value::SByte(-1), Value::SByte(i8::MAX)],
        FieldType::Char => vec![Value::Char('a'), Value::Char('é'), Value::Char('\u{ffff}')],
        FieldType::UShort => vec![Value::UShort(0), Value::UShort(u16::MAX)],
        FieldType::Short => vec![Value::Short(i16::MIN), Value::Short(-7), Value::Short(i16::MAX)],
        FieldType::UInt => vec![Value::UInt(0), Value::UInt(u32::MAX)],
        FieldType::Int => vec![Value::Int(i32::MIN), Value::Int(0), Value::Int(i32::MAX)],
        FieldType::ULong => vec![Value::ULong(0), Value::ULong(u64::MAX)],
        FieldType::Long => vec![Value::Long(i64::MIN), Value::Long(-1), Value::Long(i64::MAX)],
        FieldType::Float => vec![
            Value::Float(0.0),
            Value::Float(-1.5),
            Value::Float(f32::MIN),
            Value::Float(f32::MAX),
        ],
        FieldType::Double => vec![
            Value::Double(1234.5678),
            Value::Double(f64::MIN),
            Value::Double(f64::MAX),
            Value::Double(f64::EPSILON),
        ],
        FieldType::Decimal => vec![
            Value::Decimal(Decimal::ZERO),
            Value::Decimal(Decimal::new(-12_345, 2).unwrap()),
            Value::Decimal(Decimal::new(Decimal::MAX_MANTISSA, 0).unwrap()),
            Value::Decimal(Decimal::new(-Decimal::MAX_MANTISSA, 28).unwrap()),
        ],
        FieldType::DateTime => vec![
            Value::DateTime(DateTime::MIN),
            Value::DateTime(DateTime::from_ticks(DateTime::MAX_TICKS, DateTimeKind::Unspecified).unwrap()),
            Value::DateTime(DateTime::from_ticks(637_000_000_000_000_000, DateTimeKind::Utc).unwrap()),
            Value::DateTime(DateTime::from_ticks(1, DateTimeKind::Local).unwrap()),
        ],
        FieldType::String => vec![
            Value::String(String::new()),
            Value::String("Test Name".to_string()),
            Value::String("Grüße, 東京 🚀".to_string()),
        ],
        FieldType::Bytes => vec![
            Value::Bytes(Vec::new()),
            Value::Bytes(vec![0, 1, 2, 255]),
            Value::Bytes(vec![0xab; 1000]),
        ],
    }
}

// =============================================================================
// Round-trip Tests
// =============================================================================

#[test]
fn test_every_type_roundtrips() {
    for field_type in FieldType::ALL {
        for value in samples(field_type) {
            roundtrip(value, field_type);
        }
    }
}

#[test]
fn test_null_roundtrips_for_every_type() {
    for field_type in FieldType::ALL {
        let bytes = encode_opt(&Value::Null);
        assert_eq!(bytes, vec![0x00]);
        let decoded = decode_nullable(&mut bytes.as_slice(), field_type).unwrap();
        assert_eq!(decoded, Value::Null, "null {}", field_type);
    }
}

#[test]
fn test_null_read_as_non_nullable_gives_zero_value() {
    let bytes = encode_opt(&Value::Null);

    let decoded = decode_nullable_or_zero(&mut bytes.as_slice(), FieldType::Int).unwrap();
    assert_eq!(decoded, Value::Int(0));

    let decoded = decode_nullable_or_zero(&mut bytes.as_slice(), FieldType::Bool).unwrap();
    assert_eq!(decoded, Value::Bool(false));

    let decoded = decode_nullable_or_zero(&mut bytes.as_slice(), FieldType::String).unwrap();
    assert_eq!(decoded, Value::Null);
}

#[test]
fn test_nan_and_infinities_keep_their_bits() {
    for value in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY, -0.0] {
        let bytes = encode(&Value::Double(value));
        match decode_value(&mut bytes.as_slice(), FieldType::Double).unwrap() {
            Value::Double(decoded) => assert_eq!(decoded.to_bits(), value.to_bits()),
            other => panic!("expected double, got {:?}", other),
        }
    }

    let bytes = encode(&Value::Float(f32::NAN));
    match decode_value(&mut bytes.as_slice(), FieldType::Float).unwrap() {
        Value::Float(decoded) => assert_eq!(decoded.to_bits(), f32::NAN.to_bits()),
        other => panic!("expected float, got {:?}", other),
    }
}

#[test]
fn test_sequence_of_values_decodes_in_order() {
    let values = vec![
        Value::Int(15),
        Value::String("Test Name".to_string()),
        Value::Bool(true),
        Value::Null,
        Value::Long(-42),
    ];
    let types = [
        FieldType::Int,
        FieldType::String,
        FieldType::Bool,
        FieldType::Double,
        FieldType::Long,
    ];

    let mut buf: Vec<u8> = Vec::new();
    for value in &values {
        encode_nullable(&mut buf, value).unwrap();
    }

    let mut reader = buf.as_slice();
    let decoded: Vec<Value> = types
        .iter()
        .map(|t| decode_nullable(&mut reader, *t).unwrap())
        .collect();
    assert_eq!(decoded, values);
    assert!(reader.is_empty());
}

// =============================================================================
// Byte Layout Tests
// =============================================================================

#[test]
fn test_scalar_layouts() {
    assert_eq!(encode(&Value::Bool(true)), vec![0x01]);
    assert_eq!(encode(&Value::SByte(-1)), vec![0xff]);
    assert_eq!(encode(&Value::Int(15)), vec![30]);
    assert_eq!(encode(&Value::Int(-1)), vec![0x01]);
    assert_eq!(encode(&Value::UInt(300)), vec![0xac, 0x02]);
    assert_eq!(encode(&Value::Char('A')), vec![0x41]);
    assert_eq!(encode(&Value::Float(1.0)), vec![0x80, 0x80, 0x80, 0xfc, 0x03]);
    assert_eq!(encode_opt(&Value::Int(15)), vec![0x01, 30]);
}

#[test]
fn test_decimal_layout_is_four_zigzag_words() {
    // -1.5 → mantissa 15, scale 1, sign bit set
    let value = Decimal::new(-15, 1).unwrap();
    assert_eq!(value.to_bits(), [15, 0, 0, 0x8001_0000u32 as i32]);

    let bytes = encode(&Value::Decimal(value));
    // lo=15 → 30; mid=0; hi=0; flags zig-zag of a negative int → 5 bytes
    assert_eq!(&bytes[..3], &[30, 0, 0]);
    assert_eq!(bytes.len(), 3 + 5);
}

#[test]
fn test_datetime_layout_is_zigzag_long() {
    let value = DateTime::from_binary(5);
    assert_eq!(encode(&Value::DateTime(value)), vec![10]);
}

#[test]
fn test_string_framing() {
    assert_eq!(encode(&Value::String("abc".to_string())), vec![4, 3, b'a', b'b', b'c']);
    assert_eq!(encode(&Value::String(String::new())), vec![1]);

    let mut buf: Vec<u8> = Vec::new();
    encode_string(&mut buf, None).unwrap();
    assert_eq!(buf, vec![0]);
}

#[test]
fn test_string_header_counts_utf16_units() {
    // 'é' is two UTF-8 bytes, one UTF-16 unit
    assert_eq!(encode(&Value::String("é".to_string())), vec![3, 1, 0xc3, 0xa9]);

    // '🚀' is four UTF-8 bytes, two UTF-16 units
    let bytes = encode(&Value::String("🚀".to_string()));
    assert_eq!(&bytes[..2], &[5, 2]);
}

#[test]
fn test_null_and_empty_string_are_distinct() {
    let mut buf: Vec<u8> = Vec::new();
    encode_string(&mut buf, None).unwrap();
    encode_string(&mut buf, Some("")).unwrap();

    let mut reader = buf.as_slice();
    assert_eq!(decode_string(&mut reader).unwrap(), None);
    assert_eq!(decode_string(&mut reader).unwrap(), Some(String::new()));
}

#[test]
fn test_byte_array_framing() {
    let mut buf: Vec<u8> = Vec::new();
    encode_bytes(&mut buf, None).unwrap();
    encode_bytes(&mut buf, Some(&[])).unwrap();
    encode_bytes(&mut buf, Some(&[7, 8])).unwrap();
    assert_eq!(buf, vec![0, 1, 3, 7, 8]);

    let mut reader = buf.as_slice();
    assert_eq!(decode_bytes(&mut reader).unwrap(), None);
    assert_eq!(decode_bytes(&mut reader).unwrap(), Some(Vec::new()));
    assert_eq!(decode_bytes(&mut reader).unwrap(), Some(vec![7, 8]));
}

#[test]
fn test_length_prefix_limit() {
    assert_eq!(length_prefix(0).unwrap(), 1);
    assert_eq!(length_prefix(3).unwrap(), 4);
    assert_eq!(length_prefix(MAX_PAYLOAD_LEN).unwrap(), u32::MAX);

    // one more byte would wrap the prefix back to zero, the null marker
    assert!(matches!(
        length_prefix(MAX_PAYLOAD_LEN + 1),
        Err(SyneryError::Validation(_))
    ));
    assert!(matches!(
        length_prefix(usize::MAX),
        Err(SyneryError::Validation(_))
    ));
}

#[test]
fn test_null_value_in_non_nullable_path_reads_as_null_string() {
    let bytes = encode(&Value::Null);
    assert_eq!(bytes, vec![0]);
    assert_eq!(
        decode_value(&mut bytes.as_slice(), FieldType::String).unwrap(),
        Value::Null
    );
    assert_eq!(
        decode_value(&mut bytes.as_slice(), FieldType::Bytes).unwrap(),
        Value::Null
    );
}

// =============================================================================
// Error Tests
// =============================================================================

#[test]
fn test_truncated_values_are_eof() {
    let cases: Vec<(Vec<u8>, FieldType)> = vec![
        (vec![], FieldType::Bool),
        (vec![0x80], FieldType::Int),
        (vec![4, 3, b'a'], FieldType::String),
        (vec![5, 1, 2], FieldType::Bytes),
        (vec![30, 0], FieldType::Decimal),
    ];

    for (bytes, field_type) in cases {
        let result = decode_value(&mut bytes.as_slice(), field_type);
        assert!(
            matches!(result, Err(SyneryError::UnexpectedEof)),
            "{} → {:?}",
            field_type,
            result
        );
    }
}

#[test]
fn test_missing_value_after_presence_byte_is_eof() {
    let result = decode_nullable(&mut [1u8].as_slice(), FieldType::Long);
    assert!(matches!(result, Err(SyneryError::UnexpectedEof)));
}

#[test]
fn test_invalid_utf8_is_malformed() {
    let bytes = [3u8, 1, 0xff, 0xfe];
    let result = decode_value(&mut bytes.as_slice(), FieldType::String);
    assert!(matches!(result, Err(SyneryError::MalformedData(_))));
}

#[test]
fn test_char_count_mismatch_is_malformed() {
    let bytes = [4u8, 7, b'a', b'b', b'c'];
    let result = decode_value(&mut bytes.as_slice(), FieldType::String);
    assert!(matches!(result, Err(SyneryError::MalformedData(_))));
}

#[test]
fn test_surrogate_char_is_malformed() {
    let mut buf: Vec<u8> = Vec::new();
    synerydb::codec::varint::put_uvarint32(&mut buf, 0xd800);
    let result = decode_value(&mut buf.as_slice(), FieldType::Char);
    assert!(matches!(result, Err(SyneryError::MalformedData(_))));
}

#[test]
fn test_invalid_decimal_flags_are_malformed() {
    // scale 29 is out of range
    let mut buf: Vec<u8> = Vec::new();
    for word in [1i32, 0, 0, 29 << 16] {
        encode_value(&mut buf, &Value::Int(word)).unwrap();
    }
    let result = decode_value(&mut buf.as_slice(), FieldType::Decimal);
    assert!(matches!(result, Err(SyneryError::MalformedData(_))));
}
