//! Value types
//!
//! `FieldType` is the closed set of primitives a field may declare and
//! `Value` is the tagged value stored in a row cell. Every encoder and
//! decoder is an exhaustive match over these two enums.

use std::fmt;
use std::str::FromStr;

use chrono::{NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Result, SyneryError};

// =============================================================================
// Field Types
// =============================================================================

/// Primitive type of a field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum FieldType {
    Bool,
    Byte,
    SByte,
    Char,
    UShort,
    Short,
    UInt,
    Int,
    ULong,
    Long,
    Float,
    Double,
    Decimal,
    DateTime,
    String,
    Bytes,
}

impl FieldType {
    /// Every supported type, in declaration order
    pub const ALL: [FieldType; 16] = [
        FieldType::Bool,
        FieldType::Byte,
        FieldType::SByte,
        FieldType::Char,
        FieldType::UShort,
        FieldType::Short,
        FieldType::UInt,
        FieldType::Int,
        FieldType::ULong,
        FieldType::Long,
        FieldType::Float,
        FieldType::Double,
        FieldType::Decimal,
        FieldType::DateTime,
        FieldType::String,
        FieldType::Bytes,
    ];

    /// Stable name used in the metadata document
    pub fn name(self) -> &'static str {
        match self {
            FieldType::Bool => "bool",
            FieldType::Byte => "byte",
            FieldType::SByte => "sbyte",
            FieldType::Char => "char",
            FieldType::UShort => "ushort",
            FieldType::Short => "short",
            FieldType::UInt => "uint",
            FieldType::Int => "int",
            FieldType::ULong => "ulong",
            FieldType::Long => "long",
            FieldType::Float => "float",
            FieldType::Double => "double",
            FieldType::Decimal => "decimal",
            FieldType::DateTime => "datetime",
            FieldType::String => "string",
            FieldType::Bytes => "bytes",
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for FieldType {
    type Err = SyneryError;

    fn from_str(s: &str) -> Result<Self> {
        FieldType::ALL
            .iter()
            .copied()
            .find(|t| t.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| SyneryError::UnsupportedType(s.to_string()))
    }
}

impl TryFrom<String> for FieldType {
    type Error = SyneryError;

    fn try_from(s: String) -> Result<Self> {
        s.parse()
    }
}

impl From<FieldType> for String {
    fn from(t: FieldType) -> Self {
        t.name().to_string()
    }
}

// =============================================================================
// Values
// =============================================================================

/// A single cell value
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Byte(u8),
    SByte(i8),
    Char(char),
    UShort(u16),
    Short(i16),
    UInt(u32),
    Int(i32),
    ULong(u64),
    Long(i64),
    Float(f32),
    Double(f64),
    Decimal(Decimal),
    DateTime(DateTime),
    String(String),
    Bytes(Vec<u8>),
}

impl Value {
    /// The field type this value belongs to; `None` for `Null`
    pub fn field_type(&self) -> Option<FieldType> {
        let t = match self {
            Value::Null => return None,
            Value::Bool(_) => FieldType::Bool,
            Value::Byte(_) => FieldType::Byte,
            Value::SByte(_) => FieldType::SByte,
            Value::Char(_) => FieldType::Char,
            Value::UShort(_) => FieldType::UShort,
            Value::Short(_) => FieldType::Short,
            Value::UInt(_) => FieldType::UInt,
            Value::Int(_) => FieldType::Int,
            Value::ULong(_) => FieldType::ULong,
            Value::Long(_) => FieldType::Long,
            Value::Float(_) => FieldType::Float,
            Value::Double(_) => FieldType::Double,
            Value::Decimal(_) => FieldType::Decimal,
            Value::DateTime(_) => FieldType::DateTime,
            Value::String(_) => FieldType::String,
            Value::Bytes(_) => FieldType::Bytes,
        };
        Some(t)
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// True if the value may be stored in a field of type `field_type`
    pub fn fits(&self, field_type: FieldType) -> bool {
        self.field_type().map_or(true, |t| t == field_type)
    }

    /// Zero-equivalent of a type, handed out when a null is read as non-nullable
    pub fn zero(field_type: FieldType) -> Value {
        match field_type {
            FieldType::Bool => Value::Bool(false),
            FieldType::Byte => Value::Byte(0),
            FieldType::SByte => Value::SByte(0),
            FieldType::Char => Value::Char('\0'),
            FieldType::UShort => Value::UShort(0),
            FieldType::Short => Value::Short(0),
            FieldType::UInt => Value::UInt(0),
            FieldType::Int => Value::Int(0),
            FieldType::ULong => Value::ULong(0),
            FieldType::Long => Value::Long(0),
            FieldType::Float => Value::Float(0.0),
            FieldType::Double => Value::Double(0.0),
            FieldType::Decimal => Value::Decimal(Decimal::ZERO),
            FieldType::DateTime => Value::DateTime(DateTime::MIN),
            FieldType::String | FieldType::Bytes => Value::Null,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("NULL"),
            Value::Bool(v) => write!(f, "{v}"),
            Value::Byte(v) => write!(f, "{v}"),
            Value::SByte(v) => write!(f, "{v}"),
            Value::Char(v) => write!(f, "{v}"),
            Value::UShort(v) => write!(f, "{v}"),
            Value::Short(v) => write!(f, "{v}"),
            Value::UInt(v) => write!(f, "{v}"),
            Value::Int(v) => write!(f, "{v}"),
            Value::ULong(v) => write!(f, "{v}"),
            Value::Long(v) => write!(f, "{v}"),
            Value::Float(v) => write!(f, "{v}"),
            Value::Double(v) => write!(f, "{v}"),
            Value::Decimal(v) => write!(f, "{v}"),
            Value::DateTime(v) => write!(f, "{v}"),
            Value::String(v) => f.write_str(v),
            Value::Bytes(v) => {
                for b in v {
                    write!(f, "{b:02x}")?;
                }
                Ok(())
            }
        }
    }
}

macro_rules! impl_from_for_value {
    ($($t:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$t> for Value {
                fn from(v: $t) -> Self {
                    Value::$variant(v)
                }
            }
        )*
    };
}

impl_from_for_value!(
    bool => Bool,
    u8 => Byte,
    i8 => SByte,
    char => Char,
    u16 => UShort,
    i16 => Short,
    u32 => UInt,
    i32 => Int,
    u64 => ULong,
    i64 => Long,
    f32 => Float,
    f64 => Double,
    Decimal => Decimal,
    DateTime => DateTime,
    String => String,
    Vec<u8> => Bytes,
);

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null, Into::into)
    }
}

// =============================================================================
// Decimal
// =============================================================================

const DECIMAL_SIGN_MASK: u32 = 0x8000_0000;
const DECIMAL_SCALE_MASK: u32 = 0x00FF_0000;
const DECIMAL_SCALE_SHIFT: u32 = 16;
const DECIMAL_MAX_SCALE: u32 = 28;

/// 128-bit fixed-point decimal: a 96-bit magnitude, a sign and a base-10
/// scale of 0..=28. Stored as the four words `lo, mid, hi, flags`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Decimal {
    lo: u32,
    mid: u32,
    hi: u32,
    flags: u32,
}

impl Decimal {
    pub const ZERO: Decimal = Decimal {
        lo: 0,
        mid: 0,
        hi: 0,
        flags: 0,
    };

    /// Largest representable magnitude (2^96 - 1)
    pub const MAX_MANTISSA: i128 = (1i128 << 96) - 1;

    /// Build from a signed mantissa and a scale, i.e. `mantissa / 10^scale`
    pub fn new(mantissa: i128, scale: u32) -> Result<Self> {
        if scale > DECIMAL_MAX_SCALE {
            return Err(SyneryError::MalformedData(format!(
                "decimal scale {} exceeds {}",
                scale, DECIMAL_MAX_SCALE
            )));
        }
        let magnitude = mantissa.unsigned_abs();
        if magnitude > Self::MAX_MANTISSA as u128 {
            return Err(SyneryError::MalformedData(format!(
                "decimal mantissa {} does not fit in 96 bits",
                mantissa
            )));
        }

        let mut flags = scale << DECIMAL_SCALE_SHIFT;
        if mantissa < 0 {
            flags |= DECIMAL_SIGN_MASK;
        }

        Ok(Self {
            lo: magnitude as u32,
            mid: (magnitude >> 32) as u32,
            hi: (magnitude >> 64) as u32,
            flags,
        })
    }

    /// Rebuild from the four serialized words, validating the flags word
    pub fn from_bits(bits: [i32; 4]) -> Result<Self> {
        let flags = bits[3] as u32;
        let scale = (flags & DECIMAL_SCALE_MASK) >> DECIMAL_SCALE_SHIFT;
        if flags & !(DECIMAL_SIGN_MASK | DECIMAL_SCALE_MASK) != 0 || scale > DECIMAL_MAX_SCALE {
            return Err(SyneryError::MalformedData(format!(
                "invalid decimal flags word 0x{:08x}",
                flags
            )));
        }
        Ok(Self {
            lo: bits[0] as u32,
            mid: bits[1] as u32,
            hi: bits[2] as u32,
            flags,
        })
    }

    /// The four words in serialization order: `lo, mid, hi, flags`
    pub fn to_bits(&self) -> [i32; 4] {
        [
            self.lo as i32,
            self.mid as i32,
            self.hi as i32,
            self.flags as i32,
        ]
    }

    pub fn scale(&self) -> u32 {
        (self.flags & DECIMAL_SCALE_MASK) >> DECIMAL_SCALE_SHIFT
    }

    pub fn is_negative(&self) -> bool {
        self.flags & DECIMAL_SIGN_MASK != 0
    }

    /// Signed mantissa (value = mantissa / 10^scale)
    pub fn mantissa(&self) -> i128 {
        let magnitude =
            (self.lo as i128) | ((self.mid as i128) << 32) | ((self.hi as i128) << 64);
        if self.is_negative() {
            -magnitude
        } else {
            magnitude
        }
    }
}

impl fmt::Display for Decimal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let digits = self.mantissa().unsigned_abs().to_string();
        let scale = self.scale() as usize;
        let sign = if self.is_negative() { "-" } else { "" };

        if scale == 0 {
            return write!(f, "{sign}{digits}");
        }

        let padded = format!("{:0>width$}", digits, width = scale + 1);
        let (int_part, frac_part) = padded.split_at(padded.len() - scale);
        write!(f, "{sign}{int_part}.{frac_part}")
    }
}

// =============================================================================
// DateTime
// =============================================================================

const DATETIME_KIND_SHIFT: u32 = 62;
const DATETIME_TICKS_MASK: i64 = 0x3FFF_FFFF_FFFF_FFFF;

/// How a `DateTime` relates to UTC
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DateTimeKind {
    Unspecified,
    Utc,
    Local,
}

/// Point in time stored as its 64-bit binary form: the kind in the top two
/// bits and 100-nanosecond ticks since 0001-01-01T00:00:00 in the rest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DateTime {
    binary: i64,
}

impl DateTime {
    pub const TICKS_PER_SECOND: i64 = 10_000_000;
    const NANOS_PER_TICK: i64 = 100;

    /// 9999-12-31T23:59:59.9999999
    pub const MAX_TICKS: i64 = 3_155_378_975_999_999_999;

    pub const MIN: DateTime = DateTime { binary: 0 };

    /// Wrap a raw binary value as read from a shard
    pub fn from_binary(binary: i64) -> Self {
        Self { binary }
    }

    pub fn to_binary(&self) -> i64 {
        self.binary
    }

    pub fn from_ticks(ticks: i64, kind: DateTimeKind) -> Result<Self> {
        if !(0..=Self::MAX_TICKS).contains(&ticks) {
            return Err(SyneryError::MalformedData(format!(
                "datetime ticks {} out of range",
                ticks
            )));
        }
        let kind_bits: i64 = match kind {
            DateTimeKind::Unspecified => 0,
            DateTimeKind::Utc => 1,
            DateTimeKind::Local => 2,
        };
        Ok(Self {
            binary: ticks | (kind_bits << DATETIME_KIND_SHIFT),
        })
    }

    /// Tick count. For `Local` values this is the offset-adjusted count
    /// carried in the binary form.
    pub fn ticks(&self) -> i64 {
        self.binary & DATETIME_TICKS_MASK
    }

    pub fn kind(&self) -> DateTimeKind {
        match (self.binary as u64) >> DATETIME_KIND_SHIFT {
            0 => DateTimeKind::Unspecified,
            1 => DateTimeKind::Utc,
            _ => DateTimeKind::Local,
        }
    }

    fn epoch() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(1, 1, 1)
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .unwrap_or(NaiveDateTime::MIN)
    }

    /// Unspecified-kind value from a naive date/time
    pub fn from_naive(value: NaiveDateTime) -> Result<Self> {
        let delta = value.signed_duration_since(Self::epoch());
        let secs = delta.num_seconds();
        let subsec = (delta - chrono::Duration::seconds(secs))
            .num_nanoseconds()
            .unwrap_or(0);
        let nanos = secs as i128 * 1_000_000_000 + subsec as i128;
        let ticks = i64::try_from(nanos / Self::NANOS_PER_TICK as i128).map_err(|_| {
            SyneryError::MalformedData(format!("datetime {} out of range", value))
        })?;
        Self::from_ticks(ticks, DateTimeKind::Unspecified)
    }

    /// Utc-kind value from a chrono UTC timestamp
    pub fn from_utc(value: chrono::DateTime<Utc>) -> Result<Self> {
        let naive = Self::from_naive(value.naive_utc())?;
        Self::from_ticks(naive.ticks(), DateTimeKind::Utc)
    }

    /// Naive date/time of the tick count, ignoring the kind
    pub fn to_naive(&self) -> Option<NaiveDateTime> {
        let ticks = self.ticks();
        let secs = ticks / Self::TICKS_PER_SECOND;
        let nanos = (ticks % Self::TICKS_PER_SECOND) * Self::NANOS_PER_TICK;
        Self::epoch()
            .checked_add_signed(chrono::Duration::seconds(secs))?
            .checked_add_signed(chrono::Duration::nanoseconds(nanos))
    }

    /// UTC timestamp, treating unspecified values as UTC
    pub fn to_utc(&self) -> Option<chrono::DateTime<Utc>> {
        self.to_naive().map(|n| Utc.from_utc_datetime(&n))
    }
}

impl fmt::Display for DateTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.to_naive() {
            Some(n) => write!(f, "{}", n.format("%Y-%m-%dT%H:%M:%S%.f")),
            None => write!(f, "<ticks {}>", self.ticks()),
        }
    }
}
