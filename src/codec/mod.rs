//! Codec Module
//!
//! Byte-exact encoding of primitive values into shard files.
//!
//! ## Wire Format
//! ```text
//! ┌───────────────────┬──────────────────────────────────────────────┐
//! │ bool/byte/sbyte   │ 1 raw byte                                   │
//! │ char/ushort/uint  │ uvarint                                      │
//! │ ulong             │ uvarint (64-bit)                             │
//! │ short/int         │ zig-zag → uvarint                            │
//! │ long              │ zig-zag → uvarint (64-bit)                   │
//! │ float / double    │ IEEE-754 bit pattern → uvarint               │
//! │ decimal           │ 4 × zig-zag int: lo, mid, hi, flags          │
//! │ datetime          │ zig-zag long of the 64-bit binary form       │
//! │ string            │ 0=null | 1=empty | len+1, utf16 count, bytes │
//! │ bytes             │ 0=null | len+1, raw bytes                    │
//! └───────────────────┴──────────────────────────────────────────────┘
//! ```
//!
//! ### Nullable Wrapper
//! ```text
//! ┌────────────┬───────────────────────────┐
//! │Present (1) │ value (only if present=1) │
//! └────────────┴───────────────────────────┘
//! ```

pub mod primitive;
pub mod value;
pub mod varint;

pub use primitive::{
    decode_bytes, decode_nullable, decode_nullable_or_zero, decode_string, decode_value,
    encode_bytes, encode_nullable, encode_string, encode_value, length_prefix, MAX_PAYLOAD_LEN,
};
pub use value::{DateTime, DateTimeKind, Decimal, FieldType, Value};
