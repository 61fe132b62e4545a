//! The tagged union of element payloads and the small fixed-width wire types
//! it carries.

use std::fmt;

use crate::{element::ElementType, raw::RawDocument};

/// A 12-byte object identifier.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct ObjectId([u8; 12]);

impl ObjectId {
    /// Wraps raw identifier bytes.
    #[must_use]
    pub const fn from_bytes(bytes: [u8; 12]) -> Self { Self(bytes) }

    /// The raw identifier bytes.
    #[must_use]
    pub const fn bytes(&self) -> [u8; 12] { self.0 }
}

impl fmt::Debug for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ObjectId({self})")
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in self.0 {
            write!(f, "{byte:02x}")?;
        }
        Ok(())
    }
}

/// Milliseconds since the Unix epoch.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default,
)]
pub struct DateTime(i64);

impl DateTime {
    /// Creates a datetime from milliseconds since the Unix epoch.
    #[must_use]
    pub const fn from_millis(millis: i64) -> Self { Self(millis) }

    /// Milliseconds since the Unix epoch.
    #[must_use]
    pub const fn millis(&self) -> i64 { self.0 }
}

/// An internal replication timestamp.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default,
)]
pub struct Timestamp {
    /// Seconds since the Unix epoch.
    pub time: u32,
    /// Ordinal within the second.
    pub increment: u32,
}

impl Timestamp {
    pub(crate) const fn to_u64(self) -> u64 {
        ((self.time as u64) << 32) | self.increment as u64
    }

    #[allow(clippy::cast_possible_truncation)]
    pub(crate) const fn from_u64(value: u64) -> Self {
        Self { time: (value >> 32) as u32, increment: value as u32 }
    }
}

/// A 128-bit decimal, carried as its raw little-endian bytes.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Decimal128([u8; 16]);

impl Decimal128 {
    /// Wraps raw decimal bytes.
    #[must_use]
    pub const fn from_bytes(bytes: [u8; 16]) -> Self { Self(bytes) }

    /// The raw decimal bytes.
    #[must_use]
    pub const fn bytes(&self) -> [u8; 16] { self.0 }
}

impl fmt::Debug for Decimal128 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Decimal128(0x")?;
        for byte in self.0.iter().rev() {
            write!(f, "{byte:02x}")?;
        }
        write!(f, ")")
    }
}

/// Binary subtype for generic binary data.
pub const BINARY_GENERIC: u8 = 0x00;

/// Deprecated binary subtype whose payload repeats its own length.
pub const BINARY_OLD: u8 = 0x02;

/// A single element payload, borrowing strings, bytes and sub-documents from
/// the buffer it was read from.
///
/// This is the complete set of leaf kinds the writer can emit and the reader
/// can produce. Sub-documents stay undecoded as [`RawDocument`]s until a
/// caller descends into them.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Value<'a> {
    /// 64-bit floating point.
    Double(f64),
    /// UTF-8 string.
    String(&'a str),
    /// Nested document.
    Document(RawDocument<'a>),
    /// Nested array.
    Array(RawDocument<'a>),
    /// Binary data with its subtype.
    Binary {
        /// Subtype byte.
        subtype: u8,
        /// Payload bytes.
        bytes: &'a [u8],
    },
    /// Deprecated undefined.
    Undefined,
    /// Object identifier.
    ObjectId(ObjectId),
    /// Boolean.
    Boolean(bool),
    /// UTC datetime.
    DateTime(DateTime),
    /// Null.
    Null,
    /// Regular expression.
    RegularExpression {
        /// Pattern source.
        pattern: &'a str,
        /// Option flags.
        options: &'a str,
    },
    /// Deprecated database pointer.
    DbPointer {
        /// Collection namespace.
        namespace: &'a str,
        /// Referenced identifier.
        id: ObjectId,
    },
    /// JavaScript code.
    JavaScriptCode(&'a str),
    /// Deprecated symbol.
    Symbol(&'a str),
    /// JavaScript code with a scope document.
    JavaScriptCodeWithScope {
        /// Code source.
        code: &'a str,
        /// Scope bindings.
        scope: RawDocument<'a>,
    },
    /// 32-bit integer.
    Int32(i32),
    /// Replication timestamp.
    Timestamp(Timestamp),
    /// 64-bit integer.
    Int64(i64),
    /// 128-bit decimal.
    Decimal128(Decimal128),
    /// Max key.
    MaxKey,
    /// Min key.
    MinKey,
}

impl Value<'_> {
    /// The element type marker for this payload.
    #[must_use]
    pub const fn element_type(&self) -> ElementType {
        match self {
            Self::Double(_) => ElementType::Double,
            Self::String(_) => ElementType::String,
            Self::Document(_) => ElementType::EmbeddedDocument,
            Self::Array(_) => ElementType::Array,
            Self::Binary { .. } => ElementType::Binary,
            Self::Undefined => ElementType::Undefined,
            Self::ObjectId(_) => ElementType::ObjectId,
            Self::Boolean(_) => ElementType::Boolean,
            Self::DateTime(_) => ElementType::DateTime,
            Self::Null => ElementType::Null,
            Self::RegularExpression { .. } => ElementType::RegularExpression,
            Self::DbPointer { .. } => ElementType::DbPointer,
            Self::JavaScriptCode(_) => ElementType::JavaScriptCode,
            Self::Symbol(_) => ElementType::Symbol,
            Self::JavaScriptCodeWithScope { .. } => {
                ElementType::JavaScriptCodeWithScope
            }
            Self::Int32(_) => ElementType::Int32,
            Self::Timestamp(_) => ElementType::Timestamp,
            Self::Int64(_) => ElementType::Int64,
            Self::Decimal128(_) => ElementType::Decimal128,
            Self::MaxKey => ElementType::MaxKey,
            Self::MinKey => ElementType::MinKey,
        }
    }
}
