//! Element type markers.
//!
//! Every element of a document starts with a single byte naming the kind of
//! payload that follows its key. [`ElementType`] is the closed set of markers
//! the reader understands; any other byte is rejected as malformed.

use std::fmt;

/// The type marker that precedes every element key in a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum ElementType {
    /// 64-bit IEEE 754 floating point.
    Double = 0x01,
    /// Length-prefixed UTF-8 string.
    String = 0x02,
    /// Nested document.
    EmbeddedDocument = 0x03,
    /// Nested document whose keys are `"0"`, `"1"`, ...
    Array = 0x04,
    /// Length-prefixed binary blob with a subtype byte.
    Binary = 0x05,
    /// Deprecated undefined marker, no payload.
    Undefined = 0x06,
    /// 12-byte object identifier.
    ObjectId = 0x07,
    /// Single byte, `0x00` or `0x01`.
    Boolean = 0x08,
    /// Milliseconds since the Unix epoch as a signed 64-bit integer.
    DateTime = 0x09,
    /// Null, no payload.
    Null = 0x0A,
    /// Two C strings: pattern and options.
    RegularExpression = 0x0B,
    /// Deprecated namespace string followed by an object identifier.
    DbPointer = 0x0C,
    /// JavaScript source as a string.
    JavaScriptCode = 0x0D,
    /// Deprecated symbol, encoded as a string.
    Symbol = 0x0E,
    /// JavaScript source with a scope document.
    JavaScriptCodeWithScope = 0x0F,
    /// Signed 32-bit integer.
    Int32 = 0x10,
    /// Replication timestamp: increment and seconds.
    Timestamp = 0x11,
    /// Signed 64-bit integer.
    Int64 = 0x12,
    /// 128-bit decimal floating point, carried as raw bytes.
    Decimal128 = 0x13,
    /// Sorts after every other value, no payload.
    MaxKey = 0x7F,
    /// Sorts before every other value, no payload.
    MinKey = 0xFF,
}

impl ElementType {
    /// Maps a marker byte to its element type, or `None` for unknown and
    /// reserved markers.
    #[must_use]
    pub const fn from_u8(byte: u8) -> Option<Self> {
        Some(match byte {
            0x01 => Self::Double,
            0x02 => Self::String,
            0x03 => Self::EmbeddedDocument,
            0x04 => Self::Array,
            0x05 => Self::Binary,
            0x06 => Self::Undefined,
            0x07 => Self::ObjectId,
            0x08 => Self::Boolean,
            0x09 => Self::DateTime,
            0x0A => Self::Null,
            0x0B => Self::RegularExpression,
            0x0C => Self::DbPointer,
            0x0D => Self::JavaScriptCode,
            0x0E => Self::Symbol,
            0x0F => Self::JavaScriptCodeWithScope,
            0x10 => Self::Int32,
            0x11 => Self::Timestamp,
            0x12 => Self::Int64,
            0x13 => Self::Decimal128,
            0x7F => Self::MaxKey,
            0xFF => Self::MinKey,
            _ => return None,
        })
    }

    /// The marker byte written before the element key.
    #[must_use]
    pub const fn as_u8(self) -> u8 { self as u8 }

    /// Returns `true` for the two element types whose payload is itself a
    /// document.
    #[must_use]
    pub const fn is_document(self) -> bool {
        matches!(self, Self::EmbeddedDocument | Self::Array)
    }

    /// A short, human-readable name used in error messages.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Double => "double",
            Self::String => "string",
            Self::EmbeddedDocument => "embedded document",
            Self::Array => "array",
            Self::Binary => "binary",
            Self::Undefined => "undefined",
            Self::ObjectId => "object id",
            Self::Boolean => "boolean",
            Self::DateTime => "datetime",
            Self::Null => "null",
            Self::RegularExpression => "regular expression",
            Self::DbPointer => "db pointer",
            Self::JavaScriptCode => "javascript code",
            Self::Symbol => "symbol",
            Self::JavaScriptCodeWithScope => "javascript code with scope",
            Self::Int32 => "int32",
            Self::Timestamp => "timestamp",
            Self::Int64 => "int64",
            Self::Decimal128 => "decimal128",
            Self::MaxKey => "max key",
            Self::MinKey => "min key",
        }
    }
}

impl fmt::Display for ElementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl TryFrom<u8> for ElementType {
    type Error = u8;

    fn try_from(byte: u8) -> Result<Self, Self::Error> {
        Self::from_u8(byte).ok_or(byte)
    }
}

/// Whether an open sub-document is a plain document or an array.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DocumentKind {
    /// Keys are chosen by the writer.
    Document,
    /// Keys are the decimal element indices.
    Array,
}

impl DocumentKind {
    /// The element type that introduces a nested document of this kind.
    #[must_use]
    pub const fn element_type(self) -> ElementType {
        match self {
            Self::Document => ElementType::EmbeddedDocument,
            Self::Array => ElementType::Array,
        }
    }
}
