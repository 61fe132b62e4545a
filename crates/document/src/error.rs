//! Errors raised by the document reader and writer.

use crate::element::ElementType;

/// An error produced while reading or writing a document.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The input bytes do not form a valid document.
    #[error("malformed document at byte {offset}: {kind}")]
    Malformed {
        /// Absolute offset, from the start of the outermost buffer, at which
        /// the problem was detected.
        offset: usize,
        /// What was wrong.
        kind: MalformedKind,
    },

    /// A cursor was driven out of order. This always indicates a bug in the
    /// calling codec, never bad input.
    #[error("cursor invariant violated: {0}")]
    Cursor(#[from] CursorViolation),

    /// A typed read was attempted on an element of another type.
    #[error("expected {expected} element, found {found}")]
    TypeMismatch {
        /// The element type the caller asked for.
        expected: ElementType,
        /// The element type actually present.
        found: ElementType,
    },

    /// A key or C string contains an interior NUL byte and cannot be encoded.
    #[error("{0:?} contains an interior NUL byte")]
    InvalidCString(String),
}

impl Error {
    pub(crate) const fn malformed(offset: usize, kind: MalformedKind) -> Self {
        Self::Malformed { offset, kind }
    }
}

/// The specific way in which a document is malformed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MalformedKind {
    /// A length prefix or fixed-width payload extends past the end of the
    /// available bytes.
    #[error("needed {needed} bytes but only {remaining} remain")]
    Truncated {
        /// Bytes required by the header or payload.
        needed: usize,
        /// Bytes actually left in the enclosing span.
        remaining: usize,
    },

    /// The declared document length does not match the bytes it spans.
    #[error("declared length {declared} does not match actual length {actual}")]
    LengthMismatch {
        /// Length stated by the prefix.
        declared: usize,
        /// Length observed.
        actual: usize,
    },

    /// A length prefix is negative or below the minimum for its type.
    #[error("invalid length prefix {0}")]
    InvalidLength(i32),

    /// An element type marker is unknown or reserved.
    #[error("unknown element type marker 0x{0:02x}")]
    UnknownElementType(u8),

    /// A document does not end with a NUL byte.
    #[error("missing document terminator")]
    MissingTerminator,

    /// A NUL element marker appeared before the end of the document.
    #[error("unexpected document terminator")]
    UnexpectedTerminator,

    /// A key or C string runs to the end of the document without a NUL.
    #[error("unterminated C string")]
    UnterminatedCString,

    /// A length-prefixed string does not end with a NUL byte.
    #[error("string is not NUL terminated")]
    UnterminatedString,

    /// A key or string is not valid UTF-8.
    #[error("invalid UTF-8")]
    InvalidUtf8,

    /// A boolean payload is neither `0x00` nor `0x01`.
    #[error("invalid boolean byte 0x{0:02x}")]
    InvalidBoolean(u8),

    /// Documents and arrays are nested deeper than the given limit.
    #[error("nested deeper than {0} levels")]
    TooDeep(usize),
}

/// A violation of the writer or reader protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum CursorViolation {
    /// `close_document`/`close_array` was called with nothing open.
    #[error("close without a matching open")]
    CloseWithoutOpen,

    /// A document was closed as an array or the other way round.
    #[error("close does not match the kind of the open sub-document")]
    MismatchedClose,

    /// A key was written while no document was open.
    #[error("key written outside of a document")]
    KeyOutsideDocument,

    /// A key was written inside an array, whose keys are implicit.
    #[error("explicit key written inside an array")]
    KeyInArray,

    /// A key was written while the previous key still awaits its value.
    #[error("key written while another key awaits its value")]
    DanglingKey,

    /// A value was written inside a document without a preceding key.
    #[error("value written without a key")]
    ValueWithoutKey,

    /// The outermost value written was not a document.
    #[error("top-level value must be a document")]
    TopLevelNotDocument,

    /// A value was written after the top-level document was closed.
    #[error("top-level document already complete")]
    DocumentComplete,

    /// The writer was finished with sub-documents still open.
    #[error("{0} sub-document(s) left open")]
    Unclosed(usize),

    /// The writer was finished before any document was written.
    #[error("no document written")]
    Empty,

    /// A finished document would not fit its 32-bit length prefix.
    #[error("document length exceeds the 32-bit length prefix")]
    LengthOverflow,

    /// A value operation was attempted on a reader without a current
    /// element.
    #[error("no current element; call `next` first")]
    NoCurrentElement,
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;
