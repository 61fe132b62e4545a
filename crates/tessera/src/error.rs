//! The error type shared by registries, codecs and the marshal entry points.

use std::io;

use tessera_document::{CursorViolation, ElementType, MalformedKind};

/// An error produced while building a registry or encoding/decoding a value.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// No codec applies to the type: it satisfies no registered capability,
    /// has no registered codec and its shape has no fallback codec.
    #[error("no codec registered for type `{type_name}`")]
    UnregisteredType {
        /// Name of the type that could not be resolved.
        type_name: &'static str,
    },

    /// The struct tags of a type are contradictory.
    #[error("conflicting struct tags on `{type_name}`: {reason}")]
    TagConflict {
        /// The struct whose description could not be built.
        type_name: &'static str,
        /// What conflicts.
        reason: String,
    },

    /// The input bytes are not a valid document.
    #[error("malformed document at byte {offset}: {kind}")]
    MalformedDocument {
        /// Absolute offset of the problem.
        offset: usize,
        /// What was wrong.
        kind: MalformedKind,
    },

    /// Decoding would lose precision and the field is not tagged
    /// `truncate`.
    #[error("decoding {value} into `{target}` would lose precision")]
    PrecisionLoss {
        /// The stored value.
        value: String,
        /// The target type.
        target: &'static str,
    },

    /// A document key names a field that is not public.
    #[error("field `{field}` of `{type_name}` is not accessible")]
    FieldAccessDenied {
        /// The struct being decoded.
        type_name: &'static str,
        /// The non-public field.
        field: &'static str,
    },

    /// A codec drove the document writer or reader out of protocol. This is
    /// a bug in the codec, never bad input.
    #[error("cursor invariant violated: {0}")]
    CursorInvariantViolation(CursorViolation),

    /// The stored element type cannot be decoded into the target type.
    #[error("cannot decode {found} element into `{target}`")]
    TypeMismatch {
        /// The element type that was found.
        found: ElementType,
        /// The target type.
        target: &'static str,
    },

    /// A numeric value does not fit the target type.
    #[error("{value} is out of range for `{target}`")]
    OutOfRange {
        /// The value that does not fit.
        value: String,
        /// The target type.
        target: &'static str,
    },

    /// Strict decoding found a key that matches no field.
    #[error("unknown field `{key}` for `{type_name}`")]
    UnknownField {
        /// The struct being decoded.
        type_name: &'static str,
        /// The unmatched key.
        key: String,
    },

    /// A document key cannot be parsed as the map's key type.
    #[error("key {key:?} is not a valid `{target}`")]
    InvalidMapKey {
        /// The key as stored in the document.
        key: String,
        /// The map's key type.
        target: &'static str,
    },

    /// A key or C string contains an interior NUL byte.
    #[error("{0:?} contains an interior NUL byte")]
    InvalidKey(String),

    /// A document is larger than the configured limit.
    #[error("document of {size} bytes exceeds the limit of {limit} bytes")]
    DocumentTooLarge {
        /// Declared size.
        size: usize,
        /// Configured limit.
        limit: usize,
    },

    /// A codec was handed a value of a different type than the one it was
    /// registered for.
    #[error("codec expected a value of type `{expected}`")]
    ValueMismatch {
        /// The type the codec works on.
        expected: &'static str,
    },

    /// Reading from or writing to a stream failed.
    #[error(transparent)]
    Io(#[from] io::Error),

    /// A user-defined codec failed.
    #[error("{0}")]
    Custom(String),
}

impl Error {
    /// Creates a [`Error::Custom`] from any displayable message.
    pub fn custom(message: impl std::fmt::Display) -> Self {
        Self::Custom(message.to_string())
    }
}

impl From<tessera_document::Error> for Error {
    fn from(error: tessera_document::Error) -> Self {
        match error {
            tessera_document::Error::Malformed { offset, kind } => {
                Self::MalformedDocument { offset, kind }
            }
            tessera_document::Error::Cursor(violation) => {
                Self::CursorInvariantViolation(violation)
            }
            tessera_document::Error::TypeMismatch { expected, found } => {
                Self::TypeMismatch { found, target: expected.name() }
            }
            tessera_document::Error::InvalidCString(key) => {
                Self::InvalidKey(key)
            }
        }
    }
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;
