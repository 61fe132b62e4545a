//! Low-level reading and writing of length-prefixed binary documents.
//!
//! A document is a little-endian `i32` byte length, a sequence of elements,
//! and a terminating NUL byte. Each element is a one-byte
//! [`ElementType`] marker, a NUL-terminated key, and a payload whose layout
//! depends on the marker. Arrays are documents whose keys are the decimal
//! indices `"0"`, `"1"`, ...
//!
//! This crate knows nothing about Rust types. It provides:
//!
//! - [`DocumentWriter`]: a single-pass writer with back-patched lengths and
//!   an enforced open/key/value/close protocol.
//! - [`DocumentReader`]: a lazy cursor that can read, skip, or descend into
//!   each element, plus [`ValueReader`], a self-contained view of one
//!   payload.
//! - [`RawDocument`]/[`RawDocumentBuf`]: undecoded documents that pass
//!   through encode and decode untouched.
//! - [`Bson`]/[`Document`]: owned, decoded values.
//!
//! Codecs built on top of these cursors live in the `tessera` crate.

mod bson;
mod element;
mod error;
mod raw;
mod reader;
mod value;
mod writer;

pub use bson::{Binary, Bson, Document};
pub use element::{DocumentKind, ElementType};
pub use error::{CursorViolation, Error, MalformedKind, Result};
pub use raw::{RawDocument, RawDocumentBuf, validate};
pub use reader::{
    DocumentReader, ElementHeader, MAX_NESTING_DEPTH, MIN_DOCUMENT_LEN,
    ValueReader,
};
pub use value::{
    BINARY_GENERIC, BINARY_OLD, DateTime, Decimal128, ObjectId, Timestamp,
    Value,
};
pub use writer::DocumentWriter;
