//! Undecoded documents.
//!
//! A [`RawDocument`] is a borrowed, header-checked view of an encoded
//! document; [`RawDocumentBuf`] is its owned, fully validated counterpart.
//! Both keep the bytes exactly as they were encoded, so passing a raw
//! document through a decode and re-encode is byte-for-byte lossless.

use std::fmt;

use crate::{
    element::DocumentKind,
    error::{Error, MalformedKind, Result},
    reader::{DocumentReader, check_depth},
    value::Value,
};

/// A borrowed, undecoded document.
#[derive(Clone, Copy)]
pub struct RawDocument<'a> {
    bytes: &'a [u8],
    base: usize,
}

impl<'a> RawDocument<'a> {
    pub(crate) const fn new_unchecked(bytes: &'a [u8], base: usize) -> Self {
        Self { bytes, base }
    }

    /// Wraps the document at the start of `bytes` after checking its header.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Malformed`] if the header is invalid.
    pub fn from_bytes(bytes: &'a [u8]) -> Result<Self> {
        let reader = DocumentReader::new(bytes)?;
        Ok(Self { bytes: reader.as_bytes(), base: 0 })
    }

    /// The encoded bytes, length prefix and terminator included.
    #[must_use]
    pub const fn as_bytes(&self) -> &'a [u8] { self.bytes }

    /// Opens a reader over the document's elements.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Malformed`] if the header is invalid.
    pub fn reader(&self) -> Result<DocumentReader<'a>> {
        DocumentReader::at(self.bytes, self.base, DocumentKind::Document)
    }

    /// Opens a reader that treats the document as an array.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Malformed`] if the header is invalid.
    pub fn array_reader(&self) -> Result<DocumentReader<'a>> {
        DocumentReader::at(self.bytes, self.base, DocumentKind::Array)
    }

    /// Looks up the first element with the given key, skipping over the
    /// elements before it without decoding them.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Malformed`] if an element on the way is invalid.
    pub fn get(&self, key: &str) -> Result<Option<Value<'a>>> {
        let mut reader = self.reader()?;
        match reader.seek(key)? {
            Some(_) => reader.read_value().map(Some),
            None => Ok(None),
        }
    }

    /// Copies the document into an owned buffer, validating every element.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Malformed`] if any element is invalid.
    pub fn to_raw_document_buf(&self) -> Result<RawDocumentBuf> {
        RawDocumentBuf::from_bytes(self.bytes.to_vec())
    }
}

impl PartialEq for RawDocument<'_> {
    fn eq(&self, other: &Self) -> bool { self.bytes == other.bytes }
}

impl fmt::Debug for RawDocument<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RawDocument")
            .field("len", &self.bytes.len())
            .field("offset", &self.base)
            .finish()
    }
}

/// An owned, fully validated, undecoded document.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct RawDocumentBuf {
    bytes: Vec<u8>,
}

impl RawDocumentBuf {
    /// The empty document.
    #[must_use]
    pub fn new() -> Self { Self { bytes: vec![5, 0, 0, 0, 0] } }

    /// Takes ownership of `bytes` after validating every element, nested
    /// documents included. The declared length must match exactly.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Malformed`] on the first invalid element.
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self> {
        validate(&bytes)?;
        Ok(Self { bytes })
    }

    /// Borrows the document.
    #[must_use]
    pub fn as_raw(&self) -> RawDocument<'_> {
        RawDocument::new_unchecked(&self.bytes, 0)
    }

    /// The encoded bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] { &self.bytes }

    /// Opens a reader over the document's elements.
    ///
    /// # Errors
    ///
    /// Never fails for a validated buffer; the signature mirrors
    /// [`RawDocument::reader`].
    pub fn reader(&self) -> Result<DocumentReader<'_>> { self.as_raw().reader() }

    /// Looks up the first element with the given key.
    ///
    /// # Errors
    ///
    /// See [`RawDocument::get`].
    pub fn get(&self, key: &str) -> Result<Option<Value<'_>>> {
        self.as_raw().get(key)
    }

    /// Releases the encoded bytes.
    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> { self.bytes }
}

impl Default for RawDocumentBuf {
    fn default() -> Self { Self::new() }
}

impl fmt::Debug for RawDocumentBuf {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RawDocumentBuf").field("len", &self.bytes.len()).finish()
    }
}

impl AsRef<[u8]> for RawDocumentBuf {
    fn as_ref(&self) -> &[u8] { &self.bytes }
}

/// Validates a complete top-level document, descending into every nested
/// document and array.
///
/// # Errors
///
/// Returns [`Error::Malformed`] on the first invalid element, or
/// [`MalformedKind::LengthMismatch`] if the declared length differs from
/// `bytes.len()`, or [`MalformedKind::TooDeep`] beyond
/// [`MAX_NESTING_DEPTH`](crate::MAX_NESTING_DEPTH).
pub fn validate(bytes: &[u8]) -> Result<()> {
    let reader = DocumentReader::new(bytes)?;
    if reader.len() != bytes.len() {
        return Err(Error::malformed(0, MalformedKind::LengthMismatch {
            declared: reader.len(),
            actual: bytes.len(),
        }));
    }
    validate_elements(reader, 1)
}

fn validate_elements(
    mut reader: DocumentReader<'_>,
    depth: usize,
) -> Result<()> {
    check_depth(depth, reader.offset())?;
    while let Some(header) = reader.next()? {
        if header.element_type.is_document() {
            validate_elements(reader.descend_into()?, depth + 1)?;
        } else if let Value::JavaScriptCodeWithScope { scope, .. } =
            reader.read_value()?
        {
            validate_elements(scope.reader()?, depth + 1)?;
        }
    }
    Ok(())
}
