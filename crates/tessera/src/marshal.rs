//! One-shot conversion between values and document bytes.
//!
//! The top-level value must encode as a document: a struct, a map, a
//! [`Document`](tessera_document::Document) or anything a custom codec
//! writes as one. Encoding a bare scalar fails with
//! [`Error::CursorInvariantViolation`].

use tessera_document::{DocumentWriter, ValueReader};

use crate::{
    codec::{DecodeContext, EncodeContext, ValueMut, ValueRef},
    error::{Error, Result},
    reflect::Reflect,
    registry::Registry,
};

/// The default value of [`DecodeOptions::max_document_size`]: 16 MiB.
pub const DEFAULT_MAX_DOCUMENT_SIZE: usize = 16 * 1024 * 1024;

/// Per-call encoding options.
#[derive(Debug, Clone, Copy, Default)]
pub struct EncodeOptions {
    /// Encode every integer as int32 when it fits, as if every field were
    /// tagged `minsize`.
    pub min_size: bool,
}

impl EncodeOptions {
    /// Sets [`min_size`](Self::min_size).
    #[must_use]
    pub const fn min_size(mut self, on: bool) -> Self {
        self.min_size = on;
        self
    }
}

/// Per-call decoding options.
#[derive(Debug, Clone, Copy)]
pub struct DecodeOptions {
    /// Reject keys that match no field, and keys naming non-public fields.
    pub strict: bool,
    /// Allow lossy numeric narrowing everywhere, as if every field were
    /// tagged `truncate`.
    pub truncate: bool,
    /// Largest accepted document, in bytes.
    pub max_document_size: usize,
}

impl Default for DecodeOptions {
    fn default() -> Self {
        Self {
            strict: false,
            truncate: false,
            max_document_size: DEFAULT_MAX_DOCUMENT_SIZE,
        }
    }
}

impl DecodeOptions {
    /// Sets [`strict`](Self::strict).
    #[must_use]
    pub const fn strict(mut self, on: bool) -> Self {
        self.strict = on;
        self
    }

    /// Sets [`truncate`](Self::truncate).
    #[must_use]
    pub const fn truncate(mut self, on: bool) -> Self {
        self.truncate = on;
        self
    }

    /// Sets [`max_document_size`](Self::max_document_size).
    #[must_use]
    pub const fn max_document_size(mut self, limit: usize) -> Self {
        self.max_document_size = limit;
        self
    }

    pub(crate) fn check_size(&self, size: usize) -> Result<()> {
        if size > self.max_document_size {
            return Err(Error::DocumentTooLarge {
                size,
                limit: self.max_document_size,
            });
        }
        Ok(())
    }
}

/// Encodes `value` as a standalone document.
///
/// # Errors
///
/// Returns the first error reported by a codec, most commonly
/// [`Error::UnregisteredType`].
pub fn marshal<T: Reflect>(registry: &Registry, value: &T) -> Result<Vec<u8>> {
    marshal_with(registry, value, EncodeOptions::default())
}

/// Encodes `value` with explicit options.
///
/// # Errors
///
/// See [`marshal`].
pub fn marshal_with<T: Reflect>(
    registry: &Registry,
    value: &T,
    options: EncodeOptions,
) -> Result<Vec<u8>> {
    marshal_append(registry, Vec::new(), value, options)
}

/// Encodes `value` at the end of `buf` and returns the extended buffer.
///
/// # Errors
///
/// See [`marshal`].
pub fn marshal_append<T: Reflect>(
    registry: &Registry,
    buf: Vec<u8>,
    value: &T,
    options: EncodeOptions,
) -> Result<Vec<u8>> {
    let mut writer = DocumentWriter::with_buffer(buf);
    EncodeContext::new(registry, options.min_size)
        .encode(&mut writer, ValueRef::new(value))?;
    Ok(writer.finish()?)
}

/// Decodes a `T` from exactly one document.
///
/// # Errors
///
/// Returns [`Error::MalformedDocument`] if `bytes` is not exactly one
/// well-formed document, or the first error reported by a codec.
pub fn unmarshal<T: Reflect + Default>(
    registry: &Registry,
    bytes: &[u8],
) -> Result<T> {
    unmarshal_with(registry, bytes, DecodeOptions::default())
}

/// Decodes a `T` with explicit options.
///
/// # Errors
///
/// See [`unmarshal`]; additionally [`Error::DocumentTooLarge`].
pub fn unmarshal_with<T: Reflect + Default>(
    registry: &Registry,
    bytes: &[u8],
    options: DecodeOptions,
) -> Result<T> {
    let mut value = T::default();
    unmarshal_into(registry, bytes, &mut value, options)?;
    Ok(value)
}

/// Decodes into an existing value. Fields absent from the document keep
/// their current contents.
///
/// # Errors
///
/// See [`unmarshal_with`].
pub fn unmarshal_into<T: Reflect>(
    registry: &Registry,
    bytes: &[u8],
    value: &mut T,
    options: DecodeOptions,
) -> Result<()> {
    options.check_size(bytes.len())?;
    let reader = ValueReader::root(bytes)?;
    DecodeContext::new(registry, options.truncate, options.strict)
        .decode(reader, ValueMut::new(value))
}
