//! Positional reader over an encoded document.
//!
//! [`DocumentReader`] walks the elements of one document lazily: [`next`]
//! reads only an element's marker and key, leaving its payload untouched
//! until the caller decides to [`read_value`], [`skip_value`],
//! [`descend_into`] it, or hand it to a codec via [`value_reader`]. Skipping
//! uses the payload's length prefix (or fixed width), so uninteresting
//! sub-documents are stepped over without being decoded.
//!
//! Readers borrow the buffer they walk; descending into a sub-document
//! produces a new reader over a sub-slice of the same buffer, so nothing is
//! copied. Error offsets are always absolute, counted from the start of the
//! outermost buffer.
//!
//! [`next`]: DocumentReader::next
//! [`read_value`]: DocumentReader::read_value
//! [`skip_value`]: DocumentReader::skip_value
//! [`descend_into`]: DocumentReader::descend_into
//! [`value_reader`]: DocumentReader::value_reader

use crate::{
    element::{DocumentKind, ElementType},
    error::{CursorViolation, Error, MalformedKind, Result},
    raw::RawDocument,
    value::{
        BINARY_OLD, DateTime, Decimal128, ObjectId, Timestamp, Value,
    },
};

/// Smallest possible document: a length prefix and a terminator.
pub const MIN_DOCUMENT_LEN: usize = 5;

/// How many documents and arrays may enclose one another, the outermost
/// document included. Readers that build owned trees stop with
/// [`MalformedKind::TooDeep`] beyond this.
pub const MAX_NESTING_DEPTH: usize = 100;

/// Fails with [`MalformedKind::TooDeep`] if `depth` exceeds
/// [`MAX_NESTING_DEPTH`].
pub(crate) fn check_depth(depth: usize, offset: usize) -> Result<()> {
    if depth > MAX_NESTING_DEPTH {
        return Err(Error::malformed(
            offset,
            MalformedKind::TooDeep(MAX_NESTING_DEPTH),
        ));
    }
    Ok(())
}

/// The marker and key of an element, produced by [`DocumentReader::next`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ElementHeader<'a> {
    /// The payload's type marker.
    pub element_type: ElementType,
    /// The element key, borrowed from the buffer.
    pub key: &'a str,
    /// Absolute offset of the element's type marker.
    pub offset: usize,
}

#[derive(Debug, Clone, Copy)]
struct Current {
    element_type: ElementType,
    value_start: usize,
}

/// A forward-only cursor over the elements of a single document.
///
/// The reader is finite and not restartable: once [`next`](Self::next) has
/// returned `None` it keeps returning `None`. Callers that need to rescan
/// should keep the underlying bytes (see [`as_bytes`](Self::as_bytes)) and
/// create a fresh reader.
#[derive(Debug, Clone)]
pub struct DocumentReader<'a> {
    bytes: &'a [u8],
    base: usize,
    pos: usize,
    kind: DocumentKind,
    current: Option<Current>,
    done: bool,
}

impl<'a> DocumentReader<'a> {
    /// Creates a reader over the document at the start of `bytes`.
    ///
    /// Only the document header is validated here: the length prefix must be
    /// at least [`MIN_DOCUMENT_LEN`], must not exceed `bytes`, and the byte
    /// it points at must be the terminator. Bytes after the declared length
    /// are ignored. Elements are validated as they are visited.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Malformed`] if the header is invalid.
    pub fn new(bytes: &'a [u8]) -> Result<Self> {
        Self::at(bytes, 0, DocumentKind::Document)
    }

    pub(crate) fn at(
        bytes: &'a [u8],
        base: usize,
        kind: DocumentKind,
    ) -> Result<Self> {
        let declared = read_length(bytes, 0, bytes.len(), base)?;
        if declared < MIN_DOCUMENT_LEN {
            return Err(Error::malformed(
                base,
                MalformedKind::InvalidLength(length_as_i32(declared)),
            ));
        }
        if declared > bytes.len() {
            return Err(Error::malformed(base, MalformedKind::Truncated {
                needed: declared,
                remaining: bytes.len(),
            }));
        }

        let bytes = &bytes[..declared];
        if bytes[declared - 1] != 0 {
            return Err(Error::malformed(
                base + declared - 1,
                MalformedKind::MissingTerminator,
            ));
        }

        Ok(Self { bytes, base, pos: 4, kind, current: None, done: false })
    }

    /// The complete bytes of this document, including its length prefix and
    /// terminator.
    #[must_use]
    pub const fn as_bytes(&self) -> &'a [u8] { self.bytes }

    /// Declared length of this document in bytes.
    #[must_use]
    pub const fn len(&self) -> usize { self.bytes.len() }

    /// Returns `true` if the document has no elements.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.bytes.len() == MIN_DOCUMENT_LEN
    }

    /// Whether this reader walks a plain document or an array.
    #[must_use]
    pub const fn kind(&self) -> DocumentKind { self.kind }

    /// Absolute offset of the cursor within the outermost buffer.
    #[must_use]
    pub const fn offset(&self) -> usize { self.base + self.pos }

    /// Advances to the next element and returns its header.
    ///
    /// If the previous element's payload was neither read nor skipped, it is
    /// skipped first. Returns `None` once the terminator is reached.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Malformed`] for unknown type markers, unterminated
    /// or non-UTF-8 keys, a terminator before the end of the document, or a
    /// payload of the previous element that overruns the document.
    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) -> Result<Option<ElementHeader<'a>>> {
        if self.current.is_some() {
            self.skip_value()?;
        }
        if self.done {
            return Ok(None);
        }

        let end = self.end();
        if self.pos == end {
            self.done = true;
            self.pos = self.bytes.len();
            return Ok(None);
        }

        let marker_at = self.pos;
        let marker = self.bytes[marker_at];
        if marker == 0 {
            return Err(Error::malformed(
                self.base + marker_at,
                MalformedKind::UnexpectedTerminator,
            ));
        }
        let element_type = ElementType::from_u8(marker).ok_or_else(|| {
            Error::malformed(
                self.base + marker_at,
                MalformedKind::UnknownElementType(marker),
            )
        })?;

        let (key, value_start) =
            read_cstr(self.bytes, marker_at + 1, end, self.base)?;

        self.pos = value_start;
        self.current = Some(Current { element_type, value_start });

        Ok(Some(ElementHeader {
            element_type,
            key,
            offset: self.base + marker_at,
        }))
    }

    /// Decodes the payload of the current element and advances past it.
    ///
    /// Sub-documents are returned undecoded as [`RawDocument`]s.
    ///
    /// # Errors
    ///
    /// Returns [`CursorViolation::NoCurrentElement`] if [`next`](Self::next)
    /// has not produced an element, or [`Error::Malformed`] if the payload
    /// is invalid.
    pub fn read_value(&mut self) -> Result<Value<'a>> {
        let current = self.take_current()?;
        let (value, next) = read_payload(
            self.bytes,
            self.base,
            current.element_type,
            current.value_start,
            self.end(),
        )?;
        self.pos = next;
        Ok(value)
    }

    /// Advances past the payload of the current element without decoding
    /// it.
    ///
    /// # Errors
    ///
    /// Returns [`CursorViolation::NoCurrentElement`] if there is no current
    /// element, or [`Error::Malformed`] if the payload's length prefix
    /// overruns the document.
    pub fn skip_value(&mut self) -> Result<()> {
        let current = self.take_current()?;
        let len = payload_len(
            self.bytes,
            self.base,
            current.element_type,
            current.value_start,
            self.end(),
        )?;
        self.pos = current.value_start + len;
        Ok(())
    }

    /// Enters the current element, which must be a document or an array,
    /// and returns a reader over it. This reader is advanced past the
    /// element.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TypeMismatch`] if the current element is not a
    /// document or array, plus the errors of [`skip_value`](Self::skip_value).
    pub fn descend_into(&mut self) -> Result<DocumentReader<'a>> {
        self.value_reader()?.read_nested()
    }

    /// Hands the current element's payload to the caller as a
    /// self-contained [`ValueReader`], advancing this reader past it.
    ///
    /// # Errors
    ///
    /// Same as [`skip_value`](Self::skip_value).
    pub fn value_reader(&mut self) -> Result<ValueReader<'a>> {
        let current = self.take_current()?;
        let len = payload_len(
            self.bytes,
            self.base,
            current.element_type,
            current.value_start,
            self.end(),
        )?;
        let start = current.value_start;
        self.pos = start + len;

        Ok(ValueReader {
            element_type: current.element_type,
            bytes: &self.bytes[start..start + len],
            offset: self.base + start,
        })
    }

    /// Moves the cursor to the element with the given key and returns its
    /// header, skipping every element in between.
    ///
    /// # Errors
    ///
    /// Propagates errors from [`next`](Self::next).
    pub fn seek(&mut self, key: &str) -> Result<Option<ElementHeader<'a>>> {
        while let Some(header) = self.next()? {
            if header.key == key {
                return Ok(Some(header));
            }
        }
        Ok(None)
    }

    /// Advances to the next element and returns its payload as a
    /// [`ValueReader`], discarding the key. Convenient for arrays.
    ///
    /// # Errors
    ///
    /// Propagates errors from [`next`](Self::next) and
    /// [`value_reader`](Self::value_reader).
    pub fn next_value(&mut self) -> Result<Option<ValueReader<'a>>> {
        match self.next()? {
            Some(_) => self.value_reader().map(Some),
            None => Ok(None),
        }
    }

    const fn end(&self) -> usize { self.bytes.len() - 1 }

    fn take_current(&mut self) -> Result<Current> {
        self.current.take().ok_or(Error::Cursor(CursorViolation::NoCurrentElement))
    }
}

/// A borrowed view of exactly one element payload.
///
/// This is what codecs receive when decoding: it knows the payload's type and
/// span, borrows the original buffer, and is independent of the reader that
/// produced it, so a codec can never consume more than its own value.
#[derive(Debug, Clone, Copy)]
pub struct ValueReader<'a> {
    element_type: ElementType,
    bytes: &'a [u8],
    offset: usize,
}

impl<'a> ValueReader<'a> {
    /// Creates a value reader for a complete top-level document.
    ///
    /// Unlike [`DocumentReader::new`], the declared length must match
    /// `bytes` exactly.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Malformed`] if the header is invalid or the declared
    /// length differs from `bytes.len()`.
    pub fn root(bytes: &'a [u8]) -> Result<Self> {
        let reader = DocumentReader::new(bytes)?;
        if reader.len() != bytes.len() {
            return Err(Error::malformed(0, MalformedKind::LengthMismatch {
                declared: reader.len(),
                actual: bytes.len(),
            }));
        }
        Ok(Self {
            element_type: ElementType::EmbeddedDocument,
            bytes,
            offset: 0,
        })
    }

    /// The payload's type marker.
    #[must_use]
    pub const fn element_type(&self) -> ElementType { self.element_type }

    /// Absolute offset of the payload within the outermost buffer.
    #[must_use]
    pub const fn offset(&self) -> usize { self.offset }

    /// The raw payload bytes.
    #[must_use]
    pub const fn as_bytes(&self) -> &'a [u8] { self.bytes }

    /// Decodes the payload.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Malformed`] if the payload is invalid.
    pub fn read(self) -> Result<Value<'a>> {
        // Payload offsets are relative to `bytes`, so the base is shifted to
        // keep error offsets absolute.
        read_payload(self.bytes, self.offset, self.element_type, 0, self.bytes.len())
            .map(|(value, _)| value)
    }

    /// Opens the payload as a document.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TypeMismatch`] unless the payload is an embedded
    /// document.
    pub fn read_document(self) -> Result<DocumentReader<'a>> {
        self.expect(ElementType::EmbeddedDocument)?;
        DocumentReader::at(self.bytes, self.offset, DocumentKind::Document)
    }

    /// Opens the payload as an array.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TypeMismatch`] unless the payload is an array.
    pub fn read_array(self) -> Result<DocumentReader<'a>> {
        self.expect(ElementType::Array)?;
        DocumentReader::at(self.bytes, self.offset, DocumentKind::Array)
    }

    /// Opens the payload as either a document or an array.
    fn read_nested(self) -> Result<DocumentReader<'a>> {
        match self.element_type {
            ElementType::EmbeddedDocument => self.read_document(),
            ElementType::Array => self.read_array(),
            found => Err(Error::TypeMismatch {
                expected: ElementType::EmbeddedDocument,
                found,
            }),
        }
    }

    /// Reads a double payload.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TypeMismatch`] for any other element type.
    pub fn read_f64(self) -> Result<f64> {
        match self.read_expecting(ElementType::Double)? {
            Value::Double(v) => Ok(v),
            _ => unreachable!("payload type checked by read_expecting"),
        }
    }

    /// Reads a 32-bit integer payload.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TypeMismatch`] for any other element type.
    pub fn read_i32(self) -> Result<i32> {
        match self.read_expecting(ElementType::Int32)? {
            Value::Int32(v) => Ok(v),
            _ => unreachable!("payload type checked by read_expecting"),
        }
    }

    /// Reads a 64-bit integer payload.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TypeMismatch`] for any other element type.
    pub fn read_i64(self) -> Result<i64> {
        match self.read_expecting(ElementType::Int64)? {
            Value::Int64(v) => Ok(v),
            _ => unreachable!("payload type checked by read_expecting"),
        }
    }

    /// Reads a boolean payload.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TypeMismatch`] for any other element type.
    pub fn read_bool(self) -> Result<bool> {
        match self.read_expecting(ElementType::Boolean)? {
            Value::Boolean(v) => Ok(v),
            _ => unreachable!("payload type checked by read_expecting"),
        }
    }

    /// Reads a string payload, borrowed from the buffer.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TypeMismatch`] for any other element type.
    pub fn read_str(self) -> Result<&'a str> {
        match self.read_expecting(ElementType::String)? {
            Value::String(v) => Ok(v),
            _ => unreachable!("payload type checked by read_expecting"),
        }
    }

    /// Reads a binary payload as `(subtype, bytes)`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TypeMismatch`] for any other element type.
    pub fn read_binary(self) -> Result<(u8, &'a [u8])> {
        match self.read_expecting(ElementType::Binary)? {
            Value::Binary { subtype, bytes } => Ok((subtype, bytes)),
            _ => unreachable!("payload type checked by read_expecting"),
        }
    }

    /// Consumes a null payload.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TypeMismatch`] for any other element type.
    pub fn read_null(self) -> Result<()> { self.expect(ElementType::Null) }

    fn read_expecting(self, expected: ElementType) -> Result<Value<'a>> {
        self.expect(expected)?;
        self.read()
    }

    fn expect(&self, expected: ElementType) -> Result<()> {
        if self.element_type == expected {
            Ok(())
        } else {
            Err(Error::TypeMismatch { expected, found: self.element_type })
        }
    }
}

// =============================================================================
// Payload sizing and decoding
// =============================================================================

/// Checks that `needed` bytes are available in `[at, limit)`.
fn ensure(
    at: usize,
    needed: usize,
    limit: usize,
    base: usize,
) -> Result<()> {
    let remaining = limit.saturating_sub(at);
    if needed > remaining {
        return Err(Error::malformed(base + at, MalformedKind::Truncated {
            needed,
            remaining,
        }));
    }
    Ok(())
}

fn read_array<const N: usize>(
    bytes: &[u8],
    at: usize,
    limit: usize,
    base: usize,
) -> Result<[u8; N]> {
    ensure(at, N, limit, base)?;
    let mut out = [0u8; N];
    out.copy_from_slice(&bytes[at..at + N]);
    Ok(out)
}

fn read_i32(bytes: &[u8], at: usize, limit: usize, base: usize) -> Result<i32> {
    read_array::<4>(bytes, at, limit, base).map(i32::from_le_bytes)
}

/// Reads a length prefix, rejecting negative values.
fn read_length(
    bytes: &[u8],
    at: usize,
    limit: usize,
    base: usize,
) -> Result<usize> {
    let raw = read_i32(bytes, at, limit, base)?;
    usize::try_from(raw).map_err(|_| {
        Error::malformed(base + at, MalformedKind::InvalidLength(raw))
    })
}

fn length_as_i32(len: usize) -> i32 { i32::try_from(len).unwrap_or(i32::MAX) }

fn to_str(bytes: &[u8], at: usize, base: usize) -> Result<&str> {
    std::str::from_utf8(bytes)
        .map_err(|_| Error::malformed(base + at, MalformedKind::InvalidUtf8))
}

/// Reads a NUL-terminated string in `[at, limit)`, returning it and the
/// offset just past its terminator.
fn read_cstr(
    bytes: &[u8],
    at: usize,
    limit: usize,
    base: usize,
) -> Result<(&str, usize)> {
    let span = bytes.get(at..limit).unwrap_or_default();
    let nul = span.iter().position(|&b| b == 0).ok_or_else(|| {
        Error::malformed(base + at, MalformedKind::UnterminatedCString)
    })?;
    let text = to_str(&span[..nul], at, base)?;
    Ok((text, at + nul + 1))
}

/// Sizes a length-prefixed string: `i32 len` followed by `len` bytes, the
/// last of which is NUL.
fn string_len(bytes: &[u8], at: usize, limit: usize, base: usize) -> Result<usize> {
    let len = read_length(bytes, at, limit, base)?;
    if len == 0 {
        return Err(Error::malformed(base + at, MalformedKind::InvalidLength(0)));
    }
    ensure(at + 4, len, limit, base)?;
    if bytes[at + 4 + len - 1] != 0 {
        return Err(Error::malformed(
            base + at + 4 + len - 1,
            MalformedKind::UnterminatedString,
        ));
    }
    Ok(4 + len)
}

fn read_string(
    bytes: &[u8],
    at: usize,
    limit: usize,
    base: usize,
) -> Result<(&str, usize)> {
    let len = string_len(bytes, at, limit, base)?;
    let text = to_str(&bytes[at + 4..at + len - 1], at + 4, base)?;
    Ok((text, at + len))
}

fn document_len(
    bytes: &[u8],
    at: usize,
    limit: usize,
    base: usize,
) -> Result<usize> {
    let len = read_length(bytes, at, limit, base)?;
    if len < MIN_DOCUMENT_LEN {
        return Err(Error::malformed(
            base + at,
            MalformedKind::InvalidLength(length_as_i32(len)),
        ));
    }
    ensure(at, len, limit, base)?;
    if bytes[at + len - 1] != 0 {
        return Err(Error::malformed(
            base + at + len - 1,
            MalformedKind::MissingTerminator,
        ));
    }
    Ok(len)
}

/// Returns the byte length of the payload of an element of type `ty`
/// starting at `at`, which must lie entirely within `[at, limit)`.
fn payload_len(
    bytes: &[u8],
    base: usize,
    ty: ElementType,
    at: usize,
    limit: usize,
) -> Result<usize> {
    let fixed = |n: usize| ensure(at, n, limit, base).map(|()| n);

    match ty {
        ElementType::Undefined
        | ElementType::Null
        | ElementType::MinKey
        | ElementType::MaxKey => Ok(0),
        ElementType::Boolean => fixed(1),
        ElementType::Int32 => fixed(4),
        ElementType::Double
        | ElementType::DateTime
        | ElementType::Timestamp
        | ElementType::Int64 => fixed(8),
        ElementType::ObjectId => fixed(12),
        ElementType::Decimal128 => fixed(16),
        ElementType::String
        | ElementType::JavaScriptCode
        | ElementType::Symbol => string_len(bytes, at, limit, base),
        ElementType::EmbeddedDocument | ElementType::Array => {
            document_len(bytes, at, limit, base)
        }
        ElementType::Binary => {
            let len = read_length(bytes, at, limit, base)?;
            ensure(at + 4, 1 + len, limit, base)?;
            Ok(5 + len)
        }
        ElementType::RegularExpression => {
            let (_, after_pattern) = read_cstr(bytes, at, limit, base)?;
            let (_, after_options) =
                read_cstr(bytes, after_pattern, limit, base)?;
            Ok(after_options - at)
        }
        ElementType::DbPointer => {
            let len = string_len(bytes, at, limit, base)?;
            ensure(at + len, 12, limit, base)?;
            Ok(len + 12)
        }
        ElementType::JavaScriptCodeWithScope => {
            let total = read_length(bytes, at, limit, base)?;
            ensure(at, total, limit, base)?;
            let code = string_len(bytes, at + 4, at + total, base)?;
            let scope = document_len(bytes, at + 4 + code, at + total, base)?;
            if 4 + code + scope != total {
                return Err(Error::malformed(
                    base + at,
                    MalformedKind::LengthMismatch {
                        declared: total,
                        actual: 4 + code + scope,
                    },
                ));
            }
            Ok(total)
        }
    }
}

/// Decodes the payload of an element of type `ty` starting at `at`,
/// returning the value and the offset just past it.
#[allow(clippy::too_many_lines)]
fn read_payload<'a>(
    bytes: &'a [u8],
    base: usize,
    ty: ElementType,
    at: usize,
    limit: usize,
) -> Result<(Value<'a>, usize)> {
    let value = match ty {
        ElementType::Double => {
            Value::Double(f64::from_le_bytes(read_array(bytes, at, limit, base)?))
        }
        ElementType::String
        | ElementType::JavaScriptCode
        | ElementType::Symbol => {
            let (text, next) = read_string(bytes, at, limit, base)?;
            let value = match ty {
                ElementType::String => Value::String(text),
                ElementType::JavaScriptCode => Value::JavaScriptCode(text),
                _ => Value::Symbol(text),
            };
            return Ok((value, next));
        }
        ElementType::EmbeddedDocument | ElementType::Array => {
            let len = document_len(bytes, at, limit, base)?;
            let raw = RawDocument::new_unchecked(&bytes[at..at + len], base + at);
            let value = if ty == ElementType::Array {
                Value::Array(raw)
            } else {
                Value::Document(raw)
            };
            return Ok((value, at + len));
        }
        ElementType::Binary => {
            let len = payload_len(bytes, base, ty, at, limit)?;
            let subtype = bytes[at + 4];
            let mut data = &bytes[at + 5..at + len];
            if subtype == BINARY_OLD {
                let inner = read_length(data, 0, data.len(), base + at + 5)?;
                ensure(4, inner, data.len(), base + at + 5)?;
                data = &data[4..4 + inner];
            }
            return Ok((Value::Binary { subtype, bytes: data }, at + len));
        }
        ElementType::Undefined => Value::Undefined,
        ElementType::ObjectId => {
            Value::ObjectId(ObjectId::from_bytes(read_array(bytes, at, limit, base)?))
        }
        ElementType::Boolean => {
            let [byte] = read_array(bytes, at, limit, base)?;
            match byte {
                0 => Value::Boolean(false),
                1 => Value::Boolean(true),
                other => {
                    return Err(Error::malformed(
                        base + at,
                        MalformedKind::InvalidBoolean(other),
                    ));
                }
            }
        }
        ElementType::DateTime => Value::DateTime(DateTime::from_millis(
            i64::from_le_bytes(read_array(bytes, at, limit, base)?),
        )),
        ElementType::Null => Value::Null,
        ElementType::RegularExpression => {
            let (pattern, next) = read_cstr(bytes, at, limit, base)?;
            let (options, next) = read_cstr(bytes, next, limit, base)?;
            return Ok((Value::RegularExpression { pattern, options }, next));
        }
        ElementType::DbPointer => {
            let (namespace, next) = read_string(bytes, at, limit, base)?;
            let id = ObjectId::from_bytes(read_array(bytes, next, limit, base)?);
            return Ok((Value::DbPointer { namespace, id }, next + 12));
        }
        ElementType::JavaScriptCodeWithScope => {
            let total = payload_len(bytes, base, ty, at, limit)?;
            let (code, scope_at) = read_string(bytes, at + 4, at + total, base)?;
            let scope = RawDocument::new_unchecked(
                &bytes[scope_at..at + total],
                base + scope_at,
            );
            return Ok((Value::JavaScriptCodeWithScope { code, scope }, at + total));
        }
        ElementType::Int32 => {
            Value::Int32(read_i32(bytes, at, limit, base)?)
        }
        ElementType::Timestamp => Value::Timestamp(Timestamp::from_u64(
            u64::from_le_bytes(read_array(bytes, at, limit, base)?),
        )),
        ElementType::Int64 => {
            Value::Int64(i64::from_le_bytes(read_array(bytes, at, limit, base)?))
        }
        ElementType::Decimal128 => Value::Decimal128(Decimal128::from_bytes(
            read_array(bytes, at, limit, base)?,
        )),
        ElementType::MaxKey => Value::MaxKey,
        ElementType::MinKey => Value::MinKey,
    };

    let len = payload_len(bytes, base, ty, at, limit)?;
    Ok((value, at + len))
}

#[cfg(test)]
mod test;
