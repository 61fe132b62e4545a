//! Streaming document writer.
//!
//! [`DocumentWriter`] appends elements to a growable buffer in a single
//! forward pass. Each open document or array reserves four bytes for its
//! length prefix; closing it appends the terminator and back-patches the
//! prefix. An element's type marker is not known until its value arrives, so
//! [`write_key`](DocumentWriter::write_key) emits a placeholder marker byte
//! that the following value operation patches in place.
//!
//! The writer enforces its protocol: keys only inside open documents, one
//! value per key, closes matching opens, and a top-level value that is a
//! document. Any violation is reported as a
//! [`CursorViolation`](crate::CursorViolation) instead of producing
//! corrupt output.

use crate::{
    element::{DocumentKind, ElementType},
    error::{CursorViolation, Error, Result},
    raw::RawDocument,
    value::{BINARY_OLD, Value},
};

#[derive(Debug, Clone, Copy)]
struct Frame {
    start: usize,
    kind: DocumentKind,
    next_index: usize,
}

/// Builds one top-level document.
///
/// # Example
///
/// ```ignore
/// let mut writer = DocumentWriter::new();
/// writer.open_document()?;
/// writer.write_element("name", Value::String("tessera"))?;
/// writer.write_key("tags")?;
/// writer.open_array()?;
/// writer.write_value(Value::Int32(1))?;
/// writer.close_array()?;
/// writer.close_document()?;
/// let bytes = writer.finish()?;
/// ```
#[derive(Debug, Default)]
pub struct DocumentWriter {
    buf: Vec<u8>,
    frames: Vec<Frame>,
    pending: Option<usize>,
    complete: bool,
}

impl DocumentWriter {
    /// Creates a writer with an empty buffer.
    #[must_use]
    pub fn new() -> Self { Self::default() }

    /// Creates a writer that appends to `buf`, keeping its existing
    /// contents.
    #[must_use]
    pub fn with_buffer(buf: Vec<u8>) -> Self {
        Self { buf, frames: Vec::new(), pending: None, complete: false }
    }

    /// Number of documents and arrays currently open.
    #[must_use]
    pub fn depth(&self) -> usize { self.frames.len() }

    /// Number of bytes in the buffer so far.
    #[must_use]
    pub fn position(&self) -> usize { self.buf.len() }

    /// Whether the top-level document has been closed.
    #[must_use]
    pub const fn is_complete(&self) -> bool { self.complete }

    /// Whether the innermost open container is an array.
    #[must_use]
    pub fn in_array(&self) -> bool {
        self.frames.last().is_some_and(|frame| frame.kind == DocumentKind::Array)
    }

    /// Writes the key of the next element in the open document.
    ///
    /// # Errors
    ///
    /// Returns a [`CursorViolation`] if no document is open, the innermost
    /// container is an array, or the previous key has no value yet, and
    /// [`Error::InvalidCString`] if `key` contains a NUL byte.
    pub fn write_key(&mut self, key: &str) -> Result<()> {
        match self.frames.last() {
            None => return Err(CursorViolation::KeyOutsideDocument.into()),
            Some(frame) if frame.kind == DocumentKind::Array => {
                return Err(CursorViolation::KeyInArray.into());
            }
            Some(_) => {}
        }
        if self.pending.is_some() {
            return Err(CursorViolation::DanglingKey.into());
        }
        check_cstr(key)?;

        self.pending = Some(self.buf.len());
        self.buf.push(0);
        self.buf.extend_from_slice(key.as_bytes());
        self.buf.push(0);
        Ok(())
    }

    /// Writes a complete leaf value: after a key, as the next array element,
    /// or, for [`Value::Document`], as the whole top-level document.
    ///
    /// # Errors
    ///
    /// Returns a [`CursorViolation`] if the value has no slot to go into,
    /// and [`Error::InvalidCString`] for regular expressions containing NUL.
    pub fn write_value(&mut self, value: Value<'_>) -> Result<()> {
        if let Value::RegularExpression { pattern, options } = value {
            check_cstr(pattern)?;
            check_cstr(options)?;
        }

        self.begin_value(value.element_type())?;

        match value {
            Value::Double(v) => self.buf.extend_from_slice(&v.to_le_bytes()),
            Value::String(s)
            | Value::JavaScriptCode(s)
            | Value::Symbol(s) => self.push_string(s)?,
            Value::Document(raw) | Value::Array(raw) => {
                self.buf.extend_from_slice(raw.as_bytes());
            }
            Value::Binary { subtype, bytes } => {
                if subtype == BINARY_OLD {
                    self.push_len(bytes.len() + 4)?;
                    self.buf.push(subtype);
                    self.push_len(bytes.len())?;
                } else {
                    self.push_len(bytes.len())?;
                    self.buf.push(subtype);
                }
                self.buf.extend_from_slice(bytes);
            }
            Value::Undefined | Value::Null | Value::MaxKey | Value::MinKey => {}
            Value::ObjectId(id) => self.buf.extend_from_slice(&id.bytes()),
            Value::Boolean(b) => self.buf.push(u8::from(b)),
            Value::DateTime(dt) => {
                self.buf.extend_from_slice(&dt.millis().to_le_bytes());
            }
            Value::RegularExpression { pattern, options } => {
                self.buf.extend_from_slice(pattern.as_bytes());
                self.buf.push(0);
                self.buf.extend_from_slice(options.as_bytes());
                self.buf.push(0);
            }
            Value::DbPointer { namespace, id } => {
                self.push_string(namespace)?;
                self.buf.extend_from_slice(&id.bytes());
            }
            Value::JavaScriptCodeWithScope { code, scope } => {
                self.push_len(4 + 4 + code.len() + 1 + scope.as_bytes().len())?;
                self.push_string(code)?;
                self.buf.extend_from_slice(scope.as_bytes());
            }
            Value::Int32(v) => self.buf.extend_from_slice(&v.to_le_bytes()),
            Value::Timestamp(ts) => {
                self.buf.extend_from_slice(&ts.to_u64().to_le_bytes());
            }
            Value::Int64(v) => self.buf.extend_from_slice(&v.to_le_bytes()),
            Value::Decimal128(d) => self.buf.extend_from_slice(&d.bytes()),
        }

        self.complete = self.frames.is_empty();
        Ok(())
    }

    /// Writes a key followed by its value.
    ///
    /// # Errors
    ///
    /// See [`write_key`](Self::write_key) and
    /// [`write_value`](Self::write_value).
    pub fn write_element(&mut self, key: &str, value: Value<'_>) -> Result<()> {
        self.write_key(key)?;
        self.write_value(value)
    }

    /// Copies an already encoded document into the current value slot.
    ///
    /// # Errors
    ///
    /// See [`write_value`](Self::write_value).
    pub fn write_raw_document(&mut self, raw: RawDocument<'_>) -> Result<()> {
        self.write_value(Value::Document(raw))
    }

    /// Opens a document in the current value slot, or the top-level
    /// document if nothing has been written yet.
    ///
    /// # Errors
    ///
    /// Returns a [`CursorViolation`] if there is no slot for a value.
    pub fn open_document(&mut self) -> Result<()> {
        self.open(DocumentKind::Document)
    }

    /// Opens an array in the current value slot.
    ///
    /// # Errors
    ///
    /// Returns [`CursorViolation::TopLevelNotDocument`] at the top level,
    /// or another [`CursorViolation`] if there is no slot for a value.
    pub fn open_array(&mut self) -> Result<()> { self.open(DocumentKind::Array) }

    /// Closes the innermost open document and back-patches its length.
    ///
    /// # Errors
    ///
    /// Returns a [`CursorViolation`] if nothing is open, the innermost
    /// container is an array, or a key is still waiting for its value.
    pub fn close_document(&mut self) -> Result<()> {
        self.close(DocumentKind::Document)
    }

    /// Closes the innermost open array and back-patches its length.
    ///
    /// # Errors
    ///
    /// See [`close_document`](Self::close_document).
    pub fn close_array(&mut self) -> Result<()> { self.close(DocumentKind::Array) }

    /// Returns the buffer holding the completed document.
    ///
    /// # Errors
    ///
    /// Returns a [`CursorViolation`] if a key has no value, containers are
    /// still open, or nothing was written.
    pub fn finish(self) -> Result<Vec<u8>> {
        if self.pending.is_some() {
            return Err(CursorViolation::DanglingKey.into());
        }
        if !self.frames.is_empty() {
            return Err(CursorViolation::Unclosed(self.frames.len()).into());
        }
        if !self.complete {
            return Err(CursorViolation::Empty.into());
        }
        Ok(self.buf)
    }

    fn open(&mut self, kind: DocumentKind) -> Result<()> {
        self.begin_value(kind.element_type())?;
        self.frames.push(Frame { start: self.buf.len(), kind, next_index: 0 });
        self.buf.extend_from_slice(&[0; 4]);
        Ok(())
    }

    fn close(&mut self, kind: DocumentKind) -> Result<()> {
        if self.pending.is_some() {
            return Err(CursorViolation::DanglingKey.into());
        }
        let frame = *self.frames.last().ok_or(CursorViolation::CloseWithoutOpen)?;
        if frame.kind != kind {
            return Err(CursorViolation::MismatchedClose.into());
        }

        self.buf.push(0);
        let len = i32::try_from(self.buf.len() - frame.start)
            .map_err(|_| CursorViolation::LengthOverflow)?;
        self.buf[frame.start..frame.start + 4]
            .copy_from_slice(&len.to_le_bytes());

        self.frames.pop();
        self.complete = self.frames.is_empty();
        Ok(())
    }

    /// Claims the next value slot for an element of type `ty`: patches the
    /// pending key's marker, emits an array index key, or accepts the
    /// top-level document.
    fn begin_value(&mut self, ty: ElementType) -> Result<()> {
        if let Some(marker) = self.pending.take() {
            self.buf[marker] = ty.as_u8();
            return Ok(());
        }

        match self.frames.last_mut() {
            Some(frame) if frame.kind == DocumentKind::Array => {
                let index = frame.next_index;
                frame.next_index += 1;
                self.buf.push(ty.as_u8());
                push_decimal(&mut self.buf, index);
                self.buf.push(0);
                Ok(())
            }
            Some(_) => Err(CursorViolation::ValueWithoutKey.into()),
            None if self.complete => {
                Err(CursorViolation::DocumentComplete.into())
            }
            None if ty == ElementType::EmbeddedDocument => Ok(()),
            None => Err(CursorViolation::TopLevelNotDocument.into()),
        }
    }

    fn push_len(&mut self, len: usize) -> Result<()> {
        let len =
            i32::try_from(len).map_err(|_| CursorViolation::LengthOverflow)?;
        self.buf.extend_from_slice(&len.to_le_bytes());
        Ok(())
    }

    fn push_string(&mut self, s: &str) -> Result<()> {
        self.push_len(s.len() + 1)?;
        self.buf.extend_from_slice(s.as_bytes());
        self.buf.push(0);
        Ok(())
    }
}

fn check_cstr(s: &str) -> Result<()> {
    if s.as_bytes().contains(&0) {
        return Err(Error::InvalidCString(s.to_owned()));
    }
    Ok(())
}

#[allow(clippy::cast_possible_truncation)]
fn push_decimal(buf: &mut Vec<u8>, mut n: usize) {
    let mut digits = [0u8; 20];
    let mut i = digits.len();
    loop {
        i -= 1;
        digits[i] = b'0' + (n % 10) as u8;
        n /= 10;
        if n == 0 {
            break;
        }
    }
    buf.extend_from_slice(&digits[i..]);
}
