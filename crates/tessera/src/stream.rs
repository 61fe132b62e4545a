//! Encoding and decoding sequences of documents over byte streams.
//!
//! Documents are self-delimiting: each starts with its own little-endian
//! `i32` length, so a stream is simply documents written back to back.
//!
//! # Example
//!
//! ```ignore
//! use std::io::Cursor;
//!
//! let registry = Registry::default();
//!
//! let mut encoder = Encoder::new(Vec::new(), &registry);
//! encoder.encode(&first)?;
//! encoder.encode(&second)?;
//!
//! let mut decoder = Decoder::new(Cursor::new(encoder.into_inner()), &registry);
//! while let Some(event) = decoder.try_decode::<Event>()? {
//!     handle(event);
//! }
//! ```

use std::io::{self, Read, Write};

use tessera_document::{MIN_DOCUMENT_LEN, MalformedKind};

use crate::{
    error::{Error, Result},
    marshal::{DecodeOptions, EncodeOptions, marshal_append, unmarshal_into},
    reflect::Reflect,
    registry::Registry,
};

/// Writes documents to any [`Write`] implementation.
///
/// The encode buffer is reused between calls.
#[derive(Debug)]
pub struct Encoder<'r, W> {
    writer: W,
    registry: &'r Registry,
    options: EncodeOptions,
    buf: Vec<u8>,
}

impl<'r, W> Encoder<'r, W> {
    /// Creates an encoder with default options.
    pub const fn new(writer: W, registry: &'r Registry) -> Self {
        Self {
            writer,
            registry,
            options: EncodeOptions { min_size: false },
            buf: Vec::new(),
        }
    }

    /// Replaces the encode options.
    #[must_use]
    pub const fn with_options(mut self, options: EncodeOptions) -> Self {
        self.options = options;
        self
    }

    /// Returns a reference to the underlying writer.
    pub const fn get_ref(&self) -> &W { &self.writer }

    /// Returns a mutable reference to the underlying writer.
    pub const fn get_mut(&mut self) -> &mut W { &mut self.writer }

    /// Consumes the encoder, returning the underlying writer.
    pub fn into_inner(self) -> W { self.writer }
}

impl<W: Write> Encoder<'_, W> {
    /// Encodes `value` and writes it to the stream.
    ///
    /// Nothing is written if encoding fails.
    ///
    /// # Errors
    ///
    /// Returns the codec's error or [`Error::Io`].
    pub fn encode<T: Reflect>(&mut self, value: &T) -> Result<()> {
        let mut buf = std::mem::take(&mut self.buf);
        buf.clear();

        let buf = marshal_append(self.registry, buf, value, self.options)?;
        self.writer.write_all(&buf)?;
        tracing::trace!(bytes = buf.len(), "document written");

        self.buf = buf;
        Ok(())
    }

    /// Flushes the underlying writer.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if flushing fails.
    pub fn flush(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }
}

/// Reads documents from any [`Read`] implementation.
#[derive(Debug)]
pub struct Decoder<'r, R> {
    reader: R,
    registry: &'r Registry,
    options: DecodeOptions,
    buf: Vec<u8>,
}

impl<'r, R> Decoder<'r, R> {
    /// Creates a decoder with default options.
    pub fn new(reader: R, registry: &'r Registry) -> Self {
        Self {
            reader,
            registry,
            options: DecodeOptions::default(),
            buf: Vec::new(),
        }
    }

    /// Replaces the decode options.
    #[must_use]
    pub const fn with_options(mut self, options: DecodeOptions) -> Self {
        self.options = options;
        self
    }

    /// Returns a reference to the underlying reader.
    pub const fn get_ref(&self) -> &R { &self.reader }

    /// Returns a mutable reference to the underlying reader.
    pub const fn get_mut(&mut self) -> &mut R { &mut self.reader }

    /// Consumes the decoder, returning the underlying reader.
    pub fn into_inner(self) -> R { self.reader }
}

impl<R: Read> Decoder<'_, R> {
    /// Decodes the next document.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] with [`io::ErrorKind::UnexpectedEof`] at the
    /// end of the stream, or any error of [`try_decode`](Self::try_decode).
    pub fn decode<T: Reflect + Default>(&mut self) -> Result<T> {
        self.try_decode()?.ok_or_else(|| {
            Error::Io(io::Error::from(io::ErrorKind::UnexpectedEof))
        })
    }

    /// Decodes the next document, or returns `None` if the stream ended
    /// cleanly before it.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if the stream ends inside a document,
    /// [`Error::DocumentTooLarge`] if the declared length exceeds the limit,
    /// or any decoding error.
    pub fn try_decode<T: Reflect + Default>(&mut self) -> Result<Option<T>> {
        let mut value = T::default();
        Ok(self.decode_next(&mut value)?.then_some(value))
    }

    /// Decodes the next document into an existing value.
    ///
    /// # Errors
    ///
    /// See [`decode`](Self::decode).
    pub fn decode_into<T: Reflect>(&mut self, value: &mut T) -> Result<()> {
        if self.decode_next(value)? {
            Ok(())
        } else {
            Err(Error::Io(io::Error::from(io::ErrorKind::UnexpectedEof)))
        }
    }

    fn decode_next<T: Reflect>(&mut self, value: &mut T) -> Result<bool> {
        if !self.fill_next()? {
            return Ok(false);
        }
        unmarshal_into(self.registry, &self.buf, value, self.options)?;
        tracing::trace!(bytes = self.buf.len(), "document read");
        Ok(true)
    }

    /// Reads the next document's bytes into the buffer.
    fn fill_next(&mut self) -> Result<bool> {
        let mut prefix = [0u8; 4];
        let mut filled = 0;
        while filled < prefix.len() {
            match self.reader.read(&mut prefix[filled..]) {
                Ok(0) if filled == 0 => return Ok(false),
                Ok(0) => {
                    return Err(io::Error::from(io::ErrorKind::UnexpectedEof)
                        .into());
                }
                Ok(n) => filled += n,
                Err(error) if error.kind() == io::ErrorKind::Interrupted => {}
                Err(error) => return Err(error.into()),
            }
        }

        let declared = i32::from_le_bytes(prefix);
        let size = usize::try_from(declared)
            .ok()
            .filter(|&size| size >= MIN_DOCUMENT_LEN)
            .ok_or(Error::MalformedDocument {
                offset: 0,
                kind: MalformedKind::InvalidLength(declared),
            })?;
        self.options.check_size(size)?;

        self.buf.clear();
        self.buf.extend_from_slice(&prefix);
        self.buf.resize(size, 0);
        self.reader.read_exact(&mut self.buf[prefix.len()..])?;

        Ok(true)
    }
}
