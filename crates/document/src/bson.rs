//! Owned document values.
//!
//! [`Bson`] and [`Document`] are the fully decoded, owning counterparts of
//! [`Value`] and [`RawDocument`](crate::RawDocument). They are used where a
//! value has to outlive its buffer or be built by hand, for instance by
//! custom value marshalers.

use crate::{
    element::ElementType,
    error::Result,
    reader::{DocumentReader, ValueReader, check_depth},
    value::{DateTime, Decimal128, ObjectId, Timestamp, Value},
    writer::DocumentWriter,
};

/// Owned binary data with its subtype.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct Binary {
    /// Subtype byte.
    pub subtype: u8,
    /// Payload bytes.
    pub bytes: Vec<u8>,
}

/// An owned element payload. The default is [`Bson::Null`].
#[derive(Debug, Clone, PartialEq, Default)]
#[allow(missing_docs)]
pub enum Bson {
    Double(f64),
    String(String),
    Document(Document),
    Array(Vec<Bson>),
    Binary(Binary),
    Undefined,
    ObjectId(ObjectId),
    Boolean(bool),
    DateTime(DateTime),
    #[default]
    Null,
    RegularExpression { pattern: String, options: String },
    DbPointer { namespace: String, id: ObjectId },
    JavaScriptCode(String),
    Symbol(String),
    JavaScriptCodeWithScope { code: String, scope: Document },
    Int32(i32),
    Timestamp(Timestamp),
    Int64(i64),
    Decimal128(Decimal128),
    MaxKey,
    MinKey,
}

impl Bson {
    /// The element type marker this value is written with.
    #[must_use]
    pub const fn element_type(&self) -> ElementType {
        match self {
            Self::Double(_) => ElementType::Double,
            Self::String(_) => ElementType::String,
            Self::Document(_) => ElementType::EmbeddedDocument,
            Self::Array(_) => ElementType::Array,
            Self::Binary(_) => ElementType::Binary,
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

    /// Decodes a borrowed payload into an owned value, recursing into
    /// sub-documents.
    ///
    /// # Errors
    ///
    /// Returns an error if a nested document is malformed or nested deeper
    /// than [`MAX_NESTING_DEPTH`](crate::MAX_NESTING_DEPTH).
    pub fn from_value(value: Value<'_>) -> Result<Self> {
        Self::from_value_at(value, 1)
    }

    /// Like [`from_value`](Self::from_value) for a value that already sits
    /// `depth` levels deep, counting itself and every enclosing document or
    /// array.
    ///
    /// # Errors
    ///
    /// See [`from_value`](Self::from_value).
    pub fn from_value_at(value: Value<'_>, depth: usize) -> Result<Self> {
        Ok(match value {
            Value::Double(v) => Self::Double(v),
            Value::String(s) => Self::String(s.to_owned()),
            Value::Document(raw) => {
                let document = Document::from_reader_at(raw.reader()?, depth)?;
                Self::Document(document)
            }
            Value::Array(raw) => {
                let mut reader = raw.array_reader()?;
                check_depth(depth, reader.offset())?;
                let mut items = Vec::new();
                while let Some(value) = reader.next_value()? {
                    items.push(Self::from_value_at(value.read()?, depth + 1)?);
                }
                Self::Array(items)
            }
            Value::Binary { subtype, bytes } => {
                Self::Binary(Binary { subtype, bytes: bytes.to_vec() })
            }
            Value::Undefined => Self::Undefined,
            Value::ObjectId(id) => Self::ObjectId(id),
            Value::Boolean(b) => Self::Boolean(b),
            Value::DateTime(dt) => Self::DateTime(dt),
            Value::Null => Self::Null,
            Value::RegularExpression { pattern, options } => {
                Self::RegularExpression {
                    pattern: pattern.to_owned(),
                    options: options.to_owned(),
                }
            }
            Value::DbPointer { namespace, id } => {
                Self::DbPointer { namespace: namespace.to_owned(), id }
            }
            Value::JavaScriptCode(s) => Self::JavaScriptCode(s.to_owned()),
            Value::Symbol(s) => Self::Symbol(s.to_owned()),
            Value::JavaScriptCodeWithScope { code, scope } => {
                Self::JavaScriptCodeWithScope {
                    code: code.to_owned(),
                    scope: Document::from_reader_at(scope.reader()?, depth)?,
                }
            }
            Value::Int32(v) => Self::Int32(v),
            Value::Timestamp(ts) => Self::Timestamp(ts),
            Value::Int64(v) => Self::Int64(v),
            Value::Decimal128(d) => Self::Decimal128(d),
            Value::MaxKey => Self::MaxKey,
            Value::MinKey => Self::MinKey,
        })
    }

    /// Decodes the payload behind a [`ValueReader`].
    ///
    /// # Errors
    ///
    /// Returns an error if the payload is malformed.
    pub fn from_value_reader(reader: ValueReader<'_>) -> Result<Self> {
        Self::from_value(reader.read()?)
    }

    /// Writes this value into the writer's current value slot.
    ///
    /// # Errors
    ///
    /// Propagates writer protocol violations.
    pub fn write_to(&self, writer: &mut DocumentWriter) -> Result<()> {
        match self {
            Self::Document(doc) => doc.write_to(writer),
            Self::Array(items) => {
                writer.open_array()?;
                for item in items {
                    item.write_to(writer)?;
                }
                writer.close_array()
            }
            Self::JavaScriptCodeWithScope { code, scope } => {
                let scope = scope.to_vec()?;
                writer.write_value(Value::JavaScriptCodeWithScope {
                    code,
                    scope: crate::raw::RawDocument::new_unchecked(&scope, 0),
                })
            }
            Self::Double(v) => writer.write_value(Value::Double(*v)),
            Self::String(s) => writer.write_value(Value::String(s)),
            Self::Binary(b) => writer.write_value(Value::Binary {
                subtype: b.subtype,
                bytes: &b.bytes,
            }),
            Self::Undefined => writer.write_value(Value::Undefined),
            Self::ObjectId(id) => writer.write_value(Value::ObjectId(*id)),
            Self::Boolean(b) => writer.write_value(Value::Boolean(*b)),
            Self::DateTime(dt) => writer.write_value(Value::DateTime(*dt)),
            Self::Null => writer.write_value(Value::Null),
            Self::RegularExpression { pattern, options } => writer
                .write_value(Value::RegularExpression { pattern, options }),
            Self::DbPointer { namespace, id } => writer
                .write_value(Value::DbPointer { namespace, id: *id }),
            Self::JavaScriptCode(s) => {
                writer.write_value(Value::JavaScriptCode(s))
            }
            Self::Symbol(s) => writer.write_value(Value::Symbol(s)),
            Self::Int32(v) => writer.write_value(Value::Int32(*v)),
            Self::Timestamp(ts) => writer.write_value(Value::Timestamp(*ts)),
            Self::Int64(v) => writer.write_value(Value::Int64(*v)),
            Self::Decimal128(d) => writer.write_value(Value::Decimal128(*d)),
            Self::MaxKey => writer.write_value(Value::MaxKey),
            Self::MinKey => writer.write_value(Value::MinKey),
        }
    }

    /// Returns the contained string, if this is a string value.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the contained document, if this is a document value.
    #[must_use]
    pub const fn as_document(&self) -> Option<&Document> {
        match self {
            Self::Document(doc) => Some(doc),
            _ => None,
        }
    }
}

macro_rules! impl_from {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for Bson {
                fn from(value: $ty) -> Self { Self::$variant(value.into()) }
            }
        )*
    };
}

impl_from! {
    f64 => Double,
    f32 => Double,
    i32 => Int32,
    i64 => Int64,
    bool => Boolean,
    String => String,
    &str => String,
    Document => Document,
    Vec<Bson> => Array,
    Binary => Binary,
    ObjectId => ObjectId,
    DateTime => DateTime,
    Timestamp => Timestamp,
    Decimal128 => Decimal128,
}

/// An owned document that keeps its elements in insertion order.
///
/// Inserting an existing key replaces the value in place, so a document
/// never holds the same key twice.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Document {
    entries: Vec<(String, Bson)>,
}

impl Document {
    /// Creates an empty document.
    #[must_use]
    pub const fn new() -> Self { Self { entries: Vec::new() } }

    /// Number of elements.
    #[must_use]
    pub fn len(&self) -> usize { self.entries.len() }

    /// Returns `true` if the document has no elements.
    #[must_use]
    pub fn is_empty(&self) -> bool { self.entries.is_empty() }

    /// Returns the value stored under `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Bson> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    /// Returns a mutable reference to the value stored under `key`.
    pub fn get_mut(&mut self, key: &str) -> Option<&mut Bson> {
        self.entries.iter_mut().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    /// Returns `true` if `key` is present.
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool { self.get(key).is_some() }

    /// Inserts a value, replacing and returning any previous value for the
    /// same key. A replaced value keeps its original position.
    pub fn insert(
        &mut self,
        key: impl Into<String>,
        value: impl Into<Bson>,
    ) -> Option<Bson> {
        let key = key.into();
        let value = value.into();
        if let Some(slot) = self.get_mut(&key) {
            return Some(std::mem::replace(slot, value));
        }
        self.entries.push((key, value));
        None
    }

    /// Removes and returns the value stored under `key`.
    pub fn remove(&mut self, key: &str) -> Option<Bson> {
        let index = self.entries.iter().position(|(k, _)| k == key)?;
        Some(self.entries.remove(index).1)
    }

    /// Iterates over the elements in order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Bson)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Iterates over the keys in order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    /// Decodes every remaining element of `reader`.
    ///
    /// # Errors
    ///
    /// Returns an error if an element is malformed or documents are nested
    /// deeper than [`MAX_NESTING_DEPTH`](crate::MAX_NESTING_DEPTH).
    pub fn from_reader(reader: DocumentReader<'_>) -> Result<Self> {
        Self::from_reader_at(reader, 1)
    }

    /// Like [`from_reader`](Self::from_reader) for a document that already
    /// sits `depth` levels deep, counting itself.
    ///
    /// # Errors
    ///
    /// See [`from_reader`](Self::from_reader).
    pub fn from_reader_at(
        mut reader: DocumentReader<'_>,
        depth: usize,
    ) -> Result<Self> {
        check_depth(depth, reader.offset())?;
        let mut document = Self::new();
        while let Some(header) = reader.next()? {
            let value =
                Bson::from_value_at(reader.value_reader()?.read()?, depth + 1)?;
            document.insert(header.key, value);
        }
        Ok(document)
    }

    /// Decodes a complete top-level document.
    ///
    /// # Errors
    ///
    /// Returns an error if the bytes are not exactly one valid document.
    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        Self::from_reader(ValueReader::root(bytes)?.read_document()?)
    }

    /// Writes this document into the writer's current value slot.
    ///
    /// # Errors
    ///
    /// Propagates writer protocol violations.
    pub fn write_to(&self, writer: &mut DocumentWriter) -> Result<()> {
        writer.open_document()?;
        for (key, value) in &self.entries {
            writer.write_key(key)?;
            value.write_to(writer)?;
        }
        writer.close_document()
    }

    /// Encodes this document as a standalone top-level document.
    ///
    /// # Errors
    ///
    /// Returns an error if a key contains a NUL byte.
    pub fn to_vec(&self) -> Result<Vec<u8>> {
        let mut writer = DocumentWriter::new();
        self.write_to(&mut writer)?;
        writer.finish()
    }
}

impl<K: Into<String>, V: Into<Bson>> FromIterator<(K, V)> for Document {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut document = Self::new();
        for (key, value) in iter {
            document.insert(key, value);
        }
        document
    }
}

impl IntoIterator for Document {
    type Item = (String, Bson);
    type IntoIter = std::vec::IntoIter<(String, Bson)>;

    fn into_iter(self) -> Self::IntoIter { self.entries.into_iter() }
}
