//! Codecs for the document crate's own value types.

use tessera_document::{
    Binary, Bson, DateTime, Decimal128, Document, DocumentWriter, ObjectId,
    RawDocumentBuf, Timestamp, Value, ValueReader,
};

use super::mismatch;
use crate::{
    codec::{DecodeContext, EncodeContext, TypedCodec},
    error::Result,
};

/// Encodes each wire type as the element kind it names.
#[derive(Debug, Clone, Copy, Default)]
pub struct WireCodec;

macro_rules! impl_scalar_wire {
    ($($ty:ident),*) => {
        $(
            impl TypedCodec<$ty> for WireCodec {
                fn encode(
                    &self,
                    _ctx: &EncodeContext<'_>,
                    writer: &mut DocumentWriter,
                    value: &$ty,
                ) -> Result<()> {
                    writer.write_value(Value::$ty(*value))?;
                    Ok(())
                }

                fn decode(
                    &self,
                    _ctx: &DecodeContext<'_>,
                    reader: ValueReader<'_>,
                    value: &mut $ty,
                ) -> Result<()> {
                    *value = match reader.read()? {
                        Value::$ty(v) => v,
                        Value::Null | Value::Undefined => $ty::default(),
                        other => {
                            return Err(mismatch(
                                other.element_type(),
                                stringify!($ty),
                            ));
                        }
                    };
                    Ok(())
                }
            }
        )*
    };
}

impl_scalar_wire!(ObjectId, DateTime, Timestamp, Decimal128);

impl TypedCodec<Binary> for WireCodec {
    fn encode(
        &self,
        _ctx: &EncodeContext<'_>,
        writer: &mut DocumentWriter,
        value: &Binary,
    ) -> Result<()> {
        writer.write_value(Value::Binary {
            subtype: value.subtype,
            bytes: &value.bytes,
        })?;
        Ok(())
    }

    fn decode(
        &self,
        _ctx: &DecodeContext<'_>,
        reader: ValueReader<'_>,
        value: &mut Binary,
    ) -> Result<()> {
        *value = match reader.read()? {
            Value::Binary { subtype, bytes } => {
                Binary { subtype, bytes: bytes.to_vec() }
            }
            Value::Null | Value::Undefined => Binary::default(),
            other => return Err(mismatch(other.element_type(), "Binary")),
        };
        Ok(())
    }
}

/// Copies embedded documents byte for byte.
impl TypedCodec<RawDocumentBuf> for WireCodec {
    fn encode(
        &self,
        _ctx: &EncodeContext<'_>,
        writer: &mut DocumentWriter,
        value: &RawDocumentBuf,
    ) -> Result<()> {
        writer.write_raw_document(value.as_raw())?;
        Ok(())
    }

    fn decode(
        &self,
        _ctx: &DecodeContext<'_>,
        reader: ValueReader<'_>,
        value: &mut RawDocumentBuf,
    ) -> Result<()> {
        *value = match reader.read()? {
            Value::Document(raw) => raw.to_raw_document_buf()?,
            Value::Null | Value::Undefined => RawDocumentBuf::new(),
            other => {
                return Err(mismatch(other.element_type(), "RawDocumentBuf"));
            }
        };
        Ok(())
    }
}

impl TypedCodec<Document> for WireCodec {
    fn encode(
        &self,
        _ctx: &EncodeContext<'_>,
        writer: &mut DocumentWriter,
        value: &Document,
    ) -> Result<()> {
        value.write_to(writer)?;
        Ok(())
    }

    fn decode(
        &self,
        ctx: &DecodeContext<'_>,
        reader: ValueReader<'_>,
        value: &mut Document,
    ) -> Result<()> {
        *value = match reader.read()? {
            Value::Document(raw) => {
                Document::from_reader_at(raw.reader()?, ctx.depth())?
            }
            Value::Null | Value::Undefined => Document::new(),
            other => return Err(mismatch(other.element_type(), "Document")),
        };
        Ok(())
    }
}

/// Accepts any element.
impl TypedCodec<Bson> for WireCodec {
    fn encode(
        &self,
        _ctx: &EncodeContext<'_>,
        writer: &mut DocumentWriter,
        value: &Bson,
    ) -> Result<()> {
        value.write_to(writer)?;
        Ok(())
    }

    fn decode(
        &self,
        ctx: &DecodeContext<'_>,
        reader: ValueReader<'_>,
        value: &mut Bson,
    ) -> Result<()> {
        *value = Bson::from_value_at(reader.read()?, ctx.depth())?;
        Ok(())
    }
}
