//! Generic codecs for sequences, optional values and owning pointers.

use std::any::Any;

use tessera_document::{DocumentWriter, ElementType, Value, ValueReader};

use crate::{
    codec::{Codec, DecodeContext, EncodeContext, ValueMut, ValueRef},
    error::{Error, Result},
    reflect::Shape,
};

/// Encodes sequences as arrays. Decoding replaces the previous contents.
#[derive(Debug, Clone, Copy, Default)]
pub struct SequenceCodec;

impl Codec for SequenceCodec {
    fn encode_value(
        &self,
        ctx: &EncodeContext<'_>,
        writer: &mut DocumentWriter,
        value: ValueRef<'_>,
    ) -> Result<()> {
        let Shape::Sequence(shape) = value.type_info().shape() else {
            return Err(Error::ValueMismatch { expected: "sequence" });
        };
        let element_ty = (shape.element)();

        writer.open_array()?;
        for item in (shape.items)(value.as_any())? {
            ctx.encode(writer, ValueRef::from_parts(element_ty, item))?;
        }
        writer.close_array()?;

        Ok(())
    }

    fn decode_value(
        &self,
        ctx: &DecodeContext<'_>,
        reader: ValueReader<'_>,
        mut value: ValueMut<'_>,
    ) -> Result<()> {
        let Shape::Sequence(shape) = *value.type_info().shape() else {
            return Err(Error::ValueMismatch { expected: "sequence" });
        };

        match reader.element_type() {
            ElementType::Array => {}
            ElementType::Null | ElementType::Undefined => {
                return (shape.clear)(value.as_any_mut());
            }
            found => {
                return Err(Error::TypeMismatch {
                    found,
                    target: value.type_info().name(),
                });
            }
        }

        (shape.clear)(value.as_any_mut())?;

        let element_ty = (shape.element)();
        let mut array = reader.read_array()?;
        while let Some(element) = array.next_value()? {
            (shape.push_with)(value.as_any_mut(), &mut |slot: &mut dyn Any| {
                ctx.decode(element, ValueMut::from_parts(element_ty, slot))
            })?;
        }

        Ok(())
    }
}

/// Encodes `None` as null and `Some` as the inner value.
#[derive(Debug, Clone, Copy, Default)]
pub struct OptionalCodec;

impl Codec for OptionalCodec {
    fn encode_value(
        &self,
        ctx: &EncodeContext<'_>,
        writer: &mut DocumentWriter,
        value: ValueRef<'_>,
    ) -> Result<()> {
        let Shape::Optional(shape) = value.type_info().shape() else {
            return Err(Error::ValueMismatch { expected: "optional" });
        };

        match (shape.get)(value.as_any())? {
            Some(inner) => {
                ctx.encode(writer, ValueRef::from_parts((shape.inner)(), inner))
            }
            None => {
                writer.write_value(Value::Null)?;
                Ok(())
            }
        }
    }

    fn decode_value(
        &self,
        ctx: &DecodeContext<'_>,
        reader: ValueReader<'_>,
        value: ValueMut<'_>,
    ) -> Result<()> {
        let Shape::Optional(shape) = *value.type_info().shape() else {
            return Err(Error::ValueMismatch { expected: "optional" });
        };

        let slot = value.into_any();
        if matches!(
            reader.element_type(),
            ElementType::Null | ElementType::Undefined
        ) {
            return (shape.clear)(slot);
        }

        let inner = (shape.get_or_insert_default)(slot)?;
        ctx.decode(reader, ValueMut::from_parts((shape.inner)(), inner))
    }
}

/// Encodes the pointee in place of the pointer.
#[derive(Debug, Clone, Copy, Default)]
pub struct PointerCodec;

impl Codec for PointerCodec {
    fn encode_value(
        &self,
        ctx: &EncodeContext<'_>,
        writer: &mut DocumentWriter,
        value: ValueRef<'_>,
    ) -> Result<()> {
        let Shape::Pointer(shape) = value.type_info().shape() else {
            return Err(Error::ValueMismatch { expected: "pointer" });
        };

        let inner = (shape.deref)(value.as_any())?;
        ctx.encode(writer, ValueRef::from_parts((shape.inner)(), inner))
    }

    fn decode_value(
        &self,
        ctx: &DecodeContext<'_>,
        reader: ValueReader<'_>,
        value: ValueMut<'_>,
    ) -> Result<()> {
        let Shape::Pointer(shape) = *value.type_info().shape() else {
            return Err(Error::ValueMismatch { expected: "pointer" });
        };

        let inner = (shape.deref_mut)(value.into_any())?;
        ctx.decode(reader, ValueMut::from_parts((shape.inner)(), inner))
    }
}
