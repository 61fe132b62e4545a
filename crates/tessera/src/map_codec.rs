//! The generic map codec.

use std::any::Any;

use tessera_document::{DocumentWriter, ElementType, ValueReader};

use crate::{
    codec::{Codec, DecodeContext, EncodeContext, ValueMut, ValueRef},
    error::{Error, Result},
    reflect::{MapShape, Shape, TypeInfo},
};

/// The order in which map entries are written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum KeyOrder {
    /// The collection's own iteration order: unspecified for `HashMap`,
    /// ascending for `BTreeMap`.
    #[default]
    Natural,
    /// Ascending by encoded key, for every map type.
    Sorted,
}

/// Configuration captured by a [`MapCodec`].
#[derive(Debug, Clone, Copy, Default)]
pub struct MapCodecOptions {
    /// Entry order on encode.
    pub key_order: KeyOrder,
    /// Clear the target map before decoding into it. When `false`, decoded
    /// entries are merged into whatever the target already holds.
    pub decode_zeroes_map: bool,
}

impl MapCodecOptions {
    /// Sets [`key_order`](Self::key_order).
    #[must_use]
    pub const fn key_order(mut self, key_order: KeyOrder) -> Self {
        self.key_order = key_order;
        self
    }

    /// Sets [`decode_zeroes_map`](Self::decode_zeroes_map).
    #[must_use]
    pub const fn decode_zeroes_map(mut self, on: bool) -> Self {
        self.decode_zeroes_map = on;
        self
    }
}

/// Encodes maps with string or integer keys as documents.
#[derive(Debug, Clone, Copy, Default)]
pub struct MapCodec {
    options: MapCodecOptions,
}

impl MapCodec {
    /// A codec with default options.
    #[must_use]
    pub fn new() -> Self { Self::default() }

    /// A codec with the given options.
    #[must_use]
    pub const fn with_options(options: MapCodecOptions) -> Self {
        Self { options }
    }

    fn shape(ty: &TypeInfo) -> Result<&MapShape> {
        match ty.shape() {
            Shape::Map(shape) => Ok(shape),
            _ => Err(Error::ValueMismatch { expected: "map" }),
        }
    }
}

impl Codec for MapCodec {
    fn encode_value(
        &self,
        ctx: &EncodeContext<'_>,
        writer: &mut DocumentWriter,
        value: ValueRef<'_>,
    ) -> Result<()> {
        let shape = Self::shape(value.type_info())?;
        let value_ty = (shape.value)();

        let mut entries = (shape.entries)(value.as_any())?;
        if self.options.key_order == KeyOrder::Sorted {
            entries.sort_by(|(a, _), (b, _)| a.cmp(b));
        }

        writer.open_document()?;
        for (key, entry) in entries {
            writer.write_key(&key)?;
            ctx.encode(writer, ValueRef::from_parts(value_ty, entry))?;
        }
        writer.close_document()?;

        Ok(())
    }

    fn decode_value(
        &self,
        ctx: &DecodeContext<'_>,
        reader: ValueReader<'_>,
        mut value: ValueMut<'_>,
    ) -> Result<()> {
        let shape = *Self::shape(value.type_info())?;

        match reader.element_type() {
            ElementType::EmbeddedDocument => {}
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

        if self.options.decode_zeroes_map {
            (shape.clear)(value.as_any_mut())?;
        }

        let value_ty = (shape.value)();
        let mut document = reader.read_document()?;
        while let Some(header) = document.next()? {
            let element = document.value_reader()?;
            (shape.insert_with)(
                value.as_any_mut(),
                header.key,
                &mut |slot: &mut dyn Any| {
                    ctx.decode(element, ValueMut::from_parts(value_ty, slot))
                },
            )?;
        }

        Ok(())
    }
}
