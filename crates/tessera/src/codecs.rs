//! The default codecs installed by
//! [`RegistryBuilder::new`](crate::RegistryBuilder::new).
//!
//! | type | element |
//! |---|---|
//! | `bool` | boolean |
//! | `i8`, `i16`, `i32`, `u8`, `u16` | int32 |
//! | `i64`, `isize`, `u32`, `u64`, `usize` | int64, or int32 under `minsize` |
//! | `f32`, `f64` | double |
//! | `String` | string |
//! | `Vec<u8>` | binary, generic subtype |
//! | `ObjectId`, `DateTime`, `Timestamp`, `Decimal128`, `Binary` | their own kind |
//! | `Document`, `RawDocumentBuf` | embedded document |
//! | `Bson` | any |
//! | structs | embedded document, through [`StructCodec`](crate::StructCodec) |
//! | maps | embedded document, through [`MapCodec`](crate::MapCodec) |
//! | `Vec<T>`, `VecDeque<T>` | array |
//! | `Option<T>` | null or the inner value |
//! | `Box<T>` | the inner value |

use tessera_document::{
    Binary, Bson, DateTime, Decimal128, Document, ElementType, ObjectId,
    RawDocumentBuf, Timestamp,
};

use crate::{
    error::Error, map_codec::MapCodec, reflect::Kind, registry::RegistryBuilder,
    struct_codec::StructCodec,
};

mod collections;
mod numeric;
mod primitives;
mod wire;

pub use collections::{OptionalCodec, PointerCodec, SequenceCodec};
pub use numeric::{FloatCodec, IntegerCodec};
pub use primitives::{BoolCodec, BytesCodec, StringCodec};
pub use wire::WireCodec;

pub(crate) const fn mismatch(found: ElementType, target: &'static str) -> Error {
    Error::TypeMismatch { found, target }
}

pub(crate) fn register_defaults(builder: RegistryBuilder) -> RegistryBuilder {
    builder
        .register_typed::<bool, _>(BoolCodec)
        .register_typed::<i8, _>(IntegerCodec)
        .register_typed::<i16, _>(IntegerCodec)
        .register_typed::<i32, _>(IntegerCodec)
        .register_typed::<i64, _>(IntegerCodec)
        .register_typed::<isize, _>(IntegerCodec)
        .register_typed::<u8, _>(IntegerCodec)
        .register_typed::<u16, _>(IntegerCodec)
        .register_typed::<u32, _>(IntegerCodec)
        .register_typed::<u64, _>(IntegerCodec)
        .register_typed::<usize, _>(IntegerCodec)
        .register_typed::<f32, _>(FloatCodec)
        .register_typed::<f64, _>(FloatCodec)
        .register_typed::<String, _>(StringCodec)
        .register_typed::<Vec<u8>, _>(BytesCodec)
        .register_typed::<ObjectId, _>(WireCodec)
        .register_typed::<DateTime, _>(WireCodec)
        .register_typed::<Timestamp, _>(WireCodec)
        .register_typed::<Decimal128, _>(WireCodec)
        .register_typed::<Binary, _>(WireCodec)
        .register_typed::<RawDocumentBuf, _>(WireCodec)
        .register_typed::<Document, _>(WireCodec)
        .register_typed::<Bson, _>(WireCodec)
        .set_default_struct_codec(StructCodec::new())
        .set_default_map_codec(MapCodec::new())
        .register_kind(Kind::Sequence, SequenceCodec)
        .register_kind(Kind::Optional, OptionalCodec)
        .register_kind(Kind::Pointer, PointerCodec)
}

#[cfg(test)]
mod test;
