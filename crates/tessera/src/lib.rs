//! An extensible codec engine for a BSON-like binary document format.
//!
//! This crate converts Rust values to and from documents while letting
//! callers customise how any type is encoded, including types they do not
//! own. It builds on the low-level reader and writer of
//! [`tessera_document`].
//!
//! # Overview
//!
//! - [`Reflect`] describes a type to the engine. Derive it for structs; the
//!   crate implements it for scalars, strings, collections and the document
//!   types.
//! - A [`Codec`] encodes one kind of value into one element and back.
//! - A [`Registry`] maps types to codecs. It consults capability codecs
//!   first ([`InterfaceRegistry`]), then codecs registered for the exact
//!   type, then fallbacks per shape ([`TypeRegistry`]).
//! - [`StructCodec`] and [`MapCodec`] are the tag-driven generic fallbacks
//!   for structs and maps.
//! - [`marshal`]/[`unmarshal`] convert single documents;
//!   [`Encoder`]/[`Decoder`] handle streams of them.
//!
//! # Struct Tags
//!
//! Field behaviour is set with `#[tag(doc = "...")]`; see [`tags`] for the
//! grammar:
//!
//! ```ignore
//! use tessera::{Reflect, Registry};
//!
//! #[derive(Reflect, Default, Debug, PartialEq)]
//! pub struct Person {
//!     #[tag(doc = "name,omitempty")]
//!     pub name: String,
//!     #[tag(doc = "age,minsize")]
//!     pub age: i64,
//! }
//!
//! let registry = Registry::default();
//! let bytes = tessera::marshal(&registry, &Person { name: String::new(), age: 30 })?;
//! // only `age` is written, as an int32
//! let person: Person = tessera::unmarshal(&registry, &bytes)?;
//! ```
//!
//! # Custom Codecs
//!
//! ```ignore
//! let registry = RegistryBuilder::new()
//!     .register_typed::<Celsius, _>(CelsiusCodec)
//!     .register_interface(CapabilityKey::declared("legacy"), LegacyCodec)
//!     .build()?;
//! ```

// Allow derive macros to reference this crate as `tessera` internally
extern crate self as tessera;

pub mod capability;
pub mod codec;
pub mod codecs;
pub mod error;
pub mod map_codec;
pub mod marshal;
pub mod reflect;
pub mod registry;
pub mod stream;
pub mod struct_codec;
pub mod tags;

pub use capability::{
    CapabilityKey, MarshalValue, UnmarshalValue, VALUE_MARSHALER, ValueHooks,
    ValueMarshalerCodec,
};
pub use codec::{
    Codec, DecodeContext, EncodeContext, Typed, TypedCodec, ValueMut,
    ValueRef,
};
pub use error::{Error, Result};
pub use map_codec::{KeyOrder, MapCodec, MapCodecOptions};
pub use marshal::{
    DEFAULT_MAX_DOCUMENT_SIZE, DecodeOptions, EncodeOptions, marshal,
    marshal_append, marshal_with, unmarshal, unmarshal_into, unmarshal_with,
};
pub use reflect::{Kind, MapKey, Reflect, TypeInfo, TypeKey};
pub use registry::{
    InterfaceRegistry, Registry, RegistryBuilder, TypeRegistry,
};
pub use stream::{Decoder, Encoder};
pub use struct_codec::{
    FieldSpec, StructCodec, StructCodecOptions, StructDescription,
};
pub use tags::{
    DefaultStructTagParser, FieldTags, JsonFallbackStructTagParser,
    StructTagParser,
};
// Re-export the derive macro
pub use tessera_derive::Reflect;
pub use tessera_document as document;
