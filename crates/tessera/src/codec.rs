//! The codec abstraction.
//!
//! A [`Codec`] turns one kind of value into one document element and back.
//! Codecs are stateless across calls: any configuration is captured when
//! they are constructed and registered. They see values only through the
//! type-erased [`ValueRef`]/[`ValueMut`] handles and the document crate's
//! [`DocumentWriter`] and [`ValueReader`], and recurse into nested values by
//! calling [`EncodeContext::encode`] or [`DecodeContext::decode`], which
//! resolve the nested value's codec through the registry.
//!
//! Most hand-written codecs target a single type; implementing
//! [`TypedCodec`] for it and registering through
//! [`RegistryBuilder::register_typed`](crate::RegistryBuilder::register_typed)
//! avoids the downcasting boilerplate.
//!
//! # Example
//!
//! ```ignore
//! struct UpperCase;
//!
//! impl TypedCodec<String> for UpperCase {
//!     fn encode(
//!         &self,
//!         _ctx: &EncodeContext<'_>,
//!         writer: &mut DocumentWriter,
//!         value: &String,
//!     ) -> Result<()> {
//!         writer.write_value(Value::String(&value.to_uppercase()))?;
//!         Ok(())
//!     }
//!
//!     fn decode(
//!         &self,
//!         _ctx: &DecodeContext<'_>,
//!         reader: ValueReader<'_>,
//!         value: &mut String,
//!     ) -> Result<()> {
//!         *value = reader.read_str()?.to_lowercase();
//!         Ok(())
//!     }
//! }
//!
//! let registry = RegistryBuilder::new()
//!     .register_typed::<String, _>(UpperCase)
//!     .build()?;
//! ```

use std::{any::Any, fmt, marker::PhantomData};

use tessera_document::{
    DocumentWriter, MAX_NESTING_DEPTH, MalformedKind, ValueReader,
};

use crate::{
    error::{Error, Result},
    reflect::{Reflect, TypeInfo, downcast_mut, downcast_ref},
    registry::Registry,
};

/// Encodes values into document elements and decodes them back.
pub trait Codec: Send + Sync + 'static {
    /// Writes `value` into the writer's current value slot: after a key, as
    /// the next array element, or as the top-level document.
    ///
    /// # Errors
    ///
    /// Returns an error if the value cannot be represented or a nested
    /// codec fails.
    fn encode_value(
        &self,
        ctx: &EncodeContext<'_>,
        writer: &mut DocumentWriter,
        value: ValueRef<'_>,
    ) -> Result<()>;

    /// Decodes the element behind `reader` into the default-initialised
    /// slot `value`.
    ///
    /// # Errors
    ///
    /// Returns an error if the element cannot be decoded into the target.
    fn decode_value(
        &self,
        ctx: &DecodeContext<'_>,
        reader: ValueReader<'_>,
        value: ValueMut<'_>,
    ) -> Result<()>;

    /// Called at registry build time for every type registered through
    /// [`RegistryBuilder::register_struct`](crate::RegistryBuilder::register_struct)
    /// that resolves to this codec, so configuration problems surface before
    /// the first value is encoded.
    ///
    /// # Errors
    ///
    /// Returns an error if the codec cannot handle `ty`.
    fn prepare(&self, ty: &TypeInfo) -> Result<()> {
        let _ = ty;
        Ok(())
    }
}

impl fmt::Debug for dyn Codec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("dyn Codec")
    }
}

/// A codec for exactly one type `T`.
pub trait TypedCodec<T: Reflect>: Send + Sync + 'static {
    /// Writes `value` into the writer's current value slot.
    ///
    /// # Errors
    ///
    /// See [`Codec::encode_value`].
    fn encode(
        &self,
        ctx: &EncodeContext<'_>,
        writer: &mut DocumentWriter,
        value: &T,
    ) -> Result<()>;

    /// Decodes the element behind `reader` into `value`.
    ///
    /// # Errors
    ///
    /// See [`Codec::decode_value`].
    fn decode(
        &self,
        ctx: &DecodeContext<'_>,
        reader: ValueReader<'_>,
        value: &mut T,
    ) -> Result<()>;
}

/// Adapts a [`TypedCodec`] into a [`Codec`].
pub struct Typed<T, C> {
    codec: C,
    _marker: PhantomData<fn() -> T>,
}

impl<T, C> Typed<T, C> {
    /// Wraps a typed codec.
    pub const fn new(codec: C) -> Self { Self { codec, _marker: PhantomData } }
}

impl<T: Reflect, C: TypedCodec<T>> Codec for Typed<T, C> {
    fn encode_value(
        &self,
        ctx: &EncodeContext<'_>,
        writer: &mut DocumentWriter,
        value: ValueRef<'_>,
    ) -> Result<()> {
        self.codec.encode(ctx, writer, value.downcast::<T>()?)
    }

    fn decode_value(
        &self,
        ctx: &DecodeContext<'_>,
        reader: ValueReader<'_>,
        mut value: ValueMut<'_>,
    ) -> Result<()> {
        self.codec.decode(ctx, reader, value.downcast_mut::<T>()?)
    }
}

// =============================================================================
// Type-erased values
// =============================================================================

/// A borrowed value together with its type description.
#[derive(Clone, Copy)]
pub struct ValueRef<'a> {
    ty: TypeInfo,
    value: &'a dyn Any,
}

impl<'a> ValueRef<'a> {
    /// Borrows a reflected value.
    pub fn new<T: Reflect>(value: &'a T) -> Self {
        Self { ty: T::type_info(), value }
    }

    /// Pairs an erased value with its description. `ty` must describe the
    /// value's concrete type.
    #[must_use]
    pub const fn from_parts(ty: TypeInfo, value: &'a dyn Any) -> Self {
        Self { ty, value }
    }

    /// The value's type description.
    #[must_use]
    pub const fn type_info(&self) -> &TypeInfo { &self.ty }

    /// The erased value.
    #[must_use]
    pub const fn as_any(&self) -> &'a dyn Any { self.value }

    /// Returns `true` if the value is its type's zero value.
    #[must_use]
    pub fn is_zero(&self) -> bool { self.ty.is_zero(self.value) }

    /// Downcasts to the concrete type.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ValueMismatch`](crate::Error::ValueMismatch) if the
    /// value is not a `T`.
    pub fn downcast<T: Any>(&self) -> Result<&'a T> { downcast_ref(self.value) }
}

impl fmt::Debug for ValueRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValueRef").field("ty", &self.ty.name()).finish()
    }
}

/// A mutably borrowed value together with its type description.
pub struct ValueMut<'a> {
    ty: TypeInfo,
    value: &'a mut dyn Any,
}

impl<'a> ValueMut<'a> {
    /// Mutably borrows a reflected value.
    pub fn new<T: Reflect>(value: &'a mut T) -> Self {
        Self { ty: T::type_info(), value }
    }

    /// Pairs an erased value with its description. `ty` must describe the
    /// value's concrete type.
    #[must_use]
    pub fn from_parts(ty: TypeInfo, value: &'a mut dyn Any) -> Self {
        Self { ty, value }
    }

    /// The value's type description.
    #[must_use]
    pub const fn type_info(&self) -> &TypeInfo { &self.ty }

    /// The erased value.
    #[must_use]
    pub fn as_any_mut(&mut self) -> &mut dyn Any { &mut *self.value }

    /// Releases the erased value for the full borrow.
    #[must_use]
    pub fn into_any(self) -> &'a mut dyn Any { self.value }

    /// Reborrows for a shorter lifetime.
    #[must_use]
    pub fn reborrow(&mut self) -> ValueMut<'_> {
        ValueMut { ty: self.ty, value: &mut *self.value }
    }

    /// Downcasts to the concrete type.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ValueMismatch`](crate::Error::ValueMismatch) if the
    /// value is not a `T`.
    pub fn downcast_mut<T: Any>(&mut self) -> Result<&mut T> {
        downcast_mut(&mut *self.value)
    }
}

impl fmt::Debug for ValueMut<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValueMut").field("ty", &self.ty.name()).finish()
    }
}

// =============================================================================
// Contexts
// =============================================================================

/// Per-call encoding state handed to every codec.
#[derive(Debug, Clone, Copy)]
pub struct EncodeContext<'r> {
    registry: &'r Registry,
    base_min_size: bool,
    min_size: bool,
}

impl<'r> EncodeContext<'r> {
    /// Creates a context over `registry`. `min_size` is the per-call
    /// setting every struct field starts from.
    #[must_use]
    pub const fn new(registry: &'r Registry, min_size: bool) -> Self {
        Self { registry, base_min_size: min_size, min_size }
    }

    /// The registry nested values are resolved through.
    #[must_use]
    pub const fn registry(&self) -> &'r Registry { self.registry }

    /// Whether integers should be encoded as int32 when they fit.
    #[must_use]
    pub const fn min_size(&self) -> bool { self.min_size }

    /// A context for one struct field tagged (or not) `minsize`.
    ///
    /// The field's directive replaces its parent field's, so it reaches the
    /// field's own value and any sequence, map or option elements inside
    /// it, but not the fields of a nested struct.
    #[must_use]
    pub const fn for_field(&self, min_size: bool) -> Self {
        Self { min_size: self.base_min_size || min_size, ..*self }
    }

    /// Resolves the codec for `value` and encodes it into the writer's
    /// current value slot.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnregisteredType`](crate::Error::UnregisteredType)
    /// if no codec applies, or the codec's error.
    pub fn encode(
        &self,
        writer: &mut DocumentWriter,
        value: ValueRef<'_>,
    ) -> Result<()> {
        self.registry.lookup(value.type_info())?.encode_value(self, writer, value)
    }
}

/// Per-call decoding state handed to every codec.
#[derive(Debug, Clone, Copy)]
pub struct DecodeContext<'r> {
    registry: &'r Registry,
    base_truncate: bool,
    truncate: bool,
    strict: bool,
    depth: usize,
    entered: Option<usize>,
}

impl<'r> DecodeContext<'r> {
    /// Creates a context over `registry`. `truncate` is the per-call
    /// setting every struct field starts from.
    #[must_use]
    pub const fn new(registry: &'r Registry, truncate: bool, strict: bool) -> Self {
        Self {
            registry,
            base_truncate: truncate,
            truncate,
            strict,
            depth: 0,
            entered: None,
        }
    }

    /// The registry nested values are resolved through.
    #[must_use]
    pub const fn registry(&self) -> &'r Registry { self.registry }

    /// Whether lossy numeric narrowing is allowed.
    #[must_use]
    pub const fn truncate(&self) -> bool { self.truncate }

    /// Whether unknown and inaccessible keys are errors.
    #[must_use]
    pub const fn strict(&self) -> bool { self.strict }

    /// How many documents and arrays enclose the value being decoded,
    /// counting the value itself if it is one. The top-level document is at
    /// depth 1.
    #[must_use]
    pub const fn depth(&self) -> usize { self.depth }

    /// A context for one struct field tagged (or not) `truncate`. Like
    /// [`EncodeContext::for_field`], the directive does not reach the
    /// fields of a nested struct.
    #[must_use]
    pub const fn for_field(&self, truncate: bool) -> Self {
        Self { truncate: self.base_truncate || truncate, ..*self }
    }

    /// Resolves the codec for `value` and decodes the element behind
    /// `reader` into it.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnregisteredType`] if no codec applies,
    /// [`Error::MalformedDocument`] if documents are nested deeper than
    /// [`MAX_NESTING_DEPTH`], or the codec's error.
    pub fn decode(
        &self,
        reader: ValueReader<'_>,
        value: ValueMut<'_>,
    ) -> Result<()> {
        let ctx = self.enter(&reader)?;
        self.registry.lookup(value.type_info())?.decode_value(&ctx, reader, value)
    }

    /// Counts the element behind `reader` if it is a document or array not
    /// yet counted. Codecs that forward the same element, such as those for
    /// `Option` and `Box`, do not add a level.
    fn enter(&self, reader: &ValueReader<'_>) -> Result<Self> {
        let offset = reader.offset();
        if !reader.element_type().is_document() || self.entered == Some(offset)
        {
            return Ok(*self);
        }

        let depth = self.depth + 1;
        if depth > MAX_NESTING_DEPTH {
            return Err(Error::MalformedDocument {
                offset,
                kind: MalformedKind::TooDeep(MAX_NESTING_DEPTH),
            });
        }
        Ok(Self { depth, entered: Some(offset), ..*self })
    }
}
