//! Capability keys and the built-in value-marshaler capability.
//!
//! A capability is a named protocol a type can satisfy. Codecs registered
//! for a capability in the [`InterfaceRegistry`](crate::InterfaceRegistry)
//! take precedence over codecs registered for concrete types, which lets a
//! single codec handle every type implementing some protocol, including
//! types defined elsewhere.
//!
//! A type satisfies a capability either by *declaring* it
//! (`#[reflect(capability = "name")]`, or
//! [`TypeInfo::with_capabilities`]) or *structurally*, when a predicate over
//! its [`TypeInfo`] holds.

use std::{any::Any, fmt};

use tessera_document::{Bson, DocumentWriter, ValueReader};

use crate::{
    codec::{Codec, DecodeContext, EncodeContext, ValueMut, ValueRef},
    error::{Error, Result},
    reflect::{TypeInfo, downcast_mut, downcast_ref},
};

#[derive(Clone, Copy)]
enum Test {
    Declared,
    Structural(fn(&TypeInfo) -> bool),
}

/// A named protocol that types can satisfy.
#[derive(Clone, Copy)]
pub struct CapabilityKey {
    name: &'static str,
    test: Test,
}

impl CapabilityKey {
    /// A capability satisfied by types that declare `name`.
    #[must_use]
    pub const fn declared(name: &'static str) -> Self {
        Self { name, test: Test::Declared }
    }

    /// A capability satisfied by types for which `predicate` holds.
    #[must_use]
    pub const fn structural(
        name: &'static str,
        predicate: fn(&TypeInfo) -> bool,
    ) -> Self {
        Self { name, test: Test::Structural(predicate) }
    }

    /// The capability's name. Registering a second codec under the same
    /// name replaces the first.
    #[must_use]
    pub const fn name(&self) -> &'static str { self.name }

    /// Returns `true` if `ty` satisfies this capability.
    #[must_use]
    pub fn is_satisfied_by(&self, ty: &TypeInfo) -> bool {
        match self.test {
            Test::Declared => ty.declares(self.name),
            Test::Structural(predicate) => predicate(ty),
        }
    }
}

impl fmt::Debug for CapabilityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let test = match self.test {
            Test::Declared => "declared",
            Test::Structural(_) => "structural",
        };
        f.debug_struct("CapabilityKey")
            .field("name", &self.name)
            .field("test", &test)
            .finish()
    }
}

// =============================================================================
// Value marshaler
// =============================================================================

/// Converts a value into an owned document value.
pub trait MarshalValue {
    /// Produces the value to encode in place of `self`.
    ///
    /// # Errors
    ///
    /// Implementations report their own failures, usually as
    /// [`Error::Custom`].
    fn marshal_value(&self) -> Result<Bson>;
}

/// Rebuilds a value from an owned document value.
pub trait UnmarshalValue {
    /// Overwrites `self` from the decoded value.
    ///
    /// # Errors
    ///
    /// Implementations report their own failures, usually as
    /// [`Error::Custom`] or [`Error::TypeMismatch`].
    fn unmarshal_value(&mut self, value: Bson) -> Result<()>;
}

/// Type-erased [`MarshalValue`]/[`UnmarshalValue`] entry points stored in a
/// [`TypeInfo`].
#[derive(Clone, Copy)]
pub struct ValueHooks {
    marshal: fn(&dyn Any) -> Result<Bson>,
    unmarshal: fn(&mut dyn Any, Bson) -> Result<()>,
}

impl ValueHooks {
    /// The hooks of `T`.
    #[must_use]
    pub fn of<T: MarshalValue + UnmarshalValue + Any>() -> Self {
        Self {
            marshal: |value| downcast_ref::<T>(value)?.marshal_value(),
            unmarshal: |value, bson| {
                downcast_mut::<T>(value)?.unmarshal_value(bson)
            },
        }
    }

    /// Calls the type's [`MarshalValue`] implementation.
    ///
    /// # Errors
    ///
    /// Propagates the implementation's error.
    pub fn marshal(&self, value: &dyn Any) -> Result<Bson> {
        (self.marshal)(value)
    }

    /// Calls the type's [`UnmarshalValue`] implementation.
    ///
    /// # Errors
    ///
    /// Propagates the implementation's error.
    pub fn unmarshal(&self, value: &mut dyn Any, bson: Bson) -> Result<()> {
        (self.unmarshal)(value, bson)
    }
}

fn has_value_hooks(ty: &TypeInfo) -> bool { ty.value_hooks().is_some() }

/// Satisfied by every type whose [`TypeInfo`] carries [`ValueHooks`].
/// [`RegistryBuilder::new`](crate::RegistryBuilder::new) routes it to
/// [`ValueMarshalerCodec`].
pub const VALUE_MARSHALER: CapabilityKey =
    CapabilityKey::structural("value_marshaler", has_value_hooks);

/// Encodes and decodes values through their [`ValueHooks`].
#[derive(Debug, Clone, Copy, Default)]
pub struct ValueMarshalerCodec;

impl ValueMarshalerCodec {
    fn hooks(ty: &TypeInfo) -> Result<ValueHooks> {
        ty.value_hooks().copied().ok_or_else(|| {
            Error::custom(format_args!(
                "`{}` has no value-marshal hooks",
                ty.name()
            ))
        })
    }
}

impl Codec for ValueMarshalerCodec {
    fn encode_value(
        &self,
        _ctx: &EncodeContext<'_>,
        writer: &mut DocumentWriter,
        value: ValueRef<'_>,
    ) -> Result<()> {
        let hooks = Self::hooks(value.type_info())?;
        hooks.marshal(value.as_any())?.write_to(writer)?;
        Ok(())
    }

    fn decode_value(
        &self,
        ctx: &DecodeContext<'_>,
        reader: ValueReader<'_>,
        mut value: ValueMut<'_>,
    ) -> Result<()> {
        let hooks = Self::hooks(value.type_info())?;
        let bson = Bson::from_value_at(reader.read()?, ctx.depth())?;
        hooks.unmarshal(value.as_any_mut(), bson)
    }
}
