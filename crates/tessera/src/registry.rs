//! Codec registries.
//!
//! A [`Registry`] composes two tables:
//!
//! - the [`InterfaceRegistry`], an ordered list of `(capability, codec)`
//!   pairs, consulted first;
//! - the [`TypeRegistry`], mapping concrete types to codecs, with per-[`Kind`]
//!   fallbacks for structs, maps, sequences, optionals and pointers.
//!
//! Resolution of a type: the codec of the first capability (in registration
//! order) the type satisfies; otherwise the codec registered for the exact
//! type; otherwise the fallback for the type's kind; otherwise
//! [`Error::UnregisteredType`].
//!
//! Registries are assembled with a [`RegistryBuilder`] and immutable once
//! built, so a single `Registry` can be shared between threads without
//! locking.
//!
//! # Example
//!
//! ```ignore
//! use tessera::{CapabilityKey, RegistryBuilder};
//!
//! let registry = RegistryBuilder::new()
//!     .register_typed::<Celsius, _>(CelsiusCodec)
//!     .register_interface(CapabilityKey::declared("legacy"), LegacyCodec)
//!     .register_struct::<Reading>()
//!     .build()?;
//! ```

use std::{any::TypeId, fmt, sync::Arc};

use fxhash::FxHashMap;

use crate::{
    capability::{CapabilityKey, VALUE_MARSHALER, ValueMarshalerCodec},
    codec::{Codec, Typed, TypedCodec},
    codecs,
    error::{Error, Result},
    reflect::{Kind, Reflect, TypeInfo, TypeKey},
};

// =============================================================================
// Type registry
// =============================================================================

struct TypeEntry {
    name: &'static str,
    codec: Arc<dyn Codec>,
}

/// Codecs keyed by concrete type, plus fallbacks keyed by [`Kind`].
#[derive(Default)]
pub struct TypeRegistry {
    codecs: FxHashMap<TypeId, TypeEntry>,
    kinds: FxHashMap<Kind, Arc<dyn Codec>>,
}

impl TypeRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self { Self::default() }

    /// Registers `codec` for the type identified by `key`, returning the
    /// codec it replaces.
    pub fn register(
        &mut self,
        key: TypeKey,
        codec: Arc<dyn Codec>,
    ) -> Option<Arc<dyn Codec>> {
        self.codecs
            .insert(key.id(), TypeEntry { name: key.name(), codec })
            .map(|entry| entry.codec)
    }

    /// Registers the fallback codec for every type of the given kind that
    /// has no codec of its own, returning the fallback it replaces.
    pub fn register_kind(
        &mut self,
        kind: Kind,
        codec: Arc<dyn Codec>,
    ) -> Option<Arc<dyn Codec>> {
        self.kinds.insert(kind, codec)
    }

    /// Finds the codec for `ty`: the one registered for the exact type,
    /// else the fallback for its kind.
    #[must_use]
    pub fn lookup(&self, ty: &TypeInfo) -> Option<&dyn Codec> {
        if let Some(entry) = self.codecs.get(&ty.id()) {
            return Some(entry.codec.as_ref());
        }
        let kind = ty.shape().kind()?;
        self.kinds.get(&kind).map(AsRef::as_ref)
    }

    /// Returns `true` if a codec is registered for exactly this type.
    #[must_use]
    pub fn contains(&self, key: TypeKey) -> bool {
        self.codecs.contains_key(&key.id())
    }

    /// Names of the types with a registered codec, in no particular order.
    pub fn type_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.codecs.values().map(|entry| entry.name)
    }

    /// Number of type codecs.
    #[must_use]
    pub fn len(&self) -> usize { self.codecs.len() }

    /// Returns `true` if no type codec is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool { self.codecs.is_empty() }

    /// Number of kind fallbacks.
    #[must_use]
    pub fn kind_count(&self) -> usize { self.kinds.len() }
}

impl fmt::Debug for TypeRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut kinds: Vec<_> = self.kinds.keys().collect();
        kinds.sort_by_key(|kind| format!("{kind:?}"));
        f.debug_struct("TypeRegistry")
            .field("types", &self.codecs.len())
            .field("kinds", &kinds)
            .finish()
    }
}

// =============================================================================
// Interface registry
// =============================================================================

/// Codecs keyed by capability, tested in registration order.
///
/// Resolution walks the whole list for every value, nested fields
/// included, so the cost of a lookup grows with the number of registered
/// capabilities.
#[derive(Default)]
pub struct InterfaceRegistry {
    entries: Vec<(CapabilityKey, Arc<dyn Codec>)>,
}

impl InterfaceRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self { Self::default() }

    /// Appends `(capability, codec)`. A capability registered again under
    /// the same name keeps its original position and gets the new codec;
    /// the replaced codec is returned.
    pub fn register(
        &mut self,
        capability: CapabilityKey,
        codec: Arc<dyn Codec>,
    ) -> Option<Arc<dyn Codec>> {
        if let Some((existing, slot)) = self
            .entries
            .iter_mut()
            .find(|(existing, _)| existing.name() == capability.name())
        {
            *existing = capability;
            return Some(std::mem::replace(slot, codec));
        }

        self.entries.push((capability, codec));
        None
    }

    /// The codec of the first capability `ty` satisfies.
    #[must_use]
    pub fn resolve(&self, ty: &TypeInfo) -> Option<&dyn Codec> {
        self.entries
            .iter()
            .find(|(capability, _)| capability.is_satisfied_by(ty))
            .map(|(_, codec)| codec.as_ref())
    }

    /// The registered capabilities in resolution order.
    pub fn capabilities(&self) -> impl Iterator<Item = &CapabilityKey> + '_ {
        self.entries.iter().map(|(capability, _)| capability)
    }

    /// Number of registered capabilities.
    #[must_use]
    pub fn len(&self) -> usize { self.entries.len() }

    /// Returns `true` if no capability is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool { self.entries.is_empty() }
}

impl fmt::Debug for InterfaceRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.entries.iter().map(|(capability, _)| capability.name()))
            .finish()
    }
}

// =============================================================================
// Composed registry
// =============================================================================

/// The immutable, composed codec registry every encode and decode runs
/// against.
#[derive(Debug)]
pub struct Registry {
    types: TypeRegistry,
    interfaces: InterfaceRegistry,
}

impl Default for Registry {
    /// A registry with the default codecs and the value-marshaler
    /// capability.
    fn default() -> Self {
        let builder = RegistryBuilder::new();
        Self { types: builder.types, interfaces: builder.interfaces }
    }
}

impl Registry {
    /// Shorthand for [`RegistryBuilder::new`].
    #[must_use]
    pub fn builder() -> RegistryBuilder { RegistryBuilder::new() }

    /// Resolves the codec for `ty`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnregisteredType`] if no capability, type or kind
    /// codec applies.
    pub fn lookup(&self, ty: &TypeInfo) -> Result<&dyn Codec> {
        self.interfaces
            .resolve(ty)
            .or_else(|| self.types.lookup(ty))
            .ok_or(Error::UnregisteredType { type_name: ty.name() })
    }

    /// The type table.
    #[must_use]
    pub const fn types(&self) -> &TypeRegistry { &self.types }

    /// The capability table.
    #[must_use]
    pub const fn interfaces(&self) -> &InterfaceRegistry { &self.interfaces }
}

// =============================================================================
// Builder
// =============================================================================

/// Assembles a [`Registry`].
///
/// Registration never fails; problems with registered structs surface in
/// [`build`](Self::build).
#[derive(Debug)]
pub struct RegistryBuilder {
    types: TypeRegistry,
    interfaces: InterfaceRegistry,
    structs: Vec<TypeInfo>,
}

impl Default for RegistryBuilder {
    fn default() -> Self { Self::new() }
}

impl RegistryBuilder {
    /// A builder preloaded with the default codecs (see
    /// [`codecs`](crate::codecs)) and the [`VALUE_MARSHALER`] capability.
    #[must_use]
    pub fn new() -> Self {
        codecs::register_defaults(Self::empty())
            .register_interface(VALUE_MARSHALER, ValueMarshalerCodec)
    }

    /// A builder with nothing registered.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            types: TypeRegistry::new(),
            interfaces: InterfaceRegistry::new(),
            structs: Vec::new(),
        }
    }

    /// Registers `codec` for `T`, replacing any previous codec for it.
    #[must_use]
    pub fn register_type<T: Reflect>(self, codec: impl Codec) -> Self {
        self.register_type_key(TypeKey::of::<T>(), Arc::new(codec))
    }

    /// Registers a [`TypedCodec`] for `T`.
    #[must_use]
    pub fn register_typed<T: Reflect, C: TypedCodec<T>>(self, codec: C) -> Self {
        self.register_type::<T>(Typed::<T, C>::new(codec))
    }

    /// Registers a shared codec under an explicit type key.
    #[must_use]
    pub fn register_type_key(mut self, key: TypeKey, codec: Arc<dyn Codec>) -> Self {
        self.types.register(key, codec);
        self
    }

    /// Registers `codec` for every type satisfying `capability`. Capability
    /// codecs take precedence over type codecs.
    #[must_use]
    pub fn register_interface(
        mut self,
        capability: CapabilityKey,
        codec: impl Codec,
    ) -> Self {
        self.interfaces.register(capability, Arc::new(codec));
        self
    }

    /// Registers the fallback codec for types of `kind`.
    #[must_use]
    pub fn register_kind(mut self, kind: Kind, codec: impl Codec) -> Self {
        self.types.register_kind(kind, Arc::new(codec));
        self
    }

    /// Replaces the fallback codec for structs.
    #[must_use]
    pub fn set_default_struct_codec(self, codec: impl Codec) -> Self {
        self.register_kind(Kind::Struct, codec)
    }

    /// Replaces the fallback codec for maps.
    #[must_use]
    pub fn set_default_map_codec(self, codec: impl Codec) -> Self {
        self.register_kind(Kind::Map, codec)
    }

    /// Asks the codec resolved for `T` to validate it when the registry is
    /// built. For structs handled by [`StructCodec`](crate::StructCodec)
    /// this builds the struct description, so tag conflicts surface from
    /// [`build`](Self::build) rather than from the first encode.
    #[must_use]
    pub fn register_struct<T: Reflect>(mut self) -> Self {
        self.structs.push(T::type_info());
        self
    }

    /// Finishes the registry.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnregisteredType`] if a type registered through
    /// [`register_struct`](Self::register_struct) resolves to no codec, or
    /// whatever the codec's [`Codec::prepare`] reports, typically
    /// [`Error::TagConflict`].
    pub fn build(self) -> Result<Registry> {
        let registry =
            Registry { types: self.types, interfaces: self.interfaces };

        for ty in &self.structs {
            registry.lookup(ty)?.prepare(ty)?;
        }

        tracing::debug!(
            types = registry.types.len(),
            kinds = registry.types.kind_count(),
            capabilities = registry.interfaces.len(),
            prepared = self.structs.len(),
            "codec registry built"
        );

        Ok(registry)
    }
}

#[cfg(test)]
mod test;
