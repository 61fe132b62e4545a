//! Runtime type descriptions.
//!
//! Rust has no runtime reflection, so every type that takes part in
//! encoding describes itself through [`Reflect::type_info`]. A [`TypeInfo`]
//! is a small `Copy` value carrying the type's identity, its declared
//! capabilities and a [`Shape`]. Non-leaf shapes hold monomorphised accessor
//! functions that let the generic struct, map and collection codecs walk a
//! value through `&dyn Any` without knowing its concrete type.
//!
//! Structs get their implementation from `#[derive(Reflect)]`; the library
//! implements [`Reflect`] for the standard scalars, strings, collections and
//! the document crate's wire types.
//!
//! # Example
//!
//! ```ignore
//! use tessera::Reflect;
//!
//! #[derive(Reflect, Default)]
//! pub struct Person {
//!     #[tag(doc = "name,omitempty")]
//!     pub name: String,
//!     #[tag(doc = "age,minsize")]
//!     pub age: i64,
//!     secret: String, // not public: never encoded
//! }
//! ```

use std::{
    any::{Any, TypeId},
    borrow::Cow,
    fmt,
    hash::{Hash, Hasher},
};

use crate::{
    capability::ValueHooks,
    error::{Error, Result},
};

mod impls;

/// A type that can describe itself to the codec engine.
pub trait Reflect: Any {
    /// Returns the description of this type.
    fn type_info() -> TypeInfo
    where
        Self: Sized;

    /// Returns `true` if this value is the zero value of its type. Used by
    /// the `omitempty` tag directive.
    fn is_zero(&self) -> bool { false }
}

/// Identifies a concrete type. Equality and hashing use only the
/// [`TypeId`]; the name is kept for diagnostics.
#[derive(Debug, Clone, Copy)]
pub struct TypeKey {
    id: TypeId,
    name: &'static str,
}

impl TypeKey {
    /// The key of `T`.
    #[must_use]
    pub fn of<T: Any>() -> Self {
        Self { id: TypeId::of::<T>(), name: std::any::type_name::<T>() }
    }

    /// The underlying [`TypeId`].
    #[must_use]
    pub const fn id(&self) -> TypeId { self.id }

    /// The type's name.
    #[must_use]
    pub const fn name(&self) -> &'static str { self.name }
}

impl PartialEq for TypeKey {
    fn eq(&self, other: &Self) -> bool { self.id == other.id }
}

impl Eq for TypeKey {}

impl Hash for TypeKey {
    fn hash<H: Hasher>(&self, state: &mut H) { self.id.hash(state); }
}

/// The description of a reflected type.
#[derive(Clone, Copy)]
pub struct TypeInfo {
    key: TypeKey,
    shape: Shape,
    capabilities: &'static [&'static str],
    value_hooks: Option<ValueHooks>,
    is_zero: fn(&dyn Any) -> bool,
}

fn zero_of<T: Reflect>(value: &dyn Any) -> bool {
    value.downcast_ref::<T>().is_some_and(Reflect::is_zero)
}

impl TypeInfo {
    /// Describes `T` with the given shape, no declared capabilities and no
    /// value hooks.
    #[must_use]
    pub fn new<T: Reflect>(shape: Shape) -> Self {
        Self {
            key: TypeKey::of::<T>(),
            shape,
            capabilities: &[],
            value_hooks: None,
            is_zero: zero_of::<T>,
        }
    }

    /// Declares the capabilities this type satisfies by name.
    #[must_use]
    pub const fn with_capabilities(
        mut self,
        capabilities: &'static [&'static str],
    ) -> Self {
        self.capabilities = capabilities;
        self
    }

    /// Attaches value-marshal hooks, making the type satisfy
    /// [`VALUE_MARSHALER`](crate::VALUE_MARSHALER).
    #[must_use]
    pub const fn with_value_hooks(mut self, hooks: ValueHooks) -> Self {
        self.value_hooks = Some(hooks);
        self
    }

    /// The type's key.
    #[must_use]
    pub const fn key(&self) -> TypeKey { self.key }

    /// The type's [`TypeId`].
    #[must_use]
    pub const fn id(&self) -> TypeId { self.key.id }

    /// The type's name.
    #[must_use]
    pub const fn name(&self) -> &'static str { self.key.name }

    /// The type's shape.
    #[must_use]
    pub const fn shape(&self) -> &Shape { &self.shape }

    /// The capability names the type declares.
    #[must_use]
    pub const fn capabilities(&self) -> &'static [&'static str] {
        self.capabilities
    }

    /// Returns `true` if the type declares the named capability.
    #[must_use]
    pub fn declares(&self, capability: &str) -> bool {
        self.capabilities.contains(&capability)
    }

    /// The type's value-marshal hooks, if any.
    #[must_use]
    pub const fn value_hooks(&self) -> Option<&ValueHooks> {
        self.value_hooks.as_ref()
    }

    /// Returns `true` if `value` is this type's zero value.
    #[must_use]
    pub fn is_zero(&self, value: &dyn Any) -> bool { (self.is_zero)(value) }
}

impl fmt::Debug for TypeInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeInfo")
            .field("name", &self.key.name)
            .field("kind", &self.shape.kind())
            .field("capabilities", &self.capabilities)
            .field("value_hooks", &self.value_hooks.is_some())
            .finish()
    }
}

/// The broad category of a shape, used for fallback codec lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    /// A struct with named fields.
    Struct,
    /// A keyed collection.
    Map,
    /// An ordered collection.
    Sequence,
    /// An optional value.
    Optional,
    /// An owning pointer.
    Pointer,
}

/// How a type is laid out, as far as the generic codecs are concerned.
#[derive(Clone, Copy)]
pub enum Shape {
    /// An opaque type that needs an explicitly registered codec.
    Leaf,
    /// A struct with named fields.
    Struct(StructShape),
    /// A collection keyed by strings or integers.
    Map(MapShape),
    /// An ordered collection.
    Sequence(SequenceShape),
    /// An optional value.
    Optional(OptionalShape),
    /// An owning pointer to another value.
    Pointer(PointerShape),
}

impl Shape {
    /// The shape's kind, or `None` for leaves.
    #[must_use]
    pub const fn kind(&self) -> Option<Kind> {
        match self {
            Self::Leaf => None,
            Self::Struct(_) => Some(Kind::Struct),
            Self::Map(_) => Some(Kind::Map),
            Self::Sequence(_) => Some(Kind::Sequence),
            Self::Optional(_) => Some(Kind::Optional),
            Self::Pointer(_) => Some(Kind::Pointer),
        }
    }
}

/// Field enumeration of a struct.
#[derive(Clone, Copy)]
pub struct StructShape {
    /// Lists the fields in declaration order.
    pub fields: fn() -> Vec<FieldInfo>,
}

/// Accessors of a map type.
#[derive(Clone, Copy)]
pub struct MapShape {
    /// Description of the value type.
    pub value: fn() -> TypeInfo,
    /// Lists the entries with their encoded keys, in iteration order.
    pub entries: for<'a> fn(&'a dyn Any) -> Result<Vec<(Cow<'a, str>, &'a dyn Any)>>,
    /// Parses `key`, decodes a fresh value through the callback and inserts
    /// it, replacing any previous entry.
    pub insert_with: fn(
        &mut dyn Any,
        &str,
        &mut dyn FnMut(&mut dyn Any) -> Result<()>,
    ) -> Result<()>,
    /// Removes every entry.
    pub clear: fn(&mut dyn Any) -> Result<()>,
}

/// Accessors of a sequence type.
#[derive(Clone, Copy)]
pub struct SequenceShape {
    /// Description of the element type.
    pub element: fn() -> TypeInfo,
    /// Lists the elements in order.
    pub items: for<'a> fn(&'a dyn Any) -> Result<Vec<&'a dyn Any>>,
    /// Decodes a fresh element through the callback and appends it.
    pub push_with:
        fn(&mut dyn Any, &mut dyn FnMut(&mut dyn Any) -> Result<()>) -> Result<()>,
    /// Removes every element.
    pub clear: fn(&mut dyn Any) -> Result<()>,
}

/// Accessors of an optional type.
#[derive(Clone, Copy)]
pub struct OptionalShape {
    /// Description of the inner type.
    pub inner: fn() -> TypeInfo,
    /// The inner value, if present.
    pub get: fn(&dyn Any) -> Result<Option<&dyn Any>>,
    /// The inner value, inserting its default first if absent.
    pub get_or_insert_default: fn(&mut dyn Any) -> Result<&mut dyn Any>,
    /// Resets the value to absent.
    pub clear: fn(&mut dyn Any) -> Result<()>,
}

/// Accessors of an owning pointer type.
#[derive(Clone, Copy)]
pub struct PointerShape {
    /// Description of the pointee type.
    pub inner: fn() -> TypeInfo,
    /// The pointee.
    pub deref: fn(&dyn Any) -> Result<&dyn Any>,
    /// The pointee, mutably.
    pub deref_mut: fn(&mut dyn Any) -> Result<&mut dyn Any>,
}

/// The raw tags attached to a struct field, as `(namespace, value)` pairs.
///
/// `#[tag(doc = "name,omitempty", json = "name")]` produces
/// `[("doc", "name,omitempty"), ("json", "name")]`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StructTag(&'static [(&'static str, &'static str)]);

impl StructTag {
    /// Wraps a list of `(namespace, value)` pairs.
    #[must_use]
    pub const fn new(tags: &'static [(&'static str, &'static str)]) -> Self {
        Self(tags)
    }

    /// Looks up the value of the first tag in `namespace`.
    #[must_use]
    pub fn get(&self, namespace: &str) -> Option<&'static str> {
        self.0.iter().find(|(ns, _)| *ns == namespace).map(|(_, value)| *value)
    }

    /// All `(namespace, value)` pairs.
    #[must_use]
    pub const fn pairs(&self) -> &'static [(&'static str, &'static str)] {
        self.0
    }
}

/// One field of a reflected struct.
#[derive(Clone, Copy)]
pub struct FieldInfo {
    /// The Rust field name.
    pub name: &'static str,
    /// The field's raw tags.
    pub tags: StructTag,
    /// Whether the field is `pub`.
    pub exported: bool,
    /// Accessors, present only for exported fields.
    pub access: Option<FieldAccess>,
}

impl fmt::Debug for FieldInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldInfo")
            .field("name", &self.name)
            .field("tags", &self.tags)
            .field("exported", &self.exported)
            .finish_non_exhaustive()
    }
}

/// Typed access to one field of a struct held as `&dyn Any`.
#[derive(Clone, Copy)]
pub struct FieldAccess {
    /// Description of the field's type.
    pub ty: fn() -> TypeInfo,
    /// Borrows the field out of the struct.
    pub get: fn(&dyn Any) -> Option<&dyn Any>,
    /// Mutably borrows the field out of the struct.
    pub get_mut: fn(&mut dyn Any) -> Option<&mut dyn Any>,
}

/// A type usable as the key of a reflected map.
pub trait MapKey: Sized + 'static {
    /// Renders the key as a document key.
    fn to_document_key(&self) -> Cow<'_, str>;

    /// Parses a document key.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidMapKey`] if `key` is not a valid value of
    /// this type.
    fn from_document_key(key: &str) -> Result<Self>;
}

/// Downcasts a type-erased value, reporting a mismatch as an error.
///
/// # Errors
///
/// Returns [`Error::ValueMismatch`] if `value` is not a `T`.
pub fn downcast_ref<T: Any>(value: &dyn Any) -> Result<&T> {
    value.downcast_ref::<T>().ok_or(Error::ValueMismatch {
        expected: std::any::type_name::<T>(),
    })
}

/// Mutable counterpart of [`downcast_ref`].
///
/// # Errors
///
/// Returns [`Error::ValueMismatch`] if `value` is not a `T`.
pub fn downcast_mut<T: Any>(value: &mut dyn Any) -> Result<&mut T> {
    value.downcast_mut::<T>().ok_or(Error::ValueMismatch {
        expected: std::any::type_name::<T>(),
    })
}
