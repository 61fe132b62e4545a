use std::{
    any::Any,
    borrow::Cow,
    collections::{BTreeMap, HashMap, VecDeque},
    hash::{BuildHasher, Hash},
};

use tessera_document::{
    Binary, Bson, DateTime, Decimal128, Document, ObjectId, RawDocumentBuf,
    Timestamp,
};

use super::{
    MapKey, MapShape, OptionalShape, PointerShape, Reflect,
    SequenceShape, Shape, TypeInfo, downcast_mut, downcast_ref,
};
use crate::error::{Error, Result};

// =============================================================================
// Leaves
// =============================================================================

macro_rules! impl_leaf {
    ($($ty:ty => |$value:ident| $zero:expr;)*) => {
        $(
            impl Reflect for $ty {
                fn type_info() -> TypeInfo { TypeInfo::new::<Self>(Shape::Leaf) }

                #[allow(clippy::float_cmp)]
                fn is_zero(&self) -> bool {
                    let $value = self;
                    $zero
                }
            }
        )*
    };
}

impl_leaf! {
    bool => |v| !*v;
    i8 => |v| *v == 0;
    i16 => |v| *v == 0;
    i32 => |v| *v == 0;
    i64 => |v| *v == 0;
    isize => |v| *v == 0;
    u8 => |v| *v == 0;
    u16 => |v| *v == 0;
    u32 => |v| *v == 0;
    u64 => |v| *v == 0;
    usize => |v| *v == 0;
    f32 => |v| *v == 0.0;
    f64 => |v| *v == 0.0;
    String => |v| v.is_empty();
    ObjectId => |v| *v == ObjectId::default();
    DateTime => |v| v.millis() == 0;
    Timestamp => |v| *v == Timestamp::default();
    Decimal128 => |v| *v == Decimal128::default();
    Binary => |v| v.bytes.is_empty();
    RawDocumentBuf => |v| v.as_bytes().len() == tessera_document::MIN_DOCUMENT_LEN;
    Bson => |v| matches!(v, Bson::Null);
    Document => |v| v.is_empty();
}

// =============================================================================
// Sequences
// =============================================================================

trait Items: Any + Default {
    type Item: Reflect + Default;

    fn each(&self) -> impl Iterator<Item = &Self::Item>;
    fn push(&mut self, item: Self::Item);
    fn clear(&mut self);
}

impl<T: Reflect + Default> Items for Vec<T> {
    type Item = T;

    fn each(&self) -> impl Iterator<Item = &T> { self.iter() }

    fn push(&mut self, item: T) { Self::push(self, item); }

    fn clear(&mut self) { Self::clear(self); }
}

impl<T: Reflect + Default> Items for VecDeque<T> {
    type Item = T;

    fn each(&self) -> impl Iterator<Item = &T> { self.iter() }

    fn push(&mut self, item: T) { self.push_back(item); }

    fn clear(&mut self) { Self::clear(self); }
}

fn sequence_info<S: Items + Reflect>() -> TypeInfo {
    TypeInfo::new::<S>(Shape::Sequence(SequenceShape {
        element: <S::Item as Reflect>::type_info,
        items: |value| {
            Ok(downcast_ref::<S>(value)?
                .each()
                .map(|item| item as &dyn Any)
                .collect())
        },
        push_with: |value, decode| {
            let sequence = downcast_mut::<S>(value)?;
            let mut item = S::Item::default();
            decode(&mut item)?;
            sequence.push(item);
            Ok(())
        },
        clear: |value| {
            downcast_mut::<S>(value)?.clear();
            Ok(())
        },
    }))
}

impl<T: Reflect + Default> Reflect for Vec<T> {
    fn type_info() -> TypeInfo { sequence_info::<Self>() }

    fn is_zero(&self) -> bool { self.is_empty() }
}

impl<T: Reflect + Default> Reflect for VecDeque<T> {
    fn type_info() -> TypeInfo { sequence_info::<Self>() }

    fn is_zero(&self) -> bool { self.is_empty() }
}

// =============================================================================
// Maps
// =============================================================================

trait Entries: Any + Default {
    type Key: MapKey;
    type Value: Reflect + Default;

    fn each(&self) -> impl Iterator<Item = (&Self::Key, &Self::Value)>;
    fn insert(&mut self, key: Self::Key, value: Self::Value);
    fn clear(&mut self);
}

impl<K, V, S> Entries for HashMap<K, V, S>
where
    K: MapKey + Eq + Hash,
    V: Reflect + Default,
    S: BuildHasher + Default + 'static,
{
    type Key = K;
    type Value = V;

    fn each(&self) -> impl Iterator<Item = (&K, &V)> { self.iter() }

    fn insert(&mut self, key: K, value: V) { Self::insert(self, key, value); }

    fn clear(&mut self) { Self::clear(self); }
}

impl<K, V> Entries for BTreeMap<K, V>
where
    K: MapKey + Ord,
    V: Reflect + Default,
{
    type Key = K;
    type Value = V;

    fn each(&self) -> impl Iterator<Item = (&K, &V)> { self.iter() }

    fn insert(&mut self, key: K, value: V) { Self::insert(self, key, value); }

    fn clear(&mut self) { Self::clear(self); }
}

fn map_info<M: Entries + Reflect>() -> TypeInfo {
    TypeInfo::new::<M>(Shape::Map(MapShape {
        value: <M::Value as Reflect>::type_info,
        entries: |value| {
            Ok(downcast_ref::<M>(value)?
                .each()
                .map(|(key, value)| (key.to_document_key(), value as &dyn Any))
                .collect())
        },
        insert_with: |value, key, decode| {
            let map = downcast_mut::<M>(value)?;
            let key = M::Key::from_document_key(key)?;
            let mut item = M::Value::default();
            decode(&mut item)?;
            map.insert(key, item);
            Ok(())
        },
        clear: |value| {
            downcast_mut::<M>(value)?.clear();
            Ok(())
        },
    }))
}

impl<K, V, S> Reflect for HashMap<K, V, S>
where
    K: MapKey + Eq + Hash,
    V: Reflect + Default,
    S: BuildHasher + Default + 'static,
{
    fn type_info() -> TypeInfo { map_info::<Self>() }

    fn is_zero(&self) -> bool { self.is_empty() }
}

impl<K, V> Reflect for BTreeMap<K, V>
where
    K: MapKey + Ord,
    V: Reflect + Default,
{
    fn type_info() -> TypeInfo { map_info::<Self>() }

    fn is_zero(&self) -> bool { self.is_empty() }
}

impl MapKey for String {
    fn to_document_key(&self) -> Cow<'_, str> { Cow::Borrowed(self) }

    fn from_document_key(key: &str) -> Result<Self> { Ok(key.to_owned()) }
}

macro_rules! impl_integer_key {
    ($($ty:ty),*) => {
        $(
            impl MapKey for $ty {
                fn to_document_key(&self) -> Cow<'_, str> {
                    Cow::Owned(self.to_string())
                }

                fn from_document_key(key: &str) -> Result<Self> {
                    key.parse().map_err(|_| Error::InvalidMapKey {
                        key: key.to_owned(),
                        target: stringify!($ty),
                    })
                }
            }
        )*
    };
}

impl_integer_key!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize);

// =============================================================================
// Option and Box
// =============================================================================

impl<T: Reflect + Default> Reflect for Option<T> {
    fn type_info() -> TypeInfo {
        TypeInfo::new::<Self>(Shape::Optional(OptionalShape {
            inner: T::type_info,
            get: |value| {
                Ok(downcast_ref::<Self>(value)?.as_ref().map(|v| v as &dyn Any))
            },
            get_or_insert_default: |value| {
                Ok(downcast_mut::<Self>(value)?.get_or_insert_with(T::default)
                    as &mut dyn Any)
            },
            clear: |value| {
                *downcast_mut::<Self>(value)? = None;
                Ok(())
            },
        }))
    }

    fn is_zero(&self) -> bool { self.is_none() }
}

impl<T: Reflect> Reflect for Box<T> {
    fn type_info() -> TypeInfo {
        TypeInfo::new::<Self>(Shape::Pointer(PointerShape {
            inner: T::type_info,
            deref: |value| Ok(&**downcast_ref::<Self>(value)? as &dyn Any),
            deref_mut: |value| {
                Ok(&mut **downcast_mut::<Self>(value)? as &mut dyn Any)
            },
        }))
    }

    fn is_zero(&self) -> bool { (**self).is_zero() }
}
