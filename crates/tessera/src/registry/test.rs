use std::collections::{BTreeMap, HashMap};

use tessera_document::{Bson, Document, DocumentWriter, Value, ValueReader};

use super::*;
use crate::{
    Reflect,
    codec::{DecodeContext, EncodeContext, ValueMut, ValueRef},
    marshal,
    reflect::Shape,
};

/// Writes a fixed string, whatever the value.
struct Marker(&'static str);

impl Codec for Marker {
    fn encode_value(
        &self,
        _ctx: &EncodeContext<'_>,
        writer: &mut DocumentWriter,
        _value: ValueRef<'_>,
    ) -> Result<()> {
        writer.write_value(Value::String(self.0))?;
        Ok(())
    }

    fn decode_value(
        &self,
        _ctx: &DecodeContext<'_>,
        _reader: ValueReader<'_>,
        _value: ValueMut<'_>,
    ) -> Result<()> {
        Ok(())
    }
}

#[derive(Reflect, Default)]
pub struct Wrap<T> {
    pub v: T,
}

#[derive(Reflect, Default)]
#[reflect(capability = "loud")]
pub struct Loud {
    pub n: i32,
}

#[derive(Reflect, Default)]
#[reflect(capability = "loud", capability = "quiet")]
pub struct Both {
    pub n: i32,
}

#[derive(Default)]
pub struct Opaque;

impl Reflect for Opaque {
    fn type_info() -> TypeInfo { TypeInfo::new::<Self>(Shape::Leaf) }
}

#[derive(Reflect, Default)]
pub struct TwoInlineMaps {
    #[tag(doc = ",inline")]
    pub first: HashMap<String, i32>,
    #[tag(doc = ",inline")]
    pub second: BTreeMap<String, i32>,
}

fn encoded<T: Reflect>(registry: &Registry, value: T) -> Bson {
    let bytes = marshal(registry, &Wrap { v: value }).unwrap();
    Document::from_slice(&bytes).unwrap().get("v").cloned().unwrap()
}

fn marker(name: &str) -> Bson { Bson::String(name.to_owned()) }

#[test]
fn capability_codec_beats_type_codec() {
    let registry = RegistryBuilder::new()
        .register_type::<Loud>(Marker("type"))
        .register_interface(CapabilityKey::declared("loud"), Marker("loud"))
        .build()
        .unwrap();

    assert_eq!(encoded(&registry, Loud { n: 1 }), marker("loud"));
}

#[test]
fn type_codec_beats_kind_fallback() {
    let registry = RegistryBuilder::new()
        .register_type::<Loud>(Marker("type"))
        .build()
        .unwrap();

    assert_eq!(encoded(&registry, Loud { n: 1 }), marker("type"));

    let mut expected = Document::new();
    expected.insert("n", 1);
    assert_eq!(
        encoded(&Registry::default(), Loud { n: 1 }),
        Bson::Document(expected)
    );
}

#[test]
fn replaced_defaults() {
    let registry = RegistryBuilder::new()
        .register_type::<String>(Marker("string"))
        .set_default_map_codec(Marker("map"))
        .build()
        .unwrap();

    assert_eq!(encoded(&registry, "x".to_owned()), marker("string"));
    assert_eq!(
        encoded(&registry, BTreeMap::from([("k".to_owned(), 1i32)])),
        marker("map")
    );
}

#[test]
fn capabilities_resolve_in_registration_order() {
    let registry = RegistryBuilder::new()
        .register_interface(CapabilityKey::declared("quiet"), Marker("quiet"))
        .register_interface(CapabilityKey::declared("loud"), Marker("loud"))
        .build()
        .unwrap();

    assert_eq!(encoded(&registry, Both { n: 0 }), marker("quiet"));
    assert_eq!(encoded(&registry, Loud { n: 0 }), marker("loud"));
}

#[test]
fn reregistered_capability_keeps_its_position() {
    let registry = RegistryBuilder::new()
        .register_interface(CapabilityKey::declared("quiet"), Marker("first"))
        .register_interface(CapabilityKey::declared("loud"), Marker("loud"))
        .register_interface(CapabilityKey::declared("quiet"), Marker("second"))
        .build()
        .unwrap();

    let names: Vec<_> = registry
        .interfaces()
        .capabilities()
        .map(CapabilityKey::name)
        .collect();
    assert_eq!(names, ["value_marshaler", "quiet", "loud"]);
    assert_eq!(encoded(&registry, Both { n: 0 }), marker("second"));
}

#[test]
fn structural_capability() {
    fn is_sequence(ty: &TypeInfo) -> bool {
        matches!(ty.shape().kind(), Some(Kind::Sequence))
    }

    let registry = RegistryBuilder::new()
        .register_interface(
            CapabilityKey::structural("sequence", is_sequence),
            Marker("seq"),
        )
        .build()
        .unwrap();

    assert_eq!(encoded(&registry, vec![1i32]), marker("seq"));
    assert_eq!(encoded(&registry, 1i32), Bson::Int32(1));
}

#[test]
fn unregistered_type() {
    let error = marshal(&Registry::default(), &Wrap { v: Opaque }).unwrap_err();
    assert!(matches!(error, Error::UnregisteredType { .. }));

    let empty = RegistryBuilder::empty().build().unwrap();
    let error = empty.lookup(&Loud::type_info()).unwrap_err();
    assert!(matches!(
        error,
        Error::UnregisteredType { type_name } if type_name.ends_with("Loud")
    ));
}

#[test]
fn register_struct_reports_unregistered_types() {
    let error = RegistryBuilder::empty()
        .register_struct::<Loud>()
        .build()
        .unwrap_err();
    assert!(matches!(error, Error::UnregisteredType { .. }));
}

#[test]
fn two_inline_maps_conflict_at_build() {
    let error = RegistryBuilder::new()
        .register_struct::<TwoInlineMaps>()
        .build()
        .unwrap_err();

    assert!(matches!(error, Error::TagConflict { .. }));
}

#[test]
fn default_registry_counts() {
    let registry = Registry::default();

    assert!(registry.types().contains(TypeKey::of::<String>()));
    assert!(registry.types().contains(TypeKey::of::<Vec<u8>>()));
    assert!(!registry.types().contains(TypeKey::of::<Vec<i32>>()));
    assert_eq!(registry.types().kind_count(), 5);
    assert_eq!(registry.interfaces().len(), 1);
}

#[test]
fn registry_is_shareable() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<Registry>();
}
