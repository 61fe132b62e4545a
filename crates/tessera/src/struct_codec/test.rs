use std::collections::{BTreeMap, HashMap};

use tessera_document::{Bson, Document};

use super::*;
use crate::{
    DecodeOptions, JsonFallbackStructTagParser, Reflect, Registry,
    RegistryBuilder, marshal, unmarshal, unmarshal_into, unmarshal_with,
};

#[derive(Reflect, Default, Debug, PartialEq)]
pub struct Person {
    #[tag(doc = "name,omitempty")]
    pub name: String,
    #[tag(doc = "age,minsize")]
    pub age: i64,
}

#[derive(Reflect, Default, Debug, PartialEq)]
pub struct Inner {
    pub x: i32,
    #[tag(doc = "y,omitempty")]
    pub y: i32,
}

#[derive(Reflect, Default, Debug, PartialEq)]
pub struct Tagged {
    pub plain: i32,
    #[tag(doc = "renamed")]
    pub original: String,
    #[tag(doc = "-")]
    pub skipped: i32,
    #[tag(doc = ",omitempty")]
    pub maybe: Option<String>,
    #[tag(doc = "small,minsize")]
    pub small: u64,
    #[tag(doc = "ratio,truncate")]
    pub ratio: f32,
    #[tag(doc = ",inline")]
    pub inner: Inner,
    #[tag(doc = ",inline")]
    pub extra: BTreeMap<String, Bson>,
    hidden: i32,
}

#[derive(Reflect, Default, Debug)]
pub struct Empties {
    #[tag(doc = ",omitempty")]
    pub list: Vec<i32>,
    #[tag(doc = ",omitempty")]
    pub opt: Option<i32>,
    #[tag(doc = ",omitempty")]
    pub num: f64,
    #[tag(doc = ",omitempty")]
    pub map: HashMap<String, i32>,
    #[tag(doc = ",omitempty")]
    pub nested: Inner,
    #[tag(doc = ",omitempty")]
    pub flag: bool,
}

#[derive(Reflect, Default, Debug)]
pub struct Ratio {
    pub ratio: f32,
}

#[derive(Reflect, Default, Debug)]
pub struct Outer {
    pub inner: Inner,
    pub label: String,
}

#[derive(Reflect, Default, Debug)]
pub struct Base {
    pub id: i32,
    pub name: String,
}

#[derive(Reflect, Default, Debug)]
pub struct Derived {
    #[tag(doc = ",inline")]
    pub base: Base,
    pub name: String,
}

#[derive(Reflect, Default, Debug)]
pub struct Left {
    pub key: i32,
}

#[derive(Reflect, Default, Debug)]
pub struct Right {
    pub key: i32,
}

#[derive(Reflect, Default, Debug)]
pub struct Tie {
    #[tag(doc = ",inline")]
    pub left: Left,
    #[tag(doc = ",inline")]
    pub right: Right,
}

#[derive(Reflect, Default, Debug)]
pub struct InlineScalar {
    #[tag(doc = ",inline")]
    pub n: i32,
}

#[derive(Reflect, Default, Debug)]
pub struct Cased {
    #[tag(doc = "a")]
    pub lower: i32,
    #[tag(doc = "A")]
    pub upper: i32,
}

#[derive(Reflect, Default, Debug)]
pub struct FromJson {
    #[tag(json = "full_name")]
    pub name: String,
    #[tag(json = "ignored", doc = "kept")]
    pub both: i32,
}

fn doc(entries: &[(&str, Bson)]) -> Vec<u8> {
    entries
        .iter()
        .map(|(key, value)| ((*key).to_owned(), value.clone()))
        .collect::<Document>()
        .to_vec()
        .unwrap()
}

fn keys(bytes: &[u8]) -> Vec<String> {
    Document::from_slice(bytes).unwrap().keys().map(str::to_owned).collect()
}

// =============================================================================
// Encoding
// =============================================================================

#[test]
fn empty_name_and_small_age_encode_one_int32() {
    let bytes =
        marshal(&Registry::default(), &Person { name: String::new(), age: 30 })
            .unwrap();

    assert_eq!(bytes, [
        14u8, 0, 0, 0, // length
        0x10, b'a', b'g', b'e', 0, // int32 "age"
        30, 0, 0, 0, // value
        0, // terminator
    ]);
}

#[test]
fn min_size_boundaries() {
    let registry = Registry::default();
    let age = |age: i64| {
        let bytes =
            marshal(&registry, &Person { name: "n".into(), age }).unwrap();
        Document::from_slice(&bytes).unwrap().get("age").cloned().unwrap()
    };

    assert_eq!(age(i64::from(i32::MAX)), Bson::Int32(i32::MAX));
    assert_eq!(
        age(i64::from(i32::MAX) + 1),
        Bson::Int64(i64::from(i32::MAX) + 1)
    );
    assert_eq!(age(i64::from(i32::MIN)), Bson::Int32(i32::MIN));
    assert_eq!(
        age(i64::from(i32::MIN) - 1),
        Bson::Int64(i64::from(i32::MIN) - 1)
    );
}

#[test]
fn omit_empty_skips_every_kind_of_zero() {
    let registry = Registry::default();

    let bytes = marshal(&registry, &Empties::default()).unwrap();
    assert_eq!(bytes, [5u8, 0, 0, 0, 0]);

    let bytes = marshal(&registry, &Empties {
        opt: Some(0),
        nested: Inner { x: 0, y: 1 },
        ..Empties::default()
    })
    .unwrap();
    assert_eq!(keys(&bytes), ["opt", "nested"]);
}

#[test]
fn field_order_after_flattening() {
    let value = Tagged {
        extra: BTreeMap::from([
            ("b".to_owned(), Bson::Int32(2)),
            ("a".to_owned(), Bson::Int32(1)),
        ]),
        ..Tagged::default()
    };
    let bytes = marshal(&Registry::default(), &value).unwrap();

    assert_eq!(keys(&bytes), [
        "plain", "renamed", "small", "ratio", "x", "a", "b"
    ]);
}

#[test]
fn inline_map_key_colliding_with_field() {
    let value = Tagged {
        extra: BTreeMap::from([("plain".to_owned(), Bson::Null)]),
        ..Tagged::default()
    };
    let error = marshal(&Registry::default(), &value).unwrap_err();

    assert!(matches!(error, Error::TagConflict { .. }));
}

// =============================================================================
// Round trips
// =============================================================================

#[test]
fn every_tag_combination_round_trips() {
    let registry = Registry::default();
    let value = Tagged {
        plain: -4,
        original: "orig".to_owned(),
        skipped: 0,
        maybe: Some("m".to_owned()),
        small: 12,
        ratio: 0.5,
        inner: Inner { x: 1, y: 2 },
        extra: BTreeMap::from([("zzz".to_owned(), Bson::Boolean(true))]),
        hidden: 0,
    };

    let bytes = marshal(&registry, &value).unwrap();
    let decoded: Tagged = unmarshal(&registry, &bytes).unwrap();

    assert_eq!(decoded, value);
    assert_eq!(
        Document::from_slice(&bytes).unwrap().get("small"),
        Some(&Bson::Int32(12))
    );
}

#[test]
fn skipped_and_private_fields_are_not_written() {
    let registry = Registry::default();
    let value = Tagged { skipped: 9, hidden: 9, ..Tagged::default() };

    let bytes = marshal(&registry, &value).unwrap();
    let names = keys(&bytes);
    assert!(!names.iter().any(|key| key == "skipped" || key == "hidden"));

    let decoded: Tagged = unmarshal(&registry, &bytes).unwrap();
    assert_eq!(decoded.skipped, 0);
    assert_eq!(decoded.hidden, 0);
}

#[test]
fn unknown_keys_flow_into_the_inline_map() {
    let bytes = doc(&[
        ("plain", Bson::Int32(1)),
        ("note", Bson::String("hello".to_owned())),
        ("x", Bson::Int32(3)),
    ]);
    let decoded: Tagged = unmarshal(&Registry::default(), &bytes).unwrap();

    assert_eq!(decoded.plain, 1);
    assert_eq!(decoded.inner.x, 3);
    assert_eq!(
        decoded.extra,
        BTreeMap::from([("note".to_owned(), Bson::String("hello".to_owned()))])
    );
}

// =============================================================================
// Decoding
// =============================================================================

#[test]
fn truncate_tag_and_option() {
    let registry = Registry::default();
    let bytes = doc(&[("ratio", Bson::Double(0.1))]);

    let error = unmarshal::<Ratio>(&registry, &bytes).unwrap_err();
    assert!(matches!(error, Error::PrecisionLoss { target: "f32", .. }));

    let decoded: Ratio = unmarshal_with(
        &registry,
        &bytes,
        DecodeOptions::default().truncate(true),
    )
    .unwrap();
    assert!((decoded.ratio - 0.1).abs() < f32::EPSILON);

    let tagged: Tagged = unmarshal(&registry, &bytes).unwrap();
    assert!((tagged.ratio - 0.1).abs() < f32::EPSILON);
}

#[test]
fn keys_match_exactly_then_case_insensitively() {
    let registry = Registry::default();

    let decoded: Cased =
        unmarshal(&registry, &doc(&[("A", Bson::Int32(1))])).unwrap();
    assert_eq!((decoded.lower, decoded.upper), (0, 1));

    let decoded: Cased =
        unmarshal(&registry, &doc(&[("a", Bson::Int32(2))])).unwrap();
    assert_eq!((decoded.lower, decoded.upper), (2, 0));

    let decoded: Person =
        unmarshal(&registry, &doc(&[("NAME", Bson::String("n".into()))]))
            .unwrap();
    assert_eq!(decoded.name, "n");
}

#[test]
fn unknown_keys_are_dropped_unless_strict() {
    let registry = Registry::default();
    let bytes = doc(&[("age", Bson::Int32(3)), ("extra", Bson::Null)]);

    let decoded: Person = unmarshal(&registry, &bytes).unwrap();
    assert_eq!(decoded.age, 3);

    let strict = DecodeOptions::default().strict(true);
    let error = unmarshal_with::<Person>(&registry, &bytes, strict).unwrap_err();
    assert!(matches!(error, Error::UnknownField { key, .. } if key == "extra"));
}

#[test]
fn private_fields_are_denied_in_strict_mode() {
    let registry = Registry::default();
    let bytes = doc(&[("label", Bson::Null), ("hidden", Bson::Int32(1))]);

    #[derive(Reflect, Default, Debug)]
    pub struct Secretive {
        pub label: String,
        hidden: i32,
    }

    let decoded: Secretive = unmarshal(&registry, &bytes).unwrap();
    assert_eq!(decoded.hidden, 0);

    let strict = DecodeOptions::default().strict(true);
    let error =
        unmarshal_with::<Secretive>(&registry, &bytes, strict).unwrap_err();
    assert!(matches!(
        error,
        Error::FieldAccessDenied { field: "hidden", .. }
    ));
}

#[test]
fn null_leaves_a_struct_untouched() {
    let registry = Registry::default();
    let bytes = doc(&[("inner", Bson::Null), ("label", Bson::String("l".into()))]);

    let mut value =
        Outer { inner: Inner { x: 5, y: 6 }, label: String::new() };
    unmarshal_into(&registry, &bytes, &mut value, DecodeOptions::default())
        .unwrap();

    assert_eq!(value.inner, Inner { x: 5, y: 6 });
    assert_eq!(value.label, "l");
}

#[test]
fn struct_from_wrong_element() {
    let bytes = doc(&[("inner", Bson::Array(vec![]))]);
    let error = unmarshal::<Outer>(&Registry::default(), &bytes).unwrap_err();

    assert!(matches!(error, Error::TypeMismatch { .. }));
}

// =============================================================================
// Descriptions
// =============================================================================

#[test]
fn description_lists_flattened_fields() {
    let codec = StructCodec::new();
    let description = codec.describe(&Tagged::type_info()).unwrap();

    let names: Vec<_> =
        description.fields().iter().map(FieldSpec::name).collect();
    assert_eq!(names, ["plain", "renamed", "maybe", "small", "ratio", "x", "y"]);
    assert!(description.has_inline_map());

    let x = description.field("x").unwrap();
    assert!(x.is_inlined());
    assert_eq!(x.index(), 0);
    assert!(description.field("small").unwrap().min_size());
    assert!(description.field("RENAMED").is_some());
    assert!(description.field("skipped").is_none());

    let again = codec.describe(&Tagged::type_info()).unwrap();
    assert!(Arc::ptr_eq(&description, &again));
}

#[test]
fn shallowest_duplicate_wins() {
    let registry = Registry::default();
    let value = Derived {
        base: Base { id: 1, name: "deep".to_owned() },
        name: "shallow".to_owned(),
    };

    let bytes = marshal(&registry, &value).unwrap();
    let document = Document::from_slice(&bytes).unwrap();
    assert_eq!(keys(&bytes), ["id", "name"]);
    assert_eq!(document.get("name").and_then(Bson::as_str), Some("shallow"));
}

#[test]
fn duplicates_conflict_without_overwrite() {
    let strict = StructCodec::new().with_options(
        StructCodecOptions::default().overwrite_duplicated_inlined_fields(false),
    );
    let error = RegistryBuilder::new()
        .set_default_struct_codec(strict)
        .register_struct::<Derived>()
        .build()
        .unwrap_err();

    assert!(matches!(error, Error::TagConflict { .. }));
}

#[test]
fn duplicates_at_the_same_depth_conflict() {
    let error = StructCodec::new().describe(&Tie::type_info()).unwrap_err();
    assert!(matches!(error, Error::TagConflict { reason, .. } if reason.contains("key")));
}

#[test]
fn inline_needs_a_struct_or_map() {
    let error =
        StructCodec::new().describe(&InlineScalar::type_info()).unwrap_err();
    assert!(matches!(error, Error::TagConflict { .. }));
}

#[test]
fn json_fallback_parser() {
    let registry = RegistryBuilder::new()
        .set_default_struct_codec(StructCodec::with_parser(
            JsonFallbackStructTagParser,
        ))
        .build()
        .unwrap();

    let bytes =
        marshal(&registry, &FromJson { name: "n".to_owned(), both: 1 }).unwrap();
    assert_eq!(keys(&bytes), ["full_name", "kept"]);
}

#[test]
fn private_keys_fold_case_like_public_ones() {
    #[derive(Reflect, Default, Debug)]
    pub struct Grumpy {
        #[tag(doc = "Ärger")]
        pub mood: String,
        #[tag(doc = "Öl")]
        fuel: i32,
    }

    let registry = Registry::default();
    let decoded: Grumpy =
        unmarshal(&registry, &doc(&[("äRGER", Bson::from("high"))])).unwrap();
    assert_eq!(decoded.mood, "high");
    assert_eq!(decoded.fuel, 0);

    let strict = DecodeOptions::default().strict(true);
    let error = unmarshal_with::<Grumpy>(
        &registry,
        &doc(&[("öL", Bson::Int32(1))]),
        strict,
    )
    .unwrap_err();
    assert!(matches!(error, Error::FieldAccessDenied { field: "fuel", .. }));
}

// =============================================================================
// Field directives do not leak into nested structs
// =============================================================================

#[derive(Reflect, Default, Debug)]
pub struct Counter {
    pub n: i64,
}

#[derive(Reflect, Default, Debug)]
pub struct Compact {
    #[tag(doc = "counter,minsize")]
    pub counter: Counter,
    #[tag(doc = "counts,minsize")]
    pub counts: Vec<i64>,
    #[tag(doc = "by_name,minsize")]
    pub by_name: BTreeMap<String, i64>,
}

#[derive(Reflect, Default, Debug)]
pub struct Loose {
    #[tag(doc = "inner,truncate")]
    pub inner: Ratio,
    #[tag(doc = "ratios,truncate")]
    pub ratios: Vec<f32>,
}

#[test]
fn minsize_on_a_struct_field_stops_at_its_fields() {
    let value = Compact {
        counter: Counter { n: 5 },
        counts: vec![5],
        by_name: BTreeMap::from([("a".to_owned(), 5)]),
    };

    let bytes = marshal(&Registry::default(), &value).unwrap();
    let document = Document::from_slice(&bytes).unwrap();
    let counter = document.get("counter").and_then(Bson::as_document).unwrap();
    let by_name = document.get("by_name").and_then(Bson::as_document).unwrap();

    assert_eq!(counter.get("n"), Some(&Bson::Int64(5)));
    assert_eq!(document.get("counts"), Some(&Bson::Array(vec![Bson::Int32(5)])));
    assert_eq!(by_name.get("a"), Some(&Bson::Int32(5)));

    let bytes = crate::marshal_with(
        &Registry::default(),
        &value,
        crate::EncodeOptions::default().min_size(true),
    )
    .unwrap();
    let document = Document::from_slice(&bytes).unwrap();
    let counter = document.get("counter").and_then(Bson::as_document).unwrap();
    assert_eq!(counter.get("n"), Some(&Bson::Int32(5)));
}

#[test]
fn truncate_on_a_struct_field_stops_at_its_fields() {
    let registry = Registry::default();
    let nested = Bson::Document(Document::from_iter([("ratio", 0.1)]));

    let error = unmarshal::<Loose>(&registry, &doc(&[("inner", nested.clone())]))
        .unwrap_err();
    assert!(matches!(error, Error::PrecisionLoss { target: "f32", .. }));

    let decoded: Loose = unmarshal(
        &registry,
        &doc(&[("ratios", Bson::Array(vec![Bson::Double(0.1)]))]),
    )
    .unwrap();
    assert!((decoded.ratios[0] - 0.1).abs() < f32::EPSILON);

    let decoded: Loose = unmarshal_with(
        &registry,
        &doc(&[("inner", nested)]),
        DecodeOptions::default().truncate(true),
    )
    .unwrap();
    assert!((decoded.inner.ratio - 0.1).abs() < f32::EPSILON);
}
