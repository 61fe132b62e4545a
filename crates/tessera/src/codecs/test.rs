use tessera_document::{
    Binary, Bson, Document, DocumentWriter, ObjectId, RawDocumentBuf, Value,
};

use crate::{
    DecodeOptions, EncodeOptions, Error, Reflect, Registry, marshal_with,
    unmarshal_with,
};

#[derive(Reflect, Default, Debug)]
pub struct Holder<T> {
    pub v: T,
}

fn document(value: Value<'_>) -> Vec<u8> {
    let mut writer = DocumentWriter::new();
    writer.open_document().unwrap();
    writer.write_element("v", value).unwrap();
    writer.close_document().unwrap();
    writer.finish().unwrap()
}

fn decode_with<T: Reflect + Default>(
    value: Value<'_>,
    options: DecodeOptions,
) -> crate::Result<T> {
    unmarshal_with::<Holder<T>>(&Registry::default(), &document(value), options)
        .map(|holder| holder.v)
}

fn decode<T: Reflect + Default>(value: Value<'_>) -> crate::Result<T> {
    decode_with(value, DecodeOptions::default())
}

fn encode_with<T: Reflect>(value: T, options: EncodeOptions) -> Bson {
    let bytes =
        marshal_with(&Registry::default(), &Holder { v: value }, options)
            .unwrap();
    Document::from_slice(&bytes).unwrap().get("v").cloned().unwrap()
}

fn encode<T: Reflect>(value: T) -> Bson {
    encode_with(value, EncodeOptions::default())
}

// =============================================================================
// Integers
// =============================================================================

#[test]
fn narrow_integers_encode_as_int32() {
    assert_eq!(encode(7u8), Bson::Int32(7));
    assert_eq!(encode(-7i8), Bson::Int32(-7));
    assert_eq!(encode(u16::MAX), Bson::Int32(65535));
    assert_eq!(encode(i32::MIN), Bson::Int32(i32::MIN));
}

#[test]
fn wide_integers_encode_as_int64_unless_min_size() {
    assert_eq!(encode(7i64), Bson::Int64(7));
    assert_eq!(encode(7u32), Bson::Int64(7));
    assert_eq!(encode(7usize), Bson::Int64(7));

    let min_size = EncodeOptions::default().min_size(true);
    assert_eq!(encode_with(7i64, min_size), Bson::Int32(7));
    assert_eq!(encode_with(7u64, min_size), Bson::Int32(7));
    assert_eq!(encode_with(1i64 << 40, min_size), Bson::Int64(1 << 40));
    assert_eq!(
        encode_with(i64::from(i32::MIN) - 1, min_size),
        Bson::Int64(i64::from(i32::MIN) - 1)
    );
}

#[test]
fn unsigned_above_i64_max_is_out_of_range() {
    let error = marshal_with(
        &Registry::default(),
        &Holder { v: u64::MAX },
        EncodeOptions::default(),
    )
    .unwrap_err();

    assert!(matches!(error, Error::OutOfRange { target: "u64", .. }));
}

#[test]
fn integer_decoding_checks_range() {
    assert_eq!(decode::<u8>(Value::Int64(255)).unwrap(), 255);
    assert!(matches!(
        decode::<u8>(Value::Int64(256)),
        Err(Error::OutOfRange { target: "u8", .. })
    ));
    assert!(matches!(
        decode::<u32>(Value::Int32(-1)),
        Err(Error::OutOfRange { .. })
    ));
    assert_eq!(decode::<i64>(Value::Int32(-5)).unwrap(), -5);
}

#[test]
fn integer_from_double() {
    assert_eq!(decode::<i32>(Value::Double(3.0)).unwrap(), 3);
    assert!(matches!(
        decode::<i32>(Value::Double(3.5)),
        Err(Error::PrecisionLoss { target: "i32", .. })
    ));

    let truncate = DecodeOptions::default().truncate(true);
    assert_eq!(decode_with::<i32>(Value::Double(3.5), truncate).unwrap(), 3);
    assert_eq!(decode_with::<i32>(Value::Double(-3.7), truncate).unwrap(), -3);

    assert!(matches!(
        decode::<i64>(Value::Double(f64::NAN)),
        Err(Error::OutOfRange { .. })
    ));
    assert!(matches!(
        decode::<i64>(Value::Double(1e300)),
        Err(Error::OutOfRange { .. })
    ));
}

#[test]
fn integer_from_bool_and_null() {
    assert_eq!(decode::<u8>(Value::Boolean(true)).unwrap(), 1);
    assert_eq!(decode::<i64>(Value::Null).unwrap(), 0);
    assert!(matches!(
        decode::<i32>(Value::String("1")),
        Err(Error::TypeMismatch { target: "i32", .. })
    ));
}

// =============================================================================
// Floats
// =============================================================================

#[test]
fn f32_narrowing_needs_truncate() {
    assert_eq!(decode::<f32>(Value::Double(0.5)).unwrap(), 0.5);
    assert!(matches!(
        decode::<f32>(Value::Double(0.1)),
        Err(Error::PrecisionLoss { target: "f32", .. })
    ));

    let truncate = DecodeOptions::default().truncate(true);
    assert_eq!(
        decode_with::<f32>(Value::Double(0.1), truncate).unwrap(),
        0.1_f32
    );
}

#[test]
fn f64_from_inexact_int64_needs_truncate() {
    let inexact = (1i64 << 53) + 1;
    assert!(matches!(
        decode::<f64>(Value::Int64(inexact)),
        Err(Error::PrecisionLoss { target: "f64", .. })
    ));
    assert!(matches!(
        decode::<f64>(Value::Int64(i64::MAX)),
        Err(Error::PrecisionLoss { .. })
    ));
    assert_eq!(decode::<f64>(Value::Int64(1 << 53)).unwrap(), 9_007_199_254_740_992.0);
    assert_eq!(decode::<f64>(Value::Int32(-2)).unwrap(), -2.0);
}

#[test]
fn floats_encode_as_double() {
    assert_eq!(encode(1.5f32), Bson::Double(1.5));
    assert_eq!(encode(-0.25f64), Bson::Double(-0.25));
}

// =============================================================================
// Primitives
// =============================================================================

#[test]
fn bool_accepts_numbers() {
    assert!(decode::<bool>(Value::Int32(2)).unwrap());
    assert!(!decode::<bool>(Value::Double(0.0)).unwrap());
    assert!(!decode::<bool>(Value::Null).unwrap());
    assert!(matches!(
        decode::<bool>(Value::String("true")),
        Err(Error::TypeMismatch { .. })
    ));
}

#[test]
fn string_accepts_symbol_and_null() {
    assert_eq!(decode::<String>(Value::Symbol("sym")).unwrap(), "sym");
    assert_eq!(decode::<String>(Value::Null).unwrap(), "");
    assert!(matches!(
        decode::<String>(Value::Int32(1)),
        Err(Error::TypeMismatch { target: "String", .. })
    ));
}

#[test]
fn byte_vectors_are_binary() {
    assert_eq!(
        encode(vec![1u8, 2, 3]),
        Bson::Binary(Binary { subtype: 0, bytes: vec![1, 2, 3] })
    );
    assert_eq!(
        decode::<Vec<u8>>(Value::Binary { subtype: 0, bytes: &[9, 8] })
            .unwrap(),
        vec![9, 8]
    );
    assert!(matches!(
        decode::<Vec<u8>>(Value::Binary { subtype: 0x80, bytes: &[1] }),
        Err(Error::TypeMismatch { .. })
    ));
}

// =============================================================================
// Collections
// =============================================================================

#[test]
fn sequences_are_arrays() {
    assert_eq!(
        encode(vec![1i32, 2]),
        Bson::Array(vec![Bson::Int32(1), Bson::Int32(2)])
    );
    assert_eq!(encode(Vec::<String>::new()), Bson::Array(Vec::new()));
    assert!(decode::<Vec<i32>>(Value::Null).unwrap().is_empty());
    assert!(matches!(
        decode::<Vec<i32>>(Value::Int32(1)),
        Err(Error::TypeMismatch { .. })
    ));
}

#[test]
fn optional_values() {
    assert_eq!(encode(None::<i32>), Bson::Null);
    assert_eq!(encode(Some(5i32)), Bson::Int32(5));
    assert_eq!(decode::<Option<i32>>(Value::Null).unwrap(), None);
    assert_eq!(decode::<Option<i32>>(Value::Int32(4)).unwrap(), Some(4));
}

#[test]
fn boxes_are_transparent() {
    assert_eq!(encode(Box::new(3i32)), Bson::Int32(3));
    assert_eq!(*decode::<Box<String>>(Value::String("x")).unwrap(), "x");
}

// =============================================================================
// Wire types
// =============================================================================

#[test]
fn object_ids() {
    let id = ObjectId::from_bytes([7; 12]);
    assert_eq!(encode(id), Bson::ObjectId(id));
    assert_eq!(decode::<ObjectId>(Value::ObjectId(id)).unwrap(), id);
    assert_eq!(decode::<ObjectId>(Value::Null).unwrap(), ObjectId::default());
    assert!(matches!(
        decode::<ObjectId>(Value::String("id")),
        Err(Error::TypeMismatch { target: "ObjectId", .. })
    ));
}

#[test]
fn bson_accepts_anything() {
    assert_eq!(
        decode::<Bson>(Value::Symbol("s")).unwrap(),
        Bson::Symbol("s".to_owned())
    );
    assert_eq!(decode::<Bson>(Value::MaxKey).unwrap(), Bson::MaxKey);
}

#[test]
fn raw_documents_are_copied() {
    let inner: Document =
        [("a".to_owned(), Bson::Int32(1))].into_iter().collect();
    let raw = RawDocumentBuf::from_bytes(inner.to_vec().unwrap()).unwrap();

    let encoded = encode(raw.clone());
    assert_eq!(encoded, Bson::Document(inner));

    let decoded = decode::<RawDocumentBuf>(Value::Document(raw.as_raw()))
        .unwrap();
    assert_eq!(decoded, raw);
}
