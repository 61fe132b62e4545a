use super::*;
use crate::{DocumentWriter, MalformedKind};

/// `{"a": {"level0": {"level1": ... 1}}, "next": "sibling"}`, `depth` levels
/// deep.
fn nested(depth: usize) -> Vec<u8> {
    let mut writer = DocumentWriter::new();
    writer.open_document().unwrap();
    writer.write_key("a").unwrap();
    for level in 0..depth {
        writer.open_document().unwrap();
        writer.write_key(&format!("level{level}")).unwrap();
    }
    writer.write_value(Value::Int32(1)).unwrap();
    for _ in 0..depth {
        writer.close_document().unwrap();
    }
    writer.write_element("next", Value::String("sibling")).unwrap();
    writer.close_document().unwrap();
    writer.finish().unwrap()
}

#[test]
fn empty_document() {
    let bytes = [5, 0, 0, 0, 0];
    let mut reader = DocumentReader::new(&bytes).unwrap();

    assert!(reader.is_empty());
    assert!(reader.next().unwrap().is_none());
    // Exhausted readers stay exhausted.
    assert!(reader.next().unwrap().is_none());
}

#[test]
fn reads_scalars_in_order() {
    let mut writer = DocumentWriter::new();
    writer.open_document().unwrap();
    writer.write_element("x", Value::Double(1.5)).unwrap();
    writer.write_element("s", Value::String("hi")).unwrap();
    writer.write_element("b", Value::Boolean(true)).unwrap();
    writer.write_element("n", Value::Null).unwrap();
    writer.write_element("i", Value::Int64(-7)).unwrap();
    writer.close_document().unwrap();
    let bytes = writer.finish().unwrap();

    let mut reader = DocumentReader::new(&bytes).unwrap();
    let mut seen = Vec::new();
    while let Some(header) = reader.next().unwrap() {
        seen.push((header.key, reader.read_value().unwrap()));
    }

    assert_eq!(seen, vec![
        ("x", Value::Double(1.5)),
        ("s", Value::String("hi")),
        ("b", Value::Boolean(true)),
        ("n", Value::Null),
        ("i", Value::Int64(-7)),
    ]);
}

#[test]
fn skip_nested_then_read_sibling() {
    for depth in [1, 3, 16] {
        let bytes = nested(depth);
        let mut reader = DocumentReader::new(&bytes).unwrap();

        let header = reader.next().unwrap().unwrap();
        assert_eq!(header.key, "a");
        assert_eq!(header.element_type, ElementType::EmbeddedDocument);
        reader.skip_value().unwrap();

        let header = reader.next().unwrap().unwrap();
        assert_eq!(header.key, "next", "depth {depth}");
        assert_eq!(reader.read_value().unwrap(), Value::String("sibling"));
        assert!(reader.next().unwrap().is_none());
    }
}

#[test]
fn unconsumed_value_is_skipped_by_next() {
    let bytes = nested(4);
    let mut reader = DocumentReader::new(&bytes).unwrap();

    assert_eq!(reader.next().unwrap().unwrap().key, "a");
    assert_eq!(reader.next().unwrap().unwrap().key, "next");
}

#[test]
fn descend_reads_nested_values() {
    let bytes = nested(2);
    let mut reader = DocumentReader::new(&bytes).unwrap();
    reader.next().unwrap();

    let mut level0 = reader.descend_into().unwrap();
    assert_eq!(level0.kind(), DocumentKind::Document);
    assert_eq!(level0.next().unwrap().unwrap().key, "level0");

    let mut level1 = level0.descend_into().unwrap();
    assert_eq!(level1.next().unwrap().unwrap().key, "level1");
    assert_eq!(level1.read_value().unwrap(), Value::Int32(1));
    assert!(level1.next().unwrap().is_none());
    assert!(level0.next().unwrap().is_none());

    // The outer reader has already moved past the sub-document.
    assert_eq!(reader.next().unwrap().unwrap().key, "next");
}

#[test]
fn descend_into_scalar_is_type_mismatch() {
    let bytes = nested(0);
    let mut reader = DocumentReader::new(&bytes).unwrap();
    reader.next().unwrap();

    let err = reader.descend_into().unwrap_err();
    assert!(matches!(err, Error::TypeMismatch {
        expected: ElementType::EmbeddedDocument,
        found: ElementType::Int32,
    }));
}

#[test]
fn value_without_next_is_cursor_violation() {
    let bytes = nested(0);
    let mut reader = DocumentReader::new(&bytes).unwrap();

    let err = reader.read_value().unwrap_err();
    assert!(matches!(err, Error::Cursor(CursorViolation::NoCurrentElement)));

    reader.next().unwrap();
    reader.skip_value().unwrap();
    let err = reader.skip_value().unwrap_err();
    assert!(matches!(err, Error::Cursor(CursorViolation::NoCurrentElement)));
}

#[test]
fn declared_length_beyond_buffer_is_truncated() {
    let mut bytes = nested(1);
    bytes.truncate(bytes.len() - 3);

    let err = DocumentReader::new(&bytes).unwrap_err();
    assert!(matches!(err, Error::Malformed {
        offset: 0,
        kind: MalformedKind::Truncated { .. },
    }));
}

#[test]
fn short_buffer_is_truncated() {
    let err = DocumentReader::new(&[5, 0]).unwrap_err();
    assert!(matches!(err, Error::Malformed {
        kind: MalformedKind::Truncated { needed: 4, remaining: 2 },
        ..
    }));
}

#[test]
fn missing_terminator() {
    let bytes = [5, 0, 0, 0, 1];
    let err = DocumentReader::new(&bytes).unwrap_err();
    assert!(matches!(err, Error::Malformed {
        offset: 4,
        kind: MalformedKind::MissingTerminator,
    }));
}

#[test]
fn unknown_element_type() {
    // {"a": <0x42>}
    let bytes = [8, 0, 0, 0, 0x42, b'a', 0, 0];
    let mut reader = DocumentReader::new(&bytes).unwrap();

    let err = reader.next().unwrap_err();
    assert!(matches!(err, Error::Malformed {
        offset: 4,
        kind: MalformedKind::UnknownElementType(0x42),
    }));
}

#[test]
fn inner_length_overrunning_parent_is_truncated() {
    // {"a": "<string claiming 100 bytes>"}
    let bytes = [13, 0, 0, 0, 0x02, b'a', 0, 100, 0, 0, 0, b'x', 0];
    let mut reader = DocumentReader::new(&bytes).unwrap();
    reader.next().unwrap();

    let err = reader.skip_value().unwrap_err();
    assert!(matches!(err, Error::Malformed {
        offset: 11,
        kind: MalformedKind::Truncated { needed: 100, remaining: 1 },
    }));
}

#[test]
fn error_offsets_are_absolute_in_nested_documents() {
    // {"d": {"b": <bool 7>}}
    let bytes = [
        17, 0, 0, 0, //
        0x03, b'd', 0, //
        9, 0, 0, 0, 0x08, b'b', 0, 7, 0, //
        0,
    ];
    let mut reader = DocumentReader::new(&bytes).unwrap();
    reader.next().unwrap();
    let mut inner = reader.descend_into().unwrap();
    inner.next().unwrap();

    let err = inner.read_value().unwrap_err();
    assert!(matches!(err, Error::Malformed {
        offset: 14,
        kind: MalformedKind::InvalidBoolean(7),
    }));
}

#[test]
fn value_reader_is_bounded_to_its_payload() {
    let bytes = nested(1);
    let mut reader = DocumentReader::new(&bytes).unwrap();
    reader.next().unwrap();

    let value = reader.value_reader().unwrap();
    assert_eq!(value.element_type(), ElementType::EmbeddedDocument);
    assert!(value.read_i32().is_err());

    let mut inner = value.read_document().unwrap();
    assert_eq!(inner.next().unwrap().unwrap().key, "level0");
    assert_eq!(inner.read_value().unwrap(), Value::Int32(1));

    assert_eq!(reader.next().unwrap().unwrap().key, "next");
}

#[test]
fn root_requires_exact_length() {
    let mut bytes = nested(1);
    assert!(ValueReader::root(&bytes).is_ok());

    bytes.push(0);
    let err = ValueReader::root(&bytes).unwrap_err();
    assert!(matches!(err, Error::Malformed {
        kind: MalformedKind::LengthMismatch { .. },
        ..
    }));
}

#[test]
fn seek_skips_to_key() {
    let bytes = nested(5);
    let mut reader = DocumentReader::new(&bytes).unwrap();

    let header = reader.seek("next").unwrap().unwrap();
    assert_eq!(header.element_type, ElementType::String);
    assert!(reader.seek("missing").unwrap().is_none());
}

#[test]
fn old_binary_strips_inner_length() {
    let mut writer = DocumentWriter::new();
    writer.open_document().unwrap();
    writer
        .write_element("b", Value::Binary {
            subtype: BINARY_OLD,
            bytes: &[1, 2, 3],
        })
        .unwrap();
    writer.close_document().unwrap();
    let bytes = writer.finish().unwrap();

    let mut reader = DocumentReader::new(&bytes).unwrap();
    reader.next().unwrap();
    assert_eq!(reader.read_value().unwrap(), Value::Binary {
        subtype: BINARY_OLD,
        bytes: &[1, 2, 3],
    });
}
