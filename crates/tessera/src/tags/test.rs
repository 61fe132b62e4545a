use super::*;
use crate::reflect::StructTag;

fn field(tags: &'static [(&'static str, &'static str)]) -> FieldInfo {
    FieldInfo {
        name: "user_name",
        tags: StructTag::new(tags),
        exported: true,
        access: None,
    }
}

#[test]
fn untagged_field_uses_rust_name() {
    let tags = DefaultStructTagParser.parse_struct_tags(&field(&[])).unwrap();

    assert_eq!(tags, FieldTags::untagged(&field(&[])));
    assert_eq!(tags.name, "user_name");
}

#[test]
fn dash_skips() {
    let tags =
        DefaultStructTagParser.parse_struct_tags(&field(&[("doc", "-")])).unwrap();
    assert!(tags.skip);
}

#[test]
fn name_and_directives() {
    let tags = DefaultStructTagParser
        .parse_struct_tags(&field(&[("doc", "user,omitempty,minsize,truncate")]))
        .unwrap();

    assert_eq!(tags.name, "user");
    assert!(tags.omit_empty);
    assert!(tags.min_size);
    assert!(tags.truncate);
    assert!(!tags.inline);
    assert!(!tags.skip);
}

#[test]
fn empty_name_keeps_rust_name() {
    let tags = DefaultStructTagParser
        .parse_struct_tags(&field(&[("doc", ",inline")]))
        .unwrap();

    assert_eq!(tags.name, "user_name");
    assert!(tags.inline);
}

#[test]
fn unknown_directives_are_ignored() {
    let tags = DefaultStructTagParser
        .parse_struct_tags(&field(&[("doc", "n,sparkly,omitempty")]))
        .unwrap();

    assert_eq!(tags.name, "n");
    assert!(tags.omit_empty);
}

#[test]
fn default_parser_ignores_json() {
    let tags = DefaultStructTagParser
        .parse_struct_tags(&field(&[("json", "from_json")]))
        .unwrap();
    assert_eq!(tags.name, "user_name");
}

#[test]
fn json_fallback() {
    let parser = JsonFallbackStructTagParser;

    let tags = parser.parse_struct_tags(&field(&[("json", "from_json")])).unwrap();
    assert_eq!(tags.name, "from_json");

    let tags = parser
        .parse_struct_tags(&field(&[("json", "from_json"), ("doc", "from_doc")]))
        .unwrap();
    assert_eq!(tags.name, "from_doc");
}

#[test]
fn closures_are_parsers() {
    let upper = |field: &FieldInfo| -> Result<FieldTags> {
        let mut tags = FieldTags::untagged(field);
        tags.name = Cow::Owned(field.name.to_uppercase());
        Ok(tags)
    };

    let tags = upper.parse_struct_tags(&field(&[])).unwrap();
    assert_eq!(tags.name, "USER_NAME");
}
