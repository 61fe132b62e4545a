//! Struct tag parsing.
//!
//! Field behaviour is controlled by string tags attached with
//! `#[tag(doc = "...")]`. A tag value is either `-`, which skips the field,
//! or a comma-separated list whose first element is the document key (empty
//! means "use the Rust field name") followed by directives:
//!
//! - `omitempty`: skip the field when it holds its zero value;
//! - `minsize`: encode integers as int32 whenever the value fits;
//! - `truncate`: allow lossy numeric narrowing when decoding;
//! - `inline`: flatten a struct's fields into the parent, or collect
//!   unmatched keys into a map.
//!
//! Unknown directives are ignored. Parsing is pluggable through
//! [`StructTagParser`].

use std::borrow::Cow;

use crate::{error::Result, reflect::FieldInfo};

/// The tag namespace read by [`DefaultStructTagParser`].
pub const DOC_TAG: &str = "doc";

/// The fallback namespace read by [`JsonFallbackStructTagParser`].
pub const JSON_TAG: &str = "json";

/// The parsed directives of one field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldTags {
    /// The document key.
    pub name: Cow<'static, str>,
    /// Skip the field entirely.
    pub skip: bool,
    /// Omit the field when it is zero.
    pub omit_empty: bool,
    /// Encode integers as int32 when they fit.
    pub min_size: bool,
    /// Allow lossy narrowing on decode.
    pub truncate: bool,
    /// Flatten the field into its parent.
    pub inline: bool,
}

impl FieldTags {
    /// The tags of an untagged field: keyed by its Rust name, no
    /// directives.
    #[must_use]
    pub const fn untagged(field: &FieldInfo) -> Self {
        Self {
            name: Cow::Borrowed(field.name),
            skip: false,
            omit_empty: false,
            min_size: false,
            truncate: false,
            inline: false,
        }
    }

    /// Parses a tag value for `field`.
    #[must_use]
    pub fn parse(field: &FieldInfo, tag: &'static str) -> Self {
        let mut tags = Self::untagged(field);
        if tag == "-" {
            tags.skip = true;
            return tags;
        }

        let mut parts = tag.split(',');
        if let Some(name) = parts.next().filter(|name| !name.is_empty()) {
            tags.name = Cow::Borrowed(name);
        }
        for directive in parts {
            match directive.trim() {
                "omitempty" => tags.omit_empty = true,
                "minsize" => tags.min_size = true,
                "truncate" => tags.truncate = true,
                "inline" => tags.inline = true,
                _ => {}
            }
        }
        tags
    }
}

/// Turns a field's raw tags into [`FieldTags`].
pub trait StructTagParser: Send + Sync + 'static {
    /// Parses the tags of `field`.
    ///
    /// # Errors
    ///
    /// Implementations may reject malformed tags; the built-in parsers never
    /// fail.
    fn parse_struct_tags(&self, field: &FieldInfo) -> Result<FieldTags>;
}

impl<F> StructTagParser for F
where
    F: Fn(&FieldInfo) -> Result<FieldTags> + Send + Sync + 'static,
{
    fn parse_struct_tags(&self, field: &FieldInfo) -> Result<FieldTags> {
        self(field)
    }
}

/// Reads the `doc` tag namespace.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultStructTagParser;

impl StructTagParser for DefaultStructTagParser {
    fn parse_struct_tags(&self, field: &FieldInfo) -> Result<FieldTags> {
        Ok(match field.tags.get(DOC_TAG) {
            Some(tag) => FieldTags::parse(field, tag),
            None => FieldTags::untagged(field),
        })
    }
}

/// Reads the `doc` tag namespace, falling back to `json` when a field has no
/// `doc` tag.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonFallbackStructTagParser;

impl StructTagParser for JsonFallbackStructTagParser {
    fn parse_struct_tags(&self, field: &FieldInfo) -> Result<FieldTags> {
        Ok(match field.tags.get(DOC_TAG).or_else(|| field.tags.get(JSON_TAG)) {
            Some(tag) => FieldTags::parse(field, tag),
            None => FieldTags::untagged(field),
        })
    }
}

#[cfg(test)]
mod test;
