//! The generic, tag-driven struct codec.
//!
//! [`StructCodec`] handles every type whose shape is [`Shape::Struct`] and
//! that has no more specific codec. For each struct type it builds a
//! [`StructDescription`] once: the fields, in declaration order, after tag
//! parsing and inline flattening. Descriptions are memoised in a concurrent
//! map, so the first encode of a type pays for reflection and later ones do
//! not.
//!
//! Encoding writes one element per public, non-skipped field, then the
//! entries of the inline map if there is one. Decoding matches keys exactly
//! first and case-insensitively second; unmatched keys go to the inline map
//! or are dropped, unless the decode is strict.

use std::{
    any::{Any, TypeId},
    borrow::Cow,
    fmt,
    hash::BuildHasherDefault,
    sync::Arc,
};

use dashmap::DashMap;
use fxhash::{FxHashMap, FxHasher};
use tessera_document::{DocumentWriter, ElementType, ValueReader};

use crate::{
    codec::{Codec, DecodeContext, EncodeContext, ValueMut, ValueRef},
    error::{Error, Result},
    reflect::{FieldAccess, Shape, TypeInfo},
    tags::{DefaultStructTagParser, StructTagParser},
};

/// Configuration captured by a [`StructCodec`].
#[derive(Debug, Clone, Copy)]
pub struct StructCodecOptions {
    /// When two fields share a key after inline flattening, keep the one
    /// nested least deeply. When `false`, any shared key is a
    /// [`Error::TagConflict`].
    pub overwrite_duplicated_inlined_fields: bool,
}

impl Default for StructCodecOptions {
    fn default() -> Self { Self { overwrite_duplicated_inlined_fields: true } }
}

impl StructCodecOptions {
    /// Sets [`overwrite_duplicated_inlined_fields`](Self::overwrite_duplicated_inlined_fields).
    #[must_use]
    pub const fn overwrite_duplicated_inlined_fields(mut self, on: bool) -> Self {
        self.overwrite_duplicated_inlined_fields = on;
        self
    }
}

/// One encoded field of a struct, possibly reached through inlined structs.
#[derive(Clone)]
pub struct FieldSpec {
    name: Cow<'static, str>,
    index: usize,
    omit_empty: bool,
    min_size: bool,
    truncate: bool,
    ty: TypeInfo,
    path: Vec<FieldAccess>,
}

impl FieldSpec {
    /// The document key.
    #[must_use]
    pub fn name(&self) -> &str { &self.name }

    /// Declaration index of the field within the struct that declares it.
    #[must_use]
    pub const fn index(&self) -> usize { self.index }

    /// Whether the field was flattened in from an inlined struct.
    #[must_use]
    pub fn is_inlined(&self) -> bool { self.path.len() > 1 }

    /// Whether the field is tagged `omitempty`.
    #[must_use]
    pub const fn omit_empty(&self) -> bool { self.omit_empty }

    /// Whether the field is tagged `minsize`.
    #[must_use]
    pub const fn min_size(&self) -> bool { self.min_size }

    /// Whether the field is tagged `truncate`.
    #[must_use]
    pub const fn truncate(&self) -> bool { self.truncate }

    /// Description of the field's type.
    #[must_use]
    pub const fn type_info(&self) -> &TypeInfo { &self.ty }

    fn depth(&self) -> usize { self.path.len() }

    fn get<'a>(&self, root: &'a dyn Any) -> Result<ValueRef<'a>> {
        Ok(ValueRef::from_parts(self.ty, walk(&self.path, root)?))
    }

    fn get_mut<'a>(&self, root: &'a mut dyn Any) -> Result<ValueMut<'a>> {
        Ok(ValueMut::from_parts(self.ty, walk_mut(&self.path, root)?))
    }
}

impl fmt::Debug for FieldSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldSpec")
            .field("name", &self.name)
            .field("index", &self.index)
            .field("depth", &self.path.len())
            .field("omit_empty", &self.omit_empty)
            .field("min_size", &self.min_size)
            .field("truncate", &self.truncate)
            .field("ty", &self.ty.name())
            .finish()
    }
}

fn walk<'a>(path: &[FieldAccess], root: &'a dyn Any) -> Result<&'a dyn Any> {
    let mut current = root;
    for access in path {
        current = (access.get)(current)
            .ok_or(Error::ValueMismatch { expected: "struct field owner" })?;
    }
    Ok(current)
}

fn walk_mut<'a>(
    path: &[FieldAccess],
    root: &'a mut dyn Any,
) -> Result<&'a mut dyn Any> {
    let mut current = root;
    for access in path {
        current = (access.get_mut)(current)
            .ok_or(Error::ValueMismatch { expected: "struct field owner" })?;
    }
    Ok(current)
}

#[derive(Clone)]
struct InlineMap {
    ty: TypeInfo,
    path: Vec<FieldAccess>,
}

/// The flattened field layout of one struct type.
#[derive(Debug)]
pub struct StructDescription {
    type_name: &'static str,
    fields: Vec<FieldSpec>,
    by_name: FxHashMap<String, usize>,
    by_folded_name: FxHashMap<String, usize>,
    private: Vec<(Cow<'static, str>, &'static str)>,
    inline_map: Option<InlineMap>,
}

impl fmt::Debug for InlineMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InlineMap").field("ty", &self.ty.name()).finish()
    }
}

impl StructDescription {
    /// The encoded fields in order.
    #[must_use]
    pub fn fields(&self) -> &[FieldSpec] { &self.fields }

    /// Whether the struct has an inline map collecting unmatched keys.
    #[must_use]
    pub const fn has_inline_map(&self) -> bool { self.inline_map.is_some() }

    /// Finds the field for a document key: exact match first, then
    /// case-insensitive.
    #[must_use]
    pub fn field(&self, key: &str) -> Option<&FieldSpec> {
        self.by_name
            .get(key)
            .or_else(|| self.by_folded_name.get(&fold_case(key)))
            .map(|&index| &self.fields[index])
    }

    fn private_field(&self, key: &str) -> Option<&'static str> {
        let folded = fold_case(key);
        self.private
            .iter()
            .find(|(name, _)| name == key || fold_case(name) == folded)
            .map(|(_, field)| *field)
    }

    fn conflict(&self, reason: impl Into<String>) -> Error {
        Error::TagConflict { type_name: self.type_name, reason: reason.into() }
    }
}

/// Case folding for the second, case-insensitive key match.
fn fold_case(key: &str) -> String { key.to_lowercase() }

/// Encodes structs as documents, one element per field.
pub struct StructCodec {
    parser: Arc<dyn StructTagParser>,
    options: StructCodecOptions,
    cache: DashMap<TypeId, Arc<StructDescription>, BuildHasherDefault<FxHasher>>,
}

impl Default for StructCodec {
    fn default() -> Self { Self::new() }
}

impl fmt::Debug for StructCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StructCodec")
            .field("options", &self.options)
            .field("cached", &self.cache.len())
            .finish_non_exhaustive()
    }
}

impl StructCodec {
    /// A codec using [`DefaultStructTagParser`] and default options.
    #[must_use]
    pub fn new() -> Self { Self::with_parser(DefaultStructTagParser) }

    /// A codec using a custom tag parser.
    #[must_use]
    pub fn with_parser(parser: impl StructTagParser) -> Self {
        Self {
            parser: Arc::new(parser),
            options: StructCodecOptions::default(),
            cache: DashMap::with_hasher(BuildHasherDefault::default()),
        }
    }

    /// Replaces the options.
    #[must_use]
    pub fn with_options(mut self, options: StructCodecOptions) -> Self {
        self.options = options;
        self
    }

    /// Returns the description of `ty`, building and caching it on first
    /// use.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TagConflict`] if the struct's tags are
    /// contradictory, or [`Error::ValueMismatch`] if `ty` is not a struct.
    pub fn describe(&self, ty: &TypeInfo) -> Result<Arc<StructDescription>> {
        let cached =
            self.cache.get(&ty.id()).map(|entry| Arc::clone(entry.value()));
        if let Some(description) = cached {
            return Ok(description);
        }

        let description = Arc::new(self.build_description(ty)?);
        tracing::trace!(
            type_name = ty.name(),
            fields = description.fields.len(),
            inline_map = description.inline_map.is_some(),
            "struct description built"
        );

        Ok(Arc::clone(
            self.cache.entry(ty.id()).or_insert(description).value(),
        ))
    }

    #[allow(clippy::too_many_lines)]
    #[tracing::instrument(
        level = "trace",
        skip_all,
        fields(type_name = ty.name())
    )]
    fn build_description(&self, ty: &TypeInfo) -> Result<StructDescription> {
        let Shape::Struct(shape) = ty.shape() else {
            return Err(Error::ValueMismatch { expected: "struct" });
        };

        let mut description = StructDescription {
            type_name: ty.name(),
            fields: Vec::new(),
            by_name: FxHashMap::default(),
            by_folded_name: FxHashMap::default(),
            private: Vec::new(),
            inline_map: None,
        };

        for (index, field) in (shape.fields)().into_iter().enumerate() {
            let tags = self.parser.parse_struct_tags(&field)?;
            if tags.skip {
                continue;
            }

            let Some(access) = field.access else {
                description.private.push((tags.name, field.name));
                continue;
            };

            if !tags.inline {
                description.fields.push(FieldSpec {
                    name: tags.name,
                    index,
                    omit_empty: tags.omit_empty,
                    min_size: tags.min_size,
                    truncate: tags.truncate,
                    ty: (access.ty)(),
                    path: vec![access],
                });
                continue;
            }

            let field_ty = (access.ty)();
            match field_ty.shape() {
                Shape::Map(_) => {
                    if description.inline_map.is_some() {
                        return Err(description.conflict(format!(
                            "field `{}` is a second inline map",
                            field.name
                        )));
                    }
                    description.inline_map =
                        Some(InlineMap { ty: field_ty, path: vec![access] });
                }
                Shape::Struct(_) => {
                    let inner = self.describe(&field_ty)?;
                    for spec in &inner.fields {
                        let mut spec = spec.clone();
                        spec.path.insert(0, access);
                        description.fields.push(spec);
                    }
                    description.private.extend(inner.private.iter().cloned());

                    if let Some(map) = &inner.inline_map {
                        if description.inline_map.is_some() {
                            return Err(description.conflict(format!(
                                "inlined field `{}` brings a second inline map",
                                field.name
                            )));
                        }
                        let mut map = map.clone();
                        map.path.insert(0, access);
                        description.inline_map = Some(map);
                    }
                }
                _ => {
                    return Err(description.conflict(format!(
                        "field `{}` is tagged inline but `{}` is neither a \
                         struct nor a map",
                        field.name,
                        field_ty.name()
                    )));
                }
            }
        }

        self.resolve_duplicates(&mut description)?;

        for (position, spec) in description.fields.iter().enumerate() {
            description.by_name.insert(spec.name.to_string(), position);
            description
                .by_folded_name
                .entry(fold_case(&spec.name))
                .or_insert(position);
        }

        Ok(description)
    }

    /// Keeps, for every key shared by several fields, only the one nested
    /// least deeply.
    fn resolve_duplicates(&self, description: &mut StructDescription) -> Result<()> {
        let mut groups: FxHashMap<&str, Vec<usize>> = FxHashMap::default();
        let mut order = Vec::new();
        for (position, spec) in description.fields.iter().enumerate() {
            let group = groups.entry(spec.name.as_ref()).or_default();
            if group.is_empty() {
                order.push(spec.name.as_ref());
            }
            group.push(position);
        }

        let mut dropped = vec![false; description.fields.len()];
        for name in order {
            let group = &groups[name];
            if group.len() < 2 {
                continue;
            }

            let shallowest = group
                .iter()
                .map(|&position| description.fields[position].depth())
                .min()
                .unwrap_or_default();
            let dominant: Vec<usize> = group
                .iter()
                .copied()
                .filter(|&position| {
                    description.fields[position].depth() == shallowest
                })
                .collect();

            if !self.options.overwrite_duplicated_inlined_fields
                || dominant.len() > 1
            {
                return Err(description.conflict(format!(
                    "duplicated key `{name}`"
                )));
            }

            for &position in group {
                if position != dominant[0] {
                    dropped[position] = true;
                }
            }
        }

        let mut position = 0;
        description.fields.retain(|_| {
            let keep = !dropped[position];
            position += 1;
            keep
        });
        Ok(())
    }
}

impl Codec for StructCodec {
    fn encode_value(
        &self,
        ctx: &EncodeContext<'_>,
        writer: &mut DocumentWriter,
        value: ValueRef<'_>,
    ) -> Result<()> {
        let description = self.describe(value.type_info())?;

        writer.open_document()?;
        for field in &description.fields {
            let field_value = field.get(value.as_any())?;
            if field.omit_empty && field_value.is_zero() {
                continue;
            }
            writer.write_key(&field.name)?;
            ctx.for_field(field.min_size).encode(writer, field_value)?;
        }

        if let Some(inline) = &description.inline_map {
            let Shape::Map(shape) = inline.ty.shape() else {
                return Err(Error::ValueMismatch { expected: "map" });
            };
            let value_ty = (shape.value)();
            let map = walk(&inline.path, value.as_any())?;

            for (key, entry) in (shape.entries)(map)? {
                if description.by_name.contains_key(key.as_ref()) {
                    return Err(description.conflict(format!(
                        "inline map key `{key}` collides with a field"
                    )));
                }
                writer.write_key(&key)?;
                ctx.encode(writer, ValueRef::from_parts(value_ty, entry))?;
            }
        }
        writer.close_document()?;

        Ok(())
    }

    fn decode_value(
        &self,
        ctx: &DecodeContext<'_>,
        reader: ValueReader<'_>,
        mut value: ValueMut<'_>,
    ) -> Result<()> {
        match reader.element_type() {
            ElementType::EmbeddedDocument => {}
            ElementType::Null | ElementType::Undefined => return Ok(()),
            found => {
                return Err(Error::TypeMismatch {
                    found,
                    target: value.type_info().name(),
                });
            }
        }

        let description = self.describe(value.type_info())?;
        let mut document = reader.read_document()?;

        while let Some(header) = document.next()? {
            let element = document.value_reader()?;

            if let Some(field) = description.field(header.key) {
                let slot = field.get_mut(value.as_any_mut())?;
                ctx.for_field(field.truncate).decode(element, slot)?;
                continue;
            }

            if let Some(inline) = &description.inline_map {
                let Shape::Map(shape) = inline.ty.shape() else {
                    return Err(Error::ValueMismatch { expected: "map" });
                };
                let value_ty = (shape.value)();
                let map = walk_mut(&inline.path, value.as_any_mut())?;
                (shape.insert_with)(map, header.key, &mut |slot: &mut dyn Any| {
                    ctx.decode(element, ValueMut::from_parts(value_ty, slot))
                })?;
                continue;
            }

            if ctx.strict() {
                if let Some(field) = description.private_field(header.key) {
                    return Err(Error::FieldAccessDenied {
                        type_name: description.type_name,
                        field,
                    });
                }
                return Err(Error::UnknownField {
                    type_name: description.type_name,
                    key: header.key.to_owned(),
                });
            }

            tracing::trace!(
                type_name = description.type_name,
                key = header.key,
                "dropping unknown key"
            );
        }

        Ok(())
    }

    fn prepare(&self, ty: &TypeInfo) -> Result<()> {
        self.describe(ty).map(|_| ())
    }
}

#[cfg(test)]
mod test;
