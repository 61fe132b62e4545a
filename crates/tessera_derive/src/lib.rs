//! Derive macro for the `Reflect` trait.
//!
//! This crate provides `#[derive(Reflect)]` for the `tessera` crate. The
//! derived implementation describes a struct's fields, their raw tags and
//! their visibility, which is everything the generic struct codec needs.
//!
//! # Supported Types
//!
//! Only structs with named fields. Tuple structs, unit structs, enums and
//! unions are rejected; give them a hand-written codec instead.
//!
//! # Field Attributes
//!
//! ## `#[tag(namespace = "value", ...)]`
//!
//! Attaches raw tags to a field. The default tag parser reads the `doc`
//! namespace; the JSON-fallback parser also reads `json`:
//!
//! ```ignore
//! use tessera::Reflect;
//!
//! #[derive(Reflect, Default)]
//! pub struct Person {
//!     #[tag(doc = "name,omitempty", json = "full_name")]
//!     pub name: String,
//!     #[tag(doc = "age,minsize")]
//!     pub age: i64,
//! }
//! ```
//!
//! Fields that are not `pub` are listed without accessors and never
//! encoded; their types need not implement `Reflect`.
//!
//! # Container Attributes
//!
//! ## `#[reflect(capability = "name")]`
//!
//! Declares that the type satisfies a named capability, so a codec
//! registered for that capability handles it. May be repeated.
//!
//! ## `#[reflect(marshal_value)]`
//!
//! Routes the type through its `MarshalValue`/`UnmarshalValue`
//! implementations instead of the struct codec.

use proc_macro::TokenStream;
use quote::quote;
use syn::{
    Data, DeriveInput, Field, Fields, LitStr, Visibility, ext::IdentExt,
    parse_macro_input,
};

/// Container options collected from `#[reflect(...)]`.
#[derive(Default)]
struct ContainerOptions {
    capabilities: Vec<LitStr>,
    marshal_value: bool,
}

fn parse_container(input: &DeriveInput) -> syn::Result<ContainerOptions> {
    let mut options = ContainerOptions::default();
    for attr in &input.attrs {
        if !attr.path().is_ident("reflect") {
            continue;
        }
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("capability") {
                options.capabilities.push(meta.value()?.parse()?);
                Ok(())
            } else if meta.path.is_ident("marshal_value") {
                options.marshal_value = true;
                Ok(())
            } else {
                Err(meta.error("unknown reflect attribute"))
            }
        })?;
    }
    Ok(options)
}

/// Collects the `(namespace, value)` pairs of every `#[tag(...)]` on a
/// field, in order.
fn parse_tags(field: &Field) -> syn::Result<Vec<(String, LitStr)>> {
    let mut tags = Vec::new();
    for attr in &field.attrs {
        if !attr.path().is_ident("tag") {
            continue;
        }
        attr.parse_nested_meta(|meta| {
            let namespace = meta
                .path
                .get_ident()
                .ok_or_else(|| meta.error("expected a tag namespace"))?
                .unraw()
                .to_string();
            let value: LitStr = meta.value()?.parse()?;
            tags.push((namespace, value));
            Ok(())
        })?;
    }
    Ok(tags)
}

/// Derive macro for `Reflect`.
///
/// The generated `type_info` lists every field in declaration order. Public
/// fields carry accessors and contribute to `is_zero`, which holds when
/// every public field is zero.
///
/// Type parameters are bounded by `Reflect`, and so is the type of every
/// public field.
#[proc_macro_derive(Reflect, attributes(tag, reflect))]
pub fn derive_reflect(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    match expand(&input) {
        Ok(tokens) => TokenStream::from(tokens),
        Err(error) => TokenStream::from(error.to_compile_error()),
    }
}

fn expand(input: &DeriveInput) -> syn::Result<proc_macro2::TokenStream> {
    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => &fields.named,
            Fields::Unnamed(_) | Fields::Unit => {
                return Err(syn::Error::new_spanned(
                    input,
                    "Reflect can only be derived for structs with named \
                     fields",
                ));
            }
        },
        Data::Enum(_) | Data::Union(_) => {
            return Err(syn::Error::new_spanned(
                input,
                "Reflect can only be derived for structs with named fields",
            ));
        }
    };

    let options = parse_container(input)?;
    let name = &input.ident;
    let (impl_generics, ty_generics, where_clause) =
        input.generics.split_for_impl();

    let mut where_clause =
        where_clause.cloned().unwrap_or_else(|| syn::parse_quote!(where));
    let generic = input.generics.type_params().next().is_some();
    for param in input.generics.type_params() {
        let ident = &param.ident;
        where_clause
            .predicates
            .push(syn::parse_quote!(#ident: ::tessera::Reflect));
    }

    let mut field_infos = Vec::new();
    let mut zero_checks = Vec::new();
    for field in fields {
        let Some(ident) = &field.ident else { continue };
        let field_name = ident.unraw().to_string();
        let ty = &field.ty;
        let tags = parse_tags(field)?.into_iter().map(|(namespace, value)| {
            quote! { (#namespace, #value) }
        });

        let exported = matches!(field.vis, Visibility::Public(_));
        let access = if exported {
            if generic {
                where_clause
                    .predicates
                    .push(syn::parse_quote!(#ty: ::tessera::Reflect));
            }
            zero_checks.push(quote! {
                && ::tessera::Reflect::is_zero(&self.#ident)
            });
            quote! {
                ::std::option::Option::Some(::tessera::reflect::FieldAccess {
                    ty: <#ty as ::tessera::Reflect>::type_info,
                    get: |value| {
                        value
                            .downcast_ref::<Self>()
                            .map(|this| &this.#ident as &dyn ::std::any::Any)
                    },
                    get_mut: |value| {
                        value
                            .downcast_mut::<Self>()
                            .map(|this| &mut this.#ident as &mut dyn ::std::any::Any)
                    },
                })
            }
        } else {
            quote! { ::std::option::Option::None }
        };

        field_infos.push(quote! {
            ::tessera::reflect::FieldInfo {
                name: #field_name,
                tags: ::tessera::reflect::StructTag::new(&[#(#tags),*]),
                exported: #exported,
                access: #access,
            }
        });
    }

    let capabilities = &options.capabilities;
    let with_capabilities = (!capabilities.is_empty()).then(|| {
        quote! { .with_capabilities(&[#(#capabilities),*]) }
    });
    let with_value_hooks = options.marshal_value.then(|| {
        quote! {
            .with_value_hooks(::tessera::capability::ValueHooks::of::<Self>())
        }
    });

    Ok(quote! {
        #[allow(clippy::trait_duplication_in_bounds)]
        impl #impl_generics ::tessera::Reflect for #name #ty_generics #where_clause {
            fn type_info() -> ::tessera::reflect::TypeInfo {
                ::tessera::reflect::TypeInfo::new::<Self>(
                    ::tessera::reflect::Shape::Struct(
                        ::tessera::reflect::StructShape {
                            fields: || ::std::vec![#(#field_infos),*],
                        },
                    ),
                )
                #with_capabilities
                #with_value_hooks
            }

            fn is_zero(&self) -> bool {
                true #(#zero_checks)*
            }
        }
    })
}
