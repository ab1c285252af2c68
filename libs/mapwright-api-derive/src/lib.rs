use proc_macro::TokenStream;
use quote::quote;
use syn::{parse_macro_input, Data, DeriveInput, Fields, LitStr, Path, Type};

/// Derive macro for schema metadata.
///
/// Implements `mapwright_api::schema::Structure`:
///
/// - `NAME` — schema name (struct name unless overridden).
/// - `schema()` — fields in declaration order plus declared override chains.
/// - `register(sink)` — inserts the schema, its base and every referenced
///   schema into a `SchemaSink`.
///
/// # Example
///
/// ```ignore
/// #[derive(Structure)]
/// #[structure(serialization = person_overrides)]
/// pub struct Person {
///     pub first_name: String,
///
///     #[structure(nested)]
///     pub address: Address,
///
///     #[structure(items(Phone))]
///     pub phones: Vec<Phone>,
///
///     #[structure(skip)]
///     pub cache: Option<String>,
/// }
///
/// fn person_overrides() -> Vec<Override> { ... }
/// ```
///
/// Container attributes: `name = "..."`, `extends = Type`,
/// `serialization = path`, `deserialization = path` (functions returning
/// `Vec<Override>`).
///
/// Field attributes: `nested` (field type implements `Structure`),
/// `nested = Type`, `items(A, B, ...)`, `skip`.
#[proc_macro_derive(Structure, attributes(structure))]
pub fn derive_structure(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    match derive_impl(&input) {
        Ok(tokens) => tokens,
        Err(e) => e.to_compile_error().into(),
    }
}

fn derive_impl(input: &DeriveInput) -> Result<TokenStream, syn::Error> {
    let ident = &input.ident;

    if !input.generics.params.is_empty() {
        return Err(syn::Error::new_spanned(
            &input.generics,
            "Structure cannot be derived for generic types",
        ));
    }

    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => &fields.named,
            _ => {
                return Err(syn::Error::new_spanned(
                    ident,
                    "Structure only supports structs with named fields",
                ))
            }
        },
        _ => {
            return Err(syn::Error::new_spanned(
                ident,
                "Structure only supports structs",
            ))
        }
    };

    // Parse #[structure(...)] on the container.
    let mut name_str = ident.to_string();
    let mut extends: Option<Type> = None;
    let mut serialization: Option<Path> = None;
    let mut deserialization: Option<Path> = None;

    for attr in &input.attrs {
        if !attr.path().is_ident("structure") {
            continue;
        }
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("name") {
                let value: LitStr = meta.value()?.parse()?;
                name_str = value.value();
            } else if meta.path.is_ident("extends") {
                extends = Some(meta.value()?.parse()?);
            } else if meta.path.is_ident("serialization") {
                serialization = Some(meta.value()?.parse()?);
            } else if meta.path.is_ident("deserialization") {
                deserialization = Some(meta.value()?.parse()?);
            } else {
                return Err(meta.error("unknown structure attribute"));
            }
            Ok(())
        })?;
    }

    let mut field_tokens = Vec::new();
    let mut dependencies: Vec<proc_macro2::TokenStream> = Vec::new();

    for field in fields {
        let field_name = field.ident.as_ref().ok_or_else(|| {
            syn::Error::new_spanned(field, "expected named field")
        })?;
        let field_name_str = field_name.to_string();

        // Parse #[structure(...)] on the field.
        let mut skip = false;
        let mut nested: Option<Type> = None;
        let mut items: Option<Vec<Path>> = None;

        for attr in &field.attrs {
            if !attr.path().is_ident("structure") {
                continue;
            }
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("skip") {
                    skip = true;
                } else if meta.path.is_ident("nested") {
                    if meta.input.peek(syn::Token![=]) {
                        nested = Some(meta.value()?.parse()?);
                    } else {
                        nested = Some(field.ty.clone());
                    }
                } else if meta.path.is_ident("items") {
                    let mut paths = Vec::new();
                    meta.parse_nested_meta(|inner| {
                        paths.push(inner.path.clone());
                        Ok(())
                    })?;
                    items = Some(paths);
                } else {
                    return Err(meta.error("unknown structure field attribute"));
                }
                Ok(())
            })?;
        }

        if skip {
            continue;
        }
        if nested.is_some() && items.is_some() {
            return Err(syn::Error::new_spanned(
                field_name,
                "`nested` and `items` cannot be combined",
            ));
        }

        let kind = if let Some(ty) = nested {
            dependencies.push(quote! { #ty });
            quote! {
                ::mapwright_api::schema::FieldKind::Reference(
                    <#ty as ::mapwright_api::schema::Structure>::NAME.to_string()
                )
            }
        } else if let Some(paths) = items {
            let item_kinds: Vec<_> = paths
                .iter()
                .map(|p| {
                    quote! {
                        ::mapwright_api::schema::FieldKind::Reference(
                            <#p as ::mapwright_api::schema::Structure>::NAME.to_string()
                        )
                    }
                })
                .collect();
            dependencies.extend(paths.iter().map(|p| quote! { #p }));
            quote! {
                ::mapwright_api::schema::FieldKind::Collection(vec![#(#item_kinds),*])
            }
        } else {
            quote! { ::mapwright_api::schema::FieldKind::Plain }
        };

        field_tokens.push(quote! {
            ::mapwright_api::schema::Field::new(#field_name_str, #kind)
        });
    }

    let extends_expr = match &extends {
        Some(ty) => {
            dependencies.push(quote! { #ty });
            quote! {
                Some(<#ty as ::mapwright_api::schema::Structure>::NAME.to_string())
            }
        }
        None => quote! { None },
    };
    let serialization_expr = chain_expr(serialization.as_ref());
    let deserialization_expr = chain_expr(deserialization.as_ref());

    let expanded = quote! {
        impl ::mapwright_api::schema::Structure for #ident {
            const NAME: &'static str = #name_str;

            fn schema() -> ::mapwright_api::schema::Schema {
                ::mapwright_api::schema::Schema {
                    name: #name_str.to_string(),
                    extends: #extends_expr,
                    fields: vec![
                        #(#field_tokens),*
                    ],
                    serialization: #serialization_expr,
                    deserialization: #deserialization_expr,
                }
            }

            fn register(__sink: &mut dyn ::mapwright_api::schema::SchemaSink) {
                if __sink.contains_schema(#name_str) {
                    return;
                }
                __sink.insert_schema(<Self as ::mapwright_api::schema::Structure>::schema());
                #(<#dependencies as ::mapwright_api::schema::Structure>::register(__sink);)*
            }
        }
    };

    Ok(TokenStream::from(expanded))
}

fn chain_expr(path: Option<&Path>) -> proc_macro2::TokenStream {
    match path {
        Some(p) => quote! { #p() },
        None => quote! { ::std::vec::Vec::new() },
    }
}
