use fxhash::FxHashSet;
use proc_macro2::{TokenStream, TokenTree};
use quote::quote;
use syn::{Attribute, ItemFn, ItemStruct};

/// What the struct already declares, so generated attributes never duplicate it.
#[derive(Default)]
struct Declared {
    derives: FxHashSet<String>,
    rename_all: bool,
    deny_unknown_fields: bool,
}

/// Expands `#[api_model]`: JSON derives, camelCase keys, strict fields and, with the
/// `server` feature, an `OpenAPI` schema.
pub fn expand_api_model(args: TokenStream, input: ItemStruct) -> TokenStream {
    if !args.is_empty() {
        return syn::Error::new_spanned(args, "api_model takes no arguments; use #[serde(...)]")
            .to_compile_error();
    }

    let declared = match declared(&input.attrs) {
        Ok(declared) => declared,
        Err(err) => return err.to_compile_error(),
    };

    let derives: Vec<TokenStream> = [
        ("Debug", quote! { Debug }),
        ("Serialize", quote! { ::serde::Serialize }),
        ("Deserialize", quote! { ::serde::Deserialize }),
    ]
    .into_iter()
    .filter(|(name, _)| !declared.derives.contains(*name))
    .map(|(_, path)| path)
    .collect();

    let derive_attr = (!derives.is_empty()).then(|| quote! { #[derive(#(#derives),*)] });
    let schema_attr = (!declared.derives.contains("ToSchema"))
        .then(|| quote! { #[cfg_attr(feature = "server", derive(::utoipa::ToSchema))] });
    let rename_attr = (!declared.rename_all).then(|| quote! { #[serde(rename_all = "camelCase")] });
    let deny_attr = (!declared.deny_unknown_fields).then(|| quote! { #[serde(deny_unknown_fields)] });

    quote! {
        #derive_attr
        #schema_attr
        #rename_attr
        #deny_attr
        #input
    }
}

/// Expands `#[api_handler]` into a handler documented by `utoipa::path` under `server`.
pub fn expand_api_handler(args: TokenStream, input: ItemFn) -> TokenStream {
    let ItemFn { attrs, vis, sig, block } = input;

    quote! {
        #(#attrs)*
        #[allow(clippy::unused_async)]
        #[cfg_attr(feature = "server", ::utoipa::path(#args))]
        #vis #sig #block
    }
}

fn declared(attrs: &[Attribute]) -> syn::Result<Declared> {
    let mut declared = Declared::default();

    for attr in attrs {
        if attr.path().is_ident("derive") {
            attr.parse_nested_meta(|meta| {
                if let Some(last) = meta.path.segments.last() {
                    declared.derives.insert(last.ident.to_string());
                }
                Ok(())
            })?;
        } else if attr.path().is_ident("serde") {
            for token in attr.meta.require_list()?.tokens.clone() {
                if let TokenTree::Ident(ident) = token {
                    declared.rename_all |= ident == "rename_all";
                    declared.deny_unknown_fields |= ident == "deny_unknown_fields";
                }
            }
        }
    }

    Ok(declared)
}
