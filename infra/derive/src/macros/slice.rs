use proc_macro2::TokenStream;
use quote::{format_ident, quote};
use syn::{Fields, ItemStruct};

/// Expands `#[docfill_slice]`: the fields move into `<Name>Inner`, and `<Name>` becomes a
/// cheap `Arc` handle with a field-wise `new`, `Deref` to the state and `FeatureSlice`.
pub fn expand_slice(input: ItemStruct) -> TokenStream {
    let Fields::Named(named) = &input.fields else {
        return syn::Error::new_spanned(&input, "docfill_slice needs a struct with named fields")
            .to_compile_error();
    };

    let ItemStruct { attrs, vis, ident, fields, .. } = &input;
    let inner = format_ident!("{ident}Inner");
    let names: Vec<_> = named.named.iter().map(|field| &field.ident).collect();
    let types: Vec<_> = named.named.iter().map(|field| &field.ty).collect();

    quote! {
        #(#attrs)*
        #[derive(Debug, Clone)]
        #vis struct #inner #fields

        #[derive(Debug, Clone)]
        #vis struct #ident(std::sync::Arc<#inner>);

        impl #ident {
            #[must_use]
            #[allow(clippy::too_many_arguments)]
            pub fn new(#(#names: #types),*) -> Self {
                Self(std::sync::Arc::new(#inner { #(#names),* }))
            }
        }

        impl std::ops::Deref for #ident {
            type Target = #inner;

            fn deref(&self) -> &#inner {
                &self.0
            }
        }

        impl ::docfill_kernel::domain::registry::FeatureSlice for #ident {
            fn as_any(&self) -> &dyn std::any::Any {
                self
            }
        }
    }
}
