use proc_macro2::TokenStream;
use quote::quote;
use syn::{Ident, ItemFn, ReturnType, Type};

const PROFILES: &[&str] = &["server", "compact", "default"];

/// Expands `#[docfill_runtime::main(profile)]` into a blocking `main` that builds the named
/// runtime profile and drives the async body on it.
pub fn expand_main(args: TokenStream, input: ItemFn) -> TokenStream {
    match expand(args, input) {
        Ok(tokens) => tokens,
        Err(err) => err.to_compile_error(),
    }
}

fn expand(args: TokenStream, input: ItemFn) -> syn::Result<TokenStream> {
    let ItemFn { attrs, vis, sig, block } = input;

    if sig.asyncness.is_none() {
        return Err(syn::Error::new_spanned(sig.fn_token, "docfill_runtime::main needs an async fn"));
    }
    if !returns_result(&sig.output) {
        return Err(syn::Error::new_spanned(
            &sig.output,
            "docfill_runtime::main needs a Result return type so runtime errors can propagate",
        ));
    }

    let profile = if args.is_empty() {
        Ident::new("default", proc_macro2::Span::call_site())
    } else {
        syn::parse2::<Ident>(args)?
    };
    if !PROFILES.iter().any(|known| profile == known) {
        return Err(syn::Error::new_spanned(
            &profile,
            format!("unknown runtime profile; expected one of {}", PROFILES.join(", ")),
        ));
    }

    let name = &sig.ident;
    let output = &sig.output;

    Ok(quote! {
        #(#attrs)*
        #vis fn #name() #output {
            let runtime = ::docfill_runtime::build_runtime_with_config(
                &::docfill_runtime::RuntimeConfig::#profile(),
            )?;
            runtime.block_on(async #block)
        }
    })
}

fn returns_result(output: &ReturnType) -> bool {
    matches!(
        output,
        ReturnType::Type(_, ty)
            if matches!(&**ty, Type::Path(path) if path.path.segments.last().is_some_and(|s| s.ident == "Result"))
    )
}
