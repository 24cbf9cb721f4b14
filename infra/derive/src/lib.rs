#![allow(unreachable_pub)]
#![allow(clippy::needless_pass_by_value)]

//! # Macros
//!
//! Procedural macros shared by the `DocFill` workspace: error enums, API DTOs and
//! handlers, feature slices, and the runtime bootstrap for binaries.
//!
//! ## Usage
//! ```toml
//! [dependencies]
//! docfill-derive = { workspace = true }
//! ```
//!
//! The examples below are `ignore`d because they need the consuming crates
//! (`docfill-runtime`, `docfill-kernel`, `utoipa`) to compile.

mod macros;

use proc_macro::TokenStream;
use syn::{DeriveInput, ItemFn, ItemStruct, parse_macro_input};

/// Attribute macro that turns `async fn main` into a blocking `fn main` running on a
/// `docfill_runtime` profile.
///
/// # Arguments
///
/// * `server` - Multithreaded profile for the HTTP server.
/// * `compact` - Small footprint profile for command line tools.
/// * `default` - Worker threads auto-detected from available parallelism.
///
/// # Examples
///
/// ```rust,ignore
/// #[docfill_runtime::main(server)]
/// async fn main() -> anyhow::Result<()> {
/// # Ok(())
/// }
/// ```
#[proc_macro_attribute]
pub fn main(args: TokenStream, item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as ItemFn);
    macros::runtime::expand_main(args.into(), input).into()
}

/// Attribute macro for API data transfer objects.
///
/// * **Derives**: adds `Debug`, `Serialize` and `Deserialize` if missing.
/// * **`OpenAPI`**: adds `utoipa::ToSchema` when the consuming crate's `server` feature is on.
/// * **Serde policy**: `rename_all = "camelCase"` and `deny_unknown_fields`, unless the struct
///   already carries its own `#[serde(...)]` for them. The macro takes no arguments.
///
/// # Example
///
/// ```rust,ignore
/// use docfill_derive::api_model;
///
/// #[api_model]
/// pub struct ErrorBody {
///     pub error: String,
///     pub kind: String,
/// }
/// ```
#[proc_macro_attribute]
pub fn api_model(attr: TokenStream, item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as ItemStruct);
    macros::api::expand_api_model(attr.into(), input).into()
}

/// Attribute macro bridging Axum handlers with `utoipa::path`.
///
/// Accepts the usual `utoipa::path` arguments. The path attribute is only emitted when
/// the consuming crate enables its `server` feature.
///
/// # Example
///
/// ```rust,ignore
/// use docfill_derive::api_handler;
///
/// #[api_handler(
///     post,
///     path = "/api/v1/batch",
///     responses((status = OK, content_type = "application/zip")),
///     tag = "Batch"
/// )]
/// pub async fn batch_handler() -> impl IntoResponse {
///     // ...
/// }
/// ```
#[proc_macro_attribute]
pub fn api_handler(args: TokenStream, item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as ItemFn);
    macros::api::expand_api_handler(args.into(), input).into()
}

/// Attribute macro for crate error enums.
///
/// # Features
///
/// * **Derives**: injects `#[derive(Debug, thiserror::Error)]` when missing.
/// * **Context**: generates a companion `<Name>Ext` trait adding `.context(...)` to
///   `Result<T, Name>` and to `Result<T, Source>` for every variant with a source field.
/// * **Conversions**: `From<Source>` for each variant holding a `source` (or `#[source]` /
///   `#[from]`) field, so `?` works on upstream errors.
/// * **Internal fallback**: `From<&'static str>` and `From<String>` when an `Internal`
///   variant exists.
/// * **Kind**: a `const fn kind(&self) -> &'static str` returning the `snake_case`
///   variant name.
///
/// # Requirements
///
/// 1. Applied to an **enum** with named-field variants only.
/// 2. Variants with a source must also carry `context: Option<Cow<'static, str>>`.
///
/// # Example
///
/// ```rust,ignore
/// use docfill_derive::docfill_error;
/// use std::borrow::Cow;
///
/// #[docfill_error]
/// pub enum ArchiveError {
///     #[error("Zip failure{}: {source}", format_context(.context))]
///     Zip { source: zip::result::ZipError, context: Option<Cow<'static, str>> },
///
///     #[error("Internal fault{}: {message}", format_context(.context))]
///     Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
/// }
///
/// fn finish(writer: zip::ZipWriter<Cursor<Vec<u8>>>) -> Result<Vec<u8>, ArchiveError> {
///     Ok(writer.finish().context("Finalizing archive")?.into_inner())
/// }
/// ```
#[proc_macro_attribute]
pub fn docfill_error(_args: TokenStream, item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as DeriveInput);
    macros::error::expand_derive(input).into()
}

/// Attribute macro defining a feature slice handle.
///
/// The fields move into a `<Name>Inner` struct; `<Name>` becomes an `Arc` handle with a
/// constructor taking the fields in order, `Deref` to the state, and `FeatureSlice` so it
/// can be registered in the API state.
///
/// # Example
/// ```rust,ignore
/// #[docfill_derive::docfill_slice]
/// pub struct Batch {
///     pub options: BatchOptions,
///     pub archive_name: String,
/// }
///
/// let slice = Batch::new(BatchOptions::default(), "generated_documents.zip".to_owned());
/// assert_eq!(slice.archive_name, "generated_documents.zip");
/// ```
#[proc_macro_attribute]
pub fn docfill_slice(_attr: TokenStream, item: TokenStream) -> TokenStream {
    let input = syn::parse_macro_input!(item as ItemStruct);
    macros::slice::expand_slice(input).into()
}
