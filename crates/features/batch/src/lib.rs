//! # Batch document generation
//!
//! Fills a Word `.docx` template once per row of a CSV replacements sheet and zips the results.
//!
//! ## Pipeline
//!
//! 1.  **Sheet ([`sheet`])**: the header row names placeholder tokens verbatim; each data row
//!     is one output document. An optional `__CATEGORY__` column picks a category template.
//! 2.  **Template ([`docx`])**: every `w:t` text node inside a run gets literal find-replace
//!     for each non-empty cell, in column order.
//! 3.  **Naming ([`naming`])**: `"{base} - {value} - …docx"` from the cells whose column is not
//!     excluded (dates, industry, reason by default), sanitized and de-duplicated.
//! 4.  **Archive ([`archive`])**: all documents in one flat zip.
//!
//! [`generator::process`] runs the whole pipeline on raw uploads. With the `server` feature the
//! [`http`] module exposes it as a multipart endpoint and [`Batch::run`] moves the work onto
//! the blocking thread pool.
//!
//! ```rust,no_run
//! use docfill_batch::{BatchOptions, TemplateSet, docx::DocxTemplate, generate, sheet::ReplacementSheet};
//!
//! # fn demo(template: &[u8], csv: &[u8]) -> Result<(), docfill_batch::BatchError> {
//! let templates = TemplateSet::new(DocxTemplate::from_bytes(template)?);
//! let sheet = ReplacementSheet::from_csv(csv)?;
//! let report = generate(&templates, sheet, &BatchOptions::default())?;
//! for doc in &report.documents {
//!     println!("{}", doc.file_name);
//! }
//! # Ok(())
//! # }
//! ```

pub mod archive;
pub mod docx;
mod error;
pub mod generator;
#[cfg(feature = "server")]
pub mod http;
pub mod naming;
pub mod sheet;

pub use crate::archive::build_archive;
pub use crate::error::{BatchError, BatchErrorExt};
pub use crate::generator::{
    BatchOptions, BatchOutcome, BatchReport, BatchRequest, GeneratedDocument, TemplateSet, Upload,
    check_extension, generate, process, unmatched_tokens,
};
use docfill_domain::config::BatchConfig;
use docfill_kernel::domain::registry::InitializedSlice;

/// Batch feature state shared with the HTTP handlers.
#[docfill_derive::docfill_slice]
pub struct Batch {
    /// Limits and naming policy from configuration.
    pub options: BatchOptions,
    /// Download name of the generated archive.
    pub archive_name: String,
}

impl Batch {
    /// Runs [`process`] on the blocking pool.
    ///
    /// # Errors
    /// Any [`BatchError`] from [`process`]; [`BatchError::Internal`] if the blocking task panics.
    #[cfg(feature = "server")]
    pub async fn run(&self, request: BatchRequest) -> Result<BatchOutcome, BatchError> {
        let options = self.options.clone();
        tokio::task::spawn_blocking(move || process(request, &options)).await.map_err(|e| {
            BatchError::Internal {
                message: e.to_string().into(),
                context: Some("Batch task failed".into()),
            }
        })?
    }
}

/// Initialize the batch feature.
///
/// # Errors
/// Returns [`BatchError::InvalidOptions`] when `max_documents` is zero.
pub fn init(config: &BatchConfig) -> Result<InitializedSlice, BatchError> {
    if config.max_documents == 0 {
        return Err(BatchError::InvalidOptions {
            message: "batch.max_documents must be at least 1".into(),
            context: Some("configuration".into()),
        });
    }

    tracing::info!(
        max_documents = config.max_documents,
        scope = ?config.scope,
        "Batch slice initialized"
    );

    Ok(InitializedSlice::new(Batch::new(
        BatchOptions::from(config),
        config.archive_name.clone(),
    )))
}
