//! Well-known names used across the workspace.

/// `OpenAPI` tag for operational endpoints.
pub const SYSTEM_TAG: &str = "System";
/// `OpenAPI` tag for document generation endpoints.
pub const BATCH_TAG: &str = "Batch";

/// Required extension of the template document.
pub const TEMPLATE_EXTENSION: &str = "docx";
/// Required extension of the replacements sheet.
pub const SHEET_EXTENSION: &str = "csv";

/// Sheet column that selects a category template instead of naming a token.
pub const CATEGORY_COLUMN: &str = "__CATEGORY__";

/// Column-name substrings whose values never appear in output file names.
pub const DEFAULT_EXCLUDED_COLUMNS: &[&str] = &["date", "industry", "reason", "__category__"];

pub const DEFAULT_MAX_DOCUMENTS: usize = 25;
pub const DEFAULT_BASE_NAME: &str = "document";
pub const DEFAULT_ARCHIVE_NAME: &str = "generated_documents.zip";

/// Prefix for environment overrides, e.g. `DOCFILL__SERVER__PORT`.
pub const ENV_PREFIX: &str = "DOCFILL";
