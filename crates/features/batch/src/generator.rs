//! Batch generation: one rendered document per sheet row.

use crate::archive::build_archive;
use crate::docx::{DocxTemplate, Substitution};
use crate::error::BatchError;
use crate::naming::{UniqueNames, output_file_name};
use crate::sheet::ReplacementSheet;
use docfill_domain::config::{BatchConfig, ReplaceScope};
use docfill_domain::constants::{SHEET_EXTENSION, TEMPLATE_EXTENSION};
use fxhash::FxHashMap;
use std::path::Path;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Per-batch generation settings.
#[derive(Debug, Clone)]
pub struct BatchOptions {
    pub max_documents: usize,
    pub base_name: String,
    pub excluded_columns: Vec<String>,
    pub scope: ReplaceScope,
}

impl From<&BatchConfig> for BatchOptions {
    fn from(config: &BatchConfig) -> Self {
        Self {
            max_documents: config.max_documents,
            base_name: config.base_name.clone(),
            excluded_columns: config.excluded_columns.clone(),
            scope: config.scope,
        }
    }
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self::from(&BatchConfig::default())
    }
}

impl BatchOptions {
    /// Applies request overrides. A requested limit can only lower the configured one;
    /// a blank base name keeps the configured one.
    #[must_use]
    pub fn with_overrides(&self, base_name: Option<&str>, max_documents: Option<usize>) -> Self {
        let mut options = self.clone();
        if let Some(base) = base_name.map(str::trim).filter(|b| !b.is_empty()) {
            base.clone_into(&mut options.base_name);
        }
        if let Some(max) = max_documents {
            options.max_documents = max.min(self.max_documents);
        }
        options
    }
}

/// Default template plus optional per-category templates.
#[derive(Debug, Clone)]
pub struct TemplateSet {
    default: DocxTemplate,
    categories: FxHashMap<String, DocxTemplate>,
}

impl TemplateSet {
    #[must_use]
    pub fn new(default: DocxTemplate) -> Self {
        Self { default, categories: FxHashMap::default() }
    }

    /// Registers a category template. Category names match case-insensitively.
    #[must_use]
    pub fn with_category(mut self, category: &str, template: DocxTemplate) -> Self {
        self.categories.insert(category.trim().to_lowercase(), template);
        self
    }

    #[must_use]
    pub fn default_template(&self) -> &DocxTemplate {
        &self.default
    }

    /// Picks the template for a row.
    ///
    /// # Errors
    /// [`BatchError::UnknownCategory`] when `category` has no registered template.
    pub fn select(&self, category: Option<&str>) -> Result<&DocxTemplate, BatchError> {
        let Some(category) = category else {
            return Ok(&self.default);
        };
        self.categories.get(&category.trim().to_lowercase()).ok_or_else(|| {
            BatchError::UnknownCategory {
                message: format!("no template uploaded for category '{category}'").into(),
                context: None,
            }
        })
    }
}

/// One generated `.docx`.
#[derive(Debug, Clone)]
pub struct GeneratedDocument {
    /// Zero-based sheet row.
    pub index: usize,
    pub file_name: String,
    pub bytes: Vec<u8>,
    /// `(token, value)` pairs applied to this document.
    pub replacements: Vec<(String, String)>,
}

#[derive(Debug, Clone)]
pub struct BatchReport {
    pub documents: Vec<GeneratedDocument>,
    /// Sheet rows beyond `max_documents` that were not generated.
    pub skipped_rows: usize,
    pub elapsed: Duration,
}

/// Checks `file_name` ends with `.{expected}`, ignoring case.
///
/// # Errors
/// [`BatchError::InvalidExtension`] otherwise.
pub fn check_extension(file_name: &str, expected: &str) -> Result<(), BatchError> {
    let matches = Path::new(file_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case(expected));

    if matches {
        Ok(())
    } else {
        Err(BatchError::InvalidExtension {
            message: format!("'{file_name}' is not a .{expected} file").into(),
            context: None,
        })
    }
}

/// Tokens that no template selected by the sheet's rows contains inside a single run.
///
/// # Errors
/// [`BatchError::UnknownCategory`] for rows naming an unregistered category, and
/// [`BatchError::Xml`] for unparsable parts.
pub fn unmatched_tokens<'a>(
    templates: &TemplateSet,
    sheet: &'a ReplacementSheet,
    scope: ReplaceScope,
) -> Result<Vec<&'a str>, BatchError> {
    let mut selected = Vec::new();
    if sheet.rows().iter().any(|row| row.category.is_none()) {
        selected.push(templates.default_template());
    }
    for category in sheet.categories() {
        selected.push(templates.select(Some(category))?);
    }

    let mut unmatched = Vec::new();
    'tokens: for token in sheet.tokens() {
        for template in &selected {
            if template.count_occurrences(token, scope)? > 0 {
                continue 'tokens;
            }
        }
        unmatched.push(token.as_str());
    }
    Ok(unmatched)
}

/// Renders one document per row of `sheet`, up to `options.max_documents`.
///
/// # Errors
/// [`BatchError::InvalidOptions`] when `max_documents` is zero,
/// [`BatchError::UnknownCategory`] for rows naming an unregistered category, and any
/// rendering error.
pub fn generate(
    templates: &TemplateSet,
    mut sheet: ReplacementSheet,
    options: &BatchOptions,
) -> Result<BatchReport, BatchError> {
    if options.max_documents == 0 {
        return Err(BatchError::InvalidOptions {
            message: "max_documents must be at least 1".into(),
            context: None,
        });
    }

    let started = Instant::now();
    let skipped_rows = sheet.truncate(options.max_documents);
    if skipped_rows > 0 {
        warn!(skipped_rows, limit = options.max_documents, "Sheet exceeds document limit");
    }

    for token in unmatched_tokens(templates, &sheet, options.scope)? {
        warn!(%token, "Token not found in any single run of the selected templates");
    }

    let mut names = UniqueNames::new();
    let mut documents = Vec::with_capacity(sheet.len());

    for row in sheet.rows() {
        let template = templates.select(row.category.as_deref())?;

        debug!(row = row.index, "Creating replacements");
        let mut substitutions = Vec::with_capacity(row.cells.len());
        for cell in &row.cells {
            debug!("  {} -> {}", cell.token, cell.value);
            substitutions.push(Substitution::new(cell.token.as_str(), cell.value.as_str())?);
        }

        let rendered = template.render(&substitutions, options.scope)?;
        let file_name =
            names.claim(&output_file_name(&options.base_name, row, &options.excluded_columns));
        info!(row = row.index, file = %file_name, hits = rendered.total_hits(), "Document saved");

        documents.push(GeneratedDocument {
            index: row.index,
            file_name,
            bytes: rendered.bytes,
            replacements: row.cells.iter().map(|c| (c.token.clone(), c.value.clone())).collect(),
        });
    }

    let elapsed = started.elapsed();
    info!(documents = documents.len(), elapsed_ms = elapsed.as_millis(), "Batch finished");

    Ok(BatchReport { documents, skipped_rows, elapsed })
}

/// An uploaded file as received.
#[derive(Debug, Clone)]
pub struct Upload {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

/// Everything one batch needs, before validation.
#[derive(Debug, Clone)]
pub struct BatchRequest {
    pub template: Upload,
    pub sheet: Upload,
    /// `(category, template)` pairs.
    pub category_templates: Vec<(String, Upload)>,
    pub base_name: Option<String>,
    pub max_documents: Option<usize>,
}

#[derive(Debug, Clone)]
pub struct BatchOutcome {
    pub report: BatchReport,
    /// Zip of every generated document.
    pub archive: Vec<u8>,
}

/// Validates the uploads, generates the documents and archives them.
///
/// # Errors
/// Any [`BatchError`] from validation, generation or archiving.
pub fn process(request: BatchRequest, options: &BatchOptions) -> Result<BatchOutcome, BatchError> {
    check_extension(&request.template.file_name, TEMPLATE_EXTENSION)?;
    check_extension(&request.sheet.file_name, SHEET_EXTENSION)?;

    let mut templates = TemplateSet::new(DocxTemplate::from_bytes(&request.template.bytes)?);
    for (category, upload) in &request.category_templates {
        check_extension(&upload.file_name, TEMPLATE_EXTENSION)?;
        templates = templates.with_category(category, DocxTemplate::from_bytes(&upload.bytes)?);
    }

    let sheet = ReplacementSheet::from_csv(&request.sheet.bytes)?;
    let options = options.with_overrides(request.base_name.as_deref(), request.max_documents);

    info!(
        template = %request.template.file_name,
        sheet = %request.sheet.file_name,
        rows = sheet.len(),
        categories = request.category_templates.len(),
        "Starting batch"
    );

    let report = generate(&templates, sheet, &options)?;
    let archive = build_archive(&report.documents)?;
    Ok(BatchOutcome { report, archive })
}
