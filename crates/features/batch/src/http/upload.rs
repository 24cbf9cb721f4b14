use crate::error::{BatchError, BatchErrorExt};
use crate::generator::{BatchRequest, Upload};
use crate::Batch;
use axum::extract::multipart::Field;
use axum::extract::{Multipart, State};
use axum::http::{HeaderName, HeaderValue, header};
use axum::response::{IntoResponse, Response};
use axum::Json;
use docfill_derive::{api_handler, api_model};
use docfill_domain::constants::BATCH_TAG;
use docfill_kernel::safe_nanoid;
use docfill_kernel::server::{ApiState, ErrorBody};
use tracing::{debug, info};

const CATEGORY_FIELD_PREFIX: &str = "template:";

const BATCH_ID_HEADER: &str = "x-batch-id";
const DOCUMENTS_HEADER: &str = "x-documents";

/// Multipart form accepted by `POST /api/v1/batch`.
#[derive(utoipa::ToSchema)]
#[allow(dead_code)]
struct UploadForm {
    /// Word template (`.docx`)
    #[schema(value_type = String, format = Binary)]
    template: Vec<u8>,
    /// Replacements sheet (`.csv`); header cells are the tokens to replace
    #[schema(value_type = String, format = Binary)]
    replacements: Vec<u8>,
    /// Prefix of every generated file name
    base_name: Option<String>,
    /// Lower limit than the configured maximum
    max_documents: Option<usize>,
}

#[api_model]
/// Limits applied to every batch
pub(super) struct LimitsResponse {
    /// Largest number of documents generated per request
    max_documents: usize,
    /// Default file name prefix
    base_name: String,
    /// Column-name substrings left out of file names
    excluded_columns: Vec<String>,
    /// Download name of the archive
    archive_name: String,
}

#[api_handler(
    post,
    path = "/api/v1/batch",
    request_body(content = UploadForm, content_type = "multipart/form-data"),
    responses(
        (status = OK, description = "Zip archive with one document per row", content_type = "application/zip", body = Vec<u8>),
        (status = BAD_REQUEST, description = "A required file is missing", body = ErrorBody),
        (status = PAYLOAD_TOO_LARGE, description = "Upload exceeds the body limit", body = ErrorBody),
        (status = UNSUPPORTED_MEDIA_TYPE, description = "Wrong file extension", body = ErrorBody),
        (status = UNPROCESSABLE_ENTITY, description = "Unusable template, sheet or options", body = ErrorBody),
        (status = INTERNAL_SERVER_ERROR, description = "Generation failed", body = ErrorBody),
    ),
    tag = BATCH_TAG,
)]
pub(super) async fn batch_handler(
    State(state): State<ApiState>,
    multipart: Multipart,
) -> Result<Response, BatchError> {
    let batch = state.try_get_slice::<Batch>().map_err(|e| BatchError::Internal {
        message: e.to_string().into(),
        context: Some("Batch slice not registered".into()),
    })?;

    let batch_id = safe_nanoid!();
    let request = read_request(multipart).await?;
    info!(%batch_id, template = %request.template.file_name, "Batch request received");

    let outcome = batch.run(request).await?;
    let documents = outcome.report.documents.len();
    info!(
        %batch_id,
        documents,
        bytes = outcome.archive.len(),
        elapsed_ms = outcome.report.elapsed.as_millis(),
        "Batch archive ready"
    );

    let disposition = header_value(&format!("attachment; filename=\"{}\"", batch.archive_name))?;
    let batch_id = header_value(&batch_id)?;

    Ok((
        [
            (header::CONTENT_TYPE, HeaderValue::from_static("application/zip")),
            (header::CONTENT_DISPOSITION, disposition),
            (HeaderName::from_static(BATCH_ID_HEADER), batch_id),
            (HeaderName::from_static(DOCUMENTS_HEADER), HeaderValue::from(documents)),
        ],
        outcome.archive,
    )
        .into_response())
}

#[api_handler(
    get,
    path = "/api/v1/batch/limits",
    responses((status = OK, description = "Configured batch limits", body = LimitsResponse)),
    tag = BATCH_TAG,
)]
pub(super) async fn limits_handler(State(state): State<ApiState>) -> Result<Json<LimitsResponse>, BatchError> {
    let batch = state.try_get_slice::<Batch>().map_err(|e| BatchError::Internal {
        message: e.to_string().into(),
        context: Some("Batch slice not registered".into()),
    })?;

    Ok(Json(LimitsResponse {
        max_documents: batch.options.max_documents,
        base_name: batch.options.base_name.clone(),
        excluded_columns: batch.options.excluded_columns.clone(),
        archive_name: batch.archive_name.clone(),
    }))
}

async fn read_request(mut multipart: Multipart) -> Result<BatchRequest, BatchError> {
    let mut template = None;
    let mut sheet = None;
    let mut category_templates = Vec::new();
    let mut base_name = None;
    let mut max_documents = None;

    while let Some(field) = multipart.next_field().await.context("Failed to read form field")? {
        let name = field.name().unwrap_or_default().to_owned();
        match name.as_str() {
            "template" => keep_first(&mut template, read_upload(field).await?),
            "replacements" => keep_first(&mut sheet, read_upload(field).await?),
            "base_name" => base_name = Some(field.text().await.context("base_name")?),
            "max_documents" => {
                let text = field.text().await.context("max_documents")?;
                max_documents = parse_limit(&text)?;
            }
            other => match other.strip_prefix(CATEGORY_FIELD_PREFIX) {
                Some(category) if !category.trim().is_empty() => {
                    if let Some(upload) = read_upload(field).await? {
                        category_templates.push((category.trim().to_owned(), upload));
                    }
                }
                _ => debug!(field = other, "Ignoring unknown form field"),
            },
        }
    }

    let template = template.ok_or_else(|| BatchError::MissingFile {
        message: "no template uploaded".into(),
        context: Some("field 'template'".into()),
    })?;
    let sheet = sheet.ok_or_else(|| BatchError::MissingFile {
        message: "no replacements sheet uploaded".into(),
        context: Some("field 'replacements'".into()),
    })?;

    Ok(BatchRequest { template, sheet, category_templates, base_name, max_documents })
}

/// Reads a file field. Browsers send an empty, unnamed part when no file was chosen.
async fn read_upload(field: Field<'_>) -> Result<Option<Upload>, BatchError> {
    let file_name = field.file_name().unwrap_or_default().to_owned();
    let bytes = field.bytes().await.context(file_name.clone())?;

    if file_name.is_empty() && bytes.is_empty() {
        return Ok(None);
    }
    debug!(file = %file_name, size = bytes.len(), "Upload read");
    Ok(Some(Upload { file_name, bytes: bytes.to_vec() }))
}

/// A repeated file field keeps the first non-empty upload.
fn keep_first(slot: &mut Option<Upload>, upload: Option<Upload>) {
    if slot.is_none() {
        *slot = upload;
    }
}

fn header_value(value: &str) -> Result<HeaderValue, BatchError> {
    HeaderValue::from_str(value).map_err(|e| BatchError::Internal {
        message: e.to_string().into(),
        context: Some(format!("header value '{value}'").into()),
    })
}

fn parse_limit(text: &str) -> Result<Option<usize>, BatchError> {
    let text = text.trim();
    if text.is_empty() {
        return Ok(None);
    }
    match text.parse::<usize>() {
        Ok(0) | Err(_) => Err(BatchError::InvalidOptions {
            message: format!("max_documents must be a positive integer, got '{text}'").into(),
            context: None,
        }),
        Ok(limit) => Ok(Some(limit)),
    }
}
