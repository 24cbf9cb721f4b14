use super::ApiState;
use axum::extract::State;
use axum::http::header;
use axum::{Json, response::IntoResponse};
use docfill_derive::{api_handler, api_model};
use docfill_domain::constants::SYSTEM_TAG;
use std::sync::LazyLock;
use std::time::Instant;

#[api_model]
/// Service status plus the limits a client needs before uploading.
struct HealthResponse {
    status: &'static str,
    version: &'static str,
    /// Seconds since the first request reached the handler
    uptime: u64,
    /// Registered feature slices, by type name without the module path
    features: Vec<String>,
    /// Largest sheet (in data rows) a batch request may carry
    max_documents: usize,
    /// Largest accepted request body in bytes
    body_limit_bytes: usize,
}

static START_TIME: LazyLock<Instant> = LazyLock::new(Instant::now);

fn short_name(type_name: &str) -> String {
    type_name.rsplit("::").next().unwrap_or(type_name).to_owned()
}

#[api_handler(
    get,
    path = "/health",
    responses((status = OK, description = "Service is up", body = HealthResponse)),
    tag = SYSTEM_TAG,
)]
pub(super) async fn health_handler(State(state): State<ApiState>) -> impl IntoResponse {
    let mut features: Vec<String> = state.slice_names().map(short_name).collect();
    features.sort_unstable();

    let body = HealthResponse {
        status: "up",
        version: env!("CARGO_PKG_VERSION"),
        uptime: START_TIME.elapsed().as_secs(),
        features,
        max_documents: state.config.batch.max_documents,
        body_limit_bytes: state.config.server.body_limit_bytes,
    };

    ([(header::CACHE_CONTROL, "no-store")], Json(body))
}
