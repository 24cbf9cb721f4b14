//! HTTP surface of the batch feature: the upload form and the multipart batch endpoint.

mod form;
mod response;
mod upload;

use axum::routing::get;
use docfill_kernel::server::ApiState;
use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

/// Batch routes, documented under the `Batch` tag.
pub fn router() -> OpenApiRouter<ApiState> {
    OpenApiRouter::new()
        .route("/", get(form::index_handler))
        .routes(routes!(upload::batch_handler))
        .routes(routes!(upload::limits_handler))
}
