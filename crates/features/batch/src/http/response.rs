use crate::error::BatchError;
use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use docfill_kernel::server::ErrorBody;

impl BatchError {
    /// HTTP status reported for this error.
    #[must_use]
    pub fn status(&self) -> StatusCode {
        match self {
            Self::MissingFile { .. } => StatusCode::BAD_REQUEST,
            Self::InvalidExtension { .. } => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            Self::MalformedSheet { .. }
            | Self::EmptySheet { .. }
            | Self::InvalidTemplate { .. }
            | Self::UnknownCategory { .. }
            | Self::InvalidOptions { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Upload { source, .. } => source.status(),
            Self::Zip { .. }
            | Self::Xml { .. }
            | Self::Io { .. }
            | Self::Pattern { .. }
            | Self::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for BatchError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(kind = self.kind(), error = %self, "Batch request failed");
        } else {
            tracing::warn!(kind = self.kind(), error = %self, "Batch request rejected");
        }

        (status, Json(ErrorBody::new(self.to_string(), self.kind()))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_errors_map_to_client_statuses() {
        let missing = BatchError::MissingFile { message: "template".into(), context: None };
        assert_eq!(missing.status(), StatusCode::BAD_REQUEST);

        let extension = BatchError::InvalidExtension { message: "a.txt".into(), context: None };
        assert_eq!(extension.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);

        let sheet = BatchError::MalformedSheet { message: "ragged".into(), context: None };
        assert_eq!(sheet.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let internal = BatchError::from("boom");
        assert_eq!(internal.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
