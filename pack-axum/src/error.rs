use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use pack_core::errors::PackError;

#[derive(Debug)]
pub struct PackAxumError(pub anyhow::Error);

impl From<anyhow::Error> for PackAxumError {
    fn from(e: anyhow::Error) -> Self {
        Self(e)
    }
}

impl From<PackError> for PackAxumError {
    fn from(e: PackError) -> Self {
        Self(e.into_anyhow())
    }
}

impl IntoResponse for PackAxumError {
    fn into_response(self) -> Response {
        // Keep the structured fields of a PackError, even under anyhow context.
        let safe = match PackError::from_anyhow(&self.0) {
            Some(pack) => pack.sanitize_for_client(),
            None => PackError::general_error(self.0.to_string()),
        };

        let status = StatusCode::from_u16(safe.code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        if status.is_server_error() {
            tracing::error!(error = ?self.0, "request failed");
        }

        (status, Json(safe.to_json())).into_response()
    }
}
