//! HTTP mapping for handler errors.
//!
//! Every failure surfaces as a bare `500 Internal Server Error`; the cause is
//! only logged.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use hitcount_core::HitCountError;
use thiserror::Error;

#[derive(Debug, Error)]
#[error(transparent)]
pub struct HttpError(#[from] pub HitCountError);

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        tracing::error!(code = self.0.client_code().as_str(), error = %self.0, "request failed");
        (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error").into_response()
    }
}
