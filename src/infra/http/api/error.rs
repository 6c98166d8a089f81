use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use crate::application::error::ErrorReport;
use crate::application::store::StoreError;

#[derive(Debug, Serialize)]
pub struct ApiErrorBody {
    pub detail: String,
}

/// HTTP-facing error rendered as `{"detail": "..."}`.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    detail: String,
    report: ErrorReport,
}

impl ApiError {
    pub fn new(source: &'static str, status: StatusCode, detail: impl Into<String>) -> Self {
        let detail = detail.into();
        let report = ErrorReport::from_message(source, status, detail.clone());
        Self {
            status,
            detail,
            report,
        }
    }

    pub fn not_found(detail: &'static str) -> Self {
        Self::new("infra::http::api", StatusCode::NOT_FOUND, detail)
    }

    pub fn unprocessable(detail: impl Into<String>) -> Self {
        Self::new("infra::http::api::params", StatusCode::UNPROCESSABLE_ENTITY, detail)
    }

    /// Store failures keep their cause in the report but not in the body.
    pub fn store(source: &'static str, error: StoreError) -> Self {
        let (status, detail) = match &error {
            StoreError::Unavailable(_) => (
                StatusCode::SERVICE_UNAVAILABLE,
                "document store unavailable",
            ),
            StoreError::Status { .. } => (StatusCode::BAD_GATEWAY, "document store error"),
            StoreError::Decode { .. } => {
                (StatusCode::INTERNAL_SERVER_ERROR, "internal server error")
            }
        };
        Self {
            status,
            detail: detail.to_string(),
            report: ErrorReport::from_error(source, status, &error),
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let mut response = (self.status, Json(ApiErrorBody { detail: self.detail })).into_response();
        self.report.attach(&mut response);
        response
    }
}
