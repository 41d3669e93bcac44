//! HTTP Error Types
//!
//! Every failure is answered with the vendor exception page (HTTP 500), the
//! same way the DYMO service reports unexpected conditions. A service that
//! is shutting down answers 503.

use crate::routes::vendor_response;
use crate::templates::{exception_page_with_detail, EXCEPTION_PAGE};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use dymo_core::error::AppError;
use tracing::error;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("missing form field '{0}'")]
    MissingField(&'static str),

    #[error("malformed form body: {0}")]
    MalformedForm(String),

    #[error(transparent)]
    App(#[from] AppError),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::App(AppError::Unavailable(_)) => StatusCode::SERVICE_UNAVAILABLE,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Attach the rendering mode
    pub fn into_page(self, debug: bool) -> ErrorPage {
        ErrorPage { error: self, debug }
    }
}

/// An [`ApiError`] rendered as the vendor exception page
#[derive(Debug)]
pub struct ErrorPage {
    error: ApiError,
    debug: bool,
}

impl IntoResponse for ErrorPage {
    fn into_response(self) -> Response {
        let status = self.error.status();
        error!(status = status.as_u16(), error = %self.error, "Request failed");

        let body = if self.debug {
            exception_page_with_detail(&self.error.to_string())
        } else {
            EXCEPTION_PAGE.to_string()
        };

        vendor_response(status, "text/html", body)
    }
}
