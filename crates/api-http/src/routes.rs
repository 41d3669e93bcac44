//! Route handlers for the DYMO Label Web Service protocol

use crate::error::{ApiError, ErrorPage};
use crate::state::AppState;
use crate::templates::{printers_xml, NOT_FOUND_PAGE, STATUS_PAGE};
use axum::extract::rejection::FormRejection;
use axum::extract::{Form, State};
use axum::http::header::{
    HeaderName, ACCESS_CONTROL_ALLOW_ORIGIN, CACHE_CONTROL, CONTENT_TYPE, REFERER,
};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use tracing::debug;

/// Form field carrying the document reference
pub const PDF_URL_FIELD: &str = "pdfUrl";

/// Every response carries the same header set the DYMO service sends
pub(crate) fn vendor_response(
    status: StatusCode,
    content_type: &'static str,
    body: impl Into<String>,
) -> Response {
    (
        status,
        [
            (ACCESS_CONTROL_ALLOW_ORIGIN, "*"),
            (HeaderName::from_static("charset"), "utf-8"),
            (CONTENT_TYPE, content_type),
            (CACHE_CONTROL, "max-age=0"),
        ],
        body.into(),
    )
        .into_response()
}

/// GET / and GET /DYMO/DLS/Printing/Check
pub async fn status() -> Response {
    vendor_response(StatusCode::OK, "text/html", STATUS_PAGE)
}

/// GET /DYMO/DLS/Printing/StatusConnected
pub async fn status_connected() -> Response {
    vendor_response(StatusCode::OK, "text/plain", "true")
}

/// GET /DYMO/DLS/Printing/GetPrinters
pub async fn get_printers() -> Response {
    vendor_response(StatusCode::OK, "text/xml", printers_xml())
}

/// POST /DYMO/DLS/Printing/PrintLabel
///
/// Acknowledges with an empty body as soon as the job is accepted; fetch and
/// print happen in the background.
pub async fn print_label(
    State(state): State<AppState>,
    headers: HeaderMap,
    form: Result<Form<Vec<(String, String)>>, FormRejection>,
) -> Result<Response, ErrorPage> {
    let Form(fields) =
        form.map_err(|e| ApiError::MalformedForm(e.body_text()).into_page(state.debug))?;

    // Repeated fields: first value wins
    let pdf_url = fields
        .into_iter()
        .find_map(|(key, value)| (key == PDF_URL_FIELD).then_some(value))
        .ok_or_else(|| ApiError::MissingField(PDF_URL_FIELD).into_page(state.debug))?;

    let referer = headers
        .get(REFERER)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    let job_id = state
        .service
        .submit(pdf_url, referer)
        .map_err(|e| ApiError::from(e).into_page(state.debug))?;

    debug!(job_id = %job_id, "Print request acknowledged");
    Ok(vendor_response(StatusCode::OK, "text/html", ""))
}

/// Anything else, including a known path with the wrong method
pub async fn not_found() -> Response {
    vendor_response(StatusCode::NOT_FOUND, "text/html", NOT_FOUND_PAGE)
}
