//! HTTP Server
//!
//! Router assembly and the serve loop with graceful shutdown.

use crate::routes;
use crate::state::AppState;
use axum::routing::{get, post};
use axum::Router;
use std::future::Future;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

/// Build the vendor-protocol router
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(routes::status))
        .route("/DYMO/DLS/Printing/Check", get(routes::status))
        .route("/DYMO/DLS/Printing/StatusConnected", get(routes::status_connected))
        .route("/DYMO/DLS/Printing/GetPrinters", get(routes::get_printers))
        .route("/DYMO/DLS/Printing/PrintLabel", post(routes::print_label))
        .fallback(routes::not_found)
        .method_not_allowed_fallback(routes::not_found)
        // Label SDKs call from arbitrary web origins
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serve `app` on `listener` until `shutdown` resolves.
///
/// In-flight requests are allowed to finish before this returns.
pub async fn serve<F>(listener: TcpListener, app: Router, shutdown: F) -> std::io::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let addr = listener.local_addr()?;
    info!(addr = %addr, "Dymo web service listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;

    info!("HTTP listener stopped");
    Ok(())
}
