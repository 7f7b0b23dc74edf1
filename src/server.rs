//! HTTP trigger surface for the scan pipeline.
//!
//! One real route: `POST /scan-insurance-document`. CORS is permissive by
//! policy (wildcard origin) with the headers browser-originated upload
//! flows send (`authorization`, `x-client-info`, `apikey`,
//! `content-type`); the preflight OPTIONS request is answered by the CORS
//! layer before routing. `GET /health` answers liveness probes.
//!
//! Recoverable review outcomes answer 200 like full successes; only fatal
//! pipeline errors produce the `{"success":false}` envelope, with the HTTP
//! status taken from [`crate::error::ScanError::http_status`].

use std::net::SocketAddr;
use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{header, HeaderName, Method, StatusCode};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::json;
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

use crate::record::{ScanRequest, ScanResponse};
use crate::scan::Scanner;

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppContext {
    pub scanner: Arc<Scanner>,
}

/// Build the service router with the CORS layer attached.
pub fn router(ctx: AppContext) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::POST, Method::OPTIONS])
        .allow_headers([
            header::AUTHORIZATION,
            header::CONTENT_TYPE,
            HeaderName::from_static("x-client-info"),
            HeaderName::from_static("apikey"),
        ]);

    Router::new()
        .route("/scan-insurance-document", post(scan_document))
        .route("/health", get(health))
        .with_state(ctx)
        .layer(cors)
}

/// Bind and serve until the process is stopped.
pub async fn serve(ctx: AppContext, addr: SocketAddr) -> std::io::Result<()> {
    let app = router(ctx);
    info!("Starting HTTP server on {addr}");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await
}

/// `POST /scan-insurance-document`
///
/// Body decoding is manual so a malformed JSON body still answers in the
/// envelope shape instead of a bare extractor rejection.
async fn scan_document(
    State(ctx): State<AppContext>,
    body: Bytes,
) -> (StatusCode, Json<ScanResponse>) {
    let request: ScanRequest = match serde_json::from_slice(&body) {
        Ok(request) => request,
        Err(err) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(ScanResponse::fail(format!("Invalid request body: {err}"))),
            );
        }
    };

    match ctx.scanner.scan(request).await {
        Ok(data) => (StatusCode::OK, Json(ScanResponse::ok(data))),
        Err(err) => {
            let status = StatusCode::from_u16(err.http_status())
                .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
            (status, Json(ScanResponse::fail(err.to_string())))
        }
    }
}

/// `GET /health`
async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}
