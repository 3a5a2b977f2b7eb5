//! HTTP surface: `GET /` status and `POST /` statistics

pub mod error;

pub use error::ApiError;

use crate::{
    defaults::RUNNING_MESSAGE,
    error::{AppError, Result},
    logging::{ErrorEventLogger, Logger, RequestLogger},
    models::{StatsQuery, StatsResponse, StatusMessage, TelemetryTable},
    stats::StatsEngine,
};
use axum::{
    body::Bytes,
    extract::{rejection::BytesRejection, Request, State},
    http::{header, HeaderMap, HeaderValue, StatusCode},
    middleware::{self, Next},
    response::Response,
    routing::get,
    Extension, Json, Router,
};
use std::future::Future;
use std::sync::Arc;
use std::time::Instant;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;

/// Response header carrying the per-request correlation ID
pub const CORRELATION_HEADER: &str = "x-correlation-id";

/// Shared state handed to every handler
#[derive(Clone)]
pub struct AppState {
    engine: StatsEngine,
    requests: RequestLogger,
    errors: ErrorEventLogger,
}

impl AppState {
    /// Create state over a loaded table
    pub fn new(table: Arc<TelemetryTable>, requests: RequestLogger, errors: ErrorEventLogger) -> Self {
        Self {
            engine: StatsEngine::new(table),
            requests,
            errors,
        }
    }

    /// State whose loggers write nothing
    pub fn silent(table: Arc<TelemetryTable>) -> Self {
        Self::new(
            table,
            RequestLogger::disabled(),
            ErrorEventLogger::from_logger(Logger::disabled("ERROR")),
        )
    }
}

/// Correlation ID assigned to the current request
#[derive(Debug, Clone)]
pub struct CorrelationId(pub String);

/// Build the application router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(root).post(region_stats))
        .layer(middleware::from_fn_with_state(state.clone(), log_requests))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Serve the router on `listener` until `shutdown` resolves
pub async fn serve<F>(listener: TcpListener, state: AppState, shutdown: F) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    axum::serve(listener, create_router(state))
        .with_graceful_shutdown(shutdown)
        .await
        .map_err(|e| AppError::server(format!("HTTP server failed: {}", e)))
}

/// Resolves on Ctrl-C, or SIGTERM on unix
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if tokio::signal::ctrl_c().await.is_err() {
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(_) => std::future::pending::<()>().await,
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

async fn root() -> Json<StatusMessage> {
    Json(StatusMessage {
        message: RUNNING_MESSAGE.to_string(),
    })
}

/// Whether a `Content-Type` value names a JSON media type
fn is_json_content_type(value: &HeaderValue) -> bool {
    let Ok(value) = value.to_str() else {
        return false;
    };
    let essence = value.split(';').next().unwrap_or_default().trim().to_ascii_lowercase();
    essence == "application/json"
        || (essence.starts_with("application/") && essence.ends_with("+json"))
}

/// Decode a `POST /` body
///
/// A request without a content type (or with an empty one) is read as JSON.
/// A content type that is present and not JSON is refused with 415.
fn parse_query(headers: &HeaderMap, body: &[u8]) -> std::result::Result<StatsQuery, ApiError> {
    match headers.get(header::CONTENT_TYPE) {
        Some(value) if !value.is_empty() && !is_json_content_type(value) => Err(ApiError::new(
            StatusCode::UNSUPPORTED_MEDIA_TYPE,
            AppError::validation("Expected request with `Content-Type: application/json`"),
        )),
        _ => Ok(serde_json::from_slice(body)?),
    }
}

async fn region_stats(
    State(state): State<AppState>,
    Extension(CorrelationId(correlation_id)): Extension<CorrelationId>,
    headers: HeaderMap,
    body: std::result::Result<Bytes, BytesRejection>,
) -> std::result::Result<Json<StatsResponse>, ApiError> {
    let result = body
        .map_err(ApiError::from)
        .and_then(|body| parse_query(&headers, &body))
        .and_then(|query| {
            let regions = state.engine.compute(&query)?;
            Ok((query, regions))
        });

    match result {
        Ok((query, regions)) => {
            state.requests
                .log_query(&correlation_id, query.regions.len(), regions.len(), query.threshold_ms)
                .await;
            Ok(Json(StatsResponse { regions }))
        }
        Err(error) => {
            state.errors
                .log_error(error.error(), Some("POST /"), Some(&correlation_id))
                .await;
            Err(error)
        }
    }
}

async fn log_requests(State(state): State<AppState>, mut request: Request, next: Next) -> Response {
    let correlation_id = RequestLogger::new_correlation_id();
    let method = request.method().to_string();
    let path = request.uri().path().to_string();
    request.extensions_mut().insert(CorrelationId(correlation_id.clone()));

    let start = Instant::now();
    let mut response = next.run(request).await;

    if let Ok(value) = HeaderValue::from_str(&correlation_id) {
        response.headers_mut().insert(CORRELATION_HEADER, value);
    }

    state.requests
        .log_request(&correlation_id, &method, &path, response.status().as_u16(), start.elapsed())
        .await;

    response
}
