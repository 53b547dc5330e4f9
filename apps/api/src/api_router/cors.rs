use axum::http::header::CONTENT_TYPE;
use axum::http::{HeaderValue, Method};
use tierscope_core::AppError;
use tower_http::cors::CorsLayer;

/// Methods routed by the API; anything else never reaches a handler.
const ALLOWED_METHODS: [Method; 4] = [Method::GET, Method::POST, Method::PUT, Method::OPTIONS];

/// Credentialed CORS for the single configured frontend origin.
pub(super) fn build_cors_layer(frontend_url: &str) -> Result<CorsLayer, AppError> {
    Ok(CorsLayer::new()
        .allow_origin(frontend_origin(frontend_url)?)
        .allow_credentials(true)
        .allow_methods(ALLOWED_METHODS)
        .allow_headers([CONTENT_TYPE]))
}

/// Browser `Origin` headers carry no path, so a trailing slash is dropped.
fn frontend_origin(frontend_url: &str) -> Result<HeaderValue, AppError> {
    let origin = frontend_url.trim().trim_end_matches('/');
    if origin.is_empty() {
        return Err(AppError::Validation("FRONTEND_URL must not be empty".to_owned()));
    }

    HeaderValue::from_str(origin).map_err(|error| {
        AppError::Validation(format!("invalid FRONTEND_URL '{frontend_url}': {error}"))
    })
}
