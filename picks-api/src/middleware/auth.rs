use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{header, Method},
    middleware::Next,
    response::Response,
};
use serde::Deserialize;

use crate::error::AppError;
use crate::server::AppState;

#[derive(Debug, Default, Deserialize)]
struct AuthQuery {
    api_key: Option<String>,
}

/// Write-protection for mutating methods. Reads pass untouched; writes pass
/// in development mode, from the site's own pages (referer heuristic), or
/// with the configured key in the `X-API-Key` header or `api_key` query
/// parameter.
pub async fn require_write_access(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    if matches!(
        *request.method(),
        Method::GET | Method::HEAD | Method::OPTIONS
    ) {
        return Ok(next.run(request).await);
    }

    if state.config.server.is_development() {
        return Ok(next.run(request).await);
    }

    // Same-origin heuristic: trust a referer that names our own host. The
    // header is client-supplied, so this is spoofable; the key below is the
    // actual gate. Kept because the catalog page posts without a key.
    let headers = request.headers();
    let referer = headers
        .get(header::REFERER)
        .and_then(|value| value.to_str().ok())
        .unwrap_or("");
    let host = headers
        .get(header::HOST)
        .and_then(|value| value.to_str().ok())
        .unwrap_or("");
    if !referer.is_empty() && !host.is_empty() && referer.contains(host) {
        return Ok(next.run(request).await);
    }

    let supplied = headers
        .get("x-api-key")
        .and_then(|value| value.to_str().ok())
        .map(str::to_owned)
        .or_else(|| {
            let query = request.uri().query().unwrap_or("");
            serde_urlencoded::from_str::<AuthQuery>(query)
                .unwrap_or_default()
                .api_key
        });

    match supplied {
        Some(key) if key == state.config.auth.api_key => Ok(next.run(request).await),
        _ => Err(AppError::Auth("Invalid or missing API key".to_string())),
    }
}
