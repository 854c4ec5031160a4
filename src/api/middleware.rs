//! API Middleware
//!
//! Bearer authentication and request logging.

use axum::{
    body::Body,
    extract::State,
    http::{header, HeaderMap, Request},
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

use crate::domain::OperationContext;
use crate::error::AppError;

use super::AppState;

/// Account resolved from the bearer token
#[derive(Debug, Clone, Copy)]
pub struct AuthenticatedAccount {
    pub account_id: Uuid,
}

/// Pull the token out of an `Authorization: Bearer <token>` header.
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, AppError> {
    let value = headers
        .get(header::AUTHORIZATION)
        .ok_or_else(|| AppError::Unauthenticated("authorization header missing".into()))?;

    let invalid = || AppError::Unauthenticated("invalid authorization header format".into());

    let value = value.to_str().map_err(|_| invalid())?;
    let (scheme, token) = value.split_once(' ').ok_or_else(invalid)?;
    let token = token.trim();
    if scheme != "Bearer" || token.is_empty() {
        return Err(invalid());
    }

    Ok(token)
}

/// Resolve the bearer token and attach the caller to the request
pub async fn auth_middleware(
    State(state): State<AppState>,
    headers: HeaderMap,
    mut request: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let token = bearer_token(&headers)?;
    let account_id = state.identity.resolve(token)?;

    request
        .extensions_mut()
        .insert(AuthenticatedAccount { account_id });

    // Extract correlation ID or generate new one
    let correlation_id = headers
        .get("X-Correlation-Id")
        .and_then(|v| v.to_str().ok())
        .and_then(|s| Uuid::parse_str(s).ok())
        .unwrap_or_else(Uuid::new_v4);

    let context = OperationContext::new()
        .with_account(account_id)
        .with_correlation_id(correlation_id);

    request.extensions_mut().insert(context);

    Ok(next.run(request).await)
}

/// Headers that should be masked in logs
const SENSITIVE_HEADERS: &[&str] = &["authorization", "cookie", "set-cookie"];

/// Mask sensitive headers for logging
pub fn mask_headers_for_logging(headers: &HeaderMap) -> Vec<(String, String)> {
    headers
        .iter()
        .map(|(name, value)| {
            let name_lower = name.as_str().to_lowercase();
            let masked_value = if SENSITIVE_HEADERS.contains(&name_lower.as_str()) {
                "[REDACTED]".to_string()
            } else {
                value.to_str().unwrap_or("[invalid utf8]").to_string()
            };
            (name.to_string(), masked_value)
        })
        .collect()
}

/// Request logging middleware
pub async fn logging_middleware(request: Request<Body>, next: Next) -> Response {
    let method = request.method().clone();
    let uri = request.uri().clone();
    let headers = mask_headers_for_logging(request.headers());
    let correlation_id = request
        .headers()
        .get("X-Correlation-Id")
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned);
    let start = std::time::Instant::now();

    tracing::info!(
        method = %method,
        uri = %uri,
        correlation_id = ?correlation_id,
        headers = ?headers,
        "Incoming request"
    );

    let response = next.run(request).await;

    tracing::info!(
        method = %method,
        uri = %uri,
        status = %response.status(),
        duration_ms = %start.elapsed().as_millis(),
        correlation_id = ?correlation_id,
        "Request completed"
    );

    response
}
