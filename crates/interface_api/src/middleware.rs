//! API middleware
//!
//! Identity is established upstream (gateway or desktop client); requests
//! carry the acting user in the `X-User-Id` header.

use axum::{
    async_trait,
    body::Body,
    extract::FromRequestParts,
    http::{request::Parts, Request, StatusCode},
    middleware::Next,
    response::Response,
};
use chrono::Utc;
use std::str::FromStr;
use tracing::info;

use core_kernel::UserId;

/// Header carrying the acting user's identifier
pub const USER_ID_HEADER: &str = "x-user-id";

/// Extractor for the acting user
///
/// Rejects the request with 400 when the header is missing or not a UUID.
#[derive(Debug, Clone, Copy)]
pub struct ActingUser(pub UserId);

#[async_trait]
impl<S> FromRequestParts<S> for ActingUser
where
    S: Send + Sync,
{
    type Rejection = (StatusCode, &'static str);

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(USER_ID_HEADER)
            .and_then(|value| value.to_str().ok())
            .ok_or((StatusCode::BAD_REQUEST, "missing X-User-Id header"))?;

        let user_id = UserId::from_str(header)
            .map_err(|_| (StatusCode::BAD_REQUEST, "X-User-Id is not a valid identifier"))?;

        Ok(ActingUser(user_id))
    }
}

/// Audit logging middleware
///
/// Logs every API request with the acting user for traceability
pub async fn audit_middleware(request: Request<Body>, next: Next) -> Response {
    let method = request.method().clone();
    let uri = request.uri().clone();
    let user = request
        .headers()
        .get(USER_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .unwrap_or("anonymous")
        .to_string();

    let start = Utc::now();
    let response = next.run(request).await;
    let duration = Utc::now() - start;

    info!(
        method = %method,
        uri = %uri,
        user = %user,
        status = %response.status().as_u16(),
        duration_ms = duration.num_milliseconds(),
        "API request"
    );

    response
}
