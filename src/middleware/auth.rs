use axum::{
    async_trait,
    extract::{FromRequestParts, Request, State},
    http::{header::AUTHORIZATION, request::Parts, HeaderMap},
    middleware::Next,
    response::Response,
};

use crate::auth::Principal;
use crate::error::{ApiError, INVALID_TOKEN_MESSAGE, MISSING_TOKEN_MESSAGE};
use crate::state::AppState;

/// Bearer authentication gate.
///
/// Verifies the token and inserts the resulting [`Principal`] into the request
/// extensions. This is the only stage that rejects on credential failure.
pub async fn authenticate(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = extract_bearer_token(request.headers()).map_err(|reason| {
        tracing::debug!(reason, "Rejected request without usable bearer token");
        ApiError::unauthorized(MISSING_TOKEN_MESSAGE)
    })?;

    let principal = state.codec.verify(token).map_err(|e| {
        tracing::debug!(error = %e, "Rejected bearer token");
        ApiError::unauthorized(INVALID_TOKEN_MESSAGE)
    })?;

    tracing::debug!(user_id = %principal.user_id, "Authenticated request");
    request.extensions_mut().insert(principal);

    Ok(next.run(request).await)
}

/// Extract the token from `Authorization: Bearer <token>`
fn extract_bearer_token(headers: &HeaderMap) -> Result<&str, &'static str> {
    let auth_header = headers
        .get(AUTHORIZATION)
        .ok_or("missing Authorization header")?;

    let auth_str = auth_header
        .to_str()
        .map_err(|_| "Authorization header is not valid UTF-8")?;

    let token = auth_str
        .strip_prefix("Bearer ")
        .ok_or("Authorization header must use Bearer scheme")?
        .trim();

    if token.is_empty() {
        return Err("empty bearer token");
    }
    Ok(token)
}

#[async_trait]
impl<S> FromRequestParts<S> for Principal
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Principal>()
            .cloned()
            .ok_or_else(|| ApiError::unauthorized("Authentication required"))
    }
}
