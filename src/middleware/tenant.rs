use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{request::Parts, HeaderMap},
};
use uuid::Uuid;

use crate::error::ApiError;

pub const TENANT_HEADER: &str = "x-ws-tenant";

/// Tenant narrowing requested by the client. `None` defers to the principal's
/// default tenant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TenantScope(pub Option<Uuid>);

impl TenantScope {
    pub fn from_headers(headers: &HeaderMap) -> Result<Self, ApiError> {
        let Some(value) = headers.get(TENANT_HEADER) else {
            return Ok(TenantScope(None));
        };

        value
            .to_str()
            .ok()
            .map(str::trim)
            .and_then(|s| Uuid::parse_str(s).ok())
            .map(|id| TenantScope(Some(id)))
            .ok_or_else(|| ApiError::bad_request(format!("Invalid {} header", TENANT_HEADER)))
    }

    pub fn tenant_id(&self) -> Option<Uuid> {
        self.0
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for TenantScope
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        TenantScope::from_headers(&parts.headers)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn absent_header_means_default_tenant() {
        assert_eq!(TenantScope::from_headers(&HeaderMap::new()), Ok(TenantScope(None)));
    }

    #[test]
    fn parses_tenant_uuid() {
        let id = Uuid::new_v4();
        let mut headers = HeaderMap::new();
        headers.insert(TENANT_HEADER, HeaderValue::from_str(&id.to_string()).unwrap());
        assert_eq!(TenantScope::from_headers(&headers).unwrap().tenant_id(), Some(id));
    }

    #[test]
    fn rejects_malformed_tenant() {
        let mut headers = HeaderMap::new();
        headers.insert(TENANT_HEADER, HeaderValue::from_static("acme"));
        let err = TenantScope::from_headers(&headers).unwrap_err();
        assert_eq!(err, ApiError::bad_request("Invalid x-ws-tenant header"));
    }
}
