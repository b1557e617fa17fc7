use axum::{extract::State, Json};
use serde::Serialize;
use uuid::Uuid;

use crate::auth::{PermissionCode, Principal};
use crate::error::ApiError;
use crate::middleware::TenantScope;
use crate::state::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WhoamiResponse {
    #[serde(flatten)]
    pub principal: Principal,
    /// Tenant requested through `x-ws-tenant`; `null` means the default tenant
    pub tenant: Option<Uuid>,
}

/// GET /api/auth/whoami - the principal attached by the authentication gate
pub async fn whoami(principal: Principal, tenant: TenantScope) -> Json<WhoamiResponse> {
    Json(WhoamiResponse {
        principal,
        tenant: tenant.tenant_id(),
    })
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GrantedResponse {
    pub tenant: Option<Uuid>,
    pub permissions: Vec<PermissionCode>,
}

/// GET /api/auth/permissions - every permission the principal holds in scope
pub async fn permissions(
    State(state): State<AppState>,
    principal: Principal,
    tenant: TenantScope,
) -> Result<Json<GrantedResponse>, ApiError> {
    let permissions = state
        .permissions
        .granted(&principal, tenant.tenant_id())
        .await?;

    Ok(Json(GrantedResponse {
        tenant: tenant.tenant_id(),
        permissions,
    }))
}
