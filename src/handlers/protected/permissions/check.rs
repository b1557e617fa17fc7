use axum::{
    extract::{Path, State},
    Json,
};
use serde::Serialize;

use crate::auth::{PermissionCode, Principal};
use crate::error::ApiError;
use crate::middleware::TenantScope;
use crate::state::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckResponse {
    pub permission_code: PermissionCode,
    pub granted: bool,
}

/// GET /api/permissions/check/:code - non-failing variant of the permission gate
///
/// Lets clients decide what to render without provoking a 403.
pub async fn check_get(
    State(state): State<AppState>,
    principal: Principal,
    tenant: TenantScope,
    Path(code): Path<String>,
) -> Result<Json<CheckResponse>, ApiError> {
    let permission_code = PermissionCode::parse(&code)?;
    let granted = state
        .permissions
        .can(&principal, &permission_code, tenant.tenant_id())
        .await?;

    Ok(Json(CheckResponse {
        permission_code,
        granted,
    }))
}
