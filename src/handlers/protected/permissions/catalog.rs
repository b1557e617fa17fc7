use axum::{extract::State, Json};

use crate::auth::PermissionEntry;
use crate::error::ApiError;
use crate::state::AppState;

/// GET /api/permissions/catalog - full permission catalog
///
/// Always re-reads the store; a catalog migration is visible on the next call.
pub async fn catalog_get(
    State(state): State<AppState>,
) -> Result<Json<Vec<PermissionEntry>>, ApiError> {
    let entries = state.permissions.list_catalog().await?;
    tracing::debug!(count = entries.len(), "Listed permission catalog");
    Ok(Json(entries))
}
