use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::auth::{PermissionCode, PermissionEntry, Principal};
use crate::database::DatabaseError;

/// Read access to the permission catalog and the authorization predicate.
///
/// Implementations return fresh snapshots; nothing is memoized between calls.
#[async_trait]
pub trait PermissionStore: Send + Sync {
    /// Every catalog entry. The catalog is small and static, so no pagination.
    async fn list_catalog(&self) -> Result<Vec<PermissionEntry>, DatabaseError>;

    /// Whether `principal` holds `permission`. `tenant` of `None` means the
    /// principal's default tenant.
    async fn can(
        &self,
        principal: &Principal,
        permission: &PermissionCode,
        tenant: Option<Uuid>,
    ) -> Result<bool, DatabaseError>;

    /// All permission codes `principal` holds in the tenant scope, sorted.
    async fn granted(
        &self,
        principal: &Principal,
        tenant: Option<Uuid>,
    ) -> Result<Vec<PermissionCode>, DatabaseError>;

    /// Connectivity probe for `/health`.
    async fn ping(&self) -> Result<(), DatabaseError>;
}

/// Postgres-backed store.
///
/// Tables:
/// - `permissions(code, description)`
/// - `roles(id, tenant_id, name)`
/// - `role_permissions(role_id, permission_code)`
/// - `tenant_members(tenant_id, user_id, role_id, is_default)`
#[derive(Clone)]
pub struct PgPermissionStore {
    pool: PgPool,
}

impl PgPermissionStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

// Tenant scoping: an explicit tenant matches its membership, otherwise only
// memberships flagged as the user's default tenant apply.
const MEMBERSHIP_SCOPE: &str = r#"
    m.user_id = $1
    AND (
        ($2::uuid IS NULL AND m.is_default)
        OR m.tenant_id = $2::uuid
    )
"#;

#[async_trait]
impl PermissionStore for PgPermissionStore {
    async fn list_catalog(&self) -> Result<Vec<PermissionEntry>, DatabaseError> {
        let rows: Vec<(String, String)> = sqlx::query_as(
            "SELECT code, description FROM permissions ORDER BY code",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|(permission_code, description)| PermissionEntry {
                permission_code,
                description,
            })
            .collect())
    }

    async fn can(
        &self,
        principal: &Principal,
        permission: &PermissionCode,
        tenant: Option<Uuid>,
    ) -> Result<bool, DatabaseError> {
        let query = format!(
            r#"
            SELECT EXISTS (
                SELECT 1
                FROM tenant_members m
                JOIN role_permissions rp ON rp.role_id = m.role_id
                WHERE {MEMBERSHIP_SCOPE}
                AND rp.permission_code = $3
            )
            "#
        );

        let (allowed,): (bool,) = sqlx::query_as(&query)
            .bind(principal.user_id)
            .bind(tenant)
            .bind(permission.as_str())
            .fetch_one(&self.pool)
            .await?;

        Ok(allowed)
    }

    async fn granted(
        &self,
        principal: &Principal,
        tenant: Option<Uuid>,
    ) -> Result<Vec<PermissionCode>, DatabaseError> {
        let query = format!(
            r#"
            SELECT DISTINCT rp.permission_code
            FROM tenant_members m
            JOIN role_permissions rp ON rp.role_id = m.role_id
            WHERE {MEMBERSHIP_SCOPE}
            ORDER BY rp.permission_code
            "#
        );

        let rows: Vec<(String,)> = sqlx::query_as(&query)
            .bind(principal.user_id)
            .bind(tenant)
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter()
            .map(|(code,)| {
                PermissionCode::parse(&code).map_err(|e| {
                    DatabaseError::QueryError(format!("invalid permission code in role_permissions: {}", e))
                })
            })
            .collect()
    }

    async fn ping(&self) -> Result<(), DatabaseError> {
        super::manager::health_check(&self.pool).await
    }
}
