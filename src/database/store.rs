use std::sync::Arc;

use crate::config::{DatabaseConfig, Environment};
use crate::database::{connect_pool, MemoryPermissionStore, PermissionStore, PgPermissionStore};

/// Pick the permission store for this configuration.
///
/// Postgres when `DATABASE_URL` is set. Otherwise the in-memory store seeded
/// with `WS_DEV_GRANTS`, which production refuses.
pub fn store_from_config(
    config: &DatabaseConfig,
    environment: Environment,
) -> anyhow::Result<Arc<dyn PermissionStore>> {
    if environment == Environment::Production && !config.dev_grants.is_empty() {
        anyhow::bail!("WS_DEV_GRANTS is not allowed in production");
    }

    match config.url.as_deref() {
        Some(_) => {
            if !config.dev_grants.is_empty() {
                tracing::warn!("WS_DEV_GRANTS ignored: grants come from the database");
            }
            Ok(Arc::new(PgPermissionStore::new(connect_pool(config)?)))
        }
        None if environment == Environment::Production => {
            anyhow::bail!("DATABASE_URL is required in production");
        }
        None => {
            tracing::warn!(
                grants = config.dev_grants.len(),
                "DATABASE_URL not set, using in-memory permission store"
            );
            Ok(Arc::new(MemoryPermissionStore::new().with_grants(&config.dev_grants)))
        }
    }
}
