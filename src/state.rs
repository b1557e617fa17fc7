use std::sync::Arc;

use crate::auth::TokenCodec;
use crate::config::AppConfig;
use crate::database::{store_from_config, PermissionStore};

/// Application state shared across all handlers.
///
/// Everything in here is immutable after startup; per-request data travels in
/// request extensions instead.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub codec: Arc<TokenCodec>,
    pub permissions: Arc<dyn PermissionStore>,
}

impl AppState {
    pub fn new(
        config: AppConfig,
        codec: TokenCodec,
        permissions: Arc<dyn PermissionStore>,
    ) -> Self {
        Self {
            config: Arc::new(config),
            codec: Arc::new(codec),
            permissions,
        }
    }

    /// Build state from configuration; see [`store_from_config`] for how the
    /// permission store is chosen.
    pub fn from_config(config: AppConfig) -> anyhow::Result<Self> {
        let codec = TokenCodec::from_config(&config.security)?;
        let permissions = store_from_config(&config.database, config.environment)?;

        Ok(Self::new(config, codec, permissions))
    }
}
