use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::env;
use uuid::Uuid;

use crate::auth::{PermissionCode, PermissionCodeError};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub database: DatabaseConfig,
    pub api: ApiConfig,
    pub security: SecurityConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Postgres connection URL. When absent the in-memory permission store is used.
    #[serde(skip_serializing)]
    pub url: Option<String>,
    pub max_connections: u32,
    pub connection_timeout: u64,
    /// Grants seeded into the in-memory store (`WS_DEV_GRANTS`). Never used
    /// with Postgres and refused in production.
    #[serde(default)]
    pub dev_grants: Vec<DevGrant>,
}

/// One seeded membership: a user, an optional tenant and the codes it carries.
///
/// Without a tenant the grant applies to the user's default tenant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DevGrant {
    pub user_id: Uuid,
    pub tenant_id: Option<Uuid>,
    pub permissions: Vec<PermissionCode>,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum DevGrantError {
    #[error("grant '{0}' must look like <user-uuid>[@<tenant-uuid>]=<code>,<code>")]
    Malformed(String),
    #[error("invalid uuid '{0}' in grant")]
    InvalidUuid(String),
    #[error(transparent)]
    InvalidCode(#[from] PermissionCodeError),
}

/// Parse `WS_DEV_GRANTS`: `;`-separated `<user-uuid>[@<tenant-uuid>]=<code>,<code>` entries.
pub fn parse_dev_grants(raw: &str) -> Result<Vec<DevGrant>, DevGrantError> {
    raw.split(';')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(|entry| {
            let (subject, codes) = entry
                .split_once('=')
                .ok_or_else(|| DevGrantError::Malformed(entry.to_string()))?;

            let (user, tenant) = match subject.trim().split_once('@') {
                Some((user, tenant)) => (user, Some(tenant)),
                None => (subject.trim(), None),
            };
            let parse_uuid = |s: &str| {
                Uuid::parse_str(s.trim()).map_err(|_| DevGrantError::InvalidUuid(s.trim().to_string()))
            };

            let permissions = codes
                .split(',')
                .map(str::trim)
                .filter(|c| !c.is_empty())
                .map(PermissionCode::parse)
                .collect::<Result<Vec<_>, _>>()?;
            if permissions.is_empty() {
                return Err(DevGrantError::Malformed(entry.to_string()));
            }

            Ok(DevGrant {
                user_id: parse_uuid(user)?,
                tenant_id: tenant.map(parse_uuid).transpose()?,
                permissions,
            })
        })
        .collect()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub port: u16,
    pub enable_request_logging: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    #[serde(skip_serializing)]
    pub jwt_secret: String,
    pub jwt_expiry_hours: u64,
    pub jwt_leeway_secs: u64,
    pub enable_cors: bool,
    pub cors_origins: Vec<String>,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let environment = match env::var("APP_ENV").as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            Ok("staging") | Ok("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        // Set defaults based on environment, then override with specific env vars
        match environment {
            Environment::Production => Self::production(),
            Environment::Staging => Self::staging(),
            Environment::Development => Self::development(),
        }
        .with_env_overrides()
    }

    fn with_env_overrides(mut self) -> Self {
        // Database overrides
        if let Ok(v) = env::var("DATABASE_URL") {
            if !v.trim().is_empty() {
                self.database.url = Some(v);
            }
        }
        if let Ok(v) = env::var("DATABASE_MAX_CONNECTIONS") {
            self.database.max_connections = v.parse().unwrap_or(self.database.max_connections);
        }
        if let Ok(v) = env::var("DATABASE_CONNECTION_TIMEOUT") {
            self.database.connection_timeout = v.parse().unwrap_or(self.database.connection_timeout);
        }
        if let Ok(v) = env::var("WS_DEV_GRANTS") {
            match parse_dev_grants(&v) {
                Ok(grants) => self.database.dev_grants = grants,
                Err(e) => tracing::warn!("Ignoring WS_DEV_GRANTS: {}", e),
            }
        }

        // API overrides
        if let Some(port) = env::var("WS_API_PORT")
            .ok()
            .or_else(|| env::var("PORT").ok())
            .and_then(|s| s.parse::<u16>().ok())
        {
            self.api.port = port;
        }
        if let Ok(v) = env::var("API_ENABLE_REQUEST_LOGGING") {
            self.api.enable_request_logging = v.parse().unwrap_or(self.api.enable_request_logging);
        }

        // Security overrides
        if let Ok(v) = env::var("JWT_SECRET") {
            self.security.jwt_secret = v;
        }
        if let Ok(v) = env::var("SECURITY_JWT_EXPIRY_HOURS") {
            self.security.jwt_expiry_hours = v.parse().unwrap_or(self.security.jwt_expiry_hours);
        }
        if let Ok(v) = env::var("SECURITY_JWT_LEEWAY_SECS") {
            self.security.jwt_leeway_secs = v.parse().unwrap_or(self.security.jwt_leeway_secs);
        }
        if let Ok(v) = env::var("SECURITY_ENABLE_CORS") {
            self.security.enable_cors = v.parse().unwrap_or(self.security.enable_cors);
        }
        if let Ok(v) = env::var("SECURITY_CORS_ORIGINS") {
            self.security.cors_origins = v
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
        }

        self
    }

    pub fn development() -> Self {
        Self {
            environment: Environment::Development,
            database: DatabaseConfig {
                url: None,
                max_connections: 10,
                connection_timeout: 30,
                dev_grants: Vec::new(),
            },
            api: ApiConfig {
                port: 3000,
                enable_request_logging: true,
            },
            security: SecurityConfig {
                jwt_secret: String::new(),
                jwt_expiry_hours: 24 * 7, // 1 week
                jwt_leeway_secs: 60,
                enable_cors: true,
                cors_origins: vec!["*".to_string()],
            },
        }
    }

    pub fn staging() -> Self {
        Self {
            environment: Environment::Staging,
            database: DatabaseConfig {
                url: None,
                max_connections: 20,
                connection_timeout: 10,
                dev_grants: Vec::new(),
            },
            api: ApiConfig {
                port: 3000,
                enable_request_logging: true,
            },
            security: SecurityConfig {
                jwt_secret: String::new(),
                jwt_expiry_hours: 24,
                jwt_leeway_secs: 30,
                enable_cors: true,
                cors_origins: vec!["https://staging.example.com".to_string()],
            },
        }
    }

    pub fn production() -> Self {
        Self {
            environment: Environment::Production,
            database: DatabaseConfig {
                url: None,
                max_connections: 50,
                connection_timeout: 5,
                dev_grants: Vec::new(),
            },
            api: ApiConfig {
                port: 3000,
                enable_request_logging: false,
            },
            security: SecurityConfig {
                jwt_secret: String::new(),
                jwt_expiry_hours: 4,
                jwt_leeway_secs: 0,
                enable_cors: true,
                cors_origins: vec!["https://app.example.com".to_string()],
            },
        }
    }

    pub fn is_production(&self) -> bool {
        self.environment == Environment::Production
    }
}

// Global singleton config - initialized once at startup
pub static CONFIG: Lazy<AppConfig> = Lazy::new(AppConfig::from_env);

// Convenience function for accessing config
pub fn config() -> &'static AppConfig {
    &CONFIG
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn development_config_allows_any_origin() {
        let config = AppConfig::development();
        assert!(config.security.cors_origins.iter().any(|o| o == "*"));
        assert!(config.database.url.is_none());
        assert_eq!(config.api.port, 3000);
    }

    #[test]
    fn production_config_tightens_tokens() {
        let config = AppConfig::production();
        assert!(config.is_production());
        assert_eq!(config.security.jwt_expiry_hours, 4);
        assert_eq!(config.security.jwt_leeway_secs, 0);
        assert!(!config.api.enable_request_logging);
    }

    #[test]
    fn secrets_are_not_serialized() {
        let mut config = AppConfig::staging();
        config.security.jwt_secret = "super-secret".to_string();
        config.database.url = Some("postgres://u:p@localhost/ws".to_string());
        let rendered = serde_json::to_string(&config).unwrap();
        assert!(!rendered.contains("super-secret"));
        assert!(!rendered.contains("postgres://"));
    }

    #[test]
    fn parses_dev_grants() {
        let user = Uuid::new_v4();
        let tenant = Uuid::new_v4();
        let raw = format!(
            "{user}=ws:permission:read, ws:project:read ; {user}@{tenant}=ws:project:write"
        );

        let grants = parse_dev_grants(&raw).unwrap();
        assert_eq!(grants.len(), 2);
        assert_eq!(grants[0].user_id, user);
        assert_eq!(grants[0].tenant_id, None);
        assert_eq!(
            grants[0].permissions,
            vec![
                PermissionCode::parse("ws:permission:read").unwrap(),
                PermissionCode::parse("ws:project:read").unwrap(),
            ]
        );
        assert_eq!(grants[1].tenant_id, Some(tenant));
        assert!(parse_dev_grants("").unwrap().is_empty());
    }

    #[test]
    fn rejects_malformed_dev_grants() {
        let user = Uuid::new_v4();
        assert!(matches!(
            parse_dev_grants("ws:project:read"),
            Err(DevGrantError::Malformed(_))
        ));
        assert!(matches!(
            parse_dev_grants(&format!("{user}=")),
            Err(DevGrantError::Malformed(_))
        ));
        assert!(matches!(
            parse_dev_grants("alice=ws:project:read"),
            Err(DevGrantError::InvalidUuid(_))
        ));
        assert!(matches!(
            parse_dev_grants(&format!("{user}=ADMIN")),
            Err(DevGrantError::InvalidCode(_))
        ));
    }
}
