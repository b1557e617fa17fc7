use axum::{
    http::{
        header::{AUTHORIZATION, CONTENT_TYPE},
        HeaderName, HeaderValue,
    },
    middleware,
    routing::get,
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::auth::PermissionCode;
use crate::config::SecurityConfig;
use crate::handlers::{protected, public};
use crate::middleware::{authenticate, require_permission, TENANT_HEADER};
use crate::state::AppState;

pub const PERMISSION_CATALOG_READ: &str = "ws:permission:read";

/// Build the full route table. Pure: no sockets, no global state.
pub fn app(state: AppState) -> Router {
    let protected = Router::new()
        .merge(auth_routes())
        .merge(permission_routes(&state))
        // route_layer so unmatched /api paths still 404 instead of 401
        .route_layer(middleware::from_fn_with_state(state.clone(), authenticate));

    let router = Router::new()
        // Public
        .route("/", get(public::root))
        .route("/health", get(public::health))
        // Protected API
        .merge(protected)
        .layer(cors_layer(&state.config.security));

    let router = if state.config.api.enable_request_logging {
        router.layer(TraceLayer::new_for_http())
    } else {
        router
    };

    router.with_state(state)
}

fn auth_routes() -> Router<AppState> {
    use protected::auth;

    Router::new()
        .route("/api/auth/whoami", get(auth::session_whoami))
        .route("/api/auth/permissions", get(auth::session_permissions))
}

fn permission_routes(state: &AppState) -> Router<AppState> {
    use protected::permissions;

    Router::new()
        .route(
            "/api/permissions/catalog",
            get(permissions::catalog_get).route_layer(require_permission(
                state,
                PermissionCode::from_static(PERMISSION_CATALOG_READ),
            )),
        )
        .route("/api/permissions/check/:code", get(permissions::check_get))
}

fn cors_layer(security: &SecurityConfig) -> CorsLayer {
    if !security.enable_cors {
        return CorsLayer::new();
    }
    if security.cors_origins.iter().any(|o| o == "*") {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = security
        .cors_origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods(Any)
        .allow_headers([
            AUTHORIZATION,
            CONTENT_TYPE,
            HeaderName::from_static(TENANT_HEADER),
        ])
}
