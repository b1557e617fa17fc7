use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use axum::{
    body::Body,
    http::Request,
    response::{IntoResponse, Response},
};
use tower::{Layer, Service};

use crate::auth::{PermissionCode, Principal};
use crate::database::PermissionStore;
use crate::error::ApiError;
use crate::middleware::tenant::TenantScope;
use crate::state::AppState;

/// Route guard requiring one named permission.
///
/// Must sit behind [`authenticate`](super::auth::authenticate); without a
/// principal in the request the guard answers 401.
pub fn require_permission(state: &AppState, permission: PermissionCode) -> PermissionLayer {
    PermissionLayer::new(state.permissions.clone(), permission)
}

#[derive(Clone)]
pub struct PermissionLayer {
    store: Arc<dyn PermissionStore>,
    permission: PermissionCode,
}

impl PermissionLayer {
    pub fn new(store: Arc<dyn PermissionStore>, permission: PermissionCode) -> Self {
        Self { store, permission }
    }
}

impl<S> Layer<S> for PermissionLayer {
    type Service = PermissionGuard<S>;

    fn layer(&self, inner: S) -> Self::Service {
        PermissionGuard {
            inner,
            store: self.store.clone(),
            permission: self.permission.clone(),
        }
    }
}

#[derive(Clone)]
pub struct PermissionGuard<S> {
    inner: S,
    store: Arc<dyn PermissionStore>,
    permission: PermissionCode,
}

impl<S> Service<Request<Body>> for PermissionGuard<S>
where
    S: Service<Request<Body>, Response = Response> + Clone + Send + 'static,
    S::Future: Send + 'static,
{
    type Response = Response;
    type Error = S::Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: Request<Body>) -> Self::Future {
        // Take the service that was polled ready, leave a fresh clone behind
        let clone = self.inner.clone();
        let mut inner = std::mem::replace(&mut self.inner, clone);

        let store = self.store.clone();
        let permission = self.permission.clone();
        let principal = req.extensions().get::<Principal>().cloned();
        let tenant = TenantScope::from_headers(req.headers());

        Box::pin(async move {
            match authorize(store.as_ref(), &permission, principal, tenant).await {
                Ok(()) => inner.call(req).await,
                Err(err) => Ok(err.into_response()),
            }
        })
    }
}

/// Decide one request. Every outcome other than `Ok` is a terminal response.
async fn authorize(
    store: &dyn PermissionStore,
    permission: &PermissionCode,
    principal: Option<Principal>,
    tenant: Result<TenantScope, ApiError>,
) -> Result<(), ApiError> {
    let Some(principal) = principal else {
        tracing::warn!(permission = %permission, "No principal at permission check, denying");
        return Err(ApiError::unauthorized("Authentication required"));
    };
    let tenant = tenant?;

    let allowed = store
        .can(&principal, permission, tenant.tenant_id())
        .await
        .map_err(|e| {
            tracing::error!(
                user_id = %principal.user_id,
                permission = %permission,
                error = %e,
                "Permission check failed"
            );
            ApiError::from(e)
        })?;

    if allowed {
        tracing::debug!(
            user_id = %principal.user_id,
            permission = %permission,
            tenant = ?tenant.tenant_id(),
            "Permission granted"
        );
        Ok(())
    } else {
        tracing::warn!(
            user_id = %principal.user_id,
            permission = %permission,
            tenant = ?tenant.tenant_id(),
            "Permission denied"
        );
        Err(ApiError::permission_denied(permission.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::{DatabaseError, Membership, MemoryPermissionStore};
    use crate::middleware::tenant::TENANT_HEADER;
    use async_trait::async_trait;
    use axum::http::StatusCode;
    use std::convert::Infallible;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tower::ServiceExt;
    use uuid::Uuid;

    fn write() -> PermissionCode {
        PermissionCode::parse("ws:project:write").unwrap()
    }

    fn principal() -> Principal {
        Principal {
            user_id: Uuid::new_v4(),
            email: "a@b.com".to_string(),
        }
    }

    fn counting_service(
        hits: Arc<AtomicUsize>,
    ) -> impl Service<Request<Body>, Response = Response, Error = Infallible, Future = impl Future<Output = Result<Response, Infallible>> + Send>
           + Clone
           + Send
           + 'static {
        tower::service_fn(move |_req: Request<Body>| {
            let hits = hits.clone();
            async move {
                hits.fetch_add(1, Ordering::SeqCst);
                Ok::<_, Infallible>(Response::new(Body::empty()))
            }
        })
    }

    fn request(principal: Option<Principal>) -> Request<Body> {
        let mut req = Request::builder().uri("/guarded").body(Body::empty()).unwrap();
        if let Some(p) = principal {
            req.extensions_mut().insert(p);
        }
        req
    }

    struct BrokenStore;

    #[async_trait]
    impl PermissionStore for BrokenStore {
        async fn list_catalog(&self) -> Result<Vec<crate::auth::PermissionEntry>, DatabaseError> {
            Err(DatabaseError::Unavailable("down".into()))
        }
        async fn can(&self, _: &Principal, _: &PermissionCode, _: Option<Uuid>) -> Result<bool, DatabaseError> {
            Err(DatabaseError::Unavailable("down".into()))
        }
        async fn granted(&self, _: &Principal, _: Option<Uuid>) -> Result<Vec<PermissionCode>, DatabaseError> {
            Err(DatabaseError::Unavailable("down".into()))
        }
        async fn ping(&self) -> Result<(), DatabaseError> {
            Err(DatabaseError::Unavailable("down".into()))
        }
    }

    #[tokio::test]
    async fn grants_pass_through() {
        let p = principal();
        let store = MemoryPermissionStore::new().with_membership(
            Membership::new(p.user_id, Uuid::new_v4())
                .default_tenant()
                .with_permission(write()),
        );
        let hits = Arc::new(AtomicUsize::new(0));
        let guard = PermissionLayer::new(Arc::new(store), write()).layer(counting_service(hits.clone()));

        let res = guard.oneshot(request(Some(p))).await.unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn missing_grant_is_403() {
        let hits = Arc::new(AtomicUsize::new(0));
        let guard = PermissionLayer::new(Arc::new(MemoryPermissionStore::new()), write())
            .layer(counting_service(hits.clone()));

        let res = guard.oneshot(request(Some(principal()))).await.unwrap();
        assert_eq!(res.status(), StatusCode::FORBIDDEN);
        assert_eq!(hits.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn missing_principal_is_401() {
        let hits = Arc::new(AtomicUsize::new(0));
        let guard = PermissionLayer::new(Arc::new(MemoryPermissionStore::new()), write())
            .layer(counting_service(hits.clone()));

        let res = guard.oneshot(request(None)).await.unwrap();
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(hits.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn malformed_tenant_is_400() {
        let hits = Arc::new(AtomicUsize::new(0));
        let guard = PermissionLayer::new(Arc::new(MemoryPermissionStore::new()), write())
            .layer(counting_service(hits.clone()));

        let mut req = request(Some(principal()));
        req.headers_mut().insert(TENANT_HEADER, "not-a-uuid".parse().unwrap());
        let res = guard.oneshot(req).await.unwrap();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        assert_eq!(hits.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn store_outage_never_allows() {
        let hits = Arc::new(AtomicUsize::new(0));
        let guard = PermissionLayer::new(Arc::new(BrokenStore), write()).layer(counting_service(hits.clone()));

        let res = guard.oneshot(request(Some(principal()))).await.unwrap();
        assert_eq!(res.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(hits.load(Ordering::SeqCst), 0);
    }
}
