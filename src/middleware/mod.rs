pub mod auth;
pub mod permission;
pub mod tenant;

pub use auth::authenticate;
pub use permission::{require_permission, PermissionGuard, PermissionLayer};
pub use tenant::{TenantScope, TENANT_HEADER};
