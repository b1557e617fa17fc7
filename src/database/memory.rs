use async_trait::async_trait;
use std::collections::BTreeSet;
use uuid::Uuid;

use crate::auth::{PermissionCode, PermissionEntry, Principal, BUILTIN_CATALOG};
use crate::config::DevGrant;
use crate::database::{DatabaseError, PermissionStore};

/// A user's role in one tenant, flattened to the permissions the role carries
#[derive(Debug, Clone)]
pub struct Membership {
    pub user_id: Uuid,
    pub tenant_id: Uuid,
    pub is_default: bool,
    pub permissions: BTreeSet<PermissionCode>,
}

impl Membership {
    pub fn new(user_id: Uuid, tenant_id: Uuid) -> Self {
        Self {
            user_id,
            tenant_id,
            is_default: false,
            permissions: BTreeSet::new(),
        }
    }

    pub fn default_tenant(mut self) -> Self {
        self.is_default = true;
        self
    }

    pub fn with_permission(mut self, code: PermissionCode) -> Self {
        self.permissions.insert(code);
        self
    }

    fn in_scope(&self, user_id: Uuid, tenant: Option<Uuid>) -> bool {
        self.user_id == user_id
            && match tenant {
                Some(tenant_id) => self.tenant_id == tenant_id,
                None => self.is_default,
            }
    }
}

impl From<&DevGrant> for Membership {
    /// Tenant-less grants land in the user's default tenant, keyed by the nil uuid.
    fn from(grant: &DevGrant) -> Self {
        let membership = match grant.tenant_id {
            Some(tenant_id) => Membership::new(grant.user_id, tenant_id),
            None => Membership::new(grant.user_id, Uuid::nil()).default_tenant(),
        };
        grant
            .permissions
            .iter()
            .cloned()
            .fold(membership, Membership::with_permission)
    }
}

/// In-process permission store used when no datastore is configured, and by tests.
///
/// Starts with the built-in catalog and no memberships, so every check denies
/// until memberships are added.
#[derive(Debug, Clone)]
pub struct MemoryPermissionStore {
    catalog: Vec<PermissionEntry>,
    memberships: Vec<Membership>,
}

impl Default for MemoryPermissionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryPermissionStore {
    pub fn new() -> Self {
        let catalog = BUILTIN_CATALOG
            .iter()
            .map(|(code, description)| PermissionEntry {
                permission_code: code.to_string(),
                description: description.to_string(),
            })
            .collect();

        Self {
            catalog,
            memberships: Vec::new(),
        }
    }

    pub fn with_membership(mut self, membership: Membership) -> Self {
        self.memberships.push(membership);
        self
    }

    pub fn with_grants<'a>(self, grants: impl IntoIterator<Item = &'a DevGrant>) -> Self {
        grants
            .into_iter()
            .fold(self, |store, grant| store.with_membership(Membership::from(grant)))
    }

    fn scoped(&self, user_id: Uuid, tenant: Option<Uuid>) -> impl Iterator<Item = &Membership> {
        self.memberships
            .iter()
            .filter(move |m| m.in_scope(user_id, tenant))
    }
}

#[async_trait]
impl PermissionStore for MemoryPermissionStore {
    async fn list_catalog(&self) -> Result<Vec<PermissionEntry>, DatabaseError> {
        let mut entries = self.catalog.clone();
        entries.sort_by(|a, b| a.permission_code.cmp(&b.permission_code));
        Ok(entries)
    }

    async fn can(
        &self,
        principal: &Principal,
        permission: &PermissionCode,
        tenant: Option<Uuid>,
    ) -> Result<bool, DatabaseError> {
        Ok(self
            .scoped(principal.user_id, tenant)
            .any(|m| m.permissions.contains(permission)))
    }

    async fn granted(
        &self,
        principal: &Principal,
        tenant: Option<Uuid>,
    ) -> Result<Vec<PermissionCode>, DatabaseError> {
        let codes: BTreeSet<PermissionCode> = self
            .scoped(principal.user_id, tenant)
            .flat_map(|m| m.permissions.iter().cloned())
            .collect();
        Ok(codes.into_iter().collect())
    }

    async fn ping(&self) -> Result<(), DatabaseError> {
        Ok(())
    }
}
