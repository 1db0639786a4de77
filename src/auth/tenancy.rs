/// Tenancy resolution
///
/// Finds a principal's membership and the tenant's current subscription
/// state. When no tenant is named, the primary membership (earliest created)
/// is used; callers that support tenant switching must pass the tenant ID
/// explicitly.

use std::sync::Arc;

use uuid::Uuid;

use crate::error::AuthError;
use crate::models::membership::Membership;
use crate::models::tenant::Tenant;
use crate::store::TenancyStore;

/// Resolves memberships and tenants for authorization checks
#[derive(Clone)]
pub struct TenancyResolver {
    store: Arc<dyn TenancyStore>,
}

impl TenancyResolver {
    pub fn new(store: Arc<dyn TenancyStore>) -> Self {
        Self { store }
    }

    /// Resolves the principal's membership
    ///
    /// With `tenant_id`, looks up that specific membership. Without it,
    /// resolves the primary membership (deterministically the earliest
    /// created), which models the common case of a principal with exactly
    /// one tenant.
    ///
    /// # Errors
    ///
    /// `NoMembership` if the principal has no matching membership.
    pub async fn resolve_membership(
        &self,
        principal_id: Uuid,
        tenant_id: Option<Uuid>,
    ) -> Result<Membership, AuthError> {
        let membership = match tenant_id {
            Some(tenant_id) => self.store.find_membership(tenant_id, principal_id).await?,
            None => self.store.primary_membership(principal_id).await?,
        };

        membership.ok_or(AuthError::NoMembership)
    }

    /// Resolves a tenant for tier/status lookup
    ///
    /// # Errors
    ///
    /// `TenantNotFound` if the tenant does not exist.
    pub async fn resolve_tenant(&self, tenant_id: Uuid) -> Result<Tenant, AuthError> {
        self.store
            .find_tenant(tenant_id)
            .await?
            .ok_or(AuthError::TenantNotFound)
    }
}
