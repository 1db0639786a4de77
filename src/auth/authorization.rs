/// Authorization evaluation
///
/// Decides whether a principal, acting inside a tenant, may perform an
/// action gated by a [`Requirement`]. Tier and role are independent axes:
/// both checks must pass on their own, and a higher role never substitutes
/// for an insufficient tier or vice versa.
///
/// The decision itself ([`evaluate`]) is a pure function of the resolved
/// membership, the tenant, the requirement, and `now`, with no I/O and no
/// side effects, which makes it trivially unit-testable. The async
/// [`AuthorizationEvaluator`] wraps it with the tenancy lookups.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::auth::tenancy::TenancyResolver;
use crate::error::AuthError;
use crate::models::membership::{MemberRole, Membership};
use crate::models::tenant::{SubscriptionTier, Tenant};

/// Capability requirement an action declares as its access gate
///
/// Either axis may be unset; a requirement with neither always allows
/// (membership in the tenant is still required by the evaluator).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Requirement {
    /// Minimum subscription tier of the tenant
    pub min_tier: Option<SubscriptionTier>,

    /// Minimum role of the principal within the tenant
    pub min_role: Option<MemberRole>,
}

impl Requirement {
    /// No gate beyond membership itself
    pub fn none() -> Self {
        Self::default()
    }

    /// Gate on tenant tier only
    pub fn tier(min_tier: SubscriptionTier) -> Self {
        Self {
            min_tier: Some(min_tier),
            min_role: None,
        }
    }

    /// Gate on member role only
    pub fn role(min_role: MemberRole) -> Self {
        Self {
            min_tier: None,
            min_role: Some(min_role),
        }
    }

    /// Gate on both axes; each must pass independently
    pub fn both(min_tier: SubscriptionTier, min_role: MemberRole) -> Self {
        Self {
            min_tier: Some(min_tier),
            min_role: Some(min_role),
        }
    }
}

/// Successful authorization: the resolved context the action may use
#[derive(Debug, Clone)]
pub struct Grant {
    /// The membership that satisfied the requirement
    pub membership: Membership,

    /// The tenant the action runs in
    pub tenant: Tenant,
}

/// Pure allow/deny decision over already-resolved data
///
/// Tier is checked first, then role. An expired trial fails any requirement
/// that names a minimum tier, whatever that tier is: a lapsed trial tenant
/// has no tier-gated capabilities left. Requirements without `min_tier` are
/// unaffected by trial expiry.
///
/// # Errors
///
/// `InsufficientTier` / `InsufficientRole`, each carrying the required and
/// actual value so the boundary can render an upgrade prompt.
pub fn evaluate(
    membership: &Membership,
    tenant: &Tenant,
    requirement: &Requirement,
    now: DateTime<Utc>,
) -> Result<(), AuthError> {
    if let Some(required) = requirement.min_tier {
        let lapsed_trial = tenant.tier == SubscriptionTier::Trial && tenant.trial_expired(now);
        if lapsed_trial || tenant.tier.rank() < required.rank() {
            return Err(AuthError::InsufficientTier {
                required,
                actual: tenant.tier,
            });
        }
    }

    if let Some(required) = requirement.min_role {
        if membership.role.rank() < required.rank() {
            return Err(AuthError::InsufficientRole {
                required,
                actual: membership.role,
            });
        }
    }

    Ok(())
}

/// Resolves tenancy and applies [`evaluate`]
#[derive(Clone)]
pub struct AuthorizationEvaluator {
    tenancy: TenancyResolver,
}

impl AuthorizationEvaluator {
    pub fn new(tenancy: TenancyResolver) -> Self {
        Self { tenancy }
    }

    /// Full authorization check for a principal
    ///
    /// Resolves the membership (primary when `tenant_id` is `None`), loads
    /// the tenant, and evaluates the requirement. Returns the resolved
    /// [`Grant`] on allow so handlers don't re-fetch what was just checked.
    ///
    /// # Errors
    ///
    /// `NoMembership`, `TenantNotFound`, `InsufficientTier`, or
    /// `InsufficientRole`.
    pub async fn authorize(
        &self,
        principal_id: Uuid,
        tenant_id: Option<Uuid>,
        requirement: &Requirement,
        now: DateTime<Utc>,
    ) -> Result<Grant, AuthError> {
        let membership = self
            .tenancy
            .resolve_membership(principal_id, tenant_id)
            .await?;
        let tenant = self.tenancy.resolve_tenant(membership.tenant_id).await?;

        evaluate(&membership, &tenant, requirement, now)?;

        Ok(Grant { membership, tenant })
    }
}
