#![allow(dead_code)]

//! Shared test fixtures: an in-memory implementation of the storage
//! collaborator traits, so the full resolution pipeline runs without
//! Postgres.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use uuid::Uuid;

use aegis_auth::models::membership::{MemberRole, Membership};
use aegis_auth::models::principal::{CreatePrincipal, Principal};
use aegis_auth::models::tenant::{
    CreateTenant, SubscriptionStatus, SubscriptionTier, Tenant,
};
use aegis_auth::store::{PrincipalStore, TenancyStore};
use aegis_auth::{TokenConfig, TokenService};

pub const TEST_SECRET: &str = "integration-test-secret-32-bytes!!!!";

pub fn token_service() -> TokenService {
    TokenService::new(TokenConfig::new(TEST_SECRET))
}

#[derive(Default)]
struct State {
    principals: Vec<Principal>,
    tenants: Vec<Tenant>,
    memberships: Vec<Membership>,
}

/// In-memory directory implementing both store traits
#[derive(Default)]
pub struct MemoryDirectory {
    state: Mutex<State>,
    fail_next_account_write: AtomicBool,
}

impl MemoryDirectory {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Makes the next `create_account` call fail, standing in for a
    /// connection drop mid-transaction
    pub fn fail_next_account_write(&self) {
        self.fail_next_account_write.store(true, Ordering::SeqCst);
    }

    /// Seeds a membership with an explicit creation time (for ordering tests)
    pub fn seed_membership(
        &self,
        tenant_id: Uuid,
        principal_id: Uuid,
        role: MemberRole,
        created_at: DateTime<Utc>,
    ) -> Membership {
        let membership = Membership {
            id: Uuid::new_v4(),
            tenant_id,
            principal_id,
            role,
            created_at,
        };
        self.state
            .lock()
            .unwrap()
            .memberships
            .push(membership.clone());
        membership
    }

    /// Rewrites a tenant's subscription (stands in for billing callbacks)
    pub fn set_subscription(
        &self,
        tenant_id: Uuid,
        tier: SubscriptionTier,
        status: SubscriptionStatus,
    ) {
        let mut state = self.state.lock().unwrap();
        let tenant = state
            .tenants
            .iter_mut()
            .find(|t| t.id == tenant_id)
            .expect("tenant should exist");
        tenant.tier = tier;
        tenant.status = status;
    }

    /// Sets a tenant's trial deadline
    pub fn set_trial_ends_at(&self, tenant_id: Uuid, ends_at: Option<DateTime<Utc>>) {
        let mut state = self.state.lock().unwrap();
        let tenant = state
            .tenants
            .iter_mut()
            .find(|t| t.id == tenant_id)
            .expect("tenant should exist");
        tenant.trial_ends_at = ends_at;
    }

    pub fn principal_count(&self) -> usize {
        self.state.lock().unwrap().principals.len()
    }

    pub fn membership_count(&self) -> usize {
        self.state.lock().unwrap().memberships.len()
    }

    pub fn tenant_count(&self) -> usize {
        self.state.lock().unwrap().tenants.len()
    }
}

#[async_trait]
impl PrincipalStore for MemoryDirectory {
    async fn find_principal(&self, id: Uuid) -> Result<Option<Principal>, sqlx::Error> {
        let state = self.state.lock().unwrap();
        Ok(state.principals.iter().find(|p| p.id == id).cloned())
    }

    async fn find_principal_by_email(
        &self,
        email: &str,
    ) -> Result<Option<Principal>, sqlx::Error> {
        let state = self.state.lock().unwrap();
        Ok(state.principals.iter().find(|p| p.email == email).cloned())
    }

    async fn create_account(
        &self,
        principal: CreatePrincipal,
        tenant: CreateTenant,
        role: MemberRole,
    ) -> Result<(Principal, Tenant, Membership), sqlx::Error> {
        // Mirrors the transactional contract: on failure, nothing commits.
        if self.fail_next_account_write.swap(false, Ordering::SeqCst) {
            return Err(sqlx::Error::PoolClosed);
        }

        let now = Utc::now();
        let principal = Principal {
            id: Uuid::new_v4(),
            email: principal.email,
            credential_hash: principal.credential_hash,
            display_name: principal.display_name,
            active: true,
            verified: false,
            created_at: now,
            updated_at: now,
            last_login_at: None,
        };
        let tenant = Tenant {
            id: Uuid::new_v4(),
            name: tenant.name,
            slug: tenant.slug,
            tier: SubscriptionTier::Trial,
            status: SubscriptionStatus::Trial,
            trial_ends_at: tenant.trial_ends_at,
            created_at: now,
            updated_at: now,
        };
        let membership = Membership {
            id: Uuid::new_v4(),
            tenant_id: tenant.id,
            principal_id: principal.id,
            role,
            created_at: now,
        };

        let mut state = self.state.lock().unwrap();
        state.principals.push(principal.clone());
        state.tenants.push(tenant.clone());
        state.memberships.push(membership.clone());

        Ok((principal, tenant, membership))
    }

    async fn touch_last_login(&self, id: Uuid, now: DateTime<Utc>) -> Result<bool, sqlx::Error> {
        let mut state = self.state.lock().unwrap();
        match state.principals.iter_mut().find(|p| p.id == id) {
            Some(principal) => {
                principal.last_login_at = Some(now);
                principal.updated_at = now;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn deactivate_principal(&self, id: Uuid) -> Result<bool, sqlx::Error> {
        let mut state = self.state.lock().unwrap();
        match state.principals.iter_mut().find(|p| p.id == id) {
            Some(principal) => {
                principal.active = false;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

#[async_trait]
impl TenancyStore for MemoryDirectory {
    async fn find_tenant(&self, id: Uuid) -> Result<Option<Tenant>, sqlx::Error> {
        let state = self.state.lock().unwrap();
        Ok(state.tenants.iter().find(|t| t.id == id).cloned())
    }

    async fn find_membership(
        &self,
        tenant_id: Uuid,
        principal_id: Uuid,
    ) -> Result<Option<Membership>, sqlx::Error> {
        let state = self.state.lock().unwrap();
        Ok(state
            .memberships
            .iter()
            .find(|m| m.tenant_id == tenant_id && m.principal_id == principal_id)
            .cloned())
    }

    async fn primary_membership(
        &self,
        principal_id: Uuid,
    ) -> Result<Option<Membership>, sqlx::Error> {
        let state = self.state.lock().unwrap();
        // Same ordering as the Postgres query: (created_at, id) ascending.
        Ok(state
            .memberships
            .iter()
            .filter(|m| m.principal_id == principal_id)
            .min_by_key(|m| (m.created_at, m.id))
            .cloned())
    }
}
