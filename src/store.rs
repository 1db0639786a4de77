/// Storage collaborator traits
///
/// The resolvers and session flows never touch Postgres directly; they go
/// through these traits. [`PgDirectory`] is the production implementation,
/// delegating to the model methods. Tests substitute an in-memory
/// implementation, so the whole resolution pipeline runs without a database.
///
/// Lookup timeouts and retries are the collaborator's responsibility; the
/// core never retries and holds no shared mutable state across requests.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::membership::{CreateMembership, MemberRole, Membership};
use crate::models::principal::{CreatePrincipal, Principal};
use crate::models::tenant::{CreateTenant, Tenant};

/// Principal lookup and lifecycle operations
#[async_trait]
pub trait PrincipalStore: Send + Sync {
    /// Loads a principal by ID
    async fn find_principal(&self, id: Uuid) -> Result<Option<Principal>, sqlx::Error>;

    /// Loads a principal by email (login path)
    async fn find_principal_by_email(&self, email: &str)
        -> Result<Option<Principal>, sqlx::Error>;

    /// Atomically creates a principal, its tenant, and the linking membership
    ///
    /// All three writes commit together or not at all: a failure partway
    /// through must leave no principal, no tenant, and no membership behind,
    /// so an ownerless tenant can never be observed.
    async fn create_account(
        &self,
        principal: CreatePrincipal,
        tenant: CreateTenant,
        role: MemberRole,
    ) -> Result<(Principal, Tenant, Membership), sqlx::Error>;

    /// Records a successful login
    async fn touch_last_login(&self, id: Uuid, now: DateTime<Utc>) -> Result<bool, sqlx::Error>;

    /// Disables a principal (soft delete)
    async fn deactivate_principal(&self, id: Uuid) -> Result<bool, sqlx::Error>;
}

/// Tenant and membership lookup operations
#[async_trait]
pub trait TenancyStore: Send + Sync {
    /// Loads a tenant by ID
    async fn find_tenant(&self, id: Uuid) -> Result<Option<Tenant>, sqlx::Error>;

    /// Loads a specific membership
    async fn find_membership(
        &self,
        tenant_id: Uuid,
        principal_id: Uuid,
    ) -> Result<Option<Membership>, sqlx::Error>;

    /// Loads the principal's primary membership (earliest created)
    async fn primary_membership(
        &self,
        principal_id: Uuid,
    ) -> Result<Option<Membership>, sqlx::Error>;
}

/// Postgres-backed implementation of both store traits
#[derive(Clone)]
pub struct PgDirectory {
    pool: PgPool,
}

impl PgDirectory {
    /// Wraps an existing connection pool
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Access to the underlying pool (for the boundary layer's own queries)
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl PrincipalStore for PgDirectory {
    async fn find_principal(&self, id: Uuid) -> Result<Option<Principal>, sqlx::Error> {
        Principal::find_by_id(&self.pool, id).await
    }

    async fn find_principal_by_email(
        &self,
        email: &str,
    ) -> Result<Option<Principal>, sqlx::Error> {
        Principal::find_by_email(&self.pool, email).await
    }

    async fn create_account(
        &self,
        principal: CreatePrincipal,
        tenant: CreateTenant,
        role: MemberRole,
    ) -> Result<(Principal, Tenant, Membership), sqlx::Error> {
        let mut tx = self.pool.begin().await?;

        let principal = Principal::create(&mut *tx, principal).await?;
        let tenant = Tenant::create(&mut *tx, tenant).await?;
        let membership = Membership::create(
            &mut *tx,
            CreateMembership {
                tenant_id: tenant.id,
                principal_id: principal.id,
                role,
            },
        )
        .await?;

        tx.commit().await?;

        Ok((principal, tenant, membership))
    }

    async fn touch_last_login(&self, id: Uuid, now: DateTime<Utc>) -> Result<bool, sqlx::Error> {
        Principal::update_last_login(&self.pool, id, now).await
    }

    async fn deactivate_principal(&self, id: Uuid) -> Result<bool, sqlx::Error> {
        Principal::deactivate(&self.pool, id).await
    }
}

#[async_trait]
impl TenancyStore for PgDirectory {
    async fn find_tenant(&self, id: Uuid) -> Result<Option<Tenant>, sqlx::Error> {
        Tenant::find_by_id(&self.pool, id).await
    }

    async fn find_membership(
        &self,
        tenant_id: Uuid,
        principal_id: Uuid,
    ) -> Result<Option<Membership>, sqlx::Error> {
        Membership::find(&self.pool, tenant_id, principal_id).await
    }

    async fn primary_membership(
        &self,
        principal_id: Uuid,
    ) -> Result<Option<Membership>, sqlx::Error> {
        Membership::primary_for_principal(&self.pool, principal_id).await
    }
}
