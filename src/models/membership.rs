/// Membership model and database operations
///
/// A membership links one principal to one tenant with a role. A principal
/// may hold memberships in multiple tenants; the "primary" membership is the
/// earliest created one, which keeps single-tenant resolution deterministic.
///
/// # Schema
///
/// ```sql
/// CREATE TYPE member_role AS ENUM ('viewer', 'member', 'admin', 'owner');
///
/// CREATE TABLE memberships (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     tenant_id UUID NOT NULL REFERENCES tenants(id) ON DELETE CASCADE,
///     principal_id UUID NOT NULL REFERENCES principals(id) ON DELETE CASCADE,
///     role member_role NOT NULL DEFAULT 'member',
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     UNIQUE (tenant_id, principal_id)
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{PgExecutor, PgPool};
use std::fmt;
use uuid::Uuid;

/// Role of a principal within a tenant, totally ordered by privilege
///
/// Variant order is ascending privilege so the derived `Ord` agrees with
/// [`MemberRole::rank`]: viewer < member < admin < owner.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, sqlx::Type,
)]
#[sqlx(type_name = "member_role", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum MemberRole {
    /// Read-only access
    Viewer,

    /// Standard access
    Member,

    /// Can manage members and settings
    Admin,

    /// Full control, including billing and tenant deletion
    Owner,
}

impl MemberRole {
    /// Numeric rank used for gate comparisons
    pub fn rank(&self) -> u8 {
        match self {
            MemberRole::Viewer => 0,
            MemberRole::Member => 1,
            MemberRole::Admin => 2,
            MemberRole::Owner => 3,
        }
    }

    /// Role name as stored in the database
    pub fn as_str(&self) -> &'static str {
        match self {
            MemberRole::Viewer => "viewer",
            MemberRole::Member => "member",
            MemberRole::Admin => "admin",
            MemberRole::Owner => "owner",
        }
    }

    /// True if this role meets or exceeds `required`
    pub fn satisfies(&self, required: MemberRole) -> bool {
        self.rank() >= required.rank()
    }
}

impl fmt::Display for MemberRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Membership record
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Membership {
    /// Unique membership ID
    pub id: Uuid,

    /// Tenant the principal belongs to
    pub tenant_id: Uuid,

    /// Member principal
    pub principal_id: Uuid,

    /// Role within the tenant
    pub role: MemberRole,

    /// When the membership was created
    pub created_at: DateTime<Utc>,
}

/// Input for creating a new membership
#[derive(Debug, Clone)]
pub struct CreateMembership {
    /// Tenant ID
    pub tenant_id: Uuid,

    /// Principal ID
    pub principal_id: Uuid,

    /// Role to assign
    pub role: MemberRole,
}

impl Membership {
    /// Creates a membership (adds a principal to a tenant)
    ///
    /// # Errors
    ///
    /// Returns an error if the membership already exists (unique constraint)
    /// or either side of the relation is missing (foreign key).
    pub async fn create(
        executor: impl PgExecutor<'_>,
        data: CreateMembership,
    ) -> Result<Self, sqlx::Error> {
        let membership = sqlx::query_as::<_, Membership>(
            r#"
            INSERT INTO memberships (tenant_id, principal_id, role)
            VALUES ($1, $2, $3)
            RETURNING id, tenant_id, principal_id, role, created_at
            "#,
        )
        .bind(data.tenant_id)
        .bind(data.principal_id)
        .bind(data.role)
        .fetch_one(executor)
        .await?;

        Ok(membership)
    }

    /// Finds a specific membership
    pub async fn find(
        pool: &PgPool,
        tenant_id: Uuid,
        principal_id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error> {
        let membership = sqlx::query_as::<_, Membership>(
            r#"
            SELECT id, tenant_id, principal_id, role, created_at
            FROM memberships
            WHERE tenant_id = $1 AND principal_id = $2
            "#,
        )
        .bind(tenant_id)
        .bind(principal_id)
        .fetch_optional(pool)
        .await?;

        Ok(membership)
    }

    /// Finds the principal's primary membership
    ///
    /// Primary = earliest created, with the membership ID as a tie-break, so
    /// multi-tenant principals resolve to the same tenant on every request.
    pub async fn primary_for_principal(
        pool: &PgPool,
        principal_id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error> {
        let membership = sqlx::query_as::<_, Membership>(
            r#"
            SELECT id, tenant_id, principal_id, role, created_at
            FROM memberships
            WHERE principal_id = $1
            ORDER BY created_at ASC, id ASC
            LIMIT 1
            "#,
        )
        .bind(principal_id)
        .fetch_optional(pool)
        .await?;

        Ok(membership)
    }

    /// Lists all memberships a principal holds, oldest first
    pub async fn list_by_principal(
        pool: &PgPool,
        principal_id: Uuid,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let memberships = sqlx::query_as::<_, Membership>(
            r#"
            SELECT id, tenant_id, principal_id, role, created_at
            FROM memberships
            WHERE principal_id = $1
            ORDER BY created_at ASC, id ASC
            "#,
        )
        .bind(principal_id)
        .fetch_all(pool)
        .await?;

        Ok(memberships)
    }

    /// Lists all members of a tenant, oldest first
    pub async fn list_by_tenant(pool: &PgPool, tenant_id: Uuid) -> Result<Vec<Self>, sqlx::Error> {
        let memberships = sqlx::query_as::<_, Membership>(
            r#"
            SELECT id, tenant_id, principal_id, role, created_at
            FROM memberships
            WHERE tenant_id = $1
            ORDER BY created_at ASC, id ASC
            "#,
        )
        .bind(tenant_id)
        .fetch_all(pool)
        .await?;

        Ok(memberships)
    }

    /// Changes a member's role
    pub async fn update_role(
        pool: &PgPool,
        tenant_id: Uuid,
        principal_id: Uuid,
        role: MemberRole,
    ) -> Result<Option<Self>, sqlx::Error> {
        let membership = sqlx::query_as::<_, Membership>(
            r#"
            UPDATE memberships
            SET role = $3
            WHERE tenant_id = $1 AND principal_id = $2
            RETURNING id, tenant_id, principal_id, role, created_at
            "#,
        )
        .bind(tenant_id)
        .bind(principal_id)
        .bind(role)
        .fetch_optional(pool)
        .await?;

        Ok(membership)
    }

    /// Removes a principal from a tenant
    pub async fn delete(
        pool: &PgPool,
        tenant_id: Uuid,
        principal_id: Uuid,
    ) -> Result<bool, sqlx::Error> {
        let result =
            sqlx::query("DELETE FROM memberships WHERE tenant_id = $1 AND principal_id = $2")
                .bind(tenant_id)
                .bind(principal_id)
                .execute(pool)
                .await?;

        Ok(result.rows_affected() > 0)
    }
}
