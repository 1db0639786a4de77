/// Tenant model and database operations
///
/// A tenant is an organisation: the unit of billing and data isolation.
/// Every principal belongs to one or more tenants via the membership model.
/// Subscription tier and status are closed enumerations so an invalid tier
/// string is unrepresentable rather than silently ranked as zero.
///
/// # Schema
///
/// ```sql
/// CREATE TYPE subscription_tier AS ENUM ('trial', 'essentials', 'professional', 'enterprise');
/// CREATE TYPE subscription_status AS ENUM ('active', 'trial', 'past_due', 'cancelled', 'paused');
///
/// CREATE TABLE tenants (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     name VARCHAR(255) NOT NULL,
///     slug VARCHAR(100) NOT NULL UNIQUE,
///     tier subscription_tier NOT NULL DEFAULT 'trial',
///     status subscription_status NOT NULL DEFAULT 'trial',
///     trial_ends_at TIMESTAMPTZ,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{PgExecutor, PgPool};
use std::fmt;
use uuid::Uuid;

/// Subscription tier, totally ordered
///
/// Variant order is the privilege order, so the derived `Ord` agrees with
/// [`SubscriptionTier::rank`]: trial < essentials < professional < enterprise.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, sqlx::Type,
)]
#[sqlx(type_name = "subscription_tier", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionTier {
    /// Time-limited evaluation tier
    Trial,

    /// Entry paid tier
    Essentials,

    /// Mid paid tier
    Professional,

    /// Top tier, custom pricing
    Enterprise,
}

impl SubscriptionTier {
    /// Numeric rank used for gate comparisons
    pub fn rank(&self) -> u8 {
        match self {
            SubscriptionTier::Trial => 0,
            SubscriptionTier::Essentials => 1,
            SubscriptionTier::Professional => 2,
            SubscriptionTier::Enterprise => 3,
        }
    }

    /// Tier name as stored in the database
    pub fn as_str(&self) -> &'static str {
        match self {
            SubscriptionTier::Trial => "trial",
            SubscriptionTier::Essentials => "essentials",
            SubscriptionTier::Professional => "professional",
            SubscriptionTier::Enterprise => "enterprise",
        }
    }
}

impl fmt::Display for SubscriptionTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Subscription status, driven by billing-provider callbacks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "subscription_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionStatus {
    /// Paid and current
    Active,

    /// In trial period
    Trial,

    /// Payment failed, grace period
    PastDue,

    /// Subscription ended
    Cancelled,

    /// Temporarily paused
    Paused,
}

impl SubscriptionStatus {
    /// Status name as stored in the database
    pub fn as_str(&self) -> &'static str {
        match self {
            SubscriptionStatus::Active => "active",
            SubscriptionStatus::Trial => "trial",
            SubscriptionStatus::PastDue => "past_due",
            SubscriptionStatus::Cancelled => "cancelled",
            SubscriptionStatus::Paused => "paused",
        }
    }
}

impl fmt::Display for SubscriptionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Tenant record
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Tenant {
    /// Unique tenant ID
    pub id: Uuid,

    /// Organisation name
    pub name: String,

    /// URL-friendly unique identifier
    pub slug: String,

    /// Current subscription tier
    pub tier: SubscriptionTier,

    /// Current subscription status
    pub status: SubscriptionStatus,

    /// When the trial period ends, if one was started
    pub trial_ends_at: Option<DateTime<Utc>>,

    /// When the tenant was created
    pub created_at: DateTime<Utc>,

    /// When the tenant was last updated
    pub updated_at: DateTime<Utc>,
}

impl Tenant {
    /// True if this tenant started a trial that has since lapsed
    pub fn trial_expired(&self, now: DateTime<Utc>) -> bool {
        match self.trial_ends_at {
            Some(ends_at) => now >= ends_at,
            None => false,
        }
    }
}

/// Input for creating a new tenant
#[derive(Debug, Clone)]
pub struct CreateTenant {
    /// Organisation name
    pub name: String,

    /// Unique slug (see `auth::session::generate_slug`)
    pub slug: String,

    /// Optional trial deadline
    pub trial_ends_at: Option<DateTime<Utc>>,
}

impl Tenant {
    /// Creates a new tenant on the trial tier with trial status
    ///
    /// Takes any executor so it can run inside the registration transaction.
    pub async fn create(
        executor: impl PgExecutor<'_>,
        data: CreateTenant,
    ) -> Result<Self, sqlx::Error> {
        let tenant = sqlx::query_as::<_, Tenant>(
            r#"
            INSERT INTO tenants (name, slug, trial_ends_at)
            VALUES ($1, $2, $3)
            RETURNING id, name, slug, tier, status, trial_ends_at, created_at, updated_at
            "#,
        )
        .bind(data.name)
        .bind(data.slug)
        .bind(data.trial_ends_at)
        .fetch_one(executor)
        .await?;

        Ok(tenant)
    }

    /// Finds a tenant by ID
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let tenant = sqlx::query_as::<_, Tenant>(
            r#"
            SELECT id, name, slug, tier, status, trial_ends_at, created_at, updated_at
            FROM tenants
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(tenant)
    }

    /// Updates tier and status together (billing-provider callbacks)
    pub async fn update_subscription(
        pool: &PgPool,
        id: Uuid,
        tier: SubscriptionTier,
        status: SubscriptionStatus,
    ) -> Result<Option<Self>, sqlx::Error> {
        let tenant = sqlx::query_as::<_, Tenant>(
            r#"
            UPDATE tenants
            SET tier = $2, status = $3, updated_at = NOW()
            WHERE id = $1
            RETURNING id, name, slug, tier, status, trial_ends_at, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(tier)
        .bind(status)
        .fetch_optional(pool)
        .await?;

        Ok(tenant)
    }

    /// Deletes a tenant; memberships cascade
    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM tenants WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
