/// Principal model and database operations
///
/// A principal is an authenticated identity (a user). Principals are never
/// hard-deleted: [`Principal::deactivate`] flips the `active` flag instead,
/// which causes every subsequent token resolution for that principal to be
/// rejected (see `auth::principal`).
///
/// # Schema
///
/// ```sql
/// CREATE TABLE principals (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     email VARCHAR(255) NOT NULL UNIQUE,
///     credential_hash VARCHAR(255) NOT NULL,
///     display_name VARCHAR(255),
///     active BOOLEAN NOT NULL DEFAULT TRUE,
///     verified BOOLEAN NOT NULL DEFAULT FALSE,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     last_login_at TIMESTAMPTZ
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{PgExecutor, PgPool};
use uuid::Uuid;

/// Principal record
///
/// The `credential_hash` field is deliberately excluded from serialization:
/// it must never appear in API responses or logs.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Principal {
    /// Unique principal ID
    pub id: Uuid,

    /// Email address (unique, used for login)
    pub email: String,

    /// Argon2id digest of the password (salt embedded)
    #[serde(skip_serializing)]
    pub credential_hash: String,

    /// Optional display name
    pub display_name: Option<String>,

    /// Liveness flag; false means disabled (soft-deleted)
    pub active: bool,

    /// Email verification flag
    pub verified: bool,

    /// When the principal registered
    pub created_at: DateTime<Utc>,

    /// When the record was last updated
    pub updated_at: DateTime<Utc>,

    /// Last successful login, if any
    pub last_login_at: Option<DateTime<Utc>>,
}

/// Input for creating a new principal
#[derive(Debug, Clone)]
pub struct CreatePrincipal {
    /// Email address
    pub email: String,

    /// Pre-hashed credential (see `auth::password::hash_password`)
    pub credential_hash: String,

    /// Optional display name
    pub display_name: Option<String>,
}

impl Principal {
    /// Creates a new principal (active, unverified)
    ///
    /// Takes any executor so it can run standalone or inside the
    /// registration transaction (see `store::PgDirectory::create_account`).
    ///
    /// # Errors
    ///
    /// Returns an error on duplicate email (unique constraint violation) or
    /// if the database connection fails.
    pub async fn create(
        executor: impl PgExecutor<'_>,
        data: CreatePrincipal,
    ) -> Result<Self, sqlx::Error> {
        let principal = sqlx::query_as::<_, Principal>(
            r#"
            INSERT INTO principals (email, credential_hash, display_name)
            VALUES ($1, $2, $3)
            RETURNING id, email, credential_hash, display_name, active, verified,
                      created_at, updated_at, last_login_at
            "#,
        )
        .bind(data.email)
        .bind(data.credential_hash)
        .bind(data.display_name)
        .fetch_one(executor)
        .await?;

        Ok(principal)
    }

    /// Finds a principal by ID
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let principal = sqlx::query_as::<_, Principal>(
            r#"
            SELECT id, email, credential_hash, display_name, active, verified,
                   created_at, updated_at, last_login_at
            FROM principals
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(principal)
    }

    /// Finds a principal by email (login path)
    pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<Self>, sqlx::Error> {
        let principal = sqlx::query_as::<_, Principal>(
            r#"
            SELECT id, email, credential_hash, display_name, active, verified,
                   created_at, updated_at, last_login_at
            FROM principals
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(pool)
        .await?;

        Ok(principal)
    }

    /// Records a successful login
    ///
    /// Returns true if the principal existed.
    pub async fn update_last_login(
        pool: &PgPool,
        id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE principals SET last_login_at = $2, updated_at = NOW() WHERE id = $1",
        )
        .bind(id)
        .bind(now)
        .execute(pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Replaces the stored credential hash (password change / reset)
    pub async fn update_credential(
        pool: &PgPool,
        id: Uuid,
        credential_hash: &str,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE principals SET credential_hash = $2, updated_at = NOW() WHERE id = $1",
        )
        .bind(id)
        .bind(credential_hash)
        .execute(pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Marks the principal's email as verified
    pub async fn mark_verified(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE principals SET verified = TRUE, updated_at = NOW() WHERE id = $1",
        )
        .bind(id)
        .execute(pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Disables the principal (soft delete)
    ///
    /// Outstanding tokens for a disabled principal remain cryptographically
    /// valid until expiry, but `PrincipalResolver` rejects them on the next
    /// lookup. There is no hard-delete operation for principals.
    pub async fn deactivate(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE principals SET active = FALSE, updated_at = NOW() WHERE id = $1",
        )
        .bind(id)
        .execute(pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Re-enables a disabled principal
    pub async fn reactivate(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE principals SET active = TRUE, updated_at = NOW() WHERE id = $1",
        )
        .bind(id)
        .execute(pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Principal {
        Principal {
            id: Uuid::new_v4(),
            email: "a@x.com".to_string(),
            credential_hash: "$argon2id$v=19$m=19456,t=2,p=1$abc$def".to_string(),
            display_name: Some("Ada".to_string()),
            active: true,
            verified: false,
            created_at: Utc::now(),
            updated_at: Utc::now(),
            last_login_at: None,
        }
    }

    #[test]
    fn test_credential_hash_never_serialized() {
        let principal = sample();
        let json = serde_json::to_string(&principal).unwrap();
        assert!(!json.contains("credential_hash"));
        assert!(!json.contains("argon2id"));
        assert!(json.contains("a@x.com"));
    }

    // Database operations are covered by the in-memory store in tests/,
    // which mirrors this model's behavior.
}
