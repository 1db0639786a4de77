/// Crate-wide error taxonomy
///
/// Every failure the core can produce is one of these variants. All of them
/// are recoverable at the boundary (never process-fatal), and none of them
/// carries sensitive payloads: no plaintext password, no raw token, no
/// signing secret.
///
/// # Boundary mapping
///
/// Authentication failures (`Token*`, `Principal*`, `BadCredentials`) map to
/// HTTP 401 and render a deliberately vague public message so account
/// existence cannot be probed. Authorization failures (`NoMembership`,
/// `TenantNotFound`, `Insufficient*`) map to HTTP 403 and render the
/// required-vs-actual detail so the caller can build an upgrade prompt.
/// Use [`AuthError::is_authorization`] and [`AuthError::public_message`] to
/// implement that mapping.

use crate::auth::password::PasswordError;
use crate::auth::token::TokenError;
use crate::models::membership::MemberRole;
use crate::models::tenant::SubscriptionTier;

/// Result alias used throughout the crate
pub type AuthResult<T> = Result<T, AuthError>;

/// Unified error type for authentication and authorization
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// Token failed verification (malformed, tampered, expired, wrong type)
    #[error(transparent)]
    Token(#[from] TokenError),

    /// Token subject does not map to any principal
    #[error("principal not found")]
    PrincipalNotFound,

    /// Principal exists but has been disabled (soft-deleted)
    #[error("principal is disabled")]
    PrincipalDisabled,

    /// Login failed: unknown email or wrong password (never distinguished)
    #[error("invalid email or password")]
    BadCredentials,

    /// Registration failed: email already has an account
    #[error("a user with this email already exists")]
    EmailTaken,

    /// Registration failed: password does not meet the strength rules
    #[error("password does not meet strength requirements: {0}")]
    WeakPassword(String),

    /// Principal has no membership in the requested tenant (or none at all)
    #[error("not a member of any matching organisation")]
    NoMembership,

    /// Membership points at a tenant that no longer exists
    #[error("tenant not found")]
    TenantNotFound,

    /// Tenant's subscription tier is below the required tier
    #[error("requires {required} tier or higher, current tier is {actual}")]
    InsufficientTier {
        required: SubscriptionTier,
        actual: SubscriptionTier,
    },

    /// Membership role is below the required role
    #[error("requires {required} role or higher, current role is {actual}")]
    InsufficientRole {
        required: MemberRole,
        actual: MemberRole,
    },

    /// Credential hashing failed
    #[error(transparent)]
    Password(#[from] PasswordError),

    /// Storage collaborator failed
    #[error("storage error: {0}")]
    Store(#[from] sqlx::Error),
}

impl AuthError {
    /// True for authorization failures (boundary maps these to HTTP 403)
    ///
    /// Everything else is an authentication failure (401) or an internal
    /// failure (`Password`, `Store` -> 500), except the registration
    /// validation failures: `EmailTaken` maps to 409 and `WeakPassword`
    /// to 422.
    pub fn is_authorization(&self) -> bool {
        matches!(
            self,
            AuthError::NoMembership
                | AuthError::TenantNotFound
                | AuthError::InsufficientTier { .. }
                | AuthError::InsufficientRole { .. }
        )
    }

    /// True for authentication failures (boundary maps these to HTTP 401)
    pub fn is_authentication(&self) -> bool {
        matches!(
            self,
            AuthError::Token(_)
                | AuthError::PrincipalNotFound
                | AuthError::PrincipalDisabled
                | AuthError::BadCredentials
        )
    }

    /// User-facing message
    ///
    /// Vague on authentication, precise on authorization: authentication
    /// failures collapse to one generic string so callers cannot enumerate
    /// accounts or distinguish "no such user" from "wrong password", while
    /// authorization failures spell out the required tier/role so the
    /// boundary can render an upgrade prompt.
    pub fn public_message(&self) -> String {
        match self {
            AuthError::InsufficientTier { required, actual } => format!(
                "This feature requires the {required} subscription or higher. Current tier: {actual}"
            ),
            AuthError::InsufficientRole { required, actual } => format!(
                "This action requires the {required} role or higher. Current role: {actual}"
            ),
            AuthError::NoMembership => {
                "You are not a member of this organisation".to_string()
            }
            AuthError::TenantNotFound => "Organisation not found".to_string(),
            AuthError::EmailTaken => {
                "A user with this email already exists".to_string()
            }
            // The caller chose this password, so the reason is theirs to see.
            AuthError::WeakPassword(reason) => reason.clone(),
            AuthError::Password(_) | AuthError::Store(_) => {
                "Internal server error".to_string()
            }
            _ => "Invalid or expired credentials".to_string(),
        }
    }
}
