/// Session flows: register, login, refresh
///
/// These are the write-side flows the boundary layer calls from its auth
/// endpoints. Registration creates the principal together with its tenant
/// and owner membership; login and refresh hand out token pairs.

use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

use crate::auth::password::{hash_password, validate_password_strength, verify_password};
use crate::auth::token::TokenService;
use crate::error::AuthError;
use crate::models::membership::{MemberRole, Membership};
use crate::models::principal::{CreatePrincipal, Principal};
use crate::models::tenant::{CreateTenant, Tenant};
use crate::store::PrincipalStore;

/// Input for account registration
#[derive(Debug, Clone)]
pub struct NewAccount {
    /// Email address (also the login identifier)
    pub email: String,

    /// Plaintext password; hashed before it reaches any store
    pub password: String,

    /// Optional display name
    pub display_name: Option<String>,

    /// Optional organisation name; defaults from the display name or email
    pub company_name: Option<String>,
}

/// Access + refresh token pair returned by every session flow
#[derive(Debug, Clone, serde::Serialize)]
pub struct TokenPair {
    /// Short-lived access token
    pub access_token: String,

    /// Long-lived refresh token
    pub refresh_token: String,

    /// Always "bearer"
    pub token_type: &'static str,

    /// Access token lifetime in seconds
    pub expires_in: i64,
}

/// Everything created by a successful registration
#[derive(Debug, Clone)]
pub struct RegisteredAccount {
    pub principal: Principal,
    pub tenant: Tenant,
    pub membership: Membership,
    pub tokens: TokenPair,
}

/// Registration, login, and token refresh
#[derive(Clone)]
pub struct SessionService {
    principals: Arc<dyn PrincipalStore>,
    tokens: TokenService,
}

impl SessionService {
    pub fn new(principals: Arc<dyn PrincipalStore>, tokens: TokenService) -> Self {
        Self { principals, tokens }
    }

    /// Registers a new account
    ///
    /// Creates the principal (active, unverified), auto-creates exactly one
    /// tenant on the trial tier, and links them with an owner membership.
    /// The three writes go through one atomic store operation, so a failure
    /// partway through leaves neither a partial account nor an ownerless
    /// tenant behind.
    ///
    /// # Errors
    ///
    /// `WeakPassword` if the password fails the strength rules, `EmailTaken`
    /// if the email already has an account.
    pub async fn register(
        &self,
        account: NewAccount,
        now: DateTime<Utc>,
    ) -> Result<RegisteredAccount, AuthError> {
        validate_password_strength(&account.password).map_err(AuthError::WeakPassword)?;

        if self
            .principals
            .find_principal_by_email(&account.email)
            .await?
            .is_some()
        {
            return Err(AuthError::EmailTaken);
        }

        let credential_hash = hash_password(&account.password)?;

        let tenant_name = account.company_name.unwrap_or_else(|| {
            match &account.display_name {
                Some(name) => format!("{}'s Organisation", name),
                None => format!("{}'s Organisation", local_part(&account.email)),
            }
        });

        let (principal, tenant, membership) = self
            .principals
            .create_account(
                CreatePrincipal {
                    email: account.email.clone(),
                    credential_hash,
                    display_name: account.display_name.clone(),
                },
                CreateTenant {
                    slug: generate_slug(&tenant_name),
                    name: tenant_name,
                    trial_ends_at: None,
                },
                MemberRole::Owner,
            )
            .await?;

        let tokens = self.token_pair(principal.id, now)?;

        info!(principal_id = %principal.id, tenant_id = %tenant.id, "registered new account");

        Ok(RegisteredAccount {
            principal,
            tenant,
            membership,
            tokens,
        })
    }

    /// Authenticates by email and password
    ///
    /// Unknown email and wrong password both yield `BadCredentials`; the
    /// two cases are never distinguishable from outside.
    ///
    /// # Errors
    ///
    /// `BadCredentials` or `PrincipalDisabled`.
    pub async fn login(
        &self,
        email: &str,
        password: &str,
        now: DateTime<Utc>,
    ) -> Result<(Principal, TokenPair), AuthError> {
        let principal = self
            .principals
            .find_principal_by_email(email)
            .await?
            .ok_or(AuthError::BadCredentials)?;

        if !verify_password(password, &principal.credential_hash) {
            return Err(AuthError::BadCredentials);
        }

        if !principal.active {
            return Err(AuthError::PrincipalDisabled);
        }

        self.principals.touch_last_login(principal.id, now).await?;

        let tokens = self.token_pair(principal.id, now)?;

        info!(principal_id = %principal.id, "login succeeded");
        Ok((principal, tokens))
    }

    /// Exchanges a valid refresh token for a fresh token pair
    ///
    /// The subject is re-resolved so a principal disabled since the refresh
    /// token was issued cannot mint new access tokens.
    ///
    /// # Errors
    ///
    /// `Token(_)` (including `WrongTokenType` for an access token),
    /// `PrincipalNotFound`, or `PrincipalDisabled`.
    pub async fn refresh(
        &self,
        refresh_token: &str,
        now: DateTime<Utc>,
    ) -> Result<TokenPair, AuthError> {
        let claims = self.tokens.verify_refresh(refresh_token, now)?;

        let principal = self
            .principals
            .find_principal(claims.sub)
            .await?
            .ok_or(AuthError::PrincipalNotFound)?;

        if !principal.active {
            return Err(AuthError::PrincipalDisabled);
        }

        self.token_pair(principal.id, now)
    }

    fn token_pair(&self, subject: Uuid, now: DateTime<Utc>) -> Result<TokenPair, AuthError> {
        Ok(TokenPair {
            access_token: self.tokens.issue_access(subject, now)?,
            refresh_token: self.tokens.issue_refresh(subject, now)?,
            token_type: "bearer",
            expires_in: self.tokens.access_ttl().num_seconds(),
        })
    }
}

fn local_part(email: &str) -> &str {
    email.split('@').next().unwrap_or(email)
}

/// Generates a URL-friendly unique slug from an organisation name
///
/// Lowercases, collapses runs of non-alphanumerics to single hyphens, and
/// appends a short random suffix for uniqueness.
pub fn generate_slug(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut last_was_hyphen = true; // suppress a leading hyphen

    for c in name.chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
            last_was_hyphen = false;
        } else if !last_was_hyphen {
            slug.push('-');
            last_was_hyphen = true;
        }
    }
    while slug.ends_with('-') {
        slug.pop();
    }

    let suffix = Uuid::new_v4().simple().to_string();
    format!("{}-{}", slug, &suffix[..8])
}
