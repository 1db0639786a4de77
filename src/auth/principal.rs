/// Principal resolution
///
/// Turns a verified access token into a live principal. The three failure
/// kinds (wrong token type, unknown subject, disabled principal) collapse to
/// the same externally visible "unauthenticated" response but stay distinct
/// internally for diagnostics.

use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::{debug, warn};

use crate::auth::token::TokenService;
use crate::error::AuthError;
use crate::models::principal::Principal;
use crate::store::PrincipalStore;

/// Resolves access tokens to live principals
#[derive(Clone)]
pub struct PrincipalResolver {
    tokens: TokenService,
    store: Arc<dyn PrincipalStore>,
}

impl PrincipalResolver {
    pub fn new(tokens: TokenService, store: Arc<dyn PrincipalStore>) -> Self {
        Self { tokens, store }
    }

    /// Resolves a bearer token to its live principal
    ///
    /// Verifies the token (rejecting refresh tokens with `WrongTokenType`),
    /// loads the subject, and checks liveness. A disabled principal's
    /// outstanding tokens are rejected here even though their signatures
    /// remain valid until natural expiry; that window is the price of having
    /// no server-side revocation store.
    ///
    /// # Errors
    ///
    /// `Token(_)`, `PrincipalNotFound`, or `PrincipalDisabled`, all of which
    /// render as the same generic 401 at the boundary.
    pub async fn resolve(
        &self,
        bearer: &str,
        now: DateTime<Utc>,
    ) -> Result<Principal, AuthError> {
        let claims = self.tokens.verify_access(bearer, now)?;

        let principal = self
            .store
            .find_principal(claims.sub)
            .await?
            .ok_or(AuthError::PrincipalNotFound)?;

        if !principal.active {
            warn!(principal_id = %principal.id, "disabled principal presented a valid token");
            return Err(AuthError::PrincipalDisabled);
        }

        debug!(principal_id = %principal.id, "resolved principal");
        Ok(principal)
    }
}
