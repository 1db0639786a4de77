/// Token issuance and verification
///
/// Self-describing, signed bearer tokens (JWT, HS256 by default) carrying a
/// subject identity and a token kind. Tokens are never persisted; the only
/// way one stops working before expiry is the principal behind it being
/// disabled, which `PrincipalResolver` enforces at resolution time. There is
/// no server-side revocation store, so a stolen access token stays valid for
/// up to its lifetime.
///
/// # Token kinds
///
/// Access and refresh tokens are distinguishable from the payload's `type`
/// claim alone. A refresh token is never accepted where an access token is
/// required and vice versa; this is a security invariant, not a convenience
/// ([`TokenService::verify_access`] / [`TokenService::verify_refresh`]).
///
/// # Time
///
/// Every operation takes wall-clock `now` from the caller. The library's own
/// expiry validation is disabled and `exp` is checked against the supplied
/// instant, so tests can simulate expiry deterministically.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{
    decode, decode_header, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header,
    Validation,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use uuid::Uuid;

/// Issuer claim stamped into every token
pub const ISSUER: &str = "aegis";

/// Default access token lifetime (30 minutes)
pub const DEFAULT_ACCESS_TTL_SECS: i64 = 1800;

/// Default refresh token lifetime (7 days)
pub const DEFAULT_REFRESH_TTL_SECS: i64 = 7 * 24 * 3600;

/// Error type for token operations
///
/// `Expired`, `Tampered`, and `Malformed` are deliberately distinct: the
/// boundary may react differently (expired -> prompt a refresh, tampered ->
/// hard fail). None of the variants echoes the token itself.
#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    /// Token is structurally invalid (not a JWT, bad claims, wrong issuer)
    #[error("token is malformed")]
    Malformed,

    /// Signature does not verify (wrong key, modified payload, swapped algorithm)
    #[error("token signature is invalid")]
    Tampered,

    /// Token was valid once but `now` is past its expiry
    #[error("token has expired")]
    Expired,

    /// Token is valid but of the wrong kind for this operation
    #[error("expected {expected} token, got {actual}")]
    WrongTokenType {
        expected: TokenKind,
        actual: TokenKind,
    },

    /// Failed to sign a new token
    #[error("failed to sign token: {0}")]
    Signing(String),
}

/// Token kind, carried in the `type` claim
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    /// Short-lived, authenticates API requests
    Access,

    /// Long-lived, exchanged for new token pairs
    Refresh,
}

impl TokenKind {
    /// Kind as it appears in the claim
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenKind::Access => "access",
            TokenKind::Refresh => "refresh",
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Signed token payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: the principal's ID
    pub sub: Uuid,

    /// Issuer, always [`ISSUER`]
    pub iss: String,

    /// Issued-at (Unix timestamp)
    pub iat: i64,

    /// Expiry (Unix timestamp); `now < exp` must hold at verification
    pub exp: i64,

    /// Token kind; serialized as `type`
    #[serde(rename = "type")]
    pub kind: TokenKind,
}

/// Token service configuration
///
/// An explicit value passed in at construction, never process-wide mutable
/// state, so tests can run with distinct secrets and lifetimes.
#[derive(Clone)]
pub struct TokenConfig {
    /// HMAC signing secret; at least 32 bytes
    pub secret: String,

    /// Signing algorithm (HS256 by default)
    pub algorithm: Algorithm,

    /// Access token lifetime
    pub access_ttl: Duration,

    /// Refresh token lifetime
    pub refresh_ttl: Duration,
}

impl TokenConfig {
    /// Builds a config with the default algorithm and lifetimes
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
            algorithm: Algorithm::HS256,
            access_ttl: Duration::seconds(DEFAULT_ACCESS_TTL_SECS),
            refresh_ttl: Duration::seconds(DEFAULT_REFRESH_TTL_SECS),
        }
    }
}

// The secret must never end up in logs, so Debug redacts it.
impl fmt::Debug for TokenConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenConfig")
            .field("secret", &"<redacted>")
            .field("algorithm", &self.algorithm)
            .field("access_ttl", &self.access_ttl)
            .field("refresh_ttl", &self.refresh_ttl)
            .finish()
    }
}

/// Key lookup seam
///
/// The default [`StaticKey`] holds one process-wide key pair derived from the
/// configured secret. Key rotation can be added by implementing this trait
/// with a lookup on the token header (e.g. by `kid`) without changing the
/// verify contract.
pub trait KeyProvider: Send + Sync {
    /// Key used to sign newly issued tokens
    fn encoding_key(&self) -> &EncodingKey;

    /// Key used to verify the given token header
    fn decoding_key(&self, header: &Header) -> Result<DecodingKey, TokenError>;
}

/// Single static HMAC key derived from the configured secret
pub struct StaticKey {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl StaticKey {
    /// Derives the key pair from a shared secret
    pub fn from_secret(secret: &str) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
        }
    }
}

impl KeyProvider for StaticKey {
    fn encoding_key(&self) -> &EncodingKey {
        &self.encoding
    }

    fn decoding_key(&self, _header: &Header) -> Result<DecodingKey, TokenError> {
        Ok(self.decoding.clone())
    }
}

/// Issues and verifies signed, time-bounded bearer tokens
#[derive(Clone)]
pub struct TokenService {
    algorithm: Algorithm,
    access_ttl: Duration,
    refresh_ttl: Duration,
    keys: Arc<dyn KeyProvider>,
}

impl TokenService {
    /// Creates a service with a static key derived from the config's secret
    pub fn new(config: TokenConfig) -> Self {
        let keys = Arc::new(StaticKey::from_secret(&config.secret));
        Self::with_key_provider(config, keys)
    }

    /// Creates a service with a custom key provider (e.g. for rotation)
    pub fn with_key_provider(config: TokenConfig, keys: Arc<dyn KeyProvider>) -> Self {
        Self {
            algorithm: config.algorithm,
            access_ttl: config.access_ttl,
            refresh_ttl: config.refresh_ttl,
            keys,
        }
    }

    /// Access token lifetime (for `expires_in` fields at the boundary)
    pub fn access_ttl(&self) -> Duration {
        self.access_ttl
    }

    /// Issues an access token for `subject`, expiring at `now + access_ttl`
    pub fn issue_access(&self, subject: Uuid, now: DateTime<Utc>) -> Result<String, TokenError> {
        self.issue(subject, TokenKind::Access, self.access_ttl, now)
    }

    /// Issues a refresh token for `subject`, expiring at `now + refresh_ttl`
    pub fn issue_refresh(&self, subject: Uuid, now: DateTime<Utc>) -> Result<String, TokenError> {
        self.issue(subject, TokenKind::Refresh, self.refresh_ttl, now)
    }

    fn issue(
        &self,
        subject: Uuid,
        kind: TokenKind,
        ttl: Duration,
        now: DateTime<Utc>,
    ) -> Result<String, TokenError> {
        let claims = Claims {
            sub: subject,
            iss: ISSUER.to_string(),
            iat: now.timestamp(),
            exp: (now + ttl).timestamp(),
            kind,
        };

        let header = Header::new(self.algorithm);
        encode(&header, &claims, self.keys.encoding_key())
            .map_err(|e| TokenError::Signing(e.to_string()))
    }

    /// Verifies signature integrity and expiry against `now`
    ///
    /// # Errors
    ///
    /// - [`TokenError::Malformed`] if the token is not structurally a token
    ///   this service issued (bad format, bad claims, wrong issuer)
    /// - [`TokenError::Tampered`] if the signature does not verify or the
    ///   header advertises a different algorithm
    /// - [`TokenError::Expired`] if `now` is at or past the `exp` claim
    pub fn verify(&self, token: &str, now: DateTime<Utc>) -> Result<Claims, TokenError> {
        let header = decode_header(token).map_err(|_| TokenError::Malformed)?;

        // An attacker swapping the algorithm is tampering, not a formatting
        // accident.
        if header.alg != self.algorithm {
            return Err(TokenError::Tampered);
        }

        let key = self.keys.decoding_key(&header)?;

        let mut validation = Validation::new(self.algorithm);
        validation.set_issuer(&[ISSUER]);
        // Expiry is checked below against the injected instant.
        validation.validate_exp = false;

        let data = decode::<Claims>(token, &key, &validation).map_err(|e| match e.kind() {
            ErrorKind::InvalidSignature => TokenError::Tampered,
            _ => TokenError::Malformed,
        })?;

        let claims = data.claims;
        if now.timestamp() >= claims.exp {
            return Err(TokenError::Expired);
        }

        Ok(claims)
    }

    /// Verifies the token and requires it to be an access token
    pub fn verify_access(&self, token: &str, now: DateTime<Utc>) -> Result<Claims, TokenError> {
        self.verify_kind(token, TokenKind::Access, now)
    }

    /// Verifies the token and requires it to be a refresh token
    pub fn verify_refresh(&self, token: &str, now: DateTime<Utc>) -> Result<Claims, TokenError> {
        self.verify_kind(token, TokenKind::Refresh, now)
    }

    fn verify_kind(
        &self,
        token: &str,
        expected: TokenKind,
        now: DateTime<Utc>,
    ) -> Result<Claims, TokenError> {
        let claims = self.verify(token, now)?;

        if claims.kind != expected {
            return Err(TokenError::WrongTokenType {
                expected,
                actual: claims.kind,
            });
        }

        Ok(claims)
    }
}
