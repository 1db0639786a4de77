/// Credential hashing using Argon2id
///
/// One-way, salted, deliberately slow hashing so brute-force is
/// computationally expensive. The salt and all parameters are embedded in
/// the PHC-format digest, so no separate storage is needed and parameters
/// can be raised without invalidating existing digests.
///
/// # Parameters
///
/// - Memory: 64 MB
/// - Iterations: 3
/// - Parallelism: 4 lanes
/// - Output: 32 bytes
///
/// # Example
///
/// ```
/// use aegis_auth::auth::password::{hash_password, verify_password};
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let digest = hash_password("correct horse battery staple")?;
/// assert!(verify_password("correct horse battery staple", &digest));
/// assert!(!verify_password("tr0ub4dor&3", &digest));
/// # Ok(())
/// # }
/// ```

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2, ParamsBuilder, Version,
};
use tracing::warn;

/// Error type for credential hashing
#[derive(Debug, thiserror::Error)]
pub enum PasswordError {
    /// Failed to produce a digest
    #[error("failed to hash credential: {0}")]
    Hash(String),
}

fn hasher() -> Result<Argon2<'static>, PasswordError> {
    let params = ParamsBuilder::new()
        .m_cost(65536)
        .t_cost(3)
        .p_cost(4)
        .output_len(32)
        .build()
        .map_err(|e| PasswordError::Hash(format!("invalid parameters: {}", e)))?;

    Ok(Argon2::new(argon2::Algorithm::Argon2id, Version::V0x13, params))
}

/// Hashes a plaintext credential into a PHC-format digest
///
/// A fresh 16-byte salt is drawn from the OS RNG per call, so hashing the
/// same plaintext twice yields different digests.
///
/// # Errors
///
/// Returns `PasswordError::Hash` if digest generation fails.
pub fn hash_password(plaintext: &str) -> Result<String, PasswordError> {
    let salt = SaltString::generate(&mut OsRng);

    let digest = hasher()?
        .hash_password(plaintext.as_bytes(), &salt)
        .map_err(|e| PasswordError::Hash(format!("digest generation failed: {}", e)))?;

    Ok(digest.to_string())
}

/// Verifies a plaintext credential against a stored digest
///
/// Returns `false` for a wrong password AND for a malformed digest: a
/// corrupted stored hash must never surface as anything that could be
/// mistaken for "password matched". Verification is constant-time.
pub fn verify_password(plaintext: &str, digest: &str) -> bool {
    let parsed = match PasswordHash::new(digest) {
        Ok(parsed) => parsed,
        Err(e) => {
            // Not the caller's fault; log (without the digest) and fail closed.
            warn!(error = %e, "stored credential digest is malformed");
            return false;
        }
    };

    Argon2::default()
        .verify_password(plaintext.as_bytes(), &parsed)
        .is_ok()
}

/// Validates minimum password strength at registration
///
/// Requires at least 8 characters with one uppercase letter, one lowercase
/// letter, one digit, and one special character.
pub fn validate_password_strength(password: &str) -> Result<(), String> {
    if password.len() < 8 {
        return Err("Password must be at least 8 characters long".to_string());
    }
    if !password.chars().any(|c| c.is_uppercase()) {
        return Err("Password must contain at least one uppercase letter".to_string());
    }
    if !password.chars().any(|c| c.is_lowercase()) {
        return Err("Password must contain at least one lowercase letter".to_string());
    }
    if !password.chars().any(|c| c.is_numeric()) {
        return Err("Password must contain at least one digit".to_string());
    }
    if !password.chars().any(|c| !c.is_alphanumeric()) {
        return Err("Password must contain at least one special character".to_string());
    }

    Ok(())
}
