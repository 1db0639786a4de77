/// Authentication and authorization
///
/// # Modules
///
/// - [`password`]: Argon2id credential hashing (Credential Hasher)
/// - [`token`]: signed access/refresh bearer tokens (Token Service)
/// - [`principal`]: access token -> live principal (Principal Resolver)
/// - [`tenancy`]: membership and tenant lookup (Tenancy Resolver)
/// - [`authorization`]: tier/role gate evaluation (Authorization Evaluator)
/// - [`session`]: register / login / refresh flows
///
/// # Control flow
///
/// Every protected request goes token verification -> principal resolution
/// -> (if tier/role gated) tenancy resolution -> authorization. All steps
/// take wall-clock `now` from the caller so expiry is deterministic in tests.

pub mod authorization;
pub mod password;
pub mod principal;
pub mod session;
pub mod tenancy;
pub mod token;
