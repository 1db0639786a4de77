//! # Aegis Auth
//!
//! Identity and tenant authorization core for a multi-tenant SaaS backend.
//!
//! This crate is a library, not a network endpoint. A boundary layer (HTTP
//! handlers) supplies the bearer token and wall-clock `now`, and maps the
//! errors in [`error::AuthError`] to 401/403 responses. The crate itself
//! never performs I/O beyond the storage collaborators in [`store`].
//!
//! ## Module Organization
//!
//! - `auth`: password hashing, token issuance/verification, principal and
//!   tenancy resolution, tier/role authorization, session flows
//! - `models`: Principal, Tenant, and Membership records with Postgres CRUD
//! - `store`: async storage collaborator traits and the Postgres implementation
//! - `db`: connection pool and migrations
//! - `config`: environment-based configuration
//! - `error`: crate-wide error taxonomy with 401/403 classification
//!
//! ## Resolution pipeline
//!
//! Every protected request flows through:
//!
//! ```text
//! TokenService::verify_access
//!     -> PrincipalResolver::resolve
//!     -> TenancyResolver::resolve_membership   (if tier/role gated)
//!     -> AuthorizationEvaluator::authorize
//! ```

pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod store;

pub use auth::authorization::{AuthorizationEvaluator, Grant, Requirement};
pub use auth::principal::PrincipalResolver;
pub use auth::session::{NewAccount, RegisteredAccount, SessionService, TokenPair};
pub use auth::tenancy::TenancyResolver;
pub use auth::token::{TokenConfig, TokenService};
pub use error::AuthError;

/// Current version of the aegis-auth library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
