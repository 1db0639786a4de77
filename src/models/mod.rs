/// Database models for the identity core
///
/// Each model owns its record struct and the Postgres CRUD operations the
/// core needs, in the `sqlx::query_as` style.
///
/// # Models
///
/// - `principal`: authenticated identities (users) with soft-delete liveness
/// - `tenant`: organisations with an ordered subscription tier and status
/// - `membership`: the (principal, tenant, role) relationship

pub mod membership;
pub mod principal;
pub mod tenant;
