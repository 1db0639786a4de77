/// Database layer
///
/// - `pool`: PostgreSQL connection pool construction
/// - `migrations`: embedded sqlx migrations for the identity schema

pub mod migrations;
pub mod pool;
