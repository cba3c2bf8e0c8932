/// Database layer for Fieldbook
///
/// # Modules
///
/// - `pool`: PostgreSQL connection pool with a startup health check
/// - `migrations`: Embedded schema migrations
///
/// Row types and their SQL live in [`crate::models`].

pub mod migrations;
pub mod pool;
