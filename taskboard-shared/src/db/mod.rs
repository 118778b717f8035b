/// Database layer for Taskboard
///
/// # Modules
///
/// - `pool`: PostgreSQL connection pool, ping and stats
/// - `migrations`: embedded schema migrations
///
/// Table models are in the crate-level `models` module.
///
/// # Example
///
/// ```no_run
/// use taskboard_shared::db::pool::{create_pool, DatabaseConfig};
/// use taskboard_shared::db::migrations::run_migrations;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let config = DatabaseConfig {
///         max_connections: 5,
///         ..DatabaseConfig::new(std::env::var("DATABASE_URL")?)
///     };
///
///     let pool = create_pool(config).await?;
///     run_migrations(&pool).await?;
///     Ok(())
/// }
/// ```

pub mod migrations;
pub mod pool;
