/// Embedded schema migrations
///
/// The SQL files in `taskboard-shared/migrations/` are compiled into the
/// binary. `run_migrations` is safe to call on every startup: applied
/// versions are skipped, and an applied file whose checksum changed is an
/// error.
///
/// ```no_run
/// use taskboard_shared::db::pool::{create_pool, DatabaseConfig};
/// use taskboard_shared::db::migrations::run_migrations;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let pool = create_pool(DatabaseConfig::new(std::env::var("DATABASE_URL")?)).await?;
/// let status = run_migrations(&pool).await?;
/// assert!(status.is_current());
/// # Ok(())
/// # }
/// ```

use sqlx::{
    migrate::{MigrateError, Migrator},
    postgres::PgPool,
};
use tracing::{error, info};

static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

/// What the `_sqlx_migrations` table says
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MigrationStatus {
    pub applied: usize,
    pub latest_version: Option<i64>,
}

impl MigrationStatus {
    /// True when every embedded migration has been applied
    pub fn is_current(&self) -> bool {
        self.applied >= embedded_migrations()
    }
}

/// Number of migrations compiled into this build
pub fn embedded_migrations() -> usize {
    MIGRATOR.iter().count()
}

/// Applies pending migrations and reports the resulting state
pub async fn run_migrations(pool: &PgPool) -> Result<MigrationStatus, MigrateError> {
    if let Err(e) = MIGRATOR.run(pool).await {
        error!(error = %e, "Migration failed");
        return Err(e);
    }

    let status = migration_status(pool).await?;
    info!(
        applied = status.applied,
        latest_version = ?status.latest_version,
        "Schema up to date"
    );
    Ok(status)
}

/// Reads the bookkeeping table; an absent table means nothing is applied
pub async fn migration_status(pool: &PgPool) -> Result<MigrationStatus, sqlx::Error> {
    let table: Option<String> = sqlx::query_scalar("SELECT to_regclass('_sqlx_migrations')::text")
        .fetch_one(pool)
        .await?;

    if table.is_none() {
        return Ok(MigrationStatus {
            applied: 0,
            latest_version: None,
        });
    }

    let (count, latest_version): (i64, Option<i64>) =
        sqlx::query_as("SELECT COUNT(*), MAX(version) FROM _sqlx_migrations WHERE success")
            .fetch_one(pool)
            .await?;

    Ok(MigrationStatus {
        applied: usize::try_from(count).unwrap_or_default(),
        latest_version,
    })
}
