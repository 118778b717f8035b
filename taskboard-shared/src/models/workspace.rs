/// Workspace model and database operations
///
/// A workspace is the top of every resource tree below a user. Its `user_id`
/// is the owner used by the ownership-chain checks, and it is always taken
/// from the caller's verified token.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE workspaces (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     user_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     name VARCHAR(255) NOT NULL CHECK (length(trim(name)) > 0),
///     created_at TIMESTAMPTZ NOT NULL DEFAULT clock_timestamp(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT clock_timestamp()
/// );
/// ```
///
/// # Example
///
/// ```no_run
/// use taskboard_shared::models::workspace::{Workspace, CreateWorkspace};
/// use taskboard_shared::db::pool::{create_pool, DatabaseConfig};
/// use uuid::Uuid;
///
/// # async fn example(owner: Uuid) -> Result<(), Box<dyn std::error::Error>> {
/// let pool = create_pool(DatabaseConfig::new(std::env::var("DATABASE_URL")?)).await?;
///
/// let workspace = Workspace::create(&pool, CreateWorkspace {
///     user_id: owner,
///     name: "Home".to_string(),
/// }).await?;
///
/// let all = Workspace::list_by_user(&pool, owner).await?;
/// assert!(all.iter().any(|w| w.id == workspace.id));
/// # Ok(())
/// # }
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

use super::not_blank;

/// Workspace owned by a single user
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Workspace {
    /// Unique workspace ID
    pub id: Uuid,

    /// Owning user
    pub user_id: Uuid,

    /// Display name
    pub name: String,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a workspace
#[derive(Debug, Clone, Validate)]
pub struct CreateWorkspace {
    /// Owner, taken from the authenticated caller
    pub user_id: Uuid,

    #[validate(
        custom(function = "not_blank"),
        length(max = 255, message = "must be at most 255 characters")
    )]
    pub name: String,
}

/// Input for updating a workspace
///
/// Updates replace the name; it is required exactly as on create.
#[derive(Debug, Clone, Validate)]
pub struct UpdateWorkspace {
    #[validate(
        custom(function = "not_blank"),
        length(max = 255, message = "must be at most 255 characters")
    )]
    pub name: String,
}

impl Workspace {
    /// Creates a new workspace
    ///
    /// # Errors
    ///
    /// Returns a foreign key violation if `user_id` does not reference a user.
    pub async fn create(pool: &PgPool, data: CreateWorkspace) -> Result<Self, sqlx::Error> {
        let workspace = sqlx::query_as::<_, Workspace>(
            r#"
            INSERT INTO workspaces (user_id, name)
            VALUES ($1, $2)
            RETURNING id, user_id, name, created_at, updated_at
            "#,
        )
        .bind(data.user_id)
        .bind(data.name)
        .fetch_one(pool)
        .await?;

        Ok(workspace)
    }

    /// Finds a workspace by ID
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let workspace = sqlx::query_as::<_, Workspace>(
            r#"
            SELECT id, user_id, name, created_at, updated_at
            FROM workspaces
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(workspace)
    }

    /// Lists a user's workspaces in creation order
    pub async fn list_by_user(pool: &PgPool, user_id: Uuid) -> Result<Vec<Self>, sqlx::Error> {
        let workspaces = sqlx::query_as::<_, Workspace>(
            r#"
            SELECT id, user_id, name, created_at, updated_at
            FROM workspaces
            WHERE user_id = $1
            ORDER BY created_at ASC, id ASC
            "#,
        )
        .bind(user_id)
        .fetch_all(pool)
        .await?;

        Ok(workspaces)
    }

    /// Renames a workspace
    ///
    /// # Returns
    ///
    /// The updated workspace, or `None` when no row matched `id`
    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        data: UpdateWorkspace,
    ) -> Result<Option<Self>, sqlx::Error> {
        let workspace = sqlx::query_as::<_, Workspace>(
            r#"
            UPDATE workspaces
            SET name = $2, updated_at = clock_timestamp()
            WHERE id = $1
            RETURNING id, user_id, name, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(data.name)
        .fetch_optional(pool)
        .await?;

        Ok(workspace)
    }

    /// Deletes a workspace together with its containers, tasks and comments
    ///
    /// # Returns
    ///
    /// True if the workspace was deleted, false if it didn't exist
    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM workspaces WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
