/// List container model and database operations
///
/// Containers group tasks inside a workspace. The ownership of a container is
/// the ownership of its workspace.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE list_containers (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     workspace_id UUID NOT NULL REFERENCES workspaces(id) ON DELETE CASCADE,
///     name VARCHAR(255) NOT NULL CHECK (length(trim(name)) > 0),
///     created_at TIMESTAMPTZ NOT NULL DEFAULT clock_timestamp(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT clock_timestamp()
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

use super::not_blank;

/// A named list of tasks inside a workspace
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct ListContainer {
    pub id: Uuid,

    /// Parent workspace
    pub workspace_id: Uuid,

    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a container
#[derive(Debug, Clone, Validate)]
pub struct CreateContainer {
    pub workspace_id: Uuid,

    #[validate(
        custom(function = "not_blank"),
        length(max = 255, message = "must be at most 255 characters")
    )]
    pub name: String,
}

/// Input for renaming a container
#[derive(Debug, Clone, Validate)]
pub struct UpdateContainer {
    #[validate(
        custom(function = "not_blank"),
        length(max = 255, message = "must be at most 255 characters")
    )]
    pub name: String,
}

impl ListContainer {
    /// Creates a container under a workspace
    pub async fn create(pool: &PgPool, data: CreateContainer) -> Result<Self, sqlx::Error> {
        let container = sqlx::query_as::<_, ListContainer>(
            r#"
            INSERT INTO list_containers (workspace_id, name)
            VALUES ($1, $2)
            RETURNING id, workspace_id, name, created_at, updated_at
            "#,
        )
        .bind(data.workspace_id)
        .bind(data.name)
        .fetch_one(pool)
        .await?;

        Ok(container)
    }

    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let container = sqlx::query_as::<_, ListContainer>(
            r#"
            SELECT id, workspace_id, name, created_at, updated_at
            FROM list_containers
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(container)
    }

    /// Lists the containers of a workspace in creation order
    pub async fn list_by_workspace(
        pool: &PgPool,
        workspace_id: Uuid,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let containers = sqlx::query_as::<_, ListContainer>(
            r#"
            SELECT id, workspace_id, name, created_at, updated_at
            FROM list_containers
            WHERE workspace_id = $1
            ORDER BY created_at ASC, id ASC
            "#,
        )
        .bind(workspace_id)
        .fetch_all(pool)
        .await?;

        Ok(containers)
    }

    /// Renames a container, returning `None` when no row matched
    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        data: UpdateContainer,
    ) -> Result<Option<Self>, sqlx::Error> {
        let container = sqlx::query_as::<_, ListContainer>(
            r#"
            UPDATE list_containers
            SET name = $2, updated_at = clock_timestamp()
            WHERE id = $1
            RETURNING id, workspace_id, name, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(data.name)
        .fetch_optional(pool)
        .await?;

        Ok(container)
    }

    /// Deletes a container and, by cascade, its tasks and their comments
    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM list_containers WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
