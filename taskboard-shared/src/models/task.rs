/// Task model and database operations
///
/// Tasks live in a list container. A task can be moved to a different
/// container by an update that names the new `list_container_id`.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE tasks (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     list_container_id UUID NOT NULL REFERENCES list_containers(id) ON DELETE CASCADE,
///     text VARCHAR(1000) NOT NULL CHECK (length(trim(text)) > 0),
///     description TEXT,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT clock_timestamp(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT clock_timestamp()
/// );
/// ```
///
/// # Example
///
/// ```no_run
/// use taskboard_shared::models::task::{Task, CreateTask, UpdateTask};
/// use sqlx::PgPool;
/// use uuid::Uuid;
///
/// # async fn example(pool: PgPool, inbox: Uuid) -> Result<(), sqlx::Error> {
/// let task = Task::create(&pool, CreateTask {
///     list_container_id: inbox,
///     text: "Buy milk".to_string(),
///     description: None,
/// }).await?;
///
/// Task::update(&pool, task.id, UpdateTask {
///     text: "Buy oat milk".to_string(),
///     description: Some("the barista one".to_string()),
///     list_container_id: None,
/// }).await?;
/// # Ok(())
/// # }
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

use super::not_blank;

/// A single to-do item
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Task {
    /// Unique task ID
    pub id: Uuid,

    /// Container the task currently belongs to
    pub list_container_id: Uuid,

    /// Short task text (required)
    pub text: String,

    /// Optional longer description
    pub description: Option<String>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a task
#[derive(Debug, Clone, Validate)]
pub struct CreateTask {
    pub list_container_id: Uuid,

    #[validate(
        custom(function = "not_blank"),
        length(max = 1000, message = "must be at most 1000 characters")
    )]
    pub text: String,

    #[validate(length(max = 10000, message = "must be at most 10000 characters"))]
    pub description: Option<String>,
}

/// Input for updating a task
///
/// `text` and `description` replace the stored values. When
/// `list_container_id` is set the task moves to that container; the caller
/// must have checked ownership of the destination first.
#[derive(Debug, Clone, Validate)]
pub struct UpdateTask {
    #[validate(
        custom(function = "not_blank"),
        length(max = 1000, message = "must be at most 1000 characters")
    )]
    pub text: String,

    #[validate(length(max = 10000, message = "must be at most 10000 characters"))]
    pub description: Option<String>,

    pub list_container_id: Option<Uuid>,
}

impl Task {
    pub async fn create(pool: &PgPool, data: CreateTask) -> Result<Self, sqlx::Error> {
        let task = sqlx::query_as::<_, Task>(
            r#"
            INSERT INTO tasks (list_container_id, text, description)
            VALUES ($1, $2, $3)
            RETURNING id, list_container_id, text, description, created_at, updated_at
            "#,
        )
        .bind(data.list_container_id)
        .bind(data.text)
        .bind(data.description)
        .fetch_one(pool)
        .await?;

        Ok(task)
    }

    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let task = sqlx::query_as::<_, Task>(
            r#"
            SELECT id, list_container_id, text, description, created_at, updated_at
            FROM tasks
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(task)
    }

    /// Lists the tasks of a container in creation order
    pub async fn list_by_container(
        pool: &PgPool,
        list_container_id: Uuid,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let tasks = sqlx::query_as::<_, Task>(
            r#"
            SELECT id, list_container_id, text, description, created_at, updated_at
            FROM tasks
            WHERE list_container_id = $1
            ORDER BY created_at ASC, id ASC
            "#,
        )
        .bind(list_container_id)
        .fetch_all(pool)
        .await?;

        Ok(tasks)
    }

    /// Updates a task, optionally moving it to another container
    ///
    /// # Returns
    ///
    /// The updated task, or `None` when no row matched `id`
    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        data: UpdateTask,
    ) -> Result<Option<Self>, sqlx::Error> {
        let task = sqlx::query_as::<_, Task>(
            r#"
            UPDATE tasks
            SET text = $2,
                description = $3,
                list_container_id = COALESCE($4, list_container_id),
                updated_at = clock_timestamp()
            WHERE id = $1
            RETURNING id, list_container_id, text, description, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(data.text)
        .bind(data.description)
        .bind(data.list_container_id)
        .fetch_optional(pool)
        .await?;

        Ok(task)
    }

    /// Deletes a task and its comments
    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
