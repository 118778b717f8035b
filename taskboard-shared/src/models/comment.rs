/// Comment model and database operations
///
/// Comments are attached to a task and record the user who wrote them.
/// Access follows the task's ownership chain, not the author.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE comments (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     task_id UUID NOT NULL REFERENCES tasks(id) ON DELETE CASCADE,
///     user_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     text TEXT NOT NULL CHECK (length(trim(text)) > 0),
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

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Comment {
    pub id: Uuid,

    /// Task the comment belongs to
    pub task_id: Uuid,

    /// Author
    pub user_id: Uuid,

    pub text: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Validate)]
pub struct CreateComment {
    pub task_id: Uuid,
    pub user_id: Uuid,

    #[validate(
        custom(function = "not_blank"),
        length(max = 10000, message = "must be at most 10000 characters")
    )]
    pub text: String,
}

#[derive(Debug, Clone, Validate)]
pub struct UpdateComment {
    #[validate(
        custom(function = "not_blank"),
        length(max = 10000, message = "must be at most 10000 characters")
    )]
    pub text: String,
}

impl Comment {
    pub async fn create(pool: &PgPool, data: CreateComment) -> Result<Self, sqlx::Error> {
        let comment = sqlx::query_as::<_, Comment>(
            r#"
            INSERT INTO comments (task_id, user_id, text)
            VALUES ($1, $2, $3)
            RETURNING id, task_id, user_id, text, created_at, updated_at
            "#,
        )
        .bind(data.task_id)
        .bind(data.user_id)
        .bind(data.text)
        .fetch_one(pool)
        .await?;

        Ok(comment)
    }

    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let comment = sqlx::query_as::<_, Comment>(
            r#"
            SELECT id, task_id, user_id, text, created_at, updated_at
            FROM comments
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(comment)
    }

    /// Lists a task's comments, oldest first
    pub async fn list_by_task(pool: &PgPool, task_id: Uuid) -> Result<Vec<Self>, sqlx::Error> {
        let comments = sqlx::query_as::<_, Comment>(
            r#"
            SELECT id, task_id, user_id, text, created_at, updated_at
            FROM comments
            WHERE task_id = $1
            ORDER BY created_at ASC, id ASC
            "#,
        )
        .bind(task_id)
        .fetch_all(pool)
        .await?;

        Ok(comments)
    }

    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        data: UpdateComment,
    ) -> Result<Option<Self>, sqlx::Error> {
        let comment = sqlx::query_as::<_, Comment>(
            r#"
            UPDATE comments
            SET text = $2, updated_at = clock_timestamp()
            WHERE id = $1
            RETURNING id, task_id, user_id, text, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(data.text)
        .fetch_optional(pool)
        .await?;

        Ok(comment)
    }

    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM comments WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
