/// PostgreSQL storage backend
///
/// Thin adapter from the repository traits to the SQL in [`crate::models`].
/// Input validation runs here before any query is issued.

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

use super::{
    CommentRepository, ContainerRepository, Store, StoreError, TaskRepository, UserRepository,
    WorkspaceRepository,
};
use crate::db::pool;
use crate::models::{
    comment::{Comment, CreateComment, UpdateComment},
    container::{CreateContainer, ListContainer, UpdateContainer},
    task::{CreateTask, Task, UpdateTask},
    user::{CreateUser, User},
    workspace::{CreateWorkspace, UpdateWorkspace, Workspace},
};

/// Repository implementation backed by a shared connection pool
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Underlying pool, for migrations and shutdown
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl UserRepository for PgStore {
    async fn create_user(&self, data: CreateUser) -> Result<User, StoreError> {
        Ok(User::create(&self.pool, data).await?)
    }

    async fn find_user(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        Ok(User::find_by_id(&self.pool, id).await?)
    }

    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, StoreError> {
        Ok(User::find_by_username(&self.pool, username).await?)
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        Ok(User::find_by_email(&self.pool, email).await?)
    }
}

#[async_trait]
impl WorkspaceRepository for PgStore {
    async fn create_workspace(&self, data: CreateWorkspace) -> Result<Workspace, StoreError> {
        data.validate()?;
        Ok(Workspace::create(&self.pool, data).await?)
    }

    async fn find_workspace(&self, id: Uuid) -> Result<Option<Workspace>, StoreError> {
        Ok(Workspace::find_by_id(&self.pool, id).await?)
    }

    async fn list_workspaces(&self, user_id: Uuid) -> Result<Vec<Workspace>, StoreError> {
        Ok(Workspace::list_by_user(&self.pool, user_id).await?)
    }

    async fn update_workspace(
        &self,
        id: Uuid,
        data: UpdateWorkspace,
    ) -> Result<Option<Workspace>, StoreError> {
        data.validate()?;
        Ok(Workspace::update(&self.pool, id, data).await?)
    }

    async fn delete_workspace(&self, id: Uuid) -> Result<bool, StoreError> {
        Ok(Workspace::delete(&self.pool, id).await?)
    }
}

#[async_trait]
impl ContainerRepository for PgStore {
    async fn create_container(&self, data: CreateContainer) -> Result<ListContainer, StoreError> {
        data.validate()?;
        Ok(ListContainer::create(&self.pool, data).await?)
    }

    async fn find_container(&self, id: Uuid) -> Result<Option<ListContainer>, StoreError> {
        Ok(ListContainer::find_by_id(&self.pool, id).await?)
    }

    async fn list_containers(&self, workspace_id: Uuid) -> Result<Vec<ListContainer>, StoreError> {
        Ok(ListContainer::list_by_workspace(&self.pool, workspace_id).await?)
    }

    async fn update_container(
        &self,
        id: Uuid,
        data: UpdateContainer,
    ) -> Result<Option<ListContainer>, StoreError> {
        data.validate()?;
        Ok(ListContainer::update(&self.pool, id, data).await?)
    }

    async fn delete_container(&self, id: Uuid) -> Result<bool, StoreError> {
        Ok(ListContainer::delete(&self.pool, id).await?)
    }
}

#[async_trait]
impl TaskRepository for PgStore {
    async fn create_task(&self, data: CreateTask) -> Result<Task, StoreError> {
        data.validate()?;
        Ok(Task::create(&self.pool, data).await?)
    }

    async fn find_task(&self, id: Uuid) -> Result<Option<Task>, StoreError> {
        Ok(Task::find_by_id(&self.pool, id).await?)
    }

    async fn list_tasks(&self, list_container_id: Uuid) -> Result<Vec<Task>, StoreError> {
        Ok(Task::list_by_container(&self.pool, list_container_id).await?)
    }

    async fn update_task(&self, id: Uuid, data: UpdateTask) -> Result<Option<Task>, StoreError> {
        data.validate()?;
        Ok(Task::update(&self.pool, id, data).await?)
    }

    async fn delete_task(&self, id: Uuid) -> Result<bool, StoreError> {
        Ok(Task::delete(&self.pool, id).await?)
    }
}

#[async_trait]
impl CommentRepository for PgStore {
    async fn create_comment(&self, data: CreateComment) -> Result<Comment, StoreError> {
        data.validate()?;
        Ok(Comment::create(&self.pool, data).await?)
    }

    async fn find_comment(&self, id: Uuid) -> Result<Option<Comment>, StoreError> {
        Ok(Comment::find_by_id(&self.pool, id).await?)
    }

    async fn list_comments(&self, task_id: Uuid) -> Result<Vec<Comment>, StoreError> {
        Ok(Comment::list_by_task(&self.pool, task_id).await?)
    }

    async fn update_comment(
        &self,
        id: Uuid,
        data: UpdateComment,
    ) -> Result<Option<Comment>, StoreError> {
        data.validate()?;
        Ok(Comment::update(&self.pool, id, data).await?)
    }

    async fn delete_comment(&self, id: Uuid) -> Result<bool, StoreError> {
        Ok(Comment::delete(&self.pool, id).await?)
    }
}

#[async_trait]
impl Store for PgStore {
    async fn ping(&self) -> Result<(), StoreError> {
        Ok(pool::ping(&self.pool).await?)
    }

    fn backend(&self) -> &'static str {
        "postgres"
    }
}
