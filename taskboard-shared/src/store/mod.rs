/// Repository traits and storage backends
///
/// Handlers and the ownership resolver talk to storage only through these
/// traits, so the same request pipeline runs against PostgreSQL in production
/// and against [`MemoryStore`] in tests and local runs.
///
/// Every repository follows the same contract:
///
/// - `create_*` validates its input and returns the stored row
/// - `find_*` returns `None` for an unknown id
/// - `list_*` returns children of one parent in insertion order
/// - `update_*` returns `None` when no row matched
/// - `delete_*` returns `false` when no row matched; deletes cascade to children
///
/// # Example
///
/// ```
/// use taskboard_shared::store::{MemoryStore, WorkspaceRepository};
/// use uuid::Uuid;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let store = MemoryStore::new();
/// let missing = store.find_workspace(Uuid::new_v4()).await?;
/// assert!(missing.is_none());
/// # Ok(())
/// # }
/// ```

use async_trait::async_trait;
use uuid::Uuid;

use crate::models::{
    comment::{Comment, CreateComment, UpdateComment},
    container::{CreateContainer, ListContainer, UpdateContainer},
    task::{CreateTask, Task, UpdateTask},
    user::{CreateUser, User},
    workspace::{CreateWorkspace, UpdateWorkspace, Workspace},
};

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

/// Error type for repository operations
///
/// Expected outcomes (unknown id, zero rows affected) are not errors; they
/// come back as `None` or `false`.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Input failed field validation
    #[error("Validation failed: {0}")]
    Validation(#[from] validator::ValidationErrors),

    /// A unique constraint rejected the write
    #[error("Unique constraint violated: {0}")]
    UniqueViolation(String),

    /// A referenced parent row does not exist
    #[error("Foreign key constraint violated: {0}")]
    ForeignKeyViolation(String),

    /// Any other storage failure
    #[error("Database error: {0}")]
    Database(sqlx::Error),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            let constraint = db_err.constraint().unwrap_or("unknown").to_string();
            if db_err.is_unique_violation() {
                return StoreError::UniqueViolation(constraint);
            }
            if db_err.is_foreign_key_violation() {
                return StoreError::ForeignKeyViolation(constraint);
            }
        }

        StoreError::Database(err)
    }
}

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn create_user(&self, data: CreateUser) -> Result<User, StoreError>;
    async fn find_user(&self, id: Uuid) -> Result<Option<User>, StoreError>;
    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, StoreError>;
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;
}

#[async_trait]
pub trait WorkspaceRepository: Send + Sync {
    async fn create_workspace(&self, data: CreateWorkspace) -> Result<Workspace, StoreError>;
    async fn find_workspace(&self, id: Uuid) -> Result<Option<Workspace>, StoreError>;
    async fn list_workspaces(&self, user_id: Uuid) -> Result<Vec<Workspace>, StoreError>;
    async fn update_workspace(
        &self,
        id: Uuid,
        data: UpdateWorkspace,
    ) -> Result<Option<Workspace>, StoreError>;
    async fn delete_workspace(&self, id: Uuid) -> Result<bool, StoreError>;
}

#[async_trait]
pub trait ContainerRepository: Send + Sync {
    async fn create_container(&self, data: CreateContainer) -> Result<ListContainer, StoreError>;
    async fn find_container(&self, id: Uuid) -> Result<Option<ListContainer>, StoreError>;
    async fn list_containers(&self, workspace_id: Uuid) -> Result<Vec<ListContainer>, StoreError>;
    async fn update_container(
        &self,
        id: Uuid,
        data: UpdateContainer,
    ) -> Result<Option<ListContainer>, StoreError>;
    async fn delete_container(&self, id: Uuid) -> Result<bool, StoreError>;
}

#[async_trait]
pub trait TaskRepository: Send + Sync {
    async fn create_task(&self, data: CreateTask) -> Result<Task, StoreError>;
    async fn find_task(&self, id: Uuid) -> Result<Option<Task>, StoreError>;
    async fn list_tasks(&self, list_container_id: Uuid) -> Result<Vec<Task>, StoreError>;
    async fn update_task(&self, id: Uuid, data: UpdateTask) -> Result<Option<Task>, StoreError>;
    async fn delete_task(&self, id: Uuid) -> Result<bool, StoreError>;
}

#[async_trait]
pub trait CommentRepository: Send + Sync {
    async fn create_comment(&self, data: CreateComment) -> Result<Comment, StoreError>;
    async fn find_comment(&self, id: Uuid) -> Result<Option<Comment>, StoreError>;
    async fn list_comments(&self, task_id: Uuid) -> Result<Vec<Comment>, StoreError>;
    async fn update_comment(
        &self,
        id: Uuid,
        data: UpdateComment,
    ) -> Result<Option<Comment>, StoreError>;
    async fn delete_comment(&self, id: Uuid) -> Result<bool, StoreError>;
}

/// Complete storage backend
#[async_trait]
pub trait Store:
    UserRepository + WorkspaceRepository + ContainerRepository + TaskRepository + CommentRepository
{
    /// Checks that the backend can serve queries
    async fn ping(&self) -> Result<(), StoreError>;

    /// Short backend name for logs and the health endpoint
    fn backend(&self) -> &'static str;
}
