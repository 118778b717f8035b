/// In-memory storage backend
///
/// Mirrors the PostgreSQL schema closely enough to run the whole API without
/// a database: unique usernames and emails, parent rows must exist, and
/// deletes cascade to children. Rows are kept in insertion order.
///
/// Data lives only as long as the process.

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;
use validator::Validate;

use super::{
    CommentRepository, ContainerRepository, Store, StoreError, TaskRepository, UserRepository,
    WorkspaceRepository,
};
use crate::models::{
    comment::{Comment, CreateComment, UpdateComment},
    container::{CreateContainer, ListContainer, UpdateContainer},
    task::{CreateTask, Task, UpdateTask},
    user::{CreateUser, User, EMAIL_UNIQUE_CONSTRAINT, USERNAME_UNIQUE_CONSTRAINT},
    workspace::{CreateWorkspace, UpdateWorkspace, Workspace},
};

#[derive(Debug, Default)]
struct Tables {
    users: Vec<User>,
    workspaces: Vec<Workspace>,
    containers: Vec<ListContainer>,
    tasks: Vec<Task>,
    comments: Vec<Comment>,
}

impl Tables {
    fn require_user(&self, id: Uuid) -> Result<(), StoreError> {
        if self.users.iter().any(|u| u.id == id) {
            Ok(())
        } else {
            Err(StoreError::ForeignKeyViolation("user_id_fkey".to_string()))
        }
    }

    fn require_workspace(&self, id: Uuid) -> Result<(), StoreError> {
        if self.workspaces.iter().any(|w| w.id == id) {
            Ok(())
        } else {
            Err(StoreError::ForeignKeyViolation(
                "list_containers_workspace_id_fkey".to_string(),
            ))
        }
    }

    fn require_container(&self, id: Uuid) -> Result<(), StoreError> {
        if self.containers.iter().any(|c| c.id == id) {
            Ok(())
        } else {
            Err(StoreError::ForeignKeyViolation(
                "tasks_list_container_id_fkey".to_string(),
            ))
        }
    }

    fn require_task(&self, id: Uuid) -> Result<(), StoreError> {
        if self.tasks.iter().any(|t| t.id == id) {
            Ok(())
        } else {
            Err(StoreError::ForeignKeyViolation(
                "comments_task_id_fkey".to_string(),
            ))
        }
    }

    fn cascade_task(&mut self, task_id: Uuid) {
        self.comments.retain(|c| c.task_id != task_id);
    }

    fn cascade_container(&mut self, container_id: Uuid) {
        let doomed: Vec<Uuid> = self
            .tasks
            .iter()
            .filter(|t| t.list_container_id == container_id)
            .map(|t| t.id)
            .collect();
        self.tasks.retain(|t| t.list_container_id != container_id);
        for task_id in doomed {
            self.cascade_task(task_id);
        }
    }

    fn cascade_workspace(&mut self, workspace_id: Uuid) {
        let doomed: Vec<Uuid> = self
            .containers
            .iter()
            .filter(|c| c.workspace_id == workspace_id)
            .map(|c| c.id)
            .collect();
        self.containers.retain(|c| c.workspace_id != workspace_id);
        for container_id in doomed {
            self.cascade_container(container_id);
        }
    }
}

/// Repository implementation holding every table in process memory
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of stored rows per table, in schema order
    ///
    /// Returns `(users, workspaces, containers, tasks, comments)`.
    pub async fn row_counts(&self) -> (usize, usize, usize, usize, usize) {
        let tables = self.tables.read().await;
        (
            tables.users.len(),
            tables.workspaces.len(),
            tables.containers.len(),
            tables.tasks.len(),
            tables.comments.len(),
        )
    }
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn create_user(&self, data: CreateUser) -> Result<User, StoreError> {
        let mut tables = self.tables.write().await;

        if tables.users.iter().any(|u| u.username == data.username) {
            return Err(StoreError::UniqueViolation(
                USERNAME_UNIQUE_CONSTRAINT.to_string(),
            ));
        }
        if tables.users.iter().any(|u| u.email == data.email) {
            return Err(StoreError::UniqueViolation(
                EMAIL_UNIQUE_CONSTRAINT.to_string(),
            ));
        }

        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            username: data.username,
            email: data.email,
            password_hash: data.password_hash,
            created_at: now,
            updated_at: now,
        };
        tables.users.push(user.clone());

        Ok(user)
    }

    async fn find_user(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables.users.iter().find(|u| u.id == id).cloned())
    }

    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables.users.iter().find(|u| u.username == username).cloned())
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables.users.iter().find(|u| u.email == email).cloned())
    }
}

#[async_trait]
impl WorkspaceRepository for MemoryStore {
    async fn create_workspace(&self, data: CreateWorkspace) -> Result<Workspace, StoreError> {
        data.validate()?;
        let mut tables = self.tables.write().await;
        tables.require_user(data.user_id)?;

        let now = Utc::now();
        let workspace = Workspace {
            id: Uuid::new_v4(),
            user_id: data.user_id,
            name: data.name,
            created_at: now,
            updated_at: now,
        };
        tables.workspaces.push(workspace.clone());

        Ok(workspace)
    }

    async fn find_workspace(&self, id: Uuid) -> Result<Option<Workspace>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables.workspaces.iter().find(|w| w.id == id).cloned())
    }

    async fn list_workspaces(&self, user_id: Uuid) -> Result<Vec<Workspace>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables
            .workspaces
            .iter()
            .filter(|w| w.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn update_workspace(
        &self,
        id: Uuid,
        data: UpdateWorkspace,
    ) -> Result<Option<Workspace>, StoreError> {
        data.validate()?;
        let mut tables = self.tables.write().await;

        Ok(tables.workspaces.iter_mut().find(|w| w.id == id).map(|w| {
            w.name = data.name;
            w.updated_at = Utc::now();
            w.clone()
        }))
    }

    async fn delete_workspace(&self, id: Uuid) -> Result<bool, StoreError> {
        let mut tables = self.tables.write().await;
        let before = tables.workspaces.len();
        tables.workspaces.retain(|w| w.id != id);
        if tables.workspaces.len() == before {
            return Ok(false);
        }

        tables.cascade_workspace(id);
        Ok(true)
    }
}

#[async_trait]
impl ContainerRepository for MemoryStore {
    async fn create_container(&self, data: CreateContainer) -> Result<ListContainer, StoreError> {
        data.validate()?;
        let mut tables = self.tables.write().await;
        tables.require_workspace(data.workspace_id)?;

        let now = Utc::now();
        let container = ListContainer {
            id: Uuid::new_v4(),
            workspace_id: data.workspace_id,
            name: data.name,
            created_at: now,
            updated_at: now,
        };
        tables.containers.push(container.clone());

        Ok(container)
    }

    async fn find_container(&self, id: Uuid) -> Result<Option<ListContainer>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables.containers.iter().find(|c| c.id == id).cloned())
    }

    async fn list_containers(&self, workspace_id: Uuid) -> Result<Vec<ListContainer>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables
            .containers
            .iter()
            .filter(|c| c.workspace_id == workspace_id)
            .cloned()
            .collect())
    }

    async fn update_container(
        &self,
        id: Uuid,
        data: UpdateContainer,
    ) -> Result<Option<ListContainer>, StoreError> {
        data.validate()?;
        let mut tables = self.tables.write().await;

        Ok(tables.containers.iter_mut().find(|c| c.id == id).map(|c| {
            c.name = data.name;
            c.updated_at = Utc::now();
            c.clone()
        }))
    }

    async fn delete_container(&self, id: Uuid) -> Result<bool, StoreError> {
        let mut tables = self.tables.write().await;
        let before = tables.containers.len();
        tables.containers.retain(|c| c.id != id);
        if tables.containers.len() == before {
            return Ok(false);
        }

        tables.cascade_container(id);
        Ok(true)
    }
}

#[async_trait]
impl TaskRepository for MemoryStore {
    async fn create_task(&self, data: CreateTask) -> Result<Task, StoreError> {
        data.validate()?;
        let mut tables = self.tables.write().await;
        tables.require_container(data.list_container_id)?;

        let now = Utc::now();
        let task = Task {
            id: Uuid::new_v4(),
            list_container_id: data.list_container_id,
            text: data.text,
            description: data.description,
            created_at: now,
            updated_at: now,
        };
        tables.tasks.push(task.clone());

        Ok(task)
    }

    async fn find_task(&self, id: Uuid) -> Result<Option<Task>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables.tasks.iter().find(|t| t.id == id).cloned())
    }

    async fn list_tasks(&self, list_container_id: Uuid) -> Result<Vec<Task>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables
            .tasks
            .iter()
            .filter(|t| t.list_container_id == list_container_id)
            .cloned()
            .collect())
    }

    async fn update_task(&self, id: Uuid, data: UpdateTask) -> Result<Option<Task>, StoreError> {
        data.validate()?;
        let mut tables = self.tables.write().await;
        if let Some(target) = data.list_container_id {
            tables.require_container(target)?;
        }

        Ok(tables.tasks.iter_mut().find(|t| t.id == id).map(|t| {
            t.text = data.text;
            t.description = data.description;
            if let Some(target) = data.list_container_id {
                t.list_container_id = target;
            }
            t.updated_at = Utc::now();
            t.clone()
        }))
    }

    async fn delete_task(&self, id: Uuid) -> Result<bool, StoreError> {
        let mut tables = self.tables.write().await;
        let before = tables.tasks.len();
        tables.tasks.retain(|t| t.id != id);
        if tables.tasks.len() == before {
            return Ok(false);
        }

        tables.cascade_task(id);
        Ok(true)
    }
}

#[async_trait]
impl CommentRepository for MemoryStore {
    async fn create_comment(&self, data: CreateComment) -> Result<Comment, StoreError> {
        data.validate()?;
        let mut tables = self.tables.write().await;
        tables.require_task(data.task_id)?;
        tables.require_user(data.user_id)?;

        let now = Utc::now();
        let comment = Comment {
            id: Uuid::new_v4(),
            task_id: data.task_id,
            user_id: data.user_id,
            text: data.text,
            created_at: now,
            updated_at: now,
        };
        tables.comments.push(comment.clone());

        Ok(comment)
    }

    async fn find_comment(&self, id: Uuid) -> Result<Option<Comment>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables.comments.iter().find(|c| c.id == id).cloned())
    }

    async fn list_comments(&self, task_id: Uuid) -> Result<Vec<Comment>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables
            .comments
            .iter()
            .filter(|c| c.task_id == task_id)
            .cloned()
            .collect())
    }

    async fn update_comment(
        &self,
        id: Uuid,
        data: UpdateComment,
    ) -> Result<Option<Comment>, StoreError> {
        data.validate()?;
        let mut tables = self.tables.write().await;

        Ok(tables.comments.iter_mut().find(|c| c.id == id).map(|c| {
            c.text = data.text;
            c.updated_at = Utc::now();
            c.clone()
        }))
    }

    async fn delete_comment(&self, id: Uuid) -> Result<bool, StoreError> {
        let mut tables = self.tables.write().await;
        let before = tables.comments.len();
        tables.comments.retain(|c| c.id != id);
        Ok(tables.comments.len() < before)
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }

    fn backend(&self) -> &'static str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn seed_user(store: &MemoryStore, username: &str) -> User {
        store
            .create_user(CreateUser {
                username: username.to_string(),
                email: format!("{}@example.com", username),
                password_hash: "hash".to_string(),
            })
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_duplicate_username_rejected() {
        let store = MemoryStore::new();
        seed_user(&store, "alice").await;

        let result = store
            .create_user(CreateUser {
                username: "alice".to_string(),
                email: "other@example.com".to_string(),
                password_hash: "hash".to_string(),
            })
            .await;

        assert!(matches!(
            result,
            Err(StoreError::UniqueViolation(ref c)) if c == USERNAME_UNIQUE_CONSTRAINT
        ));
        assert_eq!(store.row_counts().await.0, 1);
    }

    #[tokio::test]
    async fn test_duplicate_email_rejected() {
        let store = MemoryStore::new();
        seed_user(&store, "alice").await;

        let result = store
            .create_user(CreateUser {
                username: "alice2".to_string(),
                email: "alice@example.com".to_string(),
                password_hash: "hash".to_string(),
            })
            .await;

        assert!(matches!(result, Err(StoreError::UniqueViolation(_))));
    }

    #[tokio::test]
    async fn test_workspace_requires_existing_owner() {
        let store = MemoryStore::new();
        let result = store
            .create_workspace(CreateWorkspace {
                user_id: Uuid::new_v4(),
                name: "Home".to_string(),
            })
            .await;

        assert!(matches!(result, Err(StoreError::ForeignKeyViolation(_))));
    }

    #[tokio::test]
    async fn test_blank_name_is_validation_error() {
        let store = MemoryStore::new();
        let user = seed_user(&store, "alice").await;

        let result = store
            .create_workspace(CreateWorkspace {
                user_id: user.id,
                name: String::new(),
            })
            .await;

        assert!(matches!(result, Err(StoreError::Validation(_))));
        assert_eq!(store.row_counts().await.1, 0);
    }

    #[tokio::test]
    async fn test_lists_keep_insertion_order() {
        let store = MemoryStore::new();
        let user = seed_user(&store, "alice").await;

        for name in ["Home", "Work", "Garden"] {
            store
                .create_workspace(CreateWorkspace {
                    user_id: user.id,
                    name: name.to_string(),
                })
                .await
                .unwrap();
        }

        let names: Vec<String> = store
            .list_workspaces(user.id)
            .await
            .unwrap()
            .into_iter()
            .map(|w| w.name)
            .collect();
        assert_eq!(names, vec!["Home", "Work", "Garden"]);
    }

    #[tokio::test]
    async fn test_update_and_delete_unknown_id() {
        let store = MemoryStore::new();

        let updated = store
            .update_workspace(
                Uuid::new_v4(),
                UpdateWorkspace {
                    name: "New".to_string(),
                },
            )
            .await
            .unwrap();
        assert!(updated.is_none());

        assert!(!store.delete_workspace(Uuid::new_v4()).await.unwrap());
        assert!(!store.delete_container(Uuid::new_v4()).await.unwrap());
        assert!(!store.delete_task(Uuid::new_v4()).await.unwrap());
        assert!(!store.delete_comment(Uuid::new_v4()).await.unwrap());
    }

    #[tokio::test]
    async fn test_delete_workspace_cascades() {
        let store = MemoryStore::new();
        let user = seed_user(&store, "alice").await;
        let workspace = store
            .create_workspace(CreateWorkspace {
                user_id: user.id,
                name: "Home".to_string(),
            })
            .await
            .unwrap();
        let container = store
            .create_container(CreateContainer {
                workspace_id: workspace.id,
                name: "Inbox".to_string(),
            })
            .await
            .unwrap();
        let task = store
            .create_task(CreateTask {
                list_container_id: container.id,
                text: "Buy milk".to_string(),
                description: None,
            })
            .await
            .unwrap();
        store
            .create_comment(CreateComment {
                task_id: task.id,
                user_id: user.id,
                text: "semi-skimmed".to_string(),
            })
            .await
            .unwrap();

        assert!(store.delete_workspace(workspace.id).await.unwrap());
        assert_eq!(store.row_counts().await, (1, 0, 0, 0, 0));
    }

    #[tokio::test]
    async fn test_move_task_to_missing_container_fails() {
        let store = MemoryStore::new();
        let user = seed_user(&store, "alice").await;
        let workspace = store
            .create_workspace(CreateWorkspace {
                user_id: user.id,
                name: "Home".to_string(),
            })
            .await
            .unwrap();
        let container = store
            .create_container(CreateContainer {
                workspace_id: workspace.id,
                name: "Inbox".to_string(),
            })
            .await
            .unwrap();
        let task = store
            .create_task(CreateTask {
                list_container_id: container.id,
                text: "Buy milk".to_string(),
                description: None,
            })
            .await
            .unwrap();

        let result = store
            .update_task(
                task.id,
                UpdateTask {
                    text: "Buy milk".to_string(),
                    description: None,
                    list_container_id: Some(Uuid::new_v4()),
                },
            )
            .await;

        assert!(matches!(result, Err(StoreError::ForeignKeyViolation(_))));
        let stored = store.find_task(task.id).await.unwrap().unwrap();
        assert_eq!(stored.list_container_id, container.id);
    }
}
