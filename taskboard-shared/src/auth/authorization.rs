/// Ownership checks along the workspace hierarchy
///
/// Every resource belongs to exactly one user through a chain of parents:
///
/// ```text
/// comment → task → list container → workspace → user
/// ```
///
/// A user may touch a resource only if the workspace at the top of its chain
/// is theirs. The `owns_*` functions walk one chain and answer yes or no; any
/// lookup miss along the way is a plain "no".
///
/// The `require_*` gates are what request handlers call. They distinguish two
/// situations:
///
/// - **Target gates** (`require_workspace`, `require_task`, ...) report
///   [`AuthzError::NotFound`] when the target id does not exist and
///   [`AuthzError::Forbidden`] when it exists but belongs to someone else.
/// - **Parent gates** (`require_workspace_parent`, ...) guard creation and
///   reparenting. A missing parent and a foreign parent both report
///   `Forbidden`, so callers cannot probe for ids they do not own.
///
/// # Example
///
/// ```no_run
/// use taskboard_shared::auth::authorization::{require_task, AuthzError};
/// use taskboard_shared::store::Store;
/// use uuid::Uuid;
///
/// async fn load_task(store: &dyn Store, user_id: Uuid, task_id: Uuid) -> Result<(), AuthzError> {
///     let task = require_task(store, user_id, task_id).await?;
///     println!("{} belongs to container {}", task.id, task.list_container_id);
///     Ok(())
/// }
/// ```

use uuid::Uuid;

use crate::models::comment::Comment;
use crate::models::container::ListContainer;
use crate::models::task::Task;
use crate::models::workspace::Workspace;
use crate::store::{Store, StoreError};

/// Error type for authorization checks
#[derive(Debug, thiserror::Error)]
pub enum AuthzError {
    /// Caller does not own the resource, or a parent is missing
    #[error("Not authorized to access this resource")]
    Forbidden,

    /// The requested resource does not exist
    #[error("{0} not found")]
    NotFound(&'static str),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Returns true if `workspace_id` exists and belongs to `user_id`
pub async fn owns_workspace(
    store: &dyn Store,
    user_id: Uuid,
    workspace_id: Uuid,
) -> Result<bool, StoreError> {
    Ok(store
        .find_workspace(workspace_id)
        .await?
        .is_some_and(|workspace| workspace.user_id == user_id))
}

/// Returns true if the container's workspace belongs to `user_id`
pub async fn owns_container(
    store: &dyn Store,
    user_id: Uuid,
    container_id: Uuid,
) -> Result<bool, StoreError> {
    match store.find_container(container_id).await? {
        Some(container) => owns_workspace(store, user_id, container.workspace_id).await,
        None => Ok(false),
    }
}

/// Returns true if the task's container chain belongs to `user_id`
pub async fn owns_task(store: &dyn Store, user_id: Uuid, task_id: Uuid) -> Result<bool, StoreError> {
    match store.find_task(task_id).await? {
        Some(task) => owns_container(store, user_id, task.list_container_id).await,
        None => Ok(false),
    }
}

/// Returns true if the comment's task chain belongs to `user_id`
pub async fn owns_comment(
    store: &dyn Store,
    user_id: Uuid,
    comment_id: Uuid,
) -> Result<bool, StoreError> {
    match store.find_comment(comment_id).await? {
        Some(comment) => owns_task(store, user_id, comment.task_id).await,
        None => Ok(false),
    }
}

fn forbid_unless(owned: bool) -> Result<(), AuthzError> {
    if owned {
        Ok(())
    } else {
        Err(AuthzError::Forbidden)
    }
}

/// Gate for creating a container under `workspace_id`
pub async fn require_workspace_parent(
    store: &dyn Store,
    user_id: Uuid,
    workspace_id: Uuid,
) -> Result<(), AuthzError> {
    forbid_unless(owns_workspace(store, user_id, workspace_id).await?)
}

/// Gate for creating a task in, or moving a task to, `container_id`
pub async fn require_container_parent(
    store: &dyn Store,
    user_id: Uuid,
    container_id: Uuid,
) -> Result<(), AuthzError> {
    forbid_unless(owns_container(store, user_id, container_id).await?)
}

/// Gate for creating a comment on `task_id`
pub async fn require_task_parent(
    store: &dyn Store,
    user_id: Uuid,
    task_id: Uuid,
) -> Result<(), AuthzError> {
    forbid_unless(owns_task(store, user_id, task_id).await?)
}

/// Loads a workspace the caller owns
///
/// # Errors
///
/// - `NotFound` if the workspace does not exist
/// - `Forbidden` if it belongs to another user
pub async fn require_workspace(
    store: &dyn Store,
    user_id: Uuid,
    workspace_id: Uuid,
) -> Result<Workspace, AuthzError> {
    let workspace = store
        .find_workspace(workspace_id)
        .await?
        .ok_or(AuthzError::NotFound("Workspace"))?;

    forbid_unless(workspace.user_id == user_id)?;
    Ok(workspace)
}

/// Loads a container whose workspace the caller owns
pub async fn require_container(
    store: &dyn Store,
    user_id: Uuid,
    container_id: Uuid,
) -> Result<ListContainer, AuthzError> {
    let container = store
        .find_container(container_id)
        .await?
        .ok_or(AuthzError::NotFound("Container"))?;

    forbid_unless(owns_workspace(store, user_id, container.workspace_id).await?)?;
    Ok(container)
}

/// Loads a task whose chain the caller owns
pub async fn require_task(
    store: &dyn Store,
    user_id: Uuid,
    task_id: Uuid,
) -> Result<Task, AuthzError> {
    let task = store
        .find_task(task_id)
        .await?
        .ok_or(AuthzError::NotFound("Task"))?;

    forbid_unless(owns_container(store, user_id, task.list_container_id).await?)?;
    Ok(task)
}

/// Loads a comment whose chain the caller owns
pub async fn require_comment(
    store: &dyn Store,
    user_id: Uuid,
    comment_id: Uuid,
) -> Result<Comment, AuthzError> {
    let comment = store
        .find_comment(comment_id)
        .await?
        .ok_or(AuthzError::NotFound("Comment"))?;

    forbid_unless(owns_task(store, user_id, comment.task_id).await?)?;
    Ok(comment)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::comment::CreateComment;
    use crate::models::container::CreateContainer;
    use crate::models::task::CreateTask;
    use crate::models::user::CreateUser;
    use crate::models::workspace::CreateWorkspace;
    use crate::store::{
        CommentRepository, ContainerRepository, MemoryStore, TaskRepository, UserRepository,
        WorkspaceRepository,
    };

    struct Chain {
        owner: Uuid,
        stranger: Uuid,
        workspace: Uuid,
        container: Uuid,
        task: Uuid,
        comment: Uuid,
    }

    async fn user(store: &MemoryStore, name: &str) -> Uuid {
        store
            .create_user(CreateUser {
                username: name.to_string(),
                email: format!("{}@example.com", name),
                password_hash: "$argon2id$stub".to_string(),
            })
            .await
            .unwrap()
            .id
    }

    async fn chain(store: &MemoryStore) -> Chain {
        let owner = user(store, "owner").await;
        let stranger = user(store, "stranger").await;

        let workspace = store
            .create_workspace(CreateWorkspace {
                user_id: owner,
                name: "Home".to_string(),
            })
            .await
            .unwrap()
            .id;
        let container = store
            .create_container(CreateContainer {
                workspace_id: workspace,
                name: "Todo".to_string(),
            })
            .await
            .unwrap()
            .id;
        let task = store
            .create_task(CreateTask {
                list_container_id: container,
                text: "Buy milk".to_string(),
                description: None,
            })
            .await
            .unwrap()
            .id;
        let comment = store
            .create_comment(CreateComment {
                task_id: task,
                user_id: owner,
                text: "Oat milk".to_string(),
            })
            .await
            .unwrap()
            .id;

        Chain {
            owner,
            stranger,
            workspace,
            container,
            task,
            comment,
        }
    }

    #[tokio::test]
    async fn test_owner_owns_whole_chain() {
        let store = MemoryStore::new();
        let c = chain(&store).await;

        assert!(owns_workspace(&store, c.owner, c.workspace).await.unwrap());
        assert!(owns_container(&store, c.owner, c.container).await.unwrap());
        assert!(owns_task(&store, c.owner, c.task).await.unwrap());
        assert!(owns_comment(&store, c.owner, c.comment).await.unwrap());
    }

    #[tokio::test]
    async fn test_stranger_owns_nothing() {
        let store = MemoryStore::new();
        let c = chain(&store).await;

        assert!(!owns_workspace(&store, c.stranger, c.workspace).await.unwrap());
        assert!(!owns_container(&store, c.stranger, c.container).await.unwrap());
        assert!(!owns_task(&store, c.stranger, c.task).await.unwrap());
        assert!(!owns_comment(&store, c.stranger, c.comment).await.unwrap());
    }

    #[tokio::test]
    async fn test_unknown_ids_are_not_owned() {
        let store = MemoryStore::new();
        let c = chain(&store).await;
        let unknown = Uuid::new_v4();

        assert!(!owns_workspace(&store, c.owner, unknown).await.unwrap());
        assert!(!owns_container(&store, c.owner, unknown).await.unwrap());
        assert!(!owns_task(&store, c.owner, unknown).await.unwrap());
        assert!(!owns_comment(&store, c.owner, unknown).await.unwrap());
    }

    #[tokio::test]
    async fn test_require_target_distinguishes_missing_and_foreign() {
        let store = MemoryStore::new();
        let c = chain(&store).await;

        let task = require_task(&store, c.owner, c.task).await.unwrap();
        assert_eq!(task.list_container_id, c.container);

        assert!(matches!(
            require_task(&store, c.stranger, c.task).await,
            Err(AuthzError::Forbidden)
        ));
        assert!(matches!(
            require_task(&store, c.owner, Uuid::new_v4()).await,
            Err(AuthzError::NotFound("Task"))
        ));
        assert!(matches!(
            require_comment(&store, c.stranger, c.comment).await,
            Err(AuthzError::Forbidden)
        ));
        assert!(matches!(
            require_workspace(&store, c.owner, Uuid::new_v4()).await,
            Err(AuthzError::NotFound("Workspace"))
        ));
    }

    #[tokio::test]
    async fn test_parent_gates_never_reveal_existence() {
        let store = MemoryStore::new();
        let c = chain(&store).await;

        assert!(require_workspace_parent(&store, c.owner, c.workspace).await.is_ok());
        assert!(require_container_parent(&store, c.owner, c.container).await.is_ok());
        assert!(require_task_parent(&store, c.owner, c.task).await.is_ok());

        for result in [
            require_workspace_parent(&store, c.stranger, c.workspace).await,
            require_workspace_parent(&store, c.owner, Uuid::new_v4()).await,
            require_container_parent(&store, c.stranger, c.container).await,
            require_container_parent(&store, c.owner, Uuid::new_v4()).await,
            require_task_parent(&store, c.stranger, c.task).await,
            require_task_parent(&store, c.owner, Uuid::new_v4()).await,
        ] {
            assert!(matches!(result, Err(AuthzError::Forbidden)));
        }
    }

    #[tokio::test]
    async fn test_deleted_workspace_breaks_chain() {
        let store = MemoryStore::new();
        let c = chain(&store).await;

        assert!(store.delete_workspace(c.workspace).await.unwrap());

        assert!(!owns_comment(&store, c.owner, c.comment).await.unwrap());
        assert!(matches!(
            require_container(&store, c.owner, c.container).await,
            Err(AuthzError::NotFound("Container"))
        ));
    }

    #[test]
    fn test_authz_error_display() {
        assert!(AuthzError::Forbidden.to_string().contains("Not authorized"));
        assert_eq!(AuthzError::NotFound("Task").to_string(), "Task not found");
    }
}
