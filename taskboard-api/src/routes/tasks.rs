/// Task endpoints
///
/// A task may be moved to another container through update by sending a
/// `list_container_id`; the caller must own the destination too. Unknown
/// body keys (such as a legacy `comments` field) are ignored.
///
/// # Endpoints
///
/// - `POST /tasks` - Create a task in one of the caller's containers
/// - `GET /tasks/:id` - Get a task
/// - `GET /containers/:id/tasks` - List a container's tasks
/// - `PUT /containers/:id/tasks/:task_id` - Update or move a task
/// - `DELETE /containers/:id/tasks/:task_id` - Delete a task

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    extract::{ResourcePath, ValidatedJson},
    routes::MessageResponse,
};
use axum::{extract::State, Extension, Json};
use serde::{Deserialize, Serialize};
use taskboard_shared::{
    auth::{
        authorization::{require_container, require_container_parent, require_task},
        middleware::AuthContext,
    },
    models::{
        not_blank,
        task::{CreateTask, Task, UpdateTask},
    },
};
use tracing::info;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Deserialize, Validate)]
pub struct CreateTaskRequest {
    pub list_container_id: Uuid,

    #[serde(default)]
    #[validate(
        custom(function = "not_blank"),
        length(max = 1000, message = "must be at most 1000 characters")
    )]
    pub text: String,

    #[validate(length(max = 10000, message = "must be at most 10000 characters"))]
    pub description: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateTaskRequest {
    #[serde(default)]
    #[validate(
        custom(function = "not_blank"),
        length(max = 1000, message = "must be at most 1000 characters")
    )]
    pub text: String,

    #[validate(length(max = 10000, message = "must be at most 10000 characters"))]
    pub description: Option<String>,

    /// Destination container when moving the task
    pub list_container_id: Option<Uuid>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskCreated {
    pub message: String,
    pub task_id: Uuid,
}

#[derive(Debug, Serialize)]
pub struct TaskResponse {
    pub task: Task,
}

#[derive(Debug, Serialize)]
pub struct TaskListResponse {
    pub tasks: Vec<Task>,
}

/// Loads a task and checks it sits in the container named in the path
async fn require_nested(
    state: &AppState,
    auth: &AuthContext,
    list_container_id: Uuid,
    id: Uuid,
) -> ApiResult<Task> {
    let task = require_task(state.store.as_ref(), auth.user_id, id).await?;

    if task.list_container_id != list_container_id {
        return Err(ApiError::NotFound("Task not found".to_string()));
    }

    Ok(task)
}

/// Create a task
///
/// # Endpoint
///
/// ```text
/// POST /tasks
/// Authorization: Bearer <token>
///
/// { "list_container_id": "uuid", "text": "Buy milk", "description": "2 litres" }
/// ```
///
/// # Errors
///
/// - `400 Bad Request`: Empty text or missing `list_container_id`
/// - `403 Forbidden`: Container missing or owned by another user
pub async fn create_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    ValidatedJson(req): ValidatedJson<CreateTaskRequest>,
) -> ApiResult<Json<TaskCreated>> {
    require_container_parent(state.store.as_ref(), auth.user_id, req.list_container_id).await?;

    let task = state
        .store
        .create_task(CreateTask {
            list_container_id: req.list_container_id,
            text: req.text,
            description: req.description,
        })
        .await?;

    info!(task_id = %task.id, list_container_id = %task.list_container_id, "Task created");

    Ok(Json(TaskCreated {
        message: "Task successfully created".to_string(),
        task_id: task.id,
    }))
}

pub async fn get_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    ResourcePath(id): ResourcePath<Uuid>,
) -> ApiResult<Json<TaskResponse>> {
    let task = require_task(state.store.as_ref(), auth.user_id, id).await?;

    Ok(Json(TaskResponse { task }))
}

/// List a container's tasks in creation order
pub async fn list_tasks(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    ResourcePath(list_container_id): ResourcePath<Uuid>,
) -> ApiResult<Json<TaskListResponse>> {
    require_container(state.store.as_ref(), auth.user_id, list_container_id).await?;

    let tasks = state.store.list_tasks(list_container_id).await?;

    Ok(Json(TaskListResponse { tasks }))
}

/// Update a task, optionally moving it to another container
///
/// `description` is replaced as sent; omitting it clears it.
///
/// # Errors
///
/// - `400 Bad Request`: Empty text
/// - `403 Forbidden`: Task or destination container owned by another user,
///   or destination container missing
/// - `404 Not Found`: Task does not exist or is not in this container
pub async fn update_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    ResourcePath((list_container_id, id)): ResourcePath<(Uuid, Uuid)>,
    ValidatedJson(req): ValidatedJson<UpdateTaskRequest>,
) -> ApiResult<Json<MessageResponse>> {
    let task = require_nested(&state, &auth, list_container_id, id).await?;

    if let Some(destination) = req.list_container_id {
        if destination != task.list_container_id {
            require_container_parent(state.store.as_ref(), auth.user_id, destination).await?;
            info!(task_id = %id, from = %task.list_container_id, to = %destination, "Moving task");
        }
    }

    state
        .store
        .update_task(
            id,
            UpdateTask {
                text: req.text,
                description: req.description,
                list_container_id: req.list_container_id,
            },
        )
        .await?
        .ok_or_else(|| ApiError::NotFound("Task not found".to_string()))?;

    Ok(Json(MessageResponse::new("Task successfully updated")))
}

/// Delete a task with its comments
pub async fn delete_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    ResourcePath((list_container_id, id)): ResourcePath<(Uuid, Uuid)>,
) -> ApiResult<Json<MessageResponse>> {
    require_nested(&state, &auth, list_container_id, id).await?;

    if !state.store.delete_task(id).await? {
        return Err(ApiError::NotFound("Task not found".to_string()));
    }

    Ok(Json(MessageResponse::new("Task successfully deleted")))
}
