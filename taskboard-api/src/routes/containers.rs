/// List container endpoints
///
/// # Endpoints
///
/// - `POST /containers` - Create a container in one of the caller's workspaces
/// - `GET /containers/:id` - Get a container
/// - `GET /workspaces/:id/containers` - List a workspace's containers
/// - `PUT /workspaces/:id/containers/:container_id` - Rename a container
/// - `DELETE /workspaces/:id/containers/:container_id` - Delete a container

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
        authorization::{require_container, require_workspace, require_workspace_parent},
        middleware::AuthContext,
    },
    models::{
        container::{CreateContainer, ListContainer, UpdateContainer},
        not_blank,
    },
};
use tracing::info;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Deserialize, Validate)]
pub struct CreateContainerRequest {
    pub workspace_id: Uuid,

    #[serde(default)]
    #[validate(
        custom(function = "not_blank"),
        length(max = 255, message = "must be at most 255 characters")
    )]
    pub name: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateContainerRequest {
    #[serde(default)]
    #[validate(
        custom(function = "not_blank"),
        length(max = 255, message = "must be at most 255 characters")
    )]
    pub name: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContainerCreated {
    pub message: String,
    pub container_id: Uuid,
}

#[derive(Debug, Serialize)]
pub struct ContainerResponse {
    pub container: ListContainer,
}

#[derive(Debug, Serialize)]
pub struct ContainerListResponse {
    pub containers: Vec<ListContainer>,
}

/// Loads a container and checks it sits under the workspace named in the path
async fn require_nested(
    state: &AppState,
    auth: &AuthContext,
    workspace_id: Uuid,
    id: Uuid,
) -> ApiResult<ListContainer> {
    let container = require_container(state.store.as_ref(), auth.user_id, id).await?;

    if container.workspace_id != workspace_id {
        return Err(ApiError::NotFound("Container not found".to_string()));
    }

    Ok(container)
}

/// Create a container
///
/// # Errors
///
/// - `400 Bad Request`: Empty name or missing `workspace_id`
/// - `403 Forbidden`: Workspace missing or owned by another user
pub async fn create_container(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    ValidatedJson(req): ValidatedJson<CreateContainerRequest>,
) -> ApiResult<Json<ContainerCreated>> {
    require_workspace_parent(state.store.as_ref(), auth.user_id, req.workspace_id).await?;

    let container = state
        .store
        .create_container(CreateContainer {
            workspace_id: req.workspace_id,
            name: req.name,
        })
        .await?;

    info!(container_id = %container.id, workspace_id = %container.workspace_id, "Container created");

    Ok(Json(ContainerCreated {
        message: "Container successfully created".to_string(),
        container_id: container.id,
    }))
}

pub async fn get_container(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    ResourcePath(id): ResourcePath<Uuid>,
) -> ApiResult<Json<ContainerResponse>> {
    let container = require_container(state.store.as_ref(), auth.user_id, id).await?;

    Ok(Json(ContainerResponse { container }))
}

/// List a workspace's containers in creation order
///
/// # Errors
///
/// - `403 Forbidden`: Workspace owned by another user
/// - `404 Not Found`: Workspace does not exist
pub async fn list_containers(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    ResourcePath(workspace_id): ResourcePath<Uuid>,
) -> ApiResult<Json<ContainerListResponse>> {
    require_workspace(state.store.as_ref(), auth.user_id, workspace_id).await?;

    let containers = state.store.list_containers(workspace_id).await?;

    Ok(Json(ContainerListResponse { containers }))
}

pub async fn update_container(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    ResourcePath((workspace_id, id)): ResourcePath<(Uuid, Uuid)>,
    ValidatedJson(req): ValidatedJson<UpdateContainerRequest>,
) -> ApiResult<Json<MessageResponse>> {
    require_nested(&state, &auth, workspace_id, id).await?;

    state
        .store
        .update_container(id, UpdateContainer { name: req.name })
        .await?
        .ok_or_else(|| ApiError::NotFound("Container not found".to_string()))?;

    Ok(Json(MessageResponse::new("Container successfully updated")))
}

/// Delete a container with its tasks and their comments
pub async fn delete_container(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    ResourcePath((workspace_id, id)): ResourcePath<(Uuid, Uuid)>,
) -> ApiResult<Json<MessageResponse>> {
    require_nested(&state, &auth, workspace_id, id).await?;

    if !state.store.delete_container(id).await? {
        return Err(ApiError::NotFound("Container not found".to_string()));
    }

    info!(container_id = %id, "Container deleted");
    Ok(Json(MessageResponse::new("Container successfully deleted")))
}
