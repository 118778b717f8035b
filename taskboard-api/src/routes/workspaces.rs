/// Workspace endpoints
///
/// The owner of a new workspace is always the authenticated caller; a
/// `user_id` in the body is ignored.
///
/// # Endpoints
///
/// - `POST /workspaces` - Create a workspace
/// - `GET /workspaces` - List the caller's workspaces
/// - `GET /workspaces/:id` - Get a workspace
/// - `PUT /workspaces/:id` - Rename a workspace
/// - `DELETE /workspaces/:id` - Delete a workspace and everything in it

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    extract::{ResourcePath, ValidatedJson},
    routes::MessageResponse,
};
use axum::{extract::State, Extension, Json};
use serde::{Deserialize, Serialize};
use taskboard_shared::{
    auth::{authorization::require_workspace, middleware::AuthContext},
    models::{
        not_blank,
        workspace::{CreateWorkspace, UpdateWorkspace, Workspace},
    },
};
use tracing::info;
use uuid::Uuid;
use validator::Validate;

/// Create or rename request
#[derive(Debug, Deserialize, Validate)]
pub struct WorkspaceRequest {
    #[serde(default)]
    #[validate(
        custom(function = "not_blank"),
        length(max = 255, message = "must be at most 255 characters")
    )]
    pub name: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkspaceCreated {
    pub message: String,
    pub workspace_id: Uuid,
}

#[derive(Debug, Serialize)]
pub struct WorkspaceResponse {
    pub workspace: Workspace,
}

#[derive(Debug, Serialize)]
pub struct WorkspaceListResponse {
    pub workspaces: Vec<Workspace>,
}

/// Create a workspace owned by the caller
///
/// # Endpoint
///
/// ```text
/// POST /workspaces
/// Authorization: Bearer <token>
///
/// { "name": "Home" }
/// ```
///
/// # Response
///
/// ```json
/// { "message": "Workspace successfully created", "workspaceId": "uuid" }
/// ```
pub async fn create_workspace(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    ValidatedJson(req): ValidatedJson<WorkspaceRequest>,
) -> ApiResult<Json<WorkspaceCreated>> {
    let workspace = state
        .store
        .create_workspace(CreateWorkspace {
            user_id: auth.user_id,
            name: req.name,
        })
        .await?;

    info!(workspace_id = %workspace.id, user_id = %auth.user_id, "Workspace created");

    Ok(Json(WorkspaceCreated {
        message: "Workspace successfully created".to_string(),
        workspace_id: workspace.id,
    }))
}

/// List the caller's workspaces in creation order
pub async fn list_workspaces(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<WorkspaceListResponse>> {
    let workspaces = state.store.list_workspaces(auth.user_id).await?;

    Ok(Json(WorkspaceListResponse { workspaces }))
}

/// Get a workspace
///
/// # Errors
///
/// - `403 Forbidden`: Workspace belongs to another user
/// - `404 Not Found`: Workspace does not exist
pub async fn get_workspace(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    ResourcePath(id): ResourcePath<Uuid>,
) -> ApiResult<Json<WorkspaceResponse>> {
    let workspace = require_workspace(state.store.as_ref(), auth.user_id, id).await?;

    Ok(Json(WorkspaceResponse { workspace }))
}

/// Rename a workspace
///
/// # Errors
///
/// - `400 Bad Request`: Empty name
/// - `403 Forbidden`: Workspace belongs to another user
/// - `404 Not Found`: Workspace does not exist
pub async fn update_workspace(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    ResourcePath(id): ResourcePath<Uuid>,
    ValidatedJson(req): ValidatedJson<WorkspaceRequest>,
) -> ApiResult<Json<MessageResponse>> {
    require_workspace(state.store.as_ref(), auth.user_id, id).await?;

    state
        .store
        .update_workspace(id, UpdateWorkspace { name: req.name })
        .await?
        .ok_or_else(|| ApiError::NotFound("Workspace not found".to_string()))?;

    Ok(Json(MessageResponse::new("Workspace successfully updated")))
}

/// Delete a workspace with its containers, tasks and comments
///
/// # Errors
///
/// - `403 Forbidden`: Workspace belongs to another user
/// - `404 Not Found`: Workspace does not exist
pub async fn delete_workspace(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    ResourcePath(id): ResourcePath<Uuid>,
) -> ApiResult<Json<MessageResponse>> {
    require_workspace(state.store.as_ref(), auth.user_id, id).await?;

    if !state.store.delete_workspace(id).await? {
        return Err(ApiError::NotFound("Workspace not found".to_string()));
    }

    info!(workspace_id = %id, user_id = %auth.user_id, "Workspace deleted");
    Ok(Json(MessageResponse::new("Workspace successfully deleted")))
}
