/// Comment endpoints
///
/// The author of a new comment is the authenticated caller. Access follows
/// the owning workspace, like every other resource.
///
/// # Endpoints
///
/// - `POST /comments` - Comment on one of the caller's tasks
/// - `GET /comments/:id` - Get a comment
/// - `GET /tasks/:id/comments` - List a task's comments
/// - `PUT /tasks/:id/comments/:comment_id` - Edit a comment
/// - `DELETE /tasks/:id/comments/:comment_id` - Delete a comment

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
        authorization::{require_comment, require_task, require_task_parent},
        middleware::AuthContext,
    },
    models::{
        comment::{Comment, CreateComment, UpdateComment},
        not_blank,
    },
};
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Deserialize, Validate)]
pub struct CreateCommentRequest {
    pub task_id: Uuid,

    #[serde(default)]
    #[validate(
        custom(function = "not_blank"),
        length(max = 10000, message = "must be at most 10000 characters")
    )]
    pub text: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateCommentRequest {
    #[serde(default)]
    #[validate(
        custom(function = "not_blank"),
        length(max = 10000, message = "must be at most 10000 characters")
    )]
    pub text: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentCreated {
    pub message: String,
    pub comment_id: Uuid,
}

#[derive(Debug, Serialize)]
pub struct CommentResponse {
    pub comment: Comment,
}

#[derive(Debug, Serialize)]
pub struct CommentListResponse {
    pub comments: Vec<Comment>,
}

async fn require_nested(
    state: &AppState,
    auth: &AuthContext,
    task_id: Uuid,
    id: Uuid,
) -> ApiResult<Comment> {
    let comment = require_comment(state.store.as_ref(), auth.user_id, id).await?;

    if comment.task_id != task_id {
        return Err(ApiError::NotFound("Comment not found".to_string()));
    }

    Ok(comment)
}

/// Create a comment
///
/// # Errors
///
/// - `400 Bad Request`: Empty text or missing `task_id`
/// - `403 Forbidden`: Task missing or owned by another user
pub async fn create_comment(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    ValidatedJson(req): ValidatedJson<CreateCommentRequest>,
) -> ApiResult<Json<CommentCreated>> {
    require_task_parent(state.store.as_ref(), auth.user_id, req.task_id).await?;

    let comment = state
        .store
        .create_comment(CreateComment {
            task_id: req.task_id,
            user_id: auth.user_id,
            text: req.text,
        })
        .await?;

    Ok(Json(CommentCreated {
        message: "Comment successfully created".to_string(),
        comment_id: comment.id,
    }))
}

pub async fn get_comment(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    ResourcePath(id): ResourcePath<Uuid>,
) -> ApiResult<Json<CommentResponse>> {
    let comment = require_comment(state.store.as_ref(), auth.user_id, id).await?;

    Ok(Json(CommentResponse { comment }))
}

pub async fn list_comments(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    ResourcePath(task_id): ResourcePath<Uuid>,
) -> ApiResult<Json<CommentListResponse>> {
    require_task(state.store.as_ref(), auth.user_id, task_id).await?;

    let comments = state.store.list_comments(task_id).await?;

    Ok(Json(CommentListResponse { comments }))
}

pub async fn update_comment(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    ResourcePath((task_id, id)): ResourcePath<(Uuid, Uuid)>,
    ValidatedJson(req): ValidatedJson<UpdateCommentRequest>,
) -> ApiResult<Json<MessageResponse>> {
    require_nested(&state, &auth, task_id, id).await?;

    state
        .store
        .update_comment(id, UpdateComment { text: req.text })
        .await?
        .ok_or_else(|| ApiError::NotFound("Comment not found".to_string()))?;

    Ok(Json(MessageResponse::new("Comment successfully updated")))
}

pub async fn delete_comment(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    ResourcePath((task_id, id)): ResourcePath<(Uuid, Uuid)>,
) -> ApiResult<Json<MessageResponse>> {
    require_nested(&state, &auth, task_id, id).await?;

    if !state.store.delete_comment(id).await? {
        return Err(ApiError::NotFound("Comment not found".to_string()));
    }

    Ok(Json(MessageResponse::new("Comment successfully deleted")))
}
