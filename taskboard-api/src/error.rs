/// Error handling for the API server
///
/// This module provides a unified error type that maps to HTTP responses.
/// All handlers return `Result<T, ApiError>`; the `From` impls below are the
/// only place where domain errors become status codes.
///
/// | Variant | Status | `error` code |
/// |---|---|---|
/// | `BadRequest` | 400 | `bad_request` |
/// | `ValidationError` | 400 | `validation_error` |
/// | `DuplicateUser` | 400 | `duplicate_user` |
/// | `InvalidCredentials` | 401 | `invalid_credentials` |
/// | `Unauthorized` | 401 | `unauthorized` |
/// | `Forbidden` | 403 | `forbidden` |
/// | `NotFound` | 404 | `not_found` |
/// | `InternalError` | 500 | `internal_error` |
///
/// # Example
///
/// ```
/// use taskboard_api::error::{ApiError, ApiResult};
/// use axum::Json;
/// use serde_json::{json, Value};
///
/// async fn handler(found: bool) -> ApiResult<Json<Value>> {
///     if !found {
///         return Err(ApiError::NotFound("Workspace not found".to_string()));
///     }
///     Ok(Json(json!({ "message": "ok" })))
/// }
/// ```

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use taskboard_shared::auth::authorization::AuthzError;
use taskboard_shared::auth::credentials::CredentialError;
use taskboard_shared::store::StoreError;
use validator::ValidationErrors;

/// API result type alias
pub type ApiResult<T> = Result<T, ApiError>;

/// Unified API error type
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Malformed request body (400)
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Field validation failed (400)
    #[error("Validation failed: {} errors", .0.len())]
    ValidationError(Vec<ValidationErrorDetail>),

    /// Username or email already registered (400)
    #[error("Username or email already registered")]
    DuplicateUser,

    /// Login failed (401)
    #[error("Invalid username or password")]
    InvalidCredentials,

    /// Missing or invalid token (401)
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Forbidden (403)
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Not found (404)
    #[error("Not found: {0}")]
    NotFound(String),

    /// Internal server error (500); the message is logged, never returned
    #[error("Internal error: {0}")]
    InternalError(String),
}

/// Validation error detail
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationErrorDetail {
    /// Field that failed validation
    pub field: String,

    /// Error message
    pub message: String,
}

/// Error response format
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error code (e.g., "bad_request", "unauthorized")
    pub error: String,

    /// Human-readable error message
    pub message: String,

    /// Optional validation errors
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<ValidationErrorDetail>>,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) | ApiError::ValidationError(_) | ApiError::DuplicateUser => {
                StatusCode::BAD_REQUEST
            }
            ApiError::InvalidCredentials | ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn code(&self) -> &'static str {
        match self {
            ApiError::BadRequest(_) => "bad_request",
            ApiError::ValidationError(_) => "validation_error",
            ApiError::DuplicateUser => "duplicate_user",
            ApiError::InvalidCredentials => "invalid_credentials",
            ApiError::Unauthorized(_) => "unauthorized",
            ApiError::Forbidden(_) => "forbidden",
            ApiError::NotFound(_) => "not_found",
            ApiError::InternalError(_) => "internal_error",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let error = self.code().to_string();

        let (message, details) = match self {
            ApiError::ValidationError(errors) => {
                ("Request validation failed".to_string(), Some(errors))
            }
            ApiError::InternalError(msg) => {
                // Log internal errors but don't expose details to clients
                tracing::error!(error = %msg, "Internal error");
                ("An internal error occurred".to_string(), None)
            }
            ApiError::BadRequest(msg)
            | ApiError::Unauthorized(msg)
            | ApiError::Forbidden(msg)
            | ApiError::NotFound(msg) => (msg, None),
            other => (other.to_string(), None),
        };

        let body = Json(ErrorResponse {
            error,
            message,
            details,
        });

        (status, body).into_response()
    }
}

/// Flattens validator output into one detail per failed rule, sorted by field
pub fn validation_details(errors: &ValidationErrors) -> Vec<ValidationErrorDetail> {
    let mut details: Vec<ValidationErrorDetail> = errors
        .field_errors()
        .iter()
        .flat_map(|(field, errors)| {
            errors.iter().map(move |error| ValidationErrorDetail {
                field: field.to_string(),
                message: error
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| "Validation failed".to_string()),
            })
        })
        .collect();

    details.sort_by(|a, b| a.field.cmp(&b.field));
    details
}

impl From<ValidationErrors> for ApiError {
    fn from(errors: ValidationErrors) -> Self {
        ApiError::ValidationError(validation_details(&errors))
    }
}

/// Convert storage errors to API errors
///
/// A foreign key violation means the parent vanished between the ownership
/// check and the insert, which reads the same as a missing parent.
impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Validation(errors) => errors.into(),
            StoreError::UniqueViolation(_) => ApiError::DuplicateUser,
            StoreError::ForeignKeyViolation(_) => {
                ApiError::Forbidden("Not authorized to access this resource".to_string())
            }
            StoreError::Database(e) => ApiError::InternalError(format!("Database error: {}", e)),
        }
    }
}

/// Convert authorization errors to API errors
impl From<AuthzError> for ApiError {
    fn from(err: AuthzError) -> Self {
        match err {
            AuthzError::Forbidden => ApiError::Forbidden(err.to_string()),
            AuthzError::NotFound(_) => ApiError::NotFound(err.to_string()),
            AuthzError::Store(e) => e.into(),
        }
    }
}

/// Convert credential errors to API errors
impl From<CredentialError> for ApiError {
    fn from(err: CredentialError) -> Self {
        match err {
            CredentialError::InvalidInput(errors) => errors.into(),
            CredentialError::DuplicateUser => ApiError::DuplicateUser,
            CredentialError::InvalidCredentials => ApiError::InvalidCredentials,
            CredentialError::InvalidToken(_) => {
                ApiError::Unauthorized("Invalid or expired token".to_string())
            }
            CredentialError::TokenIssue(e) => ApiError::InternalError(e.to_string()),
            CredentialError::Password(e) => {
                ApiError::InternalError(format!("Password operation failed: {}", e))
            }
            CredentialError::Store(e) => e.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::{ValidationError, ValidationErrors};

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[test]
    fn test_error_display() {
        let err = ApiError::BadRequest("Invalid input".to_string());
        assert_eq!(err.to_string(), "Bad request: Invalid input");

        let err = ApiError::NotFound("User not found".to_string());
        assert_eq!(err.to_string(), "Not found: User not found");
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(ApiError::DuplicateUser.status(), StatusCode::BAD_REQUEST);
        assert_eq!(ApiError::ValidationError(vec![]).status(), StatusCode::BAD_REQUEST);
        assert_eq!(ApiError::InvalidCredentials.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(ApiError::Forbidden(String::new()).status(), StatusCode::FORBIDDEN);
        assert_eq!(ApiError::NotFound(String::new()).status(), StatusCode::NOT_FOUND);
        assert_eq!(
            ApiError::InternalError(String::new()).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_authz_mapping() {
        assert!(matches!(ApiError::from(AuthzError::Forbidden), ApiError::Forbidden(_)));
        assert!(matches!(
            ApiError::from(AuthzError::NotFound("Task")),
            ApiError::NotFound(msg) if msg == "Task not found"
        ));
    }

    #[test]
    fn test_store_mapping() {
        assert!(matches!(
            ApiError::from(StoreError::UniqueViolation("users_username_key".to_string())),
            ApiError::DuplicateUser
        ));
        assert!(matches!(
            ApiError::from(StoreError::ForeignKeyViolation("tasks_list_container_id_fkey".to_string())),
            ApiError::Forbidden(_)
        ));
        assert!(matches!(
            ApiError::from(StoreError::Database(sqlx::Error::PoolTimedOut)),
            ApiError::InternalError(_)
        ));
    }

    #[test]
    fn test_validation_details() {
        let mut blank = ValidationError::new("blank");
        blank.message = Some("must not be empty".into());

        let mut errors = ValidationErrors::new();
        errors.add("text", blank);
        errors.add("name", ValidationError::new("length"));

        let details = validation_details(&errors);
        assert_eq!(
            details,
            vec![
                ValidationErrorDetail {
                    field: "name".to_string(),
                    message: "Validation failed".to_string(),
                },
                ValidationErrorDetail {
                    field: "text".to_string(),
                    message: "must not be empty".to_string(),
                },
            ]
        );
    }

    #[tokio::test]
    async fn test_internal_error_is_opaque() {
        let response = ApiError::InternalError("connection refused to 10.0.0.5".to_string())
            .into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = body_json(response).await;
        assert_eq!(body["error"], "internal_error");
        assert_eq!(body["message"], "An internal error occurred");
        assert!(body.get("details").is_none());
    }

    #[tokio::test]
    async fn test_validation_body_has_details() {
        let response = ApiError::ValidationError(vec![ValidationErrorDetail {
            field: "name".to_string(),
            message: "must not be empty".to_string(),
        }])
        .into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = body_json(response).await;
        assert_eq!(body["error"], "validation_error");
        assert_eq!(body["details"][0]["field"], "name");
    }
}
