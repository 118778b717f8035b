/// Authentication endpoints
///
/// # Endpoints
///
/// - `POST /signup` - Register a new user and get tokens
/// - `POST /login` - Login and get tokens
/// - `POST /refresh` - Exchange a refresh token for a new access token
/// - `GET /protected` - Echo the caller's identity (requires a token)

use crate::{app::AppState, error::ApiResult, extract::ValidatedJson};
use axum::{extract::State, Extension, Json};
use serde::{Deserialize, Serialize};
use taskboard_shared::{
    auth::{credentials::TokenPair, middleware::AuthContext},
    models::{not_blank, user::UserProfile},
};
use validator::Validate;

/// Signup request
#[derive(Debug, Deserialize, Validate)]
pub struct SignupRequest {
    #[serde(default)]
    #[validate(
        custom(function = "not_blank"),
        length(max = 255, message = "must be at most 255 characters")
    )]
    pub username: String,

    #[serde(default)]
    #[validate(custom(function = "not_blank"), email(message = "Invalid email format"))]
    pub email: String,

    #[serde(default)]
    #[validate(custom(function = "not_blank"))]
    pub password: String,
}

/// Login request
///
/// Carries no validation rules: empty fields are reported as invalid
/// credentials like any other failed login.
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[serde(default)]
    pub username: String,

    #[serde(default)]
    pub password: String,
}

/// Refresh token request
#[derive(Debug, Deserialize, Validate)]
pub struct RefreshRequest {
    #[serde(default)]
    #[validate(custom(function = "not_blank"))]
    pub refresh_token: String,
}

/// Signup and login response
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub message: String,

    /// Access token
    pub token: String,

    pub refresh_token: String,

    /// Seconds until `token` expires
    pub expires_in: i64,

    pub user: UserProfile,
}

impl AuthResponse {
    fn new(message: &str, tokens: TokenPair, user: UserProfile) -> Self {
        Self {
            message: message.to_string(),
            token: tokens.access_token,
            refresh_token: tokens.refresh_token,
            expires_in: tokens.expires_in,
            user,
        }
    }
}

/// Refresh response
#[derive(Debug, Serialize)]
pub struct RefreshResponse {
    /// New access token
    pub token: String,

    /// The refresh token that was presented
    pub refresh_token: String,

    pub expires_in: i64,
}

/// Protected probe response
#[derive(Debug, Serialize)]
pub struct ProtectedResponse {
    pub message: String,
    pub user: UserProfile,
}

/// Register a new user
///
/// # Endpoint
///
/// ```text
/// POST /signup
/// Content-Type: application/json
///
/// {
///   "username": "alice",
///   "email": "alice@example.com",
///   "password": "s3cret"
/// }
/// ```
///
/// # Response
///
/// ```json
/// {
///   "message": "User successfully created",
///   "token": "eyJ...",
///   "refresh_token": "eyJ...",
///   "expires_in": 3600,
///   "user": { "id": "uuid", "username": "alice", "email": "alice@example.com" }
/// }
/// ```
///
/// # Errors
///
/// - `400 Bad Request`: Missing or empty field, malformed email
/// - `400 Bad Request`: Username or email already registered (`duplicate_user`)
/// - `500 Internal Server Error`: Server error
pub async fn signup(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<SignupRequest>,
) -> ApiResult<Json<AuthResponse>> {
    let user = state
        .credentials
        .register(&req.username, &req.email, &req.password)
        .await?;
    let tokens = state.credentials.issue_tokens(&user)?;

    Ok(Json(AuthResponse::new("User successfully created", tokens, user)))
}

/// Login endpoint
///
/// # Endpoint
///
/// ```text
/// POST /login
/// Content-Type: application/json
///
/// { "username": "alice", "password": "s3cret" }
/// ```
///
/// # Errors
///
/// - `401 Unauthorized`: Invalid credentials (same response for every cause)
/// - `500 Internal Server Error`: Server error
pub async fn login(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<LoginRequest>,
) -> ApiResult<Json<AuthResponse>> {
    let user = state
        .credentials
        .authenticate(&req.username, &req.password)
        .await?;
    let tokens = state.credentials.issue_tokens(&user)?;

    Ok(Json(AuthResponse::new("Login successful", tokens, user)))
}

/// Token refresh endpoint
///
/// # Endpoint
///
/// ```text
/// POST /refresh
/// Content-Type: application/json
///
/// { "refresh_token": "eyJ..." }
/// ```
///
/// # Errors
///
/// - `401 Unauthorized`: Invalid or expired refresh token, or an access token
pub async fn refresh(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<RefreshRequest>,
) -> ApiResult<Json<RefreshResponse>> {
    let tokens = state.credentials.refresh(&req.refresh_token).await?;

    Ok(Json(RefreshResponse {
        token: tokens.access_token,
        refresh_token: tokens.refresh_token,
        expires_in: tokens.expires_in,
    }))
}

/// Returns the identity carried by the caller's access token
pub async fn protected(Extension(auth): Extension<AuthContext>) -> Json<ProtectedResponse> {
    Json(ProtectedResponse {
        message: "You have access to this protected route".to_string(),
        user: auth.profile(),
    })
}
