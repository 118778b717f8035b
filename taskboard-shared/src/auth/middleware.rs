/// Bearer-token authentication middleware for Axum
///
/// The middleware reads `Authorization: Bearer <token>`, verifies it as an
/// access token through the [`CredentialStore`], and stores the resulting
/// [`AuthContext`] in the request extensions. Every failure is a 401 with a
/// JSON body; the handler is never reached.
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use axum::{middleware, routing::get, Extension, Router};
/// use taskboard_shared::auth::credentials::CredentialStore;
/// use taskboard_shared::auth::middleware::{jwt_auth_middleware, AuthContext};
///
/// async fn protected_handler(Extension(auth): Extension<AuthContext>) -> String {
///     format!("Hello, {}!", auth.username)
/// }
///
/// fn router(credentials: Arc<CredentialStore>) -> Router {
///     Router::new()
///         .route("/protected", get(protected_handler))
///         .layer(middleware::from_fn_with_state(credentials, jwt_auth_middleware))
/// }
/// ```

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{header, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::debug;
use uuid::Uuid;

use super::credentials::{CredentialError, CredentialStore};
use super::jwt::JwtError;
use crate::models::user::UserProfile;

/// Identity of the caller, added to request extensions
///
/// ```
/// use axum::Extension;
/// use taskboard_shared::auth::middleware::AuthContext;
///
/// async fn handler(Extension(auth): Extension<AuthContext>) -> String {
///     format!("User: {}", auth.user_id)
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthContext {
    pub user_id: Uuid,
    pub username: String,
    pub email: String,
}

impl AuthContext {
    pub fn from_profile(profile: UserProfile) -> Self {
        Self {
            user_id: profile.id,
            username: profile.username,
            email: profile.email,
        }
    }

    /// Public view of the caller, as returned by `/protected`
    pub fn profile(&self) -> UserProfile {
        UserProfile {
            id: self.user_id,
            username: self.username.clone(),
            email: self.email.clone(),
        }
    }
}

/// Error type for authentication middleware
#[derive(Debug, PartialEq)]
pub enum AuthError {
    /// Missing authorization header
    MissingCredentials,

    /// Header present but not `Bearer <token>`
    InvalidFormat,

    /// Token validation failed
    InvalidToken(String),
}

impl AuthError {
    fn message(&self) -> &str {
        match self {
            AuthError::MissingCredentials => "Missing authorization token",
            AuthError::InvalidFormat => "Expected Bearer token",
            AuthError::InvalidToken(msg) => msg,
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let body = Json(json!({
            "error": "unauthorized",
            "message": self.message(),
        }));

        (StatusCode::UNAUTHORIZED, body).into_response()
    }
}

/// Extracts the token from an `Authorization` header value
///
/// The scheme is matched case-insensitively; an empty token is rejected.
pub fn bearer_token(header_value: &str) -> Result<&str, AuthError> {
    let (scheme, token) = header_value
        .split_once(' ')
        .ok_or(AuthError::InvalidFormat)?;

    if !scheme.eq_ignore_ascii_case("Bearer") {
        return Err(AuthError::InvalidFormat);
    }

    let token = token.trim();
    if token.is_empty() {
        return Err(AuthError::InvalidFormat);
    }

    Ok(token)
}

/// JWT authentication middleware
///
/// Use with `axum::middleware::from_fn_with_state`.
///
/// # Errors
///
/// Returns 401 Unauthorized if:
/// - Authorization header is missing or not a Bearer token
/// - Token signature or issuer is invalid
/// - Token has expired
/// - A refresh token is presented
pub async fn jwt_auth_middleware(
    State(credentials): State<Arc<CredentialStore>>,
    mut req: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let auth_header = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or(AuthError::MissingCredentials)?;

    let token = bearer_token(auth_header)?;

    let profile = credentials.verify_token(token).map_err(|e| {
        debug!(error = %e, "Rejected bearer token");
        match e {
            CredentialError::InvalidToken(JwtError::Expired) => {
                AuthError::InvalidToken("Token expired".to_string())
            }
            _ => AuthError::InvalidToken("Invalid token".to_string()),
        }
    })?;

    req.extensions_mut().insert(AuthContext::from_profile(profile));

    Ok(next.run(req).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::jwt::JwtSettings;
    use crate::store::MemoryStore;
    use axum::{body::Body, middleware, routing::get, Extension, Router};
    use tower::ServiceExt;

    const SECRET: &str = "test-secret-key-that-is-at-least-32-bytes";

    fn profile() -> UserProfile {
        UserProfile {
            id: Uuid::new_v4(),
            username: "alice".to_string(),
            email: "alice@example.com".to_string(),
        }
    }

    fn app() -> (Arc<CredentialStore>, Router) {
        let credentials = Arc::new(CredentialStore::new(
            Arc::new(MemoryStore::new()),
            JwtSettings::new(SECRET).unwrap(),
        ));

        let router = Router::new()
            .route(
                "/whoami",
                get(|Extension(auth): Extension<AuthContext>| async move { auth.username }),
            )
            .layer(middleware::from_fn_with_state(
                credentials.clone(),
                jwt_auth_middleware,
            ));

        (credentials, router)
    }

    async fn call(router: Router, authorization: Option<String>) -> StatusCode {
        let mut req = Request::builder().uri("/whoami");
        if let Some(value) = authorization {
            req = req.header(header::AUTHORIZATION, value);
        }

        router
            .oneshot(req.body(Body::empty()).unwrap())
            .await
            .unwrap()
            .status()
    }

    #[test]
    fn test_auth_context_round_trips_profile() {
        let profile = profile();
        let context = AuthContext::from_profile(profile.clone());

        assert_eq!(context.user_id, profile.id);
        assert_eq!(context.profile(), profile);
    }

    #[test]
    fn test_bearer_token_parsing() {
        assert_eq!(bearer_token("Bearer abc.def.ghi"), Ok("abc.def.ghi"));
        assert_eq!(bearer_token("bearer abc"), Ok("abc"));
        assert_eq!(bearer_token("Basic abc"), Err(AuthError::InvalidFormat));
        assert_eq!(bearer_token("Bearer "), Err(AuthError::InvalidFormat));
        assert_eq!(bearer_token("abc"), Err(AuthError::InvalidFormat));
    }

    #[test]
    fn test_auth_error_into_response() {
        for err in [
            AuthError::MissingCredentials,
            AuthError::InvalidFormat,
            AuthError::InvalidToken("Invalid token".to_string()),
        ] {
            assert_eq!(err.into_response().status(), StatusCode::UNAUTHORIZED);
        }
    }

    #[tokio::test]
    async fn test_valid_access_token_passes() {
        let (credentials, router) = app();
        let tokens = credentials.issue_tokens(&profile()).unwrap();

        let status = call(router, Some(format!("Bearer {}", tokens.access_token))).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_rejections_are_unauthorized() {
        let (credentials, router) = app();
        let tokens = credentials.issue_tokens(&profile()).unwrap();

        let foreign = JwtSettings::new("another-secret-key-that-is-32-bytes-long")
            .unwrap();
        let forged = foreign
            .create_token(&foreign.claims_for(&profile(), crate::auth::jwt::TokenType::Access))
            .unwrap();

        for authorization in [
            None,
            Some("Token abc".to_string()),
            Some("Bearer not-a-jwt".to_string()),
            Some(format!("Bearer {}", forged)),
            Some(format!("Bearer {}", tokens.refresh_token)),
        ] {
            let status = call(router.clone(), authorization).await;
            assert_eq!(status, StatusCode::UNAUTHORIZED);
        }
    }
}
