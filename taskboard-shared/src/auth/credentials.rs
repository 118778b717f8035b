/// Credential store: signup, login and token handling
///
/// `CredentialStore` is the only component that touches password hashes or
/// signs tokens. It is built once at startup from an explicit
/// [`JwtSettings`] and a storage handle.
///
/// Login failures are indistinguishable: an unknown username,
/// an empty field and a wrong password all yield
/// [`CredentialError::InvalidCredentials`], and an unknown username still
/// pays for one Argon2 hash so response timing gives nothing away.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use taskboard_shared::auth::credentials::CredentialStore;
/// use taskboard_shared::auth::jwt::JwtSettings;
/// use taskboard_shared::auth::password::HashParams;
/// use taskboard_shared::store::MemoryStore;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let jwt = JwtSettings::new("an-example-secret-that-is-32-bytes!")?;
/// let credentials = CredentialStore::new(Arc::new(MemoryStore::new()), jwt);
///
/// let user = credentials.register("alice", "alice@example.com", "s3cret").await?;
/// let tokens = credentials.issue_tokens(&user)?;
/// assert_eq!(credentials.verify_token(&tokens.access_token)?, user);
/// # Ok(())
/// # }
/// ```

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info, warn};
use validator::Validate;

use super::jwt::{JwtError, JwtSettings, TokenType};
use super::password::{hash_password_with, verify_password, HashParams, PasswordError};
use crate::models::not_blank;
use crate::models::user::{CreateUser, UserProfile};
use crate::store::{Store, StoreError};

/// Error type for credential operations
#[derive(Debug, thiserror::Error)]
pub enum CredentialError {
    /// A signup field is missing, empty or malformed
    #[error("Invalid registration input: {0}")]
    InvalidInput(#[from] validator::ValidationErrors),

    /// Username or email is already registered
    #[error("Username or email already registered")]
    DuplicateUser,

    /// Login failed; the cause is intentionally not reported
    #[error("Invalid username or password")]
    InvalidCredentials,

    /// Token is missing, malformed, expired or of the wrong type
    #[error("Invalid or expired token")]
    InvalidToken(#[source] JwtError),

    /// Token could not be signed
    #[error("Failed to issue token: {0}")]
    TokenIssue(#[source] JwtError),

    #[error(transparent)]
    Password(#[from] PasswordError),

    #[error(transparent)]
    Store(StoreError),
}

/// Signup fields as checked before anything is stored
#[derive(Debug, Validate)]
struct Registration<'a> {
    #[validate(
        custom(function = "not_blank"),
        length(max = 255, message = "must be at most 255 characters")
    )]
    username: &'a str,

    #[validate(
        custom(function = "not_blank"),
        email(message = "Invalid email format"),
        length(max = 255, message = "must be at most 255 characters")
    )]
    email: &'a str,

    #[validate(
        custom(function = "not_blank"),
        length(max = 1024, message = "must be at most 1024 characters")
    )]
    password: &'a str,
}

/// Access and refresh token issued together
#[derive(Debug, Clone, Serialize)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,

    /// Always "Bearer"
    pub token_type: &'static str,

    /// Seconds until the access token expires
    pub expires_in: i64,
}

pub struct CredentialStore {
    store: Arc<dyn Store>,
    jwt: JwtSettings,
    hash_params: HashParams,
}

impl CredentialStore {
    pub fn new(store: Arc<dyn Store>, jwt: JwtSettings) -> Self {
        Self {
            store,
            jwt,
            hash_params: HashParams::default(),
        }
    }

    /// Overrides the Argon2 cost used for new password hashes
    pub fn with_hash_params(mut self, hash_params: HashParams) -> Self {
        self.hash_params = hash_params;
        self
    }

    /// Creates a user account
    ///
    /// # Errors
    ///
    /// - `InvalidInput` when a field is empty or the email is malformed
    /// - `DuplicateUser` when the username or email is taken
    /// - `Store`/`Password` on infrastructure failures
    pub async fn register(
        &self,
        username: &str,
        email: &str,
        password: &str,
    ) -> Result<UserProfile, CredentialError> {
        Registration {
            username,
            email,
            password,
        }
        .validate()?;

        if self
            .store
            .find_user_by_username(username)
            .await
            .map_err(CredentialError::Store)?
            .is_some()
            || self
                .store
                .find_user_by_email(email)
                .await
                .map_err(CredentialError::Store)?
                .is_some()
        {
            debug!(username, "Signup rejected: username or email taken");
            return Err(CredentialError::DuplicateUser);
        }

        let password_hash = self.hash(password).await?;

        let user = self
            .store
            .create_user(CreateUser {
                username: username.to_string(),
                email: email.to_string(),
                password_hash,
            })
            .await
            .map_err(|e| match e {
                StoreError::UniqueViolation(_) => CredentialError::DuplicateUser,
                other => CredentialError::Store(other),
            })?;

        info!(user_id = %user.id, username = %user.username, "User registered");
        Ok(user.profile())
    }

    /// Checks a username and password
    ///
    /// # Errors
    ///
    /// Returns `InvalidCredentials` for every kind of login failure.
    pub async fn authenticate(
        &self,
        username: &str,
        password: &str,
    ) -> Result<UserProfile, CredentialError> {
        if username.is_empty() || password.is_empty() {
            return Err(CredentialError::InvalidCredentials);
        }

        let user = self
            .store
            .find_user_by_username(username)
            .await
            .map_err(CredentialError::Store)?;

        let Some(user) = user else {
            self.hash(password).await?;
            debug!("Login attempt for unknown username");
            return Err(CredentialError::InvalidCredentials);
        };

        if !self.verify(password, &user.password_hash).await? {
            warn!(user_id = %user.id, "Login failed: wrong password");
            return Err(CredentialError::InvalidCredentials);
        }

        info!(user_id = %user.id, "User logged in");
        Ok(user.profile())
    }

    /// Signs a fresh access and refresh token for a user
    pub fn issue_tokens(&self, profile: &UserProfile) -> Result<TokenPair, CredentialError> {
        let refresh = self.sign(profile, TokenType::Refresh)?;
        self.pair_with(profile, refresh)
    }

    /// Verifies an access token and returns the identity it carries
    ///
    /// # Errors
    ///
    /// Returns `InvalidToken` for bad signatures, foreign issuers, expired
    /// tokens and refresh tokens.
    pub fn verify_token(&self, token: &str) -> Result<UserProfile, CredentialError> {
        self.jwt
            .validate_access_token(token)
            .map(|claims| claims.profile())
            .map_err(CredentialError::InvalidToken)
    }

    /// Exchanges a refresh token for a new access token
    ///
    /// The identity is re-read from storage, so the new access token reflects
    /// the current username and email. The refresh token is handed back
    /// unchanged.
    pub async fn refresh(&self, refresh_token: &str) -> Result<TokenPair, CredentialError> {
        let claims = self
            .jwt
            .validate_refresh_token(refresh_token)
            .map_err(CredentialError::InvalidToken)?;

        let user = self
            .store
            .find_user(claims.sub)
            .await
            .map_err(CredentialError::Store)?
            .ok_or_else(|| {
                CredentialError::InvalidToken(JwtError::ValidationError(
                    "Token subject no longer exists".to_string(),
                ))
            })?;

        self.pair_with(&user.profile(), refresh_token.to_string())
    }

    fn pair_with(
        &self,
        profile: &UserProfile,
        refresh_token: String,
    ) -> Result<TokenPair, CredentialError> {
        Ok(TokenPair {
            access_token: self.sign(profile, TokenType::Access)?,
            refresh_token,
            token_type: "Bearer",
            expires_in: self.jwt.lifetime(TokenType::Access).num_seconds(),
        })
    }

    fn sign(&self, profile: &UserProfile, token_type: TokenType) -> Result<String, CredentialError> {
        let claims = self.jwt.claims_for(profile, token_type);
        self.jwt
            .create_token(&claims)
            .map_err(CredentialError::TokenIssue)
    }

    async fn hash(&self, password: &str) -> Result<String, PasswordError> {
        let password = password.to_string();
        let params = self.hash_params;

        tokio::task::spawn_blocking(move || hash_password_with(&password, params))
            .await
            .map_err(|e| PasswordError::HashError(format!("Hashing task failed: {}", e)))?
    }

    async fn verify(&self, password: &str, hash: &str) -> Result<bool, PasswordError> {
        let password = password.to_string();
        let hash = hash.to_string();

        tokio::task::spawn_blocking(move || verify_password(&password, &hash))
            .await
            .map_err(|e| PasswordError::VerifyError(format!("Verification task failed: {}", e)))?
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{MemoryStore, UserRepository};

    const SECRET: &str = "test-secret-key-that-is-at-least-32-bytes";

    fn credentials() -> (Arc<MemoryStore>, CredentialStore) {
        let store = Arc::new(MemoryStore::new());
        let credentials = CredentialStore::new(store.clone(), JwtSettings::new(SECRET).unwrap())
            .with_hash_params(HashParams {
                memory_kib: 8,
                iterations: 1,
                parallelism: 1,
            });
        (store, credentials)
    }

    #[tokio::test]
    async fn test_register_then_authenticate() {
        let (_, credentials) = credentials();

        let registered = credentials
            .register("alice", "alice@example.com", "s3cret")
            .await
            .unwrap();
        let authenticated = credentials.authenticate("alice", "s3cret").await.unwrap();
        assert_eq!(registered, authenticated);

        let tokens = credentials.issue_tokens(&authenticated).unwrap();
        let identity = credentials.verify_token(&tokens.access_token).unwrap();
        assert_eq!(identity, registered);
        assert_eq!(tokens.token_type, "Bearer");
        assert_eq!(tokens.expires_in, 3600);
    }

    #[tokio::test]
    async fn test_password_is_hashed() {
        let (store, credentials) = credentials();
        credentials
            .register("alice", "alice@example.com", "s3cret")
            .await
            .unwrap();

        let user = store.find_user_by_username("alice").await.unwrap().unwrap();
        assert_ne!(user.password_hash, "s3cret");
        assert!(user.password_hash.starts_with("$argon2id$"));
    }

    #[tokio::test]
    async fn test_duplicate_username_rejected() {
        let (store, credentials) = credentials();
        credentials
            .register("alice", "alice@example.com", "s3cret")
            .await
            .unwrap();

        let result = credentials
            .register("alice", "other@example.com", "s3cret")
            .await;
        assert!(matches!(result, Err(CredentialError::DuplicateUser)));

        let result = credentials
            .register("alice2", "alice@example.com", "s3cret")
            .await;
        assert!(matches!(result, Err(CredentialError::DuplicateUser)));

        assert_eq!(store.row_counts().await.0, 1);
    }

    #[tokio::test]
    async fn test_register_rejects_empty_fields() {
        let (store, credentials) = credentials();

        for (username, email, password) in [
            ("", "alice@example.com", "s3cret"),
            ("alice", "", "s3cret"),
            ("alice", "alice@example.com", ""),
            ("alice", "not-an-email", "s3cret"),
        ] {
            let result = credentials.register(username, email, password).await;
            assert!(
                matches!(result, Err(CredentialError::InvalidInput(_))),
                "expected InvalidInput for {:?}",
                (username, email, password)
            );
        }

        assert_eq!(store.row_counts().await.0, 0);
    }

    #[tokio::test]
    async fn test_login_failures_are_uniform() {
        let (_, credentials) = credentials();
        credentials
            .register("alice", "alice@example.com", "s3cret")
            .await
            .unwrap();

        let wrong_password = credentials.authenticate("alice", "nope").await.unwrap_err();
        let unknown_user = credentials.authenticate("mallory", "nope").await.unwrap_err();
        let empty = credentials.authenticate("", "").await.unwrap_err();

        assert!(matches!(wrong_password, CredentialError::InvalidCredentials));
        assert!(matches!(unknown_user, CredentialError::InvalidCredentials));
        assert!(matches!(empty, CredentialError::InvalidCredentials));
        assert_eq!(wrong_password.to_string(), unknown_user.to_string());
    }

    #[tokio::test]
    async fn test_refresh_issues_new_access_token() {
        let (_, credentials) = credentials();
        let user = credentials
            .register("alice", "alice@example.com", "s3cret")
            .await
            .unwrap();
        let tokens = credentials.issue_tokens(&user).unwrap();

        let refreshed = credentials.refresh(&tokens.refresh_token).await.unwrap();
        assert_eq!(refreshed.refresh_token, tokens.refresh_token);
        assert_eq!(credentials.verify_token(&refreshed.access_token).unwrap(), user);
    }

    #[tokio::test]
    async fn test_tokens_not_interchangeable() {
        let (_, credentials) = credentials();
        let user = credentials
            .register("alice", "alice@example.com", "s3cret")
            .await
            .unwrap();
        let tokens = credentials.issue_tokens(&user).unwrap();

        assert!(matches!(
            credentials.verify_token(&tokens.refresh_token),
            Err(CredentialError::InvalidToken(_))
        ));
        assert!(matches!(
            credentials.refresh(&tokens.access_token).await,
            Err(CredentialError::InvalidToken(_))
        ));
    }
}
