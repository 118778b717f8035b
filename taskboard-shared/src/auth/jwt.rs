/// JWT token generation and validation
///
/// Tokens are signed with HS256 and carry the user's public identity
/// (`sub`, `username`, `email`) so handlers never need a database round trip
/// to know who is calling.
///
/// # Security
///
/// - **Algorithm**: HS256 (HMAC with SHA-256)
/// - **Secret**: injected through [`JwtSettings::new`], which refuses secrets
///   shorter than 32 bytes. There is no built-in fallback secret.
/// - **Expiration**: access tokens 60 minutes, refresh tokens 30 days by default
/// - **Validation**: signature, issuer, `exp`, `nbf` and token type
///
/// # Example
///
/// ```
/// use taskboard_shared::auth::jwt::{JwtSettings, TokenType};
/// use taskboard_shared::models::user::UserProfile;
/// use uuid::Uuid;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let settings = JwtSettings::new("an-example-secret-that-is-32-bytes!")?;
/// let profile = UserProfile {
///     id: Uuid::new_v4(),
///     username: "alice".to_string(),
///     email: "alice@example.com".to_string(),
/// };
///
/// let claims = settings.claims_for(&profile, TokenType::Access);
/// let token = settings.create_token(&claims)?;
///
/// let validated = settings.validate_access_token(&token)?;
/// assert_eq!(validated.sub, profile.id);
/// assert_eq!(validated.username, "alice");
/// # Ok(())
/// # }
/// ```

use std::fmt;

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::user::UserProfile;

/// Issuer written into and required from every token
pub const DEFAULT_ISSUER: &str = "taskboard";

/// Shortest accepted signing secret, in bytes
pub const MIN_SECRET_LEN: usize = 32;

/// Error type for JWT operations
#[derive(Debug, thiserror::Error)]
pub enum JwtError {
    /// Signing secret is too short to be safe
    #[error("JWT secret must be at least 32 bytes, got {0}")]
    WeakSecret(usize),

    /// Failed to create token
    #[error("Failed to create token: {0}")]
    CreateError(String),

    /// Signature, format or claim check failed
    #[error("Failed to validate token: {0}")]
    ValidationError(String),

    /// Token has expired
    #[error("Token has expired")]
    Expired,

    /// Token was issued by someone else
    #[error("Invalid issuer: expected {expected}")]
    InvalidIssuer { expected: String },

    /// An access token was presented where a refresh token is required, or the reverse
    #[error("Expected {expected} token, got {actual} token")]
    WrongTokenType {
        expected: TokenType,
        actual: TokenType,
    },
}

/// Token type identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenType {
    /// Short-lived token sent with every API request
    Access,

    /// Long-lived token only accepted by the refresh endpoint
    Refresh,
}

impl TokenType {
    /// Default lifetime for this token type
    pub fn default_lifetime(&self) -> Duration {
        match self {
            TokenType::Access => Duration::minutes(60),
            TokenType::Refresh => Duration::days(30),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TokenType::Access => "access",
            TokenType::Refresh => "refresh",
        }
    }
}

impl fmt::Display for TokenType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// JWT claims
///
/// # Standard Claims
///
/// - `sub`: user ID
/// - `iss`: issuer
/// - `iat`, `nbf`, `exp`: Unix timestamps
///
/// # Custom Claims
///
/// - `username`, `email`: the caller's public identity
/// - `token_type`: access or refresh
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject - user ID
    pub sub: Uuid,

    pub username: String,
    pub email: String,

    pub iss: String,
    pub iat: i64,
    pub exp: i64,
    pub nbf: i64,

    pub token_type: TokenType,
}

impl Claims {
    /// Creates claims for a user, valid from now for `lifetime`
    pub fn new(
        profile: &UserProfile,
        token_type: TokenType,
        issuer: &str,
        lifetime: Duration,
    ) -> Self {
        let now = Utc::now();
        let expiration = now + lifetime;

        Self {
            sub: profile.id,
            username: profile.username.clone(),
            email: profile.email.clone(),
            iss: issuer.to_string(),
            iat: now.timestamp(),
            exp: expiration.timestamp(),
            nbf: now.timestamp(),
            token_type,
        }
    }

    /// The identity these claims describe
    pub fn profile(&self) -> UserProfile {
        UserProfile {
            id: self.sub,
            username: self.username.clone(),
            email: self.email.clone(),
        }
    }
}

/// Signing configuration, built once at startup and shared read-only
#[derive(Clone)]
pub struct JwtSettings {
    secret: String,
    issuer: String,
    access_lifetime: Duration,
    refresh_lifetime: Duration,
}

impl fmt::Debug for JwtSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JwtSettings")
            .field("secret", &"[redacted]")
            .field("issuer", &self.issuer)
            .field("access_lifetime", &self.access_lifetime)
            .field("refresh_lifetime", &self.refresh_lifetime)
            .finish()
    }
}

impl JwtSettings {
    /// Creates settings with the default issuer and lifetimes
    ///
    /// # Errors
    ///
    /// Returns `JwtError::WeakSecret` if the secret is shorter than
    /// [`MIN_SECRET_LEN`] bytes.
    pub fn new(secret: impl Into<String>) -> Result<Self, JwtError> {
        let secret = secret.into();
        if secret.len() < MIN_SECRET_LEN {
            return Err(JwtError::WeakSecret(secret.len()));
        }

        Ok(Self {
            secret,
            issuer: DEFAULT_ISSUER.to_string(),
            access_lifetime: TokenType::Access.default_lifetime(),
            refresh_lifetime: TokenType::Refresh.default_lifetime(),
        })
    }

    pub fn with_issuer(mut self, issuer: impl Into<String>) -> Self {
        self.issuer = issuer.into();
        self
    }

    pub fn with_lifetimes(mut self, access: Duration, refresh: Duration) -> Self {
        self.access_lifetime = access;
        self.refresh_lifetime = refresh;
        self
    }

    pub fn issuer(&self) -> &str {
        &self.issuer
    }

    /// Configured lifetime for a token type
    pub fn lifetime(&self, token_type: TokenType) -> Duration {
        match token_type {
            TokenType::Access => self.access_lifetime,
            TokenType::Refresh => self.refresh_lifetime,
        }
    }

    /// Builds claims for a user with the configured issuer and lifetime
    pub fn claims_for(&self, profile: &UserProfile, token_type: TokenType) -> Claims {
        Claims::new(profile, token_type, &self.issuer, self.lifetime(token_type))
    }

    /// Signs claims into a compact JWT
    ///
    /// # Errors
    ///
    /// Returns `JwtError::CreateError` if encoding fails
    pub fn create_token(&self, claims: &Claims) -> Result<String, JwtError> {
        let header = Header::new(Algorithm::HS256);
        let key = EncodingKey::from_secret(self.secret.as_bytes());

        encode(&header, claims, &key)
            .map_err(|e| JwtError::CreateError(format!("Token encoding failed: {}", e)))
    }

    /// Validates signature, issuer, expiry and not-before, then returns the claims
    ///
    /// The token type is not checked here; see [`Self::validate_access_token`]
    /// and [`Self::validate_refresh_token`].
    pub fn validate_token(&self, token: &str) -> Result<Claims, JwtError> {
        let key = DecodingKey::from_secret(self.secret.as_bytes());

        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[self.issuer.as_str()]);
        validation.validate_exp = true;
        validation.validate_nbf = true;

        let token_data = decode::<Claims>(token, &key, &validation).map_err(|e| match e.kind() {
            jsonwebtoken::errors::ErrorKind::ExpiredSignature => JwtError::Expired,
            jsonwebtoken::errors::ErrorKind::InvalidIssuer => JwtError::InvalidIssuer {
                expected: self.issuer.clone(),
            },
            _ => JwtError::ValidationError(format!("Token validation failed: {}", e)),
        })?;

        Ok(token_data.claims)
    }

    /// Validates a token and requires it to be an access token
    pub fn validate_access_token(&self, token: &str) -> Result<Claims, JwtError> {
        self.validate_typed(token, TokenType::Access)
    }

    /// Validates a token and requires it to be a refresh token
    pub fn validate_refresh_token(&self, token: &str) -> Result<Claims, JwtError> {
        self.validate_typed(token, TokenType::Refresh)
    }

    fn validate_typed(&self, token: &str, expected: TokenType) -> Result<Claims, JwtError> {
        let claims = self.validate_token(token)?;

        if claims.token_type != expected {
            return Err(JwtError::WrongTokenType {
                expected,
                actual: claims.token_type,
            });
        }

        Ok(claims)
    }
}
