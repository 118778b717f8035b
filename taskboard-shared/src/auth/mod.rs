/// Authentication and authorization
///
/// # Modules
///
/// - [`password`]: Argon2id password hashing and verification
/// - [`jwt`]: signed access and refresh tokens
/// - [`credentials`]: signup, login and token exchange over a [`Store`](crate::store::Store)
/// - [`middleware`]: Axum layer that turns a Bearer token into an `AuthContext`
/// - [`authorization`]: ownership checks along workspace → container → task → comment
///
/// # Security Features
///
/// - **Password Hashing**: Argon2id with 64 MB memory, 3 iterations
/// - **JWT Tokens**: HS256, secret of at least 32 bytes, no built-in default
/// - **Uniform Failures**: login and parent checks never reveal which part failed

pub mod authorization;
pub mod credentials;
pub mod jwt;
pub mod middleware;
pub mod password;
