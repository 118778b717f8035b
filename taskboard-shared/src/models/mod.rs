/// Database models for Taskboard
///
/// One module per table. Each model owns its SQL; the repository traits in
/// [`crate::store`] sit on top of these.
///
/// # Models
///
/// - `user`: accounts and public profiles
/// - `workspace`: top-level containers owned by a user
/// - `container`: list containers inside a workspace
/// - `task`: tasks inside a list container
/// - `comment`: comments on a task
///
/// # Example
///
/// ```no_run
/// use taskboard_shared::models::workspace::{Workspace, CreateWorkspace};
/// use taskboard_shared::db::pool::{create_pool, DatabaseConfig};
/// use uuid::Uuid;
///
/// # async fn example(owner: Uuid) -> Result<(), Box<dyn std::error::Error>> {
/// let pool = create_pool(DatabaseConfig::new(std::env::var("DATABASE_URL")?)).await?;
///
/// let workspace = Workspace::create(&pool, CreateWorkspace {
///     user_id: owner,
///     name: "Home".to_string(),
/// }).await?;
/// # Ok(())
/// # }
/// ```

use std::borrow::Cow;

use validator::ValidationError;

pub mod comment;
pub mod container;
pub mod task;
pub mod user;
pub mod workspace;

/// Rejects empty and whitespace-only values
pub fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut error = ValidationError::new("blank");
        error.message = Some(Cow::Borrowed("must not be empty"));
        return Err(error);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_blank() {
        assert!(not_blank("Home").is_ok());
        assert!(not_blank("").is_err());
        assert!(not_blank("  \n").is_err());
    }
}
