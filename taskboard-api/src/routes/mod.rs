/// API route handlers
///
/// This module contains all route handlers organized by resource:
///
/// - `health`: Health check endpoint
/// - `auth`: Signup, login, token refresh and the protected probe
/// - `workspaces`, `containers`, `tasks`, `comments`: the resource hierarchy
///
/// Every resource handler runs in the same order: body validation (in the
/// extractor), ownership check, repository call, response.

use serde::Serialize;

pub mod auth;
pub mod comments;
pub mod containers;
pub mod health;
pub mod tasks;
pub mod workspaces;

/// Body of update and delete responses
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: &str) -> Self {
        Self {
            message: message.to_string(),
        }
    }
}
