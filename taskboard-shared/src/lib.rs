//! # Taskboard Shared Library
//!
//! Domain types, storage and authentication used by the Taskboard API server.
//!
//! ## Module Organization
//!
//! - `models`: Database models and input types
//! - `store`: Repository traits with Postgres and in-memory backends
//! - `auth`: Credentials, tokens, middleware and ownership checks
//! - `db`: Connection pool and embedded migrations

pub mod auth;
pub mod db;
pub mod models;
pub mod store;

/// Current version of the Taskboard shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
