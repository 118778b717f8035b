//! # Taskboard API Server Library
//!
//! HTTP gateway for Taskboard: workspaces, list containers, tasks and
//! comments, each reachable only by the user who owns the workspace.
//!
//! ## Modules
//!
//! - `app`: Application state and router builder
//! - `config`: Configuration management
//! - `error`: Error handling and HTTP response mapping
//! - `extract`: Validating JSON and path extractors
//! - `middleware`: Security headers
//! - `routes`: API route handlers

pub mod app;
pub mod config;
pub mod error;
pub mod extract;
pub mod middleware;
pub mod routes;
