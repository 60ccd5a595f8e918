//! Toolshed - Tool Lending Management System
//!
//! REST JSON API for a shared tool workshop: users request tools,
//! administrators approve or reject, loans are tracked and returns are
//! reviewed before a tool goes back on the shelf.

use std::sync::Arc;

pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod repository;
pub mod services;

pub use config::AppConfig;
pub use error::{AppError, AppResult};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub services: Arc<services::Services>,
}
