//! DCIM server
//!
//! Datacenter asset inventory and maintenance tracking, exposed as a REST
//! JSON API: assets and their specifications, assignments, an audit log of
//! every change, maintenance scheduling and fleet health summaries.

use std::sync::Arc;

pub mod api;
pub mod config;
pub mod context;
pub mod error;
pub mod models;
pub mod repository;
pub mod services;

pub use config::AppConfig;
pub use context::RequestContext;
pub use error::{AppError, AppResult};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub services: Arc<services::Services>,
}
