//! LabTrack laboratory asset management server
//!
//! REST JSON API for school computer laboratories: inventory of assets,
//! workstations with a live health status, quarterly preventive maintenance
//! reports, daily activity reports and a public request/approval workflow.

use std::sync::Arc;

#[macro_use]
mod macros;

pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod repository;
pub mod rules;
pub mod services;

pub use config::AppConfig;
pub use error::{AppError, AppResult};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub services: Arc<services::Services>,
}
