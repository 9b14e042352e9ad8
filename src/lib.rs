//! Biblios Library Catalog Server
//!
//! A REST JSON API server for a small library catalog: authors, books,
//! genres, languages, and physical book copies that can be borrowed,
//! returned, and renewed.

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
