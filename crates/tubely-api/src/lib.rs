//! Tubely API Library
//!
//! This crate provides the HTTP handlers, auth, the upload orchestrator and
//! application setup for the upload service.

pub mod auth;
pub mod constants;
pub mod error;
mod handlers;
pub mod middleware;
pub mod services;
pub mod setup;
pub mod state;
pub mod telemetry;

// Re-exports
pub use error::{ErrorResponse, HttpAppError};
pub use services::upload::{StorageRouter, UploadLimits, UploadService, UploadStage};
pub use state::AppState;
