//! Upload ingestion pipeline
//!
//! validate → stage → classify (video) → key → commit → record update

mod service;
mod types;

pub use service::UploadService;
pub use types::{StorageRouter, UploadLimits, UploadStage};
