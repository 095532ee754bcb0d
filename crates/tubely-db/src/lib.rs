//! Database repositories for the data access layer
//!
//! The upload pipeline only reads and updates video records, through the
//! `VideoStore` trait so the orchestrator can be exercised without Postgres.

pub mod video;

pub use video::{VideoRepository, VideoStore};
