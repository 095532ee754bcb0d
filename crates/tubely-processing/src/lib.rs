//! Tubely Processing Library
//!
//! The pure and local-I/O stages of the upload pipeline: media type
//! validation, staging of the request body to disk, and orientation
//! classification of staged videos.

pub mod staging;
pub mod validator;
pub mod video;

pub use staging::{StagedFile, StagingError, StagingWriter};
pub use validator::{validate_media_type, ValidatedMedia, ValidationError};
pub use video::{FfprobeService, MediaProbe, OrientationClassifier, ProbeError, ProbeOutput};
