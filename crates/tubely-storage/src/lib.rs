//! Tubely Storage Library
//!
//! Storage abstraction for committed uploads, with implementations for S3
//! (via `object_store`) and the local filesystem.
//!
//! # Storage key format
//!
//! `[{orientation}/]{token}.{ext}` where `token` is 32 random bytes encoded as
//! unpadded base64url. Keys must not contain `..` or a leading `/`. Key
//! generation is centralized in the `keys` module so all backends agree.

pub mod factory;
pub mod keys;
#[cfg(feature = "storage-local")]
pub mod local;
#[cfg(feature = "storage-s3")]
pub mod s3;
pub mod traits;

// Re-export commonly used types
pub use factory::create_storage;
pub use keys::StorageKey;
#[cfg(feature = "storage-local")]
pub use local::LocalStorage;
#[cfg(feature = "storage-s3")]
pub use s3::S3Storage;
pub use traits::{Storage, StorageError, StorageResult};
pub use tubely_core::StorageBackend;
