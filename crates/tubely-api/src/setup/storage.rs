//! Storage setup and initialization

use crate::services::upload::StorageRouter;
use anyhow::{Context, Result};
use tubely_core::{Config, UploadKind};
use tubely_storage::create_storage;

/// Create the backend for each upload kind. Kinds that share a backend share
/// one instance.
pub async fn setup_storage(config: &Config) -> Result<StorageRouter> {
    let thumbnail_backend = config.storage_backend_for(UploadKind::Thumbnail);
    let video_backend = config.storage_backend_for(UploadKind::Video);

    let thumbnails = create_storage(config, thumbnail_backend)
        .await
        .with_context(|| format!("Failed to initialize {} storage for thumbnails", thumbnail_backend))?;

    let videos = if video_backend == thumbnail_backend {
        thumbnails.clone()
    } else {
        create_storage(config, video_backend)
            .await
            .with_context(|| format!("Failed to initialize {} storage for videos", video_backend))?
    };

    tracing::info!(
        thumbnail_backend = %thumbnail_backend,
        video_backend = %video_backend,
        "Storage initialized"
    );

    Ok(StorageRouter::new(thumbnails, videos))
}
