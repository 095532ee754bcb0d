//! Service and repository wiring

use crate::auth::JwtService;
use crate::services::upload::{StorageRouter, UploadLimits, UploadService};
use crate::state::AppState;
use anyhow::{Context, Result};
use sqlx::PgPool;
use std::sync::Arc;
use std::time::Duration;
use tubely_core::Config;
use tubely_db::{VideoRepository, VideoStore};
use tubely_processing::{FfprobeService, OrientationClassifier, StagingWriter};

pub async fn initialize_services(
    config: &Config,
    pool: PgPool,
    storage: StorageRouter,
) -> Result<Arc<AppState>> {
    let videos: Arc<dyn VideoStore> = Arc::new(VideoRepository::new(pool.clone()));

    let staging = match config.staging_dir() {
        Some(dir) => {
            tokio::fs::create_dir_all(dir)
                .await
                .with_context(|| format!("Failed to create staging directory {}", dir))?;
            StagingWriter::new(dir)
        }
        None => StagingWriter::in_temp_dir(),
    };

    let probe = FfprobeService::new(
        config.ffprobe_path(),
        Duration::from_secs(config.probe_timeout_seconds()),
    );

    tracing::info!(
        staging_dir = %staging.dir().display(),
        ffprobe_path = %config.ffprobe_path(),
        probe_timeout_seconds = config.probe_timeout_seconds(),
        "Upload pipeline initialized"
    );

    let upload = UploadService::new(
        videos,
        storage,
        staging,
        OrientationClassifier::new(Arc::new(probe)),
        UploadLimits::from_config(config),
    );

    Ok(Arc::new(AppState {
        config: config.clone(),
        jwt: JwtService::new(config.jwt_secret()),
        upload,
        pool: Some(pool),
    }))
}
