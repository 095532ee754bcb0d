//! Upload orchestrator
//!
//! Drives one upload through the pipeline and reconciles the video record.
//! The record is only touched after the file is durably committed; every
//! earlier failure leaves it unchanged. The staged file is owned by this
//! function and removed on every exit path.

use std::sync::Arc;

use bytes::Bytes;
use futures::Stream;
use tubely_core::{AppError, UploadKind, Video};
use tubely_db::VideoStore;
use tubely_processing::{validate_media_type, OrientationClassifier, StagingWriter};
use tubely_storage::StorageKey;
use uuid::Uuid;

use super::types::{StorageRouter, UploadLimits, UploadStage};
use crate::error::{media_type_error, probe_error, staging_error, storage_commit_error};

#[derive(Clone)]
pub struct UploadService {
    videos: Arc<dyn VideoStore>,
    storage: StorageRouter,
    staging: StagingWriter,
    classifier: OrientationClassifier,
    limits: UploadLimits,
}

/// Stage bookkeeping for a single request.
struct UploadRun {
    video_id: Uuid,
    kind: UploadKind,
    stage: UploadStage,
}

impl UploadRun {
    fn new(video_id: Uuid, kind: UploadKind) -> Self {
        tracing::debug!(video_id = %video_id, kind = %kind, "Upload received");
        Self {
            video_id,
            kind,
            stage: UploadStage::Received,
        }
    }

    fn advance(&mut self, next: UploadStage) {
        tracing::debug!(
            video_id = %self.video_id,
            kind = %self.kind,
            from = %self.stage,
            to = %next,
            "Upload stage transition"
        );
        self.stage = next;
    }

    fn abort(&mut self, error: AppError) -> AppError {
        if let Some(aborted) = self.stage.abort() {
            tracing::info!(
                video_id = %self.video_id,
                kind = %self.kind,
                stage = %self.stage,
                error = %error,
                "Upload aborted"
            );
            self.stage = aborted;
        }
        error
    }
}

impl UploadService {
    pub fn new(
        videos: Arc<dyn VideoStore>,
        storage: StorageRouter,
        staging: StagingWriter,
        classifier: OrientationClassifier,
        limits: UploadLimits,
    ) -> Self {
        Self {
            videos,
            storage,
            staging,
            classifier,
            limits,
        }
    }

    pub fn limits(&self) -> UploadLimits {
        self.limits
    }

    pub fn storage(&self) -> &StorageRouter {
        &self.storage
    }

    /// Fetch the target record and check that `user_id` owns it.
    ///
    /// Runs before the body is read so unauthorized callers cause no file I/O.
    pub async fn authorize(&self, video_id: Uuid, user_id: Uuid) -> Result<Video, AppError> {
        let video = self
            .videos
            .get_video(video_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Couldn't find video".to_string()))?;

        if !video.is_owned_by(user_id) {
            tracing::debug!(
                video_id = %video_id,
                user_id = %user_id,
                "Upload rejected: caller does not own video"
            );
            return Err(AppError::Unauthorized(
                "Not authorized to update this video".to_string(),
            ));
        }

        Ok(video)
    }

    /// Run the pipeline for an authorized `video` and return the updated record.
    pub async fn ingest<S, E>(
        &self,
        kind: UploadKind,
        mut video: Video,
        declared_content_type: Option<&str>,
        body: S,
    ) -> Result<Video, AppError>
    where
        S: Stream<Item = Result<Bytes, E>> + Send,
        E: std::error::Error + Send + Sync + 'static,
    {
        let mut run = UploadRun::new(video.id, kind);

        let media = validate_media_type(kind, declared_content_type)
            .map_err(|e| run.abort(media_type_error(e)))?;
        run.advance(UploadStage::Validated);

        let staged = self
            .staging
            .stage(body, self.limits.for_kind(kind), media.extension)
            .await
            .map_err(|e| run.abort(staging_error(e)))?;
        run.advance(UploadStage::Staged);

        let prefix = if kind.requires_classification() {
            let orientation = self
                .classifier
                .classify(staged.path())
                .await
                .map_err(|e| run.abort(probe_error(e)))?;
            run.advance(UploadStage::Classified);
            Some(orientation.as_prefix())
        } else {
            None
        };

        let key = StorageKey::generate(prefix, media.extension);
        run.advance(UploadStage::KeyAssigned);

        let url = self
            .storage
            .for_kind(kind)
            .put_file(key.as_str(), staged.path(), media.content_type)
            .await
            .map_err(|e| run.abort(storage_commit_error(e)))?;
        run.advance(UploadStage::Committed);

        tracing::info!(
            video_id = %video.id,
            kind = %kind,
            key = %key,
            size_bytes = staged.len(),
            content_type = media.content_type,
            "Upload committed"
        );

        if let Err(e) = staged.remove() {
            tracing::warn!(error = %e, "Failed to remove staged file");
        }

        video.set_media_url(kind, url);
        if let Err(e) = self.videos.update_video(&video).await {
            // The committed object stays behind; its key is needed to reclaim it.
            tracing::warn!(
                video_id = %video.id,
                key = %key,
                error = %e,
                "Record update failed after commit; stored object is orphaned"
            );
            return Err(run.abort(AppError::RecordUpdate {
                message: "Couldn't update video".to_string(),
                source: anyhow::Error::new(e),
            }));
        }
        run.advance(UploadStage::RecordUpdated);
        run.advance(UploadStage::Responded);

        Ok(video)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::Utc;
    use futures::stream;
    use std::collections::HashMap;
    use std::io;
    use std::path::{Path, PathBuf};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use tubely_core::ErrorMetadata;
    use tubely_processing::{MediaProbe, ProbeError, ProbeOutput};
    use tubely_storage::{Storage, StorageBackend, StorageError, StorageResult};

    #[derive(Default)]
    struct MemoryVideos {
        videos: Mutex<HashMap<Uuid, Video>>,
        updates: AtomicUsize,
        fail_updates: bool,
    }

    #[async_trait]
    impl VideoStore for MemoryVideos {
        async fn get_video(&self, id: Uuid) -> Result<Option<Video>, AppError> {
            Ok(self.videos.lock().unwrap().get(&id).cloned())
        }

        async fn update_video(&self, video: &Video) -> Result<(), AppError> {
            self.updates.fetch_add(1, Ordering::SeqCst);
            if self.fail_updates {
                return Err(AppError::Internal("connection reset".to_string()));
            }
            self.videos.lock().unwrap().insert(video.id, video.clone());
            Ok(())
        }
    }

    #[derive(Default)]
    struct RecordingStorage {
        keys: Mutex<Vec<String>>,
        fail: bool,
    }

    #[async_trait]
    impl Storage for RecordingStorage {
        async fn put_file(
            &self,
            storage_key: &str,
            source: &Path,
            _content_type: &str,
        ) -> StorageResult<String> {
            assert!(source.exists(), "staged file must exist during commit");
            if self.fail {
                return Err(StorageError::UploadFailed("bucket unreachable".to_string()));
            }
            self.keys.lock().unwrap().push(storage_key.to_string());
            Ok(self.public_url(storage_key))
        }

        fn public_url(&self, storage_key: &str) -> String {
            format!("http://media.test/{}", storage_key)
        }

        fn backend_type(&self) -> StorageBackend {
            StorageBackend::Local
        }
    }

    struct FixedProbe(Result<&'static str, ()>);

    #[async_trait]
    impl MediaProbe for FixedProbe {
        async fn probe(&self, _path: &Path) -> Result<ProbeOutput, ProbeError> {
            match self.0 {
                Ok(ratio) => Ok(ProbeOutput::parse(
                    format!(r#"{{"streams":[{{"display_aspect_ratio":"{}"}}]}}"#, ratio)
                        .as_bytes(),
                )),
                Err(()) => Err(ProbeError::Failed {
                    program: "ffprobe".to_string(),
                    status: "exit status: 1".to_string(),
                    stderr: "moov atom not found".to_string(),
                }),
            }
        }
    }

    struct Harness {
        service: UploadService,
        videos: Arc<MemoryVideos>,
        storage: Arc<RecordingStorage>,
        staging_dir: tempfile::TempDir,
        video: Video,
    }

    impl Harness {
        fn staged_files(&self) -> Vec<PathBuf> {
            std::fs::read_dir(self.staging_dir.path())
                .unwrap()
                .map(|e| e.unwrap().path())
                .collect()
        }

        fn stored(&self) -> Video {
            self.videos
                .videos
                .lock()
                .unwrap()
                .get(&self.video.id)
                .cloned()
                .unwrap()
        }
    }

    fn harness(probe: FixedProbe, fail_storage: bool, fail_updates: bool) -> Harness {
        let now = Utc::now();
        let video = Video {
            id: Uuid::new_v4(),
            created_at: now,
            updated_at: now,
            title: "boots".to_string(),
            description: "bear footage".to_string(),
            user_id: Uuid::new_v4(),
            thumbnail_url: None,
            video_url: None,
        };
        let videos = Arc::new(MemoryVideos {
            fail_updates,
            ..Default::default()
        });
        videos
            .videos
            .lock()
            .unwrap()
            .insert(video.id, video.clone());
        let storage = Arc::new(RecordingStorage {
            fail: fail_storage,
            ..Default::default()
        });
        let staging_dir = tempfile::tempdir().unwrap();

        let service = UploadService::new(
            videos.clone(),
            StorageRouter::single(storage.clone()),
            StagingWriter::new(staging_dir.path()),
            OrientationClassifier::new(Arc::new(probe)),
            UploadLimits {
                thumbnail_bytes: 64,
                video_bytes: 64,
            },
        );

        Harness {
            service,
            videos,
            storage,
            staging_dir,
            video,
        }
    }

    fn body(data: &'static [u8]) -> impl Stream<Item = Result<Bytes, io::Error>> + Send {
        stream::iter(vec![Ok(Bytes::from_static(data))])
    }

    #[tokio::test]
    async fn test_thumbnail_upload_sets_url_without_prefix() {
        let h = harness(FixedProbe(Ok("16:9")), false, false);

        let updated = h
            .service
            .ingest(
                UploadKind::Thumbnail,
                h.video.clone(),
                Some("image/png"),
                body(b"png"),
            )
            .await
            .unwrap();

        let url = updated.thumbnail_url.clone().unwrap();
        let key = url.strip_prefix("http://media.test/").unwrap();
        assert!(!key.contains('/'));
        assert!(key.ends_with(".png"));
        assert!(updated.video_url.is_none());
        assert_eq!(h.stored(), updated);
        assert!(h.staged_files().is_empty());
    }

    #[tokio::test]
    async fn test_portrait_video_gets_portrait_prefix() {
        let h = harness(FixedProbe(Ok("9:16")), false, false);

        let updated = h
            .service
            .ingest(
                UploadKind::Video,
                h.video.clone(),
                Some("video/mp4"),
                body(b"mp4"),
            )
            .await
            .unwrap();

        let keys = h.storage.keys.lock().unwrap().clone();
        assert_eq!(keys.len(), 1);
        assert!(keys[0].starts_with("portrait/"));
        assert!(keys[0].ends_with(".mp4"));
        assert_eq!(
            updated.video_url.as_deref(),
            Some(format!("http://media.test/{}", keys[0]).as_str())
        );
        assert!(h.staged_files().is_empty());
    }

    #[tokio::test]
    async fn test_unsupported_type_touches_nothing() {
        let h = harness(FixedProbe(Ok("16:9")), false, false);

        let err = h
            .service
            .ingest(
                UploadKind::Thumbnail,
                h.video.clone(),
                Some("application/pdf"),
                body(b"%PDF"),
            )
            .await
            .unwrap_err();

        assert_eq!(err.http_status_code(), 400);
        assert!(h.staged_files().is_empty());
        assert!(h.storage.keys.lock().unwrap().is_empty());
        assert_eq!(h.videos.updates.load(Ordering::SeqCst), 0);
        assert_eq!(h.stored(), h.video);
    }

    #[tokio::test]
    async fn test_oversized_body_is_413_and_not_committed() {
        let h = harness(FixedProbe(Ok("16:9")), false, false);
        let big: &'static [u8] = &[0u8; 65];

        let err = h
            .service
            .ingest(UploadKind::Video, h.video.clone(), Some("video/mp4"), body(big))
            .await
            .unwrap_err();

        assert_eq!(err.http_status_code(), 413);
        assert!(h.staged_files().is_empty());
        assert!(h.storage.keys.lock().unwrap().is_empty());
        assert_eq!(h.videos.updates.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_probe_failure_aborts_before_commit() {
        let h = harness(FixedProbe(Err(())), false, false);

        let err = h
            .service
            .ingest(
                UploadKind::Video,
                h.video.clone(),
                Some("video/mp4"),
                body(b"mp4"),
            )
            .await
            .unwrap_err();

        assert_eq!(err.error_code(), "PROBE_ERROR");
        assert!(h.staged_files().is_empty());
        assert!(h.storage.keys.lock().unwrap().is_empty());
        assert_eq!(h.videos.updates.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_commit_failure_leaves_record_untouched() {
        let h = harness(FixedProbe(Ok("16:9")), true, false);

        let err = h
            .service
            .ingest(
                UploadKind::Video,
                h.video.clone(),
                Some("video/mp4"),
                body(b"mp4"),
            )
            .await
            .unwrap_err();

        assert_eq!(err.error_code(), "STORAGE_COMMIT_ERROR");
        assert_eq!(h.videos.updates.load(Ordering::SeqCst), 0);
        assert_eq!(h.stored(), h.video);
        assert!(h.staged_files().is_empty());
    }

    #[tokio::test]
    async fn test_record_update_failure_after_commit() {
        let h = harness(FixedProbe(Ok("16:9")), false, true);

        let err = h
            .service
            .ingest(
                UploadKind::Video,
                h.video.clone(),
                Some("video/mp4"),
                body(b"mp4"),
            )
            .await
            .unwrap_err();

        assert_eq!(err.error_code(), "RECORD_UPDATE_ERROR");
        assert_eq!(err.http_status_code(), 500);
        let keys = h.storage.keys.lock().unwrap().clone();
        assert_eq!(keys.len(), 1);
        assert!(keys[0].starts_with("landscape/"));
        assert!(h.staged_files().is_empty());
    }

    #[tokio::test]
    async fn test_authorize_checks_existence_then_owner() {
        let h = harness(FixedProbe(Ok("16:9")), false, false);

        let missing = h
            .service
            .authorize(Uuid::new_v4(), h.video.user_id)
            .await
            .unwrap_err();
        assert_eq!(missing.http_status_code(), 404);

        let stranger = h
            .service
            .authorize(h.video.id, Uuid::new_v4())
            .await
            .unwrap_err();
        assert_eq!(stranger.error_code(), "UNAUTHORIZED");
        assert_eq!(stranger.http_status_code(), 401);

        let owned = h
            .service
            .authorize(h.video.id, h.video.user_id)
            .await
            .unwrap();
        assert_eq!(owned, h.video);
    }

    #[tokio::test]
    async fn test_upload_keys_are_not_reused() {
        let h = harness(FixedProbe(Ok("4:3")), false, false);

        for _ in 0..3 {
            h.service
                .ingest(
                    UploadKind::Video,
                    h.video.clone(),
                    Some("video/mp4"),
                    body(b"mp4"),
                )
                .await
                .unwrap();
        }

        let mut keys = h.storage.keys.lock().unwrap().clone();
        assert!(keys.iter().all(|k| k.starts_with("other/")));
        keys.sort();
        keys.dedup();
        assert_eq!(keys.len(), 3);
    }
}
