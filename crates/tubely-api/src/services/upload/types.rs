use std::fmt::{Display, Formatter, Result as FmtResult};
use std::sync::Arc;
use tubely_core::{Config, UploadKind};
use tubely_storage::Storage;

/// Progress of a single upload through the pipeline.
///
/// Stages only move forward. `Aborted` is reachable from every non-terminal
/// stage and records where the failure happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadStage {
    Received,
    Validated,
    Staged,
    Classified,
    KeyAssigned,
    Committed,
    RecordUpdated,
    Responded,
    Aborted { at: AbortableStage },
}

/// Stages an upload can be aborted from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AbortableStage {
    Received,
    Validated,
    Staged,
    Classified,
    KeyAssigned,
    Committed,
    RecordUpdated,
}

impl UploadStage {
    pub fn is_terminal(&self) -> bool {
        matches!(self, UploadStage::Responded | UploadStage::Aborted { .. })
    }

    /// The aborted state reached from `self`. Terminal stages have none.
    pub fn abort(&self) -> Option<UploadStage> {
        let at = match self {
            UploadStage::Received => AbortableStage::Received,
            UploadStage::Validated => AbortableStage::Validated,
            UploadStage::Staged => AbortableStage::Staged,
            UploadStage::Classified => AbortableStage::Classified,
            UploadStage::KeyAssigned => AbortableStage::KeyAssigned,
            UploadStage::Committed => AbortableStage::Committed,
            UploadStage::RecordUpdated => AbortableStage::RecordUpdated,
            UploadStage::Responded | UploadStage::Aborted { .. } => return None,
        };
        Some(UploadStage::Aborted { at })
    }
}

impl Display for AbortableStage {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        let name = match self {
            AbortableStage::Received => "received",
            AbortableStage::Validated => "validated",
            AbortableStage::Staged => "staged",
            AbortableStage::Classified => "classified",
            AbortableStage::KeyAssigned => "key_assigned",
            AbortableStage::Committed => "committed",
            AbortableStage::RecordUpdated => "record_updated",
        };
        f.write_str(name)
    }
}

impl Display for UploadStage {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            UploadStage::Received => write!(f, "received"),
            UploadStage::Validated => write!(f, "validated"),
            UploadStage::Staged => write!(f, "staged"),
            UploadStage::Classified => write!(f, "classified"),
            UploadStage::KeyAssigned => write!(f, "key_assigned"),
            UploadStage::Committed => write!(f, "committed"),
            UploadStage::RecordUpdated => write!(f, "record_updated"),
            UploadStage::Responded => write!(f, "responded"),
            UploadStage::Aborted { at } => write!(f, "aborted({})", at),
        }
    }
}

/// Per-kind byte limits applied while staging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UploadLimits {
    pub thumbnail_bytes: u64,
    pub video_bytes: u64,
}

impl UploadLimits {
    pub fn from_config(config: &Config) -> Self {
        Self {
            thumbnail_bytes: config.max_upload_size_bytes(UploadKind::Thumbnail) as u64,
            video_bytes: config.max_upload_size_bytes(UploadKind::Video) as u64,
        }
    }

    pub fn for_kind(&self, kind: UploadKind) -> u64 {
        match kind {
            UploadKind::Thumbnail => self.thumbnail_bytes,
            UploadKind::Video => self.video_bytes,
        }
    }
}

/// Storage backend selected for each upload kind.
#[derive(Clone)]
pub struct StorageRouter {
    thumbnails: Arc<dyn Storage>,
    videos: Arc<dyn Storage>,
}

impl StorageRouter {
    pub fn new(thumbnails: Arc<dyn Storage>, videos: Arc<dyn Storage>) -> Self {
        Self { thumbnails, videos }
    }

    /// Route both kinds to the same backend.
    pub fn single(storage: Arc<dyn Storage>) -> Self {
        Self::new(storage.clone(), storage)
    }

    pub fn for_kind(&self, kind: UploadKind) -> &Arc<dyn Storage> {
        match kind {
            UploadKind::Thumbnail => &self.thumbnails,
            UploadKind::Video => &self.videos,
        }
    }
}
