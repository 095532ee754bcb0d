use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, Result as FmtResult};

/// Which URL of a video record an upload targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UploadKind {
    Thumbnail,
    Video,
}

impl UploadKind {
    /// Multipart form field carrying the file.
    pub fn form_field(&self) -> &'static str {
        match self {
            UploadKind::Thumbnail => "thumbnail",
            UploadKind::Video => "video",
        }
    }

    /// Whether the staged file goes through orientation classification.
    pub fn requires_classification(&self) -> bool {
        matches!(self, UploadKind::Video)
    }
}

impl Display for UploadKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            UploadKind::Thumbnail => write!(f, "thumbnail"),
            UploadKind::Video => write!(f, "video"),
        }
    }
}

/// Coarse aspect-ratio category of a video. Used as the storage key prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    Landscape,
    Portrait,
    Other,
}

impl Orientation {
    /// Map a `width:height` display aspect ratio. Only exact matches classify.
    pub fn from_aspect_ratio(ratio: &str) -> Self {
        match ratio {
            "16:9" => Orientation::Landscape,
            "9:16" => Orientation::Portrait,
            _ => Orientation::Other,
        }
    }

    pub fn as_prefix(&self) -> &'static str {
        match self {
            Orientation::Landscape => "landscape",
            Orientation::Portrait => "portrait",
            Orientation::Other => "other",
        }
    }
}

impl Display for Orientation {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_prefix())
    }
}
