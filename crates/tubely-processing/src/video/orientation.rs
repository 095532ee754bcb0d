use std::path::Path;
use std::sync::Arc;
use tubely_core::Orientation;

use super::probe::{MediaProbe, ProbeError, ProbeOutput, ProbeStream};

/// Classifies staged videos as landscape, portrait or other.
#[derive(Clone)]
pub struct OrientationClassifier {
    probe: Arc<dyn MediaProbe>,
}

impl OrientationClassifier {
    pub fn new(probe: Arc<dyn MediaProbe>) -> Self {
        Self { probe }
    }

    /// Probe `path` and map the first stream's display aspect ratio.
    ///
    /// Execution failures and unparseable output are errors. Only a parsed
    /// document whose ratio does not match falls back to `Other`.
    pub async fn classify(&self, path: &Path) -> Result<Orientation, ProbeError> {
        match self.probe.probe(path).await? {
            ProbeOutput::Parsed { streams } => {
                let orientation = orientation_of(&streams);
                tracing::debug!(
                    path = %path.display(),
                    stream_count = streams.len(),
                    orientation = %orientation,
                    "Video orientation classified"
                );
                Ok(orientation)
            }
            ProbeOutput::ParseFailure { reason } => Err(ProbeError::Malformed(reason)),
        }
    }
}

/// Orientation from the first stream only.
pub fn orientation_of(streams: &[ProbeStream]) -> Orientation {
    streams
        .first()
        .and_then(|s| s.display_aspect_ratio.as_deref())
        .map(Orientation::from_aspect_ratio)
        .unwrap_or(Orientation::Other)
}
