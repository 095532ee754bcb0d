//! Video inspection: probing staged files with ffprobe and classifying their
//! orientation.

pub mod orientation;
pub mod probe;

pub use orientation::OrientationClassifier;
pub use probe::{FfprobeService, MediaProbe, ProbeError, ProbeOutput, ProbeStream};
