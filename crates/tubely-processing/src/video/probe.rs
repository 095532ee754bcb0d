use async_trait::async_trait;
use serde::Deserialize;
use std::path::Path;
use std::process::Stdio;
use std::time::{Duration, Instant};
use tokio::process::Command;

/// One entry of ffprobe's `streams` list. Other fields are ignored so an
/// odd value elsewhere in a stream cannot fail the whole document.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ProbeStream {
    #[serde(default)]
    pub display_aspect_ratio: Option<String>,
}

#[derive(Deserialize)]
struct ProbeDocument {
    streams: Vec<ProbeStream>,
}

/// Result of inspecting a probe's structured output.
#[derive(Debug, Clone, PartialEq)]
pub enum ProbeOutput {
    Parsed { streams: Vec<ProbeStream> },
    ParseFailure { reason: String },
}

impl ProbeOutput {
    /// Parse ffprobe's JSON document. A missing or non-list `streams` field
    /// is a parse failure, not an empty result.
    pub fn parse(stdout: &[u8]) -> Self {
        match serde_json::from_slice::<ProbeDocument>(stdout) {
            Ok(doc) => ProbeOutput::Parsed {
                streams: doc.streams,
            },
            Err(e) => ProbeOutput::ParseFailure {
                reason: e.to_string(),
            },
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ProbeError {
    #[error("Invalid probe input {path}: {reason}")]
    InvalidPath { path: String, reason: String },

    #[error("Failed to execute {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{program} exited with {status}: {stderr}")]
    Failed {
        program: String,
        status: String,
        stderr: String,
    },

    #[error("{program} did not finish within {timeout_secs}s")]
    Timeout { program: String, timeout_secs: u64 },

    #[error("Malformed probe output: {0}")]
    Malformed(String),
}

/// Source of stream metadata for a file on local disk.
#[async_trait]
pub trait MediaProbe: Send + Sync {
    async fn probe(&self, path: &Path) -> Result<ProbeOutput, ProbeError>;
}

/// `MediaProbe` backed by the ffprobe binary.
#[derive(Debug, Clone)]
pub struct FfprobeService {
    ffprobe_path: String,
    timeout: Duration,
}

impl FfprobeService {
    pub fn new(ffprobe_path: impl Into<String>, timeout: Duration) -> Self {
        Self {
            ffprobe_path: ffprobe_path.into(),
            timeout,
        }
    }
}

fn validate_input_path(path: &Path) -> Result<(), ProbeError> {
    let display = path.display().to_string();
    let invalid = |reason: &str| ProbeError::InvalidPath {
        path: display.clone(),
        reason: reason.to_string(),
    };

    if path.as_os_str().is_empty() {
        return Err(invalid("empty path"));
    }
    if path.to_string_lossy().contains('\0') {
        return Err(invalid("path contains NUL"));
    }
    if !path.is_file() {
        return Err(invalid("not a regular file"));
    }
    Ok(())
}

#[async_trait]
impl MediaProbe for FfprobeService {
    #[tracing::instrument(skip(self), fields(
        process.executable.name = "ffprobe",
        process.executable.path = %self.ffprobe_path,
        ffprobe.operation = "show_streams"
    ))]
    async fn probe(&self, path: &Path) -> Result<ProbeOutput, ProbeError> {
        let start = Instant::now();
        validate_input_path(path)?;

        // kill_on_drop: a timed-out or cancelled probe must not outlive the request.
        let mut command = Command::new(&self.ffprobe_path);
        command
            .args(["-v", "error", "-print_format", "json", "-show_streams"])
            .arg(path)
            .stdin(Stdio::null())
            .kill_on_drop(true);

        let output = match tokio::time::timeout(self.timeout, command.output()).await {
            Ok(result) => result.map_err(|source| ProbeError::Spawn {
                program: self.ffprobe_path.clone(),
                source,
            })?,
            Err(_) => {
                return Err(ProbeError::Timeout {
                    program: self.ffprobe_path.clone(),
                    timeout_secs: self.timeout.as_secs(),
                })
            }
        };

        if !output.status.success() {
            return Err(ProbeError::Failed {
                program: self.ffprobe_path.clone(),
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        let parsed = ProbeOutput::parse(&output.stdout);
        tracing::debug!(
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            parsed = matches!(parsed, ProbeOutput::Parsed { .. }),
            "ffprobe completed"
        );
        Ok(parsed)
    }
}
