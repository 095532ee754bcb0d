//! Staging of upload bodies on local disk.
//!
//! External tools such as `ffprobe` need a file path, so every upload is
//! written to a uniquely named temporary file first. The file is owned by a
//! [`StagedFile`] and unlinked when that value is dropped, which covers the
//! success path, every error path and a cancelled request future alike.

use bytes::Bytes;
use futures::{Stream, StreamExt};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tempfile::TempPath;
use tokio::io::AsyncWriteExt;

const STAGING_PREFIX: &str = "tubely-upload-";

/// Staging failures
#[derive(Debug, thiserror::Error)]
pub enum StagingError {
    /// The client stream failed mid-upload.
    #[error("Failed to read upload stream: {0}")]
    Read(#[source] Box<dyn std::error::Error + Send + Sync>),

    #[error("Upload exceeds the {max_bytes} byte limit")]
    TooLarge { max_bytes: u64 },

    #[error("Failed to write staged file: {0}")]
    Write(#[from] std::io::Error),
}

/// An upload fully written to disk. Removed on drop.
#[derive(Debug)]
pub struct StagedFile {
    path: TempPath,
    len: u64,
}

impl StagedFile {
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn len(&self) -> u64 {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Remove the file now and surface any error instead of ignoring it on drop.
    pub fn remove(self) -> std::io::Result<()> {
        self.path.close()
    }
}

/// Writes request bodies into a staging directory.
#[derive(Debug, Clone)]
pub struct StagingWriter {
    dir: PathBuf,
}

impl StagingWriter {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Stage into the OS temp directory.
    pub fn in_temp_dir() -> Self {
        Self::new(std::env::temp_dir())
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Consume `stream` completely into a new temp file.
    ///
    /// Fails with `TooLarge` as soon as more than `max_bytes` arrive. Any
    /// partially written file is removed before the error is returned.
    pub async fn stage<S, E>(
        &self,
        stream: S,
        max_bytes: u64,
        extension: &str,
    ) -> Result<StagedFile, StagingError>
    where
        S: Stream<Item = Result<Bytes, E>>,
        E: std::error::Error + Send + Sync + 'static,
    {
        let start = Instant::now();
        let suffix = format!(".{}", extension);

        let named = tempfile::Builder::new()
            .prefix(STAGING_PREFIX)
            .suffix(&suffix)
            .tempfile_in(&self.dir)?;
        let (file, path) = named.into_parts();
        let mut file = tokio::fs::File::from_std(file);

        let mut written: u64 = 0;
        let mut stream = std::pin::pin!(stream);
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|e| StagingError::Read(Box::new(e)))?;
            written += chunk.len() as u64;
            if written > max_bytes {
                tracing::debug!(
                    path = %path.display(),
                    max_bytes,
                    "Upload exceeded staging limit"
                );
                return Err(StagingError::TooLarge { max_bytes });
            }
            file.write_all(&chunk).await?;
        }

        file.flush().await?;
        file.sync_all().await?;
        drop(file);

        tracing::debug!(
            path = %path.display(),
            size_bytes = written,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Upload staged"
        );

        Ok(StagedFile { path, len: written })
    }
}
