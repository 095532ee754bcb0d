//! Configuration module
//!
//! Configuration is read once from the environment at startup and is immutable
//! afterwards. Components receive what they need through `Config` getters.

use std::env;

use crate::models::UploadKind;
use crate::storage_types::StorageBackend;

// Common constants
const SERVER_PORT: u16 = 8091;
const MAX_CONNECTIONS: u32 = 10;
const CONNECTION_TIMEOUT_SECS: u64 = 30;
// S3 commits are a single put of the whole staged file, so this is also the
// peak buffer held per concurrent video upload when videos go to S3.
const MAX_VIDEO_SIZE_BYTES: usize = 1 << 30;
const MAX_THUMBNAIL_SIZE_BYTES: usize = 10 << 20;
const PROBE_TIMEOUT_SECS: u64 = 30;
const LOCAL_STORAGE_PATH: &str = "./assets";
const LOCAL_STORAGE_BASE_URL: &str = "http://localhost:8091/assets";

/// Server-level settings
#[derive(Clone, Debug)]
pub struct BaseConfig {
    pub server_port: u16,
    pub cors_origins: Vec<String>,
    pub db_max_connections: u32,
    pub db_timeout_seconds: u64,
    pub jwt_secret: String,
    pub environment: String,
}

/// Upload service configuration
#[derive(Clone, Debug)]
pub struct UploadServiceConfig {
    pub base: BaseConfig,
    pub database_url: String,
    // Storage configuration
    pub thumbnail_storage_backend: StorageBackend,
    pub video_storage_backend: StorageBackend,
    pub s3_bucket: Option<String>,
    pub s3_region: Option<String>,
    pub s3_endpoint: Option<String>, // S3-compatible providers (MinIO etc.)
    pub aws_region: Option<String>,
    pub local_storage_path: String,
    pub local_storage_base_url: String,
    // Upload pipeline
    pub max_video_size_bytes: usize,
    pub max_thumbnail_size_bytes: usize,
    pub ffprobe_path: String,
    pub probe_timeout_seconds: u64,
    /// Directory for staged uploads; the OS temp dir when unset.
    pub staging_dir: Option<String>,
}

/// Application configuration.
#[derive(Clone, Debug)]
pub struct Config(pub Box<UploadServiceConfig>);

impl Config {
    fn inner(&self) -> &UploadServiceConfig {
        &self.0
    }

    /// Check if the application is running in production mode
    pub fn is_production(&self) -> bool {
        let env = self.inner().base.environment.to_lowercase();
        env == "production" || env == "prod"
    }

    pub fn from_env() -> Result<Self, anyhow::Error> {
        let config = UploadServiceConfig::from_env()?;
        Ok(Config(Box::new(config)))
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        self.inner().validate()
    }

    pub fn server_port(&self) -> u16 {
        self.inner().base.server_port
    }

    pub fn cors_origins(&self) -> &[String] {
        &self.inner().base.cors_origins
    }

    pub fn jwt_secret(&self) -> &str {
        &self.inner().base.jwt_secret
    }

    pub fn environment(&self) -> &str {
        &self.inner().base.environment
    }

    pub fn db_max_connections(&self) -> u32 {
        self.inner().base.db_max_connections
    }

    pub fn db_timeout_seconds(&self) -> u64 {
        self.inner().base.db_timeout_seconds
    }

    pub fn database_url(&self) -> &str {
        &self.inner().database_url
    }

    /// Backend that receives uploads of the given kind.
    pub fn storage_backend_for(&self, kind: UploadKind) -> StorageBackend {
        match kind {
            UploadKind::Thumbnail => self.inner().thumbnail_storage_backend,
            UploadKind::Video => self.inner().video_storage_backend,
        }
    }

    pub fn uses_backend(&self, backend: StorageBackend) -> bool {
        self.inner().thumbnail_storage_backend == backend
            || self.inner().video_storage_backend == backend
    }

    /// Largest file an S3 commit holds in memory, or `None` when nothing goes to S3.
    pub fn s3_put_buffer_bytes(&self) -> Option<usize> {
        [UploadKind::Thumbnail, UploadKind::Video]
            .into_iter()
            .filter(|kind| self.storage_backend_for(*kind) == StorageBackend::S3)
            .map(|kind| self.max_upload_size_bytes(kind))
            .max()
    }

    pub fn s3_bucket(&self) -> Option<&str> {
        self.inner().s3_bucket.as_deref()
    }

    pub fn s3_region(&self) -> Option<&str> {
        self.inner().s3_region.as_deref()
    }

    pub fn s3_endpoint(&self) -> Option<&str> {
        self.inner().s3_endpoint.as_deref()
    }

    pub fn aws_region(&self) -> Option<&str> {
        self.inner().aws_region.as_deref()
    }

    pub fn local_storage_path(&self) -> &str {
        &self.inner().local_storage_path
    }

    pub fn local_storage_base_url(&self) -> &str {
        &self.inner().local_storage_base_url
    }

    /// Upper bound on staged bytes for the given kind.
    pub fn max_upload_size_bytes(&self, kind: UploadKind) -> usize {
        match kind {
            UploadKind::Thumbnail => self.inner().max_thumbnail_size_bytes,
            UploadKind::Video => self.inner().max_video_size_bytes,
        }
    }

    pub fn ffprobe_path(&self) -> &str {
        &self.inner().ffprobe_path
    }

    pub fn probe_timeout_seconds(&self) -> u64 {
        self.inner().probe_timeout_seconds
    }

    pub fn staging_dir(&self) -> Option<&str> {
        self.inner().staging_dir.as_deref()
    }
}

fn parse_env<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.trim().parse::<T>().ok())
        .unwrap_or(default)
}

fn optional_env(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn backend_env(key: &str, default: StorageBackend) -> Result<StorageBackend, anyhow::Error> {
    match optional_env(key) {
        Some(value) => value
            .parse()
            .map_err(|e| anyhow::anyhow!("{} is invalid: {}", key, e)),
        None => Ok(default),
    }
}

impl UploadServiceConfig {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();

        let environment = env::var("ENVIRONMENT")
            .or_else(|_| env::var("APP_ENV"))
            .unwrap_or_else(|_| "development".to_string());

        let cors_origins_str = env::var("CORS_ORIGINS").unwrap_or_else(|_| "*".to_string());
        let is_production =
            environment.to_lowercase() == "production" || environment.to_lowercase() == "prod";
        if is_production && cors_origins_str.trim() == "*" {
            return Err(anyhow::anyhow!(
                "CORS_ORIGINS cannot be '*' in production. Please specify explicit origins."
            ));
        }
        let cors_origins = cors_origins_str
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let base = BaseConfig {
            server_port: parse_env("PORT", SERVER_PORT),
            cors_origins,
            db_max_connections: parse_env("DB_MAX_CONNECTIONS", MAX_CONNECTIONS),
            db_timeout_seconds: parse_env("DB_TIMEOUT_SECONDS", CONNECTION_TIMEOUT_SECS),
            jwt_secret: env::var("JWT_SECRET")
                .map_err(|_| anyhow::anyhow!("JWT_SECRET must be set"))?,
            environment,
        };

        Ok(UploadServiceConfig {
            base,
            database_url: env::var("DATABASE_URL")
                .map_err(|_| anyhow::anyhow!("DATABASE_URL must be set"))?,
            thumbnail_storage_backend: backend_env(
                "THUMBNAIL_STORAGE_BACKEND",
                StorageBackend::Local,
            )?,
            video_storage_backend: backend_env("VIDEO_STORAGE_BACKEND", StorageBackend::S3)?,
            s3_bucket: optional_env("S3_BUCKET"),
            s3_region: optional_env("S3_REGION"),
            s3_endpoint: optional_env("S3_ENDPOINT"),
            aws_region: optional_env("AWS_REGION"),
            local_storage_path: optional_env("LOCAL_STORAGE_PATH")
                .unwrap_or_else(|| LOCAL_STORAGE_PATH.to_string()),
            local_storage_base_url: optional_env("LOCAL_STORAGE_BASE_URL")
                .unwrap_or_else(|| LOCAL_STORAGE_BASE_URL.to_string()),
            max_video_size_bytes: parse_env("MAX_VIDEO_SIZE_BYTES", MAX_VIDEO_SIZE_BYTES),
            max_thumbnail_size_bytes: parse_env(
                "MAX_THUMBNAIL_SIZE_BYTES",
                MAX_THUMBNAIL_SIZE_BYTES,
            ),
            ffprobe_path: optional_env("FFPROBE_PATH").unwrap_or_else(|| "ffprobe".to_string()),
            probe_timeout_seconds: parse_env("PROBE_TIMEOUT_SECONDS", PROBE_TIMEOUT_SECS),
            staging_dir: optional_env("STAGING_DIR"),
        })
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.base.jwt_secret.len() < 32 {
            return Err(anyhow::anyhow!(
                "JWT_SECRET must be at least 32 characters long"
            ));
        }

        if !self.database_url.starts_with("postgres://")
            && !self.database_url.starts_with("postgresql://")
        {
            return Err(anyhow::anyhow!(
                "DATABASE_URL must be a valid PostgreSQL connection string"
            ));
        }

        if self.max_video_size_bytes == 0 || self.max_thumbnail_size_bytes == 0 {
            return Err(anyhow::anyhow!("Upload size limits must be greater than zero"));
        }

        for backend in [self.thumbnail_storage_backend, self.video_storage_backend] {
            match backend {
                StorageBackend::S3 => {
                    if self.s3_bucket.is_none() {
                        return Err(anyhow::anyhow!(
                            "S3_BUCKET must be set when using S3 storage backend"
                        ));
                    }
                    if self.s3_region.is_none() && self.aws_region.is_none() {
                        return Err(anyhow::anyhow!(
                            "S3_REGION or AWS_REGION must be set when using S3 storage backend"
                        ));
                    }
                }
                StorageBackend::Local => {
                    if self.local_storage_path.trim().is_empty() {
                        return Err(anyhow::anyhow!(
                            "LOCAL_STORAGE_PATH must be set when using local storage backend"
                        ));
                    }
                    if self.local_storage_base_url.trim().is_empty() {
                        return Err(anyhow::anyhow!(
                            "LOCAL_STORAGE_BASE_URL must be set when using local storage backend"
                        ));
                    }
                }
            }
        }

        Ok(())
    }
}
