//! Configuration validation
//!
//! Checks that go beyond `Config::validate` and only matter for the server.

use anyhow::Result;
use tubely_core::{Config, StorageBackend};

pub fn validate_config(config: &Config) -> Result<()> {
    config.validate()?;

    if config.is_production() && config.cors_origins().iter().any(|o| o == "*") {
        return Err(anyhow::anyhow!(
            "CORS configured to allow all origins (*) in production. \
            Set explicit origins via CORS_ORIGINS."
        ));
    }

    if config.db_max_connections() == 0 {
        return Err(anyhow::anyhow!("Database max connections cannot be 0"));
    }

    if config.db_timeout_seconds() == 0 {
        return Err(anyhow::anyhow!("Database timeout cannot be 0"));
    }

    if config.probe_timeout_seconds() == 0 {
        return Err(anyhow::anyhow!("PROBE_TIMEOUT_SECONDS cannot be 0"));
    }

    if config.uses_backend(StorageBackend::S3) && config.s3_endpoint().is_some() {
        tracing::info!(
            endpoint = config.s3_endpoint().unwrap_or_default(),
            "Using custom S3 endpoint with path-style URLs"
        );
    }

    if let Some(buffer_bytes) = config.s3_put_buffer_bytes() {
        tracing::info!(
            max_buffer_bytes = buffer_bytes,
            "S3 commits buffer each staged file in memory for a single put"
        );
    }

    Ok(())
}
