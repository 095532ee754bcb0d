//! Application state shared by every handler.
//!
//! Built once at startup and read-only afterwards.

use crate::auth::JwtService;
use crate::services::upload::UploadService;
use sqlx::PgPool;
use tubely_core::Config;

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub jwt: JwtService,
    pub upload: UploadService,
    /// `None` when records are not Postgres-backed.
    pub pool: Option<PgPool>,
}
