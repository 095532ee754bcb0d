//! Route configuration and setup.

mod health;

use crate::auth::{auth_middleware, AuthState};
use crate::constants::{
    ASSETS_PATH, MULTIPART_OVERHEAD_BYTES, THUMBNAIL_UPLOAD_PATH, VIDEO_UPLOAD_PATH,
};
use crate::handlers::upload::{upload_thumbnail, upload_video};
use crate::middleware::request_id_middleware;
use crate::state::AppState;
use axum::{
    extract::DefaultBodyLimit,
    http::{HeaderValue, Method},
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tubely_core::{Config, StorageBackend, UploadKind};

/// Setup all application routes
pub async fn setup_routes(
    config: &Config,
    state: Arc<AppState>,
) -> Result<Router<()>, anyhow::Error> {
    let cors = setup_cors(config)?;
    let auth_state = AuthState {
        jwt: state.jwt.clone(),
    };

    let protected_routes = upload_routes(config).layer(axum::middleware::from_fn_with_state(
        Arc::new(auth_state),
        auth_middleware,
    ));

    let mut app = public_routes().merge(protected_routes);

    if config.uses_backend(StorageBackend::Local) {
        tracing::info!(
            path = %config.local_storage_path(),
            mount = ASSETS_PATH,
            "Serving local storage"
        );
        app = app.nest_service(ASSETS_PATH, ServeDir::new(config.local_storage_path()));
    }

    // Outermost first: the request id wraps tracing so spans carry it.
    let app = app
        .layer(
            ServiceBuilder::new()
                .layer(axum::middleware::from_fn(request_id_middleware))
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .with_state(state);

    Ok(app)
}

fn setup_cors(config: &Config) -> Result<CorsLayer, anyhow::Error> {
    let cors = if config.cors_origins().iter().any(|o| o == "*") {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
            .allow_headers(Any)
    } else {
        let origins = config
            .cors_origins()
            .iter()
            .map(|o| o.parse::<HeaderValue>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| anyhow::anyhow!("Invalid CORS origin: {}", e))?;
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
            .allow_headers(Any)
    };
    Ok(cors)
}

fn public_routes() -> Router<Arc<AppState>> {
    Router::new().route("/health", get(health::health_check))
}

/// Each upload route gets its own body limit: the file limit plus multipart framing.
fn upload_routes(config: &Config) -> Router<Arc<AppState>> {
    let limit = |kind| {
        config
            .max_upload_size_bytes(kind)
            .saturating_add(MULTIPART_OVERHEAD_BYTES)
    };

    Router::new()
        .route(
            THUMBNAIL_UPLOAD_PATH,
            post(upload_thumbnail).layer(DefaultBodyLimit::max(limit(UploadKind::Thumbnail))),
        )
        .route(
            VIDEO_UPLOAD_PATH,
            post(upload_video).layer(DefaultBodyLimit::max(limit(UploadKind::Video))),
        )
}
