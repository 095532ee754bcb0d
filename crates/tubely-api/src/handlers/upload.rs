use crate::auth::UserContext;
use crate::error::{multipart_error, HttpAppError};
use crate::state::AppState;
use axum::{
    extract::{Multipart, Path, State},
    Json,
};
use std::sync::Arc;
use tubely_core::{AppError, UploadKind, Video};
use uuid::Uuid;

/// `POST /api/thumbnail_upload/{video_id}` with the image in form field `thumbnail`.
pub async fn upload_thumbnail(
    State(state): State<Arc<AppState>>,
    Path(video_id): Path<String>,
    user: UserContext,
    multipart: Multipart,
) -> Result<Json<Video>, HttpAppError> {
    handle_upload(&state, UploadKind::Thumbnail, &video_id, user, multipart).await
}

/// `POST /api/video_upload/{video_id}` with the mp4 in form field `video`.
pub async fn upload_video(
    State(state): State<Arc<AppState>>,
    Path(video_id): Path<String>,
    user: UserContext,
    multipart: Multipart,
) -> Result<Json<Video>, HttpAppError> {
    handle_upload(&state, UploadKind::Video, &video_id, user, multipart).await
}

async fn handle_upload(
    state: &AppState,
    kind: UploadKind,
    raw_video_id: &str,
    user: UserContext,
    mut multipart: Multipart,
) -> Result<Json<Video>, HttpAppError> {
    let video_id = Uuid::parse_str(raw_video_id).map_err(AppError::from)?;

    // Ownership is settled before a single body byte is read.
    let video = state.upload.authorize(video_id, user.user_id).await?;

    let form_field = kind.form_field();
    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        if field.name() != Some(form_field) {
            continue;
        }

        let content_type = field.content_type().map(str::to_string);
        let updated = state
            .upload
            .ingest(kind, video, content_type.as_deref(), field)
            .await?;
        return Ok(Json(updated));
    }

    Err(AppError::InvalidInput(format!("Missing form field '{}'", form_field)).into())
}
