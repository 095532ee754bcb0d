use tubely_core::UploadKind;

/// (kind, base media type, storage extension)
const ALLOWED_MEDIA_TYPES: &[(UploadKind, &str, &str)] = &[
    (UploadKind::Thumbnail, "image/jpeg", "jpeg"),
    (UploadKind::Thumbnail, "image/png", "png"),
    (UploadKind::Video, "video/mp4", "mp4"),
];

/// Media type validation errors
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("Missing content type")]
    MissingContentType,

    #[error("Could not parse content type {content_type:?}")]
    Unparseable { content_type: String },

    #[error("Unsupported media type {media_type} for {kind} upload (allowed: {allowed:?})")]
    UnsupportedMediaType {
        kind: UploadKind,
        media_type: String,
        allowed: Vec<&'static str>,
    },
}

/// A declared content type that passed the allow-list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidatedMedia {
    /// Base media type without parameters, e.g. `image/png`.
    pub content_type: &'static str,
    /// File extension for the storage key, e.g. `png`.
    pub extension: &'static str,
}

/// Base media types accepted for `kind`.
pub fn allowed_media_types(kind: UploadKind) -> Vec<&'static str> {
    ALLOWED_MEDIA_TYPES
        .iter()
        .filter(|(k, _, _)| *k == kind)
        .map(|(_, media_type, _)| *media_type)
        .collect()
}

/// Check a declared content type against the allow-list for `kind`.
///
/// Parameters such as `; charset=binary` are discarded before comparison.
pub fn validate_media_type(
    kind: UploadKind,
    declared: Option<&str>,
) -> Result<ValidatedMedia, ValidationError> {
    let declared = declared
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or(ValidationError::MissingContentType)?;

    let parsed: mime::Mime = declared
        .parse()
        .map_err(|_| ValidationError::Unparseable {
            content_type: declared.to_string(),
        })?;
    let essence = parsed.essence_str().to_ascii_lowercase();

    ALLOWED_MEDIA_TYPES
        .iter()
        .find(|(k, media_type, _)| *k == kind && *media_type == essence)
        .map(|&(_, content_type, extension)| ValidatedMedia {
            content_type,
            extension,
        })
        .ok_or_else(|| ValidationError::UnsupportedMediaType {
            kind,
            media_type: essence,
            allowed: allowed_media_types(kind),
        })
}
