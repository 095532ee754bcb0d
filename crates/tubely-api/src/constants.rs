//! API constants

/// Thumbnail upload route; `{video_id}` is the target record.
pub const THUMBNAIL_UPLOAD_PATH: &str = "/api/thumbnail_upload/{video_id}";

/// Video upload route; `{video_id}` is the target record.
pub const VIDEO_UPLOAD_PATH: &str = "/api/video_upload/{video_id}";

/// Mount point for files committed to local storage.
pub const ASSETS_PATH: &str = "/assets";

/// Slack added to the per-route body limit for multipart boundaries and part
/// headers. The file size itself is enforced exactly while staging.
pub const MULTIPART_OVERHEAD_BYTES: usize = 64 * 1024;

/// Header carrying the request correlation id.
pub const REQUEST_ID_HEADER: &str = "X-Request-ID";
