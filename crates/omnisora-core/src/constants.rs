//! Application-wide constants.

/// Default size at or above which an upload goes through the direct-to-storage flow.
///
/// 4.5 MiB. This is a client tuning knob, not a limit the backend enforces;
/// override it with `LARGE_UPLOAD_THRESHOLD_BYTES`.
pub const DEFAULT_LARGE_UPLOAD_THRESHOLD_BYTES: u64 = 4_718_592;

/// Number of leading hex characters of the primary digest that form a ShortId.
pub const SHORT_ID_LEN: usize = 12;

/// Content type declared to storage when the file has no known MIME type.
pub const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// Default backend base URL.
pub const DEFAULT_API_URL: &str = "http://localhost:5000";

/// Backend endpoint paths.
pub const UPLOAD_PATH: &str = "/api/upload";
pub const GET_UPLOAD_URL_PATH: &str = "/api/get-upload-url";
pub const FINALIZE_UPLOAD_PATH: &str = "/api/finalize-upload";
pub const RECENT_UPLOADS_PATH: &str = "/api/recent";

/// Storage-provider request headers for a direct upload.
pub const HEADER_FILE_NAME: &str = "X-Bz-File-Name";
pub const HEADER_CONTENT_SHA1: &str = "X-Bz-Content-Sha1";
