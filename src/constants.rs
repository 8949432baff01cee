/// Minimum accepted player height in centimetres (inclusive)
pub const MIN_HEIGHT_CM: f64 = 50.0;

/// Minimum accepted player weight in kilograms (inclusive)
pub const MIN_WEIGHT_KG: f64 = 20.0;

/// Minimum length of a registrant's full name
pub const MIN_FULL_NAME_LEN: usize = 2;

/// Minimum length of a postal address
pub const MIN_ADDRESS_LEN: usize = 5;

/// Minimum length of an account password
pub const MIN_PASSWORD_LEN: usize = 8;

/// bcrypt work factor for stored credentials
pub const BCRYPT_COST: u32 = 10;

/// Cost-10 hash checked against when a login names an unknown email, so both
/// failure paths spend the same bcrypt time
pub const DUMMY_PASSWORD_HASH: &str =
    "$2a$10$N9qo8uLOickgx2ZMRZoMyeIjZAgcfl7p92ldGxad68LJZdL17lhWy";

/// Default upload size limit (1 GiB)
pub const DEFAULT_UPLOAD_SIZE_LIMIT: usize = 1024 * 1024 * 1024;

/// Default HLS segment duration in seconds
pub const DEFAULT_HLS_SEGMENT_SECS: u32 = 10;

/// Multipart field carrying the uploaded video
pub const VIDEO_FIELD_NAME: &str = "video";

/// Playlist written into every HLS output directory
pub const HLS_PLAYLIST_NAME: &str = "index.m3u8";

/// Segment filename pattern handed to the encoder (zero-based, sequential)
pub const HLS_SEGMENT_PATTERN: &str = "segment%03d.ts";

/// Public URL prefix under which the upload directory is served
pub const UPLOADS_URL_PREFIX: &str = "/uploads";

/// Media type served for HLS manifests
pub const HLS_MANIFEST_CONTENT_TYPE: &str = "application/x-mpegURL";

/// Media type served for MPEG transport stream segments
pub const HLS_SEGMENT_CONTENT_TYPE: &str = "video/mp2t";

/// Title given to videos uploaded without one
pub const DEFAULT_VIDEO_TITLE: &str = "Untitled Video";

// =============================================================================
// Error Messages
// =============================================================================

pub const ERR_ACCOUNT_FIELDS_REQUIRED: &str = "Please provide all required fields.";

pub const ERR_LOGIN_FIELDS_REQUIRED: &str = "Please provide Email and Password";

pub const ERR_INVALID_CREDENTIALS: &str = "Invalid Email or Password!";

pub const ERR_ACCOUNT_EXISTS: &str = "User already exists with this email.";

pub const ERR_REGISTRATION_NOT_FOUND: &str = "Registration Not Found!.";

pub const ERR_VIDEO_NOT_FOUND: &str = "Video not found";

pub const ERR_ADMIN_EMAIL_MISSING: &str = "Admin email is not configured.";

pub const ERR_EMAIL_NOT_SENT: &str = "Email could not be sent.";

pub const ERR_NO_VIDEO: &str = "No video file uploaded.";

pub const ERR_VIDEO_TYPE: &str = "Only video files are allowed";

pub const ERR_INVALID_ID: &str = "Invalid value for id";

pub const ERR_ROUTE_NOT_FOUND: &str = "Route not found";

pub const ERR_METHOD_NOT_ALLOWED: &str = "Method not allowed";
