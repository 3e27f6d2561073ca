// Input filtering
pub const DEFAULT_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "heic", "heif"];
pub const DEFAULT_OUTPUT_DIR: &str = "output";
pub const CONFIG_FILE_NAME: &str = "photo_geoqr.ini";
pub const FALLBACK_PROJECT_NAME: &str = "report";

// QR rendering: pixels per module and quiet zone width in modules
pub const QR_MODULE_PX: u32 = 10;
pub const QR_QUIET_ZONE: u32 = 4;
pub const QR_MODULE_PX_MAX: u32 = 64;
pub const QR_QUIET_ZONE_MAX: u32 = 64;
// Upper bound on the rendered bitmap edge
pub const QR_MAX_SIDE_PX: u32 = 16_384;

// Longest edge of the photo preview embedded in the report, in pixels.
// Only downscaled, never enlarged.
pub const PREVIEW_MAX_PX: u32 = 1600;
pub const PREVIEW_JPEG_QUALITY: u8 = 85;

// A4 page geometry in PDF points
pub const PAGE_WIDTH: f32 = 595.0;
pub const PAGE_HEIGHT: f32 = 842.0;
pub const PAGE_MARGIN: f32 = 40.0;

pub const HEADING_FONT_SIZE: f32 = 18.0;
pub const SUBTITLE_FONT_SIZE: f32 = 11.0;
pub const LABEL_FONT_SIZE: f32 = 12.0;

pub const PHOTO_REGION_HEIGHT: f32 = 400.0;
pub const QR_MAX_SIZE: f32 = 200.0;
pub const QR_COLUMN_GAP: f32 = 20.0;
