//! DRACOON API paths and branding transfer constants shared across the crate.

// Branding service endpoints (relative to the instance base url)
pub const PUBLIC_BRANDING_PATH: &str = "/branding/api/v1/public/branding";
pub const BRANDING_FILES_PATH: &str = "/branding/api/v1/branding/files";
pub const BRANDING_PATH: &str = "/branding/api/v1/branding";

// Core API endpoints
pub const SOFTWARE_VERSION_PATH: &str = "/api/v4/public/software/version";
pub const OAUTH_TOKEN_PATH: &str = "/oauth/token";
pub const OAUTH_AUTHORIZE_PATH: &str = "/oauth/authorize";
pub const OAUTH_CALLBACK_PATH: &str = "/oauth/callback";

// Minimum supported REST API version (major must match exactly)
pub const REQUIRED_MAJOR_VERSION: u32 = 4;
pub const MIN_MINOR_VERSION: u32 = 19;

// Fixed canvas sizes for the two resized logos
pub const WEB_LOGO_CANVAS: (u32, u32) = (1136, 440);
pub const APP_LOGO_CANVAS: (u32, u32) = (1900, 1900);

// Staging and archive file names
pub const DESCRIPTOR_FILE_NAME: &str = "branding.json";
pub const MANIFEST_FILE_NAME: &str = "manifest.json";
pub const DEFAULT_ARCHIVE_NAME: &str = "branding.zip";

// Defaults for the CLI
pub const DEFAULT_CLIENT_ID: &str = "dracoon_legacy_scripting";
/// Multi-tenant cloud host serving branding for on-premises installations.
pub const DEFAULT_CLOUD_HOST: &str = "dracoon.team";
pub const DEFAULT_WORKING_DIR: &str = ".dcspray";
pub const DEFAULT_LOG_DIR: &str = "logs";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 60;
