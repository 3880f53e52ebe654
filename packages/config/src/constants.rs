// ABOUTME: Names of the OKRDESK_* environment variables and their fallbacks
// ABOUTME: Default values apply when a variable is unset

// Administrator bootstrap
pub const OKRDESK_ADMIN_EMAIL: &str = "OKRDESK_ADMIN_EMAIL";
pub const OKRDESK_ADMIN_PASSWORD: &str = "OKRDESK_ADMIN_PASSWORD";
pub const OKRDESK_ADMIN_NAME: &str = "OKRDESK_ADMIN_NAME";

// Server Configuration
pub const OKRDESK_API_PORT: &str = "OKRDESK_API_PORT";
pub const OKRDESK_CORS_ORIGIN: &str = "OKRDESK_CORS_ORIGIN";
pub const OKRDESK_DATABASE_PATH: &str = "OKRDESK_DATABASE_PATH";
pub const OKRDESK_SESSION_TTL_HOURS: &str = "OKRDESK_SESSION_TTL_HOURS";

// CLI client
pub const OKRDESK_API_URL: &str = "OKRDESK_API_URL";

// Fallback values used when no override is supplied
pub const DEFAULT_ADMIN_EMAIL: &str = "admin@okrdesk.local";
pub const DEFAULT_ADMIN_PASSWORD: &str = "admin123";
pub const DEFAULT_ADMIN_NAME: &str = "Administrator";
pub const DEFAULT_API_PORT: u16 = 4001;
pub const DEFAULT_CORS_ORIGIN: &str = "http://localhost:5173";
pub const DEFAULT_SESSION_TTL_HOURS: i64 = 24;
pub const DEFAULT_API_URL: &str = "http://localhost:4001";
