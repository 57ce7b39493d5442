//! Application constants
//!
//! Centralized location for magic strings and configuration defaults.

/// Default base URL of the health-records API
pub const DEFAULT_API_URL: &str = "http://localhost:8000/api";

/// Directory under the home directory holding config, tokens and logs
pub const DATA_DIR_NAME: &str = ".vitals";

/// Storage key of the access token
pub const ACCESS_TOKEN_KEY: &str = "token";

/// Storage key of the refresh token
pub const REFRESH_TOKEN_KEY: &str = "refreshToken";

/// File holding the persisted token pair
pub const SESSION_FILE: &str = "session.json";

/// Optional YAML config file inside the data directory
pub const CONFIG_FILE: &str = "config.yaml";

/// Log file name inside the data directory
pub const LOG_FILE: &str = "vitals.log";

/// Request timeout applied by the HTTP client
pub const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Records shown per page on the list screen
pub const RECORDS_PAGE_SIZE: usize = 10;

/// Default statistics window, counted back from today
pub const DEFAULT_STATS_WINDOW_DAYS: i64 = 30;

/// Application name
pub const APP_NAME: &str = "Vitals";

/// Application version
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");
