//! Environment variable names read by [`LoggingConfig::from_env`](crate::init::LoggingConfig::from_env).
//!
//! These are purely helpers; the decorators themselves never read the
//! environment.

/// Minimum severity to emit, e.g. `warning`. Unknown names mean `info`.
pub const LOG_LEVEL_ENV: &str = "LOG_LEVEL";

/// Key inspected for error values when inferring severity.
pub const LOG_ERROR_KEY_ENV: &str = "LOG_ERROR_KEY";

/// Service name reported in error reports.
pub const LOG_SERVICE_NAME_ENV: &str = "LOG_SERVICE_NAME";

/// Service version reported in error reports.
pub const LOG_SERVICE_VERSION_ENV: &str = "LOG_SERVICE_VERSION";

/// Comma separated request-scoped keys copied into log entries.
pub const LOG_CONTEXT_KEYS_ENV: &str = "LOG_CONTEXT_KEYS";
