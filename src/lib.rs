//! Key/value logging decorators for cloud logging and error reporting.
//!
//! Entries are flat `key, value, ...` sequences handed to a [`Logger`].
//! The decorators add what the backend needs to interpret them:
//!
//! - [`SeverityAware`] infers a `severity` for entries that carry none,
//! - [`LevelFilter`] drops entries below a minimum [`Level`],
//! - [`ErrorReporter`] emits structured error reports with service
//!   identity, caller location and optional user / HTTP request details,
//! - [`context::with_context`] copies request-scoped identifiers.
//!
//! ```
//! use stackkit_logging::{keyvals, JsonLogger, Level, LevelFilter, Logger, SeverityAware};
//!
//! let logger = SeverityAware::new(LevelFilter::new(JsonLogger::new(Vec::new()), Level::Info));
//! logger.log(keyvals!["msg", "payment accepted", "amount", 1200]).unwrap();
//! ```

pub mod value;
pub mod level;
pub mod error;
pub mod logger;
pub mod json;
pub mod severity;
pub mod report;
pub mod context;
pub mod record;
pub mod sink;
pub mod channel;
pub mod layer;
pub mod env;
pub mod init;

pub use error::LogError;
pub use json::JsonLogger;
pub use level::Level;
pub use logger::{Logger, WithLogger};
pub use report::{ErrorReporter, ServiceContext};
pub use severity::{LevelFilter, SeverityAware};
pub use value::Value;
