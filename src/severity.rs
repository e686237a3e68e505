//! Severity inference and severity-threshold filtering.
//!
//! Cloud logging treats a structured entry without a severity as an
//! error. [`SeverityAware`] makes sure every entry carries one, and
//! [`LevelFilter`] drops entries below a threshold. The filter only
//! recognises entries that already carry a severity, so it must sit in
//! front of a [`SeverityAware`] logger (or otherwise see normalized
//! entries); un-annotated entries are dropped.

use crate::error::LogError;
use crate::level::Level;
use crate::logger::Logger;
use crate::value::Value;

/// Reserved key holding the entry severity.
pub const SEVERITY_KEY: &str = "severity";

/// Default key inspected for error values.
pub const DEFAULT_ERROR_KEY: &str = "error";

/// Logger decorator that appends `severity=<level>` when an entry has none.
///
/// If the entry has no severity key the level is inferred from the error
/// key: a non-empty string other than `"nil"`/`"null"` or an error value
/// means [`Level::Error`]; anything else means [`Level::Info`]. An error
/// key in final position without a value counts as an error.
#[derive(Clone, Debug)]
pub struct SeverityAware<L> {
    inner: L,
    error_key: String,
}

impl<L: Logger> SeverityAware<L> {
    pub fn new(inner: L) -> Self {
        Self::with_error_key(inner, DEFAULT_ERROR_KEY)
    }

    pub fn with_error_key(inner: L, error_key: impl Into<String>) -> Self {
        Self {
            inner,
            error_key: error_key.into(),
        }
    }

    pub fn error_key(&self) -> &str {
        &self.error_key
    }

    /// Severity to append, or `None` if the entry already has one.
    pub fn infer(&self, keyvals: &[Value]) -> Option<Level> {
        let mut error_index = None;
        for (i, key) in keyvals.iter().enumerate().step_by(2) {
            if key.is_key(SEVERITY_KEY) {
                return None;
            }
            if key.is_key(&self.error_key) {
                error_index = Some(i);
            }
        }

        let Some(i) = error_index else {
            return Some(Level::Info);
        };

        let level = match keyvals.get(i + 1) {
            None => Level::Error,
            Some(Value::Str(s)) if s.is_empty() || s == "nil" || s == "null" => Level::Info,
            Some(Value::Str(_)) | Some(Value::Error(_)) => Level::Error,
            Some(_) => Level::Info,
        };
        Some(level)
    }
}

impl<L: Logger> Logger for SeverityAware<L> {
    fn log(&self, mut keyvals: Vec<Value>) -> Result<(), LogError> {
        if let Some(level) = self.infer(&keyvals) {
            keyvals.push(Value::from(SEVERITY_KEY));
            keyvals.push(Value::Level(level));
        }
        self.inner.log(keyvals)
    }
}

/// Logger decorator that forwards only entries at or above `min_level`.
#[derive(Clone, Debug)]
pub struct LevelFilter<L> {
    inner: L,
    min_level: Level,
}

impl<L: Logger> LevelFilter<L> {
    pub fn new(inner: L, min_level: Level) -> Self {
        Self { inner, min_level }
    }

    pub fn min_level(&self) -> Level {
        self.min_level
    }

    /// `true` if the entry carries a recognisable severity at or above
    /// the threshold.
    pub fn allows(&self, keyvals: &[Value]) -> bool {
        severity_of(keyvals).is_some_and(|level| level.rank() >= self.min_level.rank())
    }
}

impl<L: Logger> Logger for LevelFilter<L> {
    fn log(&self, keyvals: Vec<Value>) -> Result<(), LogError> {
        if self.allows(&keyvals) {
            self.inner.log(keyvals)
        } else {
            Ok(())
        }
    }
}

/// First recognisable severity in the entry.
///
/// Values under the severity key count if they are a [`Level`] or a string
/// equal to a canonical level name; other values are skipped.
pub fn severity_of(keyvals: &[Value]) -> Option<Level> {
    keyvals
        .chunks(2)
        .filter(|pair| pair[0].is_key(SEVERITY_KEY))
        .find_map(|pair| match pair.get(1) {
            Some(Value::Level(level)) => Some(*level),
            Some(Value::Str(name)) => Level::parse(name),
            _ => None,
        })
}
