use crate::json::to_object;
use crate::level::Level;
use crate::severity::severity_of;
use crate::value::Value;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Owned form of one key/value entry, as handed to asynchronous sinks.
#[derive(Debug, Clone, Serialize)]
pub struct LogRecord {
    /// Time the entry was accepted for forwarding.
    pub timestamp: DateTime<Utc>,
    pub severity: Option<Level>,
    pub fields: serde_json::Map<String, serde_json::Value>,
}

impl LogRecord {
    pub fn from_keyvals(keyvals: &[Value]) -> Self {
        Self {
            timestamp: Utc::now(),
            severity: severity_of(keyvals),
            fields: to_object(keyvals),
        }
    }
}
