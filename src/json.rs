use crate::error::LogError;
use crate::logger::Logger;
use crate::value::Value;
use serde_json::Map;
use std::io::{self, Write};
use std::sync::Mutex;

/// Placeholder for a key that has no value.
pub const MISSING_VALUE: &str = "(MISSING)";

/// Sink that writes each entry as one JSON object followed by a newline.
///
/// Later duplicate keys overwrite earlier ones. Writes are serialized
/// through an internal mutex so a single writer can be shared between
/// threads.
pub struct JsonLogger<W> {
    writer: Mutex<W>,
}

impl<W: Write + Send> JsonLogger<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer: Mutex::new(writer),
        }
    }

    /// Consume the logger and return the writer.
    pub fn into_inner(self) -> W {
        self.writer.into_inner().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl JsonLogger<io::Stdout> {
    /// JSON logger on standard output, the usual ingestion path for
    /// container-based cloud logging agents.
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

/// Render an entry as a JSON object.
pub fn to_object(keyvals: &[Value]) -> Map<String, serde_json::Value> {
    let mut object = Map::new();
    for pair in keyvals.chunks(2) {
        let key = match &pair[0] {
            Value::Str(s) => s.clone(),
            other => other.to_string(),
        };
        let value = match pair.get(1) {
            Some(v) => v.to_json(),
            None => serde_json::Value::String(MISSING_VALUE.to_string()),
        };
        object.insert(key, value);
    }
    object
}

impl<W: Write + Send> Logger for JsonLogger<W> {
    fn log(&self, keyvals: Vec<Value>) -> Result<(), LogError> {
        let mut line = serde_json::to_vec(&to_object(&keyvals))?;
        line.push(b'\n');

        let mut writer = self.writer.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        writer.write_all(&line)?;
        Ok(())
    }
}
