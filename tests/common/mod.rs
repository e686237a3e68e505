#![allow(dead_code)]

use stackkit_logging::{LogError, Logger, Value};
use std::io::{self, Write};
use std::sync::{Arc, Mutex};

/// Writer whose contents stay readable after it is moved into a logger.
#[derive(Clone, Default)]
pub struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

impl SharedBuffer {
    pub fn contents(&self) -> String {
        String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
    }

    /// Every written line parsed as a JSON object.
    pub fn entries(&self) -> Vec<serde_json::Value> {
        self.contents()
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect()
    }
}

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Logger recording every entry it receives.
#[derive(Clone, Default)]
pub struct Capture(Arc<Mutex<Vec<Vec<Value>>>>);

impl Capture {
    pub fn entries(&self) -> Vec<Vec<Value>> {
        self.0.lock().unwrap().clone()
    }
}

impl Logger for Capture {
    fn log(&self, keyvals: Vec<Value>) -> Result<(), LogError> {
        self.0.lock().unwrap().push(keyvals);
        Ok(())
    }
}

/// Logger that always fails.
pub struct Broken;

impl Logger for Broken {
    fn log(&self, _keyvals: Vec<Value>) -> Result<(), LogError> {
        Err(LogError::Sink("disk full".to_string()))
    }
}
