use crate::level::Level;
use std::error::Error;
use std::fmt;
use std::sync::Arc;

/// One element of a key/value log entry.
///
/// Entries are flat sequences `key, value, key, value, ...`. Keys are
/// usually [`Value::Str`]; scans over an entry only treat string elements
/// in even positions as keys.
#[derive(Debug, Clone)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    UInt(u64),
    Float(f64),
    Str(String),
    Level(Level),
    Error(Arc<dyn Error + Send + Sync>),
    Json(serde_json::Value),
}

impl Value {
    /// Wrap an error so that it is recognised as an error value.
    pub fn error<E>(err: E) -> Self
    where
        E: Error + Send + Sync + 'static,
    {
        Value::Error(Arc::new(err))
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    /// `true` if this element is the string `key`.
    pub fn is_key(&self, key: &str) -> bool {
        self.as_str() == Some(key)
    }

    /// JSON rendering used by the JSON sink and by [`LogRecord`](crate::record::LogRecord).
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Value::Null => serde_json::Value::Null,
            Value::Bool(b) => serde_json::Value::from(*b),
            Value::Int(i) => serde_json::Value::from(*i),
            Value::UInt(u) => serde_json::Value::from(*u),
            Value::Float(f) => serde_json::Value::from(*f),
            Value::Str(s) => serde_json::Value::String(s.clone()),
            Value::Level(level) => serde_json::Value::String(level.name().to_string()),
            Value::Error(err) => serde_json::Value::String(err.to_string()),
            Value::Json(v) => v.clone(),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("null"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(i) => write!(f, "{}", i),
            Value::UInt(u) => write!(f, "{}", u),
            Value::Float(v) => write!(f, "{}", v),
            Value::Str(s) => f.write_str(s),
            Value::Level(level) => f.write_str(level.name()),
            Value::Error(err) => write!(f, "{}", err),
            Value::Json(v) => write!(f, "{}", v),
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::UInt(a), Value::UInt(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::Level(a), Value::Level(b)) => a == b,
            // errors have no identity beyond their message
            (Value::Error(a), Value::Error(b)) => a.to_string() == b.to_string(),
            (Value::Json(a), Value::Json(b)) => a == b,
            _ => false,
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}

impl From<&String> for Value {
    fn from(s: &String) -> Self {
        Value::Str(s.clone())
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

macro_rules! from_signed {
    ($($t:ty),*) => {
        $(impl From<$t> for Value {
            fn from(v: $t) -> Self {
                Value::Int(v as i64)
            }
        })*
    };
}

macro_rules! from_unsigned {
    ($($t:ty),*) => {
        $(impl From<$t> for Value {
            fn from(v: $t) -> Self {
                Value::UInt(v as u64)
            }
        })*
    };
}

from_signed!(i8, i16, i32, i64, isize);
from_unsigned!(u8, u16, u32, u64, usize);

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Value::Float(v as f64)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<Level> for Value {
    fn from(level: Level) -> Self {
        Value::Level(level)
    }
}

impl From<serde_json::Value> for Value {
    fn from(v: serde_json::Value) -> Self {
        Value::Json(v)
    }
}

impl From<Arc<dyn Error + Send + Sync>> for Value {
    fn from(err: Arc<dyn Error + Send + Sync>) -> Self {
        Value::Error(err)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(Value::Null)
    }
}

/// Build a key/value entry from anything convertible into [`Value`].
///
/// ```
/// use stackkit_logging::keyvals;
/// let entry = keyvals!["msg", "started", "port", 8080];
/// assert_eq!(entry.len(), 4);
/// ```
#[macro_export]
macro_rules! keyvals {
    () => {
        ::std::vec::Vec::<$crate::value::Value>::new()
    };
    ($($v:expr),+ $(,)?) => {
        ::std::vec![$($crate::value::Value::from($v)),+]
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, thiserror::Error)]
    #[error("boom")]
    struct Boom;

    #[test]
    fn keyvals_macro_converts_elements() {
        let entry = keyvals!["msg", "hi", "n", 3u16, "ok", true, "lvl", Level::Notice];
        assert_eq!(entry[1], Value::Str("hi".into()));
        assert_eq!(entry[3], Value::UInt(3));
        assert_eq!(entry[5], Value::Bool(true));
        assert_eq!(entry[7], Value::Level(Level::Notice));
    }

    #[test]
    fn error_values_render_their_message() {
        let v = Value::error(Boom);
        assert_eq!(v.to_json(), serde_json::json!("boom"));
        assert_eq!(v, Value::error(Boom));
        assert_eq!(v.to_string(), "boom");
    }

    #[test]
    fn only_strings_are_keys() {
        assert!(Value::from("severity").is_key("severity"));
        assert!(!Value::Level(Level::Info).is_key("info"));
        assert!(!Value::Json(serde_json::json!("severity")).is_key("severity"));
    }
}
