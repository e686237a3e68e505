use crate::error::LogError;
use crate::level::Level;
use crate::severity::SEVERITY_KEY;
use crate::value::Value;
use std::sync::Arc;

/// Destination for key/value log entries.
///
/// This is the single capability every decorator in the crate wraps:
/// consume an ordered `key, value, ...` sequence, perform the side effect
/// (write JSON, enqueue, drop) and report whether it worked.
pub trait Logger: Send + Sync {
    /// Log one entry.
    ///
    /// **Parameters**
    /// - `keyvals`: flat key/value sequence; may have odd length.
    ///
    /// **Returns**
    /// - `Ok(())` if the entry was accepted or intentionally dropped.
    /// - `Err(..)` if the underlying sink failed.
    fn log(&self, keyvals: Vec<Value>) -> Result<(), LogError>;

    /// Log one entry whose leading pairs must stay ahead of any context
    /// this logger adds.
    ///
    /// Context loggers override this so a prefix set further out lands in
    /// front of their own context; every other logger just concatenates.
    fn log_prefixed(&self, mut prefix: Vec<Value>, keyvals: Vec<Value>) -> Result<(), LogError> {
        prefix.extend(keyvals);
        self.log(prefix)
    }
}

impl<L: Logger + ?Sized> Logger for &L {
    fn log(&self, keyvals: Vec<Value>) -> Result<(), LogError> {
        (**self).log(keyvals)
    }

    fn log_prefixed(&self, prefix: Vec<Value>, keyvals: Vec<Value>) -> Result<(), LogError> {
        (**self).log_prefixed(prefix, keyvals)
    }
}

impl<L: Logger + ?Sized> Logger for Box<L> {
    fn log(&self, keyvals: Vec<Value>) -> Result<(), LogError> {
        (**self).log(keyvals)
    }

    fn log_prefixed(&self, prefix: Vec<Value>, keyvals: Vec<Value>) -> Result<(), LogError> {
        (**self).log_prefixed(prefix, keyvals)
    }
}

impl<L: Logger + ?Sized> Logger for Arc<L> {
    fn log(&self, keyvals: Vec<Value>) -> Result<(), LogError> {
        (**self).log(keyvals)
    }

    fn log_prefixed(&self, prefix: Vec<Value>, keyvals: Vec<Value>) -> Result<(), LogError> {
        (**self).log_prefixed(prefix, keyvals)
    }
}

/// Logger that places fixed pairs around the start of every entry.
///
/// Built by [`with`] and [`with_prefix`]. Each entry is laid out as
/// `prefix, context, call pairs`. Context loggers nested inside one another
/// behave as one: `with` pairs follow the inner context, `with_prefix` pairs
/// precede it.
#[derive(Clone)]
pub struct WithLogger<L> {
    inner: L,
    prefix: Vec<Value>,
    context: Vec<Value>,
}

impl<L: Logger> WithLogger<L> {
    pub fn new(inner: L, context: Vec<Value>) -> Self {
        Self { inner, prefix: Vec::new(), context }
    }

    /// Logger whose pairs go in front of any context `inner` already carries.
    pub fn prefixed(inner: L, prefix: Vec<Value>) -> Self {
        Self { inner, prefix, context: Vec::new() }
    }

    /// Pairs placed ahead of the inner logger's context.
    pub fn prefix(&self) -> &[Value] {
        &self.prefix
    }

    /// Pairs placed after the inner logger's context.
    pub fn context(&self) -> &[Value] {
        &self.context
    }

    /// Append more pairs after the existing context.
    pub fn with(mut self, keyvals: Vec<Value>) -> Self {
        self.context.extend(keyvals);
        self
    }

    /// Insert pairs before the existing context.
    pub fn with_prefix(mut self, mut keyvals: Vec<Value>) -> Self {
        keyvals.append(&mut self.prefix);
        self.prefix = keyvals;
        self
    }
}

impl<L: Logger> Logger for WithLogger<L> {
    fn log(&self, keyvals: Vec<Value>) -> Result<(), LogError> {
        self.log_prefixed(Vec::new(), keyvals)
    }

    fn log_prefixed(&self, mut prefix: Vec<Value>, keyvals: Vec<Value>) -> Result<(), LogError> {
        prefix.extend(self.prefix.iter().cloned());
        let mut rest = Vec::with_capacity(self.context.len() + keyvals.len());
        rest.extend(self.context.iter().cloned());
        rest.extend(keyvals);
        self.inner.log_prefixed(prefix, rest)
    }
}

/// Logger whose entries carry `keyvals` after any context `logger` has.
pub fn with<L: Logger>(logger: L, keyvals: Vec<Value>) -> WithLogger<L> {
    WithLogger::new(logger, keyvals)
}

/// Logger whose entries carry `keyvals` before any context `logger` has.
pub fn with_prefix<L: Logger>(logger: L, keyvals: Vec<Value>) -> WithLogger<L> {
    WithLogger::prefixed(logger, keyvals)
}

/// Logger that tags every entry with `severity=<level>`.
pub fn leveled<L: Logger>(logger: L, level: Level) -> WithLogger<L> {
    with_prefix(logger, vec![Value::from(SEVERITY_KEY), Value::Level(level)])
}

pub fn debug<L: Logger>(logger: L) -> WithLogger<L> {
    leveled(logger, Level::Debug)
}

pub fn info<L: Logger>(logger: L) -> WithLogger<L> {
    leveled(logger, Level::Info)
}

pub fn notice<L: Logger>(logger: L) -> WithLogger<L> {
    leveled(logger, Level::Notice)
}

pub fn warning<L: Logger>(logger: L) -> WithLogger<L> {
    leveled(logger, Level::Warning)
}

pub fn error<L: Logger>(logger: L) -> WithLogger<L> {
    leveled(logger, Level::Error)
}

pub fn critical<L: Logger>(logger: L) -> WithLogger<L> {
    leveled(logger, Level::Critical)
}

pub fn alert<L: Logger>(logger: L) -> WithLogger<L> {
    leveled(logger, Level::Alert)
}

pub fn emergency<L: Logger>(logger: L) -> WithLogger<L> {
    leveled(logger, Level::Emergency)
}

/// Logger that discards everything.
#[derive(Clone, Copy, Debug, Default)]
pub struct Discard;

impl Logger for Discard {
    fn log(&self, _keyvals: Vec<Value>) -> Result<(), LogError> {
        Ok(())
    }
}
