use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Severity of a log entry as understood by the cloud logging backend.
///
/// The set is closed and totally ordered from [`Level::Debug`] up to
/// [`Level::Emergency`]. Each level carries a single-bit rank so that
/// comparisons are plain integer comparisons.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Level {
    Debug,
    #[default]
    Info,
    Notice,
    Warning,
    Error,
    Critical,
    Alert,
    Emergency,
}

impl Level {
    /// All levels in ascending order.
    pub const ALL: [Level; 8] = [
        Level::Debug,
        Level::Info,
        Level::Notice,
        Level::Warning,
        Level::Error,
        Level::Critical,
        Level::Alert,
        Level::Emergency,
    ];

    /// Bit rank of the level, `1 << ordinal`.
    pub const fn rank(self) -> u8 {
        1 << (self as u8)
    }

    /// Canonical lowercase name.
    pub const fn name(self) -> &'static str {
        match self {
            Level::Debug => "debug",
            Level::Info => "info",
            Level::Notice => "notice",
            Level::Warning => "warning",
            Level::Error => "error",
            Level::Critical => "critical",
            Level::Alert => "alert",
            Level::Emergency => "emergency",
        }
    }

    /// Exact match on a canonical name, `None` for anything else.
    pub fn parse(name: &str) -> Option<Level> {
        Level::ALL.into_iter().find(|level| level.name() == name)
    }

    /// Level for `name`, falling back to [`Level::Info`] for unknown input.
    pub fn from_name(name: &str) -> Level {
        Level::parse(name).unwrap_or_default()
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl Serialize for Level {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

impl<'de> Deserialize<'de> for Level {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        Ok(Level::from_name(&name))
    }
}

impl From<tracing::Level> for Level {
    fn from(level: tracing::Level) -> Self {
        match level {
            tracing::Level::TRACE | tracing::Level::DEBUG => Level::Debug,
            tracing::Level::INFO => Level::Info,
            tracing::Level::WARN => Level::Warning,
            tracing::Level::ERROR => Level::Error,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_name_round_trips_canonical_names() {
        for level in Level::ALL {
            assert_eq!(Level::from_name(level.name()), level);
        }
    }

    #[test]
    fn default_is_info() {
        assert_eq!(Level::default(), Level::Info);
    }

    #[test]
    fn from_name_defaults_to_info() {
        assert_eq!(Level::from_name("invalid"), Level::Info);
        assert_eq!(Level::from_name(""), Level::Info);
        assert_eq!(Level::from_name("ERROR"), Level::Info);
    }

    #[test]
    fn ranks_are_single_bits_in_order() {
        assert_eq!(Level::Debug.rank(), 1);
        assert_eq!(Level::Emergency.rank(), 128);
        for pair in Level::ALL.windows(2) {
            assert!(pair[0] < pair[1]);
            assert!(pair[0].rank() < pair[1].rank());
        }
    }

    #[test]
    fn serializes_as_name() {
        let json = serde_json::to_string(&Level::Warning).unwrap();
        assert_eq!(json, "\"warning\"");
        let back: Level = serde_json::from_str("\"bogus\"").unwrap();
        assert_eq!(back, Level::Info);
    }
}
