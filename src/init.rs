use crate::context::{with_context_keys, ContextLookup, DEFAULT_KEYS};
use crate::env::{
    LOG_CONTEXT_KEYS_ENV, LOG_ERROR_KEY_ENV, LOG_LEVEL_ENV, LOG_SERVICE_NAME_ENV,
    LOG_SERVICE_VERSION_ENV,
};
use crate::error::LogError;
use crate::json::JsonLogger;
use crate::layer::KvLayer;
use crate::level::Level;
use crate::logger::{Logger, WithLogger};
use crate::report::{ErrorReporter, ServiceContext};
use crate::severity::{LevelFilter, SeverityAware, DEFAULT_ERROR_KEY};
use std::io::Write;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::Registry;

/// Configuration of the logging pipeline.
///
/// **Fields**
/// - `min_level`: entries below this severity are dropped.
/// - `error_key`: key whose value drives severity inference.
/// - `service`: identity attached to error reports.
/// - `context_keys`: request-scoped keys copied by [`Pipeline::for_request`].
#[derive(Clone, Debug, PartialEq)]
pub struct LoggingConfig {
    pub min_level: Level,
    pub error_key: String,
    pub service: ServiceContext,
    pub context_keys: Vec<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            min_level: Level::Info,
            error_key: DEFAULT_ERROR_KEY.to_string(),
            service: ServiceContext::default(),
            context_keys: DEFAULT_KEYS.iter().map(|k| k.to_string()).collect(),
        }
    }
}

impl LoggingConfig {
    /// Configuration from the `LOG_*` environment variables, with
    /// [`Default`] values for anything unset.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) over an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let or_default = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let context_keys = match lookup(LOG_CONTEXT_KEYS_ENV) {
            Some(raw) => raw
                .split(',')
                .map(str::trim)
                .filter(|k| !k.is_empty())
                .map(str::to_string)
                .collect(),
            None => defaults.context_keys,
        };

        Self {
            min_level: Level::from_name(&or_default(LOG_LEVEL_ENV, defaults.min_level.name())),
            error_key: or_default(LOG_ERROR_KEY_ENV, &defaults.error_key),
            service: ServiceContext::new(
                or_default(LOG_SERVICE_NAME_ENV, &defaults.service.service),
                or_default(LOG_SERVICE_VERSION_ENV, &defaults.service.version),
            ),
            context_keys,
        }
    }
}

/// Logger stack built by [`build_logger`]: severity inference in front of
/// the level filter in front of the JSON sink.
pub type PipelineLogger<W> = SeverityAware<LevelFilter<JsonLogger<W>>>;

/// A ready-to-use logger plus the matching error reporter.
pub struct Pipeline<W> {
    pub logger: PipelineLogger<W>,
    pub reporter: ErrorReporter,
    pub context_keys: Vec<String>,
}

impl<W: Write + Send> Pipeline<W> {
    /// Logger carrying the configured request-scoped keys found in `ctx`.
    pub fn for_request<C>(&self, ctx: &C) -> WithLogger<&PipelineLogger<W>>
    where
        C: ContextLookup + ?Sized,
    {
        with_context_keys(&self.logger, ctx, self.context_keys.as_slice())
    }
}

/// Build the logging pipeline writing JSON lines to `writer`.
///
/// Severity inference runs before filtering so entries without an explicit
/// severity are classified instead of dropped.
pub fn build_logger<W: Write + Send>(config: &LoggingConfig, writer: W) -> Pipeline<W> {
    let sink = JsonLogger::new(writer);
    let filtered = LevelFilter::new(sink, config.min_level);
    let logger = SeverityAware::with_error_key(filtered, config.error_key.clone());

    Pipeline {
        logger,
        reporter: ErrorReporter::new(config.service.clone()),
        context_keys: config.context_keys.clone(),
    }
}

/// Install a global `tracing` subscriber that forwards events to `logger`.
///
/// **Parameters**
/// - `logger`: receives one key/value entry per `tracing` event.
/// - `enable_stdout`: additionally print events with the `fmt` layer.
///
/// **Returns**
/// - `Err(LogError::Subscriber)` if a global subscriber is already set.
pub fn init_tracing<L: Logger + 'static>(logger: L, enable_stdout: bool) -> Result<(), LogError> {
    let layer = KvLayer::new(logger);

    if enable_stdout {
        let fmt_layer = tracing_subscriber::fmt::layer();
        let subscriber = Registry::default().with(layer).with(fmt_layer);
        tracing::subscriber::set_global_default(subscriber)?;
    } else {
        let subscriber = Registry::default().with(layer);
        tracing::subscriber::set_global_default(subscriber)?;
    }
    Ok(())
}
