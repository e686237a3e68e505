use stackkit_logging::context::{with_context, RequestContext};
use stackkit_logging::init::{init_tracing, LoggingConfig};
use stackkit_logging::logger::{debug, warning};
use stackkit_logging::{keyvals, JsonLogger, LevelFilter, Logger, SeverityAware};
use std::sync::Arc;

fn main() {
    let config = LoggingConfig::from_env();
    let logger = Arc::new(SeverityAware::with_error_key(
        LevelFilter::new(JsonLogger::stdout(), config.min_level),
        config.error_key.clone(),
    ));

    logger.log(keyvals!["msg", "service started"]).expect("log");
    logger.log(keyvals!["msg", "lookup failed", "error", "not found"]).expect("log");
    debug(&logger).log(keyvals!["msg", "dropped unless LOG_LEVEL=debug"]).expect("log");
    warning(&logger).log(keyvals!["msg", "disk almost full", "free_mb", 512]).expect("log");

    let ctx = RequestContext::new().with_value("X-Request-Id", "req-7f3a");
    with_context(&logger, &ctx).log(keyvals!["msg", "handled request"]).expect("log");

    init_tracing(Arc::clone(&logger), false).expect("install subscriber");
    tracing::info!(path = "/health", "tracing events use the same pipeline");
}
