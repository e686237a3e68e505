use stackkit_logging::init::{build_logger, LoggingConfig};
use stackkit_logging::report::{with_http_request, with_status_code, with_subject};
use stackkit_logging::{keyvals, Logger, ServiceContext};
use std::io;

#[derive(Debug, thiserror::Error)]
#[error("inventory service unavailable")]
struct InventoryDown;

fn main() {
    let config = LoggingConfig {
        service: ServiceContext::new("checkout", env!("CARGO_PKG_VERSION")),
        ..LoggingConfig::from_env()
    };
    let pipeline = build_logger(&config, io::stdout());

    let req = http::Request::builder()
        .method("POST")
        .uri("https://shop.example/checkout")
        .header(http::header::USER_AGENT, "demo/1.0")
        .body(())
        .expect("valid request");

    pipeline
        .reporter
        .report(
            &pipeline.logger,
            &InventoryDown,
            &[with_http_request(&req), with_subject("user-42"), with_status_code(503)],
        )
        .expect("write report");

    pipeline
        .reporter
        .log_error(&pipeline.logger, &InventoryDown, &[with_subject("user-42")])
        .log(keyvals!["msg", "retry scheduled", "attempt", 2])
        .expect("write report");
}
