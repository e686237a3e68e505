#![cfg(feature = "http")]

mod common;

use common::{Broken, Capture, SharedBuffer};
use stackkit_logging::report::{
    with_http_request, with_status_code, with_subject, FixedCaller, ReportLocation,
};
use stackkit_logging::logger;
use stackkit_logging::{keyvals, ErrorReporter, JsonLogger, Level, LogError, Logger, ServiceContext, Value};
use std::net::SocketAddr;
use std::sync::Arc;

#[derive(Debug, thiserror::Error)]
#[error("Failure")]
struct Failure;

fn reporter() -> ErrorReporter {
    ErrorReporter::new(ServiceContext::new("Test", "0.1"))
}

fn failing_request() -> http::Request<()> {
    http::Request::builder()
        .method(http::Method::GET)
        .uri("http://failing.service/orders?id=7")
        .header(http::header::USER_AGENT, "curl/8.4")
        .header(http::header::REFERER, "http://shop.example/cart")
        .extension("10.0.0.7:51234".parse::<SocketAddr>().unwrap())
        .body(())
        .unwrap()
}

fn assert_location(entry: &serde_json::Value, line: u32, function: &str) {
    let rl = &entry["context"]["reportLocation"];
    assert_eq!(rl["filePath"], file!());
    assert_eq!(rl["lineNumber"], i64::from(line));
    assert_eq!(rl["functionName"], function);
}

#[test]
fn report_error() {
    let buf = SharedBuffer::default();
    let logger = JsonLogger::new(buf.clone());
    let req = failing_request();

    reporter().report(&logger, &Failure, &[with_http_request(&req), with_subject("testSubject"), with_status_code(500)]).unwrap();
    let line = line!() - 1;

    let entries = buf.entries();
    assert_eq!(entries.len(), 1);
    let entry = &entries[0];

    assert_eq!(entry["serviceContext"]["service"], "Test");
    assert_eq!(entry["serviceContext"]["version"], "0.1");
    assert_eq!(entry["context"]["user"], "testSubject");
    assert_location(entry, line, "report_error");

    let hr = &entry["context"]["httpRequest"];
    assert_eq!(hr["method"], "GET");
    assert_eq!(hr["url"], "http://failing.service/orders?id=7");
    assert_eq!(hr["userAgent"], "curl/8.4");
    assert_eq!(hr["referrer"], "http://shop.example/cart");
    assert_eq!(hr["responseStatusCode"], 500);
    assert_eq!(hr["remoteIp"], "10.0.0.7:51234");

    assert_eq!(entry["error"], "Failure");
    assert_eq!(entry["severity"], "error");
    assert!(entry["message"].is_string());
    let event_time = entry["eventTime"].as_str().unwrap();
    assert!(chrono::DateTime::parse_from_rfc3339(event_time).is_ok());
}

#[test]
fn log_error_accepts_extra_pairs() {
    let buf = SharedBuffer::default();
    let logger = JsonLogger::new(buf.clone());
    let req = failing_request();

    reporter().log_error(&logger, &Failure, &[with_http_request(&req), with_subject("testSubject")]).log(keyvals!["msg", "testVal"]).unwrap();
    let line = line!() - 1;

    let entries = buf.entries();

    let entry = &entries[0];
    assert_eq!(entry["serviceContext"]["service"], "Test");
    assert_eq!(entry["context"]["user"], "testSubject");
    assert_eq!(entry["context"]["httpRequest"]["method"], "GET");
    assert_eq!(entry["msg"], "testVal");
    assert_location(entry, line, "log_error_accepts_extra_pairs");
}

#[test]
fn minimal_error_log() {
    let buf = SharedBuffer::default();
    let logger = JsonLogger::new(buf.clone());

    reporter().log_error(&logger, &Failure, &[]).log(keyvals!["msg", "testVal"]).unwrap();
    let line = line!() - 1;

    let entries = buf.entries();

    let entry = &entries[0];
    let ctx = entry["context"].as_object().unwrap();
    assert!(!ctx.contains_key("user"));
    assert!(!ctx.contains_key("httpRequest"));
    assert_eq!(entry["msg"], "testVal");
    assert_location(entry, line, "minimal_error_log");
}

#[test]
fn default_service_identity() {
    let buf = SharedBuffer::default();
    ErrorReporter::default().report(&JsonLogger::new(buf.clone()), &Failure, &[]).unwrap();

    let entries = buf.entries();

    let entry = &entries[0];
    assert_eq!(entry["serviceContext"], serde_json::json!({"service": "unset", "version": "none"}));
}

#[test]
fn report_keys_in_fixed_order() {
    let capture = Capture::default();
    let location = ReportLocation::parse("src/worker.rs:88", "drain");
    let reporter = reporter().with_caller_info(Arc::new(FixedCaller::new(location, "stack text")));

    reporter.report(&capture, &Failure, &[with_subject("s")]).unwrap();

    let entries = capture.entries();

    let entry = &entries[0];
    let keys: Vec<&str> = entry.iter().step_by(2).filter_map(Value::as_str).collect();
    assert_eq!(keys, ["serviceContext", "context", "eventTime", "message", "error", "severity"]);
    assert_eq!(entry[7], Value::from("stack text"));
    assert!(matches!(entry[9], Value::Error(_)));
    assert_eq!(entry[11], Value::Level(Level::Error));
    assert_eq!(
        entry[3],
        Value::Json(serde_json::json!({
            "user": "s",
            "reportLocation": {"filePath": "src/worker.rs", "lineNumber": 88, "functionName": "drain"}
        }))
    );
}

#[test]
fn log_error_goes_before_existing_context() {
    let capture = Capture::default();
    let location = ReportLocation::parse("src/worker.rs:88", "drain");
    let reporter = reporter().with_caller_info(Arc::new(FixedCaller::new(location, "stack text")));
    let scoped = logger::with(&capture, keyvals!["X-Request-Id", "r-17"]);

    reporter.log_error(&scoped, &Failure, &[]).log(keyvals!["msg", "x"]).unwrap();

    let entries = capture.entries();
    let keys: Vec<&str> = entries[0].iter().step_by(2).filter_map(Value::as_str).collect();
    assert_eq!(
        keys,
        ["serviceContext", "context", "eventTime", "message", "error", "severity", "X-Request-Id", "msg"]
    );
}

#[test]
fn status_code_without_request_creates_http_context() {
    let buf = SharedBuffer::default();
    reporter().report(&JsonLogger::new(buf.clone()), &Failure, &[with_status_code(404)]).unwrap();

    let entries = buf.entries();
    let hr = &entries[0]["context"]["httpRequest"];
    assert_eq!(hr["responseStatusCode"], 404);
    assert_eq!(hr["method"], "");
}

#[test]
fn boxed_errors_can_be_reported() {
    let capture = Capture::default();
    let err: Box<dyn std::error::Error + Send + Sync> = "connection reset".into();
    reporter().report(&capture, err.as_ref(), &[]).unwrap();
    assert_eq!(capture.entries()[0][9].to_string(), "connection reset");
}

#[test]
fn sink_failure_is_returned() {
    let err = reporter().report(&Broken, &Failure, &[]).unwrap_err();
    assert!(matches!(err, LogError::Sink(_)));
}
