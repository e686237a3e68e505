mod common;

use common::{Capture, SharedBuffer};
use stackkit_logging::context::{with_context, with_context_keys, RequestContext, DEFAULT_KEYS};
use stackkit_logging::{keyvals, JsonLogger, Logger, Value};
use std::collections::BTreeMap;

#[test]
fn context_logging() {
    let buf = SharedBuffer::default();
    let ctx = RequestContext::new()
        .with_value("X-Request-Id", "req1")
        .with_value("X-Client-Id", "client1")
        .with_value("X-Subject-Id", "subject1");

    with_context(JsonLogger::new(buf.clone()), &ctx)
        .log(keyvals!["msg", "test"])
        .unwrap();

    let out = buf.contents();
    assert!(out.contains(r#""X-Request-Id":"req1""#));
    assert!(out.contains(r#""X-Client-Id":"client1""#));
    assert!(out.contains(r#""X-Subject-Id":"subject1""#));
}

#[test]
fn absent_keys_are_omitted() {
    let capture = Capture::default();
    let ctx = RequestContext::new().with_value("X-Request-Id", "r1");

    with_context(capture.clone(), &ctx).log(keyvals!["msg", "x"]).unwrap();
    assert_eq!(capture.entries()[0], keyvals!["X-Request-Id", "r1", "msg", "x"]);
}

#[test]
fn custom_keys_keep_their_order() {
    let capture = Capture::default();
    let mut ctx = BTreeMap::new();
    ctx.insert("tenant".to_string(), Value::from("acme"));
    ctx.insert("X-Request-Id".to_string(), Value::from("r9"));

    with_context_keys(&capture, &ctx, &["tenant", "region", "X-Request-Id"])
        .log(keyvals![])
        .unwrap();
    assert_eq!(capture.entries()[0], keyvals!["tenant", "acme", "X-Request-Id", "r9"]);
}

#[test]
fn empty_context_adds_nothing() {
    let capture = Capture::default();
    with_context(&capture, &RequestContext::new()).log(keyvals!["msg", "x"]).unwrap();
    assert_eq!(capture.entries()[0], keyvals!["msg", "x"]);
    assert_eq!(DEFAULT_KEYS.len(), 3);
}

#[cfg(feature = "http")]
#[test]
fn request_headers_as_context() {
    let capture = Capture::default();
    let req = http::Request::builder()
        .header("X-Client-Id", "mobile")
        .header("X-Request-Id", "abc-123")
        .body(())
        .unwrap();

    with_context(&capture, req.headers()).log(keyvals!["msg", "x"]).unwrap();
    assert_eq!(
        capture.entries()[0],
        keyvals!["X-Request-Id", "abc-123", "X-Client-Id", "mobile", "msg", "x"]
    );
}
