//! Error reports in the shape expected by cloud error reporting.
//!
//! An [`ErrorReporter`] turns an error into the key/value pairs
//! `serviceContext`, `context`, `eventTime`, `message`, `error` and
//! `severity`, where `context` carries the reporting location and the
//! optional user and HTTP request details added by [`Enrichment`]s.
//!
//! The reporting location is the caller of [`ErrorReporter::report`] /
//! [`ErrorReporter::log_error`], tracked with `#[track_caller]` and
//! resolved by a [`CallerInfo`] provider. Nothing in here fails: missing
//! or unresolvable details degrade to empty or `"unknown"` values.

use crate::error::LogError;
use crate::level::Level;
use crate::logger::{with_prefix, Logger, WithLogger};
use crate::severity::SEVERITY_KEY;
use crate::value::Value;
use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::backtrace::Backtrace;
use std::fmt;
use std::panic::Location;
use std::sync::Arc;

/// Placeholder for unresolved file paths and function names.
pub const UNKNOWN: &str = "unknown";

/// Reported service name and version.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceContext {
    pub service: String,
    pub version: String,
}

impl ServiceContext {
    pub fn new(service: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            service: service.into(),
            version: version.into(),
        }
    }
}

impl Default for ServiceContext {
    fn default() -> Self {
        Self::new("unset", "none")
    }
}

/// HTTP request details attached to a report.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HttpRequest {
    pub method: String,
    pub url: String,
    pub user_agent: String,
    pub referrer: String,
    pub response_status_code: u16,
    pub remote_ip: String,
}

#[cfg(feature = "http")]
impl HttpRequest {
    /// Request details taken from an `http::Request`.
    ///
    /// The remote address is read from a `SocketAddr` request extension,
    /// as inserted by most servers' connection-info middleware. The
    /// response status is left at zero.
    pub fn from_request<B>(req: &http::Request<B>) -> Self {
        let header = |name: http::header::HeaderName| {
            req.headers()
                .get(name)
                .and_then(|v| v.to_str().ok())
                .unwrap_or_default()
                .to_string()
        };

        Self {
            method: req.method().to_string(),
            url: req.uri().to_string(),
            user_agent: header(http::header::USER_AGENT),
            referrer: header(http::header::REFERER),
            response_status_code: 0,
            remote_ip: req
                .extensions()
                .get::<std::net::SocketAddr>()
                .map(|addr| addr.to_string())
                .unwrap_or_default(),
        }
    }
}

/// Source location of the code that reported an error.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportLocation {
    pub file_path: String,
    pub line_number: i64,
    pub function_name: String,
}

impl ReportLocation {
    /// Location from `path:line` frame text; see [`parse_file_line`].
    pub fn parse(frame: &str, function_name: impl Into<String>) -> Self {
        let (file_path, line_number) = parse_file_line(frame);
        Self {
            file_path,
            line_number,
            function_name: function_name.into(),
        }
    }
}

/// Split `path:line` at the last colon.
///
/// Text without a colon yields `("unknown", -1)`; a line part that is not
/// a number keeps the path and yields `-1`.
pub fn parse_file_line(frame: &str) -> (String, i64) {
    match frame.rsplit_once(':') {
        Some((path, line)) if !path.is_empty() => (path.to_string(), line.trim().parse().unwrap_or(-1)),
        _ => (UNKNOWN.to_string(), -1),
    }
}

/// The `context` object of an error report.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorContext {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub user: String,
    pub report_location: ReportLocation,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub http_request: Option<HttpRequest>,
}

/// Optional transform adding details to an [`ErrorContext`].
///
/// Enrichments are applied in the order given to the reporter.
#[derive(Clone)]
pub enum Enrichment {
    /// Sets `context.user`.
    Subject(String),
    /// Sets the request fields of `context.httpRequest`, keeping any
    /// status code set before.
    HttpRequest(HttpRequest),
    /// Sets `context.httpRequest.responseStatusCode`.
    StatusCode(u16),
    Custom(Arc<dyn Fn(ErrorContext) -> ErrorContext + Send + Sync>),
}

impl Enrichment {
    pub fn apply(&self, mut ctx: ErrorContext) -> ErrorContext {
        match self {
            Enrichment::Subject(subject) => {
                ctx.user = subject.clone();
                ctx
            }
            Enrichment::HttpRequest(req) => {
                let http = ctx.http_request.get_or_insert_with(HttpRequest::default);
                http.method = req.method.clone();
                http.url = req.url.clone();
                http.user_agent = req.user_agent.clone();
                http.referrer = req.referrer.clone();
                http.remote_ip = req.remote_ip.clone();
                ctx
            }
            Enrichment::StatusCode(status) => {
                ctx.http_request.get_or_insert_with(HttpRequest::default).response_status_code = *status;
                ctx
            }
            Enrichment::Custom(f) => f(ctx),
        }
    }
}

impl fmt::Debug for Enrichment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Enrichment::Subject(s) => f.debug_tuple("Subject").field(s).finish(),
            Enrichment::HttpRequest(r) => f.debug_tuple("HttpRequest").field(r).finish(),
            Enrichment::StatusCode(c) => f.debug_tuple("StatusCode").field(c).finish(),
            Enrichment::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

pub fn with_subject(subject_id: impl Into<String>) -> Enrichment {
    Enrichment::Subject(subject_id.into())
}

#[cfg(feature = "http")]
pub fn with_http_request<B>(req: &http::Request<B>) -> Enrichment {
    Enrichment::HttpRequest(HttpRequest::from_request(req))
}

pub fn with_status_code(status: u16) -> Enrichment {
    Enrichment::StatusCode(status)
}

/// Caller details captured when a report is built.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CapturedCaller {
    pub location: ReportLocation,
    /// Stack trace text, reported as the `message` field.
    pub stack: String,
}

/// Resolves the tracked caller location into report details.
pub trait CallerInfo: Send + Sync {
    fn capture(&self, caller: &Location<'_>) -> CapturedCaller;
}

/// Default [`CallerInfo`]: file and line from the tracked location, the
/// function name from the matching frame of a captured backtrace.
#[derive(Clone, Copy, Debug, Default)]
pub struct StackCaller;

impl CallerInfo for StackCaller {
    fn capture(&self, caller: &Location<'_>) -> CapturedCaller {
        let stack = Backtrace::force_capture().to_string();
        let function_name = function_at(&stack, caller.file(), caller.line()).unwrap_or_else(|| {
            tracing::debug!(
                target: "stackkit_logging::report",
                file = caller.file(),
                line = caller.line(),
                "could not resolve reporting function"
            );
            UNKNOWN.to_string()
        });

        CapturedCaller {
            location: ReportLocation {
                file_path: caller.file().to_string(),
                line_number: i64::from(caller.line()),
                function_name,
            },
            stack,
        }
    }
}

/// [`CallerInfo`] returning the same details for every report.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FixedCaller(pub CapturedCaller);

impl FixedCaller {
    pub fn new(location: ReportLocation, stack: impl Into<String>) -> Self {
        Self(CapturedCaller {
            location,
            stack: stack.into(),
        })
    }
}

impl CallerInfo for FixedCaller {
    fn capture(&self, _caller: &Location<'_>) -> CapturedCaller {
        self.0.clone()
    }
}

/// Name of the function whose frame in `stack` is at `file:line`.
///
/// `stack` is the text rendering of a [`Backtrace`]: symbol lines, each
/// optionally followed by an `at path:line:col` line. The returned name
/// is the last path segment with closure segments and hash suffix removed.
pub fn function_at(stack: &str, file: &str, line: u32) -> Option<String> {
    let mut symbol: Option<&str> = None;
    for text in stack.lines().map(str::trim) {
        if let Some(at) = text.strip_prefix("at ") {
            let Some(sym) = symbol else { continue };
            let without_column = at.rsplit_once(':').map_or(at, |(rest, _)| rest);
            let (path, frame_line) = parse_file_line(without_column);
            if frame_line == i64::from(line) && same_file(&path, file) {
                return short_name(sym);
            }
        } else if !text.is_empty() {
            symbol = Some(match text.split_once(": ") {
                Some((index, sym)) if index.chars().all(|c| c.is_ascii_digit()) => sym,
                _ => text,
            });
        }
    }
    None
}

fn same_file(frame_path: &str, file: &str) -> bool {
    let frame_path = frame_path.trim_start_matches("./");
    let file = file.trim_start_matches("./");
    frame_path == file
        || frame_path.ends_with(&format!("/{}", file))
        || file.ends_with(&format!("/{}", frame_path))
}

fn short_name(symbol: &str) -> Option<String> {
    let symbol = match symbol.rsplit_once("::h") {
        Some((head, hash)) if hash.len() == 16 && hash.chars().all(|c| c.is_ascii_hexdigit()) => head,
        _ => symbol,
    };
    symbol
        .split("::")
        .filter(|segment| !segment.is_empty() && *segment != "{{closure}}")
        .last()
        .map(str::to_string)
}

#[derive(Debug)]
struct ReportedError(String);

impl fmt::Display for ReportedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for ReportedError {}

/// Builds error reports for one service.
#[derive(Clone)]
pub struct ErrorReporter {
    service: ServiceContext,
    caller: Arc<dyn CallerInfo>,
}

impl ErrorReporter {
    pub fn new(service: ServiceContext) -> Self {
        Self {
            service,
            caller: Arc::new(StackCaller),
        }
    }

    /// Replace the [`CallerInfo`] provider, e.g. with a [`FixedCaller`].
    pub fn with_caller_info(mut self, caller: Arc<dyn CallerInfo>) -> Self {
        self.caller = caller;
        self
    }

    pub fn service(&self) -> &ServiceContext {
        &self.service
    }

    /// Log an error report for `err` directly to `logger`.
    ///
    /// **Parameters**
    /// - `logger`: sink receiving the report pairs.
    /// - `err`: the reported error; its display text becomes `error`.
    /// - `enrichments`: applied in order to the report context.
    ///
    /// **Returns**
    /// - whatever `logger` returns; reporting itself never fails.
    #[track_caller]
    pub fn report<L, E>(&self, logger: &L, err: &E, enrichments: &[Enrichment]) -> Result<(), LogError>
    where
        L: Logger + ?Sized,
        E: std::error::Error + ?Sized,
    {
        logger.log(self.entry(err, enrichments))
    }

    /// Like [`report`](Self::report), but returns a logger that prefixes
    /// the report to every entry so callers can add their own pairs.
    #[track_caller]
    pub fn log_error<L, E>(&self, logger: L, err: &E, enrichments: &[Enrichment]) -> WithLogger<L>
    where
        L: Logger,
        E: std::error::Error + ?Sized,
    {
        with_prefix(logger, self.entry(err, enrichments))
    }

    /// The report context alone, with the caller's location.
    #[track_caller]
    pub fn context(&self, enrichments: &[Enrichment]) -> ErrorContext {
        self.build_context(Location::caller(), enrichments).0
    }

    #[track_caller]
    fn entry<E>(&self, err: &E, enrichments: &[Enrichment]) -> Vec<Value>
    where
        E: std::error::Error + ?Sized,
    {
        let (ctx, stack) = self.build_context(Location::caller(), enrichments);

        vec![
            Value::from("serviceContext"),
            Value::Json(serde_json::to_value(&self.service).unwrap_or_default()),
            Value::from("context"),
            Value::Json(serde_json::to_value(&ctx).unwrap_or_default()),
            Value::from("eventTime"),
            Value::from(Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true)),
            Value::from("message"),
            Value::from(stack),
            Value::from("error"),
            Value::error(ReportedError(err.to_string())),
            Value::from(SEVERITY_KEY),
            Value::Level(Level::Error),
        ]
    }

    fn build_context(&self, caller: &Location<'_>, enrichments: &[Enrichment]) -> (ErrorContext, String) {
        let captured = self.caller.capture(caller);
        let ctx = ErrorContext {
            report_location: captured.location,
            ..ErrorContext::default()
        };
        let ctx = enrichments.iter().fold(ctx, |ctx, enrichment| enrichment.apply(ctx));
        (ctx, captured.stack)
    }
}

impl Default for ErrorReporter {
    fn default() -> Self {
        Self::new(ServiceContext::default())
    }
}

impl fmt::Debug for ErrorReporter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ErrorReporter").field("service", &self.service).finish_non_exhaustive()
    }
}
