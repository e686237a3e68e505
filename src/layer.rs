use crate::level::Level;
use crate::logger::Logger;
use crate::severity::SEVERITY_KEY;
use crate::value::Value;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::field::{Field, Visit};
use tracing::{Event, Subscriber};
use tracing_subscriber::layer::{Context, Layer};
use tracing_subscriber::registry::LookupSpan;

/// Events from this crate's own targets are never forwarded.
const INTERNAL_TARGET: &str = "stackkit_logging";

/// `tracing_subscriber` layer that turns `tracing` events into key/value
/// entries and hands them to a [`Logger`].
///
/// Each entry is `severity`, `msg` (if the event has a message), `target`
/// and then the event fields in recording order. Filtering is left to the
/// wrapped logger, typically a [`LevelFilter`](crate::severity::LevelFilter).
pub struct KvLayer<L> {
    logger: L,
    /// Entries the logger rejected with an error.
    pub failed_events: Arc<AtomicU64>,
}

impl<L: Logger> KvLayer<L> {
    pub fn new(logger: L) -> Self {
        Self {
            logger,
            failed_events: Arc::new(AtomicU64::new(0)),
        }
    }
}

/// Key/value entry for a `tracing` event.
pub fn event_keyvals(event: &Event<'_>) -> Vec<Value> {
    let meta = event.metadata();
    let mut fields = Vec::new();
    let mut message = None;
    event.record(&mut FieldVisitor {
        fields: &mut fields,
        message: &mut message,
    });

    let mut keyvals = Vec::with_capacity(fields.len() + 6);
    keyvals.push(Value::from(SEVERITY_KEY));
    keyvals.push(Value::Level(Level::from(*meta.level())));
    if let Some(message) = message {
        keyvals.push(Value::from("msg"));
        keyvals.push(Value::from(message));
    }
    keyvals.push(Value::from("target"));
    keyvals.push(Value::from(meta.target()));
    keyvals.extend(fields);
    keyvals
}

impl<S, L> Layer<S> for KvLayer<L>
where
    S: Subscriber + for<'span> LookupSpan<'span>,
    L: Logger + 'static,
{
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        if event.metadata().target().starts_with(INTERNAL_TARGET) {
            return;
        }
        if self.logger.log(event_keyvals(event)).is_err() {
            self.failed_events.fetch_add(1, Ordering::Relaxed);
        }
    }
}

struct FieldVisitor<'a> {
    fields: &'a mut Vec<Value>,
    message: &'a mut Option<String>,
}

impl FieldVisitor<'_> {
    fn push(&mut self, field: &Field, value: Value) {
        self.fields.push(Value::from(field.name()));
        self.fields.push(value);
    }
}

impl Visit for FieldVisitor<'_> {
    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            *self.message = Some(value.to_string());
        } else {
            self.push(field, Value::from(value));
        }
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        self.push(field, Value::Int(value));
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        self.push(field, Value::UInt(value));
    }

    fn record_f64(&mut self, field: &Field, value: f64) {
        self.push(field, Value::Float(value));
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        self.push(field, Value::Bool(value));
    }

    fn record_error(&mut self, field: &Field, value: &(dyn std::error::Error + 'static)) {
        // keep it an error value so severity inference still sees it
        self.push(field, Value::error(RecordedError(value.to_string())));
    }

    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        if field.name() == "message" {
            *self.message = Some(format!("{:?}", value));
        } else {
            self.push(field, Value::Str(format!("{:?}", value)));
        }
    }
}

#[derive(Debug)]
struct RecordedError(String);

impl std::fmt::Display for RecordedError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for RecordedError {}
