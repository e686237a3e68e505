use crate::logger::{with, Logger, WithLogger};
use crate::value::Value;
use std::collections::{BTreeMap, HashMap};

/// Request-scoped keys copied into log entries by [`with_context`].
pub const DEFAULT_KEYS: [&str; 3] = ["X-Request-Id", "X-Client-Id", "X-Subject-Id"];

/// Read access to request-scoped values.
pub trait ContextLookup {
    /// Value stored under `key`, `None` if absent or null.
    fn lookup(&self, key: &str) -> Option<Value>;
}

/// Owned per-request values, built as the request passes through
/// middleware.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RequestContext {
    values: HashMap<String, Value>,
}

impl RequestContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_value(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.values.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }
}

impl ContextLookup for RequestContext {
    fn lookup(&self, key: &str) -> Option<Value> {
        self.values.get(key).cloned()
    }
}

impl<V> ContextLookup for HashMap<String, V>
where
    V: Clone + Into<Value>,
{
    fn lookup(&self, key: &str) -> Option<Value> {
        self.get(key).cloned().map(Into::into)
    }
}

impl<V> ContextLookup for BTreeMap<String, V>
where
    V: Clone + Into<Value>,
{
    fn lookup(&self, key: &str) -> Option<Value> {
        self.get(key).cloned().map(Into::into)
    }
}

#[cfg(feature = "http")]
impl ContextLookup for http::HeaderMap {
    fn lookup(&self, key: &str) -> Option<Value> {
        self.get(key)
            .and_then(|v| v.to_str().ok())
            .map(Value::from)
    }
}

impl<C: ContextLookup + ?Sized> ContextLookup for &C {
    fn lookup(&self, key: &str) -> Option<Value> {
        (**self).lookup(key)
    }
}

/// Pairs for every key with a non-null value, in key order.
pub fn context_keyvals<C, K>(ctx: &C, keys: &[K]) -> Vec<Value>
where
    C: ContextLookup + ?Sized,
    K: AsRef<str>,
{
    let mut keyvals = Vec::with_capacity(keys.len() * 2);
    for key in keys {
        let key = key.as_ref();
        match ctx.lookup(key) {
            None | Some(Value::Null) => {}
            Some(value) => {
                keyvals.push(Value::from(key));
                keyvals.push(value);
            }
        }
    }
    keyvals
}

/// Logger carrying the [`DEFAULT_KEYS`] found in `ctx`.
pub fn with_context<L, C>(logger: L, ctx: &C) -> WithLogger<L>
where
    L: Logger,
    C: ContextLookup + ?Sized,
{
    with_context_keys(logger, ctx, &DEFAULT_KEYS)
}

/// Logger carrying the given keys found in `ctx`.
pub fn with_context_keys<L, C, K>(logger: L, ctx: &C, keys: &[K]) -> WithLogger<L>
where
    L: Logger,
    C: ContextLookup + ?Sized,
    K: AsRef<str>,
{
    with(logger, context_keyvals(ctx, keys))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keyvals;

    #[test]
    fn only_present_keys_are_copied() {
        let ctx = RequestContext::new().with_value("X-Request-Id", "r1");
        assert_eq!(context_keyvals(&ctx, &DEFAULT_KEYS), keyvals!["X-Request-Id", "r1"]);
    }

    #[test]
    fn key_order_follows_input() {
        let ctx = RequestContext::new()
            .with_value("X-Subject-Id", "s1")
            .with_value("X-Request-Id", "r1")
            .with_value("other", "ignored");
        assert_eq!(
            context_keyvals(&ctx, &DEFAULT_KEYS),
            keyvals!["X-Request-Id", "r1", "X-Subject-Id", "s1"]
        );
    }

    #[test]
    fn null_values_are_skipped() {
        let ctx = RequestContext::new().with_value("X-Client-Id", Value::Null);
        assert!(context_keyvals(&ctx, &DEFAULT_KEYS).is_empty());
    }

    #[test]
    fn maps_are_lookups() {
        let mut map = HashMap::new();
        map.insert("tenant".to_string(), 7u32);
        assert_eq!(context_keyvals(&map, &["tenant", "missing"]), keyvals!["tenant", 7u32]);
    }

    #[cfg(feature = "http")]
    #[test]
    fn header_map_lookup() {
        let mut headers = http::HeaderMap::new();
        headers.insert("x-request-id", http::HeaderValue::from_static("abc"));
        assert_eq!(context_keyvals(&headers, &DEFAULT_KEYS), keyvals!["X-Request-Id", "abc"]);
    }
}
