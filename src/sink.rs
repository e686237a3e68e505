use crate::record::LogRecord;
use async_trait::async_trait;
use std::error::Error;

/// Asynchronous destination for [`LogRecord`]s forwarded by a
/// [`ChannelLogger`](crate::channel::ChannelLogger).
///
/// Implementations transport records to a concrete backend (a log
/// ingestion API, a message queue, a file). The channel logger calls
/// `send` from its background task, never from the logging thread.
#[async_trait]
pub trait LogSink: Send + Sync {
    /// Send a single record to the backend.
    ///
    /// **Returns**
    /// - `Ok(())` if the backend accepted the record.
    /// - `Err(..)` if it failed; the channel logger retries the whole
    ///   batch with backoff.
    async fn send(&self, record: &LogRecord) -> Result<(), Box<dyn Error + Send + Sync>>;

    /// Flush buffered records, if the backend buffers. Default is a no-op.
    async fn flush(&self) -> Result<(), Box<dyn Error + Send + Sync>> {
        Ok(())
    }
}

/// A sink that drops all records.
///
/// Useful for measuring the overhead of the pipeline without any I/O.
#[derive(Clone, Default)]
pub struct NoopSink;

#[async_trait]
impl LogSink for NoopSink {
    async fn send(&self, _record: &LogRecord) -> Result<(), Box<dyn Error + Send + Sync>> {
        Ok(())
    }
}
