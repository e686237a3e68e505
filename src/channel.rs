use crate::error::LogError;
use crate::logger::Logger;
use crate::record::LogRecord;
use crate::sink::LogSink;
use crate::value::Value;
use std::error::Error;
use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc,
};
use tokio::sync::mpsc::{self, error::TrySendError};
use tokio::task::JoinHandle;
use tokio::time::{interval, sleep, Duration, MissedTickBehavior};

/// Buffering and batching settings for [`ChannelLogger`].
#[derive(Clone, Debug)]
pub struct ChannelConfig {
    /// Maximum number of records queued before new ones are dropped.
    pub buffer: usize,
    /// Records sent per batch.
    pub batch_size: usize,
    /// Maximum time a partial batch waits before it is sent.
    pub flush_interval: Duration,
    /// Retries of a failed batch before it is discarded.
    pub max_retries: u32,
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self {
            buffer: 1024,
            batch_size: 128,
            flush_interval: Duration::from_secs(1),
            max_retries: 5,
        }
    }
}

/// Non-blocking [`Logger`] that forwards entries to an asynchronous
/// [`LogSink`] through a bounded channel and a background task.
///
/// `log` never waits on the sink: when the channel is full the entry is
/// dropped and counted. Dropping every clone of the logger closes the
/// channel; the task then sends what is left and exits.
#[derive(Clone)]
pub struct ChannelLogger {
    sender: mpsc::Sender<LogRecord>,
    /// Entries accepted into the channel.
    pub enqueued: Arc<AtomicU64>,
    /// Entries dropped because the channel was full.
    pub dropped: Arc<AtomicU64>,
    /// Records the sink accepted.
    pub sent: Arc<AtomicU64>,
}

impl ChannelLogger {
    /// Create the logger and spawn its forwarding task on the current
    /// Tokio runtime.
    ///
    /// Minimal thresholds are enforced for `buffer`, `batch_size` and
    /// `flush_interval`.
    pub fn new(sink: Arc<dyn LogSink>, config: ChannelConfig) -> (Self, JoinHandle<()>) {
        let buffer = config.buffer.max(16);
        let batch_size = config.batch_size.max(1);
        let flush_interval = config.flush_interval.max(Duration::from_millis(10));
        let max_retries = config.max_retries;

        let (tx, mut rx) = mpsc::channel::<LogRecord>(buffer);

        let enqueued = Arc::new(AtomicU64::new(0));
        let dropped = Arc::new(AtomicU64::new(0));
        let sent = Arc::new(AtomicU64::new(0));
        let sent_bg = Arc::clone(&sent);

        let handle = tokio::spawn(async move {
            let mut batch = Vec::with_capacity(batch_size);
            let mut ticker = interval(flush_interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    received = rx.recv() => match received {
                        Some(record) => {
                            batch.push(record);
                            if batch.len() >= batch_size {
                                send_batch(&*sink, &mut batch, max_retries, &sent_bg).await;
                            }
                        }
                        None => {
                            if !batch.is_empty() {
                                send_batch(&*sink, &mut batch, max_retries, &sent_bg).await;
                            }
                            if let Err(e) = sink.flush().await {
                                tracing::warn!(target: "stackkit_logging::channel", error = %e, "log sink flush failed");
                            }
                            break;
                        }
                    },
                    _ = ticker.tick() => {
                        if !batch.is_empty() {
                            send_batch(&*sink, &mut batch, max_retries, &sent_bg).await;
                        }
                    }
                }
            }
        });

        (
            Self {
                sender: tx,
                enqueued,
                dropped,
                sent,
            },
            handle,
        )
    }
}

async fn send_batch(sink: &dyn LogSink, batch: &mut Vec<LogRecord>, max_retries: u32, sent: &AtomicU64) {
    let mut backoff = Duration::from_millis(100);
    let max_backoff = Duration::from_secs(10);
    let mut attempt = 0;

    loop {
        match send_all(sink, batch).await {
            Ok(()) => {
                sent.fetch_add(batch.len() as u64, Ordering::Relaxed);
                batch.clear();
                return;
            }
            Err(e) if attempt >= max_retries => {
                tracing::warn!(
                    target: "stackkit_logging::channel",
                    error = %e,
                    records = batch.len(),
                    "log sink failed, discarding batch"
                );
                batch.clear();
                return;
            }
            Err(e) => {
                tracing::debug!(
                    target: "stackkit_logging::channel",
                    error = %e,
                    ?backoff,
                    "log sink send failed, retrying"
                );
                attempt += 1;
                sleep(backoff).await;
                backoff = std::cmp::min(backoff * 2, max_backoff);
            }
        }
    }
}

async fn send_all(sink: &dyn LogSink, batch: &[LogRecord]) -> Result<(), Box<dyn Error + Send + Sync>> {
    for record in batch {
        sink.send(record).await?;
    }
    Ok(())
}

impl Logger for ChannelLogger {
    fn log(&self, keyvals: Vec<Value>) -> Result<(), LogError> {
        match self.sender.try_send(LogRecord::from_keyvals(&keyvals)) {
            Ok(()) => {
                self.enqueued.fetch_add(1, Ordering::Relaxed);
                Ok(())
            }
            Err(TrySendError::Full(_)) => {
                self.dropped.fetch_add(1, Ordering::Relaxed);
                Err(LogError::ChannelFull)
            }
            Err(TrySendError::Closed(_)) => Err(LogError::ChannelClosed),
        }
    }
}
