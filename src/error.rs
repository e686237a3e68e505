/// Error type returned by [`Logger`](crate::logger::Logger) implementations.
///
/// The decorators in this crate never produce errors of their own; they
/// pass through whatever the wrapped sink reports.
#[derive(thiserror::Error, Debug)]
pub enum LogError {
    #[error("failed to write log entry: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to serialize log entry: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("log channel full, entry dropped")]
    ChannelFull,

    #[error("log channel closed")]
    ChannelClosed,

    #[error("log sink failed: {0}")]
    Sink(String),

    #[error("failed to install global subscriber: {0}")]
    Subscriber(#[from] tracing::subscriber::SetGlobalDefaultError),
}
