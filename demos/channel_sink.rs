use async_trait::async_trait;
use stackkit_logging::channel::{ChannelConfig, ChannelLogger};
use stackkit_logging::record::LogRecord;
use stackkit_logging::sink::LogSink;
use stackkit_logging::{keyvals, Logger, SeverityAware};
use std::sync::Arc;

/// Stand-in for a remote ingestion API.
struct PrintSink;

#[async_trait]
impl LogSink for PrintSink {
    async fn send(&self, record: &LogRecord) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        println!("{}", serde_json::to_string(record)?);
        Ok(())
    }
}

#[tokio::main]
async fn main() {
    let (channel, handle) = ChannelLogger::new(Arc::new(PrintSink), ChannelConfig::default());
    let logger = SeverityAware::new(channel);

    for i in 0..5 {
        if let Err(e) = logger.log(keyvals!["msg", "job finished", "job", i]) {
            eprintln!("dropped: {}", e);
        }
    }

    drop(logger);
    handle.await.expect("forwarding task");
}
