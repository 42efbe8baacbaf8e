//! Report sinks
//!
//! Where the dispatcher's per-event records end up. Reports are recorded by
//! the dispatcher's report workers, so a sink may be slow or do async I/O
//! without stalling the room.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::fs::File;
use tokio::io::{self, AsyncWrite, AsyncWriteExt};
use tokio::sync::{mpsc, Mutex};
use tracing::info;

use crate::config::ReportFormat;
use crate::error::ReportError;
use crate::message::Report;

/// Build the sink for a configured report format
///
/// JSON reports go to `path` when given, stderr otherwise. Stdout is left
/// to the interactive prompts.
pub async fn open_sink(
    format: ReportFormat,
    path: Option<&Path>,
) -> Result<Arc<dyn ReportSink>, ReportError> {
    let sink: Arc<dyn ReportSink> = match (format, path) {
        (ReportFormat::Log, _) => Arc::new(TracingSink),
        (ReportFormat::Json, Some(path)) => {
            Arc::new(JsonLinesSink::new(File::create(path).await?))
        }
        (ReportFormat::Json, None) => Arc::new(JsonLinesSink::new(io::stderr())),
    };
    Ok(sink)
}

/// Destination for processed room events
///
/// Called concurrently from several report workers; implementations do their
/// own synchronization.
#[async_trait]
pub trait ReportSink: Send + Sync + 'static {
    async fn record(&self, report: &Report) -> Result<(), ReportError>;
}

/// Logs each report as a line through `tracing`
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

#[async_trait]
impl ReportSink for TracingSink {
    async fn record(&self, report: &Report) -> Result<(), ReportError> {
        info!(
            target: "chat_registry::room",
            seq = report.seq(),
            kind = %report.kind(),
            user = report.username(),
            "{}",
            report
        );
        Ok(())
    }
}

/// Writes each report as one JSON object per line
///
/// Lines from concurrent report workers never interleave; their order does.
pub struct JsonLinesSink<W> {
    writer: Mutex<W>,
}

impl<W> JsonLinesSink<W>
where
    W: AsyncWrite + Unpin + Send + 'static,
{
    pub fn new(writer: W) -> Self {
        Self {
            writer: Mutex::new(writer),
        }
    }

    /// Take back the underlying writer
    pub fn into_inner(self) -> W {
        self.writer.into_inner()
    }
}

#[async_trait]
impl<W> ReportSink for JsonLinesSink<W>
where
    W: AsyncWrite + Unpin + Send + 'static,
{
    async fn record(&self, report: &Report) -> Result<(), ReportError> {
        let mut line = serde_json::to_vec(report)?;
        line.push(b'\n');

        let mut writer = self.writer.lock().await;
        writer.write_all(&line).await?;
        writer.flush().await?;
        Ok(())
    }
}

/// Forwards reports into an unbounded channel
///
/// Lets an embedding process (or a test) consume reports directly.
#[derive(Debug, Clone)]
pub struct ChannelSink {
    sender: mpsc::UnboundedSender<Report>,
}

impl ChannelSink {
    /// Create a sink together with the receiving end
    pub fn new() -> (Self, mpsc::UnboundedReceiver<Report>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self { sender }, receiver)
    }
}

#[async_trait]
impl ReportSink for ChannelSink {
    async fn record(&self, report: &Report) -> Result<(), ReportError> {
        self.sender
            .send(report.clone())
            .map_err(|_| ReportError::SinkClosed)
    }
}
