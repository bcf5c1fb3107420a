//! Writer side of the progress channel.

use tokio::sync::mpsc;
use tracing::debug;

use super::types::{ProgressEvent, Stage};

/// Creates a bounded progress channel.
///
/// The bound provides backpressure: when the consumer is slow, `emit` calls
/// wait rather than dropping events.
pub fn progress_channel(capacity: usize) -> (ProgressReporter, mpsc::Receiver<ProgressEvent>) {
    let (tx, rx) = mpsc::channel(capacity.max(1));
    (ProgressReporter::new(tx), rx)
}

/// Emits progress events for one request.
///
/// Once the receiving side is gone, further writes are skipped silently so
/// the pipeline can still run to completion and clean up.
#[derive(Debug)]
pub struct ProgressReporter {
    tx: mpsc::Sender<ProgressEvent>,
    stage: Stage,
    last_progress: u8,
    closed: bool,
}

impl ProgressReporter {
    pub fn new(tx: mpsc::Sender<ProgressEvent>) -> Self {
        Self {
            tx,
            stage: Stage::Init,
            last_progress: 0,
            closed: false,
        }
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn last_progress(&self) -> u8 {
        self.last_progress
    }

    /// Whether the consumer has gone away.
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Enters `stage` (or stays in it) and reports `message` at `progress`.
    pub async fn enter(&mut self, stage: Stage, message: impl Into<String>, progress: u8) {
        self.stage = stage;
        let progress = self.clamp(progress);
        let event = ProgressEvent::new(stage)
            .with_message(message)
            .with_progress(progress);
        self.send(event).await;
    }

    /// Moves progress within the current stage.
    pub async fn advance(&mut self, progress: u8, message: Option<String>) {
        let progress = self.clamp(progress);
        let mut event = ProgressEvent::new(self.stage).with_progress(progress);
        event.message = message;
        self.send(event).await;
    }

    /// Forwards one raw tool output line at the current progress.
    pub async fn log(&mut self, line: impl Into<String>) {
        let event = ProgressEvent::new(self.stage)
            .with_log(line)
            .with_progress(self.last_progress);
        self.send(event).await;
    }

    /// Terminal success event carrying the encoded archive.
    pub async fn complete(mut self, message: impl Into<String>, filename: String, data: String) {
        self.stage = Stage::Complete;
        let mut event = ProgressEvent::new(Stage::Complete)
            .with_message(message)
            .with_progress(100);
        event.filename = Some(filename);
        event.data = Some(data);
        self.send(event).await;
    }

    /// Terminal failure event.
    pub async fn fail(mut self, message: impl Into<String>) {
        let progress = self.last_progress;
        self.stage = Stage::Error;
        let event = ProgressEvent::new(Stage::Error)
            .with_message(message)
            .with_progress(progress);
        self.send(event).await;
    }

    fn clamp(&self, progress: u8) -> u8 {
        let (low, high) = self.stage.band();
        progress.clamp(low, high).max(self.last_progress)
    }

    async fn send(&mut self, event: ProgressEvent) {
        if let Some(progress) = event.progress {
            self.last_progress = progress;
        }
        if self.closed {
            return;
        }
        if self.tx.send(event).await.is_err() {
            debug!("Progress consumer went away, suppressing further events");
            self.closed = true;
        }
    }
}
