//! Testing utilities and mock stage implementations.
//!
//! Every external tool the pipeline drives has a mock here, so whole
//! pipeline runs can be exercised without any of the tools installed.
//!
//! # Example
//!
//! ```rust,ignore
//! use songbundle_core::testing::{MockAcquirer, MockArchiver, MockConverter, MockResolver};
//!
//! let acquirer = Arc::new(MockAcquirer::new());
//! acquirer.set_exit_failure("exit code 2").await;
//!
//! let pipeline = DownloadPipeline::new(config, resolver, acquirer.clone(), converter, archiver);
//! let outcome = pipeline.run(request, reporter).await;
//! assert_eq!(acquirer.call_count().await, 1);
//! ```

mod mock_acquirer;
mod mock_archiver;
mod mock_converter;
mod mock_resolver;

pub use mock_acquirer::{MockAcquirer, RecordedAcquisition};
pub use mock_archiver::MockArchiver;
pub use mock_converter::{MockConverter, RecordedConversion};
pub use mock_resolver::MockResolver;

/// Test fixtures and helper functions.
pub mod fixtures {
    use crate::progress::ProgressEvent;
    use tokio::sync::mpsc;

    /// Per-track output lines in the shape the acquisition tool prints.
    pub fn acquisition_track_lines(index: usize, title: &str) -> Vec<String> {
        vec![
            format!(" • [{:02} {}]", index, title),
            "   | ➤ Collating sources...".to_string(),
            "   |  ➤ [•] YouTube Music...[success, found 1 source]".to_string(),
            "   | [✓] Got album art".to_string(),
            "   | [✓] Got raw track file".to_string(),
            "   | [•] Post Processing...".to_string(),
            format!("     • [✓] {:02} {}", index, title),
        ]
    }

    /// Collects every event until the sending side is gone.
    pub async fn collect_events(mut rx: mpsc::Receiver<ProgressEvent>) -> Vec<ProgressEvent> {
        let mut events = Vec::new();
        while let Some(event) = rx.recv().await {
            events.push(event);
        }
        events
    }
}
