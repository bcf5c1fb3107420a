//! Completion accounting for the download stage.

use std::sync::Arc;

use super::classifier::{LineClassifier, LineKind};
use crate::process::{strip_ansi, OutputLine, OutputSource};
use crate::progress::{band_position, ProgressReporter, Stage};

/// Counts completed tracks against the expected total.
///
/// The count only ever grows and never exceeds the expected total, so the
/// derived progress is monotonic and stays within the download band.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompletionCounter {
    completed: usize,
    units: usize,
}

impl CompletionCounter {
    pub fn new(units: usize) -> Self {
        Self {
            completed: 0,
            units,
        }
    }

    /// Records one completion. Returns false when already at the cap.
    pub fn record(&mut self) -> bool {
        if self.completed >= self.units {
            return false;
        }
        self.completed += 1;
        true
    }

    pub fn completed(&self) -> usize {
        self.completed
    }

    pub fn units(&self) -> usize {
        self.units
    }

    /// Current position inside the download band.
    pub fn progress(&self) -> u8 {
        band_position(Stage::Download, self.completed, self.units)
    }
}

/// Feeds tool output through a classifier and reports progress.
pub struct AcquisitionTracker {
    classifier: Arc<dyn LineClassifier>,
    counter: CompletionCounter,
}

impl AcquisitionTracker {
    pub fn new(classifier: Arc<dyn LineClassifier>, units: usize) -> Self {
        Self {
            classifier,
            counter: CompletionCounter::new(units),
        }
    }

    pub fn counter(&self) -> CompletionCounter {
        self.counter
    }

    /// Handles one output line.
    ///
    /// Every line is forwarded verbatim as a log event. Only stdout lines
    /// are classified, after escape sequences are stripped.
    pub async fn observe(&mut self, line: &OutputLine, reporter: &mut ProgressReporter) {
        reporter.log(line.text.clone()).await;

        if line.source != OutputSource::Stdout {
            return;
        }
        let kind = self.classifier.classify(&strip_ansi(&line.text));
        if kind == LineKind::TrackCompleted && self.counter.record() {
            let message = format!(
                "Downloaded {} of {} tracks",
                self.counter.completed(),
                self.counter.units()
            );
            reporter.advance(self.counter.progress(), Some(message)).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::acquisition::MarkerClassifier;
    use crate::progress::{progress_channel, ProgressEvent};
    use tokio::sync::mpsc;

    fn stdout(text: &str) -> OutputLine {
        OutputLine {
            source: OutputSource::Stdout,
            text: text.to_string(),
        }
    }

    fn drain(rx: &mut mpsc::Receiver<ProgressEvent>) -> Vec<ProgressEvent> {
        let mut events = Vec::new();
        while let Ok(event) = rx.try_recv() {
            events.push(event);
        }
        events
    }

    #[test]
    fn test_counter_is_capped() {
        let mut counter = CompletionCounter::new(2);
        assert_eq!(counter.progress(), 15);
        assert!(counter.record());
        assert_eq!(counter.progress(), 47);
        assert!(counter.record());
        assert_eq!(counter.progress(), 80);
        assert!(!counter.record());
        assert_eq!(counter.completed(), 2);
        assert_eq!(counter.progress(), 80);
    }

    #[test]
    fn test_counter_with_zero_units() {
        let mut counter = CompletionCounter::new(0);
        assert!(!counter.record());
        assert_eq!(counter.progress(), 15);
    }

    #[tokio::test]
    async fn test_observe_counts_only_completions() {
        let (mut reporter, mut rx) = progress_channel(64);
        reporter.enter(Stage::Download, "Downloading", 15).await;
        let mut tracker = AcquisitionTracker::new(Arc::new(MarkerClassifier::default()), 2);

        tracker.observe(&stdout(" • [01 Song]"), &mut reporter).await;
        tracker.observe(&stdout("   | [✓] Got album art"), &mut reporter).await;
        tracker
            .observe(&stdout("   | [✓] Got raw track file"), &mut reporter)
            .await;

        assert_eq!(tracker.counter().completed(), 1);
        let events = drain(&mut rx);
        // enter + three logs + one advance
        assert_eq!(events.len(), 5);
        assert_eq!(events[4].progress, Some(47));
        assert_eq!(events[4].message.as_deref(), Some("Downloaded 1 of 2 tracks"));
    }

    #[tokio::test]
    async fn test_observe_strips_ansi_before_classifying() {
        let (mut reporter, mut rx) = progress_channel(64);
        reporter.enter(Stage::Download, "Downloading", 15).await;
        let mut tracker = AcquisitionTracker::new(Arc::new(MarkerClassifier::default()), 1);

        let colored = "   | \x1b[32m[✓]\x1b[39m Got raw track file";
        tracker.observe(&stdout(colored), &mut reporter).await;

        assert_eq!(tracker.counter().completed(), 1);
        let events = drain(&mut rx);
        assert_eq!(events[1].log.as_deref(), Some(colored));
    }

    #[tokio::test]
    async fn test_stderr_lines_are_logged_not_counted() {
        let (mut reporter, mut rx) = progress_channel(64);
        reporter.enter(Stage::Download, "Downloading", 15).await;
        let mut tracker = AcquisitionTracker::new(Arc::new(MarkerClassifier::default()), 1);

        let line = OutputLine {
            source: OutputSource::Stderr,
            text: "[✓] Got raw track file".to_string(),
        };
        tracker.observe(&line, &mut reporter).await;

        assert_eq!(tracker.counter().completed(), 0);
        assert_eq!(drain(&mut rx).len(), 2);
    }

    #[tokio::test]
    async fn test_excess_completions_do_not_emit() {
        let (mut reporter, mut rx) = progress_channel(64);
        reporter.enter(Stage::Download, "Downloading", 15).await;
        let mut tracker = AcquisitionTracker::new(Arc::new(MarkerClassifier::default()), 1);

        for _ in 0..3 {
            tracker
                .observe(&stdout("[✓] Got raw track file"), &mut reporter)
                .await;
        }

        let events = drain(&mut rx);
        let advances: Vec<_> = events.iter().filter(|e| e.message.is_some()).collect();
        // enter + the single capped advance
        assert_eq!(advances.len(), 2);
        assert!(events.iter().all(|e| e.progress.unwrap_or(0) <= 80));
    }
}
