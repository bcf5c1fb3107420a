//! Classification of acquisition tool output lines.
//!
//! Deriving progress from another tool's free-text output is inherently
//! fragile, so all marker matching lives behind [`LineClassifier`]. A change
//! in the tool's output format is a compatibility break and is caught by the
//! contract test against captured sample output.

use super::config::AcquisitionConfig;

/// What a single output line means for progress accounting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    /// One track finished downloading.
    TrackCompleted,
    /// Anything else.
    Other,
}

/// Decides whether a line reports a finished track.
pub trait LineClassifier: Send + Sync {
    fn classify(&self, line: &str) -> LineKind;
}

/// Substring based classifier.
///
/// A line is a completion when it contains the success marker and none of
/// the exclusion markers. When a line carries both, the exclusion wins.
#[derive(Debug, Clone)]
pub struct MarkerClassifier {
    success_marker: String,
    exclude_markers: Vec<String>,
}

impl MarkerClassifier {
    pub fn new(success_marker: impl Into<String>, exclude_markers: Vec<String>) -> Self {
        Self {
            success_marker: success_marker.into(),
            exclude_markers,
        }
    }

    pub fn from_config(config: &AcquisitionConfig) -> Self {
        Self::new(
            config.success_marker.clone(),
            config.exclude_markers.clone(),
        )
    }
}

impl Default for MarkerClassifier {
    fn default() -> Self {
        Self::from_config(&AcquisitionConfig::default())
    }
}

impl LineClassifier for MarkerClassifier {
    fn classify(&self, line: &str) -> LineKind {
        if !line.contains(&self.success_marker) {
            return LineKind::Other;
        }
        if self
            .exclude_markers
            .iter()
            .any(|marker| line.contains(marker.as_str()))
        {
            return LineKind::Other;
        }
        LineKind::TrackCompleted
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_markers() {
        let classifier = MarkerClassifier::default();
        assert_eq!(
            classifier.classify("   | [✓] Got raw track file"),
            LineKind::TrackCompleted
        );
        assert_eq!(classifier.classify("   | [✓] Got album art"), LineKind::Other);
        assert_eq!(
            classifier.classify("   | [✓] Writing metadata..."),
            LineKind::Other
        );
        assert_eq!(classifier.classify("   | ➤ Collating sources..."), LineKind::Other);
    }

    #[test]
    fn test_default_markers_ignore_track_summary_line() {
        let classifier = MarkerClassifier::default();
        assert_eq!(
            classifier.classify("     • [✓] 01 Blinding Lights"),
            LineKind::Other
        );
        assert_eq!(classifier.classify(" • [01 Blinding Lights]"), LineKind::Other);
    }

    #[test]
    fn test_exclusion_wins_on_ambiguous_line() {
        let classifier = MarkerClassifier::new("DONE", vec!["lookup".to_string()]);
        assert_eq!(classifier.classify("DONE track 1"), LineKind::TrackCompleted);
        assert_eq!(classifier.classify("DONE lookup track 1"), LineKind::Other);
    }

    #[test]
    fn test_no_exclusions() {
        let classifier = MarkerClassifier::new("ok:", Vec::new());
        assert_eq!(classifier.classify("ok: a"), LineKind::TrackCompleted);
        assert_eq!(classifier.classify("OK: a"), LineKind::Other);
    }
}
