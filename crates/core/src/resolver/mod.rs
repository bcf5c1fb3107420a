//! Query to identifier resolution.
//!
//! Free-text song queries are handed to an external resolver which writes
//! one addressable identifier per line into a fixed-named file inside the
//! working area. The resolver's own progress is not observable, so the
//! whole stage is treated as atomic from a progress standpoint; its output
//! is only forwarded as log lines.

mod command;
mod config;

pub use command::CommandResolver;
pub use config::ResolverConfig;

use async_trait::async_trait;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::progress::ProgressReporter;
use crate::workarea::WorkingArea;

/// Marker the resolver writes for queries it could not match.
const NOT_FOUND_MARKER: &str = "# NOT FOUND";

/// Errors from the resolution stage.
#[derive(Debug, Error)]
pub enum ResolverError {
    #[error("failed to start {program}: {source}")]
    Spawn { program: String, source: io::Error },

    #[error("{program} failed with {status}")]
    Failed { program: String, status: String },

    #[error("resolver output {path} could not be read: {source}")]
    MissingOutput { path: PathBuf, source: io::Error },

    #[error("none of the {queries} songs could be resolved")]
    NoIdentifiers { queries: usize },

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// The resolved identifier file and what it contains.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedList {
    pub path: PathBuf,
    /// Usable identifier lines; the new unit count.
    pub identifiers: usize,
    /// Queries the resolver reported as not found.
    pub not_found: usize,
}

impl ResolvedList {
    /// Summary line for the stage message.
    pub fn summary(&self, queries: usize) -> String {
        if self.not_found == 0 {
            format!("Resolved {} of {} songs", self.identifiers, queries)
        } else {
            format!(
                "Resolved {} of {} songs ({} not found)",
                self.identifiers, queries, self.not_found
            )
        }
    }
}

/// Counts of usable identifiers and not-found markers in resolver output.
///
/// Blank lines and `#` comments are ignored when counting identifiers.
pub fn count_identifiers(contents: &str) -> (usize, usize) {
    let mut identifiers = 0;
    let mut not_found = 0;
    for line in contents.lines().map(str::trim) {
        if line.is_empty() {
            continue;
        }
        if line.starts_with('#') {
            if line.starts_with(NOT_FOUND_MARKER) {
                not_found += 1;
            }
            continue;
        }
        identifiers += 1;
    }
    (identifiers, not_found)
}

/// Turns free-text queries into addressable identifiers.
#[async_trait]
pub trait Resolver: Send + Sync {
    /// Returns the name of this resolver implementation.
    fn name(&self) -> &str;

    /// Resolves the queries in `input`, forwarding tool output to `reporter`.
    ///
    /// `queries` is the number of references in `input`.
    async fn resolve(
        &self,
        input: &Path,
        queries: usize,
        area: &WorkingArea,
        reporter: &mut ProgressReporter,
    ) -> Result<ResolvedList, ResolverError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_count_identifiers_skips_comments_and_blanks() {
        let contents = "https://open.spotify.com/track/1\n\n# NOT FOUND: Mystery - Nobody\n# comment\nhttps://open.spotify.com/track/2\n";
        assert_eq!(count_identifiers(contents), (2, 1));
    }

    #[test]
    fn test_count_identifiers_empty() {
        assert_eq!(count_identifiers(""), (0, 0));
        assert_eq!(count_identifiers("# NOT FOUND: a\n# NOT FOUND: b"), (0, 2));
    }

    #[test]
    fn test_summary() {
        let list = ResolvedList {
            path: PathBuf::from("spotify-urls.txt"),
            identifiers: 3,
            not_found: 1,
        };
        assert_eq!(list.summary(4), "Resolved 3 of 4 songs (1 not found)");
    }
}
