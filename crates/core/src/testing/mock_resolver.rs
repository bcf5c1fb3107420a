//! Mock resolver for testing.

use async_trait::async_trait;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::progress::ProgressReporter;
use crate::resolver::{count_identifiers, ResolvedList, Resolver, ResolverError};
use crate::workarea::WorkingArea;

/// Mock implementation of the Resolver trait.
///
/// Writes the resolved identifier file into the working area the way the
/// real resolver does. Without configured identifiers, one track link is
/// produced per query.
#[derive(Debug, Clone)]
pub struct MockResolver {
    output_file: String,
    /// Identifier lines to write instead of the generated ones.
    identifiers: Arc<RwLock<Option<Vec<String>>>>,
    /// Queries reported as not found.
    not_found: Arc<RwLock<Vec<String>>>,
    /// If set, the next operation will fail with this error.
    next_error: Arc<RwLock<Option<ResolverError>>>,
    calls: Arc<RwLock<usize>>,
}

impl Default for MockResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl MockResolver {
    /// Create a new mock resolver writing the default output file.
    pub fn new() -> Self {
        Self::with_output_file("spotify-urls.txt")
    }

    pub fn with_output_file(output_file: impl Into<String>) -> Self {
        Self {
            output_file: output_file.into(),
            identifiers: Arc::new(RwLock::new(None)),
            not_found: Arc::new(RwLock::new(Vec::new())),
            next_error: Arc::new(RwLock::new(None)),
            calls: Arc::new(RwLock::new(0)),
        }
    }

    /// Set the identifier lines written on the next runs.
    pub async fn set_identifiers(&self, identifiers: Vec<String>) {
        *self.identifiers.write().await = Some(identifiers);
    }

    /// Set queries to report with a not-found marker.
    pub async fn set_not_found(&self, queries: Vec<String>) {
        *self.not_found.write().await = queries;
    }

    /// Configure the next operation to fail with the given error.
    pub async fn set_next_error(&self, error: ResolverError) {
        *self.next_error.write().await = Some(error);
    }

    pub async fn call_count(&self) -> usize {
        *self.calls.read().await
    }
}

#[async_trait]
impl Resolver for MockResolver {
    fn name(&self) -> &str {
        "mock"
    }

    async fn resolve(
        &self,
        _input: &Path,
        queries: usize,
        area: &WorkingArea,
        reporter: &mut ProgressReporter,
    ) -> Result<ResolvedList, ResolverError> {
        *self.calls.write().await += 1;
        if let Some(err) = self.next_error.write().await.take() {
            return Err(err);
        }

        let identifiers = match self.identifiers.read().await.clone() {
            Some(lines) => lines,
            None => (1..=queries)
                .map(|i| format!("https://open.spotify.com/track/mock{}", i))
                .collect(),
        };

        let mut contents = String::new();
        for line in &identifiers {
            reporter.log(format!("Found: {}", line)).await;
            contents.push_str(line);
            contents.push('\n');
        }
        for query in self.not_found.read().await.iter() {
            reporter.log(format!("Not found: {}", query)).await;
            contents.push_str(&format!("# NOT FOUND: {}\n", query));
        }

        let path = area.root().join(&self.output_file);
        tokio::fs::write(&path, contents.as_bytes()).await?;

        let (identifiers, not_found) = count_identifiers(&contents);
        if identifiers == 0 {
            return Err(ResolverError::NoIdentifiers { queries });
        }
        Ok(ResolvedList {
            path,
            identifiers,
            not_found,
        })
    }
}
