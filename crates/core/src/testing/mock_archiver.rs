//! Mock archiver for testing.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::archiver::{Archiver, ArchiverError};
use crate::progress::ProgressReporter;

/// Mock implementation of the Archiver trait.
///
/// Instead of a real archive it writes a manifest: one line per archived
/// file name, sorted.
#[derive(Debug, Default, Clone)]
pub struct MockArchiver {
    /// If set, the next operation will fail with this error.
    next_error: Arc<RwLock<Option<ArchiverError>>>,
    archived: Arc<RwLock<Vec<PathBuf>>>,
}

impl MockArchiver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Configure the next operation to fail with the given error.
    pub async fn set_next_error(&self, error: ArchiverError) {
        *self.next_error.write().await = Some(error);
    }

    /// Archive paths written so far.
    pub async fn archived(&self) -> Vec<PathBuf> {
        self.archived.read().await.clone()
    }
}

#[async_trait]
impl Archiver for MockArchiver {
    fn name(&self) -> &str {
        "mock"
    }

    async fn archive(
        &self,
        source_dir: &Path,
        archive_path: &Path,
        reporter: &mut ProgressReporter,
    ) -> Result<(), ArchiverError> {
        if let Some(err) = self.next_error.write().await.take() {
            return Err(err);
        }

        let mut names = Vec::new();
        let mut entries = tokio::fs::read_dir(source_dir).await?;
        while let Some(entry) = entries.next_entry().await? {
            names.push(entry.file_name().to_string_lossy().into_owned());
        }
        names.sort();

        let mut manifest = String::new();
        for name in &names {
            reporter.log(format!("  adding: {}", name)).await;
            manifest.push_str(name);
            manifest.push('\n');
        }
        tokio::fs::write(archive_path, manifest).await?;

        self.archived.write().await.push(archive_path.to_path_buf());
        Ok(())
    }
}
