//! Per-request ephemeral working directory.
//!
//! Layout inside the area root:
//!
//! ```text
//! songbundle-<uuid>/
//! ├── songs.txt          raw song list
//! ├── <resolver output>  resolved identifiers (only if resolution ran)
//! ├── downloads/         acquisition output, artist/album nested
//! ├── output/            flattened, transcoded files
//! └── bundle.zip         final archive
//! ```

use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::request::SongList;

const DIR_PREFIX: &str = "songbundle-";
const INPUT_FILE: &str = "songs.txt";
const DOWNLOADS_DIR: &str = "downloads";
const OUTPUT_DIR: &str = "output";
const ARCHIVE_FILE: &str = "bundle.zip";

/// Errors setting up a working area.
#[derive(Debug, Error)]
pub enum WorkAreaError {
    #[error("failed to create {path}: {source}")]
    Create { path: PathBuf, source: io::Error },

    #[error("failed to write {path}: {source}")]
    Write { path: PathBuf, source: io::Error },
}

/// A private directory tree owned by exactly one request.
#[derive(Debug)]
pub struct WorkingArea {
    root: PathBuf,
}

impl WorkingArea {
    /// Creates a uniquely named area under `base` with its download and
    /// output subdirectories in place.
    pub async fn acquire(base: &Path) -> Result<Self, WorkAreaError> {
        // Tools run with the area as their current directory, so every
        // path handed to them must be absolute.
        let base = std::path::absolute(base).map_err(|source| WorkAreaError::Create {
            path: base.to_path_buf(),
            source,
        })?;
        let root = base.join(format!("{}{}", DIR_PREFIX, Uuid::new_v4()));
        let area = Self { root };

        for dir in [area.downloads_dir(), area.output_dir()] {
            tokio::fs::create_dir_all(&dir)
                .await
                .map_err(|source| WorkAreaError::Create { path: dir, source })?;
        }

        debug!("Acquired working area {}", area.root.display());
        Ok(area)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn input_file(&self) -> PathBuf {
        self.root.join(INPUT_FILE)
    }

    pub fn downloads_dir(&self) -> PathBuf {
        self.root.join(DOWNLOADS_DIR)
    }

    pub fn output_dir(&self) -> PathBuf {
        self.root.join(OUTPUT_DIR)
    }

    pub fn archive_path(&self) -> PathBuf {
        self.root.join(ARCHIVE_FILE)
    }

    /// Writes the raw song list and returns its path.
    pub async fn write_input(&self, songs: &SongList) -> Result<PathBuf, WorkAreaError> {
        let path = self.input_file();
        tokio::fs::write(&path, songs.to_file_contents())
            .await
            .map_err(|source| WorkAreaError::Write {
                path: path.clone(),
                source,
            })?;
        Ok(path)
    }

    /// Removes the whole tree. Failures are logged, never returned.
    pub async fn release(self) {
        match tokio::fs::remove_dir_all(&self.root).await {
            Ok(()) => debug!("Released working area {}", self.root.display()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => warn!(
                "Failed to remove working area {}: {}",
                self.root.display(),
                e
            ),
        }
    }
}
