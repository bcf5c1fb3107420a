//! In-process archiver using the `zip` crate.

use async_trait::async_trait;
use std::fs::File;
use std::io::{self, BufWriter};
use std::path::{Path, PathBuf};
use tracing::info;
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

use super::{Archiver, ArchiverError};
use crate::progress::ProgressReporter;

/// Writes a stored (uncompressed) zip archive without any external tool.
#[derive(Debug, Default, Clone)]
pub struct BuiltinArchiver;

impl BuiltinArchiver {
    pub fn new() -> Self {
        Self
    }
}

/// Files under `root` as (absolute path, entry name) pairs, sorted by name.
fn list_entries(root: &Path) -> io::Result<Vec<(PathBuf, String)>> {
    let mut entries = Vec::new();
    let mut pending = vec![root.to_path_buf()];

    while let Some(dir) = pending.pop() {
        for entry in std::fs::read_dir(&dir)? {
            let entry = entry?;
            let path = entry.path();
            if entry.file_type()?.is_dir() {
                pending.push(path);
                continue;
            }
            let name = path
                .strip_prefix(root)
                .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?
                .components()
                .map(|c| c.as_os_str().to_string_lossy())
                .collect::<Vec<_>>()
                .join("/");
            entries.push((path, name));
        }
    }

    entries.sort_by(|a, b| a.1.cmp(&b.1));
    Ok(entries)
}

fn write_archive(source_dir: &Path, archive_path: &Path) -> Result<Vec<String>, ArchiverError> {
    let write_err = |reason: String| ArchiverError::Write {
        path: archive_path.to_path_buf(),
        reason,
    };

    let entries = list_entries(source_dir)?;
    let file = File::create(archive_path)?;
    let mut writer = ZipWriter::new(BufWriter::new(file));
    let options = FileOptions::default()
        .compression_method(CompressionMethod::Stored)
        .large_file(true);

    let mut names = Vec::with_capacity(entries.len());
    for (path, name) in entries {
        writer
            .start_file(name.as_str(), options)
            .map_err(|e| write_err(e.to_string()))?;
        let mut input = File::open(&path)?;
        io::copy(&mut input, &mut writer)?;
        names.push(name);
    }

    writer.finish().map_err(|e| write_err(e.to_string()))?;
    Ok(names)
}

#[async_trait]
impl Archiver for BuiltinArchiver {
    fn name(&self) -> &str {
        "builtin"
    }

    async fn archive(
        &self,
        source_dir: &Path,
        archive_path: &Path,
        reporter: &mut ProgressReporter,
    ) -> Result<(), ArchiverError> {
        let source = source_dir.to_path_buf();
        let target = archive_path.to_path_buf();
        let names = tokio::task::spawn_blocking(move || write_archive(&source, &target))
            .await
            .map_err(|e| ArchiverError::Write {
                path: archive_path.to_path_buf(),
                reason: e.to_string(),
            })??;

        for name in &names {
            reporter.log(format!("  adding: {} (stored 0%)", name)).await;
        }
        info!(
            "Archived {} files into {}",
            names.len(),
            archive_path.display()
        );
        Ok(())
    }
}
