//! Flattening and transcoding of acquired audio.
//!
//! The acquisition tool leaves an artist/album shaped tree behind. This stage
//! collects every audio file from it, copies files already in the target
//! format byte-for-byte into a single flat directory and converts the rest.

use std::collections::HashSet;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

use crate::converter::{AudioFormat, ConversionJob, Converter, ConverterError};
use crate::progress::{band_position, ProgressReporter, Stage};

/// Extensions treated as audio when walking the acquisition output.
pub const AUDIO_EXTENSIONS: &[&str] = &["m4a", "mp3", "flac", "ogg", "opus", "wav", "aac", "webm"];

/// Errors from the transcoding stage.
#[derive(Debug, Error)]
pub enum TranscodeError {
    #[error("failed to scan {path}: {source}")]
    Scan { path: PathBuf, source: io::Error },

    #[error("failed to copy {path}: {source}")]
    Copy { path: PathBuf, source: io::Error },

    #[error("failed to convert {path}: {source}")]
    Convert {
        path: PathBuf,
        #[source]
        source: ConverterError,
    },
}

/// Format and bitrate every delivered file ends up in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TranscodeTarget {
    pub format: AudioFormat,
    pub bitrate_kbps: u32,
}

impl TranscodeTarget {
    /// High quality profile for `format`, optionally with a bitrate override.
    pub fn new(format: AudioFormat, bitrate_kbps: Option<u32>) -> Self {
        Self {
            format,
            bitrate_kbps: bitrate_kbps.unwrap_or_else(|| format.default_bitrate_kbps()),
        }
    }
}

/// What the stage did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TranscodeSummary {
    pub total: usize,
    pub copied: usize,
    pub converted: usize,
}

fn is_audio_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            AUDIO_EXTENSIONS
                .iter()
                .any(|known| known.eq_ignore_ascii_case(ext))
        })
        .unwrap_or(false)
}

/// Recursively lists audio files under `dir`, sorted by path.
pub async fn collect_audio_files(dir: &Path) -> Result<Vec<PathBuf>, TranscodeError> {
    let mut files = Vec::new();
    let mut pending = vec![dir.to_path_buf()];

    while let Some(current) = pending.pop() {
        let scan_err = |source| TranscodeError::Scan {
            path: current.clone(),
            source,
        };
        let mut entries = tokio::fs::read_dir(&current).await.map_err(scan_err)?;
        while let Some(entry) = entries.next_entry().await.map_err(scan_err)? {
            let file_type = entry.file_type().await.map_err(scan_err)?;
            let path = entry.path();
            if file_type.is_dir() {
                pending.push(path);
            } else if file_type.is_file() && is_audio_file(&path) {
                files.push(path);
            }
        }
    }

    files.sort();
    Ok(files)
}

/// Picks a free name in `dir` for `stem.ext`, suffixing " (n)" on collision.
fn flattened_name(dir: &Path, stem: &str, ext: &str, taken: &mut HashSet<PathBuf>) -> PathBuf {
    let mut candidate = dir.join(format!("{}.{}", stem, ext));
    let mut n = 2;
    while taken.contains(&candidate) {
        candidate = dir.join(format!("{} ({}).{}", stem, n, ext));
        n += 1;
    }
    taken.insert(candidate.clone());
    candidate
}

/// Flattens every audio file under `source_dir` into `output_dir` in the
/// target format.
///
/// Progress is reported after each file inside the convert-audio band. An
/// empty tree is not an error here; the caller decides what that means.
pub async fn flatten_and_transcode(
    converter: &dyn Converter,
    source_dir: &Path,
    output_dir: &Path,
    target: TranscodeTarget,
    reporter: &mut ProgressReporter,
) -> Result<TranscodeSummary, TranscodeError> {
    let files = collect_audio_files(source_dir).await?;
    let mut summary = TranscodeSummary {
        total: files.len(),
        ..Default::default()
    };

    if files.is_empty() {
        reporter
            .enter(Stage::ConvertAudio, "No audio files to convert", 85)
            .await;
        return Ok(summary);
    }

    reporter
        .enter(
            Stage::ConvertAudio,
            format!("Converting {} files to {}", files.len(), target.format),
            85,
        )
        .await;

    let mut taken = HashSet::new();
    for (index, path) in files.iter().enumerate() {
        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| format!("track-{}", index + 1));
        let destination = flattened_name(output_dir, &stem, target.format.extension(), &mut taken);

        if AudioFormat::from_extension(path) == Some(target.format) {
            debug!("Copying {} to {}", path.display(), destination.display());
            tokio::fs::copy(path, &destination)
                .await
                .map_err(|source| TranscodeError::Copy {
                    path: path.clone(),
                    source,
                })?;
            summary.copied += 1;
        } else {
            debug!("Converting {} to {}", path.display(), destination.display());
            let job = ConversionJob::new(path.clone(), destination.clone(), target.format)
                .with_bitrate(target.bitrate_kbps);
            converter
                .convert(job)
                .await
                .map_err(|source| TranscodeError::Convert {
                    path: path.clone(),
                    source,
                })?;
            summary.converted += 1;
        }

        let processed = index + 1;
        reporter
            .advance(
                band_position(Stage::ConvertAudio, processed, files.len()),
                Some(format!("Processed {} of {} files", processed, files.len())),
            )
            .await;
    }

    info!(
        "Flattened {} files ({} copied, {} converted)",
        summary.total, summary.copied, summary.converted
    );
    Ok(summary)
}
