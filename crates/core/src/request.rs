//! Incoming download requests.

use serde_json::Value;
use thiserror::Error;

use crate::converter::AudioFormat;

/// Rejections raised before any work is started.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InputError {
    #[error("request body is not valid JSON: {0}")]
    Malformed(String),

    #[error("song list is missing")]
    Missing,

    #[error("song list must be a string")]
    NotText,

    #[error("song list is empty")]
    Empty,

    #[error("unsupported output format: {0}")]
    UnsupportedFormat(String),
}

/// Non-empty list of song references, one per line.
///
/// Each line is either a free-text query ("Title - Artist") or an already
/// resolved identifier. Blank lines are dropped and surrounding whitespace
/// is trimmed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SongList {
    lines: Vec<String>,
}

impl SongList {
    pub fn parse(text: &str) -> Result<Self, InputError> {
        let lines: Vec<String> = text
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect();

        if lines.is_empty() {
            return Err(InputError::Empty);
        }
        Ok(Self { lines })
    }

    /// Number of references; the initial expected unit count.
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Whether the first reference already is an addressable identifier.
    pub fn is_resolved(&self, prefixes: &[String]) -> bool {
        self.lines
            .first()
            .is_some_and(|line| looks_like_identifier(line, prefixes))
    }

    /// File contents handed to the external tools.
    pub fn to_file_contents(&self) -> String {
        let mut contents = self.lines.join("\n");
        contents.push('\n');
        contents
    }
}

/// Case-insensitive prefix match against the recognized identifier schemes.
pub fn looks_like_identifier(line: &str, prefixes: &[String]) -> bool {
    let line = line.trim().to_ascii_lowercase();
    prefixes
        .iter()
        .any(|prefix| line.starts_with(&prefix.to_ascii_lowercase()))
}

/// A validated request: the songs plus an optional output format override.
#[derive(Debug, Clone)]
pub struct DownloadRequest {
    pub songs: SongList,
    pub format: Option<AudioFormat>,
}

impl DownloadRequest {
    pub fn new(songs: SongList) -> Self {
        Self {
            songs,
            format: None,
        }
    }

    pub fn with_format(mut self, format: AudioFormat) -> Self {
        self.format = Some(format);
        self
    }

    /// Validates a JSON body of the form `{"songs": "...", "format": "mp3"}`.
    ///
    /// `format` is optional; `null` is treated as absent.
    pub fn from_json(body: &Value) -> Result<Self, InputError> {
        let songs = match body.get("songs") {
            None | Some(Value::Null) => return Err(InputError::Missing),
            Some(Value::String(text)) => SongList::parse(text)?,
            Some(_) => return Err(InputError::NotText),
        };

        let format = match body.get("format") {
            None | Some(Value::Null) => None,
            Some(Value::String(name)) => Some(
                AudioFormat::from_name(name)
                    .ok_or_else(|| InputError::UnsupportedFormat(name.clone()))?,
            ),
            Some(other) => return Err(InputError::UnsupportedFormat(other.to_string())),
        };

        Ok(Self { songs, format })
    }
}
