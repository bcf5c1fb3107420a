//! Streaming execution of external tools.
//!
//! Tools are spawned with stdin closed and both output streams piped. Each
//! stream is read as raw chunks by its own task; a [`LineBuffer`] carries any
//! trailing partial line over to the next chunk, so a line is yielded exactly
//! once and intact no matter where chunk boundaries fall. Lines from both
//! streams are merged into one channel, preserving order within each stream.

use once_cell::sync::Lazy;
use regex_lite::Regex;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::ffi::OsStr;
use std::io;
use std::path::PathBuf;
use std::process::{ExitStatus, Stdio};
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::{Child, Command};
use tokio::sync::mpsc;
use tracing::debug;

/// Read size for a single chunk of subprocess output.
const CHUNK_SIZE: usize = 4096;

/// Lines buffered between the reader tasks and the consumer.
const LINE_CHANNEL_CAPACITY: usize = 64;

static ANSI_ESCAPE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\x1b\[[0-9;?]*[A-Za-z]").expect("ANSI escape pattern is valid")
});

/// An external program plus the leading arguments it is always invoked with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolCommand {
    pub program: PathBuf,
    #[serde(default)]
    pub args: Vec<String>,
}

impl ToolCommand {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }

    /// Builds a [`Command`] with the program and its leading arguments.
    pub fn command(&self) -> Command {
        let mut command = Command::new(&self.program);
        command.args(&self.args);
        command
    }

    /// Program name for log and error messages.
    pub fn display_name(&self) -> String {
        self.program
            .file_name()
            .unwrap_or_else(|| OsStr::new(""))
            .to_string_lossy()
            .into_owned()
    }
}

/// Which output stream a line came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputSource {
    Stdout,
    Stderr,
}

/// One complete line of subprocess output, without its terminator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputLine {
    pub source: OutputSource,
    pub text: String,
}

/// Re-assembles complete lines from arbitrarily split byte chunks.
///
/// Bytes are kept undecoded until a full line is available, so multi-byte
/// UTF-8 sequences split across chunks decode correctly.
#[derive(Debug, Default)]
pub struct LineBuffer {
    pending: Vec<u8>,
}

impl LineBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a chunk and returns every line it completed.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<String> {
        let mut lines = Vec::new();
        let mut start = 0;
        for (idx, byte) in chunk.iter().enumerate() {
            if *byte == b'\n' {
                self.pending.extend_from_slice(&chunk[start..idx]);
                lines.push(Self::decode(&self.pending));
                self.pending.clear();
                start = idx + 1;
            }
        }
        self.pending.extend_from_slice(&chunk[start..]);
        lines
    }

    /// Flushes the trailing unterminated line, if any.
    pub fn finish(&mut self) -> Option<String> {
        if self.pending.is_empty() {
            return None;
        }
        let line = Self::decode(&self.pending);
        self.pending.clear();
        Some(line)
    }

    fn decode(bytes: &[u8]) -> String {
        let bytes = bytes.strip_suffix(b"\r").unwrap_or(bytes);
        String::from_utf8_lossy(bytes).into_owned()
    }
}

/// Removes terminal colour and cursor escape sequences.
pub fn strip_ansi(line: &str) -> Cow<'_, str> {
    ANSI_ESCAPE.replace_all(line, "")
}

/// Human readable description of a non-successful exit.
pub fn describe_exit(status: &ExitStatus) -> String {
    match status.code() {
        Some(code) => format!("exit code {}", code),
        None => "terminated by signal".to_string(),
    }
}

/// A running tool whose output is consumed line by line.
pub struct StreamingChild {
    child: Child,
    lines: mpsc::Receiver<OutputLine>,
}

impl StreamingChild {
    /// Spawns the command with stdin closed and both output streams piped.
    pub fn spawn(mut command: Command) -> io::Result<Self> {
        command
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let mut child = command.spawn()?;
        let (tx, rx) = mpsc::channel(LINE_CHANNEL_CAPACITY);

        if let Some(stdout) = child.stdout.take() {
            tokio::spawn(pump_lines(stdout, OutputSource::Stdout, tx.clone()));
        }
        if let Some(stderr) = child.stderr.take() {
            tokio::spawn(pump_lines(stderr, OutputSource::Stderr, tx.clone()));
        }

        Ok(Self { child, lines: rx })
    }

    /// Next complete output line, or `None` once both streams are closed.
    pub async fn next_line(&mut self) -> Option<OutputLine> {
        self.lines.recv().await
    }

    /// Drains any unread output and waits for the process to exit.
    pub async fn wait(mut self) -> io::Result<ExitStatus> {
        while self.lines.recv().await.is_some() {}
        self.child.wait().await
    }
}

async fn pump_lines<R>(mut reader: R, source: OutputSource, tx: mpsc::Sender<OutputLine>)
where
    R: AsyncRead + Unpin,
{
    let mut buffer = LineBuffer::new();
    let mut chunk = vec![0u8; CHUNK_SIZE];

    loop {
        let read = match reader.read(&mut chunk).await {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) => {
                debug!("Stopped reading {:?}: {}", source, e);
                break;
            }
        };
        for text in buffer.push(&chunk[..read]) {
            if tx.send(OutputLine { source, text }).await.is_err() {
                return;
            }
        }
    }

    if let Some(text) = buffer.finish() {
        let _ = tx.send(OutputLine { source, text }).await;
    }
}
